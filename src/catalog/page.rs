/// Rows per page on the catalog and admin tables.
pub const PAGE_SIZE: usize = 8;

/// One page of a client-side paginated list.
///
/// `number` is 1-based and is never clamped to `total_pages`: when a filter
/// shrinks the list below the current page, the page comes back empty with
/// "previous" still enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self { page_size: PAGE_SIZE }
    }
}

impl Paginator {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    /// Slices page `number` (1-based) out of `items`. Page 0 is read as 1.
    pub fn page<T: Clone>(&self, items: &[T], number: usize) -> Page<T> {
        let number = number.max(1);
        let start = (number - 1).saturating_mul(self.page_size);
        let slice = items
            .get(start..)
            .map(|rest| &rest[..rest.len().min(self.page_size)])
            .unwrap_or(&[]);
        Page {
            items: slice.to_vec(),
            number,
            total_pages: self.total_pages(items.len()),
            total_items: items.len(),
        }
    }
}
