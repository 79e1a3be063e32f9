/// Inline edit state for a table: at most one row is being edited, keyed by
/// its id, with a working copy of the row.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<T> {
    editing: Option<(String, T)>,
}

impl<T> Default for EditSession<T> {
    fn default() -> Self {
        Self { editing: None }
    }
}

impl<T> EditSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `id`, discarding any other row's unsaved draft.
    pub fn begin(&mut self, id: impl Into<String>, row: T) {
        self.editing = Some((id.into(), row));
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_id() == Some(id)
    }

    pub fn draft(&self) -> Option<&T> {
        self.editing.as_ref().map(|(_, row)| row)
    }

    pub fn draft_mut(&mut self) -> Option<&mut T> {
        self.editing.as_mut().map(|(_, row)| row)
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }

    pub(crate) fn take(&mut self) -> Option<(String, T)> {
        self.editing.take()
    }

    /// Puts a draft back after a failed save so it can be retried.
    pub(crate) fn restore(&mut self, id: String, row: T) {
        self.editing = Some((id, row));
    }
}
