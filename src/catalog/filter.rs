use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::domain::{Order, OrderStatus, Product, ProductType};

/// Availability bucket offered by the product filters.
///
/// Only the `isAvailable` flag is consulted: `available` keeps flagged rows
/// and both other buckets keep unflagged ones, whatever the stock level.
/// Use [`StockStatus`](crate::domain::StockStatus) for quantity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityFilter {
    Available,
    LowStock,
    OutOfStock,
}

impl AvailabilityFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            AvailabilityFilter::Available => product.is_available,
            AvailabilityFilter::LowStock | AvailabilityFilter::OutOfStock => !product.is_available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityFilter::Available => "available",
            AvailabilityFilter::LowStock => "low-stock",
            AvailabilityFilter::OutOfStock => "out-of-stock",
        }
    }
}

impl fmt::Display for AvailabilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(AvailabilityFilter::Available),
            "low-stock" => Ok(AvailabilityFilter::LowStock),
            "out-of-stock" => Ok(AvailabilityFilter::OutOfStock),
            other => Err(format!("unknown availability filter: {other}")),
        }
    }
}

/// Product list filter. Unset inputs match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<ProductType>,
    pub availability: Option<AvailabilityFilter>,
    pub name: Option<String>,
}

impl ProductFilter {
    pub fn category(mut self, category: ProductType) -> Self {
        self.category = Some(category);
        self
    }

    pub fn availability(mut self, availability: AvailabilityFilter) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Case-insensitive title substring. Blank input is ignored.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.trim().is_empty() { None } else { Some(name) };
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.product_type != Some(category) {
                return false;
            }
        }
        if let Some(availability) = self.availability {
            if !availability.matches(product) {
                return false;
            }
        }
        match &self.name {
            Some(needle) => product
                .title
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            None => true,
        }
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub category: Option<ProductType>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn category(mut self, category: ProductType) -> Self {
        self.category = Some(category);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.category.map_or(true, |c| order.product_type == Some(c))
            && self.status.map_or(true, |s| order.status == s)
    }

    pub fn apply(&self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

/// Newest `createdAt` first; rows without a timestamp sink to the bottom.
/// Stable, so equal timestamps keep server order.
pub fn sort_newest_first(products: &mut [Product]) {
    products.sort_by_key(|p| Reverse(p.created_at));
}

/// Sum of order totals, rounded to cents.
pub fn revenue(orders: &[Order]) -> f64 {
    crate::domain::wire::round_cents(orders.iter().map(|o| o.total).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("1", "Plain Tee", 15.0, 0).with_type(ProductType::TShirt),
            Product::new("2", "Striped Tee", 18.0, 6).with_type(ProductType::TShirt),
            Product::new("3", "Chinos", 45.0, 40).with_type(ProductType::Trousers),
            Product::new("4", "Cargo Trousers", 50.0, 25)
                .with_type(ProductType::Trousers)
                .with_availability(false),
            Product::new("5", "Mystery Box", 5.0, 12),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let products = catalog();
        assert_eq!(ProductFilter::default().apply(&products), products);
    }

    #[test]
    fn test_filters_intersect() {
        let products = catalog();

        let tees = ProductFilter::default().category(ProductType::TShirt);
        assert_eq!(ids(&tees.apply(&products)), ["1", "2"]);

        // Every bucket but `available` selects unflagged rows, even well-stocked ones.
        let low = ProductFilter::default().availability(AvailabilityFilter::LowStock);
        assert_eq!(ids(&low.apply(&products)), ["1", "4"]);
        let out = ProductFilter::default().availability(AvailabilityFilter::OutOfStock);
        assert_eq!(ids(&out.apply(&products)), ["1", "4"]);

        let available_trousers = ProductFilter::default()
            .category(ProductType::Trousers)
            .availability(AvailabilityFilter::Available);
        assert_eq!(ids(&available_trousers.apply(&products)), ["3"]);

        let by_name = ProductFilter::default().name("TEE");
        assert_eq!(ids(&by_name.apply(&products)), ["1", "2"]);

        let none = ProductFilter::default().name("tee").category(ProductType::Trousers);
        assert!(none.apply(&products).is_empty());
    }

    #[test]
    fn test_filter_result_is_subset_matching_every_predicate() {
        let products = catalog();
        for category in [None, Some(ProductType::TShirt), Some(ProductType::Trousers)] {
            for availability in [
                None,
                Some(AvailabilityFilter::Available),
                Some(AvailabilityFilter::LowStock),
                Some(AvailabilityFilter::OutOfStock),
            ] {
                for name in [None, Some("o".to_string()), Some("tee".to_string())] {
                    let filter = ProductFilter { category, availability, name };
                    let expected: Vec<_> = products
                        .iter()
                        .filter(|p| category.map_or(true, |c| p.product_type == Some(c)))
                        .filter(|p| availability.map_or(true, |a| a.matches(p)))
                        .filter(|p| {
                            filter
                                .name
                                .as_ref()
                                .map_or(true, |n| p.title.to_lowercase().contains(n))
                        })
                        .cloned()
                        .collect();
                    assert_eq!(filter.apply(&products), expected, "{filter:?}");
                }
            }
        }
    }

    #[test]
    fn test_blank_name_is_ignored() {
        assert_eq!(ProductFilter::default().name("   ").name, None);
    }

    #[test]
    fn test_order_filter_and_revenue() {
        let mut paid = Order::sample("o1", 30.0);
        paid.product_type = Some(ProductType::TShirt);
        let mut cancelled = Order::sample("o2", 45.5);
        cancelled.status = OrderStatus::Cancelled;
        cancelled.product_type = Some(ProductType::Trousers);
        let orders = vec![paid, cancelled];

        let only_paid = OrderFilter::default().status(OrderStatus::Paid).apply(&orders);
        assert_eq!(only_paid.len(), 1);
        assert_eq!(revenue(&only_paid), 30.0);
        assert_eq!(revenue(&orders), 75.5);

        let trousers = OrderFilter::default().category(ProductType::Trousers).apply(&orders);
        assert_eq!(trousers[0].id, "o2");
    }

    #[test]
    fn test_sort_newest_first() {
        let at = |secs| Some(Utc.timestamp_opt(secs, 0).unwrap());
        let mut products = catalog();
        products[0].created_at = at(100);
        products[2].created_at = at(300);
        products[3].created_at = at(200);

        sort_newest_first(&mut products);
        assert_eq!(ids(&products), ["3", "4", "1", "2", "5"]);
    }
}
