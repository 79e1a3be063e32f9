use thiserror::Error;

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("No row is being edited")]
    NotEditing,
    #[error("Product {0} has no category and cannot be replenished")]
    NotReplenishable(String),
}
