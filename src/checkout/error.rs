use thiserror::Error;

use super::PaymentErrors;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error(transparent)]
    Payment(#[from] PaymentErrors),
    #[error("Quantity {requested} is outside 1..={available}")]
    InvalidQuantity { requested: u32, available: u32 },
    #[error("Product {0} is not available for ordering")]
    Unavailable(String),
    #[error(transparent)]
    Product(#[from] ProductError),
    /// Stock was already decremented when order creation failed; nothing is
    /// rolled back.
    #[error("Stock for product {product_id} was decremented but the order was not recorded: {source}")]
    OrderNotRecorded { product_id: String, source: OrderError },
}
