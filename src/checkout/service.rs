use tracing::{error, info, instrument, warn};

use super::{CheckoutError, PaymentDetails};
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{order_total, Order, OrderCreate, Product};

/// A product and a chosen quantity, checked against the stock on hand.
///
/// Only [`Quote::new`] builds one, so `quantity` always lies in
/// `1..=product.quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    product: Product,
    quantity: u32,
    total: f64,
}

impl Quote {
    pub fn new(product: Product, quantity: u32) -> Result<Self, CheckoutError> {
        if !product.is_available {
            return Err(CheckoutError::Unavailable(product.id));
        }
        if quantity == 0 || quantity > product.quantity {
            return Err(CheckoutError::InvalidQuantity {
                requested: quantity,
                available: product.quantity,
            });
        }
        Ok(Self {
            total: order_total(product.price, quantity),
            product,
            quantity,
        })
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Stock level written back once the purchase goes through.
    pub fn remaining_stock(&self) -> u32 {
        self.product.quantity.saturating_sub(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub order: Order,
    pub remaining_stock: u32,
}

/// Drives a purchase: stock decrement, then order creation.
///
/// The two writes are not atomic. If the order cannot be recorded after the
/// stock went down, the caller gets [`CheckoutError::OrderNotRecorded`] and
/// the stock stays decremented.
#[derive(Clone)]
pub struct CheckoutService {
    products: ProductClient,
    orders: OrderClient,
}

impl CheckoutService {
    pub fn new(products: ProductClient, orders: OrderClient) -> Self {
        Self { products, orders }
    }

    #[instrument(skip(self))]
    pub async fn quote(&self, product_id: String, quantity: u32) -> Result<Quote, CheckoutError> {
        let product = self.products.get_product(product_id).await?;
        Quote::new(product, quantity)
    }

    #[instrument(skip(self, quote, payment), fields(product_id = %quote.product.id, quantity = quote.quantity))]
    pub async fn submit(&self, quote: &Quote, payment: &PaymentDetails) -> Result<Receipt, CheckoutError> {
        info!("Processing checkout");

        // Step 1: Validate payment form; nothing is sent on failure
        if let Err(e) = payment.validate() {
            warn!(fields = e.errors.len(), "Payment validation failed");
            return Err(e.into());
        }

        // Step 2: Decrement stock
        let remaining_stock = quote.remaining_stock();
        if let Err(e) = self
            .products
            .set_stock(quote.product.id.clone(), remaining_stock)
            .await
        {
            error!(error = %e, "Stock update failed");
            return Err(e.into());
        }
        info!(remaining_stock, "Stock updated");

        // Step 3: Record the order
        let payload = OrderCreate::paid(&quote.product, quote.quantity);
        match self.orders.create_order(payload).await {
            Ok(order) => {
                info!(order_id = %order.id, total = order.total, "Order recorded");
                Ok(Receipt { order, remaining_stock })
            }
            Err(e) => {
                warn!(error = %e, "Order creation failed after stock was decremented");
                Err(CheckoutError::OrderNotRecorded {
                    product_id: quote.product.id.clone(),
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::app_system::{AppConfig, StorefrontSystem};
    use crate::checkout::PaymentField;
    use crate::domain::OrderStatus;
    use serde_json::json;
    use std::sync::Arc;

    async fn system() -> (StorefrontSystem, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        backend
            .seed(
                "products",
                vec![json!({
                    "id": "1", "title": "Plain Tee", "description": "White", "price": "20.00",
                    "quantity": 10, "isAvailable": true, "type": "t-shirt"
                })],
            )
            .await;
        let system = StorefrontSystem::with_backend(&AppConfig::default(), backend.clone());
        (system, backend)
    }

    fn card() -> PaymentDetails {
        PaymentDetails::new("4111 1111 1111 1111", "12/29", "123")
    }

    #[test]
    fn test_quote_bounds() {
        let product = Product::new("1", "Tee", 20.0, 3);
        let full = Quote::new(product.clone(), 3).unwrap();
        assert_eq!(full.total(), 60.0);
        assert_eq!(full.remaining_stock(), 0);
        assert_eq!(full.quantity(), 3);
        assert!(matches!(
            Quote::new(product.clone(), 0),
            Err(CheckoutError::InvalidQuantity { requested: 0, available: 3 })
        ));
        assert!(matches!(Quote::new(product.clone(), 4), Err(CheckoutError::InvalidQuantity { .. })));
        assert!(matches!(
            Quote::new(product.with_availability(false), 1),
            Err(CheckoutError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_decrements_then_records() {
        let (system, backend) = system().await;
        let checkout = system.checkout();

        let quote = checkout.quote("1".into(), 3).await.unwrap();
        assert_eq!(quote.total(), 60.0);

        let receipt = checkout.submit(&quote, &card()).await.unwrap();
        assert_eq!(receipt.remaining_stock, 7);
        assert_eq!(receipt.order.status, OrderStatus::Paid);
        assert_eq!(receipt.order.total, 60.0);

        let writes: Vec<_> = backend
            .calls()
            .await
            .into_iter()
            .filter(|c| c.method != "GET")
            .map(|c| (c.method, c.path))
            .collect();
        assert_eq!(writes, [("PUT", "products/1".to_string()), ("POST", "orders".to_string())]);
        assert_eq!(backend.row("products", "1").await.unwrap()["quantity"], 7);
    }

    #[tokio::test]
    async fn test_invalid_payment_sends_nothing() {
        let (system, backend) = system().await;
        let checkout = system.checkout();
        let quote = checkout.quote("1".into(), 1).await.unwrap();
        let before = backend.calls().await.len();

        let err = checkout
            .submit(&quote, &PaymentDetails::new("1234", "12/29", "123"))
            .await
            .unwrap_err();
        match err {
            CheckoutError::Payment(errors) => assert!(errors.has(PaymentField::CardNumber)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls().await.len(), before);
    }

    #[tokio::test]
    async fn test_order_failure_leaves_stock_decremented() {
        let (system, backend) = system().await;
        let checkout = system.checkout();
        let quote = checkout.quote("1".into(), 2).await.unwrap();
        backend.fail_next("POST", "orders").await;

        let err = checkout.submit(&quote, &card()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotRecorded { ref product_id, .. } if product_id == "1"));
        assert_eq!(backend.row("products", "1").await.unwrap()["quantity"], 8);
        assert_eq!(backend.count("POST", "orders").await, 1);
    }
}
