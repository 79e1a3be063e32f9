use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};
use crate::order_actor::OrderError;

/// Client for the order cache actor.
///
/// Order creation is optimistic: the cached list shows the new order as soon
/// as the request is accepted and drops it again if the server refuses.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, OrderError, order, orders);

impl OrderClient {
    #[instrument(skip(self, order), fields(product_id = %order.product.id, quantity = order.quantity))]
    pub async fn create_order(&self, order: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(order).await.map_err(OrderError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_order(&self, id: String, patch: OrderPatch) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(OrderError::from)
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        self.update_order(id, OrderPatch::status(status)).await
    }
}
