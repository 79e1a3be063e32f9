use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderPatch};

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = OrderPatch;

    const COLLECTION: &'static str = "orders";
    const OPTIMISTIC_CREATE: bool = true;

    fn id(&self) -> &String {
        &self.id
    }

    /// The order exactly as submitted, under a placeholder id.
    fn from_create(id: String, payload: &OrderCreate) -> Self {
        Self {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            price: payload.price,
            quantity: payload.quantity,
            total: payload.total,
            status: payload.status,
            product_type: payload.product_type,
            created_at: None,
            product: Some(payload.product.clone()),
        }
    }

    fn provisional_id(seq: u64) -> String {
        format!("pending-order-{seq}")
    }
}
