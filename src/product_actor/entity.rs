use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;

    const COLLECTION: &'static str = "products";
    const OPTIMISTIC_CREATE: bool = true;

    fn id(&self) -> &String {
        &self.id
    }

    /// Provisional catalog row shown while `POST /products` is in flight.
    ///
    /// Timestamps stay empty until the server assigns them.
    fn from_create(id: String, payload: &ProductCreate) -> Self {
        Self {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            price: payload.price,
            quantity: payload.quantity,
            is_available: payload.is_available,
            product_type: payload.product_type,
            created_at: None,
            updated_at: None,
        }
    }

    fn provisional_id(seq: u64) -> String {
        format!("pending-product-{seq}")
    }
}
