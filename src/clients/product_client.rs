use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::ProductError;

/// Client for the product cache actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product, products);

impl ProductClient {
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(product).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    /// Overwrites the stock level; the caller does the arithmetic.
    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: String, quantity: u32) -> Result<Product, ProductError> {
        self.update_product(id, ProductPatch::quantity(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn set_availability(&self, id: String, is_available: bool) -> Result<Product, ProductError> {
        self.update_product(id, ProductPatch::availability(is_available)).await
    }
}
