use tracing::{info, instrument, warn};

use super::{AdminError, EditSession};
use crate::catalog::{Page, Paginator, ProductFilter};
use crate::clients::ProductClient;
use crate::domain::{Product, ProductCreate, ProductPatch, ProductType};

/// Product inventory management: the admin product table, the add-product
/// form and the manage-store replenishment screen.
#[derive(Clone)]
pub struct ProductAdmin {
    products: ProductClient,
    paginator: Paginator,
}

impl ProductAdmin {
    pub fn new(products: ProductClient, paginator: Paginator) -> Self {
        Self { products, paginator }
    }

    pub async fn load(&self, filter: &ProductFilter, page: usize) -> Result<Page<Product>, AdminError> {
        let products = self.products.list_products().await?;
        Ok(self.paginator.page(&filter.apply(&products), page))
    }

    /// Saves the row being edited. Availability is reset to follow stock.
    /// On failure the draft stays open.
    #[instrument(skip(self, session), fields(product_id = session.editing_id()))]
    pub async fn save_edit(&self, session: &mut EditSession<Product>) -> Result<Product, AdminError> {
        let (id, draft) = session.take().ok_or(AdminError::NotEditing)?;
        match self
            .products
            .update_product(id.clone(), ProductPatch::from_edit(&draft))
            .await
        {
            Ok(saved) => {
                info!("Product saved");
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "Product save failed");
                session.restore(id, draft);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn toggle_availability(&self, id: String) -> Result<Product, AdminError> {
        let current = self.products.get_product(id.clone()).await?;
        let updated = self.products.set_availability(id, !current.is_available).await?;
        info!(is_available = updated.is_available, "Availability toggled");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: String) -> Result<(), AdminError> {
        self.products.delete_product(id).await?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn add(&self, product: ProductCreate) -> Result<Product, AdminError> {
        let created = self.products.create_product(product).await?;
        info!(product_id = %created.id, "Product added");
        Ok(created)
    }

    pub async fn resync(&self) -> Result<Vec<Product>, AdminError> {
        Ok(self.products.resync_products().await?)
    }

    /// Products shown on the manage-store screen, optionally for one category.
    pub async fn stock_overview(&self, category: Option<ProductType>) -> Result<Vec<Product>, AdminError> {
        let filter = ProductFilter {
            category,
            ..ProductFilter::default()
        };
        Ok(filter.apply(&self.products.list_products().await?))
    }

    /// Adds one category-specific batch to the product's stock, capped at
    /// [`MAX_STOCK`](crate::domain::MAX_STOCK).
    #[instrument(skip(self))]
    pub async fn replenish(&self, id: String) -> Result<Product, AdminError> {
        let current = self.products.get_product(id.clone()).await?;
        let quantity = current
            .replenished_quantity()
            .ok_or_else(|| AdminError::NotReplenishable(id.clone()))?;
        let updated = self.products.set_stock(id, quantity).await?;
        info!(from = current.quantity, to = updated.quantity, "Stock replenished");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::app_system::{AppConfig, StorefrontSystem};
    use crate::catalog::AvailabilityFilter;
    use serde_json::json;
    use std::sync::Arc;

    async fn system() -> (StorefrontSystem, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let mut rows = vec![
            json!({"id": "1", "title": "Plain Tee", "price": 15, "quantity": 90, "isAvailable": true, "type": "t-shirt"}),
            json!({"id": "2", "title": "Chinos", "price": 45, "quantity": 4, "isAvailable": false, "type": "trousers"}),
            json!({"id": "3", "title": "Mystery", "price": 5, "quantity": 0, "isAvailable": false}),
        ];
        for n in 4..=12 {
            rows.push(json!({"id": n.to_string(), "title": format!("Tee {n}"), "price": 10, "quantity": 20, "isAvailable": true, "type": "t-shirt"}));
        }
        backend.seed("products", rows).await;
        let system = StorefrontSystem::with_backend(&AppConfig::default(), backend.clone());
        (system, backend)
    }

    #[tokio::test]
    async fn test_load_filters_then_pages() {
        let (system, _) = system().await;
        let admin = system.product_admin();

        let first = admin.load(&ProductFilter::default(), 1).await.unwrap();
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.total_pages, 2);
        assert_eq!(admin.load(&ProductFilter::default(), 2).await.unwrap().items.len(), 4);

        let unavailable = ProductFilter::default().availability(AvailabilityFilter::OutOfStock);
        let page = admin.load(&unavailable, 1).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
        assert_eq!(page.total_pages, 1);

        let available = ProductFilter::default().availability(AvailabilityFilter::Available);
        assert_eq!(admin.load(&available, 2).await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn test_save_edit_derives_availability() {
        let (system, backend) = system().await;
        let admin = system.product_admin();
        let mut session = EditSession::new();

        let mut row = system.product_client.get_product("2".into()).await.unwrap();
        row.quantity = 30;
        row.title = "Slim Chinos".into();
        session.begin(row.id.clone(), row);

        let saved = admin.save_edit(&mut session).await.unwrap();
        assert_eq!(saved.title, "Slim Chinos");
        assert!(saved.is_available);
        assert!(session.draft().is_none());
        assert_eq!(backend.row("products", "2").await.unwrap()["isAvailable"], true);

        assert_eq!(admin.save_edit(&mut session).await, Err(AdminError::NotEditing));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let (system, backend) = system().await;
        let admin = system.product_admin();
        let mut session = EditSession::new();
        session.begin("1", Product::new("1", "Plain Tee", 15.0, 0));
        backend.fail_next("PUT", "products/1").await;

        assert!(admin.save_edit(&mut session).await.is_err());
        assert!(session.is_editing("1"));
    }

    #[tokio::test]
    async fn test_toggle_flips_only_the_flag() {
        let (system, backend) = system().await;
        let admin = system.product_admin();

        let updated = admin.toggle_availability("1".into()).await.unwrap();
        assert!(!updated.is_available);
        assert_eq!(updated.quantity, 90);
        let calls = backend.calls().await;
        let put = calls.iter().find(|c| c.method == "PUT").unwrap();
        assert_eq!(put.body, Some(json!({"isAvailable": false})));
    }

    #[tokio::test]
    async fn test_replenish_steps_and_cap() {
        let (system, _) = system().await;
        let admin = system.product_admin();

        assert_eq!(admin.replenish("1".into()).await.unwrap().quantity, 100);
        assert_eq!(admin.replenish("2".into()).await.unwrap().quantity, 19);
        assert_eq!(
            admin.replenish("3".into()).await,
            Err(AdminError::NotReplenishable("3".into()))
        );

        let trousers = admin.stock_overview(Some(ProductType::Trousers)).await.unwrap();
        assert_eq!(trousers.len(), 1);
        assert_eq!(trousers[0].quantity, 19);
    }

    #[tokio::test]
    async fn test_add_and_delete() {
        let (system, backend) = system().await;
        let admin = system.product_admin();
        admin.load(&ProductFilter::default(), 1).await.unwrap();

        let created = admin
            .add(ProductCreate::new("Linen Trousers", "Beige", 60.0, 0, Some(ProductType::Trousers)))
            .await
            .unwrap();
        assert!(!created.is_available);
        assert_eq!(backend.row("products", &created.id).await.unwrap()["isAvailable"], false);

        admin.delete(created.id.clone()).await.unwrap();
        let all = admin.resync().await.unwrap();
        assert!(all.iter().all(|p| p.id != created.id));
        assert_eq!(all.len(), 12);
    }
}
