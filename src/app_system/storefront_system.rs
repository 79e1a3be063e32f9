use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::AppConfig;
use crate::actor_framework::spawn_polling;
use crate::admin::{OrderAdmin, ProductAdmin};
use crate::api::{ApiError, HttpBackend, RestBackend};
use crate::catalog::Paginator;
use crate::checkout::CheckoutService;
use crate::clients::{OrderClient, ProductClient};
use crate::{order_actor, product_actor};

/// The running application: one cache actor per collection, plus the
/// product list poller.
///
/// Responsible for starting the actors, handing out the services built on
/// their clients, and shutting everything down.
pub struct StorefrontSystem {
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    paginator: Paginator,
    poller: Option<JoinHandle<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(&config.api_url)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: &AppConfig, backend: Arc<dyn RestBackend>) -> Self {
        info!(backend = backend.backend_tag(), "Starting storefront system");

        // 1. Product cache
        let (product_actor, product_client) = product_actor::new(config.channel_buffer, Arc::clone(&backend));
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Order cache
        let (order_actor, order_client) = order_actor::new(config.channel_buffer, backend);
        let order_handle = tokio::spawn(order_actor.run());

        Self {
            product_client,
            order_client,
            paginator: Paginator::new(config.page_size),
            poller: None,
            handles: vec![product_handle, order_handle],
        }
    }

    /// Refetches the product list every `config.poll_interval`.
    pub fn start_polling(&mut self, config: &AppConfig) {
        if self.poller.is_none() {
            let client = self.product_client.resource().clone();
            self.poller = Some(spawn_polling(client, config.poll_interval));
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.product_client.clone(), self.order_client.clone())
    }

    pub fn product_admin(&self) -> ProductAdmin {
        ProductAdmin::new(self.product_client.clone(), self.paginator)
    }

    pub fn order_admin(&self) -> OrderAdmin {
        OrderAdmin::new(self.order_client.clone(), self.product_client.clone(), self.paginator)
    }

    /// Stops the poller, drops this system's clients and waits for the actors
    /// to drain. Services handed out earlier hold clients too and must be
    /// dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storefront system...");

        if let Some(poller) = self.poller {
            poller.abort();
        }
        drop(self.product_client);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Storefront system shutdown complete.");
        Ok(())
    }
}
