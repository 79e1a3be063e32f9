//! Product resource: entity binding, errors and actor construction.

pub mod entity;
pub mod error;

pub use error::*;

use std::sync::Arc;

use crate::actor_framework::ResourceActor;
use crate::api::RestBackend;
use crate::clients::ProductClient;
use crate::domain::Product;

/// Creates a new Product cache actor and its client.
pub fn new(buffer_size: usize, backend: Arc<dyn RestBackend>) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, backend);
    (actor, ProductClient::new(generic_client))
}
