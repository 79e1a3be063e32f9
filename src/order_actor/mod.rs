//! Order resource: entity binding, errors and actor construction.

pub mod entity;
pub mod error;

pub use error::*;

use std::sync::Arc;

use crate::actor_framework::ResourceActor;
use crate::api::RestBackend;
use crate::clients::OrderClient;
use crate::domain::Order;

/// Creates a new Order cache actor and its client.
pub fn new(buffer_size: usize, backend: Arc<dyn RestBackend>) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, backend);
    (actor, OrderClient::new(generic_client))
}
