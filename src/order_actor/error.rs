use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order request failed: {0}")]
    RequestFailed(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::Api(e) if e.is_not_found() => OrderError::NotFound(e.to_string()),
            FrameworkError::Api(e) => OrderError::RequestFailed(e.to_string()),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
