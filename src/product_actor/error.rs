use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product request failed: {0}")]
    RequestFailed(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::Api(e) if e.is_not_found() => ProductError::NotFound(e.to_string()),
            FrameworkError::Api(e) => ProductError::RequestFailed(e.to_string()),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
