//! REST transport for the hosted storefront API.
//!
//! Everything above this module speaks in terms of collection paths
//! (`products`, `orders/12`) and JSON values; the cache actors decode those
//! into domain records.

mod error;
pub mod http;
#[cfg(test)]
pub mod fake;

pub use error::ApiError;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde_json::Value;

/// The verbs the storefront issues against its single REST host.
///
/// Paths are relative to the configured base URL and never carry query
/// parameters: all filtering and paging happen client-side.
#[async_trait]
pub trait RestBackend: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, path: &str) -> Result<Value, ApiError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError>;

    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError>;

    async fn delete(&self, path: &str) -> Result<(), ApiError>;
}
