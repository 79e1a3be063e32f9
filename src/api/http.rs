use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{ApiError, RestBackend};

/// `reqwest`-backed transport for the hosted mock API.
///
/// No retries and no timeout beyond the client defaults: a failure is
/// reported once and the caller decides whether to resync.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), path, "Request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn send_json(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let response = self.send(method, path, body).await?;
        response.json::<Value>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RestBackend for HttpBackend {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self))]
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        debug!("GET");
        self.send_json(Method::GET, path, None).await
    }

    #[instrument(skip(self, body))]
    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        debug!("POST");
        self.send_json(Method::POST, path, Some(body)).await
    }

    #[instrument(skip(self, body))]
    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        debug!("PUT");
        self.send_json(Method::PUT, path, Some(body)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!("DELETE");
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}
