use thiserror::Error;

/// A failed request against the REST host.
///
/// Views collapse every variant into a single "Error loading ..." state; the
/// detail is kept for logs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Invalid request body: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
