use thiserror::Error;

/// Failure modes of a catalog request.
///
/// `Clone` so a failure can travel inside published list state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No connectivity, timeout, or the request could not be sent
    #[error("Network error: {0}")]
    Transport(String),

    /// Base URL or endpoint could not be turned into a request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Server answered with a non-success status
    #[error("Unexpected response (status: {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response body was empty")]
    EmptyBody,

    /// Response did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CatalogError::Transport(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            CatalogError::Transport(format!("Connection failed: {}", error))
        } else if error.is_builder() {
            CatalogError::InvalidUrl(error.to_string())
        } else if error.is_decode() {
            CatalogError::Decode(error.to_string())
        } else {
            CatalogError::Transport(error.to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        CatalogError::Status { status, body }
    }
}
