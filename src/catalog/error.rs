use thiserror::Error;

/// Errors raised while talking to the catalog API.
///
/// These never escape a conversation turn; the tool executor renders them
/// into `{"error": ...}` payloads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network failure or non-success status
    #[error("{0}")]
    Transport(String),

    /// The server refused the request (already requested, unknown id, ...)
    #[error("Request failed: {0}")]
    RequestRejected(String),

    /// Arguments failed validation before any call was made
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// The server answered with a body we could not decode
    #[error("Unexpected catalog response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Transport("Catalog request timed out".to_string())
        } else if err.is_connect() {
            CatalogError::Transport(format!("Connection error: {}", err))
        } else if err.is_decode() {
            CatalogError::Parse(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
