use thiserror::Error;

/// Message recorded when the upstream reports quota exhaustion
pub const RATE_LIMIT_MESSAGE: &str = "API Limit Reached";

/// Message recorded when a failure carries no usable text
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch images";

/// Classified outcome of a failed page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// Upstream rejected the request with 403: the hourly quota is spent
  #[error("API Limit Reached")]
  QuotaExhausted,

  /// Any other HTTP status, transport failure or undecodable payload
  #[error("{0}")]
  Other(String),
}

impl FetchError {
  pub fn other(message: impl Into<String>) -> Self {
    FetchError::Other(message.into())
  }

  /// Text suitable for showing the user
  pub fn user_message(&self) -> String {
    match self {
      FetchError::QuotaExhausted => RATE_LIMIT_MESSAGE.to_string(),
      FetchError::Other(msg) if msg.trim().is_empty() => GENERIC_FAILURE_MESSAGE.to_string(),
      FetchError::Other(msg) => msg.clone(),
    }
  }
}
