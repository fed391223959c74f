//! EFA client error types.

use std::fmt;

/// Errors from the EFA HTTP client.
#[derive(Debug)]
pub enum EfaError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Response parsed but could not be converted to domain types
    InvalidResponse(String),
}

impl fmt::Display for EfaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EfaError::Http(e) => write!(f, "HTTP error: {e}"),
            EfaError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            EfaError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            EfaError::RateLimited => write!(f, "rate limited by EFA API"),
            EfaError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for EfaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EfaError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EfaError {
    fn from(err: reqwest::Error) -> Self {
        EfaError::Http(err)
    }
}
