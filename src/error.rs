// Error handling module
// Defines the error types surfaced by the token provider

use thiserror::Error;

/// Errors that can occur while constructing a provider or obtaining a token
#[derive(Error, Debug)]
pub enum TokenError {
    /// Missing or invalid construction parameter
    #[error("missing {0} parameter")]
    Config(&'static str),

    /// Underlying HTTP call failed (network/DNS/TLS)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token endpoint rejected the refresh with a non-200 response.
    /// `message` is the endpoint's `error` field when the response was JSON,
    /// otherwise a generic message with the raw body kept for diagnostics.
    #[error("{message}")]
    AuthServer {
        message: String,
        response_body: Option<String>,
    },

    /// Token endpoint returned a body that could not be parsed
    #[error("malformed token response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Result type alias for token operations
pub type Result<T> = std::result::Result<T, TokenError>;
