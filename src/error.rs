//! Error types for the chat front-end.

use thiserror::Error;

/// Chat front-end error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (transport or body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid backend URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// Local I/O failure (cookie file, terminal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for chat front-end operations.
pub type Result<T> = std::result::Result<T, Error>;
