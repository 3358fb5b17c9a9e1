//! Error types for nekos-dl
//!
//! Every failure the poller can hit is one [`Error`]. Inside a polling pass
//! the variant only matters for reporting: [`Error::kind`] folds it into one
//! of the three [`FailureKind`]s, and the pass is abandoned either way.

use crate::types::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nekos-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nekos-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_base")
        key: Option<String>,
    },

    /// I/O error (tag directories, image files, tag file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Path {
        /// The file or directory being touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error {status} fetching {url}")]
    HttpStatus {
        /// The URL that was requested
        url: String,
        /// Status returned by the server
        status: reqwest::StatusCode,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resolve response parsed but had no string `url` field
    #[error("response from {endpoint} has no string `url` field")]
    MissingUrl {
        /// The resolve endpoint that was queried
        endpoint: String,
    },

    /// Resolved image URL has nothing after its last `/`
    #[error("image URL has no file name: {0}")]
    InvalidImageUrl(String),
}

impl Error {
    /// Shorthand for a configuration error on a named key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Classify the error into the kind reported for a failed pass
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Io(_) | Error::Path { .. } => FailureKind::Filesystem,
            // A URL the client refuses to build a request for came from the API
            Error::Network(e) if e.is_builder() || e.is_decode() => FailureKind::Api,
            Error::Network(_) | Error::HttpStatus { .. } => FailureKind::Network,
            Error::Serialization(_)
            | Error::MissingUrl { .. }
            | Error::InvalidImageUrl(_)
            | Error::Config { .. } => FailureKind::Api,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Config {
            message: format!("invalid URL: {e}"),
            key: None,
        }
    }
}
