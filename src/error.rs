//! Memopad error types

use thiserror::Error;

/// Memopad error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing input, including content too short for generation
    #[error("{0}")]
    Validation(String),

    /// Unknown memo id
    #[error("{0}")]
    NotFound(String),

    /// Configuration error (e.g. missing generation credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream generation call failed or produced unusable output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A memopad server answered with an error status the client cannot map
    #[error("Server returned {status}: {message}")]
    Remote { status: u16, message: String },
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl Error {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Generation(_) => "GENERATION_FAILED",
            Self::Store(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Http(_)
            | Self::Remote { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for Memopad operations
pub type Result<T> = std::result::Result<T, Error>;
