//! Error types for decimesh

use thiserror::Error;

/// Main error type for decimesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for decimesh operations
pub type Result<T> = std::result::Result<T, Error>;
