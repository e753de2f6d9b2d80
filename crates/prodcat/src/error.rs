//! Database error types.

use thiserror::Error;

use prodcat_core::ValidationError;

/// Database errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the store or a save hook.
    #[error(transparent)]
    Core(#[from] prodcat_core::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The validation failure, if a save was rejected.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Core(prodcat_core::Error::Validation(e)) => Some(e),
            _ => None,
        }
    }
}
