//! Crate-wide error taxonomy
//!
//! Every failure here is fatal to the run: a partially merged dataset must
//! never reach the bulk loader, so there is no per-record skip-and-continue.

use crate::model::{MergeError, ValidationError};
use thiserror::Error;

/// Errors that can occur while building import files
#[derive(Debug, Error)]
pub enum ImportError {
    /// Malformed path template or missing parent directory, detected
    /// before any processing work is done.
    #[error("configuration error: {0}")]
    Config(String),

    /// Two records sharing an identity disagree on a single-valued attribute.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// A merged entity is missing a required attribute.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed raw record from an input front-end.
    #[error("input format error at {location}: {message}")]
    InputFormat { location: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    /// Build an [`ImportError::InputFormat`] for a record at a known location.
    pub fn input_format(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputFormat {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
