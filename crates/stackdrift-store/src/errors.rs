//! Error handling for stackdrift-store
//!
//! Wraps stackdrift-core ExError with store-specific helpers

use stackdrift_core::errors::{ExError, ExErrorKind};

pub use stackdrift_core::errors::io_error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an error for a document name that would escape its directory
pub fn invalid_document_name(name: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("write_canonical")
        .with_message(format!("Invalid output document name: {:?}", name))
}
