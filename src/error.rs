//! Framework-level error taxonomy
//!
//! Only framework errors (and unrecovered commit errors, wrapped as
//! framework errors) cross the command boundary. Indexing and
//! post-processing faults are contained and logged where they happen.

use crate::graph::StoreError;
use thiserror::Error;

/// Recoverable application-level failure surfaced to command callers
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// Validation of a property write failed
    #[error("validation of {key} on {type_name} failed: {reason}")]
    Validation {
        type_name: String,
        key: String,
        reason: String,
    },

    /// The underlying store rejected an operation
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Free-form domain failure raised by a unit of work or hook
    #[error("{0}")]
    Domain(String),
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;

impl FrameworkError {
    pub fn domain(message: impl Into<String>) -> Self {
        FrameworkError::Domain(message.into())
    }

    /// True when the underlying cause is a store-detected deadlock
    pub fn is_deadlock(&self) -> bool {
        matches!(self, FrameworkError::Store(e) if e.is_deadlock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_detection() {
        let err = FrameworkError::Store(StoreError::DeadlockDetected(100));
        assert!(err.is_deadlock());

        let err = FrameworkError::domain("boom");
        assert!(!err.is_deadlock());
    }

    #[test]
    fn test_display() {
        let err = FrameworkError::Validation {
            type_name: "Page".to_string(),
            key: "uuid".to_string(),
            reason: "already taken".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "validation of uuid on Page failed: already taken"
        );
    }
}
