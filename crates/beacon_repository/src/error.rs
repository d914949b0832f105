//! Error types for the repository.

use beacon_protocol::ConfigPath;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A transaction is already open against this repository.
    ///
    /// Signals a scheduling bug upstream: at most one sync cycle may run
    /// per repository at a time.
    #[error("another transaction is already open against this repository")]
    TransactionInProgress,

    /// A path was staged more than once within one transaction.
    #[error("path '{path}' is already staged in this transaction")]
    PathAlreadyStaged {
        /// The path staged twice.
        path: ConfigPath,
    },

    /// A staged entry's content does not match its descriptor.
    #[error("invalid content entry for path '{path}': content does not match its descriptor")]
    InvalidEntry {
        /// The path whose entry failed validation.
        path: ConfigPath,
    },

    /// A staged operation is inconsistent with the repository state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// The staged targets version would move the repository backwards.
    #[error("targets version regression: current {current}, proposed {proposed}")]
    VersionRegression {
        /// The repository's current version.
        current: u64,
        /// The version the transaction tried to install.
        proposed: u64,
    },
}

impl RepositoryError {
    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
