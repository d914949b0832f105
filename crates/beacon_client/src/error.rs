//! Error taxonomy surfaced by the client.

use crate::transport::TransportError;
use crate::verify::VerificationError;
use beacon_protocol::{ConfigPath, DecodeError, ParseError};
use beacon_repository::RepositoryError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a sync cycle.
///
/// Every variant leaves the repository untouched: the cycle fails closed,
/// preferring stale-but-consistent state over partially-applied state.
/// None of these are retried internally; retry and backoff belong to the
/// external scheduler.
///
/// Path-structure failures stay distinct from sync-level failures: a
/// malformed path anywhere in the response surfaces as [`SyncError::Path`],
/// never wrapped inside [`SyncError::Decode`], so callers can branch on it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The transport returned a non-success status.
    #[error("sync failed: unexpected response status {status}")]
    Status {
        /// The HTTP-style status code.
        status: u16,
    },

    /// The transport exchange itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The active set names a path with no descriptor in the manifest.
    #[error("no target for path '{path}'")]
    MissingTarget {
        /// The active path without a descriptor.
        path: ConfigPath,
    },

    /// The active set names a path with no validated content delivered.
    #[error("no valid content for target at path '{path}'")]
    MissingContent {
        /// The active path without usable content.
        path: ConfigPath,
    },

    /// A path string in the response is structurally invalid.
    #[error(transparent)]
    Path(ParseError),

    /// The response encoding or manifest structure is malformed.
    #[error(transparent)]
    Decode(DecodeError),

    /// The external verifier rejected the manifest.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The repository rejected the staged transaction.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ParseError> for SyncError {
    fn from(err: ParseError) -> Self {
        Self::Path(err)
    }
}

impl From<DecodeError> for SyncError {
    fn from(err: DecodeError) -> Self {
        // Path-structure errors are re-surfaced unwrapped.
        match err {
            DecodeError::Path(parse) => Self::Path(parse),
            other => Self::Decode(other),
        }
    }
}
