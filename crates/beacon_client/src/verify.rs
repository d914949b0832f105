//! Seam for the externally supplied signature verification capability.

use beacon_protocol::{RootMetadata, TargetsManifest};
use thiserror::Error;

/// Signature or trust failure reported by the verifier.
///
/// Always fatal to the sync cycle; the client never bypasses it.
#[derive(Debug, Error)]
#[error("manifest verification failed: {message}")]
pub struct VerificationError {
    message: String,
}

impl VerificationError {
    /// Creates a verification error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Verifies decoded root/targets metadata before the client trusts it.
///
/// The signature and threshold algorithm itself lives outside this crate;
/// implementations wrap whatever trust machinery the embedding process
/// provides.
pub trait ManifestVerifier: Send + Sync {
    /// Checks the decoded metadata against the trusted root keys.
    ///
    /// # Errors
    ///
    /// Returns a [`VerificationError`] on any signature or trust failure.
    fn verify(
        &self,
        roots: &[RootMetadata],
        targets: &TargetsManifest,
    ) -> Result<(), VerificationError>;
}

/// A verifier that accepts every manifest.
///
/// For tests, and for deployments where verification already happened
/// upstream of this client (for example in a local agent).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVerifier;

impl ManifestVerifier for NoopVerifier {
    fn verify(
        &self,
        _roots: &[RootMetadata],
        _targets: &TargetsManifest,
    ) -> Result<(), VerificationError> {
        Ok(())
    }
}
