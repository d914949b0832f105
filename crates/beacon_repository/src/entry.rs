//! Applied content entries.

use beacon_protocol::{sha256_hex, TargetDescriptor};
use bytes::Bytes;

/// The applied state for one path inside the repository.
///
/// Holds the raw content bytes, the descriptor the content was validated
/// against, and fields denormalized at construction time for cheap diffing:
/// the hex SHA-256 of the content and the backend's informational version
/// counter. Entries are created on insert, replaced wholesale on update and
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    content: Bytes,
    descriptor: TargetDescriptor,
    sha256: String,
    declared_version: Option<u64>,
}

impl ContentEntry {
    /// Creates an entry from validated content and its descriptor.
    ///
    /// The content digest is computed here once; diffing later compares
    /// stored digests only.
    #[must_use]
    pub fn new(content: Bytes, descriptor: TargetDescriptor) -> Self {
        let sha256 = sha256_hex(&content);
        let declared_version = descriptor.declared_version();
        Self {
            content,
            descriptor,
            sha256,
            declared_version,
        }
    }

    /// Returns the content bytes.
    #[must_use]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Returns the descriptor the content was validated against.
    #[must_use]
    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.descriptor
    }

    /// Returns the hex SHA-256 digest of the content.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Returns the backend's informational version counter, if declared.
    #[must_use]
    pub fn declared_version(&self) -> Option<u64> {
        self.declared_version
    }

    /// Re-checks that the content still matches its descriptor.
    ///
    /// Used by commit to reject structurally invalid entries before any
    /// part of a transaction is applied.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.descriptor.verifies(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor_for(content: &[u8], version: u64) -> TargetDescriptor {
        serde_json::from_value(json!({
            "length": content.len(),
            "hashes": { "sha256": sha256_hex(content) },
            "custom": { "v": version }
        }))
        .unwrap()
    }

    #[test]
    fn denormalizes_digest_and_version() {
        let content = Bytes::from_static(b"{\"exclusions\":[]}");
        let entry = ContentEntry::new(content.clone(), descriptor_for(&content, 21));
        assert_eq!(entry.sha256(), sha256_hex(&content));
        assert_eq!(entry.declared_version(), Some(21));
        assert!(entry.is_consistent());
    }

    #[test]
    fn detects_descriptor_mismatch() {
        let entry = ContentEntry::new(
            Bytes::from_static(b"delivered"),
            descriptor_for(b"declared", 1),
        );
        assert!(!entry.is_consistent());
    }
}
