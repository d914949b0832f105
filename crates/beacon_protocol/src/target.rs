//! Target descriptors from the signed targets manifest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// The hash algorithm used for content validation.
pub const SHA256: &str = "sha256";

/// One entry from the signed targets manifest.
///
/// Describes the expected content of a single configuration artifact:
/// declared byte length, a table of hash digests keyed by algorithm name,
/// and an opaque `custom` blob the backend attaches (for example a semantic
/// version counter under `"v"`). Descriptors are produced fresh on every
/// sync and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Declared content length in bytes.
    pub length: u64,
    /// Hash algorithm name to lowercase hex digest.
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
    /// Opaque backend-attached metadata, passed through unmodified.
    #[serde(default)]
    pub custom: Value,
}

impl TargetDescriptor {
    /// Returns the declared digest for `algorithm`, if present.
    #[must_use]
    pub fn digest(&self, algorithm: &str) -> Option<&str> {
        self.hashes.get(algorithm).map(String::as_str)
    }

    /// Returns the declared SHA-256 digest, if present.
    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        self.digest(SHA256)
    }

    /// Returns the backend's informational version counter (`custom.v`).
    ///
    /// Informational only: the diff engine keys on content hashes, never on
    /// this value.
    #[must_use]
    pub fn declared_version(&self) -> Option<u64> {
        self.custom.get("v").and_then(Value::as_u64)
    }

    /// Checks `content` against the declared SHA-256 digest.
    ///
    /// A descriptor without a SHA-256 digest never validates content:
    /// digests under unsupported algorithms cannot be checked, so their
    /// content is treated as undeliverable.
    #[must_use]
    pub fn verifies(&self, content: &[u8]) -> bool {
        match self.sha256() {
            Some(expected) => sha256_hex(content).eq_ignore_ascii_case(expected),
            None => false,
        }
    }
}

/// Computes the lowercase hex SHA-256 digest of `content`.
#[must_use]
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
