//! Signed metadata envelopes: roots and the targets manifest.
//!
//! The decoder produces these as typed structures with strict parse-time
//! validation; key and role tables inside root metadata stay opaque JSON,
//! since only the external signature verifier consumes them.

use crate::decode::DecodeError;
use crate::path::ConfigPath;
use crate::target::TargetDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One signature over a signed metadata body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Identifier of the signing key.
    pub keyid: String,
    /// The signature bytes, hex-encoded.
    pub sig: String,
}

/// A root metadata envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootMetadata {
    /// Signatures over the signed body.
    #[serde(default)]
    pub signatures: Vec<Signature>,
    /// The signed body.
    pub signed: RootSigned,
}

/// The signed body of a root metadata blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSigned {
    /// Metadata type declared by the body; always `root`.
    #[serde(rename = "_type")]
    pub metadata_type: String,
    /// Root metadata version.
    pub version: u64,
    /// Expiry timestamp, RFC 3339.
    #[serde(default)]
    pub expires: Option<String>,
    /// Whether snapshots are consistent.
    #[serde(default)]
    pub consistent_snapshot: bool,
    /// Key table, kept opaque for the external verifier.
    #[serde(default)]
    pub keys: Value,
    /// Role table, kept opaque for the external verifier.
    #[serde(default)]
    pub roles: Value,
    /// Declared spec version.
    #[serde(default)]
    pub spec_version: Option<String>,
}

impl RootMetadata {
    /// Parses a root metadata envelope from its JSON body.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::Json`] on malformed JSON and
    /// [`DecodeError::UnexpectedMetadataType`] when the body is not typed
    /// `root`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        let metadata: Self =
            serde_json::from_slice(bytes).map_err(|source| DecodeError::json("roots", source))?;
        if metadata.signed.metadata_type != "root" {
            return Err(DecodeError::UnexpectedMetadataType {
                expected: "root",
                found: metadata.signed.metadata_type,
            });
        }
        Ok(metadata)
    }
}

/// Backend-attached fields on the signed targets body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetsCustom {
    /// Opaque resumption cursor, echoed back to the backend on the next
    /// fetch and meaningless to the client beyond pass-through.
    #[serde(default)]
    pub opaque_backend_state: Option<String>,
    /// Poll interval suggested by the backend, in seconds. The scheduling
    /// loop lives outside this crate; the value is surfaced untouched.
    #[serde(default)]
    pub agent_refresh_interval: Option<u64>,
}

/// The signed body of the targets manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetsSigned {
    /// Manifest version declared by the backend.
    pub version: u64,
    /// Expiry timestamp, RFC 3339.
    pub expires: Option<String>,
    /// Declared spec version.
    pub spec_version: Option<String>,
    /// Backend-attached fields.
    pub custom: TargetsCustom,
    /// Target descriptors keyed by config path.
    pub targets: HashMap<ConfigPath, TargetDescriptor>,
}

/// The targets manifest envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetsManifest {
    /// Signatures over the signed body.
    pub signatures: Vec<Signature>,
    /// The signed body.
    pub signed: TargetsSigned,
}

#[derive(Deserialize)]
struct TargetsSignedRaw {
    #[serde(rename = "_type")]
    metadata_type: String,
    version: u64,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    spec_version: Option<String>,
    #[serde(default)]
    custom: TargetsCustom,
    #[serde(default)]
    targets: BTreeMap<String, TargetDescriptor>,
}

#[derive(Deserialize)]
struct TargetsManifestRaw {
    #[serde(default)]
    signatures: Vec<Signature>,
    signed: TargetsSignedRaw,
}

impl TargetsManifest {
    /// Parses the targets manifest from its JSON body.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::Json`] on malformed JSON,
    /// [`DecodeError::UnexpectedMetadataType`] when the body is not typed
    /// `targets`, and a [`ParseError`](crate::ParseError) (transparent)
    /// when any target key is not a structurally valid config path.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: TargetsManifestRaw =
            serde_json::from_slice(bytes).map_err(|source| DecodeError::json("targets", source))?;
        if raw.signed.metadata_type != "targets" {
            return Err(DecodeError::UnexpectedMetadataType {
                expected: "targets",
                found: raw.signed.metadata_type,
            });
        }

        let mut targets = HashMap::with_capacity(raw.signed.targets.len());
        for (key, descriptor) in raw.signed.targets {
            let path = ConfigPath::parse(&key)?;
            targets.insert(path, descriptor);
        }

        Ok(Self {
            signatures: raw.signatures,
            signed: TargetsSigned {
                version: raw.signed.version,
                expires: raw.signed.expires,
                spec_version: raw.signed.spec_version,
                custom: raw.signed.custom,
                targets,
            },
        })
    }

    /// Returns the descriptor for `path`, if the manifest declares one.
    #[must_use]
    pub fn target(&self, path: &ConfigPath) -> Option<&TargetDescriptor> {
        self.signed.targets.get(path)
    }

    /// Returns the manifest version declared by the backend.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.signed.version
    }

    /// Returns the opaque backend state declared by the manifest.
    #[must_use]
    pub fn opaque_backend_state(&self) -> Option<&str> {
        self.signed.custom.opaque_backend_state.as_deref()
    }
}
