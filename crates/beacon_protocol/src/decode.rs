//! Decoding of a transport response into typed, hash-validated data.

use crate::metadata::{RootMetadata, TargetsManifest};
use crate::path::{ConfigPath, ParseError};
use crate::response::ResponsePayload;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Errors produced while decoding a transport response.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A base64 field could not be decoded.
    #[error("invalid base64 in {field}: {source}")]
    Base64 {
        /// The response field that failed to decode.
        field: &'static str,
        /// The underlying base64 error.
        #[source]
        source: base64::DecodeError,
    },

    /// A JSON body could not be parsed into the expected shape.
    #[error("malformed {field}: {source}")]
    Json {
        /// The response field that failed to parse.
        field: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A required field is absent from the response.
    #[error("missing {field} in response")]
    MissingField {
        /// The absent field.
        field: &'static str,
    },

    /// A signed metadata body declares an unexpected `_type`.
    #[error("unexpected metadata type: expected '{expected}', found '{found}'")]
    UnexpectedMetadataType {
        /// The type the decoder required.
        expected: &'static str,
        /// The type the body declared.
        found: String,
    },

    /// A path in the manifest is structurally invalid.
    ///
    /// Kept transparent so callers can branch on path-structure failures
    /// separately from decode-level failures.
    #[error(transparent)]
    Path(#[from] ParseError),
}

impl DecodeError {
    pub(crate) fn base64(field: &'static str, source: base64::DecodeError) -> Self {
        Self::Base64 { field, source }
    }

    pub(crate) fn json(field: &'static str, source: serde_json::Error) -> Self {
        Self::Json { field, source }
    }
}

/// A fully decoded manifest response.
#[derive(Debug, Clone)]
pub struct DecodedManifest {
    /// Decoded root metadata blobs, in delivery order.
    pub roots: Vec<RootMetadata>,
    /// The decoded targets manifest.
    pub targets: TargetsManifest,
    /// Validated content bytes keyed by path.
    ///
    /// A delivered file whose digest does not match its descriptor, or that
    /// has no descriptor with a checkable digest, is dropped here as if it
    /// had never been delivered.
    pub contents: HashMap<ConfigPath, Bytes>,
}

impl DecodedManifest {
    /// Returns the validated content for `path`, if any.
    #[must_use]
    pub fn content(&self, path: &ConfigPath) -> Option<&Bytes> {
        self.contents.get(path)
    }
}

/// Decodes a response payload into typed roots, targets and content.
///
/// Signature validity of the decoded metadata is not checked here; the
/// client invokes the external verification capability before trusting the
/// result.
///
/// # Errors
///
/// Fails with [`DecodeError`] on malformed base64 or JSON, and with a
/// transparent [`ParseError`] when any path string in the manifest or the
/// delivered files is structurally invalid. Hash mismatches are not errors:
/// the affected content is simply absent from the result.
pub fn decode(payload: &ResponsePayload) -> Result<DecodedManifest, DecodeError> {
    let mut roots = Vec::with_capacity(payload.roots.len());
    for blob in &payload.roots {
        let bytes = BASE64
            .decode(blob)
            .map_err(|source| DecodeError::base64("roots", source))?;
        roots.push(RootMetadata::from_json(&bytes)?);
    }

    let targets_blob = payload
        .targets
        .as_deref()
        .ok_or(DecodeError::MissingField { field: "targets" })?;
    let targets_bytes = BASE64
        .decode(targets_blob)
        .map_err(|source| DecodeError::base64("targets", source))?;
    let targets = TargetsManifest::from_json(&targets_bytes)?;

    let mut contents = HashMap::with_capacity(payload.target_files.len());
    for file in &payload.target_files {
        let path = ConfigPath::parse(&file.path)?;
        let raw = BASE64
            .decode(&file.raw)
            .map_err(|source| DecodeError::base64("target_files", source))?;
        let validated = targets
            .target(&path)
            .is_some_and(|descriptor| descriptor.verifies(&raw));
        if validated {
            contents.insert(path, Bytes::from(raw));
        }
    }

    Ok(DecodedManifest {
        roots,
        targets,
        contents,
    })
}
