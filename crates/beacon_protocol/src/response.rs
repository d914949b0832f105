//! Transport-facing response shapes.
//!
//! The transport collaborator performs the HTTP exchange and hands back a
//! [`ConfigResponse`]; base64-bearing fields stay as wire strings until the
//! decoder runs.

use crate::decode::DecodeError;
use serde::{Deserialize, Serialize};

/// One delivered target file, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFile {
    /// Config path the file belongs to, as a wire string.
    pub path: String,
    /// Base64-encoded raw content.
    pub raw: String,
}

/// The decoded JSON body of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// Base64-encoded root metadata blobs, oldest first.
    #[serde(default)]
    pub roots: Vec<String>,
    /// Base64-encoded signed targets manifest.
    #[serde(default)]
    pub targets: Option<String>,
    /// Delivered target files.
    #[serde(default)]
    pub target_files: Vec<TargetFile>,
    /// Paths the backend currently wants applied (the active set).
    #[serde(default)]
    pub client_configs: Vec<String>,
}

impl ResponsePayload {
    /// Parses a response payload from a JSON body.
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::Json`] when the body is not valid JSON of
    /// the expected shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(|source| DecodeError::json("response body", source))
    }
}

/// The transport's view of one fetch exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Parsed body; present only when the exchange produced one.
    pub payload: Option<ResponsePayload>,
}

impl ConfigResponse {
    /// Creates a successful response carrying `payload`.
    #[must_use]
    pub fn ok(payload: ResponsePayload) -> Self {
        Self {
            status: 200,
            payload: Some(payload),
        }
    }

    /// Creates a failed response with `status` and no body.
    #[must_use]
    pub fn error(status: u16) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_body() {
        let body = json!({
            "roots": ["cm9vdA=="],
            "targets": "dGFyZ2V0cw==",
            "target_files": [
                { "path": "datadog/2/ASM/rules/config", "raw": "e30=" }
            ],
            "client_configs": ["datadog/2/ASM/rules/config"]
        })
        .to_string();
        let payload = ResponsePayload::from_json(body.as_bytes()).unwrap();
        assert_eq!(payload.roots.len(), 1);
        assert_eq!(payload.targets.as_deref(), Some("dGFyZ2V0cw=="));
        assert_eq!(payload.target_files.len(), 1);
        assert_eq!(payload.client_configs.len(), 1);
    }

    #[test]
    fn missing_fields_default_empty() {
        let payload = ResponsePayload::from_json(b"{}").unwrap();
        assert!(payload.roots.is_empty());
        assert!(payload.targets.is_none());
        assert!(payload.target_files.is_empty());
        assert!(payload.client_configs.is_empty());
    }

    #[test]
    fn malformed_body_is_rejected() {
        let err = ResponsePayload::from_json(b"[1, 2").unwrap_err();
        assert!(matches!(err, DecodeError::Json { .. }));
    }

    #[test]
    fn status_classification() {
        assert!(ConfigResponse::ok(ResponsePayload::default()).is_success());
        assert!(!ConfigResponse::error(401).is_success());
        assert!(!ConfigResponse::error(500).is_success());
    }
}
