//! Response fixtures.
//!
//! [`ResponseFixture`] builds transport responses whose base64 blobs,
//! digests and lengths are mutually consistent, so tests describe scenarios
//! instead of hand-encoding manifests. Mutation helpers deliberately break
//! one aspect at a time to exercise each failure path.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use beacon_protocol::{sha256_hex, ConfigResponse, ResponsePayload, TargetFile};
use serde_json::json;
use std::collections::HashSet;

struct ConfigFixture {
    path: String,
    content: Vec<u8>,
    declared_version: u64,
}

/// Builder for internally-consistent manifest responses.
///
/// ```rust,ignore
/// let response = ResponseFixture::new(7)
///     .with_opaque_backend_state("cursor-1")
///     .with_config("datadog/2/ASM/rules/config", b"{\"rules\":[]}", 3)
///     .response();
/// ```
pub struct ResponseFixture {
    version: u64,
    opaque_backend_state: Option<String>,
    root_version: u64,
    configs: Vec<ConfigFixture>,
    extra_active: Vec<String>,
    omitted_files: HashSet<String>,
    omitted_targets: HashSet<String>,
}

impl ResponseFixture {
    /// Creates a fixture declaring the given targets version.
    #[must_use]
    pub fn new(version: u64) -> Self {
        Self {
            version,
            opaque_backend_state: None,
            root_version: 1,
            configs: Vec::new(),
            extra_active: Vec::new(),
            omitted_files: HashSet::new(),
            omitted_targets: HashSet::new(),
        }
    }

    /// Adds a config: listed in the active set, described in the targets
    /// manifest with a matching digest, and delivered as a target file.
    #[must_use]
    pub fn with_config(mut self, path: &str, content: &[u8], declared_version: u64) -> Self {
        self.configs.push(ConfigFixture {
            path: path.into(),
            content: content.to_vec(),
            declared_version,
        });
        self
    }

    /// Sets the opaque backend cursor carried by the manifest.
    #[must_use]
    pub fn with_opaque_backend_state(mut self, state: &str) -> Self {
        self.opaque_backend_state = Some(state.into());
        self
    }

    /// Sets the root metadata version.
    #[must_use]
    pub fn with_root_version(mut self, version: u64) -> Self {
        self.root_version = version;
        self
    }

    /// Drops the delivered target file for `path`, keeping its descriptor
    /// and active-set entry: exercises the missing-content failure.
    #[must_use]
    pub fn without_target_file(mut self, path: &str) -> Self {
        self.omitted_files.insert(path.into());
        self
    }

    /// Drops the descriptor for `path`, keeping its file and active-set
    /// entry: exercises the missing-target failure.
    #[must_use]
    pub fn without_target(mut self, path: &str) -> Self {
        self.omitted_targets.insert(path.into());
        self
    }

    /// Appends a raw entry to the active set without any backing target:
    /// useful for structurally invalid paths.
    #[must_use]
    pub fn with_active_path(mut self, raw: &str) -> Self {
        self.extra_active.push(raw.into());
        self
    }

    /// Builds the response payload.
    #[must_use]
    pub fn payload(&self) -> ResponsePayload {
        let mut targets = serde_json::Map::new();
        for config in &self.configs {
            if self.omitted_targets.contains(&config.path) {
                continue;
            }
            targets.insert(
                config.path.clone(),
                json!({
                    "custom": { "c": ["client_id"], "v": config.declared_version },
                    "hashes": { "sha256": sha256_hex(&config.content) },
                    "length": config.content.len()
                }),
            );
        }

        let targets_body = json!({
            "signatures": [{ "keyid": "fixture-key", "sig": "00ff" }],
            "signed": {
                "_type": "targets",
                "custom": {
                    "agent_refresh_interval": 50,
                    "opaque_backend_state": self.opaque_backend_state,
                },
                "expires": "2030-01-01T00:00:00Z",
                "spec_version": "1.0.0",
                "targets": targets,
                "version": self.version
            }
        });

        let root_body = json!({
            "signatures": [{ "keyid": "fixture-root-key", "sig": "00ff" }],
            "signed": {
                "_type": "root",
                "consistent_snapshot": true,
                "expires": "2030-01-01T00:00:00Z",
                "keys": {},
                "roles": {},
                "spec_version": "1.0",
                "version": self.root_version
            }
        });

        let target_files = self
            .configs
            .iter()
            .filter(|config| !self.omitted_files.contains(&config.path))
            .map(|config| TargetFile {
                path: config.path.clone(),
                raw: BASE64.encode(&config.content),
            })
            .collect();

        let client_configs = self
            .configs
            .iter()
            .map(|config| config.path.clone())
            .chain(self.extra_active.iter().cloned())
            .collect();

        ResponsePayload {
            roots: vec![BASE64.encode(root_body.to_string())],
            targets: Some(BASE64.encode(targets_body.to_string())),
            target_files,
            client_configs,
        }
    }

    /// Builds a successful response carrying [`payload`](Self::payload).
    #[must_use]
    pub fn response(&self) -> ConfigResponse {
        ConfigResponse::ok(self.payload())
    }
}
