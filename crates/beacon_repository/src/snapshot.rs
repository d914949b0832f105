//! Immutable repository snapshots.

use crate::entry::ContentEntry;
use beacon_protocol::ConfigPath;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// A read-only view of the repository at one committed version.
///
/// Snapshots are immutable and shared behind `Arc`: readers hold on to one
/// for as long as they need a consistent view, while commits install a new
/// snapshot without disturbing anyone already reading.
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    version: u64,
    opaque_backend_state: Option<Bytes>,
    contents: HashMap<ConfigPath, Arc<ContentEntry>>,
}

impl RepositorySnapshot {
    /// Creates the initial snapshot: version 0, no backend state, empty.
    pub(crate) fn initial() -> Self {
        Self {
            version: 0,
            opaque_backend_state: None,
            contents: HashMap::new(),
        }
    }

    pub(crate) fn new(
        version: u64,
        opaque_backend_state: Option<Bytes>,
        contents: HashMap<ConfigPath, Arc<ContentEntry>>,
    ) -> Self {
        Self {
            version,
            opaque_backend_state,
            contents,
        }
    }

    /// Returns the targets version this snapshot was committed at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the opaque backend cursor, echoed on the next fetch.
    #[must_use]
    pub fn opaque_backend_state(&self) -> Option<&Bytes> {
        self.opaque_backend_state.as_ref()
    }

    /// Returns the applied contents mapping.
    #[must_use]
    pub fn contents(&self) -> &HashMap<ConfigPath, Arc<ContentEntry>> {
        &self.contents
    }

    /// Returns the entry applied for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &ConfigPath) -> Option<&Arc<ContentEntry>> {
        self.contents.get(path)
    }

    /// Returns true when `path` has applied content.
    #[must_use]
    pub fn contains(&self, path: &ConfigPath) -> bool {
        self.contents.contains_key(path)
    }

    /// Returns the number of applied entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true when no entries are applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Iterates over the applied paths.
    pub fn paths(&self) -> impl Iterator<Item = &ConfigPath> {
        self.contents.keys()
    }
}
