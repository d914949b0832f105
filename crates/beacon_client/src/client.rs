//! The sync client state machine.

use crate::error::{SyncError, SyncResult};
use crate::transport::{ConfigTransport, FetchRequest};
use crate::verify::ManifestVerifier;
use beacon_protocol::{
    decode, ConfigPath, DecodeError, DecodedManifest, ResponsePayload, TargetDescriptor,
};
use beacon_repository::{ContentEntry, Repository, RepositorySnapshot};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The current phase of the sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No cycle in flight.
    Idle,
    /// Invoking the transport.
    Fetching,
    /// Decoding and validating the manifest response.
    Decoding,
    /// Computing the change set against the repository snapshot.
    Diffing,
    /// Applying the change set through a transaction.
    Committing,
    /// The last cycle aborted; the repository was left untouched.
    Failed,
}

/// Result of one successful sync cycle.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Paths inserted by this cycle, in applied order.
    pub inserted: Vec<ConfigPath>,
    /// Paths whose content was replaced, in applied order.
    pub updated: Vec<ConfigPath>,
    /// Paths removed, in applied order.
    pub removed: Vec<ConfigPath>,
    /// The targets version the repository now holds.
    pub version: u64,
    /// Duration of the cycle.
    pub duration: Duration,
}

impl SyncOutcome {
    /// Returns the total number of applied changes.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.removed.len()
    }

    /// Returns true when the cycle applied no content changes.
    ///
    /// A no-op sync still advances the repository's version and backend
    /// state.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.change_count() == 0
    }
}

/// One active path with its validated content and descriptor.
struct ActiveConfig {
    path: ConfigPath,
    content: Bytes,
    descriptor: TargetDescriptor,
}

impl ActiveConfig {
    fn entry(&self) -> ContentEntry {
        ContentEntry::new(self.content.clone(), self.descriptor.clone())
    }
}

#[derive(Default)]
struct Diff {
    insertions: Vec<ActiveConfig>,
    updates: Vec<ActiveConfig>,
    removals: Vec<ConfigPath>,
}

/// Orchestrates sync cycles against one [`Repository`].
///
/// One cycle runs fetch → decode → verify → validate → diff → commit, in
/// that order, and aborts with zero repository mutation at the first
/// failure. `sync` is expected to be driven by a single external scheduler
/// worker; calling it from two threads at once trips the repository's
/// single-writer guard.
pub struct Client<T, V> {
    transport: T,
    verifier: V,
    repository: Arc<Repository>,
    phase: RwLock<SyncPhase>,
}

impl<T: ConfigTransport, V: ManifestVerifier> Client<T, V> {
    /// Creates a client bound to `repository`.
    pub fn new(transport: T, verifier: V, repository: Arc<Repository>) -> Self {
        Self {
            transport,
            verifier,
            repository,
            phase: RwLock::new(SyncPhase::Idle),
        }
    }

    /// Returns the repository this client writes to.
    #[must_use]
    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Returns the current sync phase.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase.read()
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.write() = phase;
    }

    /// Runs one sync cycle.
    ///
    /// On success the repository holds the manifest's contents, version and
    /// backend state, all installed by a single commit. On any error the
    /// repository is exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// See [`SyncError`] for the full taxonomy. No variant is retried
    /// internally.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        let result = self.run_cycle();
        match &result {
            Ok(outcome) => {
                self.set_phase(SyncPhase::Idle);
                info!(
                    version = outcome.version,
                    inserted = outcome.inserted.len(),
                    updated = outcome.updated.len(),
                    removed = outcome.removed.len(),
                    "sync cycle committed"
                );
            }
            Err(error) => {
                self.set_phase(SyncPhase::Failed);
                debug!(%error, "sync cycle aborted");
            }
        }
        result
    }

    fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        let started = Instant::now();
        let snapshot = self.repository.snapshot();

        self.set_phase(SyncPhase::Fetching);
        let request = FetchRequest {
            targets_version: snapshot.version(),
            opaque_backend_state: snapshot.opaque_backend_state().cloned(),
        };
        let response = self.transport.fetch(&request)?;
        if !response.is_success() {
            return Err(SyncError::Status {
                status: response.status,
            });
        }

        self.set_phase(SyncPhase::Decoding);
        let payload = response
            .payload
            .as_ref()
            .ok_or(SyncError::Decode(DecodeError::MissingField { field: "payload" }))?;
        let manifest = decode(payload)?;
        self.verifier.verify(&manifest.roots, &manifest.targets)?;
        let active = self.validate_active_set(payload, &manifest)?;

        self.set_phase(SyncPhase::Diffing);
        let diff = compute_diff(&snapshot, active);

        self.set_phase(SyncPhase::Committing);
        let mut txn = self.repository.begin_transaction()?;
        for config in &diff.insertions {
            txn.insert(config.path.clone(), config.entry())?;
        }
        for config in &diff.updates {
            txn.update(config.path.clone(), config.entry())?;
        }
        for path in &diff.removals {
            txn.remove(path.clone())?;
        }
        txn.set_targets_version(manifest.targets.version());
        txn.set_opaque_backend_state(
            manifest
                .targets
                .opaque_backend_state()
                .map(|state| Bytes::copy_from_slice(state.as_bytes())),
        );
        txn.commit()?;

        Ok(SyncOutcome {
            inserted: diff.insertions.into_iter().map(|c| c.path).collect(),
            updated: diff.updates.into_iter().map(|c| c.path).collect(),
            removed: diff.removals,
            version: manifest.targets.version(),
            duration: started.elapsed(),
        })
    }

    /// Parses the active set and checks manifest/content consistency.
    ///
    /// Validation is all-or-nothing for the cycle: the first active path
    /// without a descriptor or without validated content aborts before any
    /// repository mutation.
    fn validate_active_set(
        &self,
        payload: &ResponsePayload,
        manifest: &DecodedManifest,
    ) -> SyncResult<Vec<ActiveConfig>> {
        let mut active = Vec::with_capacity(payload.client_configs.len());
        let mut seen = HashSet::new();
        for raw in &payload.client_configs {
            let path = ConfigPath::parse(raw)?;
            if !seen.insert(path.clone()) {
                continue;
            }
            let descriptor = manifest
                .targets
                .target(&path)
                .ok_or_else(|| SyncError::MissingTarget { path: path.clone() })?
                .clone();
            let content = manifest
                .content(&path)
                .ok_or_else(|| SyncError::MissingContent { path: path.clone() })?
                .clone();
            active.push(ActiveConfig {
                path,
                content,
                descriptor,
            });
        }
        Ok(active)
    }
}

/// Computes the three disjoint change sets for one cycle.
///
/// Hash equality alone decides "no change": declared lengths and custom
/// version counters are informational and never diff keys.
fn compute_diff(snapshot: &RepositorySnapshot, active: Vec<ActiveConfig>) -> Diff {
    let mut diff = Diff::default();
    let active_paths: HashSet<ConfigPath> = active.iter().map(|c| c.path.clone()).collect();

    for config in active {
        match snapshot.get(&config.path) {
            None => diff.insertions.push(config),
            Some(entry) => {
                let unchanged = config
                    .descriptor
                    .sha256()
                    .is_some_and(|digest| digest.eq_ignore_ascii_case(entry.sha256()));
                if !unchanged {
                    diff.updates.push(config);
                }
            }
        }
    }

    diff.removals = snapshot
        .paths()
        .filter(|path| !active_paths.contains(path))
        .cloned()
        .collect();
    // Deterministic removal order; the snapshot map iterates arbitrarily.
    diff.removals.sort();

    diff
}
