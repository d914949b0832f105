//! Staged, atomically-committed repository mutations.

use crate::entry::ContentEntry;
use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::Repository;
use crate::snapshot::RepositorySnapshot;
use beacon_protocol::ConfigPath;
use bytes::Bytes;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// The kind of change a committed operation applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A path was inserted.
    Inserted,
    /// A path's content was replaced.
    Updated,
    /// A path was removed.
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Inserted => "inserted",
            ChangeKind::Updated => "updated",
            ChangeKind::Removed => "removed",
        };
        f.write_str(label)
    }
}

/// One change applied by a committed transaction, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    /// What kind of change was applied.
    pub kind: ChangeKind,
    /// The path it was applied to.
    pub path: ConfigPath,
}

#[derive(Debug)]
enum StagedOp {
    Insert(ContentEntry),
    Update(ContentEntry),
    Remove,
}

/// A staged batch of repository mutations for one sync cycle.
///
/// Operations are recorded in issue order and applied all-or-nothing on
/// [`commit`](Transaction::commit). A path may appear in at most one staged
/// operation; staging it twice is a usage error fatal to the cycle. The
/// targets version and opaque backend state are staged alongside content
/// operations and installed by the same commit, so readers observe all of
/// it as a single step.
///
/// Dropping an uncommitted transaction discards it and releases the
/// repository's writer slot.
pub struct Transaction<'repo> {
    repository: &'repo Repository,
    base: Arc<RepositorySnapshot>,
    ops: Vec<(ConfigPath, StagedOp)>,
    staged: HashSet<ConfigPath>,
    version: Option<u64>,
    backend_state: Option<Option<Bytes>>,
}

impl<'repo> Transaction<'repo> {
    pub(crate) fn new(repository: &'repo Repository, base: Arc<RepositorySnapshot>) -> Self {
        Self {
            repository,
            base,
            ops: Vec::new(),
            staged: HashSet::new(),
            version: None,
            backend_state: None,
        }
    }

    /// Stages an insert of `entry` at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::PathAlreadyStaged`] if the path is
    /// already staged in this transaction.
    pub fn insert(&mut self, path: ConfigPath, entry: ContentEntry) -> RepositoryResult<()> {
        self.stage(path, StagedOp::Insert(entry))
    }

    /// Stages a wholesale replacement of the entry at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::PathAlreadyStaged`] if the path is
    /// already staged in this transaction.
    pub fn update(&mut self, path: ConfigPath, entry: ContentEntry) -> RepositoryResult<()> {
        self.stage(path, StagedOp::Update(entry))
    }

    /// Stages a removal of the entry at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::PathAlreadyStaged`] if the path is
    /// already staged in this transaction.
    pub fn remove(&mut self, path: ConfigPath) -> RepositoryResult<()> {
        self.stage(path, StagedOp::Remove)
    }

    /// Stages the targets version to install at commit.
    pub fn set_targets_version(&mut self, version: u64) {
        self.version = Some(version);
    }

    /// Stages the opaque backend cursor to install at commit.
    pub fn set_opaque_backend_state(&mut self, state: Option<Bytes>) {
        self.backend_state = Some(state);
    }

    /// Returns the number of staged content operations.
    #[must_use]
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Returns true when no content operations are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn stage(&mut self, path: ConfigPath, op: StagedOp) -> RepositoryResult<()> {
        if !self.staged.insert(path.clone()) {
            return Err(RepositoryError::PathAlreadyStaged { path });
        }
        self.ops.push((path, op));
        Ok(())
    }

    /// Atomically applies every staged operation plus the staged version
    /// and backend state, and returns the applied changes in staging order.
    ///
    /// Validation happens against a clone of the base snapshot: any failure
    /// leaves the repository exactly as it was, with nothing applied.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::InvalidEntry`] if a staged entry's content does
    ///   not match its descriptor
    /// - [`RepositoryError::InvalidOperation`] if an insert targets an
    ///   existing path, or an update/remove targets a missing one
    /// - [`RepositoryError::VersionRegression`] if the staged version is
    ///   lower than the repository's current version
    pub fn commit(mut self) -> RepositoryResult<Vec<AppliedChange>> {
        if let Some(proposed) = self.version {
            let current = self.base.version();
            if proposed < current {
                return Err(RepositoryError::VersionRegression { current, proposed });
            }
        }

        let mut contents = self.base.contents().clone();
        let mut applied = Vec::with_capacity(self.ops.len());

        for (path, op) in std::mem::take(&mut self.ops) {
            match op {
                StagedOp::Insert(entry) => {
                    if !entry.is_consistent() {
                        return Err(RepositoryError::InvalidEntry { path });
                    }
                    if contents.contains_key(&path) {
                        return Err(RepositoryError::invalid_operation(format!(
                            "insert for path '{path}' which already has content"
                        )));
                    }
                    contents.insert(path.clone(), Arc::new(entry));
                    applied.push(AppliedChange {
                        kind: ChangeKind::Inserted,
                        path,
                    });
                }
                StagedOp::Update(entry) => {
                    if !entry.is_consistent() {
                        return Err(RepositoryError::InvalidEntry { path });
                    }
                    if !contents.contains_key(&path) {
                        return Err(RepositoryError::invalid_operation(format!(
                            "update for path '{path}' which has no content"
                        )));
                    }
                    contents.insert(path.clone(), Arc::new(entry));
                    applied.push(AppliedChange {
                        kind: ChangeKind::Updated,
                        path,
                    });
                }
                StagedOp::Remove => {
                    if contents.remove(&path).is_none() {
                        return Err(RepositoryError::invalid_operation(format!(
                            "remove for path '{path}' which has no content"
                        )));
                    }
                    applied.push(AppliedChange {
                        kind: ChangeKind::Removed,
                        path,
                    });
                }
            }
        }

        let version = self.version.take().unwrap_or_else(|| self.base.version());
        let backend_state = self
            .backend_state
            .take()
            .unwrap_or_else(|| self.base.opaque_backend_state().cloned());

        self.repository
            .install(Arc::new(RepositorySnapshot::new(version, backend_state, contents)));
        Ok(applied)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.repository.release_writer();
    }
}
