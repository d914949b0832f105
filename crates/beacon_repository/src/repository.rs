//! The process-wide configuration repository.

use crate::entry::ContentEntry;
use crate::error::{RepositoryError, RepositoryResult};
use crate::snapshot::RepositorySnapshot;
use crate::transaction::Transaction;
use beacon_protocol::ConfigPath;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Holds the currently-applied configuration set, the targets version and
/// the opaque backend cursor.
///
/// The repository always reflects the result of the last successfully
/// committed [`Transaction`]; readers never observe an intermediate state.
/// Mutation goes exclusively through `begin_transaction` / `commit`, which
/// swap in a whole new immutable snapshot; the write lock is held only for
/// that swap, never during validation or diffing.
///
/// Reads are safe from any thread; at most one transaction may be open at a
/// time (single-writer discipline).
pub struct Repository {
    state: RwLock<Arc<RepositorySnapshot>>,
    writer_open: AtomicBool,
}

impl Repository {
    /// Creates an empty repository: version 0, no backend state, no
    /// contents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(RepositorySnapshot::initial())),
            writer_open: AtomicBool::new(false),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The snapshot is immutable; later commits do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RepositorySnapshot> {
        Arc::clone(&self.state.read())
    }

    /// Returns the current targets version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.read().version()
    }

    /// Returns the current opaque backend cursor.
    #[must_use]
    pub fn opaque_backend_state(&self) -> Option<Bytes> {
        self.state.read().opaque_backend_state().cloned()
    }

    /// Returns the currently-applied contents mapping.
    ///
    /// Entries are shared with the live snapshot, so the clone is cheap.
    #[must_use]
    pub fn contents(&self) -> HashMap<ConfigPath, Arc<ContentEntry>> {
        self.state.read().contents().clone()
    }

    /// Opens a transaction against this repository.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::TransactionInProgress`] if another
    /// transaction is already open. That is a scheduling bug upstream, not
    /// a transient condition.
    pub fn begin_transaction(&self) -> RepositoryResult<Transaction<'_>> {
        if self
            .writer_open
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RepositoryError::TransactionInProgress);
        }
        Ok(Transaction::new(self, self.snapshot()))
    }

    /// Installs a new snapshot. Called by `Transaction::commit` only.
    pub(crate) fn install(&self, snapshot: Arc<RepositorySnapshot>) {
        *self.state.write() = snapshot;
    }

    /// Releases the single-writer guard. Called when a transaction ends.
    pub(crate) fn release_writer(&self) {
        self.writer_open.store(false, Ordering::SeqCst);
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
