//! # Beacon Repository
//!
//! Versioned, transactional storage for applied configuration.
//!
//! This crate provides:
//! - [`Repository`]: the process-wide applied configuration set, with a
//!   monotonic targets version and an opaque backend cursor
//! - [`RepositorySnapshot`]: immutable copy-on-write views for readers
//! - [`Transaction`]: staged insert/update/remove batches, applied
//!   all-or-nothing on commit
//! - [`ContentEntry`]: the applied state for one path
//!
//! ## Key invariants
//!
//! - Readers never observe a partially-applied update; commits swap in one
//!   new snapshot
//! - At most one transaction is open per repository at a time
//! - The targets version never decreases across commits

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod error;
mod repository;
mod snapshot;
mod transaction;

pub use entry::ContentEntry;
pub use error::{RepositoryError, RepositoryResult};
pub use repository::Repository;
pub use snapshot::RepositorySnapshot;
pub use transaction::{AppliedChange, ChangeKind, Transaction};
