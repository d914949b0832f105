//! # Beacon Client
//!
//! Sync state machine for the Beacon configuration client.
//!
//! This crate provides:
//! - [`Client`]: one sync cycle (fetch, decode, verify, validate, diff,
//!   commit) with a fail-closed error taxonomy
//! - [`ConfigTransport`]: the seam to the HTTP layer, plus a
//!   [`MockTransport`] for tests
//! - [`ManifestVerifier`]: the seam to the externally supplied signature
//!   verification capability
//!
//! ## Key invariants
//!
//! - Any failure aborts the cycle with zero repository mutation
//! - Content changes and the version/backend-state advance land in one
//!   atomic commit
//! - The client never retries; retry and backoff belong to the external
//!   scheduler that drives [`Client::sync`]

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod transport;
mod verify;

pub use client::{Client, SyncOutcome, SyncPhase};
pub use error::{SyncError, SyncResult};
pub use transport::{ConfigTransport, FetchRequest, MockTransport, TransportError};
pub use verify::{ManifestVerifier, NoopVerifier, VerificationError};
