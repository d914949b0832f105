//! # Beacon Testkit
//!
//! Test fixtures shared across the Beacon crates' test suites.
//!
//! This crate provides:
//! - [`ResponseFixture`]: a builder for internally-consistent manifest
//!   responses (matching digests, lengths and base64 encodings), with
//!   mutation helpers that break one aspect at a time
//! - [`sha256_hex`] re-exported for digest assertions

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;

pub use beacon_protocol::sha256_hex;
pub use fixtures::ResponseFixture;
