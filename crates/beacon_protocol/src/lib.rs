//! # Beacon Protocol
//!
//! Wire types and manifest decoding for the Beacon configuration client.
//!
//! This crate provides:
//! - [`ConfigPath`]: the structured key identifying one configuration artifact
//! - [`TargetDescriptor`] and the signed metadata envelopes ([`RootMetadata`],
//!   [`TargetsManifest`])
//! - [`ConfigResponse`] / [`ResponsePayload`]: transport-facing message shapes
//! - [`decode`]: turning a raw response into typed, hash-validated data
//!
//! Cryptographic signature verification of the decoded metadata is out of
//! scope here; the client crate invokes an externally supplied verifier
//! before trusting a decoded manifest.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decode;
mod metadata;
mod path;
mod response;
mod target;

pub use decode::{decode, DecodeError, DecodedManifest};
pub use metadata::{
    RootMetadata, RootSigned, Signature, TargetsCustom, TargetsManifest, TargetsSigned,
};
pub use path::{ConfigPath, ParseError};
pub use response::{ConfigResponse, ResponsePayload, TargetFile};
pub use target::{sha256_hex, TargetDescriptor, SHA256};
