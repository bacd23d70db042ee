//! # Shared Types Crate
//!
//! Domain records shared by every Nym-Trust subsystem.
//!
//! ## Design Principles
//!
//! - **Pseudonyms only**: no record here carries a subject's long-term key;
//!   every entry is keyed by a one-time [`GroupElement`](shared_crypto::GroupElement).
//! - **Single encoding**: the reputation-list byte layout committed into
//!   blocks is defined once, in [`encoding`].

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod encoding;
pub mod entities;
pub mod errors;

pub use encoding::{list_bytes, records_bytes, round6, score_from_bytes, score_to_bytes};
pub use entities::*;
pub use errors::*;

/// Result alias for shared type conversions.
pub type Result<T> = std::result::Result<T, TypesError>;
