//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `group` | secp256k1 points/scalars | Pseudonyms, shuffle arithmetic |
//! | `schnorr` | BIP-340 Schnorr | Block, candidate and record signatures |
//! | `anon` | ElGamal KEM + XChaCha20-Poly1305 | Single-recipient score encryption |
//! | `hashing` | SHA-256, Merkle | Block hashes, commitment roots |
//!
//! ## Security Properties
//!
//! - **secp256k1**: constant-time scalar multiplication (k256)
//! - **XChaCha20**: 192-bit random nonce, no nonce reuse across envelopes
//! - **Schnorr**: BIP-340 x-only keys, deterministic with auxiliary randomness

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod anon;
pub mod errors;
pub mod group;
pub mod hashing;
pub mod schnorr;

// Re-exports
pub use anon::{open, seal};
pub use errors::CryptoError;
pub use group::{hash_to_scalar, random_scalar, GroupElement, MixKeyPair, Scalar};
pub use hashing::{merkle_root, sha256, sha256_concat, Hash};
pub use schnorr::{SchnorrKeyPair, SchnorrPublicKey, SchnorrSignature};

/// Result alias for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
