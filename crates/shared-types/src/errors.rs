//! # Error Types
//!
//! Conversion and decoding errors for shared records.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors raised while building or decoding shared records.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Parallel pseudonym/score arrays differ in length.
    #[error("Length mismatch: {pseudonyms} pseudonyms, {scores} scores")]
    LengthMismatch {
        /// Number of pseudonyms.
        pseudonyms: usize,
        /// Number of scores.
        scores: usize,
    },

    /// A score payload is not exactly eight bytes.
    #[error("Invalid score encoding: expected 8 bytes, got {0}")]
    InvalidScore(usize),

    /// Underlying point/list decoding failure.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// bincode failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
