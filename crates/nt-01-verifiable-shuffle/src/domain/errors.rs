//! # Shuffle Errors

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors produced while proving or verifying a shuffle.
#[derive(Debug, Error)]
pub enum ShuffleError {
    /// One of the verification identities did not hold.
    #[error("invalid shuffle proof")]
    InvalidProof,

    /// Shuffling needs at least two pairs.
    #[error("Batch too small to shuffle: {0} (need at least 2)")]
    BatchTooSmall(usize),

    /// Parallel input vectors disagree in length.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Batch size implied by the first vector.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },

    /// The permutation witness is not a bijection on `0..k`.
    #[error("Invalid permutation witness")]
    InvalidPermutation,

    /// A secret scalar drawn by the prover was not invertible.
    #[error("Degenerate prover secret")]
    DegenerateSecret,

    /// Group arithmetic failure.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl ShuffleError {
    /// Whether the caller can reject the offending hop and keep running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ShuffleError::InvalidProof
                | ShuffleError::LengthMismatch { .. }
                | ShuffleError::BatchTooSmall(_)
        )
    }

    /// Local faults that indicate a broken prover rather than a bad peer.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            ShuffleError::InvalidPermutation | ShuffleError::DegenerateSecret
        )
    }
}
