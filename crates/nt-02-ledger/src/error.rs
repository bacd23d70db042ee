//! Error types for the ledger subsystem.

use shared_crypto::CryptoError;
use shared_types::TypesError;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Schnorr signature over the block hash did not verify.
    #[error("Block signature verification failed")]
    InvalidSignature,

    /// Proof-of-work hash is not below the scaled target.
    #[error("Insufficient work: block hash does not meet the scaled target")]
    InsufficientWork,

    /// Records root differs from the locally recomputed one.
    #[error("Records root mismatch")]
    RecordsRootMismatch,

    /// Reputation root differs from the locally recomputed one.
    #[error("Reputation root mismatch")]
    ReputationRootMismatch,

    /// Operation needs a previous block but the chain is empty.
    #[error("Chain is empty")]
    EmptyChain,

    /// Block arrived after the receive window closed.
    #[error("Receive window closed")]
    WindowClosed,

    /// Configured difficulty tag is not valid hex.
    #[error("Invalid difficulty tag: {0}")]
    InvalidDifficultyTag(String),

    /// Invalid ledger configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// List or record encoding failure.
    #[error("Types error: {0}")]
    Types(#[from] TypesError),

    /// Key or point decoding failure.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Block encoding failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Rejections that concern a single peer's block.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidSignature
                | LedgerError::InsufficientWork
                | LedgerError::RecordsRootMismatch
                | LedgerError::ReputationRootMismatch
                | LedgerError::WindowClosed
                | LedgerError::Types(_)
                | LedgerError::Crypto(_)
                | LedgerError::Serialization(_)
        )
    }

    /// Local misconfiguration.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidDifficultyTag(_) | LedgerError::InvalidConfig(_)
        )
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
