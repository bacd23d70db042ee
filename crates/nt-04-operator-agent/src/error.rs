//! Error types for the operator agent.

use nt_01_verifiable_shuffle::ShuffleError;
use nt_02_ledger::LedgerError;
use nt_03_trust_evaluation::TrustError;
use shared_crypto::CryptoError;
use shared_types::{AgentAddress, TypesError};
use thiserror::Error;

/// Operator agent errors.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Datagram could not be decoded.
    #[error("Malformed message: {0}")]
    Decode(String),

    /// Message could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Envelope tag does not match its payload.
    #[error("Event tag {tag} does not match payload tag {expected}")]
    TagMismatch {
        /// Tag carried by the envelope.
        tag: u8,
        /// Tag of the decoded payload.
        expected: u8,
    },

    /// Encoded message exceeds the datagram limit.
    #[error("Message of {size} bytes exceeds datagram limit {limit}")]
    MessageTooLarge {
        /// Encoded size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Sender never registered its keys.
    #[error("Unregistered sender: {0}")]
    UnknownSender(AgentAddress),

    /// A shuffled key has no entry in the key map.
    #[error("Pseudonym not found in key map")]
    UnknownPseudonym,

    /// A shuffled batch arrived without the proof its size requires.
    #[error("Missing shuffle proof for batch of {0}")]
    MissingProof(usize),

    /// Proof statement does not describe the forwarded batch.
    #[error("Shuffle statement mismatch: {0}")]
    StatementMismatch(&'static str),

    /// Message arrived in a state that cannot accept it.
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The round was aborted by a failed hop.
    #[error("Round aborted: {0}")]
    RoundAborted(String),

    /// Timed out waiting for a peer.
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    /// Local address is not part of the configured topology.
    #[error("Address {0} is not in the topology")]
    NotInTopology(AgentAddress),

    /// Socket bind failed across the whole retry span.
    #[error("Bind failed: {0}")]
    Bind(String),

    /// Datagram send or receive failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Verifiable shuffle failure.
    #[error("Shuffle error: {0}")]
    Shuffle(#[from] ShuffleError),

    /// Ledger failure.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Trust evaluation failure.
    #[error("Trust error: {0}")]
    Trust(#[from] TrustError),

    /// Cryptographic failure.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Domain type failure.
    #[error("Types error: {0}")]
    Types(#[from] TypesError),
}

impl AgentError {
    /// Reject-and-continue failures concerning one message or peer.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AgentError::Decode(_)
            | AgentError::TagMismatch { .. }
            | AgentError::UnknownSender(_)
            | AgentError::Protocol(_)
            | AgentError::Crypto(_)
            | AgentError::Types(_) => true,
            AgentError::Ledger(e) => e.is_recoverable(),
            AgentError::Trust(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Failures that must stop the process.
    pub fn is_critical(&self) -> bool {
        match self {
            AgentError::Bind(_) | AgentError::NotInTopology(_) | AgentError::InvalidConfig(_) => {
                true
            }
            AgentError::Trust(e) => e.is_critical(),
            AgentError::Ledger(e) => e.is_critical(),
            _ => false,
        }
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
