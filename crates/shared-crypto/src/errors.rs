//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Ciphertext shorter than the envelope header
    #[error("Ciphertext too short: expected at least {expected} bytes, got {actual}")]
    CiphertextTooShort {
        /// Minimum envelope length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Bytes do not encode a curve point
    #[error("Invalid group element encoding")]
    InvalidGroupElement,

    /// Bytes do not encode a canonical scalar
    #[error("Invalid scalar encoding")]
    InvalidScalar,

    /// Scalar has no inverse (zero)
    #[error("Scalar is not invertible")]
    NonInvertible,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Malformed point list encoding
    #[error("Malformed point list: {0}")]
    MalformedList(String),
}
