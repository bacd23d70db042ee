//! # Anonymous Single-Recipient Encryption
//!
//! ElGamal key encapsulation on secp256k1 followed by XChaCha20-Poly1305.
//! The envelope carries no sender identity and no recipient identifier.
//!
//! ## Envelope Layout
//!
//! ```text
//! ┌──────────────┬────────────┬─────────────────────────┐
//! │ R = r·G (33) │ nonce (24) │ AEAD ciphertext + tag   │
//! └──────────────┴────────────┴─────────────────────────┘
//! key = SHA-256("nt-anon" || R || r·PK)
//! ```

use crate::group::{random_scalar, GroupElement, Scalar};
use crate::{CryptoError, Result};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const EPHEMERAL_LEN: usize = 33;
const NONCE_LEN: usize = 24;
const KDF_LABEL: &[u8] = b"nt-anon";

fn derive_key(ephemeral: &GroupElement, shared: &GroupElement) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(KDF_LABEL);
    hasher.update(ephemeral.to_bytes());
    hasher.update(shared.to_bytes());
    Zeroizing::new(hasher.finalize().into())
}

/// Encrypt `plaintext` so that only the holder of `recipient`'s secret can read it.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if the AEAD rejects the input.
pub fn seal(recipient: &GroupElement, plaintext: &[u8]) -> Result<Vec<u8>> {
    let ephemeral_secret = random_scalar();
    let ephemeral = GroupElement::mul_base(&ephemeral_secret);
    let shared = *recipient * ephemeral_secret;
    let key = derive_key(&ephemeral, &shared);

    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new((&*key).into());
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut envelope = Vec::with_capacity(EPHEMERAL_LEN + NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&ephemeral.to_bytes());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by [`seal`] with the recipient's secret scalar.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` on a wrong key or tampered envelope.
pub fn open(secret: &Scalar, envelope: &[u8]) -> Result<Vec<u8>> {
    let header = EPHEMERAL_LEN + NONCE_LEN;
    if envelope.len() < header {
        return Err(CryptoError::CiphertextTooShort {
            expected: header,
            actual: envelope.len(),
        });
    }

    let ephemeral = GroupElement::from_bytes(&envelope[..EPHEMERAL_LEN])?;
    let shared = ephemeral * secret;
    let key = derive_key(&ephemeral, &shared);

    let cipher = XChaCha20Poly1305::new((&*key).into());
    cipher
        .decrypt(
            XNonce::from_slice(&envelope[EPHEMERAL_LEN..header]),
            &envelope[header..],
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
