//! # Schnorr Signatures (BIP-340, secp256k1)
//!
//! Signs block hashes, list-confirmation candidates and collector records.
//!
//! ## Security Properties
//!
//! - x-only public keys (32 bytes), 64-byte signatures
//! - Auxiliary randomness folded into the nonce derivation
//! - Constant-time operations

use crate::{CryptoError, Result};
use k256::schnorr::signature::{Signer, Verifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// x-only Schnorr public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchnorrPublicKey([u8; 32]);

impl SchnorrPublicKey {
    /// Create from x-only bytes, validating the point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &SchnorrSignature) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = Signature::try_from(signature.0.as_slice())
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Schnorr signature (64 bytes, r||s).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct SchnorrSignature([u8; 64]);

impl SchnorrSignature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for SchnorrSignature {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        Ok(Self(array))
    }
}

impl From<SchnorrSignature> for Vec<u8> {
    fn from(signature: SchnorrSignature) -> Self {
        signature.0.to_vec()
    }
}

/// Schnorr signing identity.
pub struct SchnorrKeyPair {
    signing_key: SigningKey,
}

impl SchnorrKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        let signing_key =
            SigningKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// x-only public key.
    pub fn public_key(&self) -> SchnorrPublicKey {
        let bytes: [u8; 32] = self.signing_key.verifying_key().to_bytes().into();
        SchnorrPublicKey(bytes)
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> SchnorrSignature {
        let sig: Signature = self.signing_key.sign(message);
        SchnorrSignature(sig.to_bytes())
    }

    /// Secret key bytes (for persistence by the caller).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for SchnorrKeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for SchnorrKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchnorrKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
