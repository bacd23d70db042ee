//! # Fiat–Shamir Transcript
//!
//! Running SHA-256 over every public value the prover commits to. Verifier
//! challenges are read out of the running state, then absorbed back, so the
//! prover and the verifier derive identical challenges from identical
//! transcripts.
//!
//! Every absorbed item is framed as `len(label) || label || len(data) || data`
//! (lengths as u32 BE) so that distinct sequences never collide.

use sha2::{Digest, Sha256};
use shared_crypto::{hash_to_scalar, GroupElement, Scalar};

/// Domain label used by the pair shuffle.
pub const PAIR_SHUFFLE_DOMAIN: &[u8] = b"PairShuffle";

/// Hash-based public-coin transcript.
#[derive(Clone)]
pub struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    /// Start a transcript bound to `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut transcript = Self {
            hasher: Sha256::new(),
        };
        transcript.append_message(b"domain", domain);
        transcript
    }

    /// Absorb an arbitrary labelled message.
    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        self.hasher.update((label.len() as u32).to_be_bytes());
        self.hasher.update(label);
        self.hasher.update((message.len() as u32).to_be_bytes());
        self.hasher.update(message);
    }

    /// Absorb one group element.
    pub fn append_point(&mut self, label: &[u8], point: &GroupElement) {
        self.append_message(label, &point.to_bytes());
    }

    /// Absorb a vector of group elements, count first.
    pub fn append_points(&mut self, label: &[u8], points: &[GroupElement]) {
        self.append_message(label, &(points.len() as u32).to_be_bytes());
        for point in points {
            self.append_point(label, point);
        }
    }

    /// Absorb one scalar.
    pub fn append_scalar(&mut self, label: &[u8], scalar: &Scalar) {
        self.append_message(label, &scalar.to_bytes());
    }

    /// Absorb a vector of scalars, count first.
    pub fn append_scalars(&mut self, label: &[u8], scalars: &[Scalar]) {
        self.append_message(label, &(scalars.len() as u32).to_be_bytes());
        for scalar in scalars {
            self.append_scalar(label, scalar);
        }
    }

    fn state(&self) -> [u8; 32] {
        self.hasher.clone().finalize().into()
    }

    /// Derive a challenge scalar and absorb it.
    pub fn challenge_scalar(&mut self, label: &[u8]) -> Scalar {
        let challenge = hash_to_scalar(&[&self.state(), b"challenge", label]);
        self.append_scalar(label, &challenge);
        challenge
    }

    /// Derive `count` challenge scalars from one state snapshot and absorb them.
    pub fn challenge_scalars(&mut self, label: &[u8], count: usize) -> Vec<Scalar> {
        let state = self.state();
        let challenges: Vec<Scalar> = (0..count as u32)
            .map(|index| hash_to_scalar(&[&state, b"challenge", label, &index.to_be_bytes()]))
            .collect();
        self.append_scalars(label, &challenges);
        challenges
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}
