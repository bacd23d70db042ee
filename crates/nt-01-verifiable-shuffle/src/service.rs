//! # Shuffle Service
//!
//! Random-permutation entry point used by the agents. Drawing the permutation
//! and blinding scalars happens once; the returned [`DeferredProver`] keeps
//! them so the proof can be produced later against the caller's transcript.

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use shared_crypto::{random_scalar, GroupElement};
use tracing::{debug, instrument};

use crate::domain::errors::ShuffleError;
use crate::domain::pair::{self, PairShuffleProof, PairShuffleStatement, PairShuffleWitness};
use crate::domain::permutation::random_permutation;
use crate::domain::transcript::{Transcript, PAIR_SHUFFLE_DOMAIN};
use crate::Result;

/// Result of [`shuffle`]: the shuffled pairs plus a deferred prover.
#[derive(Debug)]
pub struct ShuffleOutput {
    /// `X̄ᵢ = β_π(i)·g + X_π(i)`.
    pub xbar: Vec<GroupElement>,
    /// `Ȳᵢ = β_π(i)·h + Y_π(i)`.
    pub ybar: Vec<GroupElement>,
    /// `β_π(i)·h`; `Ȳᵢ` minus this entry is the permuted input `Y_π(i)`.
    pub h_blinding: Vec<GroupElement>,
    /// Produces the proof for this exact shuffle.
    pub prover: DeferredProver,
}

/// Holds the secret choices of one shuffle until its proof is requested.
#[derive(Debug)]
pub struct DeferredProver {
    statement: PairShuffleStatement,
    witness: PairShuffleWitness,
}

impl DeferredProver {
    /// Public statement this prover will prove.
    pub fn statement(&self) -> &PairShuffleStatement {
        &self.statement
    }

    /// Prove against a caller-supplied transcript.
    #[instrument(skip_all, fields(size = self.statement.len()))]
    pub fn prove(self, transcript: &mut Transcript) -> Result<PairShuffleProof> {
        let proof = pair::prove(transcript, &self.statement, &self.witness)?;
        debug!("[nt-01] shuffle proof generated");
        Ok(proof)
    }

    /// Prove against a fresh transcript in the pair-shuffle domain.
    pub fn hash_prove(self) -> Result<PairShuffleProof> {
        self.prove(&mut Transcript::new(PAIR_SHUFFLE_DOMAIN))
    }
}

/// Shuffle `(x, y)` under a fresh random permutation drawn from the OS RNG.
///
/// # Errors
///
/// [`ShuffleError::BatchTooSmall`] for fewer than two pairs.
pub fn shuffle(
    g: &GroupElement,
    h: &GroupElement,
    x: &[GroupElement],
    y: &[GroupElement],
) -> Result<ShuffleOutput> {
    shuffle_with_rng(g, h, x, y, &mut OsRng)
}

/// [`shuffle`] with an explicit randomness source.
#[instrument(skip_all, fields(size = x.len()))]
pub fn shuffle_with_rng<R: Rng + CryptoRng>(
    g: &GroupElement,
    h: &GroupElement,
    x: &[GroupElement],
    y: &[GroupElement],
    rng: &mut R,
) -> Result<ShuffleOutput> {
    let k = x.len();
    if k < 2 {
        return Err(ShuffleError::BatchTooSmall(k));
    }
    let witness = PairShuffleWitness {
        permutation: random_permutation(k, rng),
        beta: (0..k).map(|_| random_scalar()).collect(),
    };
    shuffle_with_witness(g, h, x, y, witness)
}

/// Shuffle under a caller-chosen witness.
pub fn shuffle_with_witness(
    g: &GroupElement,
    h: &GroupElement,
    x: &[GroupElement],
    y: &[GroupElement],
    witness: PairShuffleWitness,
) -> Result<ShuffleOutput> {
    let (xbar, ybar) = witness.apply(g, h, x, y)?;
    let h_blinding = witness
        .permutation
        .iter()
        .map(|&p| *h * witness.beta[p])
        .collect();
    debug!(size = x.len(), "[nt-01] pairs shuffled");

    Ok(ShuffleOutput {
        xbar: xbar.clone(),
        ybar: ybar.clone(),
        h_blinding,
        prover: DeferredProver {
            statement: PairShuffleStatement {
                g: *g,
                h: *h,
                x: x.to_vec(),
                y: y.to_vec(),
                xbar,
                ybar,
            },
            witness,
        },
    })
}

/// Verify against a fresh transcript in the pair-shuffle domain.
#[instrument(skip_all, fields(size = statement.len()))]
pub fn hash_verify(statement: &PairShuffleStatement, proof: &PairShuffleProof) -> Result<()> {
    pair::verify(&mut Transcript::new(PAIR_SHUFFLE_DOMAIN), statement, proof).map_err(|e| {
        debug!(error = %e, "[nt-01] shuffle proof rejected");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(k: usize) -> (Vec<GroupElement>, Vec<GroupElement>) {
        (
            (0..k).map(|_| GroupElement::random()).collect(),
            (0..k).map(|_| GroupElement::random()).collect(),
        )
    }

    #[test]
    fn test_shuffle_prove_verify() {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let (x, y) = pairs(5);

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let statement = out.prover.statement().clone();
        let proof = out.prover.hash_prove().unwrap();

        hash_verify(&statement, &proof).unwrap();
    }

    #[test]
    fn test_h_blinding_recovers_permuted_inputs() {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let (x, y) = pairs(4);

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let mut recovered: Vec<Vec<u8>> = out
            .ybar
            .iter()
            .zip(&out.h_blinding)
            .map(|(yb, hb)| (*yb - *hb).to_bytes())
            .collect();
        let mut original: Vec<Vec<u8>> = y.iter().map(GroupElement::to_bytes).collect();
        recovered.sort();
        original.sort();
        assert_eq!(recovered, original);
    }

    #[test]
    fn test_small_batches_rejected() {
        let g = GroupElement::generator();
        let (x, y) = pairs(1);
        assert!(matches!(
            shuffle(&g, &g, &x, &y),
            Err(ShuffleError::BatchTooSmall(1))
        ));
        assert!(matches!(
            shuffle(&g, &g, &[], &[]),
            Err(ShuffleError::BatchTooSmall(0))
        ));
    }

    #[test]
    fn test_proof_for_other_statement_fails() {
        let g = GroupElement::generator();
        let h = GroupElement::random();
        let (x, y) = pairs(3);

        let first = shuffle(&g, &h, &x, &y).unwrap();
        let second = shuffle(&g, &h, &x, &y).unwrap();
        let statement = second.prover.statement().clone();
        let proof = first.prover.hash_prove().unwrap();

        assert!(matches!(
            hash_verify(&statement, &proof),
            Err(ShuffleError::InvalidProof)
        ));
    }
}
