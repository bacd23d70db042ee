//! # ElGamal Pair Shuffle
//!
//! Neff's verifiable shuffle of pairs `(Xᵢ, Yᵢ)` under generators `(g, h)`:
//!
//! ```text
//! X̄ᵢ = β_π(i)·g + X_π(i)
//! Ȳᵢ = β_π(i)·h + Y_π(i)
//! ```
//!
//! The five-move protocol is collapsed with a [`Transcript`]:
//!
//! 1. commit `Γ, A, C, U, W, Λ₁, Λ₂`
//! 2. challenge `ρ` (k scalars)
//! 3. commit `D`
//! 4. challenge `λ`
//! 5. respond `σ, τ`, then a simple k-shuffle on `R = A + λB`, `S = C + λD`

use serde::{Deserialize, Serialize};
use shared_crypto::group::{scalar_serde, scalars_serde};
use shared_crypto::{random_scalar, GroupElement, Scalar};

use super::errors::ShuffleError;
use super::permutation;
use super::simple::{self, SimpleShuffleProof};
use super::transcript::Transcript;

/// Public inputs and outputs of one shuffle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairShuffleStatement {
    /// First generator.
    pub g: GroupElement,
    /// Second generator (the ElGamal public key).
    pub h: GroupElement,
    /// Input first components.
    pub x: Vec<GroupElement>,
    /// Input second components.
    pub y: Vec<GroupElement>,
    /// Shuffled first components.
    pub xbar: Vec<GroupElement>,
    /// Shuffled second components.
    pub ybar: Vec<GroupElement>,
}

impl PairShuffleStatement {
    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn check_shape(&self) -> Result<usize, ShuffleError> {
        let k = self.x.len();
        for actual in [self.y.len(), self.xbar.len(), self.ybar.len()] {
            if actual != k {
                return Err(ShuffleError::LengthMismatch { expected: k, actual });
            }
        }
        if k < 2 {
            return Err(ShuffleError::BatchTooSmall(k));
        }
        Ok(k)
    }

    fn absorb(&self, transcript: &mut Transcript) {
        transcript.append_point(b"g", &self.g);
        transcript.append_point(b"h", &self.h);
        transcript.append_points(b"x", &self.x);
        transcript.append_points(b"y", &self.y);
        transcript.append_points(b"xbar", &self.xbar);
        transcript.append_points(b"ybar", &self.ybar);
    }
}

/// Prover secrets: the permutation and per-pair blinding scalars.
#[derive(Clone)]
pub struct PairShuffleWitness {
    /// Output `i` takes input `permutation[i]`.
    pub permutation: Vec<usize>,
    /// Blinding scalar per input pair.
    pub beta: Vec<Scalar>,
}

impl PairShuffleWitness {
    /// Compute `(X̄, Ȳ)` from the inputs under this witness.
    pub fn apply(
        &self,
        g: &GroupElement,
        h: &GroupElement,
        x: &[GroupElement],
        y: &[GroupElement],
    ) -> Result<(Vec<GroupElement>, Vec<GroupElement>), ShuffleError> {
        self.check(x.len())?;
        if y.len() != x.len() {
            return Err(ShuffleError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        let xbar = self
            .permutation
            .iter()
            .map(|&p| *g * self.beta[p] + x[p])
            .collect();
        let ybar = self
            .permutation
            .iter()
            .map(|&p| *h * self.beta[p] + y[p])
            .collect();
        Ok((xbar, ybar))
    }

    fn check(&self, k: usize) -> Result<(), ShuffleError> {
        for actual in [self.permutation.len(), self.beta.len()] {
            if actual != k {
                return Err(ShuffleError::LengthMismatch { expected: k, actual });
            }
        }
        permutation::validate(&self.permutation)
    }
}

impl std::fmt::Debug for PairShuffleWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairShuffleWitness")
            .field("len", &self.permutation.len())
            .finish_non_exhaustive()
    }
}

/// Non-interactive pair-shuffle proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairShuffleProof {
    /// `Γ = γ·g`.
    pub gamma: GroupElement,
    /// `Aᵢ = aᵢ·g`.
    pub a: Vec<GroupElement>,
    /// `Cᵢ = γ·a_π(i)·g`.
    pub c: Vec<GroupElement>,
    /// `Uᵢ = uᵢ·g`.
    pub u: Vec<GroupElement>,
    /// `Wᵢ = γ·wᵢ·g`.
    pub w: Vec<GroupElement>,
    /// Aggregate commitment over `X`.
    pub lambda1: GroupElement,
    /// Aggregate commitment over `Y`.
    pub lambda2: GroupElement,
    /// `Dᵢ = γ·b_π(i)·g`.
    pub d: Vec<GroupElement>,
    /// `σᵢ = wᵢ + b_π(i)`.
    #[serde(with = "scalars_serde")]
    pub sigma: Vec<Scalar>,
    /// `τ = -τ₀ + Σ bᵢβᵢ`.
    #[serde(with = "scalar_serde")]
    pub tau: Scalar,
    /// Ties `R` and `S` to a single permutation.
    pub simple: SimpleShuffleProof,
}

fn random_vector(k: usize) -> Vec<Scalar> {
    (0..k).map(|_| random_scalar()).collect()
}

fn commit(g: &GroupElement, scalars: &[Scalar]) -> Vec<GroupElement> {
    scalars.iter().map(|s| *g * s).collect()
}

fn weighted_sum(points: &[GroupElement], weights: &[Scalar]) -> GroupElement {
    points.iter().zip(weights).map(|(p, w)| *p * w).sum()
}

/// Produce a pair-shuffle proof for `statement` using `witness`.
pub fn prove(
    transcript: &mut Transcript,
    statement: &PairShuffleStatement,
    witness: &PairShuffleWitness,
) -> Result<PairShuffleProof, ShuffleError> {
    let k = statement.check_shape()?;
    witness.check(k)?;
    let pi = &witness.permutation;
    let beta = &witness.beta;
    let pi_inv = permutation::inverse(pi);
    let g = statement.g;
    let h = statement.h;

    statement.absorb(transcript);

    // Step 1: commitments.
    let u = random_vector(k);
    let w = random_vector(k);
    let a = random_vector(k);
    let tau0 = random_scalar();
    let gamma = random_scalar();

    let gamma_point = g * gamma;
    let a_points = commit(&g, &a);
    let c_points: Vec<GroupElement> = pi.iter().map(|&p| g * (gamma * a[p])).collect();
    let u_points = commit(&g, &u);
    let w_points: Vec<GroupElement> = w.iter().map(|wi| g * (gamma * wi)).collect();

    let wbetasum = pi
        .iter()
        .zip(&w)
        .fold(tau0, |acc, (&p, wi)| acc + *wi * beta[p]);
    let coefficients: Vec<Scalar> = (0..k).map(|i| w[pi_inv[i]] - u[i]).collect();
    let lambda1 = weighted_sum(&statement.x, &coefficients) + g * wbetasum;
    let lambda2 = weighted_sum(&statement.y, &coefficients) + h * wbetasum;

    transcript.append_point(b"gamma", &gamma_point);
    transcript.append_points(b"a", &a_points);
    transcript.append_points(b"c", &c_points);
    transcript.append_points(b"u", &u_points);
    transcript.append_points(b"w", &w_points);
    transcript.append_point(b"lambda1", &lambda1);
    transcript.append_point(b"lambda2", &lambda2);

    // Step 2.
    let rho = transcript.challenge_scalars(b"rho", k);

    // Step 3.
    let b: Vec<Scalar> = rho.iter().zip(&u).map(|(r, ui)| *r - ui).collect();
    let d: Vec<Scalar> = pi.iter().map(|&p| gamma * b[p]).collect();
    let d_points = commit(&g, &d);
    transcript.append_points(b"d", &d_points);

    // Step 4.
    let lambda = transcript.challenge_scalar(b"lambda");

    // Step 5.
    let r: Vec<Scalar> = a.iter().zip(&b).map(|(ai, bi)| *ai + lambda * bi).collect();
    let s: Vec<Scalar> = pi.iter().map(|&p| gamma * r[p]).collect();
    let tau = b
        .iter()
        .zip(beta)
        .fold(-tau0, |acc, (bi, betai)| acc + *bi * betai);
    let sigma: Vec<Scalar> = pi.iter().zip(&w).map(|(&p, wi)| *wi + b[p]).collect();

    transcript.append_scalars(b"sigma", &sigma);
    transcript.append_scalar(b"tau", &tau);

    let simple = simple::prove(transcript, &g, &gamma, &r, &s)?;

    Ok(PairShuffleProof {
        gamma: gamma_point,
        a: a_points,
        c: c_points,
        u: u_points,
        w: w_points,
        lambda1,
        lambda2,
        d: d_points,
        sigma,
        tau,
        simple,
    })
}

/// Verify a pair-shuffle proof.
///
/// # Errors
///
/// [`ShuffleError::InvalidProof`] when any identity fails or the proof has
/// the wrong shape for the statement.
pub fn verify(
    transcript: &mut Transcript,
    statement: &PairShuffleStatement,
    proof: &PairShuffleProof,
) -> Result<(), ShuffleError> {
    let k = statement.check_shape()?;
    let shaped = [
        proof.a.len(),
        proof.c.len(),
        proof.u.len(),
        proof.w.len(),
        proof.d.len(),
        proof.sigma.len(),
    ]
    .iter()
    .all(|&len| len == k);
    if !shaped {
        return Err(ShuffleError::InvalidProof);
    }
    let g = statement.g;
    let h = statement.h;

    statement.absorb(transcript);
    transcript.append_point(b"gamma", &proof.gamma);
    transcript.append_points(b"a", &proof.a);
    transcript.append_points(b"c", &proof.c);
    transcript.append_points(b"u", &proof.u);
    transcript.append_points(b"w", &proof.w);
    transcript.append_point(b"lambda1", &proof.lambda1);
    transcript.append_point(b"lambda2", &proof.lambda2);

    let rho = transcript.challenge_scalars(b"rho", k);
    transcript.append_points(b"d", &proof.d);
    let lambda = transcript.challenge_scalar(b"lambda");
    transcript.append_scalars(b"sigma", &proof.sigma);
    transcript.append_scalar(b"tau", &proof.tau);

    let b_points: Vec<GroupElement> = rho
        .iter()
        .zip(&proof.u)
        .map(|(r, u)| g * r - *u)
        .collect();
    let r_points: Vec<GroupElement> = proof
        .a
        .iter()
        .zip(&b_points)
        .map(|(a, b)| *a + *b * lambda)
        .collect();
    let s_points: Vec<GroupElement> = proof
        .c
        .iter()
        .zip(&proof.d)
        .map(|(c, d)| *c + *d * lambda)
        .collect();

    simple::verify(
        transcript,
        &g,
        &proof.gamma,
        &r_points,
        &s_points,
        &proof.simple,
    )?;

    for i in 0..k {
        if proof.gamma * proof.sigma[i] != proof.w[i] + proof.d[i] {
            return Err(ShuffleError::InvalidProof);
        }
    }

    let lhs1 = proof.lambda1 + g * proof.tau;
    let rhs1 = weighted_sum(&statement.xbar, &proof.sigma) - weighted_sum(&statement.x, &rho);
    if lhs1 != rhs1 {
        return Err(ShuffleError::InvalidProof);
    }

    let lhs2 = proof.lambda2 + h * proof.tau;
    let rhs2 = weighted_sum(&statement.ybar, &proof.sigma) - weighted_sum(&statement.y, &rho);
    if lhs2 != rhs2 {
        return Err(ShuffleError::InvalidProof);
    }

    Ok(())
}
