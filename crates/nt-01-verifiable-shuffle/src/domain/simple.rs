//! # Simple k-Shuffle
//!
//! Proves that two lists of exponents committed as `Xᵢ = xᵢ·G` and
//! `Yᵢ = yᵢ·G` satisfy `{yᵢ} = γ·{xᵢ}` as multisets, where `Γ = γ·G`.
//! Used by the pair shuffle to tie its response vectors to one permutation.
//!
//! ```text
//! challenge t        x̂ = x - t,  ŷ = y - γt
//! commit Θ (2k)      Θ₀ = -θ₀ŷ₀·G
//!                    Θᵢ = (θᵢ₋₁x̂ᵢ - θᵢŷᵢ)·G        1 ≤ i < k
//!                    Θᵢ = (θᵢ₋₁γ - θᵢ)·G            k ≤ i < 2k-1
//!                    Θ₂ₖ₋₁ = θ₂ₖ₋₂γ·G
//! challenge c
//! respond α (2k-1)   αᵢ = θᵢ + c·∏ⱼ≤ᵢ x̂ⱼ/ŷⱼ         i < k
//!                    α₂ₖ₋₁₋ₘ = θ₂ₖ₋₁₋ₘ + c·γ⁻ᵐ        1 ≤ m < k
//! ```

use serde::{Deserialize, Serialize};
use shared_crypto::group::{invert, scalars_serde};
use shared_crypto::{random_scalar, GroupElement, Scalar};

use super::errors::ShuffleError;
use super::transcript::Transcript;

/// Non-interactive simple-shuffle proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleShuffleProof {
    /// Commitments `Θ`, length `2k`.
    pub theta: Vec<GroupElement>,
    /// Responses `α`, length `2k - 1`.
    #[serde(with = "scalars_serde")]
    pub alpha: Vec<Scalar>,
}

fn absorb_statement(
    transcript: &mut Transcript,
    g: &GroupElement,
    gamma: &GroupElement,
    x: &[GroupElement],
    y: &[GroupElement],
) {
    transcript.append_point(b"ss-g", g);
    transcript.append_point(b"ss-gamma", gamma);
    transcript.append_points(b"ss-x", x);
    transcript.append_points(b"ss-y", y);
}

/// Prove `y = γ·x` up to permutation, given the exponents.
pub fn prove(
    transcript: &mut Transcript,
    g: &GroupElement,
    gamma: &Scalar,
    x: &[Scalar],
    y: &[Scalar],
) -> Result<SimpleShuffleProof, ShuffleError> {
    let k = x.len();
    if k == 0 {
        return Err(ShuffleError::BatchTooSmall(0));
    }
    if y.len() != k {
        return Err(ShuffleError::LengthMismatch {
            expected: k,
            actual: y.len(),
        });
    }

    let gamma_point = *g * gamma;
    let x_points: Vec<GroupElement> = x.iter().map(|xi| *g * xi).collect();
    let y_points: Vec<GroupElement> = y.iter().map(|yi| *g * yi).collect();
    absorb_statement(transcript, g, &gamma_point, &x_points, &y_points);

    let t = transcript.challenge_scalar(b"ss-t");
    let gamma_t = *gamma * t;
    let x_hat: Vec<Scalar> = x.iter().map(|xi| *xi - t).collect();
    let y_hat: Vec<Scalar> = y.iter().map(|yi| *yi - gamma_t).collect();

    let theta: Vec<Scalar> = (0..2 * k - 1).map(|_| random_scalar()).collect();
    let mut commitments = Vec::with_capacity(2 * k);
    commitments.push(*g * (-(theta[0] * y_hat[0])));
    for i in 1..k {
        commitments.push(*g * (theta[i - 1] * x_hat[i] - theta[i] * y_hat[i]));
    }
    for i in k..2 * k - 1 {
        commitments.push(*g * (theta[i - 1] * gamma - theta[i]));
    }
    commitments.push(*g * (theta[2 * k - 2] * gamma));
    transcript.append_points(b"ss-theta", &commitments);

    let c = transcript.challenge_scalar(b"ss-c");

    let mut alpha = Vec::with_capacity(2 * k - 1);
    let mut running = c;
    for i in 0..k {
        let y_inv = invert(&y_hat[i]).map_err(|_| ShuffleError::DegenerateSecret)?;
        running = running * x_hat[i] * y_inv;
        alpha.push(theta[i] + running);
    }

    // tail[m - 1] = c·γ^(-m)
    let gamma_inv = invert(gamma).map_err(|_| ShuffleError::DegenerateSecret)?;
    let mut tail = Vec::with_capacity(k.saturating_sub(1));
    let mut power = c;
    for _ in 1..k {
        power *= gamma_inv;
        tail.push(power);
    }
    for i in k..2 * k - 1 {
        let m = 2 * k - 1 - i;
        alpha.push(theta[i] + tail[m - 1]);
    }

    Ok(SimpleShuffleProof {
        theta: commitments,
        alpha,
    })
}

/// Verify a simple-shuffle proof against public commitments.
pub fn verify(
    transcript: &mut Transcript,
    g: &GroupElement,
    gamma: &GroupElement,
    x: &[GroupElement],
    y: &[GroupElement],
    proof: &SimpleShuffleProof,
) -> Result<(), ShuffleError> {
    let k = x.len();
    if k == 0 {
        return Err(ShuffleError::BatchTooSmall(0));
    }
    if y.len() != k {
        return Err(ShuffleError::LengthMismatch {
            expected: k,
            actual: y.len(),
        });
    }
    if proof.theta.len() != 2 * k || proof.alpha.len() != 2 * k - 1 {
        return Err(ShuffleError::InvalidProof);
    }

    absorb_statement(transcript, g, gamma, x, y);
    let t = transcript.challenge_scalar(b"ss-t");
    let x_hat: Vec<GroupElement> = x.iter().map(|xi| *xi - *g * t).collect();
    let y_hat: Vec<GroupElement> = y.iter().map(|yi| *yi - *gamma * t).collect();

    transcript.append_points(b"ss-theta", &proof.theta);
    let c = transcript.challenge_scalar(b"ss-c");

    let theta = &proof.theta;
    let alpha = &proof.alpha;

    if x_hat[0] * c - y_hat[0] * alpha[0] != theta[0] {
        return Err(ShuffleError::InvalidProof);
    }
    for i in 1..k {
        if x_hat[i] * alpha[i - 1] - y_hat[i] * alpha[i] != theta[i] {
            return Err(ShuffleError::InvalidProof);
        }
    }
    for i in k..2 * k - 1 {
        if *gamma * alpha[i - 1] - *g * alpha[i] != theta[i] {
            return Err(ShuffleError::InvalidProof);
        }
    }
    if *gamma * alpha[2 * k - 2] - *g * c != theta[2 * k - 1] {
        return Err(ShuffleError::InvalidProof);
    }
    Ok(())
}
