//! # Trust Obfuscation
//!
//! Generalizes scores to the lower edge of one of `d` equal bins over
//! `(0, 1]`. The worst-case re-identification probability of a generalized
//! list is the maximum over non-empty bins of `1 / occupancy`.
//!
//! Granularities are tried from `max_d` down to `min_d`; the first one whose
//! worst case stays within the threshold is used, otherwise `max_d`.

use shared_types::{round6, ReputationEntry};

/// Granularity picked for a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObfuscationChoice {
    /// Number of bins.
    pub d: u32,
    /// True when no candidate met the threshold.
    pub fallback: bool,
    /// Worst-case probability under `d`.
    pub worst_case: f64,
}

/// Zero-based bin of `score` among `d` bins; non-positive scores sit in bin 0.
pub fn bin_index(score: f64, d: u32) -> usize {
    if score <= 0.0 {
        return 0;
    }
    let width = 1.0 / f64::from(d);
    (1..=d)
        .find(|&c| score > f64::from(c - 1) * width && score <= f64::from(c) * width)
        .map_or(d as usize - 1, |c| (c - 1) as usize)
}

/// Lower edge of the bin holding `score`. Non-positive scores are kept.
pub fn generalize(score: f64, d: u32) -> f64 {
    if score <= 0.0 {
        return score;
    }
    round6(bin_index(score, d) as f64 / f64::from(d))
}

/// `max(1 / occupancy)` over non-empty bins, 0 for an empty list.
pub fn worst_case_probability(scores: &[f64], d: u32) -> f64 {
    let mut occupancy = vec![0u32; d as usize];
    for &score in scores {
        occupancy[bin_index(score, d)] += 1;
    }
    occupancy
        .into_iter()
        .filter(|&count| count > 0)
        .map(|count| 1.0 / f64::from(count))
        .fold(0.0, f64::max)
}

/// Search granularities from `max_d` down to `min_d`.
pub fn choose_d(scores: &[f64], max_d: u32, min_d: u32, threshold: f64) -> ObfuscationChoice {
    for d in (min_d.max(1)..=max_d).rev() {
        let worst_case = worst_case_probability(scores, d);
        if worst_case <= threshold {
            return ObfuscationChoice {
                d,
                fallback: false,
                worst_case,
            };
        }
    }
    ObfuscationChoice {
        d: max_d,
        fallback: true,
        worst_case: worst_case_probability(scores, max_d),
    }
}

/// Generalize every score in place under `d`.
pub fn apply(entries: &mut [ReputationEntry], d: u32) {
    for entry in entries.iter_mut() {
        entry.score = generalize(entry.score, d);
    }
}
