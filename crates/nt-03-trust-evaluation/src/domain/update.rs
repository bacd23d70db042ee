//! # Score Update and Time Decay
//!
//! ```text
//! tf  = exp(-|K - u| / t)
//! new = 1/(tf+1) · (IN - k·IA)/(IN + k·IA) + tf/(tf+1) · v     (IN = 0 → 1)
//! ```
//!
//! `K` is the serial of the previous block and `u` the subject's round marker.
//! Results are rounded to six decimals and clamped to `[0, 1]`.

use std::collections::HashMap;

use shared_crypto::GroupElement;
use shared_types::{round6, ReputationEntry};

use super::classifier::Tally;

/// Round marker `u` per pseudonym: the block serial at which the subject's
/// score was last refreshed from behaviour.
#[derive(Debug, Clone, Default)]
pub struct RoundMarkers {
    markers: HashMap<GroupElement, i64>,
}

impl RoundMarkers {
    /// Empty marker table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker for `pseudonym`; unseen subjects read as 0.
    pub fn get(&self, pseudonym: &GroupElement) -> i64 {
        self.markers.get(pseudonym).copied().unwrap_or(0)
    }

    /// Set the marker for `pseudonym`.
    pub fn set(&mut self, pseudonym: GroupElement, marker: i64) {
        self.markers.insert(pseudonym, marker);
    }

    /// Drop every marker and start every listed subject at 0.
    pub fn reset(&mut self, entries: &[ReputationEntry]) {
        self.markers.clear();
        for entry in entries {
            self.markers.insert(entry.pseudonym, 0);
        }
    }

    /// Number of tracked subjects.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// True when no subject is tracked.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// `exp(-|K - u| / t)`.
pub fn time_factor(k: i64, u: i64, decay_t: f64) -> f64 {
    (-((k - u).abs() as f64) / decay_t).exp()
}

/// One subject's updated score before clamping.
pub fn updated_score(previous: f64, tally: Tally, tf: f64, k_adj: f64) -> f64 {
    let normal = if tally.normal == 0 { 1.0 } else { f64::from(tally.normal) };
    let abnormal_factor = k_adj * f64::from(tally.abnormal);
    let behaviour = (normal - abnormal_factor) / (normal + abnormal_factor);
    (1.0 / (tf + 1.0)) * behaviour + (tf / (tf + 1.0)) * previous
}

fn finish(score: f64) -> f64 {
    round6(score).clamp(0.0, 1.0)
}

/// Apply the behaviour update to every listed subject and move its marker to `k + 1`.
pub fn apply_update(
    entries: &mut [ReputationEntry],
    markers: &mut RoundMarkers,
    tallies: &HashMap<GroupElement, Tally>,
    k: i64,
    k_adj: f64,
    decay_t: f64,
) {
    for entry in entries.iter_mut() {
        let tf = time_factor(k, markers.get(&entry.pseudonym), decay_t);
        let tally = tallies.get(&entry.pseudonym).copied().unwrap_or_default();
        entry.score = finish(updated_score(entry.score, tally, tf, k_adj));
        markers.set(entry.pseudonym, k + 1);
    }
}

/// Decay every score by `tf/(tf+1)` and reset every marker to 0.
pub fn apply_time_delay(
    entries: &mut [ReputationEntry],
    markers: &mut RoundMarkers,
    k: i64,
    decay_t: f64,
) {
    for entry in entries.iter_mut() {
        let tf = time_factor(k, markers.get(&entry.pseudonym), decay_t);
        entry.score = finish(tf / (tf + 1.0) * entry.score);
        markers.set(entry.pseudonym, 0);
    }
}
