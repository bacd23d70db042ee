//! Nearest-reference behaviour classifier.

use std::collections::HashMap;

use shared_crypto::GroupElement;
use shared_types::Record;
use tracing::warn;

use super::models::ReferenceModels;
use crate::error::{Result, TrustError};

/// Classification of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Closer to the normal model.
    Normal,
    /// At least as close to the abnormal model.
    Abnormal,
}

/// Per-subject record counts (`IN`, `IA`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Normal records.
    pub normal: u32,
    /// Abnormal records.
    pub abnormal: u32,
}

/// Euclidean distance.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Classify a feature vector; ties go to [`Behaviour::Abnormal`].
pub fn classify(models: &ReferenceModels, features: &[f64]) -> Result<Behaviour> {
    if features.len() != models.dimension() {
        return Err(TrustError::DimensionMismatch {
            expected: models.dimension(),
            actual: features.len(),
        });
    }
    if distance(&models.abnormal, features) <= distance(&models.normal, features) {
        Ok(Behaviour::Abnormal)
    } else {
        Ok(Behaviour::Normal)
    }
}

/// Count normal and abnormal records per pseudonym. Records with the wrong
/// dimension are skipped.
pub fn tally(models: &ReferenceModels, records: &[Record]) -> HashMap<GroupElement, Tally> {
    let mut counts: HashMap<GroupElement, Tally> = HashMap::new();
    for record in records {
        match classify(models, &record.features) {
            Ok(behaviour) => {
                let entry = counts.entry(record.pseudonym).or_default();
                match behaviour {
                    Behaviour::Normal => entry.normal += 1,
                    Behaviour::Abnormal => entry.abnormal += 1,
                }
            }
            Err(e) => warn!(pseudonym = %record.pseudonym, error = %e, "[nt-03] record skipped"),
        }
    }
    counts
}
