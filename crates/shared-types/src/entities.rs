//! # Core Domain Entities
//!
//! Pseudonym-keyed records that travel between agents.
//!
//! ## Clusters
//!
//! - **Reputation list**: [`ReputationEntry`], [`EncryptedReputationEntry`]
//! - **Raw behaviour**: [`Record`]
//! - **Addressing**: [`AgentAddress`]

use serde::{Deserialize, Serialize};
use shared_crypto::GroupElement;

use crate::encoding::score_from_bytes;
use crate::{Result, TypesError};

/// Network address of an agent, collector or relay.
pub type AgentAddress = std::net::SocketAddr;

// =============================================================================
// REPUTATION LIST
// =============================================================================

/// Plaintext trust record for one subject pseudonym.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationEntry {
    /// One-time pseudonym, rotated every round.
    pub pseudonym: GroupElement,
    /// Trust score in `[0, 1]`.
    pub score: f64,
}

impl ReputationEntry {
    /// Create an entry.
    pub fn new(pseudonym: GroupElement, score: f64) -> Self {
        Self { pseudonym, score }
    }
}

/// Trust record whose score is sealed to a single agent's mix key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedReputationEntry {
    /// One-time pseudonym.
    pub pseudonym: GroupElement,
    /// Anonymous-encryption envelope (or raw score bytes at the start of a pass).
    pub ciphertext: Vec<u8>,
}

impl EncryptedReputationEntry {
    /// Create an entry.
    pub fn new(pseudonym: GroupElement, ciphertext: Vec<u8>) -> Self {
        Self {
            pseudonym,
            ciphertext,
        }
    }

    /// Interpret the payload as an unencrypted little-endian score.
    pub fn plain_score(&self) -> Result<f64> {
        score_from_bytes(&self.ciphertext)
    }
}

/// Split a list into parallel pseudonym and score arrays.
pub fn split_entries(entries: &[ReputationEntry]) -> (Vec<GroupElement>, Vec<f64>) {
    entries.iter().map(|e| (e.pseudonym, e.score)).unzip()
}

/// Zip parallel pseudonym and score arrays back into a list.
///
/// # Errors
///
/// Returns [`TypesError::LengthMismatch`] when the arrays differ in length.
pub fn zip_entries(pseudonyms: &[GroupElement], scores: &[f64]) -> Result<Vec<ReputationEntry>> {
    if pseudonyms.len() != scores.len() {
        return Err(TypesError::LengthMismatch {
            pseudonyms: pseudonyms.len(),
            scores: scores.len(),
        });
    }
    Ok(pseudonyms
        .iter()
        .zip(scores)
        .map(|(p, s)| ReputationEntry::new(*p, *s))
        .collect())
}

// =============================================================================
// RAW BEHAVIOUR
// =============================================================================

/// One behavioural observation for a subject, as delivered by a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Pseudonym the observation belongs to.
    pub pseudonym: GroupElement,
    /// Feature vector compared against the reference models.
    pub features: Vec<f64>,
}

impl Record {
    /// Create a record.
    pub fn new(pseudonym: GroupElement, features: Vec<f64>) -> Self {
        Self {
            pseudonym,
            features,
        }
    }

    /// Bytes covered by the collector's signature.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TypesError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score_to_bytes;

    #[test]
    fn test_zip_split_inverse() {
        let p = vec![GroupElement::random(), GroupElement::random()];
        let s = vec![0.25, 0.75];
        let entries = zip_entries(&p, &s).unwrap();
        let (p2, s2) = split_entries(&entries);
        assert_eq!(p, p2);
        assert_eq!(s, s2);
    }

    #[test]
    fn test_zip_length_mismatch() {
        let p = vec![GroupElement::random()];
        let result = zip_entries(&p, &[]);
        assert!(matches!(
            result,
            Err(TypesError::LengthMismatch {
                pseudonyms: 1,
                scores: 0
            })
        ));
    }

    #[test]
    fn test_plain_score() {
        let entry = EncryptedReputationEntry::new(GroupElement::random(), score_to_bytes(0.5).to_vec());
        assert_eq!(entry.plain_score().unwrap(), 0.5);
    }

    #[test]
    fn test_record_canonical_bytes_stable() {
        let record = Record::new(GroupElement::generator(), vec![1.0, 2.0]);
        assert_eq!(record.canonical_bytes().unwrap(), record.clone().canonical_bytes().unwrap());

        let other = Record::new(GroupElement::generator(), vec![1.0, 2.5]);
        assert_ne!(record.canonical_bytes().unwrap(), other.canonical_bytes().unwrap());
    }

    #[test]
    fn test_encrypted_entry_bincode() {
        let entry = EncryptedReputationEntry::new(GroupElement::random(), vec![1, 2, 3]);
        let bytes = bincode::serialize(&entry).unwrap();
        let back: EncryptedReputationEntry = bincode::deserialize(&bytes).unwrap();
        assert_eq!(entry, back);
    }
}
