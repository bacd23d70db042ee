//! # List and Score Encodings
//!
//! Byte layouts committed into block hashes and Merkle roots.
//!
//! ```text
//! list_bytes = score_0 (f64 LE) || ... || score_{k-1} || encode_list(pseudonyms)
//! ```

use shared_crypto::group::encode_list;
use shared_crypto::GroupElement;

use crate::{Record, Result, TypesError};

/// Encode a score as 8 little-endian bytes.
#[inline]
pub fn score_to_bytes(score: f64) -> [u8; 8] {
    score.to_le_bytes()
}

/// Decode a score from exactly 8 little-endian bytes.
pub fn score_from_bytes(bytes: &[u8]) -> Result<f64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| TypesError::InvalidScore(bytes.len()))?;
    Ok(f64::from_le_bytes(raw))
}

/// Round to six decimal places, halves away from zero.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Canonical reputation-list bytes.
pub fn list_bytes(pseudonyms: &[GroupElement], scores: &[f64]) -> Vec<u8> {
    let mut out: Vec<u8> = scores.iter().flat_map(|s| score_to_bytes(*s)).collect();
    out.extend_from_slice(&encode_list(pseudonyms));
    out
}

/// Serialized record buffer committed as the records root.
pub fn records_bytes(records: &[Record]) -> Result<Vec<u8>> {
    bincode::serialize(records).map_err(|e| TypesError::Serialization(e.to_string()))
}
