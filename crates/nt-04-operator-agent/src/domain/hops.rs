//! # Shuffle Hops
//!
//! One agent's contribution to each shuffle direction.
//!
//! | Direction | Keys | Values | Then |
//! |-----------|------|--------|------|
//! | reverse (last → first) | mapped back through `key_map` | sealed to own mix key | pair shuffle |
//! | forward (first → last) | multiplied by `round_key` | opened with own mix secret | pair shuffle |
//!
//! The pair shuffle runs with `g = G`, `h = mix key`, `X = k` copies of the
//! mix key and `Y = keys`. Forwarded keys are `Ȳᵢ − β·h`, i.e. the input keys
//! in permuted order, and each value follows its key.

use std::collections::HashMap;

use nt_01_verifiable_shuffle::{hash_verify, shuffle, PairShuffleProof, PairShuffleStatement};
use serde::{Deserialize, Serialize};
use shared_crypto::{open, seal, GroupElement, MixKeyPair, Scalar};
use shared_types::{score_from_bytes, EncryptedReputationEntry, ReputationEntry};
use tracing::debug;

use crate::error::{AgentError, Result};

/// Proof that a batch is a shuffle of the sender's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopProof {
    /// `(g, h, X, Y, X̄, Ȳ)` as proven.
    pub statement: PairShuffleStatement,
    /// Non-interactive pair-shuffle proof.
    pub proof: PairShuffleProof,
}

/// Keys and values passed between hops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuffleBatch {
    /// Pseudonyms in forwarded order.
    pub keys: Vec<GroupElement>,
    /// Score payloads parallel to `keys`.
    pub values: Vec<Vec<u8>>,
    /// Round generator, forward direction only.
    pub g: Option<GroupElement>,
    /// Absent for batches of at most one entry.
    pub proof: Option<HopProof>,
}

impl ShuffleBatch {
    /// Unshuffled batch.
    pub fn new(keys: Vec<GroupElement>, values: Vec<Vec<u8>>) -> Self {
        Self {
            keys,
            values,
            g: None,
            proof: None,
        }
    }

    /// Batch over a stored encrypted list.
    pub fn from_encrypted(entries: &[EncryptedReputationEntry]) -> Self {
        Self::new(
            entries.iter().map(|e| e.pseudonym).collect(),
            entries.iter().map(|e| e.ciphertext.clone()).collect(),
        )
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pair keys with their still-encrypted values.
    pub fn to_encrypted(&self) -> Vec<EncryptedReputationEntry> {
        self.keys
            .iter()
            .zip(&self.values)
            .map(|(key, value)| EncryptedReputationEntry::new(*key, value.clone()))
            .collect()
    }

    /// Decode values as plaintext scores.
    pub fn to_plain(&self) -> Result<Vec<ReputationEntry>> {
        self.keys
            .iter()
            .zip(&self.values)
            .map(|(key, value)| Ok(ReputationEntry::new(*key, score_from_bytes(value)?)))
            .collect()
    }
}

fn sorted_bytes(points: &[GroupElement]) -> Vec<Vec<u8>> {
    let mut bytes: Vec<Vec<u8>> = points.iter().map(GroupElement::to_bytes).collect();
    bytes.sort();
    bytes
}

/// Check a batch received from the hop whose mix key is `sender_mix_key`.
pub fn verify_hop(batch: &ShuffleBatch, sender_mix_key: &GroupElement) -> Result<()> {
    let k = batch.len();
    if batch.values.len() != k {
        return Err(AgentError::StatementMismatch("values"));
    }
    let hop = match &batch.proof {
        None if k <= 1 => return Ok(()),
        None => return Err(AgentError::MissingProof(k)),
        Some(hop) => hop,
    };

    let statement = &hop.statement;
    if statement.g != GroupElement::generator() {
        return Err(AgentError::StatementMismatch("generator"));
    }
    if statement.h != *sender_mix_key || statement.x.iter().any(|x| x != sender_mix_key) {
        return Err(AgentError::StatementMismatch("mix key"));
    }
    // forwarded keys must be the proven Y column, reordered
    if sorted_bytes(&statement.y) != sorted_bytes(&batch.keys) {
        return Err(AgentError::StatementMismatch("keys"));
    }

    hash_verify(statement, &hop.proof)?;
    debug!(size = k, "[agent] hop proof verified");
    Ok(())
}

/// Pair-shuffle `keys` under this agent's mix key and rebind `values`.
pub fn mix_batch(
    keys: Vec<GroupElement>,
    values: Vec<Vec<u8>>,
    mix: &MixKeyPair,
) -> Result<ShuffleBatch> {
    if keys.len() <= 1 {
        return Ok(ShuffleBatch::new(keys, values));
    }

    let g = GroupElement::generator();
    let h = mix.public();
    let x = vec![h; keys.len()];
    let out = shuffle(&g, &h, &x, &keys)?;

    let shuffled: Vec<GroupElement> = out
        .ybar
        .iter()
        .zip(&out.h_blinding)
        .map(|(ybar, blinding)| *ybar - *blinding)
        .collect();

    let mut by_key: HashMap<GroupElement, Vec<u8>> = keys.into_iter().zip(values).collect();
    let rebound = shuffled
        .iter()
        .map(|key| by_key.remove(key).ok_or(AgentError::UnknownPseudonym))
        .collect::<Result<Vec<_>>>()?;

    let statement = out.prover.statement().clone();
    let proof = out.prover.hash_prove()?;

    Ok(ShuffleBatch {
        keys: shuffled,
        values: rebound,
        g: None,
        proof: Some(HopProof { statement, proof }),
    })
}

/// Reverse hop: unwind this agent's round key, seal every value to its own
/// mix key, shuffle.
pub fn reverse_hop(
    keys: &[GroupElement],
    values: &[Vec<u8>],
    key_map: &HashMap<GroupElement, GroupElement>,
    mix: &MixKeyPair,
) -> Result<ShuffleBatch> {
    let originals = keys
        .iter()
        .map(|key| key_map.get(key).copied().ok_or(AgentError::UnknownPseudonym))
        .collect::<Result<Vec<_>>>()?;
    let recipient = mix.public();
    let sealed = values
        .iter()
        .map(|value| seal(&recipient, value))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    mix_batch(originals, sealed, mix)
}

/// Forward hop: advance the round generator, re-key every pseudonym with
/// `round_key`, open this agent's encryption layer, shuffle.
///
/// `key_map` learns `new key → received key` for the next reverse pass.
pub fn forward_hop(
    keys: &[GroupElement],
    values: &[Vec<u8>],
    g: Option<GroupElement>,
    round_key: &Scalar,
    mix: &MixKeyPair,
    key_map: &mut HashMap<GroupElement, GroupElement>,
) -> Result<ShuffleBatch> {
    let g = match g {
        Some(g) => g * round_key,
        None => GroupElement::mul_base(round_key),
    };

    let mut new_keys = Vec::with_capacity(keys.len());
    let mut opened = Vec::with_capacity(values.len());
    for (key, value) in keys.iter().zip(values) {
        let new_key = *key * round_key;
        opened.push(open(mix.secret(), value)?);
        key_map.insert(new_key, *key);
        new_keys.push(new_key);
    }

    let mut batch = mix_batch(new_keys, opened, mix)?;
    batch.g = Some(g);
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::random_scalar;
    use shared_types::score_to_bytes;

    struct Hop {
        mix: MixKeyPair,
        round_key: Scalar,
        key_map: HashMap<GroupElement, GroupElement>,
    }

    impl Hop {
        fn new() -> Self {
            Self {
                mix: MixKeyPair::generate(),
                round_key: random_scalar(),
                key_map: HashMap::new(),
            }
        }

        fn register(&mut self, key: GroupElement) -> GroupElement {
            let new_key = key * self.round_key;
            self.key_map.insert(new_key, key);
            new_key
        }

        fn rotate(&mut self) {
            self.round_key = random_scalar();
            self.key_map.clear();
        }
    }

    /// Register subjects, run reverse then forward across `n` hops.
    fn round_trip(n: usize, scores: &[f64]) -> (Vec<Scalar>, ShuffleBatch) {
        let mut hops: Vec<Hop> = (0..n).map(|_| Hop::new()).collect();
        let secrets: Vec<Scalar> = scores.iter().map(|_| random_scalar()).collect();

        let mut buffered = Vec::new();
        for secret in &secrets {
            let mut key = GroupElement::mul_base(secret);
            for hop in hops.iter_mut() {
                key = hop.register(key);
            }
            buffered.push(key);
        }

        let values: Vec<Vec<u8>> = scores.iter().map(|s| score_to_bytes(*s).to_vec()).collect();
        let mut batch = ShuffleBatch::new(buffered, values);
        for i in (0..n).rev() {
            if i + 1 < n {
                verify_hop(&batch, &hops[i + 1].mix.public()).unwrap();
            }
            let hop = &mut hops[i];
            batch = reverse_hop(&batch.keys, &batch.values, &hop.key_map, &hop.mix).unwrap();
            hop.rotate();
        }

        let mut g = None;
        for i in 0..n {
            if i > 0 {
                verify_hop(&batch, &hops[i - 1].mix.public()).unwrap();
            }
            let hop = &mut hops[i];
            batch = forward_hop(
                &batch.keys,
                &batch.values,
                g,
                &hop.round_key,
                &hop.mix,
                &mut hop.key_map,
            )
            .unwrap();
            g = batch.g;
        }
        (secrets, batch)
    }

    #[test]
    fn test_round_trip_preserves_subjects_and_scores() {
        let scores = [0.1, 0.25, 0.5, 0.75];
        let (secrets, batch) = round_trip(3, &scores);
        let g = batch.g.unwrap();
        let entries = batch.to_plain().unwrap();
        assert_eq!(entries.len(), 4);

        for (secret, score) in secrets.iter().zip(scores) {
            let pseudonym = g * secret;
            let entry = entries.iter().find(|e| e.pseudonym == pseudonym).unwrap();
            assert_eq!(entry.score, score);
            // new pseudonym differs from the registration key
            assert_ne!(pseudonym, GroupElement::mul_base(secret));
        }
    }

    #[test]
    fn test_single_entry_skips_proof() {
        let (secrets, batch) = round_trip(2, &[0.3]);
        assert!(batch.proof.is_none());
        let entries = batch.to_plain().unwrap();
        assert_eq!(entries[0].pseudonym, batch.g.unwrap() * secrets[0]);
        assert_eq!(entries[0].score, 0.3);
    }

    #[test]
    fn test_empty_list_round_trip() {
        let (_, batch) = round_trip(3, &[]);
        assert!(batch.is_empty());
        assert!(batch.g.is_some());
    }

    #[test]
    fn test_tampered_keys_rejected() {
        let mix = MixKeyPair::generate();
        let keys: Vec<GroupElement> = (0..3).map(|_| GroupElement::random()).collect();
        let values = vec![vec![1u8]; 3];
        let mut batch = mix_batch(keys, values, &mix).unwrap();
        verify_hop(&batch, &mix.public()).unwrap();

        batch.keys[0] = GroupElement::random();
        assert!(matches!(
            verify_hop(&batch, &mix.public()),
            Err(AgentError::StatementMismatch("keys"))
        ));
    }

    #[test]
    fn test_wrong_sender_rejected() {
        let mix = MixKeyPair::generate();
        let keys: Vec<GroupElement> = (0..3).map(|_| GroupElement::random()).collect();
        let batch = mix_batch(keys, vec![vec![0u8]; 3], &mix).unwrap();
        let other = MixKeyPair::generate();
        assert!(matches!(
            verify_hop(&batch, &other.public()),
            Err(AgentError::StatementMismatch("mix key"))
        ));
    }

    #[test]
    fn test_missing_proof_rejected() {
        let keys: Vec<GroupElement> = (0..2).map(|_| GroupElement::random()).collect();
        let batch = ShuffleBatch::new(keys, vec![vec![0u8]; 2]);
        assert!(matches!(
            verify_hop(&batch, &GroupElement::generator()),
            Err(AgentError::MissingProof(2))
        ));
    }

    #[test]
    fn test_forged_proof_rejected() {
        let mix = MixKeyPair::generate();
        let keys: Vec<GroupElement> = (0..4).map(|_| GroupElement::random()).collect();
        let mut batch = mix_batch(keys, vec![vec![0u8]; 4], &mix).unwrap();
        let hop = batch.proof.as_mut().unwrap();
        hop.statement.xbar[1] = GroupElement::random();
        assert!(matches!(
            verify_hop(&batch, &mix.public()),
            Err(AgentError::Shuffle(_))
        ));
    }

    #[test]
    fn test_unknown_key_in_reverse_hop() {
        let mix = MixKeyPair::generate();
        let result = reverse_hop(&[GroupElement::random()], &[vec![0u8]], &HashMap::new(), &mix);
        assert!(matches!(result, Err(AgentError::UnknownPseudonym)));
    }
}
