//! # Block
//!
//! Immutable once hashed. Two hashes are defined over a block:
//!
//! - the **block hash**, over every field, signed by the creator and used as
//!   the next block's `prev_hash` and as the final winner-selection tiebreak;
//! - the **proof-of-work hash**, over `(serial, prev_hash, records_root,
//!   reputation_root, creator_public_key, timestamp)` only, where the
//!   timestamp doubles as the mining nonce.

use serde::{Deserialize, Serialize};
use shared_crypto::group::{decode_list, encode_list};
use shared_crypto::{merkle_root, sha256_concat, GroupElement, Hash, SchnorrPublicKey};
use shared_types::{
    list_bytes, records_bytes, score_to_bytes, split_entries, zip_entries, Record,
    ReputationEntry,
};

use crate::error::{LedgerError, Result};

/// A ledger block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Serial number (`K0`).
    pub serial: i64,
    /// Mining nonce; zero for genesis and sync blocks.
    pub timestamp: i64,
    /// Hash of the previous block, empty for genesis.
    pub prev_hash: Vec<u8>,
    /// Obfuscation granularity `d` chosen in the last cycle.
    pub obfuscation_factor: i64,
    /// Chain length when the block was built (`Nb`).
    pub chain_length: i64,
    /// Blocks the creator had produced when building this one (`Npk`).
    pub creator_work_count: i64,
    /// Raw records committed (`Nd`).
    pub record_count: i64,
    /// Merkle root of the raw-record buffer, empty for sync blocks.
    pub records_root: Vec<u8>,
    /// Merkle root of the reputation list.
    pub reputation_root: Vec<u8>,
    /// Creator's Schnorr public key.
    pub creator_public_key: Vec<u8>,
    /// Encoded pseudonym list.
    pub pseudonyms: Vec<u8>,
    /// Scores parallel to `pseudonyms`.
    pub scores: Vec<f64>,
}

impl Block {
    /// Genesis block created from the first synced list and round generator.
    pub fn genesis(
        entries: &[ReputationEntry],
        g: &GroupElement,
        creator: &SchnorrPublicKey,
    ) -> Self {
        let (pseudonyms, scores) = split_entries(entries);
        Self {
            serial: 0,
            timestamp: 0,
            prev_hash: Vec::new(),
            obfuscation_factor: 0,
            chain_length: 0,
            creator_work_count: 0,
            record_count: 0,
            records_root: Vec::new(),
            reputation_root: sync_root(&pseudonyms, &scores, g).to_vec(),
            creator_public_key: creator.as_bytes().to_vec(),
            pseudonyms: encode_list(&pseudonyms),
            scores,
        }
    }

    /// Block appended when a new list is synced after the forward shuffle.
    #[allow(clippy::too_many_arguments)]
    pub fn sync(
        previous: &Block,
        entries: &[ReputationEntry],
        g: &GroupElement,
        obfuscation_factor: i64,
        chain_length: i64,
        creator_work_count: i64,
        creator: &SchnorrPublicKey,
    ) -> Self {
        let (pseudonyms, scores) = split_entries(entries);
        Self {
            serial: 0,
            timestamp: 0,
            prev_hash: previous.hash().to_vec(),
            obfuscation_factor,
            chain_length,
            creator_work_count,
            record_count: 0,
            records_root: Vec::new(),
            reputation_root: sync_root(&pseudonyms, &scores, g).to_vec(),
            creator_public_key: creator.as_bytes().to_vec(),
            pseudonyms: encode_list(&pseudonyms),
            scores,
        }
    }

    /// Block hash over every field.
    pub fn hash(&self) -> Hash {
        let serial = self.serial.to_be_bytes();
        let timestamp = self.timestamp.to_be_bytes();
        let factor = self.obfuscation_factor.to_be_bytes();
        let length = self.chain_length.to_be_bytes();
        let work = self.creator_work_count.to_be_bytes();
        let count = self.record_count.to_be_bytes();
        let scores: Vec<u8> = self.scores.iter().flat_map(|s| score_to_bytes(*s)).collect();

        sha256_concat(&[
            &serial,
            &timestamp,
            &self.prev_hash,
            &factor,
            &length,
            &work,
            &count,
            &self.records_root,
            &self.reputation_root,
            &self.creator_public_key,
            &self.pseudonyms,
            &scores,
        ])
    }

    /// Proof-of-work hash of this block.
    pub fn pow_hash(&self) -> Hash {
        pow_hash(
            self.serial,
            &self.prev_hash,
            &self.records_root,
            &self.reputation_root,
            &self.creator_public_key,
            self.timestamp,
        )
    }

    /// Decode the committed reputation list.
    pub fn entries(&self) -> Result<Vec<ReputationEntry>> {
        let pseudonyms = decode_list(&self.pseudonyms)?;
        Ok(zip_entries(&pseudonyms, &self.scores)?)
    }

    /// Whether `key` created this block.
    pub fn created_by(&self, key: &SchnorrPublicKey) -> bool {
        self.creator_public_key.as_slice() == key.as_bytes()
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Inverse of [`Block::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

/// Proof-of-work hash for a candidate nonce `t`.
pub fn pow_hash(
    serial: i64,
    prev_hash: &[u8],
    records_root: &[u8],
    reputation_root: &[u8],
    creator_public_key: &[u8],
    t: i64,
) -> Hash {
    sha256_concat(&[
        &serial.to_be_bytes(),
        prev_hash,
        records_root,
        reputation_root,
        creator_public_key,
        &t.to_be_bytes(),
    ])
}

/// Merkle root over the serialized record buffer.
pub fn records_root(records: &[Record]) -> Result<Hash> {
    Ok(merkle_root(&[records_bytes(records)?]))
}

/// Merkle root over the list bytes of a mined block.
pub fn reputation_root(entries: &[ReputationEntry]) -> Hash {
    let (pseudonyms, scores) = split_entries(entries);
    merkle_root(&[list_bytes(&pseudonyms, &scores)])
}

/// Merkle root over the list bytes and round generator of a sync block.
fn sync_root(pseudonyms: &[GroupElement], scores: &[f64], g: &GroupElement) -> Hash {
    merkle_root(&[list_bytes(pseudonyms, scores), g.to_bytes()])
}
