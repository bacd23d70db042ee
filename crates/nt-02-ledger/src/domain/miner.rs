//! # Proof-of-Work Search
//!
//! Scans the timestamp nonce `t` upward from zero until the proof-of-work
//! hash falls below the creator-scaled target. The caller's stop predicate
//! is polled every [`CANCEL_CHECK_INTERVAL`] attempts, which is how a block
//! arriving from a peer cancels the search.

use primitive_types::U256;
use shared_crypto::group::encode_list;
use shared_crypto::SchnorrPublicKey;
use shared_types::{split_entries, Record, ReputationEntry};
use tracing::{debug, instrument};

use super::block::{pow_hash, records_root, reputation_root, Block};
use super::difficulty::{meets_target, scaled_target};
use crate::error::Result;

/// Attempts between stop-predicate polls.
pub const CANCEL_CHECK_INTERVAL: i64 = 64;

/// Everything of a mined block except its nonce.
#[derive(Debug, Clone)]
pub struct MiningTemplate {
    serial: i64,
    prev_hash: Vec<u8>,
    chain_length: i64,
    creator_work_count: i64,
    record_count: i64,
    records_root: Vec<u8>,
    reputation_root: Vec<u8>,
    creator_public_key: Vec<u8>,
    pseudonyms: Vec<u8>,
    scores: Vec<f64>,
}

impl MiningTemplate {
    /// Build the template for the block following `previous`.
    pub fn new(
        previous: &Block,
        chain_length: usize,
        creator_work_count: i64,
        records: &[Record],
        entries: &[ReputationEntry],
        creator: &SchnorrPublicKey,
    ) -> Result<Self> {
        let (pseudonyms, scores) = split_entries(entries);
        Ok(Self {
            serial: previous.serial + 1,
            prev_hash: previous.hash().to_vec(),
            chain_length: chain_length as i64,
            creator_work_count,
            record_count: records.len() as i64,
            records_root: records_root(records)?.to_vec(),
            reputation_root: reputation_root(entries).to_vec(),
            creator_public_key: creator.as_bytes().to_vec(),
            pseudonyms: encode_list(&pseudonyms),
            scores,
        })
    }

    /// Serial of the block being mined.
    pub fn serial(&self) -> i64 {
        self.serial
    }

    /// Target this creator must beat.
    pub fn target(&self, tag: U256) -> U256 {
        scaled_target(tag, self.chain_length, self.creator_work_count)
    }

    fn pow_hash_at(&self, t: i64) -> [u8; 32] {
        pow_hash(
            self.serial,
            &self.prev_hash,
            &self.records_root,
            &self.reputation_root,
            &self.creator_public_key,
            t,
        )
    }

    /// Materialize the block for nonce `t`.
    pub fn block_at(&self, t: i64) -> Block {
        Block {
            serial: self.serial,
            timestamp: t,
            prev_hash: self.prev_hash.clone(),
            obfuscation_factor: 0,
            chain_length: self.chain_length,
            creator_work_count: self.creator_work_count,
            record_count: self.record_count,
            records_root: self.records_root.clone(),
            reputation_root: self.reputation_root.clone(),
            creator_public_key: self.creator_public_key.clone(),
            pseudonyms: self.pseudonyms.clone(),
            scores: self.scores.clone(),
        }
    }
}

/// Result of a mining run.
#[derive(Debug, Clone, PartialEq)]
pub enum MiningOutcome {
    /// A nonce below target was found.
    Found(Block),
    /// The stop predicate fired first.
    Cancelled {
        /// Nonces tried before stopping.
        attempts: i64,
    },
    /// The whole nonce space was searched.
    Exhausted,
}

/// Search `t ∈ [0, i64::MAX)` for a valid proof of work.
#[instrument(skip_all, fields(serial = template.serial))]
pub fn mine(
    template: &MiningTemplate,
    tag: U256,
    mut should_stop: impl FnMut() -> bool,
) -> MiningOutcome {
    let target = template.target(tag);
    let mut t: i64 = 0;
    while t < i64::MAX {
        if t % CANCEL_CHECK_INTERVAL == 0 && should_stop() {
            debug!(attempts = t, "[nt-02] mining cancelled");
            return MiningOutcome::Cancelled { attempts: t };
        }
        if meets_target(&template.pow_hash_at(t), target) {
            debug!(timestamp = t, "[nt-02] proof of work found");
            return MiningOutcome::Found(template.block_at(t));
        }
        t += 1;
    }
    MiningOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::difficulty::default_tag;
    use shared_crypto::{GroupElement, SchnorrKeyPair};

    fn template() -> MiningTemplate {
        let creator = SchnorrKeyPair::generate().public_key();
        let entries = vec![ReputationEntry::new(GroupElement::random(), 0.5)];
        let genesis = Block::genesis(&entries, &GroupElement::generator(), &creator);
        MiningTemplate::new(&genesis, 1, 0, &[], &entries, &creator).unwrap()
    }

    #[test]
    fn test_found_block_meets_target() {
        let template = template();
        let MiningOutcome::Found(block) = mine(&template, default_tag(), || false) else {
            panic!("expected a block");
        };
        assert_eq!(block.serial, 1);
        assert!(meets_target(&block.pow_hash(), template.target(default_tag())));
    }

    #[test]
    fn test_found_block_is_first_valid_nonce() {
        let template = template();
        let MiningOutcome::Found(block) = mine(&template, default_tag(), || false) else {
            panic!("expected a block");
        };
        let target = template.target(default_tag());
        for t in 0..block.timestamp {
            assert!(!meets_target(&template.pow_hash_at(t), target));
        }
    }

    #[test]
    fn test_cancellation() {
        let template = template();
        let outcome = mine(&template, U256::zero(), || true);
        assert_eq!(outcome, MiningOutcome::Cancelled { attempts: 0 });
    }

    #[test]
    fn test_cancellation_after_polls() {
        let template = template();
        let mut polls = 0;
        let outcome = mine(&template, U256::zero(), || {
            polls += 1;
            polls > 3
        });
        assert_eq!(
            outcome,
            MiningOutcome::Cancelled {
                attempts: 3 * CANCEL_CHECK_INTERVAL
            }
        );
    }
}
