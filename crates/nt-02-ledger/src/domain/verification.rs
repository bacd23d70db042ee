//! # Block Verification
//!
//! A peer block is accepted only when all of these hold:
//!
//! | Check | Against |
//! |-------|---------|
//! | Schnorr signature over the block hash | sender's registered key |
//! | proof-of-work hash < scaled target | block's own `Nb`, `Npk` |
//! | records root | Merkle root of the local record buffer |
//! | reputation root | Merkle root of the local reputation list |

use primitive_types::U256;
use shared_crypto::{SchnorrPublicKey, SchnorrSignature};
use shared_types::{Record, ReputationEntry};
use tracing::{debug, instrument};

use super::block::{records_root, reputation_root, Block};
use super::difficulty::{meets_target, scaled_target};
use crate::error::{LedgerError, Result};

/// The verifier's own data the block must agree with.
#[derive(Debug, Clone, Copy)]
pub struct LocalView<'a> {
    /// Records received from the collector this round.
    pub records: &'a [Record],
    /// Locally evaluated reputation list.
    pub entries: &'a [ReputationEntry],
}

/// Signature and proof-of-work checks only.
pub fn verify_candidate(
    block: &Block,
    signature: &SchnorrSignature,
    creator: &SchnorrPublicKey,
    tag: U256,
) -> Result<()> {
    creator
        .verify(&block.hash(), signature)
        .map_err(|_| LedgerError::InvalidSignature)?;

    let target = scaled_target(tag, block.chain_length, block.creator_work_count);
    if !meets_target(&block.pow_hash(), target) {
        return Err(LedgerError::InsufficientWork);
    }
    Ok(())
}

/// Full verification of a block published during consensus.
#[instrument(skip_all, fields(serial = block.serial, timestamp = block.timestamp))]
pub fn verify_block(
    block: &Block,
    signature: &SchnorrSignature,
    creator: &SchnorrPublicKey,
    view: LocalView<'_>,
    tag: U256,
) -> Result<()> {
    verify_candidate(block, signature, creator, tag)?;

    if block.records_root.as_slice() != records_root(view.records)?.as_slice() {
        return Err(LedgerError::RecordsRootMismatch);
    }
    if block.reputation_root.as_slice() != reputation_root(view.entries).as_slice() {
        return Err(LedgerError::ReputationRootMismatch);
    }

    debug!("[nt-02] block verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::difficulty::default_tag;
    use crate::domain::miner::{mine, MiningOutcome, MiningTemplate};
    use shared_crypto::{GroupElement, SchnorrKeyPair};

    struct Fixture {
        keys: SchnorrKeyPair,
        records: Vec<Record>,
        entries: Vec<ReputationEntry>,
        block: Block,
        signature: SchnorrSignature,
    }

    fn fixture() -> Fixture {
        let keys = SchnorrKeyPair::generate();
        let entries = vec![
            ReputationEntry::new(GroupElement::random(), 0.4),
            ReputationEntry::new(GroupElement::random(), 0.8),
        ];
        let records = vec![Record::new(entries[0].pseudonym, vec![1.0, 0.5])];
        let genesis = Block::genesis(&entries, &GroupElement::generator(), &keys.public_key());
        let template =
            MiningTemplate::new(&genesis, 1, 0, &records, &entries, &keys.public_key()).unwrap();
        let block = match mine(&template, default_tag(), || false) {
            MiningOutcome::Found(block) => block,
            other => panic!("mining failed: {other:?}"),
        };
        let signature = keys.sign(&block.hash());
        Fixture {
            keys,
            records,
            entries,
            block,
            signature,
        }
    }

    fn view(f: &Fixture) -> LocalView<'_> {
        LocalView {
            records: &f.records,
            entries: &f.entries,
        }
    }

    #[test]
    fn test_valid_block_accepted() {
        let f = fixture();
        verify_block(&f.block, &f.signature, &f.keys.public_key(), view(&f), default_tag()).unwrap();
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let f = fixture();
        let other = SchnorrKeyPair::generate().public_key();
        let result = verify_block(&f.block, &f.signature, &other, view(&f), default_tag());
        assert!(matches!(result, Err(LedgerError::InvalidSignature)));
    }

    #[test]
    fn test_insufficient_work_rejected() {
        let f = fixture();
        let result = verify_block(
            &f.block,
            &f.signature,
            &f.keys.public_key(),
            view(&f),
            U256::zero(),
        );
        assert!(matches!(result, Err(LedgerError::InsufficientWork)));
    }

    #[test]
    fn test_records_mismatch_rejected() {
        let f = fixture();
        let local = LocalView {
            records: &[],
            entries: &f.entries,
        };
        let result = verify_block(&f.block, &f.signature, &f.keys.public_key(), local, default_tag());
        assert!(matches!(result, Err(LedgerError::RecordsRootMismatch)));
    }

    #[test]
    fn test_list_mismatch_rejected() {
        let f = fixture();
        let mut entries = f.entries.clone();
        entries[1].score = 0.7;
        let local = LocalView {
            records: &f.records,
            entries: &entries,
        };
        let result = verify_block(&f.block, &f.signature, &f.keys.public_key(), local, default_tag());
        assert!(matches!(result, Err(LedgerError::ReputationRootMismatch)));
    }

    #[test]
    fn test_candidate_check_ignores_local_view() {
        let f = fixture();
        verify_candidate(&f.block, &f.signature, &f.keys.public_key(), default_tag()).unwrap();
    }
}
