//! # Winner Selection
//!
//! Total order over candidate blocks, applied pairwise:
//!
//! 1. earlier `timestamp`
//! 2. fewer `creator_work_count`
//! 3. more `record_count`
//! 4. smaller block hash

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::block::Block;

fn rank(a: &Block, b: &Block) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then(a.creator_work_count.cmp(&b.creator_work_count))
        .then(b.record_count.cmp(&a.record_count))
        .then_with(|| a.hash().cmp(&b.hash()))
}

/// Pick the winner of two candidate blocks.
pub fn select_winner<'a>(a: &'a Block, b: &'a Block) -> &'a Block {
    match rank(a, b) {
        Ordering::Greater => b,
        _ => a,
    }
}

/// Merge `incoming` into the held winner slot.
pub fn offer(slot: &mut Option<Block>, incoming: Block) {
    match slot {
        Some(current) => {
            if rank(current, &incoming) == Ordering::Greater {
                *current = incoming;
            }
        }
        None => *slot = Some(incoming),
    }
}

/// Plurality vote over one candidate per agent.
///
/// Candidates are grouped by timestamp; every block in a most-voted group
/// competes through [`select_winner`].
pub fn plurality_vote(candidates: &[Block]) -> Option<&Block> {
    let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
    for block in candidates {
        *votes.entry(block.timestamp).or_default() += 1;
    }
    let top = votes.values().copied().max()?;

    candidates
        .iter()
        .filter(|block| votes.get(&block.timestamp) == Some(&top))
        .reduce(select_winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{GroupElement, SchnorrKeyPair};

    fn block(timestamp: i64, work: i64, records: i64) -> Block {
        let creator = SchnorrKeyPair::generate().public_key();
        let mut b = Block::genesis(&[], &GroupElement::generator(), &creator);
        b.serial = 1;
        b.timestamp = timestamp;
        b.creator_work_count = work;
        b.record_count = records;
        b
    }

    #[test]
    fn test_earlier_timestamp_wins() {
        let a = block(5, 9, 0);
        let b = block(7, 0, 9);
        assert_eq!(select_winner(&a, &b), &a);
        assert_eq!(select_winner(&b, &a), &a);
    }

    #[test]
    fn test_equal_timestamp_fewer_work_wins() {
        let a = block(100, 3, 0);
        let b = block(100, 5, 0);
        assert_eq!(select_winner(&a, &b), &a);
        assert_eq!(select_winner(&b, &a), &a);
    }

    #[test]
    fn test_more_records_wins() {
        let a = block(1, 1, 4);
        let b = block(1, 1, 9);
        assert_eq!(select_winner(&a, &b), &b);
    }

    #[test]
    fn test_hash_tiebreak_is_symmetric() {
        let a = block(1, 1, 1);
        let b = block(1, 1, 1);
        assert_eq!(select_winner(&a, &b), select_winner(&b, &a));
    }

    #[test]
    fn test_select_is_idempotent() {
        let a = block(3, 2, 1);
        assert_eq!(select_winner(&a, &a), &a);
    }

    #[test]
    fn test_offer_keeps_best() {
        let mut slot = None;
        offer(&mut slot, block(9, 0, 0));
        offer(&mut slot, block(4, 0, 0));
        offer(&mut slot, block(6, 0, 0));
        assert_eq!(slot.map(|b| b.timestamp), Some(4));
    }

    #[test]
    fn test_plurality_picks_majority_timestamp() {
        let candidates = vec![block(5, 2, 0), block(5, 1, 0), block(7, 0, 0)];
        let winner = plurality_vote(&candidates).unwrap();
        assert_eq!(winner.timestamp, 5);
        assert_eq!(winner.creator_work_count, 1);
    }

    #[test]
    fn test_plurality_tie_between_groups() {
        let candidates = vec![block(8, 0, 0), block(3, 0, 0)];
        assert_eq!(plurality_vote(&candidates).unwrap().timestamp, 3);
    }

    #[test]
    fn test_plurality_empty() {
        assert!(plurality_vote(&[]).is_none());
    }
}
