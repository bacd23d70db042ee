//! Creator-scaled difficulty.
//!
//! **The target is a CEILING**: a block is valid when its proof-of-work hash,
//! read as a big-endian integer, is strictly below the target.
//!
//! ```text
//! target = TAG · max(1, Nb / Npk)   when Npk > 0
//! target = TAG                      otherwise
//! ```
//!
//! `Nb` is the chain length and `Npk` the number of blocks the creator has
//! already produced. The integer quotient shrinks as a creator wins more
//! often, so its next block gets harder.

use primitive_types::U256;

use crate::error::{LedgerError, Result};

/// Base difficulty target.
pub const DEFAULT_TAG: &str = "000fffffffffffffffffffffffffffffeecfae81b1b9b3c908810b10a1b56001";

/// Parse a hex difficulty tag.
pub fn parse_tag(hex_tag: &str) -> Result<U256> {
    U256::from_str_radix(hex_tag, 16).map_err(|e| LedgerError::InvalidDifficultyTag(e.to_string()))
}

/// Default base target.
pub fn default_tag() -> U256 {
    // DEFAULT_TAG is a compile-time constant that always parses.
    parse_tag(DEFAULT_TAG).unwrap_or(U256::MAX)
}

/// Scaled target for a creator with `creator_work_count` blocks on a chain of
/// `chain_length` blocks. Saturates at `2^256 - 1`.
pub fn scaled_target(tag: U256, chain_length: i64, creator_work_count: i64) -> U256 {
    if creator_work_count <= 0 {
        return tag;
    }
    let quotient = (chain_length.max(0) / creator_work_count).max(1);
    tag.saturating_mul(U256::from(quotient as u64))
}

/// Convert a 32-byte big-endian hash to an integer.
#[inline]
pub fn hash_to_u256(hash: &[u8; 32]) -> U256 {
    U256::from_big_endian(hash)
}

/// `hash < target`.
#[inline]
pub fn meets_target(hash: &[u8; 32], target: U256) -> bool {
    hash_to_u256(hash) < target
}
