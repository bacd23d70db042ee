//! # Ledger & Agreement Subsystem (NT-02)
//!
//! Append-only chain of reputation blocks plus the agreement machinery that
//! decides which candidate block every agent appends.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): blocks, chain, difficulty, mining,
//!   verification, winner selection, mining status
//! - **Config** (`config.rs`): receive window, countdown interval, base target
//!
//! ## Agreement Flow
//!
//! ```text
//! READY ──mine()──► Found ──sign+publish──► RECEIVING ──Θ──► FINISHED
//!   │                                          ▲
//!   └──── peer block (verify_block + offer) ───┘
//! ```
//!
//! After every agent has appended its winner, [`plurality_vote`] over the
//! agents' latest blocks fixes the list for the cycle.

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod domain;
pub mod error;

pub use config::LedgerConfig;
pub use domain::block::{pow_hash, records_root, reputation_root, Block};
pub use domain::chain::Chain;
pub use domain::difficulty::{default_tag, meets_target, parse_tag, scaled_target, DEFAULT_TAG};
pub use domain::miner::{mine, MiningOutcome, MiningTemplate};
pub use domain::selection::{offer, plurality_vote, select_winner};
pub use domain::status::{MineStatus, ReceiveAction};
pub use domain::verification::{verify_block, verify_candidate, LocalView};
pub use error::{LedgerError, Result};

/// Re-exported for callers computing targets.
pub use primitive_types::U256;

/// Subsystem identifier used in log prefixes.
pub const SUBSYSTEM_ID: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_id() {
        assert_eq!(SUBSYSTEM_ID, 2);
    }
}
