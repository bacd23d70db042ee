//! # Domain Layer
//!
//! Pure ledger logic: blocks, chain, difficulty, verification, selection and
//! the mining-status state machine.

pub mod block;
pub mod chain;
pub mod difficulty;
pub mod miner;
pub mod selection;
pub mod status;
pub mod verification;
