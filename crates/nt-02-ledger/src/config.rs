//! Ledger configuration.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::difficulty::{parse_tag, DEFAULT_TAG};
use crate::error::{LedgerError, Result};

/// Receive window length Θ in milliseconds.
pub const RECEIVE_WINDOW_MS: u64 = 1500;
/// Countdown step in milliseconds.
pub const INTERVAL_MS: u64 = 750;
/// Threshold of blocks a single creator may have produced.
pub const NBR: u64 = 10;
/// Threshold number of relays contributing data to one block.
pub const NTR: u64 = 50;

/// Agreement timing and difficulty.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Receive window Θ.
    pub receive_window_ms: u64,
    /// Countdown step.
    pub interval_ms: u64,
    /// Base difficulty target as hex.
    pub difficulty_tag: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            receive_window_ms: RECEIVE_WINDOW_MS,
            interval_ms: INTERVAL_MS,
            difficulty_tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Parsed base target.
    pub fn tag(&self) -> Result<U256> {
        parse_tag(&self.difficulty_tag)
    }

    /// Number of countdown steps the receive window spans.
    pub fn countdown_steps(&self) -> u64 {
        if self.interval_ms == 0 || self.receive_window_ms < self.interval_ms {
            return 0;
        }
        (self.receive_window_ms - self.interval_ms) / self.interval_ms + 1
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(LedgerError::InvalidConfig("interval_ms must be > 0".into()));
        }
        self.tag().map(|_| ())
    }
}
