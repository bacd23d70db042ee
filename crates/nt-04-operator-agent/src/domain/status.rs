//! Round lifecycle status.
//!
//! ```text
//! DEFAULT → READY_FOR_NEW_ROUND → READY_FOR_CONSENSUS → CONSENSUS_END → DEFAULT
//! ```

use std::fmt;

/// Where the agent is within a maintenance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundStatus {
    /// Between cycles.
    #[default]
    Default,
    /// New list synced; data collection may start.
    ReadyForNewRound,
    /// Trust update done; mining may start.
    ReadyForConsensus,
    /// Winner appended.
    ConsensusEnd,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundStatus::Default => "DEFAULT",
            RoundStatus::ReadyForNewRound => "READY_FOR_NEW_ROUND",
            RoundStatus::ReadyForConsensus => "READY_FOR_CONSENSUS",
            RoundStatus::ConsensusEnd => "CONSENSUS_END",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RoundStatus::default().to_string(), "DEFAULT");
        assert_eq!(RoundStatus::ReadyForConsensus.to_string(), "READY_FOR_CONSENSUS");
    }
}
