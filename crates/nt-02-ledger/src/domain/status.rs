//! # Mining Status
//!
//! ```text
//! FREE → EVALUATE → READY → MINING → RECEIVING → FINISHED → FREE
//!            └────────┴───────┴──→ RECEIVING (peer block arrives)
//! ```

use std::fmt;

/// Per-agent agreement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MineStatus {
    /// Idle, outside a consensus round.
    #[default]
    Free,
    /// Trust evaluation running.
    Evaluate,
    /// About to mine; countdown observer armed.
    Ready,
    /// Searching for a proof-of-work nonce.
    Mining,
    /// Accept window open.
    Receiving,
    /// Accept window closed.
    Finished,
}

/// What to do with a verified block given the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveAction {
    /// Offer to the winner slot, keep the status.
    Merge,
    /// Offer to the winner slot and open the accept window.
    MergeAndReceive,
    /// Window closed; drop the block.
    Ignore,
}

impl MineStatus {
    /// Transition for a verified block received from a peer.
    pub fn on_block(self) -> ReceiveAction {
        match self {
            MineStatus::Free | MineStatus::Receiving => ReceiveAction::Merge,
            MineStatus::Evaluate | MineStatus::Ready | MineStatus::Mining => {
                ReceiveAction::MergeAndReceive
            }
            MineStatus::Finished => ReceiveAction::Ignore,
        }
    }

    /// The countdown observer waits while the status is one of these.
    pub fn is_pre_window(self) -> bool {
        matches!(
            self,
            MineStatus::Evaluate | MineStatus::Ready | MineStatus::Mining
        )
    }

    /// Mining may only start from `Ready`.
    pub fn can_mine(self) -> bool {
        self == MineStatus::Ready
    }
}

impl fmt::Display for MineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MineStatus::Free => "FREE",
            MineStatus::Evaluate => "EVALUATE",
            MineStatus::Ready => "READY",
            MineStatus::Mining => "MINING",
            MineStatus::Receiving => "RECEIVING",
            MineStatus::Finished => "FINISHED",
        };
        f.write_str(name)
    }
}
