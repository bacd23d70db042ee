//! # Agent Domain
//!
//! - `hops`: one agent's reverse and forward shuffle steps
//! - `state`: everything the listener and round driver share
//! - `status`: round lifecycle
//! - `topology`: chain order of the agent ring

pub mod hops;
pub mod state;
pub mod status;
pub mod topology;

pub use hops::{forward_hop, mix_batch, reverse_hop, verify_hop, HopProof, ShuffleBatch};
pub use state::{AgentState, PeerKeys, PendingSync};
pub use status::RoundStatus;
pub use topology::Topology;
