//! # Operator Agent (NT-04)
//!
//! One member of the operator-agent ring. Maintains the anonymized
//! reputation list of edge subjects across maintenance cycles.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): topology, round status, shared state, shuffle hops
//! - **Protocol** (`protocol.rs`): tagged wire messages and the datagram envelope
//! - **Ports** (`ports/`): the datagram [`Transport`]
//! - **Adapters** (`adapters/`): UDP and in-memory transports
//! - **Handlers** (`handlers/`): one per inbound message family
//! - **Driver** (`driver.rs`): the sequential per-cycle flow
//! - **Service** (`service.rs`): [`OperatorAgent`], wiring listener and driver
//!
//! ## Concurrency
//!
//! The listener handles messages one at a time. It shares [`AgentState`]
//! with the driver through [`AgentContext`], which serializes every state
//! change and wakes blocked waits. Mining runs on the blocking pool and stops
//! when the mining status leaves `MINING`.

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod ports;
pub mod protocol;
pub mod service;
pub mod testing;

pub use adapters::{MemoryNetwork, MemoryTransport, UdpTransport};
pub use config::{AgentConfig, NetworkConfig, RoundsConfig, TopologyConfig};
pub use context::{AgentContext, AgentIdentity};
pub use domain::{AgentState, PeerKeys, RoundStatus, ShuffleBatch, Topology};
pub use error::{AgentError, Result};
pub use ports::Transport;
pub use protocol::{decode, encode, DataRecord, Envelope, Message, SignedBlock, SignedRecord};
pub use service::OperatorAgent;

/// Subsystem identifier used in log prefixes.
pub const SUBSYSTEM_ID: u8 = 4;
