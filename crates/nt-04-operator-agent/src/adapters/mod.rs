//! # Transport Adapters
//!
//! - [`UdpTransport`]: tokio UDP socket, production
//! - [`MemoryNetwork`]: in-process datagram hub for multi-agent tests

pub mod memory;
pub mod udp;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use udp::UdpTransport;
