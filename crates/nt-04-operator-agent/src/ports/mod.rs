//! # Driven Ports
//!
//! Interfaces the agent requires from its host.

pub mod transport;

pub use transport::Transport;
