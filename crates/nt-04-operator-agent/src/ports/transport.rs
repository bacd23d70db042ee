//! Connectionless datagram transport.

use async_trait::async_trait;
use shared_types::AgentAddress;

use crate::error::Result;

/// Datagram transport shared by the listener and the round driver.
///
/// Delivery is best effort, like UDP: sends to unreachable peers are not
/// reported back.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Address peers use to reach this agent.
    fn local_addr(&self) -> AgentAddress;

    /// Send one datagram.
    async fn send(&self, to: AgentAddress, payload: &[u8]) -> Result<()>;

    /// Wait for the next datagram and its sender.
    async fn recv(&self) -> Result<(Vec<u8>, AgentAddress)>;
}
