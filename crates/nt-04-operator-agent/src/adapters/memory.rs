//! In-process datagram hub.
//!
//! Every endpoint owns an unbounded inbox. Sends to an address with no
//! endpoint are dropped, as a UDP packet to a closed port would be.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::AgentAddress;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::ports::Transport;

type Inbox = mpsc::UnboundedSender<(Vec<u8>, AgentAddress)>;

/// Shared routing table of in-memory endpoints.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    routes: Arc<RwLock<HashMap<AgentAddress, Inbox>>>,
}

impl MemoryNetwork {
    /// Empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an endpoint at `addr`, replacing any previous one.
    pub fn endpoint(&self, addr: AgentAddress) -> MemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.write().insert(addr, tx);
        MemoryTransport {
            network: self.clone(),
            local: addr,
            inbox: Mutex::new(rx),
        }
    }

    fn route(&self, to: &AgentAddress) -> Option<Inbox> {
        self.routes.read().get(to).cloned()
    }
}

/// One endpoint of a [`MemoryNetwork`].
#[derive(Debug)]
pub struct MemoryTransport {
    network: MemoryNetwork,
    local: AgentAddress,
    inbox: Mutex<mpsc::UnboundedReceiver<(Vec<u8>, AgentAddress)>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    fn local_addr(&self) -> AgentAddress {
        self.local
    }

    async fn send(&self, to: AgentAddress, payload: &[u8]) -> Result<()> {
        match self.network.route(&to) {
            Some(inbox) => {
                if inbox.send((payload.to_vec(), self.local)).is_err() {
                    debug!(%to, "[agent] endpoint closed, datagram dropped");
                }
            }
            None => debug!(%to, "[agent] no endpoint, datagram dropped"),
        }
        Ok(())
    }

    async fn recv(&self) -> Result<(Vec<u8>, AgentAddress)> {
        self.inbox
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| AgentError::Transport("memory network closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> AgentAddress {
        AgentAddress::from(([10, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_delivery_carries_sender() {
        let network = MemoryNetwork::new();
        let a = network.endpoint(addr(1));
        let b = network.endpoint(addr(2));

        a.send(addr(2), &[1, 2, 3]).await.unwrap();
        let (payload, from) = b.recv().await.unwrap();
        assert_eq!(payload, vec![1, 2, 3]);
        assert_eq!(from, addr(1));
    }

    #[tokio::test]
    async fn test_unknown_destination_dropped() {
        let network = MemoryNetwork::new();
        let a = network.endpoint(addr(1));
        a.send(addr(99), b"lost").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_to_self() {
        let network = MemoryNetwork::new();
        let a = network.endpoint(addr(1));
        a.send(addr(1), b"loop").await.unwrap();
        let (payload, from) = a.recv().await.unwrap();
        assert_eq!(payload, b"loop");
        assert_eq!(from, addr(1));
    }
}
