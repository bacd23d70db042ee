//! UDP transport.

use std::net::SocketAddr;

use async_trait::async_trait;
use shared_types::AgentAddress;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::{AgentError, Result};
use crate::ports::Transport;

/// Tokio UDP socket bounded by a datagram size limit.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    local: AgentAddress,
    max_datagram_size: usize,
}

impl UdpTransport {
    /// Bind `addr`, probing up to `retry_span` higher ports when it is taken.
    pub async fn bind(addr: SocketAddr, retry_span: u16, max_datagram_size: usize) -> Result<Self> {
        let last = addr.port().saturating_add(retry_span);
        let mut last_error = None;
        for port in addr.port()..=last {
            let candidate = SocketAddr::new(addr.ip(), port);
            match UdpSocket::bind(candidate).await {
                Ok(socket) => {
                    let local = socket
                        .local_addr()
                        .map_err(|e| AgentError::Bind(e.to_string()))?;
                    if port != addr.port() {
                        warn!(requested = %addr, bound = %local, "[agent] configured port busy");
                    }
                    info!(%local, "[agent] UDP socket bound");
                    return Ok(Self {
                        socket,
                        local,
                        max_datagram_size,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(AgentError::Bind(format!(
            "{}..={last}: {}",
            addr,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn local_addr(&self) -> AgentAddress {
        self.local
    }

    async fn send(&self, to: AgentAddress, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_datagram_size {
            return Err(AgentError::MessageTooLarge {
                size: payload.len(),
                limit: self.max_datagram_size,
            });
        }
        self.socket
            .send_to(payload, to)
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        debug!(%to, bytes = payload.len(), "[agent] datagram sent");
        Ok(())
    }

    async fn recv(&self) -> Result<(Vec<u8>, AgentAddress)> {
        let mut buf = vec![0u8; self.max_datagram_size];
        let (n, from) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;
        buf.truncate(n);
        Ok((buf, from))
    }
}
