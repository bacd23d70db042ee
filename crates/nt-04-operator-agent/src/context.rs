//! # Agent Context
//!
//! Explicit context handed to every handler and to the round driver. State
//! changes go through [`AgentContext::update`], which wakes every task
//! blocked in [`AgentContext::wait_until`].

use std::sync::Arc;
use std::time::Duration;

use nt_02_ledger::U256;
use nt_03_trust_evaluation::TrustEngine;
use parking_lot::Mutex;
use shared_crypto::{MixKeyPair, SchnorrKeyPair, SchnorrPublicKey};
use shared_types::AgentAddress;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::domain::state::AgentState;
use crate::domain::topology::Topology;
use crate::error::{AgentError, Result};
use crate::ports::Transport;
use crate::protocol::{encode, Message};

/// Signing and mixing keys of one agent.
pub struct AgentIdentity {
    signing: SchnorrKeyPair,
    mix: MixKeyPair,
}

impl AgentIdentity {
    /// Fresh random keys.
    pub fn generate() -> Self {
        Self::new(SchnorrKeyPair::generate(), MixKeyPair::generate())
    }

    /// Identity from existing keys.
    pub fn new(signing: SchnorrKeyPair, mix: MixKeyPair) -> Self {
        Self { signing, mix }
    }
}

/// Everything a handler or the driver needs.
pub struct AgentContext {
    config: AgentConfig,
    topology: Topology,
    identity: AgentIdentity,
    trust: TrustEngine,
    tag: U256,
    state: Mutex<AgentState>,
    changed: Notify,
    transport: Arc<dyn Transport>,
}

impl AgentContext {
    /// Validate `config` and bind the context to `transport`'s address.
    pub fn new(
        config: AgentConfig,
        identity: AgentIdentity,
        trust: TrustEngine,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let topology = Topology::new(config.topology.ordered(), transport.local_addr())?;
        let tag = config.ledger.tag()?;
        Ok(Self {
            config,
            topology,
            identity,
            trust,
            tag,
            state: Mutex::new(AgentState::new()),
            changed: Notify::new(),
            transport,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Agent ring.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// This agent's address.
    pub fn local_addr(&self) -> AgentAddress {
        self.topology.local()
    }

    /// Block signing key pair.
    pub fn signing(&self) -> &SchnorrKeyPair {
        &self.identity.signing
    }

    /// Block signing public key.
    pub fn public_key(&self) -> SchnorrPublicKey {
        self.identity.signing.public_key()
    }

    /// Shuffle and encryption key pair.
    pub fn mix(&self) -> &MixKeyPair {
        &self.identity.mix
    }

    /// Trust evaluation engine.
    pub fn trust(&self) -> &TrustEngine {
        &self.trust
    }

    /// Base difficulty target.
    pub fn tag(&self) -> U256 {
        self.tag
    }

    /// Transport shared with the listener.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Read the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&AgentState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Mutate the state and wake every waiter.
    pub fn update<R>(&self, f: impl FnOnce(&mut AgentState) -> R) -> R {
        let result = f(&mut self.state.lock());
        self.changed.notify_waiters();
        result
    }

    /// Record a failed shuffle hop; pending waits return [`AgentError::RoundAborted`].
    pub fn abort(&self, reason: String) {
        self.update(|state| {
            if state.abort.is_none() {
                state.abort = Some(reason);
            }
        });
    }

    /// Block until `predicate` holds.
    pub async fn wait_until(
        &self,
        what: &'static str,
        predicate: impl Fn(&AgentState) -> bool,
    ) -> Result<()> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let state = self.state.lock();
                if let Some(reason) = &state.abort {
                    return Err(AgentError::RoundAborted(reason.clone()));
                }
                if predicate(&state) {
                    return Ok(());
                }
            }
            debug!(what, "[agent] waiting");
            notified.await;
        }
    }

    /// [`Self::wait_until`] bounded by `timeout`; unbounded when `None`.
    pub async fn wait_until_timeout(
        &self,
        what: &'static str,
        timeout: Option<Duration>,
        predicate: impl Fn(&AgentState) -> bool,
    ) -> Result<()> {
        match timeout {
            None => self.wait_until(what, predicate).await,
            Some(limit) => tokio::time::timeout(limit, self.wait_until(what, predicate))
                .await
                .map_err(|_| AgentError::Timeout(what))?,
        }
    }

    /// Encode and send one message.
    pub async fn send(&self, to: AgentAddress, message: &Message) -> Result<()> {
        let bytes = encode(message)?;
        let limit = self.config.network.max_datagram_size;
        if bytes.len() > limit {
            return Err(AgentError::MessageTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        self.transport.send(to, &bytes).await?;
        debug!(%to, event = message.name(), "[agent] sent");
        Ok(())
    }

    /// Send to each address, logging failures per recipient.
    pub async fn send_all(
        &self,
        recipients: impl IntoIterator<Item = AgentAddress>,
        message: &Message,
    ) {
        for to in recipients {
            if let Err(e) = self.send(to, message).await {
                warn!(%to, event = message.name(), error = %e, "[agent] send failed");
            }
        }
    }

    /// Send to every other agent in the ring.
    pub async fn broadcast_peers(&self, message: &Message) {
        let peers: Vec<AgentAddress> = self.topology.peers().collect();
        self.send_all(peers, message).await;
    }
}
