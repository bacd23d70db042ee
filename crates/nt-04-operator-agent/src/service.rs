//! # Operator Agent
//!
//! Owns the context, the listener task and the shutdown signal.
//!
//! ```text
//! new ─► start (listener) ─► announce ─► run (start delay, registration, cycles) ─► shutdown
//! ```

use std::sync::Arc;

use nt_03_trust_evaluation::TrustEngine;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::AgentConfig;
use crate::context::{AgentContext, AgentIdentity};
use crate::driver;
use crate::error::Result;
use crate::handlers::registration::own_keys;
use crate::listener;
use crate::ports::Transport;
use crate::protocol::Message;

/// One operator agent.
pub struct OperatorAgent {
    ctx: Arc<AgentContext>,
    shutdown: watch::Sender<bool>,
    listener: Option<JoinHandle<()>>,
}

impl OperatorAgent {
    /// Build an agent over `transport`.
    pub fn new(
        config: AgentConfig,
        identity: AgentIdentity,
        trust: TrustEngine,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let ctx = Arc::new(AgentContext::new(config, identity, trust, transport)?);
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            ctx,
            shutdown,
            listener: None,
        })
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<AgentContext> {
        &self.ctx
    }

    /// Spawn the listener. Idempotent.
    pub fn start(&mut self) {
        if self.listener.is_some() {
            return;
        }
        let ctx = Arc::clone(&self.ctx);
        let shutdown = self.shutdown.subscribe();
        self.listener = Some(tokio::spawn(listener::run(ctx, shutdown)));
    }

    /// Announce keys to every peer and register with the collector.
    pub async fn announce(&self) -> Result<()> {
        self.ctx.broadcast_peers(&own_keys(&self.ctx)).await;
        let collector = self.ctx.config().network.collector_addr;
        let register = Message::CollectorRegister {
            signing_key: self.ctx.public_key(),
        };
        self.ctx.send(collector, &register).await?;
        info!(agent = %self.ctx.local_addr(), "[agent] keys announced");
        Ok(())
    }

    /// Wait out the start delay and registration, then drive every cycle.
    pub async fn run(&self) -> Result<()> {
        tokio::time::sleep(self.ctx.config().rounds.start_delay()).await;
        driver::await_registration(&self.ctx).await?;
        driver::run_cycles(&self.ctx).await
    }

    /// Stop the listener and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }
        info!(agent = %self.ctx.local_addr(), "[agent] shut down");
    }
}
