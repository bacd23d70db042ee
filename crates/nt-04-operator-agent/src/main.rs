//! # Operator Agent Binary
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Load `NT_CONFIG` and environment overrides
//! 3. Bind the UDP socket, load the reference models
//! 4. Start the listener, announce keys, run the maintenance cycles
//! 5. Stop on completion or Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use nt_03_trust_evaluation::TrustEngine;
use nt_04_operator_agent::{AgentConfig, AgentIdentity, OperatorAgent, UdpTransport};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AgentConfig::load().context("Failed to load agent configuration")?;
    config.validate().context("Invalid agent configuration")?;

    let network = &config.network;
    let transport = UdpTransport::bind(
        network.bind_addr,
        network.bind_retry_span,
        network.max_datagram_size,
    )
    .await
    .context("Failed to bind agent socket")?;

    let trust = TrustEngine::from_config(config.trust.clone())
        .context("Failed to load reference models")?;

    let mut agent = OperatorAgent::new(
        config,
        AgentIdentity::generate(),
        trust,
        Arc::new(transport),
    )
    .context("Failed to create operator agent")?;
    agent.start();
    agent.announce().await.context("Failed to announce keys")?;

    info!("Operator agent running, press Ctrl-C to stop");
    let outcome = tokio::select! {
        result = agent.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    };
    agent.shutdown().await;

    if let Err(e) = &outcome {
        error!(error = %e, "Operator agent stopped with an error");
    }
    outcome.context("Maintenance cycles failed")
}
