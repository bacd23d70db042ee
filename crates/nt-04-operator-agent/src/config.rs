//! # Agent Configuration
//!
//! Loaded from a TOML file named by `NT_CONFIG` (default `config/agent.toml`).
//! `NT_BIND_ADDR` and `NT_COLLECTOR_ADDR` override the network section.
//!
//! ```toml
//! [network]
//! bind_addr = "127.0.0.1:9000"
//! collector_addr = "127.0.0.1:8000"
//!
//! [topology.agents]
//! oa1 = "127.0.0.1:9000"
//! oa2 = "127.0.0.1:9001"
//!
//! [rounds]
//! maintenance_cycles = 3
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use nt_02_ledger::LedgerConfig;
use nt_03_trust_evaluation::TrustConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "NT_CONFIG";
/// Config file used when `NT_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

/// Complete agent configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Sockets and peers outside the ring.
    pub network: NetworkConfig,
    /// Agent ring.
    pub topology: TopologyConfig,
    /// Agreement timing and difficulty.
    pub ledger: LedgerConfig,
    /// Trust evaluation constants.
    pub trust: TrustConfig,
    /// Cycle counts and waits.
    pub rounds: RoundsConfig,
}

/// Network configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Local datagram address.
    pub bind_addr: SocketAddr,
    /// Collector relay serving raw records.
    pub collector_addr: SocketAddr,
    /// Largest datagram sent or accepted.
    pub max_datagram_size: usize,
    /// Ports probed upward from `bind_addr` when it is taken.
    pub bind_retry_span: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
            collector_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_datagram_size: 65_507,
            bind_retry_span: 1000,
        }
    }
}

/// Agent ring, keyed by name. Chain order is the key order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// `name → address`.
    pub agents: BTreeMap<String, SocketAddr>,
}

impl TopologyConfig {
    /// Addresses sorted by agent name.
    pub fn ordered(&self) -> Vec<SocketAddr> {
        self.agents.values().copied().collect()
    }
}

/// Cycle structure.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RoundsConfig {
    /// Maintenance cycles before exiting.
    pub maintenance_cycles: u32,
    /// Consensus sub-rounds per cycle.
    pub consensus_rounds: u32,
    /// Registration grace period before the first cycle.
    pub start_delay_ms: u64,
    /// Bound on the list-confirmation wait. Unbounded when absent.
    pub confirmation_timeout_ms: Option<u64>,
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            maintenance_cycles: 3,
            consensus_rounds: 1,
            start_delay_ms: 10_000,
            confirmation_timeout_ms: None,
        }
    }
}

impl RoundsConfig {
    /// Grace period as a duration.
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Confirmation bound as a duration.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_ms.map(Duration::from_millis)
    }
}

impl AgentConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AgentError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AgentError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Load from `NT_CONFIG` and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `NT_BIND_ADDR` / `NT_COLLECTOR_ADDR`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("NT_BIND_ADDR") {
            self.network.bind_addr = parse_addr("NT_BIND_ADDR", &addr)?;
        }
        if let Ok(addr) = std::env::var("NT_COLLECTOR_ADDR") {
            self.network.collector_addr = parse_addr("NT_COLLECTOR_ADDR", &addr)?;
        }
        Ok(())
    }

    /// Reject configurations the agent cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.topology.agents.is_empty() {
            return Err(AgentError::InvalidConfig("topology has no agents".into()));
        }
        if !self
            .topology
            .agents
            .values()
            .any(|addr| *addr == self.network.bind_addr)
        {
            return Err(AgentError::NotInTopology(self.network.bind_addr));
        }
        if self.network.max_datagram_size == 0 {
            return Err(AgentError::InvalidConfig("max_datagram_size must be > 0".into()));
        }
        if self.rounds.consensus_rounds == 0 {
            return Err(AgentError::InvalidConfig("consensus_rounds must be > 0".into()));
        }
        self.ledger.validate()?;
        self.trust.validate()?;
        Ok(())
    }
}

fn parse_addr(name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|e| AgentError::InvalidConfig(format!("{name}={value}: {e}")))
}
