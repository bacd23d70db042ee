//! Fixtures for running agents in one process.
//!
//! [`ScriptedCollector`] plays the collector and relay side of the protocol:
//! it registers subjects with the first agent, learns each cycle's generator
//! from the sync and serves signed records derived from it.

use std::collections::HashMap;
use std::net::SocketAddr;

use nt_03_trust_evaluation::{ReferenceModels, TrustConfig, TrustEngine};
use shared_crypto::{GroupElement, SchnorrKeyPair, Scalar};
use shared_types::Record;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapters::MemoryTransport;
use crate::config::AgentConfig;
use crate::error::Result;
use crate::ports::Transport;
use crate::protocol::{decode, encode, DataRecord, Message, SignedRecord};

/// Features the fixture models classify as normal.
pub const NORMAL_FEATURES: [f64; 3] = [1.0, 1.0, 1.0];
/// Features the fixture models classify as abnormal.
pub const ABNORMAL_FEATURES: [f64; 3] = [8.0, 8.0, 8.0];

/// Config for `local` in a ring of `agents`, tuned for fast local runs.
pub fn agent_config(agents: &[SocketAddr], local: SocketAddr, collector: SocketAddr) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.network.bind_addr = local;
    config.network.collector_addr = collector;
    for (i, addr) in agents.iter().enumerate() {
        config.topology.agents.insert(format!("oa{:02}", i + 1), *addr);
    }
    config.ledger.interval_ms = 100;
    config.ledger.receive_window_ms = 200;
    config.rounds.start_delay_ms = 0;
    config.rounds.maintenance_cycles = 1;
    config
}

/// Engine over the fixture models.
pub fn trust_engine() -> TrustEngine {
    let models = ReferenceModels::new(NORMAL_FEATURES.to_vec(), ABNORMAL_FEATURES.to_vec());
    match models.and_then(|models| TrustEngine::new(TrustConfig::default(), models)) {
        Ok(engine) => engine,
        Err(e) => unreachable!("fixture models are valid: {e}"),
    }
}

/// A subject known to the collector: long-term secret and per-cycle behaviour.
#[derive(Debug, Clone)]
pub struct ScriptedSubject {
    /// Subject secret; its pseudonym in a cycle is `secret · g`.
    pub secret: Scalar,
    /// Feature vectors reported every cycle.
    pub observations: Vec<Vec<f64>>,
}

impl ScriptedSubject {
    /// Subject with a random secret.
    pub fn new(observations: Vec<Vec<f64>>) -> Self {
        Self {
            secret: shared_crypto::random_scalar(),
            observations,
        }
    }

    /// Registration key `secret · G`.
    pub fn public_key(&self) -> GroupElement {
        GroupElement::mul_base(&self.secret)
    }

    /// Pseudonym under round generator `g`.
    pub fn pseudonym(&self, g: &GroupElement) -> GroupElement {
        *g * self.secret
    }
}

/// Collector and relay stand-in on a memory endpoint.
pub struct ScriptedCollector {
    transport: MemoryTransport,
    keys: SchnorrKeyPair,
    agents: Vec<SocketAddr>,
    subjects: Vec<ScriptedSubject>,
    synced: HashMap<SocketAddr, GroupElement>,
    waiting: Vec<SocketAddr>,
}

impl ScriptedCollector {
    /// Collector serving `subjects` to the ring `agents`.
    pub fn new(transport: MemoryTransport, agents: Vec<SocketAddr>, subjects: Vec<ScriptedSubject>) -> Self {
        Self {
            transport,
            keys: SchnorrKeyPair::generate(),
            agents,
            subjects,
            synced: HashMap::new(),
            waiting: Vec::new(),
        }
    }

    /// Register as relay, enrol every subject, then serve until shutdown.
    pub fn spawn(mut self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.enrol().await {
                warn!(error = %e, "[collector] enrolment failed");
                return;
            }
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    received = self.transport.recv() => match received {
                        Ok((bytes, from)) => {
                            if let Err(e) = self.handle(&bytes, from).await {
                                warn!(%from, error = %e, "[collector] message failed");
                            }
                        }
                        Err(_) => break,
                    }
                }
            }
        })
    }

    async fn send(&self, to: SocketAddr, message: &Message) -> Result<()> {
        self.transport.send(to, &encode(message)?).await
    }

    async fn enrol(&self) -> Result<()> {
        let register = Message::RelayRegister {
            signing_key: self.keys.public_key(),
        };
        for agent in &self.agents {
            self.send(*agent, &register).await?;
        }
        if let Some(first) = self.agents.first() {
            for subject in &self.subjects {
                let message = Message::SubjectRegister {
                    public_key: subject.public_key(),
                    subject_addr: self.transport.local_addr(),
                    relay_addr: self.transport.local_addr(),
                };
                self.send(*first, &message).await?;
            }
        }
        Ok(())
    }

    async fn handle(&mut self, bytes: &[u8], from: SocketAddr) -> Result<()> {
        match decode(bytes)? {
            Message::CollectorRegister { .. } => {
                let reply = Message::CollectorRegisterReply {
                    signing_key: self.keys.public_key(),
                };
                self.send(from, &reply).await
            }
            Message::SyncReputation { g, .. } => {
                self.synced.insert(from, g);
                if let Some(pos) = self.waiting.iter().position(|addr| *addr == from) {
                    self.waiting.remove(pos);
                    self.serve(from, g).await?;
                }
                Ok(())
            }
            Message::DataRequest => match self.synced.get(&from).copied() {
                Some(g) => self.serve(from, g).await,
                None => {
                    self.waiting.push(from);
                    Ok(())
                }
            },
            other => {
                debug!(%from, event = other.name(), "[collector] ignored");
                Ok(())
            }
        }
    }

    /// Stream every observation as a signed record, then the terminator.
    async fn serve(&mut self, to: SocketAddr, g: GroupElement) -> Result<()> {
        self.synced.remove(&to);
        let mut records = Vec::new();
        for subject in &self.subjects {
            for features in &subject.observations {
                let record = Record::new(subject.pseudonym(&g), features.clone());
                records.push(SignedRecord::sign(record, &self.keys)?);
            }
        }

        let total = records.len();
        if total == 0 {
            let empty = DataRecord {
                start: true,
                entry: None,
                done: true,
            };
            return self.send(to, &Message::DataRecord(empty)).await;
        }
        for (i, signed) in records.into_iter().enumerate() {
            let item = DataRecord {
                start: i == 0,
                entry: Some(signed),
                done: i + 1 == total,
            };
            self.send(to, &Message::DataRecord(item)).await?;
        }
        Ok(())
    }
}
