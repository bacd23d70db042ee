//! # Agent Ring Topology
//!
//! Agents form a chain ordered by name. The first agent has no previous hop
//! and ends the reverse shuffle; the last agent has no next hop, starts the
//! reverse shuffle and ends the forward one.

use shared_types::AgentAddress;

use crate::error::{AgentError, Result};

/// This agent's position in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    agents: Vec<AgentAddress>,
    index: usize,
}

impl Topology {
    /// Locate `local` in the ordered agent list.
    pub fn new(agents: Vec<AgentAddress>, local: AgentAddress) -> Result<Self> {
        let index = agents
            .iter()
            .position(|addr| *addr == local)
            .ok_or(AgentError::NotInTopology(local))?;
        Ok(Self { agents, index })
    }

    /// This agent's address.
    pub fn local(&self) -> AgentAddress {
        self.agents[self.index]
    }

    /// All agents in chain order.
    pub fn agents(&self) -> &[AgentAddress] {
        &self.agents
    }

    /// Every agent except this one.
    pub fn peers(&self) -> impl Iterator<Item = AgentAddress> + '_ {
        let local = self.local();
        self.agents.iter().copied().filter(move |addr| *addr != local)
    }

    /// Whether `addr` belongs to the ring.
    pub fn contains(&self, addr: &AgentAddress) -> bool {
        self.agents.contains(addr)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always false for a constructed topology.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Hop towards the first agent.
    pub fn previous_hop(&self) -> Option<AgentAddress> {
        self.index.checked_sub(1).map(|i| self.agents[i])
    }

    /// Hop towards the last agent.
    pub fn next_hop(&self) -> Option<AgentAddress> {
        self.agents.get(self.index + 1).copied()
    }

    /// No previous hop.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// No next hop.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.agents.len()
    }

    /// Agent that starts the reverse shuffle and broadcasts the sync.
    pub fn last(&self) -> AgentAddress {
        self.agents[self.agents.len() - 1]
    }
}
