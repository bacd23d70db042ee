//! # Agent State
//!
//! One agent's mutable round state. Every field is owned by the agent; lists
//! only ever leave it as serialized copies.

use std::collections::HashMap;

use nt_02_ledger::{Block, Chain, MineStatus};
use nt_03_trust_evaluation::RoundMarkers;
use shared_crypto::{random_scalar, GroupElement, SchnorrPublicKey, Scalar};
use shared_types::{AgentAddress, EncryptedReputationEntry, Record, ReputationEntry};

use super::status::RoundStatus;
use crate::error::{AgentError, Result};

/// Keys a peer agent announced at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerKeys {
    /// Block and candidate signatures.
    pub signing: SchnorrPublicKey,
    /// Hop proofs and anonymous encryption.
    pub mix: GroupElement,
}

/// A sync that arrived while list confirmation was still running.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSync {
    /// Synced list.
    pub entries: Vec<ReputationEntry>,
    /// Round generator.
    pub g: GroupElement,
}

/// State shared by the listener and the round driver.
#[derive(Debug)]
pub struct AgentState {
    // registry
    /// Registered agents other than this one.
    pub peers: HashMap<AgentAddress, PeerKeys>,
    /// Record-signing key of the collector.
    pub collector_key: Option<SchnorrPublicKey>,
    /// Relays receiving the per-cycle sync.
    pub relays: HashMap<AgentAddress, SchnorrPublicKey>,

    // shuffle
    /// Scalar re-keying pseudonyms this round.
    pub round_key: Scalar,
    /// `re-keyed pseudonym → pseudonym before this agent`.
    pub key_map: HashMap<GroupElement, GroupElement>,
    /// Subjects registered since the last reverse shuffle (last agent only).
    pub pending_subjects: Vec<GroupElement>,
    /// Encrypted list at the end of the reverse shuffle (first agent only).
    pub encrypted: Vec<EncryptedReputationEntry>,
    /// Current plaintext reputation list.
    pub entries: Vec<ReputationEntry>,
    /// Round generator from the last sync.
    pub g: Option<GroupElement>,
    /// Last-evaluated cycle per pseudonym.
    pub markers: RoundMarkers,

    // round
    /// Lifecycle status.
    pub round_status: RoundStatus,
    /// Syncs applied so far; one per cycle.
    pub syncs: u64,
    /// Sync held back until the running cycle finishes.
    pub deferred_sync: Option<PendingSync>,
    /// Set when a shuffle hop fails; ends the run.
    pub abort: Option<String>,

    // ledger
    /// Records collected this round.
    pub records: Vec<Record>,
    /// Local chain.
    pub chain: Chain,
    /// Agreement status.
    pub mine_status: MineStatus,
    /// Best block seen this consensus round.
    pub winner: Option<Block>,
    /// Winning blocks this agent created (`Npk`).
    pub created_blocks: i64,
    /// Granularity chosen at the end of the last cycle.
    pub obfuscation_factor: i64,
    /// List-confirmation candidates by sender.
    pub candidates: HashMap<AgentAddress, Block>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentState {
    /// Fresh state with a random round key and empty chain.
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            collector_key: None,
            relays: HashMap::new(),
            round_key: random_scalar(),
            key_map: HashMap::new(),
            pending_subjects: Vec::new(),
            encrypted: Vec::new(),
            entries: Vec::new(),
            g: None,
            markers: RoundMarkers::new(),
            round_status: RoundStatus::Default,
            syncs: 0,
            deferred_sync: None,
            abort: None,
            records: Vec::new(),
            chain: Chain::new(),
            mine_status: MineStatus::Free,
            winner: None,
            created_blocks: 0,
            obfuscation_factor: 0,
            candidates: HashMap::new(),
        }
    }

    /// Keys of a registered peer.
    pub fn peer(&self, addr: &AgentAddress) -> Result<PeerKeys> {
        self.peers
            .get(addr)
            .copied()
            .ok_or(AgentError::UnknownSender(*addr))
    }

    /// Serial of the newest block, zero on an empty chain.
    pub fn latest_serial(&self) -> i64 {
        self.chain.previous().map_or(0, |block| block.serial)
    }

    /// Draw a new round key and forget the old mapping.
    pub fn refresh_round_key(&mut self) {
        self.round_key = random_scalar();
        self.key_map.clear();
    }

    /// Re-key a registering subject with this agent's round key.
    pub fn rekey_subject(&mut self, public_key: GroupElement) -> GroupElement {
        let rekeyed = public_key * self.round_key;
        self.key_map.insert(rekeyed, public_key);
        rekeyed
    }

    /// Buffer a fully re-keyed subject for the next reverse shuffle.
    pub fn buffer_subject(&mut self, pseudonym: GroupElement) -> bool {
        if self.pending_subjects.contains(&pseudonym)
            || self.entries.iter().any(|e| e.pseudonym == pseudonym)
        {
            return false;
        }
        self.pending_subjects.push(pseudonym);
        true
    }

    /// Current list followed by pending subjects at `bootstrap_score`.
    /// Drains the pending buffer.
    pub fn take_reverse_input(&mut self, bootstrap_score: f64) -> Vec<ReputationEntry> {
        let mut list = self.entries.clone();
        list.extend(
            self.pending_subjects
                .drain(..)
                .map(|pseudonym| ReputationEntry::new(pseudonym, bootstrap_score)),
        );
        list
    }

    /// Adopt a synced list: reset markers, extend the chain with a genesis or
    /// sync block, open a new round.
    pub fn apply_sync(
        &mut self,
        entries: Vec<ReputationEntry>,
        g: GroupElement,
        creator: &SchnorrPublicKey,
    ) {
        self.markers.reset(&entries);
        let block = match self.chain.previous() {
            None => Block::genesis(&entries, &g, creator),
            Some(previous) => Block::sync(
                previous,
                &entries,
                &g,
                self.obfuscation_factor,
                self.chain.len() as i64,
                self.created_blocks,
                creator,
            ),
        };
        self.chain.append(block);
        self.entries = entries;
        self.g = Some(g);
        self.winner = None;
        self.round_status = RoundStatus::ReadyForNewRound;
        self.syncs += 1;
    }

    /// Append the round's winner and adopt its list.
    pub fn end_consensus(&mut self, own_key: &SchnorrPublicKey) -> Result<Block> {
        self.mine_status = MineStatus::Free;
        self.records.clear();
        self.round_status = RoundStatus::ConsensusEnd;
        let winner = self
            .winner
            .take()
            .ok_or_else(|| AgentError::Protocol("receive window closed without a block".into()))?;

        self.entries = winner.entries()?;
        if winner.created_by(own_key) {
            self.created_blocks += 1;
        }
        self.chain.append(winner.clone());
        Ok(winner)
    }
}
