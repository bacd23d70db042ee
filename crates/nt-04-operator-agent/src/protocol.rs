//! # Wire Protocol
//!
//! Every datagram carries one [`Envelope`]: the integer event tag of the
//! message followed by its typed payload, encoded with `bincode`.
//!
//! | Tag | Message | Direction |
//! |-----|---------|-----------|
//! | 1 | `RelayRegister` | relay → agent |
//! | 2 | `RelayRegisterReply` | agent → relay |
//! | 3 | `CollectorRelayReply` | collector → relay |
//! | 4 | `CollectorRegister` | agent → collector |
//! | 5 | `AgentRegister` | agent ↔ agent |
//! | 6 | `CollectorRegisterReply` | collector → agent |
//! | 7 | `SubjectRegisterRelay` | subject → relay |
//! | 8 | `SubjectRegister` | relay → first agent, agent → next hop |
//! | 9 | `SubjectRegisterReply` | last agent → relay |
//! | 10 | `ForwardShuffle` | agent → next hop |
//! | 11 | `SyncReputation` | last agent → agents, agent → relays |
//! | 12 | `RelayData` | relay → collector |
//! | 13 | `DataRequest`, `DataRecord` | agent ↔ collector |
//! | 14 | `BlockPublish` | agent → agents |
//! | 15 | `ReverseShuffle` | agent → previous hop |
//! | 16 | `ListConfirmation` | agent → agents |

use nt_02_ledger::Block;
use serde::{Deserialize, Serialize};
use shared_crypto::{GroupElement, SchnorrKeyPair, SchnorrPublicKey, SchnorrSignature};
use shared_types::{AgentAddress, Record};

use crate::domain::hops::ShuffleBatch;
use crate::error::{AgentError, Result};

/// A behavioural record with the collector's signature over its canonical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedRecord {
    /// The record.
    pub record: Record,
    /// Schnorr signature over [`Record::canonical_bytes`].
    pub signature: SchnorrSignature,
}

impl SignedRecord {
    /// Sign `record` with `key`.
    pub fn sign(record: Record, key: &SchnorrKeyPair) -> Result<Self> {
        let signature = key.sign(&record.canonical_bytes()?);
        Ok(Self { record, signature })
    }

    /// Check the signature against `signer`.
    pub fn verify(&self, signer: &SchnorrPublicKey) -> Result<()> {
        signer.verify(&self.record.canonical_bytes()?, &self.signature)?;
        Ok(())
    }
}

/// One element of the collector's record stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    /// First element of the stream.
    pub start: bool,
    /// Absent on an empty stream's terminator.
    pub entry: Option<SignedRecord>,
    /// Last element of the stream.
    pub done: bool,
}

/// A signed block, used for consensus and list confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    /// The block.
    pub block: Block,
    /// Sender's signature over the block hash.
    pub signature: SchnorrSignature,
}

impl SignedBlock {
    /// Sign `block` with `key`.
    pub fn sign(block: Block, key: &SchnorrKeyPair) -> Self {
        let signature = key.sign(&block.hash());
        Self { block, signature }
    }
}

/// Protocol messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Relay announces its key.
    RelayRegister {
        /// Relay's signing key.
        signing_key: SchnorrPublicKey,
    },
    /// Agent acknowledges a relay.
    RelayRegisterReply,
    /// Collector acknowledges a relay.
    CollectorRelayReply,
    /// Agent announces its key to the collector.
    CollectorRegister {
        /// Agent's signing key.
        signing_key: SchnorrPublicKey,
    },
    /// Agent announces its keys to the ring.
    AgentRegister {
        /// Block and candidate signing key.
        signing_key: SchnorrPublicKey,
        /// Shuffle and encryption key.
        mix_key: GroupElement,
    },
    /// Collector answers an agent with its record-signing key.
    CollectorRegisterReply {
        /// Collector's signing key.
        signing_key: SchnorrPublicKey,
    },
    /// Subject registration as received by a relay.
    SubjectRegisterRelay {
        /// Subject's long-term public key.
        public_key: GroupElement,
        /// Subject's address.
        subject_addr: AgentAddress,
    },
    /// Subject registration travelling along the agent chain.
    SubjectRegister {
        /// Key as rewritten by the previous agents.
        public_key: GroupElement,
        /// Subject's address.
        subject_addr: AgentAddress,
        /// Relay to answer.
        relay_addr: AgentAddress,
    },
    /// Registration confirmed; the subject enters the next cycle.
    SubjectRegisterReply {
        /// Buffered pseudonym.
        public_key: GroupElement,
        /// Subject's address.
        subject_addr: AgentAddress,
        /// Relay that forwarded the registration.
        relay_addr: AgentAddress,
    },
    /// Forward shuffle hop.
    ForwardShuffle(ShuffleBatch),
    /// New plaintext list and round generator.
    SyncReputation {
        /// Pseudonyms of the new list.
        pseudonyms: Vec<GroupElement>,
        /// Scores parallel to `pseudonyms`.
        scores: Vec<f64>,
        /// Round generator `g`.
        g: GroupElement,
    },
    /// Raw record uploaded by a relay.
    RelayData(SignedRecord),
    /// Agent asks the collector for this round's records.
    DataRequest,
    /// One element of the collector's answer.
    DataRecord(DataRecord),
    /// Block mined during consensus.
    BlockPublish(SignedBlock),
    /// Reverse shuffle hop.
    ReverseShuffle(ShuffleBatch),
    /// Latest block, published for list confirmation.
    ListConfirmation(SignedBlock),
}

impl Message {
    /// Integer event tag.
    pub fn tag(&self) -> u8 {
        match self {
            Message::RelayRegister { .. } => 1,
            Message::RelayRegisterReply => 2,
            Message::CollectorRelayReply => 3,
            Message::CollectorRegister { .. } => 4,
            Message::AgentRegister { .. } => 5,
            Message::CollectorRegisterReply { .. } => 6,
            Message::SubjectRegisterRelay { .. } => 7,
            Message::SubjectRegister { .. } => 8,
            Message::SubjectRegisterReply { .. } => 9,
            Message::ForwardShuffle(_) => 10,
            Message::SyncReputation { .. } => 11,
            Message::RelayData(_) => 12,
            Message::DataRequest | Message::DataRecord(_) => 13,
            Message::BlockPublish(_) => 14,
            Message::ReverseShuffle(_) => 15,
            Message::ListConfirmation(_) => 16,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::RelayRegister { .. } => "relay-register",
            Message::RelayRegisterReply => "relay-register-reply",
            Message::CollectorRelayReply => "collector-relay-reply",
            Message::CollectorRegister { .. } => "collector-register",
            Message::AgentRegister { .. } => "agent-register",
            Message::CollectorRegisterReply { .. } => "collector-register-reply",
            Message::SubjectRegisterRelay { .. } => "subject-register-relay",
            Message::SubjectRegister { .. } => "subject-register",
            Message::SubjectRegisterReply { .. } => "subject-register-reply",
            Message::ForwardShuffle(_) => "forward-shuffle",
            Message::SyncReputation { .. } => "sync-reputation",
            Message::RelayData(_) => "relay-data",
            Message::DataRequest => "data-request",
            Message::DataRecord(_) => "data-record",
            Message::BlockPublish(_) => "block-publish",
            Message::ReverseShuffle(_) => "reverse-shuffle",
            Message::ListConfirmation(_) => "list-confirmation",
        }
    }
}

/// Datagram envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event tag, equal to `message.tag()`.
    pub event_type: u8,
    /// Typed payload.
    pub message: Message,
}

/// Encode a message into a datagram.
pub fn encode(message: &Message) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct EnvelopeRef<'a> {
        event_type: u8,
        message: &'a Message,
    }
    bincode::serialize(&EnvelopeRef {
        event_type: message.tag(),
        message,
    })
    .map_err(|e| AgentError::Encode(e.to_string()))
}

/// Decode a datagram, rejecting envelopes whose tag disagrees with the payload.
pub fn decode(bytes: &[u8]) -> Result<Message> {
    let envelope: Envelope =
        bincode::deserialize(bytes).map_err(|e| AgentError::Decode(e.to_string()))?;
    let expected = envelope.message.tag();
    if envelope.event_type != expected {
        return Err(AgentError::TagMismatch {
            tag: envelope.event_type,
            expected,
        });
    }
    Ok(envelope.message)
}
