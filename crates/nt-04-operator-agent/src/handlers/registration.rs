//! Key registration of peers, relays and the collector.

use shared_crypto::{GroupElement, SchnorrPublicKey};
use shared_types::AgentAddress;
use tracing::info;

use crate::context::AgentContext;
use crate::domain::state::PeerKeys;
use crate::error::{AgentError, Result};
use crate::protocol::Message;

/// Store the keys a ring member announced. A peer heard from for the first
/// time gets this agent's keys back, so late starters learn them too.
pub async fn on_agent_register(
    ctx: &AgentContext,
    from: AgentAddress,
    signing: SchnorrPublicKey,
    mix: GroupElement,
) -> Result<()> {
    if from == ctx.local_addr() || !ctx.topology().contains(&from) {
        return Err(AgentError::UnknownSender(from));
    }
    let (first_contact, total) = ctx.update(|state| {
        let previous = state.peers.insert(from, PeerKeys { signing, mix });
        (previous.is_none(), state.peers.len())
    });
    info!(peer = %from, registered = total, "[agent] agent registered");
    if first_contact {
        ctx.send(from, &own_keys(ctx)).await?;
    }
    Ok(())
}

/// This agent's `AgentRegister` announcement.
pub fn own_keys(ctx: &AgentContext) -> Message {
    Message::AgentRegister {
        signing_key: ctx.public_key(),
        mix_key: ctx.mix().public(),
    }
}

/// Store a relay and acknowledge it.
pub async fn on_relay_register(
    ctx: &AgentContext,
    from: AgentAddress,
    signing: SchnorrPublicKey,
) -> Result<()> {
    ctx.update(|state| state.relays.insert(from, signing));
    info!(relay = %from, "[agent] relay registered");
    ctx.send(from, &Message::RelayRegisterReply).await
}

/// Store the collector's record-signing key.
pub fn on_collector_reply(
    ctx: &AgentContext,
    from: AgentAddress,
    signing: SchnorrPublicKey,
) -> Result<()> {
    if from != ctx.config().network.collector_addr {
        return Err(AgentError::UnknownSender(from));
    }
    ctx.update(|state| state.collector_key = Some(signing));
    info!(collector = %from, "[agent] collector registered");
    Ok(())
}
