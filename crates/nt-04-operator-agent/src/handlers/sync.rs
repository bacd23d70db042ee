//! Reputation sync from the last agent.

use shared_crypto::GroupElement;
use shared_types::{zip_entries, AgentAddress, ReputationEntry};
use tracing::info;

use crate::context::AgentContext;
use crate::domain::state::PendingSync;
use crate::domain::status::RoundStatus;
use crate::error::{AgentError, Result};
use crate::protocol::Message;

/// Adopt the synced list, or hold it back while list confirmation runs.
pub async fn on_sync(
    ctx: &AgentContext,
    from: AgentAddress,
    pseudonyms: &[GroupElement],
    scores: &[f64],
    g: GroupElement,
) -> Result<()> {
    if from != ctx.topology().last() {
        return Err(AgentError::Protocol(format!(
            "sync from {from}, expected last agent {}",
            ctx.topology().last()
        )));
    }
    let entries = zip_entries(pseudonyms, scores)?;

    let deferred = ctx.update(|state| {
        if state.round_status == RoundStatus::ConsensusEnd {
            state.deferred_sync = Some(PendingSync {
                entries: entries.clone(),
                g,
            });
            true
        } else {
            false
        }
    });
    if deferred {
        info!("[agent] sync deferred until the current cycle ends");
        return Ok(());
    }
    apply(ctx, entries, g).await;
    Ok(())
}

/// Extend the chain with the synced list and forward it to relays.
pub async fn apply(ctx: &AgentContext, entries: Vec<ReputationEntry>, g: GroupElement) {
    let creator = ctx.public_key();
    let (relays, height) = ctx.update(|state| {
        state.apply_sync(entries.clone(), g, &creator);
        let relays: Vec<AgentAddress> = state.relays.keys().copied().collect();
        (relays, state.chain.len())
    });
    info!(subjects = entries.len(), height, "[agent] reputation synced");

    let message = Message::SyncReputation {
        pseudonyms: entries.iter().map(|e| e.pseudonym).collect(),
        scores: entries.iter().map(|e| e.score).collect(),
        g,
    };
    ctx.send_all(relays, &message).await;
}
