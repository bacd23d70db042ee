//! # Shuffle Relay
//!
//! ```text
//! reverse:  last ──► … ──► first ─┐
//! forward:                first ◄─┘ ──► … ──► last ──► SyncReputation
//! ```
//!
//! Every received batch is checked against the sending hop's mix key before
//! this agent adds its own hop.

use shared_types::{score_to_bytes, AgentAddress};
use tracing::{info, instrument};

use crate::context::AgentContext;
use crate::domain::hops::{forward_hop, reverse_hop, verify_hop, ShuffleBatch};
use crate::error::{AgentError, Result};
use crate::protocol::Message;

/// Last agent: merge pending subjects into the list and run the first
/// reverse hop.
#[instrument(skip_all, fields(agent = %ctx.local_addr()))]
pub async fn begin_reverse(ctx: &AgentContext) -> Result<()> {
    let bootstrap = ctx.trust().bootstrap_score();
    let batch = ctx.update(|state| {
        let input = state.take_reverse_input(bootstrap);
        let keys: Vec<_> = input.iter().map(|e| e.pseudonym).collect();
        let values: Vec<Vec<u8>> = input.iter().map(|e| score_to_bytes(e.score).to_vec()).collect();
        let batch = reverse_hop(&keys, &values, &state.key_map, ctx.mix())?;
        state.refresh_round_key();
        Ok::<_, AgentError>(batch)
    })?;
    info!(size = batch.len(), "[agent] reverse shuffle started");
    after_reverse(ctx, batch).await
}

/// Reverse hop received from the next agent.
#[instrument(skip_all, fields(%from, size = batch.len()))]
pub async fn on_reverse(ctx: &AgentContext, from: AgentAddress, batch: ShuffleBatch) -> Result<()> {
    expect_sender(from, ctx.topology().next_hop(), "reverse")?;
    let sender = ctx.with_state(|state| state.peer(&from))?;
    verify_hop(&batch, &sender.mix)?;

    let batch = ctx.update(|state| {
        let out = reverse_hop(&batch.keys, &batch.values, &state.key_map, ctx.mix())?;
        state.refresh_round_key();
        Ok::<_, AgentError>(out)
    })?;
    after_reverse(ctx, batch).await
}

/// Forward hop received from the previous agent.
#[instrument(skip_all, fields(%from, size = batch.len()))]
pub async fn on_forward(ctx: &AgentContext, from: AgentAddress, batch: ShuffleBatch) -> Result<()> {
    expect_sender(from, ctx.topology().previous_hop(), "forward")?;
    let sender = ctx.with_state(|state| state.peer(&from))?;
    verify_hop(&batch, &sender.mix)?;
    let g = batch
        .g
        .ok_or_else(|| AgentError::Protocol("forward batch without generator".into()))?;

    let out = ctx.update(|state| {
        forward_hop(
            &batch.keys,
            &batch.values,
            Some(g),
            &state.round_key,
            ctx.mix(),
            &mut state.key_map,
        )
    })?;
    after_forward(ctx, out).await
}

fn expect_sender(from: AgentAddress, expected: Option<AgentAddress>, direction: &str) -> Result<()> {
    match expected {
        Some(hop) if hop == from => Ok(()),
        _ => Err(AgentError::Protocol(format!(
            "{direction} batch from {from} is out of chain order"
        ))),
    }
}

/// Pass the reverse batch on, or turn it around at the first agent.
async fn after_reverse(ctx: &AgentContext, batch: ShuffleBatch) -> Result<()> {
    if let Some(previous) = ctx.topology().previous_hop() {
        return ctx.send(previous, &Message::ReverseShuffle(batch)).await;
    }

    let out = ctx.update(|state| {
        state.encrypted = batch.to_encrypted();
        forward_hop(
            &batch.keys,
            &batch.values,
            None,
            &state.round_key,
            ctx.mix(),
            &mut state.key_map,
        )
    })?;
    info!(size = out.len(), "[agent] reverse shuffle complete, forward shuffle started");
    after_forward(ctx, out).await
}

/// Pass the forward batch on, or publish the new list at the last agent.
async fn after_forward(ctx: &AgentContext, batch: ShuffleBatch) -> Result<()> {
    if let Some(next) = ctx.topology().next_hop() {
        return ctx.send(next, &Message::ForwardShuffle(batch)).await;
    }

    let entries = batch.to_plain()?;
    let g = batch
        .g
        .ok_or_else(|| AgentError::Protocol("forward batch without generator".into()))?;
    ctx.update(|state| {
        state.markers.reset(&entries);
        state.entries = entries.clone();
        state.g = Some(g);
    });

    info!(size = entries.len(), "[agent] forward shuffle complete, syncing list");
    let sync = Message::SyncReputation {
        pseudonyms: entries.iter().map(|e| e.pseudonym).collect(),
        scores: entries.iter().map(|e| e.score).collect(),
        g,
    };
    ctx.send_all(ctx.topology().agents().to_vec(), &sync).await;
    Ok(())
}
