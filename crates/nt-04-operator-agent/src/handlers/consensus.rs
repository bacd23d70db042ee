//! Blocks and list-confirmation candidates from peers.

use nt_02_ledger::{offer, verify_block, verify_candidate, LocalView, MineStatus, ReceiveAction};
use shared_types::AgentAddress;
use tracing::{debug, info};

use crate::context::AgentContext;
use crate::error::Result;
use crate::protocol::SignedBlock;

/// Verify a peer's mined block against local data and merge it into the
/// winner slot.
pub fn on_block(ctx: &AgentContext, from: AgentAddress, signed: SignedBlock) -> Result<()> {
    let tag = ctx.tag();
    let action = ctx.update(|state| {
        let peer = state.peer(&from)?;
        let view = LocalView {
            records: &state.records,
            entries: &state.entries,
        };
        verify_block(&signed.block, &signed.signature, &peer.signing, view, tag)?;

        let action = state.mine_status.on_block();
        match action {
            ReceiveAction::Merge => offer(&mut state.winner, signed.block),
            ReceiveAction::MergeAndReceive => {
                offer(&mut state.winner, signed.block);
                state.mine_status = MineStatus::Receiving;
            }
            ReceiveAction::Ignore => {}
        }
        Ok::<_, crate::error::AgentError>(action)
    })?;

    match action {
        ReceiveAction::Ignore => debug!(%from, "[agent] block after receive window, ignored"),
        ReceiveAction::MergeAndReceive => info!(%from, "[agent] peer block accepted, receive window open"),
        ReceiveAction::Merge => debug!(%from, "[agent] peer block merged"),
    }
    Ok(())
}

/// Keep one list-confirmation candidate per peer.
pub fn on_candidate(ctx: &AgentContext, from: AgentAddress, signed: SignedBlock) -> Result<()> {
    let tag = ctx.tag();
    let received = ctx.update(|state| {
        let peer = state.peer(&from)?;
        verify_candidate(&signed.block, &signed.signature, &peer.signing, tag)?;
        state.candidates.insert(from, signed.block);
        Ok::<_, crate::error::AgentError>(state.candidates.len())
    })?;
    debug!(%from, received, "[agent] confirmation candidate stored");
    Ok(())
}
