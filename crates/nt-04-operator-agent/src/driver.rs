//! # Round Driver
//!
//! Sequential control flow of one agent's maintenance cycles:
//!
//! ```text
//! (last agent) reverse shuffle ──► … ──► sync
//!      │
//!      ▼
//! DataRequest ──► records ──► trust update          READY_FOR_CONSENSUS
//!      │
//!      ▼
//! READY ─► mine ─► RECEIVING ─Θ─► FINISHED ─► append winner   CONSENSUS_END
//!      │
//!      ▼
//! list confirmation ─► plurality vote ─► time delay ─► obfuscation   DEFAULT
//! ```
//!
//! Every wait blocks on the context's notifications, never by polling.

use std::sync::Arc;
use std::time::Duration;

use nt_02_ledger::{mine, offer, plurality_vote, Block, MineStatus, MiningOutcome, MiningTemplate};
use tracing::{debug, info, instrument, warn};

use crate::context::AgentContext;
use crate::domain::status::RoundStatus;
use crate::error::{AgentError, Result};
use crate::handlers::{shuffle, sync};
use crate::protocol::{Message, SignedBlock};

/// Block until every peer and the collector have registered.
pub async fn await_registration(ctx: &AgentContext) -> Result<()> {
    let peers = ctx.topology().len() - 1;
    ctx.wait_until("registration", |s| {
        s.peers.len() >= peers && s.collector_key.is_some()
    })
    .await?;
    info!(peers, "[agent] registration complete");
    Ok(())
}

/// Run the configured number of maintenance cycles.
pub async fn run_cycles(ctx: &Arc<AgentContext>) -> Result<()> {
    let cycles = ctx.config().rounds.maintenance_cycles;
    for cycle in 1..=cycles {
        run_cycle(ctx, cycle).await?;
    }
    info!(cycles, "[agent] all maintenance cycles done");
    Ok(())
}

/// One maintenance cycle.
#[instrument(skip(ctx), fields(agent = %ctx.local_addr()))]
pub async fn run_cycle(ctx: &Arc<AgentContext>, cycle: u32) -> Result<()> {
    info!("[agent] maintenance cycle started");
    if ctx.topology().is_last() {
        shuffle::begin_reverse(ctx).await?;
    }
    ctx.wait_until("reputation sync", |s| s.syncs >= u64::from(cycle))
        .await?;

    collect(ctx).await?;
    for round in 1..=ctx.config().rounds.consensus_rounds {
        debug!(round, "[agent] consensus round");
        consensus_round(ctx).await?;
    }
    confirm_list(ctx).await?;
    finish_cycle(ctx).await?;
    info!("[agent] maintenance cycle finished");
    Ok(())
}

/// Ask the collector for this round's records and wait for the trust update.
pub async fn collect(ctx: &AgentContext) -> Result<()> {
    let collector = ctx.config().network.collector_addr;
    ctx.send(collector, &Message::DataRequest).await?;
    ctx.wait_until("data collection", |s| {
        s.round_status == RoundStatus::ReadyForConsensus
    })
    .await
}

/// Mine, accept peer blocks for Θ, append the winner.
pub async fn consensus_round(ctx: &Arc<AgentContext>) -> Result<Block> {
    let should_mine = ctx.update(|s| match s.mine_status {
        MineStatus::Free | MineStatus::Evaluate => {
            s.mine_status = MineStatus::Ready;
            true
        }
        MineStatus::Ready => true,
        _ => false,
    });

    let countdown = tokio::spawn(countdown(Arc::clone(ctx)));
    if should_mine {
        mine_and_publish(ctx).await?;
    }
    ctx.wait_until("receive window", |s| s.mine_status == MineStatus::Finished)
        .await?;
    countdown
        .await
        .map_err(|e| AgentError::Protocol(format!("countdown task failed: {e}")))??;

    let own = ctx.public_key();
    let winner = ctx.update(|s| s.end_consensus(&own))?;
    info!(
        serial = winner.serial,
        timestamp = winner.timestamp,
        own = winner.created_by(&own),
        "[agent] consensus round ended"
    );
    Ok(winner)
}

/// Close the receive window `countdown_steps × interval` after it opens.
async fn countdown(ctx: Arc<AgentContext>) -> Result<()> {
    ctx.wait_until("first block", |s| !s.mine_status.is_pre_window())
        .await?;
    let ledger = &ctx.config().ledger;
    let interval = Duration::from_millis(ledger.interval_ms);
    for remaining in (1..=ledger.countdown_steps()).rev() {
        debug!(remaining, "[agent] receive window countdown");
        tokio::time::sleep(interval).await;
    }
    ctx.update(|s| s.mine_status = MineStatus::Finished);
    debug!("[agent] receive window closed");
    Ok(())
}

/// Search for a block off the async runtime; publish it if no peer block
/// opened the receive window first.
#[instrument(skip_all)]
async fn mine_and_publish(ctx: &Arc<AgentContext>) -> Result<()> {
    let creator = ctx.public_key();
    let template = ctx.update(|s| {
        if !s.mine_status.can_mine() {
            return Ok(None);
        }
        let previous = s
            .chain
            .previous()
            .ok_or_else(|| AgentError::Protocol("mining without a chain".into()))?;
        let template = MiningTemplate::new(
            previous,
            s.chain.len(),
            s.created_blocks,
            &s.records,
            &s.entries,
            &creator,
        )?;
        s.mine_status = MineStatus::Mining;
        Ok::<_, AgentError>(Some(template))
    })?;
    let Some(template) = template else {
        return Ok(());
    };

    let tag = ctx.tag();
    let miner = Arc::clone(ctx);
    let outcome = tokio::task::spawn_blocking(move || {
        mine(&template, tag, || {
            miner.with_state(|s| s.mine_status != MineStatus::Mining)
        })
    })
    .await
    .map_err(|e| AgentError::Protocol(format!("mining task failed: {e}")))?;

    match outcome {
        MiningOutcome::Found(block) => {
            let kept = ctx.update(|s| {
                if s.mine_status != MineStatus::Mining {
                    return false;
                }
                s.mine_status = MineStatus::Receiving;
                offer(&mut s.winner, block.clone());
                true
            });
            if kept {
                info!(serial = block.serial, timestamp = block.timestamp, "[agent] block mined");
                let signed = SignedBlock::sign(block, ctx.signing());
                ctx.broadcast_peers(&Message::BlockPublish(signed)).await;
            } else {
                debug!("[agent] mined block discarded, receive window already open");
            }
        }
        MiningOutcome::Cancelled { attempts } => {
            debug!(attempts, "[agent] mining stopped by peer block");
        }
        MiningOutcome::Exhausted => warn!("[agent] nonce space exhausted without a block"),
    }
    Ok(())
}

/// Publish the latest block and collect one candidate per agent.
pub async fn confirm_list(ctx: &AgentContext) -> Result<()> {
    let local = ctx.local_addr();
    let latest = ctx.update(|s| {
        let latest = s
            .chain
            .previous()
            .cloned()
            .ok_or_else(|| AgentError::Protocol("confirmation without a chain".into()))?;
        s.candidates.insert(local, latest.clone());
        Ok::<_, AgentError>(latest)
    })?;
    let signed = SignedBlock::sign(latest, ctx.signing());
    ctx.broadcast_peers(&Message::ListConfirmation(signed)).await;

    let quorum = ctx.topology().len();
    let timeout = ctx.config().rounds.confirmation_timeout();
    match ctx
        .wait_until_timeout("list confirmations", timeout, |s| s.candidates.len() >= quorum)
        .await
    {
        Ok(()) => Ok(()),
        Err(AgentError::Timeout(what)) => {
            let received = ctx.with_state(|s| s.candidates.len());
            warn!(what, received, quorum, "[agent] deciding on the candidates received");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Adopt the voted list, decay, obfuscate, then apply any held-back sync.
pub async fn finish_cycle(ctx: &AgentContext) -> Result<()> {
    let trust = ctx.trust();
    let deferred = ctx.update(|s| {
        let candidates: Vec<Block> = s.candidates.drain().map(|(_, block)| block).collect();
        let voted = plurality_vote(&candidates)
            .ok_or_else(|| AgentError::Protocol("no confirmation candidates".into()))?;
        s.entries = voted.entries()?;

        let k = s.latest_serial();
        trust.time_delay(&mut s.entries, &mut s.markers, k);
        for entry in &s.entries {
            info!(pseudonym = %entry.pseudonym, score = entry.score, "[agent] trust value");
        }
        let choice = trust.obfuscate(&mut s.entries);
        s.obfuscation_factor = i64::from(choice.d);
        s.round_status = RoundStatus::Default;
        Ok::<_, AgentError>(s.deferred_sync.take())
    })?;

    if let Some(pending) = deferred {
        sync::apply(ctx, pending.entries, pending.g).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryNetwork;
    use crate::context::AgentIdentity;
    use crate::domain::state::PendingSync;
    use crate::testing::{agent_config, trust_engine};
    use shared_crypto::GroupElement;
    use shared_types::{AgentAddress, ReputationEntry};

    fn addr(port: u16) -> AgentAddress {
        AgentAddress::from(([127, 0, 0, 1], port))
    }

    fn solo() -> Arc<AgentContext> {
        let network = MemoryNetwork::new();
        Arc::new(
            AgentContext::new(
                agent_config(&[addr(9000)], addr(9000), addr(8000)),
                AgentIdentity::generate(),
                trust_engine(),
                Arc::new(network.endpoint(addr(9000))),
            )
            .unwrap(),
        )
    }

    fn synced(ctx: &AgentContext, scores: &[f64]) {
        let creator = ctx.public_key();
        let entries = scores
            .iter()
            .map(|s| ReputationEntry::new(GroupElement::random(), *s))
            .collect();
        ctx.update(|s| s.apply_sync(entries, GroupElement::random(), &creator));
    }

    #[tokio::test]
    async fn test_solo_consensus_appends_own_block() {
        let ctx = solo();
        synced(&ctx, &[0.2, 0.4]);
        ctx.update(|s| s.mine_status = MineStatus::Evaluate);

        let winner = consensus_round(&ctx).await.unwrap();
        assert!(winner.created_by(&ctx.public_key()));
        ctx.with_state(|s| {
            assert_eq!(s.chain.len(), 2);
            assert_eq!(s.created_blocks, 1);
            assert_eq!(s.mine_status, MineStatus::Free);
            assert_eq!(s.round_status, RoundStatus::ConsensusEnd);
        });
    }

    #[tokio::test]
    async fn test_solo_confirmation_and_cycle_end() {
        let ctx = solo();
        synced(&ctx, &[0.2, 0.4, 0.9]);
        confirm_list(&ctx).await.unwrap();
        finish_cycle(&ctx).await.unwrap();

        ctx.with_state(|s| {
            assert!(s.candidates.is_empty());
            assert_eq!(s.round_status, RoundStatus::Default);
            assert_eq!(s.obfuscation_factor, 30);
            assert!(s.entries.iter().all(|e| (0.0..=1.0).contains(&e.score)));
        });
    }

    #[tokio::test]
    async fn test_deferred_sync_applied_at_cycle_end() {
        let ctx = solo();
        synced(&ctx, &[0.5]);
        let next = vec![ReputationEntry::new(GroupElement::random(), 0.7)];
        ctx.update(|s| {
            s.round_status = RoundStatus::ConsensusEnd;
            s.deferred_sync = Some(PendingSync {
                entries: next.clone(),
                g: GroupElement::random(),
            });
        });

        confirm_list(&ctx).await.unwrap();
        finish_cycle(&ctx).await.unwrap();
        ctx.with_state(|s| {
            assert_eq!(s.syncs, 2);
            assert_eq!(s.entries, next);
            assert_eq!(s.chain.len(), 2);
            assert_eq!(s.chain.previous().unwrap().obfuscation_factor, 30);
            assert_eq!(s.round_status, RoundStatus::ReadyForNewRound);
        });
    }

    #[tokio::test]
    async fn test_confirmation_timeout_degrades_to_received() {
        let network = MemoryNetwork::new();
        let mut config = agent_config(&[addr(9000), addr(9001)], addr(9000), addr(8000));
        config.rounds.confirmation_timeout_ms = Some(30);
        let ctx = AgentContext::new(
            config,
            AgentIdentity::generate(),
            trust_engine(),
            Arc::new(network.endpoint(addr(9000))),
        )
        .unwrap();
        synced(&ctx, &[0.3]);

        confirm_list(&ctx).await.unwrap();
        ctx.with_state(|s| assert_eq!(s.candidates.len(), 1));
        finish_cycle(&ctx).await.unwrap();
    }
}
