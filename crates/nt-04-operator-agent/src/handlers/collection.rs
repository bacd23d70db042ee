//! Record stream from the collector.

use nt_02_ledger::MineStatus;
use shared_types::AgentAddress;
use tracing::{info, warn};

use crate::context::AgentContext;
use crate::domain::status::RoundStatus;
use crate::error::{AgentError, Result};
use crate::protocol::DataRecord;

/// Buffer verified records; on `done` run the trust update and get ready for
/// consensus.
pub fn on_data_record(ctx: &AgentContext, from: AgentAddress, item: DataRecord) -> Result<()> {
    if from != ctx.config().network.collector_addr {
        return Err(AgentError::UnknownSender(from));
    }
    let collector = ctx
        .with_state(|state| state.collector_key)
        .ok_or(AgentError::UnknownSender(from))?;

    let accepted = match &item.entry {
        Some(signed) => match signed.verify(&collector) {
            Ok(()) => Some(signed.record.clone()),
            Err(e) => {
                warn!(error = %e, "[agent] record signature rejected");
                None
            }
        },
        None => None,
    };

    ctx.update(|state| {
        if item.start {
            state.records.clear();
        }
        if let Some(record) = accepted {
            state.records.push(record);
        }
        if !item.done {
            return;
        }

        state.mine_status = MineStatus::Evaluate;
        let k = state.latest_serial();
        ctx.trust()
            .update(&mut state.entries, &mut state.markers, &state.records, k);
        state.round_status = RoundStatus::ReadyForConsensus;
        info!(records = state.records.len(), "[agent] data collection complete");
    });
    Ok(())
}
