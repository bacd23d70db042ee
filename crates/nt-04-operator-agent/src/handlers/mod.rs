//! # Message Handlers
//!
//! The listener decodes each datagram and hands it to [`dispatch`]. Handlers
//! run one at a time, in arrival order.
//!
//! | Handler | Messages |
//! |---------|----------|
//! | `registration` | `AgentRegister`, `RelayRegister`, `CollectorRegisterReply` |
//! | `subject` | `SubjectRegister` |
//! | `shuffle` | `ReverseShuffle`, `ForwardShuffle` |
//! | `sync` | `SyncReputation` |
//! | `collection` | `DataRecord` |
//! | `consensus` | `BlockPublish`, `ListConfirmation` |

pub mod collection;
pub mod consensus;
pub mod registration;
pub mod shuffle;
pub mod subject;
pub mod sync;

use shared_types::AgentAddress;
use tracing::{debug, error, warn};

use crate::context::AgentContext;
use crate::error::Result;
use crate::protocol::Message;

/// Route one decoded message. Failures are logged here; a failed shuffle hop
/// also aborts the round.
pub async fn dispatch(ctx: &AgentContext, from: AgentAddress, message: Message) {
    let event = message.name();
    debug!(%from, event, "[agent] received");

    let shuffle_hop = matches!(
        message,
        Message::ReverseShuffle(_) | Message::ForwardShuffle(_)
    );
    if let Err(e) = route(ctx, from, message).await {
        if shuffle_hop {
            error!(%from, event, error = %e, "[agent] shuffle hop failed, aborting round");
            ctx.abort(format!("{event} from {from}: {e}"));
        } else if e.is_recoverable() {
            warn!(%from, event, error = %e, "[agent] message rejected");
        } else {
            error!(%from, event, error = %e, "[agent] handler failed");
        }
    }
}

async fn route(ctx: &AgentContext, from: AgentAddress, message: Message) -> Result<()> {
    match message {
        Message::AgentRegister {
            signing_key,
            mix_key,
        } => registration::on_agent_register(ctx, from, signing_key, mix_key).await,
        Message::RelayRegister { signing_key } => {
            registration::on_relay_register(ctx, from, signing_key).await
        }
        Message::CollectorRegisterReply { signing_key } => {
            registration::on_collector_reply(ctx, from, signing_key)
        }
        Message::SubjectRegister {
            public_key,
            subject_addr,
            relay_addr,
        } => subject::on_subject_register(ctx, from, public_key, subject_addr, relay_addr).await,
        Message::ReverseShuffle(batch) => shuffle::on_reverse(ctx, from, batch).await,
        Message::ForwardShuffle(batch) => shuffle::on_forward(ctx, from, batch).await,
        Message::SyncReputation {
            pseudonyms,
            scores,
            g,
        } => sync::on_sync(ctx, from, &pseudonyms, &scores, g).await,
        Message::DataRecord(record) => collection::on_data_record(ctx, from, record),
        Message::BlockPublish(signed) => consensus::on_block(ctx, from, signed),
        Message::ListConfirmation(signed) => consensus::on_candidate(ctx, from, signed),
        other => {
            debug!(%from, event = other.name(), "[agent] not addressed to agents, ignored");
            Ok(())
        }
    }
}
