//! Subject registration along the agent chain.

use shared_crypto::GroupElement;
use shared_types::AgentAddress;
use tracing::{debug, info};

use crate::context::AgentContext;
use crate::error::{AgentError, Result};
use crate::protocol::Message;

/// Re-key the subject with this agent's round key and pass it on. The last
/// agent buffers the final pseudonym and answers the relay.
pub async fn on_subject_register(
    ctx: &AgentContext,
    from: AgentAddress,
    public_key: GroupElement,
    subject_addr: AgentAddress,
    relay_addr: AgentAddress,
) -> Result<()> {
    let topology = ctx.topology();
    if let Some(previous) = topology.previous_hop() {
        if from != previous {
            return Err(AgentError::Protocol(format!(
                "subject registration from {from}, expected previous hop {previous}"
            )));
        }
    }

    let (rekeyed, buffered) = ctx.update(|state| {
        let rekeyed = state.rekey_subject(public_key);
        let buffered = topology.is_last() && state.buffer_subject(rekeyed);
        (rekeyed, buffered)
    });

    match topology.next_hop() {
        Some(next) => {
            let forward = Message::SubjectRegister {
                public_key: rekeyed,
                subject_addr,
                relay_addr,
            };
            ctx.send(next, &forward).await
        }
        None => {
            if buffered {
                info!(subject = %subject_addr, "[agent] subject buffered for next cycle");
            } else {
                debug!(subject = %subject_addr, "[agent] subject already registered");
            }
            let reply = Message::SubjectRegisterReply {
                public_key: rekeyed,
                subject_addr,
                relay_addr,
            };
            ctx.send(relay_addr, &reply).await
        }
    }
}
