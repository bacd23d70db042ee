//! Single inbound event loop. Datagrams are decoded and dispatched one at a
//! time until shutdown is signalled or the transport fails.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::AgentContext;
use crate::handlers::dispatch;
use crate::protocol::decode;

/// Run the listener until `shutdown` flips to `true`.
pub async fn run(ctx: Arc<AgentContext>, mut shutdown: watch::Receiver<bool>) {
    info!(agent = %ctx.local_addr(), "[agent] listener started");
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            received = ctx.transport().recv() => match received {
                Ok((bytes, from)) => match decode(&bytes) {
                    Ok(message) => dispatch(&ctx, from, message).await,
                    Err(e) => warn!(%from, error = %e, "[agent] undecodable datagram dropped"),
                },
                Err(e) => {
                    error!(error = %e, "[agent] transport failed");
                    break;
                }
            }
        }
    }
    info!("[agent] listener stopped");
}
