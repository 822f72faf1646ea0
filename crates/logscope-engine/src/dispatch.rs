//! Per-connection request dispatch.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::Engine;
use crate::protocol::{Request, Response};

/// Runs the dispatch loop for one connection.
///
/// Reads one request at a time from `inbound`. Each arrival cancels the
/// previously active request's token and launches the new handler without
/// waiting for the old one — preemption is cooperative, so the tail of a
/// preempted request may interleave with its successor until its terminal
/// marker arrives.
///
/// Returns once `inbound` closes or `lifetime` is cancelled, after
/// cancelling the active request and draining every outstanding handler.
/// The caller drops its `outbound` sender afterwards, which closes the
/// response channel and stops the connection's writer.
pub async fn run_connection(
    engine: Arc<Engine>,
    mut inbound: mpsc::Receiver<Request>,
    outbound: mpsc::Sender<Response>,
    lifetime: CancellationToken,
) {
    let mut handlers: JoinSet<()> = JoinSet::new();
    let mut active: Option<CancellationToken> = None;

    loop {
        tokio::select! {
            request = inbound.recv() => {
                let Some(request) = request else { break };

                // Preempt whatever is running; do not wait for it.
                if let Some(previous) = active.take() {
                    previous.cancel();
                }
                let token = lifetime.child_token();
                active = Some(token.clone());

                debug!(id = request.meta.id, action = ?request.meta.action, "dispatching request");
                let engine = engine.clone();
                let outbound = outbound.clone();
                handlers.spawn(engine.serve(request, token, outbound));
            }
            () = lifetime.cancelled() => break,
            // Reap settled handlers so the set stays small.
            Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
        }
    }

    if let Some(previous) = active.take() {
        previous.cancel();
    }
    while handlers.join_next().await.is_some() {}
    debug!("connection dispatch drained");
}
