//! Per-connection WebSocket session.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use logscope_engine::{run_connection, Engine, Request, Response};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Capacity of the inbound request channel.
const REQUEST_BUFFER: usize = 16;
/// Capacity of the outbound response channel. The bound provides
/// backpressure on fast sources.
const RESPONSE_BUFFER: usize = 64;

/// Runs one connection to completion.
///
/// Three tasks cooperate: this function's read loop feeding decoded
/// [`Request`] frames to the dispatcher, the dispatcher itself
/// ([`run_connection`]), and a single writer task serializing every
/// [`Response`] frame — the only writer, so frames reach the client in
/// production order.
///
/// Teardown is ordered: the read loop ends (socket close or read error),
/// the connection token is cancelled, the dispatcher drains its handlers
/// and drops the response sender, and the writer exits once the channel
/// empties.
pub async fn run_session<S>(ws_stream: S, engine: Arc<Engine>)
where
    S: StreamExt<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
        + SinkExt<WsMessage>
        + Unpin
        + Send
        + 'static,
    <S as futures::Sink<WsMessage>>::Error: std::fmt::Display,
{
    let session_id = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = ws_stream.split();
    let lifetime = CancellationToken::new();

    let (request_tx, request_rx) = mpsc::channel::<Request>(REQUEST_BUFFER);
    let (response_tx, mut response_rx) = mpsc::channel::<Response>(RESPONSE_BUFFER);

    debug!(session_id = %session_id, "session started");

    let dispatcher = tokio::spawn(run_connection(
        engine,
        request_rx,
        response_tx,
        lifetime.clone(),
    ));

    // The single writer. Exiting drops the receiver, which unblocks any
    // handler still emitting; those frames are discarded.
    let writer = tokio::spawn(async move {
        while let Some(response) = response_rx.recv().await {
            let frame = match serde_json::to_string(&response) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "failed to encode response");
                    continue;
                }
            };
            if let Err(e) = ws_sink.send(WsMessage::text(frame)).await {
                warn!(session_id = %session_id, error = %e, "write failed");
                break;
            }
        }
    });

    while let Some(message) = ws_stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "read failed");
                break;
            }
        };
        let text: &str = match &message {
            WsMessage::Text(text) => text.as_str(),
            WsMessage::Binary(data) => match std::str::from_utf8(data) {
                Ok(text) => text,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "non-UTF-8 frame");
                    break;
                }
            },
            WsMessage::Close(_) => break,
            // Ping/Pong are answered at the WebSocket layer.
            _ => continue,
        };
        let request: Request = match serde_json::from_str(text) {
            Ok(request) => request,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "bad request frame");
                break;
            }
        };
        if request_tx.send(request).await.is_err() {
            break;
        }
    }

    // Connection is gone: preempt whatever is running and drain.
    lifetime.cancel();
    drop(request_tx);
    if let Err(e) = dispatcher.await {
        warn!(session_id = %session_id, error = %e, "dispatcher task failed");
    }
    if let Err(e) = writer.await {
        warn!(session_id = %session_id, error = %e, "writer task failed");
    }
    debug!(session_id = %session_id, "session closed");
}
