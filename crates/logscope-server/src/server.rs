//! WebSocket accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use logscope_engine::Engine;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing::{info, warn};

use crate::error::{Result, ServerError};
use crate::session::run_session;

/// The logscope WebSocket server.
pub struct LogscopeServer {
    engine: Arc<Engine>,
    listener: TcpListener,
}

impl LogscopeServer {
    /// Binds the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::BindFailed`] if the address cannot be bound.
    pub async fn bind(engine: Arc<Engine>, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;
        Ok(Self { engine, listener })
    }

    /// The actually bound address (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the process ends. Each connection gets
    /// its own session task; a failed handshake only drops that peer.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting fails fatally.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let engine = self.engine.clone();
            tokio::spawn(async move {
                let ws_stream = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        warn!(peer = %peer, error = %e, "websocket handshake failed");
                        return;
                    }
                };
                info!(peer = %peer, "client connected");
                run_session(ws_stream, engine).await;
                info!(peer = %peer, "client disconnected");
            });
        }
    }
}
