//! The logscope server binary.
//!
//! Serves a merged view of the configured log sources over a WebSocket.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use logscope_engine::Engine;
use logscope_parse::ParserRegistry;
use logscope_server::{LogscopeServer, ServerFileConfig};
use logscope_source::Sources;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "logscope", about = "Multi-source log exploration server")]
struct Options {
    /// Serving address.
    #[arg(long, default_value = "127.0.0.1:8888")]
    addr: SocketAddr,

    /// Path to the configuration file.
    #[arg(long, default_value = "logscope.json")]
    config: PathBuf,

    /// Show debug logs.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let options = Options::parse();

    let default_filter = if options.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = serve(&options).await {
        error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn serve(options: &Options) -> logscope_server::Result<()> {
    let config = ServerFileConfig::load(&options.config)?;

    let sources = Sources::from_configs(&config.sources)?;
    info!(sources = sources.len(), "loaded sources");

    let parser = ParserRegistry::new(&config.parsers)?;
    info!(parsers = parser.len(), "loaded parsers");

    let engine = Arc::new(Engine::new(
        config.global.to_engine_config(),
        sources,
        parser,
    ));

    let server = LogscopeServer::bind(engine, options.addr).await?;
    info!("serving on ws://{}", server.local_addr()?);
    server.run().await
}
