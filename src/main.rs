//! Prompt gateway binary.
//!
//! Forwards browser prompts to the Gemini generateContent API while
//! enforcing a CORS policy and keeping the API key server-side.

use clap::Parser;
use tokio::net::TcpListener;

use prompt_proxy::config::{load_config, GatewayConfig};
use prompt_proxy::http::{shutdown_signal, HttpServer};
use prompt_proxy::observability::{init_logging, metrics};

/// CORS-enforcing prompt gateway for the Gemini API.
#[derive(Debug, Parser)]
#[command(name = "prompt-proxy", version)]
struct Cli {
    /// Path to a TOML configuration file. Compiled defaults apply when omitted.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();

    tracing::info!("prompt-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origin = %config.cors.allowed_origin,
        model = %config.upstream.model,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
