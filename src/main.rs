//! QR code generation service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::request ──▶ handler ──▶ render
//!                      (axum, layers)   (params)          (validate)   (qrcode/image)
//!                                                            │
//!     Client Response                                        ▼
//!     ◀────────────── http::response ◀──────────────── FunctionResponse
//!                      (CORS, base64 decode)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use qr_service::config::{load_config, ServiceConfig};
use qr_service::observability::{logging, metrics};
use qr_service::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "qr-service")]
#[command(about = "HTTP service that renders QR codes as data URIs, SVG or PNG", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("qr-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        default_format = config.defaults.format.as_str(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
