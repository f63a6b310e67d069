//! xray-pult server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                     XRAY PULT                         │
//!                     │                                                       │
//!  POST /add_user     │  ┌────────┐   ┌──────────────┐   ┌────────────────┐   │
//!  POST /del_user ────┼─▶│  http  │──▶│  directory   │──▶│  config.json   │   │
//!                     │  │handlers│   │ queue worker │   │ (temp+rename)  │   │
//!                     │  └───┬────┘   └──────────────┘   └────────────────┘   │
//!                     │      │ after commit                                   │
//!                     │      ▼                                                │
//!                     │  ┌──────────────┐                                     │
//!                     │  │    reload    │──── docker restart xray-server ─────┼──▶ proxy
//!                     │  │ (timeout)    │                                     │
//!                     │  └──────────────┘                                     │
//!                     │                                                       │
//!  GET /sub/{id} ─────┼─▶ subscription renderer ◀── sub template              │
//!  GET /users    ─────┼─▶ admin (bearer token) ◀── config.json                │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use xray_pult::config::load_config;
use xray_pult::lifecycle::signals::spawn_signal_listener;
use xray_pult::observability::{logging, metrics};
use xray_pult::reload::CliRestarter;
use xray_pult::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "xray-pult", version, about = "Client directory and reload service for Xray")]
struct Args {
    /// Optional TOML settings file; environment variables override it.
    #[arg(short, long, env = "PULT_SETTINGS")]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(args.settings.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("xray-pult: {e}");
            std::process::exit(2);
        }
    };

    logging::init_logging(config.observability.log_format);
    tracing::info!("xray-pult v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        config_file = %config.storage.config_file,
        sub_file = %config.storage.sub_file,
        reload_enabled = config.reload.enabled,
        service = %config.reload.service_name,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let restarter = CliRestarter::new(config.reload.runtime.clone());
    let server = HttpServer::new(config, restarter, &shutdown);
    server.run(listener, shutdown.listener()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
