//! Shopfront Checkout Server
//!
//! Checkout backend for the storefront: delivery pricing, slot selection and
//! order placement over wallet or hosted payment.

mod api;
mod config;
mod relay;
mod server;
mod sessions;
mod shutdown;
mod state;
mod sweeper;
#[cfg(test)]
mod test_support;
mod upstream;

use clap::Parser;
use config::{ConfigLoader, LoadedConfig};
use relay::NoticeRelay;
use server::{build_router, run_server};
use sessions::SessionRegistry;
use shopfront_core::config::ConfigStore;
use shopfront_core::events::notice_channel;
use shutdown::spawn_config_reload_handler;
use state::{AppState, Collaborators};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use sweeper::SessionSweeper;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use upstream::UpstreamGateway;

/// Shopfront Checkout - storefront checkout backend
#[derive(Parser, Debug)]
#[command(name = "shopfront-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Checkout service configuration (TOML)
    #[arg(short, long, env = "SHOPFRONT_CONFIG", default_value = "./shopfront-config.toml")]
    config: PathBuf,

    /// Listen address, overriding `server.listen`
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

/// Background processors that outlive single requests.
struct Processors {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Processors {
    async fn stop(self) {
        if self.shutdown_tx.send(true).is_err() {
            tracing::debug!("Processors already stopped");
        }
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(processor = name, error = %e, "Processor task failed");
            }
        }
    }
}

/// Wire collaborators, session registry and processors together.
fn assemble(loaded: LoadedConfig) -> anyhow::Result<(AppState, Processors)> {
    let gateway = UpstreamGateway::new(&loaded.upstream).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to build storefront client");
    })?;
    tracing::info!(base_url = %loaded.upstream.base_url, "Using storefront API");

    let checkout_config = ConfigStore::new(loaded.checkout);
    let server_config = ConfigStore::new(loaded.server);
    let sessions = SessionRegistry::new();
    let (notice_tx, notice_rx) = notice_channel();

    let state = AppState::new(
        Collaborators::upstream(gateway),
        sessions.clone(),
        notice_tx,
        checkout_config,
        server_config.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SessionSweeper::new(sessions.clone(), server_config.clone(), shutdown_rx.clone());
    let relay = NoticeRelay::new(notice_rx, sessions, server_config, shutdown_rx);
    let tasks = vec![
        ("NoticeRelay", tokio::spawn(relay.run())),
        ("SessionSweeper", tokio::spawn(sweeper.run())),
    ];

    Ok((state, Processors { shutdown_tx, tasks }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shopfront-server starting");

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded = config_loader.load().inspect_err(|e| {
        tracing::error!(path = ?args.config, error = %e, "Could not load configuration");
    })?;
    let listen_addr = loaded.server.listen;

    let (state, processors) = assemble(loaded)?;
    let reload_stop = spawn_config_reload_handler(state.clone(), config_loader);

    let served = run_server(build_router(state), listen_addr).await;

    reload_stop.notify_one();
    processors.stop().await;
    tracing::info!("shopfront-server stopped");

    served.map_err(Into::into)
}

/// Log filter from `RUST_LOG`, defaulting to info with quiet HTTP clients.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
