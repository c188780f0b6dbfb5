#![warn(clippy::all, clippy::pedantic)]

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use tokio::sync::Notify;
use toxprobe::{
    BoxCryptoProvider, Config, DirectorySource, config::HttpConfig, ProbeEngine, ProbeSettings, ScanScheduler,
    SnapshotStore, StartupError,
};
use tracing::{error, info};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration, created with defaults when missing
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let mut config = Config::from_config(args.config.as_ref()).map_err(StartupError::from)?;
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if args.print_config {
        println!("{config}");
        return Ok(());
    }

    let crypto = BoxCryptoProvider::generate()
        .map_err(|e| StartupError::Keypair(e.to_string()))?;
    info!("Probing as {}", crypto.keypair().public_key_hex());

    let store = SnapshotStore::new();
    let scheduler = build_scheduler(&config, crypto, store.clone());

    let shutdown = Arc::new(Notify::new());
    let scanner = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    let served = match listen_addrs(&config.http) {
        Ok(addrs) => run_server(&addrs, store).await,
        Err(e) => Err(e),
    };

    shutdown.notify_waiters();
    if let Err(e) = scanner.await {
        error!("Scanner task failed: {}", e);
    }

    served
}

fn build_scheduler(config: &Config, crypto: BoxCryptoProvider, store: SnapshotStore) -> ScanScheduler {
    let engine = Arc::new(ProbeEngine::new(Arc::new(crypto), ProbeSettings::from(&config.probe)));
    let loader = Arc::new(DirectorySource::from_location(&config.scan.directory_source));
    info!("Loading nodes from {}", loader);

    ScanScheduler::new(loader, engine, store, Duration::from_secs(config.scan.interval_seconds))
        .with_max_concurrent_nodes(config.scan.max_concurrent_nodes)
}

/// Resolve `[http] bind` and `port`. The bind value may be an IPv4 or IPv6
/// address or a hostname.
fn listen_addrs(http: &HttpConfig) -> Result<Vec<SocketAddr>, AppError> {
    let addrs: Vec<SocketAddr> = (http.bind.as_str(), http.port)
        .to_socket_addrs()
        .with_context(|| format!("invalid bind address {}", http.bind))?
        .collect();
    if addrs.is_empty() {
        return Err(anyhow::anyhow!("bind address {} resolved to nothing", http.bind).into());
    }
    Ok(addrs)
}

async fn run_server(addrs: &[SocketAddr], store: SnapshotStore) -> Result<(), AppError> {
    let data = web::Data::new(store);

    let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(routes::routes))
        .bind(addrs)
        .with_context(|| format!("could not bind status server to {addrs:?}"))?;

    for addr in server.addrs() {
        info!("Listening on http://{}", addr);
    }
    server.run().await?;

    Ok(())
}
