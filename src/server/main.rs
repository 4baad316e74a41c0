//! Resolution server.
//!
//! Loads subzone polygons, neighbourhoods and transaction history, then serves
//! the address resolution API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use waypost::api::{router, AppState};
use waypost::config::Config;
use waypost::geocoder::OneMapClient;
use waypost::neighbourhood::NeighbourhoodDirectory;
use waypost::pip::{load_subzones, PipService, SubzoneSpatialIndex};
use waypost::store::CsvTransactionStore;
use waypost::AddressResolver;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "waypost-server")]
#[command(about = "Address to subzone/neighbourhood resolution server")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!("Waypost resolution server");

    let subzones = load_subzones(&config.data.subzones_path)?;
    let subzone_store = Arc::new(PipService::new(SubzoneSpatialIndex::build(subzones)));
    if subzone_store.index().is_empty() {
        anyhow::bail!(
            "No subzones loaded from {}",
            config.data.subzones_path.display()
        );
    }

    let neighbourhoods = NeighbourhoodDirectory::load_from_file(
        &config.data.neighbourhoods_path,
        config.resolver.max_candidates,
    )?;

    let transactions = Arc::new(CsvTransactionStore::load_from_file(
        &config.data.transactions_path,
    )?);

    info!("Using geocoder at {}", config.geocoder.base_url);
    let geocoder = Arc::new(OneMapClient::new(
        &config.geocoder.base_url,
        config.geocoder.timeout(),
    )?);

    let resolver = AddressResolver::new(
        geocoder,
        subzone_store,
        transactions,
        neighbourhoods,
        &config.resolver,
    );
    let state = AppState::new(resolver);

    // Periodically drop expired cache entries
    if state.resolver.cache().is_enabled() {
        let state = Arc::clone(&state);
        let period = config.resolver.cache_ttl().max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.resolver.cache().purge_expired();
            }
        });
    }

    let app = router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
