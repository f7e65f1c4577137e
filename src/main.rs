//! Modhub binary.
//!
//! Opens the configured catalog backend, optionally seeds dummy data and
//! reports what the catalog holds.

use tracing::info;
use tracing_subscriber::EnvFilter;

use modhub::{Catalog, Config};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("modhub=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Modhub...");

    let config = Config::from_env()?;
    info!("Storage backend: {:?}", config.backend);

    let catalog = Catalog::open(&config).await?;

    if config.seed_dummy_data {
        info!("Seeding dummy data...");
        catalog.seed(config.seed_dummy_mods).await?;
    }

    let summary = catalog.summary().await?;
    info!(
        "Catalog holds {} account(s), {} mod(s), {} distinct tag(s)",
        summary.accounts,
        summary.mods,
        summary.tags.len()
    );

    catalog.close().await;
    Ok(())
}
