//! gridharvest CLI - harvest business listings over a country grid.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use harvest_core::{AppConfig, CountryId, ProfileName, RunProfile};
use harvest_db::{businesses, export, Storage};
use harvest_engine::{MapSource, Orchestrator, ProxyRotator, RunOptions};
use harvest_grid::{CountryLoader, CountryRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pacing mode; `auto` picks a profile from the usable proxy count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Select a profile from the number of usable proxies
    Auto,
    /// High concurrency, requires a large proxy pool
    Fast,
    /// Moderate concurrency for a handful of proxies
    Medium,
    /// Minimal concurrency, safe without proxies
    Slow,
}

/// Harvest business listings over a geographic grid.
#[derive(Debug, Parser)]
#[command(name = "gridharvest", version, about)]
struct Cli {
    /// Country to harvest (must have a definition in country-definitions/)
    #[arg(long)]
    country: Option<String>,

    /// Search query sent to the map sources
    #[arg(long)]
    query: Option<String>,

    /// Proxy list file, one endpoint per line
    #[arg(long)]
    proxy_file: Option<PathBuf>,

    /// Pacing mode
    #[arg(long, value_enum, default_value_t = Mode::Auto)]
    mode: Mode,

    /// Cap on how many land sectors are fetched
    #[arg(long)]
    max_sectors: Option<usize>,

    /// Grid density (sectors per axis)
    #[arg(long)]
    grid_size: Option<usize>,

    /// Also query the Overpass source for every sector
    #[arg(long)]
    multi_source: bool,

    /// Country definitions directory (defaults to country-definitions/
    /// under the workspace root)
    #[arg(long)]
    definitions_dir: Option<PathBuf>,

    /// Directory for the database and exports
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Test mode: 20x20 grid capped at 20 sectors
    #[arg(long)]
    test: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting gridharvest v{}", env!("CARGO_PKG_VERSION"));

    if cli.test {
        info!("test mode: 20x20 grid, 20 sectors");
        cli.grid_size = Some(20);
        cli.max_sectors = Some(20);
    }

    let config = AppConfig::load_with_env().context("load configuration")?;

    let country_name = cli.country.unwrap_or_else(|| config.general.country.clone());
    let country = CountryId::new(&country_name)
        .with_context(|| format!("invalid country '{country_name}'"))?;
    let query = cli.query.unwrap_or_else(|| config.general.query.clone());
    let grid_size = cli.grid_size.unwrap_or(config.general.grid_size);

    // Proxy pool drives the pacing profile
    let rotator = match &cli.proxy_file {
        Some(path) => ProxyRotator::from_file(path).context("read proxy file")?,
        None => ProxyRotator::new(Vec::new()),
    };

    let profile_name = match cli.mode {
        Mode::Auto => RunProfile::auto_select(rotator.available()),
        Mode::Fast => ProfileName::Fast,
        Mode::Medium => ProfileName::Medium,
        Mode::Slow => ProfileName::Slow,
    };
    let profile = profile_name.profile();
    info!(
        profile = ?profile_name,
        concurrent = profile.max_concurrent,
        proxies = rotator.available(),
        "profile selected"
    );

    let loader = match &cli.definitions_dir {
        Some(dir) => CountryLoader::new(dir),
        None => CountryLoader::with_default_dir(),
    }
    .context("locate country definitions")?;
    let registry = CountryRegistry::load_from(&loader).context("load country definitions")?;

    let mut sources = vec![MapSource::MapSearch];
    if cli.multi_source {
        sources.push(MapSource::Overpass);
    }

    let orchestrator = Orchestrator::new(
        registry,
        profile,
        Duration::from_secs(config.fetch.timeout_seconds),
        Arc::new(rotator),
    );

    let outcome = orchestrator
        .run(RunOptions {
            country: country.clone(),
            query,
            grid_size,
            max_sectors: cli.max_sectors,
            sources,
        })
        .await
        .context("harvest run failed")?;

    info!(
        records = outcome.records.len(),
        dispatched = outcome.dispatched_sectors,
        stats = %outcome.stats,
        "harvest finished"
    );

    // Persist and export
    let data_dir = cli.data_dir.unwrap_or(config.storage.data_dir);
    let base = data_dir.join(format!("{}_businesses", country.as_str()));

    let storage = Storage::open(base.with_extension("db"))
        .await
        .context("open storage")?;
    businesses::insert_many(storage.pool(), &outcome.records)
        .await
        .context("persist records")?;
    export::export_csv(storage.pool(), base.with_extension("csv"))
        .await
        .context("export CSV")?;
    export::export_json(storage.pool(), base.with_extension("json"))
        .await
        .context("export JSON")?;

    let total = businesses::count(storage.pool()).await.context("count rows")?;
    info!(total, dir = %data_dir.display(), "done");
    storage.close().await;

    Ok(())
}
