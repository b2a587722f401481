//! Batch orchestration of a full harvest run.
//!
//! Sectors are generated once at startup, then dispatched in fixed-size
//! batches. Within a batch all fetches run concurrently (bounded by the
//! engine's permit pool); the orchestrator waits for the whole batch and
//! absorbs its results into the aggregator before dispatching the next
//! one, which keeps at most one batch's worth of fetches in flight and
//! gives a natural checkpoint for progress reporting.

use crate::dedup::{Aggregator, CanonicalRecord};
use crate::error::Result;
use crate::fetch::FetchEngine;
use crate::rotator::ProxyRotator;
use crate::source::MapSource;
use crate::stats::{RunStats, StatsSnapshot};
use futures::future;
use harvest_core::{CountryId, RunProfile};
use harvest_grid::{filter_land, CountryRegistry, Grid, GridStats};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything a single harvest run needs to know.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Target country, must exist in the registry
    pub country: CountryId,
    /// Search query sent to the map sources
    pub query: String,
    /// Grid density (sectors per axis)
    pub grid_size: usize,
    /// Optional cap on how many land sectors are dispatched
    pub max_sectors: Option<usize>,
    /// Sources to query, in order, for every sector
    pub sources: Vec<MapSource>,
}

/// Final result of a harvest run.
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Canonical record set after cross-source dedup
    pub records: Vec<CanonicalRecord>,
    /// Final fetch counters
    pub stats: StatsSnapshot,
    /// Grid generation summary
    pub grid_stats: GridStats,
    /// Land sectors actually dispatched
    pub dispatched_sectors: usize,
}

/// Drives grid generation, batched fetching and aggregation for one run.
pub struct Orchestrator {
    registry: CountryRegistry,
    engine: Arc<FetchEngine>,
    profile: RunProfile,
    stats: Arc<RunStats>,
}

impl Orchestrator {
    /// Create an orchestrator over a country registry and proxy pool.
    #[must_use]
    pub fn new(
        registry: CountryRegistry,
        profile: RunProfile,
        timeout: Duration,
        rotator: Arc<ProxyRotator>,
    ) -> Self {
        let stats = Arc::new(RunStats::new());
        let engine = Arc::new(FetchEngine::new(
            profile,
            timeout,
            rotator,
            Arc::clone(&stats),
        ));

        Self {
            registry,
            engine,
            profile,
            stats,
        }
    }

    /// Live counters for progress reporting.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Execute a full run.
    ///
    /// # Errors
    /// The only failure surfaced here is a configuration error (unknown
    /// country, invalid grid size) discovered before any fetch is issued.
    /// Per-sector failures degrade to missing output and counters.
    #[allow(clippy::cast_precision_loss)]
    pub async fn run(&self, options: RunOptions) -> Result<HarvestOutcome> {
        let definition = self.registry.get(&options.country)?;
        let grid = Grid::new(definition, options.grid_size)?;

        let sectors = grid.generate();
        let grid_stats = grid.stats(&sectors);
        let eliminated = format!("{:.1}%", grid_stats.water_elimination * 100.0);
        info!(
            country = %options.country,
            total = grid_stats.total_sectors,
            land = grid_stats.land_sectors,
            %eliminated,
            "grid generated"
        );

        let mut land = filter_land(&sectors);
        if let Some(max) = options.max_sectors {
            land.truncate(max);
        }
        let dispatched = land.len();
        info!(sectors = dispatched, batch_size = self.profile.batch_size, "dispatching");

        let mut aggregator = Aggregator::new();
        let started = Instant::now();
        let mut completed = 0_usize;

        for (batch_index, batch) in land.chunks(self.profile.batch_size).enumerate() {
            let tasks = batch.iter().map(|sector| {
                let engine = Arc::clone(&self.engine);
                let query = options.query.as_str();
                let sources = options.sources.as_slice();
                async move {
                    let mut records = Vec::new();
                    for source in sources {
                        records.extend(engine.fetch_sector(sector, query, *source).await);
                    }
                    records
                }
            });

            // Wait for the entire batch before moving on: batches are the
            // backpressure unit and the aggregation checkpoint
            let results = future::join_all(tasks).await;
            completed += batch.len();
            for records in results {
                aggregator.extend(records);
            }

            if (batch_index + 1) % self.profile.checkpoint_every == 0 {
                let elapsed = started.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    completed as f64 / elapsed
                } else {
                    0.0
                };
                let rate = format!("{rate:.1} sectors/s");
                info!(
                    completed,
                    total = dispatched,
                    unique = aggregator.len(),
                    %rate,
                    "progress checkpoint"
                );
            } else {
                debug!(completed, total = dispatched, "batch absorbed");
            }
        }

        let stats = self.stats.snapshot();
        let elapsed = format!("{:.0?}", started.elapsed());
        info!(unique_records = aggregator.len(), %elapsed, %stats, "run complete");

        Ok(HarvestOutcome {
            records: aggregator.into_records(),
            stats,
            grid_stats,
            dispatched_sectors: dispatched,
        })
    }
}
