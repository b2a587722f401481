//! Harvest Engine - Rate-limited fetching and cross-source aggregation.
//!
//! This crate drives the harvesting pipeline end to end: it turns a
//! country grid into batches of sector fetches, paces them through a
//! bounded permit pool with jitter, rotates proxies with sticky failure
//! exclusion, retries transient failures with exponential backoff, and
//! merges every extracted record into one canonical set.
//!
//! # Features
//!
//! - Concurrent sector fetching with profile-driven parallelism
//! - Round-robin proxy rotation; 429 responses burn the used proxy
//! - Up to 3 attempts per sector with `2^attempt` second backoff
//! - Degrade-to-empty failure policy: only configuration errors abort a run
//! - Run-scoped counters, including a distinct unrecognized-payload count
//! - Wholesale richer-record merge keyed on name + rounded coordinates
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_engine::{MapSource, Orchestrator, ProxyRotator, RunOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let rotator = Arc::new(ProxyRotator::from_file("proxies.txt")?);
//! let profile = RunProfile::auto_select(rotator.available()).profile();
//! let orchestrator = Orchestrator::new(registry, profile, Duration::from_secs(30), rotator);
//!
//! let outcome = orchestrator.run(RunOptions {
//!     country: CountryId::new("spain")?,
//!     query: "negocios".to_string(),
//!     grid_size: 165,
//!     max_sectors: None,
//!     sources: vec![MapSource::MapSearch],
//! }).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dedup;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod rotator;
pub mod source;
pub mod stats;

// Re-export commonly used types
pub use dedup::{merge_records, Aggregator, CanonicalRecord};
pub use error::{EngineError, Result};
pub use fetch::{backoff_delay, FetchEngine, MAX_ATTEMPTS};
pub use orchestrator::{HarvestOutcome, Orchestrator, RunOptions};
pub use rotator::ProxyRotator;
pub use source::MapSource;
pub use stats::{RunStats, StatsSnapshot};
