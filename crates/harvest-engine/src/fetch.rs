//! The rate-limited, proxy-rotating fetch engine.
//!
//! One logical fetch per sector: acquire a concurrency permit, pace with a
//! randomized jitter delay, then try up to [`MAX_ATTEMPTS`] times with
//! exponential backoff between tries. Every per-sector failure degrades to
//! an empty record set; only counters record what happened.

use crate::rotator::ProxyRotator;
use crate::source::MapSource;
use crate::stats::RunStats;
use harvest_core::{PlaceRecord, RunProfile};
use harvest_grid::Sector;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Attempt ceiling per sector fetch.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff before retrying attempt `attempt` (0-indexed): `2^attempt` seconds.
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1_u64 << attempt)
}

/// Outcome of a single fetch attempt.
enum AttemptOutcome {
    /// 200 response, records extracted (possibly zero)
    Success(Vec<PlaceRecord>),
    /// 429 response; the used proxy is burned
    RateLimited,
    /// Any other status, transport error or timeout
    Retryable,
}

/// Proxy-rotating fetch engine with bounded concurrency.
pub struct FetchEngine {
    profile: RunProfile,
    timeout: Duration,
    rotator: Arc<ProxyRotator>,
    stats: Arc<RunStats>,
    semaphore: Arc<Semaphore>,
    /// One HTTP client per proxy endpoint, built lazily so each keeps its
    /// own connection pool for the run
    clients: Mutex<HashMap<Option<String>, Client>>,
}

impl FetchEngine {
    /// Create an engine paced by the given profile.
    #[must_use]
    pub fn new(
        profile: RunProfile,
        timeout: Duration,
        rotator: Arc<ProxyRotator>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(profile.max_concurrent)),
            profile,
            timeout,
            rotator,
            stats,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Run counters shared with this engine.
    #[must_use]
    pub fn stats(&self) -> &Arc<RunStats> {
        &self.stats
    }

    /// Fetch one sector from one source.
    ///
    /// Returns the extracted records, or an empty set when all attempts
    /// fail. The concurrency permit is held for the whole call and
    /// released on every exit path.
    pub async fn fetch_sector(
        &self,
        sector: &Sector,
        query: &str,
        source: MapSource,
    ) -> Vec<PlaceRecord> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("fetch semaphore never closed");

        self.jitter_delay().await;

        for attempt in 0..MAX_ATTEMPTS {
            let proxy = self.rotator.next();

            match self.attempt(sector, query, source, proxy.as_deref()).await {
                AttemptOutcome::Success(records) => return records,
                AttemptOutcome::RateLimited => {
                    self.stats.record_rate_limited();
                    if let Some(proxy) = &proxy {
                        self.rotator.mark_failed(proxy);
                    }
                }
                AttemptOutcome::Retryable => {}
            }

            self.stats.record_retry();
            if attempt + 1 < MAX_ATTEMPTS {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }

        debug!(sector = %sector.id, source = %source.tag(), "sector dropped after exhausting attempts");
        Vec::new()
    }

    /// One try: pick a client for the proxy, issue the request, classify
    /// the response.
    async fn attempt(
        &self,
        sector: &Sector,
        query: &str,
        source: MapSource,
        proxy: Option<&str>,
    ) -> AttemptOutcome {
        let client = match self.client_for(proxy) {
            Ok(client) => client,
            Err(e) => {
                warn!(?proxy, error = %e, "failed to build HTTP client for proxy");
                return AttemptOutcome::Retryable;
            }
        };

        let request = source.build_request(&client, sector, query);
        self.stats.record_request();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(sector = %sector.id, error = %e, "transport error");
                return AttemptOutcome::Retryable;
            }
        };

        match response.status() {
            StatusCode::OK => {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        debug!(sector = %sector.id, error = %e, "failed to read response body");
                        return AttemptOutcome::Retryable;
                    }
                };

                self.stats.record_success();

                match source.parse(&body, (sector.lat, sector.lng)) {
                    Ok(records) => {
                        self.stats.record_records(records.len());
                        AttemptOutcome::Success(records)
                    }
                    Err(e) => {
                        // Shape breakage must not abort the batch, but it is
                        // counted apart from ordinary sparse sectors
                        self.stats.record_unrecognized();
                        debug!(sector = %sector.id, error = %e, "unrecognized payload");
                        AttemptOutcome::Success(Vec::new())
                    }
                }
            }
            StatusCode::TOO_MANY_REQUESTS => AttemptOutcome::RateLimited,
            status => {
                debug!(sector = %sector.id, %status, "non-success status");
                AttemptOutcome::Retryable
            }
        }
    }

    /// Anti-detection pacing: uniform random delay from the profile range.
    async fn jitter_delay(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.profile.delay_min_ms..=self.profile.delay_max_ms)
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    /// Cached HTTP client for the given proxy endpoint.
    fn client_for(&self, proxy: Option<&str>) -> reqwest::Result<Client> {
        let key = proxy.map(ToString::to_string);

        let mut cache = self.clients.lock().expect("acquire client cache lock");
        if let Some(client) = cache.get(&key) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.profile.pool_size);

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = builder.build()?;
        cache.insert(key, client.clone());
        Ok(client)
    }
}
