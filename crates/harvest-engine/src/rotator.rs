//! Round-robin proxy rotation with sticky failure exclusion.
//!
//! The rotator owns the proxy pool and its failure flags; no other
//! component mutates them. A proxy marked failed stays failed for the
//! remainder of the run.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// One outbound relay endpoint and its run-scoped state.
#[derive(Debug, Clone)]
struct ProxyEndpoint {
    /// Endpoint as read from the list, scheme optional
    raw: String,
    /// Sticky failure flag, set once
    failed: bool,
}

impl ProxyEndpoint {
    /// Full proxy URL, lazily prefixing `http://` when no scheme is given.
    fn url(&self) -> String {
        if self.raw.contains("://") {
            self.raw.clone()
        } else {
            format!("http://{}", self.raw)
        }
    }
}

struct RotatorState {
    endpoints: Vec<ProxyEndpoint>,
    cursor: usize,
}

/// Stateful round-robin selector over a pool of proxy endpoints.
pub struct ProxyRotator {
    state: Mutex<RotatorState>,
}

impl ProxyRotator {
    /// Create a rotator over the given endpoint list.
    #[must_use]
    pub fn new(proxies: Vec<String>) -> Self {
        let endpoints = proxies
            .into_iter()
            .map(|raw| ProxyEndpoint { raw, failed: false })
            .collect();

        Self {
            state: Mutex::new(RotatorState {
                endpoints,
                cursor: 0,
            }),
        }
    }

    /// Load a rotator from a proxy list file.
    ///
    /// One endpoint per line; blank lines and lines starting with `#` are
    /// ignored. A missing file yields an empty rotator, matching a
    /// proxyless run.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "proxy file not found, running without proxies");
            return Ok(Self::new(Vec::new()));
        }

        let file = std::fs::File::open(path)?;
        let mut proxies = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            proxies.push(trimmed.to_string());
        }

        debug!(path = %path.display(), count = proxies.len(), "loaded proxy list");
        Ok(Self::new(proxies))
    }

    /// Next usable proxy URL, round-robin over non-failed endpoints.
    ///
    /// Returns `None` when the pool is empty or every endpoint has failed.
    #[must_use]
    pub fn next(&self) -> Option<String> {
        let mut state = self.state.lock().expect("acquire rotator lock");
        let len = state.endpoints.len();
        if len == 0 {
            return None;
        }

        for _ in 0..len {
            let index = state.cursor % len;
            state.cursor += 1;
            if !state.endpoints[index].failed {
                return Some(state.endpoints[index].url());
            }
        }

        None
    }

    /// Mark an endpoint failed for the rest of the run.
    ///
    /// Accepts either the raw list entry or the URL returned by
    /// [`ProxyRotator::next`].
    pub fn mark_failed(&self, proxy: &str) {
        let mut state = self.state.lock().expect("acquire rotator lock");
        for endpoint in &mut state.endpoints {
            if endpoint.raw == proxy || endpoint.url() == proxy {
                if !endpoint.failed {
                    endpoint.failed = true;
                    warn!(proxy = %endpoint.raw, "proxy marked failed");
                }
                return;
            }
        }
    }

    /// Total number of endpoints in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().expect("acquire rotator lock").endpoints.len()
    }

    /// Whether the pool has no endpoints at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of endpoints not yet marked failed.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state
            .lock()
            .expect("acquire rotator lock")
            .endpoints
            .iter()
            .filter(|e| !e.failed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotator(entries: &[&str]) -> ProxyRotator {
        ProxyRotator::new(entries.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let rotator = rotator(&[]);
        assert!(rotator.next().is_none());
        assert!(rotator.is_empty());
    }

    #[test]
    fn test_round_robin_order() {
        let rotator = rotator(&["10.0.0.1:8080", "10.0.0.2:8080"]);
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.1:8080");
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.2:8080");
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.1:8080");
    }

    #[test]
    fn test_scheme_preserved_when_present() {
        let rotator = rotator(&["socks5://10.0.0.1:1080"]);
        assert_eq!(rotator.next().unwrap(), "socks5://10.0.0.1:1080");
    }

    #[test]
    fn test_failed_endpoint_skipped_on_next_cycle() {
        // Three entries; entry 2 fails after a rate limit. The next cycle
        // must yield entry 3 then entry 1, skipping entry 2.
        let rotator = rotator(&["10.0.0.1:80", "10.0.0.2:80", "10.0.0.3:80"]);

        assert_eq!(rotator.next().unwrap(), "http://10.0.0.1:80");
        let second = rotator.next().unwrap();
        assert_eq!(second, "http://10.0.0.2:80");
        rotator.mark_failed(&second);

        assert_eq!(rotator.next().unwrap(), "http://10.0.0.3:80");
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.1:80");
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.3:80");
    }

    #[test]
    fn test_none_iff_all_failed() {
        let rotator = rotator(&["10.0.0.1:80", "10.0.0.2:80"]);
        rotator.mark_failed("10.0.0.1:80");
        assert_eq!(rotator.available(), 1);
        assert!(rotator.next().is_some());

        rotator.mark_failed("10.0.0.2:80");
        assert_eq!(rotator.available(), 0);
        assert!(rotator.next().is_none());
    }

    #[test]
    fn test_mark_failed_is_sticky_and_idempotent() {
        let rotator = rotator(&["10.0.0.1:80"]);
        rotator.mark_failed("10.0.0.1:80");
        rotator.mark_failed("http://10.0.0.1:80");
        assert_eq!(rotator.available(), 0);
        assert!(rotator.next().is_none());
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        let temp_dir = tempfile::TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("proxies.txt");
        std::fs::write(
            &path,
            "# fleet A\n10.0.0.1:8080\n\n  \nhttp://10.0.0.2:8080\n# trailing comment\n",
        )
        .expect("write proxy file");

        let rotator = ProxyRotator::from_file(&path).expect("load proxy file");
        assert_eq!(rotator.len(), 2);
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.1:8080");
        assert_eq!(rotator.next().unwrap(), "http://10.0.0.2:8080");
    }

    #[test]
    fn test_from_missing_file_is_empty_pool() {
        let rotator =
            ProxyRotator::from_file("/nonexistent/proxies.txt").expect("missing file tolerated");
        assert!(rotator.is_empty());
    }
}
