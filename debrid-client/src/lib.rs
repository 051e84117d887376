pub mod cache;
pub mod clock;
mod availability;
mod error;
mod models;
pub mod options;
mod resolve;
mod select;
mod status;
mod token;
pub mod transport;
mod unrestrict;


use cache::{Cache, SharedCache};
use chrono::Duration;
use clock::{Clock, Sleeper, SystemClock, TokioSleeper};
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
pub use models::{TorrentFile, TorrentInfo};
pub use options::ClientOptions;
pub use select::select_file_id;
pub use status::TorrentStatus;
use std::sync::Arc;
use transport::{SurfTransport, Transport};

// Re-export cache types
pub use cache::{CacheConfig, CacheStats, MemoryCache};

/// Resolves magnet links into streamable URLs through a debrid service.
///
/// Cheap to clone, clones share the transport and both caches.
#[derive(Clone)]
pub struct DebridClient {
    options: ClientOptions,
    transport: Arc<dyn Transport>,
    /// For API token validity
    token_cache: SharedCache,
    /// For info_hash instant availability
    availability_cache: SharedCache,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl DebridClient {
    /// Create a new DebridClient talking HTTP to `options.base_url`
    pub fn new(
        options: ClientOptions,
        token_cache: SharedCache,
        availability_cache: SharedCache,
    ) -> Result<Self> {
        let transport = SurfTransport::new(&options)?;
        Self::with_transport(options, Arc::new(transport), token_cache, availability_cache)
    }

    /// Create a new DebridClient on top of any [`Transport`]
    pub fn with_transport(
        options: ClientOptions,
        transport: Arc<dyn Transport>,
        token_cache: SharedCache,
        availability_cache: SharedCache,
    ) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            options,
            transport,
            token_cache,
            availability_cache,
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.options.api_base(), path)
    }

    /// Whether `key` was confirmed no longer than `ttl` ago.
    /// Read errors count as a miss. `shown` is how the key appears in logs.
    fn is_fresh_in(
        &self,
        cache: &dyn Cache,
        key: &str,
        shown: &str,
        ttl: Duration,
        what: &str,
    ) -> bool {
        match cache.get(key) {
            Err(err) => {
                log::error!("Couldn't read {} cache item for {}: {}", what, shown, err);
                false
            }
            Ok(None) => {
                log::debug!("{} not found in cache: {}", what, shown);
                false
            }
            Ok(Some(created)) => {
                let age = self.clock.now() - created;
                if age > ttl {
                    log::debug!(
                        "{} cached as valid, but item is expired since {}s: {}",
                        what,
                        (age - ttl).num_seconds(),
                        shown
                    );
                    false
                } else {
                    log::debug!("{} cached as valid: {}", what, shown);
                    true
                }
            }
        }
    }

    /// Best-effort cache write, a failure is only logged.
    fn remember(&self, cache: &dyn Cache, key: &str, shown: &str, what: &str) {
        if let Err(err) = cache.set(key) {
            log::error!("Couldn't cache {} for {}: {}", what, shown, err);
        }
    }
}

/// Shortens secrets and identifiers for log output.
pub(crate) fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    if prefix.len() == value.len() {
        prefix
    } else {
        format!("{prefix}…")
    }
}
