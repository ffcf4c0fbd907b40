use std::fmt;
use std::time::{Duration, Instant};

use crate::io::store::StoreError;
use crate::model::CacheConfig;

/// Freshness window for cached reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Data older than this is refetched on the next refresh
    pub stale_time: Duration,
    /// Data unused for this long is dropped
    pub gc_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            stale_time: Duration::from_secs(1),
            gc_time: Duration::from_secs(5 * 60),
        }
    }
}

impl From<&CacheConfig> for QueryOptions {
    fn from(c: &CacheConfig) -> Self {
        QueryOptions {
            stale_time: Duration::from_millis(c.stale_ms),
            gc_time: Duration::from_secs(c.gc_secs),
        }
    }
}

/// Stable identity of a cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The signed-in member's profile, keyed by user id
    Profile(String),
    Teams,
    /// Active roster for the board
    Members,
    /// Every profile, for the people view
    Profiles,
    Tasks,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Profile(id) => write!(f, "profile:{}", id),
            QueryKey::Teams => f.write_str("teams"),
            QueryKey::Members => f.write_str("members"),
            QueryKey::Profiles => f.write_str("profiles"),
            QueryKey::Tasks => f.write_str("tasks"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched, or garbage-collected
    Idle,
    Success,
    /// Last fetch failed; any previous data is still served
    Error,
}

/// One cached read path.
///
/// The value is only ever replaced wholesale by a successful fetch. A failed
/// fetch records the error and keeps the last good value. After a failure
/// the next attempt waits one `stale_time` unless the query is invalidated.
#[derive(Debug)]
pub struct Query<T> {
    key: QueryKey,
    options: QueryOptions,
    data: Option<T>,
    updated_at: Option<Instant>,
    attempted_at: Option<Instant>,
    last_access: Option<Instant>,
    invalidated: bool,
    error: Option<String>,
    fetches: usize,
}

impl<T> Query<T> {
    pub fn new(key: QueryKey, options: QueryOptions) -> Self {
        Query {
            key,
            options,
            data: None,
            updated_at: None,
            attempted_at: None,
            last_access: None,
            invalidated: false,
            error: None,
            fetches: 0,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// How many fetches this query has issued
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    pub fn status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    /// Mark the cached value out of date; the next refresh refetches
    pub fn invalidate(&mut self) {
        tracing::debug!(key = %self.key, "invalidate");
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Whether a refresh at `now` would fetch
    pub fn needs_fetch(&self, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        if self.error.is_some() {
            return self
                .attempted_at
                .is_none_or(|at| now.duration_since(at) >= self.options.stale_time);
        }
        match self.updated_at {
            None => true,
            Some(at) => now.duration_since(at) >= self.options.stale_time,
        }
    }

    /// Serve the cached value, fetching first when it is missing, stale or
    /// invalidated. Returns whatever value is servable afterwards.
    pub fn refresh(
        &mut self,
        now: Instant,
        fetch: impl FnOnce() -> Result<T, StoreError>,
    ) -> Option<&T> {
        self.last_access = Some(now);
        if self.needs_fetch(now) {
            self.fetches += 1;
            self.attempted_at = Some(now);
            self.invalidated = false;
            match fetch() {
                Ok(value) => {
                    self.data = Some(value);
                    self.updated_at = Some(now);
                    self.error = None;
                }
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "fetch failed, serving last known value");
                    self.error = Some(e.to_string());
                }
            }
        }
        self.data.as_ref()
    }

    /// Drop the value if it has not been used within `gc_time`.
    /// Returns true when something was evicted.
    pub fn collect_garbage(&mut self, now: Instant) -> bool {
        let expired = self
            .last_access
            .is_some_and(|at| now.duration_since(at) >= self.options.gc_time);
        if expired && self.data.is_some() {
            tracing::debug!(key = %self.key, "evict");
            self.data = None;
            self.updated_at = None;
            self.error = None;
            return true;
        }
        false
    }
}
