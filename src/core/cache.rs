//! In-memory TTL cache with stale-if-error semantics.
//!
//! Each feed owns one [`TtlCache`]. A lookup inside the TTL window is served
//! from memory; otherwise the caller-supplied fetch runs while the cache lock
//! is held, so concurrent callers in the same window share a single refresh.
//! When the refresh fails the last good value is served even if it expired,
//! and only when nothing was ever cached does the caller's recovery run.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Result;

#[cfg(test)]
mod tests;

/// What a feed handed back, and how degraded it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Fetched from the network on this call.
    Fresh(T),
    /// Served from memory inside the TTL window.
    Cached(T),
    /// A refresh failed; this is older data (expired memory entry or disk snapshot).
    Stale(T),
    /// A refresh failed and nothing was cached; built-in sample data.
    Fallback(T),
}

impl<T> Fetched<T> {
    pub fn into_inner(self) -> T {
        match self {
            Fetched::Fresh(data)
            | Fetched::Cached(data)
            | Fetched::Stale(data)
            | Fetched::Fallback(data) => data,
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Fetched::Fresh(data)
            | Fetched::Cached(data)
            | Fetched::Stale(data)
            | Fetched::Fallback(data) => data,
        }
    }

    /// True when the last refresh attempt failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Stale(_) | Fetched::Fallback(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Fetched::Fresh(_) => "fresh",
            Fetched::Cached(_) => "cached",
            Fetched::Stale(_) => "stale",
            Fetched::Fallback(_) => "fallback",
        }
    }

    /// Transform the payload, keeping the degradation level.
    pub fn map<U, F>(self, f: F) -> Fetched<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Fetched::Fresh(data) => Fetched::Fresh(f(data)),
            Fetched::Cached(data) => Fetched::Cached(f(data)),
            Fetched::Stale(data) => Fetched::Stale(f(data)),
            Fetched::Fallback(data) => Fetched::Fallback(f(data)),
        }
    }
}

/// A cached value with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    fetched_at: Instant,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            fetched_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Human readable age of a timestamp ("just now", "5m ago", "2h ago", "3d ago").
pub fn age_display(cached_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - cached_at).num_minutes();
    if minutes < 1 {
        // also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Single-entry cache valid for a fixed time-to-live.
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Mutex<Option<CachedData<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if it is younger than the TTL, otherwise run
    /// `fetch`. On fetch failure fall back to the expired value, then to
    /// `recover`. Recovered values are not cached, so the next call retries.
    pub async fn get_or_fetch<F, Fut, R>(&self, fetch: F, recover: R) -> Fetched<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
        R: FnOnce() -> Fetched<T>,
    {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.age() < self.ttl {
                debug!(age_secs = cached.age().as_secs(), "cache hit");
                return Fetched::Cached(cached.data.clone());
            }
        }

        match fetch().await {
            Ok(data) => {
                *entry = Some(CachedData::new(data.clone()));
                Fetched::Fresh(data)
            }
            Err(err) => match entry.as_ref() {
                Some(cached) => {
                    warn!(
                        error = %err,
                        age_secs = cached.age().as_secs(),
                        "refresh failed, serving expired data"
                    );
                    Fetched::Stale(cached.data.clone())
                }
                None => {
                    warn!(error = %err, "refresh failed with nothing cached");
                    recover()
                }
            },
        }
    }

    /// Drop the cached value; the next lookup fetches.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    /// Current entry, regardless of age.
    pub async fn peek(&self) -> Option<CachedData<T>> {
        self.entry.lock().await.clone()
    }
}
