//! Generic fetch-with-cache pipeline shared by every feed.
//!
//! A [`CachedFetcher`] knows one endpoint, how to turn its JSON into records,
//! and which built-in records to hand out when all else fails. Lookups go
//! through a [`TtlCache`], so the caller always gets something displayable:
//!
//! 1. a value younger than the TTL, without touching the network;
//! 2. a freshly fetched value;
//! 3. the last good value (in memory, or from the disk snapshot);
//! 4. the built-in fallback records.

use std::future::Future;
use std::time::Duration;

use reqwest::{header::HeaderMap, Client};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    core::{age_display, get_json, Fetched, SnapshotStore, TtlCache},
    error::FeedError,
    Result,
};

/// Turns a decoded JSON body into records, or rejects it.
pub type ParseFn<T> = fn(Value) -> Result<Vec<T>>;

/// Produces the built-in records for a feed.
pub type FallbackFn<T> = fn() -> Vec<T>;

/// Where a feed lives and which headers it always needs.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub headers: HeaderMap,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            headers,
        }
    }
}

pub struct CachedFetcher<T> {
    name: &'static str,
    client: Client,
    endpoint: Endpoint,
    parse: ParseFn<T>,
    fallback: FallbackFn<T>,
    cache: TtlCache<Vec<T>>,
    snapshots: Option<SnapshotStore>,
}

impl<T> CachedFetcher<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn new(
        name: &'static str,
        client: Client,
        endpoint: Endpoint,
        parse: ParseFn<T>,
        fallback: FallbackFn<T>,
        ttl: Duration,
    ) -> Self {
        Self {
            name,
            client,
            endpoint,
            parse,
            fallback,
            cache: TtlCache::new(ttl),
            snapshots: None,
        }
    }

    /// Persist every successful fetch and read it back when a fresh process
    /// cannot reach the endpoint.
    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.snapshots = Some(store);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub async fn load(&self) -> Fetched<Vec<T>> {
        self.load_with(|| async { Ok::<_, FeedError>(HeaderMap::new()) })
            .await
    }

    /// Like [`load`](Self::load), with extra headers computed only on a cache
    /// miss (e.g. a bearer token). A failing `prepare` counts as a failed fetch.
    pub async fn load_with<F, Fut>(&self, prepare: F) -> Fetched<Vec<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HeaderMap>>,
    {
        self.cache
            .get_or_fetch(
                move || async move {
                    let extra = prepare().await?;
                    self.fetch(extra).await
                },
                || self.recover(),
            )
            .await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// Forget everything saved for this feed, in memory and on disk, so a
    /// failed refresh can no longer serve older data.
    pub async fn reset(&self) {
        self.cache.invalidate().await;
        if let Some(store) = &self.snapshots {
            if let Err(err) = store.remove(self.name) {
                warn!(feed = self.name, error = %err, "could not remove snapshot");
            }
        }
    }

    async fn fetch(&self, extra: HeaderMap) -> Result<Vec<T>> {
        let mut headers = self.endpoint.headers.clone();
        headers.extend(extra);

        let payload = get_json(&self.client, &self.endpoint.url, headers).await?;
        let records = (self.parse)(payload)?;
        info!(feed = self.name, count = records.len(), "loaded fresh records");

        if let Some(store) = &self.snapshots {
            if let Err(err) = store.save(self.name, &records) {
                warn!(feed = self.name, error = %err, "could not write snapshot");
            }
        }

        Ok(records)
    }

    fn recover(&self) -> Fetched<Vec<T>> {
        if let Some(store) = &self.snapshots {
            match store.load::<Vec<T>>(self.name) {
                Ok(Some(snapshot)) => {
                    warn!(
                        feed = self.name,
                        saved = %age_display(snapshot.cached_at),
                        "serving disk snapshot"
                    );
                    return Fetched::Stale(snapshot.data);
                }
                Ok(None) => {}
                Err(err) => warn!(feed = self.name, error = %err, "unreadable snapshot"),
            }
        }

        warn!(feed = self.name, "serving built-in fallback records");
        Fetched::Fallback((self.fallback)())
    }
}
