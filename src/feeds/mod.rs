//! The league's remote datasets.
//!
//! Each feed wraps one [`fetcher::CachedFetcher`] with its own parser and
//! fallback data. [`LeagueFeeds`] builds all of them from a [`Config`] and owns
//! their caches.

pub mod fetcher;
pub mod podcast;
pub mod posts;
pub mod standings;
pub mod types;

pub use podcast::PodcastFeed;
pub use posts::PostsFeed;
pub use standings::StandingsFeed;

use crate::{config::Config, core::build_client, Result};

pub struct LeagueFeeds {
    pub standings: StandingsFeed,
    pub posts: PostsFeed,
    pub podcast: PodcastFeed,
}

impl LeagueFeeds {
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_client(config.http_timeout)?;

        let mut standings = StandingsFeed::new(
            client.clone(),
            &config.standings_url,
            config.standings_api_key.as_deref(),
            config.standings_ttl,
        )?;
        let mut posts = PostsFeed::new(client.clone(), &config.posts_url, config.posts_ttl)?;
        let mut podcast = PodcastFeed::new(client, &config.spotify, config.episodes_ttl)?;

        if let Some(store) = config.snapshot_store() {
            standings = standings.with_snapshots(store.clone());
            posts = posts.with_snapshots(store.clone());
            podcast = podcast.with_snapshots(store);
        }

        Ok(Self {
            standings,
            posts,
            podcast,
        })
    }

    /// Drop every in-memory entry so the next reads go to the network.
    pub async fn invalidate_all(&self) {
        self.standings.invalidate().await;
        self.posts.invalidate().await;
        self.podcast.clear().await;
    }
}
