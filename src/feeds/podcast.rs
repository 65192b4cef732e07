//! Podcast episodes from the Spotify Web API.
//!
//! Uses the client-credentials flow: an app token is requested from the
//! accounts service and kept until shortly before it expires. The token is
//! only needed on a cache miss, so a warm episode cache never touches the
//! accounts service.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    config::{SpotifyConfig, SPOTIFY_CLIENT_ID_ENV, SPOTIFY_CLIENT_SECRET_ENV},
    core::{bearer_headers, json_headers, Fetched, SnapshotStore},
    error::FeedError,
    feeds::{
        fetcher::{CachedFetcher, Endpoint},
        types::{error_message, Episode, EpisodePage, TokenResponse},
    },
    Result,
};

pub const FEED_NAME: &str = "episodes";

/// Episodes requested per call; `episodes(limit)` slices this list.
pub const PAGE_SIZE: usize = 50;

pub const MARKET: &str = "RS";

/// Tokens are dropped this long before Spotify says they expire.
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Render a duration as "1h 10min" or "55min".
pub fn format_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}min", hours, minutes % 60)
    } else {
        format!("{}min", minutes)
    }
}

pub fn episodes_url(api_base: &str, show_id: &str) -> String {
    format!(
        "{}/shows/{}/episodes?market={}&limit={}",
        api_base.trim_end_matches('/'),
        show_id,
        MARKET,
        PAGE_SIZE
    )
}

/// Decode a `GET /shows/{id}/episodes` body, skipping `null` items.
pub fn parse_episodes(payload: Value) -> Result<Vec<Episode>> {
    if let Some(message) = payload.get("error").and_then(error_message) {
        return Err(FeedError::upstream(message));
    }
    let page: EpisodePage = serde_json::from_value(payload)
        .map_err(|e| FeedError::schema(format!("unrecognized episode page: {}", e)))?;
    Ok(page.items.into_iter().flatten().map(Episode::from).collect())
}

fn sample_episode(
    number: u32,
    released: &str,
    duration_ms: u64,
    description: &str,
    image: &str,
) -> Episode {
    let id = format!("mock-{}", number);
    Episode {
        url: format!("https://open.spotify.com/episode/{}", id),
        id,
        name: format!("Trojka iz Ćoška - Epizoda {}", number),
        description: description.to_string(),
        release_date: released.to_string(),
        duration_ms,
        image: Some(image.to_string()),
        explicit: false,
    }
}

/// Built-in episodes shown when Spotify is unreachable or not configured.
pub fn fallback_episodes() -> Vec<Episode> {
    vec![
        sample_episode(
            1,
            "2025-01-15",
            3_600_000,
            "Dobrodošli u prvi podcast o košarci iz našeg kraja! Razgovaramo o najnovijim dešavanjima u NBA ligi i delimo prognoze za predstojeću sezonu.",
            "https://images.unsplash.com/photo-1478737270239-2f02b77fc618?auto=format&fit=crop&w=800&q=80",
        ),
        sample_episode(
            2,
            "2025-01-08",
            4_200_000,
            "U drugoj epizodi se fokusiramo na evropsku košarku: EuroLiga, naši reprezentativci i utisci sa poslednjeg Mundobasketa.",
            "https://images.unsplash.com/photo-1546519638-68e109498ffc?auto=format&fit=crop&w=800&q=80",
        ),
        sample_episode(
            3,
            "2025-01-01",
            3_300_000,
            "Specijalna epizoda posvećena fantasy košarci! Saveti, strategije i najbolji pickovi za vašu fantasy ekipu.",
            "https://images.unsplash.com/photo-1559526324-4b87b5e36e44?auto=format&fit=crop&w=800&q=80",
        ),
    ]
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn from_response(response: TokenResponse) -> Self {
        let lifetime =
            Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Self {
            value: response.access_token,
            expires_at: Instant::now() + lifetime,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

pub struct PodcastFeed {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_url: String,
    token: Mutex<Option<AccessToken>>,
    fetcher: CachedFetcher<Episode>,
}

impl PodcastFeed {
    pub fn new(client: Client, spotify: &SpotifyConfig, ttl: Duration) -> Result<Self> {
        let endpoint = Endpoint::new(
            episodes_url(&spotify.api_base, &spotify.show_id),
            json_headers(None)?,
        );
        Ok(Self {
            fetcher: CachedFetcher::new(
                FEED_NAME,
                client.clone(),
                endpoint,
                parse_episodes,
                fallback_episodes,
                ttl,
            ),
            client,
            client_id: spotify.client_id.clone().filter(|v| !v.is_empty()),
            client_secret: spotify.client_secret.clone().filter(|v| !v.is_empty()),
            auth_url: spotify.auth_url.clone(),
            token: Mutex::new(None),
        })
    }

    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.fetcher = self.fetcher.with_snapshots(store);
        self
    }

    /// The newest `limit` episodes.
    pub async fn episodes(&self, limit: usize) -> Fetched<Vec<Episode>> {
        self.fetcher
            .load_with(|| async {
                let token = self.access_token().await?;
                bearer_headers(&token)
            })
            .await
            .map(|mut episodes| {
                episodes.truncate(limit);
                episodes
            })
    }

    /// Forget the cached episodes and the access token.
    pub async fn clear(&self) {
        self.fetcher.invalidate().await;
        *self.token.lock().await = None;
    }

    /// Like [`clear`](Self::clear), and also drop the disk snapshot.
    pub async fn reset(&self) {
        self.fetcher.reset().await;
        *self.token.lock().await = None;
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| FeedError::MissingCredentials {
                env_var: SPOTIFY_CLIENT_ID_ENV.to_string(),
            })?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| FeedError::MissingCredentials {
                env_var: SPOTIFY_CLIENT_SECRET_ENV.to_string(),
            })?;

        debug!(url = %self.auth_url, "requesting Spotify access token");
        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: self.auth_url.clone(),
            });
        }

        let token = AccessToken::from_response(response.json::<TokenResponse>().await?);
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
