//! Runtime configuration, read from environment variables.
//!
//! Every setting has a default, so an empty environment gives a working
//! (if Spotify-less) setup. The SheetBest API key and the Spotify credentials
//! are never baked in.

use std::path::PathBuf;
use std::time::Duration;

use crate::{core::SnapshotStore, error::FeedError, Result};

pub const STANDINGS_URL_ENV: &str = "BASKETLIGA_STANDINGS_URL";
pub const STANDINGS_API_KEY_ENV: &str = "BASKETLIGA_STANDINGS_API_KEY";
pub const POSTS_URL_ENV: &str = "BASKETLIGA_POSTS_URL";
pub const STANDINGS_TTL_ENV: &str = "BASKETLIGA_STANDINGS_TTL_SECS";
pub const POSTS_TTL_ENV: &str = "BASKETLIGA_POSTS_TTL_SECS";
pub const EPISODES_TTL_ENV: &str = "BASKETLIGA_EPISODES_TTL_SECS";
pub const HTTP_TIMEOUT_ENV: &str = "BASKETLIGA_HTTP_TIMEOUT_SECS";
pub const SPOTIFY_CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
pub const SPOTIFY_SHOW_ID_ENV: &str = "SPOTIFY_SHOW_ID";

pub const DEFAULT_STANDINGS_URL: &str = "https://script.google.com/macros/s/AKfycbxngaU0WBZEjrz7DC7P9Vb3Oi2PlUczOlRgPlBOtv-yU-SwytTCqSx1Ds3-BPrpCa3p/exec";
pub const DEFAULT_POSTS_URL: &str = "https://script.google.com/macros/s/AKfycbxe79AXKSCWmuiFG81hvIqOPRbb1Aa9QwoZJfh6AQdEVyiVrVl7bJf1S4hA6xlH-KAOOA/exec";
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SHOW_ID: &str = "3bkhQToL2N4YJ5I2jSopfZ";

pub const DEFAULT_STANDINGS_TTL: Duration = Duration::from_secs(3 * 60);
pub const DEFAULT_POSTS_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_EPISODES_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub show_id: String,
    pub auth_url: String,
    pub api_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            show_id: DEFAULT_SHOW_ID.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            api_base: SPOTIFY_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub standings_url: String,
    pub standings_api_key: Option<String>,
    pub posts_url: String,
    pub standings_ttl: Duration,
    pub posts_ttl: Duration,
    pub episodes_ttl: Duration,
    pub http_timeout: Duration,
    pub spotify: SpotifyConfig,
    /// Where snapshots of the last good payloads go; `None` keeps everything in memory.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            standings_url: DEFAULT_STANDINGS_URL.to_string(),
            standings_api_key: None,
            posts_url: DEFAULT_POSTS_URL.to_string(),
            standings_ttl: DEFAULT_STANDINGS_TTL,
            posts_ttl: DEFAULT_POSTS_TTL,
            episodes_ttl: DEFAULT_EPISODES_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            spotify: SpotifyConfig::default(),
            snapshot_dir: Some(SnapshotStore::default_dir()),
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            standings_url: get(STANDINGS_URL_ENV).unwrap_or(defaults.standings_url),
            standings_api_key: get(STANDINGS_API_KEY_ENV),
            posts_url: get(POSTS_URL_ENV).unwrap_or(defaults.posts_url),
            standings_ttl: parse_secs(STANDINGS_TTL_ENV, get(STANDINGS_TTL_ENV))?
                .unwrap_or(defaults.standings_ttl),
            posts_ttl: parse_secs(POSTS_TTL_ENV, get(POSTS_TTL_ENV))?
                .unwrap_or(defaults.posts_ttl),
            episodes_ttl: parse_secs(EPISODES_TTL_ENV, get(EPISODES_TTL_ENV))?
                .unwrap_or(defaults.episodes_ttl),
            http_timeout: parse_secs(HTTP_TIMEOUT_ENV, get(HTTP_TIMEOUT_ENV))?
                .unwrap_or(defaults.http_timeout),
            spotify: SpotifyConfig {
                client_id: get(SPOTIFY_CLIENT_ID_ENV),
                client_secret: get(SPOTIFY_CLIENT_SECRET_ENV),
                show_id: get(SPOTIFY_SHOW_ID_ENV).unwrap_or(defaults.spotify.show_id),
                ..defaults.spotify
            },
            snapshot_dir: defaults.snapshot_dir,
        })
    }

    /// Keep caches in memory only.
    pub fn without_snapshots(mut self) -> Self {
        self.snapshot_dir = None;
        self
    }

    pub fn snapshot_store(&self) -> Option<SnapshotStore> {
        self.snapshot_dir.as_ref().map(SnapshotStore::new)
    }
}

fn parse_secs(key: &str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| FeedError::InvalidConfig {
                    key: key.to_string(),
                    value: raw,
                })
        })
        .transpose()
}
