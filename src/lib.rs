//! BasketLiga data layer
//!
//! Read-only access to the datasets behind the BasketLiga fantasy league site:
//! league standings and news posts from the league spreadsheets, and podcast
//! episodes from Spotify.
//!
//! ## Features
//!
//! - **TTL caching**: each feed is memoized in memory for a configurable window
//! - **Stale-if-error**: a failed refresh serves the last good data
//! - **Disk snapshots**: the last good payload survives restarts
//! - **Fallback data**: built-in samples when nothing else is available
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use basketliga::{Config, LeagueFeeds};
//!
//! # async fn example() -> basketliga::Result<()> {
//! let feeds = LeagueFeeds::new(&Config::from_env()?)?;
//!
//! let standings = feeds.standings.standings().await;
//! if standings.is_degraded() {
//!     eprintln!("showing {} data", standings.label());
//! }
//! for team in standings.data() {
//!     println!("{} {} {}", team.rank, team.name, team.record());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export BASKETLIGA_STANDINGS_API_KEY=...
//! export SPOTIFY_CLIENT_ID=...
//! export SPOTIFY_CLIENT_SECRET=...
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod feeds;

// Re-export commonly used types
pub use config::{Config, SpotifyConfig};
pub use crate::core::Fetched;
pub use error::{FeedError, Result};
pub use feeds::types::{Episode, Post, TeamStanding};
pub use feeds::LeagueFeeds;
