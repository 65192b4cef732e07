//! CLI argument definitions and parsing.

use clap::{Parser, Subcommand};

/// Default number of posts listed by `get news`.
pub const DEFAULT_NEWS_LIMIT: usize = 10;

/// Default number of episodes listed by `get episodes`.
pub const DEFAULT_EPISODE_LIMIT: usize = 5;

#[derive(Debug, Subcommand)]
pub enum GetCmd {
    /// League standings, ordered by rank.
    Standings {
        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,

        /// Discard the saved snapshot first, so a failed fetch shows sample data.
        #[clap(long)]
        refresh: bool,
    },

    /// Latest news posts, newest first.
    News {
        /// Only posts tagged with this category (e.g. `nba`, `fantasy`).
        #[clap(long, short)]
        category: Option<String>,

        /// Maximum number of posts to show.
        #[clap(long, short, default_value_t = DEFAULT_NEWS_LIMIT)]
        limit: usize,

        /// Output results as JSON instead of text lines.
        #[clap(long)]
        json: bool,

        /// Discard the saved snapshot first, so a failed fetch shows sample data.
        #[clap(long)]
        refresh: bool,
    },

    /// A single post by slug, with related posts.
    Post {
        /// URL slug of the post.
        slug: String,

        /// Output results as JSON instead of text.
        #[clap(long)]
        json: bool,

        /// Discard the saved snapshot first, so a failed fetch shows sample data.
        #[clap(long)]
        refresh: bool,
    },

    /// Podcast episodes from Spotify.
    ///
    /// Needs `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`; without them the
    /// built-in sample episodes are shown.
    Episodes {
        /// Maximum number of episodes to show.
        #[clap(long, short, default_value_t = DEFAULT_EPISODE_LIMIT)]
        limit: usize,

        /// Output results as JSON instead of text lines.
        #[clap(long)]
        json: bool,

        /// Discard the saved snapshot first, so a failed fetch shows sample data.
        #[clap(long)]
        refresh: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(name = "basketliga", about = "BasketLiga fantasy league data CLI")]
pub struct BasketLiga {
    /// Do not read or write snapshots of the last good payloads on disk.
    #[clap(long, global = true)]
    pub no_disk_cache: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Get data from the BasketLiga feeds
    Get {
        #[clap(subcommand)]
        cmd: GetCmd,
    },
}
