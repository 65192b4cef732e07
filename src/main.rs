//! Entry point: parse CLI and dispatch to command handlers.

use std::io;

use basketliga::{
    cli::{BasketLiga, Commands, GetCmd},
    commands::{
        episodes::handle_episodes,
        news::{handle_news, handle_post},
        standings::handle_standings,
    },
    Config, LeagueFeeds, Result,
};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let app = BasketLiga::parse();

    let mut config = Config::from_env()?;
    if app.no_disk_cache {
        config = config.without_snapshots();
    }
    let feeds = LeagueFeeds::new(&config)?;

    match app.command {
        Commands::Get { cmd } => match cmd {
            GetCmd::Standings { json, refresh } => handle_standings(&feeds, json, refresh).await?,

            GetCmd::News {
                category,
                limit,
                json,
                refresh,
            } => handle_news(&feeds, category.as_deref(), limit, json, refresh).await?,

            GetCmd::Post {
                slug,
                json,
                refresh,
            } => handle_post(&feeds, &slug, json, refresh).await?,

            GetCmd::Episodes {
                limit,
                json,
                refresh,
            } => handle_episodes(&feeds, limit, json, refresh).await?,
        },
    }

    Ok(())
}
