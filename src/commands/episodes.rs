//! Podcast episodes command implementation

use crate::{
    feeds::{podcast::format_duration, types::Episode, LeagueFeeds},
    Result,
};

use super::{report_status, to_json};

pub fn format_episode(episode: &Episode) -> String {
    let explicit = if episode.explicit { " [E]" } else { "" };
    format!(
        "{}  {}{} ({})\n    {}",
        episode.release_date,
        episode.name,
        explicit,
        format_duration(episode.duration_ms),
        episode.url
    )
}

/// Handle `get episodes`
pub async fn handle_episodes(
    feeds: &LeagueFeeds,
    limit: usize,
    as_json: bool,
    refresh: bool,
) -> Result<()> {
    if refresh {
        feeds.podcast.reset().await;
    }

    // tarpaulin::skip - HTTP call, tested via integration tests
    let fetched = feeds.podcast.episodes(limit).await;
    report_status("episodes", &fetched);

    if as_json {
        println!("{}", to_json(fetched.data())?); // tarpaulin::skip
    } else {
        for episode in fetched.data() {
            println!("{}", format_episode(episode)); // tarpaulin::skip
        }
    }

    Ok(())
}
