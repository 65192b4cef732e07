//! Standings command implementation

use crate::{
    feeds::{standings::CLINCHED_MARKER, types::TeamStanding, LeagueFeeds},
    Result,
};

use super::{report_status, to_json};

/// Render the standings as a fixed-width table. Clinched teams get a `*`.
pub fn format_standings(teams: &[TeamStanding]) -> String {
    let name_width = teams
        .iter()
        .map(|t| t.name.chars().count() + 1)
        .max()
        .unwrap_or(0)
        .max("TEAM".len());

    let mut out = format!(
        "{:>3}  {:<name_width$}  {:>8}  {:>5}  {:>5}  {:>6}  {:>4}\n",
        "#", "TEAM", "W-L-T", "PCT", "GB", "WAIVER", "LAST"
    );
    for team in teams {
        let name = if team.clinched_playoff {
            format!("{}{}", team.name, CLINCHED_MARKER)
        } else {
            team.name.clone()
        };
        out.push_str(&format!(
            "{:>3}  {:<name_width$}  {:>8}  {:>5}  {:>5}  {:>6}  {:>4}\n",
            team.rank,
            name,
            team.record(),
            team.pct,
            team.gb,
            team.waiver,
            team.lastweek
        ));
    }
    out
}

/// Handle `get standings`
pub async fn handle_standings(feeds: &LeagueFeeds, as_json: bool, refresh: bool) -> Result<()> {
    if refresh {
        feeds.standings.reset().await;
    }

    // tarpaulin::skip - HTTP call, tested via integration tests
    let fetched = feeds.standings.standings().await;
    report_status("standings", &fetched);

    if as_json {
        println!("{}", to_json(fetched.data())?); // tarpaulin::skip
    } else {
        print!("{}", format_standings(fetched.data())); // tarpaulin::skip
        if fetched.data().iter().any(|t| t.clinched_playoff) {
            println!("{} clinched playoff spot", CLINCHED_MARKER); // tarpaulin::skip
        }
    }

    Ok(())
}
