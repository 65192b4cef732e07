//! League standings feed.
//!
//! Rows come from the league spreadsheet (SheetBest or a Google Apps Script
//! web app). The sheet is padded with template rows ("Team 7", "0-0-0") that
//! are dropped before ranking.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{
    core::{json_headers, Fetched, SnapshotStore},
    error::FeedError,
    feeds::{
        fetcher::{CachedFetcher, Endpoint},
        types::{decode_payload, RawTeam, TeamStanding},
    },
    Result,
};


pub const FEED_NAME: &str = "standings";

/// Marker appended to the rank once a team clinched a playoff spot.
pub const CLINCHED_MARKER: char = '*';

pub const DEFAULT_LOGO: &str = "https://s.yimg.com/cv/apiv2/default/nba/nba_4_p.png";

/// Parse "wins-losses-ties"; any unparseable or missing segment is 0.
pub fn parse_wlt(wlt: &str) -> (u32, u32, u32) {
    let mut parts = wlt.split('-').map(|p| p.trim().parse::<u32>().unwrap_or(0));
    let wins = parts.next().unwrap_or(0);
    let losses = parts.next().unwrap_or(0);
    let ties = parts.next().unwrap_or(0);
    (wins, losses, ties)
}

/// Split a rank cell like "2*" into the numeric rank and the clinched flag.
/// A rank of 0 is returned as-is; [`transform_standings`] replaces it.
pub fn parse_rank(rank: &str) -> (Option<u32>, bool) {
    let clinched = rank.contains(CLINCHED_MARKER);
    let numeric = rank.replace(CLINCHED_MARKER, "").trim().parse::<u32>().ok();
    (numeric, clinched)
}

/// True for the sheet's placeholder names: "Team 1", "Team 12", ...
pub fn is_placeholder_name(name: &str) -> bool {
    name.strip_prefix("Team ")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn is_listed(team: &RawTeam) -> bool {
    let name = team.team.as_deref().map(str::trim).unwrap_or_default();
    let wlt = team.wlt.as_deref().map(str::trim).unwrap_or_default();
    !name.is_empty() && !wlt.is_empty() && wlt != "0-0-0" && !is_placeholder_name(name)
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Filter placeholder rows, parse records and ranks, sort by rank and number
/// the result from 1.
pub fn transform_standings(raw: Vec<RawTeam>) -> Vec<TeamStanding> {
    let mut teams: Vec<TeamStanding> = raw
        .into_iter()
        .filter(is_listed)
        .enumerate()
        .map(|(index, team)| {
            let position = index as u32 + 1;
            let (wins, losses, ties) = parse_wlt(team.wlt.as_deref().unwrap_or_default());
            let (rank, clinched_playoff) = parse_rank(team.rank.as_deref().unwrap_or_default());

            TeamStanding {
                id: position,
                // rank 0 counts as unranked
                rank: rank.filter(|r| *r > 0).unwrap_or(position),
                name: team.team.unwrap_or_default().trim().to_string(),
                logo: non_empty_or(team.logo, DEFAULT_LOGO),
                wins,
                losses,
                ties,
                pct: non_empty_or(team.pct, ".000"),
                gb: non_empty_or(team.gb, "-"),
                clinched_playoff,
                waiver: non_empty_or(team.waiver, "0"),
                lastweek: non_empty_or(team.lastweek, "-"),
            }
        })
        .collect();

    // stable: equal ranks keep sheet order
    teams.sort_by_key(|t| t.rank);
    for (i, team) in teams.iter_mut().enumerate() {
        team.id = i as u32 + 1;
    }
    teams
}

/// Decode and transform a standings payload. An empty sheet counts as a failure.
pub fn parse_standings(payload: Value) -> Result<Vec<TeamStanding>> {
    let raw: Vec<RawTeam> = decode_payload(payload)?;
    if raw.is_empty() {
        return Err(FeedError::EmptyPayload);
    }
    Ok(transform_standings(raw))
}

fn sample_team(
    id: u32,
    name: &str,
    (wins, losses): (u32, u32),
    pct: &str,
    gb: &str,
    clinched_playoff: bool,
    (waiver, lastweek): (&str, &str),
) -> TeamStanding {
    TeamStanding {
        id,
        rank: id,
        name: name.to_string(),
        logo: DEFAULT_LOGO.to_string(),
        wins,
        losses,
        ties: 0,
        pct: pct.to_string(),
        gb: gb.to_string(),
        clinched_playoff,
        waiver: waiver.to_string(),
        lastweek: lastweek.to_string(),
    }
}

/// Built-in standings shown when the sheet is unreachable and nothing is cached.
pub fn fallback_standings() -> Vec<TeamStanding> {
    vec![
        sample_team(1, "Thunder Giants", (8, 2), ".800", "-", true, ("18", "-")),
        sample_team(2, "Phoenix Flyers", (7, 3), ".700", "1.0", true, ("15", "+1")),
        sample_team(3, "Royal Wolves", (6, 4), ".600", "2.0", false, ("12", "-1")),
    ]
}

/// Standings backed by a [`CachedFetcher`].
pub struct StandingsFeed {
    fetcher: CachedFetcher<TeamStanding>,
}

impl StandingsFeed {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: Option<&str>,
        ttl: Duration,
    ) -> Result<Self> {
        let endpoint = Endpoint::new(url, json_headers(api_key)?);
        Ok(Self {
            fetcher: CachedFetcher::new(
                FEED_NAME,
                client,
                endpoint,
                parse_standings,
                fallback_standings,
                ttl,
            ),
        })
    }

    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.fetcher = self.fetcher.with_snapshots(store);
        self
    }

    pub async fn standings(&self) -> Fetched<Vec<TeamStanding>> {
        self.fetcher.load().await
    }

    /// Teams that clinched a playoff spot, in rank order.
    pub async fn clinched(&self) -> Fetched<Vec<TeamStanding>> {
        self.standings()
            .await
            .map(|teams| teams.into_iter().filter(|t| t.clinched_playoff).collect())
    }

    pub async fn invalidate(&self) {
        self.fetcher.invalidate().await;
    }

    /// Drop the in-memory entry and the disk snapshot.
    pub async fn reset(&self) {
        self.fetcher.reset().await;
    }
}
