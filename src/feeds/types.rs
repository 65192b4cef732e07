//! Wire and domain types for the league feeds.
//!
//! `Raw*` types mirror what the spreadsheet endpoints and Spotify send. Cells
//! typed into a spreadsheet come through as either strings or numbers, so every
//! raw field is read leniently and missing fields default to `None`.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{error::FeedError, Result};


/// Accept a string, number or bool cell as an optional string; anything else is `None`.
fn de_lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// One standings row as exported from the league spreadsheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub team: Option<String>,
    /// "wins-losses-ties", e.g. "5-3-0"
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub wlt: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub pct: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub gb: Option<String>,
    /// Numeric rank, with a trailing `*` once the team clinched a playoff spot
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub waiver: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub lastweek: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub logo: Option<String>,
}

/// A cleaned-up standings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    /// Display position, 1-based, reassigned after sorting by rank
    pub id: u32,
    pub rank: u32,
    pub name: String,
    pub logo: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub pct: String,
    pub gb: String,
    pub clinched_playoff: bool,
    pub waiver: String,
    pub lastweek: String,
}

impl TeamStanding {
    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// One blog row. Field names follow the Serbian column headers of the sheet;
/// English names are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: Option<String>,
    #[serde(default, alias = "title", deserialize_with = "de_lenient_string")]
    pub naslov: Option<String>,
    #[serde(default, alias = "date", deserialize_with = "de_lenient_string")]
    pub datum: Option<String>,
    #[serde(default, alias = "body", deserialize_with = "de_lenient_string")]
    pub tekst: Option<String>,
    #[serde(default, alias = "image", deserialize_with = "de_lenient_string")]
    pub slika: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub slug: Option<String>,
    #[serde(default, alias = "author", deserialize_with = "de_lenient_string")]
    pub autor: Option<String>,
    /// Either "nba, fantasy" or `["nba", "fantasy"]`
    #[serde(default)]
    pub category: Option<Value>,
}

/// A news post with its categories normalized to lowercase tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub image: String,
    pub author: String,
    /// Publish date as delivered (RFC 3339 or `YYYY-MM-DD`)
    pub date: String,
    pub categories: Vec<String>,
}

/// Body of the Google Apps Script endpoints: `{ success, data, error? }`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: Option<bool>,
    pub data: Option<Vec<Value>>,
    pub error: Option<Value>,
}

/// Spreadsheet endpoints answer with either a bare array or an envelope.
/// Rows stay untyped here so one malformed row cannot reject the sheet.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    List(Vec<Value>),
    Envelope(Envelope),
}

impl Payload {
    /// Unwrap the rows, turning error envelopes into errors. `error` is only
    /// read when the envelope does not report success.
    pub fn into_rows(self) -> Result<Vec<Value>> {
        match self {
            Payload::List(rows) => Ok(rows),
            Payload::Envelope(envelope) => {
                if envelope.success != Some(true) {
                    if let Some(message) = envelope.error.as_ref().and_then(error_message) {
                        return Err(FeedError::upstream(message));
                    }
                    if envelope.success == Some(false) {
                        return Err(FeedError::upstream("request was not successful"));
                    }
                }
                envelope
                    .data
                    .ok_or_else(|| FeedError::schema("expected an array or a data envelope"))
            }
        }
    }
}

/// Extract a readable message from an `error` field (string or `{ message }`
/// object). Blank strings carry no error.
pub(crate) fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => Some(
            map.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        ),
        other => Some(other.to_string()),
    }
}

/// Decode a spreadsheet payload into raw records. Rows that are not records
/// (`null`, numbers, stray strings) are skipped.
pub fn decode_payload<T>(payload: Value) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let parsed: Payload = serde_json::from_value(payload)
        .map_err(|e| FeedError::schema(format!("unrecognized payload: {}", e)))?;

    Ok(parsed
        .into_rows()?
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(index, error = %err, "skipping malformed row");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Episode object from `GET /shows/{id}/episodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub explicit: bool,
}

/// Paging object wrapping the episodes. Spotify may return `null` items.
#[derive(Debug, Deserialize)]
pub struct EpisodePage {
    pub items: Vec<Option<RawEpisode>>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub release_date: String,
    pub duration_ms: u64,
    pub url: String,
    pub image: Option<String>,
    pub explicit: bool,
}

impl From<RawEpisode> for Episode {
    fn from(raw: RawEpisode) -> Self {
        let url = raw
            .external_urls
            .spotify
            .unwrap_or_else(|| format!("https://open.spotify.com/episode/{}", raw.id));
        Self {
            image: raw.images.into_iter().next().map(|img| img.url),
            id: raw.id,
            name: raw.name,
            description: raw.description,
            release_date: raw.release_date,
            duration_ms: raw.duration_ms,
            url,
            explicit: raw.explicit,
        }
    }
}

/// Client-credentials token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
}
