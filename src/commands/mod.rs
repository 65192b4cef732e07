//! Command implementations for the BasketLiga CLI

pub mod episodes;
pub mod news;
pub mod standings;

use serde::Serialize;

use crate::{core::Fetched, Result};

/// One line explaining where degraded data came from, or `None` for live data.
pub fn degraded_notice<T>(feed: &str, fetched: &Fetched<T>) -> Option<String> {
    match fetched {
        Fetched::Fresh(_) | Fetched::Cached(_) => None,
        Fetched::Stale(_) => Some(format!(
            "⚠ Could not refresh {}; showing the last saved copy.",
            feed
        )),
        Fetched::Fallback(_) => Some(format!(
            "⚠ Could not load {}; showing built-in sample data.",
            feed
        )),
    }
}

/// Print the degraded notice (if any) to stderr so JSON output stays clean.
pub fn report_status<T>(feed: &str, fetched: &Fetched<T>) {
    if let Some(notice) = degraded_notice(feed, fetched) {
        eprintln!("{}", notice); // tarpaulin::skip
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
