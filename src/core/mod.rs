//! Core utilities shared by every feed
//!
//! - `cache`: in-memory TTL cache and the `Fetched` result type
//! - `http`: client construction, header builders and the JSON GET helper
//! - `snapshot`: on-disk copies of the last successful fetch

pub mod cache;
pub mod http;
pub mod snapshot;

// Re-export commonly used items for convenience
pub use cache::{age_display, CachedData, Fetched, TtlCache};
pub use http::{bearer_headers, build_client, get_json, json_headers};
pub use snapshot::{Snapshot, SnapshotStore};
