//! On-disk snapshots of the last successful fetch per feed.
//!
//! Snapshots let a fresh process serve real (if old) data when the upstream
//! is down, before resorting to the built-in sample data.
//! Layout: `{cache_dir}/basketliga/{feed}.json`.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;


const APP_DIR: &str = "basketliga";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub cached_at: DateTime<Utc>,
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.cache/basketliga`, or `./.cache/basketliga` without a home directory.
    pub fn default_dir() -> PathBuf {
        let base = dirs::cache_dir().unwrap_or_else(|| {
            let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.push(".cache");
            home
        });
        base.join(APP_DIR)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, feed: &str) -> PathBuf {
        self.dir.join(format!("{}.json", feed))
    }

    pub fn save<T: Serialize>(&self, feed: &str, data: &T) -> Result<()> {
        let snapshot = Snapshot {
            cached_at: Utc::now(),
            data,
        };
        let path = self.path_for(feed);
        let contents = serde_json::to_string_pretty(&snapshot)?;
        write_string(&path, &contents)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        debug!(feed, path = %path.display(), "snapshot written");
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, feed: &str) -> Result<Option<Snapshot<T>>> {
        let path = self.path_for(feed);
        let Some(contents) = try_read_to_string(&path) else {
            return Ok(None);
        };
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(Some(snapshot))
    }

    pub fn remove(&self, feed: &str) -> Result<()> {
        let path = self.path_for(feed);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove snapshot: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Try to read a file into a String
fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file, creating parent directories
fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}
