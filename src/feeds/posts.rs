//! News posts feed.
//!
//! Posts are rows of the blog spreadsheet, served by a Google Apps Script web
//! app as `{ success, data }`. Besides the list itself the feed answers the
//! lookups the site needs: by slug, by category, newest first and "related".

use std::cmp::Reverse;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;

use crate::{
    core::{json_headers, Fetched, SnapshotStore},
    feeds::{
        fetcher::{CachedFetcher, Endpoint},
        types::{decode_payload, Post, RawPost},
    },
    Result,
};


pub const FEED_NAME: &str = "posts";

/// How many related posts the detail page shows.
pub const RELATED_POSTS: usize = 3;

/// Split a comma separated category cell into lowercase tags, dropping empty
/// segments. Order and duplicates are kept.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Normalize whatever the sheet put in the category column into tags.
fn categories_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_categories(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_categories)
            .collect(),
        _ => Vec::new(),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Drop rows without a title or body and normalize the rest.
pub fn transform_posts(raw: Vec<RawPost>) -> Vec<Post> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, post)| {
            let categories = categories_from(post.category.as_ref());
            let title = present(post.naslov)?;
            let body = present(post.tekst)?;
            Some(Post {
                id: present(post.id).unwrap_or_else(|| (index + 1).to_string()),
                slug: post.slug.unwrap_or_default().trim().to_string(),
                title: title.trim().to_string(),
                body,
                image: post.slika.unwrap_or_default(),
                author: post.autor.unwrap_or_default(),
                date: post.datum.unwrap_or_default(),
                categories,
            })
        })
        .collect()
}

pub fn parse_posts(payload: Value) -> Result<Vec<Post>> {
    let raw: Vec<RawPost> = decode_payload(payload)?;
    Ok(transform_posts(raw))
}

/// Parse a publish date: RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn published_at(post: &Post) -> Option<DateTime<Utc>> {
    let date = post.date.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(date) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn find_by_slug<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|p| p.slug == slug)
}

pub fn filter_by_category(posts: &[Post], category: &str) -> Vec<Post> {
    let wanted = category.trim().to_lowercase();
    posts
        .iter()
        .filter(|p| p.categories.iter().any(|c| *c == wanted))
        .cloned()
        .collect()
}

/// Newest first; posts without a readable date go last in feed order.
pub fn latest(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sorted.sort_by_key(|p| Reverse(published_at(p)));
    sorted.truncate(limit);
    sorted
}

/// Posts sharing a category with `slug`, topped up with other posts in feed
/// order until `limit` is reached. The post itself is never included.
pub fn related(posts: &[Post], slug: &str, limit: usize) -> Vec<Post> {
    let Some(current) = find_by_slug(posts, slug) else {
        return Vec::new();
    };

    let mut picked: Vec<Post> = posts
        .iter()
        .filter(|p| p.slug != slug)
        .filter(|p| p.categories.iter().any(|c| current.categories.contains(c)))
        .take(limit)
        .cloned()
        .collect();

    if picked.len() < limit {
        let missing = limit - picked.len();
        let extra: Vec<Post> = posts
            .iter()
            .filter(|p| p.slug != slug && !picked.iter().any(|r| r.slug == p.slug))
            .take(missing)
            .cloned()
            .collect();
        picked.extend(extra);
    }

    picked
}

/// Built-in posts shown when the blog sheet is unreachable and nothing is cached.
pub fn fallback_posts() -> Vec<Post> {
    vec![
        Post {
            id: "1".to_string(),
            slug: "utakmica-pod-reflektorima".to_string(),
            title: "BasketLiga počinje!".to_string(),
            body: "Nakon pauze od nekoliko meseci, BasketLiga se vraća u velikom stilu!"
                .to_string(),
            image: "https://www.rockstaracademy.com/lib/images/news/basketball.jpeg".to_string(),
            author: "Bogdan Terzic".to_string(),
            date: "2025-06-19T22:00:00.000Z".to_string(),
            categories: vec!["fantasy".to_string()],
        },
        Post {
            id: "2".to_string(),
            slug: "mvp-igrac-sezone".to_string(),
            title: "Noćna utakmica".to_string(),
            body: "Spektakl pod reflektorima! BasketLiga organizuje noćnu utakmicu na otvorenom u centru grada."
                .to_string(),
            image: "https://i.postimg.cc/qRZ7rBJ4/nocnibasket.jpg".to_string(),
            author: "BasketLiga UO".to_string(),
            date: "2025-06-04T22:00:00.000Z".to_string(),
            categories: vec!["ncaa".to_string()],
        },
    ]
}

/// News posts backed by a [`CachedFetcher`].
pub struct PostsFeed {
    fetcher: CachedFetcher<Post>,
}

impl PostsFeed {
    pub fn new(client: Client, url: impl Into<String>, ttl: Duration) -> Result<Self> {
        let endpoint = Endpoint::new(url, json_headers(None)?);
        Ok(Self {
            fetcher: CachedFetcher::new(
                FEED_NAME,
                client,
                endpoint,
                parse_posts,
                fallback_posts,
                ttl,
            ),
        })
    }

    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.fetcher = self.fetcher.with_snapshots(store);
        self
    }

    pub async fn posts(&self) -> Fetched<Vec<Post>> {
        self.fetcher.load().await
    }

    pub async fn by_slug(&self, slug: &str) -> Fetched<Option<Post>> {
        self.posts()
            .await
            .map(|posts| find_by_slug(&posts, slug).cloned())
    }

    pub async fn by_category(&self, category: &str) -> Fetched<Vec<Post>> {
        self.posts()
            .await
            .map(|posts| filter_by_category(&posts, category))
    }

    pub async fn latest(&self, limit: usize) -> Fetched<Vec<Post>> {
        self.posts().await.map(|posts| latest(&posts, limit))
    }

    pub async fn related(&self, slug: &str, limit: usize) -> Fetched<Vec<Post>> {
        self.posts().await.map(|posts| related(&posts, slug, limit))
    }

    pub async fn invalidate(&self) {
        self.fetcher.invalidate().await;
    }

    /// Drop the in-memory entry and the disk snapshot.
    pub async fn reset(&self) {
        self.fetcher.reset().await;
    }
}
