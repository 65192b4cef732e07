//! News and single-post commands

use serde::Serialize;

use crate::{
    error::FeedError,
    feeds::{
        posts::{filter_by_category, find_by_slug, latest, published_at, related, RELATED_POSTS},
        types::Post,
        LeagueFeeds,
    },
    Result,
};

use super::{report_status, to_json};

/// Publish date for display; unparseable dates are shown as delivered.
pub fn display_date(post: &Post) -> String {
    published_at(post)
        .map(|ts| ts.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| post.date.clone())
}

pub fn format_post_line(post: &Post) -> String {
    let mut line = format!("{:<10}  {}", display_date(post), post.title);
    if !post.categories.is_empty() {
        line.push_str(&format!(" [{}]", post.categories.join(", ")));
    }
    if !post.slug.is_empty() {
        line.push_str(&format!("  ({})", post.slug));
    }
    line
}

pub fn format_post_detail(post: &Post, related: &[Post]) -> String {
    let mut out = format!("{}\n", post.title);
    out.push_str(&format!("{} · {}\n", post.author, display_date(post)));
    if !post.categories.is_empty() {
        out.push_str(&format!("Categories: {}\n", post.categories.join(", ")));
    }
    if !post.image.is_empty() {
        out.push_str(&format!("Image: {}\n", post.image));
    }
    out.push('\n');
    out.push_str(post.body.trim_end());
    out.push('\n');

    if !related.is_empty() {
        out.push_str("\nRelated:\n");
        for other in related {
            out.push_str(&format!("  - {} ({})\n", other.title, other.slug));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct PostWithRelated<'a> {
    post: &'a Post,
    related: &'a [Post],
}

/// Handle `get news`
pub async fn handle_news(
    feeds: &LeagueFeeds,
    category: Option<&str>,
    limit: usize,
    as_json: bool,
    refresh: bool,
) -> Result<()> {
    if refresh {
        feeds.posts.reset().await;
    }

    // tarpaulin::skip - HTTP call, tested via integration tests
    let fetched = feeds.posts.posts().await;
    report_status("news", &fetched);

    let selected = match category {
        Some(category) => filter_by_category(fetched.data(), category),
        None => fetched.data().clone(),
    };
    let posts = latest(&selected, limit);

    if as_json {
        println!("{}", to_json(&posts)?); // tarpaulin::skip
    } else if posts.is_empty() {
        println!("No posts found."); // tarpaulin::skip
    } else {
        for post in &posts {
            println!("{}", format_post_line(post)); // tarpaulin::skip
        }
    }

    Ok(())
}

/// Handle `get post <slug>`
pub async fn handle_post(
    feeds: &LeagueFeeds,
    slug: &str,
    as_json: bool,
    refresh: bool,
) -> Result<()> {
    if refresh {
        feeds.posts.reset().await;
    }

    // tarpaulin::skip - HTTP call, tested via integration tests
    let fetched = feeds.posts.posts().await;
    report_status("news", &fetched);

    let posts = fetched.data();
    let post = find_by_slug(posts, slug).ok_or_else(|| FeedError::PostNotFound {
        slug: slug.to_string(),
    })?;
    let related = related(posts, slug, RELATED_POSTS);

    if as_json {
        let output = PostWithRelated {
            post,
            related: &related,
        };
        println!("{}", to_json(&output)?); // tarpaulin::skip
    } else {
        print!("{}", format_post_detail(post, &related)); // tarpaulin::skip
    }

    Ok(())
}
