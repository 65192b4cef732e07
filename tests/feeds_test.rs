//! Integration tests for the cached feeds against mock endpoints

use std::time::Duration;

use basketliga::{
    config::{Config, SpotifyConfig},
    core::SnapshotStore,
    Fetched, LeagueFeeds,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config_for(server: &MockServer) -> Config {
    Config {
        standings_url: format!("{}/standings", server.uri()),
        standings_api_key: Some("sheet-key".to_string()),
        posts_url: format!("{}/posts", server.uri()),
        standings_ttl: Duration::from_secs(180),
        posts_ttl: Duration::from_secs(300),
        episodes_ttl: Duration::from_secs(300),
        http_timeout: Duration::from_secs(5),
        spotify: SpotifyConfig {
            client_id: None,
            client_secret: None,
            auth_url: format!("{}/api/token", server.uri()),
            api_base: format!("{}/v1", server.uri()),
            ..SpotifyConfig::default()
        },
        snapshot_dir: None,
    }
}

fn standings_body() -> serde_json::Value {
    json!([
        { "team": "Team 3", "wlt": "0-0-0" },
        { "team": "Hawks", "wlt": "5-3-0", "rank": "2*", "pct": ".625" },
        { "team": "Nets", "wlt": "6-2-0", "rank": "1", "pct": ".750" }
    ])
}

#[tokio::test]
async fn test_standings_cached_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .and(header("x-api-key", "sheet-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .expect(1)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    let first = feeds.standings.standings().await;
    let second = feeds.standings.standings().await;

    assert!(matches!(first, Fetched::Fresh(_)));
    assert!(matches!(second, Fetched::Cached(_)));
    assert_eq!(first.data(), second.data());

    let names: Vec<&str> = first.data().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Nets", "Hawks"]);
    assert!(first.data()[1].clinched_playoff);
}

#[tokio::test]
async fn test_standings_refetched_after_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.standings_ttl = Duration::from_millis(50);
    let feeds = LeagueFeeds::new(&config).unwrap();

    assert!(matches!(feeds.standings.standings().await, Fetched::Fresh(_)));
    assert!(matches!(feeds.standings.standings().await, Fetched::Cached(_)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(feeds.standings.standings().await, Fetched::Fresh(_)));
}

#[tokio::test]
async fn test_network_error_without_cache_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    let standings = feeds.standings.standings().await;
    assert!(matches!(standings, Fetched::Fallback(_)));
    assert!(!standings.data().is_empty());

    let posts = feeds.posts.posts().await;
    assert!(matches!(posts, Fetched::Fallback(_)));
    assert!(!posts.data().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_uses_fallback() {
    let mut config = Config::default().without_snapshots();
    config.standings_url = "http://127.0.0.1:9/standings".to_string();
    config.http_timeout = Duration::from_secs(2);
    let feeds = LeagueFeeds::new(&config).unwrap();

    let standings = feeds.standings.standings().await;
    assert!(standings.is_degraded());
    assert_eq!(standings.label(), "fallback");
}

#[tokio::test]
async fn test_error_after_success_serves_stale() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.standings_ttl = Duration::ZERO;
    let feeds = LeagueFeeds::new(&config).unwrap();

    let fresh = feeds.standings.standings().await;
    let stale = feeds.standings.standings().await;

    assert!(matches!(fresh, Fetched::Fresh(_)));
    assert!(matches!(stale, Fetched::Stale(_)));
    assert_eq!(fresh.into_inner(), stale.into_inner());
}

#[tokio::test]
async fn test_fallback_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "naslov": "Live", "tekst": "Body", "slug": "live", "category": "NBA" }]
        })))
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    assert!(matches!(feeds.posts.posts().await, Fetched::Fallback(_)));

    let recovered = feeds.posts.posts().await;
    assert!(matches!(recovered, Fetched::Fresh(_)));
    assert_eq!(recovered.data()[0].slug, "live");
}

#[tokio::test]
async fn test_empty_standings_sheet_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();
    assert!(matches!(
        feeds.standings.standings().await,
        Fetched::Fallback(_)
    ));
}

#[tokio::test]
async fn test_error_envelope_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Sheet not found"
        })))
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();
    assert!(matches!(feeds.posts.posts().await, Fetched::Fallback(_)));
}

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "naslov": "A", "tekst": "a", "slug": "a" }]))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    let (a, b, c) = tokio::join!(
        feeds.posts.posts(),
        feeds.posts.by_slug("a"),
        feeds.posts.latest(5)
    );

    assert_eq!(a.data().len(), 1);
    assert_eq!(b.data().as_ref().map(|p| p.title.as_str()), Some("A"));
    assert_eq!(c.data().len(), 1);
}

#[tokio::test]
async fn test_post_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "id": 1,
                    "naslov": "Old",
                    "tekst": "x",
                    "slug": "old",
                    "datum": "2025-01-01",
                    "category": "NBA, Fantasy"
                },
                {
                    "id": 2,
                    "naslov": "New",
                    "tekst": "x",
                    "slug": "new",
                    "datum": "2025-06-01",
                    "category": "ncaa"
                },
                {
                    "id": 3,
                    "naslov": "Mid",
                    "tekst": "x",
                    "slug": "mid",
                    "datum": "2025-03-01",
                    "category": ["fantasy"]
                },
                { "id": 4, "naslov": "", "tekst": "x", "slug": "draft" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    let latest = feeds.posts.latest(2).await.into_inner();
    let slugs: Vec<&str> = latest.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["new", "mid"]);

    let fantasy = feeds.posts.by_category("Fantasy").await.into_inner();
    assert_eq!(fantasy.len(), 2);

    assert!(feeds.posts.by_slug("draft").await.into_inner().is_none());

    let related = feeds.posts.related("old", 3).await.into_inner();
    let slugs: Vec<&str> = related.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["mid", "new"]);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .expect(2)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    assert!(matches!(feeds.standings.standings().await, Fetched::Fresh(_)));
    feeds.invalidate_all().await;
    assert!(matches!(feeds.standings.standings().await, Fetched::Fresh(_)));
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let up = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .mount(&up)
        .await;

    let mut config = config_for(&up);
    config.snapshot_dir = Some(temp_dir.path().to_path_buf());
    let saved = LeagueFeeds::new(&config)
        .unwrap()
        .standings
        .standings()
        .await
        .into_inner();

    let store = SnapshotStore::new(temp_dir.path());
    assert!(store.path_for("standings").exists());

    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&down)
        .await;

    let mut config = config_for(&down);
    config.snapshot_dir = Some(temp_dir.path().to_path_buf());
    let restarted = LeagueFeeds::new(&config).unwrap();

    let served = restarted.standings.standings().await;
    assert!(matches!(served, Fetched::Stale(_)));
    assert_eq!(served.into_inner(), saved);
}

#[tokio::test]
async fn test_episodes_without_credentials_use_samples() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();
    let episodes = feeds.podcast.episodes(5).await;

    assert!(matches!(episodes, Fetched::Fallback(_)));
    assert_eq!(episodes.data().len(), 3);
}

#[tokio::test]
async fn test_clinched_teams_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .expect(1)
        .mount(&server)
        .await;

    let feeds = LeagueFeeds::new(&config_for(&server)).unwrap();

    let clinched = feeds.standings.clinched().await;
    assert!(matches!(clinched, Fetched::Fresh(_)));
    let names: Vec<&str> = clinched.data().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Hawks"]);
    assert!(matches!(feeds.standings.standings().await, Fetched::Cached(_)));
}

#[tokio::test]
async fn test_reset_skips_older_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(standings_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.snapshot_dir = Some(temp_dir.path().to_path_buf());
    let feeds = LeagueFeeds::new(&config).unwrap();

    assert!(matches!(feeds.standings.standings().await, Fetched::Fresh(_)));
    feeds.standings.reset().await;

    let store = SnapshotStore::new(temp_dir.path());
    assert!(!store.path_for("standings").exists());
    assert!(matches!(
        feeds.standings.standings().await,
        Fetched::Fallback(_)
    ));
}
