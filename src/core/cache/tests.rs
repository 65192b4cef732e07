//! Unit tests for the TTL cache

use super::*;
use crate::error::FeedError;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[cfg(test)]
mod ttl_cache_tests {
    use super::*;

    fn ok_fetch(
        calls: &Arc<AtomicUsize>,
        value: Vec<u32>,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Vec<u32>>> + Send>> {
        let calls = calls.clone();
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
        }
    }

    fn failing_fetch(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Vec<u32>>> + Send>> {
        let calls = calls.clone();
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FeedError::EmptyPayload)
            })
        }
    }

    fn fallback() -> Fetched<Vec<u32>> {
        Fetched::Fallback(vec![99])
    }

    #[tokio::test]
    async fn test_first_call_fetches() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let result = cache.get_or_fetch(ok_fetch(&calls, vec![1, 2]), fallback).await;

        assert_eq!(result, Fetched::Fresh(vec![1, 2]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_memory() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch(ok_fetch(&calls, vec![1, 2]), fallback).await;
        let second = cache.get_or_fetch(ok_fetch(&calls, vec![3, 4]), fallback).await;

        assert_eq!(first.data(), second.data());
        assert_eq!(second, Fetched::Cached(vec![1, 2]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_exactly_one_refetch() {
        let cache = TtlCache::new(Duration::from_millis(40));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(ok_fetch(&calls, vec![1]), fallback).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let refreshed = cache.get_or_fetch(ok_fetch(&calls, vec![2]), fallback).await;
        let again = cache.get_or_fetch(ok_fetch(&calls, vec![3]), fallback).await;

        assert_eq!(refreshed, Fetched::Fresh(vec![2]));
        assert_eq!(again, Fetched::Cached(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_with_empty_cache_uses_recovery() {
        let cache: TtlCache<Vec<u32>> = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let result = cache.get_or_fetch(failing_fetch(&calls), fallback).await;

        assert_eq!(result, Fetched::Fallback(vec![99]));
        assert!(result.is_degraded());
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn test_recovered_value_is_not_cached() {
        let cache: TtlCache<Vec<u32>> = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(failing_fetch(&calls), fallback).await;
        let result = cache.get_or_fetch(ok_fetch(&calls, vec![5]), fallback).await;

        assert_eq!(result, Fetched::Fresh(vec![5]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_after_expiry_serves_stale_data() {
        let cache = TtlCache::new(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(ok_fetch(&calls, vec![7, 8]), fallback).await;
        let result = cache.get_or_fetch(failing_fetch(&calls), fallback).await;

        assert_eq!(result, Fetched::Stale(vec![7, 8]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(ok_fetch(&calls, vec![1]), fallback).await;
        cache.invalidate().await;
        assert!(cache.peek().await.is_none());

        let result = cache.get_or_fetch(ok_fetch(&calls, vec![2]), fallback).await;
        assert_eq!(result, Fetched::Fresh(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, FeedError>(vec![42])
            }
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(slow_fetch(calls.clone()), fallback),
            cache.get_or_fetch(slow_fetch(calls.clone()), fallback),
            cache.get_or_fetch(slow_fetch(calls.clone()), fallback),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in [a, b, c] {
            assert_eq!(result.into_inner(), vec![42]);
        }
    }

    #[tokio::test]
    async fn test_peek_reports_cached_at() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let before = Utc::now();

        cache.get_or_fetch(ok_fetch(&calls, vec![1]), fallback).await;

        let entry = cache.peek().await.unwrap();
        assert_eq!(entry.data, vec![1]);
        assert!(entry.cached_at >= before);
        assert!(entry.age() < Duration::from_secs(60));
    }

    #[test]
    fn test_fetched_accessors() {
        let fresh = Fetched::Fresh(1);
        assert_eq!(fresh.label(), "fresh");
        assert!(!fresh.is_degraded());

        let cached = Fetched::Cached(2);
        assert_eq!(cached.label(), "cached");
        assert!(!cached.is_degraded());

        let stale = Fetched::Stale(3);
        assert_eq!(stale.label(), "stale");
        assert!(stale.is_degraded());

        let fallback = Fetched::Fallback(4);
        assert_eq!(fallback.label(), "fallback");
        assert_eq!(*fallback.data(), 4);
        assert_eq!(fallback.into_inner(), 4);
    }

    #[test]
    fn test_fetched_map_keeps_variant() {
        let stale = Fetched::Stale(vec![1, 2, 3]).map(|v| v.len());
        assert_eq!(stale, Fetched::Stale(3));

        let cached = Fetched::Cached("abc").map(str::to_uppercase);
        assert_eq!(cached, Fetched::Cached("ABC".to_string()));
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(Utc::now()), "just now");
        assert_eq!(
            age_display(Utc::now() - chrono::Duration::minutes(5)),
            "5m ago"
        );
        assert_eq!(
            age_display(Utc::now() - chrono::Duration::hours(3)),
            "3h ago"
        );
        assert_eq!(age_display(Utc::now() - chrono::Duration::days(2)), "2d ago");
        assert_eq!(
            age_display(Utc::now() + chrono::Duration::minutes(10)),
            "just now"
        );
    }
}
