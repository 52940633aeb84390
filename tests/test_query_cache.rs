//! Integration tests for the query cache and mutation tracker.

use futures::future::join_all;
use servicehub_client::cache::{
    MutationTracker, QueryCache, QueryError, QueryKey, QueryScope, QueryStatus,
};
use servicehub_client::Metrics;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn provider_key(provider: &str) -> QueryKey {
    QueryKey::new(QueryScope::ProviderServices, [provider])
}

/// Query `key` with a fetcher that counts its runs and answers `value` after `delay`.
async fn counted_query(
    cache: &QueryCache<Vec<String>>,
    key: QueryKey,
    calls: &Arc<AtomicUsize>,
    value: &str,
    delay: Duration,
) -> Result<Vec<String>, QueryError> {
    let calls = calls.clone();
    let value = value.to_string();
    cache
        .query(key, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(delay).await;
                Ok::<_, String>(vec![value])
            }
        })
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_across_tasks_fetch_once() {
    for n in [1usize, 2, 8, 32] {
        let cache = QueryCache::new(None);
        let calls = Arc::new(AtomicUsize::new(0));

        let handles = (0..n)
            .map(|i| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    counted_query(
                        &cache,
                        provider_key("user-1"),
                        &calls,
                        &format!("value-{}", i),
                        Duration::from_millis(50),
                    )
                    .await
                })
            })
            .collect::<Vec<_>>();

        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "n = {}", n);
        assert!(results.iter().all(|r| r == &results[0]));
    }
}

#[tokio::test]
async fn test_invalidate_prefix_refetches_each_matching_key_once() {
    let cache = QueryCache::new(None);
    let calls = Arc::new(AtomicUsize::new(0));
    let no_delay = Duration::ZERO;

    let a = provider_key("user-1");
    let b = provider_key("user-2");
    let feed = QueryKey::new(QueryScope::AllServices, ["6"]);

    counted_query(&cache, a.clone(), &calls, "a1", no_delay).await.unwrap();
    counted_query(&cache, b.clone(), &calls, "b1", no_delay).await.unwrap();
    counted_query(&cache, feed.clone(), &calls, "f1", no_delay).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let marked = cache.invalidate(&QueryKey::scope(QueryScope::ProviderServices));
    assert_eq!(marked, 2);
    assert!(cache.is_stale(&a));
    assert!(!cache.is_stale(&feed));

    // Stale data stays readable until the refetch replaces it
    assert_eq!(cache.get_query_data(&a), Some(vec!["a1".to_string()]));

    let refreshed = counted_query(&cache, a.clone(), &calls, "a2", no_delay).await;
    let again = counted_query(&cache, a.clone(), &calls, "a3", no_delay).await;
    let feed_again = counted_query(&cache, feed, &calls, "f2", no_delay).await;

    assert_eq!(refreshed, Ok(vec!["a2".to_string()]));
    assert_eq!(again, Ok(vec!["a2".to_string()]));
    assert_eq!(feed_again, Ok(vec!["f1".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_narrow_prefix_only_hits_its_params() {
    let cache = QueryCache::new(None);
    let calls = Arc::new(AtomicUsize::new(0));

    counted_query(&cache, provider_key("user-1"), &calls, "a", Duration::ZERO)
        .await
        .unwrap();
    counted_query(&cache, provider_key("user-2"), &calls, "b", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(cache.invalidate(&provider_key("user-1")), 1);
    assert!(cache.is_stale(&provider_key("user-1")));
    assert!(!cache.is_stale(&provider_key("user-2")));
}

#[tokio::test]
async fn test_subscriber_sees_stale_while_revalidate() {
    let cache = QueryCache::new(None);
    let calls = Arc::new(AtomicUsize::new(0));
    let key = provider_key("user-1");

    let mut rx = cache.subscribe(&key);
    assert_eq!(rx.borrow().status, QueryStatus::Idle);
    assert_eq!(cache.subscriber_count(&key), 1);

    counted_query(&cache, key.clone(), &calls, "v1", Duration::ZERO)
        .await
        .unwrap();
    rx.changed().await.unwrap();
    {
        let state = rx.borrow_and_update();
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data, Some(vec!["v1".to_string()]));
        assert!(!state.is_fetching);
    }

    cache.invalidate(&key);
    {
        let state = rx.borrow_and_update();
        assert!(state.is_stale);
        assert_eq!(state.data, Some(vec!["v1".to_string()]));
    }

    let cache_for_refetch = cache.clone();
    let calls_for_refetch = calls.clone();
    let refetch = tokio::spawn(async move {
        counted_query(
            &cache_for_refetch,
            provider_key("user-1"),
            &calls_for_refetch,
            "v2",
            Duration::from_millis(50),
        )
        .await
    });

    // While the refetch runs the old value is still served
    tokio::time::sleep(Duration::from_millis(10)).await;
    {
        let state = rx.borrow_and_update();
        assert!(state.is_fetching);
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data, Some(vec!["v1".to_string()]));
    }

    refetch.await.unwrap().unwrap();
    let state = cache.state(&key).unwrap();
    assert_eq!(state.data, Some(vec!["v2".to_string()]));
    assert!(!state.is_stale);
    assert!(!state.is_fetching);

    drop(rx);
    assert_eq!(cache.subscriber_count(&key), 0);
}

#[tokio::test]
async fn test_failed_fetch_is_reported_and_retried() {
    let cache: QueryCache<Vec<String>> = QueryCache::new(None);
    let key = provider_key("user-1");

    let result = cache
        .query(key.clone(), || async { Err::<Vec<String>, _>("connection refused") })
        .await;
    assert_eq!(result, Err(QueryError::new("connection refused")));

    let state = cache.state(&key).unwrap();
    assert_eq!(state.status, QueryStatus::Error);
    assert_eq!(state.error.unwrap().message(), "connection refused");

    let calls = Arc::new(AtomicUsize::new(0));
    let retry = counted_query(&cache, key.clone(), &calls, "ok", Duration::ZERO).await;
    assert_eq!(retry, Ok(vec!["ok".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.state(&key).unwrap().status, QueryStatus::Success);
}

#[tokio::test]
async fn test_time_window_expires_values() {
    let cache = QueryCache::new(Some(Duration::from_millis(30)));
    let calls = Arc::new(AtomicUsize::new(0));
    let key = provider_key("user-1");

    counted_query(&cache, key.clone(), &calls, "v1", Duration::ZERO)
        .await
        .unwrap();
    counted_query(&cache, key.clone(), &calls, "v2", Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let expired = counted_query(&cache, key, &calls, "v3", Duration::ZERO).await;
    assert_eq!(expired, Ok(vec!["v3".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_metrics_count_hits_misses_and_joins() {
    let metrics = Metrics::new();
    let cache = QueryCache::with_metrics(None, metrics.clone());
    let calls = Arc::new(AtomicUsize::new(0));
    let key = provider_key("user-1");

    let first = counted_query(&cache, key.clone(), &calls, "v", Duration::from_millis(20));
    let second = counted_query(&cache, key.clone(), &calls, "v", Duration::from_millis(20));
    let _ = futures::join!(first, second);
    counted_query(&cache, key, &calls, "v", Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(metrics.cache_misses_total(), 1);
    assert_eq!(metrics.cache_joins_total(), 1);
    assert_eq!(metrics.cache_hits_total(), 1);
}

#[tokio::test]
async fn test_mutations_are_never_deduplicated() {
    let tracker = MutationTracker::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let mutations = (0..3).map(|_| {
        let runs = runs.clone();
        tracker.mutate(
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                runs.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(())
            },
            |_| {},
            |_| {},
        )
    });

    let pending = tracker.clone();
    let (results, _) = tokio::join!(join_all(mutations), async move {
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(pending.pending_count(), 3);
    });

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert!(!tracker.is_pending());
}
