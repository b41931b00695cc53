//! Integration tests for the cache-aside resolver
//!
//! These exercise the resolver directly against the real store and cache,
//! covering ordering, concurrency and cursor release on cancellation.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use common::fixtures::*;
use common::helpers::*;
use jobserver::{
    AttributeScanner, CacheStore, JobServerError, JsonDocumentStore, MemoryCacheStore, Resolution,
    UniqueValuesResolver,
};
use shared::{AttributeKey, DistinctValueSet};

fn resolver_over(documents: Vec<shared::Document>) -> UniqueValuesResolver<JsonDocumentStore, MemoryCacheStore> {
    UniqueValuesResolver::new(
        Arc::new(JsonDocumentStore::from_documents(documents)),
        Arc::new(MemoryCacheStore::new()),
        TEST_TTL,
    )
}

#[tokio::test]
async fn test_result_independent_of_document_order() {
    let mut reversed = create_test_jobs();
    reversed.reverse();

    let forward = resolver_over(create_test_jobs());
    let backward = resolver_over(reversed);
    let key = AttributeKey::job_skills();

    let forward_values = assert_ok!(forward.resolve(&key).await);
    let backward_values = assert_ok!(backward.resolve(&key).await);

    assert_eq!(forward_values, backward_values);
    assert_eq!(forward_values.into_sorted_vec(), expected_skills());
}

#[tokio::test]
async fn test_keys_are_cached_independently() {
    let resolver = resolver_over(create_test_jobs());
    let cancel = CancellationToken::new();

    let (_, skills) = assert_ok!(resolver.resolve_traced(&AttributeKey::job_skills(), &cancel).await);
    let (_, countries) = assert_ok!(resolver.resolve_traced(&AttributeKey::search_country(), &cancel).await);
    let (_, skills_again) = assert_ok!(resolver.resolve_traced(&AttributeKey::job_skills(), &cancel).await);

    assert_eq!(skills, Resolution::Scanned);
    assert_eq!(countries, Resolution::Scanned);
    assert_eq!(skills_again, Resolution::CacheHit);
}

#[tokio::test]
async fn test_cached_entry_is_json_array() {
    let cache = Arc::new(MemoryCacheStore::new());
    let resolver = UniqueValuesResolver::new(
        Arc::new(JsonDocumentStore::from_documents(create_test_jobs())),
        cache.clone(),
        TEST_TTL,
    );

    assert_ok!(resolver.resolve(&AttributeKey::search_country()).await);

    let raw = assert_ok!(cache.get("search_country").await).unwrap();
    let decoded = assert_ok!(DistinctValueSet::from_json(&raw));
    assert_eq!(decoded.into_sorted_vec(), expected_countries());
}

#[tokio::test]
async fn test_concurrent_misses_agree() {
    let resolver = resolver_over(create_test_jobs());
    let key = AttributeKey::job_skills();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            let key = key.clone();
            tokio::spawn(async move { resolver.resolve(&key).await })
        })
        .collect();

    for handle in handles {
        let values = assert_ok!(assert_ok!(handle.await));
        assert_eq!(values.into_sorted_vec(), expected_skills());
    }
}

#[tokio::test]
async fn test_cancelled_scan_releases_cursor() {
    let store = Arc::new(StallingStore::new(create_projected_skill_documents()));
    let resolver = UniqueValuesResolver::new(store.clone(), Arc::new(MemoryCacheStore::new()), TEST_TTL);
    let cancel = CancellationToken::new();

    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { resolver.resolve_with_cancel(&AttributeKey::job_skills(), &cancel).await })
    };

    while store.opened.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    cancel.cancel();

    let result = assert_ok!(task.await);
    assert!(matches!(result, Err(JobServerError::Cancelled)));
    assert!(store.closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_scan_releases_cursor() {
    let store = Arc::new(StallingStore::new(create_projected_skill_documents()));
    let scanner = AttributeScanner::new(store.clone());

    let outcome = tokio::time::timeout(Duration::from_secs(1), scanner.collect(&AttributeKey::job_skills())).await;

    assert_err!(outcome);
    assert_eq!(store.opened.load(Ordering::SeqCst), 1);
    assert!(store.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_expired_entry_is_rescanned() {
    let resolver = UniqueValuesResolver::new(
        Arc::new(JsonDocumentStore::from_documents(create_test_jobs())),
        Arc::new(MemoryCacheStore::new()),
        SHORT_TTL,
    );
    let key = AttributeKey::job_skills();
    let cancel = CancellationToken::new();

    let (_, first) = assert_ok!(resolver.resolve_traced(&key, &cancel).await);
    let (_, second) = assert_ok!(resolver.resolve_traced(&key, &cancel).await);
    tokio::time::sleep(SHORT_TTL * 2).await;
    let (values, third) = assert_ok!(resolver.resolve_traced(&key, &cancel).await);

    assert_eq!(first, Resolution::Scanned);
    assert_eq!(second, Resolution::CacheHit);
    assert_eq!(third, Resolution::Scanned);
    assert_eq!(values.into_sorted_vec(), expected_skills());
}

#[tokio::test]
async fn test_json_store_cursors_released_after_resolve() {
    let store = Arc::new(JsonDocumentStore::from_documents(create_test_jobs()));
    let resolver = UniqueValuesResolver::new(store.clone(), Arc::new(MemoryCacheStore::new()), TEST_TTL);

    assert_ok!(resolver.resolve(&AttributeKey::job_skills()).await);
    assert_ok!(resolver.resolve(&AttributeKey::search_country()).await);

    assert_eq!(store.open_cursors(), 0);
}
