//! Integration tests for batch flag checks.

mod support;

use std::sync::Arc;

use flagwise_core::{BatchEvaluator, TargetingEngine};
use flagwise_domain::{FlagwiseError, Principal, Targeting};
use support::flag;
use support::stores::{FailingFlagStore, MockFlagStore};

fn seeded_store() -> MockFlagStore {
    MockFlagStore::new([
        flag("x", Targeting::Global, true),
        flag("beta", Targeting::users(["42"]), true),
        flag("admins", Targeting::roles(["admin"]), true),
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn every_requested_key_is_answered() {
    let store = seeded_store();
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(store)));
    let principal = Principal::new("42");

    let results = batch.check_many(["x", "beta", "admins", "missing"], Some(&principal)).await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(results["x"]);
    assert!(results["beta"]);
    assert!(!results["admins"]);
    assert!(!results["missing"]);
}

#[tokio::test]
async fn duplicate_keys_are_evaluated_once() {
    let store = seeded_store();
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(store.clone())));

    let results = batch.check_many(["x", "x", "beta", "x"], None).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(store.lookups(), 2);
}

#[tokio::test]
async fn empty_batch_returns_empty_map() {
    let store = seeded_store();
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(store.clone())));

    let results = batch.check_many(Vec::<String>::new(), None).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_lookup() {
    let store = seeded_store();
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(store.clone()))).with_max_keys(3);

    let err = batch.check_many(["a", "b", "c", "d"], None).await.unwrap_err();

    assert!(matches!(err, FlagwiseError::Validation(_)));
    assert_eq!(store.lookups(), 0);

    // Duplicates do not count against the limit
    assert!(batch.check_many(["a", "a", "b", "c", "c"], None).await.is_ok());
}

#[tokio::test]
async fn default_cap_is_twenty() {
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(MockFlagStore::default())));
    assert_eq!(batch.max_keys(), 20);

    let keys: Vec<String> = (0..21).map(|idx| format!("flag-{idx}")).collect();
    assert!(batch.check_many(keys, None).await.is_err());
}

#[tokio::test]
async fn store_failure_fails_the_whole_batch() {
    let batch = BatchEvaluator::new(TargetingEngine::new(Arc::new(FailingFlagStore)));

    let err = batch.check_many(["x", "y"], None).await.unwrap_err();
    assert!(matches!(err, FlagwiseError::Database(_)));
}
