// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore store tests. They need the emulator:
//!
//! ```sh
//! FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration
//! ```

use bonsai_quests::db::{KeySpace, KvStore};
use bonsai_quests::services::{CompletionTracker, PointsLedger};
use std::sync::Arc;

mod common;
use common::test_firestore;

/// Unique environment per test run so reruns start from empty keys.
fn fresh_keys(test: &str) -> KeySpace {
    let nonce = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    KeySpace::new(&format!("it-{}-{}", test, nonce))
}

#[tokio::test]
async fn test_get_set_round_trip() {
    require_emulator!();
    let store = test_firestore().await;
    let key = fresh_keys("getset").quest_catalog();

    assert_eq!(store.get(&key).await.unwrap(), None);

    store.set(&key, "[]").await.unwrap();
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("[]"));

    store.set(&key, "[{\"id\":\"a\"}]").await.unwrap();
    assert_eq!(
        store.get(&key).await.unwrap().as_deref(),
        Some("[{\"id\":\"a\"}]")
    );
}

#[tokio::test]
async fn test_incr_by_and_reset() {
    require_emulator!();
    let store = test_firestore().await;
    let key = fresh_keys("incr").points("42");

    assert_eq!(store.incr_by(&key, 1).await.unwrap(), 1);
    assert_eq!(store.incr_by(&key, 99).await.unwrap(), 100);
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("100"));

    // A plain write of "0" resets the counter too.
    store.set(&key, "0").await.unwrap();
    assert_eq!(store.incr_by(&key, 5).await.unwrap(), 5);
}

#[tokio::test]
async fn test_sadd_reports_first_insert_only() {
    require_emulator!();
    let store = test_firestore().await;
    let key = fresh_keys("sadd").completed_quests("42");

    assert!(store.sadd(&key, "follow_x").await.unwrap());
    assert!(!store.sadd(&key, "follow_x").await.unwrap());
    assert!(store.sadd(&key, "follow_telegram").await.unwrap());

    let mut members = store.smembers(&key).await.unwrap();
    members.sort();
    assert_eq!(members, vec!["follow_telegram", "follow_x"]);
}

#[tokio::test]
async fn test_services_over_firestore() {
    require_emulator!();
    let store: Arc<dyn KvStore> = Arc::new(test_firestore().await);
    let keys = fresh_keys("services");
    let ledger = PointsLedger::new(store.clone(), keys.clone());
    let tracker = CompletionTracker::new(store, keys);

    assert_eq!(ledger.get_points("7").await.unwrap(), 0);
    assert_eq!(ledger.increment_points("7", 200).await.unwrap(), 200);
    ledger.reset_points("7").await.unwrap();
    assert_eq!(ledger.get_points("7").await.unwrap(), 0);

    assert!(tracker.mark_completed("7", "follow_x").await.unwrap());
    assert!(tracker.is_completed("7", "follow_x").await.unwrap());
    assert!(!tracker.is_completed("7", "follow_telegram").await.unwrap());
}
