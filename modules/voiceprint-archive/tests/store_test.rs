//! Integration tests for PgProfileStore and the cache on top of it.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use voiceprint_archive::testing::sample_profile;
use voiceprint_archive::{
    CacheLookup, PgProfileStore, ProfileCache, ProfileStore, StoredProfile, Tier, WriteStatus,
};
use voiceprint_common::{CacheMode, CachedPayload};

/// Get a migrated store on a clean table, or skip if no test DB is available.
async fn test_store() -> Option<PgProfileStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    let store = PgProfileStore::new(pool.clone());
    store.migrate().await.ok()?;

    sqlx::query("TRUNCATE style_profiles")
        .execute(&pool)
        .await
        .ok()?;

    Some(store)
}

fn record(handle: &str, payload: serde_json::Value, age: Duration) -> StoredProfile {
    StoredProfile {
        id: Uuid::new_v4(),
        handle: handle.to_string(),
        payload,
        created_at: Utc::now() - age,
    }
}

#[tokio::test]
async fn latest_by_handle_returns_newest_row() {
    let Some(store) = test_store().await else {
        return;
    };

    store
        .insert(&record("alice", json!({"n": 1}), Duration::hours(5)))
        .await
        .unwrap();
    store
        .insert(&record("alice", json!({"n": 2}), Duration::hours(1)))
        .await
        .unwrap();
    store
        .insert(&record("bob", json!({"n": 3}), Duration::minutes(1)))
        .await
        .unwrap();

    let latest = store.latest_by_handle("alice").await.unwrap().unwrap();
    assert_eq!(latest.payload, json!({"n": 2}));
    assert_eq!(store.history("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_handle_is_none() {
    let Some(store) = test_store().await else {
        return;
    };

    assert!(store.latest_by_handle("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn cache_round_trip_through_postgres() {
    let Some(store) = test_store().await else {
        return;
    };
    let store = Arc::new(store);

    let writer = ProfileCache::new(Some(store.clone()), CacheMode::Profile, Duration::hours(24));
    let result = writer.put("carol", CachedPayload::Profile(sample_profile())).await;
    assert_eq!(result.status, WriteStatus::Success);
    assert_eq!(result.storage, Tier::Database);

    // A fresh process: empty memory tier, same database.
    let reader = ProfileCache::new(Some(store), CacheMode::Profile, Duration::hours(24));
    assert!(matches!(
        reader.get("carol").await,
        CacheLookup::Fresh { tier: Tier::Database, .. }
    ));
}
