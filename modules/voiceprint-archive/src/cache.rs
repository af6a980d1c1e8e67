// Two-tier profile cache: an in-process map in front of an optional durable
// ProfileStore.
//
// Lookup precedence: memory (if within TTL) -> durable latest-by-handle
// (validated, promoted to memory when fresh) -> stale memory copy -> miss.
// Writes replace the whole entry in each tier; concurrent writers for one
// handle race and the last write to land in each tier wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use voiceprint_common::{cache_key, CacheEntry, CacheMode, CachedPayload, StyleProfile};

use crate::error::ArchiveError;
use crate::normalize::normalize;
use crate::store::{ProfileStore, StoredProfile};

/// Sub-fields a profile payload must carry to be served.
const PROFILE_FIELDS: &[&str] = &["metrics", "style_assessment", "style_signature", "example_tweets"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
}

impl Freshness {
    /// `Fresh` while `now - created_at <= ttl`.
    pub fn classify(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> Self {
        if now.signed_duration_since(created_at) <= ttl {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Memory,
    Database,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Memory => write!(f, "memory"),
            Tier::Database => write!(f, "database"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh { entry: CacheEntry, tier: Tier },
    Stale { entry: CacheEntry, tier: Tier },
    /// The durable record failed its structural check. Treat as a miss.
    Invalid { reason: String },
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Success,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageResult {
    pub status: WriteStatus,
    pub storage: Tier,
}

pub struct ProfileCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    store: Option<Arc<dyn ProfileStore>>,
    mode: CacheMode,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(store: Option<Arc<dyn ProfileStore>>, mode: CacheMode, ttl: Duration) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store,
            mode,
            ttl,
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn database_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Number of handles held in the in-process tier.
    pub async fn len(&self) -> usize {
        self.memory.read().await.len()
    }

    pub async fn get(&self, handle: &str) -> CacheLookup {
        self.get_at(handle, Utc::now()).await
    }

    pub async fn get_at(&self, handle: &str, now: DateTime<Utc>) -> CacheLookup {
        let key = cache_key(handle);

        let memory_copy = self.memory.read().await.get(&key).cloned();
        if let Some(entry) = &memory_copy {
            if Freshness::classify(entry.created_at, now, self.ttl) == Freshness::Fresh {
                debug!(handle = %key, "cache: memory hit");
                return CacheLookup::Fresh {
                    entry: entry.clone(),
                    tier: Tier::Memory,
                };
            }
        }

        let durable = match self.load_durable(&key).await {
            Some(Ok(entry)) => Some(entry),
            Some(Err(reason)) => {
                if let Some(entry) = memory_copy {
                    return CacheLookup::Stale {
                        entry,
                        tier: Tier::Memory,
                    };
                }
                return CacheLookup::Invalid { reason };
            }
            None => None,
        };

        if let Some(entry) = durable {
            if Freshness::classify(entry.created_at, now, self.ttl) == Freshness::Fresh {
                info!(handle = %key, "cache: durable hit, promoting to memory");
                self.memory.write().await.insert(key, entry.clone());
                return CacheLookup::Fresh {
                    entry,
                    tier: Tier::Database,
                };
            }
            let newer_in_memory = memory_copy
                .as_ref()
                .is_some_and(|m| m.created_at >= entry.created_at);
            if !newer_in_memory {
                return CacheLookup::Stale {
                    entry,
                    tier: Tier::Database,
                };
            }
        }

        match memory_copy {
            Some(entry) => CacheLookup::Stale {
                entry,
                tier: Tier::Memory,
            },
            None => CacheLookup::Miss,
        }
    }

    pub async fn put(&self, handle: &str, payload: CachedPayload) -> StorageResult {
        self.put_at(handle, payload, Utc::now()).await
    }

    /// Replace the entry for a handle. The memory write cannot fail; a
    /// durable failure downgrades the result to memory-only.
    pub async fn put_at(
        &self,
        handle: &str,
        payload: CachedPayload,
        created_at: DateTime<Utc>,
    ) -> StorageResult {
        let key = cache_key(handle);
        let entry = CacheEntry::new(key.clone(), payload, created_at);

        self.memory.write().await.insert(key.clone(), entry.clone());

        let Some(store) = &self.store else {
            return StorageResult {
                status: WriteStatus::Success,
                storage: Tier::Memory,
            };
        };

        let record = match serde_json::to_value(&entry.payload).map_err(ArchiveError::Encode) {
            Ok(payload) => StoredProfile {
                id: entry.id,
                handle: key.clone(),
                payload,
                created_at: entry.created_at,
            },
            Err(e) => {
                warn!(handle = %key, error = %e, "cache: payload not encodable, memory only");
                return StorageResult {
                    status: WriteStatus::Partial,
                    storage: Tier::Memory,
                };
            }
        };

        match store.insert(&record).await {
            Ok(()) => {
                debug!(handle = %key, id = %record.id, "cache: durable write ok");
                StorageResult {
                    status: WriteStatus::Success,
                    storage: Tier::Database,
                }
            }
            Err(e) => {
                warn!(handle = %key, error = %e, "cache: durable write failed, memory only");
                StorageResult {
                    status: WriteStatus::Partial,
                    storage: Tier::Memory,
                }
            }
        }
    }

    /// `None` when there is no durable tier, no record, or the read failed
    /// (read failures count as a miss). `Some(Err)` for an invalid record.
    async fn load_durable(&self, key: &str) -> Option<Result<CacheEntry, String>> {
        let store = self.store.as_ref()?;
        let record = match store.latest_by_handle(key).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(handle = %key, error = %e, "cache: durable read failed, treating as miss");
                return None;
            }
        };

        Some(match validate_payload(&record.payload, self.mode) {
            Ok(payload) => Ok(CacheEntry {
                id: record.id,
                handle: record.handle,
                payload,
                created_at: record.created_at,
            }),
            Err(reason) => {
                warn!(handle = %key, id = %record.id, reason = %reason, "cache: invalid durable record");
                Err(reason)
            }
        })
    }
}

/// Structural check for a durable payload under the active cache mode.
pub fn validate_payload(payload: &Value, mode: CacheMode) -> Result<CachedPayload, String> {
    let obj = payload
        .as_object()
        .ok_or_else(|| "payload is not an object".to_string())?;

    match mode {
        CacheMode::Profile => {
            if let Some(missing) = PROFILE_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
                return Err(format!("profile payload is missing '{missing}'"));
            }
            let profile: StyleProfile = serde_json::from_value(payload.clone())
                .map_err(|e| format!("profile payload is malformed: {e}"))?;
            Ok(CachedPayload::Profile(profile))
        }
        CacheMode::Corpus => {
            let tweets = obj
                .get("tweets")
                .and_then(Value::as_array)
                .ok_or_else(|| "corpus payload is missing 'tweets'".to_string())?;
            Ok(CachedPayload::Corpus {
                tweets: tweets.iter().map(|t| normalize(Some(t))).collect(),
            })
        }
    }
}
