// Profile resolution: cache first, upstream on miss, cached copy as a last resort.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use voiceprint_archive::{
    CacheLookup, PostSource, ProfileCache, StorageResult, Tier, TimelineCollector,
};
use voiceprint_common::{clean_handle, CacheEntry, CacheMode, CachedPayload, StyleProfile};
use voiceprint_style::analyze;

/// Where a resolved profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOrigin {
    Cache(Tier),
    Upstream,
    /// Forced refresh failed; the still-fresh cache entry was served.
    Kept(Tier),
    /// Refresh failed; an expired cache entry was served instead.
    Stale(Tier),
}

impl std::fmt::Display for ProfileOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileOrigin::Cache(Tier::Memory) => write!(f, "cache (memory)"),
            ProfileOrigin::Cache(Tier::Database) => write!(f, "cache (database)"),
            ProfileOrigin::Upstream => write!(f, "fresh fetch"),
            ProfileOrigin::Kept(Tier::Memory) => write!(f, "cached copy kept (memory)"),
            ProfileOrigin::Kept(Tier::Database) => write!(f, "cached copy kept (database)"),
            ProfileOrigin::Stale(Tier::Memory) => write!(f, "stale cache (memory)"),
            ProfileOrigin::Stale(Tier::Database) => write!(f, "stale cache (database)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// Cleaned handle, original case.
    pub handle: String,
    pub profile: StyleProfile,
    pub origin: ProfileOrigin,
    /// Set when the profile was just written to the cache.
    pub storage: Option<StorageResult>,
    pub note: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("a username is required")]
    MissingHandle,

    #[error("Unable to fetch posts for @{handle}: {reason}")]
    Unavailable { handle: String, reason: String },
}

pub struct ProfileService {
    collector: TimelineCollector,
    cache: Arc<ProfileCache>,
    tweet_count: usize,
}

impl ProfileService {
    pub fn new(source: Arc<dyn PostSource>, cache: Arc<ProfileCache>, tweet_count: usize) -> Self {
        Self {
            collector: TimelineCollector::new(source),
            cache,
            tweet_count,
        }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    pub async fn resolve(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<ResolvedProfile, ProfileError> {
        let handle = clean_handle(username);
        if handle.is_empty() {
            return Err(ProfileError::MissingHandle);
        }

        let fallback = match self.cache.get(handle).await {
            CacheLookup::Fresh { entry, tier } if !force_refresh => {
                match self.profile_from(&entry) {
                    Some(profile) => {
                        info!(handle, %tier, "profile: cache hit");
                        return Ok(ResolvedProfile {
                            handle: handle.to_string(),
                            profile,
                            origin: ProfileOrigin::Cache(tier),
                            storage: None,
                            note: None,
                        });
                    }
                    None => None,
                }
            }
            CacheLookup::Fresh { entry, tier } => Some((entry, ProfileOrigin::Kept(tier))),
            CacheLookup::Stale { entry, tier } => Some((entry, ProfileOrigin::Stale(tier))),
            CacheLookup::Invalid { reason } => {
                warn!(handle, reason = %reason, "profile: cached record invalid, refetching");
                None
            }
            CacheLookup::Miss => None,
        };

        let failure = match self.collector.fetch_posts(handle, self.tweet_count).await {
            Ok(posts) if !posts.is_empty() => match analyze(&posts) {
                Ok(profile) => {
                    let payload = match self.cache.mode() {
                        CacheMode::Profile => CachedPayload::Profile(profile.clone()),
                        CacheMode::Corpus => CachedPayload::Corpus { tweets: posts },
                    };
                    let storage = self.cache.put(handle, payload).await;
                    info!(
                        handle,
                        tweets = profile.metrics.tweet_count,
                        storage = %storage.storage,
                        "profile: analyzed fresh posts"
                    );
                    return Ok(ResolvedProfile {
                        handle: handle.to_string(),
                        profile,
                        origin: ProfileOrigin::Upstream,
                        storage: Some(storage),
                        note: None,
                    });
                }
                Err(e) => e.to_string(),
            },
            Ok(_) => "no original posts returned".to_string(),
            Err(e) => e.to_string(),
        };

        if let Some((entry, origin)) = fallback {
            if let Some(profile) = self.profile_from(&entry) {
                warn!(handle, reason = %failure, %origin, "profile: refresh failed, serving cached copy");
                let note = match origin {
                    ProfileOrigin::Kept(_) => kept_note(entry.created_at, &failure),
                    _ => stale_note(entry.created_at, Utc::now(), &failure),
                };
                return Ok(ResolvedProfile {
                    handle: handle.to_string(),
                    profile,
                    origin,
                    storage: None,
                    note: Some(note),
                });
            }
        }

        Err(ProfileError::Unavailable {
            handle: handle.to_string(),
            reason: failure,
        })
    }

    /// Profile mode returns the stored profile; corpus mode analyzes the
    /// stored posts.
    fn profile_from(&self, entry: &CacheEntry) -> Option<StyleProfile> {
        match &entry.payload {
            CachedPayload::Profile(profile) => Some(profile.clone()),
            CachedPayload::Corpus { tweets } => analyze(tweets).ok(),
        }
    }
}

fn stale_note(created_at: DateTime<Utc>, now: DateTime<Utc>, reason: &str) -> String {
    let hours = (now - created_at).num_hours();
    format!(
        "Note: showing a cached profile from {} ({hours}h old) because refreshing failed: {reason}",
        created_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn kept_note(created_at: DateTime<Utc>, reason: &str) -> String {
    format!(
        "Note: refresh failed, keeping the cached profile from {}: {reason}",
        created_at.format("%Y-%m-%d %H:%M UTC"),
    )
}
