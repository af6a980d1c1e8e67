// Test doubles for the archive boundaries.
//
// - ScriptedSource (PostSource): scripted pages, failing pages, or an
//   endless timeline; records every request.
// - MemoryStore (ProfileStore): in-memory append-only table that can be
//   switched into a failing mode.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use twitter_api_client::TwitterApiError;
use voiceprint_common::{
    Capitalization, Formality, Level, Metrics, PersonalityType, PunctuationPatterns,
    StyleAssessment, StyleProfile, StyleSignature, Tone, WritingStyle,
};

use crate::error::{ArchiveError, Result};
use crate::source::{PostPage, PostSource};
use crate::store::{ProfileStore, StoredProfile};

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

enum Script {
    Pages(Mutex<VecDeque<Option<PostPage>>>),
    /// Every page returns `per_page` posts and a non-empty cursor.
    Endless { per_page: usize },
}

/// Builder: `.page(tweets, cursor)`, `.failing_page()`, or `::endless(n)`.
/// Once a script runs out it answers with empty pages.
pub struct ScriptedSource {
    script: Script,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            script: Script::Pages(Mutex::new(VecDeque::new())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn endless(per_page: usize) -> Self {
        Self {
            script: Script::Endless { per_page },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A single page followed by nothing, built from plain texts.
    pub fn with_texts(texts: &[&str]) -> Self {
        let tweets = texts
            .iter()
            .enumerate()
            .map(|(i, text)| json!({"id": i.to_string(), "text": text}))
            .collect();
        Self::new().page(tweets, None)
    }

    pub fn page(self, tweets: Vec<Value>, next_cursor: Option<&str>) -> Self {
        self.push(Some(PostPage {
            tweets,
            next_cursor: next_cursor.map(str::to_string),
        }))
    }

    pub fn failing_page(self) -> Self {
        self.push(None)
    }

    fn push(self, page: Option<PostPage>) -> Self {
        if let Script::Pages(pages) = &self.script {
            pages.lock().unwrap().push_back(page);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(handle, cursor)` for every request, in order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostSource for ScriptedSource {
    async fn fetch_page(
        &self,
        handle: &str,
        cursor: &str,
    ) -> std::result::Result<PostPage, TwitterApiError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((handle.to_string(), cursor.to_string()));
            requests.len()
        };

        match &self.script {
            Script::Endless { per_page } => Ok(PostPage {
                tweets: (0..*per_page)
                    .map(|i| json!({"id": format!("{call}-{i}"), "text": format!("page {call} post {i}")}))
                    .collect(),
                next_cursor: Some(format!("cursor-{call}")),
            }),
            Script::Pages(pages) => match pages.lock().unwrap().pop_front() {
                Some(Some(page)) => Ok(page),
                Some(None) => Err(TwitterApiError::Api {
                    status: 503,
                    message: "scripted failure".to_string(),
                }),
                None => Ok(PostPage::default()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredProfile>>,
    failing: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw record directly, bypassing validation.
    pub fn seed(&self, handle: &str, payload: Value, created_at: DateTime<Utc>) {
        self.records.lock().unwrap().push(StoredProfile {
            id: Uuid::new_v4(),
            handle: handle.to_string(),
            payload,
            created_at,
        });
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn records_for(&self, handle: &str) -> Vec<StoredProfile> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.handle == handle)
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(ArchiveError::Storage("MemoryStore: failing".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn insert(&self, record: &StoredProfile) -> Result<()> {
        self.check()?;
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn latest_by_handle(&self, handle: &str) -> Result<Option<StoredProfile>> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.handle == handle)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A structurally complete profile with plausible values.
pub fn sample_profile() -> StyleProfile {
    StyleProfile {
        metrics: Metrics {
            tweet_count: 20,
            avg_length: 84.5,
            hashtag_usage: 0.4,
            mention_usage: 0.3,
            exclamation_frequency: 0.15,
            question_frequency: 0.1,
        },
        style_assessment: StyleAssessment {
            formality: Formality::Casual,
            tone: Tone::Assertive,
            hashtag_frequency: Level::Low,
            engagement: Level::Low,
            capitalization: Capitalization::Normal,
        },
        style_signature: StyleSignature {
            writing_style: WritingStyle {
                avg_sentence_length: 9.2,
                emoji_usage: 0.05,
                punctuation_patterns: PunctuationPatterns {
                    exclamations: 3,
                    questions: 2,
                    ellipses: 1,
                    caps_words: 0,
                },
                capitalization_style: Capitalization::Normal,
                word_richness: 0.71,
            },
            content_focus: vec!["tech".to_string()],
            signature_traits: vec![],
            personality_type: PersonalityType::Poster,
        },
        example_tweets: vec![
            "Shipping the new build today.".to_string(),
            "Anyone else up this early?".to_string(),
        ],
        analyzed_at: Utc::now(),
    }
}
