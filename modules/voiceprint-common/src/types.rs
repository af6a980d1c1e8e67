use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Canonical post record ---

/// A post in canonical shape. Every field has a default so that upstream
/// records of any shape can be mapped without failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedPost {
    pub id: String,
    pub text: String,
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
    /// Upstream timestamp as delivered; empty when the record carried none.
    pub created_at: String,
    pub is_reply: bool,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
    pub language: String,
}

// --- Style profile ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub metrics: Metrics,
    pub style_assessment: StyleAssessment,
    pub style_signature: StyleSignature,
    pub example_tweets: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Per-post rates, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub tweet_count: usize,
    pub avg_length: f64,
    pub hashtag_usage: f64,
    pub mention_usage: f64,
    pub exclamation_frequency: f64,
    pub question_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleAssessment {
    pub formality: Formality,
    pub tone: Tone,
    pub hashtag_frequency: Level,
    pub engagement: Level,
    pub capitalization: Capitalization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSignature {
    pub writing_style: WritingStyle,
    pub content_focus: Vec<String>,
    pub signature_traits: Vec<SignatureTrait>,
    pub personality_type: PersonalityType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingStyle {
    pub avg_sentence_length: f64,
    pub emoji_usage: f64,
    pub punctuation_patterns: PunctuationPatterns,
    pub capitalization_style: Capitalization,
    pub word_richness: f64,
}

/// Corpus-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunctuationPatterns {
    pub exclamations: usize,
    pub questions: usize,
    pub ellipses: usize,
    pub caps_words: usize,
}

// --- Categorical labels ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Formal,
    Casual,
}

impl std::fmt::Display for Formality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formality::Formal => write!(f, "formal"),
            Formality::Casual => write!(f, "casual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Emphatic,
    Assertive,
    Inquisitive,
    Neutral,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Emphatic => write!(f, "emphatic"),
            Tone::Assertive => write!(f, "assertive"),
            Tone::Inquisitive => write!(f, "inquisitive"),
            Tone::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    Low,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::High => write!(f, "high"),
            Level::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capitalization {
    Emphatic,
    Normal,
}

impl std::fmt::Display for Capitalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capitalization::Emphatic => write!(f, "emphatic"),
            Capitalization::Normal => write!(f, "normal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureTrait {
    Minimalist,
    Emphatic,
    Expressive,
    Humorous,
    Connector,
}

impl std::fmt::Display for SignatureTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureTrait::Minimalist => write!(f, "minimalist"),
            SignatureTrait::Emphatic => write!(f, "emphatic"),
            SignatureTrait::Expressive => write!(f, "expressive"),
            SignatureTrait::Humorous => write!(f, "humorous"),
            SignatureTrait::Connector => write!(f, "connector"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonalityType {
    #[serde(rename = "the provocateur")]
    Provocateur,
    #[serde(rename = "the influencer")]
    Influencer,
    #[serde(rename = "the memer")]
    Memer,
    #[serde(rename = "the poet")]
    Poet,
    #[serde(rename = "the poster")]
    Poster,
}

impl std::fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonalityType::Provocateur => write!(f, "the provocateur"),
            PersonalityType::Influencer => write!(f, "the influencer"),
            PersonalityType::Memer => write!(f, "the memer"),
            PersonalityType::Poet => write!(f, "the poet"),
            PersonalityType::Poster => write!(f, "the poster"),
        }
    }
}

// --- Cache records ---

/// What a cache entry holds. Which variant gets written depends on the
/// configured [`crate::CacheMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedPayload {
    /// Analyzer output.
    Profile(StyleProfile),
    /// Raw normalized corpus; analysis happens on read.
    Corpus { tweets: Vec<NormalizedPost> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: Uuid,
    pub handle: String,
    pub payload: CachedPayload,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(handle: impl Into<String>, payload: CachedPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle: handle.into(),
            payload,
            created_at,
        }
    }
}

/// Strip whitespace and a leading `@`. Upstream calls use this form.
pub fn clean_handle(handle: &str) -> &str {
    let trimmed = handle.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}

/// Cache key for a handle. Platform handles are case-insensitive.
pub fn cache_key(handle: &str) -> String {
    clean_handle(handle).to_lowercase()
}
