use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TwitterApiError};

/// One page of a user's timeline.
///
/// Tweets are kept as raw JSON: the endpoint's record schema has drifted
/// across revisions, and canonicalising them is the caller's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelinePage {
    pub tweets: Vec<Value>,
    /// `None` when the endpoint signalled the last page (absent, empty, or
    /// `has_next_page: false`).
    pub next_cursor: Option<String>,
}

/// Envelope fields that may appear at the top level or nested under `data`.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "msg")]
    error: Option<String>,
    #[serde(default)]
    tweets: Option<Vec<Value>>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: Option<bool>,
    #[serde(default)]
    data: Option<NestedData>,
}

#[derive(Debug, Default, Deserialize)]
struct NestedData {
    #[serde(default)]
    tweets: Option<Vec<Value>>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: Option<bool>,
}

impl TimelinePage {
    /// Decode a response body, probing both tolerated shapes:
    /// `{tweets, next_cursor}` and `{data: {tweets, next_cursor}}`.
    pub fn from_value(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(TwitterApiError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&body)
            )));
        }

        let envelope: Envelope = serde_json::from_value(body)?;

        if envelope.status.as_deref() == Some("error") {
            let message = envelope
                .message
                .or(envelope.error)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(TwitterApiError::Upstream(message));
        }

        let nested = envelope.data.unwrap_or_default();
        let tweets = envelope.tweets.or(nested.tweets).unwrap_or_default();
        let has_next = envelope.has_next_page.or(nested.has_next_page).unwrap_or(true);
        let next_cursor = envelope
            .next_cursor
            .or(nested.next_cursor)
            .filter(|c| has_next && !c.is_empty());

        Ok(Self {
            tweets,
            next_cursor,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
