pub mod error;
pub mod types;

pub use error::{Result, TwitterApiError};
pub use types::TimelinePage;

use std::time::Duration;

use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.twitterapi.io";

const LAST_TWEETS_PATH: &str = "/twitter/user/last_tweets";

pub struct TwitterApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TwitterApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one page of a user's most recent tweets. Pass an empty cursor for
    /// the first page and the previous page's `next_cursor` afterwards.
    pub async fn last_tweets(&self, handle: &str, cursor: &str) -> Result<TimelinePage> {
        let url = format!("{}{}", self.base_url, LAST_TWEETS_PATH);
        tracing::debug!(handle, cursor, "Requesting timeline page");

        let resp = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[("userName", handle), ("cursor", cursor)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = resp.json().await?;
        let page = TimelinePage::from_value(body)?;
        tracing::debug!(
            handle,
            count = page.tweets.len(),
            has_next = page.next_cursor.is_some(),
            "Timeline page received"
        );

        Ok(page)
    }
}
