// PostSource: the upstream paginated post feed behind one trait.
//
// TwitterApiClient is the production implementation; tests use
// `testing::ScriptedSource`.

use async_trait::async_trait;
use serde_json::Value;

use twitter_api_client::{TimelinePage, TwitterApiClient, TwitterApiError};

/// One page of raw upstream records plus the cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub tweets: Vec<Value>,
    pub next_cursor: Option<String>,
}

impl From<TimelinePage> for PostPage {
    fn from(page: TimelinePage) -> Self {
        Self {
            tweets: page.tweets,
            next_cursor: page.next_cursor,
        }
    }
}

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the page at `cursor` (empty for the first page).
    async fn fetch_page(&self, handle: &str, cursor: &str) -> Result<PostPage, TwitterApiError>;
}

#[async_trait]
impl PostSource for TwitterApiClient {
    async fn fetch_page(&self, handle: &str, cursor: &str) -> Result<PostPage, TwitterApiError> {
        Ok(self.last_tweets(handle, cursor).await?.into())
    }
}
