use twitter_api_client::TwitterApiError;

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Upstream fetch failed for @{handle}: {source}")]
    Upstream {
        handle: String,
        #[source]
        source: TwitterApiError,
    },

    #[error("No posts found for @{0}")]
    EmptyCorpus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Payload encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
