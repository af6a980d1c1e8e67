pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheMode, Config, ConfigSummary, MAX_TWEET_COUNT};
pub use error::ConfigError;
pub use types::*;
