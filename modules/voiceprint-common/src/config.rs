use std::env;

use serde::Serialize;

use crate::error::ConfigError;

pub const DEFAULT_TWITTER_API_BASE_URL: &str = "https://api.twitterapi.io";

/// Hard cap on posts requested per handle.
pub const MAX_TWEET_COUNT: usize = 100;

pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// What the cache stores for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Analyzer output.
    #[default]
    Profile,
    /// Normalized posts; the analyzer runs on every read.
    Corpus,
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheMode::Profile => write!(f, "profile"),
            CacheMode::Corpus => write!(f, "corpus"),
        }
    }
}

impl std::str::FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(CacheMode::Profile),
            "corpus" | "raw" => Ok(CacheMode::Corpus),
            other => Err(format!("unknown cache mode '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Upstream
    pub twitter_api_key: String,
    pub twitter_api_base_url: String,

    // Durable tier (optional)
    pub database_url: Option<String>,

    // Cache / acquisition
    pub cache_mode: CacheMode,
    pub cache_ttl_hours: i64,
    pub tweet_count: usize,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

/// Secret-free view of the configuration, used by diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub twitter_api_configured: bool,
    pub twitter_api_base_url: String,
    pub database_enabled: bool,
    pub cache_mode: CacheMode,
    pub cache_ttl_hours: i64,
    pub tweet_count: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails only when the upstream credential is absent or a numeric
    /// variable does not parse. The binary uses the error to enter setup mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let twitter_api_key =
            get("TWITTER_API_KEY").ok_or(ConfigError::MissingCredential("TWITTER_API_KEY"))?;

        let cache_mode = match get("VOICEPRINT_CACHE_MODE") {
            Some(raw) => raw.parse::<CacheMode>().map_err(|_| ConfigError::Invalid {
                var: "VOICEPRINT_CACHE_MODE",
                value: raw.clone(),
            })?,
            None => CacheMode::default(),
        };

        let cache_ttl_hours = parse_or(&get, "VOICEPRINT_CACHE_TTL_HOURS", DEFAULT_CACHE_TTL_HOURS)?;
        let tweet_count: usize = parse_or(&get, "VOICEPRINT_TWEET_COUNT", MAX_TWEET_COUNT)?;

        Ok(Self {
            twitter_api_key,
            twitter_api_base_url: get("TWITTER_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TWITTER_API_BASE_URL.to_string()),
            database_url: get("DATABASE_URL"),
            cache_mode,
            cache_ttl_hours: cache_ttl_hours.max(1),
            tweet_count: tweet_count.clamp(1, MAX_TWEET_COUNT),
            api_host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: parse_or(&get, "API_PORT", 3000)?,
        })
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            twitter_api_configured: !self.twitter_api_key.is_empty(),
            twitter_api_base_url: self.twitter_api_base_url.clone(),
            database_enabled: self.database_url.is_some(),
            cache_mode: self.cache_mode,
            cache_ttl_hours: self.cache_ttl_hours,
            tweet_count: self.tweet_count,
        }
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}
