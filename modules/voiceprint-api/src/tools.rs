use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use voiceprint_archive::WriteStatus;
use voiceprint_common::{cache_key, clean_handle, ConfigError, ConfigSummary};
use voiceprint_style::{generation_prompt, render_single};

use crate::profiles::{ProfileService, ResolvedProfile};

/// Most voices a single generate_post request may blend.
pub const MAX_VOICES: usize = 5;

/// Text payload plus error flag. Every tool call ends in one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeProfileArgs {
    pub username: String,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePostArgs {
    pub usernames: Vec<String>,
    pub topic: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    #[serde(flatten)]
    summary: ConfigSummary,
    cache_size: usize,
}

/// The tool surface in normal operation.
pub struct Toolbox {
    profiles: ProfileService,
    config: ConfigSummary,
}

impl Toolbox {
    pub fn new(profiles: ProfileService, config: ConfigSummary) -> Self {
        Self { profiles, config }
    }

    pub async fn analyze_profile(&self, args: AnalyzeProfileArgs) -> ToolOutput {
        let resolved = match self.profiles.resolve(&args.username, args.force_refresh).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(username = %args.username, error = %e, "analyze_profile failed");
                return ToolOutput::error(e.to_string());
            }
        };

        match args.format {
            OutputFormat::Json => match serde_json::to_string_pretty(&resolved.profile) {
                Ok(json) => ToolOutput::ok(json),
                Err(e) => ToolOutput::error(format!("Failed to encode profile: {e}")),
            },
            OutputFormat::Summary => ToolOutput::ok(summary_text(&resolved)),
        }
    }

    pub async fn generate_post(&self, args: GeneratePostArgs) -> ToolOutput {
        let topic = args.topic.trim();
        if topic.is_empty() {
            return ToolOutput::error("A topic is required.");
        }

        let mut seen = HashSet::new();
        let handles: Vec<&str> = args
            .usernames
            .iter()
            .map(|u| clean_handle(u))
            .filter(|h| !h.is_empty())
            .filter(|h| seen.insert(cache_key(h)))
            .collect();

        if handles.is_empty() {
            return ToolOutput::error("At least one username is required.");
        }
        if handles.len() > MAX_VOICES {
            return ToolOutput::error(format!(
                "At most {MAX_VOICES} usernames can be blended; got {}.",
                handles.len()
            ));
        }

        let mut resolved = Vec::with_capacity(handles.len());
        for handle in &handles {
            match self.profiles.resolve(handle, false).await {
                Ok(profile) => resolved.push(profile),
                Err(e) => {
                    warn!(handle, error = %e, "generate_post: profile unavailable");
                    return ToolOutput::error(e.to_string());
                }
            }
        }

        let voices: Vec<(&str, &voiceprint_common::StyleProfile)> = resolved
            .iter()
            .map(|r| (r.handle.as_str(), &r.profile))
            .collect();

        info!(voices = voices.len(), topic, "generate_post: prompt built");
        ToolOutput::ok(generation_prompt(&voices, topic))
    }

    pub async fn check_config(&self) -> ToolOutput {
        let mut summary = self.config.clone();
        summary.database_enabled = self.profiles.cache().database_enabled();
        let report = ConfigReport {
            summary,
            cache_size: self.profiles.cache().len().await,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => ToolOutput::ok(json),
            Err(e) => ToolOutput::error(format!("Failed to encode config: {e}")),
        }
    }
}

fn summary_text(resolved: &ResolvedProfile) -> String {
    let mut header = format!("Profile for @{} (source: {}", resolved.handle, resolved.origin);
    if let Some(storage) = &resolved.storage {
        header.push_str(&format!(", stored in {}", storage.storage));
        if storage.status == WriteStatus::Partial {
            header.push_str(", durable write failed");
        }
    }
    header.push(')');

    let mut parts = vec![header];
    if let Some(note) = &resolved.note {
        parts.push(note.clone());
    }
    parts.push(render_single(&resolved.handle, &resolved.profile));
    parts.join("\n\n")
}

/// What the server exposes: the full toolbox, or only setup help when the
/// configuration could not be loaded.
pub enum Tools {
    Ready(Arc<Toolbox>),
    Setup(ConfigError),
}

impl Tools {
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        match self {
            Tools::Ready(_) => vec![
                ToolDefinition {
                    name: "analyze_profile".to_string(),
                    description: "Analyze a user's recent posts and return their style profile. \
                                  Served from cache when fresh."
                        .to_string(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "username": {
                                "type": "string",
                                "description": "Handle to analyze, with or without a leading @"
                            },
                            "force_refresh": {
                                "type": "boolean",
                                "description": "Ignore a fresh cache entry and re-fetch",
                                "default": false
                            },
                            "format": {
                                "type": "string",
                                "enum": ["summary", "json"],
                                "default": "summary"
                            }
                        },
                        "required": ["username"]
                    }),
                },
                ToolDefinition {
                    name: "generate_post".to_string(),
                    description: format!(
                        "Build a writing prompt for a post on a topic in the voice of one user, \
                         or a blend of up to {MAX_VOICES} users."
                    ),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "usernames": {
                                "type": "array",
                                "items": { "type": "string" },
                                "minItems": 1,
                                "maxItems": MAX_VOICES,
                                "description": "Handles whose voices to blend"
                            },
                            "topic": {
                                "type": "string",
                                "description": "What the post should be about"
                            }
                        },
                        "required": ["usernames", "topic"]
                    }),
                },
                ToolDefinition {
                    name: "check_config".to_string(),
                    description: "Report which integrations are configured and the cache size."
                        .to_string(),
                    parameters: serde_json::json!({ "type": "object", "properties": {} }),
                },
            ],
            Tools::Setup(_) => vec![ToolDefinition {
                name: "setup_instructions".to_string(),
                description: "The server is not configured. Explains which environment \
                              variables to set."
                    .to_string(),
                parameters: serde_json::json!({ "type": "object", "properties": {} }),
            }],
        }
    }

    /// `None` when no tool by that name is exposed.
    pub async fn call(&self, name: &str, args: Value) -> Option<ToolOutput> {
        match (self, name) {
            (Tools::Ready(tools), "analyze_profile") => Some(match decode(name, args) {
                Ok(args) => tools.analyze_profile(args).await,
                Err(output) => output,
            }),
            (Tools::Ready(tools), "generate_post") => Some(match decode(name, args) {
                Ok(args) => tools.generate_post(args).await,
                Err(output) => output,
            }),
            (Tools::Ready(tools), "check_config") => Some(tools.check_config().await),
            (Tools::Setup(error), "setup_instructions") => Some(setup_instructions(error)),
            _ => None,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(args)
        .map_err(|e| ToolOutput::error(format!("Invalid arguments for {tool}: {e}")))
}

pub fn setup_instructions(error: &ConfigError) -> ToolOutput {
    let offending = match error {
        ConfigError::MissingCredential(var) => format!("{var}=<value>            (required)"),
        ConfigError::Invalid { var, value } => {
            format!("{var}=<value>            (currently \"{value}\", not accepted)")
        }
    };
    ToolOutput::error(format!(
        r#"Voiceprint is not configured: {error}.

Set the following environment variables and restart the server:

  {offending}
  TWITTER_API_BASE_URL=...    optional, defaults to https://api.twitterapi.io
  DATABASE_URL=postgres://... optional, enables the durable profile cache
  VOICEPRINT_CACHE_MODE=profile|corpus
  VOICEPRINT_CACHE_TTL_HOURS=24
  VOICEPRINT_TWEET_COUNT=100  (1-100)"#
    ))
}
