use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rule::Rule;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Default field projection requested from the stream endpoint. Only
/// `id` and `text` survive into the output; the rest is available to
/// anyone widening [`crate::StreamRecord`].
const DEFAULT_TWEET_FIELDS: &str =
    "author_id,conversation_id,created_at,entities,geo,id,in_reply_to_user_id,lang,text";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bearer token for the upstream API. Absence is fatal before the
    /// streaming phase starts.
    pub bearer_token: Option<String>,
    pub stream_url: String,
    pub rules_url: String,
    /// `tweet.fields` query parameter sent on the stream request.
    pub tweet_fields: String,
    /// Per-chunk inactivity window; the transport drops the connection
    /// when no data arrives for this long.
    pub read_timeout_secs: u64,
    /// Sentinel file whose presence requests shutdown.
    pub stop_file: PathBuf,
    /// JSON file holding the desired rule set.
    pub rules_file: PathBuf,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            bearer_token: env_opt("BEARER_TOKEN"),
            stream_url: env_or(
                "FILTERFEED_STREAM_URL",
                "https://api.twitter.com/2/tweets/search/stream",
            ),
            rules_url: env_or(
                "FILTERFEED_RULES_URL",
                "https://api.twitter.com/2/tweets/search/stream/rules",
            ),
            tweet_fields: env_or("FILTERFEED_TWEET_FIELDS", DEFAULT_TWEET_FIELDS),
            read_timeout_secs: env_u64("FILTERFEED_READ_TIMEOUT_SECS", 20),
            stop_file: PathBuf::from(env_or("FILTERFEED_STOP_FILE", "./stop")),
            rules_file: PathBuf::from(env_or("FILTERFEED_RULES_FILE", "./rules.json")),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub fn bearer_token(&self) -> Result<&str, ConfigError> {
        self.bearer_token
            .as_deref()
            .ok_or(ConfigError::MissingToken)
    }

    /// Print a redacted summary for startup logs (never the token).
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  stream_url:  {}", self.stream_url);
        tracing::info!("  rules_url:   {}", self.rules_url);
        tracing::info!("  rules_file:  {}", self.rules_file.display());
        tracing::info!("  stop_file:   {}", self.stop_file.display());
        tracing::info!("  read_timeout: {}s", self.read_timeout_secs);
        tracing::info!(
            "  bearer_token: {}",
            if self.is_configured() { "set" } else { "(missing)" }
        );
    }
}

/// Load the desired rule set from a JSON file: an array of
/// `{"value": ..., "tag": ...}` objects.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::RulesParse {
        path: path.to_path_buf(),
        source,
    })
}
