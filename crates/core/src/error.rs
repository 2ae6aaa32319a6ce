use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, raised before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing bearer token: set BEARER_TOKEN (or put it in .env)")]
    MissingToken,

    #[error("failed to read rules file {}: {source}", path.display())]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules file {}: {source}", path.display())]
    RulesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
