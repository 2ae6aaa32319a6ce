use thiserror::Error;

use filterfeed_core::ConfigError;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Non-success HTTP status from the upstream service, with the
    /// response body kept for diagnostics.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse upstream response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not a failure: the stop signal was observed. Unwound as an error
    /// so the framer's completion logic runs on every code path.
    #[error("stop requested")]
    StopRequested,
}

impl FeedError {
    /// True when the supervisor should treat this as a clean shutdown
    /// rather than a retryable disconnect.
    pub fn is_stop(&self) -> bool {
        matches!(self, FeedError::StopRequested)
    }
}
