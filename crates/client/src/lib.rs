//! Resilient filtered-stream client: rule reconciliation, the long-lived
//! streaming session, reconnect supervision with exponential backoff, and
//! JSON-array framing of the output.

pub mod error;
pub mod reconcile;
pub mod rules;
pub mod session;
pub mod signal;
pub mod sink;
pub mod supervisor;

pub use error::FeedError;
pub use reconcile::reconcile;
pub use rules::{HttpRuleStore, RuleStore};
pub use session::StreamSession;
pub use signal::{FileStopSignal, FlagStopSignal, StopSignal};
pub use sink::{JsonArrayFramer, RecordSink};
pub use supervisor::{Sleeper, StreamRunner, Supervisor, TokioSleeper};

/// Client identifier sent with every upstream request.
pub const CLIENT_USER_AGENT: &str = "v2FilteredStreamRust";
