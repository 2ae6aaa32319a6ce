//! Reconnect supervision with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::signal::StopSignal;
use crate::sink::RecordSink;

/// Sleep abstraction so backoff timing is testable without real waits.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Tokio-backed sleeper used outside tests.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One streaming attempt. Implemented by [`crate::StreamSession`];
/// test doubles stand in for it to exercise the supervisor alone.
#[async_trait]
pub trait StreamRunner: Send + Sync {
    async fn run(&self, sink: &mut dyn RecordSink, stop: &dyn StopSignal) -> Result<(), FeedError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Connecting,
    Streaming,
    Backoff,
    Stopped,
}

/// Retry loop around the stream session.
///
/// The backoff before the Nth reconnect is `2^(N-1)` seconds and
/// `attempt` is never reset within one process: reconnects later in the
/// process lifetime wait at least as long as earlier ones, even after
/// long healthy streaming periods. There is no attempt cap and no
/// backoff ceiling; both are the reference policy, kept on purpose.
pub struct Supervisor<'a> {
    stop: &'a dyn StopSignal,
    sleeper: &'a dyn Sleeper,
    attempt: u32,
}

impl<'a> Supervisor<'a> {
    pub fn new(stop: &'a dyn StopSignal, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            stop,
            sleeper,
            attempt: 0,
        }
    }

    /// Reconnect attempts made so far. Monotonically non-decreasing.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Drive sessions until the stop signal is honored.
    ///
    /// Opens the sink before the first connection attempt and closes it
    /// when the terminal state is reached, on every path.
    pub async fn run(
        &mut self,
        runner: &dyn StreamRunner,
        sink: &mut dyn RecordSink,
    ) -> Result<(), FeedError> {
        sink.open()?;

        let mut state = State::Connecting;
        loop {
            state = match state {
                State::Connecting => {
                    if self.stop.is_stopped() {
                        info!("stop signal present; not connecting");
                        State::Stopped
                    } else {
                        State::Streaming
                    }
                }
                State::Streaming => match runner.run(sink, self.stop).await {
                    Err(FeedError::StopRequested) => {
                        info!("stop requested during streaming");
                        State::Stopped
                    }
                    Err(e) => {
                        warn!(attempt = self.attempt, error = %e, "stream disconnected");
                        State::Backoff
                    }
                    Ok(()) => {
                        warn!(attempt = self.attempt, "stream ended");
                        State::Backoff
                    }
                },
                State::Backoff => {
                    let delay = Duration::from_secs(2u64.saturating_pow(self.attempt));
                    info!(
                        attempt = self.attempt,
                        seconds = delay.as_secs(),
                        "sleeping before reconnect"
                    );
                    self.sleeper.sleep(delay).await;
                    self.attempt += 1;
                    State::Connecting
                }
                State::Stopped => {
                    sink.close()?;
                    info!("supervisor stopped");
                    return Ok(());
                }
            };
        }
    }
}
