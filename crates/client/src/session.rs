//! One long-lived connection to the stream endpoint.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};

use filterfeed_core::StreamRecord;

use crate::error::FeedError;
use crate::signal::StopSignal;
use crate::sink::RecordSink;
use crate::supervisor::StreamRunner;
use crate::CLIENT_USER_AGENT;

/// Issues the streaming GET and turns the chunked response body into
/// records for the sink, one chunk at a time and in arrival order.
pub struct StreamSession {
    client: reqwest::Client,
    stream_url: String,
    bearer_token: String,
    tweet_fields: String,
}

impl StreamSession {
    /// `read_timeout` bounds per-chunk inactivity: when no data (not
    /// even a heartbeat) arrives within the window, the transport drops
    /// the connection and the supervisor takes over.
    pub fn new(
        stream_url: String,
        bearer_token: String,
        tweet_fields: String,
        read_timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .read_timeout(read_timeout)
            .build()?;
        Ok(Self {
            client,
            stream_url,
            bearer_token,
            tweet_fields,
        })
    }

    async fn consume(
        &self,
        sink: &mut dyn RecordSink,
        stop: &dyn StopSignal,
    ) -> Result<(), FeedError> {
        let response = self
            .client
            .get(&self.stream_url)
            .query(&[("tweet.fields", self.tweet_fields.as_str())])
            .bearer_auth(&self.bearer_token)
            .header(reqwest::header::USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        debug!("stream connected");

        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            handle_chunk(&chunk, sink, stop)?;
        }

        debug!("stream closed by upstream");
        Ok(())
    }
}

#[async_trait]
impl StreamRunner for StreamSession {
    /// Connect and consume chunks until the transport ends or the stop
    /// signal is observed. `session_complete` runs on every exit path
    /// so trailing framing is always emitted.
    async fn run(&self, sink: &mut dyn RecordSink, stop: &dyn StopSignal) -> Result<(), FeedError> {
        let result = self.consume(sink, stop).await;
        sink.session_complete()?;
        result
    }
}

/// Handle one delivered chunk, then sample the stop signal.
///
/// Malformed chunks are logged and skipped rather than ending the
/// session; only the stop signal escalates to termination. Chunks whose
/// parsed form has no `data` field are heartbeats and skipped silently.
fn handle_chunk(
    chunk: &[u8],
    sink: &mut dyn RecordSink,
    stop: &dyn StopSignal,
) -> Result<(), FeedError> {
    match serde_json::from_slice::<serde_json::Value>(chunk) {
        Ok(parsed) => match parsed.get("data") {
            Some(data) if !data.is_null() => {
                match serde_json::from_value::<StreamRecord>(data.clone()) {
                    Ok(record) => sink.write_record(&record)?,
                    Err(e) => {
                        warn!(error = %e, "data object not projectable to {{id, text}}; skipping")
                    }
                }
            }
            _ => {} // heartbeat
        },
        Err(e) => {
            warn!(
                chunk = %String::from_utf8_lossy(chunk),
                error = %e,
                "unable to parse chunk"
            );
        }
    }

    if stop.is_stopped() {
        return Err(FeedError::StopRequested);
    }
    Ok(())
}
