//! filterfeed — stream events matching pre-configured rules to stdout.
//!
//! stdout carries exactly one JSON array of `{id, text}` records, one
//! element per matching event, flushed as they arrive. All diagnostics
//! go to stderr. Create the stop file to shut the stream down cleanly;
//! remove it again before the next run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tracing::info;

use filterfeed_client::{
    reconcile, FileStopSignal, HttpRuleStore, JsonArrayFramer, StopSignal, StreamSession,
    Supervisor, TokioSleeper,
};
use filterfeed_core::{config, Config};

/// Stream events matching pre-configured rules as a JSON array on stdout.
#[derive(Parser, Debug)]
#[command(name = "filterfeed", version, about)]
struct Cli {
    /// Delete existing upstream rules before adding the configured set,
    /// then exit without streaming.
    #[arg(long)]
    delete: bool,

    /// Path to the JSON rules file (array of {"value", "tag"} objects).
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Path of the stop sentinel; create it to request shutdown.
    #[arg(long)]
    stop_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        // stdout is the data channel; diagnostics go to stderr.
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();
    let mut cfg = Config::from_env();

    let cli = Cli::parse();
    if let Some(rules) = cli.rules {
        cfg.rules_file = rules;
    }
    if let Some(stop_file) = cli.stop_file {
        cfg.stop_file = stop_file;
    }
    cfg.log_summary();

    let stop = FileStopSignal::new(cfg.stop_file.clone());
    if stop.is_stopped() {
        bail!(
            "remove the stop file to continue: rm {}",
            stop.path().display()
        );
    }

    let token = cfg.bearer_token()?.to_string();
    let desired = config::load_rules(&cfg.rules_file)?;
    info!(
        count = desired.len(),
        path = %cfg.rules_file.display(),
        "loaded configured rules"
    );

    let store = HttpRuleStore::new(cfg.rules_url.clone(), token.clone());
    reconcile(&store, &desired, cli.delete).await?;

    // A --delete run is setup-only: reconcile and exit without streaming.
    if cli.delete || stop.is_stopped() {
        return Ok(());
    }

    let session = StreamSession::new(
        cfg.stream_url.clone(),
        token,
        cfg.tweet_fields.clone(),
        Duration::from_secs(cfg.read_timeout_secs),
    )?;

    let sleeper = TokioSleeper;
    let mut supervisor = Supervisor::new(&stop, &sleeper);
    let mut framer = JsonArrayFramer::new(std::io::stdout());
    supervisor.run(&session, &mut framer).await?;
    Ok(())
}
