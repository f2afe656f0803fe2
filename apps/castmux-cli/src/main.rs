//! Castmux CLI - replays client traffic through a Cast session router.
//!
//! The binary builds one session router on top of a simulated receiver, feeds
//! it the envelopes and directives of a script, and prints every delegate
//! event to stdout as one JSON line. It is meant for debugging client
//! protocols without a real Cast device.

mod config;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use castmux_core::{
    CastSessionRouter, ChannelRouteDelegate, LoggingRouteDelegate, SessionState,
    SimulatedTransport, TokioSpawner,
};
use clap::Parser;

use crate::config::CliConfig;
use crate::script::{parse_script, ScriptStep};

/// Extra time granted to an in-flight stop beyond the configured delay.
const STOP_GRACE: Duration = Duration::from_secs(1);

/// Castmux CLI - Replay client envelopes against a simulated Cast session.
#[derive(Parser, Debug)]
#[command(name = "castmux-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the session configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-lines script to replay. Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "CASTMUX_LOG_LEVEL")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the event stream.
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Castmux CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let descriptor = config.to_session_descriptor();
    descriptor
        .validate()
        .context("Invalid session configuration")?;

    let text = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read script from stdin")?,
    };
    let steps = parse_script(&text).context("Failed to parse script")?;

    log::info!(
        "Session {} on {} (route {}, {} steps)",
        descriptor.session_id,
        descriptor.sink.friendly_name,
        descriptor.route_id,
        steps.len()
    );

    let transport = Arc::new(
        SimulatedTransport::new(&config.status_text, config.application_metadata())
            .with_stop_delay(config.stop_delay())
            .with_volume(config.sink.receiver_volume())
            .with_active_input(config.sink.active_input),
    );
    let (delegate, mut events) = ChannelRouteDelegate::new();
    delegate.set_inner_delegate(Arc::new(LoggingRouteDelegate));

    let router = CastSessionRouter::new(
        descriptor,
        transport.clone(),
        Arc::new(delegate),
        Arc::new(TokioSpawner::current()),
    );

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => log::warn!("Failed to serialize event: {}", e),
            }
        }
    });

    let mut callback_id = 0;
    for step in steps {
        match step {
            ScriptStep::Envelope(envelope) => {
                callback_id += 1;
                router.send_string_message(&envelope, callback_id);
            }
            ScriptStep::Refresh => router.update_session_status(),
            ScriptStep::Close => router.close(),
            ScriptStep::Status(status) => transport.set_application_status(status),
            ScriptStep::Receive { namespace, message } => {
                if !transport.inject(&namespace, &message) {
                    log::warn!("No listener registered for namespace {}", namespace);
                }
            }
        }
        // Let transport completions land before the next step.
        tokio::task::yield_now().await;
    }

    wait_for_stop(&router, config.stop_delay() + STOP_GRACE).await;

    log::info!(
        "Replay finished: {} messages sent to the receiver, {} stop requests",
        transport.sent_messages().len(),
        transport.stop_calls().len()
    );

    // Dropping the router drops the delegate, which ends the event stream.
    drop(router);
    printer.await.context("Event printer failed")?;

    Ok(())
}

/// Waits until a pending `close()` has torn the session down, or `limit` elapses.
async fn wait_for_stop(router: &CastSessionRouter, limit: Duration) {
    let closed = tokio::time::timeout(limit, async {
        while router.state() == SessionState::Closing {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    if closed.is_err() {
        log::warn!("Application stop still pending after {:?}", limit);
    }
}
