//! simtrace - replay training-loop events through a metrics session
//!
//! ## Commands
//!
//! - `replay`: feed a JSON-lines event log through a session, publishing
//!   episode batches and checkpoint stats under a local directory
//! - `best`: print the published best/last checkpoint record

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use simtrace_core::obs::SessionSpan;
use simtrace_core::{
    channel, run_session, MetricsSession, SessionConfig, SessionSummary, SimEvent, SystemClock,
    VideoMetricsSnapshot,
};
use simtrace_store::{FsCheckpointSource, FsMetricsPublisher};

/// Events buffered between the log reader and the session.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "simtrace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Episode metrics and best-checkpoint selection for RL training loops", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event log through a metrics session
    Replay(ReplayArgs),

    /// Print the published best/last checkpoint record
    Best {
        /// Directory the session published into
        #[arg(long, env = "SIMTRACE_OUT")]
        out: PathBuf,

        /// Session config file (JSON); locates the model record
        #[arg(long, env = "SIMTRACE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct ReplayArgs {
    /// Event log, one JSON event per line
    #[arg(long)]
    events: PathBuf,

    /// Directory to publish metrics and checkpoint records into
    #[arg(long, env = "SIMTRACE_OUT")]
    out: PathBuf,

    /// Session config file (JSON); flags below override it
    #[arg(long, env = "SIMTRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Agent name
    #[arg(long, env = "SIMTRACE_AGENT")]
    agent: Option<String>,

    /// Count resets across the whole race instead of per lap
    #[arg(long, env = "SIMTRACE_CONTINUOUS")]
    continuous: bool,

    /// Disable best-checkpoint selection
    #[arg(long, env = "SIMTRACE_NO_MODEL_PICKER")]
    no_model_picker: bool,

    /// Directory holding the checkpoint state file (default: <out>/checkpoint)
    #[arg(long, env = "SIMTRACE_CHECKPOINT_DIR")]
    checkpoint_dir: Option<PathBuf>,

    /// Write per-phase sim-trace CSV files under this directory
    #[arg(long, env = "SIMTRACE_DIR")]
    simtrace_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    simtrace_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Replay(args) => {
            let report = cmd_replay(&args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Best { out, config } => {
            let record = cmd_best(&out, config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
    }
}

/// Read a session config file, or fall back to defaults.
fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {:?}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Config is not a valid session config: {:?}", path))
        }
        None => Ok(SessionConfig::default()),
    }
}

/// Config file values with command-line overrides applied.
fn resolve_config(args: &ReplayArgs) -> Result<SessionConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(agent) = &args.agent {
        config.agent_name = agent.clone();
    }
    if args.continuous {
        config.continuous = true;
    }
    if args.no_model_picker {
        config.use_model_picker = false;
    }
    if let Some(dir) = &args.simtrace_dir {
        config.simtrace_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Parse an event log. Blank lines are skipped.
fn read_events(path: &Path) -> Result<Vec<SimEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log: {:?}", path))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid event on line {} of {:?}", i + 1, path))
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    agent: String,
    summary: SessionSummary,
    best_checkpoint: simtrace_core::CheckpointStats,
    last_checkpoint: Option<simtrace_core::CheckpointStats>,
    video_metrics: VideoMetricsSnapshot,
}

async fn cmd_replay(args: &ReplayArgs) -> Result<ReplayReport> {
    let config = resolve_config(args)?;
    let events = read_events(&args.events)?;
    let checkpoint_dir = args
        .checkpoint_dir
        .clone()
        .unwrap_or_else(|| args.out.join("checkpoint"));

    let publisher = Arc::new(
        FsMetricsPublisher::new(&args.out)
            .with_context(|| format!("Failed to prepare output directory: {:?}", args.out))?,
    );
    let checkpoints = Arc::new(FsCheckpointSource::new(&checkpoint_dir));
    let mut session = MetricsSession::new(config, publisher, checkpoints, Arc::new(SystemClock))
        .context("Failed to start metrics session")?;
    let video = session.video_metrics();

    info!(events = events.len(), checkpoint_dir = ?checkpoint_dir, "replaying event log");
    let (notifier, rx) = channel(EVENT_CHANNEL_CAPACITY);
    let producer = tokio::spawn(async move {
        for event in events {
            notifier.send(event).await?;
        }
        Ok::<_, simtrace_core::MetricsError>(())
    });

    let outcome = run_session(&mut session, rx).await;
    // The producer only fails once the session has stopped reading.
    let summary = outcome.context("Replay stopped")?;
    producer
        .await
        .context("Event producer panicked")?
        .context("Event producer failed")?;

    Ok(ReplayReport {
        agent: session.config().agent_name.clone(),
        summary,
        best_checkpoint: session.best().clone(),
        last_checkpoint: session.last().cloned(),
        video_metrics: video.snapshot(),
    })
}

fn cmd_best(out: &Path, config: Option<&Path>) -> Result<Value> {
    let config = load_config(config)?;
    let _span = SessionSpan::enter(&config.agent_name);
    let store = FsMetricsPublisher::new(out)
        .with_context(|| format!("Failed to open output directory: {:?}", out))?;
    let path = store.object_path(&config.model_destination);
    let record = store
        .read_object(&config.model_destination)
        .with_context(|| format!("Failed to read checkpoint record: {:?}", path))?
        .with_context(|| format!("No checkpoint record at {:?}", path))?;
    info!(path = ?path, "loaded checkpoint record");
    Ok(record)
}
