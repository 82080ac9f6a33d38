//! Concord daemon: hosts the governance engine over a recorded call stream.

mod config;
mod replay;

use anyhow::Context;
use clap::Parser;
use concord_types::{GovernanceParams, SystemClock};
use concord_utils::{format_duration, init_tracing, LogFormat};
use config::GenesisConfig;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "concord-daemon", about = "Concord governance engine host")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the genesis file's value, then "info".
    #[arg(long, env = "CONCORD_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CONCORD_LOG_FORMAT", global = true)]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Build an engine from a genesis file and apply a JSON-lines call stream.
    Replay {
        /// Path to the TOML genesis file.
        #[arg(long, env = "CONCORD_GENESIS")]
        genesis: PathBuf,

        /// Path to the call stream, one JSON object per line.
        #[arg(long)]
        calls: PathBuf,

        /// Abort on the first rejected call instead of skipping it.
        #[arg(long, env = "CONCORD_STRICT")]
        strict: bool,

        /// Write the final engine snapshot (bincode) to this path.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
    /// Print the effective governance parameters as TOML.
    Params {
        /// Genesis file to read parameters from; defaults apply without one.
        #[arg(long, env = "CONCORD_GENESIS")]
        genesis: Option<PathBuf>,
    },
}

impl Command {
    fn genesis_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Replay { genesis, .. } => Some(genesis),
            Command::Params { genesis } => genesis.as_ref(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let genesis = cli
        .command
        .genesis_path()
        .map(|path| GenesisConfig::from_toml_file(path))
        .transpose()?;

    let log_level = cli
        .log_level
        .or_else(|| genesis.as_ref().map(|g| g.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let log_format: LogFormat = cli
        .log_format
        .or_else(|| genesis.as_ref().map(|g| g.log_format.clone()))
        .as_deref()
        .unwrap_or("human")
        .parse()?;
    init_tracing(&log_level, log_format)?;

    match cli.command {
        Command::Replay {
            genesis: path,
            calls,
            strict,
            snapshot_out,
        } => {
            let config = genesis.context("genesis file is required for replay")?;
            tracing::info!(genesis = %path.display(), "loaded genesis");
            let mut engine = replay::genesis_engine(&config)?;

            let input = std::fs::read_to_string(&calls)
                .with_context(|| format!("reading call stream {}", calls.display()))?;
            let calls = replay::parse_calls(&input)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let summary = replay::replay(&mut engine, calls, &SystemClock, strict, &mut out)?;
            replay::write_events(&engine, &mut out)?;
            out.flush()?;

            if let Some(path) = snapshot_out {
                let bytes = engine.snapshot().to_bytes()?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("writing snapshot {}", path.display()))?;
                tracing::info!(snapshot = %path.display(), "snapshot written");
            }

            tracing::info!(
                applied = summary.applied,
                rejected = summary.rejected,
                events = engine.events().len(),
                pending = engine.proposals().pending().count(),
                supply = %engine.total_supply(),
                "replay finished"
            );
        }
        Command::Params { .. } => {
            let params = genesis.map(|g| g.params).unwrap_or_else(GovernanceParams::default);
            println!(
                "# voting window: {}",
                format_duration(params.voting_duration_secs)
            );
            print!("{}", params.to_toml_string()?);
        }
    }

    Ok(())
}
