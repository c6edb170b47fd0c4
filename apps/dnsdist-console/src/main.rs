//! dnsdist console client
//!
//! Runs each positional argument as one console command and prints the output.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console_client::{ConsoleConfig, SharedKey, dial};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "dnsdist-console")]
#[command(about = "Send commands to a dnsdist console")]
#[command(arg_required_else_help = true, args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    /// host:port to connect to
    #[arg(long, env = "DNSDIST_CONSOLE_HOST")]
    host: Option<String>,

    /// Shared secret for the console (base64)
    #[arg(long, env = "DNSDIST_CONSOLE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// JSON file with connection settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connect and per-command timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Largest response accepted, in bytes
    #[arg(long)]
    max_response: Option<usize>,

    /// Log protocol activity to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Commands to run, in order
    #[arg(required = true)]
    commands: Vec<String>,

    #[command(subcommand)]
    tool: Option<Tool>,
}

#[derive(Subcommand, Debug)]
enum Tool {
    /// Print a fresh shared secret for dnsdist's setKey()
    Keygen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    if let Some(Tool::Keygen) = args.tool {
        println!("{}", SharedKey::generate().to_base64());
        return Ok(());
    }

    let config = build_config(&args)?;
    debug!(?config, "Resolved console configuration");

    let mut session = dial(&config)
        .await
        .with_context(|| format!("Failure dialing {}", config.target))?;

    for cmd in &args.commands {
        let response = session
            .command(cmd)
            .await
            .with_context(|| format!("Failure executing command {:?}", cmd))?;
        print!("{}", response);
    }

    session.close().await.context("Failure closing console session")?;
    info!("Ran {} console command(s)", args.commands.len());

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(format!(
                    "dnsdist_console={lvl},console_client={lvl},net_transport={lvl},crypto_session={lvl}",
                    lvl = default_level
                ))
            })?,
        )
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// File settings first, then flags and environment on top
fn build_config(args: &Args) -> Result<ConsoleConfig> {
    let mut config = match &args.config {
        Some(path) => ConsoleConfig::from_json_file(path)?,
        None => ConsoleConfig::default(),
    };

    if let Some(host) = &args.host {
        config.target = host.clone();
    }
    if let Some(key) = &args.key {
        config.secret = key.clone();
    }
    if let Some(secs) = args.timeout {
        let millis = secs.saturating_mul(1000);
        config.connect_timeout_ms = Some(millis);
        config.command_timeout_ms = Some(millis);
    }
    if let Some(max) = args.max_response {
        config.max_frame_len = max;
    }

    Ok(config)
}
