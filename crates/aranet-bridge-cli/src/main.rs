//! Command-line interface for Aranet4 sensors read through an external tool.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Scan for nearby devices |
//! | `read` | Read current values from one or more devices |
//! | `watch` | Read a device each time it takes a new measurement |
//! | `parse` | Parse captured tool output from a file or stdin |
//! | `config` | Manage the configuration file |
//! | `completions` | Generate shell completions |
//!
//! # Environment Variables
//!
//! - `ARANET_DEVICE`: Default device address (overridden by arguments)
//! - `ARANET_BRIDGE_CONFIG`: Alternative configuration file path
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given

mod cli;
mod commands;
mod config;
mod format;
mod util;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{WatchArgs, cmd_config, cmd_parse, cmd_read, cmd_scan, cmd_watch};
use config::{Config, resolve_devices};
use format::FormatOptions;
use util::require_devices;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "aranet-bridge", &mut io::stdout());
        return Ok(());
    }

    init_tracing(cli.quiet, cli.verbose);

    let config = Config::load();
    let format = cli.format();
    // Never write color codes into files
    let opts = FormatOptions::new(cli.no_color || cli.output.is_some()).with_compact(cli.compact);
    let output = cli.output.as_ref();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Scan => {
            let reader = config.reader()?;
            cmd_scan(&reader, format, output, quiet, &opts).await?;
        }
        Commands::Read { addresses, device } => {
            let devices = require_devices(resolve_devices(device.merge(&addresses), &config))?;
            let reader = config.reader()?;
            cmd_read(&reader, &devices, format, output, quiet, &opts).await?;
        }
        Commands::Watch {
            address,
            device,
            min_interval,
            count,
        } => {
            let positional: Vec<String> = address.into_iter().collect();
            let mut devices =
                require_devices(resolve_devices(device.merge(&positional), &config))?;
            if devices.len() > 1 {
                anyhow::bail!("watch takes a single device, got {}", devices.len());
            }
            let address = devices.remove(0);
            let min_interval = min_interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.watch.min_interval());

            let reader = config.reader()?;
            cmd_watch(
                &reader,
                WatchArgs {
                    address,
                    min_interval,
                    count,
                    format,
                    output,
                    quiet,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Parse { file } => {
            cmd_parse(file.as_deref(), format, output, &opts)?;
        }
        Commands::Config { action } => {
            cmd_config(action, &config, format, output, quiet, &opts)?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
/// When quiet mode is enabled, suppress info-level logging.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
