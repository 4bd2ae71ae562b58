//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Device arguments that support multiple devices
#[derive(Debug, Clone, Default, Args)]
pub struct DeviceArgs {
    /// Device address(es) or alias(es); can be repeated or comma-separated
    #[arg(short, long, value_delimiter = ',', env = "ARANET_DEVICE")]
    pub device: Vec<String>,
}

impl DeviceArgs {
    /// Positional addresses first, then `--device` values.
    pub fn merge(&self, positional: &[String]) -> Vec<String> {
        positional
            .iter()
            .chain(self.device.iter())
            .filter(|d| !d.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Parser)]
#[command(name = "aranet-bridge")]
#[command(
    author,
    version,
    about = "Read Aranet4 CO2 monitors through an external scanning tool",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format selected by the global flags.
    pub fn format(&self) -> OutputFormat {
        if self.json || self.compact {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for nearby Aranet devices
    Scan,

    /// Read current sensor values from one or more devices
    Read {
        /// Device address(es) or alias(es)
        addresses: Vec<String>,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Continuously monitor a device, reading again when it takes a new measurement
    Watch {
        /// Device address or alias
        address: Option<String>,

        #[command(flatten)]
        device: DeviceArgs,

        /// Shortest wait between reads in seconds (overrides config)
        #[arg(short = 'i', long)]
        min_interval: Option<u64>,

        /// Number of readings to take before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,
    },

    /// Parse captured tool output from a file or stdin
    Parse {
        /// File to parse ("-" or omitted for stdin)
        file: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show configuration file path
    Path,

    /// Show current configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_json_flags_select_format() {
        let cli = Cli::parse_from(["aranet-bridge", "scan"]);
        assert_eq!(cli.format(), OutputFormat::Text);

        let cli = Cli::parse_from(["aranet-bridge", "--json", "scan"]);
        assert_eq!(cli.format(), OutputFormat::Json);

        let cli = Cli::parse_from(["aranet-bridge", "scan", "--compact"]);
        assert_eq!(cli.format(), OutputFormat::Json);
    }

    #[test]
    fn test_read_merges_positional_and_flag() {
        let cli = Cli::parse_from([
            "aranet-bridge",
            "read",
            "AA:BB",
            "--device",
            "office,bedroom",
        ]);
        let Commands::Read { addresses, device } = cli.command else {
            panic!("expected read");
        };
        assert_eq!(device.merge(&addresses), vec!["AA:BB", "office", "bedroom"]);
    }

    #[test]
    fn test_watch_options() {
        let cli = Cli::parse_from(["aranet-bridge", "watch", "AA:BB", "-i", "30", "-n", "3"]);
        let Commands::Watch {
            address,
            min_interval,
            count,
            ..
        } = cli.command
        else {
            panic!("expected watch");
        };
        assert_eq!(address.as_deref(), Some("AA:BB"));
        assert_eq!(min_interval, Some(30));
        assert_eq!(count, 3);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["aranet-bridge", "-v", "-q", "scan"]).is_err());
    }
}
