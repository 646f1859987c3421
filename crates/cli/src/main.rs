//! mtctl - Xsens MT device CLI
//!
//! Reads measurements from, and configures, devices speaking the MT binary
//! protocol over an already configured serial device node or a TCP bridge.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod config_file;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "mtctl")]
#[command(about = "Xsens MT CLI - Stream measurements and manage device output configuration")]
#[command(version)]
#[command(long_about = "
mtctl talks to motion trackers using the Xsens MT binary protocol.

<PORT> is a device node that is already set to the right baud rate (for
example /dev/ttyUSB0) or tcp://host:port for a serial-over-TCP bridge.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Per-request timeout in milliseconds, 0 to wait forever
    #[arg(long, global = true, env = "MTCTL_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter measurement mode and print decoded samples
    Read {
        /// Device node or tcp://host:port
        port: String,
        /// Stop after this many data frames
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Print the device output configuration
    GetOutputConfig {
        /// Device node or tcp://host:port
        port: String,
    },

    /// Write an output configuration from a JSON file
    SetOutputConfig {
        /// Device node or tcp://host:port
        port: String,
        /// JSON list of output settings
        config: String,
    },

    /// Print device ID, product code and hardware version
    DeviceInfo {
        /// Device node or tcp://host:port
        port: String,
    },

    /// Decode a captured byte stream offline
    Decode {
        /// Capture file
        file: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mtctl={log_level},mtlink_client={log_level},mtlink_protocol={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = execute_command(&cli);

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Read { port, count } => {
            commands::read::execute(port, *count, cli.json, cli.timeout_ms)
        }
        Commands::GetOutputConfig { port } => {
            commands::output_config::get(port, cli.json, cli.timeout_ms)
        }
        Commands::SetOutputConfig { port, config } => {
            commands::output_config::set(port, config, cli.json, cli.timeout_ms)
        }
        Commands::DeviceInfo { port } => commands::device::execute(port, cli.json, cli.timeout_ms),
        Commands::Decode { file } => commands::decode::execute(file, cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_read_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["mtctl", "read", "/dev/ttyUSB0"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match &cli.command {
            Commands::Read { port, count } => {
                assert_eq!(port, "/dev/ttyUSB0");
                assert!(count.is_none());
            }
            _ => return Err("expected Read command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "mtctl",
            "get-output-config",
            "tcp://127.0.0.1:4001",
            "--json",
            "--timeout-ms",
            "250",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(matches!(cli.command, Commands::GetOutputConfig { .. }));
        Ok(())
    }

    #[test]
    fn parse_verbose_levels() -> TestResult {
        let cli = Cli::try_parse_from(["mtctl", "-vv", "decode", "capture.bin"])?;
        assert_eq!(cli.verbose, 2);
        Ok(())
    }

    #[test]
    fn parse_set_output_config() -> TestResult {
        let cli = Cli::try_parse_from(["mtctl", "set-output-config", "/dev/ttyUSB0", "out.json"])?;
        match &cli.command {
            Commands::SetOutputConfig { port, config } => {
                assert_eq!(port, "/dev/ttyUSB0");
                assert_eq!(config, "out.json");
            }
            _ => return Err("expected SetOutputConfig command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_read_count() -> TestResult {
        let cli = Cli::try_parse_from(["mtctl", "read", "/dev/ttyUSB0", "-n", "10"])?;
        assert!(matches!(
            cli.command,
            Commands::Read {
                count: Some(10),
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn set_output_config_requires_file() {
        assert!(Cli::try_parse_from(["mtctl", "set-output-config", "/dev/ttyUSB0"]).is_err());
    }
}
