//! trackctl - F1 telemetry and track map CLI
//!
//! Listens for F1 24 UDP telemetry and projects car positions onto SVG track
//! outlines, decodes captured datagrams, and inspects outline files.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod outlines;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::listen::ListenOptions;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "trackctl")]
#[command(about = "F1 telemetry decoding and lap progress on SVG track maps")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive live telemetry and log lap progress
    Listen {
        /// UDP port (defaults to 20777)
        #[arg(short, long, env = "OPENRACING_F1_UDP_PORT")]
        port: Option<u16>,

        /// Directory of `<track_id>.svg` outlines
        #[arg(short, long, env = "TRACKCTL_TRACKS")]
        tracks: Option<PathBuf>,

        /// Only track the player's car
        #[arg(long)]
        player_only: bool,
    },

    /// Decode one captured datagram and print it as JSON
    Decode {
        /// Raw datagram file
        file: PathBuf,
    },

    /// Parse an SVG outline and print geometry as JSON
    Outline {
        /// SVG file
        file: PathBuf,

        /// Number of evenly spaced points to sample
        #[arg(short, long, default_value_t = 20)]
        samples: u32,

        /// Flattening tolerance as a fraction of the outline size
        #[arg(long, default_value_t = 0.002)]
        tolerance: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "trackctl={log_level},openracing_telemetry_f1={log_level},\
                     openracing_track={log_level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {cause}");
            }
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<CliError>())
                .map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Listen {
            port,
            tracks,
            player_only,
        } => {
            commands::listen::execute(&ListenOptions {
                port: *port,
                tracks: tracks.clone(),
                player_only: *player_only,
            })
            .await
        }
        Commands::Decode { file } => commands::decode::execute(file),
        Commands::Outline {
            file,
            samples,
            tolerance,
        } => commands::outline::execute(file, *samples, *tolerance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_listen_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["trackctl", "listen"])?;
        assert_eq!(cli.verbose, 0);
        assert!(matches!(
            cli.command,
            Commands::Listen {
                player_only: false,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn parse_listen_flags() -> TestResult {
        let cli = Cli::try_parse_from([
            "trackctl",
            "-vv",
            "listen",
            "--port",
            "20888",
            "--tracks",
            "maps",
            "--player-only",
        ])?;
        assert_eq!(cli.verbose, 2);
        let Commands::Listen {
            port,
            tracks,
            player_only,
        } = cli.command
        else {
            return Err("expected listen".into());
        };
        assert_eq!(port, Some(20888));
        assert_eq!(tracks, Some(PathBuf::from("maps")));
        assert!(player_only);
        Ok(())
    }

    #[test]
    fn parse_outline_samples() -> TestResult {
        let cli = Cli::try_parse_from(["trackctl", "outline", "spa.svg", "--samples", "8"])?;
        assert!(matches!(cli.command, Commands::Outline { samples: 8, .. }));
        Ok(())
    }

    #[test]
    fn decode_requires_file() {
        assert!(Cli::try_parse_from(["trackctl", "decode"]).is_err());
    }
}
