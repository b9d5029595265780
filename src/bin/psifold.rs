//! psifold CLI - Build the ψ-Fold dashboard
//!
//! Commands:
//! - synthetic: Demo series, no network (default when no command is given)
//! - live: Solar-wind and seismic feeds, with fallbacks

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use psifold::{build_dashboard, DashboardError, DashboardMode, PSIFOLD_VERSION};

/// psifold - ψ-Fold drift/stress dashboard
#[derive(Parser)]
#[command(name = "psifold")]
#[command(version = PSIFOLD_VERSION)]
#[command(about = "Render the ψ-Fold drift/stress dashboard as HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sine-modulated demo series, written to index.html
    Synthetic,

    /// Live solar-wind drift and seismic events, written under data/
    Live,
}

fn mode_for(command: Option<Commands>) -> DashboardMode {
    match command {
        None | Some(Commands::Synthetic) => DashboardMode::Synthetic,
        Some(Commands::Live) => DashboardMode::Live,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the completion line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match build_dashboard(mode_for(cli.command)) {
        Ok(report) => {
            println!("Dashboard built: {}", report.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DashboardError> for CliError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the output path is writable".to_string()),
            },
            DashboardError::Encoding(msg) => CliError {
                code: "ENCODING_ERROR".to_string(),
                message: msg,
                hint: None,
            },
            // Feeds absorb these before they reach the pipeline result
            e @ (DashboardError::Fetch(_) | DashboardError::Parse(_) | DashboardError::Json(_)) => {
                CliError {
                    code: "FEED_ERROR".to_string(),
                    message: e.to_string(),
                    hint: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_runs_synthetic() {
        let cli = Cli::try_parse_from(["psifold"]).unwrap();
        assert_eq!(mode_for(cli.command), DashboardMode::Synthetic);
    }

    #[test]
    fn test_live_subcommand() {
        let cli = Cli::try_parse_from(["psifold", "live"]).unwrap();
        assert_eq!(mode_for(cli.command), DashboardMode::Live);

        let cli = Cli::try_parse_from(["psifold", "synthetic"]).unwrap();
        assert_eq!(mode_for(cli.command), DashboardMode::Synthetic);
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(Cli::try_parse_from(["psifold", "--output", "x.html"]).is_err());
    }

    #[test]
    fn test_io_error_maps_to_cli_error() {
        let err = DashboardError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let cli_error = CliError::from(err);
        assert_eq!(cli_error.code, "IO_ERROR");
        assert!(cli_error.hint.is_some());
    }
}
