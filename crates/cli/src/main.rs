mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nightly_lib::consts::APP_NAME;

use crate::cmd::{BuildArgs, cmd_build, cmd_report};
use crate::output::{OutputFormat, print_error};

/// Nightly package builder for Contao composer projects
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve a project and assemble its nightly package
  Build(BuildArgs),

  /// Print the package report of an existing lock file
  Report {
    /// Path to composer.lock
    lock: PathBuf,

    /// Project manifest providing additional blacklist entries
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Print the XML report instead of the text report
    #[arg(short = 'x', long)]
    xml: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Build(args) => cmd_build(args, cli.format),
    Commands::Report { lock, project, xml } => cmd_report(&lock, project.as_deref(), xml, cli.format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
