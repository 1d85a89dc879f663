use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use nightly_lib::build::{BuildOptions, build};
use nightly_lib::consts::{DEFAULT_OUTPUT, DEFAULT_PROJECT_FILE, RESOLVER_TIMEOUT};
use nightly_lib::deploy::DeployTarget;

use crate::output::{OutputFormat, print_build_summary, print_json};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Project manifest
  #[arg(default_value = DEFAULT_PROJECT_FILE)]
  pub project: PathBuf,

  /// Output path; the default is replaced by the encoded project name
  #[arg(default_value = DEFAULT_OUTPUT)]
  pub output: PathBuf,

  /// Deploy as a directory
  #[arg(short = 'D', long, conflicts_with = "zip")]
  pub dir: bool,

  /// Deploy as a zip archive (default)
  #[arg(short = 'Z', long)]
  pub zip: bool,

  /// Also write the XML version report to this path
  #[arg(short = 'x', long, value_name = "PATH")]
  pub xml: Option<PathBuf>,

  /// Reuse the existing composer.lock and vendor/ instead of updating
  #[arg(long)]
  pub no_update: bool,

  /// PHP interpreter used to run composer
  #[arg(long, value_name = "BIN", default_value = "php")]
  pub php: String,

  /// Resolver timeout, e.g. "90s" or "5m"
  #[arg(long, value_parser = humantime::parse_duration)]
  pub timeout: Option<Duration>,
}

impl BuildArgs {
  fn options(self) -> BuildOptions {
    let mut options = BuildOptions::new(self.project, self.output);
    options.target = match (self.dir, self.zip) {
      (true, false) => DeployTarget::Directory,
      _ => DeployTarget::Archive,
    };
    options.xml = self.xml;
    options.resolve = !self.no_update;
    options.resolver.php = self.php;
    options.resolver.timeout = self.timeout.unwrap_or(RESOLVER_TIMEOUT);
    options
  }
}

/// Execute the build command.
pub fn cmd_build(args: BuildArgs, format: OutputFormat) -> Result<()> {
  let options = args.options();
  debug!(?options, "starting build");

  let start = Instant::now();
  let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
  let outcome = runtime
    .block_on(build(&options))
    .with_context(|| format!("failed to build {}", options.project.display()))?;
  let elapsed = start.elapsed();

  if format.is_json() {
    print_json(&outcome)?;
  } else {
    print_build_summary(&outcome, elapsed);
  }
  Ok(())
}
