//! Terminal output for the nightly CLI.
//!
//! Colored status lines, the build summary, and JSON output for scripting.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use nightly_lib::build::{BuildOutcome, SkippedPackage};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const MINUS: &str = "-";
}

/// First 12 characters of a hex digest.
pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

/// Width the labels of summary lines are padded to.
const STAT_WIDTH: usize = 10;

fn pad_label(label: &str) -> String {
  format!("{:>width$}", label, width = STAT_WIDTH)
}

pub fn print_stat(label: &str, value: &str) {
  let label = pad_label(label);
  println!("  {} {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// One line per package left out of the build.
pub fn print_skipped(skipped: &[SkippedPackage]) {
  if skipped.is_empty() {
    return;
  }
  print_info(&format!("Skipped {} package(s):", skipped.len()));
  for package in skipped {
    println!(
      "  {} {} ({})",
      symbols::MINUS.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      package.name,
      package.reason
    );
  }
}

/// Human-readable summary of a finished build.
pub fn print_build_summary(outcome: &BuildOutcome, elapsed: Duration) {
  print_success(&format!("Built {} in {}", outcome.name, format_duration(elapsed)));
  print_stat("output", &outcome.output.display().to_string());
  print_stat("packages", &outcome.imported.len().to_string());
  print_stat("classes", &outcome.classes.to_string());
  print_stat("runonce", &outcome.runonce.to_string());
  print_stat("digest", truncate_hash(&outcome.digest.0));
  if let Some(xml) = &outcome.xml {
    print_stat("xml", &xml.display().to_string());
  }

  print_skipped(&outcome.skipped);

  if outcome.warnings > 0 {
    print_warning(&format!(
      "{} file(s) could not be scanned for classes; run with --verbose for details",
      outcome.warnings
    ));
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
