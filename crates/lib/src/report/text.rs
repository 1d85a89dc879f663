//! Fixed-width plain text report (`nightly.txt`).
//!
//! Packages are grouped by homepage in order of first appearance. Packages
//! without a homepage are listed last under `other`.

use std::path::{Path, PathBuf};

use super::PackageReport;
use crate::consts::REPORT_FILENAME;
use crate::util::fs::{FileError, write_file};

const OTHER_GROUP: &str = "other";

/// Render the text report.
pub fn render_text(report: &PackageReport) -> String {
  let w = &report.widths;
  let row = |name: &str, version: &str, time: &str| {
    format!(
      "{:<nw$} {:<vw$} {:<tw$}",
      name,
      version,
      time,
      nw = w.name,
      vw = w.version,
      tw = w.time
    )
  };
  let line_len = w.name + w.version + w.time + 2;

  let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
  let mut other = Vec::new();
  for package in &report.packages {
    let line = row(&package.name, &package.version, &package.time);
    match package.homepage.as_deref() {
      Some(homepage) => match groups.iter_mut().find(|(h, _)| *h == homepage) {
        Some((_, lines)) => lines.push(line),
        None => groups.push((homepage, vec![line])),
      },
      None => other.push(line),
    }
  }

  let mut text = row("Name", "Version", "Last modification").trim_end().to_string();
  text.push('\n');
  text.push_str(&"=".repeat(line_len));
  text.push('\n');

  for (homepage, lines) in &groups {
    text.push_str(homepage);
    text.push('\n');
    text.push_str(&lines.join("\n"));
    text.push('\n');
    text.push_str(&"-".repeat(line_len));
    text.push_str("\n\n");
  }

  text.push_str(OTHER_GROUP);
  text.push('\n');
  text.push_str(&other.join("\n"));
  text.push_str("\n\n");
  text
}

/// Write `nightly.txt` into `package_root`.
pub fn write_text_report(package_root: &Path, report: &PackageReport) -> Result<PathBuf, FileError> {
  let path = package_root.join(REPORT_FILENAME);
  write_file(&path, render_text(report))?;
  Ok(path)
}
