use std::path::Path;

use anyhow::{Context, Result};

use nightly_lib::report::load_report;
use nightly_lib::report::text::render_text;
use nightly_lib::report::xml::render_xml;

use crate::output::{OutputFormat, print_json};

/// Print the report of `lock`, honoring the blacklist of `project` if given.
pub fn cmd_report(lock: &Path, project: Option<&Path>, xml: bool, format: OutputFormat) -> Result<()> {
  let report = load_report(lock, project).with_context(|| format!("failed to read {}", lock.display()))?;

  if format.is_json() {
    return print_json(&report);
  }

  if xml {
    print!("{}", render_xml(&report));
  } else {
    print!("{}", render_text(&report));
  }
  Ok(())
}
