//! Package reports.
//!
//! [`prepare_package_information`] derives a display record for every
//! package that is not blacklisted and measures the widest value of each
//! column in the same pass. The [`text`] and [`xml`] renderers and the
//! backend module consume the result.

pub mod license;
pub mod text;
pub mod xml;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::classify::is_blacklisted;
use crate::consts::{DEFAULT_BLACKLIST, SHORT_REF_LEN};
use crate::lock::{LockError, LockFile, ResolvedDependency};
use crate::manifest::{ManifestError, ProjectManifest};

pub use license::license_url;

static DEV_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^dev-|-dev$)").expect("valid regex"));

/// Errors raised while producing a report outside of a build.
#[derive(Debug, Error)]
pub enum ReportError {
  #[error(transparent)]
  Lock(#[from] LockError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// A license identifier and its reference URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseLink {
  pub name: String,
  /// SPDX URL, or the identifier itself when it is not a known SPDX license.
  pub url: String,
}

impl LicenseLink {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      url: license_url(name),
    }
  }

  /// Whether `url` points at the SPDX list rather than echoing the name.
  pub fn is_resolved(&self) -> bool {
    self.url != self.name
  }
}

/// Display record of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
  pub name: String,
  pub homepage: Option<String>,
  /// Source repository URL without a trailing `.git`.
  pub url: Option<String>,
  pub licenses: Vec<LicenseLink>,
  /// Version, with a short commit reference for development versions.
  pub version: String,
  pub time: String,
}

/// Widest value per column, in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnWidths {
  pub name: usize,
  pub url: usize,
  pub version: usize,
  pub time: usize,
  pub license_name: usize,
  pub license_url: usize,
}

impl ColumnWidths {
  fn observe(&mut self, info: &PackageInfo) {
    fn widen(width: &mut usize, value: &str) {
      *width = (*width).max(value.chars().count());
    }

    widen(&mut self.name, &info.name);
    widen(&mut self.url, info.url.as_deref().unwrap_or_default());
    widen(&mut self.version, &info.version);
    widen(&mut self.time, &info.time);
    for license in &info.licenses {
      widen(&mut self.license_name, &license.name);
      widen(&mut self.license_url, &license.url);
    }
  }
}

/// All package records in lock order plus their column widths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageReport {
  pub packages: Vec<PackageInfo>,
  pub widths: ColumnWidths,
}

/// Strip a trailing `.git` from a repository URL.
pub fn comparison_url(source_url: &str) -> &str {
  source_url.strip_suffix(".git").unwrap_or(source_url)
}

/// Version as displayed in reports.
///
/// Development versions (`dev-*` or `*-dev`) get ` @ ` and the first six
/// characters of the commit reference appended, when one is known.
pub fn display_version(dependency: &ResolvedDependency) -> String {
  let version = &dependency.version;
  match dependency.commit_ref() {
    Some(reference) if DEV_VERSION.is_match(version) => {
      let short: String = reference.chars().take(SHORT_REF_LEN).collect();
      format!("{} @ {}", version, short)
    }
    _ => version.clone(),
  }
}

/// Build the display record of one package.
pub fn package_info(dependency: &ResolvedDependency) -> PackageInfo {
  PackageInfo {
    name: dependency.name.clone(),
    homepage: dependency.homepage.clone(),
    url: dependency.source_url.as_deref().map(|u| comparison_url(u).to_string()),
    licenses: dependency.license.iter().map(|l| LicenseLink::new(l)).collect(),
    version: display_version(dependency),
    time: dependency.time.clone(),
  }
}

/// Collect display records for every package not on `blacklist`.
pub fn prepare_package_information<S: AsRef<str>>(dependencies: &[ResolvedDependency], blacklist: &[S]) -> PackageReport {
  let mut report = PackageReport::default();

  for dependency in dependencies.iter().filter(|d| !is_blacklisted(&d.name, blacklist)) {
    let info = package_info(dependency);
    report.widths.observe(&info);
    report.packages.push(info);
  }

  report
}

/// Load a report straight from a lock file.
///
/// The blacklist comes from `manifest` when given, otherwise the built-in
/// defaults apply.
pub fn load_report(lock: &Path, manifest: Option<&Path>) -> Result<PackageReport, ReportError> {
  let blacklist = match manifest {
    Some(path) => ProjectManifest::load(path)?.blacklist(),
    None => DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
  };
  let lock = LockFile::load(lock)?;
  Ok(prepare_package_information(&lock.packages, &blacklist))
}
