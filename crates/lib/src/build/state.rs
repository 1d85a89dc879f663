//! Per-build working state.

use std::path::PathBuf;

use crate::classmap::ClassMap;

/// Mutable state accumulated while packages are assembled.
///
/// Owned by the orchestrator and passed by `&mut` to each step, so exactly
/// one component mutates it at a time. Discarded after the build.
#[derive(Debug)]
pub struct BuildState {
  /// Resolver workspace; packages live below `vendor/`.
  pub repository_root: PathBuf,
  /// Destination root of the assembled package tree.
  pub package_root: PathBuf,
  /// Package-relative path of the module holding generated files.
  pub nightly_module: String,
  pub blacklist: Vec<String>,
  /// Every class collected so far, with package-relative paths.
  pub class_map: ClassMap,
  /// Collected runonce scripts in discovery order. The position of a script
  /// in this list is its sequence number.
  pub runonce: Vec<PathBuf>,
}

impl BuildState {
  pub fn new(
    repository_root: impl Into<PathBuf>,
    package_root: impl Into<PathBuf>,
    nightly_module: impl Into<String>,
    blacklist: Vec<String>,
  ) -> Self {
    Self {
      repository_root: repository_root.into(),
      package_root: package_root.into(),
      nightly_module: nightly_module.into(),
      blacklist,
      class_map: ClassMap::new(),
      runonce: Vec::new(),
    }
  }

  /// Installed location of a package.
  pub fn vendor_dir(&self, package: &str) -> PathBuf {
    self.repository_root.join("vendor").join(package)
  }

  /// Absolute location of a package-relative path.
  pub fn package_path(&self, relative: &str) -> PathBuf {
    self.package_root.join(relative)
  }

  /// Directory of the nightly module's configuration files.
  pub fn nightly_config_dir(&self) -> PathBuf {
    self.package_path(&self.nightly_module).join("config")
  }

  /// Destination of the next runonce script to be collected.
  pub fn next_runonce_path(&self) -> PathBuf {
    self.nightly_config_dir().join(format!("runonce_{}.php", self.runonce.len()))
  }

  /// Record a collected runonce script.
  pub fn push_runonce(&mut self, path: PathBuf) {
    self.runonce.push(path);
  }
}
