//! Build orchestration for nightly packages.
//!
//! [`build`] runs the full pipeline:
//!
//! 1. Load and validate the project manifest
//! 2. Prepare the work directories (the package directory is cleared)
//! 3. Resolve dependencies with composer, unless disabled
//! 4. Write the backend summary module
//! 5. Assemble every locked package in lock order
//! 6. Generate the autoloader of the nightly module
//! 7. Write the runonce executor
//! 8. Write the text and optional XML reports
//! 9. Digest and deploy the package tree
//!
//! Packages are processed strictly in sequence: runonce numbering and the
//! bootstrap file merges depend on the order. Any fatal error stops the
//! pipeline and leaves the package directory as it is; it is cleared again
//! by the next build.

pub mod state;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::assemble::{assemble_library, assemble_module};
use crate::autoload::generate_autoloader;
use crate::backend::{BackendLabels, write_backend_module};
use crate::classify::{Strategy, classify};
use crate::deploy::{DeployError, DeployTarget, deploy, output_path};
use crate::lock::{LockError, LockFile};
use crate::manifest::{ManifestError, ProjectManifest};
use crate::platform::{Workspace, workspace_root};
use crate::report::prepare_package_information;
use crate::report::text::write_text_report;
use crate::report::xml::write_xml_report;
use crate::resolver::{ResolverError, ResolverOptions, resolve};
use crate::runonce::write_executor;
use crate::util::fs::{CopyError, FileError, remove_dir_if_exists};
use crate::util::hash::{PackageDigest, TreeHashError, hash_tree};

use self::state::BuildState;

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The project manifest is missing or invalid.
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Lock(#[from] LockError),

  /// The resolver could not be installed or failed.
  #[error(transparent)]
  Resolver(#[from] ResolverError),

  /// A locked package has a type no assembly strategy exists for.
  #[error("unknown package type '{kind}' for package {name}")]
  UnknownPackageType { name: String, kind: String },

  #[error("I/O error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Copy(#[from] CopyError),

  #[error(transparent)]
  Deploy(#[from] DeployError),

  #[error("failed to digest package tree: {0}")]
  Digest(#[from] TreeHashError),
}

impl From<FileError> for BuildError {
  fn from(e: FileError) -> Self {
    BuildError::Io {
      path: e.path,
      source: e.source,
    }
  }
}

/// Inputs of a build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Project manifest (`nightly.composer.json`).
  pub project: PathBuf,
  /// Requested output path; the default name is replaced by the project name.
  pub output: PathBuf,
  pub target: DeployTarget,
  /// Where to write the XML report, if at all.
  pub xml: Option<PathBuf>,
  /// Run the resolver. When `false`, an existing `composer.lock` and
  /// `vendor/` in the repository directory are used.
  pub resolve: bool,
  pub resolver: ResolverOptions,
  /// Directory holding the work directories. Defaults to [`workspace_root`].
  pub workspace: Option<PathBuf>,
}

impl BuildOptions {
  pub fn new(project: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
    Self {
      project: project.into(),
      output: output.into(),
      target: DeployTarget::default(),
      xml: None,
      resolve: true,
      resolver: ResolverOptions::default(),
      workspace: None,
    }
  }
}

/// A package left out of the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPackage {
  pub name: String,
  pub reason: &'static str,
}

/// What assembling the locked packages produced.
#[derive(Debug, Default, Serialize)]
pub struct AssemblySummary {
  /// Imported packages in lock order.
  pub imported: Vec<String>,
  pub skipped: Vec<SkippedPackage>,
  pub warnings: usize,
}

/// Result of a successful build.
#[derive(Debug, Serialize)]
pub struct BuildOutcome {
  pub name: String,
  pub package_dir: PathBuf,
  pub output: PathBuf,
  pub imported: Vec<String>,
  pub skipped: Vec<SkippedPackage>,
  /// Classes in the generated class index.
  pub classes: usize,
  pub runonce: usize,
  /// Files skipped by the class scanner.
  pub warnings: usize,
  pub xml: Option<PathBuf>,
  pub digest: PackageDigest,
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
  move |source| BuildError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Prepare the work directories for `manifest`.
///
/// The package directory is removed and recreated; the repository directory
/// is created if missing and receives the project manifest as `composer.json`.
pub fn prepare_workspace(root: &Path, project: &Path, manifest: &ProjectManifest) -> Result<Workspace, BuildError> {
  let workspace = Workspace::new(root, &manifest.encoded_name());

  fs::create_dir_all(&workspace.repository).map_err(io_error(&workspace.repository))?;

  info!(path = %workspace.package.display(), "preparing clean output environment");
  remove_dir_if_exists(&workspace.package)?;
  fs::create_dir_all(&workspace.package).map_err(io_error(&workspace.package))?;

  let composer_json = workspace.composer_json();
  info!(path = %composer_json.display(), "preparing project");
  fs::copy(project, &composer_json).map_err(io_error(&composer_json))?;

  Ok(workspace)
}

/// Assemble every locked package into the package tree, in lock order.
///
/// Blacklisted packages and metapackages are skipped. A package of unknown
/// type aborts immediately; later packages are not processed.
pub fn assemble_packages(lock: &LockFile, state: &mut BuildState) -> Result<AssemblySummary, BuildError> {
  let mut summary = AssemblySummary::default();
  info!(packages = lock.packages.len(), "importing");

  for dependency in &lock.packages {
    let assembled = match classify(dependency, &state.blacklist) {
      Strategy::Skip(reason) => {
        info!(name = %dependency.name, reason = reason.as_str(), "skipped package");
        summary.skipped.push(SkippedPackage {
          name: dependency.name.clone(),
          reason: reason.as_str(),
        });
        continue;
      }
      Strategy::Fail { kind } => {
        return Err(BuildError::UnknownPackageType {
          name: dependency.name.clone(),
          kind,
        });
      }
      Strategy::AssembleModule => {
        info!(name = %dependency.name, "importing module");
        assemble_module(dependency, state)?
      }
      Strategy::AssembleLibrary => {
        info!(name = %dependency.name, "importing library");
        assemble_library(dependency, state)?
      }
    };

    summary.warnings += assembled.warnings.len();
    summary.imported.push(dependency.name.clone());
  }

  Ok(summary)
}

/// Run a complete build.
pub async fn build(options: &BuildOptions) -> Result<BuildOutcome, BuildError> {
  let manifest = ProjectManifest::load(&options.project)?;
  let encoded = manifest.encoded_name();
  info!(name = %manifest.name, "building nightly package");

  let root = match &options.workspace {
    Some(root) => root.clone(),
    None => workspace_root().map_err(io_error(Path::new(".")))?,
  };
  let workspace = prepare_workspace(&root, &options.project, &manifest)?;

  if options.resolve {
    resolve(&workspace.repository, &options.resolver).await?;
  } else {
    info!("skipping dependency update");
  }

  let lock = LockFile::load(&workspace.composer_lock())?;
  let mut state = BuildState::new(
    &workspace.repository,
    &workspace.package,
    manifest.nightly_module_path(),
    manifest.blacklist(),
  );
  let report = prepare_package_information(&lock.packages, &state.blacklist);

  let labels = BackendLabels {
    encoded_name: encoded.clone(),
    name: manifest.backend_name(),
    section: manifest.backend_section(),
  };
  write_backend_module(&mut state, &labels, &report)?;

  let summary = assemble_packages(&lock, &mut state)?;
  if summary.warnings > 0 {
    warn!(count = summary.warnings, "some files were skipped during class scanning");
  }

  generate_autoloader(&state.package_root, &state.nightly_module, &encoded, &state.class_map)?;
  write_executor(&state.nightly_config_dir(), &encoded, state.runonce.len())?;

  write_text_report(&state.package_root, &report)?;
  if let Some(xml) = &options.xml {
    write_xml_report(xml, &report)?;
    info!(path = %xml.display(), "wrote xml report");
  }

  let digest = hash_tree(&state.package_root)?;
  let output = output_path(&options.output, &encoded, options.target);
  deploy(&state.package_root, &output, options.target)?;

  Ok(BuildOutcome {
    name: manifest.name,
    package_dir: state.package_root,
    output,
    imported: summary.imported,
    skipped: summary.skipped,
    classes: state.class_map.len(),
    runonce: state.runonce.len(),
    warnings: summary.warnings,
    xml: options.xml.clone(),
    digest,
  })
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }

  fn state(temp: &TempDir) -> BuildState {
    BuildState::new(
      temp.path().join("repo"),
      temp.path().join("pkg"),
      "system/modules/!acme-site",
      vec!["contao/core".to_string()],
    )
  }

  mod prepare {
    use super::*;

    #[test]
    fn clears_package_and_copies_manifest() {
      let temp = TempDir::new().unwrap();
      let project = temp.path().join("nightly.composer.json");
      fs::write(&project, r#"{"name": "acme/site", "require": {}}"#).unwrap();
      let manifest = ProjectManifest::load(&project).unwrap();

      let stale = temp.path().join("build_package_acme-site/stale.txt");
      write(temp.path(), "build_package_acme-site/stale.txt", "old");

      let ws = prepare_workspace(temp.path(), &project, &manifest).unwrap();

      assert!(!stale.exists());
      assert!(ws.package.is_dir());
      assert_eq!(
        fs::read_to_string(ws.composer_json()).unwrap(),
        r#"{"name": "acme/site", "require": {}}"#
      );
    }
  }

  mod assembly {
    use super::*;

    #[test]
    fn unknown_type_stops_processing() {
      let temp = TempDir::new().unwrap();
      let mut state = state(&temp);
      write(&state.vendor_dir("a/first"), "lib/First.php", "<?php class First {}");
      write(&state.vendor_dir("c/third"), "lib/Third.php", "<?php class Third {}");

      let lock = LockFile::from_json(
        r#"{"packages": [
          {"name": "a/first", "version": "1.0", "type": "library", "autoload": {"classmap": ["lib"]}},
          {"name": "b/second", "version": "1.0", "type": "symfony-bundle"},
          {"name": "c/third", "version": "1.0", "type": "library", "autoload": {"classmap": ["lib"]}}
        ]}"#,
      )
      .unwrap();

      let err = assemble_packages(&lock, &mut state).unwrap_err();

      match err {
        BuildError::UnknownPackageType { name, kind } => {
          assert_eq!(name, "b/second");
          assert_eq!(kind, "symfony-bundle");
        }
        other => panic!("unexpected error: {other}"),
      }
      assert!(state.class_map.contains("First"));
      assert!(!state.class_map.contains("Third"));
    }

    #[test]
    fn metapackages_and_blacklist_are_skipped() {
      let temp = TempDir::new().unwrap();
      let mut state = state(&temp);
      write(&state.vendor_dir("a/lib"), "lib/Lib.php", "<?php class Lib {}");

      let lock = LockFile::from_json(
        r#"{"packages": [
          {"name": "contao/core", "version": "2.11.17", "type": "metapackage"},
          {"name": "a/meta", "version": "1.0", "type": "metapackage"},
          {"name": "a/lib", "version": "1.0", "type": "library", "autoload": {"classmap": ["lib"]}}
        ]}"#,
      )
      .unwrap();

      let summary = assemble_packages(&lock, &mut state).unwrap();

      assert_eq!(summary.imported, vec!["a/lib".to_string()]);
      assert_eq!(
        summary.skipped,
        vec![
          SkippedPackage {
            name: "contao/core".into(),
            reason: "blacklisted"
          },
          SkippedPackage {
            name: "a/meta".into(),
            reason: "metapackage"
          },
        ]
      );
      assert!(!state.package_root.join("system/modules/a-meta").exists());
      assert!(state.class_map.contains("Lib"));
    }
  }
}
