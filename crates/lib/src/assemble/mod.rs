//! Package assembly: lays out a locked package inside the package tree.
//!
//! Contao modules are copied according to their declared file mappings and
//! may contribute runonce scripts. Libraries only contribute the classes their
//! autoload rules point at. In both cases classes not already covered by a
//! mapping end up below `<module>/classes/` and are added to the class map.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::build::state::BuildState;
use crate::classmap::{ClassMap, ScanWarning, scan_path};
use crate::consts::{CLASSES_DIR, MODULE_ROOT_PATTERN, MODULES_DIR};
use crate::lock::ResolvedDependency;
use crate::manifest::encode_name;
use crate::util::fs::{CopyError, copy_path};
use crate::util::prefix::is_excluded;

static MODULE_ROOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(MODULE_ROOT_PATTERN).expect("valid regex"));

/// What assembling one package contributed to the build.
#[derive(Debug, Default)]
pub struct AssembledPackage {
  /// Package-relative module path the package's classes were placed in.
  pub module_path: String,
  pub files_copied: usize,
  pub classes: usize,
  pub runonce: usize,
  pub warnings: Vec<ScanWarning>,
}

/// Default module path for a package: `system/modules/<vendor-name>`.
pub fn default_module_path(name: &str) -> String {
  format!("{}/{}", MODULES_DIR, encode_name(name))
}

/// Module path of a Contao module.
///
/// The first mapping target inside `system/modules/<name>` wins, otherwise the
/// name-derived default is used.
pub fn module_placement(dependency: &ResolvedDependency) -> String {
  dependency
    .placement
    .file_mappings
    .iter()
    .map(|(_, target)| target)
    .find(|target| MODULE_ROOT.is_match(target))
    .cloned()
    .unwrap_or_else(|| default_module_path(&dependency.name))
}

/// Assemble a Contao module.
///
/// Copies every file mapping into the package tree, collects classes from
/// autoload paths the mappings did not already cover, then copies the
/// declared runonce scripts into the nightly module as `runonce_<n>.php`
/// where `n` continues the numbering of earlier packages.
pub fn assemble_module(dependency: &ResolvedDependency, state: &mut BuildState) -> Result<AssembledPackage, CopyError> {
  let vendor = vendor_prefix(dependency, state);
  let mut copied_sources = Vec::with_capacity(dependency.placement.file_mappings.len());
  let mut files_copied = 0;

  for (source, target) in &dependency.placement.file_mappings {
    let from = format!("{}/{}", vendor, source);
    files_copied += copy_path(from.as_ref(), &state.package_path(target))?;
    copied_sources.push(from);
  }

  let module_path = module_placement(dependency);
  debug!(name = %dependency.name, module = %module_path, "module placement");

  let mut assembled = add_additional_classes(dependency, &module_path, &copied_sources, state)?;
  assembled.files_copied += files_copied;

  for script in &dependency.placement.bootstrap_scripts {
    let target = state.next_runonce_path();
    copy_path(format!("{}/{}", vendor, script).as_ref(), &target)?;
    debug!(name = %dependency.name, script = %script, target = %target.display(), "collected runonce script");
    state.push_runonce(target);
    assembled.runonce += 1;
  }

  Ok(assembled)
}

/// Assemble a plain library into `system/modules/<vendor-name>`.
pub fn assemble_library(dependency: &ResolvedDependency, state: &mut BuildState) -> Result<AssembledPackage, CopyError> {
  let module_path = default_module_path(&dependency.name);
  add_additional_classes(dependency, &module_path, &[], state)
}

/// Copy the package's autoload paths into `<module_path>/classes/` and index them.
///
/// A source path starting with one of `exclusions` has already been placed by
/// a file mapping and is skipped. Discovered classes are merged into the build
/// class map with package-relative paths; later packages overwrite earlier
/// entries for the same class.
pub fn add_additional_classes(
  dependency: &ResolvedDependency,
  module_path: &str,
  exclusions: &[String],
  state: &mut BuildState,
) -> Result<AssembledPackage, CopyError> {
  let vendor = vendor_prefix(dependency, state);
  let classes_root = state.package_path(module_path).join(CLASSES_DIR);
  let mut assembled = AssembledPackage {
    module_path: module_path.to_string(),
    ..Default::default()
  };
  let mut found = ClassMap::new();

  for source in dependency.autoload.source_paths() {
    let from = format!("{}/{}", vendor, source);
    if is_excluded(&from, exclusions) {
      debug!(name = %dependency.name, source = %source, "autoload path already mapped");
      continue;
    }

    let target = classes_root.join(source);
    assembled.files_copied += copy_path(from.as_ref(), &target)?;

    let scan = scan_path(&target);
    found.merge(scan.classes);
    assembled.warnings.extend(scan.warnings);
  }

  assembled.classes = found.len();
  if !found.is_empty() {
    info!(name = %dependency.name, classes = found.len(), module = %module_path, "collected classes");
  }
  state.class_map.merge(found.relative_to(&state.package_root));

  Ok(assembled)
}

fn vendor_prefix(dependency: &ResolvedDependency, state: &BuildState) -> String {
  state.vendor_dir(&dependency.name).to_string_lossy().into_owned()
}
