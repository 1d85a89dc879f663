//! Autoload generation for the nightly module.
//!
//! Three files below `<module>/config/` are produced:
//!
//! - `autoload.php` gets a block requiring the class index
//! - `config.php` gets a block registering every class with the class cache
//!   of legacy platform versions
//! - `vendor_autoload.php` is the class index itself, a lookup table wrapped
//!   in a uniquely named loader function registered with `spl_autoload_register`
//!
//! Existing `autoload.php` and `config.php` are never rewritten. A trailing
//! `?>` is stripped and a new block delimited by [`OPENER`] and [`CLOSER`] is
//! appended, so content outside the block is preserved verbatim. Repeated runs
//! append repeated blocks.

mod templates;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

pub use templates::{CLOSER, OPENER};

use crate::classmap::ClassMap;
use crate::consts::LEGACY_VERSION_THRESHOLD;
use crate::util::fs::{FileError, read_optional, write_file};
use crate::util::hash::name_hash;
use crate::util::php::{array_literal, string_literal};

static TRAILING_CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?>\s*$").expect("valid regex"));

/// Append `block` to a bootstrap file's content.
///
/// `existing` is the file's current content, or `None` if it does not exist
/// yet. The block is wrapped in the builder's banner comments.
pub fn merge_bootstrap(existing: Option<&str>, block: &str) -> String {
  let mut merged = match existing {
    Some(content) => TRAILING_CLOSE_TAG.replace(content, "").into_owned(),
    None => templates::EMPTY_BOOTSTRAP.to_string(),
  };
  merged.push_str(OPENER);
  merged.push('\n');
  merged.push_str(block);
  merged.push('\n');
  merged.push_str(CLOSER);
  merged
}

/// Block requiring the class index of `module_path`.
pub fn autoload_block(module_path: &str) -> String {
  templates::AUTOLOAD_BLOCK.replace("{module}", module_path)
}

/// Block registering the classes of `class_map` with the legacy class cache.
pub fn legacy_config_block(module_path: &str, class_map: &ClassMap) -> String {
  let classes = class_map
    .class_names()
    .map(string_literal)
    .collect::<Vec<_>>()
    .join(",\n        ");

  templates::LEGACY_CONFIG_BLOCK
    .replace("{module}", module_path)
    .replace("{threshold}", LEGACY_VERSION_THRESHOLD)
    .replace("{classes}", &classes)
}

/// The class index source for a build identified by `encoded_name`.
///
/// Paths in `class_map` must already be relative to the package root.
pub fn vendor_autoload(encoded_name: &str, class_map: &ClassMap) -> String {
  templates::VENDOR_AUTOLOAD
    .replace("{hash}", &name_hash(encoded_name))
    .replace("{classes}", &array_literal(class_map.iter()))
}

/// Write the autoload files for `module_path` below `package_root`.
///
/// Does nothing and returns `false` if `class_map` is empty. Absolute paths
/// inside `package_root` are rewritten relative to it.
pub fn generate_autoloader(
  package_root: &Path,
  module_path: &str,
  encoded_name: &str,
  class_map: &ClassMap,
) -> Result<bool, FileError> {
  if class_map.is_empty() {
    return Ok(false);
  }

  let class_map = class_map.relative_to(package_root);
  let config_dir = package_root.join(module_path).join("config");

  let autoload_path = config_dir.join("autoload.php");
  let autoload = read_optional(&autoload_path)?;
  write_file(
    &autoload_path,
    merge_bootstrap(autoload.as_deref(), &autoload_block(module_path)),
  )?;

  let config_path = config_dir.join("config.php");
  let config = read_optional(&config_path)?;
  write_file(
    &config_path,
    merge_bootstrap(config.as_deref(), &legacy_config_block(module_path, &class_map)),
  )?;

  write_file(&config_dir.join("vendor_autoload.php"), vendor_autoload(encoded_name, &class_map))?;

  info!(module = %module_path, classes = class_map.len(), "generated autoloader");
  Ok(true)
}
