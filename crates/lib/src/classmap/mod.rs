//! Class name → file path index.
//!
//! - [`scan`] - static discovery of PHP class declarations in a file tree
//! - [`lexer`] - reduction of PHP source to the tokens the scanner inspects

pub mod lexer;
pub mod scan;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

pub use scan::{ClassMapScan, ScanWarning, scan_path};

/// Mapping from fully qualified class name to file path.
///
/// Keys are unique; merging or inserting an existing class replaces its path
/// (last writer wins). Iteration is in class name order so generated files
/// are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassMap(BTreeMap<String, String>);

impl ClassMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a class, returning the path it replaced.
  pub fn insert(&mut self, class: impl Into<String>, path: impl Into<String>) -> Option<String> {
    self.0.insert(class.into(), path.into())
  }

  /// Merge `other` into `self`; classes present in both take `other`'s path.
  pub fn merge(&mut self, other: ClassMap) {
    self.0.extend(other.0);
  }

  pub fn get(&self, class: &str) -> Option<&str> {
    self.0.get(class).map(String::as_str)
  }

  pub fn contains(&self, class: &str) -> bool {
    self.0.contains_key(class)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn class_names(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  /// Rewrite every path relative to `root`.
  ///
  /// Paths starting with the textual form of `root` lose that prefix. Leading
  /// separators are dropped and separators normalized to `/` since the paths
  /// end up in generated PHP.
  pub fn relative_to(&self, root: &Path) -> ClassMap {
    let root = root.to_string_lossy();
    let map = self
      .0
      .iter()
      .map(|(class, path)| {
        let rel = path.strip_prefix(&*root).unwrap_or(path);
        let rel = rel.trim_start_matches(['/', '\\']).replace('\\', "/");
        (class.clone(), rel)
      })
      .collect();
    ClassMap(map)
  }
}

impl FromIterator<(String, String)> for ClassMap {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    ClassMap(iter.into_iter().collect())
  }
}
