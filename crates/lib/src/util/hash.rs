//! Hashing utilities.
//!
//! - `name_hash()`: md5 digest used to derive unique PHP identifiers
//! - `PackageDigest` / `hash_tree()`: deterministic SHA-256 over an assembled package tree

use std::fs;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Lowercase hex md5 of `name`.
///
/// Generated PHP functions and classes are suffixed with this so that several
/// nightly packages can be installed side by side.
pub fn name_hash(name: &str) -> String {
  format!("{:x}", md5::compute(name.as_bytes()))
}

/// A full 64-character SHA-256 over a package tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageDigest(pub String);

impl std::fmt::Display for PackageDigest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while hashing a package tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeHashError {
  #[error("failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("failed to read file {path}: {source}")]
  ReadFile {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Compute a deterministic hash of a directory's contents.
///
/// Covers relative paths, directory structure and file contents; timestamps
/// and permissions are ignored. Entries are visited in file name order.
pub fn hash_tree(root: &Path) -> Result<PackageDigest, TreeHashError> {
  let mut hasher = Sha256::new();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry?;
    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_string_lossy().replace('\\', "/");
    if rel.is_empty() {
      continue;
    }

    if entry.file_type().is_dir() {
      hasher.update(format!("D:{}\n", rel).as_bytes());
    } else if entry.file_type().is_file() {
      let content = fs::read(entry.path()).map_err(|source| TreeHashError::ReadFile {
        path: entry.path().display().to_string(),
        source,
      })?;
      hasher.update(format!("F:{}:{}\n", rel, hex::encode(Sha256::digest(&content))).as_bytes());
    }
  }

  Ok(PackageDigest(hex::encode(hasher.finalize())))
}
