use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::serde_helpers::{OneOrMany, OrderedMap, PathList};

/// Lock file name written by the resolver.
pub const LOCK_FILENAME: &str = "composer.lock";

/// Errors that can occur when reading the lock file.
#[derive(Debug, Error)]
pub enum LockError {
  /// Failed to read the lock file.
  #[error("failed to read lock file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Failed to parse the lock file JSON.
  #[error("failed to parse lock file: {0}")]
  Parse(#[from] serde_json::Error),
}

/// The declared `type` of a locked package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageType {
  /// A plain composer library (`library`, also the composer default).
  Library,
  /// A Contao module with file placement hints (`contao-module`).
  ContaoModule,
  /// A package without content that only pulls in other packages (`metapackage`).
  MetaPackage,
  /// Anything else, kept verbatim so it can be reported.
  Other(String),
}

impl PackageType {
  pub fn as_str(&self) -> &str {
    match self {
      PackageType::Library => "library",
      PackageType::ContaoModule => "contao-module",
      PackageType::MetaPackage => "metapackage",
      PackageType::Other(s) => s,
    }
  }
}

impl From<String> for PackageType {
  fn from(value: String) -> Self {
    match value.as_str() {
      "library" => PackageType::Library,
      "contao-module" => PackageType::ContaoModule,
      "metapackage" => PackageType::MetaPackage,
      _ => PackageType::Other(value),
    }
  }
}

impl std::fmt::Display for PackageType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Autoload rules a package declares for its classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoloadRules {
  /// PSR-0 namespace prefixes and the relative paths they map to.
  pub psr0: Vec<(String, String)>,
  /// Relative paths scanned for classes.
  pub classmap: Vec<String>,
}

impl AutoloadRules {
  /// All declared source paths: PSR-0 paths first, then classmap paths.
  pub fn source_paths(&self) -> impl Iterator<Item = &str> {
    self
      .psr0
      .iter()
      .map(|(_, path)| path.as_str())
      .chain(self.classmap.iter().map(String::as_str))
  }

  pub fn is_empty(&self) -> bool {
    self.psr0.is_empty() && self.classmap.is_empty()
  }
}

/// Contao placement hints from `extra.contao`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModulePlacement {
  /// Package-relative source → package-root-relative destination, in declaration order.
  pub file_mappings: Vec<(String, String)>,
  /// Package-relative paths of scripts to run once after installation.
  pub bootstrap_scripts: Vec<String>,
}

/// One entry of the locked dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDependency {
  /// Package name in `vendor/name` form.
  pub name: String,
  pub kind: PackageType,
  pub version: String,
  pub source_url: Option<String>,
  pub source_reference: Option<String>,
  pub dist_reference: Option<String>,
  pub homepage: Option<String>,
  pub license: Vec<String>,
  /// Release timestamp as written by the resolver.
  pub time: String,
  pub autoload: AutoloadRules,
  pub placement: ModulePlacement,
}

impl ResolvedDependency {
  /// Commit reference of the installed revision, preferring source control over the dist archive.
  pub fn commit_ref(&self) -> Option<&str> {
    self.source_reference.as_deref().or(self.dist_reference.as_deref())
  }
}

/// The parsed lock file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockFile {
  /// Packages in the order the resolver wrote them.
  pub packages: Vec<ResolvedDependency>,
}

impl LockFile {
  /// Load a lock file from the given path.
  pub fn load(path: &Path) -> Result<Self, LockError> {
    let content = fs::read_to_string(path).map_err(|source| LockError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Parse lock file JSON.
  pub fn from_json(content: &str) -> Result<Self, LockError> {
    let raw: RawLock = serde_json::from_str(content)?;
    Ok(Self {
      packages: raw.packages.into_iter().map(ResolvedDependency::from).collect(),
    })
  }

}

#[derive(Debug, Deserialize)]
struct RawLock {
  #[serde(default)]
  packages: Vec<RawPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawReference {
  url: Option<String>,
  reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAutoload {
  #[serde(rename = "psr-0", default)]
  psr0: OrderedMap<OneOrMany>,
  #[serde(default)]
  classmap: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContaoExtra {
  #[serde(default)]
  sources: OrderedMap<String>,
  #[serde(default)]
  symlinks: OrderedMap<String>,
  #[serde(default)]
  runonce: PathList,
}

#[derive(Debug, Default, Deserialize)]
struct RawExtra {
  #[serde(default)]
  contao: RawContaoExtra,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
  name: String,
  version: String,
  #[serde(rename = "type")]
  kind: Option<String>,
  #[serde(default)]
  time: String,
  #[serde(default)]
  license: Vec<String>,
  homepage: Option<String>,
  source: Option<RawReference>,
  dist: Option<RawReference>,
  #[serde(default)]
  autoload: RawAutoload,
  #[serde(default)]
  extra: RawExtra,
}

impl From<RawPackage> for ResolvedDependency {
  fn from(raw: RawPackage) -> Self {
    let kind = match raw.kind {
      Some(kind) => PackageType::from(kind),
      None => {
        warn!(name = %raw.name, "locked package declares no type, assembling it as a library");
        PackageType::Library
      }
    };

    let psr0 = raw
      .autoload
      .psr0
      .0
      .into_iter()
      .flat_map(|(prefix, paths)| paths.into_vec().into_iter().map(move |p| (prefix.clone(), p)))
      .collect();

    let contao = raw.extra.contao;
    let file_mappings = merge_mappings(contao.sources.0, contao.symlinks.0);

    let source = raw.source.unwrap_or_default();
    let dist = raw.dist.unwrap_or_default();

    ResolvedDependency {
      name: raw.name,
      kind,
      version: raw.version,
      source_url: source.url,
      source_reference: source.reference,
      dist_reference: dist.reference,
      homepage: raw.homepage,
      license: raw.license,
      time: raw.time,
      autoload: AutoloadRules {
        psr0,
        classmap: raw.autoload.classmap,
      },
      placement: ModulePlacement {
        file_mappings,
        bootstrap_scripts: contao.runonce.into_vec(),
      },
    }
  }
}

/// Sources first, then symlinks; a symlink redeclaring a source keeps the
/// source's position but takes the symlink's destination.
fn merge_mappings(sources: Vec<(String, String)>, symlinks: Vec<(String, String)>) -> Vec<(String, String)> {
  let mut merged = sources;
  for (source, target) in symlinks {
    match merged.iter_mut().find(|(s, _)| *s == source) {
      Some(existing) => existing.1 = target,
      None => merged.push((source, target)),
    }
  }
  merged
}
