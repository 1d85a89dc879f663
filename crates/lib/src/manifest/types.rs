use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::consts::{DEFAULT_BACKEND_SECTION, DEFAULT_BLACKLIST, MODULES_DIR};
use crate::lock::serde_helpers::OrderedMap;

/// Errors raised while loading or validating the project manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read project manifest {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse project manifest: {0}")]
  Parse(#[from] serde_json::Error),

  /// The manifest lacks a field every composer project must declare.
  #[error("project does not seem to be a composer project: missing '{0}'")]
  MissingField(&'static str),
}

/// Builder settings from `extra.nightly-builder`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NightlyConfig {
  /// Package names appended to the built-in blacklist.
  #[serde(default)]
  pub blacklist: Vec<String>,
  /// Label of the generated backend module.
  pub backend_name: Option<String>,
  /// Backend navigation section the module is listed under.
  pub backend_section: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExtra {
  #[serde(rename = "nightly-builder", default)]
  nightly_builder: NightlyConfig,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
  name: Option<String>,
  require: Option<OrderedMap<String>>,
  #[serde(default)]
  extra: RawExtra,
}

/// A validated project manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
  /// Composer package name in `vendor/name` form.
  pub name: String,
  /// Required packages and their version constraints.
  pub require: BTreeMap<String, String>,
  pub nightly: NightlyConfig,
}

impl ProjectManifest {
  /// Load and validate the manifest at `path`.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Parse and validate manifest JSON.
  pub fn from_json(content: &str) -> Result<Self, ManifestError> {
    let raw: RawManifest = serde_json::from_str(content)?;
    let name = raw.name.ok_or(ManifestError::MissingField("name"))?;
    let require = raw.require.ok_or(ManifestError::MissingField("require"))?.0.into_iter().collect();

    Ok(Self {
      name,
      require,
      nightly: raw.extra.nightly_builder,
    })
  }

  /// The package name with `/` replaced by `-`, used for directory and file names.
  pub fn encoded_name(&self) -> String {
    encode_name(&self.name)
  }

  /// Module receiving the generated autoloader, runonce scripts and backend module.
  ///
  /// The `!` prefix sorts it before every other module so it is loaded first.
  pub fn nightly_module_path(&self) -> String {
    format!("{}/!{}", MODULES_DIR, self.encoded_name())
  }

  /// Built-in blacklist followed by the project's additions.
  pub fn blacklist(&self) -> Vec<String> {
    DEFAULT_BLACKLIST
      .iter()
      .map(|s| s.to_string())
      .chain(self.nightly.blacklist.iter().cloned())
      .collect()
  }

  pub fn backend_name(&self) -> String {
    self.nightly.backend_name.clone().unwrap_or_else(|| self.encoded_name())
  }

  pub fn backend_section(&self) -> String {
    self
      .nightly
      .backend_section
      .clone()
      .unwrap_or_else(|| DEFAULT_BACKEND_SECTION.to_string())
  }
}

/// `vendor/name` → `vendor-name`.
pub fn encode_name(name: &str) -> String {
  name.replace('/', "-")
}
