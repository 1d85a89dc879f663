use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Overrides the directory the work directories are created in.
pub const WORKSPACE_ENV: &str = "NIGHTLY_WORKSPACE";

/// Returns the directory holding the build work directories.
///
/// `NIGHTLY_WORKSPACE` if set and non-empty, otherwise the current directory.
pub fn workspace_root() -> io::Result<PathBuf> {
  let root = match env::var_os(WORKSPACE_ENV) {
    Some(dir) if !dir.is_empty() => PathBuf::from(dir),
    _ => env::current_dir()?,
  };
  Ok(dunce::canonicalize(&root).unwrap_or(root))
}

/// Work directories of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  /// Resolver project: `composer.json`, `composer.lock`, `vendor/`.
  pub repository: PathBuf,
  /// Assembled package tree. Cleared at the start of every build.
  pub package: PathBuf,
}

impl Workspace {
  /// `build_repository_<encoded>` and `build_package_<encoded>` below `root`.
  pub fn new(root: &Path, encoded_name: &str) -> Self {
    Self {
      repository: root.join(format!("build_repository_{}", encoded_name)),
      package: root.join(format!("build_package_{}", encoded_name)),
    }
  }

  pub fn composer_json(&self) -> PathBuf {
    self.repository.join("composer.json")
  }

  pub fn composer_lock(&self) -> PathBuf {
    self.repository.join(crate::lock::LOCK_FILENAME)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  fn work_directories_use_encoded_name() {
    let ws = Workspace::new(Path::new("/work"), "acme-site");
    assert_eq!(ws.repository, PathBuf::from("/work/build_repository_acme-site"));
    assert_eq!(ws.package, PathBuf::from("/work/build_package_acme-site"));
    assert_eq!(ws.composer_lock(), PathBuf::from("/work/build_repository_acme-site/composer.lock"));
  }

  #[test]
  #[serial]
  fn env_overrides_current_dir() {
    let temp = TempDir::new().unwrap();
    let expected = dunce::canonicalize(temp.path()).unwrap();
    temp_env::with_var(WORKSPACE_ENV, Some(temp.path()), || {
      assert_eq!(workspace_root().unwrap(), expected);
    });
  }

  #[test]
  #[serial]
  fn empty_env_falls_back_to_current_dir() {
    temp_env::with_var(WORKSPACE_ENV, Some(""), || {
      let cwd = env::current_dir().unwrap();
      assert_eq!(workspace_root().unwrap(), dunce::canonicalize(&cwd).unwrap_or(cwd));
    });
  }
}
