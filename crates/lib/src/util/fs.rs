//! Filesystem helpers for laying out the package tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Failure while copying a file or directory tree.
#[derive(Debug, Error)]
#[error("failed to copy '{}' to '{}': {source}", from.display(), to.display())]
pub struct CopyError {
  pub from: PathBuf,
  pub to: PathBuf,
  #[source]
  pub source: io::Error,
}

/// Copy a file or a directory tree from `source` to `target`.
///
/// Directories are copied recursively, preserving structure. Parent
/// directories of `target` are created as needed and existing files are
/// overwritten. Returns the number of files copied.
pub fn copy_path(source: &Path, target: &Path) -> Result<usize, CopyError> {
  let err = |from: &Path, to: &Path, source: io::Error| CopyError {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  };

  if !source.is_dir() {
    copy_file(source, target).map_err(|e| err(source, target, e))?;
    return Ok(1);
  }

  let mut copied = 0;
  for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
    let entry = entry.map_err(|e| err(source, target, io::Error::other(e)))?;
    let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
    let dest = target.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest).map_err(|e| err(entry.path(), &dest, e))?;
    } else {
      copy_file(entry.path(), &dest).map_err(|e| err(entry.path(), &dest, e))?;
      copied += 1;
    }
  }

  Ok(copied)
}

fn copy_file(source: &Path, target: &Path) -> io::Result<()> {
  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::copy(source, target)?;
  debug!(from = %source.display(), to = %target.display(), "copied file");
  Ok(())
}

/// Failure while reading or writing a single path.
#[derive(Debug, Error)]
#[error("failed to access '{}': {source}", path.display())]
pub struct FileError {
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

impl FileError {
  /// Error adapter for `map_err` at `path`.
  pub fn at(path: &Path) -> impl FnOnce(io::Error) -> FileError + '_ {
    move |source| FileError {
      path: path.to_path_buf(),
      source,
    }
  }
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<(), FileError> {
  match fs::remove_dir_all(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(FileError::at(path)(e)),
  }
}

/// Read a file, returning `None` if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>, FileError> {
  match fs::read_to_string(path) {
    Ok(content) => Ok(Some(content)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(FileError::at(path)(e)),
  }
}

/// Write `content` to `path`, creating parent directories first.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<(), FileError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(FileError::at(parent))?;
  }
  fs::write(path, content).map_err(FileError::at(path))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn copies_single_file_into_missing_parent() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("a.txt");
    fs::write(&src, "hello").unwrap();

    let dest = temp.path().join("deep/nested/b.txt");
    let copied = copy_path(&src, &dest).unwrap();

    assert_eq!(copied, 1);
    assert_eq!(fs::read_to_string(dest).unwrap(), "hello");
  }

  #[test]
  fn copies_directory_tree() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("sub/empty")).unwrap();
    fs::write(src.join("top.php"), "top").unwrap();
    fs::write(src.join("sub/inner.php"), "inner").unwrap();

    let dest = temp.path().join("out/target");
    let copied = copy_path(&src, &dest).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(fs::read_to_string(dest.join("top.php")).unwrap(), "top");
    assert_eq!(fs::read_to_string(dest.join("sub/inner.php")).unwrap(), "inner");
    assert!(dest.join("sub/empty").is_dir());
  }

  #[test]
  fn missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = copy_path(&temp.path().join("nope"), &temp.path().join("dest"));

    let err = result.unwrap_err();
    assert!(err.to_string().contains("nope"));
  }

  #[test]
  fn remove_missing_dir_is_ok() {
    let temp = TempDir::new().unwrap();
    remove_dir_if_exists(&temp.path().join("absent")).unwrap();
  }

  #[test]
  fn write_file_creates_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a/b/c.php");
    write_file(&path, "<?php\n").unwrap();
    assert_eq!(read_optional(&path).unwrap().as_deref(), Some("<?php\n"));
  }

  #[test]
  fn write_error_names_path() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file");
    fs::write(&blocker, "").unwrap();

    let err = write_file(&blocker.join("child.txt"), "x").unwrap_err();
    assert_eq!(err.path, blocker);
  }

  #[test]
  fn read_optional_missing_is_none() {
    let temp = TempDir::new().unwrap();
    assert!(read_optional(&temp.path().join("absent.php")).unwrap().is_none());
  }
}
