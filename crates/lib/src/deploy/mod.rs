//! Deployment of the assembled package tree.
//!
//! The tree is either copied to an output directory or packed into a zip
//! archive whose entries are relative to the package root.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::consts::DEFAULT_OUTPUT;
use crate::util::fs::{CopyError, copy_path};

/// Errors raised while deploying the package.
#[derive(Debug, Error)]
pub enum DeployError {
  #[error(transparent)]
  Copy(#[from] CopyError),

  #[error("failed to read package tree: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("failed to write archive {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write archive {}: {source}", path.display())]
  Zip {
    path: PathBuf,
    #[source]
    source: ZipError,
  },
}

/// Form of the deployed package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployTarget {
  Directory,
  #[default]
  Archive,
}

/// Final output path.
///
/// The default output name is replaced by `<encoded>` for directories and
/// `<encoded>.zip` for archives. Any other path is used as given.
pub fn output_path(requested: &Path, encoded_name: &str, target: DeployTarget) -> PathBuf {
  if requested != Path::new(DEFAULT_OUTPUT) {
    return requested.to_path_buf();
  }
  match target {
    DeployTarget::Directory => PathBuf::from(encoded_name),
    DeployTarget::Archive => PathBuf::from(format!("{}.zip", encoded_name)),
  }
}

/// Deploy `package` to `output`.
pub fn deploy(package: &Path, output: &Path, target: DeployTarget) -> Result<(), DeployError> {
  match target {
    DeployTarget::Directory => {
      let files = copy_path(package, output)?;
      info!(output = %output.display(), files, "created package directory");
    }
    DeployTarget::Archive => {
      let files = write_archive(package, output)?;
      info!(output = %output.display(), files, "created package archive");
    }
  }
  Ok(())
}

/// Pack `root` into a zip archive at `output`, replacing an existing file.
///
/// Returns the number of files added.
pub fn write_archive(root: &Path, output: &Path) -> Result<usize, DeployError> {
  let io_err = |source| DeployError::Io {
    path: output.to_path_buf(),
    source,
  };
  let zip_err = |source| DeployError::Zip {
    path: output.to_path_buf(),
    source,
  };

  if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(io_err)?;
  }

  let file = File::create(output).map_err(io_err)?;
  let mut zip = ZipWriter::new(BufWriter::new(file));
  let options = SimpleFileOptions::default();
  let mut files = 0;

  for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
    let entry = entry?;
    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let name = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    if entry.file_type().is_dir() {
      zip.add_directory(name, options).map_err(zip_err)?;
    } else {
      zip.start_file(name.as_str(), options).map_err(zip_err)?;
      let mut source = File::open(entry.path()).map_err(|source| DeployError::Io {
        path: entry.path().to_path_buf(),
        source,
      })?;
      io::copy(&mut source, &mut zip).map_err(io_err)?;
      debug!(entry = %name, "archived file");
      files += 1;
    }
  }

  zip.finish().map_err(zip_err)?;
  Ok(files)
}
