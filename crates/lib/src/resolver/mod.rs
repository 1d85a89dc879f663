//! Dependency resolution through composer.
//!
//! The resolver is treated as a black box: `composer.phar update --no-dev`
//! runs in the repository work directory and leaves `composer.lock` and
//! `vendor/` behind. A local `composer.phar` is downloaded on first use.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::consts::{COMPOSER_PHAR, COMPOSER_URL, RESOLVER_TIMEOUT};

/// Errors raised while running the resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
  #[error("failed to download {url}: {message}")]
  Download { url: String, message: String },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("resolver did not finish within {timeout:?}")]
  Timeout { timeout: Duration },

  /// The resolver exited unsuccessfully. `stderr` is the tool's error stream, verbatim.
  #[error("resolver failed (exit code {code:?}):\n{stderr}")]
  ToolFailed { code: Option<i32>, stderr: String },
}

/// How the resolver is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
  /// PHP interpreter used to run `composer.phar`.
  pub php: String,
  pub timeout: Duration,
  /// Where `composer.phar` is downloaded from when missing.
  pub composer_url: String,
}

impl Default for ResolverOptions {
  fn default() -> Self {
    Self {
      php: "php".to_string(),
      timeout: RESOLVER_TIMEOUT,
      composer_url: COMPOSER_URL.to_string(),
    }
  }
}

/// Download `composer.phar` into `repository` unless it is already there.
///
/// Returns `true` if a download happened.
pub async fn ensure_composer(repository: &Path, url: &str) -> Result<bool, ResolverError> {
  let phar = repository.join(COMPOSER_PHAR);
  if phar.exists() {
    debug!(path = %phar.display(), "using existing composer");
    return Ok(false);
  }

  info!(url = %url, "installing local copy of composer");
  let download_err = |message: String| ResolverError::Download {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| download_err(e.to_string()))?;
  if !response.status().is_success() {
    return Err(download_err(format!("HTTP {}", response.status())));
  }
  let bytes = response.bytes().await.map_err(|e| download_err(e.to_string()))?;

  tokio::fs::write(&phar, &bytes)
    .await
    .map_err(|source| ResolverError::Write { path: phar.clone(), source })?;

  info!(path = %phar.display(), size = bytes.len(), "download complete");
  Ok(true)
}

/// Log every line of a child stream, returning the collected text.
async fn drain<R: AsyncRead + Unpin>(stream: Option<R>, name: &'static str) -> String {
  let mut collected = String::new();
  let Some(stream) = stream else {
    return collected;
  };

  let mut lines = BufReader::new(stream).lines();
  while let Ok(Some(line)) = lines.next_line().await {
    info!(stream = name, "{}", line);
    collected.push_str(&line);
    collected.push('\n');
  }
  collected
}

/// Run `<php> composer.phar update --no-dev` in `repository`.
///
/// Output is streamed to the log. The child is killed when `options.timeout`
/// elapses.
pub async fn run_update(repository: &Path, options: &ResolverOptions) -> Result<(), ResolverError> {
  info!(repository = %repository.display(), "installing dependencies");

  let mut child = Command::new(&options.php)
    .arg(COMPOSER_PHAR)
    .args(["update", "--no-dev"])
    .current_dir(repository)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .map_err(|source| ResolverError::Spawn {
      program: options.php.clone(),
      source,
    })?;

  let stdout = tokio::spawn(drain(child.stdout.take(), "stdout"));
  let stderr = tokio::spawn(drain(child.stderr.take(), "stderr"));

  let waited = timeout(options.timeout, child.wait()).await;
  let status = match waited {
    Ok(status) => status.map_err(|source| ResolverError::Spawn {
      program: options.php.clone(),
      source,
    })?,
    Err(_) => {
      let _ = child.kill().await;
      return Err(ResolverError::Timeout {
        timeout: options.timeout,
      });
    }
  };

  let _ = stdout.await;
  let stderr = stderr.await.unwrap_or_default();

  if !status.success() {
    return Err(ResolverError::ToolFailed {
      code: status.code(),
      stderr,
    });
  }

  debug!(code = ?status.code(), "resolver finished");
  Ok(())
}

/// Make sure composer is present, then update the repository.
pub async fn resolve(repository: &Path, options: &ResolverOptions) -> Result<(), ResolverError> {
  ensure_composer(repository, &options.composer_url).await?;
  run_update(repository, options).await
}
