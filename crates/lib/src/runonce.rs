//! The runonce executor of the nightly module.
//!
//! Contao runs `config/runonce.php` once after installation. The generated
//! executor requires the collected `runonce_<n>.php` scripts in sequence
//! order and logs any exception a script throws without stopping the others.

use std::path::Path;

use tracing::info;

use crate::util::fs::{FileError, write_file};
use crate::util::hash::name_hash;

/// Contains {class} placeholder.
const EXECUTOR_TEMPLATE: &str = r#"<?php

class {class} extends System
{
    public function __construct()
    {
        parent::__construct();
    }

    public function run()
    {
        for ($i = 0; file_exists(__DIR__ . '/runonce_' . $i . '.php'); $i++) {
            try {
                require_once(__DIR__ . '/runonce_' . $i . '.php');
            }
            catch (\Exception $e) {
                trigger_error(
                    $e->getMessage() . "\n" . $e->getTraceAsString(),
                    E_USER_ERROR
                );
                $this->log(
                    $e->getMessage() . "\n" . $e->getTraceAsString(),
                    'RunonceExecutor run()',
                    'ERROR'
                );
            }
        }
    }
}

$executor = new {class}();
$executor->run();
"#;

/// Name of the executor class for a build.
pub fn executor_class(encoded_name: &str) -> String {
  format!("runonce_{}", name_hash(&format!("runonce_{}", encoded_name)))
}

/// Render the executor source.
pub fn render_executor(encoded_name: &str) -> String {
  EXECUTOR_TEMPLATE.replace("{class}", &executor_class(encoded_name))
}

/// Write `runonce.php` into `config_dir` if any scripts were collected.
///
/// Returns `false` without touching the filesystem when `script_count` is 0.
pub fn write_executor(config_dir: &Path, encoded_name: &str, script_count: usize) -> Result<bool, FileError> {
  if script_count == 0 {
    return Ok(false);
  }

  write_file(&config_dir.join("runonce.php"), render_executor(encoded_name))?;
  info!(scripts = script_count, "generated runonce executor");
  Ok(true)
}
