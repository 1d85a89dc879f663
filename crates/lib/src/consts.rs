//! Built-in defaults shared across the crate.

use std::time::Duration;

pub const APP_NAME: &str = "nightly";

/// Packages never exported into a nightly package.
pub const DEFAULT_BLACKLIST: &[&str] = &["contao/core", "contao-community-alliance/composer-installer"];

/// Prefix of every Contao module directory inside the package.
pub const MODULES_DIR: &str = "system/modules";

/// Mapping targets matching this pattern are used as the module placement path.
pub const MODULE_ROOT_PATTERN: &str = r"^system/modules/[^/]+";

/// Subdirectory of a module receiving classes not covered by explicit mappings.
pub const CLASSES_DIR: &str = "classes";

/// Contao versions below this one need the legacy class cache registration.
pub const LEGACY_VERSION_THRESHOLD: &str = "3";

pub const DEFAULT_BACKEND_SECTION: &str = "Nightly builds";

pub const DEFAULT_PROJECT_FILE: &str = "nightly.composer.json";
pub const DEFAULT_OUTPUT: &str = "package.zip";

pub const REPORT_FILENAME: &str = "nightly.txt";

pub const COMPOSER_PHAR: &str = "composer.phar";
pub const COMPOSER_URL: &str = "https://getcomposer.org/composer-stable.phar";
pub const RESOLVER_TIMEOUT: Duration = Duration::from_secs(120);

/// Length of the commit reference appended to development versions.
pub const SHORT_REF_LEN: usize = 6;
