//! The locked dependency graph produced by the resolver.
//!
//! `composer.lock` pins every (transitive) dependency of the project. Only
//! the fields the builder needs are read:
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "name": "vendor/module",
//!       "version": "dev-master",
//!       "type": "contao-module",
//!       "time": "2014-01-02 03:04:05",
//!       "license": ["LGPL-3.0+"],
//!       "source": { "url": "https://github.com/vendor/module.git", "reference": "a1b2c3d4e5" },
//!       "autoload": { "psr-0": { "Vendor\\Module": "src/" }, "classmap": ["classes/"] },
//!       "extra": { "contao": { "sources": { "src": "system/modules/module" }, "runonce": ["runonce.php"] } }
//!     }
//!   ]
//! }
//! ```

pub(crate) mod serde_helpers;
mod types;

pub use types::*;
