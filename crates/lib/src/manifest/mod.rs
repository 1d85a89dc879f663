//! The project manifest: the composer.json describing the nightly package.
//!
//! Besides the usual composer fields the builder reads its own settings from
//! `extra.nightly-builder`:
//!
//! ```json
//! {
//!   "name": "vendor/project",
//!   "require": { "vendor/module": "dev-master" },
//!   "extra": {
//!     "nightly-builder": {
//!       "blacklist": ["vendor/unwanted"],
//!       "backend-name": "My nightly",
//!       "backend-section": "Nightly builds"
//!     }
//!   }
//! }
//! ```

mod types;

pub use types::*;
