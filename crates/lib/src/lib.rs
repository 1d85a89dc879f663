//! nightly-lib: Core types and logic for the nightly package builder
//!
//! This crate assembles a distributable Contao package from a composer
//! project:
//! - `ProjectManifest`: the input composer.json and its builder settings
//! - `LockFile`: the resolver's pinned dependency graph
//! - `BuildState`: per-build working state (class map, runonce scripts)
//! - `build`: the orchestrator sequencing assembly, autoload generation and reporting

pub mod assemble;
pub mod autoload;
pub mod backend;
pub mod build;
pub mod classify;
pub mod classmap;
pub mod consts;
pub mod deploy;
pub mod lock;
pub mod manifest;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod runonce;
pub mod util;
