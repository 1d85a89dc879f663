//! Locations of the build workspace.

pub mod paths;

pub use paths::{WORKSPACE_ENV, Workspace, workspace_root};
