mod build;
mod report;

pub use build::{BuildArgs, cmd_build};
pub use report::cmd_report;
