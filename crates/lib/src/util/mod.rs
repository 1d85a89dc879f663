//! Shared utilities.
//!
//! Path prefix matching, recursive copying, PHP literal rendering and hashing.

pub mod fs;
pub mod hash;
pub mod php;
pub mod prefix;
