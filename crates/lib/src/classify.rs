//! Package classification: decides how each locked package is assembled.

use crate::lock::{PackageType, ResolvedDependency};

/// Why a package is left out of the nightly package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Listed in the build blacklist.
  Blacklisted,
  /// A metapackage has no content of its own.
  MetaPackage,
}

impl SkipReason {
  pub fn as_str(&self) -> &'static str {
    match self {
      SkipReason::Blacklisted => "blacklisted",
      SkipReason::MetaPackage => "metapackage",
    }
  }
}

/// Assembly strategy for one locked package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
  Skip(SkipReason),
  /// Copy declared file mappings, collect classes and runonce scripts.
  AssembleModule,
  /// Collect classes into a module named after the package.
  AssembleLibrary,
  /// The package type is not known; the build must stop.
  Fail { kind: String },
}

/// Returns `true` if `name` is on the blacklist.
pub fn is_blacklisted<S: AsRef<str>>(name: &str, blacklist: &[S]) -> bool {
  blacklist.iter().any(|entry| entry.as_ref() == name)
}

/// Classify a package. The blacklist is consulted before the package type.
pub fn classify<S: AsRef<str>>(dependency: &ResolvedDependency, blacklist: &[S]) -> Strategy {
  if is_blacklisted(&dependency.name, blacklist) {
    return Strategy::Skip(SkipReason::Blacklisted);
  }

  match &dependency.kind {
    PackageType::MetaPackage => Strategy::Skip(SkipReason::MetaPackage),
    PackageType::ContaoModule => Strategy::AssembleModule,
    PackageType::Library => Strategy::AssembleLibrary,
    PackageType::Other(kind) => Strategy::Fail { kind: kind.clone() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;

  use crate::lock::LockFile;

  fn blacklisted_names(dependencies: &[ResolvedDependency], blacklist: &[String]) -> BTreeSet<String> {
    dependencies
      .iter()
      .filter(|d| is_blacklisted(&d.name, blacklist))
      .map(|d| d.name.clone())
      .collect()
  }

  fn dependency(name: &str, kind: &str) -> ResolvedDependency {
    let json = format!(r#"{{"packages": [{{"name": "{}", "version": "1.0.0", "type": "{}"}}]}}"#, name, kind);
    LockFile::from_json(&json).unwrap().packages.remove(0)
  }

  #[test]
  fn dispatches_on_type() {
    let blacklist: [&str; 0] = [];
    assert_eq!(classify(&dependency("a/lib", "library"), &blacklist), Strategy::AssembleLibrary);
    assert_eq!(classify(&dependency("a/mod", "contao-module"), &blacklist), Strategy::AssembleModule);
    assert_eq!(
      classify(&dependency("a/meta", "metapackage"), &blacklist),
      Strategy::Skip(SkipReason::MetaPackage)
    );
  }

  #[test]
  fn unknown_type_fails() {
    let blacklist: [&str; 0] = [];
    assert_eq!(
      classify(&dependency("a/bundle", "symfony-bundle"), &blacklist),
      Strategy::Fail {
        kind: "symfony-bundle".to_string()
      }
    );
  }

  #[test]
  fn blacklist_wins_over_type() {
    let blacklist = ["contao/core", "a/bundle"];
    assert_eq!(
      classify(&dependency("contao/core", "metapackage"), &blacklist),
      Strategy::Skip(SkipReason::Blacklisted)
    );
    assert_eq!(
      classify(&dependency("a/bundle", "symfony-bundle"), &blacklist),
      Strategy::Skip(SkipReason::Blacklisted)
    );
  }

  #[test]
  fn blacklist_filter_is_idempotent() {
    let deps = vec![
      dependency("contao/core", "metapackage"),
      dependency("a/lib", "library"),
      dependency("b/extra", "library"),
    ];
    let blacklist = vec!["contao/core".to_string(), "b/extra".to_string()];

    let first = blacklisted_names(&deps, &blacklist);
    let kept: Vec<_> = deps.iter().filter(|d| !first.contains(&d.name)).cloned().collect();
    let second = blacklisted_names(&deps, &blacklist);

    assert_eq!(first, second);
    assert!(blacklisted_names(&kept, &blacklist).is_empty());
    assert_eq!(first.len(), 2);
  }
}
