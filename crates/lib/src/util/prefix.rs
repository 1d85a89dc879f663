//! Literal path prefix matching for exclusion lists.
//!
//! Matching is on raw strings, not path segments: an entry `/a/foo` also
//! excludes `/a/foobar`. Callers pass paths built the same way on both sides,
//! no separator or trailing slash normalization is performed.

/// Returns `true` if `candidate` starts with any entry of `prefixes`.
pub fn is_excluded<S: AsRef<str>>(candidate: &str, prefixes: &[S]) -> bool {
  prefixes.iter().any(|prefix| candidate.starts_with(prefix.as_ref()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_match_is_excluded() {
    assert!(is_excluded("/repo/vendor/a/b/src", &["/repo/vendor/a/b/src"]));
  }

  #[test]
  fn nested_path_is_excluded() {
    assert!(is_excluded("/repo/vendor/a/b/src/Foo.php", &["/repo/vendor/a/b/src"]));
  }

  #[test]
  fn sibling_with_common_prefix_is_excluded() {
    // Literal prefix semantics, not segment-aware.
    assert!(is_excluded("/a/foobar", &["/a/foo"]));
  }

  #[test]
  fn unrelated_path_is_kept() {
    assert!(!is_excluded("/repo/vendor/a/b/lib", &["/repo/vendor/a/b/src", "/other"]));
  }

  #[test]
  fn empty_list_excludes_nothing() {
    let empty: [&str; 0] = [];
    assert!(!is_excluded("/anything", &empty));
  }

  #[test]
  fn parent_of_entry_is_not_excluded() {
    assert!(!is_excluded("/repo/vendor", &["/repo/vendor/a"]));
  }
}
