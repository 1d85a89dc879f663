//! Static discovery of PHP class declarations.
//!
//! Every `.php` and `.inc` file below a path is reduced with
//! [`strip_php`](super::lexer::strip_php) and searched for `namespace`,
//! `class`, `interface`, `trait` and `enum` declarations. Files that cannot
//! be read or reduced are reported as warnings and skipped; a scan never fails.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::ClassMap;
use super::lexer::strip_php;

const PHP_EXTENSIONS: &[&str] = &["php", "inc"];

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)(?:^|[^\w$:>\\])(?:(class|interface|trait|enum)\s+([a-z_\x{80}-\x{10FFFF}][a-z0-9_\x{80}-\x{10FFFF}]*)|namespace(\s+[a-z_\x{80}-\x{10FFFF}][a-z0-9_\x{80}-\x{10FFFF}]*(?:\s*\\\s*[a-z_\x{80}-\x{10FFFF}][a-z0-9_\x{80}-\x{10FFFF}]*)*)?\s*[{;])",
  )
  .expect("valid regex")
});

/// A file that was skipped during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
  pub path: PathBuf,
  pub message: String,
}

/// Result of scanning a path for classes.
#[derive(Debug, Default)]
pub struct ClassMapScan {
  /// Discovered classes mapped to the absolute path of their file.
  pub classes: ClassMap,
  pub warnings: Vec<ScanWarning>,
}

impl ClassMapScan {
  fn warn(&mut self, path: &Path, message: String) {
    warn!(path = %path.display(), %message, "skipping file during class scan");
    self.warnings.push(ScanWarning {
      path: path.to_path_buf(),
      message,
    });
  }
}

/// Scan a file or directory tree for PHP classes.
pub fn scan_path(root: &Path) -> ClassMapScan {
  let mut scan = ClassMapScan::default();

  for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
        scan.warn(&path, e.to_string());
        continue;
      }
    };

    if !entry.file_type().is_file() || !has_php_extension(entry.path()) {
      continue;
    }

    let path = entry.path();
    let content = match fs::read(path) {
      Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
      Err(e) => {
        scan.warn(path, e.to_string());
        continue;
      }
    };

    match find_classes(&content) {
      Ok(classes) => {
        let file = path.to_string_lossy();
        for class in classes {
          if let Some(previous) = scan.classes.insert(class.clone(), &*file) {
            debug!(class = %class, previous = %previous, file = %file, "ambiguous class resolution");
          }
        }
      }
      Err(e) => scan.warn(path, e.to_string()),
    }
  }

  scan
}

fn has_php_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| PHP_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Fully qualified names of the types declared in `source`, in declaration order.
pub fn find_classes(source: &str) -> Result<Vec<String>, super::lexer::LexError> {
  let lower = source.to_ascii_lowercase();
  if !["class", "interface", "trait", "enum"].iter().any(|k| lower.contains(k)) {
    return Ok(Vec::new());
  }

  let code = strip_php(source)?;
  let mut namespace = String::new();
  let mut classes = Vec::new();

  for caps in DECLARATION.captures_iter(&code) {
    if let Some(name) = caps.get(2) {
      let name = name.as_str();
      if name.eq_ignore_ascii_case("extends") || name.eq_ignore_ascii_case("implements") {
        // anonymous class
        continue;
      }
      if namespace.is_empty() {
        classes.push(name.to_string());
      } else {
        classes.push(format!("{}\\{}", namespace, name));
      }
    } else {
      namespace = caps
        .get(3)
        .map(|ns| ns.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default();
    }
  }

  Ok(classes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  mod find_classes {
    use super::*;

    #[test]
    fn global_class() {
      assert_eq!(find_classes("<?php\nclass Foo {}").unwrap(), vec!["Foo"]);
    }

    #[test]
    fn namespaced_declarations() {
      let src = "<?php\nnamespace Acme\\Module;\n\ninterface Api {}\nabstract class Base {}\nfinal class Impl extends Base implements Api {}\ntrait Helper {}";
      assert_eq!(
        find_classes(src).unwrap(),
        vec!["Acme\\Module\\Api", "Acme\\Module\\Base", "Acme\\Module\\Impl", "Acme\\Module\\Helper"]
      );
    }

    #[test]
    fn multiple_namespace_blocks() {
      let src = "<?php\nnamespace First { class A {} }\nnamespace Second { class B {} }\nnamespace { class C {} }";
      assert_eq!(find_classes(src).unwrap(), vec!["First\\A", "Second\\B", "C"]);
    }

    #[test]
    fn class_constant_and_anonymous_classes_are_ignored() {
      let src = "<?php\n$x = Foo::class;\n$y = new class extends Bar {};\n$z = $obj->class;\nclass Real {}";
      assert_eq!(find_classes(src).unwrap(), vec!["Real"]);
    }

    #[test]
    fn enums_are_found() {
      assert_eq!(
        find_classes("<?php namespace N; enum Suit: string { case Hearts = 'H'; }").unwrap(),
        vec!["N\\Suit"]
      );
    }

    #[test]
    fn declarations_in_comments_are_ignored() {
      assert!(find_classes("<?php /* class Hidden {} */ // class Other").unwrap().is_empty());
    }

    #[test]
    fn no_keywords_short_circuits() {
      assert!(find_classes("<?php return array('a' => 1);").unwrap().is_empty());
    }
  }

  mod scan_path {
    use super::*;

    #[test]
    fn scans_directory_tree() {
      let temp = TempDir::new().unwrap();
      fs::create_dir_all(temp.path().join("src/Sub")).unwrap();
      fs::write(temp.path().join("src/A.php"), "<?php class A {}").unwrap();
      fs::write(temp.path().join("src/Sub/B.php"), "<?php namespace Sub; class B {}").unwrap();
      fs::write(temp.path().join("src/legacy.inc"), "<?php class Legacy {}").unwrap();
      fs::write(temp.path().join("src/readme.txt"), "class NotPhp").unwrap();

      let scan = scan_path(&temp.path().join("src"));

      assert!(scan.warnings.is_empty());
      assert_eq!(scan.classes.len(), 3);
      let b = scan.classes.get("Sub\\B").unwrap();
      assert!(b.ends_with("B.php"));
      assert!(!scan.classes.contains("NotPhp"));
    }

    #[test]
    fn scans_single_file() {
      let temp = TempDir::new().unwrap();
      let file = temp.path().join("Single.php");
      fs::write(&file, "<?php class Single {}").unwrap();

      let scan = scan_path(&file);
      let expected = file.to_string_lossy().into_owned();
      assert_eq!(scan.classes.get("Single"), Some(expected.as_str()));
    }

    #[test]
    #[traced_test]
    fn malformed_file_is_skipped_with_warning() {
      let temp = TempDir::new().unwrap();
      fs::write(temp.path().join("Broken.php"), "<?php class Broken { /* never closed").unwrap();
      fs::write(temp.path().join("Good.php"), "<?php class Good {}").unwrap();

      let scan = scan_path(temp.path());

      assert!(scan.classes.contains("Good"));
      assert!(!scan.classes.contains("Broken"));
      assert_eq!(scan.warnings.len(), 1);
      assert!(scan.warnings[0].path.ends_with("Broken.php"));
      assert!(logs_contain("skipping file during class scan"));
    }

    #[test]
    #[traced_test]
    fn truncated_heredoc_is_skipped_with_warning() {
      for opener in ["<<<'EOT", "<<<\"EOT"] {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Bad.php"), format!("<?php class Bad {{}} $x = {}", opener)).unwrap();
        fs::write(temp.path().join("Good.php"), "<?php class Good {}").unwrap();

        let scan = scan_path(temp.path());

        assert!(scan.classes.contains("Good"));
        assert!(!scan.classes.contains("Bad"));
        assert_eq!(scan.warnings.len(), 1);
        assert!(scan.warnings[0].path.ends_with("Bad.php"));
      }
    }

    #[test]
    #[traced_test]
    fn missing_path_is_a_warning() {
      let temp = TempDir::new().unwrap();
      let scan = scan_path(&temp.path().join("missing"));

      assert!(scan.classes.is_empty());
      assert_eq!(scan.warnings.len(), 1);
      assert!(logs_contain("skipping file during class scan"));
    }
  }
}
