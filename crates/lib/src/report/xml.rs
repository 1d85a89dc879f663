//! XML version report.
//!
//! ```text
//! <versioninfo>
//!     <extension>
//!         <name/> <maintainer/> <hash/> <lastchange/>
//!     </extension>
//! </versioninfo>
//! ```
//!
//! `maintainer` is the homepage, or `other` without one. `hash` carries the
//! display version.

use std::path::Path;

use super::PackageReport;
use crate::util::fs::{FileError, write_file};

fn escape(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&apos;"),
      _ => out.push(c),
    }
  }
  out
}

/// Render the XML report.
pub fn render_xml(report: &PackageReport) -> String {
  let mut xml = String::from("<versioninfo>\n");
  for package in &report.packages {
    xml.push_str(&format!(
      "\t<extension>\n\t\t<name>{}</name>\n\t\t<maintainer>{}</maintainer>\n\t\t<hash>{}</hash>\n\t\t<lastchange>{}</lastchange>\n\t</extension>\n",
      escape(&package.name),
      escape(package.homepage.as_deref().unwrap_or("other")),
      escape(&package.version),
      escape(&package.time),
    ));
  }
  xml.push_str("</versioninfo>\n");
  xml
}

/// Write the XML report to `path`.
pub fn write_xml_report(path: &Path, report: &PackageReport) -> Result<(), FileError> {
  write_file(path, render_xml(report))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::prepare_package_information;
  use crate::report::tests::dependency;

  fn child_text<'a, 'input>(node: roxmltree::Node<'a, 'input>, tag: &str) -> &'a str {
    node
      .children()
      .find(|n| n.has_tag_name(tag))
      .and_then(|n| n.text())
      .unwrap_or_default()
  }

  #[test]
  fn one_extension_per_package() {
    let mut a = dependency("a/one", "dev-master");
    a.homepage = Some("https://one.org/?a=1&b=2".into());
    a.source_reference = Some("abcdef0123".into());
    let b = dependency("b/two", "2.0.0");

    let xml = render_xml(&prepare_package_information(&[a, b], &[] as &[&str]));
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let root = doc.root_element();
    assert!(root.has_tag_name("versioninfo"));
    let extensions: Vec<_> = root.children().filter(|n| n.has_tag_name("extension")).collect();
    assert_eq!(extensions.len(), 2);

    assert_eq!(child_text(extensions[0], "name"), "a/one");
    assert_eq!(child_text(extensions[0], "maintainer"), "https://one.org/?a=1&b=2");
    assert_eq!(child_text(extensions[0], "hash"), "dev-master @ abcdef");
    assert_eq!(child_text(extensions[0], "lastchange"), "2014-01-01 00:00:00");
    assert_eq!(child_text(extensions[1], "maintainer"), "other");
  }

  #[test]
  fn empty_report_is_bare_root() {
    assert_eq!(render_xml(&PackageReport::default()), "<versioninfo>\n</versioninfo>\n");
  }
}
