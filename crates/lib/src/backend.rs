//! Backend summary module.
//!
//! Registers a backend module in the nightly module that lists every packaged
//! dependency with version, release time and licenses. The module class is
//! added to the build class map so the generated class index loads it.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::info;

use crate::build::state::BuildState;
use crate::report::{PackageInfo, PackageReport};
use crate::util::fs::{FileError, write_file};
use crate::util::hash::name_hash;
use crate::util::php::string_literal;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

/// Substitute `{key}` placeholders in one pass so values are never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
  PLACEHOLDER
    .replace_all(template, |caps: &Captures| {
      values
        .iter()
        .find(|(key, _)| *key == &caps[1])
        .map(|(_, value)| value.to_string())
        .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Contains {class}, {name} and {section} placeholders.
const CONFIG_TEMPLATE: &str = "<?php
$GLOBALS['TL_LANG']['MOD'][{class}] = array({name});
$GLOBALS['BE_MOD'][{section}][{class}] = array('callback' => {class});
";

/// Contains {class}, {module} and {html} placeholders.
const CLASS_TEMPLATE: &str = r#"<?php
/**
 * Auto generated summary class for nightly build.
 */
class {class} extends \BackendModule
{
    /**
     * Display the overview.
     */
    public function generate()
    {
        $GLOBALS['TL_CSS'][] = '{module}/html/style.css';
        return {html};
    }

    // No-Op to make the class non abstract.
    protected function compile(){}
}
"#;

const TABLE_HEAD: &str = r#"<div class="tl_message"><table class="table table-striped nightlyinfo">
    <colgroup>
        <col width="200" />
        <col width="150" />
        <col width="90" />
        <col width="90" />
    </colgroup>
    <thead>
        <tr>
            <th class="name">Package</th>
            <th class="version">Version</th>
            <th class="time">Time</th>
            <th class="license">License</th>
        </tr>
    </thead>
    <tbody>
"#;

const TABLE_FOOT: &str = "    </tbody>
</table></div>
";

const STYLE_CSS: &str = "table{border-top:1px solid #d6d6d6;border-left:1px solid #d6d6d6;width:100%;margin-bottom:18px;}\
th{text-align:left;background-color:#d6d6d6;padding:1px 6px 3px;}\
td{border-right:1px solid #d6d6d6;border-bottom:1px solid #d6d6d6;padding:3px 6px;}\
tr:nth-child(even){background:#ebfdd7;}\
tr:nth-child(odd){background:#fff;}";

const HTACCESS: &str = "<IfModule mod_authz_core.c>
    Require all granted
</IfModule>
<IfModule !mod_authz_core.c>
    Order Deny,Allow
    Allow from all
</IfModule>
";

/// Labels of the backend module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendLabels {
  /// Encoded project name; identifies the module class.
  pub encoded_name: String,
  /// Label shown in the backend navigation.
  pub name: String,
  /// Navigation section the module is listed under.
  pub section: String,
}

/// Class name of the backend module of a build.
pub fn module_class(encoded_name: &str) -> String {
  format!("BackendModule_{}", name_hash(encoded_name))
}

fn escape_html(value: &str) -> String {
  value
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

fn link(url: &str, label: &str) -> String {
  format!(
    r#"<a href="{}" target="_blank">{}</a>"#,
    escape_html(url),
    escape_html(label)
  )
}

fn render_row(package: &PackageInfo) -> String {
  let name = match package.url.as_deref() {
    Some(url) if url.starts_with("http://") || url.starts_with("https://") => link(url, &package.name),
    _ => escape_html(&package.name),
  };
  let version = escape_html(&package.version).replace(' ', "&nbsp;");
  let licenses: String = package
    .licenses
    .iter()
    .map(|l| {
      if l.is_resolved() {
        link(&l.url, &l.name)
      } else {
        escape_html(&l.name)
      }
    })
    .collect();

  format!(
    "        <tr>\n            <td class=\"name\">{}</td>\n            <td class=\"version\">{}</td>\n            <td class=\"time\">{}</td>\n            <td class=\"license\">{}</td>\n        </tr>\n",
    name,
    version,
    escape_html(&package.time),
    licenses
  )
}

/// Render the overview table.
pub fn render_table(report: &PackageReport) -> String {
  let mut html = String::from(TABLE_HEAD);
  for package in &report.packages {
    html.push_str(&render_row(package));
  }
  html.push_str(TABLE_FOOT);
  html
}

/// Render `config/config.php` of the nightly module.
pub fn render_config(labels: &BackendLabels) -> String {
  fill(
    CONFIG_TEMPLATE,
    &[
      ("class", string_literal(&module_class(&labels.encoded_name)).as_str()),
      ("name", string_literal(&labels.name).as_str()),
      ("section", string_literal(&labels.section).as_str()),
    ],
  )
}

/// Render the module class source.
pub fn render_class(labels: &BackendLabels, module_path: &str, report: &PackageReport) -> String {
  fill(
    CLASS_TEMPLATE,
    &[
      ("class", module_class(&labels.encoded_name).as_str()),
      ("module", module_path),
      ("html", string_literal(&render_table(report)).as_str()),
    ],
  )
}

/// Write the backend module into the nightly module and index its class.
///
/// Overwrites `config/config.php`; the autoloader appends to it later.
/// Returns the class name.
pub fn write_backend_module(
  state: &mut BuildState,
  labels: &BackendLabels,
  report: &PackageReport,
) -> Result<String, FileError> {
  let class = module_class(&labels.encoded_name);
  let module_dir = state.package_path(&state.nightly_module);

  write_file(&state.nightly_config_dir().join("config.php"), render_config(labels))?;
  write_file(
    &module_dir.join(format!("{}.php", class)),
    render_class(labels, &state.nightly_module, report),
  )?;
  write_file(&module_dir.join("html/style.css"), STYLE_CSS)?;
  write_file(&module_dir.join("html/.htaccess"), HTACCESS)?;

  let class_path = format!("{}/{}.php", state.nightly_module, class);
  state.class_map.insert(class.clone(), class_path);

  info!(class = %class, section = %labels.section, "generated backend module");
  Ok(class)
}
