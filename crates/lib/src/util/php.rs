//! Rendering of PHP literals for generated source files.
//!
//! Output follows the layout of PHP's own `var_export()` so generated files
//! look the same as ones produced by PHP tooling.

/// Render `value` as a single quoted PHP string literal.
pub fn string_literal(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('\'');
  for c in value.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' => out.push_str("\\'"),
      _ => out.push(c),
    }
  }
  out.push('\'');
  out
}

/// Render string pairs as a PHP associative array literal.
pub fn array_literal<'a, I>(entries: I) -> String
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  let mut out = String::from("array (\n");
  for (key, value) in entries {
    out.push_str(&format!("  {} => {},\n", string_literal(key), string_literal(value)));
  }
  out.push(')');
  out
}
