//! Reduction of PHP source to declaration-relevant code.
//!
//! Comments, string literals, heredocs and inline HTML are removed so that
//! the scanner does not pick up `class Foo` written inside a docblock or a
//! string. String literals are replaced by `''` to keep tokens separated.

use thiserror::Error;

/// Source that cannot be reduced reliably.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
  #[error("unterminated block comment")]
  UnterminatedComment,

  #[error("unterminated string literal")]
  UnterminatedString,

  #[error("unterminated heredoc '{0}'")]
  UnterminatedHeredoc(String),
}

const SPECIAL: &[u8] = b"?/#'\"<";

/// Strip everything but PHP code from `src`.
pub fn strip_php(src: &str) -> Result<String, LexError> {
  let bytes = src.as_bytes();
  let mut out = String::with_capacity(src.len());
  let mut i = 0;
  let mut in_php = false;

  while i < bytes.len() {
    if !in_php {
      let Some(open) = src[i..].find("<?") else {
        break;
      };
      i += open + 2;
      if src.get(i..i + 3).is_some_and(|s| s.eq_ignore_ascii_case("php")) {
        i += 3;
      } else if bytes.get(i) == Some(&b'=') {
        i += 1;
      }
      in_php = true;
      out.push('\n');
      continue;
    }

    let next_special = bytes[i..].iter().position(|b| SPECIAL.contains(b)).map(|p| i + p);
    let Some(j) = next_special else {
      out.push_str(&src[i..]);
      break;
    };
    out.push_str(&src[i..j]);
    i = j;

    let next = bytes.get(i + 1).copied();
    match (bytes[i], next) {
      (b'?', Some(b'>')) => {
        in_php = false;
        out.push('\n');
        i += 2;
      }
      (b'/', Some(b'/')) => i = skip_line_comment(src, i + 2),
      (b'#', n) if n != Some(b'[') => i = skip_line_comment(src, i + 1),
      (b'/', Some(b'*')) => {
        let end = src[i + 2..].find("*/").ok_or(LexError::UnterminatedComment)?;
        i += 2 + end + 2;
        out.push(' ');
      }
      (b'\'' | b'"', _) => {
        i = skip_quoted(bytes, i)?;
        out.push_str("''");
      }
      (b'<', _) if src[i..].starts_with("<<<") => match skip_heredoc(src, i)? {
        Some(end) => {
          i = end;
          out.push_str("''");
        }
        None => {
          out.push_str("<<<");
          i += 3;
        }
      },
      _ => {
        out.push(bytes[i] as char);
        i += 1;
      }
    }
  }

  Ok(out)
}

/// Index of the newline ending a line comment, or of a `?>` closing PHP mode.
fn skip_line_comment(src: &str, from: usize) -> usize {
  let rest = &src[from..];
  let newline = rest.find('\n');
  let close = rest.find("?>");
  match (newline, close) {
    (Some(n), Some(c)) => from + n.min(c),
    (Some(n), None) => from + n,
    (None, Some(c)) => from + c,
    (None, None) => src.len(),
  }
}

/// Index just past the closing quote of the literal starting at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> Result<usize, LexError> {
  let quote = bytes[start];
  let mut j = start + 1;
  while j < bytes.len() {
    match bytes[j] {
      b'\\' => j += 2,
      b if b == quote => return Ok(j + 1),
      _ => j += 1,
    }
  }
  Err(LexError::UnterminatedString)
}

fn is_ident_byte(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Index just past the closing identifier of the heredoc or nowdoc at `start`.
///
/// Returns `Ok(None)` if `<<<` is not followed by a heredoc opener.
fn skip_heredoc(src: &str, start: usize) -> Result<Option<usize>, LexError> {
  let bytes = src.as_bytes();
  let mut j = start + 3;
  while matches!(bytes.get(j), Some(b' ' | b'\t')) {
    j += 1;
  }
  let quote = bytes.get(j).copied().filter(|b| matches!(b, b'\'' | b'"'));
  if quote.is_some() {
    j += 1;
  }
  let ident_start = j;
  while bytes.get(j).is_some_and(|b| is_ident_byte(*b)) {
    j += 1;
  }
  let ident = &src[ident_start..j];
  if ident.is_empty() {
    return Ok(None);
  }
  if let Some(quote) = quote {
    if bytes.get(j) != Some(&quote) {
      return Err(LexError::UnterminatedHeredoc(ident.to_string()));
    }
    j += 1;
  }

  let Some(line_end) = src.get(j..).and_then(|rest| rest.find('\n')) else {
    return Err(LexError::UnterminatedHeredoc(ident.to_string()));
  };
  let mut line_start = j + line_end + 1;

  while line_start <= src.len() {
    let line = &src[line_start..];
    let trimmed = line.trim_start_matches([' ', '\t']);
    let indent = line.len() - trimmed.len();
    if trimmed.starts_with(ident) {
      let after = line_start + indent + ident.len();
      if !bytes.get(after).is_some_and(|b| is_ident_byte(*b)) {
        return Ok(Some(after));
      }
    }
    match line.find('\n') {
      Some(n) => line_start += n + 1,
      None => break,
    }
  }

  Err(LexError::UnterminatedHeredoc(ident.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inline_html_is_dropped() {
    let out = strip_php("<html>class Nope</html><?php class Yes {}").unwrap();
    assert!(!out.contains("Nope"));
    assert!(out.contains("class Yes"));
  }

  #[test]
  fn comments_are_dropped() {
    let src = "<?php\n// class LineComment\n# class HashComment\n/* class Block */\n/** @see class Doc */\nclass Real {}";
    let out = strip_php(src).unwrap();
    assert!(!out.contains("LineComment"));
    assert!(!out.contains("HashComment"));
    assert!(!out.contains("Block"));
    assert!(!out.contains("Doc"));
    assert!(out.contains("class Real"));
  }

  #[test]
  fn quoted_heredoc_opener_at_end_of_file() {
    for src in ["<?php class A {} $x = <<<'EOT", "<?php class A {} $x = <<<\"EOT"] {
      assert_eq!(strip_php(src), Err(LexError::UnterminatedHeredoc("EOT".to_string())));
    }
  }

  #[test]
  fn heredoc_opener_missing_closing_quote() {
    assert_eq!(
      strip_php("<?php $x = <<<'EOT\nbody\nEOT;\n"),
      Err(LexError::UnterminatedHeredoc("EOT".to_string()))
    );
  }

  #[test]
  fn attributes_are_not_comments() {
    let out = strip_php("<?php #[Attr]\nclass Attributed {}").unwrap();
    assert!(out.contains("class Attributed"));
  }

  #[test]
  fn strings_are_replaced() {
    let out = strip_php(r#"<?php $a = 'class Single'; $b = "class \"Double\""; class Kept {}"#).unwrap();
    assert!(!out.contains("Single"));
    assert!(!out.contains("Double"));
    assert!(out.contains("$a = ''"));
    assert!(out.contains("class Kept"));
  }

  #[test]
  fn heredoc_and_nowdoc_are_dropped() {
    let src = "<?php\n$a = <<<EOT\nclass InHeredoc {}\nEOT;\n$b = <<<'RAW'\n  class InNowdoc {}\n  RAW;\nclass After {}";
    let out = strip_php(src).unwrap();
    assert!(!out.contains("InHeredoc"));
    assert!(!out.contains("InNowdoc"));
    assert!(out.contains("class After"));
  }

  #[test]
  fn closing_tag_switches_back_to_html() {
    let out = strip_php("<?php class A {} ?> class NotCode <?php class B {}").unwrap();
    assert!(out.contains("class A"));
    assert!(!out.contains("NotCode"));
    assert!(out.contains("class B"));
  }

  #[test]
  fn line_comment_ends_at_closing_tag() {
    let out = strip_php("<?php // comment ?> class Html <?php class Code {}").unwrap();
    assert!(!out.contains("Html"));
    assert!(out.contains("class Code"));
  }

  #[test]
  fn unterminated_comment_is_an_error() {
    assert_eq!(strip_php("<?php /* never closed"), Err(LexError::UnterminatedComment));
  }

  #[test]
  fn unterminated_string_is_an_error() {
    assert_eq!(strip_php("<?php $a = 'open"), Err(LexError::UnterminatedString));
  }

  #[test]
  fn unterminated_heredoc_is_an_error() {
    assert_eq!(
      strip_php("<?php $a = <<<EOT\nno end\n"),
      Err(LexError::UnterminatedHeredoc("EOT".to_string()))
    );
  }

  #[test]
  fn multibyte_text_survives() {
    let out = strip_php("<?php class Größe {}").unwrap();
    assert!(out.contains("class Größe"));
  }
}
