//! Textual header parser for the PLY+adjacency format.
//!
//! The header is line-oriented ASCII terminated by `end_header`. Parsing is
//! byte-exact: the returned body offset is the sum of consumed line lengths
//! including terminators, so the binary body starts at exactly that offset.

use crate::error::{FoamError, Result};
use crate::types::PropertyType;

/// Magic token on the first header line.
pub const MAGIC: &str = "ply";

/// Exact format line; only binary little-endian v1.0 is accepted.
pub const FORMAT_LINE: &str = "format binary_little_endian 1.0";

/// Upper bound on header lines. Rejects malformed or unterminated input
/// before scanning into the binary body.
pub const MAX_HEADER_LINES: usize = 1024;

/// Declared property: name plus scalar type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
  pub name: String,
  pub ty: PropertyType,
}

/// Declared element: name, record count, and ordered properties.
///
/// Property order defines the on-disk field order within a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDecl {
  pub name: String,
  pub count: u32,
  pub properties: Vec<PropertyDecl>,
}

/// Parsed header: element declarations, raw comment payloads, and the exact
/// byte offset where the binary body begins.
#[derive(Clone, Debug)]
pub struct Header {
  pub elements: Vec<ElementDecl>,
  pub comments: Vec<String>,
  pub body_offset: usize,
}

/// Parse the textual header from the start of `bytes`.
///
/// Fails with [`FoamError::Format`] on magic/format mismatch or an
/// unterminated header, and with [`FoamError::Schema`] on unknown keywords
/// or property types.
pub fn parse_header(bytes: &[u8]) -> Result<Header> {
  let mut lines = Lines::new(bytes);

  let magic = lines.next_line()?;
  if magic != MAGIC {
    return Err(FoamError::Format(format!(
      "bad magic token: expected `{MAGIC}`, got `{magic}`"
    )));
  }

  let format = lines.next_line()?;
  if format != FORMAT_LINE {
    return Err(FoamError::Format(format!(
      "unsupported format: expected `{FORMAT_LINE}`, got `{format}`"
    )));
  }

  let mut elements: Vec<ElementDecl> = Vec::new();
  let mut comments: Vec<String> = Vec::new();
  let mut current: Option<ElementDecl> = None;

  loop {
    let line = lines.next_line()?;
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next().unwrap_or("");

    match keyword {
      "comment" => {
        // Preserve the payload verbatim; interpretation is a higher-level
        // concern (see ply::metadata).
        let rest = line.strip_prefix("comment").unwrap_or("").trim_start();
        comments.push(rest.to_string());
      }
      "element" => {
        let name = tokens
          .next()
          .ok_or_else(|| FoamError::Schema("element line missing name".into()))?;
        let count: u32 = tokens
          .next()
          .and_then(|t| t.parse().ok())
          .ok_or_else(|| {
            FoamError::Schema(format!("element `{name}` has a malformed count"))
          })?;
        if let Some(done) = current.take() {
          elements.push(done);
        }
        current = Some(ElementDecl {
          name: name.to_string(),
          count,
          properties: Vec::new(),
        });
      }
      "property" => {
        let ty_token = tokens
          .next()
          .ok_or_else(|| FoamError::Schema("property line missing type".into()))?;
        let name = tokens
          .next()
          .ok_or_else(|| FoamError::Schema("property line missing name".into()))?;
        let ty = PropertyType::from_token(ty_token).ok_or_else(|| {
          FoamError::Schema(format!("unknown property type `{ty_token}`"))
        })?;
        let element = current.as_mut().ok_or_else(|| {
          FoamError::Schema(format!("property `{name}` declared before any element"))
        })?;
        element.properties.push(PropertyDecl {
          name: name.to_string(),
          ty,
        });
      }
      "end_header" => {
        if let Some(done) = current.take() {
          elements.push(done);
        }
        return Ok(Header {
          elements,
          comments,
          body_offset: lines.offset,
        });
      }
      other => {
        return Err(FoamError::Schema(format!(
          "unrecognized header keyword `{other}`"
        )));
      }
    }
  }
}

/// Byte-exact line reader over the header region.
struct Lines<'a> {
  bytes: &'a [u8],
  offset: usize,
  line_count: usize,
}

impl<'a> Lines<'a> {
  fn new(bytes: &'a [u8]) -> Self {
    Self {
      bytes,
      offset: 0,
      line_count: 0,
    }
  }

  /// Next line's text, without the terminator. Advances the byte offset
  /// past the `\n`. Carriage returns before the terminator are tolerated
  /// in the text but still counted in the offset.
  fn next_line(&mut self) -> Result<&'a str> {
    if self.line_count >= MAX_HEADER_LINES {
      return Err(FoamError::Format(format!(
        "header exceeds {MAX_HEADER_LINES} lines without end_header"
      )));
    }
    let rest = &self.bytes[self.offset..];
    let newline = rest.iter().position(|&b| b == b'\n').ok_or_else(|| {
      FoamError::Format("header not terminated by end_header".into())
    })?;

    let mut text = &rest[..newline];
    if text.last() == Some(&b'\r') {
      text = &text[..text.len() - 1];
    }
    let text = std::str::from_utf8(text)
      .map_err(|_| FoamError::Format("header contains non-UTF-8 bytes".into()))?;

    self.offset += newline + 1;
    self.line_count += 1;
    Ok(text)
  }
}

#[cfg(test)]
#[path = "header_test.rs"]
mod header_test;
