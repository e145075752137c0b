//! Typed binary store for the PLY+adjacency point-cloud format.
//!
//! The format is a textual header followed by a binary little-endian body
//! (see [`header`]). Parsing computes a byte-exact layout ([`layout`]) and
//! hands ownership of the body to a [`Model`], which exposes zero-copy
//! typed views ([`model`]). Header comments carrying export metadata are
//! decoded separately ([`metadata`]); the core parser ignores them.

pub mod header;
pub mod layout;
pub mod metadata;
pub mod model;

pub use header::{parse_header, ElementDecl, Header, PropertyDecl};
pub use layout::{compute_layout, total_size, ElementLayout, PropertyLayout};
pub use metadata::BoundaryMetadata;
pub use model::{ElementView, Model, PropertyView, Scalar};

use std::path::Path;

use crate::error::{FoamError, Result};

/// Parse a complete in-memory file (header + binary body) into a [`Model`].
///
/// The body must contain exactly the bytes the header layout implies: fewer
/// is a short read, more means the header lies about its counts. Both are
/// hard [`FoamError::Io`] errors; truncation is never silent.
pub fn parse(bytes: &[u8]) -> Result<Model> {
  let header = parse_header(bytes)?;
  let layouts = compute_layout(&header.elements);
  let expected = total_size(&layouts);

  let body = &bytes[header.body_offset..];
  if body.len() < expected {
    return Err(FoamError::short_read(format!(
      "binary body has {} bytes, layout requires {expected}",
      body.len()
    )));
  }
  if body.len() > expected {
    return Err(FoamError::Io(std::io::Error::new(
      std::io::ErrorKind::InvalidData,
      format!(
        "binary body has {} trailing bytes beyond the declared layout",
        body.len() - expected
      ),
    )));
  }

  Ok(Model::new(
    body.to_vec().into_boxed_slice(),
    layouts,
    header.comments,
  ))
}

/// Read and parse a file from disk.
///
/// Whole-buffer read: the format needs the full file byte count to size the
/// binary body, so there is no streaming path.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Model> {
  let bytes = std::fs::read(path)?;
  parse(&bytes)
}
