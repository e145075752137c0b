//! Error types for the foam point-cloud core.

use thiserror::Error;

/// Errors surfaced by parsing, querying, rasterization and export.
///
/// Kinds map to recoverability:
/// - [`Format`](FoamError::Format) / [`Schema`](FoamError::Schema) /
///   [`Io`](FoamError::Io) are fatal to the operation that raised them.
/// - [`NotFound`](FoamError::NotFound) is recoverable: consumers probe for
///   optional elements/properties (e.g. color) and substitute defaults.
/// - [`Index`](FoamError::Index) signals a violated internal invariant
///   (malformed adjacency, unresolved raster cell) and is not
///   user-recoverable.
#[derive(Debug, Error)]
pub enum FoamError {
  /// Magic token or format string mismatch; parse aborts.
  #[error("invalid file format: {0}")]
  Format(String),

  /// Unknown header keyword/property type, or a required element/property
  /// is missing for the requested operation.
  #[error("schema error: {0}")]
  Schema(String),

  /// Short read on the binary body, or a write failure during export.
  /// Partial output is not guaranteed valid.
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  /// Requested element or property is absent. Callers probing optional
  /// attributes should treat this as "not present" and fall back.
  #[error("not found: {0}")]
  NotFound(String),

  /// Internal invariant violation (programming-contract error).
  #[error("index invariant violated: {0}")]
  Index(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FoamError>;

impl FoamError {
  /// Shorthand for an `Io` error that did not originate in std I/O,
  /// e.g. a binary body shorter than the header-declared layout.
  pub(crate) fn short_read(msg: impl Into<String>) -> Self {
    FoamError::Io(std::io::Error::new(
      std::io::ErrorKind::UnexpectedEof,
      msg.into(),
    ))
  }
}
