//! Parsed model: one immutable blob plus zero-copy typed views.
//!
//! The [`Model`] exclusively owns the binary body. [`ElementView`] and
//! [`PropertyView`] are borrowed windows into it; they never copy payload
//! bytes and cannot outlive the model. Scalar access goes through the sealed
//! [`Scalar`] trait, which reads little-endian at computed byte addresses;
//! reads are unaligned by design because records interleave 1- and 4-byte
//! fields.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::{FoamError, Result};
use crate::types::PropertyType;

use super::layout::{ElementLayout, PropertyLayout};

// =============================================================================
// Scalar - sealed little-endian read trait
// =============================================================================

mod sealed {
  pub trait Sealed {}
  impl Sealed for f32 {}
  impl Sealed for u8 {}
  impl Sealed for u32 {}
}

/// Scalar types readable from a [`PropertyView`].
///
/// Sealed: exactly the scalar types of the format (`f32`, `u8`, `u32`).
pub trait Scalar: sealed::Sealed + Copy + Send + Sync {
  /// Byte width of the scalar. Must match the declared property type.
  const WIDTH: usize;

  /// Property type this scalar decodes.
  const PROPERTY_TYPE: PropertyType;

  #[doc(hidden)]
  fn read_le(bytes: &[u8]) -> Self;
}

impl Scalar for f32 {
  const WIDTH: usize = 4;
  const PROPERTY_TYPE: PropertyType = PropertyType::Float32;

  #[inline(always)]
  fn read_le(bytes: &[u8]) -> Self {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
  }
}

impl Scalar for u8 {
  const WIDTH: usize = 1;
  const PROPERTY_TYPE: PropertyType = PropertyType::UInt8;

  #[inline(always)]
  fn read_le(bytes: &[u8]) -> Self {
    bytes[0]
  }
}

impl Scalar for u32 {
  const WIDTH: usize = 4;
  const PROPERTY_TYPE: PropertyType = PropertyType::UInt32;

  #[inline(always)]
  fn read_le(bytes: &[u8]) -> Self {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
  }
}

// =============================================================================
// Model
// =============================================================================

/// Immutable parsed point cloud: blob + resolved layout.
///
/// Created once by [`crate::ply::parse`], never mutated. All views borrow
/// from it.
#[derive(Debug)]
pub struct Model {
  blob: Box<[u8]>,
  elements: Vec<ElementLayout>,
  comments: Vec<String>,
}

impl Model {
  pub(crate) fn new(blob: Box<[u8]>, elements: Vec<ElementLayout>, comments: Vec<String>) -> Self {
    Self {
      blob,
      elements,
      comments,
    }
  }

  /// Element layouts in declaration order.
  pub fn elements(&self) -> &[ElementLayout] {
    &self.elements
  }

  /// Raw header comment payloads, in header order.
  pub fn comments(&self) -> &[String] {
    &self.comments
  }

  /// Whether an element with this name exists.
  pub fn has_element(&self, name: &str) -> bool {
    self.elements.iter().any(|e| e.name == name)
  }

  /// Zero-copy view of the named element.
  pub fn element_view(&self, name: &str) -> Result<ElementView<'_>> {
    let layout = self
      .elements
      .iter()
      .find(|e| e.name == name)
      .ok_or_else(|| FoamError::NotFound(format!("element `{name}`")))?;
    let bytes = &self.blob[layout.base_offset..layout.base_offset + layout.byte_size()];
    Ok(ElementView { bytes, layout })
  }

  /// Record count of the `vertex` element, or 0 if absent.
  pub fn vertex_count(&self) -> usize {
    self
      .elements
      .iter()
      .find(|e| e.name == "vertex")
      .map(|e| e.count)
      .unwrap_or(0)
  }

  /// Decode all vertex positions (required `x`, `y`, `z` properties).
  ///
  /// Decoding is data-parallel; fails with [`FoamError::NotFound`] when the
  /// vertex element or a position property is missing, and with
  /// [`FoamError::Schema`] when a position property is not declared `float`.
  pub fn positions(&self) -> Result<Vec<Vec3>> {
    let vertex = self.element_view("vertex")?;
    let x = vertex.property_view_as::<f32>("x")?;
    let y = vertex.property_view_as::<f32>("y")?;
    let z = vertex.property_view_as::<f32>("z")?;
    Ok(
      (0..vertex.count())
        .into_par_iter()
        .map(|i| Vec3::new(x.get::<f32>(i), y.get::<f32>(i), z.get::<f32>(i)))
        .collect(),
    )
  }

  /// Decode optional per-vertex colors (`red`, `green`, `blue`).
  ///
  /// Returns `Ok(None)` when the cloud carries no color data; callers pick
  /// their own default (conventionally uniform white). Color properties that
  /// exist with a non-`uchar` type are a [`FoamError::Schema`] error, not an
  /// absence.
  pub fn colors(&self) -> Result<Option<Vec<[u8; 3]>>> {
    let Ok(vertex) = self.element_view("vertex") else {
      return Ok(None);
    };
    if !["red", "green", "blue"].iter().all(|p| vertex.has_property(p)) {
      return Ok(None);
    }
    let r = vertex.property_view_as::<u8>("red")?;
    let g = vertex.property_view_as::<u8>("green")?;
    let b = vertex.property_view_as::<u8>("blue")?;
    Ok(Some(
      (0..vertex.count())
        .into_par_iter()
        .map(|i| [r.get::<u8>(i), g.get::<u8>(i), b.get::<u8>(i)])
        .collect(),
    ))
  }

  /// Decode the optional per-vertex `density` property.
  ///
  /// `Ok(None)` when absent; [`FoamError::Schema`] when present but not
  /// declared `float`.
  pub fn densities(&self) -> Result<Option<Vec<f32>>> {
    let Ok(vertex) = self.element_view("vertex") else {
      return Ok(None);
    };
    if !vertex.has_property("density") {
      return Ok(None);
    }
    let d = vertex.property_view_as::<f32>("density")?;
    Ok(Some(
      (0..vertex.count())
        .into_par_iter()
        .map(|i| d.get::<f32>(i))
        .collect(),
    ))
  }
}

// =============================================================================
// ElementView / PropertyView - zero-copy windows
// =============================================================================

/// Non-owning, read-only window over one element's records.
#[derive(Clone, Copy, Debug)]
pub struct ElementView<'a> {
  bytes: &'a [u8],
  layout: &'a ElementLayout,
}

impl<'a> ElementView<'a> {
  /// Record count.
  #[inline]
  pub fn count(&self) -> usize {
    self.layout.count
  }

  /// Record stride in bytes.
  #[inline]
  pub fn stride(&self) -> usize {
    self.layout.stride
  }

  /// Property layouts in on-disk order.
  pub fn properties(&self) -> &'a [PropertyLayout] {
    &self.layout.properties
  }

  /// Raw bytes of one record.
  #[inline]
  pub fn record_bytes(&self, index: usize) -> &'a [u8] {
    let start = index * self.layout.stride;
    &self.bytes[start..start + self.layout.stride]
  }

  /// Whether the element declares this property.
  pub fn has_property(&self, name: &str) -> bool {
    self.layout.property(name).is_some()
  }

  /// Zero-copy view of the named property, checked against the scalar type
  /// it will be read as.
  ///
  /// Fails with [`FoamError::Schema`] when the declared type differs.
  /// Prefer this over [`property_view`](Self::property_view) whenever the
  /// read type is fixed at the call site; the unchecked variant exists for
  /// callers dispatching on [`PropertyView::property_type`] themselves.
  pub fn property_view_as<T: Scalar>(&self, name: &str) -> Result<PropertyView<'a>> {
    let view = self.property_view(name)?;
    if view.ty != T::PROPERTY_TYPE {
      return Err(FoamError::Schema(format!(
        "property `{name}` on element `{}` is declared `{}`, expected `{}`",
        self.layout.name,
        view.ty.token(),
        T::PROPERTY_TYPE.token()
      )));
    }
    Ok(view)
  }

  /// Zero-copy view of the named property.
  pub fn property_view(&self, name: &str) -> Result<PropertyView<'a>> {
    let prop = self.layout.property(name).ok_or_else(|| {
      FoamError::NotFound(format!(
        "property `{name}` on element `{}`",
        self.layout.name
      ))
    })?;
    Ok(PropertyView {
      bytes: self.bytes,
      count: self.layout.count,
      stride: self.layout.stride,
      offset: prop.offset,
      ty: prop.ty,
    })
  }
}

/// Non-owning, read-only window over a single property column.
///
/// `get::<T>` reads `T` at `index * stride + offset`. The caller guarantees
/// `T` matches the declared property type; this is debug-asserted but not
/// checked in release builds (zero-copy performance contract).
#[derive(Clone, Copy, Debug)]
pub struct PropertyView<'a> {
  bytes: &'a [u8],
  count: usize,
  stride: usize,
  offset: usize,
  ty: PropertyType,
}

impl<'a> PropertyView<'a> {
  /// Number of records.
  #[inline]
  pub fn len(&self) -> usize {
    self.count
  }

  /// True when the element has no records.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  /// Declared property type.
  #[inline]
  pub fn property_type(&self) -> PropertyType {
    self.ty
  }

  /// Read record `index`'s scalar.
  #[inline(always)]
  pub fn get<T: Scalar>(&self, index: usize) -> T {
    debug_assert!(index < self.count, "property index out of range");
    debug_assert_eq!(
      T::PROPERTY_TYPE,
      self.ty,
      "scalar type does not match declared property type"
    );
    debug_assert!(self.offset + T::WIDTH <= self.stride);
    let at = index * self.stride + self.offset;
    T::read_le(&self.bytes[at..at + T::WIDTH])
  }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;
