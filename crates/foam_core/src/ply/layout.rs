//! Byte-layout computation for the binary body.
//!
//! Records are stored row-major ("array of structs"): element `e`'s record
//! `i`, property `p`, lives at `base_offset(e) + i * stride(e) + offset(p)`.
//! Strides, base offsets and property offsets are pure functions of the
//! header declarations.

use crate::types::PropertyType;

use super::header::ElementDecl;

/// Resolved property layout within a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyLayout {
  pub name: String,
  pub ty: PropertyType,
  /// Byte offset within the record.
  pub offset: usize,
}

/// Resolved element layout within the blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementLayout {
  pub name: String,
  /// Record count.
  pub count: usize,
  /// Record stride: sum of the property widths.
  pub stride: usize,
  /// Byte offset of record 0 within the blob.
  pub base_offset: usize,
  /// Properties in declaration (= on-disk) order.
  pub properties: Vec<PropertyLayout>,
}

impl ElementLayout {
  /// Total byte size of this element's records.
  #[inline]
  pub fn byte_size(&self) -> usize {
    self.count * self.stride
  }

  /// Find a property layout by name.
  pub fn property(&self, name: &str) -> Option<&PropertyLayout> {
    self.properties.iter().find(|p| p.name == name)
  }
}

/// Compute strides, running base offsets and per-property offsets for the
/// declared elements.
pub fn compute_layout(decls: &[ElementDecl]) -> Vec<ElementLayout> {
  let mut base_offset = 0usize;
  let mut layouts = Vec::with_capacity(decls.len());

  for decl in decls {
    let mut offset = 0usize;
    let properties = decl
      .properties
      .iter()
      .map(|p| {
        let layout = PropertyLayout {
          name: p.name.clone(),
          ty: p.ty,
          offset,
        };
        offset += p.ty.width();
        layout
      })
      .collect();

    let layout = ElementLayout {
      name: decl.name.clone(),
      count: decl.count as usize,
      stride: offset,
      base_offset,
      properties,
    };
    base_offset += layout.byte_size();
    layouts.push(layout);
  }

  layouts
}

/// Total body size in bytes implied by the layouts.
pub fn total_size(layouts: &[ElementLayout]) -> usize {
  layouts.iter().map(ElementLayout::byte_size).sum()
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
