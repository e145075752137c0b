//! Compressed-sparse-row adjacency view over the binary store.
//!
//! The vertex element carries a cumulative `adjacency_offset` (uint32)
//! property; the `adjacency` element is the flat neighbor-index array.
//! Vertex `i`'s neighbors are `adjacency[(i > 0 ? offset[i-1] : 0) ..
//! offset[i])`. Construction validates the CSR invariants up front and
//! fails fast on a malformed graph instead of producing silently wrong
//! query results downstream.

use std::ops::Range;

use crate::error::{FoamError, Result};
use crate::ply::{Model, PropertyView};

/// Zero-copy CSR adjacency graph borrowed from a [`Model`].
#[derive(Clone, Copy, Debug)]
pub struct AdjacencyGraph<'a> {
  offsets: PropertyView<'a>,
  /// Flat neighbor array; `None` when the cloud has no edges (and the
  /// adjacency element was omitted).
  targets: Option<PropertyView<'a>>,
  vertex_count: usize,
  edge_count: usize,
}

impl<'a> AdjacencyGraph<'a> {
  /// Bind and validate the adjacency graph of a model.
  ///
  /// Fails with [`FoamError::Schema`] when the required `vertex` element or
  /// `adjacency_offset` property is missing or carries the wrong scalar type
  /// (or edges exist without an `adjacency` element), and with
  /// [`FoamError::Index`] when the stored offsets are non-monotonic,
  /// disagree with the adjacency count, or any neighbor index is out of
  /// range.
  pub fn from_model(model: &'a Model) -> Result<Self> {
    let vertex = model
      .element_view("vertex")
      .map_err(|_| FoamError::Schema("missing required `vertex` element".into()))?;
    let offsets = vertex
      .property_view_as::<u32>("adjacency_offset")
      .map_err(|e| match e {
        FoamError::NotFound(_) => {
          FoamError::Schema("vertex element lacks required `adjacency_offset` property".into())
        }
        other => other,
      })?;
    let vertex_count = vertex.count();

    let mut prev = 0u32;
    for i in 0..vertex_count {
      let cur = offsets.get::<u32>(i);
      if cur < prev {
        return Err(FoamError::Index(format!(
          "adjacency_offset decreases at vertex {i} ({prev} -> {cur})"
        )));
      }
      prev = cur;
    }
    let edge_count = prev as usize;

    let targets = if model.has_element("adjacency") {
      let adjacency = model.element_view("adjacency")?;
      if adjacency.count() != edge_count {
        return Err(FoamError::Index(format!(
          "final adjacency_offset is {edge_count} but adjacency element has {} records",
          adjacency.count()
        )));
      }
      let targets = adjacency
        .property_view_as::<u32>("adjacency")
        .map_err(|e| match e {
          FoamError::NotFound(_) => {
            FoamError::Schema("adjacency element lacks required `adjacency` property".into())
          }
          other => other,
        })?;
      for i in 0..edge_count {
        let t = targets.get::<u32>(i) as usize;
        if t >= vertex_count {
          return Err(FoamError::Index(format!(
            "neighbor index {t} at adjacency record {i} exceeds vertex count {vertex_count}"
          )));
        }
      }
      Some(targets)
    } else {
      if edge_count != 0 {
        return Err(FoamError::Schema(format!(
          "adjacency_offset implies {edge_count} edges but the `adjacency` element is missing"
        )));
      }
      None
    };

    Ok(Self {
      offsets,
      targets,
      vertex_count,
      edge_count,
    })
  }

  /// Number of vertices.
  #[inline]
  pub fn vertex_count(&self) -> usize {
    self.vertex_count
  }

  /// Total number of directed edges.
  #[inline]
  pub fn edge_count(&self) -> usize {
    self.edge_count
  }

  /// Index range of vertex `v`'s neighbors within the flat array.
  #[inline]
  pub fn neighbor_range(&self, v: usize) -> Range<usize> {
    debug_assert!(v < self.vertex_count);
    let start = if v > 0 {
      self.offsets.get::<u32>(v - 1) as usize
    } else {
      0
    };
    let end = self.offsets.get::<u32>(v) as usize;
    start..end
  }

  /// Neighbor count of vertex `v`.
  #[inline]
  pub fn degree(&self, v: usize) -> usize {
    self.neighbor_range(v).len()
  }

  /// Iterate vertex `v`'s neighbor indices.
  pub fn neighbors(&self, v: usize) -> impl Iterator<Item = u32> + 'a {
    let targets = self.targets;
    // A validated graph has empty ranges whenever `targets` is None, so the
    // filter_map never actually drops anything.
    self
      .neighbor_range(v)
      .filter_map(move |i| targets.map(|t| t.get::<u32>(i)))
  }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;
