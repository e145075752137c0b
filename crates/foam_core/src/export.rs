//! Filtered re-export: write a new, self-consistent file for a subset of
//! the cloud.
//!
//! Exclusion is the union of an explicit index set and an oriented-box
//! predicate, then a symmetric difference with the boundary-cell set from
//! the rasterizer: cells on the cut toggle back to included (and vice
//! versa), preserving silhouette continuity. Retained vertices are
//! compacted preserving relative order, the CSR graph is rebuilt with
//! remapped edges, and `adjacency_offset` is always recomputed rather than
//! copied, since indices change.
//!
//! The exporter never mutates the input model; it always produces a brand
//! new file. On write failure the partial file is not guaranteed valid, so
//! callers wanting atomicity should write to a temp path and rename.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FoamError, Result};
use crate::graph::AdjacencyGraph;
use crate::ply::{BoundaryMetadata, Model};
use crate::types::OrientedBox;

/// Progress callback: completed fraction in `[0, 1]` plus a phase message.
pub type ProgressFn<'a> = &'a (dyn Fn(f32, &str) + Sync);

/// What to drop (or force-keep) during a filtered export.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
  /// Explicitly excluded vertex indices. Out-of-range entries are ignored.
  pub excluded: HashSet<u32>,
  /// When set, vertices whose positions fall outside this oriented box are
  /// excluded as well.
  pub box_filter: Option<OrientedBox>,
  /// Boundary cells from the rasterizer. Applied as a symmetric difference
  /// with the exclusion set: a boundary cell that would be dropped is
  /// retained, and one that would be retained is dropped.
  pub boundary_cells: Option<Vec<u32>>,
  /// When set, the box transform and raster resolution are embedded as
  /// header comments for later partial re-import.
  pub boundary_metadata: Option<BoundaryMetadata>,
}

/// Result of a successful export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSummary {
  /// Vertices written to the output.
  pub written_vertices: usize,
  /// Directed edges surviving the filter.
  pub written_edges: usize,
  /// Total output size in bytes.
  pub bytes_written: u64,
}

/// Write a filtered copy of `model` to `path`.
///
/// Zero retained vertices is a success (an empty vertex element is
/// written). Fails with [`FoamError::Schema`] when the model has no
/// `vertex` element and with [`FoamError::Io`] on any write failure.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "export::filtered")
)]
pub fn export_filtered(
  path: impl AsRef<Path>,
  model: &Model,
  options: &ExportOptions,
  progress: Option<ProgressFn<'_>>,
) -> Result<ExportSummary> {
  let report = |fraction: f32, message: &str| {
    if let Some(cb) = progress {
      cb(fraction, message);
    }
  };

  let vertex = model
    .element_view("vertex")
    .map_err(|_| FoamError::Schema("missing required `vertex` element".into()))?;
  let graph = AdjacencyGraph::from_model(model)?;
  let n = vertex.count();

  // Effective exclusion: explicit set, then box predicate, then the
  // boundary-cell symmetric difference.
  let mut excluded = vec![false; n];
  for &i in &options.excluded {
    if (i as usize) < n {
      excluded[i as usize] = true;
    }
  }
  if let Some(filter) = &options.box_filter {
    let positions = model.positions()?;
    for (i, &p) in positions.iter().enumerate() {
      if !filter.contains_point(p) {
        excluded[i] = true;
      }
    }
  }
  if let Some(boundary) = &options.boundary_cells {
    for &c in boundary {
      if (c as usize) < n {
        excluded[c as usize] = !excluded[c as usize];
      }
    }
  }
  report(0.2, "computed exclusion set");

  // Compact old -> new, preserving relative order.
  let mut remap = vec![u32::MAX; n];
  let mut retained: Vec<u32> = Vec::new();
  for (old, &out) in excluded.iter().enumerate() {
    if !out {
      remap[old] = retained.len() as u32;
      retained.push(old as u32);
    }
  }
  report(0.4, "compacted vertex indices");

  // Rebuild the CSR graph: keep only edges whose target survives, remap
  // the indices, recompute cumulative offsets.
  let mut new_offsets = Vec::with_capacity(retained.len());
  let mut new_targets: Vec<u32> = Vec::new();
  for &old in &retained {
    for t in graph.neighbors(old as usize) {
      let mapped = remap[t as usize];
      if mapped != u32::MAX {
        new_targets.push(mapped);
      }
    }
    new_offsets.push(new_targets.len() as u32);
  }
  report(0.6, "rebuilt adjacency graph");

  let summary = write_file(
    path.as_ref(),
    model,
    &vertex_header_lines(model)?,
    &retained,
    &new_offsets,
    &new_targets,
    options,
  )?;
  report(1.0, "export complete");
  Ok(summary)
}

/// Property declaration lines for the vertex element, preserving the
/// original names and types in on-disk order.
fn vertex_header_lines(model: &Model) -> Result<Vec<String>> {
  let vertex = model.element_view("vertex")?;
  Ok(
    vertex
      .properties()
      .iter()
      .map(|p| format!("property {} {}", p.ty.token(), p.name))
      .collect(),
  )
}

fn write_file(
  path: &Path,
  model: &Model,
  vertex_properties: &[String],
  retained: &[u32],
  new_offsets: &[u32],
  new_targets: &[u32],
  options: &ExportOptions,
) -> Result<ExportSummary> {
  let vertex = model.element_view("vertex")?;
  let offset_prop = vertex
    .properties()
    .iter()
    .find(|p| p.name == "adjacency_offset")
    .ok_or_else(|| {
      FoamError::Schema("vertex element lacks required `adjacency_offset` property".into())
    })?
    .offset;

  let mut header = String::new();
  header.push_str("ply\n");
  header.push_str("format binary_little_endian 1.0\n");
  if let Some(meta) = &options.boundary_metadata {
    for comment in meta.to_comments() {
      let _ = writeln!(header, "comment {comment}");
    }
  }
  let _ = writeln!(header, "element vertex {}", retained.len());
  for line in vertex_properties {
    header.push_str(line);
    header.push('\n');
  }
  if !new_targets.is_empty() {
    let _ = writeln!(header, "element adjacency {}", new_targets.len());
    header.push_str("property uint adjacency\n");
  }
  header.push_str("end_header\n");

  let mut writer = BufWriter::new(File::create(path)?);
  writer.write_all(header.as_bytes())?;

  // Vertex records: raw copy of the original bytes with the
  // adjacency_offset field patched to the recomputed cumulative count.
  let mut record = vec![0u8; vertex.stride()];
  for (new, &old) in retained.iter().enumerate() {
    record.copy_from_slice(vertex.record_bytes(old as usize));
    record[offset_prop..offset_prop + 4].copy_from_slice(&new_offsets[new].to_le_bytes());
    writer.write_all(&record)?;
  }

  for &t in new_targets {
    writer.write_all(&t.to_le_bytes())?;
  }
  writer.flush()?;

  Ok(ExportSummary {
    written_vertices: retained.len(),
    written_edges: new_targets.len(),
    bytes_written: (header.len() + retained.len() * vertex.stride() + new_targets.len() * 4)
      as u64,
  })
}

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;
