//! Boundary texture generator: graph-accelerated nearest-cell rasterizer.
//!
//! For one face of an oriented box, produces a square raster where each
//! pixel holds the index of the Voronoi cell centroid nearest to the
//! pixel's projected 3D position. A per-pixel linear search over all cells
//! would be O(resolution² * N); instead the rasterizer seeds a coarse grid
//! from a spatial hash, propagates candidates along raster rows through the
//! adjacency graph (a cell's nearest-neighbor region borders its graph
//! neighbors), and repairs boundary pixels in a parallel verification pass.
//!
//! # Module Structure
//!
//! - `mod.rs`: [`RasterConfig`], [`BoundaryRaster`], the generator entry
//!   points
//! - [`hash_grid`]: uniform spatial hash for coarse seeding
//! - [`scan`]: coarse seeding, row scan and verification passes

use web_time::Instant;

use crate::error::{FoamError, Result};
use crate::graph::AdjacencyGraph;
use crate::ply::Model;
use crate::types::{BoxFace, OrientedBox};

pub mod hash_grid;
mod scan;

pub use hash_grid::HashGrid;

/// Sentinel for a pixel that was never resolved. Must not survive
/// generation; see [`FoamError::Index`].
pub const UNRESOLVED: i32 = -1;

/// Tuning for the boundary rasterizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterConfig {
  /// Stride in pixels of the coarse seed grid.
  pub coarse_stride: usize,
  /// World-unit size of the spatial-hash cells used for seeding.
  pub hash_cell_size: f32,
  /// Upper bound on verification sweeps. Each sweep only rewrites pixels
  /// with a strictly closer cell, so the fixpoint is reached long before
  /// this in practice. This is a hard cap: when it is exhausted before a
  /// sweep changes nothing, [`RasterStats::converged`] is false and a
  /// further sweep could still improve pixels.
  pub max_verify_passes: usize,
}

impl Default for RasterConfig {
  fn default() -> Self {
    Self {
      coarse_stride: 16,
      hash_cell_size: 1.0,
      max_verify_passes: 8,
    }
  }
}

/// Square raster of nearest-cell indices for one box face.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryRaster {
  resolution: usize,
  cells: Vec<i32>,
}

impl BoundaryRaster {
  /// Pixels per side.
  #[inline]
  pub fn resolution(&self) -> usize {
    self.resolution
  }

  /// Resolved cell index at pixel `(x, y)`.
  #[inline]
  pub fn get(&self, x: usize, y: usize) -> i32 {
    self.cells[y * self.resolution + x]
  }

  /// Row-major cell indices.
  pub fn cells(&self) -> &[i32] {
    &self.cells
  }

  /// Sorted distinct cell indices appearing in the raster.
  pub fn boundary_cells(&self) -> Vec<u32> {
    let mut out: Vec<u32> = self.cells.iter().map(|&c| c as u32).collect();
    out.sort_unstable();
    out.dedup();
    out
  }

  /// Encode each resolved index as a 24-bit little-endian RGB triple for
  /// texture storage.
  pub fn encode_rgb8(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.cells.len() * 3);
    for &c in &self.cells {
      let v = c as u32;
      out.push(v as u8);
      out.push((v >> 8) as u8);
      out.push((v >> 16) as u8);
    }
    out
  }
}

/// Per-phase timings of one raster generation, in microseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterStats {
  /// Hash-grid build plus coarse seeding.
  pub seed_us: u64,
  /// Row scan.
  pub scan_us: u64,
  /// All verification sweeps.
  pub verify_us: u64,
  /// Verification sweeps run.
  pub verify_passes: u32,
  /// Whether verification reached the fixpoint (a sweep with zero changes)
  /// within [`RasterConfig::max_verify_passes`].
  pub converged: bool,
}

/// Generate the boundary raster for one face of `bounding_box`.
///
/// Returns the raster plus the sorted set of distinct cell indices it
/// references. Fails with [`FoamError::Index`] on an empty cloud, a zero
/// resolution, or an internal unresolved pixel, and propagates store/graph
/// errors from the model.
pub fn generate_boundary_raster(
  model: &Model,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  config: &RasterConfig,
) -> Result<(BoundaryRaster, Vec<u32>)> {
  let (raster, cells, _) =
    generate_boundary_raster_with_stats(model, face, bounding_box, resolution, config)?;
  Ok((raster, cells))
}

/// [`generate_boundary_raster`] with per-phase timing attached.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "raster::generate")
)]
pub fn generate_boundary_raster_with_stats(
  model: &Model,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  config: &RasterConfig,
) -> Result<(BoundaryRaster, Vec<u32>, RasterStats)> {
  if resolution == 0 {
    return Err(FoamError::Index("raster resolution must be nonzero".into()));
  }
  let positions = model.positions()?;
  if positions.is_empty() {
    return Err(FoamError::Index(
      "cannot rasterize an empty point cloud".into(),
    ));
  }
  let graph = AdjacencyGraph::from_model(model)?;
  let mut stats = RasterStats::default();

  let start = Instant::now();
  let grid = HashGrid::build(&positions, config.hash_cell_size);
  let coarse = scan::coarse_seed(&positions, &grid, face, bounding_box, resolution, config);
  stats.seed_us = start.elapsed().as_micros() as u64;

  let start = Instant::now();
  let mut cells = scan::scan_rows(
    &positions,
    &graph,
    &grid,
    &coarse,
    face,
    bounding_box,
    resolution,
    config,
  );
  stats.scan_us = start.elapsed().as_micros() as u64;

  let start = Instant::now();
  let (verify_passes, converged) = scan::verify_to_fixpoint(
    &mut cells,
    &positions,
    &graph,
    face,
    bounding_box,
    resolution,
    config.max_verify_passes,
  );
  stats.verify_passes = verify_passes;
  stats.converged = converged;
  stats.verify_us = start.elapsed().as_micros() as u64;

  if let Some(at) = cells.iter().position(|&c| c == UNRESOLVED) {
    return Err(FoamError::Index(format!(
      "raster pixel ({}, {}) left unresolved",
      at % resolution,
      at / resolution
    )));
  }

  let raster = BoundaryRaster { resolution, cells };
  let boundary = raster.boundary_cells();
  Ok((raster, boundary, stats))
}
