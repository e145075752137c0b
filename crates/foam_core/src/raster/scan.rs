//! Rasterizer passes: coarse seeding, row scan, verification.
//!
//! Rows are independent rayon tasks; within a row, pixels resolve left to
//! right because each pixel's candidate starts from the left neighbor's
//! cell. Vertical propagation errors that row independence can introduce
//! are repaired by the verification sweeps, which re-minimize every
//! boundary pixel and iterate to a fixpoint.

use glam::Vec3;
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::graph::AdjacencyGraph;
use crate::raster::hash_grid::HashGrid;
use crate::types::{BoxFace, OrientedBox};

use super::{RasterConfig, UNRESOLVED};

/// Projected 3D position of pixel `(x, y)` on the chosen face, sampling at
/// pixel centers.
#[inline]
fn pixel_position(
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  x: usize,
  y: usize,
) -> Vec3 {
  let u = (x as f32 + 0.5) / resolution as f32;
  let v = (y as f32 + 0.5) / resolution as f32;
  bounding_box.face_point(face, u, v)
}

/// Walk the adjacency graph downhill from `start` to a locally nearest
/// cell for `target`.
///
/// On a Voronoi adjacency graph this descent reaches the true nearest cell
/// whenever `start`'s cell region is near `target`, which the seeding
/// guarantees for all but pathological inputs; the verification pass
/// covers those.
#[inline]
fn descend(graph: &AdjacencyGraph<'_>, positions: &[Vec3], start: u32, target: Vec3) -> u32 {
  let mut best = start;
  let mut best_d = positions[best as usize].distance_squared(target);
  loop {
    let mut improved = false;
    for n in graph.neighbors(best as usize) {
      let d = positions[n as usize].distance_squared(target);
      if d < best_d {
        best = n;
        best_d = d;
        improved = true;
      }
    }
    if !improved {
      return best;
    }
  }
}

/// Coarse seed grid: true nearest cell (via the spatial hash) at every
/// `coarse_stride`-th pixel. This is the only pass allowed an exhaustive-ish
/// search, bounded by the hash neighborhood.
pub(super) fn coarse_seed(
  positions: &[Vec3],
  grid: &HashGrid,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  config: &RasterConfig,
) -> CoarseGrid {
  let stride = config.coarse_stride.max(1);
  let per_side = resolution.div_ceil(stride);
  let cells: Vec<u32> = (0..per_side * per_side)
    .into_par_iter()
    .map(|i| {
      let cx = i % per_side;
      let cy = i / per_side;
      let p = pixel_position(face, bounding_box, resolution, cx * stride, cy * stride);
      // The cloud is non-empty, so the grid always resolves.
      grid.nearest(positions, p).unwrap_or(0)
    })
    .collect();
  CoarseGrid {
    stride,
    per_side,
    cells,
  }
}

/// Sub-sampled seed raster.
pub(super) struct CoarseGrid {
  stride: usize,
  per_side: usize,
  cells: Vec<u32>,
}

impl CoarseGrid {
  /// Seed for the coarse sample at pixel column `x`, row `y` (both must be
  /// multiples of the stride, clamped to the grid).
  #[inline]
  fn seed_at(&self, x: usize, y: usize) -> u32 {
    let cx = (x / self.stride).min(self.per_side - 1);
    let cy = (y / self.stride).min(self.per_side - 1);
    self.cells[cy * self.per_side + cx]
  }
}

/// Row scan: resolve every pixel, rows in parallel, pixels left to right.
#[allow(clippy::too_many_arguments)]
pub(super) fn scan_rows(
  positions: &[Vec3],
  graph: &AdjacencyGraph<'_>,
  grid: &HashGrid,
  coarse: &CoarseGrid,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  config: &RasterConfig,
) -> Vec<i32> {
  let mut cells = vec![UNRESOLVED; resolution * resolution];
  let stride = config.coarse_stride.max(1);

  cells
    .par_chunks_mut(resolution)
    .enumerate()
    .for_each(|(y, row)| {
      // First pixel of the row: coarse seed, its graph neighborhood, and
      // raw spatial-hash candidates around the projected position.
      let p0 = pixel_position(face, bounding_box, resolution, 0, y);
      let mut candidates: SmallVec<[u32; 24]> = SmallVec::new();
      candidates.push(coarse.seed_at(0, y));
      candidates.extend(graph.neighbors(coarse.seed_at(0, y) as usize));
      candidates.extend(grid.candidates_near(p0));
      let mut best = candidates[0];
      let mut best_d = positions[best as usize].distance_squared(p0);
      for &c in &candidates[1..] {
        let d = positions[c as usize].distance_squared(p0);
        if d < best_d {
          best = c;
          best_d = d;
        }
      }
      row[0] = descend(graph, positions, best, p0) as i32;

      // Remaining pixels: propagate from the left neighbor through the
      // adjacency graph; re-seed from the coarse grid at its columns.
      for x in 1..resolution {
        let p = pixel_position(face, bounding_box, resolution, x, y);
        let mut start = row[x - 1] as u32;
        if x % stride == 0 {
          let seed = coarse.seed_at(x, y);
          if positions[seed as usize].distance_squared(p)
            < positions[start as usize].distance_squared(p)
          {
            start = seed;
          }
        }
        row[x] = descend(graph, positions, start, p) as i32;
      }
    });

  cells
}

/// Run verification sweeps until no pixel changes (or the pass budget runs
/// out). Returns the number of sweeps executed and whether a sweep with
/// zero changes was observed within the budget.
///
/// Each sweep is fully parallel: every pixel reads the previous raster
/// state and writes only its own cell, so sweep order cannot race.
pub(super) fn verify_to_fixpoint(
  cells: &mut Vec<i32>,
  positions: &[Vec3],
  graph: &AdjacencyGraph<'_>,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
  max_passes: usize,
) -> (u32, bool) {
  let mut passes = 0u32;
  let mut converged = false;
  for _ in 0..max_passes {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("verify_pass").entered();

    let (next, changed) = verify_pass(cells, positions, graph, face, bounding_box, resolution);
    passes += 1;
    *cells = next;
    if changed == 0 {
      converged = true;
      break;
    }
  }
  (passes, converged)
}

/// One verification sweep. For every interior pixel whose 4-neighborhood
/// disagrees on the resolved cell, re-minimize over the current cell, the
/// four neighbor cells, and each of their adjacency lists; overwrite only
/// when strictly closer. Returns the new raster and the changed-pixel
/// count.
fn verify_pass(
  cells: &[i32],
  positions: &[Vec3],
  graph: &AdjacencyGraph<'_>,
  face: BoxFace,
  bounding_box: OrientedBox,
  resolution: usize,
) -> (Vec<i32>, usize) {
  let next: Vec<i32> = (0..cells.len())
    .into_par_iter()
    .map(|idx| {
      let x = idx % resolution;
      let y = idx / resolution;
      let current = cells[idx];
      if x == 0 || y == 0 || x + 1 == resolution || y + 1 == resolution {
        return current;
      }
      let around = [
        cells[idx - 1],
        cells[idx + 1],
        cells[idx - resolution],
        cells[idx + resolution],
      ];
      if around.iter().all(|&n| n == current) {
        return current;
      }

      let p = pixel_position(face, bounding_box, resolution, x, y);
      let mut best = current;
      let mut best_d = positions[current as usize].distance_squared(p);
      let mut consider = |cand: u32| {
        let d = positions[cand as usize].distance_squared(p);
        if d < best_d {
          best = cand as i32;
          best_d = d;
        }
      };
      for n in around {
        consider(n as u32);
        for adj in graph.neighbors(n as usize) {
          consider(adj);
        }
      }
      for adj in graph.neighbors(current as usize) {
        consider(adj);
      }
      best
    })
    .collect();

  let changed = next
    .iter()
    .zip(cells.iter())
    .filter(|(a, b)| a != b)
    .count();
  (next, changed)
}
