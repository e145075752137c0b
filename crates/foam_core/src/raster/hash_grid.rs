//! Uniform spatial hash over cell centroids.
//!
//! Used by the rasterizer for true nearest-centroid lookups during coarse
//! seeding. Cells are cubes of a fixed world-space size; lookups expand
//! outward in Chebyshev shells and stop once no unsearched shell can hold a
//! closer point.

use std::collections::HashMap;

use glam::Vec3;
use smallvec::SmallVec;

/// Uniform hash grid over point positions.
#[derive(Debug)]
pub struct HashGrid {
  cell_size: f32,
  cells: HashMap<(i32, i32, i32), Vec<u32>>,
  /// Bounds of occupied keys; used to bound shell expansion per query.
  key_min: (i32, i32, i32),
  key_max: (i32, i32, i32),
}

impl HashGrid {
  /// Bucket every point into cells of `cell_size` world units.
  pub fn build(positions: &[Vec3], cell_size: f32) -> Self {
    debug_assert!(cell_size > 0.0);
    let mut cells: HashMap<(i32, i32, i32), Vec<u32>> = HashMap::new();
    let mut key_min = (i32::MAX, i32::MAX, i32::MAX);
    let mut key_max = (i32::MIN, i32::MIN, i32::MIN);

    for (i, &p) in positions.iter().enumerate() {
      let key = cell_key(p, cell_size);
      key_min = (
        key_min.0.min(key.0),
        key_min.1.min(key.1),
        key_min.2.min(key.2),
      );
      key_max = (
        key_max.0.max(key.0),
        key_max.1.max(key.1),
        key_max.2.max(key.2),
      );
      cells.entry(key).or_default().push(i as u32);
    }

    Self {
      cell_size,
      cells,
      key_min,
      key_max,
    }
  }

  /// True when no points were indexed.
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// Index of the point nearest to `query`, or `None` for an empty grid.
  ///
  /// Expands Chebyshev shells around the query's cell. After a candidate is
  /// found, expansion continues while an unsearched shell could still hold
  /// a closer point: shell `r`'s contents are at least `(r-1) * cell_size`
  /// away from the query.
  pub fn nearest(&self, positions: &[Vec3], query: Vec3) -> Option<u32> {
    if self.cells.is_empty() {
      return None;
    }
    let center = cell_key(query, self.cell_size);
    let mut best: Option<u32> = None;
    let mut best_d = f32::INFINITY;

    // Shells past this cannot reach any occupied cell: Chebyshev distance
    // from the query's cell to the occupied key box, plus its extent.
    let reach = (self.key_min.0 - center.0)
      .max(center.0 - self.key_max.0)
      .max(self.key_min.1 - center.1)
      .max(center.1 - self.key_max.1)
      .max(self.key_min.2 - center.2)
      .max(center.2 - self.key_max.2)
      .max(0);
    let extent = (self.key_max.0 - self.key_min.0)
      .max(self.key_max.1 - self.key_min.1)
      .max(self.key_max.2 - self.key_min.2);
    let shell_limit = reach + extent + 1;

    let mut r = 0i32;
    loop {
      let shell_min_dist = (r - 1).max(0) as f32 * self.cell_size;
      if best.is_some() && shell_min_dist * shell_min_dist > best_d {
        break;
      }
      if r > shell_limit {
        break;
      }
      self.for_shell_cells(center, r, |bucket| {
        for &i in bucket {
          let d = positions[i as usize].distance_squared(query);
          if d < best_d {
            best_d = d;
            best = Some(i);
          }
        }
      });
      r += 1;
    }
    best
  }

  /// Points in the 3x3x3 cell neighborhood around `query`.
  ///
  /// Cheap candidate source for raster seeding; not guaranteed to contain
  /// the true nearest point.
  pub fn candidates_near(&self, query: Vec3) -> SmallVec<[u32; 16]> {
    let center = cell_key(query, self.cell_size);
    let mut out = SmallVec::new();
    for dz in -1..=1 {
      for dy in -1..=1 {
        for dx in -1..=1 {
          let key = (center.0 + dx, center.1 + dy, center.2 + dz);
          if let Some(bucket) = self.cells.get(&key) {
            out.extend_from_slice(bucket);
          }
        }
      }
    }
    out
  }

  /// Visit every occupied bucket whose key has Chebyshev distance exactly
  /// `r` from `center`.
  fn for_shell_cells(&self, center: (i32, i32, i32), r: i32, mut visit: impl FnMut(&[u32])) {
    if r == 0 {
      if let Some(bucket) = self.cells.get(&center) {
        visit(bucket);
      }
      return;
    }
    for dz in -r..=r {
      for dy in -r..=r {
        for dx in -r..=r {
          if dx.abs().max(dy.abs()).max(dz.abs()) != r {
            continue;
          }
          let key = (center.0 + dx, center.1 + dy, center.2 + dz);
          if let Some(bucket) = self.cells.get(&key) {
            visit(bucket);
          }
        }
      }
    }
  }
}

#[inline]
fn cell_key(p: Vec3, cell_size: f32) -> (i32, i32, i32) {
  (
    (p.x / cell_size).floor() as i32,
    (p.y / cell_size).floor() as i32,
    (p.z / cell_size).floor() as i32,
  )
}

#[cfg(test)]
#[path = "hash_grid_test.rs"]
mod hash_grid_test;
