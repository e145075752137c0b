//! Shared helpers for unit tests: synthesize PLY+adjacency files in memory.

use std::fmt::Write as _;

/// Encode a complete file (header + binary body) for the given cloud.
///
/// Vertex properties are `x,y,z` (float), optional `red,green,blue` (uchar),
/// then `adjacency_offset` (uint). The adjacency element is emitted only
/// when at least one edge exists, matching the exporter's behavior.
pub(crate) fn encode_cloud(
  positions: &[[f32; 3]],
  colors: Option<&[[u8; 3]]>,
  neighbors: &[Vec<u32>],
) -> Vec<u8> {
  assert_eq!(positions.len(), neighbors.len());
  if let Some(colors) = colors {
    assert_eq!(positions.len(), colors.len());
  }
  let edge_count: usize = neighbors.iter().map(Vec::len).sum();

  let mut header = String::new();
  header.push_str("ply\n");
  header.push_str("format binary_little_endian 1.0\n");
  let _ = writeln!(header, "element vertex {}", positions.len());
  header.push_str("property float x\n");
  header.push_str("property float y\n");
  header.push_str("property float z\n");
  if colors.is_some() {
    header.push_str("property uchar red\n");
    header.push_str("property uchar green\n");
    header.push_str("property uchar blue\n");
  }
  header.push_str("property uint adjacency_offset\n");
  if edge_count > 0 {
    let _ = writeln!(header, "element adjacency {edge_count}");
    header.push_str("property uint adjacency\n");
  }
  header.push_str("end_header\n");

  let mut bytes = header.into_bytes();
  let mut offset = 0u32;
  for (i, p) in positions.iter().enumerate() {
    for c in p {
      bytes.extend_from_slice(&c.to_le_bytes());
    }
    if let Some(colors) = colors {
      bytes.extend_from_slice(&colors[i]);
    }
    offset += neighbors[i].len() as u32;
    bytes.extend_from_slice(&offset.to_le_bytes());
  }
  for adj in neighbors {
    for &n in adj {
      bytes.extend_from_slice(&n.to_le_bytes());
    }
  }
  bytes
}

/// 4-vertex ring cloud: unit square in the z=0 plane,
/// `adjacency_offset = [1,2,3,4]`, `adjacency = [1,0,3,2]`.
pub(crate) fn ring_cloud() -> Vec<u8> {
  encode_cloud(
    &[
      [0.0, 0.0, 0.0],
      [1.0, 0.0, 0.0],
      [0.0, 1.0, 0.0],
      [1.0, 1.0, 0.0],
    ],
    None,
    &[vec![1], vec![0], vec![3], vec![2]],
  )
}

/// Regular (unjittered) grid of `n x n x n` points. On a regular grid the
/// 6-neighborhood adjacency is the exact Voronoi adjacency, so greedy
/// graph descent provably reaches the true nearest cell, which makes
/// brute-force comparisons in rasterizer tests exact.
pub(crate) fn regular_grid_cloud(n: usize, extent: f32) -> (Vec<[f32; 3]>, Vec<Vec<u32>>) {
  let step = extent / n as f32;
  let mut positions = Vec::with_capacity(n * n * n);
  for z in 0..n {
    for y in 0..n {
      for x in 0..n {
        positions.push([x as f32 * step, y as f32 * step, z as f32 * step]);
      }
    }
  }
  let (_, neighbors) = grid_cloud(n, extent);
  (positions, neighbors)
}

/// Jittered grid of `n x n x n` points in a cube of the given extent,
/// deterministic across runs. Every point gets its 6-neighborhood (grid
/// adjacency) as graph neighbors, a usable stand-in for Voronoi adjacency.
pub(crate) fn grid_cloud(n: usize, extent: f32) -> (Vec<[f32; 3]>, Vec<Vec<u32>>) {
  let step = extent / n as f32;
  let mut positions = Vec::with_capacity(n * n * n);
  let mut rng = 0x9e3779b9u32;
  let mut jitter = || {
    // xorshift; enough for test jitter
    rng ^= rng << 13;
    rng ^= rng >> 17;
    rng ^= rng << 5;
    (rng as f32 / u32::MAX as f32 - 0.5) * step * 0.4
  };
  for z in 0..n {
    for y in 0..n {
      for x in 0..n {
        positions.push([
          x as f32 * step + jitter(),
          y as f32 * step + jitter(),
          z as f32 * step + jitter(),
        ]);
      }
    }
  }

  let idx = |x: usize, y: usize, z: usize| (z * n * n + y * n + x) as u32;
  let mut neighbors = vec![Vec::new(); n * n * n];
  for z in 0..n {
    for y in 0..n {
      for x in 0..n {
        let mut adj = Vec::new();
        if x > 0 {
          adj.push(idx(x - 1, y, z));
        }
        if x + 1 < n {
          adj.push(idx(x + 1, y, z));
        }
        if y > 0 {
          adj.push(idx(x, y - 1, z));
        }
        if y + 1 < n {
          adj.push(idx(x, y + 1, z));
        }
        if z > 0 {
          adj.push(idx(x, y, z - 1));
        }
        if z + 1 < n {
          adj.push(idx(x, y, z + 1));
        }
        neighbors[idx(x, y, z) as usize] = adj;
      }
    }
  }
  (positions, neighbors)
}
