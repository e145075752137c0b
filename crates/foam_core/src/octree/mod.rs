//! Octree spatial index over vertex positions.
//!
//! The tree is an arena of nodes addressed by `u32` handles; leaves hold
//! point indices into the position slice the tree was built from. Positions
//! are passed explicitly into the build and into every query; the tree
//! never captures or aliases the point array.
//!
//! The build is one-shot: there is no incremental insert/remove. Mutating
//! the point set means rebuilding the tree.
//!
//! # Module Structure
//!
//! - `mod.rs`: [`OctreeConfig`], arena build
//! - [`query`]: box / sphere / frustum / density queries

use glam::Vec3;

use crate::types::Aabb;

mod query;

/// Subdivision limits for the octree build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
  /// A node holding at most this many points stays a leaf.
  pub max_points_per_node: usize,
  /// A node whose half-size is at or below this stays a leaf, regardless
  /// of population. Guards against unbounded recursion on coincident
  /// points.
  pub min_node_size: f32,
  /// Fractional padding applied to the root bounds (~1%).
  pub bounds_padding: f32,
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      max_points_per_node: 100,
      min_node_size: 0.01,
      bounds_padding: 0.01,
    }
  }
}

/// Arena node: an axis-aligned cube, either an internal node with 8
/// children or a leaf holding point indices.
#[derive(Debug)]
struct Node {
  center: Vec3,
  half_size: f32,
  /// Child handles in octant order (bit 0 = +X, bit 1 = +Y, bit 2 = +Z).
  children: Option<[u32; 8]>,
  /// Point indices; populated only for leaves.
  points: Vec<u32>,
}

impl Node {
  #[inline]
  fn bounds(&self) -> Aabb {
    Aabb::from_center_half_extents(self.center, Vec3::splat(self.half_size))
  }
}

/// Octree spatial index. Build once with [`Octree::build`], query many.
#[derive(Debug)]
pub struct Octree {
  nodes: Vec<Node>,
  root_bounds: Aabb,
  indexed_points: usize,
}

impl Octree {
  /// Build with default limits.
  pub fn build(positions: &[Vec3]) -> Self {
    Self::build_with(positions, OctreeConfig::default())
  }

  /// Build over all positions with explicit limits.
  ///
  /// The root is a cube over the padded bounding box of the input. An empty
  /// input produces a valid tree whose queries return nothing.
  pub fn build_with(positions: &[Vec3], config: OctreeConfig) -> Self {
    let tight = Aabb::from_points(positions)
      .unwrap_or_else(|| Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0)));
    let center = tight.center();
    let half = (tight.size().max_element() * 0.5) * (1.0 + config.bounds_padding);
    // Degenerate clouds (single point, coincident points) still get a
    // nonzero root cube.
    let half = half.max(config.min_node_size);

    let mut nodes = Vec::new();
    let all: Vec<u32> = (0..positions.len() as u32).collect();
    build_node(&mut nodes, positions, center, half, all, &config);

    Self {
      nodes,
      root_bounds: Aabb::from_center_half_extents(center, Vec3::splat(half)),
      indexed_points: positions.len(),
    }
  }

  /// Bounds of the root cube (padded input bounds).
  #[inline]
  pub fn root_bounds(&self) -> Aabb {
    self.root_bounds
  }

  /// Number of arena nodes.
  #[inline]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Number of points the tree was built over.
  #[inline]
  pub fn indexed_points(&self) -> usize {
    self.indexed_points
  }

  #[inline]
  fn node(&self, handle: u32) -> &Node {
    &self.nodes[handle as usize]
  }
}

/// Recursively build the subtree for `points`, returning its arena handle.
fn build_node(
  nodes: &mut Vec<Node>,
  positions: &[Vec3],
  center: Vec3,
  half_size: f32,
  points: Vec<u32>,
  config: &OctreeConfig,
) -> u32 {
  let handle = nodes.len() as u32;
  nodes.push(Node {
    center,
    half_size,
    children: None,
    points: Vec::new(),
  });

  if points.len() <= config.max_points_per_node || half_size <= config.min_node_size {
    nodes[handle as usize].points = points;
    return handle;
  }

  // Partition by sign of (point - center) per axis. The >= test puts every
  // point into exactly one octant.
  let mut buckets: [Vec<u32>; 8] = Default::default();
  for &i in &points {
    let p = positions[i as usize];
    let octant = usize::from(p.x >= center.x)
      | (usize::from(p.y >= center.y) << 1)
      | (usize::from(p.z >= center.z) << 2);
    buckets[octant].push(i);
  }

  let child_half = half_size * 0.5;
  let mut children = [0u32; 8];
  for (octant, bucket) in buckets.into_iter().enumerate() {
    let offset = Vec3::new(
      if octant & 1 != 0 { child_half } else { -child_half },
      if octant & 2 != 0 { child_half } else { -child_half },
      if octant & 4 != 0 { child_half } else { -child_half },
    );
    children[octant] = build_node(nodes, positions, center + offset, child_half, bucket, config);
  }
  nodes[handle as usize].children = Some(children);
  handle
}
