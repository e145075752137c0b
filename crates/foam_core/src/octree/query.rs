//! Octree queries: box, sphere, frustum and density.
//!
//! All queries return an unordered set of point indices (each indexed point
//! lives in exactly one leaf, so results carry no duplicates). Positions
//! are the same slice the tree was built from.

use glam::Vec3;
use rayon::prelude::*;

use crate::types::{Aabb, Plane};

use super::Octree;

impl Octree {
  /// Point indices whose positions lie inside `bounds`.
  ///
  /// Traversal prunes on node-bounds intersection; a leaf fully contained
  /// in the query box contributes all of its points without per-point
  /// tests.
  pub fn query_box(&self, positions: &[Vec3], bounds: &Aabb) -> Vec<u32> {
    let mut out = Vec::new();
    if self.nodes.is_empty() {
      return out;
    }
    let mut stack = vec![0u32];
    while let Some(handle) = stack.pop() {
      let node = self.node(handle);
      let node_bounds = node.bounds();
      if !bounds.overlaps(&node_bounds) {
        continue;
      }
      match node.children {
        Some(children) => stack.extend(children),
        None => {
          if bounds.contains_aabb(&node_bounds) {
            out.extend_from_slice(&node.points);
          } else {
            for &i in &node.points {
              if bounds.contains_point(positions[i as usize]) {
                out.push(i);
              }
            }
          }
        }
      }
    }
    out
  }

  /// Point indices within `radius` of `center` (boundary inclusive).
  ///
  /// Nodes are pruned by squared point-to-AABB distance against `radius²`.
  pub fn query_sphere(&self, positions: &[Vec3], center: Vec3, radius: f32) -> Vec<u32> {
    let mut out = Vec::new();
    if self.nodes.is_empty() {
      return out;
    }
    let radius_sq = radius * radius;
    let mut stack = vec![0u32];
    while let Some(handle) = stack.pop() {
      let node = self.node(handle);
      if node.bounds().distance_sq(center) > radius_sq {
        continue;
      }
      match node.children {
        Some(children) => stack.extend(children),
        None => {
          for &i in &node.points {
            if positions[i as usize].distance_squared(center) <= radius_sq {
              out.push(i);
            }
          }
        }
      }
    }
    out
  }

  /// Point indices inside all six half-spaces (positive side of every
  /// plane).
  ///
  /// Conservative culling: a node is discarded only when its most-positive
  /// corner along a plane's normal is still outside that plane; survivors
  /// are descended and their points tested exactly.
  pub fn query_frustum(&self, positions: &[Vec3], planes: &[Plane; 6]) -> Vec<u32> {
    let mut out = Vec::new();
    if self.nodes.is_empty() {
      return out;
    }
    let mut stack = vec![0u32];
    'nodes: while let Some(handle) = stack.pop() {
      let node = self.node(handle);
      let node_bounds = node.bounds();
      for plane in planes {
        let corner = node_bounds.most_positive_corner(plane.normal);
        if plane.signed_distance(corner) < 0.0 {
          continue 'nodes;
        }
      }
      match node.children {
        Some(children) => stack.extend(children),
        None => {
          for &i in &node.points {
            let p = positions[i as usize];
            if planes.iter().all(|plane| plane.signed_distance(p) >= 0.0) {
              out.push(i);
            }
          }
        }
      }
    }
    out
  }

  /// Indices of locally sparse points: non-hidden points with fewer than
  /// `min_neighbors` other points within `radius`.
  ///
  /// Runs one sphere query per point, in parallel. Intentionally O(N)
  /// sphere queries; each per-point query is already pruned by the tree.
  pub fn query_density<F>(
    &self,
    positions: &[Vec3],
    radius: f32,
    min_neighbors: usize,
    is_hidden: F,
  ) -> Vec<u32>
  where
    F: Fn(u32) -> bool + Sync,
  {
    (0..positions.len() as u32)
      .into_par_iter()
      .filter(|&i| {
        if is_hidden(i) {
          return false;
        }
        let within = self.query_sphere(positions, positions[i as usize], radius);
        // The query always finds the point itself; don't count it.
        within.len().saturating_sub(1) < min_neighbors
      })
      .collect()
  }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
