//! foam_core - Voronoi foam point-cloud core
//!
//! This crate is the engine-independent core for working with Voronoi
//! point clouds stored in the binary "PLY+adjacency" format: per-cell
//! attributes plus an explicit cell-adjacency graph. Rendering, editing UI
//! and simulation live in host crates; they consume this core through
//! typed views, spatial queries and filtered re-export.
//!
//! # Components
//!
//! - **Binary store** ([`ply`]): header parsing with byte-exact layout
//!   computation, one immutable backing buffer, zero-copy typed views.
//! - **Adjacency graph** ([`graph`]): compressed-sparse-row neighbor view
//!   layered directly on the store.
//! - **Spatial index** ([`octree`]): one-shot octree with box, sphere,
//!   frustum and density queries.
//! - **Boundary rasterizer** ([`raster`]): per-face nearest-cell raster
//!   using hierarchical seeding plus adjacency-propagated scanning.
//! - **Filtered re-exporter** ([`export`]): drops points, remaps the
//!   graph, writes a new self-consistent file.
//!
//! # Example
//!
//! ```no_run
//! use foam_core::{ply, AdjacencyGraph, Octree};
//!
//! let model = ply::parse_file("cloud.ply")?;
//! let graph = AdjacencyGraph::from_model(&model)?;
//! let positions = model.positions()?;
//! let octree = Octree::build(&positions);
//!
//! let near = octree.query_sphere(&positions, positions[0], 2.0);
//! println!("{} cells near cell 0 ({} neighbors)", near.len(), graph.degree(0));
//! # Ok::<(), foam_core::FoamError>(())
//! ```

pub mod error;
pub mod types;

// Binary store: parser, layout, model, zero-copy views
pub mod ply;

// CSR adjacency over the store
pub mod graph;

// Octree spatial index
pub mod octree;

// Boundary texture generator
pub mod raster;

// Filtered re-export
pub mod export;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used items
pub use error::{FoamError, Result};
pub use export::{export_filtered, ExportOptions, ExportSummary, ProgressFn};
pub use graph::AdjacencyGraph;
pub use octree::{Octree, OctreeConfig};
pub use ply::{parse, parse_file, ElementView, Model, PropertyView};
pub use raster::{
  generate_boundary_raster, generate_boundary_raster_with_stats, BoundaryRaster, RasterConfig,
  RasterStats,
};
pub use types::{Aabb, BoxFace, OrientedBox, Plane, PropertyType};
