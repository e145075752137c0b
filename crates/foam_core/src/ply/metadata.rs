//! Header-comment metadata for boundary re-import.
//!
//! The exporter can embed the oriented box and raster resolution used for a
//! boundary cut as header comments, so a later partial re-import can
//! reconstruct the cut without the original scene. The core parser treats
//! comments as opaque; this module is the one place that interprets them.
//!
//! Wire form (one comment each):
//! ```text
//! comment boundary_box <cx> <cy> <cz> <sx> <sy> <sz> <qx> <qy> <qz> <qw>
//! comment boundary_resolution <pixels>
//! ```

use glam::{Quat, Vec3};

use crate::types::OrientedBox;

/// Comment key carrying the oriented-box transform.
pub const BOX_KEY: &str = "boundary_box";

/// Comment key carrying the raster resolution.
pub const RESOLUTION_KEY: &str = "boundary_resolution";

/// Boundary-cut metadata recovered from header comments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryMetadata {
  /// Oriented box the boundary raster was generated against.
  pub bounding_box: OrientedBox,
  /// Raster resolution in pixels per face side.
  pub resolution: u32,
}

impl BoundaryMetadata {
  /// Render the two comment payloads (without the `comment ` keyword).
  pub fn to_comments(&self) -> [String; 2] {
    let b = &self.bounding_box;
    let (c, s, q) = (b.center, b.size, b.rotation);
    [
      format!(
        "{BOX_KEY} {} {} {} {} {} {} {} {} {} {}",
        c.x, c.y, c.z, s.x, s.y, s.z, q.x, q.y, q.z, q.w
      ),
      format!("{RESOLUTION_KEY} {}", self.resolution),
    ]
  }

  /// Recover metadata from raw comment payloads.
  ///
  /// Returns `None` unless both keys are present and well-formed; a cloud
  /// without boundary metadata is the common case, not an error.
  pub fn from_comments<S: AsRef<str>>(comments: &[S]) -> Option<Self> {
    let mut bounding_box = None;
    let mut resolution = None;

    for comment in comments {
      let mut tokens = comment.as_ref().split_whitespace();
      match tokens.next() {
        Some(BOX_KEY) => {
          let vals: Vec<f32> = tokens.filter_map(|t| t.parse().ok()).collect();
          if vals.len() == 10 {
            bounding_box = Some(OrientedBox::new(
              Vec3::new(vals[0], vals[1], vals[2]),
              Vec3::new(vals[3], vals[4], vals[5]),
              Quat::from_xyzw(vals[6], vals[7], vals[8], vals[9]),
            ));
          }
        }
        Some(RESOLUTION_KEY) => {
          resolution = tokens.next().and_then(|t| t.parse().ok());
        }
        _ => {}
      }
    }

    Some(Self {
      bounding_box: bounding_box?,
      resolution: resolution?,
    })
  }
}
