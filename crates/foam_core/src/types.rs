//! Core geometric and schema types shared across the crate.

use glam::{Quat, Vec3};

// =============================================================================
// PropertyType - scalar schema types of the binary format
// =============================================================================

/// Scalar type of a stored property.
///
/// Byte width is a pure function of the type; record strides and property
/// offsets are derived from it and nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyType {
  /// 32-bit IEEE float (`float` in the header).
  Float32,
  /// Unsigned byte (`uchar` in the header).
  UInt8,
  /// 32-bit unsigned integer (`uint` in the header).
  UInt32,
}

impl PropertyType {
  /// Width in bytes of one scalar of this type.
  #[inline]
  pub const fn width(self) -> usize {
    match self {
      PropertyType::Float32 => 4,
      PropertyType::UInt8 => 1,
      PropertyType::UInt32 => 4,
    }
  }

  /// Parse a header type token (`float`, `uchar`, `uint`).
  pub fn from_token(token: &str) -> Option<Self> {
    match token {
      "float" => Some(PropertyType::Float32),
      "uchar" => Some(PropertyType::UInt8),
      "uint" => Some(PropertyType::UInt32),
      _ => None,
    }
  }

  /// Header token for this type.
  pub const fn token(self) -> &'static str {
    match self {
      PropertyType::Float32 => "float",
      PropertyType::UInt8 => "uchar",
      PropertyType::UInt32 => "uint",
    }
  }
}

// =============================================================================
// Aabb - axis-aligned bounding box
// =============================================================================

/// Axis-aligned bounding box in world space.
///
/// Positions in the store are f32, so the box is f32 as well.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl Aabb {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new AABB from center and half-extents.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Smallest AABB containing all `points`. Returns `None` for an empty slice.
  pub fn from_points(points: &[Vec3]) -> Option<Self> {
    let first = *points.first()?;
    let (min, max) = points.iter().fold((first, first), |(lo, hi), &p| {
      (lo.min(p), hi.max(p))
    });
    Some(Self { min, max })
  }

  /// Check if this AABB overlaps with another (boundary contact counts).
  #[inline]
  pub fn overlaps(&self, other: &Aabb) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Check if this AABB contains a point (boundary inclusive).
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Check if this AABB fully contains another.
  #[inline]
  pub fn contains_aabb(&self, other: &Aabb) -> bool {
    self.contains_point(other.min) && self.contains_point(other.max)
  }

  /// Squared distance from a point to this AABB (0 when inside).
  #[inline]
  pub fn distance_sq(&self, point: Vec3) -> f32 {
    let clamped = point.clamp(self.min, self.max);
    (point - clamped).length_squared()
  }

  /// Corner of the box most positive along `normal`.
  ///
  /// Used for conservative AABB-vs-plane culling: if this corner is still
  /// behind a plane, the whole box is.
  #[inline]
  pub fn most_positive_corner(&self, normal: Vec3) -> Vec3 {
    Vec3::new(
      if normal.x >= 0.0 { self.max.x } else { self.min.x },
      if normal.y >= 0.0 { self.max.y } else { self.min.y },
      if normal.z >= 0.0 { self.max.z } else { self.min.z },
    )
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}

// =============================================================================
// Plane - half-space boundary for frustum queries
// =============================================================================

/// Plane in constant-normal form: `normal · p + d = 0`.
///
/// Points with `signed_distance >= 0` are on the inside of the half-space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  /// Plane normal, pointing toward the inside. Not required to be unit
  /// length for containment tests, but distances scale with its length.
  pub normal: Vec3,
  /// Plane offset.
  pub d: f32,
}

impl Plane {
  /// Create a plane from its normal and offset.
  pub fn new(normal: Vec3, d: f32) -> Self {
    Self { normal, d }
  }

  /// Plane through `point` with the given inward `normal`.
  pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
    Self {
      normal,
      d: -normal.dot(point),
    }
  }

  /// Signed distance of `point` from the plane (positive = inside).
  #[inline]
  pub fn signed_distance(&self, point: Vec3) -> f32 {
    self.normal.dot(point) + self.d
  }
}

// =============================================================================
// OrientedBox + BoxFace - rasterizer / export-filter geometry
// =============================================================================

/// Oriented box given by center, full size and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
  /// Box center in world space.
  pub center: Vec3,
  /// Full extents along the box's local axes.
  pub size: Vec3,
  /// Rotation mapping local axes to world.
  pub rotation: Quat,
}

impl OrientedBox {
  /// Create a new oriented box.
  pub fn new(center: Vec3, size: Vec3, rotation: Quat) -> Self {
    Self {
      center,
      size,
      rotation,
    }
  }

  /// Transform a world-space point into box-local coordinates.
  #[inline]
  pub fn to_local(&self, point: Vec3) -> Vec3 {
    self.rotation.inverse() * (point - self.center)
  }

  /// Check whether a world-space point lies inside the box extents
  /// (boundary inclusive).
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    let local = self.to_local(point);
    let half = self.size * 0.5;
    local.x.abs() <= half.x && local.y.abs() <= half.y && local.z.abs() <= half.z
  }

  /// World-space position of a parametric point on one face.
  ///
  /// `u` and `v` are in `[0, 1]` across the face; `(0.5, 0.5)` is the face
  /// center. The face's own axis is pinned at the box surface.
  pub fn face_point(&self, face: BoxFace, u: f32, v: f32) -> Vec3 {
    let half = self.size * 0.5;
    let su = u - 0.5;
    let sv = v - 0.5;
    let local = match face {
      BoxFace::PosX => Vec3::new(half.x, su * self.size.y, sv * self.size.z),
      BoxFace::NegX => Vec3::new(-half.x, su * self.size.y, sv * self.size.z),
      BoxFace::PosY => Vec3::new(su * self.size.x, half.y, sv * self.size.z),
      BoxFace::NegY => Vec3::new(su * self.size.x, -half.y, sv * self.size.z),
      BoxFace::PosZ => Vec3::new(su * self.size.x, sv * self.size.y, half.z),
      BoxFace::NegZ => Vec3::new(su * self.size.x, sv * self.size.y, -half.z),
    };
    self.center + self.rotation * local
  }
}

/// One of the six canonical faces of an oriented box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxFace {
  PosX,
  NegX,
  PosY,
  NegY,
  PosZ,
  NegZ,
}

impl BoxFace {
  /// All six faces, in +X, -X, +Y, -Y, +Z, -Z order.
  pub const ALL: [BoxFace; 6] = [
    BoxFace::PosX,
    BoxFace::NegX,
    BoxFace::PosY,
    BoxFace::NegY,
    BoxFace::PosZ,
    BoxFace::NegZ,
  ];
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
