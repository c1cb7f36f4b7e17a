#![warn(missing_docs)]

//! Math types for the solidray CSG ray tracer.
//!
//! Thin wrappers around nalgebra providing the domain types every shape
//! is written against: points, vectors, directions, the rigid [`Frame`]
//! that canonicalizes a primitive into its local coordinates, the tagged
//! bounding box [`Bbox`], the splitting half-space [`Half`] used by dry
//! tests, and closed-form polynomial solvers.

pub mod bbox;
pub mod frame;
pub mod half;
pub mod solve;

use nalgebra::{Unit, Vector2, Vector3};

pub use bbox::{Bbox, Bound, Interval, Tag};
pub use frame::Frame;
pub use half::Half;
pub use solve::{solve_cubic, solve_quadratic, solve_quartic, Roots};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D (screen or profile) space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance, relative to scene units.
    pub linear: f64,
    /// Threshold below which a denominator or leading coefficient is zero.
    pub degenerate: f64,
}

impl Tolerance {
    /// Default tolerances used by solvers and shape checks.
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        degenerate: 1e-14,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if a coefficient is too small to divide by.
    pub fn is_degenerate(&self, d: f64) -> bool {
        !(d.abs() >= self.degenerate)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + t * ab)).norm()
}
