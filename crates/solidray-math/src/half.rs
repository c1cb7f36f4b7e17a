//! Splitting half-spaces for dry (definite-miss) tests.
//!
//! A [`Half`] is the closed region `{ p : normal · (p − point) >= 0 }`. A
//! shape is *dry* against it when every point of the shape has a strictly
//! negative [`Half::eval`]. The `reach_*` helpers return the supremum of
//! `eval` over common building blocks so each shape can phrase its dry
//! test as `reach < 0`.

use serde::{Deserialize, Serialize};

use crate::{Point3, Vec3};

/// Closed half-space `{ p : normal · (p − point) >= 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Half {
    /// A point on the bounding plane.
    pub point: Point3,
    /// Direction pointing into the region (need not be unit length).
    pub normal: Vec3,
}

impl Half {
    /// Create a half-space through `point` containing the side `normal`
    /// points toward.
    pub fn new(point: Point3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Signed, normal-scaled offset of `p` from the plane.
    #[inline]
    pub fn eval(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    /// Whether `p` lies in the closed region.
    #[inline]
    pub fn contains(&self, p: &Point3) -> bool {
        self.eval(p) >= 0.0
    }

    /// The complementary half-space (sharing the boundary plane).
    pub fn flip(&self) -> Self {
        Self {
            point: self.point,
            normal: -self.normal,
        }
    }

    /// Supremum of `eval` over a ball.
    #[inline]
    pub fn reach_sphere(&self, center: &Point3, radius: f64) -> f64 {
        self.eval(center) + radius.abs() * self.normal.norm()
    }

    /// Supremum of `eval` over a disc with unit `axis`.
    #[inline]
    pub fn reach_disc(&self, center: &Point3, axis: &Vec3, radius: f64) -> f64 {
        let along = self.normal.dot(axis);
        let perp = (self.normal.norm_squared() - along * along).max(0.0).sqrt();
        self.eval(center) + radius.abs() * perp
    }

    /// Supremum of `eval` over a finite point set.
    pub fn reach_points<'a>(&self, points: impl IntoIterator<Item = &'a Point3>) -> f64 {
        points
            .into_iter()
            .map(|p| self.eval(p))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether `normal` is parallel (same orientation) to `other`.
    pub fn aligned_with(&self, other: &Vec3) -> bool {
        let cross = self.normal.cross(other).norm();
        let dot = self.normal.dot(other);
        dot > 0.0 && cross <= 1e-12 * self.normal.norm() * other.norm()
    }
}
