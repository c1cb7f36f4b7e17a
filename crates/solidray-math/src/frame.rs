//! Rigid canonicalizing transforms.
//!
//! Every primitive is intersected in a local frame where its defining
//! geometry is axis-aligned: a cylinder from `a` to `b` becomes the segment
//! `(0,0,0)`–`(h,0,0)`, a box becomes axis-aligned about the origin, and so
//! on. [`Frame`] holds the world→local rotation and translation; `fore` maps
//! into the local frame and `back` maps out of it.

use nalgebra::{Matrix3, Rotation3};
use serde::{Deserialize, Serialize};

use crate::{Point3, Tolerance, Vec3};

/// A rigid (rotation + translation) world→local transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// World position of the local origin.
    pub origin: Point3,
    /// Rotation taking world directions to local directions.
    pub rotation: Rotation3<f64>,
}

impl Frame {
    /// Identity frame.
    pub fn identity() -> Self {
        Self {
            origin: Point3::origin(),
            rotation: Rotation3::identity(),
        }
    }

    /// Pure translation placing the local origin at `origin`.
    pub fn translation(origin: Point3) -> Self {
        Self {
            origin,
            rotation: Rotation3::identity(),
        }
    }

    /// Frame centered at `center` whose local axes are the world axes
    /// rotated by the given angles (degrees, applied about x, then y, then z).
    pub fn from_euler_degrees(center: Point3, angles: &Vec3) -> Self {
        let local_to_world = Rotation3::from_euler_angles(
            angles.x.to_radians(),
            angles.y.to_radians(),
            angles.z.to_radians(),
        );
        Self {
            origin: center,
            rotation: local_to_world.inverse(),
        }
    }

    /// Frame that sends `a` to the origin and `b` onto the positive x axis.
    ///
    /// Returns the frame and the distance `h = |b - a|`, or `None` when the
    /// points coincide.
    pub fn onto_x(a: &Point3, b: &Point3) -> Option<(Self, f64)> {
        let axis = b - a;
        let h = axis.norm();
        if !(h > Tolerance::DEFAULT.linear) {
            return None;
        }
        let x = axis / h;
        // Seed the second axis with the world axis least aligned with x.
        let seed = if x.x.abs() <= x.y.abs() && x.x.abs() <= x.z.abs() {
            Vec3::x()
        } else if x.y.abs() <= x.z.abs() {
            Vec3::y()
        } else {
            Vec3::z()
        };
        let y = (seed - seed.dot(&x) * x).normalize();
        let z = x.cross(&y);
        Some((Self::from_axes(*a, &x, &y, &z), h))
    }

    /// Like [`Frame::onto_x`], additionally rotating about the x axis so that
    /// `c` lands in the local xy plane with `y >= 0`.
    ///
    /// Returns `None` when `a`, `b` and `c` are (nearly) collinear.
    pub fn onto_x_toward(a: &Point3, b: &Point3, c: &Point3) -> Option<(Self, f64)> {
        let axis = b - a;
        let h = axis.norm();
        if !(h > Tolerance::DEFAULT.linear) {
            return None;
        }
        let x = axis / h;
        let ac = c - a;
        let perp = ac - ac.dot(&x) * x;
        let len = perp.norm();
        if !(len > Tolerance::DEFAULT.linear * ac.norm().max(1.0)) {
            return None;
        }
        let y = perp / len;
        let z = x.cross(&y);
        Some((Self::from_axes(*a, &x, &y, &z), h))
    }

    /// Frame with the given orthonormal local axes expressed in world space.
    fn from_axes(origin: Point3, x: &Vec3, y: &Vec3, z: &Vec3) -> Self {
        let m = Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);
        Self {
            origin,
            rotation: Rotation3::from_matrix_unchecked(m),
        }
    }

    /// World point → local point.
    #[inline]
    pub fn fore(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation * (p - self.origin))
    }

    /// World direction → local direction.
    #[inline]
    pub fn fore_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation * v
    }

    /// Local point → world point.
    #[inline]
    pub fn back(&self, p: &Point3) -> Point3 {
        self.origin + self.rotation.inverse_transform_vector(&p.coords)
    }

    /// Local direction → world direction.
    #[inline]
    pub fn back_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation.inverse_transform_vector(v)
    }

    /// World direction of the local x axis.
    pub fn axis(&self) -> Vec3 {
        self.back_vec(&Vec3::x())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}
