//! Rays and intersection records.

use std::fmt;

use solidray_math::{Point3, Vec3};

use crate::Shape;

/// A ray `eye + q * diff`, parameterized so that `q = 1` is the target.
///
/// Visible crossings have `q` in the open window `(0, qmin)`; the scheduler
/// shrinks `qmin` as closer hits are found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point (the eye).
    pub eye: Point3,
    /// `target - eye`; not normalized.
    pub diff: Vec3,
}

impl Ray {
    /// Ray from `eye` through `target`.
    pub fn new(eye: Point3, target: Point3) -> Self {
        Self {
            eye,
            diff: target - eye,
        }
    }

    /// Point at parameter `q`.
    #[inline]
    pub fn at(&self, q: f64) -> Point3 {
        self.eye + self.diff * q
    }

    /// Length of `diff`, i.e. the world distance per unit of `q`.
    #[inline]
    pub fn length(&self) -> f64 {
        self.diff.norm()
    }
}

/// A visible crossing of a ray with a shape.
///
/// `normal` is unit length. For solid surfaces it points out of the
/// (combined) solid; for sheets it faces the eye. `shape` is the primitive
/// that was actually hit, which carries the color tag.
pub struct Inq<'a, C> {
    /// Ray parameter of the crossing.
    pub q: f64,
    /// World position.
    pub point: Point3,
    /// Unit surface normal.
    pub normal: Vec3,
    /// Primitive that produced the crossing.
    pub shape: &'a Shape<C>,
    /// Whether the crossing is on a zero-thickness sheet.
    pub sheet: bool,
}

impl<'a, C> Inq<'a, C> {
    pub(crate) fn new(ray: &Ray, q: f64, normal: Vec3, shape: &'a Shape<C>, sheet: bool) -> Self {
        let normal = normal
            .try_normalize(0.0)
            .or_else(|| (-ray.diff).try_normalize(0.0))
            .unwrap_or_else(Vec3::x);
        Self {
            q,
            point: ray.at(q),
            normal,
            shape,
            sheet,
        }
    }

    /// Color tag of the hit primitive, if any.
    pub fn base(&self) -> Option<&'a C> {
        self.shape.base.as_ref()
    }

    /// Point the normal against (`toward_eye`) or along the ray direction.
    pub(crate) fn orient(&mut self, diff: &Vec3, toward_eye: bool) {
        let along = self.normal.dot(diff) > 0.0;
        if along == toward_eye {
            self.normal = -self.normal;
        }
    }
}

impl<C> Clone for Inq<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Inq<'_, C> {}

impl<C> fmt::Debug for Inq<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inq")
            .field("q", &self.q)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .field("shape", &self.shape.name())
            .field("sheet", &self.sheet)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;

    #[test]
    fn test_ray_at() {
        let r = Ray::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(r.at(0.5), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(r.length(), 2.0);
    }

    #[test]
    fn test_orient() {
        let s: Shape<Rgb> = Shape::sphere(Point3::origin(), 1.0);
        let r = Ray::new(Point3::new(-5.0, 0.0, 0.0), Point3::origin());
        let mut hit = Inq::new(&r, 0.8, Vec3::new(3.0, 0.0, 0.0), &s, false);
        assert_eq!(hit.normal, Vec3::x());
        hit.orient(&r.diff, true);
        assert_eq!(hit.normal, -Vec3::x());
        hit.orient(&r.diff, true);
        assert_eq!(hit.normal, -Vec3::x());
        hit.orient(&r.diff, false);
        assert_eq!(hit.normal, Vec3::x());
    }
}
