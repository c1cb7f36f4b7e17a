//! Paraboloid of revolution closed by a flat base.

use serde::{Deserialize, Serialize};
use solidray_math::{solve_quadratic, Bbox, Frame, Half, Point2, Point3, Vec3};

use super::{meridian, offer_cap, profile_distance, Crossings, Local, LocalRay, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// `ρ² <= r² (h - x) / h` for `0 <= x <= h`: base disc at `base`, tip at
/// `apex`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paraboloid {
    /// Center of the base disc.
    pub base: Point3,
    /// Tip.
    pub apex: Point3,
    /// Base radius.
    pub radius: f64,
}

impl Paraboloid {
    /// Create a paraboloid.
    pub fn new(base: Point3, apex: Point3, radius: f64) -> Self {
        Self { base, apex, radius }
    }

    fn axis(&self) -> Vec3 {
        (self.apex - self.base).try_normalize(0.0).unwrap_or_else(Vec3::x)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ParaboloidPrep {
    frame: Frame,
    e: Point3,
    r: f64,
    /// `r² / h`
    s: f64,
}

impl Primitive for Paraboloid {
    type Prep = ParaboloidPrep;

    fn aabb(&self) -> Bbox {
        let axis = self.axis();
        Bbox::around_disc(&self.base, &axis, self.radius)
            .union(&Bbox::around_disc(&self.apex, &axis, self.radius).loosen())
    }

    fn dry(&self, half: &Half) -> bool {
        // The profile bulges past the cone, so use the enclosing cylinder.
        let axis = self.axis();
        half.reach_disc(&self.base, &axis, self.radius)
            .max(half.reach_disc(&self.apex, &axis, self.radius))
            < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        positive(diag, ctx, "paraboloid radius", self.radius);
        if Frame::onto_x(&self.base, &self.apex).is_none() {
            diag.error(ctx, "paraboloid base and apex coincide");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<ParaboloidPrep>> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return None;
        }
        let (frame, h) = Frame::onto_x(&self.base, &self.apex)?;
        let r = self.radius;
        let s = r * r / h;
        let e = frame.fore(eye);
        let m = meridian(&e);
        let interior = e.x > 0.0 && m.y * m.y < r * r - s * e.x;
        let min = if interior {
            0.0
        } else {
            let bounding = [
                Point2::new(0.0, 0.0),
                Point2::new(0.0, r),
                Point2::new(h, r),
                Point2::new(h, 0.0),
            ];
            let inside_cylinder = e.x > 0.0 && e.x < h && m.y < r;
            if inside_cylinder {
                0.0
            } else {
                profile_distance(&m, &bounding)
            }
        };
        Some(Local {
            prep: ParaboloidPrep { frame, e, r, s },
            interior,
            min,
        })
    }
}

impl Trace for ParaboloidPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        let (e, d) = (&local.e, &local.d);
        // y² + z² + s x - r² = 0
        let a = d.y * d.y + d.z * d.z;
        let b = 2.0 * (e.y * d.y + e.z * d.z) + self.s * d.x;
        let c = e.y * e.y + e.z * e.z + self.s * e.x - self.r * self.r;
        for &q in solve_quadratic(a, b, c).as_slice() {
            if !out.accepts(q) {
                continue;
            }
            let p = local.at(q);
            if p.x >= 0.0 {
                out.offer(q, || self.frame.back_vec(&Vec3::new(self.s, 2.0 * p.y, 2.0 * p.z)));
            }
        }
        offer_cap(&local, 0.0, 0.0, self.r, -1.0, &self.frame, out);
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tip_and_base() {
        let p = Paraboloid::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 1.0);
        let hits = testing::all(&p, Point3::new(0.0, 0.0, 5.0), Point3::origin());
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].q, 0.6, epsilon = 1e-12);
        assert!(hits[0].normal.normalize().z > 0.999);
        assert_relative_eq!(hits[1].q, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_side() {
        let p = Paraboloid::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 1.0);
        // At height 1 the radius is sqrt(1/2).
        let hits = testing::all(&p, Point3::new(-5.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].q, (5.0 - 0.5f64.sqrt()) / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_sound() {
        testing::check_bounds(&Paraboloid::new(Point3::new(0.2, 0.0, -1.0), Point3::new(-0.3, 0.4, 1.0), 0.9), 4.0);
    }
}
