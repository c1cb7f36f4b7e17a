//! Sphere: `|p - center| <= radius`.

use serde::{Deserialize, Serialize};
use solidray_math::{solve_quadratic, Bbox, Half, Point3, Vec3};

use super::{Crossings, Local, Primitive, Trace};
use crate::diagnostic::{finite, positive};
use crate::{Diagnostics, Ray};

/// A ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SpherePrep {
    center: Point3,
    /// `eye - center`
    oc: Vec3,
    /// `|oc|² - r²`, negative inside.
    c: f64,
}

impl Primitive for Sphere {
    type Prep = SpherePrep;

    fn aabb(&self) -> Bbox {
        Bbox::around_sphere(&self.center, self.radius)
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_sphere(&self.center, self.radius) < 0.0
    }

    fn degenerate(&self) -> bool {
        !(self.radius > 0.0 && self.radius.is_finite())
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        positive(diag, ctx, "sphere radius", self.radius);
        for v in self.center.iter() {
            finite(diag, ctx, "sphere center", *v);
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<SpherePrep>> {
        if self.degenerate() {
            return None;
        }
        let oc = eye - self.center;
        let len = oc.norm();
        let c = oc.norm_squared() - self.radius * self.radius;
        Some(Local {
            prep: SpherePrep {
                center: self.center,
                oc,
                c,
            },
            interior: c < 0.0,
            min: (len - self.radius).abs(),
        })
    }
}

impl Trace for SpherePrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let d = &ray.diff;
        let a = d.norm_squared();
        let b = 2.0 * self.oc.dot(d);
        // From inside only the far root can be positive; from outside the
        // near root wins in first-hit mode and the far one is skipped.
        for &q in solve_quadratic(a, b, self.c).as_slice() {
            out.offer(q, || ray.at(q) - self.center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_head_on_hits() {
        let s = Sphere::new(Point3::origin(), 1.0);
        let hits = testing::all(&s, Point3::new(-5.0, 0.0, 0.0), Point3::origin());
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].q, 0.8, epsilon = 1e-12);
        assert_relative_eq!(hits[1].q, 1.2, epsilon = 1e-12);
        assert!(hits[0].normal.normalize().dot(&Vec3::x()) < -0.999);
    }

    #[test]
    fn test_tangent_and_miss() {
        let s = Sphere::new(Point3::origin(), 1.0);
        // Grazing the pole: a double root, reported twice.
        let hits = testing::all(&s, Point3::new(-5.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert_relative_eq!(h.q, 1.0, epsilon = 1e-12);
            assert_relative_eq!(h.normal.normalize(), Vec3::z(), epsilon = 1e-12);
        }
        let miss = testing::all(&s, Point3::new(-5.0, 0.0, 1.01), Point3::new(0.0, 0.0, 1.01));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_from_inside() {
        let s = Sphere::new(Point3::origin(), 2.0);
        let local = s.prepare(&Point3::origin()).unwrap();
        assert!(local.interior);
        assert_relative_eq!(local.min, 2.0);
        let hits = testing::all(&s, Point3::origin(), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].q, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dry() {
        let s = Sphere::new(Point3::new(5.0, 0.0, 0.0), 1.0);
        assert!(s.dry(&Half::new(Point3::origin(), -Vec3::x())));
        assert!(!s.dry(&Half::new(Point3::new(5.5, 0.0, 0.0), Vec3::x())));
        assert!(s.dry(&Half::new(Point3::new(6.5, 0.0, 0.0), Vec3::x())));
    }

    #[test]
    fn test_bounds_sound() {
        testing::check_bounds(&Sphere::new(Point3::new(0.3, -0.2, 0.1), 1.3), 4.0);
    }

    #[test]
    fn test_degenerate() {
        let s = Sphere::new(Point3::origin(), 0.0);
        assert!(s.prepare(&Point3::new(1.0, 0.0, 0.0)).is_none());
        let mut d = Diagnostics::default();
        s.check(&mut d, "sphere");
        assert_eq!(d.error_count(), 1);
    }
}
