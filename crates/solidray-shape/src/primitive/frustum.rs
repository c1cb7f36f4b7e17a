//! Cylinder, cone and general frustum.
//!
//! All three map `a` to the origin and `b` to `(h, 0, 0)`; the lateral
//! surface is `ρ = ra + (rb - ra) x / h` for `0 <= x <= h`, closed by flat
//! caps wherever the end radius is positive.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Frame, Half, Point2, Point3};

use super::{meridian, offer_cap, profile_distance, Band, Crossings, Local, LocalRay, Primitive, Trace};
use crate::diagnostic::finite;
use crate::{Diagnostics, Ray};

/// Right circular cylinder from `a` to `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Center of the first cap.
    pub a: Point3,
    /// Center of the second cap.
    pub b: Point3,
    /// Radius.
    pub radius: f64,
}

/// Right circular cone with its base disc at `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    /// Center of the base disc.
    pub base: Point3,
    /// Apex.
    pub apex: Point3,
    /// Base radius.
    pub radius: f64,
}

/// Truncated cone with independent end radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bicylinder {
    /// Center of the first cap.
    pub a: Point3,
    /// Center of the second cap.
    pub b: Point3,
    /// Radius at `a`.
    pub ra: f64,
    /// Radius at `b`.
    pub rb: f64,
}

impl Cylinder {
    /// Create a cylinder.
    pub fn new(a: Point3, b: Point3, radius: f64) -> Self {
        Self { a, b, radius }
    }
}

impl Cone {
    /// Create a cone.
    pub fn new(base: Point3, apex: Point3, radius: f64) -> Self {
        Self { base, apex, radius }
    }
}

impl Bicylinder {
    /// Create a frustum.
    pub fn new(a: Point3, b: Point3, ra: f64, rb: f64) -> Self {
        Self { a, b, ra, rb }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frustum {
    a: Point3,
    b: Point3,
    ra: f64,
    rb: f64,
}

impl Frustum {
    fn axis(&self) -> solidray_math::Vec3 {
        (self.b - self.a).try_normalize(0.0).unwrap_or_else(solidray_math::Vec3::x)
    }

    fn aabb(&self) -> Bbox {
        let axis = self.axis();
        Bbox::around_disc(&self.a, &axis, self.ra).union(&Bbox::around_disc(&self.b, &axis, self.rb))
    }

    fn dry(&self, half: &Half) -> bool {
        let axis = self.axis();
        half.reach_disc(&self.a, &axis, self.ra).max(half.reach_disc(&self.b, &axis, self.rb)) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str, name: &str) {
        for v in self.a.iter().chain(self.b.iter()) {
            if !finite(diag, ctx, name, *v) {
                return;
            }
        }
        if Frame::onto_x(&self.a, &self.b).is_none() {
            diag.error(ctx, format!("{name} endpoints coincide"));
        }
        if !(self.ra >= 0.0 && self.rb >= 0.0) || !(self.ra.is_finite() && self.rb.is_finite()) {
            diag.error(ctx, format!("{name} radii must be non-negative, got {} and {}", self.ra, self.rb));
        } else if self.ra == 0.0 && self.rb == 0.0 {
            diag.error(ctx, format!("{name} has zero radius"));
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<FrustumPrep>> {
        let ok = self.ra >= 0.0 && self.rb >= 0.0 && self.ra.max(self.rb) > 0.0;
        if !ok || !self.ra.is_finite() || !self.rb.is_finite() {
            return None;
        }
        let (frame, h) = Frame::onto_x(&self.a, &self.b)?;
        let e = frame.fore(eye);
        let k = (self.rb - self.ra) / h;
        let m = meridian(&e);
        let interior = e.x > 0.0 && e.x < h && m.y < self.ra + k * e.x;
        let profile = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, self.ra),
            Point2::new(h, self.rb),
            Point2::new(h, 0.0),
        ];
        Some(Local {
            prep: FrustumPrep {
                frame,
                e,
                h,
                ra: self.ra,
                rb: self.rb,
                band: Band { k, ..Band::straight(self.ra, 0.0, h) },
            },
            interior,
            min: profile_distance(&m, &profile),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FrustumPrep {
    frame: Frame,
    e: Point3,
    h: f64,
    ra: f64,
    rb: f64,
    band: Band,
}

impl Trace for FrustumPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        self.band.offer(&local, &self.frame, out);
        if self.ra > 0.0 {
            offer_cap(&local, 0.0, 0.0, self.ra, -1.0, &self.frame, out);
        }
        if self.rb > 0.0 {
            offer_cap(&local, self.h, 0.0, self.rb, 1.0, &self.frame, out);
        }
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}

macro_rules! frustum_primitive {
    ($ty:ty, $name:literal, |$s:ident| $make:expr) => {
        impl Primitive for $ty {
            type Prep = FrustumPrep;

            fn aabb(&self) -> Bbox {
                let $s = self;
                $make.aabb()
            }

            fn dry(&self, half: &Half) -> bool {
                let $s = self;
                $make.dry(half)
            }

            fn check(&self, diag: &mut Diagnostics, ctx: &str) {
                let $s = self;
                $make.check(diag, ctx, $name)
            }

            fn prepare(&self, eye: &Point3) -> Option<Local<FrustumPrep>> {
                let $s = self;
                $make.prepare(eye)
            }
        }
    };
}

frustum_primitive!(Cylinder, "cylinder", |s| Frustum {
    a: s.a,
    b: s.b,
    ra: s.radius,
    rb: s.radius
});

frustum_primitive!(Cone, "cone", |s| Frustum {
    a: s.base,
    b: s.apex,
    ra: s.radius,
    rb: 0.0
});

frustum_primitive!(Bicylinder, "bicylinder", |s| Frustum {
    a: s.a,
    b: s.b,
    ra: s.ra,
    rb: s.rb
});

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use approx::assert_relative_eq;
    use solidray_math::Vec3;

    fn z_cylinder() -> Cylinder {
        Cylinder::new(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0), 1.0)
    }

    #[test]
    fn test_cylinder_side_and_caps() {
        let c = z_cylinder();
        let side = testing::all(&c, Point3::new(-5.0, 0.0, 0.0), Point3::origin());
        assert_eq!(side.len(), 2);
        assert_relative_eq!(side[0].q, 0.8, epsilon = 1e-12);
        assert_relative_eq!(side[0].normal.normalize().x, -1.0, epsilon = 1e-12);

        let top = testing::all(&c, Point3::new(0.2, 0.0, 5.0), Point3::new(0.2, 0.0, 0.0));
        assert_eq!(top.len(), 2);
        assert_relative_eq!(top[0].q, 0.8, epsilon = 1e-12);
        assert_relative_eq!(top[0].normal.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(top[1].normal.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tangent_side() {
        let c = z_cylinder();
        let hits = testing::all(&c, Point3::new(-5.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert_relative_eq!(h.q, 1.0, epsilon = 1e-12);
            assert_relative_eq!(h.normal.normalize(), Vec3::y(), epsilon = 1e-12);
        }
        assert!(testing::all(&c, Point3::new(-5.0, 1.01, 0.0), Point3::new(0.0, 1.01, 0.0)).is_empty());

        // The cone's radius is 0.5 halfway up.
        let cone = Cone::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 1.0);
        let hits = testing::all(&cone, Point3::new(-5.0, 0.5, 1.0), Point3::new(0.0, 0.5, 1.0));
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert_relative_eq!(h.q, 1.0, epsilon = 1e-12);
            let n = h.normal.normalize();
            assert_relative_eq!(n.x, 0.0, epsilon = 1e-12);
            assert!(n.y > 0.0 && n.z > 0.0);
        }
        assert!(testing::all(&cone, Point3::new(-5.0, 0.51, 1.0), Point3::new(0.0, 0.51, 1.0)).is_empty());
    }

    #[test]
    fn test_cylinder_exact_bound_outside() {
        let local = z_cylinder().prepare(&Point3::new(4.0, 0.0, 5.0)).unwrap();
        assert!(!local.interior);
        assert_relative_eq!(local.min, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cone_apex_region() {
        let cone = Cone::new(Point3::origin(), Point3::new(0.0, 0.0, 2.0), 1.0);
        // Halfway up the radius is 0.5.
        let hits = testing::all(&cone, Point3::new(-5.0, 0.0, 1.0), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].q, 0.9, epsilon = 1e-12);
        let n = hits[0].normal.normalize();
        assert!(n.x < 0.0 && n.z > 0.0);
        assert!(cone.prepare(&Point3::new(0.0, 0.0, 0.5)).unwrap().interior);
        assert!(!cone.prepare(&Point3::new(0.8, 0.0, 1.0)).unwrap().interior);
    }

    #[test]
    fn test_dry_uses_end_discs() {
        let c = z_cylinder();
        assert!(c.dry(&Half::new(Point3::new(0.0, 0.0, 1.5), Vec3::z())));
        assert!(!c.dry(&Half::new(Point3::new(0.0, 0.0, 0.5), Vec3::z())));
        assert!(c.dry(&Half::new(Point3::new(1.1, 0.0, 0.0), Vec3::x())));
    }

    #[test]
    fn test_degenerate() {
        let c = Cylinder::new(Point3::origin(), Point3::origin(), 1.0);
        assert!(c.prepare(&Point3::new(3.0, 0.0, 0.0)).is_none());
        let mut d = Diagnostics::default();
        c.check(&mut d, "cylinder");
        assert_eq!(d.error_count(), 1);
    }

    #[test]
    fn test_bounds_sound() {
        testing::check_bounds(&z_cylinder(), 4.0);
        testing::check_bounds(
            &Bicylinder::new(Point3::new(0.3, -0.2, -1.0), Point3::new(-0.4, 0.5, 1.2), 0.4, 1.1),
            4.0,
        );
        testing::check_bounds(&Cone::new(Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 0.5, 0.3), 0.8), 4.0);
    }
}
