//! Capsules: a cylinder with hemispherical ends.

use serde::{Deserialize, Serialize};
use solidray_math::{segment_distance, solve_quadratic, Bbox, Frame, Half, Point2, Point3, Vec3};

use super::{meridian, offer_cap, profile_distance, Band, Crossings, Local, LocalRay, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// Points within `radius` of the segment `a`–`b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pill {
    /// First end.
    pub a: Point3,
    /// Second end.
    pub b: Point3,
    /// Radius.
    pub radius: f64,
}

/// Cylinder from `a` to `b` with a flat base at `a` and a dome at `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Silo {
    /// Center of the flat base.
    pub a: Point3,
    /// Center of the dome.
    pub b: Point3,
    /// Radius.
    pub radius: f64,
}

impl Pill {
    /// Create a pill.
    pub fn new(a: Point3, b: Point3, radius: f64) -> Self {
        Self { a, b, radius }
    }
}

impl Silo {
    /// Create a silo.
    pub fn new(a: Point3, b: Point3, radius: f64) -> Self {
        Self { a, b, radius }
    }
}

fn axis(a: &Point3, b: &Point3) -> Vec3 {
    (b - a).try_normalize(0.0).unwrap_or_else(Vec3::x)
}

fn check_capsule(diag: &mut Diagnostics, ctx: &str, name: &str, a: &Point3, b: &Point3, r: f64) {
    positive(diag, ctx, name, r);
    if Frame::onto_x(a, b).is_none() {
        diag.error(ctx, format!("{name} endpoints coincide"));
    }
}

/// Offer crossings with the sphere of radius `r` about `(cx, 0, 0)`,
/// keeping those whose local x satisfies `keep`.
fn offer_ball(
    ray: &LocalRay,
    cx: f64,
    r: f64,
    keep: impl Fn(f64) -> bool,
    frame: &Frame,
    out: &mut Crossings<'_>,
) {
    let center = Point3::new(cx, 0.0, 0.0);
    let oc = ray.e - center;
    let roots = solve_quadratic(ray.d.norm_squared(), 2.0 * oc.dot(&ray.d), oc.norm_squared() - r * r);
    for &q in roots.as_slice() {
        if !out.accepts(q) {
            continue;
        }
        let p = ray.at(q);
        if keep(p.x) {
            out.offer(q, || frame.back_vec(&(p - center)));
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PillPrep {
    frame: Frame,
    e: Point3,
    h: f64,
    r: f64,
}

impl Primitive for Pill {
    type Prep = PillPrep;

    fn aabb(&self) -> Bbox {
        Bbox::around_sphere(&self.a, self.radius).union(&Bbox::around_sphere(&self.b, self.radius))
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_sphere(&self.a, self.radius)
            .max(half.reach_sphere(&self.b, self.radius))
            < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        check_capsule(diag, ctx, "pill", &self.a, &self.b, self.radius);
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<PillPrep>> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return None;
        }
        let (frame, h) = Frame::onto_x(&self.a, &self.b)?;
        let dist = segment_distance(eye, &self.a, &self.b);
        Some(Local {
            prep: PillPrep {
                frame,
                e: frame.fore(eye),
                h,
                r: self.radius,
            },
            interior: dist < self.radius,
            min: (dist - self.radius).abs(),
        })
    }
}

impl Trace for PillPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        Band::straight(self.r, 0.0, self.h).offer(&local, &self.frame, out);
        offer_ball(&local, 0.0, self.r, |x| x < 0.0, &self.frame, out);
        let h = self.h;
        offer_ball(&local, h, self.r, |x| x > h, &self.frame, out);
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SiloPrep {
    frame: Frame,
    e: Point3,
    h: f64,
    r: f64,
}

impl Primitive for Silo {
    type Prep = SiloPrep;

    fn aabb(&self) -> Bbox {
        let axis = axis(&self.a, &self.b);
        Bbox::around_disc(&self.a, &axis, self.radius).union(&Bbox::around_sphere(&self.b, self.radius).loosen())
    }

    fn dry(&self, half: &Half) -> bool {
        let axis = axis(&self.a, &self.b);
        half.reach_disc(&self.a, &axis, self.radius)
            .max(half.reach_sphere(&self.b, self.radius))
            < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        check_capsule(diag, ctx, "silo", &self.a, &self.b, self.radius);
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<SiloPrep>> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return None;
        }
        let (frame, h) = Frame::onto_x(&self.a, &self.b)?;
        let r = self.radius;
        let e = frame.fore(eye);
        let m = meridian(&e);
        let to_dome = (e - Point3::new(h, 0.0, 0.0)).norm();
        let interior = (e.x > 0.0 && e.x <= h && m.y < r) || (e.x > h && to_dome < r);
        // Each term bounds the distance to one surface piece: the wall, the
        // plane holding the base, and the sphere holding the dome.
        let wall = profile_distance(&m, &[Point2::new(0.0, r), Point2::new(h, r)]);
        let min = wall.min(e.x.abs()).min((to_dome - r).abs());
        Some(Local {
            prep: SiloPrep { frame, e, h, r },
            interior,
            min,
        })
    }
}

impl Trace for SiloPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        Band::straight(self.r, 0.0, self.h).offer(&local, &self.frame, out);
        offer_cap(&local, 0.0, 0.0, self.r, -1.0, &self.frame, out);
        let h = self.h;
        offer_ball(&local, h, self.r, |x| x > h, &self.frame, out);
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
