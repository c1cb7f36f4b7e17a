//! Thick annulus: a cylinder from `a` to `b` with a coaxial hole.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Frame, Half, Point2, Point3};

use super::{meridian, offer_cap, profile_distance, Band, Crossings, Local, LocalRay, Primitive, Trace};
use crate::{Diagnostics, Ray};

/// `inner <= ρ <= outer` between the planes through `a` and `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Washer {
    /// Center of the first face.
    pub a: Point3,
    /// Center of the second face.
    pub b: Point3,
    /// Hole radius (may be zero).
    pub inner: f64,
    /// Outer radius.
    pub outer: f64,
}

impl Washer {
    /// Create a washer.
    pub fn new(a: Point3, b: Point3, inner: f64, outer: f64) -> Self {
        Self { a, b, inner, outer }
    }

    fn valid(&self) -> bool {
        self.inner >= 0.0 && self.outer > self.inner && self.outer.is_finite()
    }

    fn axis(&self) -> solidray_math::Vec3 {
        (self.b - self.a).try_normalize(0.0).unwrap_or_else(solidray_math::Vec3::x)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WasherPrep {
    frame: Frame,
    e: Point3,
    h: f64,
    inner: f64,
    outer: f64,
}

impl Primitive for Washer {
    type Prep = WasherPrep;

    fn aabb(&self) -> Bbox {
        let axis = self.axis();
        Bbox::around_disc(&self.a, &axis, self.outer).union(&Bbox::around_disc(&self.b, &axis, self.outer))
    }

    fn dry(&self, half: &Half) -> bool {
        let axis = self.axis();
        half.reach_disc(&self.a, &axis, self.outer)
            .max(half.reach_disc(&self.b, &axis, self.outer))
            < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if Frame::onto_x(&self.a, &self.b).is_none() {
            diag.error(ctx, "washer faces coincide");
        }
        if !self.valid() {
            diag.error(
                ctx,
                format!("washer needs 0 <= inner < outer, got {} and {}", self.inner, self.outer),
            );
        } else if self.inner == 0.0 {
            diag.note(ctx, "washer without a hole is a cylinder");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<WasherPrep>> {
        if !self.valid() {
            return None;
        }
        let (frame, h) = Frame::onto_x(&self.a, &self.b)?;
        let e = frame.fore(eye);
        let m = meridian(&e);
        let interior = e.x > 0.0 && e.x < h && m.y > self.inner && m.y < self.outer;
        let profile = [
            Point2::new(0.0, self.inner),
            Point2::new(0.0, self.outer),
            Point2::new(h, self.outer),
            Point2::new(h, self.inner),
        ];
        Some(Local {
            prep: WasherPrep {
                frame,
                e,
                h,
                inner: self.inner,
                outer: self.outer,
            },
            interior,
            min: profile_distance(&m, &profile),
        })
    }
}

impl Trace for WasherPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        Band::straight(self.outer, 0.0, self.h).offer(&local, &self.frame, out);
        if self.inner > 0.0 {
            let hole = Band {
                side: -1.0,
                ..Band::straight(self.inner, 0.0, self.h)
            };
            hole.offer(&local, &self.frame, out);
        }
        offer_cap(&local, 0.0, self.inner, self.outer, -1.0, &self.frame, out);
        offer_cap(&local, self.h, self.inner, self.outer, 1.0, &self.frame, out);
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
