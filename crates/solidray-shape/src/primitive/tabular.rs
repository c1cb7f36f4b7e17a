//! Solid of revolution from a piecewise-linear radius profile.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Frame, Half, Point2, Point3, Vec3};

use super::{meridian, offer_cap, polygon_contains, profile_distance, Band, Crossings, Local, LocalRay, Primitive, Trace};
use crate::{Diagnostics, Ray};

/// Revolves the profile `[(x, r)]` about the axis through `a` toward `b`.
///
/// `x` is measured from `a` along the axis and must be non-decreasing; two
/// consecutive entries with equal `x` form a flat annular step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabular {
    /// Axis origin.
    pub a: Point3,
    /// Any other point on the axis; only its direction matters.
    pub b: Point3,
    /// `(x, radius)` pairs.
    pub profile: Vec<Point2>,
}

impl Tabular {
    /// Create a tabular solid.
    pub fn new(a: Point3, b: Point3, profile: Vec<Point2>) -> Self {
        Self { a, b, profile }
    }

    fn valid(&self) -> bool {
        let p = &self.profile;
        p.len() >= 2
            && p.iter().all(|v| v.x.is_finite() && v.y.is_finite() && v.y >= 0.0)
            && p.windows(2).all(|w| w[1].x >= w[0].x)
            && p[p.len() - 1].x > p[0].x
    }

    fn axis(&self) -> Vec3 {
        (self.b - self.a).try_normalize(0.0).unwrap_or_else(Vec3::x)
    }

    fn discs(&self) -> impl Iterator<Item = (Point3, f64)> + '_ {
        let axis = self.axis();
        self.profile.iter().map(move |v| (self.a + axis * v.x, v.y))
    }

    /// Closed meridian polygon including the axis edge.
    fn outline(&self) -> Vec<Point2> {
        let mut verts = Vec::with_capacity(self.profile.len() + 2);
        if let (Some(first), Some(last)) = (self.profile.first(), self.profile.last()) {
            verts.push(Point2::new(first.x, 0.0));
            verts.extend(self.profile.iter().copied());
            verts.push(Point2::new(last.x, 0.0));
        }
        verts
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TabularPrep {
    frame: Frame,
    e: Point3,
    bands: Vec<Band>,
    /// `(x, inner, outer, facing)` for every flat ring, end caps included.
    rings: Vec<(f64, f64, f64, f64)>,
}

impl Primitive for Tabular {
    type Prep = TabularPrep;

    fn aabb(&self) -> Bbox {
        let axis = self.axis();
        self.discs()
            .fold(Bbox::empty(), |b, (c, r)| b.union(&Bbox::around_disc(&c, &axis, r)))
    }

    fn dry(&self, half: &Half) -> bool {
        let axis = self.axis();
        self.discs()
            .map(|(c, r)| half.reach_disc(&c, &axis, r))
            .fold(f64::NEG_INFINITY, f64::max)
            < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if Frame::onto_x(&self.a, &self.b).is_none() {
            diag.error(ctx, "tabular axis points coincide");
        }
        if self.profile.len() < 2 {
            diag.error(ctx, format!("tabular profile needs at least 2 points, got {}", self.profile.len()));
        } else if !self.valid() {
            diag.error(ctx, "tabular profile must have non-decreasing x, non-negative radii and positive length");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<TabularPrep>> {
        if !self.valid() {
            return None;
        }
        let (frame, _) = Frame::onto_x(&self.a, &self.b)?;
        let p = &self.profile;
        let n = p.len();
        let mut bands = Vec::with_capacity(n - 1);
        let mut rings = Vec::new();
        if p[0].y > 0.0 {
            rings.push((p[0].x, 0.0, p[0].y, -1.0));
        }
        for (i, w) in p.windows(2).enumerate() {
            let (u, v) = (w[0], w[1]);
            if v.x > u.x {
                bands.push(Band {
                    x0: u.x,
                    r0: u.y,
                    k: (v.y - u.y) / (v.x - u.x),
                    lo: u.x,
                    hi: v.x,
                    closed: i + 2 == n,
                    side: 1.0,
                });
            } else if v.y != u.y {
                // A step outward faces back along the axis.
                let facing = if v.y > u.y { -1.0 } else { 1.0 };
                rings.push((u.x, u.y.min(v.y), u.y.max(v.y), facing));
            }
        }
        if p[n - 1].y > 0.0 {
            rings.push((p[n - 1].x, 0.0, p[n - 1].y, 1.0));
        }

        let e = frame.fore(eye);
        let m = meridian(&e);
        let outline = self.outline();
        Some(Local {
            prep: TabularPrep { frame, e, bands, rings },
            interior: polygon_contains(&m, &outline),
            min: profile_distance(&m, &outline),
        })
    }
}

impl Trace for TabularPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        for band in &self.bands {
            band.offer(&local, &self.frame, out);
        }
        for &(x, inner, outer, facing) in &self.rings {
            offer_cap(&local, x, inner, outer, facing, &self.frame, out);
        }
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
