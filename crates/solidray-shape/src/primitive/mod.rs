//! Primitive shapes.
//!
//! Each primitive is a plain serde-derived description plus an
//! implementation of [`Primitive`]. Per-frame work happens in
//! [`Primitive::prepare`], which canonicalizes the primitive into a local
//! frame once for the fixed eye and returns a `Prep` that answers ray
//! queries with a few dot products. Hits are pushed into a [`Crossings`]
//! sink, so one routine serves both the first-hit and the all-hits query.

mod capsule;
mod cuboid;
mod ellipsoid;
mod flat;
mod frustum;
mod paraboloid;
mod plane;
mod sphere;
mod surf;
mod tabular;
mod torus;
mod washer;

pub use capsule::{Pill, Silo};
pub use cuboid::Cuboid;
pub use ellipsoid::Ellipsoid;
pub use flat::{Circle, Polygon, Triangle};
pub use frustum::{Bicylinder, Cone, Cylinder};
pub use paraboloid::Paraboloid;
pub use plane::{AxisPlane, Everything, HalfSpace, Nothing, XPlane, YPlane, ZPlane};
pub use sphere::Sphere;
pub use surf::Surf;
pub use tabular::Tabular;
pub use torus::Torus;
pub use washer::Washer;

pub(crate) use flat::TrianglePrep;

use solidray_math::{Bbox, Frame, Half, Point2, Point3, Tolerance, Vec3};

use crate::{Diagnostics, Ray};

/// Behavior shared by every primitive description.
pub(crate) trait Primitive {
    /// Per-frame state.
    type Prep: Trace;

    /// Whether the primitive bounds a volume (as opposed to a sheet).
    const SOLID: bool = true;

    /// Tagged axis-aligned bounds.
    fn aabb(&self) -> Bbox;

    /// True only if no point of the primitive lies in `half`.
    fn dry(&self, half: &Half) -> bool;

    /// Record structural problems.
    fn check(&self, diag: &mut Diagnostics, ctx: &str);

    /// Canonicalize for a fixed eye; `None` for degenerate geometry.
    fn prepare(&self, eye: &Point3) -> Option<Local<Self::Prep>>;

    /// Whether the parameters describe no surface at all. Must agree with
    /// `prepare` returning `None`.
    fn degenerate(&self) -> bool {
        self.prepare(&Point3::origin()).is_none()
    }
}

/// Result of preparing a primitive for one eye point.
pub(crate) struct Local<P> {
    pub prep: P,
    /// Whether the eye is strictly inside the solid.
    pub interior: bool,
    /// Lower bound on the distance from the eye to the surface.
    pub min: f64,
}

/// Ray queries against prepared primitive state.
///
/// The ray's eye must be the point the state was prepared for.
pub(crate) trait Trace {
    /// Push every crossing with `q` in the sink's window. Normals are in
    /// world space and point out of the solid.
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>);

    /// Map a local-frame point back to world space.
    fn back(&self, local: &Point3) -> Point3 {
        *local
    }
}

/// A raw crossing before it is attached to a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub q: f64,
    pub normal: Vec3,
}

/// Collects crossings inside the open window `(0, qmin)`.
///
/// In first-hit mode every accepted crossing shrinks the window, so later
/// candidates further along the ray are rejected before their normal is
/// computed.
pub(crate) struct Crossings<'v> {
    qmin: f64,
    first: Option<Hit>,
    all: Option<&'v mut Vec<Hit>>,
}

impl<'v> Crossings<'v> {
    pub fn first(qmin: f64) -> Self {
        Self {
            qmin,
            first: None,
            all: None,
        }
    }

    pub fn all(qmin: f64, buf: &'v mut Vec<Hit>) -> Self {
        Self {
            qmin,
            first: None,
            all: Some(buf),
        }
    }

    #[inline]
    pub fn accepts(&self, q: f64) -> bool {
        q > 0.0 && q < self.qmin
    }

    #[inline]
    pub fn offer(&mut self, q: f64, normal: impl FnOnce() -> Vec3) {
        if !self.accepts(q) {
            return;
        }
        let hit = Hit { q, normal: normal() };
        match self.all.as_mut() {
            Some(buf) => buf.push(hit),
            None => {
                self.qmin = q;
                self.first = Some(hit);
            }
        }
    }

    pub fn into_first(self) -> Option<Hit> {
        self.first
    }
}

const TOL: Tolerance = Tolerance::DEFAULT;

/// A ray expressed in a primitive's local frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalRay {
    pub e: Point3,
    pub d: Vec3,
}

impl LocalRay {
    #[inline]
    pub fn at(&self, q: f64) -> Point3 {
        self.e + self.d * q
    }
}

/// One lateral band of a solid of revolution about the local x axis:
/// radius `r0 + k (x - x0)` for `x` between `lo` and `hi`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Band {
    pub x0: f64,
    pub r0: f64,
    pub k: f64,
    pub lo: f64,
    pub hi: f64,
    /// Whether `hi` itself belongs to the band.
    pub closed: bool,
    /// `1.0` if the solid is inside the band radius, `-1.0` if outside.
    pub side: f64,
}

impl Band {
    pub fn straight(r: f64, lo: f64, hi: f64) -> Self {
        Self {
            x0: lo,
            r0: r,
            k: 0.0,
            lo,
            hi,
            closed: true,
            side: 1.0,
        }
    }

    #[inline]
    fn radius(&self, x: f64) -> f64 {
        self.r0 + self.k * (x - self.x0)
    }

    fn holds(&self, x: f64) -> bool {
        x >= self.lo && (x < self.hi || (self.closed && x <= self.hi))
    }

    /// Offer crossings of `ray` (local) with the band surface.
    pub fn offer(&self, ray: &LocalRay, frame: &Frame, out: &mut Crossings<'_>) {
        let (e, d) = (&ray.e, &ray.d);
        let re = self.radius(e.x);
        let a = d.y * d.y + d.z * d.z - self.k * self.k * d.x * d.x;
        let b = 2.0 * (e.y * d.y + e.z * d.z - self.k * d.x * re);
        let c = e.y * e.y + e.z * e.z - re * re;
        for &q in solidray_math::solve_quadratic(a, b, c).as_slice() {
            if !out.accepts(q) {
                continue;
            }
            let p = ray.at(q);
            if !self.holds(p.x) {
                continue;
            }
            out.offer(q, || {
                let n = Vec3::new(-self.k * self.radius(p.x), p.y, p.z) * self.side;
                frame.back_vec(&n)
            });
        }
    }
}

/// Offer the crossing of `ray` (local) with the annulus
/// `inner <= ρ <= outer` in the plane `x = at`, facing `sign · x`.
pub(crate) fn offer_cap(
    ray: &LocalRay,
    at: f64,
    inner: f64,
    outer: f64,
    sign: f64,
    frame: &Frame,
    out: &mut Crossings<'_>,
) {
    if TOL.is_degenerate(ray.d.x) {
        return;
    }
    let q = (at - ray.e.x) / ray.d.x;
    if !out.accepts(q) {
        return;
    }
    let p = ray.at(q);
    let rho2 = p.y * p.y + p.z * p.z;
    if rho2 <= outer * outer && rho2 >= inner * inner {
        out.offer(q, || frame.back_vec(&Vec3::new(sign, 0.0, 0.0)));
    }
}

/// Meridian coordinates `(x, ρ)` of a local point.
#[inline]
pub(crate) fn meridian(p: &Point3) -> Point2 {
    Point2::new(p.x, (p.y * p.y + p.z * p.z).sqrt())
}

/// Distance from `p` to the boundary of a closed polygon in the meridian
/// half-plane. For a solid of revolution this bounds the distance to its
/// surface from below, inside or out.
pub(crate) fn profile_distance(p: &Point2, verts: &[Point2]) -> f64 {
    let n = verts.len();
    (0..n)
        .map(|i| {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            let ab = b - a;
            let len2 = ab.norm_squared();
            let t = if len2 > 0.0 {
                ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (p - (a + ab * t)).norm()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Lower bound from a bounding sphere: exact-or-under when the eye is
/// outside it, zero otherwise.
pub(crate) fn sphere_bound(eye: &Point3, center: &Point3, radius: f64) -> f64 {
    ((eye - center).norm() - radius).max(0.0)
}

/// Point-in-polygon by crossing number, in 2D.
pub(crate) fn polygon_contains(p: &Point2, verts: &[Point2]) -> bool {
    let n = verts.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (verts[i], verts[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
pub(crate) mod testing {
    //! Sampling helpers shared by the primitive tests.

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use solidray_math::{Half, Point3, Vec3};

    use super::{Crossings, Hit, Primitive, Trace};
    use crate::Ray;

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5011d)
    }

    pub fn unit(rng: &mut StdRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.random::<f64>() * 2.0 - 1.0,
                rng.random::<f64>() * 2.0 - 1.0,
                rng.random::<f64>() * 2.0 - 1.0,
            );
            let n = v.norm();
            if n > 0.1 && n <= 1.0 {
                return v / n;
            }
        }
    }

    pub fn point(rng: &mut StdRng, scale: f64) -> Point3 {
        Point3::from(unit(rng) * scale * rng.random::<f64>())
    }

    pub fn all<P: Primitive>(p: &P, eye: Point3, target: Point3) -> Vec<Hit> {
        let local = p.prepare(&eye).expect("non-degenerate");
        let mut buf = Vec::new();
        let mut cr = Crossings::all(f64::INFINITY, &mut buf);
        local.prep.crossings(&Ray::new(eye, target), &mut cr);
        buf.sort_by(|a, b| a.q.total_cmp(&b.q));
        buf
    }

    /// Fire random rays from random eyes; every surface point found must be
    /// at least the prepared lower bound away from the eye, and the first
    /// crossing must agree with the smallest of all crossings.
    pub fn check_bounds<P: Primitive>(p: &P, scale: f64) {
        let mut rng = rng();
        for _ in 0..300 {
            let eye = point(&mut rng, scale);
            let local = match p.prepare(&eye) {
                Some(l) => l,
                None => continue,
            };
            let target = eye + unit(&mut rng);
            let ray = Ray::new(eye, target);
            let mut buf = Vec::new();
            let mut cr = Crossings::all(f64::INFINITY, &mut buf);
            local.prep.crossings(&ray, &mut cr);
            for h in &buf {
                let dist = (ray.at(h.q) - eye).norm();
                assert!(
                    dist >= local.min - 1e-9,
                    "hit at {dist} closer than bound {}",
                    local.min
                );
                let n = unit(&mut rng);
                let half = Half::new(ray.at(h.q) - n * 1e-9, n);
                assert!(!p.dry(&half), "dry against a half-space holding a surface point");
            }
            let mut first = Crossings::first(f64::INFINITY);
            local.prep.crossings(&ray, &mut first);
            let smallest = buf.iter().map(|h| h.q).fold(f64::INFINITY, f64::min);
            match first.into_first() {
                Some(h) => assert!((h.q - smallest).abs() < 1e-12),
                None => assert!(buf.is_empty()),
            }
            if P::SOLID {
                // Crossing parity decides inside/outside of the far end.
                let far = ray.at(1e3 * scale);
                let far_local = p.prepare(&far).map(|l| l.interior).unwrap_or(false);
                if !far_local && buf.iter().all(|h| h.q < 1e3 * scale) {
                    let crossing_count = buf.len() % 2 == 1;
                    assert_eq!(crossing_count, local.interior, "parity mismatch from {eye:?}");
                }
            }
        }
    }
}
