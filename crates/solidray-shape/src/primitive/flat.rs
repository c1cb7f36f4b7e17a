//! Planar sheets: discs, polygons and triangles.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Frame, Half, Point2, Point3, Tolerance, Vec3};

use super::{offer_cap, polygon_contains, sphere_bound, Crossings, Local, LocalRay, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// Flat disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center.
    pub center: Point3,
    /// Plane normal (need not be unit length).
    pub normal: Vec3,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// Create a disc.
    pub fn new(center: Point3, normal: Vec3, radius: f64) -> Self {
        Self {
            center,
            normal,
            radius,
        }
    }

    fn unit_normal(&self) -> Option<Vec3> {
        self.normal.try_normalize(Tolerance::DEFAULT.degenerate)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CirclePrep {
    frame: Frame,
    e: Point3,
    r: f64,
}

impl Primitive for Circle {
    type Prep = CirclePrep;
    const SOLID: bool = false;

    fn aabb(&self) -> Bbox {
        match self.unit_normal() {
            Some(n) => Bbox::around_disc(&self.center, &n, self.radius),
            None => Bbox::empty(),
        }
    }

    fn dry(&self, half: &Half) -> bool {
        match self.unit_normal() {
            Some(n) => half.reach_disc(&self.center, &n, self.radius) < 0.0,
            None => true,
        }
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        positive(diag, ctx, "circle radius", self.radius);
        if self.unit_normal().is_none() {
            diag.error(ctx, "circle normal is zero");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<CirclePrep>> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return None;
        }
        let n = self.unit_normal()?;
        let (frame, _) = Frame::onto_x(&self.center, &(self.center + n))?;
        let e = frame.fore(eye);
        let rho = (e.y * e.y + e.z * e.z).sqrt();
        let out = (rho - self.radius).max(0.0);
        Some(Local {
            prep: CirclePrep {
                frame,
                e,
                r: self.radius,
            },
            interior: false,
            min: (e.x * e.x + out * out).sqrt(),
        })
    }
}

impl Trace for CirclePrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let local = LocalRay {
            e: self.e,
            d: self.frame.fore_vec(&ray.diff),
        };
        offer_cap(&local, 0.0, 0.0, self.r, 1.0, &self.frame, out);
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}

/// Triangle with vertices `u`, `v`, `w`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// First vertex.
    pub u: Point3,
    /// Second vertex.
    pub v: Point3,
    /// Third vertex.
    pub w: Point3,
}

impl Triangle {
    /// Create a triangle.
    pub fn new(u: Point3, v: Point3, w: Point3) -> Self {
        Self { u, v, w }
    }

    fn vertices(&self) -> [Point3; 3] {
        [self.u, self.v, self.w]
    }
}

/// Möller–Trumbore state with every eye-dependent term precomputed, so a
/// ray costs one cross product and three dot products.
#[derive(Debug, Clone)]
pub(crate) struct TrianglePrep {
    e1: Vec3,
    e2: Vec3,
    /// `(eye - u) × e1`
    qvec: Vec3,
    /// `eye - u`
    tvec: Vec3,
    /// `e2 · qvec`
    num: f64,
    normal: Vec3,
    /// `(|e1| |e2|)²`, the scale for the parallel-ray test.
    scale2: f64,
}

impl TrianglePrep {
    pub(crate) fn new(u: &Point3, v: &Point3, w: &Point3, eye: &Point3) -> Option<Self> {
        let e1 = v - u;
        let e2 = w - u;
        let normal = e1.cross(&e2);
        let scale2 = e1.norm_squared() * e2.norm_squared();
        if !(normal.norm_squared() > 1e-24 * scale2) {
            return None;
        }
        let tvec = eye - u;
        let qvec = tvec.cross(&e1);
        Some(Self {
            e1,
            e2,
            qvec,
            tvec,
            num: e2.dot(&qvec),
            normal,
            scale2,
        })
    }

    /// Distance from the eye to the plane of the triangle.
    pub(crate) fn plane_distance(&self) -> f64 {
        self.normal.dot(&self.tvec).abs() / self.normal.norm()
    }

    #[inline]
    pub(crate) fn offer(&self, d: &Vec3, out: &mut Crossings<'_>) {
        let pvec = d.cross(&self.e2);
        let det = self.e1.dot(&pvec);
        if !(det * det > 1e-24 * d.norm_squared() * self.scale2) {
            return;
        }
        let inv = 1.0 / det;
        let q = self.num * inv;
        if !out.accepts(q) {
            return;
        }
        let bu = self.tvec.dot(&pvec) * inv;
        if !(0.0..=1.0).contains(&bu) {
            return;
        }
        let bv = d.dot(&self.qvec) * inv;
        if bv < 0.0 || bu + bv > 1.0 {
            return;
        }
        out.offer(q, || self.normal);
    }
}

impl Primitive for Triangle {
    type Prep = TrianglePrep;
    const SOLID: bool = false;

    fn aabb(&self) -> Bbox {
        Bbox::around_points(self.vertices().iter()).unwrap_or_else(Bbox::empty)
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_points(self.vertices().iter()) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if TrianglePrep::new(&self.u, &self.v, &self.w, &self.u).is_none() {
            diag.error(ctx, "triangle vertices are collinear");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<TrianglePrep>> {
        let prep = TrianglePrep::new(&self.u, &self.v, &self.w, eye)?;
        let centroid = Point3::from((self.u.coords + self.v.coords + self.w.coords) / 3.0);
        let reach = self
            .vertices()
            .iter()
            .map(|p| (p - centroid).norm())
            .fold(0.0, f64::max);
        let min = prep.plane_distance().max(sphere_bound(eye, &centroid, reach));
        Some(Local {
            prep,
            interior: false,
            min,
        })
    }
}

impl Trace for TrianglePrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        self.offer(&ray.diff, out);
    }
}

/// Planar polygon given by its vertex loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices in order; the loop closes implicitly.
    pub points: Vec<Point3>,
}

impl Polygon {
    /// Create a polygon.
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Plane normal by Newell's method; `None` for fewer than three points
    /// or zero area.
    fn newell(&self) -> Option<Vec3> {
        if self.points.len() < 3 {
            return None;
        }
        let n = self.points.len();
        let mut sum = Vec3::zeros();
        for i in 0..n {
            let (a, b) = (self.points[i], self.points[(i + 1) % n]);
            sum += Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        sum.try_normalize(Tolerance::DEFAULT.degenerate)
    }

    fn frame(&self) -> Option<Frame> {
        let n = self.newell()?;
        let o = self.points[0];
        Frame::onto_x(&o, &(o + n)).map(|(f, _)| f)
    }

    fn bounding_sphere(&self) -> (Point3, f64) {
        let sum = self.points.iter().fold(Vec3::zeros(), |s, p| s + p.coords);
        let c = Point3::from(sum / self.points.len().max(1) as f64);
        let r = self.points.iter().map(|p| (p - c).norm()).fold(0.0, f64::max);
        (c, r)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PolygonPrep {
    frame: Frame,
    e: Point3,
    /// Vertices in the local `(y, z)` plane.
    verts: Vec<Point2>,
}

impl Primitive for Polygon {
    type Prep = PolygonPrep;
    const SOLID: bool = false;

    fn aabb(&self) -> Bbox {
        Bbox::around_points(self.points.iter()).unwrap_or_else(Bbox::empty)
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_points(self.points.iter()) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if self.points.len() < 3 {
            diag.error(ctx, format!("polygon needs at least 3 points, got {}", self.points.len()));
            return;
        }
        let Some(frame) = self.frame() else {
            diag.error(ctx, "polygon has zero area");
            return;
        };
        let (_, size) = self.bounding_sphere();
        let off = self
            .points
            .iter()
            .map(|p| frame.fore(p).x.abs())
            .fold(0.0, f64::max);
        if off > 1e-6 * size.max(1.0) {
            diag.warning(ctx, format!("polygon is not planar (deviation {off:.3e})"));
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<PolygonPrep>> {
        let frame = self.frame()?;
        let verts = self
            .points
            .iter()
            .map(|p| {
                let l = frame.fore(p);
                Point2::new(l.y, l.z)
            })
            .collect();
        let e = frame.fore(eye);
        let (c, r) = self.bounding_sphere();
        Some(Local {
            prep: PolygonPrep { frame, e, verts },
            interior: false,
            min: e.x.abs().max(sphere_bound(eye, &c, r)),
        })
    }
}

impl Trace for PolygonPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let d = self.frame.fore_vec(&ray.diff);
        if Tolerance::DEFAULT.is_degenerate(d.x) {
            return;
        }
        let q = -self.e.x / d.x;
        if !out.accepts(q) {
            return;
        }
        let p = self.e + d * q;
        if polygon_contains(&Point2::new(p.y, p.z), &self.verts) {
            out.offer(q, || self.frame.axis());
        }
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
