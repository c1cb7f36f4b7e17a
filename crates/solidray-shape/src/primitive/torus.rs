//! Torus: ray intersection via the quartic solver.

use serde::{Deserialize, Serialize};
use solidray_math::{solve_quartic, Bbox, Frame, Half, Point3, Vec3};

use super::{Crossings, Local, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// Ring of radius `major` about the axis through `center` toward `axis`,
/// thickened by `minor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    /// Center of the ring.
    pub center: Point3,
    /// Any other point on the symmetry axis.
    pub axis: Point3,
    /// Distance from the center to the tube center.
    pub major: f64,
    /// Tube radius.
    pub minor: f64,
}

impl Torus {
    /// Create a torus.
    pub fn new(center: Point3, axis: Point3, major: f64, minor: f64) -> Self {
        Self {
            center,
            axis,
            major,
            minor,
        }
    }

    fn unit_axis(&self) -> Vec3 {
        (self.axis - self.center).try_normalize(0.0).unwrap_or_else(Vec3::z)
    }

    fn valid(&self) -> bool {
        self.major > 0.0 && self.minor > 0.0 && self.major.is_finite() && self.minor.is_finite()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TorusPrep {
    frame: Frame,
    e: Vec3,
    major: f64,
    minor: f64,
}

impl Primitive for Torus {
    type Prep = TorusPrep;

    fn aabb(&self) -> Bbox {
        let a = self.unit_axis();
        let ext = a.map(|ai| self.major * (1.0 - ai * ai).max(0.0).sqrt() + self.minor);
        Bbox::tight(&(self.center - ext), &(self.center + ext))
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_disc(&self.center, &self.unit_axis(), self.major) + self.minor * half.normal.norm() < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        positive(diag, ctx, "torus major radius", self.major);
        positive(diag, ctx, "torus minor radius", self.minor);
        if Frame::onto_x(&self.center, &self.axis).is_none() {
            diag.error(ctx, "torus axis point coincides with the center");
        }
        if self.minor >= self.major {
            diag.warning(ctx, "torus minor radius reaches the axis (spindle torus)");
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<TorusPrep>> {
        if !self.valid() {
            return None;
        }
        let (frame, _) = Frame::onto_x(&self.center, &self.axis)?;
        let e = frame.fore(eye).coords;
        let rho = (e.y * e.y + e.z * e.z).sqrt();
        let tube = ((rho - self.major).powi(2) + e.x * e.x).sqrt();
        Some(Local {
            prep: TorusPrep {
                frame,
                e,
                major: self.major,
                minor: self.minor,
            },
            interior: tube < self.minor,
            min: (tube - self.minor).abs(),
        })
    }
}

impl Trace for TorusPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let len = ray.length();
        if !(len > 0.0) {
            return;
        }
        // Solve in arc length for a well-scaled quartic, then rescale to q.
        let d = self.frame.fore_vec(&ray.diff) / len;
        let e = &self.e;
        let (big, small) = (self.major * self.major, self.minor * self.minor);
        let ed = e.dot(&d);
        let k = e.norm_squared() + big - small;
        let dperp = d.y * d.y + d.z * d.z;
        let eperp = e.y * d.y + e.z * d.z;
        let roots = solve_quartic(
            1.0,
            4.0 * ed,
            4.0 * ed * ed + 2.0 * k - 4.0 * big * dperp,
            4.0 * ed * k - 8.0 * big * eperp,
            k * k - 4.0 * big * (e.y * e.y + e.z * e.z),
        );
        for &t in roots.as_slice() {
            let q = t / len;
            out.offer(q, || {
                let p = e + d * t;
                let g = p.norm_squared() + big - small;
                let n = p * g - Vec3::new(0.0, p.y, p.z) * (2.0 * big);
                self.frame.back_vec(&n)
            });
        }
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
