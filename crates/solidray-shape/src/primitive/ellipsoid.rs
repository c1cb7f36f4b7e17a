//! Ellipsoid with per-axis radii and an optional rotation.

use serde::{Deserialize, Serialize};
use solidray_math::{solve_quadratic, Bbox, Frame, Half, Point3, Vec3};

use super::{Crossings, Local, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// `Σ (xᵢ / rᵢ)² <= 1` in the frame rotated by `angles` about `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Center.
    pub center: Point3,
    /// Semi-axis lengths along the local x, y and z axes.
    pub radii: Vec3,
    /// Rotation in degrees about x, then y, then z.
    #[serde(default = "Vec3::zeros")]
    pub angles: Vec3,
}

impl Ellipsoid {
    /// Axis-aligned ellipsoid.
    pub fn new(center: Point3, radii: Vec3) -> Self {
        Self {
            center,
            radii,
            angles: Vec3::zeros(),
        }
    }

    fn frame(&self) -> Frame {
        Frame::from_euler_degrees(self.center, &self.angles)
    }

    fn valid(&self) -> bool {
        self.radii.iter().all(|r| r.is_finite() && *r > 0.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EllipsoidPrep {
    frame: Frame,
    /// `1 / radii`
    inv: Vec3,
    /// Eye in the unit-sphere frame.
    e: Vec3,
    c: f64,
}

impl Primitive for Ellipsoid {
    type Prep = EllipsoidPrep;

    fn aabb(&self) -> Bbox {
        // Half-extent along world axis i is |row i of (local→world) ⊙ radii|.
        let f = self.frame();
        let ext = Vec3::from_fn(|i, _| {
            let mut w = Vec3::zeros();
            w[i] = 1.0;
            f.fore_vec(&w).component_mul(&self.radii).norm()
        });
        Bbox::tight(&(self.center - ext), &(self.center + ext))
    }

    fn dry(&self, half: &Half) -> bool {
        let n = self.frame().fore_vec(&half.normal);
        half.eval(&self.center) + n.component_mul(&self.radii).norm() < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        for r in self.radii.iter() {
            positive(diag, ctx, "ellipsoid radius", *r);
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<EllipsoidPrep>> {
        if !self.valid() {
            return None;
        }
        let frame = self.frame();
        let inv = self.radii.map(|r| 1.0 / r);
        let e = frame.fore(eye).coords.component_mul(&inv);
        let c = e.norm_squared() - 1.0;
        let dist = (eye - self.center).norm();
        let (rmin, rmax) = (self.radii.min(), self.radii.max());
        let min = if c < 0.0 {
            (rmin - dist).max(0.0)
        } else {
            (dist - rmax).max(0.0)
        };
        Some(Local {
            prep: EllipsoidPrep { frame, inv, e, c },
            interior: c < 0.0,
            min,
        })
    }
}

impl Trace for EllipsoidPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let d = self.frame.fore_vec(&ray.diff).component_mul(&self.inv);
        let a = d.norm_squared();
        let b = 2.0 * self.e.dot(&d);
        for &q in solve_quadratic(a, b, self.c).as_slice() {
            out.offer(q, || {
                // Gradient of Σ(x/r)² is u ⊙ inv with u on the unit sphere.
                let u = self.e + d * q;
                self.frame.back_vec(&u.component_mul(&self.inv))
            });
        }
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
