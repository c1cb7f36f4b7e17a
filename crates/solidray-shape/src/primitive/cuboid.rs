//! Box given by center, edge lengths and a rotation.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Frame, Half, Point3, Tolerance, Vec3};

use super::{Crossings, Local, Primitive, Trace};
use crate::diagnostic::positive;
use crate::{Diagnostics, Ray};

/// A rotated rectangular box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Center.
    pub center: Point3,
    /// Full edge lengths along the local axes.
    pub size: Vec3,
    /// Rotation in degrees about x, then y, then z.
    #[serde(default = "Vec3::zeros")]
    pub angles: Vec3,
}

impl Cuboid {
    /// Axis-aligned box.
    pub fn new(center: Point3, size: Vec3) -> Self {
        Self {
            center,
            size,
            angles: Vec3::zeros(),
        }
    }

    /// Axis-aligned box between two corners.
    pub fn from_corners(min: Point3, max: Point3) -> Self {
        Self::new(midpoint(&min, &max), (max - min).abs())
    }

    fn frame(&self) -> Frame {
        Frame::from_euler_degrees(self.center, &self.angles)
    }

    fn half_size(&self) -> Vec3 {
        self.size * 0.5
    }
}

fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3::from((a.coords + b.coords) * 0.5)
}

#[derive(Debug, Clone)]
pub(crate) struct CuboidPrep {
    frame: Frame,
    h: Vec3,
    e: Point3,
}

impl Primitive for Cuboid {
    type Prep = CuboidPrep;

    fn aabb(&self) -> Bbox {
        let f = self.frame();
        let h = self.half_size();
        let ext = Vec3::from_fn(|i, _| {
            let mut w = Vec3::zeros();
            w[i] = 1.0;
            f.fore_vec(&w).abs().dot(&h)
        });
        Bbox::tight(&(self.center - ext), &(self.center + ext))
    }

    fn dry(&self, half: &Half) -> bool {
        let n = self.frame().fore_vec(&half.normal);
        half.eval(&self.center) + n.abs().dot(&self.half_size()) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        for s in self.size.iter() {
            positive(diag, ctx, "box edge length", *s);
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<CuboidPrep>> {
        if !self.size.iter().all(|s| s.is_finite() && *s > 0.0) {
            return None;
        }
        let frame = self.frame();
        let h = self.half_size();
        let e = frame.fore(eye);
        let out = (e.coords.abs() - h).map(|v| v.max(0.0));
        let interior = (0..3).all(|i| e[i].abs() < h[i]);
        let min = if interior {
            (h - e.coords.abs()).min()
        } else {
            out.norm()
        };
        Some(Local {
            prep: CuboidPrep { frame, h, e },
            interior,
            min,
        })
    }
}

impl Trace for CuboidPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let d = self.frame.fore_vec(&ray.diff);
        let mut enter = (f64::NEG_INFINITY, 0usize);
        let mut exit = (f64::INFINITY, 0usize);
        for i in 0..3 {
            if Tolerance::DEFAULT.is_degenerate(d[i]) {
                if self.e[i].abs() > self.h[i] {
                    return;
                }
                continue;
            }
            let t1 = (-self.h[i] - self.e[i]) / d[i];
            let t2 = (self.h[i] - self.e[i]) / d[i];
            let (lo, hi) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            if lo > enter.0 {
                enter = (lo, i);
            }
            if hi < exit.0 {
                exit = (hi, i);
            }
        }
        if !(enter.0 <= exit.0) {
            return;
        }
        let face = |axis: usize, sign: f64| {
            let mut n = Vec3::zeros();
            n[axis] = sign;
            self.frame.back_vec(&n)
        };
        // Entering through the face the ray points into; leaving through
        // the opposite one.
        let (qi, ai) = enter;
        out.offer(qi, || face(ai, -d[ai].signum()));
        let (qo, ao) = exit;
        out.offer(qo, || face(ao, d[ao].signum()));
    }

    fn back(&self, local: &Point3) -> Point3 {
        self.frame.back(local)
    }
}
