//! Unbounded primitives: half-spaces, coordinate planes and the trivial
//! solids.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Bound, Half, Point3, Tolerance, Vec3};

use super::{Crossings, Local, Primitive, Trace};
use crate::diagnostic::finite;
use crate::{Diagnostics, Ray};

/// Solid half-space `{ p : normal · (p - point) <= 0 }`; `normal` points
/// out of the solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfSpace {
    /// A point on the boundary plane.
    pub point: Point3,
    /// Outward normal (need not be unit length).
    pub normal: Vec3,
}

impl HalfSpace {
    /// Create a half-space.
    pub fn new(point: Point3, normal: Vec3) -> Self {
        Self { point, normal }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HalfSpacePrep {
    normal: Vec3,
    /// `normal · (point - eye)`
    gap: f64,
}

impl Primitive for HalfSpace {
    type Prep = HalfSpacePrep;

    fn aabb(&self) -> Bbox {
        let mut b = Bbox::infinite();
        let n = self.normal;
        let axes = [(&mut b.x, 0usize), (&mut b.y, 1), (&mut b.z, 2)];
        for (interval, i) in axes {
            let others = (0..3).filter(|&j| j != i).all(|j| n[j] == 0.0);
            if others && n[i] > 0.0 {
                interval.max = Bound::tight(self.point[i]);
            } else if others && n[i] < 0.0 {
                interval.min = Bound::tight(self.point[i]);
            }
        }
        b
    }

    fn dry(&self, half: &Half) -> bool {
        // Disjoint only when both regions are bounded by parallel planes
        // facing apart.
        half.aligned_with(&self.normal) && half.eval(&self.point) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if Tolerance::DEFAULT.is_degenerate(self.normal.norm()) {
            diag.error(ctx, "half-space normal is zero");
        }
        for v in self.point.iter() {
            finite(diag, ctx, "half-space point", *v);
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<HalfSpacePrep>> {
        let len = self.normal.norm();
        if Tolerance::DEFAULT.is_degenerate(len) {
            return None;
        }
        let gap = self.normal.dot(&(self.point - eye));
        Some(Local {
            prep: HalfSpacePrep {
                normal: self.normal,
                gap,
            },
            interior: gap > 0.0,
            min: gap.abs() / len,
        })
    }
}

impl Trace for HalfSpacePrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let denom = self.normal.dot(&ray.diff);
        if Tolerance::DEFAULT.is_degenerate(denom) {
            return;
        }
        out.offer(self.gap / denom, || self.normal);
    }
}

/// Zero-thickness plane `coordinate[AXIS] == value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPlane<const AXIS: usize> {
    /// Coordinate of the plane along `AXIS`.
    pub value: f64,
}

/// Plane `x = value`.
pub type XPlane = AxisPlane<0>;
/// Plane `y = value`.
pub type YPlane = AxisPlane<1>;
/// Plane `z = value`.
pub type ZPlane = AxisPlane<2>;

impl<const AXIS: usize> AxisPlane<AXIS> {
    /// Create a coordinate plane.
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlanePrep {
    axis: usize,
    /// `value - eye[axis]`
    gap: f64,
}

impl<const AXIS: usize> Primitive for AxisPlane<AXIS> {
    type Prep = PlanePrep;
    const SOLID: bool = false;

    fn aabb(&self) -> Bbox {
        let mut b = Bbox::infinite();
        let slab = solidray_math::Interval::tight(self.value, self.value);
        match AXIS {
            0 => b.x = slab,
            1 => b.y = slab,
            _ => b.z = slab,
        }
        b
    }

    fn dry(&self, half: &Half) -> bool {
        // Any tilt lets the plane reach into the region.
        let n = &half.normal;
        let tilted = (0..3).any(|j| j != AXIS && n[j] != 0.0);
        !tilted && n[AXIS] * (self.value - half.point[AXIS]) < 0.0
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        finite(diag, ctx, "plane coordinate", self.value);
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<PlanePrep>> {
        if !self.value.is_finite() {
            return None;
        }
        let gap = self.value - eye[AXIS];
        Some(Local {
            prep: PlanePrep { axis: AXIS, gap },
            interior: false,
            min: gap.abs(),
        })
    }
}

impl Trace for PlanePrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        let d = ray.diff[self.axis];
        if Tolerance::DEFAULT.is_degenerate(d) {
            return;
        }
        let axis = self.axis;
        out.offer(self.gap / d, || {
            let mut n = Vec3::zeros();
            n[axis] = 1.0;
            n
        });
    }
}

/// All of space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Everything {}

/// The empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nothing {}

/// State of a primitive without a surface.
#[derive(Debug, Clone)]
pub(crate) struct TrivialPrep;

impl Trace for TrivialPrep {
    fn crossings(&self, _ray: &Ray, _out: &mut Crossings<'_>) {}
}

impl Primitive for Everything {
    type Prep = TrivialPrep;

    fn aabb(&self) -> Bbox {
        Bbox::infinite()
    }

    fn dry(&self, _half: &Half) -> bool {
        false
    }

    fn check(&self, _diag: &mut Diagnostics, _ctx: &str) {}

    fn prepare(&self, _eye: &Point3) -> Option<Local<TrivialPrep>> {
        Some(Local {
            prep: TrivialPrep,
            interior: true,
            min: f64::INFINITY,
        })
    }
}

impl Primitive for Nothing {
    type Prep = TrivialPrep;

    fn aabb(&self) -> Bbox {
        Bbox::empty()
    }

    fn dry(&self, _half: &Half) -> bool {
        true
    }

    fn check(&self, _diag: &mut Diagnostics, _ctx: &str) {}

    fn prepare(&self, _eye: &Point3) -> Option<Local<TrivialPrep>> {
        Some(Local {
            prep: TrivialPrep,
            interior: false,
            min: f64::INFINITY,
        })
    }
}
