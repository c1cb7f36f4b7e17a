//! Triangle mesh sheet.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Half, Point3, Vec3};

use super::{sphere_bound, Crossings, Local, Primitive, Trace, TrianglePrep};
use crate::{Diagnostics, Ray};

/// Shared-vertex triangle mesh, rendered as a zero-thickness sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surf {
    /// Vertex positions.
    pub nodes: Vec<Point3>,
    /// Vertex indices of each triangle.
    pub faces: Vec<[usize; 3]>,
}

impl Surf {
    /// Create a mesh.
    pub fn new(nodes: Vec<Point3>, faces: Vec<[usize; 3]>) -> Self {
        Self { nodes, faces }
    }

    fn indices_valid(&self) -> bool {
        let n = self.nodes.len();
        self.faces.iter().all(|f| f.iter().all(|&i| i < n))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SurfPrep {
    faces: Vec<TrianglePrep>,
}

impl Primitive for Surf {
    type Prep = SurfPrep;
    const SOLID: bool = false;

    fn aabb(&self) -> Bbox {
        Bbox::around_points(self.nodes.iter()).unwrap_or_else(Bbox::empty)
    }

    fn dry(&self, half: &Half) -> bool {
        half.reach_points(self.nodes.iter()) < 0.0
    }

    fn degenerate(&self) -> bool {
        !self.indices_valid() || self.nodes.is_empty()
    }

    fn check(&self, diag: &mut Diagnostics, ctx: &str) {
        if self.faces.is_empty() {
            diag.warning(ctx, "surf has no faces");
        }
        let n = self.nodes.len();
        let mut degenerate = 0usize;
        for (k, f) in self.faces.iter().enumerate() {
            if let Some(&bad) = f.iter().find(|&&i| i >= n) {
                diag.error(ctx, format!("surf face {k} references node {bad} of {n}"));
                continue;
            }
            let [a, b, c] = f.map(|i| self.nodes[i]);
            if TrianglePrep::new(&a, &b, &c, &a).is_none() {
                degenerate += 1;
            }
        }
        if degenerate > 0 {
            diag.warning(ctx, format!("surf has {degenerate} degenerate faces"));
        }
    }

    fn prepare(&self, eye: &Point3) -> Option<Local<SurfPrep>> {
        if self.degenerate() {
            return None;
        }
        let faces: Vec<TrianglePrep> = self
            .faces
            .iter()
            .filter_map(|f| {
                let [a, b, c] = f.map(|i| self.nodes[i]);
                TrianglePrep::new(&a, &b, &c, eye)
            })
            .collect();
        let sum = self.nodes.iter().fold(Vec3::zeros(), |s, p| s + p.coords);
        let center = Point3::from(sum / self.nodes.len() as f64);
        let radius = self.nodes.iter().map(|p| (p - center).norm()).fold(0.0, f64::max);
        Some(Local {
            prep: SurfPrep { faces },
            interior: false,
            min: sphere_bound(eye, &center, radius),
        })
    }
}

impl Trace for SurfPrep {
    fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
        for face in &self.faces {
            face.offer(&ray.diff, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use approx::assert_relative_eq;

    /// Unit square in z = 0 split into two triangles.
    fn square() -> Surf {
        Surf::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_square() {
        let s = square();
        for (x, y) in [(0.8, 0.2), (0.2, 0.8)] {
            let hits = testing::all(&s, Point3::new(x, y, 2.0), Point3::new(x, y, 0.0));
            assert_eq!(hits.len(), 1);
            assert_relative_eq!(hits[0].q, 1.0, epsilon = 1e-12);
        }
        testing::check_bounds(&s, 3.0);
    }

    #[test]
    fn test_bad_index() {
        let s = Surf::new(vec![Point3::origin()], vec![[0, 1, 2]]);
        assert!(s.prepare(&Point3::new(0.0, 0.0, 1.0)).is_none());
        let mut d = Diagnostics::default();
        s.check(&mut d, "surf");
        assert_eq!(d.error_count(), 1);
    }
}
