//! Per-frame shape state.
//!
//! [`Shape::process`](crate::Shape::process) walks the tree once per frame
//! and builds a parallel [`Prepared`] tree: each node records whether the
//! eye is inside it, a lower bound on the eye-to-surface distance, and for
//! primitives the canonicalized local state used by ray queries. The scene
//! description itself is never mutated, so one scene can be rendered from
//! several eyes at once.

use solidray_math::Point3;

use crate::operator::{walk, Logic};
use crate::primitive::*;
use crate::shape::for_each_primitive;
use crate::{Inq, Ray, Shape, ShapeKind};

macro_rules! leaves {
    ($($v:ident : $t:ty),* $(,)?) => {
        /// Prepared state of one primitive.
        pub(crate) enum Leaf {
            $($v(<$t as Primitive>::Prep),)*
        }

        impl Leaf {
            fn crossings(&self, ray: &Ray, out: &mut Crossings<'_>) {
                match self {
                    $(Leaf::$v(p) => p.crossings(ray, out),)*
                }
            }

            fn back(&self, local: &Point3) -> Point3 {
                match self {
                    $(Leaf::$v(p) => p.back(local),)*
                }
            }
        }

        /// Prepare a primitive kind; `None` for operators.
        fn prepare_leaf<C>(kind: &ShapeKind<C>, eye: &Point3) -> Option<Option<Local<Leaf>>> {
            match kind {
                $(ShapeKind::$v(p) => Some(p.prepare(eye).map(|l| Local {
                    prep: Leaf::$v(l.prep),
                    interior: l.interior,
                    min: l.min,
                })),)*
                _ => None,
            }
        }
    };
}

for_each_primitive!(leaves);

enum Node<'a, C> {
    /// Disabled or degenerate: no surface at all.
    Empty,
    Leaf(Leaf),
    Operator {
        logic: Logic,
        operands: Vec<Prepared<'a, C>>,
    },
}

/// A shape prepared for one eye point.
pub struct Prepared<'a, C> {
    shape: &'a Shape<C>,
    interior: bool,
    solid: bool,
    min: f64,
    node: Node<'a, C>,
}

impl<'a, C> Prepared<'a, C> {
    pub(crate) fn new(shape: &'a Shape<C>, eye: &Point3) -> Self {
        let solid = shape.is_solid();
        let empty = Self {
            shape,
            interior: false,
            solid,
            min: f64::INFINITY,
            node: Node::Empty,
        };
        if !shape.on {
            return empty;
        }
        if let Some((logic, children)) = shape.kind.operands() {
            let operands: Vec<_> = children.iter().map(|c| Prepared::new(c, eye)).collect();
            let inside: Vec<bool> = operands.iter().map(|p| p.interior).collect();
            return Self {
                shape,
                interior: logic.eval(&inside),
                solid,
                min: logic.lower_bound(&operands),
                node: Node::Operator { logic, operands },
            };
        }
        match prepare_leaf(&shape.kind, eye).flatten() {
            Some(local) => Self {
                shape,
                interior: local.interior,
                solid,
                min: local.min,
                node: Node::Leaf(local.prep),
            },
            None => empty,
        }
    }

    /// The shape this state was prepared from.
    pub fn shape(&self) -> &'a Shape<C> {
        self.shape
    }

    /// Whether the eye is strictly inside the shape.
    pub fn interior(&self) -> bool {
        self.interior
    }

    /// Whether the shape bounds a volume.
    pub fn solid(&self) -> bool {
        self.solid
    }

    /// Lower bound on the distance from the eye to any visible surface
    /// point; infinite when there is no surface.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Whether the node has no surface (disabled, degenerate or empty
    /// primitive).
    pub fn is_empty(&self) -> bool {
        matches!(self.node, Node::Empty)
    }

    /// Nearest visible crossing with `q` in `(0, qmin)`.
    pub fn infirst(&self, ray: &Ray, qmin: f64) -> Option<Inq<'a, C>> {
        match &self.node {
            Node::Empty => None,
            Node::Leaf(leaf) => {
                let mut cr = Crossings::first(qmin);
                leaf.crossings(ray, &mut cr);
                cr.into_first()
                    .map(|h| Inq::new(ray, h.q, h.normal, self.shape, !self.solid))
            }
            Node::Operator {
                logic: Logic::Not,
                operands,
            } if matches!(operands.as_slice(), [p] if p.solid && matches!(p.node, Node::Leaf(_))) => {
                // Every crossing of a solid primitive flips its complement.
                let mut hit = operands[0].infirst(ray, qmin)?;
                hit.normal = -hit.normal;
                Some(hit)
            }
            Node::Operator { logic, operands } => {
                let mut out = Vec::with_capacity(1);
                walk(*logic, operands, ray, qmin, true, &mut out);
                out.pop()
            }
        }
    }

    /// All visible crossings with `q` in `(0, qmin)`, appended to `out` in
    /// increasing `q`.
    pub fn inall(&self, ray: &Ray, qmin: f64, out: &mut Vec<Inq<'a, C>>) {
        match &self.node {
            Node::Empty => {}
            Node::Leaf(leaf) => {
                let mut buf = Vec::new();
                leaf.crossings(ray, &mut Crossings::all(qmin, &mut buf));
                buf.sort_by(|a, b| a.q.total_cmp(&b.q));
                let sheet = !self.solid;
                out.extend(
                    buf.into_iter()
                        .map(|h| Inq::new(ray, h.q, h.normal, self.shape, sheet)),
                );
            }
            Node::Operator { logic, operands } => walk(*logic, operands, ray, qmin, false, out),
        }
    }

    /// Map a point in this primitive's local frame back to world space;
    /// the identity for operators.
    pub fn back(&self, local: &Point3) -> Point3 {
        match &self.node {
            Node::Leaf(leaf) => leaf.back(local),
            _ => *local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;
    use approx::assert_relative_eq;
    use solidray_math::Vec3;

    type S = Shape<Rgb>;

    fn ball(x: f64, r: f64) -> S {
        Shape::sphere(Point3::new(x, 0.0, 0.0), r)
    }

    fn ray_x(from: f64) -> Ray {
        Ray::new(Point3::new(from, 0.0, 0.0), Point3::new(from + 1.0, 0.0, 0.0))
    }

    fn qs(shape: &S, ray: &Ray) -> Vec<f64> {
        let p = shape.process(&ray.eye);
        let mut out = Vec::new();
        p.inall(ray, f64::INFINITY, &mut out);
        out.iter().map(|h| h.q).collect()
    }

    #[test]
    fn test_union_merges_overlap() {
        let s = Shape::or(ball(0.0, 1.0), ball(1.0, 1.0));
        let got = qs(&s, &ray_x(-5.0));
        assert_eq!(got.len(), 2);
        assert_relative_eq!(got[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(got[1], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intersection_lens() {
        let s = Shape::and(ball(0.0, 1.0), ball(1.0, 1.0));
        let got = qs(&s, &ray_x(-5.0));
        assert_eq!(got.len(), 2);
        assert_relative_eq!(got[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(got[1], 6.0, epsilon = 1e-12);
        let p = s.process(&Point3::new(-5.0, 0.0, 0.0));
        assert_relative_eq!(p.min(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cut_normals_point_out() {
        // Bite out of the left side: entering through the bite's wall the
        // normal faces the eye.
        let s = Shape::cut(ball(0.0, 1.0), ball(-1.0, 1.0));
        let ray = ray_x(-5.0);
        let p = s.process(&ray.eye);
        let hit = p.infirst(&ray, f64::INFINITY).unwrap();
        assert_relative_eq!(hit.q, 5.0, epsilon = 1e-12);
        assert!(hit.normal.x < 0.0);
        assert_relative_eq!(hit.normal.norm(), 1.0, epsilon = 1e-12);
        assert!(!hit.sheet);
    }

    #[test]
    fn test_xor_and_counting_rules() {
        let (a, b) = (ball(0.0, 1.0), ball(1.0, 1.0));
        let ray = ray_x(-5.0);
        assert_eq!(qs(&Shape::xor(a.clone(), b.clone()), &ray).len(), 4);
        assert_eq!(qs(&Shape::one(vec![a.clone(), b.clone()]), &ray).len(), 4);
        assert_eq!(qs(&Shape::some(2, vec![a.clone(), b.clone()]), &ray).len(), 2);
        assert_eq!(qs(&Shape::odd(vec![a.clone(), b.clone(), ball(0.5, 0.25)]), &ray).len(), 6);
        assert!(qs(&Shape::some(3, vec![a, b]), &ray).is_empty());
    }

    #[test]
    fn test_not_sphere_from_outside() {
        let s = Shape::not(ball(0.0, 1.0));
        let eye = Point3::new(-5.0, 0.0, 0.0);
        let p = s.process(&eye);
        assert!(p.interior());
        let hit = p.infirst(&ray_x(-5.0), f64::INFINITY).unwrap();
        assert_relative_eq!(hit.q, 4.0, epsilon = 1e-12);
        // Outward from the complement is toward the center of the ball.
        assert!(hit.normal.x > 0.0);
    }

    #[test]
    fn test_sheet_under_cut() {
        // A floor plane with a hole punched by a cylinder.
        let floor: S = Shape::zplane(0.0);
        let hole = Shape::cylinder(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0), 1.0);
        let s = Shape::cut(floor, hole);
        let down = |x: f64| Ray::new(Point3::new(x, 0.0, 5.0), Point3::new(x, 0.0, 4.0));
        let eye = Point3::new(0.0, 0.0, 5.0);
        let p = s.process(&eye);
        assert!(p.infirst(&down(0.0), f64::INFINITY).is_none());
        let p = s.process(&Point3::new(3.0, 0.0, 5.0));
        let hit = p.infirst(&down(3.0), f64::INFINITY).unwrap();
        assert!(hit.sheet);
        assert_relative_eq!(hit.q, 5.0, epsilon = 1e-12);
        assert!(hit.normal.z > 0.0);
    }

    #[test]
    fn test_tangent_pair_survives_union() {
        // y = 1 grazes the unit ball at x = 0 and cuts the wider one.
        let s = Shape::or(ball(0.0, 1.0), ball(3.0, 2.0));
        let ray = Ray::new(Point3::new(-5.0, 1.0, 0.0), Point3::new(-4.0, 1.0, 0.0));
        let p = s.process(&ray.eye);
        let mut all = Vec::new();
        p.inall(&ray, f64::INFINITY, &mut all);
        let want = [5.0, 5.0, 8.0 - 3f64.sqrt(), 8.0 + 3f64.sqrt()];
        assert_eq!(all.len(), want.len());
        for (h, w) in all.iter().zip(want) {
            assert_relative_eq!(h.q, w, epsilon = 1e-9);
            assert!(h.normal.iter().all(|c| c.is_finite()));
        }
        assert_relative_eq!(all[0].normal.y.abs(), 1.0, epsilon = 1e-9);

        let first = p.infirst(&ray, f64::INFINITY).unwrap();
        assert_relative_eq!(first.q, 5.0, epsilon = 1e-9);
        assert_relative_eq!(first.point, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_infirst_matches_first_of_inall() {
        let s = Shape::ors(vec![
            Shape::cut(ball(0.0, 1.5), Shape::cuboid(Point3::origin(), Vec3::new(1.0, 1.0, 4.0))),
            Shape::and(ball(3.0, 1.0), Shape::half(Point3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 0.2, 0.0))),
            Shape::torus(Point3::new(-3.0, 0.0, 0.0), Point3::new(-3.0, 1.0, 0.0), 1.0, 0.3),
        ]);
        let eye = Point3::new(-6.0, 0.4, 0.3);
        let p = s.process(&eye);
        for k in 0..40 {
            let t = Point3::new(0.0, (k as f64 - 20.0) * 0.1, 0.05 * k as f64 - 1.0);
            let ray = Ray::new(eye, t);
            let mut all = Vec::new();
            p.inall(&ray, f64::INFINITY, &mut all);
            let first = p.infirst(&ray, f64::INFINITY);
            assert_eq!(first.map(|h| h.q), all.first().map(|h| h.q));
            for w in all.windows(2) {
                assert!(w[0].q <= w[1].q);
            }
            // A window ending before the first crossing hides it.
            if let Some(h) = first {
                assert!(p.infirst(&ray, h.q).is_none());
            }
        }
    }

    #[test]
    fn test_degenerate_and_disabled() {
        let bad: S = Shape::sphere(Point3::origin(), -1.0);
        let p = bad.process(&Point3::new(5.0, 0.0, 0.0));
        assert!(p.is_empty());
        assert!(p.min().is_infinite());
        assert!(p.infirst(&ray_x(5.0), f64::INFINITY).is_none());

        let off = ball(0.0, 1.0).with_on(false);
        let not_off = Shape::not(off);
        let p = not_off.process(&Point3::origin());
        assert!(p.interior());
    }

    #[test]
    fn test_hit_keeps_primitive_tag() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let s = Shape::or(ball(0.0, 1.0).with_base(red), ball(5.0, 1.0));
        let ray = ray_x(-5.0);
        let p = s.process(&ray.eye);
        let hit = p.infirst(&ray, f64::INFINITY).unwrap();
        assert_eq!(hit.base(), Some(&red));
    }

    #[test]
    fn test_operator_bounds_sound() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use solidray_math::Half;

        let shapes = vec![
            Shape::and(ball(0.0, 1.0), ball(1.2, 1.0)),
            Shape::cut(ball(0.0, 1.5), Shape::pill(Point3::new(0.0, -2.0, 0.0), Point3::new(0.0, 2.0, 0.0), 0.5)),
            Shape::ands(vec![
                Shape::cuboid(Point3::origin(), Vec3::new(2.0, 2.0, 2.0)),
                Shape::half(Point3::origin(), Vec3::new(1.0, 1.0, 0.0)),
                Shape::not(ball(1.0, 0.5)),
            ]),
            Shape::ors(vec![ball(-1.0, 0.5), Shape::triangle(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0))]),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let mut r = move || rng.random::<f64>() * 2.0 - 1.0;
        for s in &shapes {
            for _ in 0..200 {
                let eye = Point3::new(3.0 * r(), 3.0 * r(), 3.0 * r());
                let p = s.process(&eye);
                let ray = Ray::new(eye, eye + Vec3::new(r(), r(), r()));
                let mut all = Vec::new();
                p.inall(&ray, f64::INFINITY, &mut all);
                for h in &all {
                    assert!((h.point - eye).norm() >= p.min() - 1e-9, "{}", s.name());
                    let n = Vec3::new(r(), r(), r());
                    assert!(!s.dry(&Half::new(h.point - n * 1e-9, n)), "{}", s.name());
                }
            }
        }
    }

    #[test]
    fn test_interior_consistency_by_sampling() {
        // The parity of crossings from a point out to far away must match the
        // point's interior flag, for assorted operators.
        let shapes = vec![
            Shape::xor(ball(0.0, 1.0), ball(0.7, 0.8)),
            Shape::cut(Shape::cuboid(Point3::origin(), Vec3::new(2.0, 2.0, 2.0)), ball(1.0, 0.8)),
            Shape::even(vec![ball(0.0, 1.0), ball(0.5, 1.0), ball(-0.5, 0.6)]),
            Shape::not(Shape::and(ball(0.0, 1.2), Shape::cylinder(Point3::new(-2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0), 0.6))),
        ];
        for s in &shapes {
            for k in 0..50 {
                let eye = Point3::new((k as f64 * 0.37) % 3.0 - 1.5, (k as f64 * 0.53) % 2.0 - 1.0, 0.11);
                let far = Point3::new(40.0, 3.0, 1.0);
                let p = s.process(&eye);
                let far_inside = s.process(&far).interior();
                let mut all = Vec::new();
                p.inall(&Ray::new(eye, far), 1.0, &mut all);
                assert_eq!(all.len() % 2 == 1, p.interior() != far_inside, "{} from {eye:?}", s.name());
            }
        }
    }
}
