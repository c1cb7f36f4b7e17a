//! Boolean operators.
//!
//! Every operator is a [`Logic`] rule over its operands' inside/outside
//! states. Bounds, dry tests and lower bounds follow from the rule alone;
//! ray crossings come from the shared combinator in `combine`.

mod combine;

pub(crate) use combine::walk;

use solidray_math::{Bbox, Half};

use crate::{Prepared, Shape};

/// Boolean rule of an operator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// Complement of the single operand.
    Not,
    /// Both operands.
    And,
    /// Either operand.
    Or,
    /// Exactly one of two operands.
    Xor,
    /// First operand but not the second.
    Cut,
    /// All operands.
    Ands,
    /// Any operand.
    Ors,
    /// Exactly one operand.
    One,
    /// At least `k` operands.
    Some(usize),
    /// An odd number of operands.
    Odd,
    /// An even number of operands, zero included.
    Even,
}

impl Logic {
    /// Whether a point is inside the combined solid, given whether it is
    /// inside each operand.
    pub fn eval(&self, inside: &[bool]) -> bool {
        let count = || inside.iter().filter(|&&b| b).count();
        match self {
            Logic::Not => !inside.first().copied().unwrap_or(false),
            Logic::And | Logic::Ands => inside.iter().all(|&b| b),
            Logic::Or | Logic::Ors => inside.iter().any(|&b| b),
            Logic::Xor | Logic::Odd => count() % 2 == 1,
            Logic::Cut => {
                inside.first().copied().unwrap_or(false) && !inside.get(1).copied().unwrap_or(false)
            }
            Logic::One => count() == 1,
            Logic::Some(k) => count() >= *k,
            Logic::Even => count() % 2 == 0,
        }
    }

    /// Whether operand `i` being outside everywhere forces the result
    /// outside everywhere.
    pub(crate) fn requires(&self, i: usize) -> bool {
        match self {
            Logic::And | Logic::Ands => true,
            Logic::Cut => i == 0,
            _ => false,
        }
    }

    /// Whether the result contains no points when every operand is empty.
    fn empty_from_empty(&self) -> bool {
        !matches!(self, Logic::Not | Logic::Even | Logic::Some(0))
    }

    pub(crate) fn dry<C>(&self, operands: &[Shape<C>], half: &Half) -> bool {
        match self {
            Logic::And | Logic::Ands => operands.iter().any(|s| s.dry(half)),
            Logic::Cut => operands.first().map(|s| s.dry(half)).unwrap_or(true),
            Logic::Some(k) if *k > operands.len() => true,
            l if l.empty_from_empty() => operands.iter().all(|s| s.dry(half)),
            _ => false,
        }
    }

    pub(crate) fn aabb<C>(&self, operands: &[Shape<C>]) -> Bbox {
        match self {
            Logic::And | Logic::Ands => operands
                .iter()
                .map(Shape::aabb)
                .reduce(|a, b| a.intersect(&b))
                .unwrap_or_else(Bbox::infinite),
            Logic::Cut => operands
                .first()
                .map(|s| s.aabb().loosen())
                .unwrap_or_else(Bbox::empty),
            Logic::Some(k) if *k > operands.len() => Bbox::empty(),
            l if l.empty_from_empty() => operands
                .iter()
                .fold(Bbox::empty(), |acc, s| acc.union(&s.aabb())),
            _ => Bbox::infinite(),
        }
    }

    /// Lower bound on the eye-to-surface distance of the combined shape.
    pub(crate) fn lower_bound<C>(&self, operands: &[Prepared<'_, C>]) -> f64 {
        let nearest = operands.iter().map(Prepared::min).fold(f64::INFINITY, f64::min);
        match self {
            // Every surface point lies in each operand the eye is outside of.
            Logic::And | Logic::Ands => operands
                .iter()
                .filter(|p| !p.interior())
                .map(Prepared::min)
                .fold(nearest, f64::max),
            Logic::Cut => {
                let mut lb = nearest;
                if let Some(a) = operands.first().filter(|a| !a.interior()) {
                    lb = lb.max(a.min());
                }
                if let Some(b) = operands.get(1).filter(|b| b.interior() && b.solid()) {
                    lb = lb.max(b.min());
                }
                lb
            }
            _ => nearest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;
    use solidray_math::{Point3, Vec3};

    #[test]
    fn test_eval_table() {
        let cases = [[false, false], [false, true], [true, false], [true, true]];
        let want = |l: Logic| cases.map(|c| l.eval(&c));
        assert_eq!(want(Logic::And), [false, false, false, true]);
        assert_eq!(want(Logic::Or), [false, true, true, true]);
        assert_eq!(want(Logic::Xor), [false, true, true, false]);
        assert_eq!(want(Logic::Cut), [false, false, true, false]);
        assert_eq!(want(Logic::One), [false, true, true, false]);
        assert_eq!(want(Logic::Some(2)), [false, false, false, true]);
        assert_eq!(want(Logic::Even), [true, false, false, true]);
        assert!(Logic::Not.eval(&[false]));
        assert!(!Logic::Not.eval(&[true]));
        assert!(Logic::Some(0).eval(&[]));
        assert!(Logic::Ands.eval(&[]));
    }

    fn ball(x: f64) -> Shape<Rgb> {
        Shape::sphere(Point3::new(x, 0.0, 0.0), 1.0)
    }

    #[test]
    fn test_dry_rules() {
        // Region x >= 2.5 holds part of the ball at 2 but none of the ball at -2.
        let half = Half::new(Point3::new(2.5, 0.0, 0.0), Vec3::x());
        let (l, r) = (ball(-2.0), ball(2.0));
        assert!(Logic::And.dry(&[l.clone(), r.clone()], &half));
        assert!(!Logic::Or.dry(&[l.clone(), r.clone()], &half));
        assert!(Logic::Cut.dry(&[l.clone(), r.clone()], &half));
        assert!(!Logic::Cut.dry(&[r.clone(), l.clone()], &half));
        assert!(!Logic::Not.dry(&[l.clone()], &half));
        assert!(!Logic::Even.dry(&[l.clone(), r.clone()], &half));
        assert!(Logic::Some(3).dry(&[l.clone(), r.clone()], &half));
        assert!(Logic::Odd.dry(&[l], &half));
    }

    #[test]
    fn test_aabb_rules() {
        let (l, r) = (ball(-0.5), ball(0.5));
        let both = Logic::And.aabb(&[l.clone(), r.clone()]);
        assert_eq!(both.x.min.value, -0.5);
        assert_eq!(both.x.max.value, 0.5);
        let either = Logic::Ors.aabb(&[l.clone(), r.clone()]);
        assert_eq!(either.x.min.value, -1.5);
        assert!(!Logic::Not.aabb(&[l.clone()]).is_finite());
        assert_eq!(Logic::Cut.aabb(&[l, r]).x.max.value, 0.5);
    }
}
