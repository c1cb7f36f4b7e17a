//! Axis-aligned bounding intervals with per-bound exactness tags.
//!
//! Each bound is `Tight` (attained by the shape), `Loose` (a conservative
//! outward over-estimate) or `Infinite`. A bound may only ever be wrong in
//! the outward direction.

use serde::{Deserialize, Serialize};

use crate::{Point3, Vec3};

/// Exactness of a single bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// The shape touches this bound.
    Tight,
    /// Conservative: the shape lies inside but may not touch it.
    Loose,
    /// Unbounded in this direction.
    Infinite,
}

/// One side of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Coordinate value (±∞ when `tag` is `Infinite`).
    pub value: f64,
    /// Exactness of `value`.
    pub tag: Tag,
}

impl Bound {
    /// A tight bound.
    pub fn tight(value: f64) -> Self {
        Self { value, tag: Tag::Tight }
    }

    /// A loose bound.
    pub fn loose(value: f64) -> Self {
        Self { value, tag: Tag::Loose }
    }

    /// An infinite bound; `sign` selects −∞ or +∞.
    pub fn infinite(sign: f64) -> Self {
        Self {
            value: if sign < 0.0 { f64::NEG_INFINITY } else { f64::INFINITY },
            tag: Tag::Infinite,
        }
    }

    fn loosened(self) -> Self {
        match self.tag {
            Tag::Tight => Self::loose(self.value),
            _ => self,
        }
    }
}

/// A closed interval `[min, max]` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub min: Bound,
    /// Upper bound.
    pub max: Bound,
}

impl Interval {
    /// The whole real line.
    pub fn infinite() -> Self {
        Self {
            min: Bound::infinite(-1.0),
            max: Bound::infinite(1.0),
        }
    }

    /// Tight interval `[lo, hi]`.
    pub fn tight(lo: f64, hi: f64) -> Self {
        Self {
            min: Bound::tight(lo),
            max: Bound::tight(hi),
        }
    }

    /// Smallest interval containing both; each bound keeps the tag of the
    /// side it came from.
    pub fn union(&self, other: &Interval) -> Self {
        let min = if other.min.value < self.min.value { other.min } else { self.min };
        let max = if other.max.value > self.max.value { other.max } else { self.max };
        Self { min, max }
    }

    /// Overlap of both; a finite result is at best loose since the shapes
    /// generally do not reach the other's bounds.
    pub fn intersect(&self, other: &Interval) -> Self {
        let min = if other.min.value > self.min.value { other.min } else { self.min };
        let max = if other.max.value < self.max.value { other.max } else { self.max };
        Self {
            min: min.loosened(),
            max: max.loosened(),
        }
    }

    /// Whether `v` lies in the closed interval.
    pub fn contains(&self, v: f64) -> bool {
        self.min.value <= v && v <= self.max.value
    }

    /// Whether the interval is empty.
    pub fn is_empty(&self) -> bool {
        !(self.min.value <= self.max.value)
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    /// Extent along x.
    pub x: Interval,
    /// Extent along y.
    pub y: Interval,
    /// Extent along z.
    pub z: Interval,
}

impl Bbox {
    /// Unbounded box.
    pub fn infinite() -> Self {
        Self {
            x: Interval::infinite(),
            y: Interval::infinite(),
            z: Interval::infinite(),
        }
    }

    /// Box containing nothing; the identity of [`Bbox::union`].
    pub fn empty() -> Self {
        let none = Interval {
            min: Bound::loose(f64::INFINITY),
            max: Bound::loose(f64::NEG_INFINITY),
        };
        Self { x: none, y: none, z: none }
    }

    /// Tight box between two corners.
    pub fn tight(min: &Point3, max: &Point3) -> Self {
        Self {
            x: Interval::tight(min.x, max.x),
            y: Interval::tight(min.y, max.y),
            z: Interval::tight(min.z, max.z),
        }
    }

    /// Tight box around a set of points; `None` when the set is empty.
    pub fn around_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (mut lo, mut hi) = (first, first);
        for p in iter {
            lo = lo.inf(p);
            hi = hi.sup(p);
        }
        Some(Self::tight(&lo, &hi))
    }

    /// Tight box of a ball.
    pub fn around_sphere(center: &Point3, radius: f64) -> Self {
        let r = Vec3::repeat(radius.abs());
        Self::tight(&(center - r), &(center + r))
    }

    /// Tight box of a disc with the given center, unit axis and radius.
    pub fn around_disc(center: &Point3, axis: &Vec3, radius: f64) -> Self {
        let r = radius.abs();
        let e = Vec3::new(
            r * (1.0 - axis.x * axis.x).max(0.0).sqrt(),
            r * (1.0 - axis.y * axis.y).max(0.0).sqrt(),
            r * (1.0 - axis.z * axis.z).max(0.0).sqrt(),
        );
        Self::tight(&(center - e), &(center + e))
    }

    /// Mark every finite bound loose.
    pub fn loosen(self) -> Self {
        let l = |i: Interval| Interval {
            min: i.min.loosened(),
            max: i.max.loosened(),
        };
        Self {
            x: l(self.x),
            y: l(self.y),
            z: l(self.z),
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bbox) -> Self {
        Self {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
            z: self.z.union(&other.z),
        }
    }

    /// Overlap of both (loose).
    pub fn intersect(&self, other: &Bbox) -> Self {
        Self {
            x: self.x.intersect(&other.x),
            y: self.y.intersect(&other.y),
            z: self.z.intersect(&other.z),
        }
    }

    /// Whether the point lies in the closed box.
    pub fn contains(&self, p: &Point3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Whether every bound is finite.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|i| i.min.tag != Tag::Infinite && i.max.tag != Tag::Infinite)
    }

    /// Whether the box is empty along some axis.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Minimum corner.
    pub fn min(&self) -> Point3 {
        Point3::new(self.x.min.value, self.y.min.value, self.z.min.value)
    }

    /// Maximum corner.
    pub fn max(&self) -> Point3 {
        Point3::new(self.x.max.value, self.y.max.value, self.z.max.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_keeps_tags() {
        let a = Bbox::tight(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 1.0, 1.0));
        let b = Bbox::tight(&Point3::new(-1.0, 0.5, 0.5), &Point3::new(0.5, 2.0, 0.5)).loosen();
        let u = a.union(&b);
        assert_eq!(u.x.min.value, -1.0);
        assert_eq!(u.x.min.tag, Tag::Loose);
        assert_eq!(u.x.max.tag, Tag::Tight);
        assert_eq!(u.y.max.value, 2.0);
    }

    #[test]
    fn test_intersect_is_loose() {
        let a = Bbox::tight(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 2.0, 2.0));
        let b = Bbox::tight(&Point3::new(1.0, 1.0, 1.0), &Point3::new(3.0, 3.0, 3.0));
        let i = a.intersect(&b);
        assert_eq!(i.x.min.value, 1.0);
        assert_eq!(i.x.max.value, 2.0);
        assert_eq!(i.x.min.tag, Tag::Loose);
        assert!(i.contains(&Point3::new(1.5, 1.5, 1.5)));
        assert!(!i.contains(&Point3::new(0.5, 1.5, 1.5)));
    }

    #[test]
    fn test_infinite_union_dominates() {
        let a = Bbox::around_sphere(&Point3::origin(), 1.0);
        let u = a.union(&Bbox::infinite());
        assert!(!u.is_finite());
        assert!(a.is_finite());
        assert!(u.contains(&Point3::new(1e300, 0.0, 0.0)));
    }

    #[test]
    fn test_disc_box() {
        let b = Bbox::around_disc(&Point3::origin(), &Vec3::z(), 2.0);
        assert!((b.x.max.value - 2.0).abs() < 1e-12);
        assert!(b.z.max.value.abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(Bbox::around_points(std::iter::empty()).is_none());
        let a = Bbox::tight(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 1.0, 1.0));
        let b = Bbox::tight(&Point3::new(2.0, 0.0, 0.0), &Point3::new(3.0, 1.0, 1.0));
        assert!(a.intersect(&b).is_empty());
        assert!(Bbox::empty().is_empty());
        assert_eq!(Bbox::empty().union(&a), a);
    }
}
