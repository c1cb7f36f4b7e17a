//! Screen segmentation by splitting half-spaces through the eye.
//!
//! Each axis of the screen is cut into `zones × sub` fine strips. Every cut
//! has two half-spaces: the points projecting at or before it and the
//! points projecting at or after it. A shape dry against "at or before cut
//! k" cannot be seen left of (or above) cut k, so a binary search over the
//! cuts brackets the pixels the shape can reach. The coarse cuts (every
//! `sub`-th) decide zone membership; the fine ones clip the pixel range.

use std::ops::Range;

use solidray_math::Half;
use solidray_shape::Shape;

use crate::scheduler::Rect;
use crate::view::Camera;

/// Cuts and half-spaces along one screen axis.
pub(crate) struct Axis {
    zones: usize,
    sub: usize,
    cuts: Vec<usize>,
    before: Vec<Half>,
    after: Vec<Half>,
}

impl Axis {
    fn new(camera: &Camera, (a, b): (f64, f64), extent: usize, zones: usize, sub: usize, fudge: f64) -> Self {
        let zones = zones.clamp(1, extent.max(1));
        let sub = sub.max(1);
        let n = zones * sub;
        let cuts: Vec<usize> = (0..=n).map(|k| k * extent / n).collect();
        let before = cuts
            .iter()
            .map(|&c| camera.screen_half(-a, -b, -(c as f64 + fudge)))
            .collect();
        let after = cuts
            .iter()
            .map(|&c| camera.screen_half(a, b, c as f64 - fudge))
            .collect();
        Self {
            zones,
            sub,
            cuts,
            before,
            after,
        }
    }

    /// Number of zones.
    pub(crate) fn zones(&self) -> usize {
        self.zones
    }

    /// Pixel span of zone `z`.
    pub(crate) fn span(&self, z: usize) -> Range<usize> {
        self.cuts[z * self.sub]..self.cuts[(z + 1) * self.sub]
    }

    /// Zones and pixels along this axis that `shape` may reach, or `None`
    /// when it is off screen.
    pub(crate) fn locate<C>(&self, shape: &Shape<C>) -> Option<(Range<usize>, Range<usize>)> {
        let (n, s) = (self.zones, self.sub);
        let dry_before = |k: usize| shape.dry(&self.before[k]);
        let dry_after = |k: usize| shape.dry(&self.after[k]);

        let start = partition(0, n + 1, |z| dry_before(z * s)).saturating_sub(1);
        let end = partition(start, n + 1, |z| !dry_after(z * s)).min(n);
        if start >= end {
            return None;
        }
        let lo = partition(start * s, end * s + 1, dry_before)
            .saturating_sub(1)
            .max(start * s);
        let hi = partition(lo, end * s + 1, |k| !dry_after(k)).min(end * s);
        if lo >= hi || self.cuts[lo] >= self.cuts[hi] {
            return None;
        }
        Some((lo / s..hi.div_ceil(s), self.cuts[lo]..self.cuts[hi]))
    }
}

/// First index in `lo..hi` where `pred` fails, assuming it holds on a
/// prefix.
///
/// Whatever `pred` does, a result `r > lo` had `pred(r - 1)` evaluate true
/// and a result `r < hi` had `pred(r)` evaluate false, so conclusions drawn
/// from the result stay sound even if dry tests are not monotone.
fn partition(mut lo: usize, mut hi: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Where one shape may appear on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Region {
    /// Zone columns.
    pub cols: Range<usize>,
    /// Zone rows.
    pub rows: Range<usize>,
    /// Reachable pixels.
    pub rect: Rect,
}

/// Column and row segmenters for one frame.
pub(crate) struct Segmenter<'c> {
    camera: &'c Camera,
    fudge: f64,
    pub cols: Axis,
    pub rows: Axis,
}

impl<'c> Segmenter<'c> {
    pub(crate) fn new(camera: &'c Camera, hzone: usize, vzone: usize, hsub: usize, vsub: usize, fudge: f64) -> Self {
        Self {
            camera,
            fudge,
            cols: Axis::new(camera, (1.0, 0.0), camera.width, hzone, hsub, fudge),
            rows: Axis::new(camera, (0.0, 1.0), camera.height, vzone, vsub, fudge),
        }
    }

    /// Screen region `shape` may reach.
    pub(crate) fn locate<C>(&self, shape: &Shape<C>) -> Option<Region> {
        let (cols, xs) = self.cols.locate(shape)?;
        let (rows, ys) = self.rows.locate(shape)?;
        Some(Region {
            cols,
            rows,
            rect: Rect::new(xs.start, xs.end, ys.start, ys.end),
        })
    }

    /// Pixel rectangle of zone `(zi, zj)`.
    pub(crate) fn zone(&self, zi: usize, zj: usize) -> Rect {
        let xs = self.cols.span(zi);
        let ys = self.rows.span(zj);
        Rect::new(xs.start, xs.end, ys.start, ys.end)
    }

    /// Whether a 45° half-space through a corner of `rect` proves `shape`
    /// misses every pixel of `rect`.
    pub(crate) fn corner_dry<C>(&self, shape: &Shape<C>, rect: &Rect) -> bool {
        let f = 2.0 * self.fudge;
        let (x0, x1) = (rect.i0 as f64, rect.i1 as f64);
        let (y0, y1) = (rect.j0 as f64, rect.j1 as f64);
        [
            (1.0, 1.0, x0 + y0 - f),
            (-1.0, -1.0, -(x1 + y1) - f),
            (1.0, -1.0, x0 - y1 - f),
            (-1.0, 1.0, y0 - x1 - f),
        ]
        .iter()
        .any(|&(a, b, c)| shape.dry(&self.camera.screen_half(a, b, c)))
    }

    /// Whether any side of `rect` proves `shape` misses all its pixels.
    pub(crate) fn rect_dry<C>(&self, shape: &Shape<C>, rect: &Rect) -> bool {
        let f = self.fudge;
        let (x0, x1) = (rect.i0 as f64, rect.i1 as f64);
        let (y0, y1) = (rect.j0 as f64, rect.j1 as f64);
        [
            (1.0, 0.0, x0 - f),
            (-1.0, 0.0, -x1 - f),
            (0.0, 1.0, y0 - f),
            (0.0, -1.0, -y1 - f),
        ]
        .iter()
        .any(|&(a, b, c)| shape.dry(&self.camera.screen_half(a, b, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;
    use solidray_math::{Point3, Vec3};
    use solidray_shape::Rgb;

    fn camera() -> Camera {
        View {
            fov: 30.0,
            ..View::new(Point3::origin(), 20.0, 0.0, 0.0)
        }
        .camera(64, 48)
        .unwrap()
    }

    /// Pixels actually covered by `shape`, found by brute force.
    fn covered(cam: &Camera, shape: &Shape<Rgb>) -> Vec<(usize, usize)> {
        let p = shape.process(&cam.eye);
        let mut out = Vec::new();
        for j in 0..cam.height {
            for i in 0..cam.width {
                if p.infirst(&cam.ray(i as f64 + 0.5, j as f64 + 0.5), f64::INFINITY).is_some() {
                    out.push((i, j));
                }
            }
        }
        out
    }

    #[test]
    fn test_partition_bounds() {
        assert_eq!(partition(0, 10, |k| k < 4), 4);
        assert_eq!(partition(0, 10, |_| true), 10);
        assert_eq!(partition(3, 10, |_| false), 3);
    }

    #[test]
    fn test_cuts_partition_screen() {
        let cam = camera();
        let seg = Segmenter::new(&cam, 5, 7, 3, 2, 0.01);
        assert_eq!(seg.cols.zones(), 5);
        let mut next = 0;
        for z in 0..5 {
            let s = seg.cols.span(z);
            assert_eq!(s.start, next);
            next = s.end;
        }
        assert_eq!(next, 64);
        assert_eq!(seg.rows.span(6).end, 48);

        // More zones than pixels collapses to one zone per pixel.
        let tiny = View::default().camera(3, 2).unwrap();
        let seg = Segmenter::new(&tiny, 16, 16, 4, 4, 0.01);
        assert_eq!(seg.cols.zones(), 3);
        assert_eq!(seg.rows.zones(), 2);
    }

    #[test]
    fn test_locate_contains_coverage() {
        let cam = camera();
        let seg = Segmenter::new(&cam, 8, 6, 4, 4, 0.01);
        let shapes: Vec<Shape<Rgb>> = vec![
            Shape::sphere(Point3::new(0.0, 1.5, 1.0), 0.6),
            Shape::cuboid(Point3::new(0.0, -2.0, -1.0), Vec3::new(1.0, 0.5, 2.0)),
            Shape::cylinder(Point3::new(1.0, -1.0, 0.0), Point3::new(-1.0, 1.5, 2.0), 0.3),
            Shape::and(
                Shape::sphere(Point3::new(0.0, 0.0, 0.0), 1.0),
                Shape::sphere(Point3::new(0.0, 0.8, 0.0), 1.0),
            ),
        ];
        for s in &shapes {
            let px = covered(&cam, s);
            assert!(!px.is_empty(), "{} not visible", s.name());
            let region = seg.locate(s).unwrap();
            for &(i, j) in &px {
                assert!(region.rect.contains(i, j), "{} misses pixel {i},{j}", s.name());
                let z = (0..8).find(|&z| seg.cols.span(z).contains(&i)).unwrap();
                let w = (0..6).find(|&w| seg.rows.span(w).contains(&j)).unwrap();
                assert!(region.cols.contains(&z) && region.rows.contains(&w));
                assert!(!seg.corner_dry(s, &seg.zone(z, w).intersect(&region.rect)));
            }
            // The region is tight to within a couple of pixels.
            let (imin, imax) = px.iter().fold((usize::MAX, 0), |(a, b), &(i, _)| (a.min(i), b.max(i)));
            assert!(region.rect.i0 + 3 >= imin && region.rect.i1 <= imax + 4);
        }
    }

    #[test]
    fn test_off_screen_and_rect_dry() {
        let cam = camera();
        let seg = Segmenter::new(&cam, 8, 6, 4, 4, 0.01);
        // Far to the viewer's left (the camera's right is +y).
        let left: Shape<Rgb> = Shape::sphere(Point3::new(0.0, -40.0, 0.0), 1.0);
        assert!(seg.locate(&left).is_none());

        let s: Shape<Rgb> = Shape::sphere(Point3::new(0.0, 2.0, 0.0), 0.5);
        let region = seg.locate(&s).unwrap();
        assert!(!seg.rect_dry(&s, &region.rect));
        assert!(seg.rect_dry(&s, &Rect::new(0, 10, 0, 48)));
    }
}
