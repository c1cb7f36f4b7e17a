//! Shared per-frame state and the scheduler interface.
//!
//! A [`Stage`] holds everything one frame needs: the top-level shapes
//! prepared for the eye, the camera, lights and the (already fixed) engine.
//! Schedulers only differ in which shapes they offer to each pixel ray;
//! sampling, shading and the nearest-hit rule live here so that every
//! scheduler produces the same pixel for the same hit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use solidray_shape::{Color, Inq, Prepared, Ray, Rgb};
use tracing::debug;

use crate::engine::MAX_ANTI;
use crate::image::{Rgba, Tile};
use crate::shade::shade;
use crate::view::Camera;
use crate::{Engine, Light, Model};

/// A strategy for deciding which shapes each pixel ray is tested against.
pub trait Scheduler {
    /// Render the whole image as a set of disjoint tiles.
    fn render<C: Color + Sync>(&self, stage: &Stage<'_, C>) -> Vec<Tile>;
}

/// One frame ready to render.
pub struct Stage<'a, C> {
    shapes: Vec<Prepared<'a, C>>,
    camera: Camera,
    light: &'a Light,
    engine: &'a Engine,
}

impl<'a, C: Sync> Stage<'a, C> {
    /// Prepare every shape of `model` for the camera's eye.
    ///
    /// Shapes without a surface are dropped, and so are solid shapes that
    /// contain the eye: a camera embedded in a solid sees nothing of it.
    pub fn new(model: &'a Model<C>, camera: Camera, light: &'a Light, engine: &'a Engine) -> Self {
        let eye = camera.eye;
        let prepared: Vec<_> = model.shapes.par_iter().map(|s| s.process(&eye)).collect();
        let total = prepared.len();
        let mut embedded = 0;
        let shapes: Vec<_> = prepared
            .into_iter()
            .filter(|p| {
                let inside = p.interior() && p.solid();
                embedded += usize::from(inside);
                !inside && !p.is_empty()
            })
            .collect();
        debug!(total, embedded, kept = shapes.len(), "shapes prepared");
        Self {
            shapes,
            camera,
            light,
            engine,
        }
    }
}

impl<'a, C> Stage<'a, C> {
    /// Prepared top-level shapes.
    pub fn shapes(&self) -> &[Prepared<'a, C>] {
        &self.shapes
    }

    /// Camera of this frame.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Engine parameters.
    pub fn engine(&self) -> &Engine {
        self.engine
    }

    /// Color of pixel `(i, j)`.
    ///
    /// Casts `anti × anti` stratified sample rays, asks `first` for the
    /// nearest hit of each, shades and averages. Alpha is the fraction of
    /// samples that hit something.
    pub fn pixel<F>(&self, i: usize, j: usize, mut first: F) -> Rgba
    where
        C: Color,
        F: FnMut(&Ray) -> Option<Inq<'a, C>>,
    {
        let n = self.engine.anti.clamp(1, MAX_ANTI);
        let mut rng = self.engine.jitter.then(|| pixel_rng(self.engine.seed, i, j));
        let mut sum = Rgb::BLACK;
        let mut hits = 0usize;
        for sj in 0..n {
            for si in 0..n {
                let (ox, oy) = match rng.as_mut() {
                    Some(r) => (r.random::<f64>(), r.random::<f64>()),
                    None => (0.5, 0.5),
                };
                let x = i as f64 + (si as f64 + ox) / n as f64;
                let y = j as f64 + (sj as f64 + oy) / n as f64;
                let ray = self.camera.ray(x, y);
                let color = match first(&ray) {
                    Some(hit) => {
                        hits += 1;
                        let surface = hit.base().map(Color::convert).unwrap_or_default();
                        shade(surface, &ray.eye, self.light, &hit.point, &hit.normal)
                    }
                    None => self.engine.background,
                };
                sum = sum.add(color);
            }
        }
        let k = (n * n) as f64;
        let [r, g, b] = sum.scale(1.0 / k).to_rgb8();
        let a = (hits as f64 / k * 255.0).round() as u8;
        [r, g, b, a]
    }
}

/// Per-pixel generator, independent of which thread renders the pixel.
fn pixel_rng(seed: u64, i: usize, j: usize) -> StdRng {
    let mix = seed
        ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (j as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    StdRng::seed_from_u64(mix)
}

/// Running nearest hit along one ray.
pub(crate) struct Nearest<'a, C> {
    ray: Ray,
    len: f64,
    hit: Option<Inq<'a, C>>,
}

impl<'a, C> Nearest<'a, C> {
    pub(crate) fn new(ray: &Ray) -> Self {
        Self {
            ray: *ray,
            len: ray.length(),
            hit: None,
        }
    }

    /// Current upper end of the parameter window.
    pub(crate) fn qmin(&self) -> f64 {
        self.hit.as_ref().map_or(f64::INFINITY, |h| h.q)
    }

    /// Whether a shape whose surface is at least `min` away cannot beat the
    /// current hit.
    pub(crate) fn beyond(&self, min: f64) -> bool {
        min >= self.qmin() * self.len
    }

    pub(crate) fn offer(&mut self, shape: &Prepared<'a, C>) {
        if let Some(h) = shape.infirst(&self.ray, self.qmin()) {
            self.hit = Some(h);
        }
    }

    pub(crate) fn into_hit(self) -> Option<Inq<'a, C>> {
        self.hit
    }
}

/// Half-open pixel rectangle `[i0, i1) × [j0, j1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Rect {
    pub i0: usize,
    pub i1: usize,
    pub j0: usize,
    pub j1: usize,
}

impl Rect {
    pub(crate) fn new(i0: usize, i1: usize, j0: usize, j1: usize) -> Self {
        Self { i0, i1, j0, j1 }
    }

    #[inline]
    pub(crate) fn contains(&self, i: usize, j: usize) -> bool {
        self.i0 <= i && i < self.i1 && self.j0 <= j && j < self.j1
    }

    pub(crate) fn width(&self) -> usize {
        self.i1.saturating_sub(self.i0)
    }

    pub(crate) fn height(&self) -> usize {
        self.j1.saturating_sub(self.j0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub(crate) fn intersect(&self, o: &Rect) -> Rect {
        Rect::new(self.i0.max(o.i0), self.i1.min(o.i1), self.j0.max(o.j0), self.j1.min(o.j1))
    }

    /// Render every pixel of the rectangle with `color`.
    pub(crate) fn tile(&self, mut color: impl FnMut(usize, usize) -> Rgba) -> Tile {
        let mut tile = Tile::new(self.i0, self.j0, self.width(), self.height());
        if self.is_empty() {
            return tile;
        }
        for j in self.j0..self.j1 {
            for i in self.i0..self.i1 {
                tile.pixels.push(color(i, j));
            }
        }
        tile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;
    use solidray_math::Point3;
    use solidray_shape::Shape;

    fn setup() -> (Model<Rgb>, Camera) {
        let mut m = Model::new();
        m.push(Shape::sphere(Point3::origin(), 1.0).with_base(Rgb::new(1.0, 0.0, 0.0)));
        m.push(Shape::sphere(Point3::new(0.0, 0.0, 10.0), 1.0));
        m.push(Shape::sphere(Point3::new(0.0, 0.0, 3.0), -1.0));
        let cam = View::new(Point3::origin(), 10.0, 0.0, 90.0).camera(21, 21).unwrap();
        (m, cam)
    }

    #[test]
    fn test_stage_drops_embedded_and_degenerate() {
        let (m, cam) = setup();
        let light = Light::default();
        let engine = Engine::default();
        let stage = Stage::new(&m, cam, &light, &engine);
        assert_eq!(stage.shapes().len(), 1);
        assert_eq!(stage.shapes()[0].shape().base, Some(Rgb::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_pixel_hit_and_miss() {
        let (m, cam) = setup();
        let light = Light::single(cam.eye);
        let engine = Engine {
            background: Rgb::new(0.0, 0.0, 1.0),
            ..Engine::default()
        };
        let stage = Stage::new(&m, cam, &light, &engine);
        let trace = |ray: &Ray| {
            let mut best = Nearest::new(ray);
            for p in stage.shapes() {
                best.offer(p);
            }
            best.into_hit()
        };
        // Center pixel looks straight down at the red sphere.
        assert_eq!(stage.pixel(10, 10, trace), [255, 77, 77, 255]);
        assert_eq!(stage.pixel(0, 0, trace), [0, 0, 255, 0]);
    }

    #[test]
    fn test_antialias_coverage_and_jitter_reproducible() {
        let (m, cam) = setup();
        let light = Light::default();
        let engine = Engine {
            anti: 4,
            jitter: true,
            seed: 11,
            ..Engine::default()
        };
        let stage = Stage::new(&m, cam, &light, &engine);
        let trace = |ray: &Ray| {
            let mut best = Nearest::new(ray);
            best.offer(&stage.shapes()[0]);
            best.into_hit()
        };
        // Some pixel along the silhouette is partly covered.
        let all = || -> Vec<Rgba> { (0..21 * 21).map(|k| stage.pixel(k % 21, k / 21, trace)).collect() };
        let first = all();
        assert!(first.iter().any(|p| p[3] > 0 && p[3] < 255));
        assert_eq!(first[10 * 21 + 10][3], 255);
        assert_eq!(first, all());
    }

    #[test]
    fn test_nearest_window() {
        let (m, cam) = setup();
        let light = Light::default();
        let engine = Engine::default();
        let stage = Stage::new(&m, cam, &light, &engine);
        let ray = cam.ray(10.5, 10.5);
        let mut best = Nearest::new(&ray);
        assert!(!best.beyond(1e300));
        best.offer(&stage.shapes()[0]);
        assert!((best.qmin() - 0.9).abs() < 1e-12);
        assert!(best.beyond(9.01));
        assert!(!best.beyond(8.99));
    }

    #[test]
    fn test_rect() {
        let r = Rect::new(2, 5, 1, 3);
        assert!(r.contains(2, 1) && r.contains(4, 2));
        assert!(!r.contains(5, 2) && !r.contains(2, 3));
        assert_eq!(r.intersect(&Rect::new(4, 9, 0, 9)), Rect::new(4, 5, 1, 3));
        assert!(r.intersect(&Rect::new(6, 9, 0, 9)).is_empty());
        let t = r.tile(|i, j| [i as u8, j as u8, 0, 0]);
        assert_eq!(t.pixels.len(), 6);
        assert_eq!(t.pixels[5], [4, 2, 0, 0]);
    }
}
