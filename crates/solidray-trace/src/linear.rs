//! Brute force: every shape against every sample ray.
//!
//! Slow but obviously right; the other schedulers are checked against it.

use rayon::prelude::*;
use solidray_shape::Color;

use crate::image::Tile;
use crate::scheduler::{Nearest, Rect, Scheduler, Stage};

/// Reference scheduler with no culling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Scheduler for Linear {
    fn render<C: Color + Sync>(&self, stage: &Stage<'_, C>) -> Vec<Tile> {
        let camera = stage.camera();
        (0..camera.height)
            .into_par_iter()
            .map(|j| {
                Rect::new(0, camera.width, j, j + 1).tile(|i, j| {
                    stage.pixel(i, j, |ray| {
                        let mut best = Nearest::new(ray);
                        for shape in stage.shapes() {
                            best.offer(shape);
                        }
                        best.into_hit()
                    })
                })
            })
            .collect()
    }
}
