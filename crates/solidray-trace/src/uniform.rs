//! The zone scheduler.
//!
//! 1. Cut the screen into `hzone × vzone` zones (see [`crate::segment`]).
//! 2. In parallel over shapes, find the zones and pixels each shape can
//!    reach; merge into per-zone `(lower bound, shape)` lists.
//! 3. In parallel over zones, trace each pixel against its zone's list in
//!    increasing lower-bound order, stopping once the next bound is past
//!    the current hit.

use std::cmp::Ordering;

use rayon::prelude::*;
use solidray_shape::Color;
use tracing::debug;

use crate::image::Tile;
use crate::lazy_sort::LazySort;
use crate::scheduler::{Nearest, Rect, Scheduler, Stage};
use crate::segment::{Region, Segmenter};

/// Screen-zone scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

/// One shape in one zone.
#[derive(Debug, Clone, Copy)]
struct Entry {
    min: f64,
    shape: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.min.total_cmp(&other.min).then(self.shape.cmp(&other.shape))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

enum Placement {
    Behind,
    Offscreen,
    Zones { region: Region, zones: Vec<usize> },
}

impl Scheduler for Uniform {
    fn render<C: Color + Sync>(&self, stage: &Stage<'_, C>) -> Vec<Tile> {
        let camera = stage.camera();
        let e = stage.engine();
        let seg = Segmenter::new(camera, e.hzone, e.vzone, e.hsub, e.vsub, e.fudge);
        let front = camera.front();
        let (nx, ny) = (seg.cols.zones(), seg.rows.zones());

        let placements: Vec<Placement> = stage
            .shapes()
            .par_iter()
            .map(|p| {
                let shape = p.shape();
                if shape.dry(&front) {
                    return Placement::Behind;
                }
                let Some(region) = seg.locate(shape) else {
                    return Placement::Offscreen;
                };
                let mut zones = Vec::with_capacity(region.cols.len() * region.rows.len());
                for zj in region.rows.clone() {
                    for zi in region.cols.clone() {
                        let rect = seg.zone(zi, zj).intersect(&region.rect);
                        if rect.is_empty() || (e.diagonal && seg.corner_dry(shape, &rect)) {
                            continue;
                        }
                        zones.push(zj * nx + zi);
                    }
                }
                Placement::Zones { region, zones }
            })
            .collect();

        let mut lists: Vec<Vec<Entry>> = vec![Vec::new(); nx * ny];
        let mut rects = vec![Rect::default(); placements.len()];
        let (mut behind, mut offscreen, mut inserted) = (0usize, 0usize, 0usize);
        for (k, placement) in placements.into_iter().enumerate() {
            match placement {
                Placement::Behind => behind += 1,
                Placement::Offscreen => offscreen += 1,
                Placement::Zones { region, zones } => {
                    rects[k] = region.rect;
                    inserted += zones.len();
                    let min = stage.shapes()[k].min();
                    for z in zones {
                        lists[z].push(Entry { min, shape: k });
                    }
                }
            }
        }
        debug!(
            shapes = stage.shapes().len(),
            behind,
            offscreen,
            inserted,
            zones = nx * ny,
            "uniform zones filled"
        );

        lists
            .into_par_iter()
            .enumerate()
            .map(|(z, mut list)| {
                let zone = seg.zone(z % nx, z / nx);
                let first = e.sort_min.max((e.sort_frac * list.len() as f64).ceil() as usize);
                let mut sorted = LazySort::new(&mut list, first);
                zone.tile(|i, j| {
                    stage.pixel(i, j, |ray| {
                        let mut best = Nearest::new(ray);
                        let mut k = 0;
                        while let Some(entry) = sorted.get(k) {
                            if best.beyond(entry.min) {
                                break;
                            }
                            k += 1;
                            if rects[entry.shape].contains(i, j) {
                                best.offer(&stage.shapes()[entry.shape]);
                            }
                        }
                        best.into_hit()
                    })
                })
            })
            .collect()
    }
}
