//! Quadtree subdivision of the screen.
//!
//! Starting from the whole image with every shape in front of the eye, a
//! rectangle keeps only the shapes not provably outside it and splits in
//! four until it is small or nearly empty. Quadrants run in parallel with
//! `rayon::join`.

use rayon::join;
use solidray_shape::Color;
use tracing::debug;

use crate::image::Tile;
use crate::scheduler::{Nearest, Rect, Scheduler, Stage};
use crate::segment::Segmenter;

/// Rectangles at or below this many pixels are rendered directly.
const LEAF_PIXELS: usize = 64;

/// Rectangles with at most this many candidate shapes are rendered
/// directly.
const LEAF_SHAPES: usize = 2;

/// Quadtree scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recursive;

impl Scheduler for Recursive {
    fn render<C: Color + Sync>(&self, stage: &Stage<'_, C>) -> Vec<Tile> {
        let camera = stage.camera();
        let e = stage.engine();
        let seg = Segmenter::new(camera, 1, 1, 1, 1, e.fudge);
        let front = camera.front();
        let mut candidates: Vec<usize> = (0..stage.shapes().len())
            .filter(|&k| !stage.shapes()[k].shape().dry(&front))
            .collect();
        candidates.sort_by(|&a, &b| {
            let (sa, sb) = (&stage.shapes()[a], &stage.shapes()[b]);
            sa.min().total_cmp(&sb.min()).then(a.cmp(&b))
        });
        debug!(
            shapes = stage.shapes().len(),
            in_front = candidates.len(),
            "recursive subdivision"
        );
        let root = Rect::new(0, camera.width, 0, camera.height);
        subdivide(stage, &seg, root, &candidates)
    }
}

fn subdivide<C: Color + Sync>(stage: &Stage<'_, C>, seg: &Segmenter<'_>, rect: Rect, candidates: &[usize]) -> Vec<Tile> {
    let kept: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&k| !seg.rect_dry(stage.shapes()[k].shape(), &rect))
        .collect();

    let (w, h) = (rect.width(), rect.height());
    if w * h <= LEAF_PIXELS || kept.len() <= LEAF_SHAPES {
        return vec![leaf(stage, rect, &kept)];
    }
    let (mi, mj) = (rect.i0 + w / 2, rect.j0 + h / 2);
    let quads = [
        Rect::new(rect.i0, mi, rect.j0, mj),
        Rect::new(mi, rect.i1, rect.j0, mj),
        Rect::new(rect.i0, mi, mj, rect.j1),
        Rect::new(mi, rect.i1, mj, rect.j1),
    ];
    let go = |r: Rect| {
        if r.is_empty() {
            Vec::new()
        } else {
            subdivide(stage, seg, r, &kept)
        }
    };
    let ((mut a, b), (c, d)) = join(|| join(|| go(quads[0]), || go(quads[1])), || join(|| go(quads[2]), || go(quads[3])));
    a.extend(b);
    a.extend(c);
    a.extend(d);
    a
}

/// Render `rect` against `kept`, which is sorted by lower bound.
fn leaf<C: Color>(stage: &Stage<'_, C>, rect: Rect, kept: &[usize]) -> Tile {
    rect.tile(|i, j| {
        stage.pixel(i, j, |ray| {
            let mut best = Nearest::new(ray);
            for &k in kept {
                let p = &stage.shapes()[k];
                if best.beyond(p.min()) {
                    break;
                }
                best.offer(p);
            }
            best.into_hit()
        })
    })
}
