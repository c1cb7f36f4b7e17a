//! The shared boolean combinator.
//!
//! Gathers every operand's crossings along the ray, sorts them, and walks
//! them in order while tracking which operands the ray is inside of.
//! Solid crossings toggle their operand; a change in the combined state is
//! a crossing of the operator itself. Sheet crossings never toggle: the
//! rule is evaluated with that operand momentarily inside, and the sheet is
//! visible where that lifts the combined state from outside to inside.

use crate::{Inq, Logic, Prepared, Ray};

/// Push the operator's crossings in `(0, qmin)` onto `out`, in order. With
/// `first` set, stop after the first one.
pub(crate) fn walk<'a, C>(
    logic: Logic,
    operands: &[Prepared<'a, C>],
    ray: &Ray,
    qmin: f64,
    first: bool,
    out: &mut Vec<Inq<'a, C>>,
) {
    let mut events: Vec<(usize, Inq<'a, C>)> = Vec::new();
    let mut buf = Vec::new();
    for (i, operand) in operands.iter().enumerate() {
        buf.clear();
        operand.inall(ray, qmin, &mut buf);
        if buf.is_empty() && !operand.interior() && logic.requires(i) {
            return;
        }
        events.extend(buf.drain(..).map(|hit| (i, hit)));
    }
    events.sort_by(|a, b| a.1.q.total_cmp(&b.1.q));

    let mut inside: Vec<bool> = operands.iter().map(Prepared::interior).collect();
    let mut state = logic.eval(&inside);
    for (i, mut hit) in events {
        if hit.sheet {
            let was = inside[i];
            inside[i] = true;
            let lit = !state && logic.eval(&inside);
            inside[i] = was;
            if !lit {
                continue;
            }
            hit.orient(&ray.diff, true);
        } else {
            inside[i] = !inside[i];
            let next = logic.eval(&inside);
            if next == state {
                continue;
            }
            state = next;
            // Outward normal of the combined solid: against the ray when
            // entering, along it when leaving.
            hit.orient(&ray.diff, next);
        }
        out.push(hit);
        if first {
            return;
        }
    }
}
