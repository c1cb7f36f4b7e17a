//! Closed-form polynomial root finding.
//!
//! All solvers return only finite real roots, sorted ascending. Degenerate
//! leading coefficients fall through to the lower-degree solver; negative
//! discriminants yield no roots rather than NaN.

use std::f64::consts::PI;

/// Up to four real roots, sorted ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Roots {
    vals: [f64; 4],
    len: usize,
}

impl Roots {
    fn push(&mut self, v: f64) {
        if v.is_finite() && self.len < 4 {
            self.vals[self.len] = v;
            self.len += 1;
        }
    }

    fn finish(mut self) -> Self {
        let s = &mut self.vals[..self.len];
        s.sort_by(|a, b| a.total_cmp(b));
        self
    }

    /// The roots as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.vals[..self.len]
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no roots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

const EPS: f64 = 1e-14;

/// Solve `a*x^2 + b*x + c = 0`.
///
/// Uses the cancellation-free form `q = -(b + sign(b)·√disc)/2`. A double
/// root is reported twice so that entering and leaving a tangent surface
/// stay paired.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::default();
    if !(a.abs() > EPS) {
        if b.abs() > EPS {
            roots.push(-c / b);
        }
        return roots;
    }
    let disc = b * b - 4.0 * a * c;
    if !(disc >= 0.0) {
        return roots;
    }
    let sq = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sq);
    if q == 0.0 {
        // b == 0 and disc == 0 → c == 0.
        roots.push(0.0);
        roots.push(0.0);
    } else {
        roots.push(q / a);
        roots.push(c / q);
    }
    roots.finish()
}

/// Solve `a*x^3 + b*x^2 + c*x + d = 0` using Cardano's formula.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots {
    if !(a.abs() > EPS) {
        return solve_quadratic(b, c, d);
    }

    // Normalize: x^3 + px^2 + qx + r = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;

    // Depressed cubic t^3 + aa*t + bb = 0 via x = t - p/3
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;
    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;
    let shift = p / 3.0;

    let mut roots = Roots::default();
    if delta > EPS {
        let sqrt_delta = delta.sqrt();
        let u = (-bb / 2.0 + sqrt_delta).cbrt();
        let v = (-bb / 2.0 - sqrt_delta).cbrt();
        roots.push(u + v - shift);
    } else if delta.abs() <= EPS {
        if aa.abs() < EPS && bb.abs() < EPS {
            roots.push(-shift);
        } else {
            let u = (-bb / 2.0).cbrt();
            roots.push(2.0 * u - shift);
            roots.push(-u - shift);
        }
    } else {
        // Three real roots (trigonometric form)
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).clamp(-1.0, 1.0).acos() / 3.0;
        roots.push(m * theta.cos() - shift);
        roots.push(m * (theta - 2.0 * PI / 3.0).cos() - shift);
        roots.push(m * (theta + 2.0 * PI / 3.0).cos() - shift);
    }
    roots.finish()
}

/// Solve `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0` with Ferrari's method.
///
/// Each root is polished with two Newton steps on the original polynomial,
/// which matters for ray/torus intersections far from the origin.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Roots {
    if !(a.abs() > EPS) {
        return solve_cubic(b, c, d, e);
    }

    let p = b / a;
    let q = c / a;
    let r = d / a;
    let s = e / a;

    // Depressed quartic y^4 + a2*y^2 + a1*y + a0 = 0 via x = y - p/4
    let p2 = p * p;
    let a2 = q - 3.0 * p2 / 8.0;
    let a1 = r - p * q / 2.0 + p2 * p / 8.0;
    let a0 = s - p * r / 4.0 + p2 * q / 16.0 - 3.0 * p2 * p2 / 256.0;

    // Resolvent cubic 8u^3 + 8*a2*u^2 + (2*a2^2 - 8*a0)*u - a1^2 = 0
    let cubic = solve_cubic(8.0, 8.0 * a2, 2.0 * a2 * a2 - 8.0 * a0, -a1 * a1);
    let u = cubic
        .as_slice()
        .iter()
        .copied()
        .filter(|&u| u > EPS)
        .fold(0.0, f64::max);
    let sqrt_2u = (2.0 * u).max(0.0).sqrt();

    let mut roots = Roots::default();
    if sqrt_2u > 1e-12 {
        let alpha = a2 + 2.0 * u;
        let beta = a1 / sqrt_2u;

        // y^2 + sqrt(2u)*y + (alpha - beta)/2 = 0
        let disc1 = sqrt_2u * sqrt_2u - 2.0 * (alpha - beta);
        if disc1 >= 0.0 {
            let sq = disc1.sqrt();
            roots.push((-sqrt_2u + sq) / 2.0 - p / 4.0);
            roots.push((-sqrt_2u - sq) / 2.0 - p / 4.0);
        }
        // y^2 - sqrt(2u)*y + (alpha + beta)/2 = 0
        let disc2 = sqrt_2u * sqrt_2u - 2.0 * (alpha + beta);
        if disc2 >= 0.0 {
            let sq = disc2.sqrt();
            roots.push((sqrt_2u + sq) / 2.0 - p / 4.0);
            roots.push((sqrt_2u - sq) / 2.0 - p / 4.0);
        }
    } else {
        // Biquadratic y^4 + a2*y^2 + a0 = 0
        let disc = a2 * a2 - 4.0 * a0;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            for y2 in [(-a2 + sq) / 2.0, (-a2 - sq) / 2.0] {
                if y2 >= 0.0 {
                    let y = y2.sqrt();
                    roots.push(y - p / 4.0);
                    roots.push(-y - p / 4.0);
                }
            }
        }
    }

    for i in 0..roots.len {
        roots.vals[i] = polish(roots.vals[i], [a, b, c, d, e]);
    }
    roots.finish()
}

fn polish(mut x: f64, k: [f64; 5]) -> f64 {
    for _ in 0..2 {
        let f = (((k[0] * x + k[1]) * x + k[2]) * x + k[3]) * x + k[4];
        let df = ((4.0 * k[0] * x + 3.0 * k[1]) * x + 2.0 * k[2]) * x + k[3];
        if df.abs() > EPS {
            let next = x - f / df;
            if next.is_finite() {
                x = next;
            }
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_quadratic() {
        let roots = solve_quadratic(1.0, -3.0, 2.0); // (x-1)(x-2) = 0
        assert_eq!(roots.as_slice().len(), 2);
        assert!((roots.as_slice()[0] - 1.0).abs() < 1e-10);
        assert!((roots.as_slice()[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_solve_quadratic_degenerate() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(solve_quadratic(0.0, 0.0, 1.0).is_empty());
        let lin = solve_quadratic(0.0, 2.0, -4.0);
        assert_eq!(lin.as_slice(), &[2.0]);
        assert_eq!(solve_quadratic(1.0, 0.0, 0.0).as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_quadratic_no_cancellation() {
        // Roots 1e-8 and 1e8.
        let roots = solve_quadratic(1.0, -(1e8 + 1e-8), 1.0);
        assert!((roots.as_slice()[0] - 1e-8).abs() < 1e-20);
    }

    #[test]
    fn test_solve_cubic() {
        // (x-1)(x-2)(x-3) = x^3 - 6x^2 + 11x - 6
        let roots = solve_cubic(1.0, -6.0, 11.0, -6.0);
        assert_eq!(roots.len(), 3);
        for (r, want) in roots.as_slice().iter().zip([1.0, 2.0, 3.0]) {
            assert!((r - want).abs() < 1e-10);
        }
    }

    #[test]
    fn test_solve_quartic() {
        // (x-1)(x-2)(x-3)(x-4) = x^4 - 10x^3 + 35x^2 - 50x + 24
        let roots = solve_quartic(1.0, -10.0, 35.0, -50.0, 24.0);
        assert_eq!(roots.len(), 4);
        for (r, want) in roots.as_slice().iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((r - want).abs() < 1e-9, "{r} vs {want}");
        }
    }

    #[test]
    fn test_quartic_asymmetric_roots() {
        // (x-1)(x-2)(x-3)(x-5): the cubic term survives depression.
        let roots = solve_quartic(1.0, -11.0, 41.0, -61.0, 30.0);
        assert_eq!(roots.len(), 4);
        for (r, want) in roots.as_slice().iter().zip([1.0, 2.0, 3.0, 5.0]) {
            assert!((r - want).abs() < 1e-9, "{r} vs {want}");
        }

        // Scaled and shifted: 2(x+0.5)(x-0.25)(x-4)(x-7)
        let roots = solve_quartic(2.0, -21.5, 50.25, 16.75, -7.0);
        assert_eq!(roots.len(), 4);
        for (r, want) in roots.as_slice().iter().zip([-0.5, 0.25, 4.0, 7.0]) {
            assert!((r - want).abs() < 1e-9, "{r} vs {want}");
        }
    }

    #[test]
    fn test_quartic_two_complex_roots() {
        // (x-1)(x-2)(x^2+1)
        let roots = solve_quartic(1.0, -3.0, 3.0, -3.0, 2.0);
        assert_eq!(roots.len(), 2);
        assert!((roots.as_slice()[0] - 1.0).abs() < 1e-9);
        assert!((roots.as_slice()[1] - 2.0).abs() < 1e-9);

        // (x+3)(x-0.5)((x-1)^2+4)
        let roots = solve_quartic(1.0, 0.5, -1.5, 15.5, -7.5);
        assert_eq!(roots.len(), 2);
        assert!((roots.as_slice()[0] + 3.0).abs() < 1e-9);
        assert!((roots.as_slice()[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_quartic_no_real_roots() {
        assert!(solve_quartic(1.0, 0.0, 0.0, 0.0, 1.0).is_empty());
    }
}
