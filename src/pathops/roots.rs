// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Closed-form real roots of quadratics and cubics, restricted to the unit
// interval on request.

use smallvec::SmallVec;

use super::types::approximately_zero_when_compared_to;
use crate::consts::T_PIN_EPSILON;

pub type Roots = SmallVec<[f64; 3]>;

/// Real roots of `a·t² + b·t + c`.
pub fn quad_roots(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::new();
    if approximately_zero_when_compared_to(a, b.abs().max(c.abs())) {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }
    let p = b / (2.0 * a);
    let q = c / a;
    let disc = p * p - q;
    if disc < 0.0 {
        // A double root can come out slightly negative.
        if approximately_zero_when_compared_to(disc, p * p) {
            roots.push(-p);
        }
        return roots;
    }
    let sq = disc.sqrt();
    // Avoid cancellation by computing the larger root first.
    let big = -p - sq.copysign(p);
    roots.push(big);
    if big != 0.0 {
        let other = q / big;
        if other != big {
            roots.push(other);
        }
    } else if sq != 0.0 {
        roots.push(-big);
    }
    roots
}

/// Real roots of `a·t³ + b·t² + c·t + d`.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Roots {
    if approximately_zero_when_compared_to(a, b.abs().max(c.abs()).max(d.abs())) {
        return quad_roots(b, c, d);
    }
    let mut roots = Roots::new();
    if approximately_zero_when_compared_to(d, a.abs().max(b.abs()).max(c.abs())) {
        // t = 0 divides out.
        roots.push(0.0);
        for r in quad_roots(a, b, c) {
            if r != 0.0 {
                roots.push(r);
            }
        }
        return roots;
    }
    let (b, c, d) = (b / a, c / a, d / a);
    let q = (b * b - 3.0 * c) / 9.0;
    let r = (2.0 * b * b * b - 9.0 * b * c + 27.0 * d) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let shift = b / 3.0;
    if r2 < q3 {
        let theta = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let m = -2.0 * q.sqrt();
        let tau = 2.0 * std::f64::consts::PI;
        roots.push(m * (theta / 3.0).cos() - shift);
        roots.push(m * ((theta + tau) / 3.0).cos() - shift);
        roots.push(m * ((theta - tau) / 3.0).cos() - shift);
    } else {
        let mut a = (r.abs() + (r2 - q3).sqrt()).cbrt();
        if r > 0.0 {
            a = -a;
        }
        if a != 0.0 {
            a += q / a;
        }
        roots.push(a - shift);
        if r2 == q3 && q != 0.0 {
            // Double root.
            roots.push(-a / 2.0 - shift);
        }
    }
    roots
}

/// Keeps roots in [0, 1], snapping those within the pin tolerance to the
/// ends, sorted and without duplicates.
pub fn unit_roots(roots: &[f64]) -> Roots {
    let mut out = Roots::new();
    for &r in roots {
        if !r.is_finite() {
            continue;
        }
        let t = if r.abs() < T_PIN_EPSILON {
            0.0
        } else if (r - 1.0).abs() < T_PIN_EPSILON {
            1.0
        } else {
            r
        };
        if !(0.0..=1.0).contains(&t) || out.contains(&t) {
            continue;
        }
        out.push(t);
    }
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Refines a root of `f` near `t` by bisection when `f(t)` is not already
/// close enough to zero. Returns `t` unchanged when no sign change brackets
/// it.
pub fn bisect_refine<F: Fn(f64) -> f64>(f: F, t: f64, tolerance: f64, iterations: usize) -> f64 {
    let ft = f(t);
    if ft.abs() <= tolerance {
        return t;
    }
    let mut step = 1.0 / 256.0;
    while step > 1e-12 {
        let (lo, hi) = ((t - step).max(0.0), (t + step).min(1.0));
        let (flo, fhi) = (f(lo), f(hi));
        let bracket = if flo.signum() != ft.signum() {
            Some((lo, t, flo))
        } else if fhi.signum() != ft.signum() {
            Some((t, hi, ft))
        } else {
            None
        };
        if let Some((mut a, mut b, mut fa)) = bracket {
            for _ in 0..iterations {
                let mid = 0.5 * (a + b);
                let fm = f(mid);
                if fm == 0.0 {
                    return mid;
                }
                if fm.signum() == fa.signum() {
                    a = mid;
                    fa = fm;
                } else {
                    b = mid;
                }
            }
            return 0.5 * (a + b);
        }
        step *= 0.125;
    }
    t
}
