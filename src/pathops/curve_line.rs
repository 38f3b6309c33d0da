// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Curve/segment intersection.
//
// The curve's control points are measured against the segment's line (the
// cross product with its direction), which turns the problem into one
// polynomial in t. Its roots are refined by bisection when the curve point
// they evaluate to strays from the line, then matched to a parameter on the
// segment.

use super::curve::Curve;
use super::intersections::Intersections;
use super::line::{exactly_on, nearly_on, project_t};
use super::roots::{bisect_refine, cubic_roots, quad_roots, unit_roots, Roots};
use super::types::DPoint;
use crate::consts::{BISECTION_ITERATIONS, FLT_EPSILON, ROUGH_EPSILON};

/// Roots in [0, 1] of the curve's signed distance polynomial, where `r` are
/// the control points' distances.
fn distance_roots(curve: &Curve, r: &[f64]) -> Roots {
    let raw = match curve {
        Curve::Line(_) => {
            let d = r[1] - r[0];
            let mut roots = Roots::new();
            if d != 0.0 {
                roots.push(-r[0] / d);
            }
            roots
        }
        Curve::Quad(_) => quad_roots(r[0] - 2.0 * r[1] + r[2], 2.0 * (r[1] - r[0]), r[0]),
        Curve::Conic(_, w) => {
            // Numerator of the rational distance; the denominator is positive.
            quad_roots(r[0] - 2.0 * w * r[1] + r[2], 2.0 * (w * r[1] - r[0]), r[0])
        }
        Curve::Cubic(_) => cubic_roots(
            -r[0] + 3.0 * r[1] - 3.0 * r[2] + r[3],
            3.0 * r[0] - 6.0 * r[1] + 3.0 * r[2],
            -3.0 * r[0] + 3.0 * r[1],
            r[0],
        ),
    };
    unit_roots(&raw)
}

/// Parameter at which `curve` passes through `p`, if it does within the
/// rough tolerance.
pub(crate) fn find_t(curve: &Curve, p: DPoint) -> Option<f64> {
    let bounds = curve.hull_bounds();
    let use_x = bounds.width() >= bounds.height();
    let r: Vec<f64> = curve
        .points()
        .iter()
        .map(|q| if use_x { q.x - p.x } else { q.y - p.y })
        .collect();
    let mut candidates = distance_roots(curve, &r);
    if r.iter().all(|&d| d == 0.0) {
        candidates.push(0.0);
    }
    candidates
        .into_iter()
        .map(|t| (t, curve.point_at(t).distance_sq(p)))
        .filter(|&(t, _)| curve.point_at(t).roughly_equal(p))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}

fn insert_exact_ends(curve: &Curve, line: &[DPoint; 2], out: &mut Intersections) {
    for (tc, pc) in [(0.0, curve.start()), (1.0, curve.end())] {
        if let Some(tl) = exactly_on(line, pc) {
            out.insert(tc, tl, pc);
        }
    }
}

fn insert_near_ends(curve: &Curve, line: &[DPoint; 2], out: &mut Intersections) {
    for (tc, pc) in [(0.0, curve.start()), (1.0, curve.end())] {
        if let Some(tl) = nearly_on(line, pc) {
            out.insert(tc, tl, pc);
        }
    }
    for (tl, pl) in [(0.0, line[0]), (1.0, line[1])] {
        for (tc, pc) in [(0.0, curve.start()), (1.0, curve.end())] {
            if pl.roughly_equal(pc) {
                out.insert(tc, tl, pc);
            }
        }
    }
}

/// Intersects `curve` with the segment `line`. The first parameter of each
/// result is on the curve.
pub fn curve_line(curve: &Curve, line: &[DPoint; 2], out: &mut Intersections) {
    insert_exact_ends(curve, line, out);
    if out.allow_near() {
        insert_near_ends(curve, line, out);
    }
    let dir = line[1] - line[0];
    let len = dir.length();
    if len == 0.0 {
        return;
    }
    let dist = |p: DPoint| dir.cross(p - line[0]) / len;
    let r: Vec<f64> = curve.points().iter().map(|&p| dist(p)).collect();
    if r.iter().all(|&d| d == 0.0) {
        // The curve lies along the line; only its ends are well defined.
        for (tc, pc) in [(0.0, curve.start()), (1.0, curve.end())] {
            let tl = project_t(line, pc);
            if (0.0..=1.0).contains(&tl) {
                out.insert(tc, tl, pc);
            }
        }
        for (tl, pl) in [(0.0, line[0]), (1.0, line[1])] {
            if let Some(tc) = find_t(curve, pl) {
                out.insert(tc, tl, pl);
            }
        }
        if out.len() > 1 {
            out.set_coincident();
        }
        return;
    }
    let scale = curve.hull_bounds().magnitude().max(1.0);
    let tolerance = FLT_EPSILON * scale;
    for t in distance_roots(curve, &r) {
        let t = bisect_refine(|t| dist(curve.point_at(t)), t, tolerance, BISECTION_ITERATIONS);
        let mut pt = curve.point_at(t);
        let mut tl = project_t(line, pt);
        if !(-ROUGH_EPSILON..=1.0 + ROUGH_EPSILON).contains(&tl) {
            continue;
        }
        tl = tl.clamp(0.0, 1.0);
        // Snap onto the segment's ends so shared points stay exact.
        for (end_t, end_p) in [(0.0, line[0]), (1.0, line[1])] {
            if pt.approximately_equal(end_p) {
                tl = end_t;
                pt = end_p;
            }
        }
        let mut tc = t;
        for (end_t, end_p) in [(0.0, curve.start()), (1.0, curve.end())] {
            if pt.approximately_equal(end_p) {
                tc = end_t;
                pt = end_p;
            }
        }
        out.insert(tc, tl, pt);
    }
}

/// Intersects `curve` with the horizontal span from `left` to `right` at
/// `y`. The second parameter runs from `left` to `right`, or back when
/// `flipped`.
pub fn horizontal(curve: &Curve, left: f64, right: f64, y: f64, flipped: bool) -> Intersections {
    let mut out = Intersections::new();
    curve_line(curve, &[DPoint::new(left, y), DPoint::new(right, y)], &mut out);
    if flipped {
        out.flip_second();
    }
    out
}

/// Intersects `curve` with the vertical span from `top` to `bottom` at `x`.
pub fn vertical(curve: &Curve, top: f64, bottom: f64, x: f64, flipped: bool) -> Intersections {
    let mut out = Intersections::new();
    curve_line(curve, &[DPoint::new(x, top), DPoint::new(x, bottom)], &mut out);
    if flipped {
        out.flip_second();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> DPoint {
        DPoint::new(x, y)
    }

    #[test]
    fn quad_crosses_line_twice() {
        let q = Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]);
        let out = horizontal(&q, -1.0, 5.0, 1.0, false);
        assert_eq!(out.len(), 2);
        for e in out.iter() {
            assert_relative_eq!(e.pt.y, 1.0, epsilon = 1e-9);
            assert_relative_eq!(q.point_at(e.t[0]).y, 1.0, epsilon = 1e-9);
        }
        assert!(out.get(0).map(|e| e.t[0]) < out.get(1).map(|e| e.t[0]));
    }

    #[test]
    fn cubic_crosses_line_three_times() {
        let c = Curve::Cubic([pt(0.0, 0.0), pt(1.0, 4.0), pt(2.0, -4.0), pt(3.0, 0.0)]);
        let out = horizontal(&c, -1.0, 4.0, 0.0, false);
        // Both ends plus the inflection crossing.
        assert_eq!(out.len(), 3);
        assert_eq!(out.get(0).map(|e| e.t[0]), Some(0.0));
        assert_eq!(out.get(2).map(|e| e.t[0]), Some(1.0));
        assert_relative_eq!(out.get(1).map(|e| e.t[0]).unwrap_or(0.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn conic_meets_diagonal_on_circle() {
        let arc = Curve::Conic([pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)], std::f64::consts::FRAC_1_SQRT_2);
        let mut out = Intersections::new();
        curve_line(&arc, &[pt(0.0, 0.0), pt(2.0, 2.0)], &mut out);
        assert_eq!(out.len(), 1);
        let e = out.get(0).copied().unwrap();
        assert_relative_eq!(e.pt.x, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
        assert_relative_eq!(e.t[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn end_on_segment_is_exact() {
        let q = Curve::Quad([pt(0.0, 0.0), pt(1.0, 2.0), pt(2.0, 1.0)]);
        let mut out = Intersections::new();
        curve_line(&q, &[pt(2.0, 0.0), pt(2.0, 3.0)], &mut out);
        assert!(out.iter().any(|e| e.t[0] == 1.0));
    }

    #[test]
    fn vertical_misses_outside_span() {
        let q = Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]);
        assert!(vertical(&q, 5.0, 9.0, 2.0, false).is_empty());
        assert_eq!(vertical(&q, 0.0, 9.0, 2.0, false).len(), 1);
    }
}
