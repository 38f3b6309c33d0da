// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Geometry kernel: degree reduction and intersection of lines, quadratics,
// conics and cubics in double precision.

mod curve;
mod curve_curve;
mod curve_line;
mod intersections;
mod line;
mod reduce;
mod roots;
mod types;

use std::cmp::Ordering;

pub use curve::Curve;
pub use curve_curve::curve_curve;
pub use curve_line::{curve_line, horizontal, vertical};
pub use intersections::{Intersection, Intersections};
pub use line::{horizontal_line, line_line, vertical_line};
pub use reduce::{reduce, Reduced};
pub use roots::{cubic_roots, quad_roots, unit_roots, Roots};
pub use types::{DPoint, DRect};

pub(crate) use curve_line::find_t;
use reduce::keeps_parameter;

/// Total order on curves so a pair is always solved the same way round.
fn canonical_order(a: &Curve, b: &Curve) -> Ordering {
    a.degree().cmp(&b.degree()).then_with(|| {
        a.points()
            .iter()
            .zip(b.points())
            .map(|(p, q)| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Intersects two curves of any kind. The first parameter of each result is
/// on `a`; swapping the arguments swaps the parameters and nothing else.
pub fn intersect(a: &Curve, b: &Curve) -> Intersections {
    if canonical_order(a, b) == Ordering::Greater {
        let mut out = intersect_ordered(b, a);
        out.swap_sides();
        out
    } else {
        intersect_ordered(a, b)
    }
}

fn intersect_ordered(a: &Curve, b: &Curve) -> Intersections {
    let mut out = Intersections::new();
    if !a.is_finite() || !b.is_finite() {
        return out;
    }
    let (ra, rb) = (reduce(a), reduce(b));
    match (ra, rb) {
        (Reduced::Point(p), Reduced::Point(q)) => {
            if p.approximately_equal(q) {
                out.insert(0.0, 0.0, p);
            }
            return out;
        }
        (Reduced::Point(p), _) => {
            if let Some(t) = find_t(b, p) {
                out.insert(0.0, t, p);
            }
            return out;
        }
        (_, Reduced::Point(q)) => {
            if let Some(t) = find_t(a, q) {
                out.insert(t, 0.0, q);
            }
            return out;
        }
        (Reduced::Line(la), Reduced::Line(lb)) => line_line(&la, &lb, &mut out),
        (Reduced::Line(la), _) => {
            curve_line(&rb.to_curve(), &la, &mut out);
            out.swap_sides();
        }
        (_, Reduced::Line(lb)) => curve_line(&ra.to_curve(), &lb, &mut out),
        _ => curve_curve(&ra.to_curve(), &rb.to_curve(), &mut out),
    }
    // Parameters found on a lowered curve are re-solved on the original.
    if !keeps_parameter(a, &ra) {
        out.remap(0, |e| find_t(a, e.pt));
    }
    if !keeps_parameter(b, &rb) {
        out.remap(1, |e| find_t(b, e.pt));
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

    fn params(i: &Intersections) -> Vec<[f64; 2]> {
        i.iter().map(|e| e.t).collect()
    }

    #[test]
    fn swapping_arguments_swaps_parameters() {
        let pairs = [
            (
                Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]),
                Curve::Line([pt(-1.0, 1.0), pt(5.0, 1.0)]),
            ),
            (
                Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]),
                Curve::Quad([pt(0.0, 3.0), pt(2.0, -1.0), pt(4.0, 3.0)]),
            ),
            (
                Curve::Cubic([pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0), pt(1.0, 1.0)]),
                Curve::Conic([pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)], std::f64::consts::FRAC_1_SQRT_2),
            ),
        ];
        for (a, b) in &pairs {
            let ab = intersect(a, b);
            let mut ba = intersect(b, a);
            assert!(!ab.is_empty());
            ba.swap_sides();
            assert_eq!(params(&ab), params(&ba));
        }
    }

    #[test]
    fn results_lie_on_both_curves() {
        let a = Curve::Cubic([pt(0.0, 2.0), pt(3.0, -2.0), pt(1.0, 5.0), pt(4.0, 1.0)]);
        let b = Curve::Quad([pt(0.0, 0.0), pt(2.0, 6.0), pt(4.0, 0.0)]);
        let out = intersect(&a, &b);
        assert!(!out.is_empty());
        for e in out.iter() {
            let (p, q) = (a.point_at(e.t[0]), b.point_at(e.t[1]));
            assert_relative_eq!(p.x, q.x, epsilon = 1e-7);
            assert_relative_eq!(p.y, q.y, epsilon = 1e-7);
        }
    }

    #[test]
    fn lowered_cubic_reports_its_own_parameter() {
        // Collinear but unevenly spaced, so the line's parameter differs.
        let c = Curve::Cubic([pt(0.0, 0.0), pt(2.0, 2.0), pt(2.5, 2.5), pt(3.0, 3.0)]);
        let l = Curve::Line([pt(1.5, -1.0), pt(1.5, 5.0)]);
        let out = intersect(&c, &l);
        assert_eq!(out.len(), 1);
        let e = out.get(0).copied().unwrap();
        let p = c.point_at(e.t[0]);
        assert_relative_eq!(p.x, 1.5, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.5, epsilon = 1e-6);
        assert!((e.t[0] - 0.5).abs() > 1e-3);
    }

    #[test]
    fn point_curve_is_found_on_the_other() {
        let dot = Curve::Line([pt(1.0, 1.0), pt(1.0, 1.0)]);
        let q = Curve::Quad([pt(0.0, 0.0), pt(1.0, 2.0), pt(2.0, 0.0)]);
        let out = intersect(&dot, &q);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out.get(0).map(|e| e.t[1]).unwrap_or(0.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn shared_endpoints_are_exact() {
        let a = Curve::Cubic([pt(0.0, 0.0), pt(1.0, 3.0), pt(2.0, -3.0), pt(3.0, 1.0)]);
        let b = Curve::Quad([pt(3.0, 1.0), pt(5.0, 4.0), pt(6.0, 0.0)]);
        let out = intersect(&a, &b);
        assert!(out.iter().any(|e| e.t == [1.0, 0.0] && e.pt == pt(3.0, 1.0)));
    }

    #[test]
    fn non_finite_input_yields_nothing() {
        let a = Curve::Line([pt(f64::NAN, 0.0), pt(1.0, 1.0)]);
        let b = Curve::Line([pt(0.0, 1.0), pt(1.0, 0.0)]);
        assert!(intersect(&a, &b).is_empty());
    }
}
