// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Curve/curve intersection by hull subdivision.
//
// Both curves are split until the pieces whose control hulls still overlap
// are flat enough to stand in for their chords. Chord crossings give
// starting parameters that Newton's method then polishes against the
// original curves, so subdividing a conic (whose pieces are not linear in
// the parent parameter) costs nothing in accuracy.

use super::curve::Curve;
use super::curve_line::find_t;
use super::intersections::Intersections;
use super::line::line_line;
use super::types::DPoint;
use crate::consts::{
    FLT_EPSILON, MAX_SUBDIVISION_DEPTH, MAX_SUBDIVISION_LEAVES, NEWTON_ITERATIONS, ROUGH_EPSILON,
    SUBDIVISION_T_SPAN,
};

#[derive(Copy, Clone)]
struct Span {
    curve: Curve,
    t0: f64,
    t1: f64,
}

impl Span {
    fn whole(curve: &Curve) -> Self {
        Span { curve: *curve, t0: 0.0, t1: 1.0 }
    }

    fn halves(&self, parent: &Curve) -> [Span; 2] {
        let mid = 0.5 * (self.t0 + self.t1);
        [
            Span { curve: parent.sub_range(self.t0, mid), t0: self.t0, t1: mid },
            Span { curve: parent.sub_range(mid, self.t1), t0: mid, t1: self.t1 },
        ]
    }

    #[inline]
    fn parent_t(&self, t: f64) -> f64 {
        self.t0 + (self.t1 - self.t0) * t
    }
}

struct Subdivider<'a> {
    a: &'a Curve,
    b: &'a Curve,
    slop: f64,
    flat: f64,
    leaves: usize,
    candidates: Vec<(f64, f64)>,
}

impl Subdivider<'_> {
    fn is_flat(&self, s: &Span) -> bool {
        s.t1 - s.t0 <= SUBDIVISION_T_SPAN || s.curve.flatness() <= self.flat
    }

    fn run(&mut self, sa: Span, sb: Span, depth: u32) {
        if self.leaves >= MAX_SUBDIVISION_LEAVES {
            return;
        }
        if !sa.curve.hull_bounds().intersects(&sb.curve.hull_bounds(), self.slop) {
            return;
        }
        let (a_flat, b_flat) = (self.is_flat(&sa), self.is_flat(&sb));
        if (a_flat && b_flat) || depth >= MAX_SUBDIVISION_DEPTH {
            self.leaves += 1;
            let mut chords = Intersections::allowing_near();
            line_line(
                &[sa.curve.start(), sa.curve.end()],
                &[sb.curve.start(), sb.curve.end()],
                &mut chords,
            );
            for e in chords.iter() {
                self.candidates.push((sa.parent_t(e.t[0]), sb.parent_t(e.t[1])));
            }
            return;
        }
        // Split whichever piece is still curved; both when both are.
        let a_parts = if a_flat { vec![sa] } else { sa.halves(self.a).to_vec() };
        let b_parts = if b_flat { vec![sb] } else { sb.halves(self.b).to_vec() };
        for pa in &a_parts {
            for pb in &b_parts {
                self.run(*pa, *pb, depth + 1);
            }
        }
    }
}

/// Newton's method on `a(s) - b(t) = 0`. Returns `None` when the iteration
/// stalls on parallel tangents without converging.
fn polish(a: &Curve, b: &Curve, mut s: f64, mut t: f64) -> Option<(f64, f64)> {
    for _ in 0..NEWTON_ITERATIONS {
        let f = a.point_at(s) - b.point_at(t);
        if f.x == 0.0 && f.y == 0.0 {
            break;
        }
        let c1 = a.derivative_at(s);
        let c2 = -b.derivative_at(t);
        let det = c1.cross(c2);
        if det == 0.0 || !det.is_finite() {
            break;
        }
        let r = -f;
        let ns = (s + r.cross(c2) / det).clamp(0.0, 1.0);
        let nt = (t + c1.cross(r) / det).clamp(0.0, 1.0);
        if ns == s && nt == t {
            break;
        }
        s = ns;
        t = nt;
    }
    a.point_at(s).roughly_equal(b.point_at(t)).then_some((s, t))
}

fn ends(c: &Curve) -> [(f64, DPoint); 2] {
    [(0.0, c.start()), (1.0, c.end())]
}

fn insert_end_hits(a: &Curve, b: &Curve, out: &mut Intersections) {
    for (ta, pa) in ends(a) {
        for (tb, pb) in ends(b) {
            if pa == pb {
                out.insert(ta, tb, pa);
            }
        }
    }
    for (ta, pa) in ends(a) {
        if let Some(tb) = find_t(b, pa) {
            out.insert(ta, tb, pa);
        }
    }
    for (tb, pb) in ends(b) {
        if let Some(ta) = find_t(a, pb) {
            out.insert(ta, tb, pb);
        }
    }
}

/// Whether `a` runs along `b` between the outermost hits found so far.
fn shares_stretch(a: &Curve, b: &Curve, out: &Intersections) -> bool {
    if out.len() < 2 {
        return false;
    }
    let (Some(first), Some(last)) = (out.get(0), out.get(out.len() - 1)) else {
        return false;
    };
    let (lo, hi) = (first.t[0], last.t[0]);
    if hi - lo <= ROUGH_EPSILON {
        return false;
    }
    (1..4).all(|k| {
        let p = a.point_at(lo + (hi - lo) * k as f64 / 4.0);
        find_t(b, p).is_some()
    })
}

fn snap_to_ends(c: &Curve, t: f64, pt: &mut DPoint) -> f64 {
    for (end_t, end_p) in ends(c) {
        if pt.approximately_equal(end_p) {
            *pt = end_p;
            return end_t;
        }
    }
    t
}

/// Intersects two curves of degree two or more. The first parameter of
/// each result is on `a`.
pub fn curve_curve(a: &Curve, b: &Curve, out: &mut Intersections) {
    insert_end_hits(a, b, out);
    if shares_stretch(a, b, out) {
        out.set_coincident();
        return;
    }
    let scale = a.hull_bounds().magnitude().max(b.hull_bounds().magnitude()).max(1.0);
    let mut sub = Subdivider {
        a,
        b,
        slop: ROUGH_EPSILON * scale,
        flat: FLT_EPSILON * scale,
        leaves: 0,
        candidates: Vec::new(),
    };
    sub.run(Span::whole(a), Span::whole(b), 0);
    if sub.leaves >= MAX_SUBDIVISION_LEAVES {
        log::debug!("curve/curve subdivision hit its leaf budget");
    }
    for (s, t) in sub.candidates {
        let Some((s, t)) = polish(a, b, s, t) else {
            continue;
        };
        let mut pt = a.point_at(s);
        let s = snap_to_ends(a, s, &mut pt);
        let t = snap_to_ends(b, t, &mut pt);
        out.insert(s, t, pt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> DPoint {
        DPoint::new(x, y)
    }

    #[test]
    fn crossing_quads_meet_twice() {
        let a = Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]);
        let b = Curve::Quad([pt(0.0, 3.0), pt(2.0, -1.0), pt(4.0, 3.0)]);
        let mut out = Intersections::new();
        curve_curve(&a, &b, &mut out);
        assert_eq!(out.len(), 2);
        for (e, want) in out.iter().zip([0.25, 0.75]) {
            assert_relative_eq!(e.t[0], want, epsilon = 1e-9);
            assert_relative_eq!(e.t[1], want, epsilon = 1e-9);
            assert_relative_eq!(e.pt.y, 1.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn cubic_crosses_circular_arc() {
        let arc = Curve::Conic([pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)], std::f64::consts::FRAC_1_SQRT_2);
        let s = Curve::Cubic([pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0), pt(1.0, 1.0)]);
        let mut out = Intersections::new();
        curve_curve(&s, &arc, &mut out);
        assert!(!out.is_empty());
        for e in out.iter() {
            let p = s.point_at(e.t[0]);
            let q = arc.point_at(e.t[1]);
            assert_relative_eq!(p.x, q.x, epsilon = 1e-9);
            assert_relative_eq!(p.y, q.y, epsilon = 1e-9);
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn shared_end_is_exact() {
        let a = Curve::Quad([pt(0.0, 0.0), pt(1.0, 2.0), pt(2.0, 0.0)]);
        let b = Curve::Cubic([pt(2.0, 0.0), pt(3.0, 1.0), pt(4.0, -1.0), pt(5.0, 0.0)]);
        let mut out = Intersections::new();
        curve_curve(&a, &b, &mut out);
        assert!(out.iter().any(|e| e.t == [1.0, 0.0] && e.pt == pt(2.0, 0.0)));
    }

    #[test]
    fn overlapping_pieces_are_coincident() {
        let a = Curve::Quad([pt(0.0, 0.0), pt(2.0, 4.0), pt(4.0, 0.0)]);
        let b = a.sub_range(0.25, 0.75);
        let mut out = Intersections::new();
        curve_curve(&a, &b, &mut out);
        assert!(out.is_coincident());
        assert_eq!(out.len(), 2);
        let first = out.get(0).copied().unwrap();
        let last = out.get(1).copied().unwrap();
        assert_relative_eq!(first.t[0], 0.25, epsilon = 1e-6);
        assert_eq!(first.t[1], 0.0);
        assert_relative_eq!(last.t[0], 0.75, epsilon = 1e-6);
        assert_eq!(last.t[1], 1.0);
    }

    #[test]
    fn distant_curves_miss() {
        let a = Curve::Quad([pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 0.0)]);
        let b = Curve::Quad([pt(0.0, 5.0), pt(1.0, 6.0), pt(2.0, 5.0)]);
        let mut out = Intersections::new();
        curve_curve(&a, &b, &mut out);
        assert!(out.is_empty());
    }
}
