// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Segment/segment intersection.

use super::intersections::Intersections;
use super::types::{approximately_zero_when_compared_to, DPoint};
use crate::consts::ROUGH_EPSILON;

/// Parameter of the projection of `p` onto segment `l`, unclamped.
pub(crate) fn project_t(l: &[DPoint; 2], p: DPoint) -> f64 {
    let d = l[1] - l[0];
    let len_sq = d.length_sq();
    if len_sq == 0.0 {
        0.0
    } else {
        (p - l[0]).dot(d) / len_sq
    }
}

/// Whether `p` lies exactly on segment `l`.
pub(crate) fn exactly_on(l: &[DPoint; 2], p: DPoint) -> Option<f64> {
    let d = l[1] - l[0];
    if (p - l[0]).cross(d) != 0.0 {
        return None;
    }
    let t = project_t(l, p);
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Whether `p` lies on segment `l` within the rough tolerance.
pub(crate) fn nearly_on(l: &[DPoint; 2], p: DPoint) -> Option<f64> {
    let t = project_t(l, p).clamp(0.0, 1.0);
    let q = l[0].lerp(l[1], t);
    q.roughly_equal(p).then_some(t)
}

fn insert_shared_ends(a: &[DPoint; 2], b: &[DPoint; 2], out: &mut Intersections) {
    for (ia, &pa) in a.iter().enumerate() {
        for (ib, &pb) in b.iter().enumerate() {
            if pa == pb {
                out.insert(ia as f64, ib as f64, pa);
            }
        }
    }
}

/// Intersects two segments. Collinear overlapping segments report the ends
/// of the overlap and raise the coincident flag.
pub fn line_line(a: &[DPoint; 2], b: &[DPoint; 2], out: &mut Intersections) {
    insert_shared_ends(a, b, out);
    let da = a[1] - a[0];
    let db = b[1] - b[0];
    let ab = b[0] - a[0];
    let denom = da.cross(db);
    let scale = da.length() * db.length();
    if approximately_zero_when_compared_to(denom, scale) {
        // Parallel; overlapping when b's start is on a's line.
        let off = ab.cross(da);
        if !approximately_zero_when_compared_to(off, ab.length() * da.length()) && off != 0.0 {
            return;
        }
        let mut found = false;
        for (ib, &pb) in b.iter().enumerate() {
            let ta = project_t(a, pb);
            if (0.0..=1.0).contains(&ta) {
                found |= out.insert(ta, ib as f64, pb).is_some();
            }
        }
        for (ia, &pa) in a.iter().enumerate() {
            let tb = project_t(b, pa);
            if (0.0..=1.0).contains(&tb) {
                found |= out.insert(ia as f64, tb, pa).is_some();
            }
        }
        if found && out.len() > 1 {
            out.set_coincident();
        }
        return;
    }
    let ta = ab.cross(db) / denom;
    let tb = ab.cross(da) / denom;
    let slop = ROUGH_EPSILON;
    if (-slop..=1.0 + slop).contains(&ta) && (-slop..=1.0 + slop).contains(&tb) {
        let (ta, tb) = (ta.clamp(0.0, 1.0), tb.clamp(0.0, 1.0));
        let pt = if ta == 0.0 || ta == 1.0 {
            a[ta as usize]
        } else if tb == 0.0 || tb == 1.0 {
            b[tb as usize]
        } else {
            a[0].lerp(a[1], ta)
        };
        out.insert(ta, tb, pt);
    }
    if out.allow_near() {
        for (ia, &pa) in a.iter().enumerate() {
            if let Some(tb) = nearly_on(b, pa) {
                out.insert(ia as f64, tb, pa);
            }
        }
        for (ib, &pb) in b.iter().enumerate() {
            if let Some(ta) = nearly_on(a, pb) {
                out.insert(ta, ib as f64, pb);
            }
        }
    }
}

/// Intersects a segment with the horizontal span from `left` to `right` at
/// `y`. The second parameter runs from `left` to `right`, or back when
/// `flipped`.
pub fn horizontal_line(l: &[DPoint; 2], left: f64, right: f64, y: f64, flipped: bool) -> Intersections {
    let mut out = Intersections::new();
    line_line(l, &[DPoint::new(left, y), DPoint::new(right, y)], &mut out);
    if flipped {
        out.flip_second();
    }
    out
}

/// Intersects a segment with the vertical span from `top` to `bottom` at `x`.
pub fn vertical_line(l: &[DPoint; 2], top: f64, bottom: f64, x: f64, flipped: bool) -> Intersections {
    let mut out = Intersections::new();
    line_line(l, &[DPoint::new(x, top), DPoint::new(x, bottom)], &mut out);
    if flipped {
        out.flip_second();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> [DPoint; 2] {
        [DPoint::new(x0, y0), DPoint::new(x1, y1)]
    }

    #[test]
    fn crossing_segments() {
        let mut out = Intersections::new();
        line_line(&seg(0.0, 0.0, 4.0, 4.0), &seg(0.0, 4.0, 4.0, 0.0), &mut out);
        assert_eq!(out.len(), 1);
        let e = out.get(0).copied().unwrap();
        assert_relative_eq!(e.t[0], 0.5);
        assert_relative_eq!(e.t[1], 0.5);
        assert_relative_eq!(e.pt.x, 2.0);
    }

    #[test]
    fn disjoint_and_parallel_segments() {
        let mut out = Intersections::new();
        line_line(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0), &mut out);
        assert!(out.is_empty() && !out.is_coincident());
        line_line(&seg(0.0, 0.0, 1.0, 1.0), &seg(3.0, 0.0, 2.0, 1.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn overlapping_segments_are_coincident() {
        let mut out = Intersections::new();
        line_line(&seg(0.0, 0.0, 4.0, 0.0), &seg(2.0, 0.0, 6.0, 0.0), &mut out);
        assert!(out.is_coincident());
        let ts: Vec<[f64; 2]> = out.iter().map(|e| e.t).collect();
        assert_eq!(ts, vec![[0.5, 0.0], [1.0, 0.5]]);
    }

    #[test]
    fn shared_endpoint_is_exact() {
        let mut out = Intersections::new();
        line_line(&seg(0.0, 0.0, 1.0, 3.0), &seg(1.0, 3.0, 5.0, -1.0), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0).map(|e| e.t), Some([1.0, 0.0]));
    }

    #[test]
    fn horizontal_span_flips() {
        let out = horizontal_line(&seg(1.0, 0.0, 1.0, 4.0), 0.0, 4.0, 1.0, true);
        let e = out.get(0).copied().unwrap();
        assert_relative_eq!(e.t[0], 0.25);
        assert_relative_eq!(e.t[1], 0.75);
    }
}
