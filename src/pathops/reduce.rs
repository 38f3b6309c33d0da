// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Lowers a curve to the smallest degree that traces the same points, so the
// solvers never run a cubic on what is really a line.

use super::curve::Curve;
use super::types::DPoint;
use crate::consts::COLLINEAR_EPSILON;

/// A curve at its lowest faithful degree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reduced {
    Point(DPoint),
    Line([DPoint; 2]),
    Quad([DPoint; 3]),
    Conic([DPoint; 3], f64),
    Cubic([DPoint; 4]),
}

impl Reduced {
    /// Number of control points minus one; zero for a point.
    pub fn order(&self) -> usize {
        match self {
            Reduced::Point(_) => 0,
            Reduced::Line(_) => 1,
            Reduced::Quad(_) | Reduced::Conic(..) => 2,
            Reduced::Cubic(_) => 3,
        }
    }

    /// The reduction as a curve. A point becomes a zero-length line.
    pub fn to_curve(&self) -> Curve {
        match *self {
            Reduced::Point(p) => Curve::Line([p, p]),
            Reduced::Line(p) => Curve::Line(p),
            Reduced::Quad(p) => Curve::Quad(p),
            Reduced::Conic(p, w) => Curve::Conic(p, w),
            Reduced::Cubic(p) => Curve::Cubic(p),
        }
    }
}

fn all_equal(pts: &[DPoint]) -> bool {
    pts.iter().all(|p| p.approximately_equal(pts[0]))
}

/// Whether the interior control points sit on the chord and between its
/// ends, so the curve retraces nothing.
fn is_monotone_line(pts: &[DPoint]) -> bool {
    let (s, e) = (pts[0], pts[pts.len() - 1]);
    let chord = e - s;
    let len_sq = chord.length_sq();
    if len_sq == 0.0 {
        return false;
    }
    let scale = pts.iter().fold(1.0f64, |m, p| m.max(p.magnitude()));
    let len = len_sq.sqrt();
    pts[1..pts.len() - 1].iter().all(|&p| {
        let v = p - s;
        let along = v.dot(chord);
        (chord.cross(v) / len).abs() <= COLLINEAR_EPSILON * scale && along >= 0.0 && along <= len_sq
    })
}

fn reduce_quad(p: [DPoint; 3]) -> Reduced {
    if all_equal(&p) {
        Reduced::Point(p[0])
    } else if is_monotone_line(&p) {
        Reduced::Line([p[0], p[2]])
    } else {
        Reduced::Quad(p)
    }
}

/// Reduces `curve`. Applying it to its own result changes nothing, and the
/// start and end points keep their order.
pub fn reduce(curve: &Curve) -> Reduced {
    match *curve {
        Curve::Line(p) => {
            if p[0].approximately_equal(p[1]) {
                Reduced::Point(p[0])
            } else {
                Reduced::Line(p)
            }
        }
        Curve::Quad(p) => reduce_quad(p),
        Curve::Conic(p, w) => {
            if (w - 1.0).abs() <= COLLINEAR_EPSILON {
                reduce_quad(p)
            } else if all_equal(&p) {
                Reduced::Point(p[0])
            } else if is_monotone_line(&p) {
                Reduced::Line([p[0], p[2]])
            } else {
                Reduced::Conic(p, w)
            }
        }
        Curve::Cubic(p) => {
            if all_equal(&p) {
                return Reduced::Point(p[0]);
            }
            if is_monotone_line(&p) {
                return Reduced::Line([p[0], p[3]]);
            }
            // A degree-elevated quadratic implies the same control point from
            // either end.
            let from_start = (p[1] * 3.0 - p[0]) * 0.5;
            let from_end = (p[2] * 3.0 - p[3]) * 0.5;
            if from_start.approximately_equal(from_end) {
                let ctrl = (from_start + from_end) * 0.5;
                return reduce_quad([p[0], ctrl, p[3]]);
            }
            Reduced::Cubic(p)
        }
    }
}

/// Whether reducing `curve` keeps its parameterization, so a `t` found on
/// the reduction is valid on the original.
pub(crate) fn keeps_parameter(curve: &Curve, reduced: &Reduced) -> bool {
    match (curve, reduced) {
        (_, Reduced::Point(_)) => false,
        (Curve::Line(_), _) => true,
        (Curve::Quad(_), Reduced::Quad(_)) | (Curve::Conic(..), Reduced::Conic(..)) => true,
        (Curve::Conic(..), Reduced::Quad(_)) => true,
        (Curve::Cubic(_), Reduced::Cubic(_)) | (Curve::Cubic(_), Reduced::Quad(_)) => true,
        _ => false,
    }
}
