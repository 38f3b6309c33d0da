// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Parametric curves of degree one to three, plus rational quadratics.
//
// Evaluation and splitting run de Casteljau in homogeneous coordinates so
// conics share the code path; polynomial curves simply carry weight one.

use super::types::{DPoint, DRect};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Curve {
    Line([DPoint; 2]),
    Quad([DPoint; 3]),
    /// Rational quadratic with the middle weight; the ends weigh one.
    Conic([DPoint; 3], f64),
    Cubic([DPoint; 4]),
}

type HPoint = [f64; 3];

fn lerp_h(a: HPoint, b: HPoint, t: f64) -> HPoint {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Splits at `t`, returning the control points of [0, t] and [t, 1].
fn split_h<const N: usize>(pts: [HPoint; N], t: f64) -> ([HPoint; N], [HPoint; N]) {
    let mut left = pts;
    let mut right = pts;
    let mut level = pts;
    left[0] = level[0];
    right[N - 1] = level[N - 1];
    for i in 1..N {
        for j in 0..N - i {
            level[j] = lerp_h(level[j], level[j + 1], t);
        }
        left[i] = level[0];
        right[N - 1 - i] = level[N - 1 - i];
    }
    (left, right)
}

fn sub_range_h<const N: usize>(pts: [HPoint; N], t0: f64, t1: f64) -> [HPoint; N] {
    let (head, _) = split_h(pts, t1);
    if t1 == 0.0 {
        return head;
    }
    let (_, piece) = split_h(head, t0 / t1);
    piece
}

fn eval_h<const N: usize>(pts: [HPoint; N], t: f64) -> DPoint {
    let mut level = pts;
    for i in 1..N {
        for j in 0..N - i {
            level[j] = lerp_h(level[j], level[j + 1], t);
        }
    }
    let p = level[0];
    DPoint::new(p[0] / p[2], p[1] / p[2])
}

fn to_h<const N: usize>(pts: &[DPoint; N]) -> [HPoint; N] {
    pts.map(|p| [p.x, p.y, 1.0])
}

fn from_h<const N: usize>(pts: [HPoint; N]) -> [DPoint; N] {
    pts.map(|p| DPoint::new(p[0] / p[2], p[1] / p[2]))
}

impl Curve {
    pub fn points(&self) -> &[DPoint] {
        match self {
            Curve::Line(p) => p,
            Curve::Quad(p) | Curve::Conic(p, _) => p,
            Curve::Cubic(p) => p,
        }
    }

    pub fn degree(&self) -> usize {
        self.points().len() - 1
    }

    #[inline]
    pub fn start(&self) -> DPoint {
        self.points()[0]
    }

    #[inline]
    pub fn end(&self) -> DPoint {
        let pts = self.points();
        pts[pts.len() - 1]
    }

    pub fn point_at(&self, t: f64) -> DPoint {
        if t == 0.0 {
            return self.start();
        }
        if t == 1.0 {
            return self.end();
        }
        match self {
            Curve::Line(p) => eval_h(to_h(p), t),
            Curve::Quad(p) => eval_h(to_h(p), t),
            Curve::Conic(p, w) => eval_h(conic_h(p, *w), t),
            Curve::Cubic(p) => eval_h(to_h(p), t),
        }
    }

    /// First derivative with respect to `t`.
    pub fn derivative_at(&self, t: f64) -> DPoint {
        match self {
            Curve::Line(p) => p[1] - p[0],
            Curve::Quad(p) => {
                let a = p[1] - p[0];
                let b = p[2] - p[1];
                (a + (b - a) * t) * 2.0
            }
            Curve::Conic(p, w) => {
                // Quotient rule on N(t) / D(t).
                let hp = conic_h(p, *w);
                let n = |i: usize, t: f64| {
                    let (a, b, c) = (hp[0][i], hp[1][i], hp[2][i]);
                    let mt = 1.0 - t;
                    (mt * mt * a + 2.0 * mt * t * b + t * t * c, 2.0 * (mt * (b - a) + t * (c - b)))
                };
                let (x, dx) = n(0, t);
                let (y, dy) = n(1, t);
                let (d, dd) = n(2, t);
                DPoint::new((dx * d - x * dd) / (d * d), (dy * d - y * dd) / (d * d))
            }
            Curve::Cubic(p) => {
                let a = p[1] - p[0];
                let b = p[2] - p[1];
                let c = p[3] - p[2];
                let mt = 1.0 - t;
                (a * (mt * mt) + b * (2.0 * mt * t) + c * (t * t)) * 3.0
            }
        }
    }

    /// The piece of the curve between `t0` and `t1`, reparameterized to
    /// [0, 1].
    pub fn sub_range(&self, t0: f64, t1: f64) -> Curve {
        match self {
            Curve::Line(_) => Curve::Line([self.point_at(t0), self.point_at(t1)]),
            Curve::Quad(p) => Curve::Quad(from_h(sub_range_h(to_h(p), t0, t1))),
            Curve::Conic(p, w) => {
                let h = sub_range_h(conic_h(p, *w), t0, t1);
                // Rescale so both end weights are one again.
                let (w0, w1, w2) = (h[0][2], h[1][2], h[2][2]);
                let w = w1 / (w0 * w2).sqrt();
                Curve::Conic(from_h(h), w)
            }
            Curve::Cubic(p) => Curve::Cubic(from_h(sub_range_h(to_h(p), t0, t1))),
        }
    }

    /// Bounds of the control polygon, which contain the curve.
    pub fn hull_bounds(&self) -> DRect {
        DRect::from_points(self.points())
    }

    /// Largest distance from an interior control point to the chord.
    pub fn flatness(&self) -> f64 {
        let (s, e) = (self.start(), self.end());
        let chord = e - s;
        let len = chord.length();
        let pts = self.points();
        pts[1..pts.len() - 1]
            .iter()
            .map(|&p| {
                if len == 0.0 {
                    p.distance_sq(s).sqrt()
                } else {
                    (chord.cross(p - s) / len).abs()
                }
            })
            .fold(0.0, f64::max)
    }

    pub fn reversed(&self) -> Curve {
        match *self {
            Curve::Line([a, b]) => Curve::Line([b, a]),
            Curve::Quad([a, b, c]) => Curve::Quad([c, b, a]),
            Curve::Conic([a, b, c], w) => Curve::Conic([c, b, a], w),
            Curve::Cubic([a, b, c, d]) => Curve::Cubic([d, c, b, a]),
        }
    }

    /// Whether every control point is finite.
    pub fn is_finite(&self) -> bool {
        let weight_ok = match self {
            Curve::Conic(_, w) => w.is_finite(),
            _ => true,
        };
        weight_ok && self.points().iter().all(|p| p.is_finite())
    }
}

fn conic_h(p: &[DPoint; 3], w: f64) -> [HPoint; 3] {
    [[p[0].x, p[0].y, 1.0], [p[1].x * w, p[1].y * w, w], [p[2].x, p[2].y, 1.0]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarter_circle() -> Curve {
        Curve::Conic(
            [DPoint::new(1.0, 0.0), DPoint::new(1.0, 1.0), DPoint::new(0.0, 1.0)],
            std::f64::consts::FRAC_1_SQRT_2,
        )
    }

    #[test]
    fn conic_points_lie_on_circle() {
        let c = quarter_circle();
        for i in 0..=8 {
            let p = c.point_at(i as f64 / 8.0);
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-12);
        }
        let mid = c.point_at(0.5);
        assert_relative_eq!(mid.x, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn sub_range_matches_evaluation() {
        let cubic = Curve::Cubic([
            DPoint::new(0.0, 0.0),
            DPoint::new(1.0, 3.0),
            DPoint::new(4.0, -2.0),
            DPoint::new(5.0, 1.0),
        ]);
        let piece = cubic.sub_range(0.25, 0.75);
        for i in 0..=4 {
            let s = i as f64 / 4.0;
            let p = piece.point_at(s);
            let q = cubic.point_at(0.25 + 0.5 * s);
            assert_relative_eq!(p.x, q.x, epsilon = 1e-12);
            assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
        }
        let arc = quarter_circle().sub_range(0.2, 0.6);
        for i in 0..=4 {
            assert_relative_eq!(arc.point_at(i as f64 / 4.0).length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let curves = [
            quarter_circle(),
            Curve::Quad([DPoint::new(0.0, 0.0), DPoint::new(2.0, 4.0), DPoint::new(4.0, 0.0)]),
            Curve::Cubic([
                DPoint::new(0.0, 0.0),
                DPoint::new(1.0, 3.0),
                DPoint::new(4.0, -2.0),
                DPoint::new(5.0, 1.0),
            ]),
        ];
        let h = 1e-6;
        for c in &curves {
            let d = c.derivative_at(0.4);
            let fd = (c.point_at(0.4 + h) - c.point_at(0.4 - h)) * (0.5 / h);
            assert_relative_eq!(d.x, fd.x, epsilon = 1e-4);
            assert_relative_eq!(d.y, fd.y, epsilon = 1e-4);
        }
    }
}
