// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Scalar geometry shared by every tessellation stage: points, rectangles,
// the implicit line used for sidedness tests, and the sweep comparator.
//
// Sidedness is evaluated in f64 on f32 inputs. The sweep relies on those
// tests giving the same answer every time they are asked.

use std::ops::{Add, Mul, Sub};

use crate::consts::{NEAR_PARALLEL, NEAR_ZERO_LIMIT};

pub type Real = f32;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn dot(&self, other: Point) -> Real {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn cross(&self, other: Point) -> Real {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_sqd(&self) -> Real {
        self.dot(*self)
    }

    #[inline]
    pub fn distance_sqd(&self, other: Point) -> Real {
        (*self - other).length_sqd()
    }

    #[inline]
    pub fn average(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Squared distance from `self` to the segment `a..b`.
    pub fn distance_to_segment_sqd(&self, a: Point, b: Point) -> Real {
        let u = b - a;
        let v = *self - a;
        let u_length_sqd = u.length_sqd();
        let u_dot_v = u.dot(v);
        if u_dot_v <= 0.0 {
            v.length_sqd()
        } else if u_dot_v > u_length_sqd {
            self.distance_sqd(b)
        } else {
            let det = u.cross(v);
            let temp = det / u_length_sqd * det;
            // Guard against cancellation producing a tiny negative value.
            if temp.is_finite() {
                temp.max(0.0)
            } else {
                temp
            }
        }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Real> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: Real) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle; `top < bottom` in device space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: Real,
    pub top: Real,
    pub right: Real,
    pub bottom: Real,
}

impl Rect {
    pub const fn from_ltrb(left: Real, top: Real, right: Real, bottom: Real) -> Self {
        Rect { left, top, right, bottom }
    }

    pub const fn from_wh(width: Real, height: Real) -> Self {
        Rect::from_ltrb(0.0, 0.0, width, height)
    }

    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut r = Rect::from_ltrb(first.x, first.y, first.x, first.y);
        for p in rest {
            r.left = r.left.min(p.x);
            r.top = r.top.min(p.y);
            r.right = r.right.max(p.x);
            r.bottom = r.bottom.max(p.y);
        }
        Some(r)
    }

    #[inline]
    pub fn width(&self) -> Real {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> Real {
        self.bottom - self.top
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Corners in clockwise order starting at the top left.
    pub fn to_quad(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }
}

// ───────────────────────────── Sweep order ─────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sweep left to right; used for paths wider than they are tall.
    Horizontal,
    /// Sweep top to bottom.
    Vertical,
}

#[inline]
pub fn sweep_lt_horiz(a: Point, b: Point) -> bool {
    a.x < b.x || (a.x == b.x && a.y > b.y)
}

#[inline]
pub fn sweep_lt_vert(a: Point, b: Point) -> bool {
    a.y < b.y || (a.y == b.y && a.x < b.x)
}

/// Total order on points along the sweep direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Comparator {
    pub direction: Direction,
}

impl Comparator {
    pub fn new(direction: Direction) -> Self {
        Comparator { direction }
    }

    /// Picks the sweep direction along the longer side of `bounds`.
    pub fn for_bounds(bounds: &Rect) -> Self {
        if bounds.width() > bounds.height() {
            Comparator::new(Direction::Horizontal)
        } else {
            Comparator::new(Direction::Vertical)
        }
    }

    #[inline]
    pub fn sweep_lt(&self, a: Point, b: Point) -> bool {
        match self.direction {
            Direction::Horizontal => sweep_lt_horiz(a, b),
            Direction::Vertical => sweep_lt_vert(a, b),
        }
    }

    /// Clamps `p` into the box spanned by `min` and `max`, where `min` sorts
    /// before `max` under this comparator.
    pub fn clamp(&self, p: Point, min: Point, max: Point) -> Point {
        match self.direction {
            // x is ordered; y is only ordered when the x values tie.
            Direction::Horizontal => Point::new(
                pin(p.x, min.x, max.x),
                if min.y < max.y {
                    pin(p.y, min.y, max.y)
                } else {
                    pin(p.y, max.y, min.y)
                },
            ),
            Direction::Vertical => Point::new(
                if min.x < max.x {
                    pin(p.x, min.x, max.x)
                } else {
                    pin(p.x, max.x, min.x)
                },
                pin(p.y, min.y, max.y),
            ),
        }
    }
}

/// `lo <= x <= hi` without the panics of `f32::clamp` on unordered bounds.
#[inline]
pub fn pin(x: Real, lo: Real, hi: Real) -> Real {
    lo.max(x.min(hi))
}

// ─────────────────────────── Scalar helpers ────────────────────────────────

/// Rounds to the nearest quarter pixel.
#[inline]
pub fn round_to_quarter_pixel(p: &mut Point) {
    p.x = (p.x * 4.0 + 0.5).floor() * 0.25;
    p.y = (p.y * 4.0 + 0.5).floor() * 0.25;
}

/// Converts to f32, flushing tiny magnitudes to zero and clamping to the
/// finite range. NaN stays NaN so sanitization can drop it.
#[inline]
pub fn double_to_clamped_scalar(d: f64) -> Real {
    const MAX_LIMIT: f64 = f32::MAX as f64;
    if d.is_nan() {
        return Real::NAN;
    }
    let d = if d.abs() < NEAR_ZERO_LIMIT { 0.0 } else { d };
    d.min(MAX_LIMIT).max(-MAX_LIMIT) as Real
}

/// Binary exponent of `x`, saturating magnitudes below one to zero.
#[inline]
pub fn saturated_exponent(x: Real) -> i32 {
    if x.abs() < 1.0 {
        0
    } else {
        ((x.to_bits() >> 23) & 0xff) as i32 - 127
    }
}

// ──────────────────────────────── Line ─────────────────────────────────────

/// Implicit line `a*x + b*y + c = 0` in double precision.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Line { a, b, c }
    }

    /// Line through `p` and `q`. For `q` below `p`, points with larger x than
    /// the line have positive distance.
    pub fn from_points(p: Point, q: Point) -> Self {
        Line {
            a: q.y as f64 - p.y as f64,
            b: p.x as f64 - q.x as f64,
            c: p.y as f64 * q.x as f64 - p.x as f64 * q.y as f64,
        }
    }

    #[inline]
    pub fn dist(&self, p: Point) -> f64 {
        self.a * p.x as f64 + self.b * p.y as f64 + self.c
    }

    #[inline]
    pub fn mag_sq(&self) -> f64 {
        self.a * self.a + self.b * self.b
    }

    pub fn normalize(&mut self) {
        let len = self.mag_sq().sqrt();
        if len == 0.0 {
            return;
        }
        let scale = 1.0 / len;
        self.a *= scale;
        self.b *= scale;
        self.c *= scale;
    }

    pub fn near_parallel(&self, other: &Line) -> bool {
        (other.a - self.a).abs() < NEAR_PARALLEL && (other.b - self.b).abs() < NEAR_PARALLEL
    }

    /// Intersection of two infinite lines, rounded to a quarter pixel.
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let denom = self.a * other.b - self.b * other.a;
        if denom == 0.0 {
            return None;
        }
        let scale = 1.0 / denom;
        let mut p = Point::new(
            double_to_clamped_scalar((self.b * other.c - other.b * self.c) * scale),
            double_to_clamped_scalar((other.a * self.c - self.a * other.c) * scale),
        );
        round_to_quarter_pixel(&mut p);
        if p.is_finite() {
            Some(p)
        } else {
            None
        }
    }
}

impl Mul<f64> for Line {
    type Output = Line;
    fn mul(self, v: f64) -> Line {
        Line::new(self.a * v, self.b * v, self.c * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_order_vertical_breaks_ties_on_x() {
        let c = Comparator::new(Direction::Vertical);
        assert!(c.sweep_lt(Point::new(5.0, 0.0), Point::new(0.0, 1.0)));
        assert!(c.sweep_lt(Point::new(0.0, 1.0), Point::new(1.0, 1.0)));
        assert!(!c.sweep_lt(Point::new(1.0, 1.0), Point::new(1.0, 1.0)));
    }

    #[test]
    fn sweep_order_horizontal_prefers_larger_y_on_tie() {
        let c = Comparator::new(Direction::Horizontal);
        assert!(c.sweep_lt(Point::new(0.0, 9.0), Point::new(1.0, 0.0)));
        assert!(c.sweep_lt(Point::new(1.0, 2.0), Point::new(1.0, 1.0)));
    }

    #[test]
    fn comparator_follows_aspect_ratio() {
        let wide = Rect::from_ltrb(0.0, 0.0, 10.0, 1.0);
        let tall = Rect::from_ltrb(0.0, 0.0, 1.0, 10.0);
        assert_eq!(Comparator::for_bounds(&wide).direction, Direction::Horizontal);
        assert_eq!(Comparator::for_bounds(&tall).direction, Direction::Vertical);
    }

    #[test]
    fn line_distance_sign() {
        let l = Line::from_points(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        assert!(l.dist(Point::new(1.0, 5.0)) > 0.0);
        assert!(l.dist(Point::new(-1.0, 5.0)) < 0.0);
        assert_eq!(l.dist(Point::new(0.0, 3.0)), 0.0);
    }

    #[test]
    fn line_intersection_rounds_to_quarter_pixel() {
        let l1 = Line::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let l2 = Line::from_points(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        let p = l1.intersect(&l2).unwrap();
        assert_eq!(p, Point::new(5.0, 5.0));

        let parallel = Line::from_points(Point::new(0.0, 1.0), Point::new(10.0, 11.0));
        assert!(l1.intersect(&parallel).is_none());
    }

    #[test]
    fn normalize_and_near_parallel() {
        let mut l1 = Line::from_points(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        let mut l2 = Line::from_points(Point::new(1.0, 1.0), Point::new(7.0, 9.0));
        l1.normalize();
        l2.normalize();
        assert!((l1.mag_sq() - 1.0).abs() < 1e-12);
        assert!(l1.near_parallel(&l2));
        let mut zero = Line::default();
        zero.normalize();
        assert_eq!(zero, Line::default());
    }

    #[test]
    fn clamped_scalar_flushes_and_saturates() {
        assert_eq!(double_to_clamped_scalar(1e-300), 0.0);
        assert_eq!(double_to_clamped_scalar(1e300), f32::MAX);
        assert_eq!(double_to_clamped_scalar(-1e300), -f32::MAX);
        assert_eq!(double_to_clamped_scalar(2.5), 2.5);
    }

    #[test]
    fn quarter_pixel_rounding() {
        let mut p = Point::new(1.13, -2.9);
        round_to_quarter_pixel(&mut p);
        assert_eq!(p, Point::new(1.25, -3.0));
    }

    #[test]
    fn exponent_saturates_small_values() {
        assert_eq!(saturated_exponent(0.5), 0);
        assert_eq!(saturated_exponent(1.0), 0);
        assert_eq!(saturated_exponent(1024.0), 10);
        assert_eq!(saturated_exponent(-3.0e6), 21);
    }

    #[test]
    fn segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(Point::new(5.0, 3.0).distance_to_segment_sqd(a, b), 9.0);
        assert_eq!(Point::new(-3.0, 4.0).distance_to_segment_sqd(a, b), 25.0);
        assert_eq!(Point::new(13.0, 4.0).distance_to_segment_sqd(a, b), 25.0);
    }
}
