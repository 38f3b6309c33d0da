// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Double precision points and the tolerance predicates the kernel compares
// them with.

use std::ops::{Add, Mul, Neg, Sub};

use crate::consts::{FLT_EPSILON, MORE_ROUGH_EPSILON, ROUGH_EPSILON};
use crate::geom::Point;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DPoint {
    pub x: f64,
    pub y: f64,
}

impl DPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        DPoint { x, y }
    }

    #[inline]
    pub fn dot(self, o: DPoint) -> f64 {
        self.x * o.x + self.y * o.y
    }

    #[inline]
    pub fn cross(self, o: DPoint) -> f64 {
        self.x * o.y - self.y * o.x
    }

    #[inline]
    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance_sq(self, o: DPoint) -> f64 {
        (self - o).length_sq()
    }

    #[inline]
    pub fn lerp(self, o: DPoint, t: f64) -> DPoint {
        DPoint::new(self.x + (o.x - self.x) * t, self.y + (o.y - self.y) * t)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Largest coordinate magnitude, used to scale relative tolerances.
    pub fn magnitude(self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    /// Equal within a tolerance relative to the coordinates' size.
    pub fn approximately_equal(self, o: DPoint) -> bool {
        let scale = self.magnitude().max(o.magnitude()).max(1.0);
        (self.x - o.x).abs() <= FLT_EPSILON * scale && (self.y - o.y).abs() <= FLT_EPSILON * scale
    }

    /// Looser equality for recovering near misses.
    pub fn roughly_equal(self, o: DPoint) -> bool {
        let scale = self.magnitude().max(o.magnitude()).max(1.0);
        (self.x - o.x).abs() <= ROUGH_EPSILON * scale && (self.y - o.y).abs() <= ROUGH_EPSILON * scale
    }
}

impl From<Point> for DPoint {
    fn from(p: Point) -> Self {
        DPoint::new(p.x as f64, p.y as f64)
    }
}

impl Add for DPoint {
    type Output = DPoint;
    #[inline]
    fn add(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for DPoint {
    type Output = DPoint;
    #[inline]
    fn sub(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for DPoint {
    type Output = DPoint;
    #[inline]
    fn mul(self, rhs: f64) -> DPoint {
        DPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for DPoint {
    type Output = DPoint;
    #[inline]
    fn neg(self) -> DPoint {
        DPoint::new(-self.x, -self.y)
    }
}

/// Whether `x` vanishes next to `reference`.
#[inline]
pub fn approximately_zero_when_compared_to(x: f64, reference: f64) -> bool {
    x == 0.0 || x.abs() < (reference * FLT_EPSILON).abs()
}

#[inline]
pub fn more_roughly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < MORE_ROUGH_EPSILON
}

/// Axis-aligned box of a point set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl DRect {
    pub fn from_points(pts: &[DPoint]) -> Self {
        let mut r = DRect {
            left: f64::INFINITY,
            top: f64::INFINITY,
            right: f64::NEG_INFINITY,
            bottom: f64::NEG_INFINITY,
        };
        for p in pts {
            r.left = r.left.min(p.x);
            r.top = r.top.min(p.y);
            r.right = r.right.max(p.x);
            r.bottom = r.bottom.max(p.y);
        }
        r
    }

    /// Overlap test with `slop` of extra room on every side.
    pub fn intersects(&self, o: &DRect, slop: f64) -> bool {
        self.left <= o.right + slop
            && o.left <= self.right + slop
            && self.top <= o.bottom + slop
            && o.top <= self.bottom + slop
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn magnitude(&self) -> f64 {
        self.left.abs().max(self.top.abs()).max(self.right.abs()).max(self.bottom.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_relative() {
        let a = DPoint::new(1.0e6, 0.0);
        let b = DPoint::new(1.0e6 + 0.01, 0.0);
        assert!(a.approximately_equal(b));
        assert!(!DPoint::new(1.0, 0.0).approximately_equal(DPoint::new(1.01, 0.0)));
        assert!(DPoint::new(1.0, 0.0).roughly_equal(DPoint::new(1.0 + 1e-6, 0.0)));
    }

    #[test]
    fn rect_overlap_with_slop() {
        let a = DRect::from_points(&[DPoint::new(0.0, 0.0), DPoint::new(1.0, 1.0)]);
        let b = DRect::from_points(&[DPoint::new(1.5, 0.0), DPoint::new(2.0, 1.0)]);
        assert!(!a.intersects(&b, 0.0));
        assert!(a.intersects(&b, 0.5));
    }
}
