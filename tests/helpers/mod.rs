// Copyright 2025 The path-tessellator Authors
// Shared test utilities for path-tessellator tests.

#![allow(dead_code)]

use path_tessellator::{FillType, Path, Point, Rect, VecVertexAllocator, VertexAllocator};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// A path with one closed polygon per entry of `contours`.
pub fn polygon_path(contours: &[&[(f32, f32)]], fill: FillType) -> Path {
    let mut path = Path::with_fill_type(fill);
    for c in contours {
        path.add_polygon(&pts(c));
    }
    path
}

pub fn square(x: f32, y: f32, size: f32) -> [(f32, f32); 4] {
    [(x, y), (x + size, y), (x + size, y + size), (x, y + size)]
}

pub fn reversed(c: &[(f32, f32)]) -> Vec<(f32, f32)> {
    c.iter().rev().copied().collect()
}

pub fn clip(half: f32) -> Rect {
    Rect::from_ltrb(-half, -half, half, half)
}

/// Unsigned area of a triangle.
pub fn triangle_area(t: &[Point; 3]) -> f32 {
    ((t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[2].x - t[0].x) * (t[1].y - t[0].y)).abs() * 0.5
}

pub fn centroid(t: &[Point; 3]) -> Point {
    Point::new((t[0].x + t[1].x + t[2].x) / 3.0, (t[0].y + t[1].y + t[2].y) / 3.0)
}

/// Total area of every emitted triangle.
pub fn total_area(alloc: &VecVertexAllocator) -> f32 {
    alloc.triangles().map(|t| triangle_area(&t)).sum()
}

/// Winding number of closed polygon contours around `p`, counting upward
/// crossings of a ray towards +x as +1.
pub fn winding_at(contours: &[&[(f32, f32)]], p: Point) -> i32 {
    let mut w = 0;
    for c in contours {
        for i in 0..c.len() {
            let (x0, y0) = c[i];
            let (x1, y1) = c[(i + 1) % c.len()];
            let side = (x1 - x0) * (p.y - y0) - (p.x - x0) * (y1 - y0);
            if y0 <= p.y && y1 > p.y && side > 0.0 {
                w += 1;
            } else if y1 <= p.y && y0 > p.y && side < 0.0 {
                w -= 1;
            }
        }
    }
    w
}

/// Counts lock and unlock calls and refuses locks past `limit`.
#[derive(Default)]
pub struct RecordingAllocator {
    pub limit: Option<usize>,
    pub locks: Vec<(usize, usize)>,
    pub unlocks: Vec<usize>,
    buf: Vec<f32>,
}

impl RecordingAllocator {
    pub fn refusing_above(limit: usize) -> Self {
        RecordingAllocator {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

impl VertexAllocator for RecordingAllocator {
    fn lock(&mut self, stride: usize, count: usize) -> Option<&mut [f32]> {
        self.locks.push((stride, count));
        if self.limit.is_some_and(|l| count > l) {
            return None;
        }
        self.buf = vec![f32::NAN; count * stride / 4];
        Some(&mut self.buf)
    }

    fn unlock(&mut self, actual_count: usize) {
        self.unlocks.push(actual_count);
    }
}
