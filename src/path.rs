// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Input path representation consumed by the contour builder: a verb stream
// over a shared point array, conic weights, and a fill type.

use crate::geom::{Point, Rect};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verb {
    Move,
    Line,
    Quad,
    Conic,
    Cubic,
    Close,
}

impl Verb {
    /// Points consumed from the point array, excluding the implicit start.
    fn point_count(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FillType {
    #[default]
    Winding,
    EvenOdd,
    InverseWinding,
    InverseEvenOdd,
}

impl FillType {
    pub fn is_inverse(self) -> bool {
        matches!(self, FillType::InverseWinding | FillType::InverseEvenOdd)
    }

    /// Whether a region with accumulated `winding` is inside the fill.
    #[inline]
    pub fn contains(self, winding: i32) -> bool {
        match self {
            FillType::Winding => winding != 0,
            FillType::EvenOdd => (winding & 1) != 0,
            // The clip rectangle contributes +1 around inverse fills.
            FillType::InverseWinding => winding == 1,
            FillType::InverseEvenOdd => (winding & 1) == 1,
        }
    }
}

/// A path segment with its start point resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Segment {
    Move(Point),
    Line([Point; 2]),
    Quad([Point; 3]),
    Conic([Point; 3], f32),
    Cubic([Point; 4]),
    Close,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    verbs: Vec<Verb>,
    points: Vec<Point>,
    conic_weights: Vec<f32>,
    fill_type: FillType,
    last_move: Option<usize>,
    needs_move: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_type(fill_type: FillType) -> Self {
        Path {
            fill_type,
            ..Self::default()
        }
    }

    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    pub fn set_fill_type(&mut self, fill_type: FillType) {
        self.fill_type = fill_type;
    }

    pub fn is_inverse_fill_type(&self) -> bool {
        self.fill_type.is_inverse()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Bounds of every point, control points included.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(&self.points).unwrap_or_default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.last_move = Some(self.points.len());
        self.verbs.push(Verb::Move);
        self.points.push(Point::new(x, y));
        self.needs_move = false;
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Line);
        self.points.push(Point::new(x, y));
        self
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Quad);
        self.points.extend([Point::new(x1, y1), Point::new(x2, y2)]);
        self
    }

    /// Rational quadratic. A weight of one is a plain quad, below one an
    /// ellipse arc, above one a hyperbola.
    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, weight: f32) -> &mut Self {
        if weight == 1.0 {
            return self.quad_to(x1, y1, x2, y2);
        }
        self.inject_move_if_needed();
        self.verbs.push(Verb::Conic);
        self.points.extend([Point::new(x1, y1), Point::new(x2, y2)]);
        self.conic_weights.push(weight);
        self
    }

    pub fn cubic_to(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> &mut Self {
        self.inject_move_if_needed();
        self.verbs.push(Verb::Cubic);
        self.points
            .extend([Point::new(x1, y1), Point::new(x2, y2), Point::new(x3, y3)]);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if matches!(self.verbs.last(), Some(v) if *v != Verb::Close) {
            self.verbs.push(Verb::Close);
        }
        self.needs_move = true;
        self
    }

    /// Appends a closed polygon.
    pub fn add_polygon(&mut self, points: &[Point]) -> &mut Self {
        if let Some((first, rest)) = points.split_first() {
            self.move_to(first.x, first.y);
            for p in rest {
                self.line_to(p.x, p.y);
            }
            self.close();
        }
        self
    }

    pub fn add_rect(&mut self, rect: &Rect) -> &mut Self {
        self.add_polygon(&rect.to_quad())
    }

    pub fn segments(&self) -> Segments<'_> {
        Segments {
            path: self,
            verb: 0,
            point: 0,
            weight: 0,
            last: Point::default(),
        }
    }

    // Drawing after a close (or before any move) continues from the last
    // move point, or the origin.
    fn inject_move_if_needed(&mut self) {
        if self.needs_move || self.last_move.is_none() {
            let p = self
                .last_move
                .map(|i| self.points[i])
                .unwrap_or_default();
            self.move_to(p.x, p.y);
        }
    }
}

pub struct Segments<'a> {
    path: &'a Path,
    verb: usize,
    point: usize,
    weight: usize,
    last: Point,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let verb = *self.path.verbs.get(self.verb)?;
        self.verb += 1;
        let pts = &self.path.points[self.point..self.point + verb.point_count()];
        self.point += verb.point_count();
        let start = self.last;
        let segment = match verb {
            Verb::Move => Segment::Move(pts[0]),
            Verb::Line => Segment::Line([start, pts[0]]),
            Verb::Quad => Segment::Quad([start, pts[0], pts[1]]),
            Verb::Conic => {
                let w = self.path.conic_weights[self.weight];
                self.weight += 1;
                Segment::Conic([start, pts[0], pts[1]], w)
            }
            Verb::Cubic => Segment::Cubic([start, pts[0], pts[1], pts[2]]),
            Verb::Close => Segment::Close,
        };
        if let Some(p) = pts.last() {
            self.last = *p;
        }
        Some(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_carry_start_points() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .quad_to(2.0, 0.0, 2.0, 1.0)
            .cubic_to(2.0, 2.0, 1.0, 3.0, 0.0, 3.0)
            .close();
        let segs: Vec<_> = path.segments().collect();
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[1], Segment::Line([Point::new(0.0, 0.0), Point::new(1.0, 0.0)]));
        assert_eq!(
            segs[2],
            Segment::Quad([Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 1.0)])
        );
        match segs[3] {
            Segment::Cubic(p) => assert_eq!(p[0], Point::new(2.0, 1.0)),
            other => panic!("expected cubic, got {:?}", other),
        }
        assert_eq!(segs[4], Segment::Close);
    }

    #[test]
    fn line_after_close_starts_new_contour() {
        let mut path = Path::new();
        path.move_to(1.0, 1.0).line_to(2.0, 1.0).close().line_to(3.0, 3.0);
        assert_eq!(
            path.verbs(),
            &[Verb::Move, Verb::Line, Verb::Close, Verb::Move, Verb::Line]
        );
        assert_eq!(path.points()[2], Point::new(1.0, 1.0));
    }

    #[test]
    fn unit_weight_conic_is_a_quad() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).conic_to(1.0, 0.0, 1.0, 1.0, 1.0);
        assert_eq!(path.verbs(), &[Verb::Move, Verb::Quad]);
        path.conic_to(1.0, 2.0, 0.0, 2.0, 0.5);
        match path.segments().last() {
            Some(Segment::Conic(p, w)) => {
                assert_eq!(p[0], Point::new(1.0, 1.0));
                assert_eq!(w, 0.5);
            }
            other => panic!("expected conic, got {:?}", other),
        }
    }

    #[test]
    fn fill_rules() {
        assert!(FillType::Winding.contains(-2));
        assert!(!FillType::Winding.contains(0));
        assert!(FillType::EvenOdd.contains(-1));
        assert!(!FillType::EvenOdd.contains(2));
        assert!(FillType::InverseWinding.contains(1));
        assert!(!FillType::InverseWinding.contains(2));
        assert!(FillType::InverseEvenOdd.contains(3));
        assert!(!FillType::InverseEvenOdd.contains(0));
    }

    #[test]
    fn bounds_include_control_points() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).quad_to(5.0, -4.0, 2.0, 2.0);
        assert_eq!(path.bounds(), Rect::from_ltrb(0.0, -4.0, 5.0, 2.0));
        assert_eq!(Path::new().bounds(), Rect::default());
    }
}
