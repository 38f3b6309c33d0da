// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Stage 1: flatten a path into linear contours of mesh vertices.

use log::trace;
use smallvec::SmallVec;

use crate::consts::{
    CUBIC_AS_QUAD_TOLERANCE_SCALE, MAX_CONIC_TO_QUAD_POW2, MAX_POINTS_PER_CURVE, MIN_CURVE_TOLERANCE,
};
use crate::geom::{Point, Rect};
use crate::mesh::{Mesh, VertexList};
use crate::path::{Path, Segment};

/// Quads produced by chopping one conic; holds `1 + 2 * count` points.
pub type ConicQuads = SmallVec<[Point; 9]>;

/// Points needed to flatten a quad to within `tol`.
pub fn quadratic_point_count(pts: &[Point; 3], tol: f32) -> usize {
    let tol = tol.max(MIN_CURVE_TOLERANCE);
    let d = pts[1].distance_to_segment_sqd(pts[0], pts[2]).sqrt();
    point_count_for_deviation(d, tol)
}

/// Points needed to flatten a cubic to within `tol`.
pub fn cubic_point_count(pts: &[Point; 4], tol: f32) -> usize {
    let tol = tol.max(MIN_CURVE_TOLERANCE);
    let d = pts[1]
        .distance_to_segment_sqd(pts[0], pts[3])
        .max(pts[2].distance_to_segment_sqd(pts[0], pts[3]))
        .sqrt();
    point_count_for_deviation(d, tol)
}

fn point_count_for_deviation(d: f32, tol: f32) -> usize {
    if !d.is_finite() {
        MAX_POINTS_PER_CURVE
    } else if d <= tol {
        1
    } else {
        let temp = (d / tol).sqrt().ceil() as usize;
        temp.next_power_of_two().min(MAX_POINTS_PER_CURVE)
    }
}

/// Upper bound on the points flattening produces, and the number of
/// contours (one per move).
pub fn worst_case_point_count(path: &Path, tol: f32) -> (usize, usize) {
    let tol = tol.max(MIN_CURVE_TOLERANCE);
    let mut points = 0;
    let mut contours = 1;
    let mut first = true;
    for segment in path.segments() {
        match segment {
            Segment::Move(_) => {
                points += 1;
                if !first {
                    contours += 1;
                }
            }
            Segment::Line(_) => points += 1,
            Segment::Quad(pts) => points += quadratic_point_count(&pts, tol),
            Segment::Conic(pts, w) => {
                let quads = conic_to_quads(&pts, w, tol);
                points += quads
                    .windows(3)
                    .step_by(2)
                    .map(|q| quadratic_point_count(&[q[0], q[1], q[2]], tol))
                    .sum::<usize>();
            }
            Segment::Cubic(pts) => points += cubic_point_count(&pts, tol),
            Segment::Close => {}
        }
        first = false;
    }
    (points, contours)
}

/// Number of contour lists `path_to_contours` fills, or 0 when the path has
/// no points at all.
pub fn contour_count(path: &Path) -> usize {
    let mut count = 1;
    let mut has_points = false;
    for (i, segment) in path.segments().enumerate() {
        match segment {
            Segment::Move(_) => {
                if i > 0 {
                    count += 1;
                }
                has_points = true;
            }
            Segment::Close => {}
            _ => has_points = true,
        }
    }
    if has_points {
        count
    } else {
        0
    }
}

/// How many times a conic must be halved so each piece is within `tol` of
/// its quad approximation.
pub fn conic_quad_pow2(pts: &[Point; 3], w: f32, tol: f32) -> u32 {
    if tol < 0.0 || !tol.is_finite() || !pts.iter().all(Point::is_finite) {
        return 0;
    }
    let a = w - 1.0;
    let k = a / (4.0 * (2.0 + a));
    let x = k * (pts[0].x - 2.0 * pts[1].x + pts[2].x);
    let y = k * (pts[0].y - 2.0 * pts[1].y + pts[2].y);
    let mut error = (x * x + y * y).sqrt();
    let mut pow2 = 0;
    while pow2 < MAX_CONIC_TO_QUAD_POW2 {
        if error <= tol {
            break;
        }
        error *= 0.25;
        pow2 += 1;
    }
    pow2
}

/// Chops a conic into `2^k` quads sharing end points.
pub fn conic_to_quads(pts: &[Point; 3], w: f32, tol: f32) -> ConicQuads {
    let pow2 = conic_quad_pow2(pts, w, tol);
    let mut out = ConicQuads::new();
    out.push(pts[0]);
    chop_conic(pts, w, pow2, &mut out);
    // A chop that produced non-finite interior points degrades to a hull.
    if !out.iter().all(Point::is_finite) {
        out.truncate(1);
        for _ in 0..(1usize << pow2) {
            out.push(pts[1]);
            out.push(pts[2]);
        }
    }
    out
}

fn chop_conic(pts: &[Point; 3], w: f32, level: u32, out: &mut ConicQuads) {
    if level == 0 {
        out.push(pts[1]);
        out.push(pts[2]);
        return;
    }
    let scale = 1.0 / (1.0 + w);
    let new_w = (0.5 + 0.5 * w).sqrt();
    let wp1 = pts[1] * w;
    let m = (pts[0] + wp1 * 2.0 + pts[2]) * (scale * 0.5);
    let left = [pts[0], (pts[0] + wp1) * scale, m];
    let right = [m, (wp1 + pts[2]) * scale, pts[2]];
    chop_conic(&left, new_w, level - 1, out);
    chop_conic(&right, new_w, level - 1, out);
}

struct QuadCoeff {
    a: Point,
    b: Point,
    c: Point,
}

impl QuadCoeff {
    fn new(pts: &[Point; 3]) -> Self {
        QuadCoeff {
            a: pts[2] - pts[1] * 2.0 + pts[0],
            b: (pts[1] - pts[0]) * 2.0,
            c: pts[0],
        }
    }

    fn eval(&self, t: f32) -> Point {
        (self.a * t + self.b) * t + self.c
    }
}

fn quad_error_at(quad: &QuadCoeff, t: f32, u: f32) -> f32 {
    let p0 = quad.eval(t - 0.5 * u);
    let mid = quad.eval(t);
    let p1 = quad.eval(t + 0.5 * u);
    if !p0.is_finite() || !mid.is_finite() || !p1.is_finite() {
        return 0.0;
    }
    mid.distance_to_segment_sqd(p0, p1)
}

/// Builds the vertex contours of one path.
pub struct ContourBuilder<'m> {
    mesh: &'m mut Mesh,
    contours: Vec<VertexList>,
    is_linear: bool,
}

impl<'m> ContourBuilder<'m> {
    pub fn new(mesh: &'m mut Mesh) -> Self {
        ContourBuilder {
            mesh,
            contours: Vec::new(),
            is_linear: true,
        }
    }

    /// Flattens `path`. Inverse fills get the clip rectangle, reversed, as
    /// an extra first contour. Returns the contours and whether every verb
    /// was linear.
    pub fn build(mut self, path: &Path, tolerance: f32, clip_bounds: &Rect) -> (Vec<VertexList>, bool) {
        let tolerance_sqd = tolerance * tolerance;
        self.contours.push(VertexList::default());
        if path.is_inverse_fill_type() {
            let quad = clip_bounds.to_quad();
            for p in quad.iter().rev() {
                self.append_point(*p);
            }
            self.contours.push(VertexList::default());
        }
        for segment in path.segments() {
            match segment {
                Segment::Move(p) => {
                    if !self.current().is_empty() {
                        self.contours.push(VertexList::default());
                    }
                    self.append_point(p);
                }
                Segment::Line([_, p]) => self.append_point(p),
                Segment::Quad(pts) => {
                    self.is_linear = false;
                    if tolerance_sqd == 0.0 {
                        self.append_point(pts[2]);
                    } else {
                        self.append_quadratic(&pts, tolerance_sqd);
                    }
                }
                Segment::Conic(pts, w) => {
                    self.is_linear = false;
                    if tolerance_sqd == 0.0 {
                        self.append_point(pts[2]);
                    } else {
                        // The conic error is measured against the squared tolerance.
                        let quads = conic_to_quads(&pts, w, tolerance_sqd);
                        for q in quads.windows(3).step_by(2) {
                            self.append_quadratic(&[q[0], q[1], q[2]], tolerance_sqd);
                        }
                    }
                }
                Segment::Cubic(pts) => {
                    self.is_linear = false;
                    if tolerance_sqd == 0.0 {
                        self.append_point(pts[3]);
                    } else {
                        let points_left = cubic_point_count(&pts, tolerance);
                        self.generate_cubic_points(&pts, tolerance_sqd, points_left);
                    }
                }
                Segment::Close => {}
            }
        }
        self.contours.retain(|c| !c.is_empty());
        trace!("built {} contours, linear {}", self.contours.len(), self.is_linear);
        (self.contours, self.is_linear)
    }

    fn current(&self) -> VertexList {
        // `build` pushes the first list before any point is appended.
        self.contours[self.contours.len() - 1]
    }

    fn append_point(&mut self, p: Point) {
        let v = self.mesh.alloc_vertex(p, 255);
        let last = self.contours.len() - 1;
        self.mesh.vlist_append(&mut self.contours[last], v);
    }

    // Chooses one subdivision count by testing flatness at the point of
    // maximum curvature; if it is flat there it is flat everywhere.
    fn append_quadratic(&mut self, pts: &[Point; 3], tolerance_sqd: f32) {
        let quad = QuadCoeff::new(pts);
        let aa = Point::new(quad.a.x * quad.a.x, quad.a.y * quad.a.y);
        let ab = Point::new(quad.a.x * quad.b.x, quad.a.y * quad.b.y);
        let denom = 2.0 * (aa.x + aa.y);
        let t = if denom != 0.0 { (-ab.x - ab.y) / denom } else { 0.0 };
        let mut n_points = 1;
        let mut u = 1.0;
        while n_points < MAX_POINTS_PER_CURVE {
            u = 1.0 / n_points as f32;
            if quad_error_at(&quad, t, u) < tolerance_sqd {
                break;
            }
            n_points += 1;
        }
        for j in 1..n_points {
            self.append_point(quad.eval(j as f32 * u));
        }
        self.append_point(pts[2]);
    }

    fn generate_cubic_points(&mut self, p: &[Point; 4], tol_sqd: f32, points_left: usize) {
        let d1 = p[1].distance_to_segment_sqd(p[0], p[3]);
        let d2 = p[2].distance_to_segment_sqd(p[0], p[3]);
        if points_left < 2 || (d1 < tol_sqd && d2 < tol_sqd) || !d1.is_finite() || !d2.is_finite() {
            self.append_point(p[3]);
            return;
        }
        // A cubic that is a degree-elevated quad (within tolerance) is cheaper
        // to flatten as that quad.
        let q1 = (p[1] * 3.0 - p[0]) * 0.5;
        let q2 = (p[2] * 3.0 - p[3]) * 0.5;
        let scale = CUBIC_AS_QUAD_TOLERANCE_SCALE * CUBIC_AS_QUAD_TOLERANCE_SCALE;
        if q1.distance_sqd(q2) <= scale * tol_sqd {
            self.append_quadratic(&[p[0], q1.average(q2), p[3]], tol_sqd);
            return;
        }
        let q = [p[0].average(p[1]), p[1].average(p[2]), p[2].average(p[3])];
        let r = [q[0].average(q[1]), q[1].average(q[2])];
        let s = r[0].average(r[1]);
        let points_left = points_left >> 1;
        self.generate_cubic_points(&[p[0], q[0], r[0], s], tol_sqd, points_left);
        self.generate_cubic_points(&[s, r[1], q[2], p[3]], tol_sqd, points_left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FillType;

    fn contour_points(mesh: &Mesh, list: &VertexList) -> Vec<Point> {
        let mut out = Vec::new();
        let mut v = list.head;
        while v != crate::mesh::INVALID {
            out.push(mesh.point(v));
            v = mesh.next_vertex(v);
        }
        out
    }

    #[test]
    fn point_counts_are_powers_of_two() {
        let flat = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(quadratic_point_count(&flat, 0.25), 1);
        let bent = [Point::new(0.0, 0.0), Point::new(5.0, 10.0), Point::new(10.0, 0.0)];
        let n = quadratic_point_count(&bent, 0.25);
        assert!(n.is_power_of_two());
        assert!(n > 1 && n <= MAX_POINTS_PER_CURVE);
        let cubic = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ];
        assert_eq!(cubic_point_count(&cubic, 0.0001), MAX_POINTS_PER_CURVE);
    }

    #[test]
    fn contour_count_tracks_moves() {
        let mut path = Path::new();
        assert_eq!(contour_count(&path), 0);
        path.move_to(0.0, 0.0).line_to(1.0, 0.0).line_to(0.0, 1.0).close();
        path.move_to(5.0, 5.0).line_to(6.0, 5.0).line_to(5.0, 6.0).close();
        assert_eq!(contour_count(&path), 2);
        let (points, contours) = worst_case_point_count(&path, 0.25);
        assert_eq!(points, 6);
        assert_eq!(contours, 2);
    }

    #[test]
    fn linear_path_builds_one_contour_per_move() {
        let mut mesh = Mesh::new();
        let mut path = Path::new();
        path.move_to(0.0, 0.0).line_to(1.0, 0.0).line_to(1.0, 1.0).close();
        path.move_to(3.0, 3.0).line_to(4.0, 3.0).line_to(4.0, 4.0).close();
        let (contours, is_linear) =
            ContourBuilder::new(&mut mesh).build(&path, 0.25, &Rect::from_wh(10.0, 10.0));
        assert!(is_linear);
        assert_eq!(contours.len(), 2);
        assert_eq!(
            contour_points(&mesh, &contours[0]),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]
        );
    }

    #[test]
    fn inverse_fill_prepends_reversed_clip() {
        let mut mesh = Mesh::new();
        let mut path = Path::with_fill_type(FillType::InverseWinding);
        path.move_to(1.0, 1.0).line_to(2.0, 1.0).line_to(2.0, 2.0).close();
        let (contours, _) = ContourBuilder::new(&mut mesh).build(&path, 0.25, &Rect::from_wh(4.0, 4.0));
        assert_eq!(contours.len(), 2);
        assert_eq!(
            contour_points(&mesh, &contours[0]),
            vec![
                Point::new(0.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
                Point::new(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn curves_flatten_within_tolerance() {
        let mut mesh = Mesh::new();
        let mut path = Path::new();
        path.move_to(0.0, 0.0).quad_to(50.0, 100.0, 100.0, 0.0).close();
        let (contours, is_linear) =
            ContourBuilder::new(&mut mesh).build(&path, 0.5, &Rect::from_wh(100.0, 100.0));
        assert!(!is_linear);
        let pts = contour_points(&mesh, &contours[0]);
        assert!(pts.len() > 4);
        assert_eq!(*pts.last().unwrap(), Point::new(100.0, 0.0));
        // Every flattened point lies on the parabola y = 2x - x^2/50.
        for p in &pts {
            let expected = 2.0 * p.x - p.x * p.x / 50.0;
            assert!((p.y - expected).abs() < 0.01, "{:?}", p);
        }
    }

    #[test]
    fn zero_tolerance_keeps_only_end_points() {
        let mut mesh = Mesh::new();
        let mut path = Path::new();
        path.move_to(0.0, 0.0)
            .cubic_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0)
            .conic_to(10.0, -10.0, 0.0, -10.0, 0.7);
        let (contours, is_linear) = ContourBuilder::new(&mut mesh).build(&path, 0.0, &Rect::default());
        assert!(!is_linear);
        assert_eq!(
            contour_points(&mesh, &contours[0]),
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, -10.0)]
        );
    }

    #[test]
    fn conic_chops_into_power_of_two_quads() {
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
        let quads = conic_to_quads(&pts, std::f32::consts::FRAC_1_SQRT_2, 0.01);
        let count = (quads.len() - 1) / 2;
        assert!(count.is_power_of_two());
        assert!(count > 1);
        assert_eq!(quads[0], pts[0]);
        assert_eq!(*quads.last().unwrap(), pts[2]);
        // A quarter circle of radius 100 centred at (0, 100).
        for q in quads.iter().step_by(2) {
            let r = (q.x * q.x + (q.y - 100.0) * (q.y - 100.0)).sqrt();
            assert!((r - 100.0).abs() < 0.01, "{:?}", q);
        }
    }

    #[test]
    fn near_quadratic_cubic_uses_quad_flattening() {
        let mut mesh = Mesh::new();
        let mut path = Path::new();
        // Degree-elevated quad (0,0) (30,60) (60,0).
        path.move_to(0.0, 0.0).cubic_to(20.0, 40.0, 40.0, 40.0, 60.0, 0.0);
        let (contours, _) = ContourBuilder::new(&mut mesh).build(&path, 0.25, &Rect::default());
        let pts = contour_points(&mesh, &contours[0]);
        assert_eq!(*pts.last().unwrap(), Point::new(60.0, 0.0));
        for p in &pts {
            let t = p.x / 60.0;
            let expected = 2.0 * t * (1.0 - t) * 60.0;
            assert!((p.y - expected).abs() < 0.01, "{:?}", p);
        }
    }
}
