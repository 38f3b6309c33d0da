// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Per-call mesh arena for the sweep-line triangulator.
//
// All nodes live in Vecs owned by `Mesh` and refer to each other through u32
// indices (INVALID is the null link). Nothing is freed individually; the
// whole mesh is dropped when one tessellation call finishes.
//
// Node roles:
//   - Vertex `link`: contour ring while contours are built, then the
//     sweep-sorted vertex list.
//   - Edge `ael`: active edge list during a sweep, boundary loops in the
//     antialiasing pass.
//   - Edge `above` / `below`: edges ending at / starting from a vertex,
//     ordered left to right.
//   - Edge `left_poly_link` / `right_poly_link`: monotone chains.

use log::trace;

use crate::arena::{list_append, list_insert, list_remove, Link, List};
pub use crate::arena::INVALID;
use crate::error::InternalError;
use crate::geom::{double_to_clamped_scalar, saturated_exponent, Comparator, Line, Point};
use crate::consts::{EDGE_RECURSION_EXPONENT_DIFF, MAX_EDGE_GROWTH};

/// Index into Mesh::verts
pub type VertIdx = u32;
/// Index into Mesh::edges
pub type EdgeIdx = u32;
/// Index into Mesh::polys
pub type PolyIdx = u32;
/// Index into Mesh::monos
pub type MonoIdx = u32;

/// Sorted vertex list (or a contour before sorting).
pub type VertexList = List;
/// Left-to-right ordered edge list.
pub type EdgeList = List;

/// Role of an edge in the antialiasing pipeline. Plain fills only use Inner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeType {
    Inner,
    Outer,
    Connector,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub point: Point,
    pub link: Link,
    /// Edges ending at this vertex, left to right.
    pub above: List,
    /// Edges starting at this vertex, left to right.
    pub below: List,
    pub left_enclosing_edge: EdgeIdx,
    pub right_enclosing_edge: EdgeIdx,
    /// Paired inner/outer vertex created while stroking an AA boundary.
    pub partner: VertIdx,
    /// Coverage, 255 inside and 0 on the outer AA ring.
    pub alpha: u8,
    /// Created by the simplifier rather than taken from the path.
    pub synthetic: bool,
}

impl Vertex {
    pub fn new(point: Point, alpha: u8) -> Self {
        Vertex {
            point,
            link: Link::default(),
            above: List::default(),
            below: List::default(),
            left_enclosing_edge: INVALID,
            right_enclosing_edge: INVALID,
            partner: INVALID,
            alpha,
            synthetic: false,
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.above.is_empty() || !self.below.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    /// +1 when the path runs top to bottom, -1 the other way; the sum of
    /// merged edges after simplification.
    pub winding: i32,
    pub top: VertIdx,
    pub bottom: VertIdx,
    pub edge_type: EdgeType,
    pub ael: Link,
    pub above: Link,
    pub below: Link,
    pub left_poly: PolyIdx,
    pub right_poly: PolyIdx,
    pub left_poly_link: Link,
    pub right_poly_link: Link,
    pub used_in_left_poly: bool,
    pub used_in_right_poly: bool,
    pub line: Line,
}

#[derive(Clone, Debug)]
pub struct Poly {
    pub first_vertex: VertIdx,
    pub winding: i32,
    /// Chain of monotone pieces.
    pub monos: List,
    pub next: PolyIdx,
    pub partner: PolyIdx,
    pub count: i32,
}

#[derive(Clone, Debug)]
pub struct MonotonePoly {
    pub side: Side,
    pub edges: List,
    pub link: Link,
    pub winding: i32,
}

// List accessors, one per role.

pub fn vert_link(v: &mut Vertex) -> &mut Link {
    &mut v.link
}

pub fn edge_ael(e: &mut Edge) -> &mut Link {
    &mut e.ael
}

pub fn edge_above(e: &mut Edge) -> &mut Link {
    &mut e.above
}

pub fn edge_below(e: &mut Edge) -> &mut Link {
    &mut e.below
}

pub fn edge_left_poly_link(e: &mut Edge) -> &mut Link {
    &mut e.left_poly_link
}

pub fn edge_right_poly_link(e: &mut Edge) -> &mut Link {
    &mut e.right_poly_link
}

pub fn mono_link(m: &mut MonotonePoly) -> &mut Link {
    &mut m.link
}

/// The parts of an edge that the intersection test reads. Lets temporary
/// bisector segments be tested without allocating them in the mesh.
#[derive(Copy, Clone, Debug)]
pub struct EdgeGeom {
    pub top: VertIdx,
    pub bottom: VertIdx,
    pub line: Line,
    pub edge_type: EdgeType,
}

#[derive(Debug)]
pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub polys: Vec<Poly>,
    pub monos: Vec<MonotonePoly>,
    /// A simplify pass fails once the edge count exceeds this multiple of
    /// the edges it started with.
    pub max_edge_growth: usize,
}

impl Default for Mesh {
    fn default() -> Self {
        Mesh {
            verts: Vec::new(),
            edges: Vec::new(),
            polys: Vec::new(),
            monos: Vec::new(),
            max_edge_growth: MAX_EDGE_GROWTH,
        }
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn point(&self, v: VertIdx) -> Point {
        self.verts[v as usize].point
    }

    /// Number of edges ever allocated; the simplifier budgets growth on it.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn alloc_vertex(&mut self, point: Point, alpha: u8) -> VertIdx {
        let idx = self.verts.len() as VertIdx;
        self.verts.push(Vertex::new(point, alpha));
        idx
    }

    pub fn alloc_edge(&mut self, top: VertIdx, bottom: VertIdx, winding: i32, edge_type: EdgeType) -> EdgeIdx {
        let idx = self.edges.len() as EdgeIdx;
        let line = Line::from_points(self.point(top), self.point(bottom));
        self.edges.push(Edge {
            winding,
            top,
            bottom,
            edge_type,
            ael: Link::default(),
            above: Link::default(),
            below: Link::default(),
            left_poly: INVALID,
            right_poly: INVALID,
            left_poly_link: Link::default(),
            right_poly_link: Link::default(),
            used_in_left_poly: false,
            used_in_right_poly: false,
            line,
        });
        idx
    }

    /// Edge between two path-adjacent vertices, oriented top to bottom with
    /// the winding recording the original direction.
    pub fn make_edge(&mut self, prev: VertIdx, next: VertIdx, edge_type: EdgeType, c: &Comparator) -> EdgeIdx {
        let winding = if c.sweep_lt(self.point(prev), self.point(next)) { 1 } else { -1 };
        let (top, bottom) = if winding < 0 { (next, prev) } else { (prev, next) };
        self.alloc_edge(top, bottom, winding, edge_type)
    }

    pub fn alloc_poly(&mut self, first_vertex: VertIdx, winding: i32) -> PolyIdx {
        let idx = self.polys.len() as PolyIdx;
        trace!("created poly {} winding {}", idx, winding);
        self.polys.push(Poly {
            first_vertex,
            winding,
            monos: List::default(),
            next: INVALID,
            partner: INVALID,
            count: 0,
        });
        idx
    }

    pub fn alloc_monotone_poly(&mut self, e: EdgeIdx, side: Side, winding: i32) -> MonoIdx {
        let idx = self.monos.len() as MonoIdx;
        self.monos.push(MonotonePoly {
            side,
            edges: List::default(),
            link: Link::default(),
            winding,
        });
        self.mono_add_edge(idx, e);
        idx
    }

    /// Appends `e` to the monotone chain on its side.
    pub fn mono_add_edge(&mut self, m: MonoIdx, e: EdgeIdx) {
        let mono = &mut self.monos[m as usize];
        let last = mono.edges.tail;
        match mono.side {
            Side::Right => {
                debug_assert!(!self.edges[e as usize].used_in_right_poly);
                list_insert(&mut self.edges, edge_right_poly_link, e, last, INVALID, &mut mono.edges);
                self.edges[e as usize].used_in_right_poly = true;
            }
            Side::Left => {
                debug_assert!(!self.edges[e as usize].used_in_left_poly);
                list_insert(&mut self.edges, edge_left_poly_link, e, last, INVALID, &mut mono.edges);
                self.edges[e as usize].used_in_left_poly = true;
            }
        }
    }

    // ─────────────────────────── Edge geometry ─────────────────────────────

    #[inline]
    pub fn dist(&self, e: EdgeIdx, p: Point) -> f64 {
        self.edges[e as usize].line.dist(p)
    }

    #[inline]
    pub fn is_left_of(&self, e: EdgeIdx, v: VertIdx) -> bool {
        self.dist(e, self.point(v)) > 0.0
    }

    #[inline]
    pub fn is_right_of(&self, e: EdgeIdx, v: VertIdx) -> bool {
        self.dist(e, self.point(v)) < 0.0
    }

    pub fn recompute(&mut self, e: EdgeIdx) {
        let edge = &self.edges[e as usize];
        let line = Line::from_points(self.point(edge.top), self.point(edge.bottom));
        self.edges[e as usize].line = line;
    }

    pub fn geom(&self, e: EdgeIdx) -> EdgeGeom {
        let edge = &self.edges[e as usize];
        EdgeGeom {
            top: edge.top,
            bottom: edge.bottom,
            line: edge.line,
            edge_type: edge.edge_type,
        }
    }

    /// A segment between two vertices that is not part of the mesh.
    pub fn segment(&self, top: VertIdx, bottom: VertIdx, edge_type: EdgeType) -> EdgeGeom {
        EdgeGeom {
            top,
            bottom,
            line: Line::from_points(self.point(top), self.point(bottom)),
            edge_type,
        }
    }

    /// Intersection point of two segments and the coverage to give it.
    /// Segments sharing an endpoint never intersect; they were split already.
    pub fn intersect(&self, a: &EdgeGeom, b: &EdgeGeom) -> Option<(Point, u8)> {
        if a.top == b.top || a.bottom == b.bottom || a.top == b.bottom || a.bottom == b.top {
            return None;
        }
        let (p, s, t) = recursive_edge_intersect(
            &a.line,
            self.point(a.top),
            self.point(a.bottom),
            &b.line,
            self.point(b.top),
            self.point(b.bottom),
        )?;
        let alpha = if a.edge_type == EdgeType::Inner || b.edge_type == EdgeType::Inner {
            // Anything touching the interior stays opaque.
            255
        } else if a.edge_type == EdgeType::Outer && b.edge_type == EdgeType::Outer {
            0
        } else {
            let lerp = |g: &EdgeGeom, t: f64| {
                (1.0 - t) * self.verts[g.top as usize].alpha as f64
                    + t * self.verts[g.bottom as usize].alpha as f64
            };
            lerp(a, s).max(lerp(b, t)) as u8
        };
        Some((p, alpha))
    }

    // ───────────────────────────── Vertex lists ────────────────────────────

    #[inline]
    pub fn vlist_append(&mut self, list: &mut VertexList, v: VertIdx) {
        list_append(&mut self.verts, vert_link, v, list);
    }

    #[inline]
    pub fn vlist_insert(&mut self, list: &mut VertexList, v: VertIdx, prev: VertIdx, next: VertIdx) {
        list_insert(&mut self.verts, vert_link, v, prev, next, list);
    }

    #[inline]
    pub fn vlist_remove(&mut self, list: &mut VertexList, v: VertIdx) {
        list_remove(&mut self.verts, vert_link, v, list);
    }

    #[inline]
    pub fn next_vertex(&self, v: VertIdx) -> VertIdx {
        self.verts[v as usize].link.next
    }

    #[inline]
    pub fn prev_vertex(&self, v: VertIdx) -> VertIdx {
        self.verts[v as usize].link.prev
    }

    // ───────────────────────────── Edge lists ──────────────────────────────

    pub fn ael_contains(&self, list: &EdgeList, e: EdgeIdx) -> bool {
        self.edges[e as usize].ael.is_linked() || list.head == e
    }

    /// Inserts `e` to the right of `prev` (or at the head).
    pub fn ael_insert(&mut self, list: &mut EdgeList, e: EdgeIdx, prev: EdgeIdx) -> Result<(), InternalError> {
        trace!("inserting edge {} -> {}", self.edges[e as usize].top, self.edges[e as usize].bottom);
        if self.ael_contains(list, e) {
            return Err(InternalError::EdgeAlreadyActive);
        }
        let next = if prev != INVALID { self.edges[prev as usize].ael.next } else { list.head };
        list_insert(&mut self.edges, edge_ael, e, prev, next, list);
        Ok(())
    }

    pub fn ael_remove(&mut self, list: &mut EdgeList, e: EdgeIdx) -> Result<(), InternalError> {
        trace!("removing edge {} -> {}", self.edges[e as usize].top, self.edges[e as usize].bottom);
        if !self.ael_contains(list, e) {
            return Err(InternalError::EdgeNotActive);
        }
        list_remove(&mut self.edges, edge_ael, e, list);
        Ok(())
    }

    pub fn ael_append(&mut self, list: &mut EdgeList, e: EdgeIdx) {
        list_append(&mut self.edges, edge_ael, e, list);
    }

    #[inline]
    pub fn left_of(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].ael.prev
    }

    #[inline]
    pub fn right_of(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].ael.next
    }

    // ──────────────────────── Edges around a vertex ────────────────────────

    /// Links `e` into the edges-above list of `v`, keeping left-to-right order.
    pub fn insert_above(&mut self, e: EdgeIdx, v: VertIdx, c: &Comparator) {
        let (top, bottom) = (self.edges[e as usize].top, self.edges[e as usize].bottom);
        if self.point(top) == self.point(bottom) || c.sweep_lt(self.point(bottom), self.point(top)) {
            return;
        }
        trace!("insert edge ({} -> {}) above vertex {}", top, bottom, v);
        let mut prev = INVALID;
        let mut next = self.verts[v as usize].above.head;
        while next != INVALID {
            if self.is_right_of(next, top) {
                break;
            }
            prev = next;
            next = self.edges[next as usize].above.next;
        }
        list_insert(&mut self.edges, edge_above, e, prev, next, &mut self.verts[v as usize].above);
    }

    /// Links `e` into the edges-below list of `v`, keeping left-to-right order.
    pub fn insert_below(&mut self, e: EdgeIdx, v: VertIdx, c: &Comparator) {
        let (top, bottom) = (self.edges[e as usize].top, self.edges[e as usize].bottom);
        if self.point(top) == self.point(bottom) || c.sweep_lt(self.point(bottom), self.point(top)) {
            return;
        }
        trace!("insert edge ({} -> {}) below vertex {}", top, bottom, v);
        let mut prev = INVALID;
        let mut next = self.verts[v as usize].below.head;
        while next != INVALID {
            if self.is_right_of(next, bottom) {
                break;
            }
            prev = next;
            next = self.edges[next as usize].below.next;
        }
        list_insert(&mut self.edges, edge_below, e, prev, next, &mut self.verts[v as usize].below);
    }

    pub fn remove_edge_above(&mut self, e: EdgeIdx) {
        let bottom = self.edges[e as usize].bottom;
        trace!("removing edge ({} -> {}) above vertex {}", self.edges[e as usize].top, bottom, bottom);
        list_remove(&mut self.edges, edge_above, e, &mut self.verts[bottom as usize].above);
    }

    pub fn remove_edge_below(&mut self, e: EdgeIdx) {
        let top = self.edges[e as usize].top;
        trace!("removing edge ({} -> {}) below vertex {}", top, self.edges[e as usize].bottom, top);
        list_remove(&mut self.edges, edge_below, e, &mut self.verts[top as usize].below);
    }

    pub fn disconnect(&mut self, e: EdgeIdx) {
        self.remove_edge_above(e);
        self.remove_edge_below(e);
    }

    /// Active edges immediately left and right of `v`.
    ///
    /// Constant time when `v` already has edges above it; otherwise a scan
    /// from the right end of the active list.
    pub fn find_enclosing_edges(&self, v: VertIdx, active: &EdgeList) -> (EdgeIdx, EdgeIdx) {
        let vert = &self.verts[v as usize];
        if vert.above.head != INVALID && vert.above.tail != INVALID {
            return (self.left_of(vert.above.head), self.right_of(vert.above.tail));
        }
        let mut next = INVALID;
        let mut prev = active.tail;
        while prev != INVALID {
            if self.is_left_of(prev, v) {
                break;
            }
            next = prev;
            prev = self.left_of(prev);
        }
        (prev, next)
    }
}

// ───────────────────────── Edge/edge intersection ──────────────────────────

// Lines through endpoints many orders of magnitude apart lose precision in
// their distance tests, so such segments are bisected before trusting a hit.
fn edge_line_needs_recursion(p0: Point, p1: Point) -> bool {
    let exp_diff_x = (saturated_exponent(p0.x) - saturated_exponent(p1.x)).abs();
    let exp_diff_y = (saturated_exponent(p0.y) - saturated_exponent(p1.y)).abs();
    exp_diff_x > EDGE_RECURSION_EXPONENT_DIFF || exp_diff_y > EDGE_RECURSION_EXPONENT_DIFF
}

/// Intersects segments `u0..u1` and `v0..v1` with lines `u` and `v`, returning
/// the point and the parameters along each segment.
fn recursive_edge_intersect(
    u: &Line,
    mut u0: Point,
    mut u1: Point,
    v: &Line,
    mut v0: Point,
    mut v1: Point,
) -> Option<(Point, f64, f64)> {
    // Compare boxes by hand: horizontal or vertical segments have empty rects.
    if u0.x.min(u1.x) > v0.x.max(v1.x)
        || u0.x.max(u1.x) < v0.x.min(v1.x)
        || u0.y.min(u1.y) > v0.y.max(v1.y)
        || u0.y.max(u1.y) < v0.y.min(v1.y)
    {
        return None;
    }

    let denom = u.a * v.b - u.b * v.a;
    if denom == 0.0 {
        return None;
    }
    let dx = v0.x as f64 - u0.x as f64;
    let dy = v0.y as f64 - u0.y as f64;
    let s_numer = dy * v.b + dx * v.a;
    let t_numer = dy * u.b + dx * u.a;
    // Reject parameters outside [0, 1] before dividing.
    let outside = if denom > 0.0 {
        s_numer < 0.0 || s_numer > denom || t_numer < 0.0 || t_numer > denom
    } else {
        s_numer > 0.0 || s_numer < denom || t_numer > 0.0 || t_numer < denom
    };
    if outside {
        return None;
    }
    let s = s_numer / denom;
    let t = t_numer / denom;

    let u_split = edge_line_needs_recursion(u0, u1);
    let v_split = edge_line_needs_recursion(v0, v1);
    if !u_split && !v_split {
        let p = Point::new(
            double_to_clamped_scalar(u0.x as f64 - s * u.b),
            double_to_clamped_scalar(u0.y as f64 + s * u.a),
        );
        return Some((p, s, t));
    }

    let (mut s_scale, mut s_shift) = (1.0, 0.0);
    let (mut t_scale, mut t_shift) = (1.0, 0.0);
    if u_split {
        let mid = midpoint(u0, u1);
        s_scale = 0.5;
        if s >= 0.5 {
            u0 = mid;
            s_shift = 0.5;
        } else {
            u1 = mid;
        }
    }
    if v_split {
        let mid = midpoint(v0, v1);
        t_scale = 0.5;
        if t >= 0.5 {
            v0 = mid;
            t_shift = 0.5;
        } else {
            v1 = mid;
        }
    }
    // A miss on the halves means the first hit was a false positive.
    let (p, s, t) = recursive_edge_intersect(
        &Line::from_points(u0, u1),
        u0,
        u1,
        &Line::from_points(v0, v1),
        v0,
        v1,
    )?;
    Some((p, s_scale * s + s_shift, t_scale * t + t_shift))
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new(
        (0.5 * a.x as f64 + 0.5 * b.x as f64) as f32,
        (0.5 * a.y as f64 + 0.5 * b.y as f64) as f32,
    )
}
