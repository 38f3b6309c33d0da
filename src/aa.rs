// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Edge antialiasing.
//
// After simplification the fill boundaries are extracted as closed loops,
// cleaned of spikes, and stroked half a pixel to either side. The inner ring
// (alpha 255) is filled like an ordinary path, and the strip between the
// rings is emitted as quads fading to alpha 0. Thin features make the rings
// overlap or invert; those meshes are collapsed and merged before
// tessellation.

mod overlap;

pub use overlap::EventOrder;

use log::{debug, trace};

use crate::consts::{AA_COS_MITER_ANGLE, AA_QUARTER_PIXEL_SQ, AA_STROKE_RADIUS};
use crate::error::InternalError;
use crate::geom::{Comparator, Line, Point};
use crate::mesh::{EdgeIdx, EdgeList, EdgeType, Mesh, PolyIdx, VertIdx, VertexList, INVALID};
use crate::path::FillType;
use crate::sweep::SimplifyResult;

/// Shape of the antialiasing stroke.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokeParams {
    /// Offset of each ring from the boundary, in pixels.
    pub radius: f64,
    /// Corners whose normals have a cosine below the negation of this are
    /// mitered.
    pub cos_miter_angle: f32,
    /// Squared distance under which a spike vertex is collapsed.
    pub pointy_dist_sq: f64,
}

impl Default for StrokeParams {
    fn default() -> Self {
        StrokeParams {
            radius: AA_STROKE_RADIUS,
            cos_miter_angle: AA_COS_MITER_ANGLE,
            pointy_dist_sq: AA_QUARTER_PIXEL_SQ,
        }
    }
}

/// Result of antialiased tessellation: the filled polys plus the outer ring
/// whose edges become coverage quads. The outer ring is empty when it was
/// merged into the polys.
#[derive(Copy, Clone, Debug)]
pub struct AaPolys {
    pub polys: PolyIdx,
    pub outer_mesh: VertexList,
}

impl Mesh {
    fn edge_normal(&self, e: EdgeIdx) -> Point {
        let edge = &self.edges[e as usize];
        let w = edge.winding as f64;
        let (x, y) = ((edge.line.a * w) as f32, (edge.line.b * w) as f32);
        let len = (x * x + y * y).sqrt();
        if len == 0.0 || !len.is_finite() {
            Point::new(0.0, 0.0)
        } else {
            Point::new(x / len, y / len)
        }
    }

    /// Removes edges with the same fill on both sides. Remaining edges carry
    /// the winding of the region to their right afterwards.
    fn remove_non_boundary_edges(&mut self, list: &VertexList, fill: FillType) -> Result<(), InternalError> {
        trace!("removing non-boundary edges");
        let mut active = EdgeList::default();
        let mut v = list.head;
        while v != INVALID {
            if !self.verts[v as usize].is_connected() {
                v = self.next_vertex(v);
                continue;
            }
            let (left_enclosing, _) = self.find_enclosing_edges(v, &active);
            let mut prev_filled =
                left_enclosing != INVALID && fill.contains(self.edges[left_enclosing as usize].winding);
            let mut e = self.verts[v as usize].above.head;
            while e != INVALID {
                let next = self.edges[e as usize].above.next;
                self.ael_remove(&mut active, e)?;
                let filled = fill.contains(self.edges[e as usize].winding);
                if filled == prev_filled {
                    self.disconnect(e);
                }
                prev_filled = filled;
                e = next;
            }
            let mut prev = left_enclosing;
            let mut e = self.verts[v as usize].below.head;
            while e != INVALID {
                if prev != INVALID {
                    self.edges[e as usize].winding += self.edges[prev as usize].winding;
                }
                self.ael_insert(&mut active, e, prev)?;
                prev = e;
                e = self.edges[e as usize].below.next;
            }
            v = self.next_vertex(v);
        }
        Ok(())
    }

    /// Walks one boundary loop starting at `e`, moving its edges onto
    /// `boundary` with unit normals pointing out of the fill.
    fn extract_boundary(&mut self, boundary: &mut EdgeList, mut e: EdgeIdx, fill: FillType) {
        let mut down = fill.contains(self.edges[e as usize].winding);
        let start = if down { self.edges[e as usize].top } else { self.edges[e as usize].bottom };
        trace!("extracting boundary from vertex {}", start);
        loop {
            let winding = if down { 1 } else { -1 };
            let edge = &mut self.edges[e as usize];
            edge.winding = winding;
            edge.line.normalize();
            edge.line = edge.line * winding as f64;
            self.ael_append(boundary, e);

            let edge = &self.edges[e as usize];
            let next;
            if down {
                // Outgoing edge, clockwise.
                if edge.above.next != INVALID {
                    next = edge.above.next;
                    down = false;
                } else if self.verts[edge.bottom as usize].below.tail != INVALID {
                    next = self.verts[edge.bottom as usize].below.tail;
                    down = true;
                } else {
                    next = edge.above.prev;
                    down = false;
                }
            } else {
                // Outgoing edge, counter-clockwise.
                if edge.below.prev != INVALID {
                    next = edge.below.prev;
                    down = true;
                } else if self.verts[edge.top as usize].above.head != INVALID {
                    next = self.verts[edge.top as usize].above.head;
                    down = false;
                } else {
                    next = edge.below.next;
                    down = true;
                }
            }
            self.disconnect(e);
            e = next;
            if e == INVALID {
                break;
            }
            let pivot = if down { self.edges[e as usize].top } else { self.edges[e as usize].bottom };
            if pivot == start {
                break;
            }
        }
    }

    /// Removes spikes: vertices where the boundary doubles back on itself
    /// within a quarter pixel.
    fn simplify_boundary(&mut self, boundary: &mut EdgeList, params: &StrokeParams, c: &Comparator) -> Result<(), InternalError> {
        let mut prev_edge = boundary.tail;
        if prev_edge == INVALID {
            return Ok(());
        }
        let mut prev_normal = self.edge_normal(prev_edge);
        let mut e = boundary.head;
        while e != INVALID {
            let pe = &self.edges[prev_edge as usize];
            let prev = if pe.winding == 1 { pe.top } else { pe.bottom };
            let ee = &self.edges[e as usize];
            let next = if ee.winding == 1 { ee.bottom } else { ee.top };
            let dist_prev = self.dist(e, self.point(prev));
            let dist_next = self.dist(prev_edge, self.point(next));
            let normal = self.edge_normal(e);
            if prev == next {
                self.ael_remove(boundary, prev_edge)?;
                self.ael_remove(boundary, e)?;
                prev_edge = boundary.tail;
                e = boundary.head;
                if prev_edge != INVALID {
                    prev_normal = self.edge_normal(prev_edge);
                }
            } else if prev_normal.dot(normal) < 0.0
                && (dist_prev * dist_prev <= params.pointy_dist_sq || dist_next * dist_next <= params.pointy_dist_sq)
            {
                trace!("collapsing pointy vertex between {} and {}", prev, next);
                let join = self.make_edge(prev, next, EdgeType::Inner, c);
                if self.point(prev) != self.point(next) {
                    let edge = &mut self.edges[join as usize];
                    edge.line.normalize();
                    edge.line = edge.line * edge.winding as f64;
                }
                self.ael_insert(boundary, join, e)?;
                self.ael_remove(boundary, prev_edge)?;
                self.ael_remove(boundary, e)?;
                let (left, right) = (self.left_of(join), self.right_of(join));
                if left != INVALID && right != INVALID {
                    prev_edge = left;
                    e = join;
                } else {
                    prev_edge = boundary.tail;
                    e = boundary.head;
                }
                prev_normal = self.edge_normal(prev_edge);
            } else {
                prev_edge = e;
                prev_normal = normal;
                e = self.right_of(e);
            }
        }
        Ok(())
    }

    /// Offsets the boundary to either side and connects each offset ring.
    /// The inner ring goes onto `inner_mesh`, the outer one onto `outer_mesh`.
    fn stroke_boundary(
        &mut self,
        boundary: &EdgeList,
        inner_mesh: &mut VertexList,
        outer_mesh: &mut VertexList,
        params: &StrokeParams,
        c: &Comparator,
    ) -> Result<(), InternalError> {
        let head = boundary.head;
        if head == INVALID || self.right_of(head) == INVALID || self.right_of(self.right_of(head)) == INVALID {
            trace!("skipping degenerate boundary");
            return Ok(());
        }
        let radius = params.radius;
        let mut prev_edge = boundary.tail;
        let mut prev_v = self.forward_start(prev_edge);
        let mut prev_normal = self.edge_normal(prev_edge);
        let mut prev_inner = self.edges[prev_edge as usize].line;
        prev_inner.c -= radius;
        let mut prev_outer = self.edges[prev_edge as usize].line;
        prev_outer.c += radius;
        let mut inner_vertices = VertexList::default();
        let mut outer_vertices = VertexList::default();
        let mut inner_inversion = true;
        let mut outer_inversion = true;

        let mut e = head;
        while e != INVALID {
            let next_e = self.right_of(e);
            let v = self.forward_start(e);
            let normal = self.edge_normal(e);
            let line = self.edges[e as usize].line;
            let mut inner = line;
            inner.c -= radius;
            let mut outer = line;
            outer.c += radius;
            trace!("stroking vertex {} {:?}", v, self.point(v));

            let offsets = if self.edges[prev_edge as usize].line.near_parallel(&line) {
                None
            } else {
                prev_inner.intersect(&inner).zip(prev_outer.intersect(&outer))
            };
            if let Some((mut inner_point, mut outer_point)) = offsets {
                let cos_angle = normal.dot(prev_normal);
                if cos_angle < -params.cos_miter_angle {
                    // Too sharp for a plain offset; miter it.
                    let next_v = self.forward_end(e);
                    let bisector = Line::from_points(inner_point, outer_point);
                    let vp = self.point(v);
                    let mut tangent =
                        Line::from_points(vp, vp + Point::new(bisector.a as f32, bisector.b as f32));
                    if tangent.a == 0.0 && tangent.b == 0.0 {
                        e = next_e;
                        continue;
                    }
                    tangent.normalize();
                    let mut inner_tangent = tangent;
                    let mut outer_tangent = tangent;
                    inner_tangent.c -= radius;
                    outer_tangent.c += radius;
                    let (inner1, inner2, outer1, outer2) = if prev_normal.cross(normal) > 0.0 {
                        // Miter the inner points.
                        let (Some(p1), Some(p2), Some(op)) = (
                            inner_tangent.intersect(&prev_inner),
                            inner_tangent.intersect(&inner),
                            outer_tangent.intersect(&bisector),
                        ) else {
                            e = next_e;
                            continue;
                        };
                        outer_point = op;
                        let pv = self.point(prev_v);
                        let nv = self.point(next_v);
                        let prev_tangent =
                            Line::from_points(pv, pv + Point::new(prev_outer.a as f32, prev_outer.b as f32));
                        let next_tangent = Line::from_points(nv, nv + Point::new(outer.a as f32, outer.b as f32));
                        if prev_tangent.dist(outer_point) > 0.0 {
                            outer_point = bisector.intersect(&prev_tangent).unwrap_or(outer_point);
                        }
                        if next_tangent.dist(outer_point) < 0.0 {
                            outer_point = bisector.intersect(&next_tangent).unwrap_or(outer_point);
                        }
                        (p1, p2, outer_point, outer_point)
                    } else {
                        // Miter the outer points.
                        let (Some(p1), Some(p2)) = (outer_tangent.intersect(&prev_outer), outer_tangent.intersect(&outer))
                        else {
                            e = next_e;
                            continue;
                        };
                        let pv = self.point(prev_v);
                        let nv = self.point(next_v);
                        let prev_tangent =
                            Line::from_points(pv, pv + Point::new(prev_inner.a as f32, prev_inner.b as f32));
                        let next_tangent = Line::from_points(nv, nv + Point::new(inner.a as f32, inner.b as f32));
                        if prev_tangent.dist(inner_point) > 0.0 {
                            inner_point = bisector.intersect(&prev_tangent).unwrap_or(inner_point);
                        }
                        if next_tangent.dist(inner_point) < 0.0 {
                            inner_point = bisector.intersect(&next_tangent).unwrap_or(inner_point);
                        }
                        (inner_point, inner_point, p1, p2)
                    };
                    if !(inner1.is_finite() && inner2.is_finite() && outer1.is_finite() && outer2.is_finite()) {
                        e = next_e;
                        continue;
                    }
                    trace!("inner {:?} {:?}, outer {:?} {:?}", inner1, inner2, outer1, outer2);
                    let iv1 = self.alloc_vertex(inner1, 255);
                    let iv2 = self.alloc_vertex(inner2, 255);
                    let ov1 = self.alloc_vertex(outer1, 0);
                    let ov2 = self.alloc_vertex(outer2, 0);
                    self.set_partners(iv1, ov1);
                    self.set_partners(iv2, ov2);
                    if !self.inversion(inner_vertices.tail, iv1, prev_edge, c) {
                        inner_inversion = false;
                    }
                    if !self.inversion(outer_vertices.tail, ov1, prev_edge, c) {
                        outer_inversion = false;
                    }
                    self.vlist_append(&mut inner_vertices, iv1);
                    self.vlist_append(&mut inner_vertices, iv2);
                    self.vlist_append(&mut outer_vertices, ov1);
                    self.vlist_append(&mut outer_vertices, ov2);
                } else {
                    trace!("inner {:?}, outer {:?}", inner_point, outer_point);
                    let iv = self.alloc_vertex(inner_point, 255);
                    let ov = self.alloc_vertex(outer_point, 0);
                    self.set_partners(iv, ov);
                    if !self.inversion(inner_vertices.tail, iv, prev_edge, c) {
                        inner_inversion = false;
                    }
                    if !self.inversion(outer_vertices.tail, ov, prev_edge, c) {
                        outer_inversion = false;
                    }
                    self.vlist_append(&mut inner_vertices, iv);
                    self.vlist_append(&mut outer_vertices, ov);
                }
            }
            prev_inner = inner;
            prev_outer = outer;
            prev_v = v;
            prev_edge = e;
            prev_normal = normal;
            e = next_e;
        }
        if !self.inversion(inner_vertices.tail, inner_vertices.head, prev_edge, c) {
            inner_inversion = false;
        }
        if !self.inversion(outer_vertices.tail, outer_vertices.head, prev_edge, c) {
            outer_inversion = false;
        }
        // Outer edges wind +1 and inner edges -2, so the interior sums to -1,
        // or to 3 where a thin feature inverted the inner ring. A ring that
        // inverted as a whole has flipped handedness; flipping its winding
        // lets the overlap pass find it.
        let inner_winding = if inner_inversion { 2 } else { -2 };
        let outer_winding = if outer_inversion { -1 } else { 1 };
        self.connect_ring(&inner_vertices, EdgeType::Inner, inner_winding, c)?;
        self.connect_ring(&outer_vertices, EdgeType::Outer, outer_winding, c)?;
        crate::arena::list_concat(&mut self.verts, crate::mesh::vert_link, inner_mesh, &mut inner_vertices);
        crate::arena::list_concat(&mut self.verts, crate::mesh::vert_link, outer_mesh, &mut outer_vertices);
        Ok(())
    }

    // Start and end of a boundary edge in walking order.
    fn forward_start(&self, e: EdgeIdx) -> VertIdx {
        let edge = &self.edges[e as usize];
        if edge.winding > 0 { edge.top } else { edge.bottom }
    }

    fn forward_end(&self, e: EdgeIdx) -> VertIdx {
        let edge = &self.edges[e as usize];
        if edge.winding > 0 { edge.bottom } else { edge.top }
    }

    fn set_partners(&mut self, a: VertIdx, b: VertIdx) {
        self.verts[a as usize].partner = b;
        self.verts[b as usize].partner = a;
    }

    /// Whether the step from `prev` to `next` runs against `orig`.
    fn inversion(&self, prev: VertIdx, next: VertIdx, orig: EdgeIdx, c: &Comparator) -> bool {
        if prev == INVALID || next == INVALID {
            return true;
        }
        let winding = if c.sweep_lt(self.point(prev), self.point(next)) { 1 } else { -1 };
        winding != self.edges[orig as usize].winding
    }

    fn connect_ring(&mut self, ring: &VertexList, edge_type: EdgeType, winding: i32, c: &Comparator) -> Result<(), InternalError> {
        let mut v = ring.head;
        while v != INVALID {
            let next = self.next_vertex(v);
            if next == INVALID {
                break;
            }
            self.make_connecting_edge(v, next, edge_type, c, winding)?;
            v = next;
        }
        self.make_connecting_edge(ring.tail, ring.head, edge_type, c, winding)?;
        Ok(())
    }

    /// Replaces the fill boundaries of `list` with stroked inner and outer
    /// rings.
    fn extract_boundaries(
        &mut self,
        list: &VertexList,
        inner_mesh: &mut VertexList,
        outer_mesh: &mut VertexList,
        fill: FillType,
        params: &StrokeParams,
        c: &Comparator,
    ) -> Result<(), InternalError> {
        self.remove_non_boundary_edges(list, fill)?;
        let mut v = list.head;
        while v != INVALID {
            loop {
                let first = self.verts[v as usize].below.head;
                if first == INVALID {
                    break;
                }
                let mut boundary = EdgeList::default();
                self.extract_boundary(&mut boundary, first, fill);
                self.simplify_boundary(&mut boundary, params, c)?;
                self.stroke_boundary(&boundary, inner_mesh, outer_mesh, params, c)?;
            }
            v = self.next_vertex(v);
        }
        Ok(())
    }

    /// Links each outer vertex to its inner partner with a zero-winding
    /// connector edge.
    fn connect_partners(&mut self, list: &VertexList, c: &Comparator) -> Result<(), InternalError> {
        let mut outer = list.head;
        while outer != INVALID {
            let inner = self.verts[outer as usize].partner;
            if inner != INVALID
                && self.verts[inner as usize].link.is_linked()
                && self.verts[outer as usize].link.is_linked()
            {
                self.make_connecting_edge(outer, inner, EdgeType::Connector, c, 0)?;
                self.verts[inner as usize].partner = INVALID;
                self.verts[outer as usize].partner = INVALID;
            }
            outer = self.next_vertex(outer);
        }
        Ok(())
    }

    /// Tessellates a simplified mesh with antialiased edges.
    pub fn aa_tessellate(
        &mut self,
        list: &VertexList,
        fill: FillType,
        params: &StrokeParams,
        c: &Comparator,
    ) -> Result<AaPolys, InternalError> {
        let mut inner_mesh = VertexList::default();
        let mut outer_mesh = VertexList::default();
        self.extract_boundaries(list, &mut inner_mesh, &mut outer_mesh, fill, params, c)?;
        self.sort_mesh(&mut inner_mesh, c);
        self.sort_mesh(&mut outer_mesh, c);
        self.merge_coincident_vertices(&mut inner_mesh, c)?;
        let mut was_complex = self.merge_coincident_vertices(&mut outer_mesh, c)?;
        was_complex |= self.simplify(&mut inner_mesh, c)? == SimplifyResult::FoundSelfIntersection;
        was_complex |= self.simplify(&mut outer_mesh, c)? == SimplifyResult::FoundSelfIntersection;
        was_complex |= self.collapse_overlap_regions(&mut inner_mesh, EventOrder::HighestAlphaFirst, c)?;
        was_complex |= self.collapse_overlap_regions(&mut outer_mesh, EventOrder::LowestAlphaFirst, c)?;
        if was_complex {
            debug!("found complex mesh; taking slow path");
            self.connect_partners(&outer_mesh, c)?;
            self.connect_partners(&inner_mesh, c)?;
            let mut aa_mesh = self.sorted_merge(&mut inner_mesh, &mut outer_mesh, c);
            self.merge_coincident_vertices(&mut aa_mesh, c)?;
            self.simplify(&mut aa_mesh, c)?;
            let polys = self.tessellate(&aa_mesh)?;
            Ok(AaPolys {
                polys,
                outer_mesh: VertexList::default(),
            })
        } else {
            debug!("no complex polygons; taking fast path");
            let polys = self.tessellate(&inner_mesh)?;
            Ok(AaPolys { polys, outer_mesh })
        }
    }

    /// Upper bound on the vertices `emit_aa` produces.
    pub fn count_aa_points(&self, aa: &AaPolys) -> usize {
        let mut count = self.count_points(aa.polys, FillType::Winding);
        self.for_each_outer_edge(&aa.outer_mesh, |_| count += 6);
        count
    }

    /// Emits the filled polys, then two triangles per outer ring edge
    /// spanning the edge and its partners on the inner ring.
    pub fn emit_aa<F: FnMut(VertIdx)>(&self, aa: &AaPolys, mut emit: F) {
        self.emit_polys(aa.polys, FillType::Winding, |v, _| emit(v));
        self.for_each_outer_edge(&aa.outer_mesh, |e| {
            let edge = &self.edges[e as usize];
            let (v0, v1) = (edge.top, edge.bottom);
            let (v2, v3) = (self.verts[v1 as usize].partner, self.verts[v0 as usize].partner);
            if v2 == INVALID || v3 == INVALID {
                return;
            }
            for v in [v0, v1, v2, v0, v2, v3] {
                emit(v);
            }
        });
    }

    fn for_each_outer_edge<F: FnMut(EdgeIdx)>(&self, outer_mesh: &VertexList, mut f: F) {
        let mut v = outer_mesh.head;
        while v != INVALID {
            let mut e = self.verts[v as usize].below.head;
            while e != INVALID {
                f(e);
                e = self.edges[e as usize].below.next;
            }
            v = self.next_vertex(v);
        }
    }
}
