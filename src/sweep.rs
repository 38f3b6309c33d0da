// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Stages 2-4: contours to edges, vertex sort, and the Bentley-Ottmann style
// simplification that splits crossing edges until the mesh is planar.
//
// Intersection points are rounded, so splitting an edge can reorder the
// active edge list behind the sweep. When that happens the sweep rewinds to
// the earliest affected vertex and replays from there. Every mutation that
// may reorder edges therefore threads the optional `SweepCursor` through;
// callers outside a sweep pass `None` and no rewinding happens.

use log::{debug, trace};

use crate::arena::{list_concat, List};
use crate::consts::AA_BISECTOR_COS_LIMIT;
use crate::error::InternalError;
use crate::geom::{double_to_clamped_scalar, round_to_quarter_pixel, Comparator, Line, Point};
use crate::mesh::{vert_link, EdgeIdx, EdgeList, EdgeType, Mesh, VertIdx, VertexList, INVALID};

/// Active edge list plus the vertex the sweep is at.
#[derive(Debug)]
pub struct SweepCursor {
    pub active: EdgeList,
    pub current: VertIdx,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimplifyResult {
    AlreadySimple,
    FoundSelfIntersection,
}

/// How contours are cleaned up before edges are built.
#[derive(Copy, Clone, Debug, Default)]
pub struct SanitizeOptions {
    pub round_to_quarter_pixel: bool,
    pub preserve_collinear_vertices: bool,
}

impl Mesh {
    // ─────────────────────────────── Rewind ────────────────────────────────

    /// Moves the sweep back to `dst`, restoring the active edge list as it was
    /// there. Extends the rewind further when an edge above a replayed vertex
    /// has a top that is no longer correctly enclosed.
    fn rewind(&mut self, cursor: Option<&mut SweepCursor>, mut dst: VertIdx, c: &Comparator) -> Result<(), InternalError> {
        let Some(cursor) = cursor else {
            return Ok(());
        };
        if cursor.current == INVALID
            || cursor.current == dst
            || c.sweep_lt(self.point(cursor.current), self.point(dst))
        {
            return Ok(());
        }
        let mut v = cursor.current;
        trace!("rewinding active edges from vertex {} to vertex {}", v, dst);
        while v != dst {
            v = self.prev_vertex(v);
            if v == INVALID {
                return Err(InternalError::ActiveEdgesOutOfOrder);
            }
            let mut e = self.verts[v as usize].below.head;
            while e != INVALID {
                self.ael_remove(&mut cursor.active, e)?;
                e = self.edges[e as usize].below.next;
            }
            let mut left_edge = self.verts[v as usize].left_enclosing_edge;
            let mut e = self.verts[v as usize].above.head;
            while e != INVALID {
                self.ael_insert(&mut cursor.active, e, left_edge)?;
                left_edge = e;
                let top = self.edges[e as usize].top;
                let top_vert = &self.verts[top as usize];
                if c.sweep_lt(self.point(top), self.point(dst))
                    && ((top_vert.left_enclosing_edge != INVALID
                        && !self.is_left_of(top_vert.left_enclosing_edge, top))
                        || (top_vert.right_enclosing_edge != INVALID
                            && !self.is_right_of(top_vert.right_enclosing_edge, top)))
                {
                    dst = top;
                }
                e = self.edges[e as usize].above.next;
            }
        }
        cursor.current = v;
        Ok(())
    }

    /// Rewinds when `edge` is no longer correctly ordered against its active
    /// neighbours.
    fn rewind_if_necessary(&mut self, edge: EdgeIdx, cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        let Some(cursor) = cursor else {
            return Ok(());
        };
        if edge == INVALID {
            return Ok(());
        }
        let top = self.edges[edge as usize].top;
        let bottom = self.edges[edge as usize].bottom;
        let (pt, pb) = (self.point(top), self.point(bottom));

        let left = self.left_of(edge);
        if left != INVALID {
            let (left_top, left_bottom) = (self.edges[left as usize].top, self.edges[left as usize].bottom);
            if left_top != INVALID && left_bottom != INVALID {
                let (plt, plb) = (self.point(left_top), self.point(left_bottom));
                let dst = if c.sweep_lt(plt, pt) && !self.is_left_of(left, top) {
                    left_top
                } else if c.sweep_lt(pt, plt) && !self.is_right_of(edge, left_top) {
                    top
                } else if c.sweep_lt(pb, plb) && !self.is_left_of(left, bottom) {
                    left_top
                } else if c.sweep_lt(plb, pb) && !self.is_right_of(edge, left_bottom) {
                    top
                } else {
                    INVALID
                };
                if dst != INVALID {
                    self.rewind(Some(&mut *cursor), dst, c)?;
                }
            }
        }

        let right = self.right_of(edge);
        if right != INVALID {
            let (right_top, right_bottom) = (self.edges[right as usize].top, self.edges[right as usize].bottom);
            if right_top != INVALID && right_bottom != INVALID {
                let (prt, prb) = (self.point(right_top), self.point(right_bottom));
                let dst = if c.sweep_lt(prt, pt) && !self.is_right_of(right, top) {
                    right_top
                } else if c.sweep_lt(pt, prt) && !self.is_left_of(edge, right_top) {
                    top
                } else if c.sweep_lt(pb, prb) && !self.is_right_of(right, bottom) {
                    right_top
                } else if c.sweep_lt(prb, pb) && !self.is_left_of(edge, right_bottom) {
                    top
                } else {
                    INVALID
                };
                if dst != INVALID {
                    self.rewind(Some(cursor), dst, c)?;
                }
            }
        }
        Ok(())
    }

    // ────────────────────────── Edge surgery ───────────────────────────────

    pub(crate) fn set_top(&mut self, e: EdgeIdx, v: VertIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        self.remove_edge_below(e);
        self.edges[e as usize].top = v;
        self.recompute(e);
        self.insert_below(e, v, c);
        self.rewind_if_necessary(e, cursor.as_deref_mut(), c)?;
        self.merge_collinear_edges(e, cursor, c)
    }

    pub(crate) fn set_bottom(&mut self, e: EdgeIdx, v: VertIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        self.remove_edge_above(e);
        self.edges[e as usize].bottom = v;
        self.recompute(e);
        self.insert_above(e, v, c);
        self.rewind_if_necessary(e, cursor.as_deref_mut(), c)?;
        self.merge_collinear_edges(e, cursor, c)
    }

    fn merge_edges_above(&mut self, edge: EdgeIdx, other: EdgeIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        if edge == INVALID || other == INVALID {
            return Err(InternalError::MissingEndpoint);
        }
        let edge_top = self.edges[edge as usize].top;
        let other_top = self.edges[other as usize].top;
        if self.point(edge_top) == self.point(other_top) {
            trace!("merging coincident above edges {} and {}", edge, other);
            self.rewind(cursor.as_deref_mut(), edge_top, c)?;
            self.edges[other as usize].winding += self.edges[edge as usize].winding;
            self.disconnect(edge);
            self.edges[edge as usize].top = INVALID;
            self.edges[edge as usize].bottom = INVALID;
        } else if c.sweep_lt(self.point(edge_top), self.point(other_top)) {
            self.rewind(cursor.as_deref_mut(), edge_top, c)?;
            self.edges[other as usize].winding += self.edges[edge as usize].winding;
            self.set_bottom(edge, other_top, cursor, c)?;
        } else {
            self.rewind(cursor.as_deref_mut(), other_top, c)?;
            self.edges[edge as usize].winding += self.edges[other as usize].winding;
            self.set_bottom(other, edge_top, cursor, c)?;
        }
        Ok(())
    }

    fn merge_edges_below(&mut self, edge: EdgeIdx, other: EdgeIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        if edge == INVALID || other == INVALID {
            return Err(InternalError::MissingEndpoint);
        }
        let edge_top = self.edges[edge as usize].top;
        let edge_bottom = self.edges[edge as usize].bottom;
        let other_top = self.edges[other as usize].top;
        let other_bottom = self.edges[other as usize].bottom;
        if self.point(edge_bottom) == self.point(other_bottom) {
            trace!("merging coincident below edges {} and {}", edge, other);
            self.rewind(cursor.as_deref_mut(), edge_top, c)?;
            self.edges[other as usize].winding += self.edges[edge as usize].winding;
            self.disconnect(edge);
            self.edges[edge as usize].top = INVALID;
            self.edges[edge as usize].bottom = INVALID;
        } else if c.sweep_lt(self.point(edge_bottom), self.point(other_bottom)) {
            self.rewind(cursor.as_deref_mut(), other_top, c)?;
            self.edges[edge as usize].winding += self.edges[other as usize].winding;
            self.set_top(other, edge_bottom, cursor, c)?;
        } else {
            self.rewind(cursor.as_deref_mut(), edge_top, c)?;
            self.edges[other as usize].winding += self.edges[edge as usize].winding;
            self.set_top(edge, other_bottom, cursor, c)?;
        }
        Ok(())
    }

    fn top_collinear(&self, left: EdgeIdx, right: EdgeIdx) -> bool {
        if left == INVALID || right == INVALID {
            return false;
        }
        let (lt, rt) = (self.edges[left as usize].top, self.edges[right as usize].top);
        self.point(lt) == self.point(rt) || !self.is_left_of(left, rt) || !self.is_right_of(right, lt)
    }

    fn bottom_collinear(&self, left: EdgeIdx, right: EdgeIdx) -> bool {
        if left == INVALID || right == INVALID {
            return false;
        }
        let (lb, rb) = (self.edges[left as usize].bottom, self.edges[right as usize].bottom);
        self.point(lb) == self.point(rb) || !self.is_left_of(left, rb) || !self.is_right_of(right, lb)
    }

    /// Merges `e` with neighbours above or below that share an endpoint and
    /// are collinear with it, until none are left.
    pub(crate) fn merge_collinear_edges(&mut self, e: EdgeIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<(), InternalError> {
        loop {
            if self.edges[e as usize].top == INVALID {
                break;
            }
            let edge = &self.edges[e as usize];
            let (prev_above, next_above) = (edge.above.prev, edge.above.next);
            let (prev_below, next_below) = (edge.below.prev, edge.below.next);
            if self.top_collinear(prev_above, e) {
                self.merge_edges_above(prev_above, e, cursor.as_deref_mut(), c)?;
            } else if self.top_collinear(e, next_above) {
                self.merge_edges_above(next_above, e, cursor.as_deref_mut(), c)?;
            } else if self.bottom_collinear(prev_below, e) {
                self.merge_edges_below(prev_below, e, cursor.as_deref_mut(), c)?;
            } else if self.bottom_collinear(e, next_below) {
                self.merge_edges_below(next_below, e, cursor.as_deref_mut(), c)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Splits `e` at `v`. Returns false when `v` is already an endpoint.
    fn split_edge(&mut self, e: EdgeIdx, v: VertIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<bool, InternalError> {
        let (e_top, e_bottom) = (self.edges[e as usize].top, self.edges[e as usize].bottom);
        if e_top == INVALID || e_bottom == INVALID || v == e_top || v == e_bottom {
            return Ok(false);
        }
        trace!("splitting edge ({} -> {}) at vertex {} {:?}", e_top, e_bottom, v, self.point(v));
        let mut winding = self.edges[e as usize].winding;
        // Rounding can leave `v` outside the segment in sweep order. The
        // piece that ends up reversed gets its winding flipped.
        let (top, bottom) = if c.sweep_lt(self.point(v), self.point(e_top)) {
            winding = -winding;
            self.set_top(e, v, cursor.as_deref_mut(), c)?;
            (v, e_top)
        } else if c.sweep_lt(self.point(e_bottom), self.point(v)) {
            winding = -winding;
            self.set_bottom(e, v, cursor.as_deref_mut(), c)?;
            (e_bottom, v)
        } else {
            self.set_bottom(e, v, cursor.as_deref_mut(), c)?;
            (v, e_bottom)
        };
        let edge_type = self.edges[e as usize].edge_type;
        let new_edge = self.alloc_edge(top, bottom, winding, edge_type);
        self.insert_below(new_edge, top, c);
        self.insert_above(new_edge, bottom, c);
        self.merge_collinear_edges(new_edge, cursor, c)?;
        Ok(true)
    }

    /// Corrects topology when the sidedness tests say two edges cross even
    /// though no intersection point could be computed.
    fn intersect_edge_pair(&mut self, left: EdgeIdx, right: EdgeIdx, mut cursor: Option<&mut SweepCursor>, c: &Comparator) -> Result<bool, InternalError> {
        let l = &self.edges[left as usize];
        let r = &self.edges[right as usize];
        let (lt, lb, rt, rb) = (l.top, l.bottom, r.top, r.bottom);
        if lt == INVALID || lb == INVALID || rt == INVALID || rb == INVALID {
            return Ok(false);
        }
        if lt == rt || lb == rb {
            return Ok(false);
        }
        let mut split = INVALID;
        let mut split_at = INVALID;
        if c.sweep_lt(self.point(lt), self.point(rt)) {
            if !self.is_left_of(left, rt) {
                split = left;
                split_at = rt;
            }
        } else if !self.is_right_of(right, lt) {
            split = right;
            split_at = lt;
        }
        if c.sweep_lt(self.point(rb), self.point(lb)) {
            if !self.is_left_of(left, rb) {
                split = left;
                split_at = rb;
            }
        } else if !self.is_right_of(right, lb) {
            split = right;
            split_at = lb;
        }
        if split == INVALID {
            return Ok(false);
        }
        // The split edge moves, so replay from its top.
        let split_top = self.edges[split as usize].top;
        self.rewind(cursor.as_deref_mut(), split_top, c)?;
        self.split_edge(split, split_at, cursor, c)
    }

    /// Connects two vertices outside of a sweep. Returns the new edge, or
    /// `None` when either vertex is missing or they coincide.
    pub(crate) fn make_connecting_edge(
        &mut self,
        prev: VertIdx,
        next: VertIdx,
        edge_type: EdgeType,
        c: &Comparator,
        winding_scale: i32,
    ) -> Result<Option<EdgeIdx>, InternalError> {
        if prev == INVALID || next == INVALID || self.point(prev) == self.point(next) {
            return Ok(None);
        }
        let e = self.make_edge(prev, next, edge_type, c);
        let (top, bottom) = (self.edges[e as usize].top, self.edges[e as usize].bottom);
        self.insert_below(e, top, c);
        self.insert_above(e, bottom, c);
        self.edges[e as usize].winding *= winding_scale;
        self.merge_collinear_edges(e, None, c)?;
        Ok(Some(e))
    }

    /// Folds `src` into `dst`, reattaching all of its edges.
    fn merge_vertices(&mut self, src: VertIdx, dst: VertIdx, list: &mut VertexList, c: &Comparator) -> Result<(), InternalError> {
        trace!("found coincident verts at {:?}; merging {} into {}", self.point(src), src, dst);
        let alpha = self.verts[src as usize].alpha.max(self.verts[dst as usize].alpha);
        self.verts[dst as usize].alpha = alpha;
        let partner = self.verts[src as usize].partner;
        if partner != INVALID {
            self.verts[partner as usize].partner = dst;
        }
        loop {
            let e = self.verts[src as usize].above.head;
            if e == INVALID {
                break;
            }
            self.set_bottom(e, dst, None, c)?;
        }
        loop {
            let e = self.verts[src as usize].below.head;
            if e == INVALID {
                break;
            }
            self.set_top(e, dst, None, c)?;
        }
        self.vlist_remove(list, src);
        self.verts[dst as usize].synthetic = true;
        Ok(())
    }

    /// Finds or inserts the vertex at `p` in the sorted list, searching from
    /// `reference`.
    pub(crate) fn make_sorted_vertex(&mut self, p: Point, alpha: u8, list: &mut VertexList, reference: VertIdx, c: &Comparator) -> VertIdx {
        let mut prev = reference;
        while prev != INVALID && c.sweep_lt(p, self.point(prev)) {
            prev = self.prev_vertex(prev);
        }
        let mut next = if prev != INVALID { self.next_vertex(prev) } else { list.head };
        while next != INVALID && c.sweep_lt(self.point(next), p) {
            prev = next;
            next = self.next_vertex(next);
        }
        if prev != INVALID && self.point(prev) == p {
            prev
        } else if next != INVALID && self.point(next) == p {
            next
        } else {
            let v = self.alloc_vertex(p, alpha);
            self.vlist_insert(list, v, prev, next);
            v
        }
    }

    /// Gives a synthetic AA vertex a partner on the far side of the stroke,
    /// where the offset lines of the two crossing edges meet.
    pub(crate) fn compute_bisector(&mut self, e1: EdgeIdx, e2: EdgeIdx, v: VertIdx) {
        let mut line1 = self.edges[e1 as usize].line;
        let mut line2 = self.edges[e2 as usize].line;
        line1.normalize();
        line2.normalize();
        let cos_angle = line1.a * line2.a + line1.b * line2.b;
        if cos_angle > AA_BISECTOR_COS_LIMIT {
            return;
        }
        line1.c += if self.edges[e1 as usize].winding > 0 { -1.0 } else { 1.0 };
        line2.c += if self.edges[e2 as usize].winding > 0 { -1.0 } else { 1.0 };
        if let Some(p) = line1.intersect(&line2) {
            let alpha = if self.edges[e1 as usize].edge_type == EdgeType::Outer { 255 } else { 0 };
            let partner = self.alloc_vertex(p, alpha);
            self.verts[v as usize].partner = partner;
            trace!("computed bisector {:?} alpha {} for vertex {}", p, alpha, v);
        }
    }

    /// Tests two active neighbours for a crossing and splits both at it.
    fn check_for_intersection(
        &mut self,
        left: EdgeIdx,
        right: EdgeIdx,
        cursor: &mut SweepCursor,
        list: &mut VertexList,
        c: &Comparator,
    ) -> Result<bool, InternalError> {
        if left == INVALID || right == INVALID {
            return Ok(false);
        }
        let l = &self.edges[left as usize];
        let r = &self.edges[right as usize];
        if l.top == INVALID || l.bottom == INVALID || r.top == INVALID || r.bottom == INVALID {
            return Err(InternalError::MissingEndpoint);
        }
        let hit = match self.intersect(&self.geom(left), &self.geom(right)) {
            Some((p, alpha)) if p.is_finite() => Some((p, alpha)),
            _ => None,
        };
        let Some((mut p, alpha)) = hit else {
            return self.intersect_edge_pair(left, right, Some(cursor), c);
        };
        trace!("found intersection, pt is {:?}", p);

        // Rewind to the vertex above the intersection.
        let mut top = cursor.current;
        while top != INVALID && c.sweep_lt(p, self.point(top)) {
            top = self.prev_vertex(top);
        }

        // The computed point can stray past a segment's end; keep it inside
        // both segments' boxes.
        let (lt, lb) = (self.edges[left as usize].top, self.edges[left as usize].bottom);
        let (rt, rb) = (self.edges[right as usize].top, self.edges[right as usize].bottom);
        p = c.clamp(p, self.point(lt), self.point(lb));
        p = c.clamp(p, self.point(rt), self.point(rb));

        let v = if p == self.point(lt) {
            lt
        } else if p == self.point(lb) {
            lb
        } else if p == self.point(rt) {
            rt
        } else if p == self.point(rb) {
            rb
        } else {
            let v = self.make_sorted_vertex(p, alpha, list, top, c);
            if self.verts[lt as usize].partner != INVALID {
                self.verts[v as usize].synthetic = true;
                self.compute_bisector(left, right, v);
            }
            v
        };
        self.rewind(Some(&mut *cursor), if top != INVALID { top } else { v }, c)?;
        self.split_edge(left, v, Some(&mut *cursor), c)?;
        self.split_edge(right, v, Some(&mut *cursor), c)?;
        let vert = &mut self.verts[v as usize];
        vert.alpha = vert.alpha.max(alpha);
        Ok(true)
    }

    // ─────────────────────────── Mesh building ─────────────────────────────

    /// Clamps contour points to finite f32 range, optionally rounds them, and
    /// drops coincident, non-finite and collinear vertices.
    pub fn sanitize_contours(&mut self, contours: &mut [VertexList], opts: SanitizeOptions) {
        for contour in contours.iter_mut() {
            if contour.is_empty() {
                continue;
            }
            let mut prev = contour.tail;
            self.clamp_vertex(prev, opts.round_to_quarter_pixel);
            let mut v = contour.head;
            while v != INVALID {
                self.clamp_vertex(v, opts.round_to_quarter_pixel);
                let next = self.next_vertex(v);
                let next_wrap = if next != INVALID { next } else { contour.head };
                let p = self.point(v);
                if self.point(prev) == p {
                    trace!("vertex {:?} coincident; removing", p);
                    self.vlist_remove(contour, v);
                } else if !p.is_finite() {
                    trace!("vertex {:?} non-finite; removing", p);
                    self.vlist_remove(contour, v);
                } else if !opts.preserve_collinear_vertices
                    && Line::from_points(self.point(prev), self.point(next_wrap)).dist(p) == 0.0
                {
                    trace!("vertex {:?} collinear; removing", p);
                    self.vlist_remove(contour, v);
                } else {
                    prev = v;
                }
                v = next;
            }
        }
    }

    // Infinite coordinates are left alone so the finiteness test drops them.
    fn clamp_vertex(&mut self, v: VertIdx, round: bool) {
        let p = &mut self.verts[v as usize].point;
        if !p.is_finite() {
            return;
        }
        p.x = double_to_clamped_scalar(p.x as f64);
        p.y = double_to_clamped_scalar(p.y as f64);
        if round {
            round_to_quarter_pixel(p);
        }
    }

    /// Connects each contour into a closed ring of edges and moves its
    /// vertices onto `list`.
    pub fn build_edges(&mut self, contours: &[VertexList], list: &mut VertexList, c: &Comparator) -> Result<(), InternalError> {
        for contour in contours {
            let mut prev = contour.tail;
            let mut v = contour.head;
            while v != INVALID {
                let next = self.next_vertex(v);
                self.make_connecting_edge(prev, v, EdgeType::Inner, c, 1)?;
                self.vlist_append(list, v);
                prev = v;
                v = next;
            }
        }
        Ok(())
    }

    /// Merges two sorted lists into one, emptying both.
    pub fn sorted_merge(&mut self, front: &mut VertexList, back: &mut VertexList, c: &Comparator) -> VertexList {
        let mut result = VertexList::default();
        let mut a = front.head;
        let mut b = back.head;
        while a != INVALID && b != INVALID {
            if c.sweep_lt(self.point(a), self.point(b)) {
                self.vlist_remove(front, a);
                self.vlist_append(&mut result, a);
                a = front.head;
            } else {
                self.vlist_remove(back, b);
                self.vlist_append(&mut result, b);
                b = back.head;
            }
        }
        list_concat(&mut self.verts, vert_link, &mut result, front);
        list_concat(&mut self.verts, vert_link, &mut result, back);
        result
    }

    /// Sorts `list` along the sweep direction (stable merge sort).
    pub fn sort_mesh(&mut self, list: &mut VertexList, c: &Comparator) {
        let mut slow = list.head;
        if slow == INVALID {
            return;
        }
        let mut fast = self.next_vertex(slow);
        if fast == INVALID {
            return;
        }
        loop {
            fast = self.next_vertex(fast);
            if fast != INVALID {
                fast = self.next_vertex(fast);
                slow = self.next_vertex(slow);
            }
            if fast == INVALID {
                break;
            }
        }
        let back_head = self.next_vertex(slow);
        let mut front = List { head: list.head, tail: slow };
        let mut back = List { head: back_head, tail: list.tail };
        self.verts[slow as usize].link.next = INVALID;
        self.verts[back_head as usize].link.prev = INVALID;
        self.sort_mesh(&mut front, c);
        self.sort_mesh(&mut back, c);
        *list = self.sorted_merge(&mut front, &mut back, c);
    }

    /// Collapses vertices that sort equal (or out of order after rounding)
    /// into their predecessor. Returns true when anything merged.
    pub fn merge_coincident_vertices(&mut self, list: &mut VertexList, c: &Comparator) -> Result<bool, InternalError> {
        if list.head == INVALID {
            return Ok(false);
        }
        let mut merged = false;
        let mut v = self.next_vertex(list.head);
        while v != INVALID {
            let next = self.next_vertex(v);
            let prev = self.prev_vertex(v);
            if c.sweep_lt(self.point(v), self.point(prev)) {
                self.verts[v as usize].point = self.point(prev);
            }
            if self.point(prev) == self.point(v) {
                self.merge_vertices(v, prev, list, c)?;
                merged = true;
            }
            v = next;
        }
        Ok(merged)
    }

    // ──────────────────────────── Simplify ─────────────────────────────────

    /// Sweeps the sorted mesh, splitting crossing edges until none cross
    /// except at shared vertices.
    pub fn simplify(&mut self, list: &mut VertexList, c: &Comparator) -> Result<SimplifyResult, InternalError> {
        debug!("simplifying complex polygons");
        let initial_edges = self.edge_count();
        let mut result = SimplifyResult::AlreadySimple;
        let mut cursor = SweepCursor {
            active: EdgeList::default(),
            current: list.head,
        };
        while cursor.current != INVALID {
            if !self.verts[cursor.current as usize].is_connected() {
                cursor.current = self.next_vertex(cursor.current);
                continue;
            }
            if self.edge_count() > self.max_edge_growth.saturating_mul(initial_edges) {
                debug!("edge count {} exceeds {}x the initial {}", self.edge_count(), self.max_edge_growth, initial_edges);
                return Err(InternalError::EdgeCountExploded);
            }
            let (mut left_enclosing, mut right_enclosing);
            loop {
                let v = cursor.current;
                trace!("vertex {}: {:?}, alpha {}", v, self.point(v), self.verts[v as usize].alpha);
                (left_enclosing, right_enclosing) = self.find_enclosing_edges(v, &cursor.active);
                self.verts[v as usize].left_enclosing_edge = left_enclosing;
                self.verts[v as usize].right_enclosing_edge = right_enclosing;
                let mut restart = false;
                if self.verts[v as usize].below.head != INVALID {
                    let mut edge = self.verts[v as usize].below.head;
                    while edge != INVALID {
                        let found = self.check_for_intersection(left_enclosing, edge, &mut cursor, list, c)?
                            || self.check_for_intersection(edge, right_enclosing, &mut cursor, list, c)?;
                        if found {
                            restart = true;
                            break;
                        }
                        edge = self.edges[edge as usize].below.next;
                    }
                } else {
                    restart = self.check_for_intersection(left_enclosing, right_enclosing, &mut cursor, list, c)?;
                }
                if !restart {
                    break;
                }
                result = SimplifyResult::FoundSelfIntersection;
            }
            if cfg!(debug_assertions) {
                self.validate_edge_list(&cursor.active, c)?;
            }
            let v = cursor.current;
            let mut e = self.verts[v as usize].above.head;
            while e != INVALID {
                self.ael_remove(&mut cursor.active, e)?;
                e = self.edges[e as usize].above.next;
            }
            let mut left_edge = left_enclosing;
            let mut e = self.verts[v as usize].below.head;
            while e != INVALID {
                self.ael_insert(&mut cursor.active, e, left_edge)?;
                left_edge = e;
                e = self.edges[e as usize].below.next;
            }
            cursor.current = self.next_vertex(v);
        }
        debug_assert!(cursor.active.is_empty());
        Ok(result)
    }

    fn validate_edge_pair(&self, left: EdgeIdx, right: EdgeIdx, c: &Comparator) -> bool {
        let l = &self.edges[left as usize];
        let r = &self.edges[right as usize];
        let tops_ok = if l.top == r.top {
            self.is_left_of(left, r.bottom) && self.is_right_of(right, l.bottom)
        } else if c.sweep_lt(self.point(l.top), self.point(r.top)) {
            self.is_left_of(left, r.top)
        } else {
            self.is_right_of(right, l.top)
        };
        let bottoms_ok = if l.bottom == r.bottom {
            self.is_left_of(left, r.top) && self.is_right_of(right, l.top)
        } else if c.sweep_lt(self.point(r.bottom), self.point(l.bottom)) {
            self.is_left_of(left, r.bottom)
        } else {
            self.is_right_of(right, l.bottom)
        };
        tops_ok && bottoms_ok
    }

    fn validate_edge_list(&self, edges: &EdgeList, c: &Comparator) -> Result<(), InternalError> {
        let mut left = edges.head;
        if left == INVALID {
            return Ok(());
        }
        let mut right = self.right_of(left);
        while right != INVALID {
            if !self.validate_edge_pair(left, right, c) {
                return Err(InternalError::ActiveEdgesOutOfOrder);
            }
            left = right;
            right = self.right_of(right);
        }
        Ok(())
    }
}
