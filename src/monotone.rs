// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Stage 5-6: decompose the planar mesh into monotone polygons and triangulate
// them.
//
// A second sweep walks the simplified mesh. Every region between two active
// edges belongs to a `Poly`, built from one or more `MonotonePoly` chains.
// When a region splits around a vertex with nothing above it, a join edge
// connects the vertex to the region's last vertex. When two regions merge
// over a vertex with nothing below it, they become partners and the next edge
// added to either one resolves them.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::arena::list_append;
use crate::error::InternalError;
use crate::mesh::{mono_link, EdgeIdx, EdgeList, EdgeType, Mesh, MonoIdx, PolyIdx, Side, VertIdx, VertexList, INVALID};
use crate::path::FillType;

impl Mesh {
    fn make_poly(&mut self, polys: &mut PolyIdx, v: VertIdx, winding: i32) -> PolyIdx {
        let poly = self.alloc_poly(v, winding);
        self.polys[poly as usize].next = *polys;
        *polys = poly;
        poly
    }

    fn last_vertex(&self, poly: PolyIdx) -> VertIdx {
        let tail = self.polys[poly as usize].monos.tail;
        if tail != INVALID {
            self.edges[self.monos[tail as usize].edges.tail as usize].bottom
        } else {
            self.polys[poly as usize].first_vertex
        }
    }

    /// Adds `e` to one side of `poly` and returns the poly that now owns that
    /// side, which is the partner when a pending merge gets resolved.
    pub(crate) fn poly_add_edge(&mut self, poly: PolyIdx, e: EdgeIdx, side: Side) -> PolyIdx {
        trace!(
            "add edge ({} -> {}) to poly {}, {:?} side",
            self.edges[e as usize].top,
            self.edges[e as usize].bottom,
            poly,
            side
        );
        let used = match side {
            Side::Right => self.edges[e as usize].used_in_right_poly,
            Side::Left => self.edges[e as usize].used_in_left_poly,
        };
        if used {
            return poly;
        }
        let partner = self.polys[poly as usize].partner;
        if partner != INVALID {
            self.polys[poly as usize].partner = INVALID;
            self.polys[partner as usize].partner = INVALID;
        }
        let winding = self.polys[poly as usize].winding;
        let tail = self.polys[poly as usize].monos.tail;
        if tail == INVALID {
            let m = self.alloc_monotone_poly(e, side, winding);
            list_append(&mut self.monos, mono_link, m, &mut self.polys[poly as usize].monos);
            self.polys[poly as usize].count += 2;
            return poly;
        }
        let tail_bottom = self.edges[self.monos[tail as usize].edges.tail as usize].bottom;
        let e_bottom = self.edges[e as usize].bottom;
        if e_bottom == tail_bottom {
            return poly;
        }
        if side == self.monos[tail as usize].side {
            self.mono_add_edge(tail, e);
            self.polys[poly as usize].count += 1;
            return poly;
        }
        let join = self.alloc_edge(tail_bottom, e_bottom, 1, EdgeType::Inner);
        self.mono_add_edge(tail, join);
        self.polys[poly as usize].count += 1;
        if partner != INVALID {
            self.poly_add_edge(partner, join, side);
            partner
        } else {
            let m = self.alloc_monotone_poly(join, side, winding);
            list_append(&mut self.monos, mono_link, m, &mut self.polys[poly as usize].monos);
            poly
        }
    }

    /// Sweeps the simplified mesh and returns the head of the poly chain.
    pub fn tessellate(&mut self, list: &VertexList) -> Result<PolyIdx, InternalError> {
        debug!("tessellating simple polygons");
        let mut active = EdgeList::default();
        let mut polys = INVALID;
        let mut v = list.head;
        while v != INVALID {
            let next_v = self.next_vertex(v);
            if !self.verts[v as usize].is_connected() {
                v = next_v;
                continue;
            }
            trace!("vertex {}: {:?}, alpha {}", v, self.point(v), self.verts[v as usize].alpha);
            let (left_enclosing, right_enclosing) = self.find_enclosing_edges(v, &active);
            let above = self.verts[v as usize].above;
            let below = self.verts[v as usize].below;
            let (mut left_poly, mut right_poly) = if above.head != INVALID {
                (self.edges[above.head as usize].left_poly, self.edges[above.tail as usize].right_poly)
            } else {
                (
                    if left_enclosing != INVALID { self.edges[left_enclosing as usize].right_poly } else { INVALID },
                    if right_enclosing != INVALID { self.edges[right_enclosing as usize].left_poly } else { INVALID },
                )
            };

            if above.head != INVALID {
                if left_poly != INVALID {
                    left_poly = self.poly_add_edge(left_poly, above.head, Side::Right);
                }
                if right_poly != INVALID {
                    right_poly = self.poly_add_edge(right_poly, above.tail, Side::Left);
                }
                let mut e = above.head;
                while e != above.tail {
                    let right_edge = self.edges[e as usize].above.next;
                    self.ael_remove(&mut active, e)?;
                    let e_right_poly = self.edges[e as usize].right_poly;
                    if e_right_poly != INVALID {
                        self.poly_add_edge(e_right_poly, e, Side::Left);
                    }
                    let next_left_poly = self.edges[right_edge as usize].left_poly;
                    if next_left_poly != INVALID && next_left_poly != e_right_poly {
                        self.poly_add_edge(next_left_poly, e, Side::Right);
                    }
                    e = right_edge;
                }
                self.ael_remove(&mut active, above.tail)?;
                if below.head == INVALID && left_poly != INVALID && right_poly != INVALID && left_poly != right_poly {
                    self.polys[right_poly as usize].partner = left_poly;
                    self.polys[left_poly as usize].partner = right_poly;
                }
            }

            if below.head != INVALID {
                if above.head == INVALID && left_poly != INVALID && right_poly != INVALID {
                    if left_poly == right_poly {
                        let tail = self.polys[left_poly as usize].monos.tail;
                        let winding = self.polys[left_poly as usize].winding;
                        if tail != INVALID && self.monos[tail as usize].side == Side::Left {
                            let last = self.last_vertex(left_poly);
                            left_poly = self.make_poly(&mut polys, last, winding);
                            self.edges[left_enclosing as usize].right_poly = left_poly;
                        } else {
                            let last = self.last_vertex(right_poly);
                            right_poly = self.make_poly(&mut polys, last, winding);
                            self.edges[right_enclosing as usize].left_poly = right_poly;
                        }
                    }
                    let join = self.alloc_edge(self.last_vertex(left_poly), v, 1, EdgeType::Inner);
                    left_poly = self.poly_add_edge(left_poly, join, Side::Right);
                    right_poly = self.poly_add_edge(right_poly, join, Side::Left);
                }
                let mut left_edge = below.head;
                self.edges[left_edge as usize].left_poly = left_poly;
                self.ael_insert(&mut active, left_edge, left_enclosing)?;
                let mut right_edge = self.edges[left_edge as usize].below.next;
                while right_edge != INVALID {
                    self.ael_insert(&mut active, right_edge, left_edge)?;
                    let left_edge_poly = self.edges[left_edge as usize].left_poly;
                    let mut winding = if left_edge_poly != INVALID { self.polys[left_edge_poly as usize].winding } else { 0 };
                    winding += self.edges[left_edge as usize].winding;
                    if winding != 0 {
                        let poly = self.make_poly(&mut polys, v, winding);
                        self.edges[left_edge as usize].right_poly = poly;
                        self.edges[right_edge as usize].left_poly = poly;
                    }
                    left_edge = right_edge;
                    right_edge = self.edges[right_edge as usize].below.next;
                }
                self.edges[below.tail as usize].right_poly = right_poly;
            }
            v = next_v;
        }
        Ok(polys)
    }

    /// Iterates the poly chain starting at `head`.
    pub fn polys_from(&self, head: PolyIdx) -> impl Iterator<Item = PolyIdx> + '_ {
        std::iter::successors(Some(head).filter(|&p| p != INVALID), move |&p| {
            Some(self.polys[p as usize].next).filter(|&n| n != INVALID)
        })
    }

    /// Upper bound on the vertices `emit_polys` produces for `fill`.
    pub fn count_points(&self, polys: PolyIdx, fill: FillType) -> usize {
        self.polys_from(polys)
            .map(|p| &self.polys[p as usize])
            .filter(|poly| fill.contains(poly.winding) && poly.count >= 3)
            .map(|poly| (poly.count as usize - 2) * 3)
            .sum()
    }

    /// Emits every triangle of the polys selected by `fill`, three vertices at
    /// a time, along with the winding of the poly they came from.
    pub fn emit_polys<F: FnMut(VertIdx, i32)>(&self, polys: PolyIdx, fill: FillType, mut emit: F) {
        for p in self.polys_from(polys) {
            let poly = &self.polys[p as usize];
            if !fill.contains(poly.winding) || poly.count < 3 {
                continue;
            }
            trace!("emit poly {}, size {}", p, poly.count);
            let winding = poly.winding;
            let mut m = poly.monos.head;
            while m != INVALID {
                self.emit_monotone_poly(m, &mut |v| emit(v, winding));
                m = self.monos[m as usize].link.next;
            }
        }
    }

    /// Ear-clips one monotone chain.
    fn emit_monotone_poly(&self, m: MonoIdx, emit: &mut dyn FnMut(VertIdx)) {
        let mono = &self.monos[m as usize];
        debug_assert!(mono.winding != 0);
        let mut e = mono.edges.head;
        if e == INVALID {
            return;
        }
        let mut ordered = VecDeque::new();
        ordered.push_back(self.edges[e as usize].top);
        while e != INVALID {
            let edge = &self.edges[e as usize];
            match mono.side {
                Side::Right => {
                    ordered.push_back(edge.bottom);
                    e = edge.right_poly_link.next;
                }
                Side::Left => {
                    ordered.push_front(edge.bottom);
                    e = edge.left_poly_link.next;
                }
            }
        }
        let verts: Vec<VertIdx> = ordered.into();
        let n = verts.len();
        if n < 3 {
            return;
        }
        // Clipped ears are unlinked through these, the slice itself is left alone.
        let mut prev: Vec<usize> = (0..n).map(|i| i.wrapping_sub(1)).collect();
        let mut next: Vec<usize> = (1..=n).collect();
        let first = 0;
        let last = n - 1;
        let mut count = n;
        let mut i = next[first];
        while i != last {
            let (p, nx) = (prev[i], next[i]);
            let (v0, v1, v2) = (verts[p], verts[i], verts[nx]);
            if count == 3 {
                self.emit_triangle(v0, v1, v2, mono.winding, emit);
                return;
            }
            let (a, b, c) = (self.point(v0), self.point(v1), self.point(v2));
            let ax = b.x as f64 - a.x as f64;
            let ay = b.y as f64 - a.y as f64;
            let bx = c.x as f64 - b.x as f64;
            let by = c.y as f64 - b.y as f64;
            if ax * by - ay * bx >= 0.0 {
                self.emit_triangle(v0, v1, v2, mono.winding, emit);
                next[p] = nx;
                prev[nx] = p;
                count -= 1;
                i = if p == first { nx } else { p };
            } else {
                i = nx;
            }
        }
    }

    // Positive windings are flipped so every triangle winds like a fan of
    // the original path.
    fn emit_triangle(&self, mut prev: VertIdx, curr: VertIdx, mut next: VertIdx, winding: i32, emit: &mut dyn FnMut(VertIdx)) {
        if winding > 0 {
            std::mem::swap(&mut prev, &mut next);
        }
        trace!("emit triangle {:?} {:?} {:?}", self.point(prev), self.point(curr), self.point(next));
        emit(prev);
        emit(curr);
        emit(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Comparator, Direction, Point};
    use crate::sweep::SanitizeOptions;

    fn triangulate(pts: &[(f32, f32)], fill: FillType) -> (Vec<[Point; 3]>, usize) {
        let c = Comparator::new(Direction::Vertical);
        let mut mesh = Mesh::new();
        let mut contour = VertexList::default();
        for &(x, y) in pts {
            let v = mesh.alloc_vertex(Point::new(x, y), 255);
            mesh.vlist_append(&mut contour, v);
        }
        let mut contours = [contour];
        mesh.sanitize_contours(&mut contours, SanitizeOptions::default());
        let mut list = VertexList::default();
        mesh.build_edges(&contours, &mut list, &c).unwrap();
        mesh.sort_mesh(&mut list, &c);
        mesh.merge_coincident_vertices(&mut list, &c).unwrap();
        mesh.simplify(&mut list, &c).unwrap();
        let polys = mesh.tessellate(&list).unwrap();
        let bound = mesh.count_points(polys, fill);
        let mut flat = Vec::new();
        mesh.emit_polys(polys, fill, |v, _| flat.push(mesh.point(v)));
        let tris = flat.chunks(3).map(|t| [t[0], t[1], t[2]]).collect();
        (tris, bound)
    }

    fn signed_area(t: &[Point; 3]) -> f32 {
        ((t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[2].x - t[0].x) * (t[1].y - t[0].y)) * 0.5
    }

    #[test]
    fn square_is_two_triangles() {
        let (tris, bound) = triangulate(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], FillType::Winding);
        assert_eq!(tris.len(), 2);
        assert_eq!(bound, 6);
        let area: f32 = tris.iter().map(|t| signed_area(t).abs()).sum();
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn triangles_share_one_orientation() {
        let (cw, _) = triangulate(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)], FillType::Winding);
        let (ccw, _) = triangulate(&[(0.0, 0.0), (0.0, 3.0), (4.0, 3.0), (4.0, 0.0)], FillType::Winding);
        let sign = |tris: &[[Point; 3]]| tris.iter().map(|t| signed_area(t).signum()).collect::<Vec<_>>();
        assert!(sign(&cw).iter().all(|s| *s == sign(&cw)[0]));
        assert!(sign(&ccw).iter().all(|s| *s == sign(&ccw)[0]));
    }

    #[test]
    fn concave_polygon_area() {
        // An arrow head: the notch makes the sweep split and merge regions.
        let pts = [(0.0, 0.0), (5.0, 4.0), (10.0, 0.0), (5.0, 10.0)];
        let (tris, _) = triangulate(&pts, FillType::Winding);
        let area: f32 = tris.iter().map(|t| signed_area(t).abs()).sum();
        assert!((area - 30.0).abs() < 1e-4, "area {}", area);
    }

    #[test]
    fn u_shape_merges_partners() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (1.0, 2.0), (2.0, 2.0), (2.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)];
        let (tris, bound) = triangulate(&pts, FillType::Winding);
        let area: f32 = tris.iter().map(|t| signed_area(t).abs()).sum();
        assert!((area - 7.0).abs() < 1e-4, "area {}", area);
        assert!(tris.len() * 3 <= bound);
    }

    #[test]
    fn empty_fill_emits_nothing() {
        let (tris, bound) = triangulate(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], FillType::InverseWinding);
        assert!(tris.is_empty());
        assert_eq!(bound, 0);
    }
}
