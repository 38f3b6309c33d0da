// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Collapse of overlapping stroke regions.
//
// Where the inner or outer ring folds over itself the winding leaves its
// legal range. The edges bounding such regions form a straight skeleton;
// each skeleton edge shrinks toward the point where the bisectors at its
// ends meet, and those collapse events are processed in alpha order. When an
// edge collapses its neighbours are rejoined at the collapse point.

use std::collections::HashMap;

use log::{debug, trace};

use crate::error::InternalError;
use crate::geom::{Comparator, Line, Point};
use crate::mesh::{EdgeIdx, EdgeList, EdgeType, Mesh, VertIdx, VertexList, INVALID};
use crate::priorityq::PriorityQ;

/// Which events the collapse processes first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventOrder {
    /// Inner rings shrink from the opaque side.
    HighestAlphaFirst,
    /// Outer rings shrink from the transparent side.
    LowestAlphaFirst,
}

type SsVertIdx = u32;
type SsEdgeIdx = u32;
type EventIdx = u32;

#[derive(Copy, Clone, Debug)]
struct SsVertex {
    vertex: VertIdx,
    prev: SsEdgeIdx,
    next: SsEdgeIdx,
}

#[derive(Copy, Clone, Debug)]
struct SsEdge {
    /// Mesh edge this skeleton edge follows; INVALID once collapsed.
    edge: EdgeIdx,
    event: EventIdx,
    prev: SsVertIdx,
    next: SsVertIdx,
}

#[derive(Copy, Clone, Debug)]
struct Event {
    /// Skeleton edge that collapses; INVALID once cancelled.
    edge: SsEdgeIdx,
    point: Point,
    alpha: u8,
}

fn highest_alpha_first(a: &(u8, EventIdx), b: &(u8, EventIdx)) -> bool {
    a.0 >= b.0
}

fn lowest_alpha_first(a: &(u8, EventIdx), b: &(u8, EventIdx)) -> bool {
    a.0 <= b.0
}

/// Whether `e` bounds a region where its ring overlaps itself.
pub(crate) fn is_overlap_edge(mesh: &Mesh, e: EdgeIdx) -> bool {
    let edge = &mesh.edges[e as usize];
    match edge.edge_type {
        EdgeType::Outer => edge.winding != 0 && edge.winding != 1,
        EdgeType::Inner => edge.winding != 0 && edge.winding != -2,
        EdgeType::Connector => false,
    }
}

/// Unit winding for an overlap edge kept on the ring's outer boundary. Only
/// the sign of `winding` survives; zero counts as positive.
fn boundary_winding(edge_type: EdgeType, winding: i32) -> i32 {
    let unit = if edge_type == EdgeType::Inner { 2 } else { 1 };
    if winding < 0 {
        -unit
    } else {
        unit
    }
}

struct Skeleton {
    verts: Vec<SsVertex>,
    edges: Vec<SsEdge>,
    events: Vec<Event>,
    queue: PriorityQ<(u8, EventIdx)>,
    vertex_map: HashMap<VertIdx, SsVertIdx>,
}

impl Skeleton {
    fn new(order: EventOrder) -> Self {
        let leq = match order {
            EventOrder::HighestAlphaFirst => highest_alpha_first,
            EventOrder::LowestAlphaFirst => lowest_alpha_first,
        };
        Skeleton {
            verts: Vec::new(),
            edges: Vec::new(),
            events: Vec::new(),
            queue: PriorityQ::new(leq),
            vertex_map: HashMap::new(),
        }
    }

    fn alloc_vertex(&mut self, vertex: VertIdx) -> SsVertIdx {
        let idx = self.verts.len() as SsVertIdx;
        self.verts.push(SsVertex {
            vertex,
            prev: INVALID,
            next: INVALID,
        });
        idx
    }

    fn vertex_for(&mut self, vertex: VertIdx) -> SsVertIdx {
        if let Some(&ssv) = self.vertex_map.get(&vertex) {
            return ssv;
        }
        let ssv = self.alloc_vertex(vertex);
        self.vertex_map.insert(vertex, ssv);
        ssv
    }

    fn push_event(&mut self, e: SsEdgeIdx, point: Point, alpha: u8) {
        let idx = self.events.len() as EventIdx;
        self.events.push(Event { edge: e, point, alpha });
        self.edges[e as usize].event = idx;
        self.queue.insert((alpha, idx));
    }

    fn cancel_event(&mut self, e: SsEdgeIdx) {
        let ev = self.edges[e as usize].event;
        if ev != INVALID {
            self.events[ev as usize].edge = INVALID;
        }
    }

    /// Event where the bisectors through both ends of `e` meet.
    fn make_pair_event(&mut self, mesh: &Mesh, e: SsEdgeIdx) {
        let ss = self.edges[e as usize];
        let prev = self.verts[ss.prev as usize].vertex;
        let next = self.verts[ss.next as usize].vertex;
        let (prev_partner, next_partner) = (mesh.verts[prev as usize].partner, mesh.verts[next as usize].partner);
        if prev == next || prev_partner == INVALID || next_partner == INVALID {
            return;
        }
        let bisector1 = mesh.segment(prev, prev_partner, EdgeType::Connector);
        let bisector2 = mesh.segment(next, next_partner, EdgeType::Connector);
        if let Some((p, alpha)) = mesh.intersect(&bisector1, &bisector2) {
            trace!("found event at {:?} alpha {} for skeleton edge {}", p, alpha, e);
            self.push_event(e, p, alpha);
        }
    }

    /// Event where the bisector at `v` meets `e`'s edge moved through `dest`.
    fn make_point_event(&mut self, mesh: &Mesh, e: SsEdgeIdx, v: VertIdx, dest: VertIdx, c: &Comparator) {
        let partner = mesh.verts[v as usize].partner;
        let edge = self.edges[e as usize].edge;
        if partner == INVALID || edge == INVALID {
            return;
        }
        let (top, bottom) = (mesh.edges[edge as usize].top, mesh.edges[edge as usize].bottom);
        if top == INVALID || bottom == INVALID {
            return;
        }
        let mut line = mesh.edges[edge as usize].line;
        let d = mesh.point(dest);
        line.c = -(d.x as f64 * line.a + d.y as f64 * line.b);
        let bisector = Line::from_points(mesh.point(v), mesh.point(partner));
        let alpha = mesh.verts[dest as usize].alpha;
        if let Some(p) = line.intersect(&bisector) {
            if !c.sweep_lt(p, mesh.point(top)) && c.sweep_lt(p, mesh.point(bottom)) {
                trace!("found event at {:?} alpha {} for skeleton edge {}", p, alpha, e);
                self.push_event(e, p, alpha);
            }
        }
    }
}

impl Mesh {
    /// Hands a collapsing skeleton vertex over to `dest`.
    fn connect_ss_edge(&mut self, v: VertIdx, dest: VertIdx, c: &Comparator) -> Result<(), InternalError> {
        if v == INVALID || v == dest {
            return Ok(());
        }
        trace!("ss_connecting vertex {} to vertex {}", v, dest);
        if self.verts[v as usize].synthetic {
            self.make_connecting_edge(v, dest, EdgeType::Connector, c, 0)?;
        } else {
            let partner = self.verts[v as usize].partner;
            if partner != INVALID {
                trace!("setting {}'s partner to {} from {}", partner, dest, v);
                self.verts[partner as usize].partner = dest;
                self.verts[v as usize].partner = INVALID;
            }
        }
        Ok(())
    }

    fn apply_event(&mut self, sk: &mut Skeleton, ev: EventIdx, list: &mut VertexList, c: &Comparator) -> Result<(), InternalError> {
        let event = sk.events[ev as usize];
        if event.edge == INVALID {
            return Ok(());
        }
        let ss = sk.edges[event.edge as usize];
        let prev = sk.verts[ss.prev as usize].vertex;
        let next = sk.verts[ss.next as usize].vertex;
        let prev_edge = sk.verts[ss.prev as usize].prev;
        let next_edge = sk.verts[ss.next as usize].next;
        if prev_edge == INVALID
            || next_edge == INVALID
            || sk.edges[prev_edge as usize].edge == INVALID
            || sk.edges[next_edge as usize].edge == INVALID
        {
            return Ok(());
        }
        trace!("collapsing edge {} -> {} to {:?} alpha {}", prev, next, event.point, event.alpha);
        let dest = self.make_sorted_vertex(event.point, event.alpha, list, prev, c);
        self.verts[dest as usize].synthetic = true;
        let ssv = sk.alloc_vertex(dest);
        sk.edges[event.edge as usize].edge = INVALID;
        self.connect_ss_edge(prev, dest, c)?;
        self.connect_ss_edge(next, dest, c)?;
        sk.edges[prev_edge as usize].next = ssv;
        sk.edges[next_edge as usize].prev = ssv;
        sk.verts[ssv as usize].prev = prev_edge;
        sk.verts[ssv as usize].next = next_edge;
        let (pe, ne) = (sk.edges[prev_edge as usize], sk.edges[next_edge as usize]);
        if pe.edge == INVALID || ne.edge == INVALID {
            return Ok(());
        }
        sk.cancel_event(prev_edge);
        sk.cancel_event(next_edge);
        if pe.prev == ne.next {
            let far = sk.verts[pe.prev as usize].vertex;
            self.connect_ss_edge(far, dest, c)?;
            sk.edges[prev_edge as usize].edge = INVALID;
            sk.edges[next_edge as usize].edge = INVALID;
        } else {
            self.compute_bisector(pe.edge, ne.edge, dest);
            if self.verts[dest as usize].partner != INVALID {
                sk.make_pair_event(self, prev_edge);
                sk.make_pair_event(self, next_edge);
            } else {
                let before = sk.verts[pe.prev as usize].vertex;
                let after = sk.verts[ne.next as usize].vertex;
                sk.make_point_event(self, prev_edge, before, dest, c);
                sk.make_point_event(self, next_edge, after, dest, c);
            }
        }
        Ok(())
    }

    /// Collapses regions where the ring in `list` overlaps itself. Returns
    /// whether anything was collapsed.
    pub(crate) fn collapse_overlap_regions(
        &mut self,
        list: &mut VertexList,
        order: EventOrder,
        c: &Comparator,
    ) -> Result<bool, InternalError> {
        debug!("collapsing overlap regions");
        if list.is_empty() {
            return Ok(false);
        }
        let mut sk = Skeleton::new(order);
        let mut active = EdgeList::default();
        let mut v = list.head;
        while v != INVALID {
            if !self.verts[v as usize].is_connected() {
                v = self.next_vertex(v);
                continue;
            }
            let (left_enclosing, _) = self.find_enclosing_edges(v, &active);
            let mut e = self.verts[v as usize].above.tail;
            while e != INVALID && e != left_enclosing {
                let above_prev = self.edges[e as usize].above.prev;
                let prev = if above_prev != INVALID { above_prev } else { left_enclosing };
                self.ael_remove(&mut active, e)?;
                let left_overlap = prev != INVALID && is_overlap_edge(self, prev);
                let right_overlap = is_overlap_edge(self, e);
                let is_outer_boundary = self.edges[e as usize].edge_type == EdgeType::Outer
                    && (prev == INVALID
                        || self.edges[prev as usize].winding == 0
                        || self.edges[e as usize].winding == 0);
                if prev != INVALID {
                    self.edges[e as usize].winding -= self.edges[prev as usize].winding;
                }
                if left_overlap && right_overlap {
                    trace!("found interior overlap edge {} -> {}; disconnecting", self.edges[e as usize].top, self.edges[e as usize].bottom);
                    self.disconnect(e);
                } else if left_overlap || right_overlap {
                    let edge = &self.edges[e as usize];
                    trace!("found overlap edge {} -> {}; building skeleton", edge.top, edge.bottom);
                    let (prev_vertex, next_vertex) =
                        if edge.winding < 0 { (edge.bottom, edge.top) } else { (edge.top, edge.bottom) };
                    let ss_prev = sk.vertex_for(prev_vertex);
                    let ss_next = sk.vertex_for(next_vertex);
                    let ss_edge = sk.edges.len() as SsEdgeIdx;
                    sk.edges.push(SsEdge {
                        edge: e,
                        event: INVALID,
                        prev: ss_prev,
                        next: ss_next,
                    });
                    sk.verts[ss_prev as usize].next = ss_edge;
                    sk.verts[ss_next as usize].prev = ss_edge;
                    sk.make_pair_event(self, ss_edge);
                    if is_outer_boundary {
                        let edge = &mut self.edges[e as usize];
                        edge.winding = boundary_winding(edge.edge_type, edge.winding);
                    } else {
                        self.disconnect(e);
                    }
                }
                e = prev;
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

        let complex = !sk.queue.is_empty();
        while let Some((_, ev)) = sk.queue.extract_min() {
            self.apply_event(&mut sk, ev, list, c)?;
        }
        for i in 0..sk.edges.len() {
            let ss = sk.edges[i];
            if ss.edge == INVALID {
                continue;
            }
            let prev = sk.verts[ss.prev as usize].vertex;
            let next = sk.verts[ss.next as usize].vertex;
            let edge_type = self.edges[ss.edge as usize].edge_type;
            self.make_connecting_edge(prev, next, edge_type, c, 0)?;
        }
        Ok(complex)
    }
}
