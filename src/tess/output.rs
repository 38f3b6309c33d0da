// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Vertex buffer protocol between the triangulator and its caller.

use crate::geom::Point;

/// Bytes per vertex without coverage: x, y.
pub const POSITION_STRIDE: usize = 2 * std::mem::size_of::<f32>();
/// Bytes per vertex with coverage: x, y, alpha in [0, 1].
pub const COVERAGE_STRIDE: usize = 3 * std::mem::size_of::<f32>();

/// Caller-owned vertex storage.
///
/// `lock` is called at most once per tessellation, and `unlock` exactly once
/// after every successful `lock`, with `actual_count <= count`.
pub trait VertexAllocator {
    /// Returns room for `count` vertices of `stride` bytes each, as
    /// `count * stride / 4` floats, or `None` when that much cannot be had.
    fn lock(&mut self, stride: usize, count: usize) -> Option<&mut [f32]>;

    fn unlock(&mut self, actual_count: usize);
}

/// A `VertexAllocator` backed by a growable vector.
#[derive(Debug, Default, Clone)]
pub struct VecVertexAllocator {
    pub vertices: Vec<f32>,
    pub stride: usize,
    /// Vertices kept by the last `unlock`.
    pub count: usize,
    /// Refuse locks for more vertices than this.
    pub max_count: Option<usize>,
    pub lock_calls: usize,
    pub unlock_calls: usize,
}

impl VecVertexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_count(max_count: usize) -> Self {
        VecVertexAllocator {
            max_count: Some(max_count),
            ..Self::default()
        }
    }

    fn floats_per_vertex(&self) -> usize {
        self.stride / std::mem::size_of::<f32>()
    }

    /// Position of vertex `i`.
    pub fn point(&self, i: usize) -> Point {
        let base = i * self.floats_per_vertex();
        Point::new(self.vertices[base], self.vertices[base + 1])
    }

    /// Coverage of vertex `i`, or 1 for buffers without it.
    pub fn coverage(&self, i: usize) -> f32 {
        if self.stride == COVERAGE_STRIDE {
            self.vertices[i * 3 + 2]
        } else {
            1.0
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        (0..self.count / 3).map(move |t| [self.point(t * 3), self.point(t * 3 + 1), self.point(t * 3 + 2)])
    }
}

impl VertexAllocator for VecVertexAllocator {
    fn lock(&mut self, stride: usize, count: usize) -> Option<&mut [f32]> {
        self.lock_calls += 1;
        if self.max_count.is_some_and(|max| count > max) {
            return None;
        }
        self.stride = stride;
        self.count = 0;
        self.vertices.clear();
        self.vertices.resize(count * stride / std::mem::size_of::<f32>(), 0.0);
        Some(&mut self.vertices)
    }

    fn unlock(&mut self, actual_count: usize) {
        self.unlock_calls += 1;
        self.count = actual_count;
        self.vertices.truncate(actual_count * self.floats_per_vertex());
    }
}

/// A path vertex and the winding of the polygon it was emitted for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WindingVertex {
    pub pos: Point,
    pub winding: i32,
}

/// Sequential writer over a locked buffer.
pub(crate) struct VertexWriter<'a> {
    buf: &'a mut [f32],
    pos: usize,
    emit_coverage: bool,
}

impl<'a> VertexWriter<'a> {
    pub(crate) fn new(buf: &'a mut [f32], emit_coverage: bool) -> Self {
        VertexWriter {
            buf,
            pos: 0,
            emit_coverage,
        }
    }

    pub(crate) fn stride(emit_coverage: bool) -> usize {
        if emit_coverage {
            COVERAGE_STRIDE
        } else {
            POSITION_STRIDE
        }
    }

    fn floats_per_vertex(&self) -> usize {
        if self.emit_coverage {
            3
        } else {
            2
        }
    }

    /// Appends one vertex. Writes past the locked size are dropped.
    pub(crate) fn write(&mut self, p: Point, alpha: u8) {
        let n = self.floats_per_vertex();
        let Some(slot) = self.buf.get_mut(self.pos..self.pos + n) else {
            return;
        };
        slot[0] = p.x;
        slot[1] = p.y;
        if self.emit_coverage {
            slot[2] = alpha as f32 / 255.0;
        }
        self.pos += n;
    }

    pub(crate) fn vertices_written(&self) -> usize {
        self.pos / self.floats_per_vertex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_fills_positions_and_coverage() {
        let mut buf = vec![0.0; 6];
        let mut w = VertexWriter::new(&mut buf, true);
        w.write(Point::new(1.0, 2.0), 255);
        w.write(Point::new(3.0, 4.0), 0);
        w.write(Point::new(5.0, 6.0), 255);
        assert_eq!(w.vertices_written(), 2);
        assert_eq!(buf, vec![1.0, 2.0, 1.0, 3.0, 4.0, 0.0]);
    }

    #[test]
    fn allocator_honours_max_count() {
        let mut alloc = VecVertexAllocator::with_max_count(3);
        assert!(alloc.lock(POSITION_STRIDE, 6).is_none());
        let buf = alloc.lock(POSITION_STRIDE, 3).map(|b| b.len());
        assert_eq!(buf, Some(6));
        alloc.unlock(3);
        assert_eq!((alloc.lock_calls, alloc.unlock_calls), (2, 1));
        assert_eq!(alloc.triangles().count(), 1);
    }
}
