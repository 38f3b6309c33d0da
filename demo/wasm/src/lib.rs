// Copyright 2025 The path-tessellator Authors
// WASM bindings for path-tessellator

use path_tessellator::{FillType, Path, Rect, TessOption, Triangulator, VecVertexAllocator};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// A path built up verb by verb from script.
#[wasm_bindgen]
pub struct PathJs {
    inner: Path,
}

#[wasm_bindgen]
impl PathJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PathJs {
        PathJs { inner: Path::new() }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.inner.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.inner.line_to(x, y);
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.inner.quad_to(x1, y1, x2, y2);
    }

    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, weight: f32) {
        self.inner.conic_to(x1, y1, x2, y2, weight);
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.inner.cubic_to(x1, y1, x2, y2, x3, y3);
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    /// Add a closed polygon from a flat [x0,y0, x1,y1, ...] Float32Array.
    pub fn add_polygon(&mut self, vertices: &[f32]) {
        let mut chunks = vertices.chunks_exact(2);
        if let Some(first) = chunks.next() {
            self.inner.move_to(first[0], first[1]);
            for p in chunks {
                self.inner.line_to(p[0], p[1]);
            }
            self.inner.close();
        }
    }

    /// fill: 0=Winding 1=EvenOdd 2=InverseWinding 3=InverseEvenOdd
    pub fn set_fill_type(&mut self, fill: u32) {
        self.inner.set_fill_type(fill_type(fill));
    }
}

impl Default for PathJs {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangulator with switchable options.
#[wasm_bindgen]
pub struct TriangulatorJs {
    inner: Triangulator,
    last_stride: usize,
}

#[wasm_bindgen]
impl TriangulatorJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TriangulatorJs {
        TriangulatorJs {
            inner: Triangulator::default(),
            last_stride: 0,
        }
    }

    /// Set an option (0 = Antialias, 1 = PreserveCollinearVertices).
    pub fn set_option(&mut self, option: u32, value: bool) {
        let opt = match option {
            0 => TessOption::Antialias,
            1 => TessOption::PreserveCollinearVertices,
            _ => return,
        };
        self.inner.set_option(opt, value);
    }

    /// Triangle vertices as flat floats: [x, y] per vertex, or [x, y,
    /// coverage] when antialiased. Empty on failure.
    pub fn triangulate(&mut self, path: &PathJs, tolerance: f32, left: f32, top: f32, right: f32, bottom: f32) -> Vec<f32> {
        let clip = Rect::from_ltrb(left, top, right, bottom);
        let mut alloc = VecVertexAllocator::new();
        match self.inner.path_to_triangles(&path.inner, tolerance, &clip, &mut alloc) {
            Ok(_) => {
                self.last_stride = alloc.stride;
                alloc.vertices
            }
            Err(_) => Vec::new(),
        }
    }

    /// Floats per vertex in the last `triangulate` result.
    pub fn floats_per_vertex(&self) -> u32 {
        (self.last_stride / std::mem::size_of::<f32>()) as u32
    }
}

impl Default for TriangulatorJs {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_type(fill: u32) -> FillType {
    match fill {
        1 => FillType::EvenOdd,
        2 => FillType::InverseWinding,
        3 => FillType::InverseEvenOdd,
        _ => FillType::Winding,
    }
}

/// Convenience: triangulate one closed polygon with the nonzero rule.
#[wasm_bindgen]
pub fn triangulate_polygon(vertices: &[f32], antialias: bool) -> Vec<f32> {
    let mut path = PathJs::new();
    path.add_polygon(vertices);
    let mut t = TriangulatorJs::new();
    t.set_option(0, antialias);
    t.triangulate(&path, 0.25, -1.0e6, -1.0e6, 1.0e6, 1.0e6)
}
