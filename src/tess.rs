// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Driver: runs one path through flattening, simplification and
// tessellation in a fresh mesh and writes the result to the caller's buffer.

mod output;


pub use output::{VecVertexAllocator, VertexAllocator, WindingVertex, COVERAGE_STRIDE, POSITION_STRIDE};

use log::{debug, warn};

use crate::aa::{AaPolys, StrokeParams};
use crate::consts::{DEFAULT_MAX_POINTS, MAX_EDGE_GROWTH};
use crate::contour::{contour_count, worst_case_point_count, ContourBuilder};
use crate::error::{TessError, TessResult};
use crate::geom::{Comparator, Rect};
use crate::mesh::{Mesh, PolyIdx, VertexList};
use crate::path::Path;
use crate::sweep::{SanitizeOptions, SimplifyResult};
use output::VertexWriter;

/// Boolean switches accepted by `Triangulator::set_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TessOption {
    /// Emit coverage and one pixel of antialiased fringe.
    Antialias,
    /// Keep contour vertices that lie exactly on the line through their
    /// neighbours.
    PreserveCollinearVertices,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessOptions {
    pub antialias: bool,
    pub preserve_collinear_vertices: bool,
    /// Paths whose flattened worst case exceeds this many points are refused.
    pub max_points: usize,
    /// Simplification gives up once intersections multiply the edge count
    /// by more than this.
    pub max_edge_growth: usize,
    pub stroke: StrokeParams,
}

impl Default for TessOptions {
    fn default() -> Self {
        TessOptions {
            antialias: false,
            preserve_collinear_vertices: false,
            max_points: DEFAULT_MAX_POINTS,
            max_edge_growth: MAX_EDGE_GROWTH,
            stroke: StrokeParams::default(),
        }
    }
}

/// Outcome of a triangle emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangles {
    /// Vertices written, three per triangle.
    pub vertex_count: usize,
    /// True when the path had no curves.
    pub is_linear: bool,
}

impl Triangles {
    fn empty(is_linear: bool) -> Self {
        Triangles {
            vertex_count: 0,
            is_linear,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count / 3
    }
}

enum Tessellated {
    Fill(PolyIdx),
    Aa(AaPolys),
}

/// Path triangulator. Holds only options; every call builds and drops its
/// own mesh.
#[derive(Debug, Clone, Default)]
pub struct Triangulator {
    options: TessOptions,
}

impl Triangulator {
    pub fn new(options: TessOptions) -> Self {
        Triangulator { options }
    }

    pub fn options(&self) -> &TessOptions {
        &self.options
    }

    pub fn set_option(&mut self, option: TessOption, value: bool) {
        match option {
            TessOption::Antialias => self.options.antialias = value,
            TessOption::PreserveCollinearVertices => self.options.preserve_collinear_vertices = value,
        }
    }

    /// Runs the pipeline up to the poly list. `None` means the path has no
    /// contours at all.
    fn path_to_polys(
        &self,
        mesh: &mut Mesh,
        path: &Path,
        tolerance: f32,
        clip_bounds: &Rect,
        antialias: bool,
    ) -> TessResult<Option<(Tessellated, bool)>> {
        if contour_count(path) == 0 {
            return Ok(None);
        }
        let (points, contours) = worst_case_point_count(path, tolerance);
        if points > self.options.max_points {
            return Err(TessError::TooManyPoints(points));
        }
        debug!("path has at most {} points in {} contours", points, contours);

        let c = Comparator::for_bounds(&path.bounds());
        mesh.max_edge_growth = self.options.max_edge_growth;
        let (mut contours, is_linear) = ContourBuilder::new(mesh).build(path, tolerance, clip_bounds);
        mesh.sanitize_contours(
            &mut contours,
            SanitizeOptions {
                round_to_quarter_pixel: antialias,
                preserve_collinear_vertices: self.options.preserve_collinear_vertices,
            },
        );
        let mut list = VertexList::default();
        mesh.build_edges(&contours, &mut list, &c)?;
        mesh.sort_mesh(&mut list, &c);
        mesh.merge_coincident_vertices(&mut list, &c)?;
        if mesh.simplify(&mut list, &c)? == SimplifyResult::FoundSelfIntersection {
            debug!("path self-intersects; mesh now has {} edges", mesh.edge_count());
        }
        let out = if antialias {
            Tessellated::Aa(mesh.aa_tessellate(&list, path.fill_type(), &self.options.stroke, &c)?)
        } else {
            Tessellated::Fill(mesh.tessellate(&list)?)
        };
        Ok(Some((out, is_linear)))
    }

    /// Triangulates `path` into `allocator`, antialiased when the options
    /// ask for it.
    pub fn path_to_triangles(
        &self,
        path: &Path,
        tolerance: f32,
        clip_bounds: &Rect,
        allocator: &mut dyn VertexAllocator,
    ) -> TessResult<Triangles> {
        self.triangulate(path, tolerance, clip_bounds, allocator, self.options.antialias)
    }

    /// Triangulates `path` with a coverage fringe. Vertices carry x, y and
    /// coverage.
    pub fn path_to_aa_triangles(
        &self,
        path: &Path,
        tolerance: f32,
        clip_bounds: &Rect,
        allocator: &mut dyn VertexAllocator,
    ) -> TessResult<Triangles> {
        self.triangulate(path, tolerance, clip_bounds, allocator, true)
    }

    fn triangulate(
        &self,
        path: &Path,
        tolerance: f32,
        clip_bounds: &Rect,
        allocator: &mut dyn VertexAllocator,
        antialias: bool,
    ) -> TessResult<Triangles> {
        let mut mesh = Mesh::new();
        let Some((tessellated, is_linear)) = self.path_to_polys(&mut mesh, path, tolerance, clip_bounds, antialias)?
        else {
            return Ok(Triangles::empty(true));
        };
        let fill = path.fill_type();
        let count = match &tessellated {
            Tessellated::Fill(polys) => mesh.count_points(*polys, fill),
            Tessellated::Aa(aa) => mesh.count_aa_points(aa),
        };
        if count == 0 {
            return Ok(Triangles::empty(is_linear));
        }

        let stride = VertexWriter::stride(antialias);
        let buf = allocator.lock(stride, count).ok_or(TessError::AllocationFailed(count))?;
        let mut writer = VertexWriter::new(buf, antialias);
        match &tessellated {
            Tessellated::Fill(polys) => mesh.emit_polys(*polys, fill, |v, _| writer.write(mesh.point(v), 255)),
            Tessellated::Aa(aa) => mesh.emit_aa(aa, |v| writer.write(mesh.point(v), mesh.verts[v as usize].alpha)),
        }
        let written = writer.vertices_written();
        allocator.unlock(written);
        debug!("emitted {} of {} reserved vertices", written, count);
        Ok(Triangles {
            vertex_count: written,
            is_linear,
        })
    }

    /// Triangle vertices of the filled regions, each tagged with the winding
    /// of its region. Never antialiased.
    pub fn path_to_vertices(&self, path: &Path, tolerance: f32, clip_bounds: &Rect) -> TessResult<Vec<WindingVertex>> {
        let mut mesh = Mesh::new();
        let Some((Tessellated::Fill(polys), _)) = self.path_to_polys(&mut mesh, path, tolerance, clip_bounds, false)?
        else {
            return Ok(Vec::new());
        };
        let fill = path.fill_type();
        let mut out = Vec::with_capacity(mesh.count_points(polys, fill));
        mesh.emit_polys(polys, fill, |v, winding| {
            out.push(WindingVertex {
                pos: mesh.point(v),
                winding,
            })
        });
        Ok(out)
    }
}

/// Triangulates `path` with default options. Returns the vertex count and
/// whether the path was linear; any failure yields zero vertices.
pub fn path_to_triangles(
    path: &Path,
    tolerance: f32,
    clip_bounds: &Rect,
    allocator: &mut dyn VertexAllocator,
    antialias: bool,
) -> (usize, bool) {
    let triangulator = Triangulator::new(TessOptions {
        antialias,
        ..TessOptions::default()
    });
    match triangulator.path_to_triangles(path, tolerance, clip_bounds, allocator) {
        Ok(t) => (t.vertex_count, t.is_linear),
        Err(err) => {
            warn!("path triangulation failed: {}", err);
            (0, true)
        }
    }
}

/// `Triangulator::path_to_vertices` with default options; failures yield an
/// empty list.
pub fn path_to_vertices(path: &Path, tolerance: f32, clip_bounds: &Rect) -> Vec<WindingVertex> {
    Triangulator::default()
        .path_to_vertices(path, tolerance, clip_bounds)
        .unwrap_or_else(|err| {
            warn!("path triangulation failed: {}", err);
            Vec::new()
        })
}
