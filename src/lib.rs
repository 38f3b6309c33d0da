// path-tessellator: sweep-line path triangulation with edge antialiasing
// Copyright 2025 The path-tessellator Authors
// License: MIT

pub mod consts;
pub mod error;
pub mod geom;
pub mod path;
pub mod pathops;
pub mod priorityq;
pub mod tess;

mod aa;
mod arena;
mod contour;
mod mesh;
mod monotone;
mod sweep;

pub use aa::StrokeParams;
pub use error::{TessError, TessResult};
pub use geom::{Point, Rect};
pub use path::{FillType, Path};
pub use tess::{
    path_to_triangles, path_to_vertices, TessOption, TessOptions, Triangles, Triangulator, VecVertexAllocator,
    VertexAllocator, WindingVertex,
};
