// Copyright 2025 The path-tessellator Authors
// License: MIT
//
// Named tolerances and tuning constants shared by the tessellator and the
// intersection kernel. Nothing else in the crate spells out a magic epsilon.

// ───────────────────────────── Tessellator ─────────────────────────────────

/// Upper bound on points emitted when flattening a single curve.
pub const MAX_POINTS_PER_CURVE: usize = 1 << 10;

/// Smallest flattening tolerance honoured by the worst-case point estimate.
pub const MIN_CURVE_TOLERANCE: f32 = 0.0001;

/// Maximum number of times a conic is halved when converting it to quads.
pub const MAX_CONIC_TO_QUAD_POW2: u32 = 5;

/// A cubic whose two implied quadratic control points lie within this many
/// tolerance units of each other is flattened as a quadratic.
pub const CUBIC_AS_QUAD_TOLERANCE_SCALE: f32 = 1.5;

/// Default cap on the worst-case point count of one path.
pub const DEFAULT_MAX_POINTS: usize = u16::MAX as usize + 1;

/// Simplification fails once the edge count exceeds this multiple of the
/// edge count it started with.
pub const MAX_EDGE_GROWTH: usize = 170;

/// Edge/edge intersection subdivides an edge whose endpoint exponents differ
/// by more than this.
pub const EDGE_RECURSION_EXPONENT_DIFF: i32 = 20;

/// Values closer to zero than this are flushed to zero when converted back
/// to `f32`.
pub const NEAR_ZERO_LIMIT: f64 = 16.0 * f32::MIN_POSITIVE as f64;

// ──────────────────────────── Antialiasing ─────────────────────────────────

/// Distance the boundary is offset inwards and outwards, in pixels.
pub const AA_STROKE_RADIUS: f64 = 0.5;

/// Corners whose normals have a cosine below the negation of this value are
/// mitered (about 14 degrees).
pub const AA_COS_MITER_ANGLE: f32 = 0.97;

/// Squared distance under which a neighbouring vertex makes a pointy vertex
/// collapse (a quarter pixel, squared).
pub const AA_QUARTER_PIXEL_SQ: f64 = 0.25 * 0.25;

/// Edges whose unit normals have a cosine above this are too close to
/// parallel for a bisector.
pub const AA_BISECTOR_COS_LIMIT: f64 = 0.999;

/// Normalized lines whose coefficients differ by less than this are parallel.
pub const NEAR_PARALLEL: f64 = 0.00001;

// ───────────────────────────── Kernel ──────────────────────────────────────

/// Single precision epsilon widened to `f64`.
pub const FLT_EPSILON: f64 = f32::EPSILON as f64;

/// Double precision epsilon, scaled for accumulated error.
pub const DBL_EPSILON_ERR: f64 = f64::EPSILON * 4.0;

/// Tolerance used when comparing parameter values for duplicates.
pub const ROUGH_EPSILON: f64 = FLT_EPSILON * 64.0;

/// Looser tolerance for merging intersection candidates.
pub const MORE_ROUGH_EPSILON: f64 = FLT_EPSILON * 256.0;

/// Relative tolerance for a control point to count as collinear.
pub const COLLINEAR_EPSILON: f64 = FLT_EPSILON * 16.0;

/// Parameters this close to 0 or 1 are pinned to the end.
pub const T_PIN_EPSILON: f64 = FLT_EPSILON * 16.0;

/// Maximum number of intersections between two curves of degree at most 3.
pub const MAX_INTERSECTIONS: usize = 9;

/// Depth limit for curve/curve subdivision.
pub const MAX_SUBDIVISION_DEPTH: u32 = 48;

/// Parameter span at which a subdivided curve piece is treated as a point.
pub const SUBDIVISION_T_SPAN: f64 = 1.0 / (1u64 << 20) as f64;

/// Iterations of Newton polishing for curve/curve candidates.
pub const NEWTON_ITERATIONS: usize = 12;

/// Iterations of bisection when refining a line/curve root.
pub const BISECTION_ITERATIONS: usize = 64;

/// Cap on flat leaf pairs examined by one curve/curve subdivision.
pub const MAX_SUBDIVISION_LEAVES: usize = 4096;
