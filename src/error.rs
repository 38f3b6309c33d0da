// Copyright 2025 The path-tessellator Authors
// License: MIT

/// Failures reported by the tessellator entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TessError {
    #[error("vertex allocator could not provide {0} vertices")]
    AllocationFailed(usize),
    #[error("path needs up to {0} points, more than the configured maximum")]
    TooManyPoints(usize),
    #[error("internal tessellation error: {0}")]
    Internal(#[from] InternalError),
}

/// Broken mesh invariants. These indicate a logic error rather than bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("edge is already in the active edge list")]
    EdgeAlreadyActive,
    #[error("edge is missing from the active edge list")]
    EdgeNotActive,
    #[error("edge lost its endpoints")]
    MissingEndpoint,
    #[error("active edge list is out of order")]
    ActiveEdgesOutOfOrder,
    #[error("intersection resolution grew the mesh past its edge budget")]
    EdgeCountExploded,
}

pub type TessResult<T> = Result<T, TessError>;
