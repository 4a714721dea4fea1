//! TopologyError: Unified error type for mesh-topology public APIs
//!
//! Every fault-raising accessor on [`MeshTopology`](crate::topology::MeshTopology)
//! and [`Connectivity`](crate::topology::Connectivity) has a checked `try_*`
//! twin returning this error. The plain accessors panic with the same message.

use thiserror::Error;

/// Unified error type for mesh-topology operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A dimension-indexed accessor was used before `init_dimension`, or an
    /// undimensioned topology carries per-dimension data.
    #[error("topology has not been dimensioned (call init_dimension first)")]
    Uninitialized,
    /// Requested dimension exceeds the topological dimension of the mesh.
    #[error("dimension {dim} out of range for topology of dimension {max}")]
    DimensionOutOfRange { dim: usize, max: usize },
    /// Entity index beyond the number of entities of the table/dimension.
    #[error("entity index {index} out of range (size {size})")]
    EntityOutOfRange { index: usize, size: usize },
    /// `init_global_indices` called with a size different from `size(dim)`.
    #[error("global index storage for dimension {dim} must have length {expected}, got {found}")]
    GlobalIndicesSizeMismatch {
        dim: usize,
        expected: usize,
        found: usize,
    },
    /// A global index was written before storage was allocated.
    #[error("global indices for dimension {dim} have not been initialised")]
    GlobalIndicesUnset { dim: usize },
    /// Ghost offset beyond the local entity count.
    #[error("ghost offset {offset} exceeds entity count {size} in dimension {dim}")]
    GhostOffsetOutOfRange {
        dim: usize,
        offset: usize,
        size: usize,
    },
    /// Ghost-cell owner table does not cover exactly the ghost cells.
    #[error("cell owner table has {found} entries, expected {expected} ghost cells")]
    CellOwnerSizeMismatch { expected: usize, found: usize },
    /// Connectivity `d0 -> d1` has a row count different from `size(d0)`.
    #[error("connectivity {d0}->{d1} has {found} rows, expected {expected}")]
    ConnectivityRowCountMismatch {
        d0: usize,
        d1: usize,
        expected: usize,
        found: usize,
    },
    /// Connectivity `d0 -> d1` references an entity beyond `size(d1)`.
    #[error("connectivity {d0}->{d1}: entity {entity} references {target}, but size({d1}) is {size}")]
    ConnectivityTargetOutOfRange {
        d0: usize,
        d1: usize,
        entity: usize,
        target: u32,
        size: usize,
    },
    /// A row written into a fixed-degree table has the wrong length.
    #[error("row {entity} has {found} entries, table degree is {expected}")]
    RowDegreeMismatch {
        entity: usize,
        expected: usize,
        found: usize,
    },
    /// Offsets/indices do not describe a valid compressed-row layout.
    #[error("invalid CSR layout: {0}")]
    InvalidCsr(&'static str),
    /// Shared-entity map keyed by an index beyond `size(dim)`.
    #[error("shared entity {index} out of range for dimension {dim} (size {size})")]
    SharedEntityOutOfRange {
        dim: usize,
        index: u32,
        size: usize,
    },
    /// Per-dimension storage disagrees with the topological dimension.
    #[error("per-dimension storage does not match topological dimension {dim}")]
    LayoutMismatch { dim: usize },
    /// Per-entity global degrees do not match the number of rows.
    #[error("global degree table has {found} entries, connectivity has {expected} rows")]
    GlobalDegreeSizeMismatch { expected: usize, found: usize },
}

/// Raise an unrecoverable precondition fault at the caller's location.
#[cold]
#[track_caller]
pub(crate) fn fault(err: TopologyError) -> ! {
    panic!("{err}")
}
