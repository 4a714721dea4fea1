//! Index types for mesh entities.
//!
//! An entity is identified within one process by its topological dimension
//! and its local index in that dimension. Global indices are a separate,
//! process-independent numbering stored per dimension by
//! [`MeshTopology`](super::MeshTopology).

use std::fmt;

/// Process-local index of an entity within its dimension, as stored in
/// connectivity rows and shared-entity maps. Accessors take `usize`.
pub type LocalIndex = u32;

/// Process-independent index of an entity within its dimension.
pub type GlobalIndex = i64;

/// Rank of a process in the distributed run.
pub type Rank = u32;

/// Sentinel stored in freshly allocated global index storage.
pub const UNSET_GLOBAL_INDEX: GlobalIndex = -1;

/// A mesh entity identified as `(dim, index)`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct EntityId {
    /// Topological dimension (0 = vertex, ..., D = cell).
    pub dim: usize,
    /// Local index within `dim`.
    pub index: usize,
}

impl EntityId {
    #[inline]
    pub const fn new(dim: usize, index: usize) -> Self {
        Self { dim, index }
    }

    #[inline]
    pub const fn vertex(index: usize) -> Self {
        Self::new(0, index)
    }
}

impl From<(usize, usize)> for EntityId {
    fn from((dim, index): (usize, usize)) -> Self {
        Self::new(dim, index)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId")
            .field(&self.dim)
            .field(&self.index)
            .finish()
    }
}

/// Prints `(dim, index)`.
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dim, self.index)
    }
}
