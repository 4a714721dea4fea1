#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-topology
//!
//! mesh-topology is the topological store of a distributed finite-element mesh. For the
//! partition of a mesh held by one process it records which entities exist at each
//! topological dimension (vertices, edges, faces, cells), how they are numbered across all
//! processes, which of them are ghosts or shared with other ranks, and how entities of
//! different dimensions are incident on one another.
//!
//! ## Features
//! - [`MeshTopology`](topology::MeshTopology): per-dimension local/global counts, ghost
//!   offsets, global numbering, shared-entity maps and ghost-cell owners
//! - [`Connectivity`](topology::Connectivity): compressed-row incidence tables for any
//!   ordered pair of dimensions, with a deterministic content hash
//! - Checked `try_*` accessors next to panicking ones, and [`DebugInvariants`] checks at
//!   population boundaries
//! - `serde` support so readers and writers can persist a topology verbatim
//!
//! ## Scope
//! The store computes nothing and communicates with no one. Partitioners, incidence
//! builders and ghost-exchange layers write into it; assembly reads from it.
//!
//! ## Usage
//!
//! ```rust
//! use mesh_topology::prelude::*;
//!
//! // Two owned triangles and one ghost triangle owned by rank 1.
//! let mut topology = MeshTopology::new();
//! topology.init_dimension(2);
//! topology.init_size(0, 5, 9);
//! topology.init_size(2, 3, 8);
//! topology.init_ghost(2, 2);
//! topology.set_cell_owner(vec![1]);
//! topology.set_connectivity(
//!     2,
//!     0,
//!     Connectivity::from_rows([[0u32, 1, 2], [1, 3, 2], [2, 3, 4]]),
//! );
//!
//! assert_eq!(topology.owned_range(2), 0..2);
//! assert_eq!(topology.connectivity(2, 0).neighbors(1), &[1, 3, 2]);
//! assert_eq!(topology.ghost_cell_owner(2), Some(1));
//! ```
//!
//! ## Invariant checks
//! Build with `strict-invariants` or `check-invariants` to keep the structural checks in
//! release builds.

pub mod debug_invariants;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::TopologyError;
    pub use crate::topology::{
        Connectivity, EntityId, GlobalIndex, LocalIndex, MeshTopology, Rank, SharedEntities,
        UNSET_GLOBAL_INDEX, ValidationOptions,
    };
}
