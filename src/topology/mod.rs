//! Top-level module for mesh topology storage.
//!
//! This module provides the in-memory topology of one mesh partition:
//! - [`MeshTopology`], per-dimension entity counts, global numbering, ghost
//!   and shared-entity ownership, and the table of incidence relations
//! - [`Connectivity`], one compressed-row incidence relation `d0 -> d1`
//! - Index types and ownership helpers for distributed meshes
//!
//! Builders (partitioners, incidence algorithms, readers) write into a
//! [`MeshTopology`]; assembly and communication setup read from it.

pub mod connectivity;
pub mod entity;
pub mod mesh_topology;
pub mod ownership;
pub mod validation;

pub use connectivity::Connectivity;
pub use entity::{EntityId, GlobalIndex, LocalIndex, Rank, UNSET_GLOBAL_INDEX};
pub use mesh_topology::MeshTopology;
pub use ownership::SharedEntities;
pub use validation::{ValidationOptions, validate_topology};

#[cfg(test)]
mod tests;
