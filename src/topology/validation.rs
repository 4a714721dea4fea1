//! Topology validation helpers.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::TopologyError;
use crate::topology::mesh_topology::MeshTopology;
use crate::topology::ownership::validate_shared_entities;

/// Optional validation toggles for [`MeshTopology`] checks.
///
/// The per-dimension bookkeeping (`ghost_offset <= size`, global index
/// storage empty or complete, CSR layout of every table) is always checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Every populated `d0 -> d1` table has exactly `size(d0)` rows.
    pub check_connectivity_rows: bool,
    /// Every populated `d0 -> d1` table only references indices below `size(d1)`.
    pub check_connectivity_targets: bool,
    /// Shared-entity maps are keyed by valid local indices.
    pub check_shared_entities: bool,
    /// The ghost-cell owner table is empty or covers exactly the ghost cells.
    pub check_cell_owner: bool,
}

impl ValidationOptions {
    /// Enable all topology validation checks.
    pub fn all() -> Self {
        Self {
            check_connectivity_rows: true,
            check_connectivity_targets: true,
            check_shared_entities: true,
            check_cell_owner: true,
        }
    }

    /// Only the checks that are always performed.
    pub fn minimal() -> Self {
        Self {
            check_connectivity_rows: false,
            check_connectivity_targets: false,
            check_shared_entities: false,
            check_cell_owner: false,
        }
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Validate a topology against the selected checks; returns the first
/// violation found. An undimensioned topology is valid iff it holds nothing.
pub fn validate_topology(
    topology: &MeshTopology,
    options: ValidationOptions,
) -> Result<(), TopologyError> {
    let raw = topology.raw_parts();
    let Some(top) = raw.dim else {
        let holds_data = !raw.num_entities.is_empty()
            || !raw.ghost_offset.is_empty()
            || !raw.global_num_entities.is_empty()
            || !raw.global_indices.is_empty()
            || !raw.shared_entities.is_empty()
            || !raw.cell_owner.is_empty()
            || !raw.connectivity.is_empty();
        return if holds_data {
            Err(TopologyError::Uninitialized)
        } else {
            Ok(())
        };
    };
    let n = top + 1;
    if raw.num_entities.len() != n
        || raw.ghost_offset.len() != n
        || raw.global_num_entities.len() != n
        || raw.global_indices.len() != n
        || raw.connectivity.len() != n * n
    {
        return Err(TopologyError::LayoutMismatch { dim: top });
    }

    for d in 0..n {
        let size = raw.num_entities[d];
        if raw.ghost_offset[d] > size {
            return Err(TopologyError::GhostOffsetOutOfRange {
                dim: d,
                offset: raw.ghost_offset[d],
                size,
            });
        }
        let numbered = raw.global_indices[d].len();
        if numbered != 0 && numbered != size {
            return Err(TopologyError::GlobalIndicesSizeMismatch {
                dim: d,
                expected: size,
                found: numbered,
            });
        }
    }

    for (i, table) in raw.connectivity.iter().enumerate() {
        table.validate_invariants()?;
        if table.is_empty() {
            continue;
        }
        let (d0, d1) = (i / n, i % n);
        if options.check_connectivity_rows && table.num_entities() != raw.num_entities[d0] {
            return Err(TopologyError::ConnectivityRowCountMismatch {
                d0,
                d1,
                expected: raw.num_entities[d0],
                found: table.num_entities(),
            });
        }
        if options.check_connectivity_targets {
            let size = raw.num_entities[d1];
            for (entity, row) in table.rows().enumerate() {
                if let Some(&target) = row.iter().find(|&&t| t as usize >= size) {
                    return Err(TopologyError::ConnectivityTargetOutOfRange {
                        d0,
                        d1,
                        entity,
                        target,
                        size,
                    });
                }
            }
        }
    }

    if options.check_shared_entities {
        for (&d, shared) in raw.shared_entities {
            let size = raw
                .num_entities
                .get(d)
                .copied()
                .ok_or(TopologyError::DimensionOutOfRange { dim: d, max: top })?;
            validate_shared_entities(shared, d, size)?;
        }
    }

    if options.check_cell_owner && !raw.cell_owner.is_empty() {
        let ghosts = raw.num_entities[top] - raw.ghost_offset[top];
        if raw.cell_owner.len() != ghosts {
            return Err(TopologyError::CellOwnerSizeMismatch {
                expected: ghosts,
                found: raw.cell_owner.len(),
            });
        }
    }

    Ok(())
}
