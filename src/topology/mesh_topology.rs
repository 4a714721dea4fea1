//! Per-dimension entity bookkeeping and incidence storage for one mesh
//! partition.
//!
//! [`MeshTopology`] is the single source of truth for how many entities of
//! each dimension a process holds, how they are numbered globally, which of
//! them are ghosts or shared with other ranks, and how they are incident on
//! one another. It performs no communication and computes nothing: external
//! builders write into it, assembly and communication setup read from it.
//!
//! # Ghost layout
//! Within every dimension, ghost entities occupy a contiguous suffix of the
//! local numbering: `[0, ghost_offset(d))` are owned, `[ghost_offset(d),
//! size(d))` are ghosts. The offset is a *local* index in every dimension.
//!
//! # Faults
//! Dimension or entity indices out of range, and any dimension-indexed access
//! before [`init_dimension`](MeshTopology::init_dimension), are programming
//! errors: the plain accessors panic. Each has a `try_*` twin returning
//! [`TopologyError`] that leaves the store untouched on failure.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

use itertools::Itertools;
use static_assertions::assert_impl_all;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::{TopologyError, fault};
use crate::topology::connectivity::Connectivity;
use crate::topology::entity::{EntityId, GlobalIndex, Rank, UNSET_GLOBAL_INDEX};
use crate::topology::ownership::{self, EMPTY_SHARED, SharedEntities};
use crate::topology::validation::{ValidationOptions, validate_topology};

/// Topology of one mesh partition: entity counts, numbering, ownership and
/// connectivity for every dimension `0..=D`.
///
/// Deserialization runs [`validate_topology`] with every check enabled, so a
/// loaded topology satisfies the same invariants as one built in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "MeshTopologyData")]
pub struct MeshTopology {
    /// Topological dimension `D`; `None` until dimensioned.
    dim: Option<usize>,
    /// Local entity count per dimension, ghosts included.
    num_entities: Vec<usize>,
    /// First ghost index per dimension.
    ghost_offset: Vec<usize>,
    /// Process-wide entity count per dimension.
    global_num_entities: Vec<u64>,
    /// Local -> global index per dimension (empty if not set).
    global_indices: Vec<Vec<GlobalIndex>>,
    /// Shared-entity maps, keyed by dimension; present once created.
    shared_entities: BTreeMap<usize, SharedEntities>,
    /// Owner of each ghost cell, indexed by `cell - ghost_offset[D]`.
    cell_owner: Vec<Rank>,
    /// `(D + 1)^2` tables, row-major in `(d0, d1)`.
    connectivity: Vec<Connectivity>,
}

/// Unchecked wire form of [`MeshTopology`].
#[derive(serde::Deserialize)]
struct MeshTopologyData {
    dim: Option<usize>,
    num_entities: Vec<usize>,
    ghost_offset: Vec<usize>,
    global_num_entities: Vec<u64>,
    global_indices: Vec<Vec<GlobalIndex>>,
    shared_entities: BTreeMap<usize, SharedEntities>,
    cell_owner: Vec<Rank>,
    connectivity: Vec<Connectivity>,
}

impl TryFrom<MeshTopologyData> for MeshTopology {
    type Error = TopologyError;

    fn try_from(raw: MeshTopologyData) -> Result<Self, Self::Error> {
        let t = Self {
            dim: raw.dim,
            num_entities: raw.num_entities,
            ghost_offset: raw.ghost_offset,
            global_num_entities: raw.global_num_entities,
            global_indices: raw.global_indices,
            shared_entities: raw.shared_entities,
            cell_owner: raw.cell_owner,
            connectivity: raw.connectivity,
        };
        validate_topology(&t, ValidationOptions::all())?;
        log::trace!("loaded topology of dimension {:?}", t.dim);
        Ok(t)
    }
}

assert_impl_all!(MeshTopology: Send, Sync, Clone);
assert_impl_all!(Connectivity: Send, Sync, Clone);

impl MeshTopology {
    /// Create an empty, undimensioned topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topology already dimensioned to `dim`.
    pub fn with_dimension(dim: usize) -> Self {
        let mut t = Self::new();
        t.init_dimension(dim);
        t
    }

    // --- dimensioning -------------------------------------------------------------

    /// Fix the topological dimension and allocate empty per-dimension storage.
    ///
    /// Calling this again discards everything stored so far.
    pub fn init_dimension(&mut self, dim: usize) {
        if self.dim.is_some() {
            log::debug!("re-dimensioning topology from {:?} to {dim}", self.dim);
        } else {
            log::debug!("dimensioning topology to {dim}");
        }
        let n = dim + 1;
        *self = Self {
            dim: Some(dim),
            num_entities: vec![0; n],
            ghost_offset: vec![0; n],
            global_num_entities: vec![0; n],
            global_indices: vec![Vec::new(); n],
            shared_entities: BTreeMap::new(),
            cell_owner: Vec::new(),
            connectivity: vec![Connectivity::new(); n * n],
        };
    }

    /// True once [`init_dimension`](Self::init_dimension) has been called.
    pub fn is_initialized(&self) -> bool {
        self.dim.is_some()
    }

    pub fn try_dim(&self) -> Result<usize, TopologyError> {
        self.dim.ok_or(TopologyError::Uninitialized)
    }

    /// Topological dimension `D` of the mesh.
    #[track_caller]
    pub fn dim(&self) -> usize {
        self.try_dim().unwrap_or_else(|e| fault(e))
    }

    /// Set the local (ghosts included) and process-wide entity counts of
    /// `dim`. The dimension starts out with no ghosts.
    ///
    /// Global index storage of a different length, and (for the cell
    /// dimension) the ghost-cell owner table, are dropped. So are incidence
    /// tables whose rows no longer match the new size, and tables into `dim`
    /// that reference entities past it.
    pub fn try_init_size(
        &mut self,
        dim: usize,
        local_size: usize,
        global_size: u64,
    ) -> Result<(), TopologyError> {
        let top = self.check_dim(dim)?;
        log::trace!("init_size dim={dim} local={local_size} global={global_size}");
        self.num_entities[dim] = local_size;
        self.global_num_entities[dim] = global_size;
        self.ghost_offset[dim] = local_size;
        if !self.global_indices[dim].is_empty() && self.global_indices[dim].len() != local_size {
            log::debug!("dropping stale global indices of dimension {dim}");
            self.global_indices[dim].clear();
        }
        if dim == top {
            self.cell_owner.clear();
        }
        let n = top + 1;
        for d1 in 0..n {
            let table = &mut self.connectivity[dim * n + d1];
            if !table.is_empty() && table.num_entities() != local_size {
                log::debug!("dropping stale connectivity {dim}->{d1}");
                table.clear();
            }
        }
        for d0 in 0..n {
            let table = &mut self.connectivity[d0 * n + dim];
            if table.max_target().is_some_and(|t| t as usize >= local_size) {
                log::debug!("dropping stale connectivity {d0}->{dim}");
                table.clear();
            }
        }
        Ok(())
    }

    #[track_caller]
    pub fn init_size(&mut self, dim: usize, local_size: usize, global_size: u64) {
        if let Err(e) = self.try_init_size(dim, local_size, global_size) {
            fault(e);
        }
    }

    /// Allocate global index storage for `dim`, every entry unset.
    /// `size` must equal [`size(dim)`](Self::size).
    pub fn try_init_global_indices(&mut self, dim: usize, size: usize) -> Result<(), TopologyError> {
        self.check_dim(dim)?;
        let expected = self.num_entities[dim];
        if size != expected {
            return Err(TopologyError::GlobalIndicesSizeMismatch {
                dim,
                expected,
                found: size,
            });
        }
        self.global_indices[dim] = vec![UNSET_GLOBAL_INDEX; size];
        Ok(())
    }

    #[track_caller]
    pub fn init_global_indices(&mut self, dim: usize, size: usize) {
        if let Err(e) = self.try_init_global_indices(dim, size) {
            fault(e);
        }
    }

    /// Mark local indices `[index, size(dim))` of `dim` as ghosts.
    pub fn try_init_ghost(&mut self, dim: usize, index: usize) -> Result<(), TopologyError> {
        let top = self.check_dim(dim)?;
        let size = self.num_entities[dim];
        if index > size {
            return Err(TopologyError::GhostOffsetOutOfRange {
                dim,
                offset: index,
                size,
            });
        }
        self.ghost_offset[dim] = index;
        if dim == top && !self.cell_owner.is_empty() && self.cell_owner.len() != size - index {
            log::debug!("ghost cell range changed; dropping cell owners");
            self.cell_owner.clear();
        }
        Ok(())
    }

    #[track_caller]
    pub fn init_ghost(&mut self, dim: usize, index: usize) {
        if let Err(e) = self.try_init_ghost(dim, index) {
            fault(e);
        }
    }

    // --- sizes --------------------------------------------------------------------

    pub fn try_size(&self, dim: usize) -> Result<usize, TopologyError> {
        self.check_dim(dim)?;
        Ok(self.num_entities[dim])
    }

    /// Number of local entities of `dim`, ghosts included.
    #[track_caller]
    pub fn size(&self, dim: usize) -> usize {
        self.try_size(dim).unwrap_or_else(|e| fault(e))
    }

    pub fn try_size_global(&self, dim: usize) -> Result<u64, TopologyError> {
        self.check_dim(dim)?;
        Ok(self.global_num_entities[dim])
    }

    /// Process-wide number of entities of `dim`.
    #[track_caller]
    pub fn size_global(&self, dim: usize) -> u64 {
        self.try_size_global(dim).unwrap_or_else(|e| fault(e))
    }

    pub fn try_ghost_offset(&self, dim: usize) -> Result<usize, TopologyError> {
        self.check_dim(dim)?;
        Ok(self.ghost_offset[dim])
    }

    /// Number of owned entities of `dim`, equivalently the first ghost index.
    #[track_caller]
    pub fn ghost_offset(&self, dim: usize) -> usize {
        self.try_ghost_offset(dim).unwrap_or_else(|e| fault(e))
    }

    /// Number of ghost entities of `dim`.
    #[track_caller]
    pub fn num_ghosts(&self, dim: usize) -> usize {
        self.size(dim) - self.ghost_offset(dim)
    }

    /// Local indices of owned entities of `dim`.
    #[track_caller]
    pub fn owned_range(&self, dim: usize) -> Range<usize> {
        0..self.ghost_offset(dim)
    }

    /// Local indices of ghost entities of `dim`.
    #[track_caller]
    pub fn ghost_range(&self, dim: usize) -> Range<usize> {
        self.ghost_offset(dim)..self.size(dim)
    }

    /// Whether local entity `index` of `dim` is a ghost.
    #[track_caller]
    pub fn is_ghost(&self, dim: usize, index: usize) -> bool {
        let size = self.size(dim);
        if index >= size {
            fault(TopologyError::EntityOutOfRange { index, size });
        }
        index >= self.ghost_offset[dim]
    }

    // --- global numbering ---------------------------------------------------------

    /// Write the global index of one local entity.
    pub fn try_set_global_index(
        &mut self,
        dim: usize,
        local_index: usize,
        global_index: GlobalIndex,
    ) -> Result<(), TopologyError> {
        self.check_dim(dim)?;
        let size = self.num_entities[dim];
        if local_index >= size {
            return Err(TopologyError::EntityOutOfRange {
                index: local_index,
                size,
            });
        }
        let slot = self.global_indices[dim]
            .get_mut(local_index)
            .ok_or(TopologyError::GlobalIndicesUnset { dim })?;
        *slot = global_index;
        Ok(())
    }

    #[track_caller]
    pub fn set_global_index(&mut self, dim: usize, local_index: usize, global_index: GlobalIndex) {
        if let Err(e) = self.try_set_global_index(dim, local_index, global_index) {
            fault(e);
        }
    }

    pub fn try_global_indices(&self, dim: usize) -> Result<&[GlobalIndex], TopologyError> {
        self.check_dim(dim)?;
        Ok(&self.global_indices[dim])
    }

    /// Local -> global map of `dim`; empty if not set.
    #[track_caller]
    pub fn global_indices(&self, dim: usize) -> &[GlobalIndex] {
        self.try_global_indices(dim).unwrap_or_else(|e| fault(e))
    }

    /// Global index of `entity`, or `None` if it was never written.
    #[track_caller]
    pub fn global_index(&self, entity: impl Into<EntityId>) -> Option<GlobalIndex> {
        let EntityId { dim, index } = entity.into();
        let size = self.size(dim);
        if index >= size {
            fault(TopologyError::EntityOutOfRange { index, size });
        }
        self.global_indices[dim]
            .get(index)
            .copied()
            .filter(|&g| g != UNSET_GLOBAL_INDEX)
    }

    /// True iff global index storage exists for `dim`.
    #[track_caller]
    pub fn have_global_indices(&self, dim: usize) -> bool {
        !self.global_indices(dim).is_empty()
    }

    // --- shared entities ----------------------------------------------------------

    pub fn try_shared_entities_mut(
        &mut self,
        dim: usize,
    ) -> Result<&mut SharedEntities, TopologyError> {
        self.check_dim(dim)?;
        Ok(self.shared_entities.entry(dim).or_default())
    }

    /// Shared-entity map of `dim`, created empty on first access.
    #[track_caller]
    pub fn shared_entities_mut(&mut self, dim: usize) -> &mut SharedEntities {
        match self.try_shared_entities_mut(dim) {
            Ok(m) => m,
            Err(e) => fault(e),
        }
    }

    pub fn try_shared_entities(&self, dim: usize) -> Result<&SharedEntities, TopologyError> {
        self.check_dim(dim)?;
        Ok(self.shared_entities.get(&dim).unwrap_or(&EMPTY_SHARED))
    }

    /// Shared-entity map of `dim`; empty, and not created, if never touched.
    #[track_caller]
    pub fn shared_entities(&self, dim: usize) -> &SharedEntities {
        self.try_shared_entities(dim).unwrap_or_else(|e| fault(e))
    }

    /// True iff a shared-entity map has been created for `dim`, even if it
    /// is empty.
    pub fn have_shared_entities(&self, dim: usize) -> bool {
        self.shared_entities.contains_key(&dim)
    }

    /// Every rank sharing at least one entity of `dim`.
    #[track_caller]
    pub fn neighbor_ranks(&self, dim: usize) -> BTreeSet<Rank> {
        ownership::neighbor_ranks(self.shared_entities(dim))
    }

    // --- ghost cell ownership -----------------------------------------------------

    /// Owner rank of each ghost cell, in ghost order. Empty if not populated.
    pub fn cell_owner(&self) -> &[Rank] {
        &self.cell_owner
    }

    /// Mutable access to the ghost-cell owner table.
    pub fn cell_owner_mut(&mut self) -> &mut Vec<Rank> {
        &mut self.cell_owner
    }

    /// Replace the ghost-cell owner table; one entry per ghost cell.
    pub fn try_set_cell_owner(&mut self, owners: Vec<Rank>) -> Result<(), TopologyError> {
        let top = self.try_dim()?;
        let expected = self.num_entities[top] - self.ghost_offset[top];
        if owners.len() != expected {
            return Err(TopologyError::CellOwnerSizeMismatch {
                expected,
                found: owners.len(),
            });
        }
        self.cell_owner = owners;
        Ok(())
    }

    #[track_caller]
    pub fn set_cell_owner(&mut self, owners: Vec<Rank>) {
        if let Err(e) = self.try_set_cell_owner(owners) {
            fault(e);
        }
    }

    /// Owner of local cell `cell` if it is a ghost with a recorded owner.
    #[track_caller]
    pub fn ghost_cell_owner(&self, cell: usize) -> Option<Rank> {
        let top = self.dim();
        let offset = self.ghost_offset[top];
        cell.checked_sub(offset)
            .and_then(|i| self.cell_owner.get(i).copied())
    }

    // --- connectivity -------------------------------------------------------------

    pub fn try_connectivity(&self, d0: usize, d1: usize) -> Result<&Connectivity, TopologyError> {
        let i = self.pair_index(d0, d1)?;
        Ok(&self.connectivity[i])
    }

    /// Incidence table `d0 -> d1`. Empty if not computed. `(d0, d1)` and
    /// `(d1, d0)` are independent tables.
    #[track_caller]
    pub fn connectivity(&self, d0: usize, d1: usize) -> &Connectivity {
        self.try_connectivity(d0, d1).unwrap_or_else(|e| fault(e))
    }

    pub fn try_connectivity_mut(
        &mut self,
        d0: usize,
        d1: usize,
    ) -> Result<&mut Connectivity, TopologyError> {
        let i = self.pair_index(d0, d1)?;
        Ok(&mut self.connectivity[i])
    }

    /// Mutable incidence table `d0 -> d1`, for builders.
    #[track_caller]
    pub fn connectivity_mut(&mut self, d0: usize, d1: usize) -> &mut Connectivity {
        match self.try_connectivity_mut(d0, d1) {
            Ok(c) => c,
            Err(e) => fault(e),
        }
    }

    /// Store a complete table for `d0 -> d1`; it must have one row per local
    /// entity of `d0`.
    pub fn try_set_connectivity(
        &mut self,
        d0: usize,
        d1: usize,
        table: Connectivity,
    ) -> Result<(), TopologyError> {
        let i = self.pair_index(d0, d1)?;
        let expected = self.num_entities[d0];
        if table.num_entities() != expected {
            return Err(TopologyError::ConnectivityRowCountMismatch {
                d0,
                d1,
                expected,
                found: table.num_entities(),
            });
        }
        crate::debug_invariants!(table.validate_invariants(), "MeshTopology::set_connectivity");
        log::trace!(
            "storing connectivity {d0}->{d1}: {} rows, {} incidences",
            table.num_entities(),
            table.size()
        );
        self.connectivity[i] = table;
        Ok(())
    }

    #[track_caller]
    pub fn set_connectivity(&mut self, d0: usize, d1: usize, table: Connectivity) {
        if let Err(e) = self.try_set_connectivity(d0, d1, table) {
            fault(e);
        }
    }

    /// True if the `d0 -> d1` table has been populated.
    #[track_caller]
    pub fn have_connectivity(&self, d0: usize, d1: usize) -> bool {
        !self.connectivity(d0, d1).is_empty()
    }

    // --- clearing -----------------------------------------------------------------

    /// Drop everything, returning to the undimensioned state.
    pub fn clear(&mut self) {
        log::debug!("clearing topology");
        *self = Self::default();
    }

    pub fn try_clear_connectivity(&mut self, d0: usize, d1: usize) -> Result<(), TopologyError> {
        let i = self.pair_index(d0, d1)?;
        log::debug!("clearing connectivity {d0}->{d1}");
        self.connectivity[i].clear();
        Ok(())
    }

    /// Drop only the `d0 -> d1` table; sizes, numbering and every other pair
    /// are untouched.
    #[track_caller]
    pub fn clear_connectivity(&mut self, d0: usize, d1: usize) {
        if let Err(e) = self.try_clear_connectivity(d0, d1) {
            fault(e);
        }
    }

    // --- identity & diagnostics ---------------------------------------------------

    /// Hash of the cell-vertex table, used as a cheap mesh identity check.
    ///
    /// Degenerate (the hash of an empty table) if cell-vertex connectivity
    /// has not been populated.
    #[track_caller]
    pub fn hash(&self) -> u64 {
        let top = self.dim();
        let cells = self.connectivity(top, 0);
        if cells.is_empty() {
            log::warn!("hashing topology without cell-vertex connectivity");
        }
        cells.hash()
    }

    /// Check the structural invariants selected by `options`.
    pub fn validate_with(&self, options: ValidationOptions) -> Result<(), TopologyError> {
        validate_topology(self, options)
    }

    /// Human-readable summary of the current sizes; `verbose` adds a
    /// populated-pairs table and every non-empty connectivity.
    pub fn describe(&self, verbose: bool) -> String {
        let Some(top) = self.dim else {
            return "<MeshTopology (undimensioned)>".to_string();
        };
        let mut s = format!("<MeshTopology of dimension {top}>");
        for d in 0..=top {
            s.push_str(&format!(
                "\n  dim {d}: {} entities ({} owned, {} ghost), {} global{}{}",
                self.num_entities[d],
                self.ghost_offset[d],
                self.num_entities[d] - self.ghost_offset[d],
                self.global_num_entities[d],
                if self.global_indices[d].is_empty() {
                    ""
                } else {
                    ", numbered"
                },
                match self.shared_entities.get(&d) {
                    Some(m) => format!(", {} shared", m.len()),
                    None => String::new(),
                },
            ));
        }
        if verbose {
            s.push_str(&format!(
                "\n\n      {}",
                (0..=top).map(|d| format!("{d:>2}")).join("")
            ));
            for d0 in 0..=top {
                let row = (0..=top)
                    .map(|d1| {
                        let populated = !self.connectivity[d0 * (top + 1) + d1].is_empty();
                        format!("{:>2}", if populated { "x" } else { "-" })
                    })
                    .join("");
                s.push_str(&format!("\n  {d0:>2}  {row}"));
            }
            for (d0, d1) in (0..=top).cartesian_product(0..=top) {
                let c = &self.connectivity[d0 * (top + 1) + d1];
                if !c.is_empty() {
                    s.push_str(&format!("\n\n  {d0}->{d1}: {}", c.describe(true)));
                }
            }
        }
        s
    }

    // --- internals ----------------------------------------------------------------

    /// Returns `D` if `dim` is a valid dimension.
    fn check_dim(&self, dim: usize) -> Result<usize, TopologyError> {
        let max = self.try_dim()?;
        if dim > max {
            return Err(TopologyError::DimensionOutOfRange { dim, max });
        }
        Ok(max)
    }

    fn pair_index(&self, d0: usize, d1: usize) -> Result<usize, TopologyError> {
        let top = self.check_dim(d0)?;
        self.check_dim(d1)?;
        Ok(d0 * (top + 1) + d1)
    }
}

impl DebugInvariants for MeshTopology {
    fn validate_invariants(&self) -> Result<(), TopologyError> {
        validate_topology(self, ValidationOptions::all())
    }
}

impl fmt::Display for MeshTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}

/// Read-only view of the raw per-dimension arrays, for validation.
pub(crate) struct RawParts<'a> {
    pub dim: Option<usize>,
    pub num_entities: &'a [usize],
    pub ghost_offset: &'a [usize],
    pub global_num_entities: &'a [u64],
    pub global_indices: &'a [Vec<GlobalIndex>],
    pub shared_entities: &'a BTreeMap<usize, SharedEntities>,
    pub cell_owner: &'a [Rank],
    pub connectivity: &'a [Connectivity],
}

impl MeshTopology {
    pub(crate) fn raw_parts(&self) -> RawParts<'_> {
        RawParts {
            dim: self.dim,
            num_entities: &self.num_entities,
            ghost_offset: &self.ghost_offset,
            global_num_entities: &self.global_num_entities,
            global_indices: &self.global_indices,
            shared_entities: &self.shared_entities,
            cell_owner: &self.cell_owner,
            connectivity: &self.connectivity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing an edge, plus one ghost triangle.
    fn small_2d() -> MeshTopology {
        let mut t = MeshTopology::with_dimension(2);
        t.init_size(0, 5, 5);
        t.init_size(2, 3, 3);
        t.init_ghost(2, 2);
        t.set_connectivity(
            2,
            0,
            Connectivity::from_rows([[0u32, 1, 2], [1, 3, 2], [2, 3, 4]]),
        );
        t.set_cell_owner(vec![1]);
        t
    }

    #[test]
    fn fresh_topology_is_undimensioned() {
        let t = MeshTopology::new();
        assert!(!t.is_initialized());
        assert_eq!(t.try_dim(), Err(TopologyError::Uninitialized));
        assert_eq!(t.try_size(0), Err(TopologyError::Uninitialized));
        assert_eq!(t.to_string(), "<MeshTopology (undimensioned)>");
    }

    #[test]
    #[should_panic(expected = "not been dimensioned")]
    fn size_before_init_panics() {
        let t = MeshTopology::new();
        let _ = t.size(0);
    }

    #[test]
    fn init_dimension_allocates_every_slot() {
        let t = MeshTopology::with_dimension(3);
        assert_eq!(t.dim(), 3);
        for d in 0..=3 {
            assert_eq!(t.size(d), 0);
            assert_eq!(t.ghost_offset(d), 0);
            assert!(!t.have_global_indices(d));
            for d1 in 0..=3 {
                assert!(t.connectivity(d, d1).is_empty());
            }
        }
        assert_eq!(
            t.try_size(4),
            Err(TopologyError::DimensionOutOfRange { dim: 4, max: 3 })
        );
    }

    #[test]
    fn reinit_discards_state() {
        let mut t = small_2d();
        t.shared_entities_mut(0).entry(1).or_default().insert(3);
        t.init_dimension(1);
        assert_eq!(t.dim(), 1);
        assert_eq!(t.size(0), 0);
        assert!(!t.have_shared_entities(0));
        assert!(t.cell_owner().is_empty());
    }

    #[test]
    fn init_size_resets_ghosts() {
        let mut t = small_2d();
        assert_eq!(t.ghost_offset(2), 2);
        t.init_size(2, 4, 10);
        assert_eq!(t.size(2), 4);
        assert_eq!(t.size_global(2), 10);
        assert_eq!(t.ghost_offset(2), 4);
        assert!(t.cell_owner().is_empty());
    }

    #[test]
    fn init_size_drops_tables_that_no_longer_fit() {
        let mut t = MeshTopology::with_dimension(2);
        t.init_size(0, 3, 3);
        t.init_size(2, 1, 1);
        t.set_connectivity(2, 0, Connectivity::from_rows([[0u32, 1, 2]]));
        t.set_connectivity(0, 2, Connectivity::from_rows([[0u32], [0], [0]]));

        t.init_size(2, 4, 4);
        assert_eq!(t.size(2), 4);
        assert!(!t.have_connectivity(2, 0));
        assert_eq!(t.connectivity(2, 0).num_entities(), 0);
        // Targets of 0 -> 2 are still below the new size.
        assert!(t.have_connectivity(0, 2));
        assert!(t.validate_invariants().is_ok());

        // Fewer vertices: 0 -> 2 has too many rows, 2 -> 0 points past the end.
        t.set_connectivity(
            2,
            0,
            Connectivity::from_rows([[0u32, 1, 2], [0, 1, 2], [0, 1, 2], [0, 1, 2]]),
        );
        t.init_size(0, 2, 2);
        assert!(!t.have_connectivity(0, 2));
        assert!(!t.have_connectivity(2, 0));
        assert!(t.validate_invariants().is_ok());
    }

    #[test]
    fn init_size_keeps_tables_of_unchanged_size() {
        let mut t = small_2d();
        let before = t.hash();
        t.init_size(2, 3, 7);
        assert!(t.have_connectivity(2, 0));
        assert_eq!(t.hash(), before);
    }

    #[test]
    fn ghost_offset_is_bounded() {
        let mut t = small_2d();
        assert_eq!(
            t.try_init_ghost(2, 4),
            Err(TopologyError::GhostOffsetOutOfRange {
                dim: 2,
                offset: 4,
                size: 3
            })
        );
        assert_eq!(t.ghost_offset(2), 2);
        t.init_ghost(2, 3);
        assert_eq!(t.num_ghosts(2), 0);
    }

    #[test]
    fn ghost_ranges() {
        let t = small_2d();
        assert_eq!(t.owned_range(2), 0..2);
        assert_eq!(t.ghost_range(2), 2..3);
        assert!(!t.is_ghost(2, 1));
        assert!(t.is_ghost(2, 2));
        assert_eq!(t.ghost_cell_owner(2), Some(1));
        assert_eq!(t.ghost_cell_owner(0), None);
    }

    #[test]
    fn global_indices_are_all_or_nothing() {
        let mut t = small_2d();
        assert!(t.global_indices(0).is_empty());
        assert_eq!(
            t.try_set_global_index(0, 0, 10),
            Err(TopologyError::GlobalIndicesUnset { dim: 0 })
        );
        assert!(matches!(
            t.try_init_global_indices(0, 4),
            Err(TopologyError::GlobalIndicesSizeMismatch { .. })
        ));
        t.init_global_indices(0, 5);
        assert_eq!(t.global_indices(0).len(), 5);
        assert_eq!(t.global_index(EntityId::new(0, 3)), None);
        t.set_global_index(0, 3, 17);
        assert_eq!(t.global_index(EntityId::new(0, 3)), Some(17));
        assert_eq!(
            t.try_set_global_index(0, 5, 1),
            Err(TopologyError::EntityOutOfRange { index: 5, size: 5 })
        );

        // Resizing drops storage rather than leaving a partial map.
        t.init_size(0, 6, 6);
        assert!(!t.have_global_indices(0));
    }

    #[test]
    fn entity_accessors_share_one_index_type() {
        let mut t = small_2d();
        t.init_global_indices(2, 3);
        for cell in t.owned_range(2).chain(t.ghost_range(2)) {
            t.set_global_index(2, cell, 100 + cell as GlobalIndex);
            assert_eq!(t.global_index((2, cell)), Some(100 + cell as GlobalIndex));
            assert_eq!(t.is_ghost(2, cell), t.ghost_cell_owner(cell).is_some());
            assert_eq!(t.connectivity(2, 0).degree(cell), 3);
            assert_eq!(t.connectivity(2, 0).neighbors(cell).len(), 3);
        }
    }

    #[test]
    fn shared_entities_created_on_mutable_access_only() {
        let mut t = small_2d();
        assert!(t.shared_entities(0).is_empty());
        assert!(!t.have_shared_entities(0));
        t.shared_entities_mut(0);
        assert!(t.have_shared_entities(0));
        assert!(t.shared_entities(0).is_empty());
        t.shared_entities_mut(0).entry(2).or_default().extend([3, 1]);
        assert_eq!(t.neighbor_ranks(0).into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn set_connectivity_checks_row_count() {
        let mut t = small_2d();
        let err = t
            .try_set_connectivity(0, 2, Connectivity::from_rows([[0u32]]))
            .unwrap_err();
        assert_eq!(
            err,
            TopologyError::ConnectivityRowCountMismatch {
                d0: 0,
                d1: 2,
                expected: 5,
                found: 1
            }
        );
        assert!(!t.have_connectivity(0, 2));
    }

    #[test]
    fn connectivity_pairs_are_directional() {
        let t = small_2d();
        assert!(t.have_connectivity(2, 0));
        assert!(!t.have_connectivity(0, 2));
    }

    #[test]
    fn cell_owner_length_is_checked() {
        let mut t = small_2d();
        assert_eq!(
            t.try_set_cell_owner(vec![1, 1]),
            Err(TopologyError::CellOwnerSizeMismatch {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(t.cell_owner(), &[1]);
        t.cell_owner_mut()[0] = 4;
        assert_eq!(t.ghost_cell_owner(2), Some(4));
    }

    #[test]
    fn describe_reflects_sizes() {
        let t = small_2d();
        let s = t.describe(false);
        assert!(s.starts_with("<MeshTopology of dimension 2>"));
        assert!(s.contains("dim 2: 3 entities (2 owned, 1 ghost), 3 global"));
        let v = t.describe(true);
        assert!(v.contains("2->0: <Connectivity of 3 entities with 9 incidences>"));
        assert!(v.contains("\n   2   x - -"));
    }

    #[test]
    fn clone_is_deep() {
        let t = small_2d();
        let mut u = t.clone();
        u.connectivity_mut(2, 0).set_row(0, &[4, 3, 2]);
        u.shared_entities_mut(0).entry(0).or_default().insert(9);
        assert_eq!(t.connectivity(2, 0).neighbors(0), &[0, 1, 2]);
        assert!(!t.have_shared_entities(0));
        assert_ne!(t.hash(), u.hash());
    }

    #[test]
    fn validates_clean_topology() {
        assert!(small_2d().validate_invariants().is_ok());
    }
}
