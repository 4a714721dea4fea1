//! Ownership metadata for entities shared between processes.
//!
//! A [`SharedEntities`] map records, for one dimension, which other ranks
//! also hold a given local entity. Only entities known to be shared appear as
//! keys. Ordered containers keep iteration deterministic on every rank.

use std::collections::{BTreeMap, BTreeSet};

use crate::mesh_error::TopologyError;
use crate::topology::entity::{LocalIndex, Rank};

/// Local entity index -> ranks that also hold the entity.
pub type SharedEntities = BTreeMap<LocalIndex, BTreeSet<Rank>>;

/// Returned by read-only lookups of a dimension that never had a map.
pub(crate) static EMPTY_SHARED: SharedEntities = BTreeMap::new();

/// Every rank that shares at least one entity, sorted ascending.
pub fn neighbor_ranks(shared: &SharedEntities) -> BTreeSet<Rank> {
    shared.values().flatten().copied().collect()
}

/// Local indices shared with `rank`, ascending.
pub fn entities_shared_with(shared: &SharedEntities, rank: Rank) -> Vec<LocalIndex> {
    shared
        .iter()
        .filter_map(|(&entity, ranks)| ranks.contains(&rank).then_some(entity))
        .collect()
}

/// Group shared entities by neighbouring rank; each list is ascending.
pub fn entities_by_rank(shared: &SharedEntities) -> BTreeMap<Rank, Vec<LocalIndex>> {
    let mut out: BTreeMap<Rank, Vec<LocalIndex>> = BTreeMap::new();
    for (&entity, ranks) in shared {
        for &rank in ranks {
            out.entry(rank).or_default().push(entity);
        }
    }
    out
}

/// Check that every key addresses one of the `size` local entities of `dim`.
pub fn validate_shared_entities(
    shared: &SharedEntities,
    dim: usize,
    size: usize,
) -> Result<(), TopologyError> {
    // Keys are ordered, so the last one is the largest.
    match shared.keys().next_back() {
        Some(&index) if index as usize >= size => {
            Err(TopologyError::SharedEntityOutOfRange { dim, index, size })
        }
        _ => Ok(()),
    }
}
