//! Compressed-row incidence table for one ordered pair of dimensions.
//!
//! A [`Connectivity`] stores, for every entity of dimension `d0`, the ordered
//! list of entities of dimension `d1` it is incident to. Rows live back to
//! back in one flat `indices` array; `offsets[i]..offsets[i + 1]` is the slice
//! for entity `i`. Row order is whatever the builder wrote and is never
//! reordered, since consumers rely on it (local vertex numbering inside a
//! cell, for example).

use std::fmt;
use std::hash::{BuildHasher, Hasher};

use itertools::Itertools;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::{TopologyError, fault};
use crate::topology::entity::LocalIndex;

/// Seeds for the content hash. Constant so that processes running the same
/// build hash identical tables identically.
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Variable-degree incidence relation `d0 -> d1` in CSR form.
///
/// Deserialization rejects arrays that do not form a valid layout.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ConnectivityData")]
pub struct Connectivity {
    /// Row boundaries; always holds at least the leading `0`.
    offsets: Vec<usize>,
    /// Concatenated rows.
    indices: Vec<LocalIndex>,
    /// Process-wide incidence count per row (empty if never set).
    global_degrees: Vec<u32>,
}

/// Unchecked wire form of [`Connectivity`].
#[derive(serde::Deserialize)]
struct ConnectivityData {
    offsets: Vec<usize>,
    indices: Vec<LocalIndex>,
    global_degrees: Vec<u32>,
}

impl TryFrom<ConnectivityData> for Connectivity {
    type Error = TopologyError;

    fn try_from(raw: ConnectivityData) -> Result<Self, Self::Error> {
        let c = Self {
            offsets: raw.offsets,
            indices: raw.indices,
            global_degrees: raw.global_degrees,
        };
        c.validate_invariants()?;
        Ok(c)
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            indices: Vec::new(),
            global_degrees: Vec::new(),
        }
    }
}

impl Connectivity {
    /// Empty table: zero rows, zero incidences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows given in source-entity order.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[LocalIndex]>,
    {
        let mut c = Self::new();
        c.set(rows);
        c
    }

    /// Adopt raw CSR arrays after checking that they describe a valid layout.
    pub fn try_from_csr(
        offsets: Vec<usize>,
        indices: Vec<LocalIndex>,
    ) -> Result<Self, TopologyError> {
        check_csr(&offsets, indices.len())?;
        Ok(Self {
            offsets,
            indices,
            global_degrees: Vec::new(),
        })
    }

    // --- population ---------------------------------------------------------------

    /// Replace all rows.
    pub fn set<I, R>(&mut self, rows: I)
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[LocalIndex]>,
    {
        self.clear();
        for row in rows {
            self.push_row(row.as_ref());
        }
        log::trace!(
            "connectivity set: {} rows, {} incidences",
            self.num_entities(),
            self.size()
        );
    }

    /// Allocate `num_entities` rows of `degree` zeroed entries, to be filled
    /// with [`set_row`](Self::set_row).
    pub fn init(&mut self, num_entities: usize, degree: usize) {
        self.offsets = (0..=num_entities).map(|i| i * degree).collect();
        self.indices = vec![0; num_entities * degree];
        self.global_degrees.clear();
    }

    /// Append one row for the next source entity.
    pub fn push_row(&mut self, row: &[LocalIndex]) {
        self.indices.extend_from_slice(row);
        self.offsets.push(self.indices.len());
    }

    /// Overwrite the row of `entity`; the new row must keep its length.
    pub fn try_set_row(&mut self, entity: usize, row: &[LocalIndex]) -> Result<(), TopologyError> {
        let range = self.try_row_range(entity)?;
        if range.len() != row.len() {
            return Err(TopologyError::RowDegreeMismatch {
                entity,
                expected: range.len(),
                found: row.len(),
            });
        }
        self.indices[range].copy_from_slice(row);
        Ok(())
    }

    /// Panicking form of [`try_set_row`](Self::try_set_row).
    #[track_caller]
    pub fn set_row(&mut self, entity: usize, row: &[LocalIndex]) {
        if let Err(e) = self.try_set_row(entity, row) {
            fault(e);
        }
    }

    /// Record the process-wide incidence count of every row. Used for ghosted
    /// entities whose local row is incomplete (e.g. a facet shared with a
    /// remote cell).
    pub fn try_set_global_degrees(&mut self, degrees: Vec<u32>) -> Result<(), TopologyError> {
        if degrees.len() != self.num_entities() {
            return Err(TopologyError::GlobalDegreeSizeMismatch {
                expected: self.num_entities(),
                found: degrees.len(),
            });
        }
        self.global_degrees = degrees;
        Ok(())
    }

    /// Panicking form of [`try_set_global_degrees`](Self::try_set_global_degrees).
    #[track_caller]
    pub fn set_global_degrees(&mut self, degrees: Vec<u32>) {
        if let Err(e) = self.try_set_global_degrees(degrees) {
            fault(e);
        }
    }

    /// Discard all rows.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.offsets.push(0);
        self.indices.clear();
        self.global_degrees.clear();
    }

    // --- queries ------------------------------------------------------------------

    /// Number of source entities (rows).
    #[inline]
    pub fn num_entities(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of incidences over all rows.
    #[inline]
    pub fn size(&self) -> usize {
        self.indices.len()
    }

    /// True if no rows have been stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_entities() == 0
    }

    pub fn try_degree(&self, entity: usize) -> Result<usize, TopologyError> {
        self.try_row_range(entity).map(|r| r.len())
    }

    /// Number of entities incident to `entity`.
    ///
    /// # Panics
    /// Panics if `entity >= num_entities()`.
    #[track_caller]
    pub fn degree(&self, entity: usize) -> usize {
        self.try_degree(entity).unwrap_or_else(|e| fault(e))
    }

    pub fn try_neighbors(&self, entity: usize) -> Result<&[LocalIndex], TopologyError> {
        let range = self.try_row_range(entity)?;
        Ok(&self.indices[range])
    }

    /// Incident entities of `entity`, in the order they were written.
    ///
    /// # Panics
    /// Panics if `entity >= num_entities()`.
    #[track_caller]
    pub fn neighbors(&self, entity: usize) -> &[LocalIndex] {
        self.try_neighbors(entity).unwrap_or_else(|e| fault(e))
    }

    /// Process-wide incidence count of `entity`; the local degree unless
    /// global degrees were recorded.
    #[track_caller]
    pub fn global_degree(&self, entity: usize) -> usize {
        match self.global_degrees.get(entity) {
            Some(&g) => g as usize,
            None => self.degree(entity),
        }
    }

    /// True if [`set_global_degrees`](Self::set_global_degrees) has been called.
    pub fn has_global_degrees(&self) -> bool {
        !self.global_degrees.is_empty()
    }

    /// All rows in source-entity order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[LocalIndex]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.indices[w[0]..w[1]])
    }

    /// Raw row boundaries (`num_entities() + 1` entries).
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Raw concatenated rows.
    #[inline]
    pub fn indices(&self) -> &[LocalIndex] {
        &self.indices
    }

    /// Largest entity index referenced by any row.
    pub fn max_target(&self) -> Option<LocalIndex> {
        self.indices.iter().copied().max()
    }

    /// Deterministic, order-sensitive hash of the row layout and contents.
    ///
    /// Lengths and offsets are fed as `u64`, so 32- and 64-bit targets see
    /// the same input. The value is only comparable between processes
    /// running the same build: `ahash` does not fix its output across
    /// versions or platforms.
    pub fn hash(&self) -> u64 {
        let [k0, k1, k2, k3] = HASH_SEEDS;
        let mut h = ahash::RandomState::with_seeds(k0, k1, k2, k3).build_hasher();
        h.write_u64(self.offsets.len() as u64);
        for &o in &self.offsets {
            h.write_u64(o as u64);
        }
        h.write_u64(self.indices.len() as u64);
        for &i in &self.indices {
            h.write_u32(i);
        }
        h.finish()
    }

    /// Human-readable summary; `verbose` lists every row.
    pub fn describe(&self, verbose: bool) -> String {
        if self.is_empty() {
            return "<Connectivity (empty)>".to_string();
        }
        let mut s = format!(
            "<Connectivity of {} entities with {} incidences>",
            self.num_entities(),
            self.size()
        );
        if verbose {
            for (i, row) in self.rows().enumerate() {
                s.push_str(&format!("\n  {i}: {}", row.iter().join(" ")));
            }
        }
        s
    }

    fn try_row_range(&self, entity: usize) -> Result<std::ops::Range<usize>, TopologyError> {
        if entity >= self.num_entities() {
            return Err(TopologyError::EntityOutOfRange {
                index: entity,
                size: self.num_entities(),
            });
        }
        Ok(self.offsets[entity]..self.offsets[entity + 1])
    }
}

fn check_csr(offsets: &[usize], num_indices: usize) -> Result<(), TopologyError> {
    match offsets.first() {
        None => return Err(TopologyError::InvalidCsr("offsets must not be empty")),
        Some(&first) if first != 0 => {
            return Err(TopologyError::InvalidCsr("offsets must start at 0"));
        }
        Some(_) => {}
    }
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(TopologyError::InvalidCsr("offsets must be non-decreasing"));
    }
    if offsets.last().copied() != Some(num_indices) {
        return Err(TopologyError::InvalidCsr(
            "last offset must equal the number of indices",
        ));
    }
    Ok(())
}

impl DebugInvariants for Connectivity {
    fn validate_invariants(&self) -> Result<(), TopologyError> {
        check_csr(&self.offsets, self.indices.len())?;
        if !self.global_degrees.is_empty() && self.global_degrees.len() != self.num_entities() {
            return Err(TopologyError::GlobalDegreeSizeMismatch {
                expected: self.num_entities(),
                found: self.global_degrees.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}
