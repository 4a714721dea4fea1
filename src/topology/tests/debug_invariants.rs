#![cfg(any(debug_assertions, feature = "strict-invariants"))]

use crate::debug_invariants::DebugInvariants;
use crate::topology::{Connectivity, MeshTopology};

fn ghosted_triangles() -> MeshTopology {
    let mut t = MeshTopology::with_dimension(2);
    t.init_size(0, 4, 4);
    t.init_size(2, 2, 2);
    t.init_ghost(2, 1);
    t.set_connectivity(2, 0, Connectivity::from_rows([[0u32, 1, 2], [1, 3, 2]]));
    t.set_cell_owner(vec![1]);
    t
}

/// Table whose global degrees stop covering its rows after a late append.
fn table_with_short_global_degrees() -> Connectivity {
    let mut c = Connectivity::from_rows([[0u32, 1]]);
    c.set_global_degrees(vec![2]);
    c.push_row(&[1]);
    c
}

#[test]
fn clean_topology_passes() {
    ghosted_triangles().debug_assert_invariants();
}

#[test]
#[should_panic(expected = "[invariants]")]
fn extra_rows_through_builder_access_panic_in_debug() {
    let mut t = ghosted_triangles();
    t.connectivity_mut(2, 0).push_row(&[0, 2, 3]);
    t.debug_assert_invariants();
}

#[test]
#[should_panic(expected = "references 4")]
fn dangling_target_panics_in_debug() {
    let mut t = ghosted_triangles();
    t.connectivity_mut(2, 0).set_row(1, &[1, 4, 2]);
    t.debug_assert_invariants();
}

#[test]
#[should_panic(expected = "cell owner table")]
fn cell_owner_mismatch_panics_in_debug() {
    let mut t = ghosted_triangles();
    t.cell_owner_mut().push(2);
    t.debug_assert_invariants();
}

#[test]
#[should_panic(expected = "global degree table")]
fn stale_global_degrees_panic_in_debug() {
    table_with_short_global_degrees().debug_assert_invariants();
}

#[test]
#[should_panic(expected = "MeshTopology::set_connectivity")]
fn storing_broken_table_panics_in_debug() {
    let mut t = MeshTopology::with_dimension(1);
    t.init_size(1, 2, 2);
    t.set_connectivity(1, 0, table_with_short_global_degrees());
}
