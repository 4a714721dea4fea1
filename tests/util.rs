#![allow(dead_code)]
use mesh_topology::topology::{Connectivity, LocalIndex, MeshTopology};

/// Unit square split into two triangles, fully owned:
///
/// ```text
/// 3---2
/// | / |
/// 0---1
/// ```
pub fn unit_square() -> MeshTopology {
    let mut t = MeshTopology::with_dimension(2);
    t.init_size(0, 4, 4);
    t.init_size(1, 5, 5);
    t.init_size(2, 2, 2);
    t.set_connectivity(2, 0, Connectivity::from_rows([[0u32, 1, 2], [0, 2, 3]]));
    t
}

/// 2-D partition with `owned` triangles followed by `ghosts` ghost triangles,
/// each a fan around vertex 0.
pub fn fan(owned: usize, ghosts: usize, global_cells: u64) -> MeshTopology {
    let cells = owned + ghosts;
    let mut t = MeshTopology::with_dimension(2);
    t.init_size(0, cells + 2, (cells + 2) as u64);
    t.init_size(2, cells, global_cells);
    t.init_ghost(2, owned);
    let rows = (0..cells as LocalIndex).map(|c| [0, c + 1, c + 2]);
    t.set_connectivity(2, 0, Connectivity::from_rows(rows));
    t
}

/// Transpose of `c`, with `num_targets` rows; rows list sources ascending.
pub fn transpose(c: &Connectivity, num_targets: usize) -> Connectivity {
    let mut rows = vec![Vec::new(); num_targets];
    for (src, row) in c.rows().enumerate() {
        for &dst in row {
            rows[dst as usize].push(src as LocalIndex);
        }
    }
    Connectivity::from_rows(rows)
}
