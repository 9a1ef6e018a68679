//! Manifoldness classification.
//!
//! An edge is manifold when at most two facets share it. A vertex is
//! manifold when its incident facets form a single fan connected through
//! edges incident to that vertex; a mesh is vertex-manifold when every
//! vertex is.

use std::collections::HashMap;

use super::navigation::MeshNavigation;
use super::{INVALID_INDEX, Index};

/// Edge/vertex manifoldness flags for a mesh.
#[derive(Debug, Clone)]
pub struct MeshTopology {
    edge_manifold: bool,
    vertex_manifold: bool,
}

impl MeshTopology {
    /// Classify from the navigation structure.
    pub fn build(navigation: &MeshNavigation, num_vertices: usize) -> Self {
        let edge_manifold = (0..navigation.get_num_edges())
            .all(|e| navigation.get_num_facets_around_edge(e) <= 2);

        let vertex_manifold =
            edge_manifold && (0..num_vertices as Index).all(|v| is_fan(navigation, v));

        Self {
            edge_manifold,
            vertex_manifold,
        }
    }

    pub fn is_edge_manifold(&self) -> bool {
        self.edge_manifold
    }

    pub fn is_vertex_manifold(&self) -> bool {
        self.vertex_manifold
    }
}

/// Whether the facets incident to `v` are all reachable from each other
/// through edges incident to `v` (a single fan or umbrella).
fn is_fan(navigation: &MeshNavigation, v: Index) -> bool {
    let mut incident = Vec::new();
    navigation.foreach_facets_around_vertex(v, |f| incident.push(f));
    if incident.len() <= 1 {
        return true;
    }

    let local: HashMap<Index, usize> = incident
        .iter()
        .enumerate()
        .map(|(i, &f)| (f, i))
        .collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let stride = navigation.vertex_per_facet();
    let mut parent: Vec<usize> = (0..incident.len()).collect();

    navigation.foreach_corners_around_vertex(v, |c| {
        let f = c as usize / stride;
        let lv = c as usize % stride;
        // The two facet edges touching v at this corner: the corner's own
        // edge (v, next) and the previous corner's edge (prev, v).
        let prev_corner = (f * stride + (lv + stride - 1) % stride) as Index;
        for e in [
            navigation.get_edge_from_corner(c),
            navigation.get_edge_from_corner(prev_corner),
        ] {
            if e == INVALID_INDEX {
                continue;
            }
            let mut first = usize::MAX;
            navigation.foreach_facets_around_edge(e, |g| {
                if let Some(&gl) = local.get(&g) {
                    if first == usize::MAX {
                        first = gl;
                    } else {
                        let a = find(&mut parent, first);
                        let b = find(&mut parent, gl);
                        parent[a] = b;
                    }
                }
            });
        }
    });

    let root = find(&mut parent, 0);
    (1..incident.len()).all(|i| find(&mut parent, i) == root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology_of(num_vertices: usize, vertex_per_facet: usize, facets: &[Index]) -> MeshTopology {
        let nav = MeshNavigation::build(num_vertices, vertex_per_facet, facets).unwrap();
        MeshTopology::build(&nav, num_vertices)
    }

    #[test]
    fn triangle_strip_is_manifold() {
        let topo = topology_of(4, 3, &[0, 1, 2, 2, 1, 3]);
        assert!(topo.is_edge_manifold());
        assert!(topo.is_vertex_manifold());
    }

    #[test]
    fn three_facets_on_one_edge_are_not_edge_manifold() {
        // Edge (0, 1) shared by three triangles
        let topo = topology_of(5, 3, &[0, 1, 2, 1, 0, 3, 0, 1, 4]);
        assert!(!topo.is_edge_manifold());
        assert!(!topo.is_vertex_manifold());
    }

    #[test]
    fn bowtie_vertex_is_not_vertex_manifold() {
        // Two triangles meeting only at vertex 2 (a bowtie)
        let topo = topology_of(5, 3, &[0, 1, 2, 2, 3, 4]);
        assert!(topo.is_edge_manifold());
        assert!(!topo.is_vertex_manifold());
    }

    #[test]
    fn empty_mesh_is_manifold() {
        let topo = topology_of(0, 3, &[]);
        assert!(topo.is_edge_manifold());
        assert!(topo.is_vertex_manifold());
    }
}
