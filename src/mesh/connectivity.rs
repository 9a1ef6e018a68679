//! Precomputed adjacency lists.
//!
//! Built once from the facet list; afterwards vertex-vertex, vertex-facet,
//! and facet-facet adjacency queries are O(1) lookups.

use std::collections::HashMap;

use super::Index;

/// Vertex/facet adjacency lists for a fixed-width facet mesh.
#[derive(Debug, Clone)]
pub struct Connectivity {
    v2v: Vec<Vec<Index>>,
    v2f: Vec<Vec<Index>>,
    f2f: Vec<Vec<Index>>,
}

impl Connectivity {
    /// Build adjacency lists from a flat corner-to-vertex list.
    pub fn build(num_vertices: usize, vertex_per_facet: usize, facets: &[Index]) -> Self {
        let num_facets = if vertex_per_facet == 0 {
            0
        } else {
            facets.len() / vertex_per_facet
        };

        let mut v2v: Vec<Vec<Index>> = vec![Vec::new(); num_vertices];
        let mut v2f: Vec<Vec<Index>> = vec![Vec::new(); num_vertices];
        let mut edge_facets: HashMap<(Index, Index), Vec<Index>> = HashMap::new();

        for f in 0..num_facets {
            for lv in 0..vertex_per_facet {
                let v0 = facets[f * vertex_per_facet + lv];
                let v1 = facets[f * vertex_per_facet + (lv + 1) % vertex_per_facet];
                v2f[v0 as usize].push(f as Index);
                v2v[v0 as usize].push(v1);
                v2v[v1 as usize].push(v0);
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_facets.entry(key).or_default().push(f as Index);
            }
        }

        for list in v2v.iter_mut().chain(v2f.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let mut f2f: Vec<Vec<Index>> = vec![Vec::new(); num_facets];
        for incident in edge_facets.values() {
            for &fa in incident {
                for &fb in incident {
                    if fa != fb {
                        f2f[fa as usize].push(fb);
                    }
                }
            }
        }
        for list in f2f.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }

        Self { v2v, v2f, f2f }
    }

    /// Vertices sharing an edge with `v`.
    pub fn vertices_adjacent_to_vertex(&self, v: Index) -> &[Index] {
        &self.v2v[v as usize]
    }

    /// Facets incident to `v`.
    pub fn facets_adjacent_to_vertex(&self, v: Index) -> &[Index] {
        &self.v2f[v as usize]
    }

    /// Facets sharing an edge with `f`.
    pub fn facets_adjacent_to_facet(&self, f: Index) -> &[Index] {
        &self.f2f[f as usize]
    }

    pub fn num_facets(&self) -> usize {
        self.f2f.len()
    }
}
