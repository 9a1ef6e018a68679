//! Per-edge incidence index.
//!
//! Builds a corner-to-edge mapping plus singly-linked corner chains around
//! every edge and vertex. This gives O(1) per-edge queries and O(k)
//! iteration over incident facets/corners without materializing a dense
//! edge-object list.

use std::collections::HashMap;

use crate::error::{AttribError, Result};

use super::{INVALID_INDEX, Index};

/// Navigation structure over a fixed-width facet list.
#[derive(Debug, Clone)]
pub struct MeshNavigation {
    vertex_per_facet: usize,
    /// Corner to edge mapping.
    c2e: Vec<Index>,
    /// Edge to first corner in the chain.
    e2c: Vec<Index>,
    /// Next corner in the chain around an edge.
    next_corner_around_edge: Vec<Index>,
    /// Vertex to first corner in the chain.
    v2c: Vec<Index>,
    /// Next corner in the chain around a vertex.
    next_corner_around_vertex: Vec<Index>,
    is_boundary_vertex: Vec<bool>,
}

impl MeshNavigation {
    /// Build from a flat corner-to-vertex list. Every entry must be a valid
    /// vertex index (no partial/degenerate facets).
    pub fn build(num_vertices: usize, vertex_per_facet: usize, facets: &[Index]) -> Result<Self> {
        if facets.iter().any(|&v| v == INVALID_INDEX) {
            return Err(AttribError::Construction(
                "facet list contains an invalid vertex index".into(),
            ));
        }
        debug_assert!(vertex_per_facet >= 3);
        debug_assert_eq!(facets.len() % vertex_per_facet, 0);
        let num_corners = facets.len();
        let num_facets = num_corners / vertex_per_facet;

        // Unique edge ids, assigned in order of first appearance
        let mut c2e = vec![INVALID_INDEX; num_corners];
        let mut edge_map: HashMap<(Index, Index), Index> = HashMap::new();
        for f in 0..num_facets {
            for lv in 0..vertex_per_facet {
                let c = f * vertex_per_facet + lv;
                let v0 = facets[c];
                let v1 = facets[f * vertex_per_facet + (lv + 1) % vertex_per_facet];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                let next_id = edge_map.len() as Index;
                c2e[c] = *edge_map.entry(key).or_insert(next_id);
            }
        }
        let num_edges = edge_map.len();

        // Chain corners around edges and vertices. Iterating in reverse
        // leaves each chain head at the lowest corner index.
        let mut e2c = vec![INVALID_INDEX; num_edges];
        let mut next_corner_around_edge = vec![INVALID_INDEX; num_corners];
        for c in (0..num_corners).rev() {
            let e = c2e[c] as usize;
            next_corner_around_edge[c] = e2c[e];
            e2c[e] = c as Index;
        }

        let mut v2c = vec![INVALID_INDEX; num_vertices];
        let mut next_corner_around_vertex = vec![INVALID_INDEX; num_corners];
        for c in (0..num_corners).rev() {
            let v = facets[c] as usize;
            next_corner_around_vertex[c] = v2c[v];
            v2c[v] = c as Index;
        }

        let mut nav = Self {
            vertex_per_facet,
            c2e,
            e2c,
            next_corner_around_edge,
            v2c,
            next_corner_around_vertex,
            is_boundary_vertex: vec![false; num_vertices],
        };

        for e in 0..num_edges as Index {
            if nav.is_boundary_edge(e) {
                let [v0, v1] = nav.get_edge_vertices(facets, e);
                nav.is_boundary_vertex[v0 as usize] = true;
                nav.is_boundary_vertex[v1 as usize] = true;
            }
        }
        Ok(nav)
    }

    /// Number of vertices per facet (constant for this mesh family).
    pub fn vertex_per_facet(&self) -> usize {
        self.vertex_per_facet
    }

    /// Number of unique edges.
    pub fn get_num_edges(&self) -> Index {
        self.e2c.len() as Index
    }

    /// Edge index corresponding to (f, lv) -- (f, lv+1).
    pub fn get_edge(&self, f: Index, lv: usize) -> Index {
        self.c2e[f as usize * self.vertex_per_facet + lv]
    }

    /// Edge index associated to a corner: for a facet (v0, v1, v2) with
    /// corners (c0, c1, c2), corner ci maps to the edge (vi, vi+1).
    pub fn get_edge_from_corner(&self, c: Index) -> Index {
        self.c2e[c as usize]
    }

    /// First corner in the chain around an edge.
    pub fn get_first_corner_around_edge(&self, e: Index) -> Index {
        self.e2c[e as usize]
    }

    /// Next corner in the chain around the edge of `c`, or `INVALID_INDEX`
    /// at the end of the chain.
    pub fn get_next_corner_around_edge(&self, c: Index) -> Index {
        self.next_corner_around_edge[c as usize]
    }

    /// First corner in the chain around a vertex.
    pub fn get_first_corner_around_vertex(&self, v: Index) -> Index {
        self.v2c[v as usize]
    }

    /// Next corner in the chain around the vertex of `c`, or
    /// `INVALID_INDEX` at the end of the chain.
    pub fn get_next_corner_around_vertex(&self, c: Index) -> Index {
        self.next_corner_around_vertex[c as usize]
    }

    /// Vertex ids at the endpoints of an edge.
    pub fn get_edge_vertices(&self, facets: &[Index], e: Index) -> [Index; 2] {
        let c = self.e2c[e as usize];
        assert_ne!(c, INVALID_INDEX, "edge {e} has no incident corner");
        let f = c as usize / self.vertex_per_facet;
        let lv = c as usize % self.vertex_per_facet;
        [
            facets[f * self.vertex_per_facet + lv],
            facets[f * self.vertex_per_facet + (lv + 1) % self.vertex_per_facet],
        ]
    }

    /// Vertex opposite an edge on one of its incident facets (boundary
    /// edges have exactly one). Triangle meshes only.
    pub fn get_vertex_opposite_edge(&self, facets: &[Index], e: Index) -> Index {
        assert_eq!(
            self.vertex_per_facet, 3,
            "opposite vertex queries require a triangle mesh"
        );
        let c = self.e2c[e as usize];
        assert_ne!(c, INVALID_INDEX, "edge {e} has no incident corner");
        let f = c as usize / self.vertex_per_facet;
        let lv = c as usize % self.vertex_per_facet;
        facets[f * self.vertex_per_facet + (lv + 2) % self.vertex_per_facet]
    }

    /// Number of facets incident to a vertex.
    pub fn get_num_facets_around_vertex(&self, v: Index) -> Index {
        let mut count = 0;
        self.foreach_facets_around_vertex(v, |_| count += 1);
        count
    }

    /// Number of facets incident to an edge.
    pub fn get_num_facets_around_edge(&self, e: Index) -> Index {
        let mut count = 0;
        self.foreach_facets_around_edge(e, |_| count += 1);
        count
    }

    /// One facet incident to an edge, or `INVALID_INDEX`.
    pub fn get_one_facet_around_edge(&self, e: Index) -> Index {
        let c = self.e2c[e as usize];
        if c == INVALID_INDEX {
            INVALID_INDEX
        } else {
            c / self.vertex_per_facet as Index
        }
    }

    /// One corner incident to an edge.
    pub fn get_one_corner_around_edge(&self, e: Index) -> Index {
        self.e2c[e as usize]
    }

    /// One corner incident to a vertex.
    pub fn get_one_corner_around_vertex(&self, v: Index) -> Index {
        self.v2c[v as usize]
    }

    /// Whether the edge has exactly one incident facet.
    pub fn is_boundary_edge(&self, e: Index) -> bool {
        let c = self.e2c[e as usize];
        debug_assert_ne!(c, INVALID_INDEX);
        self.next_corner_around_edge[c as usize] == INVALID_INDEX
    }

    /// Whether the vertex lies on a boundary edge.
    pub fn is_boundary_vertex(&self, v: Index) -> bool {
        self.is_boundary_vertex[v as usize]
    }

    /// Apply `func` to each facet around a vertex.
    pub fn foreach_facets_around_vertex(&self, v: Index, mut func: impl FnMut(Index)) {
        let mut c = self.v2c[v as usize];
        while c != INVALID_INDEX {
            func(c / self.vertex_per_facet as Index);
            c = self.next_corner_around_vertex[c as usize];
        }
    }

    /// Apply `func` to each facet around an edge.
    pub fn foreach_facets_around_edge(&self, e: Index, mut func: impl FnMut(Index)) {
        let mut c = self.e2c[e as usize];
        while c != INVALID_INDEX {
            func(c / self.vertex_per_facet as Index);
            c = self.next_corner_around_edge[c as usize];
        }
    }

    /// Apply `func` to each corner around a vertex.
    pub fn foreach_corners_around_vertex(&self, v: Index, mut func: impl FnMut(Index)) {
        let mut c = self.v2c[v as usize];
        while c != INVALID_INDEX {
            func(c);
            c = self.next_corner_around_vertex[c as usize];
        }
    }

    /// Apply `func` to each corner around an edge.
    pub fn foreach_corners_around_edge(&self, e: Index, mut func: impl FnMut(Index)) {
        let mut c = self.e2c[e as usize];
        while c != INVALID_INDEX {
            func(c);
            c = self.next_corner_around_edge[c as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the edge (1, 2):
    ///   0 -- 1
    ///   |  / |
    ///   | /  |
    ///   2 -- 3
    fn two_triangles() -> Vec<Index> {
        vec![0, 1, 2, 2, 1, 3]
    }

    #[test]
    fn rejects_invalid_facet_entries() {
        let facets = vec![0, 1, INVALID_INDEX];
        assert!(MeshNavigation::build(3, 3, &facets).is_err());
    }

    #[test]
    fn counts_unique_edges() {
        let nav = MeshNavigation::build(4, 3, &two_triangles()).unwrap();
        // Edges: (0,1), (1,2), (0,2), (2,3), (1,3)
        assert_eq!(nav.get_num_edges(), 5);
    }

    #[test]
    fn shared_edge_has_two_facets() {
        let facets = two_triangles();
        let nav = MeshNavigation::build(4, 3, &facets).unwrap();
        // Corner 1 of facet 0 spans (1, 2), as does corner 4 (1 of facet 1
        // reversed)
        let shared = nav.get_edge(0, 1);
        assert_eq!(nav.get_edge_from_corner(3), shared);
        assert_eq!(nav.get_num_facets_around_edge(shared), 2);
        assert!(!nav.is_boundary_edge(shared));

        let mut facets_around = Vec::new();
        nav.foreach_facets_around_edge(shared, |f| facets_around.push(f));
        assert_eq!(facets_around, vec![0, 1]);

        let mut vs = nav.get_edge_vertices(&facets, shared);
        vs.sort_unstable();
        assert_eq!(vs, [1, 2]);
    }

    #[test]
    fn boundary_classification() {
        let nav = MeshNavigation::build(4, 3, &two_triangles()).unwrap();
        let shared = nav.get_edge(0, 1);
        for e in 0..nav.get_num_edges() {
            assert_eq!(nav.is_boundary_edge(e), e != shared);
        }
        // Every vertex touches a boundary edge in this strip
        for v in 0..4 {
            assert!(nav.is_boundary_vertex(v));
        }
    }

    #[test]
    fn facets_around_vertex() {
        let nav = MeshNavigation::build(4, 3, &two_triangles()).unwrap();
        assert_eq!(nav.get_num_facets_around_vertex(0), 1);
        assert_eq!(nav.get_num_facets_around_vertex(1), 2);
        assert_eq!(nav.get_num_facets_around_vertex(2), 2);
        assert_eq!(nav.get_num_facets_around_vertex(3), 1);

        let mut corners = Vec::new();
        nav.foreach_corners_around_vertex(1, |c| corners.push(c));
        assert_eq!(corners, vec![1, 4]);
    }

    #[test]
    fn opposite_vertex_on_triangle() {
        let facets = two_triangles();
        let nav = MeshNavigation::build(4, 3, &facets).unwrap();
        let shared = nav.get_edge(0, 1);
        let opposite = nav.get_vertex_opposite_edge(&facets, shared);
        // First incident facet is facet 0 = (0, 1, 2), opposite of (1,2) is 0
        assert_eq!(opposite, 0);
    }

    #[test]
    fn quad_mesh_edges() {
        // One quad: 4 boundary edges
        let facets = vec![0, 1, 2, 3];
        let nav = MeshNavigation::build(4, 4, &facets).unwrap();
        assert_eq!(nav.get_num_edges(), 4);
        for e in 0..4 {
            assert!(nav.is_boundary_edge(e));
            assert_eq!(nav.get_num_facets_around_edge(e), 1);
        }
    }
}
