//! Connected components over facet adjacency.

use super::Index;
use super::connectivity::Connectivity;

/// Facet partition into edge-connected components.
#[derive(Debug, Clone)]
pub struct Components {
    per_facet: Vec<Index>,
    components: Vec<Vec<Index>>,
}

impl Components {
    /// Label components with a flood fill over facet-facet adjacency.
    pub fn build(connectivity: &Connectivity) -> Self {
        let num_facets = connectivity.num_facets();
        let mut per_facet = vec![Index::MAX; num_facets];
        let mut components: Vec<Vec<Index>> = Vec::new();
        let mut queue = Vec::new();

        for seed in 0..num_facets {
            if per_facet[seed] != Index::MAX {
                continue;
            }
            let id = components.len() as Index;
            let mut members = Vec::new();
            per_facet[seed] = id;
            queue.push(seed as Index);
            while let Some(f) = queue.pop() {
                members.push(f);
                for &n in connectivity.facets_adjacent_to_facet(f) {
                    if per_facet[n as usize] == Index::MAX {
                        per_facet[n as usize] = id;
                        queue.push(n);
                    }
                }
            }
            members.sort_unstable();
            components.push(members);
        }

        Self {
            per_facet,
            components,
        }
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Facet lists, one per component.
    pub fn components(&self) -> &[Vec<Index>] {
        &self.components
    }

    /// Component id of each facet.
    pub fn per_facet_component_ids(&self) -> &[Index] {
        &self.per_facet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_component() {
        let conn = Connectivity::build(4, 3, &[0, 1, 2, 2, 1, 3]);
        let comps = Components::build(&conn);
        assert_eq!(comps.num_components(), 1);
        assert_eq!(comps.components()[0], vec![0, 1]);
        assert_eq!(comps.per_facet_component_ids(), &[0, 0]);
    }

    #[test]
    fn two_islands() {
        let conn = Connectivity::build(6, 3, &[0, 1, 2, 3, 4, 5]);
        let comps = Components::build(&conn);
        assert_eq!(comps.num_components(), 2);
        assert_eq!(comps.per_facet_component_ids(), &[0, 1]);
    }

    #[test]
    fn empty_mesh_has_no_components() {
        let conn = Connectivity::build(0, 3, &[]);
        let comps = Components::build(&conn);
        assert_eq!(comps.num_components(), 0);
    }
}
