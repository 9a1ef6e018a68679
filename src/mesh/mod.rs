//! The mesh aggregate.
//!
//! A [`Mesh`] owns fixed-width facet geometry (triangle or quad), one
//! attribute container per element kind plus an indexed container, and
//! lazily-built derived structures: connectivity (adjacency lists),
//! components (edge-connected facet islands), topology (manifoldness
//! flags), and navigation (per-edge incidence). Derived structures are
//! built on demand by their `initialize_*` method and are never invalidated
//! automatically; after mutating geometry, re-initialization is the
//! caller's responsibility.

pub mod components;
pub mod connectivity;
pub mod navigation;
pub mod topology;

use crate::attribute::{
    Attribute, AttributeElement, AttributeUsage, ErasedAttribute, ErasedIndexedAttribute,
};
use crate::container::{AttributeContainer, IndexedAttributeContainer, ReservedName};
use crate::error::{AttribError, Result};
use crate::scalar::Scalar;

pub use components::Components;
pub use connectivity::Connectivity;
pub use navigation::MeshNavigation;
pub use topology::MeshTopology;

/// Index type used for mesh connectivity.
pub type Index = u32;

/// Sentinel marking an absent/invalid mesh index.
pub const INVALID_INDEX: Index = Index::MAX;

/// A polygon mesh with typed attribute channels.
#[derive(Debug, Clone)]
pub struct Mesh {
    dim: usize,
    vertex_per_facet: usize,
    /// Vertex positions: one `dim`-channel row per vertex.
    vertices: Attribute<f64>,
    /// Facet connectivity flattened to corners: entry `f * k + lv` is the
    /// vertex at local corner `lv` of facet `f`.
    corner_to_vertex: Attribute<Index>,
    vertex_attributes: AttributeContainer,
    facet_attributes: AttributeContainer,
    corner_attributes: AttributeContainer,
    edge_attributes: AttributeContainer,
    indexed_attributes: IndexedAttributeContainer,
    connectivity: Option<Connectivity>,
    components: Option<Components>,
    topology: Option<MeshTopology>,
    navigation: Option<MeshNavigation>,
}

impl Mesh {
    /// Create an empty mesh with `dim`-dimensional vertices and fixed-width
    /// facets (3 for triangles, 4 for quads).
    pub fn new(dim: usize, vertex_per_facet: usize) -> Result<Self> {
        if dim < 2 || dim > 3 {
            return Err(AttribError::Construction(format!(
                "unsupported vertex dimension {dim}"
            )));
        }
        if vertex_per_facet < 3 || vertex_per_facet > 4 {
            return Err(AttribError::Construction(format!(
                "unsupported facet width {vertex_per_facet}"
            )));
        }
        Ok(Self {
            dim,
            vertex_per_facet,
            vertices: Attribute::new(AttributeElement::Vertex, AttributeUsage::Vector, dim)?,
            corner_to_vertex: Attribute::new(
                AttributeElement::Corner,
                AttributeUsage::VertexIndex,
                1,
            )?,
            vertex_attributes: AttributeContainer::new(),
            facet_attributes: AttributeContainer::new(),
            corner_attributes: AttributeContainer::new(),
            edge_attributes: AttributeContainer::new(),
            indexed_attributes: IndexedAttributeContainer::new(),
            connectivity: None,
            components: None,
            topology: None,
            navigation: None,
        })
    }

    /// Create a mesh adopting flat vertex and facet buffers.
    pub fn from_buffers(
        dim: usize,
        vertex_per_facet: usize,
        vertices: Vec<f64>,
        facets: Vec<Index>,
    ) -> Result<Self> {
        let mut mesh = Self::new(dim, vertex_per_facet)?;
        mesh.import_vertices(vertices)?;
        mesh.import_facets(facets)?;
        Ok(mesh)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vertex_per_facet(&self) -> usize {
        self.vertex_per_facet
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.num_elements()
    }

    pub fn num_facets(&self) -> usize {
        self.corner_to_vertex.num_elements() / self.vertex_per_facet
    }

    pub fn num_corners(&self) -> usize {
        self.corner_to_vertex.num_elements()
    }

    /// Flat vertex coordinates (`num_vertices * dim` entries).
    pub fn get_vertices(&self) -> &[f64] {
        self.vertices.get_all()
    }

    /// Flat corner-to-vertex list (`num_facets * vertex_per_facet`
    /// entries).
    pub fn get_facets(&self) -> &[Index] {
        self.corner_to_vertex.get_all()
    }

    /// Coordinates of one vertex.
    pub fn get_vertex(&self, v: Index) -> &[f64] {
        self.vertices.get_row(v as usize)
    }

    /// Vertex at local corner `lv` of facet `f`.
    pub fn get_facet_vertex(&self, f: Index, lv: usize) -> Index {
        assert!(lv < self.vertex_per_facet, "local corner out of bounds");
        self.corner_to_vertex
            .get(f as usize * self.vertex_per_facet + lv)
    }

    /// Replace the vertex buffer (move-adopt). Derived structures are not
    /// invalidated; re-initialize them after geometry changes.
    pub fn import_vertices(&mut self, vertices: Vec<f64>) -> Result<()> {
        if vertices.len() % self.dim != 0 {
            return Err(AttribError::Shape(format!(
                "vertex buffer of {} entries is not a multiple of dimension {}",
                vertices.len(),
                self.dim
            )));
        }
        self.vertices = Attribute::from_vec(
            AttributeElement::Vertex,
            AttributeUsage::Vector,
            self.dim,
            vertices,
        )?;
        Ok(())
    }

    /// Replace the facet buffer (move-adopt). Entries must be valid vertex
    /// indices or `INVALID_INDEX`.
    pub fn import_facets(&mut self, facets: Vec<Index>) -> Result<()> {
        if facets.len() % self.vertex_per_facet != 0 {
            return Err(AttribError::Shape(format!(
                "facet buffer of {} entries is not a multiple of width {}",
                facets.len(),
                self.vertex_per_facet
            )));
        }
        let num_vertices = self.num_vertices() as Index;
        if let Some(&bad) = facets
            .iter()
            .find(|&&v| v != INVALID_INDEX && v >= num_vertices)
        {
            return Err(AttribError::Shape(format!(
                "facet references vertex {bad} but the mesh has {num_vertices} vertices"
            )));
        }
        self.corner_to_vertex = Attribute::from_vec(
            AttributeElement::Corner,
            AttributeUsage::VertexIndex,
            1,
            facets,
        )?;
        Ok(())
    }

    /// Move the vertex buffer out, leaving the mesh with no vertices.
    pub fn export_vertices(&mut self) -> Vec<f64> {
        let taken = self.vertices.take();
        taken.get_all().to_vec()
    }

    /// Move the facet buffer out, leaving the mesh with no facets.
    pub fn export_facets(&mut self) -> Vec<Index> {
        let taken = self.corner_to_vertex.take();
        taken.get_all().to_vec()
    }

    // ---------------------------------------------------------------------
    // Attribute containers
    // ---------------------------------------------------------------------

    pub fn vertex_attributes(&self) -> &AttributeContainer {
        &self.vertex_attributes
    }

    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeContainer {
        &mut self.vertex_attributes
    }

    pub fn facet_attributes(&self) -> &AttributeContainer {
        &self.facet_attributes
    }

    pub fn facet_attributes_mut(&mut self) -> &mut AttributeContainer {
        &mut self.facet_attributes
    }

    pub fn corner_attributes(&self) -> &AttributeContainer {
        &self.corner_attributes
    }

    pub fn corner_attributes_mut(&mut self) -> &mut AttributeContainer {
        &mut self.corner_attributes
    }

    /// Edge attribute container. Requires edge data.
    pub fn edge_attributes(&self) -> Result<&AttributeContainer> {
        self.check_edge_data()?;
        Ok(&self.edge_attributes)
    }

    pub fn edge_attributes_mut(&mut self) -> Result<&mut AttributeContainer> {
        self.check_edge_data()?;
        Ok(&mut self.edge_attributes)
    }

    pub fn indexed_attributes(&self) -> &IndexedAttributeContainer {
        &self.indexed_attributes
    }

    pub fn indexed_attributes_mut(&mut self) -> &mut IndexedAttributeContainer {
        &mut self.indexed_attributes
    }

    /// Create a per-vertex attribute sized to the current vertex count.
    pub fn add_vertex_attribute<T: Scalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<&mut Attribute<T>> {
        let n = self.num_vertices();
        let attr = self.vertex_attributes.add::<T>(
            name,
            AttributeElement::Vertex,
            usage,
            num_channels,
        )?;
        attr.resize_elements(n)?;
        Ok(attr)
    }

    /// Create a per-facet attribute sized to the current facet count.
    pub fn add_facet_attribute<T: Scalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<&mut Attribute<T>> {
        let n = self.num_facets();
        let attr =
            self.facet_attributes
                .add::<T>(name, AttributeElement::Facet, usage, num_channels)?;
        attr.resize_elements(n)?;
        Ok(attr)
    }

    /// Create a per-corner attribute sized to the current corner count.
    pub fn add_corner_attribute<T: Scalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<&mut Attribute<T>> {
        let n = self.num_corners();
        let attr = self.corner_attributes.add::<T>(
            name,
            AttributeElement::Corner,
            usage,
            num_channels,
        )?;
        attr.resize_elements(n)?;
        Ok(attr)
    }

    /// Create a per-edge attribute sized to the current edge count.
    /// Requires edge data.
    pub fn add_edge_attribute<T: Scalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<&mut Attribute<T>> {
        self.check_edge_data()?;
        let n = self.nav().get_num_edges() as usize;
        let attr =
            self.edge_attributes
                .add::<T>(name, AttributeElement::Edge, usage, num_channels)?;
        attr.resize_elements(n)?;
        Ok(attr)
    }

    pub fn has_vertex_attribute(&self, name: &str) -> bool {
        self.vertex_attributes.has(name)
    }

    pub fn has_facet_attribute(&self, name: &str) -> bool {
        self.facet_attributes.has(name)
    }

    pub fn has_corner_attribute(&self, name: &str) -> bool {
        self.corner_attributes.has(name)
    }

    pub fn has_edge_attribute(&self, name: &str) -> Result<bool> {
        self.check_edge_data()?;
        Ok(self.edge_attributes.has(name))
    }

    pub fn get_vertex_attribute<T: Scalar>(&self, name: &str) -> Result<&Attribute<T>> {
        self.vertex_attributes.get_as::<T>(name)
    }

    pub fn get_vertex_attribute_mut<T: Scalar>(&mut self, name: &str) -> Result<&mut Attribute<T>> {
        self.vertex_attributes.get_as_mut::<T>(name)
    }

    pub fn get_facet_attribute<T: Scalar>(&self, name: &str) -> Result<&Attribute<T>> {
        self.facet_attributes.get_as::<T>(name)
    }

    pub fn get_facet_attribute_mut<T: Scalar>(&mut self, name: &str) -> Result<&mut Attribute<T>> {
        self.facet_attributes.get_as_mut::<T>(name)
    }

    pub fn get_corner_attribute<T: Scalar>(&self, name: &str) -> Result<&Attribute<T>> {
        self.corner_attributes.get_as::<T>(name)
    }

    pub fn get_corner_attribute_mut<T: Scalar>(&mut self, name: &str) -> Result<&mut Attribute<T>> {
        self.corner_attributes.get_as_mut::<T>(name)
    }

    pub fn get_edge_attribute<T: Scalar>(&self, name: &str) -> Result<&Attribute<T>> {
        self.check_edge_data()?;
        self.edge_attributes.get_as::<T>(name)
    }

    pub fn get_edge_attribute_mut<T: Scalar>(&mut self, name: &str) -> Result<&mut Attribute<T>> {
        self.check_edge_data()?;
        self.edge_attributes.get_as_mut::<T>(name)
    }

    pub fn remove_vertex_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.vertex_attributes.remove(name)
    }

    pub fn remove_facet_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.facet_attributes.remove(name)
    }

    pub fn remove_corner_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.corner_attributes.remove(name)
    }

    pub fn remove_edge_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.check_edge_data()?;
        self.edge_attributes.remove(name)
    }

    /// Move-adopt a prepared attribute as a per-vertex channel.
    pub fn import_vertex_attribute(&mut self, name: &str, attr: ErasedAttribute) -> Result<()> {
        self.vertex_attributes.import_data(name, attr)
    }

    pub fn import_facet_attribute(&mut self, name: &str, attr: ErasedAttribute) -> Result<()> {
        self.facet_attributes.import_data(name, attr)
    }

    pub fn import_corner_attribute(&mut self, name: &str, attr: ErasedAttribute) -> Result<()> {
        self.corner_attributes.import_data(name, attr)
    }

    pub fn import_edge_attribute(&mut self, name: &str, attr: ErasedAttribute) -> Result<()> {
        self.check_edge_data()?;
        self.edge_attributes.import_data(name, attr)
    }

    /// Move a per-vertex attribute's content out, resetting the entry.
    pub fn export_vertex_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.vertex_attributes.export_data(name)
    }

    pub fn export_facet_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.facet_attributes.export_data(name)
    }

    pub fn export_corner_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.corner_attributes.export_data(name)
    }

    pub fn export_edge_attribute(&mut self, name: &str) -> Result<ErasedAttribute> {
        self.check_edge_data()?;
        self.edge_attributes.export_data(name)
    }

    pub fn get_vertex_attribute_names(&self) -> Vec<&str> {
        self.vertex_attributes.get_names()
    }

    pub fn get_facet_attribute_names(&self) -> Vec<&str> {
        self.facet_attributes.get_names()
    }

    pub fn get_corner_attribute_names(&self) -> Vec<&str> {
        self.corner_attributes.get_names()
    }

    pub fn get_edge_attribute_names(&self) -> Result<Vec<&str>> {
        self.check_edge_data()?;
        Ok(self.edge_attributes.get_names())
    }

    /// Create an empty indexed attribute.
    pub fn add_indexed_attribute<V: Scalar, I: crate::attribute::IndexScalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<()> {
        self.indexed_attributes.add::<V, I>(name, usage, num_channels)
    }

    pub fn has_indexed_attribute(&self, name: &str) -> bool {
        self.indexed_attributes.has(name)
    }

    pub fn get_indexed_attribute(&self, name: &str) -> Option<&ErasedIndexedAttribute> {
        self.indexed_attributes.get(name)
    }

    /// Move-adopt a prepared indexed attribute (zero copy).
    pub fn import_indexed_attribute(
        &mut self,
        name: &str,
        attr: ErasedIndexedAttribute,
    ) -> Result<()> {
        self.indexed_attributes.import_data(name, attr)
    }

    /// Move an indexed attribute's content out, resetting the entry.
    pub fn export_indexed_attribute(&mut self, name: &str) -> Result<ErasedIndexedAttribute> {
        self.indexed_attributes.export_data(name)
    }

    pub fn remove_indexed_attribute(&mut self, name: &str) -> Result<ErasedIndexedAttribute> {
        self.indexed_attributes.remove(name)
    }

    pub fn get_indexed_attribute_names(&self) -> Vec<&str> {
        self.indexed_attributes.get_names()
    }

    // ---------------------------------------------------------------------
    // Connectivity
    // ---------------------------------------------------------------------

    /// Build vertex/facet adjacency lists.
    pub fn initialize_connectivity(&mut self) {
        self.connectivity = Some(Connectivity::build(
            self.num_vertices(),
            self.vertex_per_facet,
            self.get_facets(),
        ));
    }

    pub fn is_connectivity_initialized(&self) -> bool {
        self.connectivity.is_some()
    }

    fn conn(&self) -> &Connectivity {
        self.connectivity
            .as_ref()
            .expect("mesh connectivity not initialized")
    }

    /// Vertices sharing an edge with `v`. Panics if connectivity is not
    /// initialized.
    pub fn get_vertices_adjacent_to_vertex(&self, v: Index) -> &[Index] {
        self.conn().vertices_adjacent_to_vertex(v)
    }

    /// Facets incident to `v`. Panics if connectivity is not initialized.
    pub fn get_facets_adjacent_to_vertex(&self, v: Index) -> &[Index] {
        self.conn().facets_adjacent_to_vertex(v)
    }

    /// Facets sharing an edge with `f`. Panics if connectivity is not
    /// initialized.
    pub fn get_facets_adjacent_to_facet(&self, f: Index) -> &[Index] {
        self.conn().facets_adjacent_to_facet(f)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Label edge-connected facet components, building connectivity first
    /// if needed.
    pub fn initialize_components(&mut self) {
        if !self.is_connectivity_initialized() {
            self.initialize_connectivity();
        }
        self.components = Some(Components::build(self.conn()));
    }

    pub fn is_components_initialized(&self) -> bool {
        self.components.is_some()
    }

    fn comps(&self) -> &Components {
        self.components
            .as_ref()
            .expect("mesh components not initialized")
    }

    /// Number of components. Panics if components are not initialized.
    pub fn get_num_components(&self) -> usize {
        self.comps().num_components()
    }

    /// Facet lists per component. Panics if components are not initialized.
    pub fn get_components(&self) -> &[Vec<Index>] {
        self.comps().components()
    }

    /// Component id per facet. Panics if components are not initialized.
    pub fn get_per_facet_component_ids(&self) -> &[Index] {
        self.comps().per_facet_component_ids()
    }

    // ---------------------------------------------------------------------
    // Topology
    // ---------------------------------------------------------------------

    /// Classify manifoldness, building edge data first if needed.
    pub fn initialize_topology(&mut self) -> Result<()> {
        if !self.is_edge_data_initialized() {
            self.initialize_edge_data()?;
        }
        self.topology = Some(MeshTopology::build(self.nav(), self.num_vertices()));
        Ok(())
    }

    pub fn is_topology_initialized(&self) -> bool {
        self.topology.is_some()
    }

    fn topo(&self) -> &MeshTopology {
        self.topology
            .as_ref()
            .expect("mesh topology not initialized")
    }

    /// Whether every edge has at most two incident facets. Panics if
    /// topology is not initialized.
    pub fn is_edge_manifold(&self) -> bool {
        self.topo().is_edge_manifold()
    }

    /// Whether every vertex star is a single fan. Panics if topology is not
    /// initialized.
    pub fn is_vertex_manifold(&self) -> bool {
        self.topo().is_vertex_manifold()
    }

    // ---------------------------------------------------------------------
    // Edge data (navigation)
    // ---------------------------------------------------------------------

    /// Build the navigation structure (corner/edge incidence). Fails if any
    /// facet entry is `INVALID_INDEX`.
    pub fn initialize_edge_data(&mut self) -> Result<()> {
        self.navigation = Some(MeshNavigation::build(
            self.num_vertices(),
            self.vertex_per_facet,
            self.get_facets(),
        )?);
        Ok(())
    }

    pub fn is_edge_data_initialized(&self) -> bool {
        self.navigation.is_some()
    }

    fn check_edge_data(&self) -> Result<()> {
        if self.navigation.is_none() {
            return Err(AttribError::Uninitialized(
                "mesh edge data not initialized".into(),
            ));
        }
        Ok(())
    }

    fn nav(&self) -> &MeshNavigation {
        self.navigation
            .as_ref()
            .expect("mesh edge data not initialized")
    }

    /// Number of unique edges. Panics if edge data is not initialized (as
    /// do all navigation queries below).
    pub fn get_num_edges(&self) -> Index {
        self.nav().get_num_edges()
    }

    /// Edge between local corners `lv` and `lv + 1` of facet `f`.
    pub fn get_edge(&self, f: Index, lv: usize) -> Index {
        self.nav().get_edge(f, lv)
    }

    /// Edge associated to a corner.
    pub fn get_edge_from_corner(&self, c: Index) -> Index {
        self.nav().get_edge_from_corner(c)
    }

    /// Endpoint vertices of an edge.
    pub fn get_edge_vertices(&self, e: Index) -> [Index; 2] {
        self.nav().get_edge_vertices(self.get_facets(), e)
    }

    /// Vertex opposite an edge on one incident facet (triangles only).
    pub fn get_vertex_opposite_edge(&self, e: Index) -> Index {
        self.nav().get_vertex_opposite_edge(self.get_facets(), e)
    }

    pub fn get_first_corner_around_edge(&self, e: Index) -> Index {
        self.nav().get_first_corner_around_edge(e)
    }

    pub fn get_next_corner_around_edge(&self, c: Index) -> Index {
        self.nav().get_next_corner_around_edge(c)
    }

    pub fn get_first_corner_around_vertex(&self, v: Index) -> Index {
        self.nav().get_first_corner_around_vertex(v)
    }

    pub fn get_next_corner_around_vertex(&self, c: Index) -> Index {
        self.nav().get_next_corner_around_vertex(c)
    }

    pub fn get_one_facet_around_edge(&self, e: Index) -> Index {
        self.nav().get_one_facet_around_edge(e)
    }

    pub fn get_one_corner_around_edge(&self, e: Index) -> Index {
        self.nav().get_one_corner_around_edge(e)
    }

    pub fn get_one_corner_around_vertex(&self, v: Index) -> Index {
        self.nav().get_one_corner_around_vertex(v)
    }

    pub fn get_num_facets_around_vertex(&self, v: Index) -> Index {
        self.nav().get_num_facets_around_vertex(v)
    }

    pub fn get_num_facets_around_edge(&self, e: Index) -> Index {
        self.nav().get_num_facets_around_edge(e)
    }

    pub fn is_boundary_edge(&self, e: Index) -> bool {
        self.nav().is_boundary_edge(e)
    }

    pub fn is_boundary_vertex(&self, v: Index) -> bool {
        self.nav().is_boundary_vertex(v)
    }

    pub fn foreach_facets_around_vertex(&self, v: Index, func: impl FnMut(Index)) {
        self.nav().foreach_facets_around_vertex(v, func)
    }

    pub fn foreach_facets_around_edge(&self, e: Index, func: impl FnMut(Index)) {
        self.nav().foreach_facets_around_edge(e, func)
    }

    pub fn foreach_corners_around_vertex(&self, v: Index, func: impl FnMut(Index)) {
        self.nav().foreach_corners_around_vertex(v, func)
    }

    pub fn foreach_corners_around_edge(&self, e: Index, func: impl FnMut(Index)) {
        self.nav().foreach_corners_around_edge(e, func)
    }

    // ---------------------------------------------------------------------
    // UV coordinates (reserved indexed attribute)
    // ---------------------------------------------------------------------

    pub fn is_uv_initialized(&self) -> bool {
        self.indexed_attributes.has(ReservedName::Uv.as_str())
    }

    /// Set the UV channel from flat buffers (copies).
    pub fn initialize_uv(&mut self, uv: &[f64], uv_indices: &[Index]) -> Result<()> {
        self.indexed_attributes.set::<f64, Index>(
            ReservedName::Uv.as_str(),
            AttributeUsage::UV,
            2,
            uv,
            uv_indices,
        )
    }

    /// Set the UV channel adopting the given buffers (zero copy).
    pub fn import_uv(&mut self, uv: Vec<f64>, uv_indices: Vec<Index>) -> Result<()> {
        let values = Attribute::from_vec(AttributeElement::Value, AttributeUsage::UV, 2, uv)?;
        let indices = Attribute::from_vec(
            AttributeElement::Indexed,
            AttributeUsage::Scalar,
            1,
            uv_indices,
        )?;
        let attr = ErasedIndexedAttribute::from_parts(values.into(), indices.into())?;
        self.indexed_attributes
            .import_data(ReservedName::Uv.as_str(), attr)
    }

    /// UV value table.
    pub fn get_uv(&self) -> Result<&Attribute<f64>> {
        self.uv_attr()?.values().downcast_ref::<f64>()
    }

    /// Per-corner indices into the UV value table.
    pub fn get_uv_indices(&self) -> Result<&Attribute<Index>> {
        self.uv_attr()?.indices().downcast_ref::<Index>()
    }

    /// Remove the UV channel.
    pub fn clear_uv(&mut self) -> Result<()> {
        self.indexed_attributes
            .remove(ReservedName::Uv.as_str())
            .map(|_| ())
    }

    fn uv_attr(&self) -> Result<&ErasedIndexedAttribute> {
        self.indexed_attributes
            .get(ReservedName::Uv.as_str())
            .ok_or_else(|| AttribError::Lookup("uv coordinates not initialized".into()))
    }
}
