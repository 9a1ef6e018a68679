//! Named collections of type-erased attributes.
//!
//! Each mesh element kind owns one [`AttributeContainer`]; indexed
//! attributes live in an [`IndexedAttributeContainer`]. Entries keep their
//! insertion order. A small closed set of semantic names ("uv", "normal",
//! ...) is reserved for the mesh aggregate's convenience wrappers; creating
//! one of them requires an explicit [`CreatePolicy::Force`].

use crate::attribute::{
    Attribute, AttributeElement, AttributeUsage, CreatePolicy, ErasedAttribute,
    ErasedIndexedAttribute, IndexScalar, IndexedAttribute,
};
use crate::error::{AttribError, Result};
use crate::scalar::Scalar;

/// Reserved semantic attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedName {
    Uv,
    Normal,
    Tangent,
    Bitangent,
}

impl ReservedName {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservedName::Uv => "uv",
            ReservedName::Normal => "normal",
            ReservedName::Tangent => "tangent",
            ReservedName::Bitangent => "bitangent",
        }
    }

    /// Look up whether `name` is reserved.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "uv" => Some(ReservedName::Uv),
            "normal" => Some(ReservedName::Normal),
            "tangent" => Some(ReservedName::Tangent),
            "bitangent" => Some(ReservedName::Bitangent),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_name(name: &str, policy: CreatePolicy) -> Result<()> {
    if policy == CreatePolicy::ErrorIfReserved && ReservedName::lookup(name).is_some() {
        return Err(AttribError::Construction(format!(
            "attribute name \"{name}\" is reserved"
        )));
    }
    Ok(())
}

/// Insertion-ordered mapping from attribute name to a type-erased handle.
#[derive(Debug, Clone, Default)]
pub struct AttributeContainer {
    entries: Vec<(String, ErasedAttribute)>,
}

impl AttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute names in insertion order.
    pub fn get_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Create an empty attribute under `name`. Fails if the name is taken
    /// or reserved.
    pub fn add<T: Scalar>(
        &mut self,
        name: &str,
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<&mut Attribute<T>> {
        self.add_with_policy(
            name,
            element,
            usage,
            num_channels,
            CreatePolicy::ErrorIfReserved,
        )
    }

    /// Create an empty attribute under `name` with an explicit
    /// reserved-name policy.
    pub fn add_with_policy<T: Scalar>(
        &mut self,
        name: &str,
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
        policy: CreatePolicy,
    ) -> Result<&mut Attribute<T>> {
        check_name(name, policy)?;
        if self.has(name) {
            return Err(AttribError::Lookup(format!(
                "attribute \"{name}\" already exists"
            )));
        }
        let attr = Attribute::<T>::new(element, usage, num_channels)?;
        self.entries.push((name.to_string(), attr.into()));
        let erased = &mut self.entries.last_mut().expect("just pushed").1;
        erased.downcast_mut::<T>()
    }

    /// Remove and return the attribute under `name`.
    pub fn remove(&mut self, name: &str) -> Result<ErasedAttribute> {
        let idx = self.index_or_err(name)?;
        Ok(self.entries.remove(idx).1)
    }

    /// Change the key of an attribute without touching its storage.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if self.has(new) {
            return Err(AttribError::Lookup(format!(
                "attribute \"{new}\" already exists"
            )));
        }
        let idx = self.index_or_err(old)?;
        self.entries[idx].0 = new.to_string();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ErasedAttribute> {
        self.index_of(name).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ErasedAttribute> {
        self.index_of(name).map(|idx| &mut self.entries[idx].1)
    }

    /// Typed lookup; fails if the name is missing or the stored value type
    /// differs.
    pub fn get_as<T: Scalar>(&self, name: &str) -> Result<&Attribute<T>> {
        self.get(name)
            .ok_or_else(|| missing(name))?
            .downcast_ref::<T>()
    }

    /// Typed mutable lookup.
    pub fn get_as_mut<T: Scalar>(&mut self, name: &str) -> Result<&mut Attribute<T>> {
        self.get_mut(name)
            .ok_or_else(|| missing(name))?
            .downcast_mut::<T>()
    }

    /// Replace the content of `name` with a fresh internal attribute filled
    /// from `values`, creating the entry if needed. The entry keeps its
    /// position.
    pub fn set<T: Scalar>(
        &mut self,
        name: &str,
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
        values: &[T],
    ) -> Result<()> {
        let mut attr = Attribute::<T>::new(element, usage, num_channels)?;
        attr.insert_elements(values)?;
        self.import_data(name, attr.into())
    }

    /// Move-adopt an externally prepared attribute under `name` (zero
    /// copy), replacing the stored handle if the entry exists.
    pub fn import_data(&mut self, name: &str, attribute: ErasedAttribute) -> Result<()> {
        match self.index_of(name) {
            Some(idx) => self.entries[idx].1 = attribute,
            None => self.entries.push((name.to_string(), attribute)),
        }
        Ok(())
    }

    /// Move the content of `name` out, leaving the entry as a valid empty
    /// attribute of the same type and shape.
    pub fn export_data(&mut self, name: &str) -> Result<ErasedAttribute> {
        let idx = self.index_or_err(name)?;
        Ok(self.entries[idx].1.take())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErasedAttribute)> {
        self.entries
            .iter()
            .map(|(name, attr)| (name.as_str(), attr))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    fn index_or_err(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| missing(name))
    }
}

fn missing(name: &str) -> AttribError {
    AttribError::Lookup(format!("attribute \"{name}\" does not exist"))
}

/// Insertion-ordered mapping from name to a type-erased indexed attribute.
#[derive(Debug, Clone, Default)]
pub struct IndexedAttributeContainer {
    entries: Vec<(String, ErasedIndexedAttribute)>,
}

impl IndexedAttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Create an empty indexed attribute under `name`.
    pub fn add<V: Scalar, I: IndexScalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<()> {
        self.add_with_policy::<V, I>(name, usage, num_channels, CreatePolicy::ErrorIfReserved)
    }

    /// Create an empty indexed attribute with an explicit reserved-name
    /// policy.
    pub fn add_with_policy<V: Scalar, I: IndexScalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
        policy: CreatePolicy,
    ) -> Result<()> {
        check_name(name, policy)?;
        if self.has(name) {
            return Err(AttribError::Lookup(format!(
                "indexed attribute \"{name}\" already exists"
            )));
        }
        let attr = IndexedAttribute::<V, I>::new(usage, num_channels)?;
        self.entries
            .push((name.to_string(), ErasedIndexedAttribute::from_typed(attr)));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<ErasedIndexedAttribute> {
        let idx = self.index_or_err(name)?;
        Ok(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&ErasedIndexedAttribute> {
        self.index_of(name).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ErasedIndexedAttribute> {
        self.index_of(name).map(|idx| &mut self.entries[idx].1)
    }

    /// Replace the values and indices of `name`, creating the entry if
    /// needed.
    pub fn set<V: Scalar, I: IndexScalar>(
        &mut self,
        name: &str,
        usage: AttributeUsage,
        num_channels: usize,
        values: &[V],
        indices: &[I],
    ) -> Result<()> {
        let attr = IndexedAttribute::<V, I>::from_data(usage, num_channels, values, indices)?;
        self.import_data(name, ErasedIndexedAttribute::from_typed(attr))
    }

    /// Move-adopt an externally prepared indexed attribute (zero copy).
    pub fn import_data(&mut self, name: &str, attribute: ErasedIndexedAttribute) -> Result<()> {
        match self.index_of(name) {
            Some(idx) => self.entries[idx].1 = attribute,
            None => self.entries.push((name.to_string(), attribute)),
        }
        Ok(())
    }

    /// Move the content of `name` out, resetting the entry to empty.
    pub fn export_data(&mut self, name: &str) -> Result<ErasedIndexedAttribute> {
        let idx = self.index_or_err(name)?;
        Ok(self.entries[idx].1.take())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErasedIndexedAttribute)> {
        self.entries
            .iter()
            .map(|(name, attr)| (name.as_str(), attr))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    fn index_or_err(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| AttribError::Lookup(format!("indexed attribute \"{name}\" does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_with(names: &[&str]) -> AttributeContainer {
        let mut container = AttributeContainer::new();
        for name in names {
            container
                .add::<f32>(name, AttributeElement::Vertex, AttributeUsage::Vector, 3)
                .unwrap();
        }
        container
    }

    #[test]
    fn names_keep_insertion_order() {
        let container = container_with(&["c", "a", "b"]);
        assert_eq!(container.get_names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut container = container_with(&["pos"]);
        let err = container
            .add::<f32>("pos", AttributeElement::Vertex, AttributeUsage::Vector, 3)
            .unwrap_err();
        assert!(matches!(err, AttribError::Lookup(_)));
    }

    #[test]
    fn reserved_names_require_force() {
        let mut container = AttributeContainer::new();
        let err = container
            .add::<f32>("uv", AttributeElement::Corner, AttributeUsage::UV, 2)
            .unwrap_err();
        assert!(matches!(err, AttribError::Construction(_)));

        container
            .add_with_policy::<f32>(
                "uv",
                AttributeElement::Corner,
                AttributeUsage::UV,
                2,
                CreatePolicy::Force,
            )
            .unwrap();
        assert!(container.has("uv"));
    }

    #[test]
    fn typed_lookup_checks_value_type() {
        let container = container_with(&["pos"]);
        assert!(container.get_as::<f32>("pos").is_ok());
        assert!(container.get_as::<f64>("pos").is_err());
        assert!(container.get_as::<f32>("missing").is_err());
    }

    #[test]
    fn remove_preserves_order_of_remaining() {
        let mut container = container_with(&["a", "b", "c"]);
        container.remove("b").unwrap();
        assert_eq!(container.get_names(), vec!["a", "c"]);
        assert!(container.remove("b").is_err());
    }

    #[test]
    fn rename_changes_key_without_touching_storage() {
        let mut container = container_with(&["old"]);
        container
            .get_as_mut::<f32>("old")
            .unwrap()
            .insert_elements(&[1.0, 2.0, 3.0])
            .unwrap();
        let ptr = container.get_as::<f32>("old").unwrap().data_ptr();

        container.rename("old", "new").unwrap();
        assert!(!container.has("old"));
        assert_eq!(container.get_as::<f32>("new").unwrap().data_ptr(), ptr);
    }

    #[test]
    fn import_export_moves_ownership() {
        let mut container = AttributeContainer::new();
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.insert_elements(&[1.0, 2.0, 3.0]).unwrap();
        let ptr = attr.data_ptr();

        container.import_data("pos", attr.into()).unwrap();
        assert_eq!(container.get_as::<f32>("pos").unwrap().data_ptr(), ptr);

        let exported = container.export_data("pos").unwrap();
        assert_eq!(exported.downcast_ref::<f32>().unwrap().data_ptr(), ptr);
        // The entry remains, reset to empty
        assert!(container.has("pos"));
        assert_eq!(container.get("pos").unwrap().num_elements(), 0);
    }

    #[test]
    fn set_replaces_content_in_place() {
        let mut container = container_with(&["a", "b"]);
        container
            .set::<f32>(
                "a",
                AttributeElement::Vertex,
                AttributeUsage::Vector,
                3,
                &[9.0, 8.0, 7.0],
            )
            .unwrap();
        assert_eq!(container.get_names(), vec!["a", "b"]);
        assert_eq!(
            container.get_as::<f32>("a").unwrap().get_all(),
            &[9.0, 8.0, 7.0]
        );

        // Creates when missing
        container
            .set::<u8>(
                "flags",
                AttributeElement::Vertex,
                AttributeUsage::Scalar,
                1,
                &[1, 0, 1],
            )
            .unwrap();
        assert_eq!(container.get_names(), vec!["a", "b", "flags"]);
    }

    #[test]
    fn indexed_container_round_trip() {
        let mut container = IndexedAttributeContainer::new();
        container
            .set::<f64, u32>(
                "colors",
                AttributeUsage::Color,
                3,
                &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                &[0, 1, 1, 0],
            )
            .unwrap();
        assert_eq!(container.get_names(), vec!["colors"]);

        let attr = container.get("colors").unwrap();
        let (values, indices) = attr.downcast_ref::<f64, u32>().unwrap();
        assert_eq!(values.num_elements(), 2);
        assert_eq!(indices.get_all(), &[0, 1, 1, 0]);

        let exported = container.export_data("colors").unwrap();
        assert_eq!(exported.values().num_elements(), 2);
        assert!(container.get("colors").unwrap().values().is_empty());
    }
}
