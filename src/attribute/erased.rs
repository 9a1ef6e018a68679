//! Type-erased attribute handles.
//!
//! The value-type set is closed (the ten [`ScalarTag`] types), so erasure is
//! a tagged union rather than open runtime type information: each variant
//! holds a concrete [`Attribute<T>`], and downcasting checks the tag before
//! handing out the typed buffer, failing loudly on a mismatch.

use crate::error::{AttribError, Result};
use crate::scalar::{Scalar, ScalarTag};

use super::buffer::Attribute;
use super::indexed::{IndexScalar, IndexedAttribute};
use super::policies::{AttributeElement, AttributeUsage};

/// A type-erased attribute handle.
#[derive(Debug, Clone)]
pub enum ErasedAttribute {
    Int8(Attribute<i8>),
    Int16(Attribute<i16>),
    Int32(Attribute<i32>),
    Int64(Attribute<i64>),
    UInt8(Attribute<u8>),
    UInt16(Attribute<u16>),
    UInt32(Attribute<u32>),
    UInt64(Attribute<u64>),
    Float32(Attribute<f32>),
    Float64(Attribute<f64>),
}

macro_rules! dispatch {
    ($self:expr, $attr:ident => $body:expr) => {
        match $self {
            ErasedAttribute::Int8($attr) => $body,
            ErasedAttribute::Int16($attr) => $body,
            ErasedAttribute::Int32($attr) => $body,
            ErasedAttribute::Int64($attr) => $body,
            ErasedAttribute::UInt8($attr) => $body,
            ErasedAttribute::UInt16($attr) => $body,
            ErasedAttribute::UInt32($attr) => $body,
            ErasedAttribute::UInt64($attr) => $body,
            ErasedAttribute::Float32($attr) => $body,
            ErasedAttribute::Float64($attr) => $body,
        }
    };
}

impl ErasedAttribute {
    /// Create an empty attribute of the given runtime scalar type.
    pub fn new(
        tag: ScalarTag,
        element: AttributeElement,
        usage: AttributeUsage,
        num_channels: usize,
    ) -> Result<Self> {
        Ok(match tag {
            ScalarTag::Int8 => Attribute::<i8>::new(element, usage, num_channels)?.into(),
            ScalarTag::Int16 => Attribute::<i16>::new(element, usage, num_channels)?.into(),
            ScalarTag::Int32 => Attribute::<i32>::new(element, usage, num_channels)?.into(),
            ScalarTag::Int64 => Attribute::<i64>::new(element, usage, num_channels)?.into(),
            ScalarTag::UInt8 => Attribute::<u8>::new(element, usage, num_channels)?.into(),
            ScalarTag::UInt16 => Attribute::<u16>::new(element, usage, num_channels)?.into(),
            ScalarTag::UInt32 => Attribute::<u32>::new(element, usage, num_channels)?.into(),
            ScalarTag::UInt64 => Attribute::<u64>::new(element, usage, num_channels)?.into(),
            ScalarTag::Float32 => Attribute::<f32>::new(element, usage, num_channels)?.into(),
            ScalarTag::Float64 => Attribute::<f64>::new(element, usage, num_channels)?.into(),
        })
    }

    /// Runtime tag of the stored value type.
    pub fn scalar_tag(&self) -> ScalarTag {
        match self {
            ErasedAttribute::Int8(_) => ScalarTag::Int8,
            ErasedAttribute::Int16(_) => ScalarTag::Int16,
            ErasedAttribute::Int32(_) => ScalarTag::Int32,
            ErasedAttribute::Int64(_) => ScalarTag::Int64,
            ErasedAttribute::UInt8(_) => ScalarTag::UInt8,
            ErasedAttribute::UInt16(_) => ScalarTag::UInt16,
            ErasedAttribute::UInt32(_) => ScalarTag::UInt32,
            ErasedAttribute::UInt64(_) => ScalarTag::UInt64,
            ErasedAttribute::Float32(_) => ScalarTag::Float32,
            ErasedAttribute::Float64(_) => ScalarTag::Float64,
        }
    }

    pub fn element(&self) -> AttributeElement {
        dispatch!(self, attr => attr.element())
    }

    pub fn usage(&self) -> AttributeUsage {
        dispatch!(self, attr => attr.usage())
    }

    pub fn num_channels(&self) -> usize {
        dispatch!(self, attr => attr.num_channels())
    }

    pub fn num_elements(&self) -> usize {
        dispatch!(self, attr => attr.num_elements())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, attr => attr.is_empty())
    }

    pub fn is_external(&self) -> bool {
        dispatch!(self, attr => attr.is_external())
    }

    pub fn is_read_only(&self) -> bool {
        dispatch!(self, attr => attr.is_read_only())
    }

    /// Erased resize; see [`Attribute::resize_elements`].
    pub fn resize_elements(&mut self, num_elements: usize) -> Result<()> {
        dispatch!(self, attr => attr.resize_elements(num_elements))
    }

    /// Erased clear; see [`Attribute::clear`].
    pub fn clear(&mut self) -> Result<()> {
        dispatch!(self, attr => attr.clear())
    }

    /// Erased internal-copy conversion; see
    /// [`Attribute::create_internal_copy`].
    pub fn create_internal_copy(&mut self) -> Result<()> {
        dispatch!(self, attr => attr.create_internal_copy())
    }

    /// Move the contents out, leaving a valid empty handle of the same
    /// type and shape.
    pub fn take(&mut self) -> Self {
        dispatch!(self, attr => attr.take().into())
    }

    /// Downcast to the typed attribute, checking the stored tag.
    pub fn downcast_ref<T: Scalar>(&self) -> Result<&Attribute<T>> {
        T::attribute_ref(self).ok_or_else(|| self.downcast_error(T::TAG))
    }

    /// Mutable downcast to the typed attribute, checking the stored tag.
    pub fn downcast_mut<T: Scalar>(&mut self) -> Result<&mut Attribute<T>> {
        if T::attribute_ref(self).is_none() {
            return Err(self.downcast_error(T::TAG));
        }
        Ok(T::attribute_mut(self).expect("tag was just checked"))
    }

    /// Consume the handle and return the typed attribute.
    pub fn into_typed<T: Scalar>(mut self) -> Result<Attribute<T>> {
        let tag = self.scalar_tag();
        match T::attribute_mut(&mut self) {
            Some(attr) => Ok(attr.take()),
            None => Err(AttribError::Lookup(format!(
                "attribute downcast to {} but stored value type is {tag}",
                T::TAG
            ))),
        }
    }

    fn downcast_error(&self, requested: ScalarTag) -> AttribError {
        AttribError::Lookup(format!(
            "attribute downcast to {requested} but stored value type is {}",
            self.scalar_tag()
        ))
    }
}

impl<T: Scalar> From<Attribute<T>> for ErasedAttribute {
    fn from(attr: Attribute<T>) -> Self {
        T::erase_attribute(attr)
    }
}

/// A type-erased indexed attribute: an erased value table plus an erased
/// index channel. The index side always holds an integral tag.
#[derive(Debug, Clone)]
pub struct ErasedIndexedAttribute {
    values: ErasedAttribute,
    indices: ErasedAttribute,
}

impl ErasedIndexedAttribute {
    /// Erase a typed indexed attribute.
    pub fn from_typed<V: Scalar, I: IndexScalar>(attr: IndexedAttribute<V, I>) -> Self {
        let mut attr = attr;
        Self {
            values: attr.values_mut().take().into(),
            indices: attr.indices_mut().take().into(),
        }
    }

    /// Usage tag of the value table.
    pub fn usage(&self) -> AttributeUsage {
        self.values.usage()
    }

    /// Channel count of the value table.
    pub fn num_channels(&self) -> usize {
        self.values.num_channels()
    }

    pub fn values(&self) -> &ErasedAttribute {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ErasedAttribute {
        &mut self.values
    }

    pub fn indices(&self) -> &ErasedAttribute {
        &self.indices
    }

    pub fn indices_mut(&mut self) -> &mut ErasedAttribute {
        &mut self.indices
    }

    /// Downcast both sides, checking both tags.
    pub fn downcast_ref<V: Scalar, I: IndexScalar>(
        &self,
    ) -> Result<(&Attribute<V>, &Attribute<I>)> {
        Ok((self.values.downcast_ref()?, self.indices.downcast_ref()?))
    }

    /// Move the contents out, leaving both sides valid and empty.
    pub fn take(&mut self) -> Self {
        Self {
            values: self.values.take(),
            indices: self.indices.take(),
        }
    }

    pub(crate) fn from_parts(values: ErasedAttribute, indices: ErasedAttribute) -> Result<Self> {
        if !indices.scalar_tag().is_integral() {
            return Err(AttribError::Construction(format!(
                "indexed attribute requires an integral index type, got {}",
                indices.scalar_tag()
            )));
        }
        Ok(Self { values, indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_checks_the_tag() {
        let attr =
            Attribute::<f32>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        let erased: ErasedAttribute = attr.into();
        assert_eq!(erased.scalar_tag(), ScalarTag::Float32);
        assert!(erased.downcast_ref::<f32>().is_ok());
        let err = erased.downcast_ref::<f64>().unwrap_err();
        assert!(err.to_string().contains("float64"));
        assert!(err.to_string().contains("float32"));
    }

    #[test]
    fn erased_surface_reports_shape() {
        let mut attr =
            Attribute::<u16>::new(AttributeElement::Facet, AttributeUsage::Color, 4).unwrap();
        attr.resize_elements(6).unwrap();
        let erased: ErasedAttribute = attr.into();
        assert_eq!(erased.element(), AttributeElement::Facet);
        assert_eq!(erased.usage(), AttributeUsage::Color);
        assert_eq!(erased.num_channels(), 4);
        assert_eq!(erased.num_elements(), 6);
        assert!(!erased.is_external());
    }

    #[test]
    fn erased_resize_dispatches() {
        let mut erased = ErasedAttribute::new(
            ScalarTag::Int32,
            AttributeElement::Vertex,
            AttributeUsage::Scalar,
            1,
        )
        .unwrap();
        erased.resize_elements(5).unwrap();
        assert_eq!(erased.num_elements(), 5);
        erased.clear().unwrap();
        assert!(erased.is_empty());
    }

    #[test]
    fn into_typed_moves_the_buffer() {
        let mut attr =
            Attribute::<f64>::new(AttributeElement::Vertex, AttributeUsage::Scalar, 1).unwrap();
        attr.insert_elements(&[1.0, 2.0]).unwrap();
        let erased: ErasedAttribute = attr.into();
        let back = erased.into_typed::<f64>().unwrap();
        assert_eq!(back.get_all(), &[1.0, 2.0]);
    }

    #[test]
    fn indexed_pair_requires_integral_indices() {
        let values: ErasedAttribute =
            Attribute::<f64>::new(AttributeElement::Value, AttributeUsage::UV, 2)
                .unwrap()
                .into();
        let float_indices: ErasedAttribute =
            Attribute::<f32>::new(AttributeElement::Indexed, AttributeUsage::Scalar, 1)
                .unwrap()
                .into();
        assert!(ErasedIndexedAttribute::from_parts(values, float_indices).is_err());
    }

    #[test]
    fn indexed_erasure_round_trips() {
        let typed = IndexedAttribute::<f64, u32>::from_data(
            AttributeUsage::UV,
            2,
            &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            &[0, 1, 2, 0],
        )
        .unwrap();
        let erased = ErasedIndexedAttribute::from_typed(typed);
        assert_eq!(erased.usage(), AttributeUsage::UV);
        assert_eq!(erased.num_channels(), 2);
        let (values, indices) = erased.downcast_ref::<f64, u32>().unwrap();
        assert_eq!(values.num_elements(), 3);
        assert_eq!(indices.get_all(), &[0, 1, 2, 0]);
    }
}
