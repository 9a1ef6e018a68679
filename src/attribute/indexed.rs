//! Indexed (indirect) attributes.
//!
//! An indexed attribute stores per-element data through one level of
//! indirection: an `indices` buffer maps each element to a row of a
//! deduplicated `values` table (e.g. per-corner UV indices into a shared UV
//! list). Index validity is a consumer contract checked at use sites, not on
//! every mutation; the sentinel `I::MAX` marks an invalid index.

use crate::error::Result;
use crate::scalar::Scalar;

use super::buffer::Attribute;
use super::policies::{AttributeElement, AttributeUsage};

/// Marker for integral scalars usable as index buffers.
pub trait IndexScalar: Scalar {}

impl IndexScalar for i8 {}
impl IndexScalar for i16 {}
impl IndexScalar for i32 {}
impl IndexScalar for i64 {}
impl IndexScalar for u8 {}
impl IndexScalar for u16 {}
impl IndexScalar for u32 {}
impl IndexScalar for u64 {}

/// A pair of buffers representing indexed data: a value table plus an index
/// channel into it.
#[derive(Debug, Clone)]
pub struct IndexedAttribute<V: Scalar, I: IndexScalar> {
    values: Attribute<V>,
    indices: Attribute<I>,
}

impl<V: Scalar, I: IndexScalar> IndexedAttribute<V, I> {
    /// Create with both inner buffers empty and internal. The usage and
    /// channel count describe the value table; the index buffer is always a
    /// single channel.
    pub fn new(usage: AttributeUsage, num_channels: usize) -> Result<Self> {
        Ok(Self {
            values: Attribute::new(AttributeElement::Value, usage, num_channels)?,
            indices: Attribute::new(AttributeElement::Indexed, AttributeUsage::Scalar, 1)?,
        })
    }

    /// Create pre-filled from flat value and index slices.
    pub fn from_data(
        usage: AttributeUsage,
        num_channels: usize,
        values: &[V],
        indices: &[I],
    ) -> Result<Self> {
        let mut attr = Self::new(usage, num_channels)?;
        attr.values.insert_elements(values)?;
        attr.indices.insert_elements(indices)?;
        Ok(attr)
    }

    /// Usage tag of the value table.
    pub fn usage(&self) -> AttributeUsage {
        self.values.usage()
    }

    /// Channel count of the value table.
    pub fn num_channels(&self) -> usize {
        self.values.num_channels()
    }

    pub fn values(&self) -> &Attribute<V> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Attribute<V> {
        &mut self.values
    }

    pub fn indices(&self) -> &Attribute<I> {
        &self.indices
    }

    pub fn indices_mut(&mut self) -> &mut Attribute<I> {
        &mut self.indices
    }

    /// Move both buffers out, leaving this attribute with two valid empty
    /// internal buffers of the same shape.
    pub fn take(&mut self) -> Self {
        Self {
            values: self.values.take(),
            indices: self.indices.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_builds_empty_internal_pair() {
        let attr = IndexedAttribute::<f64, u32>::new(AttributeUsage::Vector, 3).unwrap();
        assert_eq!(attr.num_channels(), 3);
        assert_eq!(attr.usage(), AttributeUsage::Vector);
        assert!(attr.values().is_empty());
        assert!(attr.indices().is_empty());
        assert!(!attr.values().is_external());
        assert!(!attr.indices().is_external());
        assert_eq!(attr.indices().num_channels(), 1);
    }

    #[test]
    fn construction_validates_value_shape() {
        assert!(IndexedAttribute::<f64, u32>::new(AttributeUsage::UV, 3).is_err());
        assert!(IndexedAttribute::<f64, u32>::new(AttributeUsage::UV, 2).is_ok());
    }

    #[test]
    fn take_moves_both_buffers_and_resets_source() {
        let mut attr = IndexedAttribute::<f64, u32>::from_data(
            AttributeUsage::Vector,
            3,
            &(0..30).map(f64::from).collect::<Vec<_>>(),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1],
        )
        .unwrap();
        let value_ptr = attr.values().data_ptr();
        let index_ptr = attr.indices().data_ptr();

        let moved = attr.take();
        assert_eq!(moved.values().data_ptr(), value_ptr);
        assert_eq!(moved.indices().data_ptr(), index_ptr);
        assert_eq!(moved.values().num_elements(), 10);
        assert_eq!(moved.indices().num_elements(), 12);

        assert!(attr.values().is_empty());
        assert!(attr.indices().is_empty());
        // Source remains usable with the same shape
        attr.values_mut().insert_elements(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(attr.values().num_elements(), 1);
    }

    #[test]
    fn clone_deep_copies_both_buffers() {
        let attr = IndexedAttribute::<f64, u32>::from_data(
            AttributeUsage::Vector,
            3,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[0, 1, 1, 0],
        )
        .unwrap();
        let copy = attr.clone();
        assert_ne!(copy.values().data_ptr(), attr.values().data_ptr());
        assert_ne!(copy.indices().data_ptr(), attr.indices().data_ptr());
        assert_eq!(copy.values().get_all(), attr.values().get_all());
        assert_eq!(copy.indices().get_all(), attr.indices().get_all());
    }
}
