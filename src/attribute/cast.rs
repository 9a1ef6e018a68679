//! Casting attribute contents between scalar types.
//!
//! Conversion is saturating: values travel through `f64`, integral targets
//! round to nearest (ties away from zero) and clamp to the representable
//! range. Under [`CastPolicy::RemapInvalidIndices`], index-usage attributes
//! remap the source type's invalid-index sentinel (`O::MAX`) to the target
//! sentinel (`T::MAX`) instead of saturating it.

use tracing::warn;

use crate::error::Result;
use crate::scalar::Scalar;

use super::buffer::Attribute;
use super::policies::CastPolicy;

impl<T: Scalar> Attribute<T> {
    /// Overwrite this attribute with a cast of `other`: the element kind,
    /// usage, channel count, element count, and default value all propagate
    /// from the source; the result is an internal buffer.
    ///
    /// A cast between identical value types is almost certainly a caller
    /// mistake and logs a diagnostic, but is still performed correctly.
    pub fn cast_assign<O: Scalar>(&mut self, other: &Attribute<O>) -> Result<()> {
        if O::TAG == T::TAG {
            warn!(
                value_type = %T::TAG,
                "casting between identical value types; this is likely a mistake"
            );
        }
        other.usage().validate_scalar(T::TAG)?;
        let remap = self.cast_policy() == CastPolicy::RemapInvalidIndices && other.usage().is_index();
        let data: Vec<T> = other
            .get_all()
            .iter()
            .map(|&v| cast_value::<T, O>(v, remap))
            .collect();

        let mut result = Attribute::<T>::new(other.element(), other.usage(), other.num_channels())?;
        result.set_default_value(cast_value::<T, O>(other.default_value(), remap));
        result.insert_elements(&data)?;
        result.set_growth_policy(self.growth_policy());
        result.set_shrink_policy(self.shrink_policy());
        result.set_write_policy(self.write_policy());
        result.set_copy_policy(self.copy_policy());
        result.set_cast_policy(self.cast_policy());
        *self = result;
        Ok(())
    }

    /// Build a new attribute of this value type by casting every scalar of
    /// `other`.
    pub fn cast_copy<O: Scalar>(other: &Attribute<O>) -> Result<Attribute<T>> {
        let mut result = Attribute::<T>::new(other.element(), other.usage(), other.num_channels())?;
        result.cast_assign(other)?;
        Ok(result)
    }
}

fn cast_value<T: Scalar, O: Scalar>(v: O, remap_sentinel: bool) -> T {
    if remap_sentinel && v == O::MAX {
        T::MAX
    } else {
        T::from_f64(v.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::policies::{AttributeElement, AttributeUsage};

    fn vector_attr<T: Scalar>(values: &[T]) -> Attribute<T> {
        let mut attr =
            Attribute::<T>::new(AttributeElement::Vertex, AttributeUsage::Vector, 3).unwrap();
        attr.insert_elements(values).unwrap();
        attr
    }

    #[test]
    fn cast_copy_converts_values_and_shape() {
        let src = vector_attr(&[0.0f64, 1.25, 2.75, 3.0, 4.5, 5.0]);
        let dst = Attribute::<f32>::cast_copy(&src).unwrap();
        assert_eq!(dst.element(), AttributeElement::Vertex);
        assert_eq!(dst.usage(), AttributeUsage::Vector);
        assert_eq!(dst.num_channels(), 3);
        assert_eq!(dst.get_all(), &[0.0f32, 1.25, 2.75, 3.0, 4.5, 5.0]);
    }

    #[test]
    fn narrowing_saturates() {
        let src = vector_attr(&[0.0f64, 300.0, -300.0, 2.5, -2.5, 100.0]);
        let dst = Attribute::<i8>::cast_copy(&src).unwrap();
        assert_eq!(dst.get_all(), &[0, i8::MAX, i8::MIN, 3, -3, 100]);
    }

    #[test]
    fn cast_assign_replaces_differently_shaped_target() {
        let src = vector_attr(&[1.0f64, 2.0, 3.0]);
        let mut dst =
            Attribute::<f32>::new(AttributeElement::Facet, AttributeUsage::Scalar, 1).unwrap();
        dst.insert_elements(&[9.0, 9.0]).unwrap();
        dst.cast_assign(&src).unwrap();
        assert_eq!(dst.element(), AttributeElement::Vertex);
        assert_eq!(dst.usage(), AttributeUsage::Vector);
        assert_eq!(dst.num_channels(), 3);
        assert_eq!(dst.num_elements(), 1);
        assert_eq!(dst.get_all(), &[1.0f32, 2.0, 3.0]);
    }

    #[test]
    fn index_sentinel_remaps_by_default() {
        let mut src =
            Attribute::<u32>::new(AttributeElement::Corner, AttributeUsage::VertexIndex, 1)
                .unwrap();
        src.insert_elements(&[0, 7, u32::MAX]).unwrap();
        let dst = Attribute::<u64>::cast_copy(&src).unwrap();
        assert_eq!(dst.get_all(), &[0u64, 7, u64::MAX]);
    }

    #[test]
    fn index_sentinel_kept_when_policy_disabled() {
        let mut src =
            Attribute::<u32>::new(AttributeElement::Corner, AttributeUsage::VertexIndex, 1)
                .unwrap();
        src.insert_elements(&[0, 7, u32::MAX]).unwrap();
        let mut dst =
            Attribute::<u64>::new(AttributeElement::Corner, AttributeUsage::VertexIndex, 1)
                .unwrap();
        dst.set_cast_policy(CastPolicy::KeepValues);
        dst.cast_assign(&src).unwrap();
        assert_eq!(dst.get_all(), &[0u64, 7, u64::from(u32::MAX)]);
    }

    #[test]
    fn index_usage_rejects_float_target() {
        let mut src =
            Attribute::<u32>::new(AttributeElement::Corner, AttributeUsage::VertexIndex, 1)
                .unwrap();
        src.insert_elements(&[0, 1]).unwrap();
        assert!(Attribute::<f32>::cast_copy(&src).is_err());
    }

    #[test]
    fn same_type_cast_still_copies() {
        let src = vector_attr(&[1.0f32, 2.0, 3.0]);
        let dst = Attribute::<f32>::cast_copy(&src).unwrap();
        assert_eq!(dst.get_all(), src.get_all());
        assert_ne!(dst.data_ptr(), src.data_ptr());
    }
}
