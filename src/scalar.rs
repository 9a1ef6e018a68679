//! Runtime scalar type registry.
//!
//! Attributes are generic over a closed set of ten numeric types. The
//! [`ScalarTag`] enum identifies one of them at runtime and is the basis for
//! type erasure and safe downcasting; the sealed [`Scalar`] trait ties each
//! concrete type to its tag.

use crate::array::{DenseArray, ErasedArray};
use crate::attribute::{Attribute, ErasedAttribute};
use crate::error::{AttribError, Result};

/// Runtime tag identifying one of the supported scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

/// All tags, in wire-code order.
pub const ALL_SCALAR_TAGS: [ScalarTag; 10] = [
    ScalarTag::Int8,
    ScalarTag::Int16,
    ScalarTag::Int32,
    ScalarTag::Int64,
    ScalarTag::UInt8,
    ScalarTag::UInt16,
    ScalarTag::UInt32,
    ScalarTag::UInt64,
    ScalarTag::Float32,
    ScalarTag::Float64,
];

impl ScalarTag {
    /// Human-readable name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ScalarTag::Int8 => "int8",
            ScalarTag::Int16 => "int16",
            ScalarTag::Int32 => "int32",
            ScalarTag::Int64 => "int64",
            ScalarTag::UInt8 => "uint8",
            ScalarTag::UInt16 => "uint16",
            ScalarTag::UInt32 => "uint32",
            ScalarTag::UInt64 => "uint64",
            ScalarTag::Float32 => "float32",
            ScalarTag::Float64 => "float64",
        }
    }

    /// Stable wire code used by the binary serialization format.
    pub fn to_u8(self) -> u8 {
        match self {
            ScalarTag::Int8 => 0,
            ScalarTag::Int16 => 1,
            ScalarTag::Int32 => 2,
            ScalarTag::Int64 => 3,
            ScalarTag::UInt8 => 4,
            ScalarTag::UInt16 => 5,
            ScalarTag::UInt32 => 6,
            ScalarTag::UInt64 => 7,
            ScalarTag::Float32 => 8,
            ScalarTag::Float64 => 9,
        }
    }

    /// Inverse of [`ScalarTag::to_u8`]. An unrecognized code is a hard
    /// deserialization failure.
    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            0 => Ok(ScalarTag::Int8),
            1 => Ok(ScalarTag::Int16),
            2 => Ok(ScalarTag::Int32),
            3 => Ok(ScalarTag::Int64),
            4 => Ok(ScalarTag::UInt8),
            5 => Ok(ScalarTag::UInt16),
            6 => Ok(ScalarTag::UInt32),
            7 => Ok(ScalarTag::UInt64),
            8 => Ok(ScalarTag::Float32),
            9 => Ok(ScalarTag::Float64),
            _ => Err(AttribError::Serialization(format!(
                "unknown scalar tag code {code}"
            ))),
        }
    }

    /// Size of one scalar of this type, in bytes.
    pub fn size_of(self) -> usize {
        match self {
            ScalarTag::Int8 | ScalarTag::UInt8 => 1,
            ScalarTag::Int16 | ScalarTag::UInt16 => 2,
            ScalarTag::Int32 | ScalarTag::UInt32 | ScalarTag::Float32 => 4,
            ScalarTag::Int64 | ScalarTag::UInt64 | ScalarTag::Float64 => 8,
        }
    }

    /// Whether the type is an integer type.
    pub fn is_integral(self) -> bool {
        !matches!(self, ScalarTag::Float32 | ScalarTag::Float64)
    }
}

impl std::fmt::Display for ScalarTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar type usable as attribute/array storage.
///
/// This trait is sealed: exactly the ten [`ScalarTag`]-representable types
/// implement it. The `erase_*`/`*_ref` hooks pack/unpack the matching variant
/// of the type-erased containers, so downcasting never needs open-ended
/// runtime type information.
pub trait Scalar:
    sealed::Sealed
    + bytemuck::Pod
    + PartialEq
    + PartialOrd
    + Copy
    + Send
    + Sync
    + std::fmt::Debug
    + std::fmt::Display
    + 'static
{
    /// Runtime tag for this type.
    const TAG: ScalarTag;
    /// Additive identity, the default fill value.
    const ZERO: Self;
    /// Largest representable value. For integer types this doubles as the
    /// invalid-index sentinel.
    const MAX: Self;
    /// Whether this is an integer type (index usages require it).
    const IS_INTEGRAL: bool;

    /// Widen to `f64` (lossless except for the extremes of 64-bit integers).
    fn to_f64(self) -> f64;

    /// Saturating conversion from `f64`: integral targets round to nearest
    /// (ties away from zero) and clamp to the representable range; NaN maps
    /// to zero. Never undefined, never an error.
    fn from_f64(v: f64) -> Self;

    fn erase_attribute(attr: Attribute<Self>) -> ErasedAttribute;
    fn attribute_ref(erased: &ErasedAttribute) -> Option<&Attribute<Self>>;
    fn attribute_mut(erased: &mut ErasedAttribute) -> Option<&mut Attribute<Self>>;

    fn erase_array(array: DenseArray<Self>) -> ErasedArray;
    fn array_ref(erased: &ErasedArray) -> Option<&DenseArray<Self>>;
    fn array_mut(erased: &mut ErasedArray) -> Option<&mut DenseArray<Self>>;
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident, integral) => {
        impl_scalar!(@common $ty, $variant, true, |v: f64| v.round() as $ty);
    };
    ($ty:ty, $variant:ident, float) => {
        impl_scalar!(@common $ty, $variant, false, |v: f64| v as $ty);
    };
    (@common $ty:ty, $variant:ident, $integral:expr, $from:expr) => {
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const TAG: ScalarTag = ScalarTag::$variant;
            const ZERO: Self = 0 as $ty;
            const MAX: Self = <$ty>::MAX;
            const IS_INTEGRAL: bool = $integral;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(v: f64) -> Self {
                // `as` saturates for float-to-int and float-to-float casts
                let convert = $from;
                convert(v)
            }

            fn erase_attribute(attr: Attribute<Self>) -> ErasedAttribute {
                ErasedAttribute::$variant(attr)
            }

            fn attribute_ref(erased: &ErasedAttribute) -> Option<&Attribute<Self>> {
                match erased {
                    ErasedAttribute::$variant(attr) => Some(attr),
                    _ => None,
                }
            }

            fn attribute_mut(erased: &mut ErasedAttribute) -> Option<&mut Attribute<Self>> {
                match erased {
                    ErasedAttribute::$variant(attr) => Some(attr),
                    _ => None,
                }
            }

            fn erase_array(array: DenseArray<Self>) -> ErasedArray {
                ErasedArray::$variant(array)
            }

            fn array_ref(erased: &ErasedArray) -> Option<&DenseArray<Self>> {
                match erased {
                    ErasedArray::$variant(array) => Some(array),
                    _ => None,
                }
            }

            fn array_mut(erased: &mut ErasedArray) -> Option<&mut DenseArray<Self>> {
                match erased {
                    ErasedArray::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(i8, Int8, integral);
impl_scalar!(i16, Int16, integral);
impl_scalar!(i32, Int32, integral);
impl_scalar!(i64, Int64, integral);
impl_scalar!(u8, UInt8, integral);
impl_scalar!(u16, UInt16, integral);
impl_scalar!(u32, UInt32, integral);
impl_scalar!(u64, UInt64, integral);
impl_scalar!(f32, Float32, float);
impl_scalar!(f64, Float64, float);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_through_wire_code() {
        for tag in ALL_SCALAR_TAGS {
            assert_eq!(ScalarTag::from_u8(tag.to_u8()).unwrap(), tag);
        }
    }

    #[test]
    fn unknown_wire_code_fails() {
        assert!(ScalarTag::from_u8(10).is_err());
        assert!(ScalarTag::from_u8(255).is_err());
    }

    #[test]
    fn tag_sizes() {
        assert_eq!(ScalarTag::Int8.size_of(), 1);
        assert_eq!(ScalarTag::UInt16.size_of(), 2);
        assert_eq!(ScalarTag::Float32.size_of(), 4);
        assert_eq!(ScalarTag::Float64.size_of(), 8);
        assert_eq!(ScalarTag::Int64.size_of(), 8);
    }

    #[test]
    fn integral_classification() {
        assert!(ScalarTag::UInt32.is_integral());
        assert!(ScalarTag::Int8.is_integral());
        assert!(!ScalarTag::Float32.is_integral());
        assert!(!ScalarTag::Float64.is_integral());
        assert!(u32::IS_INTEGRAL);
        assert!(!f64::IS_INTEGRAL);
    }

    #[test]
    fn from_f64_saturates() {
        assert_eq!(i8::from_f64(300.0), i8::MAX);
        assert_eq!(i8::from_f64(-300.0), i8::MIN);
        assert_eq!(u8::from_f64(-1.0), 0);
        assert_eq!(u16::from_f64(70_000.0), u16::MAX);
    }

    #[test]
    fn from_f64_rounds_ties_away_from_zero() {
        assert_eq!(i32::from_f64(2.5), 3);
        assert_eq!(i32::from_f64(-2.5), -3);
        assert_eq!(i32::from_f64(2.4), 2);
    }

    #[test]
    fn from_f64_nan_maps_to_zero() {
        assert_eq!(i32::from_f64(f64::NAN), 0);
        assert_eq!(u64::from_f64(f64::NAN), 0);
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(ScalarTag::Float64.to_string(), "float64");
        assert_eq!(ScalarTag::UInt8.to_string(), "uint8");
    }
}
