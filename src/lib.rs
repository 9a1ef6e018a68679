pub mod array;
pub mod attribute;
pub mod container;
pub mod error;
pub mod mesh;
pub mod scalar;
pub mod serialize;

pub use array::{ArrayView, ArrayViewMut, DenseArray, ErasedArray};
pub use attribute::{
    Attribute, AttributeElement, AttributeUsage, CastPolicy, CopyPolicy, CreatePolicy,
    ErasedAttribute, ErasedIndexedAttribute, GrowthPolicy, IndexScalar, IndexedAttribute,
    SharedBuffer, ShrinkPolicy, WritePolicy,
};
pub use container::{AttributeContainer, IndexedAttributeContainer, ReservedName};
pub use error::{AttribError, Result};
pub use mesh::{INVALID_INDEX, Index, Mesh};
pub use scalar::{Scalar, ScalarTag};
