//! Typed per-element attribute buffers and their policy machinery.

pub mod buffer;
pub mod cast;
pub mod erased;
pub mod indexed;
pub mod policies;
pub mod shared;

pub use buffer::Attribute;
pub use erased::{ErasedAttribute, ErasedIndexedAttribute};
pub use indexed::{IndexScalar, IndexedAttribute};
pub use policies::{
    AttributeElement, AttributeUsage, CastPolicy, CopyPolicy, CreatePolicy, GrowthPolicy,
    ShrinkPolicy, WritePolicy,
};
pub use shared::SharedBuffer;
