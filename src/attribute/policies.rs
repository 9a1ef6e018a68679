//! Element tags, usage tags, and the mutation policies.
//!
//! Policies govern what happens when an operation would mutate an external
//! buffer beyond what the caller declared safe: error out, stay within the
//! declared capacity, or transparently fall back to an internal copy
//! (silently or with a warning).

use crate::error::{AttribError, Result};
use crate::scalar::ScalarTag;

/// Type of mesh element an attribute is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeElement {
    /// Per-vertex attribute.
    Vertex,
    /// Per-facet attribute.
    Facet,
    /// Per-edge attribute.
    Edge,
    /// Per-corner attribute.
    Corner,
    /// Free-standing values, not attached to a specific element. Used by
    /// indexed attributes for their value buffers.
    Value,
    /// Index buffer of an indexed attribute.
    Indexed,
}

impl std::fmt::Display for AttributeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttributeElement::Vertex => "vertex",
            AttributeElement::Facet => "facet",
            AttributeElement::Edge => "edge",
            AttributeElement::Corner => "corner",
            AttributeElement::Value => "value",
            AttributeElement::Indexed => "indexed",
        };
        f.write_str(s)
    }
}

/// Semantic role of an attribute's values. The usage constrains the number
/// of channels allowed at construction; index usages additionally require an
/// integral scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeUsage {
    /// Any number of channels (including 1).
    Vector,
    /// Exactly 1 channel.
    Scalar,
    /// At least 1 channel (depends on mesh dimension).
    Normal,
    /// Tangent vector; at least 1 channel.
    Tangent,
    /// Bitangent vector; at least 1 channel.
    Bitangent,
    /// 3 or 4 channels.
    Color,
    /// Exactly 2 channels.
    UV,
    /// Single-channel integer attribute indexing a mesh vertex.
    VertexIndex,
    /// Single-channel integer attribute indexing a mesh facet.
    FacetIndex,
    /// Single-channel integer attribute indexing a mesh corner.
    CornerIndex,
    /// Single-channel integer attribute indexing a mesh edge.
    EdgeIndex,
}

impl AttributeUsage {
    /// Whether this usage indexes another mesh element (and therefore
    /// requires a single integral channel).
    pub fn is_index(self) -> bool {
        matches!(
            self,
            AttributeUsage::VertexIndex
                | AttributeUsage::FacetIndex
                | AttributeUsage::CornerIndex
                | AttributeUsage::EdgeIndex
        )
    }

    /// Validate a channel count against this usage.
    pub fn validate_channels(self, num_channels: usize) -> Result<()> {
        let ok = match self {
            AttributeUsage::Vector => num_channels >= 1,
            AttributeUsage::Scalar => num_channels == 1,
            AttributeUsage::Normal | AttributeUsage::Tangent | AttributeUsage::Bitangent => {
                num_channels >= 1
            }
            AttributeUsage::Color => num_channels == 3 || num_channels == 4,
            AttributeUsage::UV => num_channels == 2,
            AttributeUsage::VertexIndex
            | AttributeUsage::FacetIndex
            | AttributeUsage::CornerIndex
            | AttributeUsage::EdgeIndex => num_channels == 1,
        };
        if ok {
            Ok(())
        } else {
            Err(AttribError::Construction(format!(
                "usage {self} does not allow {num_channels} channel(s)"
            )))
        }
    }

    /// Validate the scalar type against this usage (index usages are
    /// integral-only).
    pub fn validate_scalar(self, tag: ScalarTag) -> Result<()> {
        if self.is_index() && !tag.is_integral() {
            return Err(AttribError::Construction(format!(
                "usage {self} requires an integral type, got {tag}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for AttributeUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttributeUsage::Vector => "vector",
            AttributeUsage::Scalar => "scalar",
            AttributeUsage::Normal => "normal",
            AttributeUsage::Tangent => "tangent",
            AttributeUsage::Bitangent => "bitangent",
            AttributeUsage::Color => "color",
            AttributeUsage::UV => "uv",
            AttributeUsage::VertexIndex => "vertex-index",
            AttributeUsage::FacetIndex => "facet-index",
            AttributeUsage::CornerIndex => "corner-index",
            AttributeUsage::EdgeIndex => "edge-index",
        };
        f.write_str(s)
    }
}

/// Policy for growing external attribute buffers beyond their declared
/// capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Fail when trying to grow an external buffer, even within capacity.
    #[default]
    ErrorIfExternal,
    /// Allow growth as long as it stays within the capacity declared at wrap
    /// time; fail if a reallocation would be needed.
    AllowWithinCapacity,
    /// Log a warning and copy the data to an internal buffer when growth
    /// exceeds the external capacity.
    WarnAndCopy,
    /// Silently copy the data to an internal buffer when growth exceeds the
    /// external capacity.
    SilentCopy,
}

/// Policy for shrinking external attribute buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShrinkPolicy {
    /// Fail when trying to shrink an external buffer.
    #[default]
    ErrorIfExternal,
    /// Allow in-place logical truncation of an external buffer.
    IgnoreIfExternal,
    /// Log a warning and copy the data to an internal buffer.
    WarnAndCopy,
    /// Silently copy the data to an internal buffer.
    SilentCopy,
}

/// Policy for write access to read-only external buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Fail on any write to a read-only buffer.
    #[default]
    ErrorIfReadOnly,
    /// Log a warning and copy the data to an internal buffer, then write.
    WarnAndCopy,
    /// Silently copy the data to an internal buffer, then write.
    SilentCopy,
}

/// Policy for cloning attributes that view external buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyPolicy {
    /// Deep-copy the buffer into the clone, so the clone manages its own
    /// lifetime.
    #[default]
    CopyIfExternal,
    /// Keep the raw pointer to the external data. The clone aliases the
    /// source's memory; use with caution.
    KeepExternalPtr,
    /// Fail when cloning an attribute that points to an external buffer.
    ErrorIfExternal,
}

/// Policy applied when casting between scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastPolicy {
    /// For index usages, remap the source type's invalid-index sentinel to
    /// the destination type's sentinel instead of saturating it.
    #[default]
    RemapInvalidIndices,
    /// Convert every value by the plain saturating rule, sentinels included.
    KeepValues,
}

/// Policy for creating attributes with reserved semantic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Fail if the requested name is reserved.
    #[default]
    ErrorIfReserved,
    /// Force creation of a reserved name.
    Force,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_channel_table() {
        assert!(AttributeUsage::Scalar.validate_channels(1).is_ok());
        assert!(AttributeUsage::Scalar.validate_channels(2).is_err());

        assert!(AttributeUsage::Vector.validate_channels(1).is_ok());
        assert!(AttributeUsage::Vector.validate_channels(7).is_ok());
        assert!(AttributeUsage::Vector.validate_channels(0).is_err());

        assert!(AttributeUsage::Normal.validate_channels(3).is_ok());
        assert!(AttributeUsage::Normal.validate_channels(0).is_err());

        assert!(AttributeUsage::Color.validate_channels(3).is_ok());
        assert!(AttributeUsage::Color.validate_channels(4).is_ok());
        assert!(AttributeUsage::Color.validate_channels(5).is_err());
        assert!(AttributeUsage::Color.validate_channels(1).is_err());

        assert!(AttributeUsage::UV.validate_channels(2).is_ok());
        assert!(AttributeUsage::UV.validate_channels(1).is_err());

        assert!(AttributeUsage::VertexIndex.validate_channels(1).is_ok());
        assert!(AttributeUsage::VertexIndex.validate_channels(2).is_err());
        assert!(AttributeUsage::EdgeIndex.validate_channels(1).is_ok());
    }

    #[test]
    fn index_usages_require_integral_scalars() {
        assert!(
            AttributeUsage::VertexIndex
                .validate_scalar(ScalarTag::UInt32)
                .is_ok()
        );
        assert!(
            AttributeUsage::VertexIndex
                .validate_scalar(ScalarTag::Float32)
                .is_err()
        );
        assert!(
            AttributeUsage::FacetIndex
                .validate_scalar(ScalarTag::Float64)
                .is_err()
        );
        // Non-index usages accept any scalar
        assert!(
            AttributeUsage::Vector
                .validate_scalar(ScalarTag::Float64)
                .is_ok()
        );
    }

    #[test]
    fn policy_defaults_are_conservative() {
        assert_eq!(GrowthPolicy::default(), GrowthPolicy::ErrorIfExternal);
        assert_eq!(ShrinkPolicy::default(), ShrinkPolicy::ErrorIfExternal);
        assert_eq!(WritePolicy::default(), WritePolicy::ErrorIfReadOnly);
        assert_eq!(CopyPolicy::default(), CopyPolicy::CopyIfExternal);
        assert_eq!(CastPolicy::default(), CastPolicy::RemapInvalidIndices);
        assert_eq!(CreatePolicy::default(), CreatePolicy::ErrorIfReserved);
    }

    #[test]
    fn display_strings() {
        assert_eq!(AttributeElement::Corner.to_string(), "corner");
        assert_eq!(AttributeUsage::VertexIndex.to_string(), "vertex-index");
        assert_eq!(AttributeUsage::UV.to_string(), "uv");
    }
}
