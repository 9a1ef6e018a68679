//! Versioned binary serialization.
//!
//! A tagged little-endian record format for round-tripping meshes, erased
//! attributes, and dense arrays. The format is internal (not a cross-tool
//! interchange format) but bit-stable across the declared version triple.
//! Every typed payload is written as `{scalar_type_tag, shape, raw_data}`;
//! deserialization switches on the tag to rebuild the correctly-typed
//! buffer, and an unrecognized tag is a hard failure. Deserialized buffers
//! are always internal; mutation policies reset to their defaults.

use std::io::{Read, Write};

use crate::array::{DenseArray, ErasedArray};
use crate::attribute::{
    Attribute, AttributeElement, AttributeUsage, ErasedAttribute, ErasedIndexedAttribute,
};
use crate::container::{AttributeContainer, IndexedAttributeContainer};
use crate::error::{AttribError, Result};
use crate::mesh::Mesh;
use crate::scalar::{Scalar, ScalarTag};

const MESH_MAGIC: &[u8; 4] = b"MATR";

/// Format version triple. Readers reject any other version.
pub const FORMAT_VERSION: [u32; 3] = [0, 1, 0];

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

fn write_u8<W: Write>(w: &mut W, v: u8) -> Result<()> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    write_u64(w, s.len() as u64)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String> {
    let len = read_u64(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|_| AttribError::Serialization("attribute name is not valid UTF-8".into()))
}

fn write_scalar_slice<T: Scalar, W: Write>(w: &mut W, values: &[T]) -> Result<()> {
    w.write_all(bytemuck::cast_slice(values))?;
    Ok(())
}

fn read_scalar_vec<T: Scalar, R: Read>(r: &mut R, count: usize) -> Result<Vec<T>> {
    let mut bytes = vec![0u8; count * std::mem::size_of::<T>()];
    r.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

// ---------------------------------------------------------------------------
// Enum wire codes
// ---------------------------------------------------------------------------

fn element_to_u8(element: AttributeElement) -> u8 {
    match element {
        AttributeElement::Vertex => 0,
        AttributeElement::Facet => 1,
        AttributeElement::Edge => 2,
        AttributeElement::Corner => 3,
        AttributeElement::Value => 4,
        AttributeElement::Indexed => 5,
    }
}

fn element_from_u8(code: u8) -> Result<AttributeElement> {
    Ok(match code {
        0 => AttributeElement::Vertex,
        1 => AttributeElement::Facet,
        2 => AttributeElement::Edge,
        3 => AttributeElement::Corner,
        4 => AttributeElement::Value,
        5 => AttributeElement::Indexed,
        _ => {
            return Err(AttribError::Serialization(format!(
                "unknown element code {code}"
            )));
        }
    })
}

fn usage_to_u8(usage: AttributeUsage) -> u8 {
    match usage {
        AttributeUsage::Vector => 0,
        AttributeUsage::Scalar => 1,
        AttributeUsage::Normal => 2,
        AttributeUsage::Tangent => 3,
        AttributeUsage::Bitangent => 4,
        AttributeUsage::Color => 5,
        AttributeUsage::UV => 6,
        AttributeUsage::VertexIndex => 7,
        AttributeUsage::FacetIndex => 8,
        AttributeUsage::CornerIndex => 9,
        AttributeUsage::EdgeIndex => 10,
    }
}

fn usage_from_u8(code: u8) -> Result<AttributeUsage> {
    Ok(match code {
        0 => AttributeUsage::Vector,
        1 => AttributeUsage::Scalar,
        2 => AttributeUsage::Normal,
        3 => AttributeUsage::Tangent,
        4 => AttributeUsage::Bitangent,
        5 => AttributeUsage::Color,
        6 => AttributeUsage::UV,
        7 => AttributeUsage::VertexIndex,
        8 => AttributeUsage::FacetIndex,
        9 => AttributeUsage::CornerIndex,
        10 => AttributeUsage::EdgeIndex,
        _ => {
            return Err(AttribError::Serialization(format!(
                "unknown usage code {code}"
            )));
        }
    })
}

// ---------------------------------------------------------------------------
// Dense arrays
// ---------------------------------------------------------------------------

fn write_typed_array<T: Scalar, W: Write>(w: &mut W, array: &DenseArray<T>) -> Result<()> {
    write_u8(w, T::TAG.to_u8())?;
    write_u8(w, array.is_row_major() as u8)?;
    write_u64(w, array.rows() as u64)?;
    write_u64(w, array.cols() as u64)?;
    write_scalar_slice(w, array.as_slice())
}

fn read_typed_array<T: Scalar, R: Read>(r: &mut R, row_major: bool) -> Result<DenseArray<T>> {
    let rows = read_u64(r)? as usize;
    let cols = read_u64(r)? as usize;
    let data = read_scalar_vec::<T, _>(r, rows * cols)?;
    DenseArray::from_vec(data, rows, cols, row_major)
}

/// Write a type-erased dense array record.
pub fn write_array<W: Write>(w: &mut W, array: &ErasedArray) -> Result<()> {
    match array {
        ErasedArray::Int8(a) => write_typed_array(w, a),
        ErasedArray::Int16(a) => write_typed_array(w, a),
        ErasedArray::Int32(a) => write_typed_array(w, a),
        ErasedArray::Int64(a) => write_typed_array(w, a),
        ErasedArray::UInt8(a) => write_typed_array(w, a),
        ErasedArray::UInt16(a) => write_typed_array(w, a),
        ErasedArray::UInt32(a) => write_typed_array(w, a),
        ErasedArray::UInt64(a) => write_typed_array(w, a),
        ErasedArray::Float32(a) => write_typed_array(w, a),
        ErasedArray::Float64(a) => write_typed_array(w, a),
    }
}

/// Read a type-erased dense array record, switching on the scalar tag.
pub fn read_array<R: Read>(r: &mut R) -> Result<ErasedArray> {
    let tag = ScalarTag::from_u8(read_u8(r)?)?;
    let row_major = read_u8(r)? != 0;
    Ok(match tag {
        ScalarTag::Int8 => read_typed_array::<i8, _>(r, row_major)?.into(),
        ScalarTag::Int16 => read_typed_array::<i16, _>(r, row_major)?.into(),
        ScalarTag::Int32 => read_typed_array::<i32, _>(r, row_major)?.into(),
        ScalarTag::Int64 => read_typed_array::<i64, _>(r, row_major)?.into(),
        ScalarTag::UInt8 => read_typed_array::<u8, _>(r, row_major)?.into(),
        ScalarTag::UInt16 => read_typed_array::<u16, _>(r, row_major)?.into(),
        ScalarTag::UInt32 => read_typed_array::<u32, _>(r, row_major)?.into(),
        ScalarTag::UInt64 => read_typed_array::<u64, _>(r, row_major)?.into(),
        ScalarTag::Float32 => read_typed_array::<f32, _>(r, row_major)?.into(),
        ScalarTag::Float64 => read_typed_array::<f64, _>(r, row_major)?.into(),
    })
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn write_typed_attribute<T: Scalar, W: Write>(w: &mut W, attr: &Attribute<T>) -> Result<()> {
    write_u8(w, element_to_u8(attr.element()))?;
    write_u8(w, usage_to_u8(attr.usage()))?;
    write_u64(w, attr.num_channels() as u64)?;
    write_u8(w, T::TAG.to_u8())?;
    let default = attr.default_value();
    w.write_all(bytemuck::bytes_of(&default))?;
    write_u64(w, attr.num_elements() as u64)?;
    write_scalar_slice(w, attr.get_all())
}

fn read_typed_attribute<T: Scalar, R: Read>(
    r: &mut R,
    element: AttributeElement,
    usage: AttributeUsage,
    num_channels: usize,
) -> Result<Attribute<T>> {
    let mut default_bytes = vec![0u8; std::mem::size_of::<T>()];
    r.read_exact(&mut default_bytes)?;
    let default: T = bytemuck::pod_read_unaligned(&default_bytes);
    let num_elements = read_u64(r)? as usize;
    let data = read_scalar_vec::<T, _>(r, num_elements * num_channels)?;
    let mut attr = Attribute::from_vec(element, usage, num_channels, data)?;
    attr.set_default_value(default);
    Ok(attr)
}

/// Write a type-erased attribute record.
pub fn write_attribute<W: Write>(w: &mut W, attr: &ErasedAttribute) -> Result<()> {
    match attr {
        ErasedAttribute::Int8(a) => write_typed_attribute(w, a),
        ErasedAttribute::Int16(a) => write_typed_attribute(w, a),
        ErasedAttribute::Int32(a) => write_typed_attribute(w, a),
        ErasedAttribute::Int64(a) => write_typed_attribute(w, a),
        ErasedAttribute::UInt8(a) => write_typed_attribute(w, a),
        ErasedAttribute::UInt16(a) => write_typed_attribute(w, a),
        ErasedAttribute::UInt32(a) => write_typed_attribute(w, a),
        ErasedAttribute::UInt64(a) => write_typed_attribute(w, a),
        ErasedAttribute::Float32(a) => write_typed_attribute(w, a),
        ErasedAttribute::Float64(a) => write_typed_attribute(w, a),
    }
}

/// Read a type-erased attribute record, switching on the scalar tag.
pub fn read_attribute<R: Read>(r: &mut R) -> Result<ErasedAttribute> {
    let element = element_from_u8(read_u8(r)?)?;
    let usage = usage_from_u8(read_u8(r)?)?;
    let num_channels = read_u64(r)? as usize;
    let tag = ScalarTag::from_u8(read_u8(r)?)?;
    Ok(match tag {
        ScalarTag::Int8 => read_typed_attribute::<i8, _>(r, element, usage, num_channels)?.into(),
        ScalarTag::Int16 => read_typed_attribute::<i16, _>(r, element, usage, num_channels)?.into(),
        ScalarTag::Int32 => read_typed_attribute::<i32, _>(r, element, usage, num_channels)?.into(),
        ScalarTag::Int64 => read_typed_attribute::<i64, _>(r, element, usage, num_channels)?.into(),
        ScalarTag::UInt8 => read_typed_attribute::<u8, _>(r, element, usage, num_channels)?.into(),
        ScalarTag::UInt16 => {
            read_typed_attribute::<u16, _>(r, element, usage, num_channels)?.into()
        }
        ScalarTag::UInt32 => {
            read_typed_attribute::<u32, _>(r, element, usage, num_channels)?.into()
        }
        ScalarTag::UInt64 => {
            read_typed_attribute::<u64, _>(r, element, usage, num_channels)?.into()
        }
        ScalarTag::Float32 => {
            read_typed_attribute::<f32, _>(r, element, usage, num_channels)?.into()
        }
        ScalarTag::Float64 => {
            read_typed_attribute::<f64, _>(r, element, usage, num_channels)?.into()
        }
    })
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

fn write_container<W: Write>(w: &mut W, container: &AttributeContainer) -> Result<()> {
    write_u64(w, container.len() as u64)?;
    for (name, attr) in container.iter() {
        write_str(w, name)?;
        write_attribute(w, attr)?;
    }
    Ok(())
}

fn read_container<R: Read>(r: &mut R) -> Result<AttributeContainer> {
    let count = read_u64(r)? as usize;
    let mut container = AttributeContainer::new();
    for _ in 0..count {
        let name = read_str(r)?;
        let attr = read_attribute(r)?;
        container.import_data(&name, attr)?;
    }
    Ok(container)
}

fn write_indexed_container<W: Write>(
    w: &mut W,
    container: &IndexedAttributeContainer,
) -> Result<()> {
    write_u64(w, container.len() as u64)?;
    for (name, attr) in container.iter() {
        write_str(w, name)?;
        write_attribute(w, attr.values())?;
        write_attribute(w, attr.indices())?;
    }
    Ok(())
}

fn read_indexed_container<R: Read>(r: &mut R) -> Result<IndexedAttributeContainer> {
    let count = read_u64(r)? as usize;
    let mut container = IndexedAttributeContainer::new();
    for _ in 0..count {
        let name = read_str(r)?;
        let values = read_attribute(r)?;
        let indices = read_attribute(r)?;
        container.import_data(&name, ErasedIndexedAttribute::from_parts(values, indices)?)?;
    }
    Ok(container)
}

// ---------------------------------------------------------------------------
// Mesh
// ---------------------------------------------------------------------------

impl Mesh {
    /// Write the mesh as a versioned binary record: geometry first, then
    /// one sub-record per attribute container.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(MESH_MAGIC)?;
        for v in FORMAT_VERSION {
            write_u32(w, v)?;
        }
        write_u64(w, self.dim() as u64)?;
        write_u64(w, self.vertex_per_facet() as u64)?;
        write_u64(w, self.num_vertices() as u64)?;
        write_scalar_slice(w, self.get_vertices())?;
        write_u64(w, self.num_facets() as u64)?;
        write_scalar_slice(w, self.get_facets())?;

        write_container(w, self.vertex_attributes())?;
        write_container(w, self.facet_attributes())?;
        write_container(w, self.corner_attributes())?;
        // The edge container is serialized regardless of edge-data state;
        // it is empty unless edge attributes were created.
        match self.edge_attributes() {
            Ok(container) => write_container(w, container)?,
            Err(_) => write_container(w, &AttributeContainer::new())?,
        }
        write_indexed_container(w, self.indexed_attributes())
    }

    /// Read a mesh written by [`Mesh::serialize`]. A version mismatch or an
    /// unknown tag is a hard failure. If edge attributes are present, edge
    /// data is re-initialized on load.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MESH_MAGIC {
            return Err(AttribError::Serialization(
                "bad magic bytes; not a mesh record".into(),
            ));
        }
        let mut version = [0u32; 3];
        for v in &mut version {
            *v = read_u32(r)?;
        }
        if version != FORMAT_VERSION {
            return Err(AttribError::Serialization(format!(
                "incompatible version {}.{}.{} (expected {}.{}.{})",
                version[0],
                version[1],
                version[2],
                FORMAT_VERSION[0],
                FORMAT_VERSION[1],
                FORMAT_VERSION[2]
            )));
        }

        let dim = read_u64(r)? as usize;
        let vertex_per_facet = read_u64(r)? as usize;
        let num_vertices = read_u64(r)? as usize;
        let vertices = read_scalar_vec::<f64, _>(r, num_vertices * dim)?;
        let num_facets = read_u64(r)? as usize;
        let facets = read_scalar_vec::<u32, _>(r, num_facets * vertex_per_facet)?;

        let mut mesh = Mesh::from_buffers(dim, vertex_per_facet, vertices, facets)?;
        *mesh.vertex_attributes_mut() = read_container(r)?;
        *mesh.facet_attributes_mut() = read_container(r)?;
        *mesh.corner_attributes_mut() = read_container(r)?;
        let edge_container = read_container(r)?;
        if !edge_container.is_empty() {
            mesh.initialize_edge_data()?;
            *mesh.edge_attributes_mut()? = edge_container;
        }
        *mesh.indexed_attributes_mut() = read_indexed_container(r)?;
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn array_round_trip_all_tags_and_orders() {
        for &row_major in &[true, false] {
            let mut arr = DenseArray::<i16>::zeros_with_order(3, 2, row_major);
            for r in 0..3 {
                for c in 0..2 {
                    arr.set(r, c, (r * 2 + c) as i16 - 3);
                }
            }
            let erased: ErasedArray = arr.clone().into();

            let mut bytes = Vec::new();
            write_array(&mut bytes, &erased).unwrap();
            let back = read_array(&mut Cursor::new(&bytes)).unwrap();

            assert_eq!(back.scalar_tag(), ScalarTag::Int16);
            assert_eq!(back.is_row_major(), row_major);
            assert_eq!(back.downcast_ref::<i16>().unwrap(), &arr);
        }
    }

    #[test]
    fn attribute_round_trip_preserves_shape_and_default() {
        let mut attr =
            Attribute::<f32>::new(AttributeElement::Corner, AttributeUsage::Color, 4).unwrap();
        attr.set_default_value(0.25);
        attr.insert_elements(&[0.1, 0.2, 0.3, 1.0, 0.5, 0.6, 0.7, 1.0])
            .unwrap();
        let erased: ErasedAttribute = attr.into();

        let mut bytes = Vec::new();
        write_attribute(&mut bytes, &erased).unwrap();
        let back = read_attribute(&mut Cursor::new(&bytes)).unwrap();

        assert_eq!(back.scalar_tag(), ScalarTag::Float32);
        assert_eq!(back.element(), AttributeElement::Corner);
        assert_eq!(back.usage(), AttributeUsage::Color);
        assert_eq!(back.num_channels(), 4);
        let typed = back.downcast_ref::<f32>().unwrap();
        assert_eq!(typed.default_value(), 0.25);
        assert_eq!(
            typed.get_all(),
            &[0.1, 0.2, 0.3, 1.0, 0.5, 0.6, 0.7, 1.0]
        );
        assert!(!typed.is_external());
    }

    #[test]
    fn unknown_scalar_tag_is_a_hard_failure() {
        let mut bytes = Vec::new();
        write_u8(&mut bytes, element_to_u8(AttributeElement::Vertex)).unwrap();
        write_u8(&mut bytes, usage_to_u8(AttributeUsage::Scalar)).unwrap();
        write_u64(&mut bytes, 1).unwrap();
        write_u8(&mut bytes, 200).unwrap(); // bogus scalar tag
        let err = read_attribute(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, AttribError::Serialization(_)));
    }

    #[test]
    fn truncated_record_fails_with_io_error() {
        let mut attr =
            Attribute::<f64>::new(AttributeElement::Vertex, AttributeUsage::Scalar, 1).unwrap();
        attr.insert_elements(&[1.0, 2.0, 3.0]).unwrap();
        let mut bytes = Vec::new();
        write_attribute(&mut bytes, &attr.into()).unwrap();
        bytes.truncate(bytes.len() - 4);
        let err = read_attribute(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, AttribError::Io(_)));
    }
}
