//! Vertex attribute format and descriptor tables, and the packed layout derived from them.

#![allow(missing_docs)]

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    gx::{decode_enum, AttrType, CompCnt, CompType, VertexAttribute, NUM_VERTEX_ATTRIBUTES},
    GXError,
};

/// The storage format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VertexAttributeFormat {
    /// Type of each component.
    pub comp_type: CompType,
    /// Number of components. See [CompCnt] for the per-attribute meanings.
    pub comp_cnt: CompCnt,
    /// Number of fractional bits for fixed point component types.
    ///
    /// This does not affect decoding; it is exposed for the backend to dequantize with.
    pub comp_shift: u8,
}

impl VertexAttributeFormat {
    pub fn new(comp_type: CompType, comp_cnt: CompCnt) -> Self {
        Self {
            comp_type,
            comp_cnt,
            comp_shift: 0,
        }
    }

    /// The number of components an attribute with this format has.
    pub fn num_components(&self, attribute: VertexAttribute) -> Result<usize, GXError> {
        use VertexAttribute::*;

        let unsupported = || GXError::UnsupportedComponentCount {
            attribute,
            count: self.comp_cnt,
        };
        let n = match attribute {
            a if a.is_matrix_index() => 1,
            Pos => match self.comp_cnt {
                CompCnt::POS_XY => 2,
                CompCnt::POS_XYZ => 3,
                _ => return Err(unsupported()),
            },
            Nrm => match self.comp_cnt {
                CompCnt::NRM_XYZ => 3,
                CompCnt::NRM_NBT => 9,
                _ => return Err(unsupported()),
            },
            Nbt => match self.comp_cnt {
                CompCnt::NRM_NBT3 => return Err(unsupported()),
                _ => 9,
            },
            Clr0 | Clr1 => match self.comp_cnt {
                CompCnt::CLR_RGB => 3,
                CompCnt::CLR_RGBA => 4,
                _ => return Err(unsupported()),
            },
            _ => match self.comp_cnt {
                CompCnt::TEX_S => 1,
                CompCnt::TEX_ST => 2,
                _ => return Err(unsupported()),
            },
        };
        Ok(n)
    }

    /// The component type an attribute with this format is stored as.
    ///
    /// Matrix indices are always a single unsigned byte.
    pub fn effective_comp_type(&self, attribute: VertexAttribute) -> CompType {
        if attribute.is_matrix_index() {
            CompType::U8
        } else {
            self.comp_type
        }
    }

    /// The size of one attribute value in bytes.
    pub fn byte_size(&self, attribute: VertexAttribute) -> Result<usize, GXError> {
        Ok(self.effective_comp_type(attribute).size() * self.num_components(attribute)?)
    }
}

/// How one attribute is present in the vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VertexAttributeDescriptor {
    pub attr_type: AttrType,
}

impl VertexAttributeDescriptor {
    pub fn new(attr_type: AttrType) -> Self {
        Self { attr_type }
    }

    /// Decodes a raw descriptor value, failing on values outside of [AttrType].
    pub fn from_raw(raw: u8) -> Result<Self, GXError> {
        Ok(Self::new(decode_enum("vertex_descriptor", raw)?))
    }

    /// The number of bytes this attribute occupies in the display list for one vertex,
    /// given the attribute's direct size.
    pub fn stream_size(&self, direct_size: usize) -> usize {
        match self.attr_type {
            AttrType::None => 0,
            AttrType::Direct => direct_size,
            AttrType::Index8 => 1,
            AttrType::Index16 => 2,
        }
    }
}

/// A table with one entry per [VertexAttribute], indexed by [VertexAttribute::index].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeTable<T>([T; NUM_VERTEX_ATTRIBUTES]);

impl<T: Copy + Default> Default for AttributeTable<T> {
    fn default() -> Self {
        Self([T::default(); NUM_VERTEX_ATTRIBUTES])
    }
}

impl<T> AttributeTable<T> {
    pub fn get(&self, attribute: VertexAttribute) -> &T {
        &self.0[attribute.index()]
    }

    pub fn set(&mut self, attribute: VertexAttribute, value: T) {
        self.0[attribute.index()] = value;
    }

    /// Iterates entries in vertex stream order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexAttribute, &T)> + '_ {
        VertexAttribute::ALL.iter().copied().zip(self.0.iter())
    }
}

/// The vertex attribute format table (one format per attribute).
pub type VertexFormatTable = AttributeTable<VertexAttributeFormat>;

/// The vertex descriptor table (one presence type per attribute).
pub type VertexDescriptorTable = AttributeTable<VertexAttributeDescriptor>;

/// The full input to vertex loader compilation, also used as the loader cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VtxLoaderDesc {
    pub formats: VertexFormatTable,
    pub descriptors: VertexDescriptorTable,
}

impl VtxLoaderDesc {
    /// Builds a descriptor from `(attribute, type, format)` entries. Unlisted attributes are
    /// absent.
    pub fn from_attributes(
        attributes: &[(VertexAttribute, AttrType, VertexAttributeFormat)],
    ) -> Self {
        let mut desc = Self::default();
        for &(attribute, attr_type, format) in attributes {
            desc.descriptors
                .set(attribute, VertexAttributeDescriptor::new(attr_type));
            desc.formats.set(attribute, format);
        }
        desc
    }
}

bitflags! {
    /// A set of vertex attributes, with bit `n` corresponding to the attribute with raw value
    /// `n`.
    #[derive(Default, Serialize, Deserialize)]
    pub struct VertexAttributeMask: u32 {
        const PNMTXIDX = 1 << 0;
        const TEX0MTXIDX = 1 << 1;
        const TEX1MTXIDX = 1 << 2;
        const TEX2MTXIDX = 1 << 3;
        const TEX3MTXIDX = 1 << 4;
        const TEX4MTXIDX = 1 << 5;
        const TEX5MTXIDX = 1 << 6;
        const TEX6MTXIDX = 1 << 7;
        const TEX7MTXIDX = 1 << 8;
        const POS = 1 << 9;
        const NRM = 1 << 10;
        const CLR0 = 1 << 11;
        const CLR1 = 1 << 12;
        const TEX0 = 1 << 13;
        const TEX1 = 1 << 14;
        const TEX2 = 1 << 15;
        const TEX3 = 1 << 16;
        const TEX4 = 1 << 17;
        const TEX5 = 1 << 18;
        const TEX6 = 1 << 19;
        const TEX7 = 1 << 20;
        const NBT = 1 << 25;
    }
}

impl VertexAttributeMask {
    pub fn of(attribute: VertexAttribute) -> Self {
        Self::from_bits_truncate(1 << attribute as u8)
    }

    pub fn has(self, attribute: VertexAttribute) -> bool {
        self.contains(Self::of(attribute))
    }
}

/// Placement of one present attribute in the source stream and packed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VattrSlot {
    pub attribute: VertexAttribute,
    pub attr_type: AttrType,
    /// Component type in both the source and packed data.
    pub comp_type: CompType,
    pub num_components: usize,
    pub comp_shift: u8,
    /// Size of one value in bytes, in both the source array and packed output.
    pub src_attr_size: usize,
    /// Byte offset of the value within a packed vertex.
    pub packed_offset: usize,
}

/// The packed vertex layout for a [VtxLoaderDesc].
///
/// Packed offsets are aligned to each slot's component size, and the packed stride is
/// aligned to 4 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VattrLayout {
    /// Present attributes, in vertex stream order.
    pub slots: Vec<VattrSlot>,
    pub attributes: VertexAttributeMask,
    /// Bytes per vertex in the packed output.
    pub packed_vertex_stride: usize,
    /// Bytes per vertex in the display list.
    pub source_vertex_stride: usize,
}

fn align(n: usize, alignment: usize) -> usize {
    (n + alignment - 1) & !(alignment - 1)
}

impl VattrLayout {
    /// Computes the layout for `desc`.
    pub fn new(desc: &VtxLoaderDesc) -> Result<Self, GXError> {
        let mut slots = Vec::new();
        let mut attributes = VertexAttributeMask::empty();
        let mut packed_offset = 0;
        let mut source_vertex_stride = 0;

        for (attribute, descriptor) in desc.descriptors.iter() {
            if descriptor.attr_type == AttrType::None {
                continue;
            }

            let format = desc.formats.get(attribute);
            let comp_type = format.effective_comp_type(attribute);
            let num_components = format.num_components(attribute)?;
            let src_attr_size = comp_type.size() * num_components;

            packed_offset = align(packed_offset, comp_type.size());
            slots.push(VattrSlot {
                attribute,
                attr_type: descriptor.attr_type,
                comp_type,
                num_components,
                comp_shift: format.comp_shift,
                src_attr_size,
                packed_offset,
            });
            attributes |= VertexAttributeMask::of(attribute);

            packed_offset += src_attr_size;
            source_vertex_stride += descriptor.stream_size(src_attr_size);
        }

        Ok(Self {
            slots,
            attributes,
            packed_vertex_stride: align(packed_offset, 4),
            source_vertex_stride,
        })
    }

    /// Returns the slot for `attribute` if it is present.
    pub fn slot(&self, attribute: VertexAttribute) -> Option<&VattrSlot> {
        self.slots.iter().find(|slot| slot.attribute == attribute)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gx::CompType::*;
    use VertexAttribute::*;

    fn fmt(comp_type: CompType, comp_cnt: CompCnt) -> VertexAttributeFormat {
        VertexAttributeFormat::new(comp_type, comp_cnt)
    }

    #[test]
    fn test_layout_alignment() {
        let desc = VtxLoaderDesc::from_attributes(&[
            (PnMtxIdx, AttrType::Direct, fmt(U8, CompCnt(0))),
            (Pos, AttrType::Index16, fmt(S16, CompCnt::POS_XYZ)),
            (Clr0, AttrType::Index8, fmt(Rgba8, CompCnt::CLR_RGBA)),
            (Tex0, AttrType::Index16, fmt(F32, CompCnt::TEX_ST)),
            (Tex1, AttrType::Direct, fmt(U8, CompCnt::TEX_S)),
        ]);
        let layout = VattrLayout::new(&desc).unwrap();

        let offsets: Vec<(VertexAttribute, usize)> = layout
            .slots
            .iter()
            .map(|s| (s.attribute, s.packed_offset))
            .collect();
        assert_eq!(
            offsets,
            vec![(PnMtxIdx, 0), (Pos, 2), (Clr0, 8), (Tex0, 12), (Tex1, 20)]
        );
        assert_eq!(layout.packed_vertex_stride, 24);
        assert_eq!(layout.source_vertex_stride, 1 + 2 + 1 + 2 + 1);
        assert!(layout.attributes.has(Tex0));
        assert!(!layout.attributes.has(Nrm));
    }

    #[test]
    fn test_layout_invariants() {
        let comp_types = [U8, S8, U16, S16, F32];
        for (i, &pos_type) in comp_types.iter().enumerate() {
            let tex_type = comp_types[(i + 2) % comp_types.len()];
            let desc = VtxLoaderDesc::from_attributes(&[
                (Tex3MtxIdx, AttrType::Direct, fmt(F32, CompCnt(0))),
                (Pos, AttrType::Direct, fmt(pos_type, CompCnt::POS_XY)),
                (Nrm, AttrType::Index8, fmt(S8, CompCnt::NRM_XYZ)),
                (Clr1, AttrType::Direct, fmt(Rgba8, CompCnt::CLR_RGB)),
                (Tex7, AttrType::Index16, fmt(tex_type, CompCnt::TEX_S)),
            ]);
            let layout = VattrLayout::new(&desc).unwrap();
            assert_eq!(layout.packed_vertex_stride % 4, 0);

            let mut end = 0;
            for slot in &layout.slots {
                assert_eq!(slot.packed_offset % slot.comp_type.size(), 0);
                assert!(slot.packed_offset >= end, "overlap at {:?}", slot.attribute);
                end = slot.packed_offset + slot.src_attr_size;
            }
            assert!(end <= layout.packed_vertex_stride);
        }
    }

    #[test]
    fn test_nbt_follows_normal() {
        let desc = VtxLoaderDesc::from_attributes(&[
            (Clr0, AttrType::Direct, fmt(Rgba8, CompCnt::CLR_RGBA)),
            (Nbt, AttrType::Direct, fmt(F32, CompCnt::NRM_NBT)),
        ]);
        let layout = VattrLayout::new(&desc).unwrap();
        assert_eq!(layout.slots[0].attribute, Nbt);
        assert_eq!(layout.slots[0].src_attr_size, 36);
        assert_eq!(layout.slot(Clr0).unwrap().packed_offset, 36);
    }

    #[test]
    fn test_unsupported_component_count() {
        let desc = VtxLoaderDesc::from_attributes(&[(
            Pos,
            AttrType::Direct,
            fmt(F32, CompCnt(5)),
        )]);
        assert_eq!(
            VattrLayout::new(&desc),
            Err(GXError::UnsupportedComponentCount {
                attribute: Pos,
                count: CompCnt(5)
            })
        );
        assert!(VertexAttributeDescriptor::from_raw(4).is_err());
    }
}
