//! Conversion of GX display lists into packed vertex and triangle index buffers.
//!
//! A [VtxLoader] is compiled once per [VtxLoaderDesc] (see [VtxLoaderCache]) and can then
//! be run on any number of display lists that use that vertex format.
//!
//! A display list is a sequence of draw calls, terminated by a zero byte or the end of the
//! buffer. Each draw call is a command byte (primitive type in the high 5 bits, vertex
//! format in the low 3), a big endian u16 vertex count, and then the vertex data. Each
//! vertex holds, for each present attribute in stream order, either the attribute value
//! itself (direct) or an 8/16 bit big endian index into the attribute's vertex array.

#![allow(missing_docs)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    gx::{decode_enum, AttrType, PrimitiveType, VertexAttribute},
    vtx_data::{DrawCall, LoadedVertexData},
    vtx_format::{AttributeTable, VattrLayout, VtxLoaderDesc},
    GXError,
};

/// The backing storage for an indexed attribute.
///
/// The value at index `i` is read from `data[offset + i * size..]`, where `size` is the
/// attribute's value size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexArray<'a> {
    pub data: &'a [u8],
    pub offset: usize,
}

impl<'a> VertexArray<'a> {
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }
}

/// The vertex arrays for each attribute, supplied per [VtxLoader::run_vertices] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexArrays<'a>(AttributeTable<Option<VertexArray<'a>>>);

impl<'a> VertexArrays<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attribute: VertexAttribute, array: VertexArray<'a>) {
        self.0.set(attribute, Some(array));
    }

    pub fn with(mut self, attribute: VertexAttribute, data: &'a [u8], offset: usize) -> Self {
        self.set(attribute, VertexArray::new(data, offset));
        self
    }

    pub fn get(&self, attribute: VertexAttribute) -> Option<&VertexArray<'a>> {
        self.0.get(attribute).as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VattrSource {
    Direct,
    Index8,
    Index16,
}

/// Copies one attribute value from the display list or a vertex array into a packed
/// vertex.
#[derive(Debug, Clone, Copy)]
struct VattrOp {
    attribute: VertexAttribute,
    source: VattrSource,
    size: usize,
    packed_offset: usize,
}

/// A compiled loader for one vertex format.
#[derive(Debug)]
pub struct VtxLoader {
    desc: VtxLoaderDesc,
    layout: VattrLayout,
    ops: Vec<VattrOp>,
}

/// Compiles a loader for the given vertex format, without caching.
pub fn compile_vtx_loader(desc: &VtxLoaderDesc) -> Result<VtxLoader, GXError> {
    let layout = VattrLayout::new(desc)?;
    let ops = layout
        .slots
        .iter()
        .filter_map(|slot| {
            let source = match slot.attr_type {
                AttrType::None => return None,
                AttrType::Direct => VattrSource::Direct,
                AttrType::Index8 => VattrSource::Index8,
                AttrType::Index16 => VattrSource::Index16,
            };
            Some(VattrOp {
                attribute: slot.attribute,
                source,
                size: slot.src_attr_size,
                packed_offset: slot.packed_offset,
            })
        })
        .collect();

    log::debug!(
        "compiled vertex loader: attributes {:?}, packed stride {}, source stride {}",
        layout.attributes,
        layout.packed_vertex_stride,
        layout.source_vertex_stride
    );

    Ok(VtxLoader {
        desc: desc.clone(),
        layout,
        ops,
    })
}

#[derive(Debug)]
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, n: usize) -> Result<&'a [u8], GXError> {
        let bytes = self
            .data
            .get(self.offset..self.offset + n)
            .ok_or(GXError::TruncatedDisplayList {
                offset: self.offset,
                needed: n,
            })?;
        self.offset += n;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, GXError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, GXError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

impl VtxLoader {
    /// The input this loader was compiled from.
    pub fn desc(&self) -> &VtxLoaderDesc {
        &self.desc
    }

    /// The packed vertex layout produced by this loader.
    pub fn layout(&self) -> &VattrLayout {
        &self.layout
    }

    /// Scans the draw calls in a display list without decoding vertex data.
    pub fn scan_draw_calls(&self, dl: &[u8]) -> Result<Vec<DrawCall>, GXError> {
        let mut reader = Reader {
            data: dl,
            offset: 0,
        };
        let mut draw_calls = Vec::new();
        let mut total_vertex_count = 0;

        while reader.offset < dl.len() {
            let cmd = reader.u8()?;
            if cmd == 0 {
                break;
            }

            let primitive: PrimitiveType = decode_enum("primitive", cmd & 0xF8)?;
            if !matches!(
                primitive,
                PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan
            ) {
                return Err(GXError::UnsupportedPrimitive(primitive));
            }
            // The low 3 bits select a vertex format; a loader handles a single format.

            let vertex_count = reader.u16()? as u32;
            let src_offset = reader.offset;
            reader.bytes(self.layout.source_vertex_stride * vertex_count as usize)?;

            log::trace!(
                "draw call {:?}: {} vertices at {:#X}",
                primitive,
                vertex_count,
                src_offset
            );
            draw_calls.push(DrawCall {
                primitive,
                src_offset,
                vertex_count,
                first_vertex: total_vertex_count,
            });
            total_vertex_count += vertex_count;
        }

        Ok(draw_calls)
    }

    /// Decodes a display list into packed vertex data and a triangle list.
    ///
    /// `arrays` must contain a vertex array for every indexed attribute.
    pub fn run_vertices(
        &self,
        arrays: &VertexArrays<'_>,
        dl: &[u8],
    ) -> Result<LoadedVertexData, GXError> {
        let draw_calls = self.scan_draw_calls(dl)?;

        let total_vertex_count: u32 = draw_calls.iter().map(|c| c.vertex_count).sum();
        if total_vertex_count > u16::MAX as u32 + 1 {
            return Err(GXError::TooManyVertices(total_vertex_count));
        }
        let total_triangle_count: u32 = draw_calls
            .iter()
            .map(|c| c.vertex_count.saturating_sub(2))
            .sum();

        let stride = self.layout.packed_vertex_stride;
        let mut packed_vertex_data = vec![0; stride * total_vertex_count as usize];
        let mut indices = Vec::with_capacity(total_triangle_count as usize * 3);

        for call in &draw_calls {
            let first = call.first_vertex as u16;
            for i in 2..call.vertex_count as u16 {
                let v = first + i;
                let triangle = match call.primitive {
                    _ if i == 2 => [first, first + 1, first + 2],
                    PrimitiveType::TriangleStrip if i % 2 == 1 => [v - 1, v - 2, v],
                    PrimitiveType::TriangleStrip => [v - 2, v - 1, v],
                    _ => [first, v - 1, v],
                };
                indices.extend_from_slice(&triangle);
            }

            let mut reader = Reader {
                data: dl,
                offset: call.src_offset,
            };
            for i in 0..call.vertex_count as usize {
                let vertex_start = (call.first_vertex as usize + i) * stride;
                let vertex = &mut packed_vertex_data[vertex_start..vertex_start + stride];
                for op in &self.ops {
                    let value = match op.source {
                        VattrSource::Direct => reader.bytes(op.size)?,
                        VattrSource::Index8 => {
                            let index = reader.u8()? as u16;
                            read_array_value(arrays, op, index)?
                        }
                        VattrSource::Index16 => {
                            let index = reader.u16()?;
                            read_array_value(arrays, op, index)?
                        }
                    };
                    vertex[op.packed_offset..op.packed_offset + op.size].copy_from_slice(value);
                }
            }
        }

        Ok(LoadedVertexData {
            indices,
            packed_vertex_data,
            packed_vertex_stride: stride,
            total_vertex_count,
            total_triangle_count,
            draw_calls,
        })
    }
}

fn read_array_value<'a>(
    arrays: &VertexArrays<'a>,
    op: &VattrOp,
    index: u16,
) -> Result<&'a [u8], GXError> {
    let array = arrays
        .get(op.attribute)
        .ok_or(GXError::MissingVertexArray(op.attribute))?;
    let start = array.offset + op.size * index as usize;
    array
        .data
        .get(start..start + op.size)
        .ok_or(GXError::VertexArrayOutOfBounds {
            attribute: op.attribute,
            index,
        })
}

/// A cache of compiled vertex loaders, keyed by vertex format.
///
/// Compilation happens under the cache lock, so each format is compiled at most once even
/// when the cache is shared between threads.
#[derive(Debug, Default)]
pub struct VtxLoaderCache {
    loaders: Mutex<HashMap<VtxLoaderDesc, Arc<VtxLoader>>>,
}

impl VtxLoaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached loader for `desc`, compiling it if needed.
    pub fn compile(&self, desc: &VtxLoaderDesc) -> Result<Arc<VtxLoader>, GXError> {
        let mut cache = self.loaders.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(desc) {
            Some(loader) => {
                log::trace!("vertex loader cache hit");
                Ok(Arc::clone(loader))
            }
            None => {
                let loader = Arc::new(compile_vtx_loader(desc)?);
                cache.insert(desc.clone(), loader.clone());
                Ok(loader)
            }
        }
    }

    /// The number of compiled loaders.
    pub fn len(&self) -> usize {
        self.loaders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;
    use crate::{
        gx::{CompCnt, CompType},
        vtx_format::VertexAttributeFormat,
    };

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Position as an 8 bit index into an array of u8 xyz values.
    fn indexed_pos_desc() -> VtxLoaderDesc {
        VtxLoaderDesc::from_attributes(&[(
            VertexAttribute::Pos,
            AttrType::Index8,
            VertexAttributeFormat::new(CompType::U8, CompCnt::POS_XYZ),
        )])
    }

    fn pos_array() -> Vec<u8> {
        (0..16u8).flat_map(|i| [i, i + 100, i + 200]).collect()
    }

    fn draw_call(primitive: PrimitiveType, indices: &[u8]) -> Vec<u8> {
        let mut dl = vec![primitive as u8];
        dl.extend_from_slice(&(indices.len() as u16).to_be_bytes());
        dl.extend_from_slice(indices);
        dl
    }

    #[test]
    fn test_triangle_strip() {
        init_logging();
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let mut dl = draw_call(PrimitiveType::TriangleStrip, &[0, 1, 2, 3, 4]);
        dl.push(0);
        let data = loader.run_vertices(&arrays, &dl).unwrap();

        assert_eq!(data.total_vertex_count, 5);
        assert_eq!(data.total_triangle_count, 3);
        assert_eq!(
            data.triangles().collect::<Vec<_>>(),
            vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]
        );
    }

    #[test]
    fn test_triangle_fan_after_strip() {
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let mut dl = draw_call(PrimitiveType::TriangleStrip, &[0, 1, 2]);
        dl.extend(draw_call(PrimitiveType::TriangleFan, &[5, 6, 7, 8, 9]));
        let data = loader.run_vertices(&arrays, &dl).unwrap();

        assert_eq!(data.total_vertex_count, 8);
        assert_eq!(data.total_triangle_count, 4);
        assert_eq!(
            data.triangles().collect::<Vec<_>>(),
            vec![[0, 1, 2], [3, 4, 5], [3, 5, 6], [3, 6, 7]]
        );
        assert_eq!(data.draw_calls[1].first_vertex, 3);
        assert_eq!(data.draw_calls[1].src_offset, 9);

        // Vertex 3 is the fan's first vertex, which references array element 5
        assert_eq!(&data.vertex(3)[0..3], &[5, 105, 205]);
        assert_eq!(data.packed_vertex_stride, 4);
    }

    #[test]
    fn test_direct_and_index16_attributes() {
        let desc = VtxLoaderDesc::from_attributes(&[
            (
                VertexAttribute::PnMtxIdx,
                AttrType::Direct,
                VertexAttributeFormat::default(),
            ),
            (
                VertexAttribute::Pos,
                AttrType::Index16,
                VertexAttributeFormat::new(CompType::S16, CompCnt::POS_XY),
            ),
            (
                VertexAttribute::Clr0,
                AttrType::Direct,
                VertexAttributeFormat::new(CompType::Rgba8, CompCnt::CLR_RGBA),
            ),
        ]);
        let loader = compile_vtx_loader(&desc).unwrap();
        assert_eq!(loader.layout().source_vertex_stride, 1 + 2 + 4);
        assert_eq!(loader.layout().packed_vertex_stride, 12);

        // 4 byte header before the array contents
        let mut positions = vec![0xEE; 4];
        positions.extend((0..0x220u16).flat_map(|i| i.to_le_bytes()));
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 4);

        let dl = [
            0xA0, 0x00, 0x03, // fan, 3 vertices
            3, 0x01, 0x02, 1, 2, 3, 4, //
            6, 0x00, 0x00, 5, 6, 7, 8, //
            9, 0x00, 0x07, 9, 10, 11, 12, //
        ];
        let data = loader.run_vertices(&arrays, &dl).unwrap();

        assert_eq!(data.indices, vec![0, 1, 2]);
        // Element 0x102 holds the 16 bit values 0x0204 and 0x0205
        assert_eq!(data.vertex(0), &[3, 0, 0x04, 0x02, 0x05, 0x02, 1, 2, 3, 4, 0, 0]);
        assert_eq!(data.vertex(1), &[6, 0, 0, 0, 1, 0, 5, 6, 7, 8, 0, 0]);
        assert_eq!(data.vertex(2), &[9, 0, 14, 0, 15, 0, 9, 10, 11, 12, 0, 0]);
    }

    #[test]
    fn test_end_of_buffer_terminates() {
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let dl = draw_call(PrimitiveType::TriangleFan, &[0, 1, 2]);
        let data = loader.run_vertices(&arrays, &dl).unwrap();
        assert_eq!(data.total_triangle_count, 1);

        let data = loader.run_vertices(&arrays, &[]).unwrap();
        assert_eq!(data.total_vertex_count, 0);
        assert!(data.indices.is_empty());
    }

    #[test]
    fn test_malformed_display_lists() {
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let dl = [0x98, 0x00, 0x05, 0, 1, 2];
        assert_eq!(
            loader.run_vertices(&arrays, &dl),
            Err(GXError::TruncatedDisplayList {
                offset: 3,
                needed: 5
            })
        );

        let dl = [0x98, 0x00];
        assert!(matches!(
            loader.run_vertices(&arrays, &dl),
            Err(GXError::TruncatedDisplayList { .. })
        ));

        let dl = draw_call(PrimitiveType::TriangleStrip, &[0, 1, 16]);
        assert_eq!(
            loader.run_vertices(&arrays, &dl),
            Err(GXError::VertexArrayOutOfBounds {
                attribute: VertexAttribute::Pos,
                index: 16
            })
        );

        let dl = draw_call(PrimitiveType::TriangleStrip, &[0, 1, 2]);
        let error = loader.run_vertices(&VertexArrays::new(), &dl).unwrap_err();
        assert_eq!(error, GXError::MissingVertexArray(VertexAttribute::Pos));
        assert!(error.is_configuration_error());
    }

    #[test]
    fn test_vertex_limit() {
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let strip: Vec<u8> = (0..0x8000u32).map(|i| (i % 16) as u8).collect();
        let mut dl = draw_call(PrimitiveType::TriangleStrip, &strip);
        dl.extend(draw_call(PrimitiveType::TriangleStrip, &strip));
        let data = loader.run_vertices(&arrays, &dl).unwrap();

        assert_eq!(data.total_vertex_count, 0x10000);
        assert_eq!(data.total_triangle_count, 2 * (0x8000 - 2));
        assert_eq!(data.indices.len(), 3 * 2 * (0x8000 - 2));
        assert_eq!(data.indices.iter().max(), Some(&u16::MAX));
        assert_eq!(data.indices[data.indices.len() - 3..], [0xFFFE, 0xFFFD, 0xFFFF]);
        assert_eq!(&data.vertex(0xFFFF)[0..3], &[15, 115, 215]);

        dl.extend(draw_call(PrimitiveType::TriangleFan, &[0]));
        assert_eq!(
            loader.run_vertices(&arrays, &dl),
            Err(GXError::TooManyVertices(0x10001))
        );
    }

    #[test]
    fn test_unsupported_primitives() {
        let loader = compile_vtx_loader(&indexed_pos_desc()).unwrap();
        let positions = pos_array();
        let arrays = VertexArrays::new().with(VertexAttribute::Pos, &positions, 0);

        let dl = draw_call(PrimitiveType::Quads, &[0, 1, 2, 3]);
        assert_eq!(
            loader.run_vertices(&arrays, &dl),
            Err(GXError::UnsupportedPrimitive(PrimitiveType::Quads))
        );

        let error = loader.run_vertices(&arrays, &[0x88, 0, 0]).unwrap_err();
        assert_eq!(
            error,
            GXError::InvalidEnumValue {
                field: "primitive",
                value: 0x88
            }
        );
    }

    #[test]
    fn test_cache_returns_same_loader() {
        let cache = VtxLoaderCache::new();
        let a = cache.compile(&indexed_pos_desc()).unwrap();
        let b = cache.compile(&indexed_pos_desc()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let mut other = indexed_pos_desc();
        other.formats.set(
            VertexAttribute::Pos,
            VertexAttributeFormat::new(CompType::S8, CompCnt::POS_XYZ),
        );
        let c = cache.compile(&other).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_shared_between_threads() {
        let cache = VtxLoaderCache::new();
        let loaders: Vec<Arc<VtxLoader>> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| cache.compile(&indexed_pos_desc()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(cache.len(), 1);
        for loader in &loaders[1..] {
            assert!(Arc::ptr_eq(&loaders[0], loader));
        }
    }

    #[test]
    fn test_cache_does_not_store_failures() {
        let cache = VtxLoaderCache::new();
        let desc = VtxLoaderDesc::from_attributes(&[(
            VertexAttribute::Tex0,
            AttrType::Direct,
            VertexAttributeFormat::new(CompType::F32, CompCnt(3)),
        )]);
        assert!(cache.compile(&desc).is_err());
        assert!(cache.is_empty());
    }
}
