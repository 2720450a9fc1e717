//! Output buffers produced by vertex loaders.

#![allow(missing_docs)]

use bytemuck::cast_slice;
use derivative::Derivative;

use crate::{gx::PrimitiveType, GXError};

/// One draw call recorded while scanning a display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCall {
    pub primitive: PrimitiveType,
    /// Offset of the draw call's first vertex data in the display list.
    pub src_offset: usize,
    pub vertex_count: u32,
    /// Index of the draw call's first vertex in the packed vertex buffer.
    pub first_vertex: u32,
}

/// Vertex and index data produced by a [crate::vtx_loader::VtxLoader].
///
/// The vertex data is interleaved with stride `packed_vertex_stride`, and the indices
/// form a triangle list.
#[derive(Clone, PartialEq, Eq, Default, Derivative)]
#[derivative(Debug)]
pub struct LoadedVertexData {
    /// Triangle list indices into the packed vertices.
    #[derivative(Debug = "ignore")]
    pub indices: Vec<u16>,
    #[derivative(Debug = "ignore")]
    pub packed_vertex_data: Vec<u8>,
    pub packed_vertex_stride: usize,
    pub total_vertex_count: u32,
    pub total_triangle_count: u32,
    /// The draw calls the data was built from, in display list order.
    pub draw_calls: Vec<DrawCall>,
}

impl LoadedVertexData {
    /// The index buffer as bytes (native byte order).
    pub fn index_data(&self) -> &[u8] {
        cast_slice(&self.indices)
    }

    /// The packed bytes of one vertex.
    pub fn vertex(&self, index: usize) -> &[u8] {
        let start = index * self.packed_vertex_stride;
        &self.packed_vertex_data[start..start + self.packed_vertex_stride]
    }

    /// The triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Concatenates several loaded vertex datas into one.
///
/// The indices and draw calls of each input are rebased by the total vertex count of the
/// inputs before it. All inputs must share a vertex stride.
pub fn coalesce_loaded_datas(datas: &[LoadedVertexData]) -> Result<LoadedVertexData, GXError> {
    let packed_vertex_stride = datas.first().map_or(0, |d| d.packed_vertex_stride);
    let mut result = LoadedVertexData {
        packed_vertex_stride,
        ..Default::default()
    };

    for data in datas {
        if data.packed_vertex_stride != packed_vertex_stride {
            return Err(GXError::MismatchedVertexStride {
                expected: packed_vertex_stride,
                actual: data.packed_vertex_stride,
            });
        }

        let base = result.total_vertex_count;
        let total_vertex_count = base + data.total_vertex_count;
        if total_vertex_count > u16::MAX as u32 + 1 {
            return Err(GXError::TooManyVertices(total_vertex_count));
        }

        result.indices.reserve(data.indices.len());
        for &index in &data.indices {
            if index as u32 >= data.total_vertex_count {
                return Err(GXError::IndexOutOfRange {
                    index,
                    vertex_count: data.total_vertex_count,
                });
            }
            // Below the combined vertex count, so at most u16::MAX
            result.indices.push(index + base as u16);
        }
        result
            .packed_vertex_data
            .extend_from_slice(&data.packed_vertex_data);
        result
            .draw_calls
            .extend(data.draw_calls.iter().map(|call| DrawCall {
                first_vertex: call.first_vertex + base,
                ..*call
            }));
        result.total_vertex_count = total_vertex_count;
        result.total_triangle_count += data.total_triangle_count;
    }

    Ok(result)
}
