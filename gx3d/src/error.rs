#![allow(missing_docs)]

use core::fmt;
use std::error;

use crate::gx::{
    BlendMode, CompCnt, IndTexFormat, IndTexMtxId, PrimitiveType, RasColorChannelId, TevOp,
    TexGenType, VertexAttribute,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GXError {
    // Configuration errors
    InvalidEnumValue {
        field: &'static str,
        value: u32,
    },
    UnsupportedPrimitive(PrimitiveType),
    UnsupportedComponentCount {
        attribute: VertexAttribute,
        count: CompCnt,
    },
    MissingVertexArray(VertexAttribute),
    UnsupportedTexGenType(TexGenType),
    UnsupportedTevOp(TevOp),
    UnsupportedRasChannel(RasColorChannelId),
    UnsupportedIndTexFormat(IndTexFormat),
    UnsupportedIndTexMatrix(IndTexMtxId),
    UnsupportedBlendMode(BlendMode),
    InvalidIndTexStage {
        tev_stage: usize,
        ind_tex_stage: u8,
    },
    NonFiniteConstant {
        field: &'static str,
    },

    // Malformed input
    TruncatedDisplayList {
        offset: usize,
        needed: usize,
    },
    VertexArrayOutOfBounds {
        attribute: VertexAttribute,
        index: u16,
    },
    TooManyVertices(u32),
    IndexOutOfRange {
        index: u16,
        vertex_count: u32,
    },
    MismatchedVertexStride {
        expected: usize,
        actual: usize,
    },
    NotLz77,
    TruncatedLz77 {
        offset: usize,
    },
    InvalidLz77BackReference {
        distance: usize,
        position: usize,
    },

    Format(fmt::Error),
}

impl GXError {
    /// True for errors caused by an unsupported or inconsistent configuration, as opposed
    /// to malformed input data.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            GXError::TruncatedDisplayList { .. }
                | GXError::VertexArrayOutOfBounds { .. }
                | GXError::TooManyVertices(_)
                | GXError::IndexOutOfRange { .. }
                | GXError::MismatchedVertexStride { .. }
                | GXError::NotLz77
                | GXError::TruncatedLz77 { .. }
                | GXError::InvalidLz77BackReference { .. }
                | GXError::Format(_)
        )
    }
}

impl fmt::Display for GXError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GXError::InvalidEnumValue { field, value } => {
                write!(f, "invalid value for {}: {:#X}", field, value)
            }
            GXError::UnsupportedPrimitive(primitive) => {
                write!(f, "unsupported primitive type: {:?}", primitive)
            }
            GXError::UnsupportedComponentCount { attribute, count } => {
                write!(
                    f,
                    "unsupported component count for {:?}: {}",
                    attribute, count.0
                )
            }
            GXError::MissingVertexArray(attribute) => {
                write!(f, "indexed attribute {:?} has no vertex array", attribute)
            }
            GXError::UnsupportedTexGenType(ty) => write!(f, "unsupported texgen type: {:?}", ty),
            GXError::UnsupportedTevOp(op) => write!(f, "unsupported tev op: {:?}", op),
            GXError::UnsupportedRasChannel(channel) => {
                write!(f, "unsupported rasterized color channel: {:?}", channel)
            }
            GXError::UnsupportedIndTexFormat(format) => {
                write!(f, "unsupported indirect texture format: {:?}", format)
            }
            GXError::UnsupportedIndTexMatrix(matrix) => {
                write!(f, "unsupported indirect texture matrix: {:?}", matrix)
            }
            GXError::UnsupportedBlendMode(mode) => write!(f, "unsupported blend mode: {:?}", mode),
            GXError::InvalidIndTexStage {
                tev_stage,
                ind_tex_stage,
            } => write!(
                f,
                "tev stage {} references missing indirect stage {}",
                tev_stage, ind_tex_stage
            ),
            GXError::NonFiniteConstant { field } => write!(f, "non-finite constant in {}", field),
            GXError::TruncatedDisplayList { offset, needed } => write!(
                f,
                "display list truncated: needed {} bytes at offset {:#X}",
                needed, offset
            ),
            GXError::VertexArrayOutOfBounds { attribute, index } => write!(
                f,
                "index {} out of bounds for {:?} vertex array",
                index, attribute
            ),
            GXError::TooManyVertices(n) => {
                write!(f, "too many vertices for 16 bit indices: {}", n)
            }
            GXError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "index {} out of range for {} vertices",
                index, vertex_count
            ),
            GXError::MismatchedVertexStride { expected, actual } => write!(
                f,
                "cannot coalesce vertex data with stride {} into stride {}",
                actual, expected
            ),
            GXError::NotLz77 => write!(f, "missing LZ77 header"),
            GXError::TruncatedLz77 { offset } => {
                write!(f, "LZ77 stream truncated at offset {:#X}", offset)
            }
            GXError::InvalidLz77BackReference { distance, position } => write!(
                f,
                "LZ77 back reference of distance {} at output position {}",
                distance, position
            ),
            GXError::Format(error) => write!(f, "{}", error),
        }
    }
}

impl error::Error for GXError {}

impl From<fmt::Error> for GXError {
    fn from(v: fmt::Error) -> Self {
        Self::Format(v)
    }
}
