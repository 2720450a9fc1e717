//! Rust types representing GX hardware enumerations.
//!
//! Discriminants match the values the hardware (and asset formats built on it) store, so
//! raw bytes can be decoded with [TryFromPrimitive] via [decode_enum].
//!
//! Note: only the values needed for vertex loading and material compilation are modeled.

#![allow(missing_docs)]

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::GXError;

/// Decodes a raw register value, reporting the offending field on failure.
pub fn decode_enum<T>(field: &'static str, value: T::Primitive) -> Result<T, GXError>
where
    T: TryFromPrimitive,
    T::Primitive: Into<u32>,
{
    T::try_from_primitive(value).map_err(|error| GXError::InvalidEnumValue {
        field,
        value: error.number.into(),
    })
}

/// A vertex attribute slot.
///
/// [VertexAttribute::ALL] lists the slots in the order their data appears in a vertex
/// stream.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum VertexAttribute {
    PnMtxIdx = 0,
    Tex0MtxIdx = 1,
    Tex1MtxIdx = 2,
    Tex2MtxIdx = 3,
    Tex3MtxIdx = 4,
    Tex4MtxIdx = 5,
    Tex5MtxIdx = 6,
    Tex6MtxIdx = 7,
    Tex7MtxIdx = 8,
    Pos = 9,
    Nrm = 10,
    Clr0 = 11,
    Clr1 = 12,
    Tex0 = 13,
    Tex1 = 14,
    Tex2 = 15,
    Tex3 = 16,
    Tex4 = 17,
    Tex5 = 18,
    Tex6 = 19,
    Tex7 = 20,
    Nbt = 25,
}

/// The number of vertex attribute slots.
pub const NUM_VERTEX_ATTRIBUTES: usize = 22;

impl VertexAttribute {
    /// All slots in vertex stream order.
    pub const ALL: [VertexAttribute; NUM_VERTEX_ATTRIBUTES] = [
        Self::PnMtxIdx,
        Self::Tex0MtxIdx,
        Self::Tex1MtxIdx,
        Self::Tex2MtxIdx,
        Self::Tex3MtxIdx,
        Self::Tex4MtxIdx,
        Self::Tex5MtxIdx,
        Self::Tex6MtxIdx,
        Self::Tex7MtxIdx,
        Self::Pos,
        Self::Nrm,
        Self::Nbt,
        Self::Clr0,
        Self::Clr1,
        Self::Tex0,
        Self::Tex1,
        Self::Tex2,
        Self::Tex3,
        Self::Tex4,
        Self::Tex5,
        Self::Tex6,
        Self::Tex7,
    ];

    /// The position of this slot in [VertexAttribute::ALL], used to index attribute tables.
    pub fn index(self) -> usize {
        match self {
            Self::Nbt => 11,
            a if (a as u8) <= Self::Nrm as u8 => a as usize,
            a => a as usize + 1,
        }
    }

    /// True for the position/normal and per-texture matrix index slots.
    pub fn is_matrix_index(self) -> bool {
        (self as u8) <= Self::Tex7MtxIdx as u8
    }

    /// The texture coordinate channel for `Tex0..=Tex7`.
    pub fn tex_channel(self) -> Option<u8> {
        let raw = self as u8;
        if (Self::Tex0 as u8..=Self::Tex7 as u8).contains(&raw) {
            Some(raw - Self::Tex0 as u8)
        } else {
            None
        }
    }
}

/// How a vertex attribute is present in a vertex stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum AttrType {
    None = 0,
    Direct = 1,
    Index8 = 2,
    Index16 = 3,
}

impl Default for AttrType {
    fn default() -> Self {
        Self::None
    }
}

/// The storage type of each component of a vertex attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CompType {
    U8 = 0,
    S8 = 1,
    U16 = 2,
    S16 = 3,
    F32 = 4,
    Rgba8 = 5,
}

impl CompType {
    /// Size of one component in bytes, which is also its alignment.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::S8 | Self::Rgba8 => 1,
            Self::U16 | Self::S16 => 2,
            Self::F32 => 4,
        }
    }
}

impl Default for CompType {
    fn default() -> Self {
        Self::F32
    }
}

/// The component count field of a vertex attribute format.
///
/// The meaning of the value depends on the attribute it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompCnt(pub u8);

impl CompCnt {
    pub const POS_XY: Self = Self(0);
    pub const POS_XYZ: Self = Self(1);
    pub const NRM_XYZ: Self = Self(0);
    pub const NRM_NBT: Self = Self(1);
    pub const NRM_NBT3: Self = Self(2);
    pub const CLR_RGB: Self = Self(0);
    pub const CLR_RGBA: Self = Self(1);
    pub const TEX_S: Self = Self(0);
    pub const TEX_ST: Self = Self(1);
}

/// Primitive topology, stored in the high 5 bits of a display list command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PrimitiveType {
    Quads = 0x80,
    Triangles = 0x90,
    TriangleStrip = 0x98,
    TriangleFan = 0xA0,
    Lines = 0xA8,
    LineStrip = 0xB0,
    Points = 0xB8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CullMode {
    None = 0,
    Front = 1,
    Back = 2,
    All = 3,
}

impl Default for CullMode {
    fn default() -> Self {
        Self::Back
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CompareType {
    Never = 0,
    Less = 1,
    Equal = 2,
    LEqual = 3,
    Greater = 4,
    NEqual = 5,
    GEqual = 6,
    Always = 7,
}

impl CompareType {
    /// Evaluates `lhs <op> rhs`.
    pub fn compare(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Self::Never => false,
            Self::Less => lhs < rhs,
            Self::Equal => lhs == rhs,
            Self::LEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::NEqual => lhs != rhs,
            Self::GEqual => lhs >= rhs,
            Self::Always => true,
        }
    }
}

impl Default for CompareType {
    fn default() -> Self {
        Self::Always
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum AlphaOp {
    And = 0,
    Or = 1,
    Xor = 2,
    Xnor = 3,
}

impl AlphaOp {
    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a != b,
            Self::Xnor => a == b,
        }
    }
}

impl Default for AlphaOp {
    fn default() -> Self {
        Self::And
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum BlendMode {
    None = 0,
    Blend = 1,
    Logic = 2,
    Subtract = 3,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::None
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum BlendFactor {
    Zero = 0,
    One = 1,
    SrcClr = 2,
    InvSrcClr = 3,
    SrcAlpha = 4,
    InvSrcAlpha = 5,
    DstAlpha = 6,
    InvDstAlpha = 7,
}

impl Default for BlendFactor {
    fn default() -> Self {
        Self::One
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum LogicOp {
    Clear = 0,
    And = 1,
    RevAnd = 2,
    Copy = 3,
    InvAnd = 4,
    NoOp = 5,
    Xor = 6,
    Or = 7,
    Nor = 8,
    Equiv = 9,
    Inv = 10,
    RevOr = 11,
    InvCopy = 12,
    InvOr = 13,
    Nand = 14,
    Set = 15,
}

impl Default for LogicOp {
    fn default() -> Self {
        Self::Copy
    }
}

/// Where a lighting channel takes its material or ambient color from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum ColorSrc {
    Reg = 0,
    Vtx = 1,
}

impl Default for ColorSrc {
    fn default() -> Self {
        Self::Reg
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TexGenType {
    Mtx3x4 = 0,
    Mtx2x4 = 1,
    Bump0 = 2,
    Bump1 = 3,
    Bump2 = 4,
    Bump3 = 5,
    Bump4 = 6,
    Bump5 = 7,
    Bump6 = 8,
    Bump7 = 9,
    Srtg = 10,
}

impl Default for TexGenType {
    fn default() -> Self {
        Self::Mtx2x4
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TexGenSrc {
    Pos = 0,
    Nrm = 1,
    Binrm = 2,
    Tangent = 3,
    Tex0 = 4,
    Tex1 = 5,
    Tex2 = 6,
    Tex3 = 7,
    Tex4 = 8,
    Tex5 = 9,
    Tex6 = 10,
    Tex7 = 11,
    TexCoord0 = 12,
    TexCoord1 = 13,
    TexCoord2 = 14,
    TexCoord3 = 15,
    TexCoord4 = 16,
    TexCoord5 = 17,
    TexCoord6 = 18,
    Color0 = 19,
    Color1 = 20,
}

impl Default for TexGenSrc {
    fn default() -> Self {
        Self::Tex0
    }
}

/// The matrix a texture coordinate generator transforms its source by.
///
/// Texture matrices are spaced three rows apart, matching the hardware's matrix memory
/// addressing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TexGenMatrix {
    PnMtx0 = 0,
    PnMtx1 = 3,
    PnMtx2 = 6,
    PnMtx3 = 9,
    PnMtx4 = 12,
    PnMtx5 = 15,
    PnMtx6 = 18,
    PnMtx7 = 21,
    PnMtx8 = 24,
    PnMtx9 = 27,
    TexMtx0 = 30,
    TexMtx1 = 33,
    TexMtx2 = 36,
    TexMtx3 = 39,
    TexMtx4 = 42,
    TexMtx5 = 45,
    TexMtx6 = 48,
    TexMtx7 = 51,
    TexMtx8 = 54,
    TexMtx9 = 57,
    Identity = 60,
}

impl TexGenMatrix {
    /// The texture matrix index for `TexMtx0..=TexMtx9`.
    pub fn tex_mtx_index(self) -> Option<u8> {
        let raw = self as u8;
        if (Self::TexMtx0 as u8..=Self::TexMtx9 as u8).contains(&raw) {
            Some((raw - Self::TexMtx0 as u8) / 3)
        } else {
            None
        }
    }
}

impl Default for TexGenMatrix {
    fn default() -> Self {
        Self::Identity
    }
}

/// A post-transform matrix id: `PTTEXMTX0` is 64, each matrix three rows after the last,
/// and 125 is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostTexGenMatrix(pub u8);

impl PostTexGenMatrix {
    pub const PT_TEX_MTX0: Self = Self(64);
    pub const PT_IDENTITY: Self = Self(125);
    pub const NUM_MATRICES: u8 = 20;

    pub fn pt_tex_mtx(index: u8) -> Self {
        Self(Self::PT_TEX_MTX0.0 + index * 3)
    }

    /// The post-transform matrix index, or `None` for the identity.
    pub fn index(self) -> Result<Option<u8>, GXError> {
        if self == Self::PT_IDENTITY {
            return Ok(None);
        }
        let offset = self.0.wrapping_sub(Self::PT_TEX_MTX0.0);
        if self.0 < Self::PT_TEX_MTX0.0 || offset % 3 != 0 || offset / 3 >= Self::NUM_MATRICES {
            return Err(GXError::InvalidEnumValue {
                field: "post_matrix",
                value: self.0 as u32,
            });
        }
        Ok(Some(offset / 3))
    }
}

impl Default for PostTexGenMatrix {
    fn default() -> Self {
        Self::PT_IDENTITY
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum IndTexScale {
    S1 = 0,
    S2 = 1,
    S4 = 2,
    S8 = 3,
    S16 = 4,
    S32 = 5,
    S64 = 6,
    S128 = 7,
    S256 = 8,
}

impl IndTexScale {
    /// The divisor applied to the texture coordinate, `1 << n`.
    pub fn divisor(self) -> u32 {
        1 << (self as u8)
    }
}

impl Default for IndTexScale {
    fn default() -> Self {
        Self::S1
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum IndTexFormat {
    F8 = 0,
    F5 = 1,
    F4 = 2,
    F3 = 3,
}

impl Default for IndTexFormat {
    fn default() -> Self {
        Self::F8
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum IndTexBiasSel {
    None = 0,
    S = 1,
    T = 2,
    St = 3,
    U = 4,
    Su = 5,
    Tu = 6,
    Stu = 7,
}

impl IndTexBiasSel {
    /// Which of the s, t and u components receive the bias.
    pub fn components(self) -> [bool; 3] {
        let bits = self as u8;
        [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0]
    }
}

impl Default for IndTexBiasSel {
    fn default() -> Self {
        Self::None
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum IndTexWrap {
    Off = 0,
    W256 = 1,
    W128 = 2,
    W64 = 3,
    W32 = 4,
    W16 = 5,
    W0 = 6,
}

impl IndTexWrap {
    /// The modulus for power-of-two wraps. `Off` and `W0` have none.
    pub fn modulus(self) -> Option<u32> {
        match self {
            Self::Off | Self::W0 => None,
            wrap => Some(512 >> (wrap as u8)),
        }
    }
}

impl Default for IndTexWrap {
    fn default() -> Self {
        Self::Off
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum IndTexMtxId {
    Off = 0,
    M0 = 1,
    M1 = 2,
    M2 = 3,
    S0 = 5,
    S1 = 6,
    S2 = 7,
    T0 = 9,
    T1 = 10,
    T2 = 11,
}

impl Default for IndTexMtxId {
    fn default() -> Self {
        Self::Off
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CombineColorInput {
    CPrev = 0,
    APrev = 1,
    C0 = 2,
    A0 = 3,
    C1 = 4,
    A1 = 5,
    C2 = 6,
    A2 = 7,
    TexC = 8,
    TexA = 9,
    RasC = 10,
    RasA = 11,
    One = 12,
    Half = 13,
    Konst = 14,
    Zero = 15,
}

impl Default for CombineColorInput {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CombineAlphaInput {
    APrev = 0,
    A0 = 1,
    A1 = 2,
    A2 = 3,
    TexA = 4,
    RasA = 5,
    Konst = 6,
    Zero = 7,
}

impl Default for CombineAlphaInput {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TevOp {
    Add = 0,
    Sub = 1,
    CompR8Gt = 8,
    CompR8Eq = 9,
    CompGr16Gt = 10,
    CompGr16Eq = 11,
    CompBgr24Gt = 12,
    CompBgr24Eq = 13,
    CompRgb8Gt = 14,
    CompRgb8Eq = 15,
}

impl Default for TevOp {
    fn default() -> Self {
        Self::Add
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TevBias {
    Zero = 0,
    AddHalf = 1,
    SubHalf = 2,
}

impl TevBias {
    pub fn value(self) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::AddHalf => 0.5,
            Self::SubHalf => -0.5,
        }
    }
}

impl Default for TevBias {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TevScale {
    Scale1 = 0,
    Scale2 = 1,
    Scale4 = 2,
    Divide2 = 3,
}

impl TevScale {
    pub fn value(self) -> f32 {
        match self {
            Self::Scale1 => 1.0,
            Self::Scale2 => 2.0,
            Self::Scale4 => 4.0,
            Self::Divide2 => 0.5,
        }
    }
}

impl Default for TevScale {
    fn default() -> Self {
        Self::Scale1
    }
}

/// A TEV output register.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Register {
    Prev = 0,
    Reg0 = 1,
    Reg1 = 2,
    Reg2 = 3,
}

impl Default for Register {
    fn default() -> Self {
        Self::Prev
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum RasColorChannelId {
    Color0 = 0,
    Color1 = 1,
    Alpha0 = 2,
    Alpha1 = 3,
    Color0A0 = 4,
    Color1A1 = 5,
    ColorZero = 6,
    AlphaBump = 7,
    AlphaBumpN = 8,
    ColorNull = 0xFF,
}

impl Default for RasColorChannelId {
    fn default() -> Self {
        Self::ColorNull
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum KonstColorSel {
    Const1 = 0x00,
    Const7_8 = 0x01,
    Const3_4 = 0x02,
    Const5_8 = 0x03,
    Const1_2 = 0x04,
    Const3_8 = 0x05,
    Const1_4 = 0x06,
    Const1_8 = 0x07,
    K0 = 0x0C,
    K1 = 0x0D,
    K2 = 0x0E,
    K3 = 0x0F,
    K0R = 0x10,
    K1R = 0x11,
    K2R = 0x12,
    K3R = 0x13,
    K0G = 0x14,
    K1G = 0x15,
    K2G = 0x16,
    K3G = 0x17,
    K0B = 0x18,
    K1B = 0x19,
    K2B = 0x1A,
    K3B = 0x1B,
    K0A = 0x1C,
    K1A = 0x1D,
    K2A = 0x1E,
    K3A = 0x1F,
}

impl Default for KonstColorSel {
    fn default() -> Self {
        Self::Const1
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum KonstAlphaSel {
    Const1 = 0x00,
    Const7_8 = 0x01,
    Const3_4 = 0x02,
    Const5_8 = 0x03,
    Const1_2 = 0x04,
    Const3_8 = 0x05,
    Const1_4 = 0x06,
    Const1_8 = 0x07,
    K0R = 0x10,
    K1R = 0x11,
    K2R = 0x12,
    K3R = 0x13,
    K0G = 0x14,
    K1G = 0x15,
    K2G = 0x16,
    K3G = 0x17,
    K0B = 0x18,
    K1B = 0x19,
    K2B = 0x1A,
    K3B = 0x1B,
    K0A = 0x1C,
    K1A = 0x1D,
    K2A = 0x1E,
    K3A = 0x1F,
}

impl Default for KonstAlphaSel {
    fn default() -> Self {
        Self::Const1
    }
}

/// A texture map slot, or `None` for `TEXMAP_NULL` (0xFF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TexMapId(pub Option<u8>);

impl TexMapId {
    pub const NULL: Self = Self(None);
    pub const NUM_TEXTURES: u8 = 8;

    pub fn from_raw(raw: u8) -> Result<Self, GXError> {
        match raw {
            0xFF => Ok(Self::NULL),
            0..=7 => Ok(Self(Some(raw))),
            _ => Err(GXError::InvalidEnumValue {
                field: "tex_map",
                value: raw as u32,
            }),
        }
    }
}

/// A texture coordinate slot, or `None` for `TEXCOORD_NULL` (0xFF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TexCoordId(pub Option<u8>);

impl TexCoordId {
    pub const NULL: Self = Self(None);

    pub fn from_raw(raw: u8) -> Result<Self, GXError> {
        match raw {
            0xFF => Ok(Self::NULL),
            0..=7 => Ok(Self(Some(raw))),
            _ => Err(GXError::InvalidEnumValue {
                field: "tex_coord",
                value: raw as u32,
            }),
        }
    }
}
