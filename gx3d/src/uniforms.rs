//! The uniform blocks read by generated programs.
//!
//! All three blocks live in bind group 0: [SceneParams] at binding 0, [MaterialParams] at
//! binding 1 and [PacketParams] at binding 2. The layouts match the WGSL struct
//! declarations emitted by [crate::compile_material] byte for byte.

#![allow(missing_docs)]

use bytemuck::{Pod, Zeroable};

use crate::material::{Color, GXMaterial};

pub const NUM_TEX_MATRICES: usize = 10;
pub const NUM_POST_TEX_MATRICES: usize = 20;
pub const NUM_TEXTURES: usize = 8;
pub const NUM_IND_TEX_MATRICES: usize = 3;
pub const NUM_POS_MATRICES: usize = 10;

/// A 3x4 affine matrix stored as three rows, applied as `dot(row, vec4(v, 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Mat4x3 {
    pub rows: [[f32; 4]; 3],
}

impl Mat4x3 {
    pub fn identity() -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }
}

impl Default for Mat4x3 {
    fn default() -> Self {
        Self::identity()
    }
}

/// A 2x4 matrix stored as two rows, used for indirect texture offsets.
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct Mat4x2 {
    pub rows: [[f32; 4]; 2],
}

impl Mat4x2 {
    pub fn identity() -> Self {
        Self {
            rows: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
        }
    }
}

impl Default for Mat4x2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-frame parameters.
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct SceneParams {
    /// Column major projection matrix.
    pub projection: [[f32; 4]; 4],
    /// `x` is the global texture LOD bias.
    pub misc0: [f32; 4],
}

impl SceneParams {
    pub fn new(projection: [[f32; 4]; 4], lod_bias: f32) -> Self {
        Self {
            projection,
            misc0: [lod_bias, 0.0, 0.0, 0.0],
        }
    }
}

/// Per-material parameters.
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct MaterialParams {
    pub color_mat_reg: [Color; 2],
    pub color_amb_reg: [Color; 2],
    pub konst_color: [Color; 4],
    /// Initial TEV register values: PREV, REG0, REG1, REG2.
    pub color: [Color; 4],
    pub tex_mtx: [Mat4x3; NUM_TEX_MATRICES],
    pub post_tex_mtx: [Mat4x3; NUM_POST_TEX_MATRICES],
    /// Per texture map: `xy` is the texture size in texels, `w` is the texture's LOD bias.
    pub texture_params: [[f32; 4]; NUM_TEXTURES],
    pub ind_tex_mtx: [Mat4x2; NUM_IND_TEX_MATRICES],
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color_mat_reg: [[1.0; 4]; 2],
            color_amb_reg: [[0.0; 4]; 2],
            konst_color: [[1.0; 4]; 4],
            color: [[0.0; 4]; 4],
            tex_mtx: [Mat4x3::identity(); NUM_TEX_MATRICES],
            post_tex_mtx: [Mat4x3::identity(); NUM_POST_TEX_MATRICES],
            texture_params: [[1.0, 1.0, 0.0, 0.0]; NUM_TEXTURES],
            ind_tex_mtx: [Mat4x2::identity(); NUM_IND_TEX_MATRICES],
        }
    }
}

impl MaterialParams {
    /// Fills the color registers from a material. Matrices are identity and textures are
    /// 1x1 until set by the caller.
    pub fn from_material(material: &GXMaterial) -> Self {
        Self {
            color_mat_reg: material.color_mat_regs,
            color_amb_reg: material.color_amb_regs,
            konst_color: material.konst_colors,
            color: material.color_registers,
            ..Default::default()
        }
    }

    /// Sets the size and LOD bias of a texture map.
    pub fn set_texture(&mut self, tex_map: u8, width: u32, height: u32, lod_bias: f32) {
        self.texture_params[tex_map as usize] = [width as f32, height as f32, 0.0, lod_bias];
    }
}

/// Per-draw parameters.
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct PacketParams {
    /// Position matrices, selected by `pn_mtx_idx / 3`.
    pub pos_mtx: [Mat4x3; NUM_POS_MATRICES],
}

impl Default for PacketParams {
    fn default() -> Self {
        Self {
            pos_mtx: [Mat4x3::identity(); NUM_POS_MATRICES],
        }
    }
}
