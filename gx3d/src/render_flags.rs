//! Render state derived from a material's cull mode and raster output settings.

#![allow(missing_docs)]

use crate::{
    gx::{BlendFactor, BlendMode, CompareType, CullMode},
    material::GXMaterial,
    GXError,
};

/// The framebuffer size texture LOD selection is calibrated for.
pub const REFERENCE_FRAMEBUFFER_SIZE: [u32; 2] = [640, 528];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullFace {
    None,
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    Add,
    ReverseSubtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactorFlag {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// `src_factor * src <operation> dst_factor * dst`, applied to color and alpha alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub operation: BlendOperation,
    pub src_factor: BlendFactorFlag,
    pub dst_factor: BlendFactorFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderFlags {
    pub cull_face: CullFace,
    pub front_face: FrontFace,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare: CompareType,
    /// `None` disables blending.
    pub blend: Option<BlendState>,
}

fn translate_cull_mode(cull_mode: CullMode) -> CullFace {
    match cull_mode {
        CullMode::All => CullFace::FrontAndBack,
        CullMode::Front => CullFace::Front,
        CullMode::Back => CullFace::Back,
        CullMode::None => CullFace::None,
    }
}

// The source factor reads the destination color in place of the source color, and the
// destination factor the reverse.
fn translate_blend_src_factor(factor: BlendFactor) -> BlendFactorFlag {
    match factor {
        BlendFactor::Zero => BlendFactorFlag::Zero,
        BlendFactor::One => BlendFactorFlag::One,
        BlendFactor::SrcClr => BlendFactorFlag::DstColor,
        BlendFactor::InvSrcClr => BlendFactorFlag::OneMinusDstColor,
        BlendFactor::SrcAlpha => BlendFactorFlag::SrcAlpha,
        BlendFactor::InvSrcAlpha => BlendFactorFlag::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => BlendFactorFlag::DstAlpha,
        BlendFactor::InvDstAlpha => BlendFactorFlag::OneMinusDstAlpha,
    }
}

fn translate_blend_dst_factor(factor: BlendFactor) -> BlendFactorFlag {
    match factor {
        BlendFactor::Zero => BlendFactorFlag::Zero,
        BlendFactor::One => BlendFactorFlag::One,
        BlendFactor::SrcClr => BlendFactorFlag::SrcColor,
        BlendFactor::InvSrcClr => BlendFactorFlag::OneMinusSrcColor,
        BlendFactor::SrcAlpha => BlendFactorFlag::SrcAlpha,
        BlendFactor::InvSrcAlpha => BlendFactorFlag::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => BlendFactorFlag::DstAlpha,
        BlendFactor::InvDstAlpha => BlendFactorFlag::OneMinusDstAlpha,
    }
}

/// Computes the render state for a material. Logic op blending is not supported.
pub fn translate_render_flags(material: &GXMaterial) -> Result<RenderFlags, GXError> {
    let rop = &material.rop;
    let blend = match rop.blend_mode.mode {
        BlendMode::None => None,
        BlendMode::Blend => Some(BlendState {
            operation: BlendOperation::Add,
            src_factor: translate_blend_src_factor(rop.blend_mode.src_factor),
            dst_factor: translate_blend_dst_factor(rop.blend_mode.dst_factor),
        }),
        BlendMode::Subtract => Some(BlendState {
            operation: BlendOperation::ReverseSubtract,
            src_factor: BlendFactorFlag::One,
            dst_factor: BlendFactorFlag::One,
        }),
        mode @ BlendMode::Logic => return Err(GXError::UnsupportedBlendMode(mode)),
    };

    Ok(RenderFlags {
        cull_face: translate_cull_mode(material.cull_mode),
        front_face: FrontFace::Cw,
        depth_test: rop.depth_test,
        depth_write: rop.depth_write,
        depth_compare: rop.depth_func,
        blend,
    })
}

/// The LOD bias that makes texture level selection at the given viewport size match the
/// reference framebuffer size.
pub fn texture_lod_bias(viewport_width: u32, viewport_height: u32) -> f32 {
    let [ref_width, ref_height] = REFERENCE_FRAMEBUFFER_SIZE;
    let scale_x = viewport_width as f32 / ref_width as f32;
    let scale_y = viewport_height as f32 / ref_height as f32;
    scale_x.min(scale_y).log2()
}
