//! Conversion of compiled programs and render flags into wgpu pipeline state.

#![allow(missing_docs)]

use crate::{
    gx::CompareType,
    program::GXProgram,
    render_flags::{BlendFactorFlag, BlendOperation, CullFace, FrontFace, RenderFlags},
};

/// The primitive state for drawing triangle lists with the given flags.
///
/// Returns `None` if both faces are culled, in which case nothing should be drawn.
pub fn primitive_state(flags: &RenderFlags) -> Option<wgpu::PrimitiveState> {
    let cull_mode = match flags.cull_face {
        CullFace::FrontAndBack => return None,
        CullFace::None => None,
        CullFace::Front => Some(wgpu::Face::Front),
        CullFace::Back => Some(wgpu::Face::Back),
    };
    Some(wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: match flags.front_face {
            FrontFace::Cw => wgpu::FrontFace::Cw,
            FrontFace::Ccw => wgpu::FrontFace::Ccw,
        },
        cull_mode,
        ..Default::default()
    })
}

pub fn compare_function(compare: CompareType) -> wgpu::CompareFunction {
    match compare {
        CompareType::Never => wgpu::CompareFunction::Never,
        CompareType::Less => wgpu::CompareFunction::Less,
        CompareType::Equal => wgpu::CompareFunction::Equal,
        CompareType::LEqual => wgpu::CompareFunction::LessEqual,
        CompareType::Greater => wgpu::CompareFunction::Greater,
        CompareType::NEqual => wgpu::CompareFunction::NotEqual,
        CompareType::GEqual => wgpu::CompareFunction::GreaterEqual,
        CompareType::Always => wgpu::CompareFunction::Always,
    }
}

pub fn depth_stencil_state(
    flags: &RenderFlags,
    format: wgpu::TextureFormat,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: flags.depth_write,
        depth_compare: if flags.depth_test {
            compare_function(flags.depth_compare)
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn blend_factor(factor: BlendFactorFlag) -> wgpu::BlendFactor {
    match factor {
        BlendFactorFlag::Zero => wgpu::BlendFactor::Zero,
        BlendFactorFlag::One => wgpu::BlendFactor::One,
        BlendFactorFlag::SrcColor => wgpu::BlendFactor::Src,
        BlendFactorFlag::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactorFlag::DstColor => wgpu::BlendFactor::Dst,
        BlendFactorFlag::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactorFlag::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactorFlag::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactorFlag::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactorFlag::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

pub fn blend_state(flags: &RenderFlags) -> Option<wgpu::BlendState> {
    flags.blend.map(|blend| {
        let component = wgpu::BlendComponent {
            src_factor: blend_factor(blend.src_factor),
            dst_factor: blend_factor(blend.dst_factor),
            operation: match blend.operation {
                BlendOperation::Add => wgpu::BlendOperation::Add,
                BlendOperation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
            },
        };
        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    })
}

pub fn color_target_state(
    flags: &RenderFlags,
    format: wgpu::TextureFormat,
) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: blend_state(flags),
        write_mask: wgpu::ColorWrites::all(),
    }
}

/// Creates the vertex and fragment shader modules for a program.
pub fn create_shader_modules(
    device: &wgpu::Device,
    program: &GXProgram,
) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} vertex", program.name)),
        source: wgpu::ShaderSource::Wgsl(program.vertex_source.as_str().into()),
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} fragment", program.name)),
        source: wgpu::ShaderSource::Wgsl(program.fragment_source.as_str().into()),
    });
    (vertex, fragment)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        gx::{BlendFactor, BlendMode, CullMode},
        material::GXMaterial,
        render_flags::translate_render_flags,
    };

    #[test]
    fn test_cull_all_draws_nothing() {
        let material = GXMaterial {
            cull_mode: CullMode::All,
            ..Default::default()
        };
        let flags = translate_render_flags(&material).unwrap();
        assert_eq!(primitive_state(&flags), None);

        let flags = translate_render_flags(&GXMaterial::default()).unwrap();
        let state = primitive_state(&flags).unwrap();
        assert_eq!(state.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(state.front_face, wgpu::FrontFace::Cw);
    }

    #[test]
    fn test_blend_and_depth() {
        let mut material = GXMaterial::default();
        material.rop.blend_mode.mode = BlendMode::Blend;
        material.rop.blend_mode.src_factor = BlendFactor::SrcClr;
        material.rop.blend_mode.dst_factor = BlendFactor::InvSrcAlpha;
        material.rop.depth_test = false;
        let flags = translate_render_flags(&material).unwrap();

        let blend = blend_state(&flags).unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::Dst);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);

        let depth = depth_stencil_state(&flags, wgpu::TextureFormat::Depth24Plus);
        assert_eq!(depth.depth_compare, wgpu::CompareFunction::Always);
        assert!(depth.depth_write_enabled);
    }
}
