//! The declarative material description consumed by [crate::compile_material].

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::gx::*;

/// An RGBA color with components normally in [0, 1].
pub type Color = [f32; 4];

/// A complete GX material: lighting channels, texture coordinate generation, indirect
/// texturing, TEV combiner stages, alpha test and render state.
///
/// Equal materials always compile to identical programs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GXMaterial {
    pub name: String,
    pub cull_mode: CullMode,
    /// Color channels 0 and 1. Missing channels output zero.
    pub light_channels: Vec<LightChannelControl>,
    /// Texture coordinate generators, producing `tex_coord0..`.
    pub tex_gens: Vec<TexGen>,
    pub ind_tex_stages: Vec<IndTexStage>,
    pub tev_stages: Vec<TevStage>,
    pub alpha_test: AlphaTest,
    /// Initial values of the PREV, REG0, REG1 and REG2 TEV registers.
    pub color_registers: [Color; 4],
    pub konst_colors: [Color; 4],
    /// Material colors used by channels with a register material source.
    pub color_mat_regs: [Color; 2],
    /// Ambient colors used by lit channels with a register ambient source.
    pub color_amb_regs: [Color; 2],
    pub rop: RopInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorChannelControl {
    pub lighting_enabled: bool,
    pub mat_color_source: ColorSrc,
    pub amb_color_source: ColorSrc,
}

/// Color and alpha control for one color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightChannelControl {
    pub color: ColorChannelControl,
    pub alpha: ColorChannelControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TexGen {
    pub gen_type: TexGenType,
    pub source: TexGenSrc,
    pub matrix: TexGenMatrix,
    pub normalize: bool,
    pub post_matrix: PostTexGenMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndTexStage {
    pub tex_coord_id: TexCoordId,
    pub tex_map: TexMapId,
    pub scale_s: IndTexScale,
    pub scale_t: IndTexScale,
}

/// One TEV combiner stage.
///
/// Color and alpha are configured independently; the texture and rasterized color
/// selections are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TevStage {
    pub color_in_a: CombineColorInput,
    pub color_in_b: CombineColorInput,
    pub color_in_c: CombineColorInput,
    pub color_in_d: CombineColorInput,
    pub color_op: TevOp,
    pub color_bias: TevBias,
    pub color_scale: TevScale,
    pub color_clamp: bool,
    pub color_reg_id: Register,

    pub alpha_in_a: CombineAlphaInput,
    pub alpha_in_b: CombineAlphaInput,
    pub alpha_in_c: CombineAlphaInput,
    pub alpha_in_d: CombineAlphaInput,
    pub alpha_op: TevOp,
    pub alpha_bias: TevBias,
    pub alpha_scale: TevScale,
    pub alpha_clamp: bool,
    pub alpha_reg_id: Register,

    pub tex_coord_id: TexCoordId,
    pub tex_map: TexMapId,
    pub channel_id: RasColorChannelId,
    pub konst_color_sel: KonstColorSel,
    pub konst_alpha_sel: KonstAlphaSel,

    /// Index into [GXMaterial::ind_tex_stages].
    pub ind_tex_stage: u8,
    pub ind_tex_format: IndTexFormat,
    pub ind_tex_bias_sel: IndTexBiasSel,
    pub ind_tex_matrix: IndTexMtxId,
    pub ind_tex_wrap_s: IndTexWrap,
    pub ind_tex_wrap_t: IndTexWrap,
    pub ind_tex_add_prev: bool,
}

impl Default for TevStage {
    fn default() -> Self {
        Self {
            color_in_a: CombineColorInput::Zero,
            color_in_b: CombineColorInput::Zero,
            color_in_c: CombineColorInput::Zero,
            color_in_d: CombineColorInput::CPrev,
            color_op: TevOp::Add,
            color_bias: TevBias::Zero,
            color_scale: TevScale::Scale1,
            color_clamp: true,
            color_reg_id: Register::Prev,

            alpha_in_a: CombineAlphaInput::Zero,
            alpha_in_b: CombineAlphaInput::Zero,
            alpha_in_c: CombineAlphaInput::Zero,
            alpha_in_d: CombineAlphaInput::APrev,
            alpha_op: TevOp::Add,
            alpha_bias: TevBias::Zero,
            alpha_scale: TevScale::Scale1,
            alpha_clamp: true,
            alpha_reg_id: Register::Prev,

            tex_coord_id: TexCoordId::NULL,
            tex_map: TexMapId::NULL,
            channel_id: RasColorChannelId::ColorNull,
            konst_color_sel: KonstColorSel::Const1,
            konst_alpha_sel: KonstAlphaSel::Const1,

            ind_tex_stage: 0,
            ind_tex_format: IndTexFormat::F8,
            ind_tex_bias_sel: IndTexBiasSel::None,
            ind_tex_matrix: IndTexMtxId::Off,
            ind_tex_wrap_s: IndTexWrap::Off,
            ind_tex_wrap_t: IndTexWrap::Off,
            ind_tex_add_prev: false,
        }
    }
}

impl TevStage {
    /// A stage that passes the previous stage's output through unchanged.
    pub fn pass_through() -> Self {
        Self::default()
    }

    /// A stage that outputs `texture * rasterized color`, the usual first stage of a
    /// textured, lit material.
    pub fn modulate(tex_coord: u8, tex_map: u8, channel_id: RasColorChannelId) -> Self {
        Self {
            color_in_a: CombineColorInput::Zero,
            color_in_b: CombineColorInput::TexC,
            color_in_c: CombineColorInput::RasC,
            color_in_d: CombineColorInput::Zero,
            alpha_in_a: CombineAlphaInput::Zero,
            alpha_in_b: CombineAlphaInput::TexA,
            alpha_in_c: CombineAlphaInput::RasA,
            alpha_in_d: CombineAlphaInput::Zero,
            tex_coord_id: TexCoordId(Some(tex_coord)),
            tex_map: TexMapId(Some(tex_map)),
            channel_id,
            ..Default::default()
        }
    }
}

/// The alpha compare performed on the final PREV alpha.
///
/// A fragment is kept if `op(compare_a(alpha, reference_a), compare_b(alpha, reference_b))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaTest {
    pub op: AlphaOp,
    pub compare_a: CompareType,
    pub reference_a: f32,
    pub compare_b: CompareType,
    pub reference_b: f32,
}

impl Default for AlphaTest {
    fn default() -> Self {
        Self {
            op: AlphaOp::And,
            compare_a: CompareType::Always,
            reference_a: 0.0,
            compare_b: CompareType::Always,
            reference_b: 0.0,
        }
    }
}

impl AlphaTest {
    /// Returns true if a fragment with the given alpha passes the test.
    pub fn evaluate(&self, alpha: f32) -> bool {
        self.op.combine(
            self.compare_a.compare(alpha, self.reference_a),
            self.compare_b.compare(alpha, self.reference_b),
        )
    }

    /// The result of the test if it does not depend on alpha.
    pub fn constant_result(&self) -> Option<bool> {
        fn constant(compare: CompareType) -> Option<bool> {
            match compare {
                CompareType::Never => Some(false),
                CompareType::Always => Some(true),
                _ => None,
            }
        }
        let a = constant(self.compare_a)?;
        let b = constant(self.compare_b)?;
        Some(self.op.combine(a, b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendModeInfo {
    pub mode: BlendMode,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub logic_op: LogicOp,
}

/// Raster output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RopInfo {
    pub blend_mode: BlendModeInfo,
    pub depth_test: bool,
    pub depth_func: CompareType,
    pub depth_write: bool,
}

impl Default for RopInfo {
    fn default() -> Self {
        Self {
            blend_mode: BlendModeInfo::default(),
            depth_test: true,
            depth_func: CompareType::LEqual,
            depth_write: true,
        }
    }
}

impl GXMaterial {
    /// The indirect stage a TEV stage reads from, if its index is in range.
    pub fn ind_tex_stage(&self, stage: &TevStage) -> Option<&IndTexStage> {
        self.ind_tex_stages.get(stage.ind_tex_stage as usize)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn alpha_test(op: AlphaOp, compare_a: CompareType, compare_b: CompareType) -> AlphaTest {
        AlphaTest {
            op,
            compare_a,
            reference_a: 0.5,
            compare_b,
            reference_b: 0.5,
        }
    }

    #[test]
    fn test_alpha_test_xor_always_never_passes() {
        let test = alpha_test(AlphaOp::Xor, CompareType::Always, CompareType::Never);
        for alpha in [0.0, 0.25, 0.5, 1.0] {
            assert!(test.evaluate(alpha));
        }
        assert_eq!(test.constant_result(), Some(true));
    }

    #[test]
    fn test_alpha_test_and_always_never_fails() {
        let test = alpha_test(AlphaOp::And, CompareType::Always, CompareType::Never);
        for alpha in [0.0, 0.25, 0.5, 1.0] {
            assert!(!test.evaluate(alpha));
        }
        assert_eq!(test.constant_result(), Some(false));
    }

    #[test]
    fn test_alpha_test_compares() {
        let test = AlphaTest {
            op: AlphaOp::Or,
            compare_a: CompareType::Less,
            reference_a: 0.25,
            compare_b: CompareType::GEqual,
            reference_b: 0.75,
        };
        assert!(test.evaluate(0.1));
        assert!(!test.evaluate(0.5));
        assert!(test.evaluate(0.75));
        assert_eq!(test.constant_result(), None);

        let xnor = alpha_test(AlphaOp::Xnor, CompareType::Never, CompareType::Never);
        assert_eq!(xnor.constant_result(), Some(true));
        assert!(AlphaTest::default().evaluate(0.0));
    }

    #[test]
    fn test_material_json() {
        let material = GXMaterial {
            name: "mat0".to_string(),
            cull_mode: CullMode::None,
            tev_stages: vec![TevStage::modulate(0, 0, RasColorChannelId::Color0A0)],
            ..Default::default()
        };
        let json = serde_json::to_string(&material).unwrap();
        let parsed: GXMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, material);

        let parsed: GXMaterial = serde_json::from_str(r#"{"cull_mode": "All"}"#).unwrap();
        assert_eq!(parsed.cull_mode, CullMode::All);
        assert_eq!(parsed.rop, RopInfo::default());
    }
}
