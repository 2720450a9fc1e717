//! A structured description of the program a [GXMaterial] compiles to.
//!
//! Every material setting is resolved here (register ids to operands, enum values to
//! constants, unsupported configurations to errors), so code generation for a particular
//! shading language is a direct walk over these types.

#![allow(missing_docs)]

use crate::{
    config::MaterialHacks,
    gx::*,
    material::{ColorChannelControl, GXMaterial, TevStage, TexGen},
    GXError,
};

/// A vertex shader input.
///
/// Only the inputs the program reads are declared. The position matrix index and the
/// position are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexInput {
    PnMtxIdx,
    Position,
    Normal,
    Color(u8),
    Tex(u8),
    Binormal,
    Tangent,
}

impl VertexInput {
    /// The fixed shader location of this input.
    pub fn location(self) -> u32 {
        match self {
            Self::PnMtxIdx => 0,
            Self::Position => 1,
            Self::Normal => 2,
            Self::Color(i) => 3 + i as u32,
            Self::Tex(i) => 5 + i as u32,
            Self::Binormal => 13,
            Self::Tangent => 14,
        }
    }

    /// The name of the input in generated source.
    pub fn name(self) -> String {
        match self {
            Self::PnMtxIdx => "pn_mtx_idx".to_string(),
            Self::Position => "position".to_string(),
            Self::Normal => "normal".to_string(),
            Self::Color(i) => format!("color{}", i),
            Self::Tex(i) => format!("tex{}", i),
            Self::Binormal => "binormal".to_string(),
            Self::Tangent => "tangent".to_string(),
        }
    }

    /// The number of float components.
    pub fn num_components(self) -> u32 {
        match self {
            Self::PnMtxIdx => 1,
            Self::Tex(_) => 2,
            Self::Color(_) => 4,
            Self::Position | Self::Normal | Self::Binormal | Self::Tangent => 3,
        }
    }
}

/// Where a channel's material or ambient color comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSource {
    Vertex(u8),
    MaterialRegister(u8),
    AmbientRegister(u8),
    White,
}

/// The value of one half (color or alpha) of a color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelValue {
    pub material: ChannelSource,
    /// Present when lighting is enabled: the value is `0.3 * ambient * material`.
    pub ambient: Option<ChannelSource>,
}

/// A resolved color channel. The output is `vec4(color.rgb, alpha.a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightChannelIr {
    pub color: ChannelValue,
    pub alpha: ChannelValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexGenSourceIr {
    Position,
    Normal,
    Binormal,
    Tangent,
    Color(u8),
    Tex(u8),
    TexCoord(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexGenMatrixIr {
    Identity,
    /// A position matrix from the packet parameters.
    Position(u8),
    /// A texture matrix from the material parameters.
    Texture(u8),
}

/// How the transformed source becomes a texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexGenKindIr {
    /// `vec3(source.rg, 1.0)`, ignoring the matrix.
    Srtg,
    /// `vec3(transformed.xy, 1.0)`.
    Mtx2x4,
    /// The full transformed vector.
    Mtx3x4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexGenIr {
    pub kind: TexGenKindIr,
    pub source: TexGenSourceIr,
    pub matrix: TexGenMatrixIr,
    pub normalize: bool,
    /// Post-transform matrix index, or `None` for the identity.
    pub post_matrix: Option<u8>,
}

/// An indirect texture sample. The result is `255 * texel.abg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndTexSampleIr {
    /// Generated coordinate to sample at, or `None` for (0, 0).
    pub tex_coord: Option<u8>,
    /// Texture map to sample, or `None` for opaque white.
    pub tex_map: Option<u8>,
    /// Divisors applied to the coordinate.
    pub scale: [u32; 2],
}

/// The indirect offset added to a TEV stage's texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndTexOffsetIr {
    pub ind_tex_stage: u8,
    pub matrix: u8,
    /// Bias added to the s, t and u components of the indirect sample.
    pub bias: [f32; 3],
    /// Texture map whose size the offset is divided by.
    pub tex_map: Option<u8>,
}

/// The texture coordinate computed for a TEV stage's texture sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TevTexCoordIr {
    /// Generated coordinate, or `None` for (0, 0).
    pub tex_coord: Option<u8>,
    /// Per axis: `None` leaves the axis unchanged, `Some(None)` forces it to zero, and
    /// `Some(Some(m))` wraps it modulo `m`.
    pub wrap: [Option<Option<u32>>; 2],
    pub indirect: Option<IndTexOffsetIr>,
    /// Add to the previous stage's coordinate instead of replacing it.
    pub add_prev: bool,
}

/// A component selection of a four component value.
///
/// In a color operand, a single component is broadcast to three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swizzle {
    Rgb,
    R,
    G,
    B,
    A,
}

/// A fully resolved TEV stage input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TevOperand {
    Register(Register, Swizzle),
    /// The stage's texture sample.
    Texture(Swizzle),
    /// The stage's rasterized color, clamped to [0, 1].
    Rasterized(Swizzle),
    /// A konst color register.
    Konst(u8, Swizzle),
    Constant(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TevOpIr {
    Add,
    Sub,
    /// `a.r > b.r ? c : 0`.
    CompR8Gt,
}

/// The color or alpha half of a TEV stage.
///
/// Add/sub ops compute `(mix(a, b, c) +/- d + bias) * scale`; compare ops ignore `d`, bias
/// and scale. The result is clamped to [0, 1] if `clamp` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TevCombinerIr {
    pub inputs: [TevOperand; 4],
    pub op: TevOpIr,
    pub bias: f32,
    pub scale: f32,
    pub clamp: bool,
    pub dest: Register,
}

/// The rasterized color a TEV stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasSourceIr {
    Channel(u8),
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TevStageIr {
    /// The texture map sampled by this stage, if it samples one.
    pub texture: Option<u8>,
    /// Present whenever `texture` is.
    pub tex_coord: Option<TevTexCoordIr>,
    /// Present if either half reads the rasterized color.
    pub ras: Option<RasSourceIr>,
    pub color: TevCombinerIr,
    pub alpha: TevCombinerIr,
}

/// The alpha test, with constant outcomes folded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlphaTestIr {
    AlwaysPass,
    AlwaysFail,
    Compare {
        op: AlphaOp,
        a: (CompareType, f32),
        b: (CompareType, f32),
    },
}

/// The lowered form of a [GXMaterial].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramIr {
    /// Vertex inputs read by the program, sorted by location.
    pub vertex_inputs: Vec<VertexInput>,
    /// Color channels 0 and 1, when present in the material.
    pub light_channels: Vec<LightChannelIr>,
    pub tex_gens: Vec<TexGenIr>,
    pub ind_tex_samples: Vec<IndTexSampleIr>,
    pub tev_stages: Vec<TevStageIr>,
    pub alpha_test: AlphaTestIr,
    /// Texture maps the program samples, sorted. Only these have bindings declared.
    pub used_textures: Vec<u8>,
}

impl ProgramIr {
    /// Lowers a material, reporting unsupported or inconsistent configuration.
    pub fn lower(material: &GXMaterial, hacks: &MaterialHacks) -> Result<Self, GXError> {
        let mut lowering = Lowering {
            material,
            hacks,
            vertex_inputs: vec![VertexInput::PnMtxIdx, VertexInput::Position],
            used_textures: Vec::new(),
        };

        let light_channels = material
            .light_channels
            .iter()
            .take(2)
            .enumerate()
            .map(|(i, channel)| LightChannelIr {
                color: lowering.channel_value(i as u8, &channel.color),
                alpha: lowering.channel_value(i as u8, &channel.alpha),
            })
            .collect();

        let tex_gens = material
            .tex_gens
            .iter()
            .enumerate()
            .map(|(i, tex_gen)| lowering.tex_gen(i, tex_gen))
            .collect::<Result<Vec<_>, _>>()?;

        let ind_tex_samples = material
            .ind_tex_stages
            .iter()
            .map(|stage| IndTexSampleIr {
                tex_coord: lowering.tex_coord(stage.tex_coord_id),
                tex_map: lowering.texture(stage.tex_map),
                scale: [stage.scale_s.divisor(), stage.scale_t.divisor()],
            })
            .collect();

        let tev_stages = material
            .tev_stages
            .iter()
            .enumerate()
            .map(|(i, stage)| lowering.tev_stage(i, stage))
            .collect::<Result<Vec<_>, _>>()?;

        let alpha_test = lowering.alpha_test()?;

        let mut vertex_inputs = lowering.vertex_inputs;
        vertex_inputs.sort_by_key(|input| input.location());
        vertex_inputs.dedup();
        let mut used_textures = lowering.used_textures;
        used_textures.sort_unstable();
        used_textures.dedup();

        Ok(Self {
            vertex_inputs,
            light_channels,
            tex_gens,
            ind_tex_samples,
            tev_stages,
            alpha_test,
            used_textures,
        })
    }

    /// Returns true if the fragment stage can discard.
    pub fn uses_discard(&self) -> bool {
        !matches!(self.alpha_test, AlphaTestIr::AlwaysPass)
    }
}

struct Lowering<'m> {
    material: &'m GXMaterial,
    hacks: &'m MaterialHacks,
    vertex_inputs: Vec<VertexInput>,
    used_textures: Vec<u8>,
}

impl<'m> Lowering<'m> {
    fn channel_source(
        &mut self,
        channel: u8,
        src: ColorSrc,
        register: ChannelSource,
    ) -> ChannelSource {
        match src {
            ColorSrc::Reg => register,
            ColorSrc::Vtx if self.hacks.disable_vertex_colors => ChannelSource::White,
            ColorSrc::Vtx => {
                self.vertex_inputs.push(VertexInput::Color(channel));
                ChannelSource::Vertex(channel)
            }
        }
    }

    fn channel_value(&mut self, channel: u8, control: &ColorChannelControl) -> ChannelValue {
        let material = self.channel_source(
            channel,
            control.mat_color_source,
            ChannelSource::MaterialRegister(channel),
        );
        let ambient = if control.lighting_enabled && !self.hacks.disable_lighting {
            Some(self.channel_source(
                channel,
                control.amb_color_source,
                ChannelSource::AmbientRegister(channel),
            ))
        } else {
            None
        };
        ChannelValue { material, ambient }
    }

    fn tex_gen(&mut self, index: usize, tex_gen: &TexGen) -> Result<TexGenIr, GXError> {
        let kind = match tex_gen.gen_type {
            TexGenType::Srtg => TexGenKindIr::Srtg,
            TexGenType::Mtx2x4 => TexGenKindIr::Mtx2x4,
            TexGenType::Mtx3x4 => TexGenKindIr::Mtx3x4,
            ty => return Err(GXError::UnsupportedTexGenType(ty)),
        };

        let source = match tex_gen.source {
            TexGenSrc::Pos => TexGenSourceIr::Position,
            TexGenSrc::Nrm => {
                self.vertex_inputs.push(VertexInput::Normal);
                TexGenSourceIr::Normal
            }
            TexGenSrc::Binrm => {
                self.vertex_inputs.push(VertexInput::Binormal);
                TexGenSourceIr::Binormal
            }
            TexGenSrc::Tangent => {
                self.vertex_inputs.push(VertexInput::Tangent);
                TexGenSourceIr::Tangent
            }
            TexGenSrc::Color0 => TexGenSourceIr::Color(0),
            TexGenSrc::Color1 => TexGenSourceIr::Color(1),
            src => {
                let raw = src as u8;
                if raw >= TexGenSrc::TexCoord0 as u8 {
                    let i = raw - TexGenSrc::TexCoord0 as u8;
                    // Only earlier generators have been computed
                    if i as usize >= index {
                        return Err(GXError::InvalidEnumValue {
                            field: "tex_gen_source",
                            value: raw as u32,
                        });
                    }
                    TexGenSourceIr::TexCoord(i)
                } else {
                    let i = raw - TexGenSrc::Tex0 as u8;
                    self.vertex_inputs.push(VertexInput::Tex(i));
                    TexGenSourceIr::Tex(i)
                }
            }
        };

        let matrix = match (tex_gen.matrix, tex_gen.matrix.tex_mtx_index()) {
            (TexGenMatrix::Identity, _) => TexGenMatrixIr::Identity,
            (_, Some(i)) => TexGenMatrixIr::Texture(i),
            (m, None) => TexGenMatrixIr::Position(m as u8 / 3),
        };

        Ok(TexGenIr {
            kind,
            source,
            matrix,
            normalize: tex_gen.normalize,
            post_matrix: tex_gen.post_matrix.index()?,
        })
    }

    /// Coordinates past the last generator read the last generator.
    fn tex_coord(&self, id: TexCoordId) -> Option<u8> {
        let last = self.material.tex_gens.len().checked_sub(1)? as u8;
        id.0.map(|id| id.min(last))
    }

    /// Records a sampled texture map, or returns `None` if it samples white.
    fn texture(&mut self, tex_map: TexMapId) -> Option<u8> {
        if self.hacks.disable_textures {
            return None;
        }
        let map = tex_map.0?;
        self.used_textures.push(map);
        Some(map)
    }

    fn tev_tex_coord(&self, index: usize, stage: &TevStage) -> Result<TevTexCoordIr, GXError> {
        let wrap = |wrap: IndTexWrap| match wrap {
            IndTexWrap::Off => None,
            w => Some(w.modulus()),
        };

        let indirect = match stage.ind_tex_matrix {
            IndTexMtxId::Off => None,
            matrix @ (IndTexMtxId::M0 | IndTexMtxId::M1 | IndTexMtxId::M2) => {
                if stage.ind_tex_format != IndTexFormat::F8 {
                    return Err(GXError::UnsupportedIndTexFormat(stage.ind_tex_format));
                }
                if self.material.ind_tex_stage(stage).is_none() {
                    return Err(GXError::InvalidIndTexStage {
                        tev_stage: index,
                        ind_tex_stage: stage.ind_tex_stage,
                    });
                }
                let components = stage.ind_tex_bias_sel.components();
                Some(IndTexOffsetIr {
                    ind_tex_stage: stage.ind_tex_stage,
                    matrix: matrix as u8 - IndTexMtxId::M0 as u8,
                    bias: components.map(|on| if on { -128.0 } else { 0.0 }),
                    tex_map: stage.tex_map.0,
                })
            }
            matrix => return Err(GXError::UnsupportedIndTexMatrix(matrix)),
        };

        Ok(TevTexCoordIr {
            tex_coord: self.tex_coord(stage.tex_coord_id),
            wrap: [wrap(stage.ind_tex_wrap_s), wrap(stage.ind_tex_wrap_t)],
            indirect,
            add_prev: stage.ind_tex_add_prev,
        })
    }

    fn ras_source(channel_id: RasColorChannelId) -> Result<RasSourceIr, GXError> {
        match channel_id {
            RasColorChannelId::Color0 | RasColorChannelId::Color0A0 => Ok(RasSourceIr::Channel(0)),
            RasColorChannelId::Color1 | RasColorChannelId::Color1A1 => Ok(RasSourceIr::Channel(1)),
            RasColorChannelId::ColorZero => Ok(RasSourceIr::Zero),
            channel => Err(GXError::UnsupportedRasChannel(channel)),
        }
    }

    fn tev_op(op: TevOp) -> Result<TevOpIr, GXError> {
        match op {
            TevOp::Add => Ok(TevOpIr::Add),
            TevOp::Sub => Ok(TevOpIr::Sub),
            TevOp::CompR8Gt => Ok(TevOpIr::CompR8Gt),
            op => Err(GXError::UnsupportedTevOp(op)),
        }
    }

    fn tev_stage(&mut self, index: usize, stage: &TevStage) -> Result<TevStageIr, GXError> {
        let color_inputs = [
            stage.color_in_a,
            stage.color_in_b,
            stage.color_in_c,
            stage.color_in_d,
        ];
        let alpha_inputs = [
            stage.alpha_in_a,
            stage.alpha_in_b,
            stage.alpha_in_c,
            stage.alpha_in_d,
        ];

        let reads_texture = color_inputs
            .iter()
            .any(|i| matches!(i, CombineColorInput::TexC | CombineColorInput::TexA))
            || alpha_inputs.contains(&CombineAlphaInput::TexA);
        let reads_ras = color_inputs
            .iter()
            .any(|i| matches!(i, CombineColorInput::RasC | CombineColorInput::RasA))
            || alpha_inputs.contains(&CombineAlphaInput::RasA);

        // Indirect settings are validated even when the stage samples nothing
        let tex_coord = self.tev_tex_coord(index, stage)?;
        let texture = if reads_texture {
            self.texture(stage.tex_map)
        } else {
            None
        };
        let ras = if reads_ras {
            Some(Self::ras_source(stage.channel_id)?)
        } else {
            None
        };

        let color = TevCombinerIr {
            inputs: color_inputs.map(|input| color_operand(input, stage.konst_color_sel, texture)),
            op: Self::tev_op(stage.color_op)?,
            bias: stage.color_bias.value(),
            scale: stage.color_scale.value(),
            clamp: stage.color_clamp,
            dest: stage.color_reg_id,
        };
        let alpha = TevCombinerIr {
            inputs: alpha_inputs.map(|input| alpha_operand(input, stage.konst_alpha_sel, texture)),
            op: Self::tev_op(stage.alpha_op)?,
            bias: stage.alpha_bias.value(),
            scale: stage.alpha_scale.value(),
            clamp: stage.alpha_clamp,
            dest: stage.alpha_reg_id,
        };

        Ok(TevStageIr {
            texture,
            tex_coord: texture.map(|_| tex_coord),
            ras,
            color,
            alpha,
        })
    }

    fn alpha_test(&self) -> Result<AlphaTestIr, GXError> {
        let test = &self.material.alpha_test;
        match test.constant_result() {
            Some(true) => Ok(AlphaTestIr::AlwaysPass),
            Some(false) => Ok(AlphaTestIr::AlwaysFail),
            None => {
                if !test.reference_a.is_finite() || !test.reference_b.is_finite() {
                    return Err(GXError::NonFiniteConstant {
                        field: "alpha_test",
                    });
                }
                Ok(AlphaTestIr::Compare {
                    op: test.op,
                    a: (test.compare_a, test.reference_a),
                    b: (test.compare_b, test.reference_b),
                })
            }
        }
    }
}

fn konst_fraction(sel: u8) -> f32 {
    (8 - sel) as f32 / 8.0
}

fn konst_swizzle(sel: u8) -> Swizzle {
    match (sel - 0x10) >> 2 {
        0 => Swizzle::R,
        1 => Swizzle::G,
        2 => Swizzle::B,
        _ => Swizzle::A,
    }
}

fn konst_color(sel: KonstColorSel) -> TevOperand {
    let raw = sel as u8;
    match raw {
        0x00..=0x07 => TevOperand::Constant(konst_fraction(raw)),
        0x0C..=0x0F => TevOperand::Konst(raw - 0x0C, Swizzle::Rgb),
        _ => TevOperand::Konst(raw & 3, konst_swizzle(raw)),
    }
}

fn konst_alpha(sel: KonstAlphaSel) -> TevOperand {
    let raw = sel as u8;
    match raw {
        0x00..=0x07 => TevOperand::Constant(konst_fraction(raw)),
        _ => TevOperand::Konst(raw & 3, konst_swizzle(raw)),
    }
}

fn texture_operand(texture: Option<u8>, swizzle: Swizzle) -> TevOperand {
    match texture {
        Some(_) => TevOperand::Texture(swizzle),
        None => TevOperand::Constant(1.0),
    }
}

fn color_operand(input: CombineColorInput, konst: KonstColorSel, texture: Option<u8>) -> TevOperand {
    use CombineColorInput::*;
    match input {
        CPrev => TevOperand::Register(Register::Prev, Swizzle::Rgb),
        APrev => TevOperand::Register(Register::Prev, Swizzle::A),
        C0 => TevOperand::Register(Register::Reg0, Swizzle::Rgb),
        A0 => TevOperand::Register(Register::Reg0, Swizzle::A),
        C1 => TevOperand::Register(Register::Reg1, Swizzle::Rgb),
        A1 => TevOperand::Register(Register::Reg1, Swizzle::A),
        C2 => TevOperand::Register(Register::Reg2, Swizzle::Rgb),
        A2 => TevOperand::Register(Register::Reg2, Swizzle::A),
        TexC => texture_operand(texture, Swizzle::Rgb),
        TexA => texture_operand(texture, Swizzle::A),
        RasC => TevOperand::Rasterized(Swizzle::Rgb),
        RasA => TevOperand::Rasterized(Swizzle::A),
        One => TevOperand::Constant(1.0),
        Half => TevOperand::Constant(0.5),
        Konst => konst_color(konst),
        Zero => TevOperand::Constant(0.0),
    }
}

fn alpha_operand(input: CombineAlphaInput, konst: KonstAlphaSel, texture: Option<u8>) -> TevOperand {
    use CombineAlphaInput::*;
    match input {
        APrev => TevOperand::Register(Register::Prev, Swizzle::A),
        A0 => TevOperand::Register(Register::Reg0, Swizzle::A),
        A1 => TevOperand::Register(Register::Reg1, Swizzle::A),
        A2 => TevOperand::Register(Register::Reg2, Swizzle::A),
        TexA => texture_operand(texture, Swizzle::A),
        RasA => TevOperand::Rasterized(Swizzle::A),
        Konst => konst_alpha(konst),
        Zero => TevOperand::Constant(0.0),
    }
}
