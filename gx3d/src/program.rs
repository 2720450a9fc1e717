//! WGSL code generation for GX materials.
//!
//! Both stages declare the shared uniform blocks (see [crate::uniforms]) and the
//! `VertexOutput` struct, so they can be compiled as separate modules. Texture map `m` is
//! bound in group 1 with the texture at binding `2m` and its sampler at `2m + 1`.

use std::fmt::Write;

use crate::{
    config::MaterialHacks,
    gx::{AlphaOp, CompareType, Register},
    material::GXMaterial,
    program_ir::*,
    render_flags::{translate_render_flags, RenderFlags},
    uniforms::{
        NUM_IND_TEX_MATRICES, NUM_POST_TEX_MATRICES, NUM_POS_MATRICES, NUM_TEXTURES,
        NUM_TEX_MATRICES,
    },
    GXError,
};

/// The compiled program for a material.
#[derive(Debug, Clone, PartialEq)]
pub struct GXProgram {
    /// The material's name, for labels.
    pub name: String,
    /// WGSL source with entry point `vs_main`.
    pub vertex_source: String,
    /// WGSL source with entry point `fs_main`.
    pub fragment_source: String,
    /// The lowered program both sources were generated from.
    pub ir: ProgramIr,
    /// Render state for drawing with the program.
    pub render_flags: RenderFlags,
}

/// Compiles a material into vertex and fragment programs and its render state.
pub fn compile_material(material: &GXMaterial) -> Result<GXProgram, GXError> {
    compile_material_with(material, &MaterialHacks::default())
}

/// Compiles a material, applying the given simplifications.
pub fn compile_material_with(
    material: &GXMaterial,
    hacks: &MaterialHacks,
) -> Result<GXProgram, GXError> {
    let ir = ProgramIr::lower(material, hacks)?;
    let render_flags = translate_render_flags(material)?;

    let mut vertex_source = String::new();
    write_vertex_source(&mut vertex_source, &ir)?;
    let mut fragment_source = String::new();
    write_fragment_source(&mut fragment_source, &ir)?;

    log::debug!(
        "compiled material {:?}: {} tex gens, {} tev stages, textures {:?}",
        material.name,
        ir.tex_gens.len(),
        ir.tev_stages.len(),
        ir.used_textures
    );

    Ok(GXProgram {
        name: material.name.clone(),
        vertex_source,
        fragment_source,
        ir,
        render_flags,
    })
}

/// Formats a float so that it parses as a WGSL float literal.
fn lit(x: f32, field: &'static str) -> Result<String, GXError> {
    if !x.is_finite() {
        return Err(GXError::NonFiniteConstant { field });
    }
    Ok(format!("{:?}", x))
}

fn write_common(s: &mut String, ir: &ProgramIr) -> Result<(), GXError> {
    writeln!(s, "struct Mat4x3 {{")?;
    writeln!(s, "    mx: vec4<f32>,")?;
    writeln!(s, "    my: vec4<f32>,")?;
    writeln!(s, "    mz: vec4<f32>,")?;
    writeln!(s, "}}")?;
    writeln!(s)?;
    writeln!(s, "struct Mat4x2 {{")?;
    writeln!(s, "    mx: vec4<f32>,")?;
    writeln!(s, "    my: vec4<f32>,")?;
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "struct SceneParams {{")?;
    writeln!(s, "    projection: mat4x4<f32>,")?;
    writeln!(s, "    misc0: vec4<f32>,")?;
    writeln!(s, "}}")?;
    writeln!(s)?;
    writeln!(s, "struct MaterialParams {{")?;
    writeln!(s, "    color_mat_reg: array<vec4<f32>, 2>,")?;
    writeln!(s, "    color_amb_reg: array<vec4<f32>, 2>,")?;
    writeln!(s, "    konst_color: array<vec4<f32>, 4>,")?;
    writeln!(s, "    color: array<vec4<f32>, 4>,")?;
    writeln!(s, "    tex_mtx: array<Mat4x3, {}>,", NUM_TEX_MATRICES)?;
    writeln!(s, "    post_tex_mtx: array<Mat4x3, {}>,", NUM_POST_TEX_MATRICES)?;
    writeln!(s, "    texture_params: array<vec4<f32>, {}>,", NUM_TEXTURES)?;
    writeln!(s, "    ind_tex_mtx: array<Mat4x2, {}>,", NUM_IND_TEX_MATRICES)?;
    writeln!(s, "}}")?;
    writeln!(s)?;
    writeln!(s, "struct PacketParams {{")?;
    writeln!(s, "    pos_mtx: array<Mat4x3, {}>,", NUM_POS_MATRICES)?;
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "@group(0) @binding(0) var<uniform> u_scene: SceneParams;")?;
    writeln!(s, "@group(0) @binding(1) var<uniform> u_material: MaterialParams;")?;
    writeln!(s, "@group(0) @binding(2) var<uniform> u_packet: PacketParams;")?;
    writeln!(s)?;

    writeln!(s, "fn mul_mat4x3(m: Mat4x3, v: vec4<f32>) -> vec3<f32> {{")?;
    writeln!(s, "    return vec3<f32>(dot(m.mx, v), dot(m.my, v), dot(m.mz, v));")?;
    writeln!(s, "}}")?;
    writeln!(s)?;
    writeln!(s, "fn mul_mat4x2(m: Mat4x2, v: vec4<f32>) -> vec2<f32> {{")?;
    writeln!(s, "    return vec2<f32>(dot(m.mx, v), dot(m.my, v));")?;
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "struct VertexOutput {{")?;
    writeln!(s, "    @builtin(position) position: vec4<f32>,")?;
    writeln!(s, "    @location(0) color0: vec4<f32>,")?;
    writeln!(s, "    @location(1) color1: vec4<f32>,")?;
    for i in 0..ir.tex_gens.len() {
        writeln!(s, "    @location({}) tex_coord{}: vec3<f32>,", 2 + i, i)?;
    }
    writeln!(s, "}}")?;
    writeln!(s)?;
    Ok(())
}

fn channel_source_expr(source: ChannelSource) -> String {
    match source {
        ChannelSource::Vertex(i) => format!("in.color{}", i),
        ChannelSource::MaterialRegister(i) => format!("u_material.color_mat_reg[{}]", i),
        ChannelSource::AmbientRegister(i) => format!("u_material.color_amb_reg[{}]", i),
        ChannelSource::White => "vec4<f32>(1.0)".to_string(),
    }
}

fn channel_value_expr(value: &ChannelValue) -> String {
    let material = channel_source_expr(value.material);
    match value.ambient {
        // Crude approximation of lighting
        Some(ambient) => format!("(0.3 * {} * {})", channel_source_expr(ambient), material),
        None => material,
    }
}

fn light_channel_expr(channel: &LightChannelIr) -> String {
    let color = channel_value_expr(&channel.color);
    let alpha = channel_value_expr(&channel.alpha);
    if color == alpha {
        color
    } else {
        format!("vec4<f32>(({}).rgb, ({}).a)", color, alpha)
    }
}

fn tex_gen_expr(tex_gen: &TexGenIr) -> String {
    let source = match tex_gen.source {
        TexGenSourceIr::Position => "vec4<f32>(in.position, 1.0)".to_string(),
        TexGenSourceIr::Normal => "vec4<f32>(in.normal, 1.0)".to_string(),
        TexGenSourceIr::Binormal => "vec4<f32>(in.binormal, 1.0)".to_string(),
        TexGenSourceIr::Tangent => "vec4<f32>(in.tangent, 1.0)".to_string(),
        TexGenSourceIr::Color(i) => format!("out.color{}", i),
        TexGenSourceIr::Tex(i) => format!("vec4<f32>(in.tex{}, 1.0, 1.0)", i),
        TexGenSourceIr::TexCoord(i) => format!("vec4<f32>(out.tex_coord{}, 1.0)", i),
    };

    let transformed = match tex_gen.matrix {
        TexGenMatrixIr::Identity => format!("{}.xyz", source),
        TexGenMatrixIr::Position(i) => format!("mul_mat4x3(u_packet.pos_mtx[{}], {})", i, source),
        TexGenMatrixIr::Texture(i) => format!("mul_mat4x3(u_material.tex_mtx[{}], {})", i, source),
    };

    let mut expr = match tex_gen.kind {
        TexGenKindIr::Srtg => format!("vec3<f32>({}.rg, 1.0)", source),
        TexGenKindIr::Mtx2x4 => format!("vec3<f32>(({}).xy, 1.0)", transformed),
        TexGenKindIr::Mtx3x4 => transformed,
    };
    if tex_gen.normalize {
        expr = format!("normalize({})", expr);
    }
    if let Some(i) = tex_gen.post_matrix {
        expr = format!(
            "mul_mat4x3(u_material.post_tex_mtx[{}], vec4<f32>({}, 1.0))",
            i, expr
        );
    }
    expr
}

fn write_vertex_source(s: &mut String, ir: &ProgramIr) -> Result<(), GXError> {
    write_common(s, ir)?;

    writeln!(s, "struct VertexData {{")?;
    for input in &ir.vertex_inputs {
        let ty = match input.num_components() {
            1 => "f32",
            2 => "vec2<f32>",
            3 => "vec3<f32>",
            _ => "vec4<f32>",
        };
        writeln!(
            s,
            "    @location({}) {}: {},",
            input.location(),
            input.name(),
            ty
        )?;
    }
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "@vertex")?;
    writeln!(s, "fn vs_main(in: VertexData) -> VertexOutput {{")?;
    writeln!(s, "    var out = VertexOutput();")?;
    writeln!(
        s,
        "    let pos_mtx = u_packet.pos_mtx[u32(in.pn_mtx_idx / 3.0)];"
    )?;
    writeln!(
        s,
        "    let t_position = mul_mat4x3(pos_mtx, vec4<f32>(in.position, 1.0));"
    )?;
    writeln!(
        s,
        "    out.position = u_scene.projection * vec4<f32>(t_position, 1.0);"
    )?;
    for i in 0..2 {
        let expr = match ir.light_channels.get(i) {
            Some(channel) => light_channel_expr(channel),
            None => "vec4<f32>(0.0)".to_string(),
        };
        writeln!(s, "    out.color{} = {};", i, expr)?;
    }
    for (i, tex_gen) in ir.tex_gens.iter().enumerate() {
        writeln!(s, "    out.tex_coord{} = {};", i, tex_gen_expr(tex_gen))?;
    }
    writeln!(s, "    return out;")?;
    writeln!(s, "}}")?;
    Ok(())
}

fn tex_coord_expr(tex_coord: Option<u8>) -> String {
    match tex_coord {
        Some(i) => format!("(in.tex_coord{}.xy / in.tex_coord{}.z)", i, i),
        None => "vec2<f32>(0.0)".to_string(),
    }
}

fn texture_lod_bias_expr(tex_map: u8) -> String {
    format!(
        "u_scene.misc0.x + u_material.texture_params[{}].w",
        tex_map
    )
}

fn register_var(register: Register) -> &'static str {
    match register {
        Register::Prev => "t_color_prev",
        Register::Reg0 => "t_color0",
        Register::Reg1 => "t_color1",
        Register::Reg2 => "t_color2",
    }
}

fn swizzle_str(swizzle: Swizzle, color: bool) -> &'static str {
    match (swizzle, color) {
        (Swizzle::Rgb, true) => "rgb",
        (Swizzle::R, true) => "rrr",
        (Swizzle::G, true) => "ggg",
        (Swizzle::B, true) => "bbb",
        (Swizzle::A, true) => "aaa",
        (Swizzle::R, false) => "r",
        (Swizzle::G, false) => "g",
        (Swizzle::B, false) => "b",
        (Swizzle::Rgb | Swizzle::A, false) => "a",
    }
}

fn operand_expr(
    operand: TevOperand,
    stage: usize,
    ras: Option<RasSourceIr>,
    color: bool,
) -> Result<String, GXError> {
    Ok(match operand {
        TevOperand::Register(register, swizzle) => {
            format!("{}.{}", register_var(register), swizzle_str(swizzle, color))
        }
        TevOperand::Texture(swizzle) => format!("t_tex{}.{}", stage, swizzle_str(swizzle, color)),
        TevOperand::Rasterized(swizzle) => {
            let ras = match ras {
                Some(RasSourceIr::Channel(i)) => format!("in.color{}", i),
                _ => "vec4<f32>(0.0)".to_string(),
            };
            format!("saturate({}).{}", ras, swizzle_str(swizzle, color))
        }
        TevOperand::Konst(k, swizzle) => format!(
            "u_material.konst_color[{}].{}",
            k,
            swizzle_str(swizzle, color)
        ),
        TevOperand::Constant(c) if color => format!("vec3<f32>({})", lit(c, "tev_constant")?),
        TevOperand::Constant(c) => lit(c, "tev_constant")?,
    })
}

fn combiner_expr(combiner: &TevCombinerIr, stage: usize, color: bool) -> Result<String, GXError> {
    let component = if color { "rgb" } else { "a" };
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|input| format!("t_tev{}_{}.{}", stage, input, component));

    let mut expr = match combiner.op {
        TevOpIr::Add | TevOpIr::Sub => {
            let sign = if combiner.op == TevOpIr::Add { '+' } else { '-' };
            let mut expr = format!("mix({}, {}, {}) {} {}", a, b, c, sign, d);
            if combiner.bias != 0.0 {
                expr = format!("({} + {})", expr, lit(combiner.bias, "tev_bias")?);
            }
            if combiner.scale != 1.0 {
                expr = format!("({}) * {}", expr, lit(combiner.scale, "tev_scale")?);
            }
            expr
        }
        TevOpIr::CompR8Gt => {
            let zero = if color { "vec3<f32>(0.0)" } else { "0.0" };
            format!(
                "select({}, {}, t_tev{}_a.r > t_tev{}_b.r)",
                zero, c, stage, stage
            )
        }
    };
    if combiner.clamp {
        expr = format!("saturate({})", expr);
    }
    Ok(expr)
}

fn write_tev_tex_coord(
    s: &mut String,
    index: usize,
    coord: &TevTexCoordIr,
) -> Result<(), GXError> {
    let mut expr = tex_coord_expr(coord.tex_coord);

    if coord.wrap.iter().any(|wrap| wrap.is_some()) {
        writeln!(s, "    let t_tex_coord_base{} = {};", index, expr)?;
        let axis = |wrap: Option<Option<u32>>, c: char| match wrap {
            None => format!("t_tex_coord_base{}.{}", index, c),
            Some(None) => "0.0".to_string(),
            Some(Some(m)) => format!("(t_tex_coord_base{}.{} % {:?})", index, c, m as f32),
        };
        expr = format!(
            "vec2<f32>({}, {})",
            axis(coord.wrap[0], 'x'),
            axis(coord.wrap[1], 'y')
        );
    }

    if let Some(indirect) = &coord.indirect {
        let [bs, bt, bu] = indirect.bias;
        let mut offset = format!(
            "mul_mat4x2(u_material.ind_tex_mtx[{}], vec4<f32>(t_ind_tex_coord{} + vec3<f32>({}, {}, {}), 0.0))",
            indirect.matrix,
            indirect.ind_tex_stage,
            lit(bs, "ind_tex_bias")?,
            lit(bt, "ind_tex_bias")?,
            lit(bu, "ind_tex_bias")?
        );
        if let Some(tex_map) = indirect.tex_map {
            offset = format!(
                "{} * (1.0 / u_material.texture_params[{}].xy)",
                offset, tex_map
            );
        }
        expr = format!("{} + {}", expr, offset);
    }

    let assign = if coord.add_prev { "+=" } else { "=" };
    writeln!(s, "    t_tex_coord {} {};", assign, expr)?;
    Ok(())
}

fn write_tev_stage(s: &mut String, index: usize, stage: &TevStageIr) -> Result<(), GXError> {
    writeln!(s, "    // Stage {}", index)?;

    if let (Some(tex_map), Some(coord)) = (stage.texture, &stage.tex_coord) {
        write_tev_tex_coord(s, index, coord)?;
        writeln!(
            s,
            "    let t_tex{} = textureSampleBias(r_texture{}, r_sampler{}, t_tex_coord, {});",
            index,
            tex_map,
            tex_map,
            texture_lod_bias_expr(tex_map)
        )?;
    }

    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        let color = operand_expr(stage.color.inputs[i], index, stage.ras, true)?;
        let alpha = operand_expr(stage.alpha.inputs[i], index, stage.ras, false)?;
        if i < 3 {
            writeln!(
                s,
                "    let t_tev{}_{} = tev_overflow(vec4<f32>({}, {}));",
                index, name, color, alpha
            )?;
        } else {
            writeln!(
                s,
                "    let t_tev{}_{} = vec4<f32>({}, {});",
                index, name, color, alpha
            )?;
        }
    }

    let color_dest = register_var(stage.color.dest);
    writeln!(
        s,
        "    {} = vec4<f32>({}, {}.a);",
        color_dest,
        combiner_expr(&stage.color, index, true)?,
        color_dest
    )?;
    writeln!(
        s,
        "    {}.a = {};",
        register_var(stage.alpha.dest),
        combiner_expr(&stage.alpha, index, false)?
    )?;
    Ok(())
}

fn compare_expr(compare: CompareType, reference: f32) -> Result<String, GXError> {
    let op = match compare {
        CompareType::Never => return Ok("false".to_string()),
        CompareType::Always => return Ok("true".to_string()),
        CompareType::Less => "<",
        CompareType::Equal => "==",
        CompareType::LEqual => "<=",
        CompareType::Greater => ">",
        CompareType::NEqual => "!=",
        CompareType::GEqual => ">=",
    };
    Ok(format!(
        "(t_color_prev.a {} {})",
        op,
        lit(reference, "alpha_test")?
    ))
}

fn write_alpha_test(s: &mut String, alpha_test: &AlphaTestIr) -> Result<(), GXError> {
    match *alpha_test {
        AlphaTestIr::AlwaysPass => {}
        AlphaTestIr::AlwaysFail => {
            // A bare discard terminates the block, leaving the output writes unreachable.
            writeln!(s, "    if true {{")?;
            writeln!(s, "        discard;")?;
            writeln!(s, "    }}")?;
        }
        AlphaTestIr::Compare { op, a, b } => {
            let a = compare_expr(a.0, a.1)?;
            let b = compare_expr(b.0, b.1)?;
            let expr = match op {
                AlphaOp::And => format!("{} && {}", a, b),
                AlphaOp::Or => format!("{} || {}", a, b),
                AlphaOp::Xor => format!("{} != {}", a, b),
                AlphaOp::Xnor => format!("{} == {}", a, b),
            };
            writeln!(s, "    if !({}) {{", expr)?;
            writeln!(s, "        discard;")?;
            writeln!(s, "    }}")?;
        }
    }
    Ok(())
}

fn write_fragment_source(s: &mut String, ir: &ProgramIr) -> Result<(), GXError> {
    write_common(s, ir)?;

    for &tex_map in &ir.used_textures {
        writeln!(
            s,
            "@group(1) @binding({}) var r_texture{}: texture_2d<f32>;",
            2 * tex_map as u32,
            tex_map
        )?;
        writeln!(
            s,
            "@group(1) @binding({}) var r_sampler{}: sampler;",
            2 * tex_map as u32 + 1,
            tex_map
        )?;
    }
    if !ir.used_textures.is_empty() {
        writeln!(s)?;
    }

    writeln!(s, "fn tev_overflow_scalar(a: f32) -> f32 {{")?;
    writeln!(s, "    return f32(i32(a * 255.0) % 256) / 255.0;")?;
    writeln!(s, "}}")?;
    writeln!(s)?;
    writeln!(s, "fn tev_overflow(v: vec4<f32>) -> vec4<f32> {{")?;
    writeln!(
        s,
        "    return vec4<f32>(fract(v.rgb * (255.0 / 256.0)) * (256.0 / 255.0), tev_overflow_scalar(v.a));"
    )?;
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "struct FragmentOutput {{")?;
    writeln!(s, "    @location(0) color: vec4<f32>,")?;
    writeln!(s, "}}")?;
    writeln!(s)?;

    writeln!(s, "@fragment")?;
    writeln!(s, "fn fs_main(in: VertexOutput) -> FragmentOutput {{")?;
    writeln!(s, "    var out = FragmentOutput();")?;
    writeln!(s, "    var t_color_prev = u_material.color[0];")?;
    writeln!(s, "    var t_color0 = u_material.color[1];")?;
    writeln!(s, "    var t_color1 = u_material.color[2];")?;
    writeln!(s, "    var t_color2 = u_material.color[3];")?;
    writeln!(s, "    var t_tex_coord = vec2<f32>(0.0);")?;

    for (i, sample) in ir.ind_tex_samples.iter().enumerate() {
        match sample.tex_map {
            Some(tex_map) => writeln!(
                s,
                "    let t_ind_tex_coord{} = 255.0 * textureSampleBias(r_texture{}, r_sampler{}, {} * vec2<f32>({}, {}), {}).abg;",
                i,
                tex_map,
                tex_map,
                tex_coord_expr(sample.tex_coord),
                lit(1.0 / sample.scale[0] as f32, "ind_tex_scale")?,
                lit(1.0 / sample.scale[1] as f32, "ind_tex_scale")?,
                texture_lod_bias_expr(tex_map)
            )?,
            None => writeln!(s, "    let t_ind_tex_coord{} = vec3<f32>(255.0);", i)?,
        }
    }

    for (i, stage) in ir.tev_stages.iter().enumerate() {
        write_tev_stage(s, i, stage)?;
    }

    write_alpha_test(s, &ir.alpha_test)?;
    writeln!(s, "    out.color = t_color_prev;")?;
    writeln!(s, "    return out;")?;
    writeln!(s, "}}")?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        gx::*,
        material::{
            AlphaTest, ColorChannelControl, IndTexStage, LightChannelControl, TevStage, TexGen,
        },
    };

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn textured_material() -> GXMaterial {
        GXMaterial {
            name: "body".to_string(),
            light_channels: vec![LightChannelControl {
                color: ColorChannelControl {
                    lighting_enabled: true,
                    mat_color_source: ColorSrc::Vtx,
                    amb_color_source: ColorSrc::Reg,
                },
                alpha: ColorChannelControl::default(),
            }],
            tex_gens: vec![TexGen {
                gen_type: TexGenType::Mtx2x4,
                source: TexGenSrc::Tex0,
                matrix: TexGenMatrix::TexMtx0,
                ..Default::default()
            }],
            tev_stages: vec![TevStage::modulate(0, 2, RasColorChannelId::Color0A0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        init_logging();
        let material = textured_material();
        let a = compile_material(&material).unwrap();
        let b = compile_material(&material.clone()).unwrap();
        assert_eq!(a.vertex_source, b.vertex_source);
        assert_eq!(a.fragment_source, b.fragment_source);
        assert_eq!(a.name, "body");
        assert_eq!(a.render_flags, translate_render_flags(&material).unwrap());
    }

    #[test]
    fn test_vertex_source() {
        let program = compile_material(&textured_material()).unwrap();
        let vs = &program.vertex_source;

        assert!(vs.contains("    @location(0) pn_mtx_idx: f32,\n    @location(1) position: vec3<f32>,\n    @location(3) color0: vec4<f32>,\n    @location(5) tex0: vec2<f32>,\n}"));
        assert!(vs.contains(
            "    out.color0 = vec4<f32>(((0.3 * u_material.color_amb_reg[0] * in.color0)).rgb, (u_material.color_mat_reg[0]).a);"
        ));
        assert!(vs.contains("    out.color1 = vec4<f32>(0.0);"));
        assert!(vs.contains(
            "    out.tex_coord0 = vec3<f32>((mul_mat4x3(u_material.tex_mtx[0], vec4<f32>(in.tex0, 1.0, 1.0))).xy, 1.0);"
        ));
        assert!(vs.contains("@location(2) tex_coord0: vec3<f32>,"));
        assert!(vs.contains("fn vs_main(in: VertexData) -> VertexOutput {"));
    }

    #[test]
    fn test_tex_gen_post_matrix() {
        let tex_gen = TexGenIr {
            kind: TexGenKindIr::Mtx3x4,
            source: TexGenSourceIr::Normal,
            matrix: TexGenMatrixIr::Identity,
            normalize: true,
            post_matrix: Some(4),
        };
        assert_eq!(
            tex_gen_expr(&tex_gen),
            "mul_mat4x3(u_material.post_tex_mtx[4], vec4<f32>(normalize(vec4<f32>(in.normal, 1.0).xyz), 1.0))"
        );

        let srtg = TexGenIr {
            kind: TexGenKindIr::Srtg,
            source: TexGenSourceIr::Color(1),
            matrix: TexGenMatrixIr::Texture(2),
            normalize: false,
            post_matrix: None,
        };
        assert_eq!(tex_gen_expr(&srtg), "vec3<f32>(out.color1.rg, 1.0)");
    }

    #[test]
    fn test_fragment_source() {
        let program = compile_material(&textured_material()).unwrap();
        let fs = &program.fragment_source;

        assert!(fs.contains("@group(1) @binding(4) var r_texture2: texture_2d<f32>;"));
        assert!(fs.contains("@group(1) @binding(5) var r_sampler2: sampler;"));
        assert!(!fs.contains("r_texture0"));
        assert!(fs.contains("    t_tex_coord = (in.tex_coord0.xy / in.tex_coord0.z);"));
        assert!(fs.contains(
            "    let t_tex0 = textureSampleBias(r_texture2, r_sampler2, t_tex_coord, u_scene.misc0.x + u_material.texture_params[2].w);"
        ));
        assert!(fs.contains(
            "    let t_tev0_b = tev_overflow(vec4<f32>(t_tex0.rgb, t_tex0.a));"
        ));
        assert!(fs.contains(
            "    let t_tev0_c = tev_overflow(vec4<f32>(saturate(in.color0).rgb, saturate(in.color0).a));"
        ));
        assert!(fs.contains("    let t_tev0_d = vec4<f32>(vec3<f32>(0.0), 0.0);"));
        assert!(fs.contains(
            "    t_color_prev = vec4<f32>(saturate(mix(t_tev0_a.rgb, t_tev0_b.rgb, t_tev0_c.rgb) + t_tev0_d.rgb), t_color_prev.a);"
        ));
        assert!(fs.contains(
            "    t_color_prev.a = saturate(mix(t_tev0_a.a, t_tev0_b.a, t_tev0_c.a) + t_tev0_d.a);"
        ));
        assert!(fs.contains("    var t_color2 = u_material.color[3];"));
        assert!(!fs.contains("discard"));
        assert!(fs.ends_with("    out.color = t_color_prev;\n    return out;\n}\n"));
    }

    #[test]
    fn test_bias_scale_and_compare() {
        let mut material = textured_material();
        material.tev_stages[0].color_bias = TevBias::SubHalf;
        material.tev_stages[0].color_scale = TevScale::Scale2;
        material.tev_stages[0].color_clamp = false;
        material.tev_stages[0].color_reg_id = Register::Reg1;
        material.tev_stages[0].alpha_op = TevOp::CompR8Gt;
        material.tev_stages[0].alpha_in_d = CombineAlphaInput::Konst;
        material.tev_stages[0].konst_alpha_sel = KonstAlphaSel::K2G;

        let fs = compile_material(&material).unwrap().fragment_source;
        assert!(fs.contains(
            "    t_color1 = vec4<f32>(((mix(t_tev0_a.rgb, t_tev0_b.rgb, t_tev0_c.rgb) + t_tev0_d.rgb + -0.5)) * 2.0, t_color1.a);"
        ));
        assert!(fs.contains(
            "    t_color_prev.a = saturate(select(0.0, t_tev0_c.a, t_tev0_a.r > t_tev0_b.r));"
        ));
        assert!(fs.contains("t_tev0_d = vec4<f32>(vec3<f32>(0.0), u_material.konst_color[2].g);"));
    }

    fn indirect_material() -> GXMaterial {
        let mut material = textured_material();
        material.ind_tex_stages.push(IndTexStage {
            tex_coord_id: TexCoordId(Some(0)),
            tex_map: TexMapId(Some(1)),
            scale_s: IndTexScale::S2,
            scale_t: IndTexScale::S4,
        });
        let stage = &mut material.tev_stages[0];
        stage.ind_tex_matrix = IndTexMtxId::M0;
        stage.ind_tex_bias_sel = IndTexBiasSel::St;
        stage.ind_tex_wrap_s = IndTexWrap::W256;
        stage.ind_tex_add_prev = true;
        material
    }

    fn combiner_material() -> GXMaterial {
        let mut material = textured_material();
        material.tex_gens.push(TexGen {
            gen_type: TexGenType::Mtx3x4,
            source: TexGenSrc::Nrm,
            matrix: TexGenMatrix::TexMtx3,
            normalize: true,
            post_matrix: PostTexGenMatrix::pt_tex_mtx(4),
        });
        material.tex_gens.push(TexGen {
            gen_type: TexGenType::Mtx2x4,
            source: TexGenSrc::TexCoord0,
            matrix: TexGenMatrix::Identity,
            ..Default::default()
        });
        material.tex_gens.push(TexGen {
            gen_type: TexGenType::Srtg,
            source: TexGenSrc::Color0,
            ..Default::default()
        });

        let stage = &mut material.tev_stages[0];
        stage.color_bias = TevBias::SubHalf;
        stage.color_scale = TevScale::Scale2;
        stage.color_clamp = false;
        stage.color_reg_id = Register::Reg1;
        stage.alpha_op = TevOp::CompR8Gt;
        stage.alpha_in_d = CombineAlphaInput::Konst;
        stage.konst_alpha_sel = KonstAlphaSel::K2G;

        material.tev_stages.push(TevStage {
            color_in_a: CombineColorInput::Konst,
            color_in_b: CombineColorInput::C1,
            color_in_c: CombineColorInput::TexA,
            color_in_d: CombineColorInput::Half,
            color_op: TevOp::Sub,
            konst_color_sel: KonstColorSel::K1R,
            alpha_in_a: CombineAlphaInput::Konst,
            konst_alpha_sel: KonstAlphaSel::Const3_8,
            tex_coord_id: TexCoordId(Some(3)),
            tex_map: TexMapId(Some(5)),
            channel_id: RasColorChannelId::Color1A1,
            ..Default::default()
        });
        material
    }

    fn validate_wgsl(label: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|error| panic!("{}: {}", label, error.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|error| panic!("{}: {:?}", label, error));
    }

    #[test]
    fn test_indirect_texture() {
        let material = indirect_material();
        let fs = compile_material(&material).unwrap().fragment_source;
        assert!(fs.contains(
            "    let t_ind_tex_coord0 = 255.0 * textureSampleBias(r_texture1, r_sampler1, (in.tex_coord0.xy / in.tex_coord0.z) * vec2<f32>(0.5, 0.25), u_scene.misc0.x + u_material.texture_params[1].w).abg;"
        ));
        assert!(fs.contains("    let t_tex_coord_base0 = (in.tex_coord0.xy / in.tex_coord0.z);"));
        assert!(fs.contains(
            "    t_tex_coord += vec2<f32>((t_tex_coord_base0.x % 256.0), t_tex_coord_base0.y) + mul_mat4x2(u_material.ind_tex_mtx[0], vec4<f32>(t_ind_tex_coord0 + vec3<f32>(-128.0, -128.0, 0.0), 0.0)) * (1.0 / u_material.texture_params[2].xy);"
        ));
    }

    #[test]
    fn test_alpha_test() {
        let mut material = textured_material();
        material.alpha_test = AlphaTest {
            op: AlphaOp::And,
            compare_a: CompareType::Greater,
            reference_a: 0.25,
            compare_b: CompareType::LEqual,
            reference_b: 0.75,
        };
        let fs = compile_material(&material).unwrap().fragment_source;
        assert!(fs.contains(
            "    if !((t_color_prev.a > 0.25) && (t_color_prev.a <= 0.75)) {\n        discard;\n    }\n"
        ));

        material.alpha_test = AlphaTest {
            op: AlphaOp::Xor,
            compare_a: CompareType::Always,
            compare_b: CompareType::Never,
            ..Default::default()
        };
        let program = compile_material(&material).unwrap();
        assert!(!program.ir.uses_discard());
        assert!(!program.fragment_source.contains("discard"));

        material.alpha_test.op = AlphaOp::And;
        let program = compile_material(&material).unwrap();
        assert_eq!(program.ir.alpha_test, AlphaTestIr::AlwaysFail);
        assert!(program
            .fragment_source
            .contains("    if true {\n        discard;\n    }\n    out.color = t_color_prev;\n"));
        validate_wgsl("always fail", &program.fragment_source);
    }

    #[test]
    fn test_generated_wgsl_validates() {
        init_logging();
        let alpha_tests = [
            AlphaTest::default(),
            AlphaTest {
                op: AlphaOp::And,
                compare_a: CompareType::Always,
                compare_b: CompareType::Never,
                ..Default::default()
            },
            AlphaTest {
                op: AlphaOp::Xor,
                compare_a: CompareType::Greater,
                reference_a: 0.25,
                compare_b: CompareType::Always,
                reference_b: 0.0,
            },
            AlphaTest {
                op: AlphaOp::Or,
                compare_a: CompareType::Less,
                reference_a: 0.5,
                compare_b: CompareType::NEqual,
                reference_b: 1.0,
            },
        ];

        let mut materials = vec![
            ("default", GXMaterial::default()),
            ("textured", textured_material()),
            ("indirect", indirect_material()),
        ];
        for (i, alpha_test) in alpha_tests.into_iter().enumerate() {
            let mut material = combiner_material();
            material.name = format!("combiner {}", i);
            material.alpha_test = alpha_test;
            materials.push(("combiner", material));
        }

        let mut kinds = Vec::new();
        for (label, material) in &materials {
            let program = compile_material(material).unwrap();
            validate_wgsl(label, &program.vertex_source);
            validate_wgsl(label, &program.fragment_source);
            kinds.push(std::mem::discriminant(&program.ir.alpha_test));
        }
        for alpha_test in [
            AlphaTestIr::AlwaysPass,
            AlphaTestIr::AlwaysFail,
            AlphaTestIr::Compare {
                op: AlphaOp::And,
                a: (CompareType::Always, 0.0),
                b: (CompareType::Always, 0.0),
            },
        ] {
            assert!(kinds.contains(&std::mem::discriminant(&alpha_test)));
        }

        let hacks = MaterialHacks {
            disable_textures: true,
            disable_vertex_colors: true,
            disable_lighting: true,
        };
        let program = compile_material_with(&indirect_material(), &hacks).unwrap();
        validate_wgsl("indirect without textures", &program.fragment_source);
    }

    #[test]
    fn test_empty_material() {
        let program = compile_material(&GXMaterial::default()).unwrap();
        assert!(program.ir.used_textures.is_empty());
        assert!(program.vertex_source.contains("    out.color0 = vec4<f32>(0.0);"));
        assert!(!program.fragment_source.contains("@group(1)"));
        assert!(program.fragment_source.contains("    var t_color_prev = u_material.color[0];"));
    }

    #[test]
    fn test_hacks_remove_textures() {
        let hacks = MaterialHacks {
            disable_textures: true,
            ..Default::default()
        };
        let program = compile_material_with(&textured_material(), &hacks).unwrap();
        assert!(!program.fragment_source.contains("textureSampleBias"));
        assert!(program
            .fragment_source
            .contains("    let t_tev0_b = tev_overflow(vec4<f32>(vec3<f32>(1.0), 1.0));"));
    }

    #[test]
    fn test_errors_propagate() {
        let mut material = textured_material();
        material.tex_gens[0].gen_type = TexGenType::Bump0;
        assert_eq!(
            compile_material(&material),
            Err(GXError::UnsupportedTexGenType(TexGenType::Bump0))
        );
        assert_eq!(lit(f32::INFINITY, "x"), Err(GXError::NonFiniteConstant { field: "x" }));
        assert_eq!(lit(3.0, "x").unwrap(), "3.0");
    }
}
