//! Vertex display list decoding and material shader compilation for the GameCube/Wii GX
//! graphics pipeline.
//!
//! - [vtx_loader] turns GX display lists into packed vertex buffers and triangle lists.
//! - [compile_material] turns a [GXMaterial] into WGSL vertex and fragment programs, and
//!   [translate_render_flags] derives the matching render state.
//! - [lz77] decompresses the `LZ77\x10` container that assets are commonly stored in.
//!
//! Note: only the parts of the pipeline needed to display typical models are implemented.
//! Unsupported configurations are reported as [GXError]s rather than approximated.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub use config::*;
pub use error::*;
pub use material::*;
pub use program::*;
pub use render_flags::{texture_lod_bias, translate_render_flags, RenderFlags};

mod config;
mod error;
pub mod gx;
pub mod lz77;
mod material;
mod program;
pub mod program_ir;
#[cfg(feature = "wgpu")]
pub mod render;
pub mod render_flags;
pub mod uniforms;
pub mod util;
pub mod vtx_data;
pub mod vtx_format;
pub mod vtx_loader;
