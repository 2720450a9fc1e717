use serde::{Deserialize, Serialize};

/// Options that simplify a material when compiling it, mostly for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialHacks {
    /// Replace every texture sample with opaque white.
    pub disable_textures: bool,
    /// Replace vertex-sourced channel colors with opaque white.
    pub disable_vertex_colors: bool,
    /// Treat every color channel as unlit.
    pub disable_lighting: bool,
}

impl Default for MaterialHacks {
    fn default() -> Self {
        Self {
            disable_textures: false,
            disable_vertex_colors: false,
            disable_lighting: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_json() {
        let hacks: MaterialHacks = serde_json::from_str(r#"{"disable_lighting": true}"#).unwrap();
        assert_eq!(
            hacks,
            MaterialHacks {
                disable_lighting: true,
                ..Default::default()
            }
        );

        let hacks: MaterialHacks = serde_json::from_str("{}").unwrap();
        assert_eq!(hacks, MaterialHacks::default());
    }
}
