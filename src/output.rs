//! Output naming and persistence
//!
//! Patched shaders are written next to their source as
//! `<stem><suffix>.shader`. Graph assets produce a shader file too, so
//! `Lit.shadergraph` becomes `Lit_Patched.shader`.

use std::path::{Path, PathBuf};

use sgpatch_core::ShaderText;

/// Extension of every written file
pub const SHADER_EXTENSION: &str = "shader";

/// Sibling path for the patched variant of `input`
pub fn patched_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{SHADER_EXTENSION}"))
}

/// Write the shader, terminating every line
pub fn write_shader(path: &Path, text: &ShaderText) -> std::io::Result<()> {
    std::fs::write(path, text.to_source())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patched_path_shader() {
        assert_eq!(
            patched_path(Path::new("Assets/Shaders/Lit.shader"), "_Patched"),
            PathBuf::from("Assets/Shaders/Lit_Patched.shader")
        );
    }

    #[test]
    fn test_patched_path_graph() {
        assert_eq!(
            patched_path(Path::new("Assets/Lit.shadergraph"), "_Patched"),
            PathBuf::from("Assets/Lit_Patched.shader")
        );
        assert_eq!(
            patched_path(Path::new("Noise.shadersubgraph"), "_Flat"),
            PathBuf::from("Noise_Flat.shader")
        );
    }

    #[test]
    fn test_patched_path_keeps_inner_dots() {
        assert_eq!(
            patched_path(Path::new("My.Lit.shader"), "_Patched"),
            PathBuf::from("My.Lit_Patched.shader")
        );
    }

    #[test]
    fn test_write_shader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Out.shader");
        write_shader(&path, &ShaderText::parse("Shader \"A\"\n{\n}")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Shader \"A\"\n{\n}\n");
    }
}
