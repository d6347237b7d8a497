//! Pipeline integration tests
//!
//! Config file -> patcher -> files on disk, using temp directories.

mod common;

use std::path::Path;

use common::{LIT_SHADER, TestEnvironment};
use sgpatch::{
    GeneratedShader, Patcher, PipelineError, ResolveError, ShaderGenerator, SourceKind,
    SourceResolver,
};
use sgpatch_config::Config;
use sgpatch_core::{RewriteConfig, Rewriter, RuleCatalogue};

/// Generator that returns the fixture for any graph
struct FixtureGenerator;

impl ShaderGenerator for FixtureGenerator {
    fn generate(&self, graph: &Path, _sub_graph: bool) -> Result<GeneratedShader, ResolveError> {
        Ok(GeneratedShader {
            name: graph.file_stem().unwrap().to_string_lossy().into_owned(),
            text: LIT_SHADER.to_string(),
        })
    }
}

fn default_patcher() -> Patcher {
    Patcher::from_config(&Config::default(), false).unwrap()
}

// === Files ===

#[test]
fn test_patch_shader_file() {
    let env = TestEnvironment::new();
    let input = env.write_input("Lit.shader", LIT_SHADER);

    let outcome = default_patcher().patch_file(&input).unwrap();
    assert_eq!(outcome.name, "Lit");
    assert_eq!(outcome.output, env.path().join("Lit_Patched.shader"));
    assert!(outcome.report.total_edits() > 0);

    let patched = env.read("Lit_Patched.shader");
    assert!(patched.starts_with("Shader \"Shader Graphs/Lit_Patched\"\n"));
    assert!(patched.contains("uint InstanceID;"));
    assert!(patched.contains("nointerpolation float4 NoInterpolationData"));
    assert_eq!(env.read("Lit.shader"), LIT_SHADER);
}

#[test]
fn test_failed_input_does_not_affect_others() {
    let env = TestEnvironment::new();
    let broken = env.write_input("Broken.shader", "no header here\n");
    let good = env.write_input("Good.shader", LIT_SHADER);
    let patcher = default_patcher();

    assert!(matches!(
        patcher.patch_file(&broken),
        Err(PipelineError::Rewrite { .. })
    ));
    assert!(patcher.patch_file(&good).is_ok());

    assert!(!env.path().join("Broken_Patched.shader").exists());
    assert!(env.path().join("Good_Patched.shader").exists());
}

#[test]
fn test_unsupported_extension() {
    let env = TestEnvironment::new();
    let input = env.write_input("Lit.hlsl", LIT_SHADER);
    let err = default_patcher().patch_file(&input).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Resolve(ResolveError::UnsupportedExtension(_))
    ));
}

// === Graph assets ===

#[test]
fn test_graph_through_generator() {
    let env = TestEnvironment::new();
    let graph = env.write_input("Water.shadergraph", "{}");
    assert_eq!(SourceKind::from_path(&graph).unwrap(), SourceKind::Graph);

    let rewriter = Rewriter::new(RewriteConfig::default(), RuleCatalogue::default()).unwrap();
    let patcher = Patcher::new(rewriter, SourceResolver::with_generator(FixtureGenerator));

    let outcome = patcher.patch_file(&graph).unwrap();
    assert_eq!(outcome.name, "Water");
    assert_eq!(outcome.output, env.path().join("Water_Patched.shader"));
    assert!(env.read("Water_Patched.shader").contains("_InstanceID_Out = IN.InstanceID;"));
}

#[test]
fn test_graph_without_generator_fails() {
    let env = TestEnvironment::new();
    let graph = env.write_input("Water.shadergraph", "{}");
    let err = default_patcher().patch_file(&graph).unwrap_err();
    assert!(matches!(err, PipelineError::Resolve(ResolveError::NoGenerator(_))));
}

// === Configuration ===

#[test]
fn test_config_file_drives_rewrite() {
    let env = TestEnvironment::new();
    let config_path = env.write_config(
        r#"
[patch]
instance_id = false
uv0 = "uint16"

[output]
suffix = "_Indirect"
"#,
    );
    let config = Config::load_from(&config_path).unwrap();
    let input = env.write_input("Lit.shader", LIT_SHADER);

    let outcome = Patcher::from_config(&config, false)
        .unwrap()
        .patch_file(&input)
        .unwrap();
    assert_eq!(outcome.output, env.path().join("Lit_Indirect.shader"));

    let patched = env.read("Lit_Indirect.shader");
    assert!(patched.starts_with("Shader \"Shader Graphs/Lit_Indirect\""));
    assert!(patched.contains("uint16_t4 uv0 : TEXCOORD0;"));
    assert!(patched.contains("float4 uv1 : TEXCOORD1;"));
    // Instance id disabled, no-interpolation still on
    assert!(patched.contains("UnityGetInstanceID_float(_InstanceID_Out);"));
    assert!(patched.contains("nointerpolation float4"));
}

#[test]
fn test_marker_override_from_config() {
    let env = TestEnvironment::new();
    let config_path = env.write_config(
        r#"
[markers]
no_interpolation_marker = "Flat"
"#,
    );
    let config = Config::load_from(&config_path).unwrap();
    let source = "Shader \"X\"\nstruct PackedVaryings\n{\n    float4 FlatIds : INTERP0;\n    float4 NoInterpolationData : INTERP1;\n};\n";
    let input = env.write_input("X.shader", source);

    Patcher::from_config(&config, false)
        .unwrap()
        .patch_file(&input)
        .unwrap();
    let patched = env.read("X_Patched.shader");
    assert!(patched.contains("    nointerpolation float4 FlatIds : INTERP0;\n"));
    assert!(patched.contains("    float4 NoInterpolationData : INTERP1;\n"));
}

#[test]
fn test_bad_uv_selector_fails_before_any_file() {
    let env = TestEnvironment::new();
    let config_path = env.write_config("[patch]\nuv2 = \"double\"\n");
    let config = Config::load_from(&config_path).unwrap();
    assert!(Patcher::from_config(&config, false).is_err());
}

#[test]
fn test_strict_mode_from_pipeline() {
    let env = TestEnvironment::new();
    let input = env.write_input("Open.shader", "Shader \"Open\"\nstruct Attributes\n{\n");
    let patcher = Patcher::from_config(&Config::default(), true).unwrap();
    assert!(matches!(
        patcher.patch_file(&input),
        Err(PipelineError::Rewrite { .. })
    ));
    assert!(!env.path().join("Open_Patched.shader").exists());
}
