//! Common test utilities and harness
//!
//! Provides reusable utilities for functional testing including:
//! - Test environment setup (temp directories, configs, input shaders)
//! - A generated shader fixture shaped like real shader graph output
//! - Assertion helpers over rewritten line lists

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sgpatch_core::{RewriteConfig, Rewriter, RuleCatalogue, ShaderText};
use tempfile::TempDir;

/// Generated shader with every construct the rewriter touches
pub const LIT_SHADER: &str = r#"Shader "Shader Graphs/Lit"
{
    SubShader
    {
        Pass
        {
            Name "Universal Forward"
            HLSLPROGRAM
            struct Attributes
            {
                 float3 positionOS : POSITION;
                 float3 normalOS : NORMAL;
                 float4 uv0 : TEXCOORD0;
                 float4 uv1 : TEXCOORD1;
                #if UNITY_ANY_INSTANCING_ENABLED
                 uint instanceID : INSTANCEID_SEMANTIC;
                #endif
                 uint vertexID : SV_VertexID;
            };
            struct PackedVaryings
            {
                 float4 positionCS : SV_POSITION;
                 float4 NoInterpolationData : INTERP0;
                 float3 normalWS : INTERP1;
                #if UNITY_ANY_INSTANCING_ENABLED
                 uint instanceID : CUSTOM_INSTANCE_ID;
                #endif
            };
            struct VertexDescriptionInputs
            {
                 float3 ObjectSpaceNormal;
                 uint VertexID;
            };
            VertexDescriptionInputs BuildVertexDescriptionInputs(Attributes input)
            {
                VertexDescriptionInputs output;
                ZERO_INITIALIZE(VertexDescriptionInputs, output);
                output.ObjectSpaceNormal = input.normalOS;
                output.VertexID = input.vertexID;
                return output;
            }
            VertexDescription VertexDescriptionFunction(VertexDescriptionInputs IN)
            {
                VertexDescription description = (VertexDescription)0;
                float _InstanceID_Out;
                UnityGetInstanceID_float(_InstanceID_Out);
                description.Position = IN.ObjectSpaceNormal * _InstanceID_Out;
                return description;
            }
            ENDHLSL
        }
    }
}
"#;

/// Test environment with an isolated working directory
pub struct TestEnvironment {
    /// Temporary directory holding configs and shaders
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a test config file and return its path
    pub fn write_config(&self, content: &str) -> PathBuf {
        let config_path = self.path().join("config.toml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }

    /// Write an input file and return its path
    pub fn write_input(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.path().join(file_name);
        std::fs::write(&path, content).expect("Failed to write test input");
        path
    }

    /// Read a file from the environment
    pub fn read(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.path().join(file_name)).expect("Failed to read test output")
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewriter with the default markers
pub fn rewriter(config: RewriteConfig) -> Rewriter {
    Rewriter::new(config, RuleCatalogue::default()).expect("Failed to build rewriter")
}

/// Rewrite `source` and return the output lines
pub fn rewrite_lines(config: RewriteConfig, source: &str) -> Vec<String> {
    rewriter(config)
        .run(&ShaderText::parse(source))
        .expect("Rewrite failed")
        .text
        .into_lines()
}

/// Index of the first line whose trimmed text equals `needle`
pub fn position(lines: &[String], needle: &str) -> Option<usize> {
    lines.iter().position(|l| l.trim() == needle)
}

/// Assert `needle` appears exactly `count` times as a trimmed line
pub fn assert_line_count(lines: &[String], needle: &str, count: usize) {
    let found = lines.iter().filter(|l| l.trim() == needle).count();
    assert_eq!(found, count, "expected {} x `{}`, found {}", count, needle, found);
}
