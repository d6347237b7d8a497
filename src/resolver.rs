//! Shader source resolution
//!
//! Produces a shader name and text from an input path. `.shader` files are
//! read directly; graph assets are handed to an external generator through
//! the `ShaderGenerator` trait, which is the only thing the rest of the crate
//! knows about graph compilation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use sgpatch_config::GeneratorConfig;
use sgpatch_core::ShaderText;
use thiserror::Error;

/// Input path meaning "read standard input"
pub const STDIN_PATH: &str = "-";

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unsupported input {0:?} (expected .shader, .shadergraph or .shadersubgraph)")]
    UnsupportedExtension(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No generator configured for graph asset {0:?} (set [generator] program)")]
    NoGenerator(PathBuf),

    #[error("Generator `{program}` failed for {path:?}: {message}")]
    Generator {
        program: String,
        path: PathBuf,
        message: String,
    },
}

/// What kind of asset an input path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Generated shader text
    Shader,
    Graph,
    SubGraph,
    /// Shader text on standard input
    Stdin,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, ResolveError> {
        if path.as_os_str() == STDIN_PATH {
            return Ok(SourceKind::Stdin);
        }
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match extension {
            "shader" => Ok(SourceKind::Shader),
            "shadergraph" | "ShaderGraph" => Ok(SourceKind::Graph),
            "shadersubgraph" => Ok(SourceKind::SubGraph),
            _ => Err(ResolveError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    pub fn is_graph(self) -> bool {
        matches!(self, SourceKind::Graph | SourceKind::SubGraph)
    }
}

/// Output of a graph-to-shader generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedShader {
    pub name: String,
    pub text: String,
}

/// Turns a graph asset into shader text
pub trait ShaderGenerator {
    fn generate(&self, graph: &Path, sub_graph: bool) -> Result<GeneratedShader, ResolveError>;
}

/// Runs an external program and reads the shader from its stdout
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    sub_graph_flag: String,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            sub_graph_flag: GeneratorConfig::default().sub_graph_flag,
        }
    }

    /// `None` when no program is configured
    pub fn from_config(config: &GeneratorConfig) -> Option<Self> {
        let program = config.program.as_ref().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program: program.clone(),
            args: config.args.clone(),
            sub_graph_flag: config.sub_graph_flag.clone(),
        })
    }

    fn expand_args(&self, graph: &Path, name: &str, sub_graph: bool) -> Vec<String> {
        let input = graph.to_string_lossy();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{name}", name))
            .collect();
        if sub_graph && !self.sub_graph_flag.is_empty() {
            args.push(self.sub_graph_flag.clone());
        }
        args
    }
}

impl ShaderGenerator for CommandGenerator {
    fn generate(&self, graph: &Path, sub_graph: bool) -> Result<GeneratedShader, ResolveError> {
        let name = file_stem(graph);
        let args = self.expand_args(graph, &name, sub_graph);
        let failure = |message: String| ResolveError::Generator {
            program: self.program.clone(),
            path: graph.to_path_buf(),
            message,
        };

        log::debug!("Running generator: {} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| failure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!("{} ({})", output.status, stderr.trim())));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|_| failure("output is not valid UTF-8".to_string()))?;
        if text.trim().is_empty() {
            return Err(failure("no shader text on stdout".to_string()));
        }

        Ok(GeneratedShader { name, text })
    }
}

/// A shader ready to be rewritten
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub name: String,
    pub kind: SourceKind,
    /// Input path; `-` for standard input
    pub path: PathBuf,
    pub text: ShaderText,
}

/// Reads shader files and delegates graph assets to a generator
#[derive(Default)]
pub struct SourceResolver {
    generator: Option<Box<dyn ShaderGenerator + Send + Sync>>,
}

impl SourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator(generator: impl ShaderGenerator + Send + Sync + 'static) -> Self {
        Self {
            generator: Some(Box::new(generator)),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        match CommandGenerator::from_config(config) {
            Some(generator) => Self::with_generator(generator),
            None => Self::new(),
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn resolve(&self, path: &Path) -> Result<ResolvedSource, ResolveError> {
        let kind = SourceKind::from_path(path)?;
        let (name, source) = match kind {
            SourceKind::Stdin => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .map_err(|e| ResolveError::Read {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                ("stdin".to_string(), source)
            }
            SourceKind::Shader => {
                let source = std::fs::read_to_string(path).map_err(|e| ResolveError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                (file_stem(path), source)
            }
            SourceKind::Graph | SourceKind::SubGraph => {
                let generator = self
                    .generator
                    .as_ref()
                    .ok_or_else(|| ResolveError::NoGenerator(path.to_path_buf()))?;
                let generated = generator.generate(path, kind == SourceKind::SubGraph)?;
                (generated.name, generated.text)
            }
        };

        log::debug!("Resolved {:?} as {:?} shader '{}'", path, kind, name);
        Ok(ResolvedSource {
            name,
            kind,
            path: path.to_path_buf(),
            text: ShaderText::parse(&source),
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator;

    impl ShaderGenerator for FixedGenerator {
        fn generate(&self, graph: &Path, sub_graph: bool) -> Result<GeneratedShader, ResolveError> {
            Ok(GeneratedShader {
                name: file_stem(graph),
                text: format!("Shader \"Graphs/{}\"\n// sub={}\n", file_stem(graph), sub_graph),
            })
        }
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/Lit.shader")).unwrap(), SourceKind::Shader);
        assert_eq!(SourceKind::from_path(Path::new("Lit.shadergraph")).unwrap(), SourceKind::Graph);
        assert_eq!(SourceKind::from_path(Path::new("Lit.ShaderGraph")).unwrap(), SourceKind::Graph);
        assert_eq!(
            SourceKind::from_path(Path::new("Noise.shadersubgraph")).unwrap(),
            SourceKind::SubGraph
        );
        assert_eq!(SourceKind::from_path(Path::new("-")).unwrap(), SourceKind::Stdin);
        assert!(SourceKind::from_path(Path::new("Lit.hlsl")).is_err());
        assert!(SourceKind::from_path(Path::new("Lit")).is_err());
    }

    #[test]
    fn test_graph_without_generator() {
        let resolver = SourceResolver::new();
        let err = resolver.resolve(Path::new("Lit.shadergraph")).unwrap_err();
        assert!(matches!(err, ResolveError::NoGenerator(_)));
    }

    #[test]
    fn test_graph_with_generator() {
        let resolver = SourceResolver::with_generator(FixedGenerator);
        let source = resolver.resolve(Path::new("assets/Noise.shadersubgraph")).unwrap();
        assert_eq!(source.name, "Noise");
        assert_eq!(source.kind, SourceKind::SubGraph);
        assert_eq!(source.text.lines()[0], "Shader \"Graphs/Noise\"");
        assert_eq!(source.text.lines()[1], "// sub=true");
    }

    #[test]
    fn test_missing_shader_file() {
        let resolver = SourceResolver::new();
        let err = resolver.resolve(Path::new("/nonexistent/dir/Lit.shader")).unwrap_err();
        assert!(matches!(err, ResolveError::Read { .. }));
    }

    #[test]
    fn test_expand_args() {
        let generator = CommandGenerator::new(
            "shadergen",
            vec!["--graph".to_string(), "{input}".to_string(), "--name={name}".to_string()],
        );
        let args = generator.expand_args(Path::new("g/Lit.shadergraph"), "Lit", true);
        assert_eq!(args, vec!["--graph", "g/Lit.shadergraph", "--name=Lit", "--subgraph"]);
    }

    #[test]
    fn test_generator_from_config() {
        assert!(CommandGenerator::from_config(&GeneratorConfig::default()).is_none());
        let config = GeneratorConfig {
            program: Some("shadergen".to_string()),
            ..GeneratorConfig::default()
        };
        assert!(SourceResolver::from_config(&config).has_generator());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_failure() {
        let generator = CommandGenerator::new("false", vec![]);
        let err = generator.generate(Path::new("Lit.shadergraph"), false).unwrap_err();
        assert!(matches!(err, ResolveError::Generator { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_stdout() {
        let generator = CommandGenerator::new(
            "sh",
            vec!["-c".to_string(), "printf 'Shader \"%s\"\\n' {name}".to_string()],
        );
        let generated = generator.generate(Path::new("dir/Lit.shadergraph"), false).unwrap();
        assert_eq!(generated.name, "Lit");
        assert_eq!(generated.text, "Shader \"Lit\"\n");
    }
}
