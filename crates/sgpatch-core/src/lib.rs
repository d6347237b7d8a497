//! sgpatch core - line-oriented shader rewriting engine
//!
//! This crate provides:
//! - `ShaderText`, an ordered line buffer that remembers its line endings
//! - A marker-driven region tracker (struct and function bodies)
//! - The instance-id, no-interpolation and UV type transforms
//! - The `Rewriter` that drives a single top-to-bottom scan
//!
//! The engine performs no I/O. Input is never mutated; every run produces a
//! fresh `ShaderText`.
//!
//! ```
//! use sgpatch_core::{rewrite, RewriteConfig, ShaderText};
//!
//! let input = ShaderText::parse("Shader \"Lit\"\n{\n}\n");
//! let output = rewrite(&input, &RewriteConfig::default()).unwrap();
//! assert_eq!(output.lines()[0], "Shader \"Lit_Patched\"");
//! ```

pub mod config;
pub mod error;
pub mod region;
pub mod rewriter;
pub mod rules;
pub mod text;
pub mod transform;

pub use config::{RewriteConfig, UV_CHANNELS, UvType};
pub use error::RewriteError;
pub use region::{ActiveRegions, LineRole, RegionKind, RegionTracker};
pub use rewriter::{Rewrite, RewriteReport, Rewriter, TransformStats};
pub use rules::RuleCatalogue;
pub use text::{LineEnding, ShaderText};

/// Rewrite `text` with the default marker catalogue.
pub fn rewrite(text: &ShaderText, config: &RewriteConfig) -> Result<ShaderText, RewriteError> {
    let rewriter = Rewriter::new(config.clone(), RuleCatalogue::default())?;
    Ok(rewriter.run(text)?.text)
}
