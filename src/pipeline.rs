//! Resolve, rewrite, persist
//!
//! Each input is handled on its own: a failure for one path never affects
//! another, and nothing is written unless the rewrite succeeded completely.

use std::path::{Path, PathBuf};

use sgpatch_config::{Config, ConfigError};
use sgpatch_core::{Rewrite, RewriteError, RewriteReport, Rewriter};
use thiserror::Error;

use crate::output::{patched_path, write_shader};
use crate::resolver::{ResolveError, ResolvedSource, SourceResolver};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{path:?}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite the input {0:?}")]
    WouldOverwriteInput(PathBuf),
}

/// Result of patching one input
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: RewriteReport,
}

/// Rewriter plus resolver, built once and reused for every input
pub struct Patcher {
    rewriter: Rewriter,
    resolver: SourceResolver,
}

impl Patcher {
    pub fn new(rewriter: Rewriter, resolver: SourceResolver) -> Self {
        Self { rewriter, resolver }
    }

    pub fn from_config(config: &Config, strict: bool) -> Result<Self, ConfigError> {
        let rewriter = Rewriter::new(config.rewrite_config()?, config.markers.clone())?.strict(strict);
        Ok(Self::new(rewriter, SourceResolver::from_config(&config.generator)))
    }

    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    /// Resolve and rewrite without touching the filesystem
    pub fn rewrite(&self, path: &Path) -> Result<(ResolvedSource, Rewrite), PipelineError> {
        let source = self.resolver.resolve(path)?;
        let rewrite = self
            .rewriter
            .run(&source.text)
            .map_err(|e| PipelineError::Rewrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok((source, rewrite))
    }

    /// Patched source text, for printing instead of writing
    pub fn patch_to_string(&self, path: &Path) -> Result<String, PipelineError> {
        let (source, rewrite) = self.rewrite(path)?;
        log::debug!("{}: {} edits", source.name, rewrite.report.total_edits());
        Ok(rewrite.text.to_source())
    }

    /// Where the patched variant of `path` is written
    pub fn output_path(&self, path: &Path) -> PathBuf {
        patched_path(path, &self.rewriter.config().name_suffix)
    }

    /// Patch `path` and write the result next to it
    pub fn patch_file(&self, path: &Path) -> Result<PatchOutcome, PipelineError> {
        let output = self.output_path(path);
        if output == path {
            return Err(PipelineError::WouldOverwriteInput(path.to_path_buf()));
        }

        let (source, rewrite) = self.rewrite(path)?;
        write_shader(&output, &rewrite.text).map_err(|e| PipelineError::Write {
            path: output.clone(),
            source: e,
        })?;

        log::info!(
            "Patched {} -> {:?} ({} edits)",
            source.name,
            output,
            rewrite.report.total_edits()
        );
        Ok(PatchOutcome {
            name: source.name,
            input: path.to_path_buf(),
            output,
            report: rewrite.report,
        })
    }
}
