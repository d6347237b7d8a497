//! Rewrite orchestration
//!
//! One top-to-bottom pass over the input. The header line is renamed and
//! skips everything else; every other line goes through the region tracker
//! and then the enabled transforms in a fixed order: instance id,
//! no-interpolation, UV overrides. The pass is linear in the number of lines
//! and either yields a complete result or an error, never partial output.

use std::sync::Arc;

use crate::config::RewriteConfig;
use crate::error::RewriteError;
use crate::region::{RegionKind, RegionTracker};
use crate::rules::RuleCatalogue;
use crate::text::ShaderText;
use crate::transform::{
    InstanceIdTransform, LineContext, LineEdit, NoInterpolationTransform, Transform,
    UvOverrideTransform,
};

/// Edit counts for one transform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub name: &'static str,
    /// Lines whose text changed
    pub modified: usize,
    /// Lines dropped
    pub removed: usize,
    /// Lines inserted
    pub inserted: usize,
}

impl TransformStats {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn total(&self) -> usize {
        self.modified + self.removed + self.inserted
    }
}

/// What a rewrite did, for logging and diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub lines_in: usize,
    pub lines_out: usize,
    pub transforms: Vec<TransformStats>,
    /// Regions still open at end of input, with their marker line
    pub unclosed: Vec<(RegionKind, usize)>,
    /// Lines where two region kinds were active at once
    pub overlaps: Vec<(usize, RegionKind, RegionKind)>,
}

impl RewriteReport {
    pub fn total_edits(&self) -> usize {
        self.transforms.iter().map(TransformStats::total).sum()
    }

    pub fn stats(&self, name: &str) -> Option<&TransformStats> {
        self.transforms.iter().find(|t| t.name == name)
    }
}

/// Result of a successful rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: ShaderText,
    pub report: RewriteReport,
}

/// Configured rewrite engine.
///
/// Holds no per-run state; `run` can be called any number of times, from any
/// number of threads.
pub struct Rewriter {
    config: RewriteConfig,
    catalogue: Arc<RuleCatalogue>,
    transforms: Vec<Box<dyn Transform + Send + Sync>>,
    strict: bool,
}

impl Rewriter {
    /// Validate the configuration and compile the enabled transforms
    pub fn new(config: RewriteConfig, catalogue: RuleCatalogue) -> Result<Self, RewriteError> {
        config.validate()?;

        let empty = catalogue.empty_markers();
        if !empty.is_empty() {
            return Err(RewriteError::InvalidConfiguration(format!(
                "empty markers: {}",
                empty.join(", ")
            )));
        }

        let catalogue = Arc::new(catalogue);
        let mut transforms: Vec<Box<dyn Transform + Send + Sync>> = Vec::new();
        if config.patch_instance_id {
            transforms.push(Box::new(InstanceIdTransform::new(catalogue.clone())));
        }
        if config.patch_no_interpolation {
            transforms.push(Box::new(NoInterpolationTransform::new(catalogue.clone())?));
        }
        let uv = UvOverrideTransform::new(&catalogue, &config.uv_overrides)?;
        if !uv.is_noop() {
            transforms.push(Box::new(uv));
        }

        log::debug!(
            "rewriter ready: [{}]",
            transforms.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            config,
            catalogue,
            transforms,
            strict: false,
        })
    }

    /// Treat regions left open at end of input as an error
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &RuleCatalogue {
        &self.catalogue
    }

    pub fn run(&self, text: &ShaderText) -> Result<Rewrite, RewriteError> {
        let lines = text.lines();
        let Some(header) = lines.first() else {
            return Err(RewriteError::UnparsableConstruct {
                line: 1,
                region: None,
                reason: "input is empty",
                content: String::new(),
            });
        };

        let mut out = Vec::with_capacity(lines.len() + 4);
        out.push(rename_header(header, &self.config.name_suffix)?);

        let mut report = RewriteReport {
            lines_in: lines.len(),
            transforms: self.transforms.iter().map(|t| TransformStats::new(t.name())).collect(),
            ..Default::default()
        };
        let mut tracker = RegionTracker::new(&self.catalogue);

        for (index, line) in lines.iter().enumerate().skip(1) {
            let number = index + 1;
            let ctx = LineContext {
                number,
                previous: Some(lines[index - 1].as_str()),
                next: lines.get(index + 1).map(String::as_str),
                regions: tracker.advance(number, line),
            };

            if let Some((a, b)) = ctx.regions.overlap() {
                if report.overlaps.last().is_none_or(|&(_, la, lb)| (la, lb) != (a, b)) {
                    log::warn!("line {number}: regions {a} and {b} are active at the same time");
                }
                report.overlaps.push((number, a, b));
            }

            let mut edit = LineEdit::new(line);
            for (transform, stats) in self.transforms.iter().zip(report.transforms.iter_mut()) {
                if edit.is_dropped() {
                    break;
                }
                let before_line = edit.line().map(str::to_owned);
                let before_inserted = edit.inserted().len();

                transform.apply(&ctx, &mut edit)?;

                match (before_line.as_deref(), edit.line()) {
                    (Some(_), None) => stats.removed += 1,
                    (Some(a), Some(b)) if a != b => stats.modified += 1,
                    _ => {}
                }
                stats.inserted += edit.inserted().len() - before_inserted;
            }
            edit.emit_into(&mut out);
        }

        report.unclosed = tracker.unclosed();
        for &(kind, opened_at) in &report.unclosed {
            if self.strict {
                return Err(RewriteError::UnterminatedRegion { kind, opened_at });
            }
            log::warn!("region {kind} opened at line {opened_at} is never closed");
        }

        report.lines_out = out.len();
        log::debug!(
            "rewrote {} lines into {} ({} edits)",
            report.lines_in,
            report.lines_out,
            report.total_edits()
        );

        Ok(Rewrite {
            text: ShaderText::from_lines(out).with_line_ending(text.line_ending()),
            report,
        })
    }
}

/// Append `suffix` to the quoted name on the header line.
///
/// Everything from the last quote on is replaced, so `Shader "Foo" {`
/// becomes `Shader "Foo_Patched"`.
fn rename_header(header: &str, suffix: &str) -> Result<String, RewriteError> {
    let unparsable = |reason| RewriteError::UnparsableConstruct {
        line: 1,
        region: None,
        reason,
        content: header.to_string(),
    };

    let last = header.rfind('"').ok_or_else(|| unparsable("no quoted shader name"))?;
    if header[..last].find('"').is_none() {
        return Err(unparsable("unterminated shader name"));
    }
    Ok(format!("{}{suffix}\"", &header[..last]))
}
