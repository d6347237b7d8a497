//! Line transforms
//!
//! A transform looks at one source line at a time, together with one line of
//! lookbehind and lookahead and the roles of any active regions, and edits the
//! pending output for that line.

mod instance_id;
mod no_interpolation;
mod uv_override;

pub use instance_id::InstanceIdTransform;
pub use no_interpolation::NoInterpolationTransform;
pub use uv_override::UvOverrideTransform;

use crate::error::RewriteError;
use crate::region::{ActiveRegions, RegionKind};

/// What a transform can see of the current line
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// 1-based line number in the input
    pub number: usize,
    /// Source line before the current one
    pub previous: Option<&'a str>,
    /// Source line after the current one
    pub next: Option<&'a str>,
    pub regions: ActiveRegions,
}

impl LineContext<'_> {
    pub fn editable(&self, kind: RegionKind) -> bool {
        self.regions.editable(kind)
    }

    pub fn next_contains(&self, needle: &str) -> bool {
        self.next.is_some_and(|next| next.contains(needle))
    }

    pub fn previous_contains(&self, needle: &str) -> bool {
        self.previous.is_some_and(|previous| previous.contains(needle))
    }
}

/// Pending output for one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    line: Option<String>,
    original: String,
    inserted: Vec<String>,
}

impl LineEdit {
    pub fn new(line: &str) -> Self {
        Self {
            line: Some(line.to_string()),
            original: line.to_string(),
            inserted: Vec::new(),
        }
    }

    /// Current text, `None` once dropped
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    pub fn is_dropped(&self) -> bool {
        self.line.is_none()
    }

    pub fn drop_line(&mut self) {
        self.line = None;
    }

    pub fn replace(&mut self, text: String) {
        self.line = Some(text);
    }

    /// Queue a line after the current one, indented like the source line
    pub fn insert_after(&mut self, text: &str) {
        let indent = indentation(&self.original);
        self.inserted.push(format!("{indent}{text}"));
    }

    pub fn is_modified(&self) -> bool {
        self.line.as_deref() != Some(self.original.as_str())
    }

    pub fn inserted(&self) -> &[String] {
        &self.inserted
    }

    /// Emit the surviving line followed by inserted lines
    pub fn emit_into(self, out: &mut Vec<String>) {
        out.extend(self.line);
        out.extend(self.inserted);
    }
}

/// A rewrite rule applied line by line
pub trait Transform {
    fn name(&self) -> &'static str;

    /// Edit the pending output for the current line.
    ///
    /// Not called once an earlier transform has dropped the line.
    fn apply(&self, ctx: &LineContext<'_>, edit: &mut LineEdit) -> Result<(), RewriteError>;
}

/// Leading whitespace of a line
pub(crate) fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
