//! Flat packed varyings
//!
//! Custom interpolators whose name contains the marker are declared
//! `nointerpolation` in the packed varyings struct. Only the four-component
//! float type is matched: the generator packs custom interpolators into
//! `float4` slots, so a narrower flat field would share its slot with
//! interpolated data. That constraint is on the graph author and is not
//! detected here.

use std::sync::Arc;

use regex::Regex;

use crate::error::RewriteError;
use crate::region::RegionKind;
use crate::rules::RuleCatalogue;

use super::{LineContext, LineEdit, Transform};

pub struct NoInterpolationTransform {
    rules: Arc<RuleCatalogue>,
    declaration: Regex,
}

impl NoInterpolationTransform {
    pub fn new(rules: Arc<RuleCatalogue>) -> Result<Self, RewriteError> {
        // `<type> <name containing marker>` with the type as a whole token
        let pattern = format!(
            r"(?:^|[^\w])({})\s+\w*{}\w*",
            regex::escape(&rules.no_interpolation_type),
            regex::escape(&rules.no_interpolation_marker),
        );
        let declaration = Regex::new(&pattern).map_err(|e| {
            RewriteError::InvalidConfiguration(format!("no-interpolation markers: {e}"))
        })?;
        Ok(Self { rules, declaration })
    }

    /// Byte offset of the type token to qualify, if the line needs it
    fn insertion_point(&self, line: &str) -> Option<usize> {
        if line.contains(&self.rules.no_interpolation_qualifier) {
            return None;
        }
        self.declaration
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.start())
    }
}

impl Transform for NoInterpolationTransform {
    fn name(&self) -> &'static str {
        "no-interpolation"
    }

    fn apply(&self, ctx: &LineContext<'_>, edit: &mut LineEdit) -> Result<(), RewriteError> {
        if !ctx.editable(RegionKind::PackedVaryings) {
            return Ok(());
        }
        let Some(line) = edit.line() else {
            return Ok(());
        };
        if let Some(pos) = self.insertion_point(line) {
            let mut patched = line.to_string();
            patched.insert_str(pos, &format!("{} ", self.rules.no_interpolation_qualifier));
            log::debug!("line {}: flat varying `{}`", ctx.number, patched.trim());
            edit.replace(patched);
        }
        Ok(())
    }
}
