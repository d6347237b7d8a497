//! Explicit instance index
//!
//! Replaces the instancing built-in with an index that is always present in
//! the vertex inputs. Instanced draws stop working for the patched shader, but
//! it becomes usable with indexed-indirect draw calls.
//!
//! Per region:
//! - `Attributes`: the instancing guard and the `#endif` after the raw
//!   instance field are dropped, making the field unconditional.
//! - `VertexDescriptionInputs`: an `InstanceID` field follows `VertexID`.
//! - `BuildVertexDescriptionInputs`: the new field is filled from the input.
//! - `VertexDescriptionFunction`: accessor calls become plain assignments.
//!
//! Each insertion and replacement checks the next line first, so running the
//! transform on already patched text changes nothing.

use std::sync::Arc;

use crate::error::RewriteError;
use crate::region::RegionKind;
use crate::rules::RuleCatalogue;

use super::{LineContext, LineEdit, Transform, indentation};

pub struct InstanceIdTransform {
    rules: Arc<RuleCatalogue>,
    accessor_call: String,
}

impl InstanceIdTransform {
    pub fn new(rules: Arc<RuleCatalogue>) -> Self {
        let accessor_call = format!("{}(", rules.instance_id_accessor);
        Self {
            rules,
            accessor_call,
        }
    }

    fn patch_attributes(&self, ctx: &LineContext<'_>, line: &str, edit: &mut LineEdit) {
        if line.contains(&self.rules.instancing_guard) {
            log::debug!("line {}: dropping instancing guard", ctx.number);
            edit.drop_line();
        } else if line.contains(&self.rules.conditional_end)
            && ctx.previous_contains(&self.rules.raw_instance_field)
        {
            log::debug!("line {}: dropping guard terminator", ctx.number);
            edit.drop_line();
        }
    }

    fn patch_description_inputs(&self, ctx: &LineContext<'_>, line: &str, edit: &mut LineEdit) {
        let field = &self.rules.instance_index_field;
        if line.contains(&self.rules.vertex_index_field) && !ctx.next_contains(field) {
            log::debug!("line {}: inserting `{field}`", ctx.number);
            edit.insert_after(field);
        }
    }

    fn patch_build_inputs(&self, ctx: &LineContext<'_>, line: &str, edit: &mut LineEdit) {
        let assignment = &self.rules.instance_index_assignment;
        if line.contains(&self.rules.vertex_index_assignment) && !ctx.next_contains(assignment) {
            log::debug!("line {}: inserting `{assignment}`", ctx.number);
            edit.insert_after(assignment);
        }
    }

    fn patch_description_function(
        &self,
        ctx: &LineContext<'_>,
        line: &str,
        edit: &mut LineEdit,
    ) -> Result<(), RewriteError> {
        if !line.contains(&self.accessor_call) {
            return Ok(());
        }

        let identifier = accessor_argument(line, &self.accessor_call).map_err(|reason| {
            RewriteError::UnparsableConstruct {
                line: ctx.number,
                region: Some(RegionKind::VertexDescriptionFunction),
                reason,
                content: line.to_string(),
            }
        })?;

        let assignment = format!("{identifier} = {};", self.rules.instance_index_input);
        if ctx.next_contains(&assignment) {
            return Ok(());
        }

        log::debug!("line {}: replacing accessor call with `{assignment}`", ctx.number);
        edit.replace(format!("{}{assignment}", indentation(line)));
        Ok(())
    }
}

impl Transform for InstanceIdTransform {
    fn name(&self) -> &'static str {
        "instance-id"
    }

    fn apply(&self, ctx: &LineContext<'_>, edit: &mut LineEdit) -> Result<(), RewriteError> {
        let Some(line) = edit.line().map(str::to_owned) else {
            return Ok(());
        };

        if ctx.editable(RegionKind::Attributes) {
            self.patch_attributes(ctx, &line, edit);
            if edit.is_dropped() {
                return Ok(());
            }
        }
        if ctx.editable(RegionKind::VertexDescriptionInputs) {
            self.patch_description_inputs(ctx, &line, edit);
        }
        if ctx.editable(RegionKind::BuildVertexDescriptionInputs) {
            self.patch_build_inputs(ctx, &line, edit);
        }
        if ctx.editable(RegionKind::VertexDescriptionFunction) {
            self.patch_description_function(ctx, &line, edit)?;
        }
        Ok(())
    }
}

/// Extract `identifier` from `ACCESSOR(identifier);`.
///
/// The call must be the whole statement, take exactly one identifier and end
/// the line with `);`.
fn accessor_argument<'l>(line: &'l str, call: &str) -> Result<&'l str, &'static str> {
    let statement = line.trim();
    let Some(rest) = statement.strip_prefix(call) else {
        return Err("accessor call must be the whole statement");
    };
    let Some(argument) = rest.strip_suffix(");") else {
        return Err("expected `identifier);` after the accessor call");
    };
    if argument.contains(call) {
        return Err("more than one accessor call on the line");
    }
    if argument.contains([',', '(', ')']) {
        return Err("expected a single identifier argument");
    }

    let argument = argument.trim();
    if !is_identifier(argument) {
        return Err("accessor argument is not an identifier");
    }
    Ok(argument)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
