//! UV channel storage types
//!
//! Narrows `float`/`half` texture coordinate fields to integer types, per
//! channel. A line belongs to channel N when its trailing semantic is that
//! channel's `TEXCOORDN`. Type keywords are replaced as whole tokens, keeping
//! any vector or matrix suffix (`float2` becomes `uint2`).

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::config::{UV_CHANNELS, UvType};
use crate::error::RewriteError;
use crate::rules::RuleCatalogue;

use super::{LineContext, LineEdit, Transform};

/// Float type keywords with an optional `N` or `NxM` suffix (compiled once)
fn float_type_regex() -> &'static Regex {
    static FLOAT_TYPE: OnceLock<Regex> = OnceLock::new();
    FLOAT_TYPE.get_or_init(|| {
        Regex::new(r"\b(?:float|half)([1-4](?:x[1-4])?)?\b").expect("Invalid float type regex")
    })
}

struct Channel {
    semantic: Regex,
    keyword: &'static str,
}

pub struct UvOverrideTransform {
    channels: Vec<(usize, Channel)>,
}

impl UvOverrideTransform {
    pub fn new(rules: &RuleCatalogue, overrides: &[UvType; UV_CHANNELS]) -> Result<Self, RewriteError> {
        let mut channels = Vec::new();
        for (index, uv_type) in overrides.iter().enumerate() {
            let Some(keyword) = uv_type.keyword() else {
                continue;
            };
            let pattern = format!(
                r":\s*{}\s*;\s*(?://.*)?$",
                regex::escape(rules.uv_semantics[index].trim())
            );
            let semantic = Regex::new(&pattern).map_err(|e| {
                RewriteError::InvalidConfiguration(format!("UV{index} semantic: {e}"))
            })?;
            channels.push((index, Channel { semantic, keyword }));
        }
        Ok(Self { channels })
    }

    pub fn is_noop(&self) -> bool {
        self.channels.is_empty()
    }

    /// Rewritten line for the first matching channel
    fn narrow(&self, line: &str) -> Option<(usize, String)> {
        let (index, channel) = self
            .channels
            .iter()
            .find(|(_, channel)| channel.semantic.is_match(line))?;
        let narrowed = float_type_regex().replace_all(line, |caps: &Captures| {
            let suffix = caps.get(1).map_or("", |m| m.as_str());
            format!("{}{suffix}", channel.keyword)
        });
        Some((*index, narrowed.into_owned()))
    }
}

impl Transform for UvOverrideTransform {
    fn name(&self) -> &'static str {
        "uv-override"
    }

    fn apply(&self, ctx: &LineContext<'_>, edit: &mut LineEdit) -> Result<(), RewriteError> {
        let Some(line) = edit.line() else {
            return Ok(());
        };
        if let Some((index, narrowed)) = self.narrow(line) {
            if narrowed != line {
                log::debug!("line {}: UV{index} -> `{}`", ctx.number, narrowed.trim());
                edit.replace(narrowed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(overrides: [UvType; UV_CHANNELS]) -> UvOverrideTransform {
        UvOverrideTransform::new(&RuleCatalogue::default(), &overrides).unwrap()
    }

    fn narrow(t: &UvOverrideTransform, line: &str) -> String {
        t.narrow(line).map(|(_, s)| s).unwrap_or_else(|| line.to_string())
    }

    #[test]
    fn test_uv0_uint() {
        let t = transform([UvType::UInt, UvType::Default, UvType::Default, UvType::Default]);
        assert_eq!(narrow(&t, "float2 uv0 : TEXCOORD0;"), "uint2 uv0 : TEXCOORD0;");
    }

    #[test]
    fn test_half_and_16bit() {
        let t = transform([UvType::Default, UvType::UInt16, UvType::Default, UvType::Int16]);
        assert_eq!(
            narrow(&t, "    half4 uv1 : TEXCOORD1;"),
            "    uint16_t4 uv1 : TEXCOORD1;"
        );
        assert_eq!(narrow(&t, "float uv3 : TEXCOORD3;"), "int16_t uv3 : TEXCOORD3;");
    }

    #[test]
    fn test_channels_independent() {
        let t = transform([UvType::Default, UvType::Default, UvType::Int, UvType::Default]);
        for line in [
            "float4 uv0 : TEXCOORD0;",
            "float4 uv1 : TEXCOORD1;",
            "float4 uv3 : TEXCOORD3;",
        ] {
            assert_eq!(narrow(&t, line), line);
        }
        assert_eq!(narrow(&t, "float4 uv2 : TEXCOORD2;"), "int4 uv2 : TEXCOORD2;");
    }

    #[test]
    fn test_semantic_must_be_trailing() {
        let t = transform([UvType::UInt; UV_CHANNELS]);
        // TEXCOORD0 is a prefix of TEXCOORD01 but not the same semantic
        assert_eq!(narrow(&t, "float2 a : TEXCOORD01;"), "float2 a : TEXCOORD01;");
        assert_eq!(narrow(&t, "float2 a : TEXCOORD0; // base uv"), "uint2 a : TEXCOORD0; // base uv");
        assert_eq!(narrow(&t, "float2 a :TEXCOORD0 ;"), "uint2 a :TEXCOORD0 ;");
    }

    #[test]
    fn test_token_boundaries() {
        let t = transform([UvType::UInt, UvType::Default, UvType::Default, UvType::Default]);
        assert_eq!(
            narrow(&t, "float2 floaty_halfway : TEXCOORD0;"),
            "uint2 floaty_halfway : TEXCOORD0;"
        );
        assert_eq!(
            narrow(&t, "min16float2 uv0 : TEXCOORD0;"),
            "min16float2 uv0 : TEXCOORD0;"
        );
    }

    #[test]
    fn test_default_is_noop() {
        let t = transform([UvType::Default; UV_CHANNELS]);
        assert!(t.is_noop());
        assert_eq!(narrow(&t, "float2 uv0 : TEXCOORD0;"), "float2 uv0 : TEXCOORD0;");
    }
}
