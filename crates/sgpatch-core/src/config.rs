//! Rewrite configuration
//!
//! Selects which transforms run for a single rewrite. Parsing of user-facing
//! selector strings lives here so that a bad value fails before any line is
//! touched.

use std::fmt;
use std::str::FromStr;

use crate::error::RewriteError;

/// Number of texture coordinate channels that can be overridden
pub const UV_CHANNELS: usize = 4;

/// Suffix appended to the shader name and output file name
pub const DEFAULT_SUFFIX: &str = "_Patched";

/// Storage type for a UV channel override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UvType {
    /// Leave the channel untouched
    #[default]
    Default,
    /// 16-bit unsigned integer
    UInt16,
    /// 16-bit signed integer
    Int16,
    /// 32-bit unsigned integer
    UInt,
    /// 32-bit signed integer
    Int,
}

impl UvType {
    pub const ALL: [UvType; 5] = [
        UvType::Default,
        UvType::UInt16,
        UvType::Int16,
        UvType::UInt,
        UvType::Int,
    ];

    /// Scalar type keyword substituted for `float`/`half`
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            UvType::Default => None,
            UvType::UInt16 => Some("uint16_t"),
            UvType::Int16 => Some("int16_t"),
            UvType::UInt => Some("uint"),
            UvType::Int => Some("int"),
        }
    }

    /// Canonical selector name, accepted back by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            UvType::Default => "default",
            UvType::UInt16 => "uint16",
            UvType::Int16 => "int16",
            UvType::UInt => "uint",
            UvType::Int => "int",
        }
    }

    pub fn is_default(self) -> bool {
        self == UvType::Default
    }
}

impl fmt::Display for UvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UvType {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" | "none" => Ok(UvType::Default),
            "uint16" | "uint16_t" | "ushort" | "16-bit-unsigned" => Ok(UvType::UInt16),
            "int16" | "int16_t" | "short" | "16-bit-signed" => Ok(UvType::Int16),
            "uint" | "unsigned" => Ok(UvType::UInt),
            "int" | "signed" => Ok(UvType::Int),
            other => Err(RewriteError::InvalidConfiguration(format!(
                "unknown UV type '{other}' (expected one of: default, uint16, int16, uint, int)"
            ))),
        }
    }
}

/// Toggles and parameters for one rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Replace the instancing built-in with an explicit instance index
    pub patch_instance_id: bool,
    /// Flag `NoInterpolation` packed varyings as `nointerpolation`
    pub patch_no_interpolation: bool,
    /// Per-channel storage type for TEXCOORD0..3
    pub uv_overrides: [UvType; UV_CHANNELS],
    /// Appended to the quoted shader name on the header line
    pub name_suffix: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            patch_instance_id: true,
            patch_no_interpolation: true,
            uv_overrides: [UvType::Default; UV_CHANNELS],
            name_suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl RewriteConfig {
    /// Set the override for one channel
    pub fn with_uv(mut self, channel: usize, uv_type: UvType) -> Result<Self, RewriteError> {
        let slot = self.uv_overrides.get_mut(channel).ok_or_else(|| {
            RewriteError::InvalidConfiguration(format!(
                "UV channel {channel} out of range (0..{UV_CHANNELS})"
            ))
        })?;
        *slot = uv_type;
        Ok(self)
    }

    /// Parse selector strings for all channels at once
    pub fn with_uv_selectors<S: AsRef<str>>(
        mut self,
        selectors: &[S; UV_CHANNELS],
    ) -> Result<Self, RewriteError> {
        for (slot, selector) in self.uv_overrides.iter_mut().zip(selectors) {
            *slot = selector.as_ref().parse()?;
        }
        Ok(self)
    }

    pub fn any_uv_override(&self) -> bool {
        self.uv_overrides.iter().any(|t| !t.is_default())
    }

    pub fn validate(&self) -> Result<(), RewriteError> {
        if self.name_suffix.is_empty() {
            return Err(RewriteError::InvalidConfiguration(
                "name suffix must not be empty".to_string(),
            ));
        }
        if self.name_suffix.contains('"') || self.name_suffix.contains(['\n', '\r']) {
            return Err(RewriteError::InvalidConfiguration(format!(
                "name suffix {:?} must not contain quotes or line breaks",
                self.name_suffix
            )));
        }
        Ok(())
    }
}
