//! Rewrite errors

use thiserror::Error;

use crate::region::RegionKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// A marker matched but the line did not have the expected shape
    #[error("Unparsable construct at line {line}{}: {reason}: `{content}`", region_suffix(.region))]
    UnparsableConstruct {
        /// 1-based line number in the input
        line: usize,
        region: Option<RegionKind>,
        reason: &'static str,
        content: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Only raised in strict mode
    #[error("Region {kind} opened at line {opened_at} is never closed")]
    UnterminatedRegion { kind: RegionKind, opened_at: usize },
}

fn region_suffix(region: &Option<RegionKind>) -> String {
    match region {
        Some(kind) => format!(" in {kind}"),
        None => String::new(),
    }
}

impl RewriteError {
    /// 1-based line number the error points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            RewriteError::UnparsableConstruct { line, .. } => Some(*line),
            RewriteError::UnterminatedRegion { opened_at, .. } => Some(*opened_at),
            RewriteError::InvalidConfiguration(_) => None,
        }
    }

    pub fn region(&self) -> Option<RegionKind> {
        match self {
            RewriteError::UnparsableConstruct { region, .. } => *region,
            RewriteError::UnterminatedRegion { kind, .. } => Some(*kind),
            RewriteError::InvalidConfiguration(_) => None,
        }
    }
}
