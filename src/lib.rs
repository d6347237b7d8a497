//! sgpatch - rewrites shader graph output for indexed-indirect rendering
//!
//! The rewriting engine lives in `sgpatch-core` and the settings file in
//! `sgpatch-config`. This crate ties them to the filesystem:
//! - `resolver` - reads `.shader` files and delegates graph assets to a generator
//! - `output` - names and writes the patched sibling
//! - `pipeline` - resolve, rewrite and persist one input at a time
//! - `watcher` - re-patches inputs when they change

pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod watcher;

pub use output::{patched_path, write_shader};
pub use pipeline::{PatchOutcome, Patcher, PipelineError};
pub use resolver::{
    CommandGenerator, GeneratedShader, ResolveError, ResolvedSource, ShaderGenerator,
    SourceKind, SourceResolver,
};
pub use watcher::InputWatcher;
