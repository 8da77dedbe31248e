//! Line-oriented layout directives for Markdown sources.
//!
//! Authors write `::name args` on a line of its own, or wrap content in
//! `::name args` … `::end`. A [`DirectiveEngine`] runs every registered
//! handler over the document in priority order and returns the rewritten
//! text together with [`Diagnostic`]s for failed or unclaimed directives.
//!
//! # Architecture
//!
//! - [`HandlerRegistry`]: name → handler, kind, and priority
//! - [`DirectiveEngine`]: the synchronous rewrite pass
//! - [`split_sections`], [`DirectiveArgs`], [`evaluate`]: helpers handlers share
//! - [`register_builtins`]: the built-in layout, content, and conditional set
//!
//! The engine never suspends and keeps no per-document state. Anything that
//! needs I/O (such as resolving `::ai` directives) runs before it.
//!
//! # Example
//!
//! ```
//! use mg_directives::{DirectiveEngine, EngineConfig, PageData};
//!
//! let engine = DirectiveEngine::with_builtins(EngineConfig::default()).unwrap();
//! let out = engine.process("::columns 2\nLeft\n---\nRight\n::end", &PageData::new());
//!
//! assert!(out.content.starts_with(r#"<div class="columns columns-2">"#));
//! assert!(out.diagnostics.is_empty());
//! ```

mod args;
mod builtin;
mod condition;
mod context;
mod engine;
mod error;
mod registry;
pub mod scan;
mod split;

pub use args::{DirectiveArgs, parse_args};
pub use builtin::register_builtins;
pub use condition::{evaluate, is_truthy};
pub use context::{DirectiveMatch, MatchKind, PageData};
pub use engine::{Diagnostic, DirectiveEngine, EngineConfig, Processed, UnknownDirectivePolicy};
pub use error::{HandlerError, RegistryError};
pub use registry::{
    DEFAULT_PRIORITY, DirectiveHandler, DirectiveKind, HandlerRegistry, RegisterOptions,
    Registration,
};
pub use split::{DEFAULT_DELIMITER, split_sections};
