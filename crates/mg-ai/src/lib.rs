//! Resolution of `::ai` directives ahead of the directive engine.
//!
//! The pass scans the original document once, resolves each `::ai`
//! directive sequentially through a [`CompletionService`], and splices the
//! results (or inline markers) back by position. Its output is plain text
//! ready for the synchronous directive pass.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use mg_ai::{AiResolver, HttpCompletionService};
//!
//! # async fn run() {
//! let service = HttpCompletionService::new(
//!     "https://api.openai.com/v1",
//!     std::env::var("OPENAI_API_KEY").ok(),
//!     "gpt-4o-mini",
//!     Duration::from_secs(30),
//! );
//! let resolution = AiResolver::new(service).resolve("::ai Write a tagline").await;
//! println!("{}", resolution.content);
//! # }
//! ```

mod error;
mod http;
mod resolver;
mod scan;
mod service;

pub use error::AiError;
pub use http::HttpCompletionService;
pub use resolver::{AiResolver, DEFAULT_TIMEOUT, DISABLED_MARKER, Resolution, error_marker};
pub use scan::{AI_DIRECTIVE, AiDirective, DEFAULT_PROMPT, find_ai_directives};
pub use service::{CallOptions, CompletionService, ConfiguredService, DisabledService};
