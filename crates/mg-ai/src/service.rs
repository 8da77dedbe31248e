//! Completion service capability.

use std::future::Future;

use crate::error::AiError;
use crate::http::HttpCompletionService;

/// Per-call options parsed from a directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Model override; the service default is used when `None`.
    pub model: Option<String>,
    /// Sampling temperature override.
    pub temperature: Option<f32>,
}

/// Asynchronous text completion.
///
/// The resolution pass only talks to completions through this trait, so
/// tests and alternative backends plug in without touching the pass.
pub trait CompletionService: Send + Sync {
    /// Whether the service may be called.
    ///
    /// When `false`, directives are replaced with a disabled marker and
    /// [`complete`](Self::complete) is never called.
    fn enabled(&self) -> bool;

    /// Complete a prompt.
    fn complete(
        &self,
        prompt: &str,
        options: &CallOptions,
    ) -> impl Future<Output = Result<String, AiError>> + Send;
}

/// Service that is always disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledService;

impl CompletionService for DisabledService {
    fn enabled(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _options: &CallOptions) -> Result<String, AiError> {
        Err(AiError::Disabled)
    }
}

/// Service selected at runtime from configuration.
#[derive(Debug)]
pub enum ConfiguredService {
    /// AI resolution is turned off.
    Disabled(DisabledService),
    /// OpenAI-compatible HTTP endpoint.
    Http(HttpCompletionService),
}

impl CompletionService for ConfiguredService {
    fn enabled(&self) -> bool {
        match self {
            Self::Disabled(s) => s.enabled(),
            Self::Http(s) => s.enabled(),
        }
    }

    async fn complete(&self, prompt: &str, options: &CallOptions) -> Result<String, AiError> {
        match self {
            Self::Disabled(s) => s.complete(prompt, options).await,
            Self::Http(s) => s.complete(prompt, options).await,
        }
    }
}
