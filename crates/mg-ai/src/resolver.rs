//! Resolution pass for `::ai` directives.

use std::time::Duration;

use mg_directives::scan::{LineRules, splice};

use crate::error::AiError;
use crate::scan::find_ai_directives;
use crate::service::{CallOptions, CompletionService};

/// Replacement for every directive when the service is disabled.
pub const DISABLED_MARKER: &str = "[AI disabled]";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error message kept in a marker, in characters.
const MARKER_MESSAGE_LIMIT: usize = 200;

/// Inline replacement for a failed call.
///
/// The message is collapsed onto one line and cut to
/// [`MARKER_MESSAGE_LIMIT`] characters, so a multi-line response body
/// cannot break the surrounding Markdown.
pub fn error_marker(error: &AiError) -> String {
    let message = error.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
    match message.char_indices().nth(MARKER_MESSAGE_LIMIT) {
        Some((cut, _)) => format!("[AI error: {}…]", message[..cut].trim_end()),
        None => format!("[AI error: {message}]"),
    }
}

/// Result of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Text with every `::ai` directive replaced.
    pub content: String,
    /// Directives replaced by a completion.
    pub resolved: usize,
    /// Directives replaced by an error marker.
    pub failed: usize,
    /// Directives replaced by the disabled marker.
    pub skipped: usize,
}

/// Resolves `::ai` directives through a [`CompletionService`].
///
/// Directives are resolved one at a time in document order, then all
/// results are spliced in by position. Two byte-identical directives each
/// receive their own completion.
///
/// # Example
///
/// ```
/// use mg_ai::{AiResolver, DisabledService};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let resolver = AiResolver::new(DisabledService);
/// let out = resolver.resolve("::ai Say hi\nText").await;
/// assert_eq!(out.content, "[AI disabled]\nText");
/// # });
/// ```
#[derive(Debug)]
pub struct AiResolver<S> {
    service: S,
    timeout: Duration,
    rules: LineRules,
}

impl<S: CompletionService> AiResolver<S> {
    /// Create a resolver with the default timeout and line rules.
    pub fn new(service: S) -> Self {
        Self {
            service,
            timeout: DEFAULT_TIMEOUT,
            rules: LineRules::default(),
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set line eligibility rules, matching the directive engine's.
    #[must_use]
    pub fn with_line_rules(mut self, rules: LineRules) -> Self {
        self.rules = rules;
        self
    }

    /// Resolve every `::ai` directive in `content`.
    ///
    /// Never fails: a failed call becomes an inline error marker for that
    /// occurrence only.
    pub async fn resolve(&self, content: &str) -> Resolution {
        let directives = find_ai_directives(content, self.rules);
        let mut resolution = Resolution {
            content: String::new(),
            resolved: 0,
            failed: 0,
            skipped: 0,
        };

        if directives.is_empty() {
            resolution.content = content.to_owned();
            return resolution;
        }

        let enabled = self.service.enabled();
        let mut replacements = Vec::with_capacity(directives.len());

        for directive in directives {
            let text = if enabled {
                match self.call(&directive.prompt, &directive.options).await {
                    Ok(text) => {
                        resolution.resolved += 1;
                        text.trim().to_owned()
                    }
                    Err(e) => {
                        tracing::warn!(line = directive.line, error = %e, "AI directive failed");
                        resolution.failed += 1;
                        error_marker(&e)
                    }
                }
            } else {
                resolution.skipped += 1;
                DISABLED_MARKER.to_owned()
            };
            replacements.push((directive.span, text));
        }

        tracing::info!(
            resolved = resolution.resolved,
            failed = resolution.failed,
            skipped = resolution.skipped,
            "Resolved AI directives"
        );
        resolution.content = splice(content, &replacements);
        resolution
    }

    async fn call(&self, prompt: &str, options: &CallOptions) -> Result<String, AiError> {
        tokio::time::timeout(self.timeout, self.service.complete(prompt, options))
            .await
            .map_err(|_| AiError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::service::DisabledService;
    use pretty_assertions::assert_eq;

    /// Returns scripted results in call order and tracks overlap.
    struct Scripted {
        results: Mutex<VecDeque<Result<String, AiError>>>,
        calls: Mutex<Vec<(String, CallOptions)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Scripted {
        fn new(results: Vec<Result<String, AiError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl CompletionService for Scripted {
        fn enabled(&self) -> bool {
            true
        }

        async fn complete(&self, prompt: &str, options: &CallOptions) -> Result<String, AiError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_owned(), options.clone()));
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AiError::Transport("script exhausted".to_owned())))
        }
    }

    /// Never answers.
    struct Hanging;

    impl CompletionService for Hanging {
        fn enabled(&self) -> bool {
            true
        }

        async fn complete(&self, _prompt: &str, _options: &CallOptions) -> Result<String, AiError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_owned())
        }
    }

    #[tokio::test]
    async fn test_identical_lines_get_responses_in_call_order() {
        let resolver = AiResolver::new(Scripted::new(vec![
            Ok("first".to_owned()),
            Ok("second".to_owned()),
        ]));
        let out = resolver.resolve("::ai hello\n::ai hello\n").await;
        assert_eq!(out.content, "first\nsecond\n");
        assert_eq!(out.resolved, 2);
        assert_eq!(resolver.service.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let resolver = AiResolver::new(Scripted::new(vec![
            Ok("ok one".to_owned()),
            Err(AiError::Http {
                status: 500,
                body: "boom".to_owned(),
            }),
            Ok("ok three".to_owned()),
        ]));
        let out = resolver.resolve("::ai a\n::ai b\n::ai c").await;
        assert_eq!(out.content, "ok one\n[AI error: HTTP 500: boom]\nok three");
        assert_eq!((out.resolved, out.failed), (2, 1));
    }

    #[tokio::test]
    async fn test_disabled_marker_for_every_directive() {
        let resolver = AiResolver::new(DisabledService);
        let out = resolver
            .resolve("::ai inline\n::ai model=x\nbody\n::end\ntext")
            .await;
        assert_eq!(out.content, "[AI disabled]\n[AI disabled]\ntext");
        assert_eq!(out.skipped, 2);
        assert_eq!(out.resolved, 0);
    }

    #[tokio::test]
    async fn test_block_prompt_and_options_forwarded() {
        let resolver = AiResolver::new(Scripted::new(vec![Ok("  answer \n".to_owned())]));
        let out = resolver
            .resolve("before\n::ai model=tiny\nWhat is Rust?\n::end\nafter")
            .await;
        assert_eq!(out.content, "before\nanswer\nafter");

        let calls = resolver.service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "What is Rust?");
        assert_eq!(calls[0].1.model.as_deref(), Some("tiny"));
    }

    #[test]
    fn test_error_marker_stays_on_one_line() {
        let error = AiError::Http {
            status: 400,
            body: "{\n  \"error\": {\n    \"message\": \"bad model\"\n  }\n}".to_owned(),
        };
        assert_eq!(
            error_marker(&error),
            "[AI error: HTTP 400: { \"error\": { \"message\": \"bad model\" } }]"
        );
    }

    #[test]
    fn test_error_marker_truncates_long_bodies() {
        let error = AiError::Http {
            status: 502,
            body: "é".repeat(500),
        };
        let marker = error_marker(&error);
        assert!(marker.starts_with("[AI error: HTTP 502: éé"));
        assert!(marker.ends_with("é…]"));
        assert_eq!(marker.chars().count(), "[AI error: ".len() + MARKER_MESSAGE_LIMIT + "…]".chars().count());
    }

    #[tokio::test]
    async fn test_multiline_failure_keeps_lines_intact() {
        let resolver = AiResolver::new(Scripted::new(vec![Err(AiError::Http {
            status: 500,
            body: "line one\n\n::end\nline two".to_owned(),
        })]));
        let out = resolver.resolve("before\n::ai a\nafter").await;
        assert_eq!(out.content, "before\n[AI error: HTTP 500: line one ::end line two]\nafter");
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_marker() {
        let resolver = AiResolver::new(Hanging).with_timeout(Duration::from_millis(20));
        let out = resolver.resolve("::ai slow").await;
        assert_eq!(out.content, "[AI error: timed out after 0.02s]");
        assert_eq!(out.failed, 1);
    }

    #[tokio::test]
    async fn test_no_directives_is_passthrough() {
        let resolver = AiResolver::new(Scripted::new(Vec::new()));
        let out = resolver.resolve("plain text\n::aim high").await;
        assert_eq!(out.content, "plain text\n::aim high");
        assert!(resolver.service.calls.lock().unwrap().is_empty());
    }
}
