//! Directive engine.
//!
//! Runs every registered handler over the document in priority order. Each
//! handler rewrites the whole current text, so later handlers observe the
//! output of earlier ones. A final scan reports (or strips) `::name` lines
//! that no handler claimed.

use std::ops::Range;

use crate::context::{DirectiveMatch, PageData};
use crate::error::RegistryError;
use crate::registry::{HandlerRegistry, Registration};
use crate::scan::{
    Line, LineRules, directive_name, eligible_lines, find_block_end, find_leaf_block_end, lines,
    splice, strip_marker,
};
use crate::split::DEFAULT_DELIMITER;

/// What to do with directive lines that no handler claimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnknownDirectivePolicy {
    /// Keep the line and report a diagnostic.
    #[default]
    Warn,
    /// Remove the line and report a diagnostic.
    Strip,
}

/// Configuration for the directive engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Policy for unprocessed directives.
    ///
    /// Default: [`UnknownDirectivePolicy::Warn`]
    pub unknown: UnknownDirectivePolicy,
    /// Section delimiter line passed to handlers.
    ///
    /// Default: `---`
    pub delimiter: String,
    /// Accept up to three spaces before `::`.
    ///
    /// Default: `false`
    pub allow_indented: bool,
    /// Ignore directive lines inside fenced code blocks.
    ///
    /// Default: `true`
    pub skip_code_fences: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unknown: UnknownDirectivePolicy::Warn,
            delimiter: DEFAULT_DELIMITER.to_owned(),
            allow_indented: false,
            skip_code_fences: true,
        }
    }

    /// Set the unprocessed-directive policy.
    #[must_use]
    pub fn with_unknown(mut self, unknown: UnknownDirectivePolicy) -> Self {
        self.unknown = unknown;
        self
    }

    /// Set the section delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Allow indented directive markers.
    #[must_use]
    pub fn with_allow_indented(mut self, allow: bool) -> Self {
        self.allow_indented = allow;
        self
    }

    /// Enable or disable code fence skipping.
    #[must_use]
    pub fn with_skip_code_fences(mut self, skip: bool) -> Self {
        self.skip_code_fences = skip;
        self
    }

    /// Line eligibility rules derived from this configuration.
    #[must_use]
    pub fn line_rules(&self) -> LineRules {
        LineRules {
            allow_indented: self.allow_indented,
            skip_code_fences: self.skip_code_fences,
        }
    }
}

/// Non-fatal problem found during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A handler failed; the matched text was left unchanged.
    HandlerFailed {
        /// Directive name.
        name: String,
        /// Opening line of the match.
        line: usize,
        /// Handler error message.
        message: String,
    },
    /// A `::name` line remained after all handlers ran.
    Unprocessed {
        /// Directive name.
        name: String,
        /// Lines where it appeared.
        lines: Vec<usize>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HandlerFailed {
                name,
                line,
                message,
            } => write!(f, "line {line}: ::{name} failed: {message}"),
            Self::Unprocessed { name, lines } => {
                let lines = lines
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "unprocessed directive ::{name} (line {lines})")
            }
        }
    }
}

/// Result of a document pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Rewritten text.
    pub content: String,
    /// Problems found along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Directive engine for a fixed registry.
///
/// The engine holds no per-document state, so one instance can process many
/// documents, including concurrently from several threads.
///
/// # Example
///
/// ```
/// use mg_directives::{
///     DirectiveEngine, DirectiveMatch, EngineConfig, HandlerRegistry, PageData, RegisterOptions,
/// };
///
/// let mut registry = HandlerRegistry::new();
/// registry
///     .add("shout", RegisterOptions::inline(), |m: &DirectiveMatch<'_>| {
///         Ok(m.args.to_uppercase())
///     })
///     .unwrap();
///
/// let engine = DirectiveEngine::new(registry, EngineConfig::default());
/// let out = engine.process("::shout hello\ntext", &PageData::new());
/// assert_eq!(out.content, "HELLO\ntext");
/// assert!(out.diagnostics.is_empty());
/// ```
#[derive(Debug)]
pub struct DirectiveEngine {
    registry: HandlerRegistry,
    config: EngineConfig,
}

impl DirectiveEngine {
    /// Create an engine over a registry.
    #[must_use]
    pub fn new(registry: HandlerRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Create an engine with the built-in directive set registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in fails to register.
    pub fn with_builtins(config: EngineConfig) -> Result<Self, RegistryError> {
        let mut registry = HandlerRegistry::new();
        crate::builtin::register_builtins(&mut registry)?;
        Ok(Self::new(registry, config))
    }

    /// The registry this engine runs.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rewrite all directives in `content`.
    ///
    /// Handler failures never abort the pass: the failing match is left
    /// byte-for-byte unchanged and reported as a diagnostic.
    #[must_use]
    pub fn process(&self, content: &str, page_data: &PageData) -> Processed {
        let mut diagnostics = Vec::new();
        let mut current = content.to_owned();

        for registration in self.registry.sorted() {
            if registration.kind().runs_inline()
                && let Some(next) =
                    self.rewrite_inline(&current, registration, page_data, &mut diagnostics)
            {
                current = next;
            }
            if registration.kind().runs_block()
                && let Some(next) =
                    self.rewrite_block(&current, registration, page_data, &mut diagnostics)
            {
                current = next;
            }
        }

        let content = self.finish(current, &mut diagnostics);
        Processed {
            content,
            diagnostics,
        }
    }

    /// Apply a handler to every inline occurrence.
    ///
    /// Returns `None` when nothing matched.
    fn rewrite_inline(
        &self,
        content: &str,
        registration: &Registration,
        page_data: &PageData,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let rules = self.config.line_rules();
        let name = registration.name();
        let lines = lines(content);
        let mut replacements = Vec::new();

        for (idx, line) in eligible_lines(&lines, rules) {
            let Some(rest) = strip_marker(line.text, name, rules) else {
                continue;
            };
            let args = rest.trim();
            if args.is_empty() {
                continue;
            }
            // A line that opens a terminated block belongs to the block form.
            if registration.kind().runs_block()
                && self.block_end(&lines, idx, registration, rules).is_some()
            {
                continue;
            }

            let raw = &content[line.span()];
            let m = DirectiveMatch::inline(name, args, raw, page_data)
                .at_line(line.number)
                .with_delimiter(&self.config.delimiter);
            replacements.push((line.span(), invoke(registration, &m, diagnostics)));
        }

        (!replacements.is_empty()).then(|| splice(content, &replacements))
    }

    /// Apply a handler to every terminated block occurrence.
    ///
    /// Returns `None` when nothing matched.
    fn rewrite_block(
        &self,
        content: &str,
        registration: &Registration,
        page_data: &PageData,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let rules = self.config.line_rules();
        let name = registration.name();
        let lines = lines(content);
        let mut replacements: Vec<(Range<usize>, String)> = Vec::new();
        let mut resume_at = 0;

        for (idx, line) in eligible_lines(&lines, rules) {
            if idx < resume_at {
                continue;
            }
            let Some(rest) = strip_marker(line.text, name, rules) else {
                continue;
            };
            // Unterminated blocks stay literal text.
            let Some(end_idx) = self.block_end(&lines, idx, registration, rules) else {
                continue;
            };

            let end_line = &lines[end_idx];
            let span = line.start..end_line.end();
            let body = &content[line.next..end_line.start];
            let raw = &content[span.clone()];
            let m = DirectiveMatch::block(name, rest.trim(), body.trim(), raw, page_data)
                .at_line(line.number)
                .with_delimiter(&self.config.delimiter);
            replacements.push((span, invoke(registration, &m, diagnostics)));
            resume_at = end_idx + 1;
        }

        (!replacements.is_empty()).then(|| splice(content, &replacements))
    }

    /// Closing line for a block opened at `open_idx`.
    ///
    /// For directives recognized in both forms, an opener whose body would
    /// contain another block-capable or unknown directive is an inline
    /// occurrence: that directive owns the `::end`.
    fn block_end(
        &self,
        lines: &[Line<'_>],
        open_idx: usize,
        registration: &Registration,
        rules: LineRules,
    ) -> Option<usize> {
        if !registration.kind().runs_inline() {
            return find_block_end(lines, open_idx, rules);
        }
        find_leaf_block_end(lines, open_idx, rules, |name| {
            self.registry
                .get(name)
                .is_none_or(|nested| nested.kind().runs_block())
        })
    }

    /// Report or strip directive lines no handler claimed.
    fn finish(&self, content: String, diagnostics: &mut Vec<Diagnostic>) -> String {
        let rules = self.config.line_rules();
        let lines = lines(&content);
        let mut found: Vec<(String, Vec<usize>)> = Vec::new();
        let mut leftover: Vec<&Line<'_>> = Vec::new();

        for (_, line) in eligible_lines(&lines, rules) {
            let Some(name) = directive_name(line.text, rules) else {
                continue;
            };
            match found.iter_mut().find(|(n, _)| n == name) {
                Some((_, seen)) => seen.push(line.number),
                None => found.push((name.to_owned(), vec![line.number])),
            }
            leftover.push(line);
        }

        for (name, seen) in found {
            let diagnostic = Diagnostic::Unprocessed { name, lines: seen };
            tracing::warn!(policy = ?self.config.unknown, "{diagnostic}");
            diagnostics.push(diagnostic);
        }

        if self.config.unknown == UnknownDirectivePolicy::Warn || leftover.is_empty() {
            return content;
        }

        let removals: Vec<(Range<usize>, String)> = leftover
            .iter()
            .map(|line| (line.start..line.next, String::new()))
            .collect();
        splice(&content, &removals)
    }
}

/// Run a handler, falling back to the raw match on failure.
fn invoke(
    registration: &Registration,
    m: &DirectiveMatch<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    match registration.invoke(m) {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(
                directive = %m.name,
                line = m.line,
                kind = ?m.kind,
                error = %e,
                "Directive handler failed; leaving text unchanged"
            );
            diagnostics.push(Diagnostic::HandlerFailed {
                name: m.name.to_owned(),
                line: m.line,
                message: e.to_string(),
            });
            m.raw.to_owned()
        }
    }
}
