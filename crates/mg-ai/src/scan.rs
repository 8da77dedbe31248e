//! Locating `::ai` directives.
//!
//! Two forms are recognized in one pass over the text:
//!
//! - inline `::ai [model=NAME] prompt…`
//! - block `::ai [key=value…]` … `::end`, where the body is the prompt
//!
//! An opener is a block when an `::end` follows with no other directive
//! opening in between. Otherwise a non-empty opener is inline.

use std::ops::Range;

use mg_directives::scan::{LineRules, eligible_lines, find_leaf_block_end, lines, strip_marker};
use mg_directives::{DirectiveArgs, MatchKind};

use crate::service::CallOptions;

/// Directive name handled by the pass.
pub const AI_DIRECTIVE: &str = "ai";

/// Prompt used when a block has neither a body nor bare words on its opener.
pub const DEFAULT_PROMPT: &str = "Write a short introductory paragraph.";

/// One `::ai` occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct AiDirective {
    /// Recognized form.
    pub kind: MatchKind,
    /// Byte range of the whole occurrence (opener through `::end`).
    pub span: Range<usize>,
    /// Line number of the opener (1-indexed).
    pub line: usize,
    /// Prompt sent to the service.
    pub prompt: String,
    /// Per-call options.
    pub options: CallOptions,
}

/// Find all `::ai` directives in document order.
pub fn find_ai_directives(content: &str, rules: LineRules) -> Vec<AiDirective> {
    let lines = lines(content);
    let mut found = Vec::new();
    let mut resume_at = 0;

    for (idx, line) in eligible_lines(&lines, rules) {
        if idx < resume_at {
            continue;
        }
        let Some(rest) = strip_marker(line.text, AI_DIRECTIVE, rules) else {
            continue;
        };
        let args = rest.trim();
        let parsed = DirectiveArgs::parse(args);

        if let Some(end_idx) = find_leaf_block_end(&lines, idx, rules, |_| true) {
            let end_line = &lines[end_idx];
            let body = content[line.next..end_line.start].trim();
            let words = parsed.text();
            let prompt = if !body.is_empty() {
                body
            } else if !words.is_empty() {
                words.as_str()
            } else {
                DEFAULT_PROMPT
            };
            found.push(AiDirective {
                kind: MatchKind::Block,
                span: line.start..end_line.end(),
                line: line.number,
                prompt: prompt.to_owned(),
                options: options_from(&parsed),
            });
            resume_at = end_idx + 1;
        } else if !args.is_empty() {
            let (model, prompt) = split_model(args);
            found.push(AiDirective {
                kind: MatchKind::Inline,
                span: line.span(),
                line: line.number,
                prompt: if prompt.is_empty() { DEFAULT_PROMPT } else { prompt }.to_owned(),
                options: CallOptions {
                    model: model.map(str::to_owned),
                    temperature: None,
                },
            });
        }
    }

    found
}

/// Split an optional leading `model=VALUE` token from an inline prompt.
fn split_model(args: &str) -> (Option<&str>, &str) {
    let Some(rest) = args.strip_prefix("model=") else {
        return (None, args);
    };
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let model = rest[..end].trim_matches(['"', '\'']);
    let prompt = rest[end..].trim();
    ((!model.is_empty()).then_some(model), prompt)
}

fn options_from(args: &DirectiveArgs) -> CallOptions {
    CallOptions {
        model: args.get("model").map(str::to_owned),
        temperature: args.get("temperature").and_then(|t| t.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn find(content: &str) -> Vec<AiDirective> {
        find_ai_directives(content, LineRules::default())
    }

    #[test]
    fn test_inline() {
        let found = find("intro\n::ai Write a haiku\nrest");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, MatchKind::Inline);
        assert_eq!(found[0].prompt, "Write a haiku");
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].span, 6..24);
        assert_eq!(found[0].options, CallOptions::default());
    }

    #[test]
    fn test_inline_model_override() {
        let found = find("::ai model=gpt-4o Summarize this page");
        assert_eq!(found[0].options.model.as_deref(), Some("gpt-4o"));
        assert_eq!(found[0].prompt, "Summarize this page");
    }

    #[test]
    fn test_block() {
        let content = "::ai model=small temperature=0.2\nDescribe\nthe product\n::end\nafter";
        let found = find(content);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, MatchKind::Block);
        assert_eq!(found[0].prompt, "Describe\nthe product");
        assert_eq!(&content[found[0].span.clone()], "::ai model=small temperature=0.2\nDescribe\nthe product\n::end");
        assert_eq!(found[0].options.model.as_deref(), Some("small"));
        assert_eq!(found[0].options.temperature, Some(0.2));
    }

    #[test]
    fn test_block_prompt_fallbacks() {
        let found = find("::ai Say hi\n::end\n::ai\n::end");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].prompt, "Say hi");
        assert_eq!(found[1].prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_opener_with_words_closed_by_end_is_block() {
        let content = "::ai Write a haiku\n::end\nafter";
        let found = find(content);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, MatchKind::Block);
        assert_eq!(found[0].prompt, "Write a haiku");
        assert_eq!(found[0].span, 0..24);
        assert_eq!(&content[found[0].span.end..], "\nafter");
    }

    #[test]
    fn test_body_wins_over_opener_words() {
        let found = find("::ai Ignored\nUse this\n::end");
        assert_eq!(found[0].kind, MatchKind::Block);
        assert_eq!(found[0].prompt, "Use this");
    }

    #[test]
    fn test_nested_opener_makes_inline() {
        let found = find("::ai Tell a joke\n::ai\nbody\n::end");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, MatchKind::Inline);
        assert_eq!(found[1].kind, MatchKind::Block);
        assert_eq!(found[1].prompt, "body");
    }

    #[test]
    fn test_inline_before_other_directive_block() {
        let content = "::ai Tell a joke\n::section\nx\n::end";
        let found = find(content);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, MatchKind::Inline);
        assert_eq!(found[0].span, 0..16);
    }

    #[test]
    fn test_unterminated_bare_opener_ignored() {
        assert!(find("::ai\nno end").is_empty());
    }

    #[test]
    fn test_identical_lines_found_separately() {
        let found = find("::ai hello\n::ai hello");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].span, 0..10);
        assert_eq!(found[1].span, 11..21);
    }

    #[test]
    fn test_fenced_directives_skipped() {
        assert!(find("```\n::ai hello\n```").is_empty());
    }

    #[test]
    fn test_split_model() {
        assert_eq!(split_model("model=x hi there"), (Some("x"), "hi there"));
        assert_eq!(split_model("hi model=x"), (None, "hi model=x"));
        assert_eq!(split_model("model=\"x\" hi"), (Some("x"), "hi"));
    }
}
