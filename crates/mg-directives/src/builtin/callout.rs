//! Callouts: `::callout TYPE[+-] [title]`.
//!
//! The inline form renders its trailing text as the body under a default
//! title. The block form uses the trailing text as the title and the block
//! content as the body. A `+` or `-` right after the type makes the callout
//! foldable, expanded or collapsed.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{attr, text, wrap};
use crate::context::{DirectiveMatch, MatchKind};
use crate::error::HandlerError;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z][\w-]*)(?P<fold>[+-])?(?:\s+(?P<rest>.*))?$").unwrap()
});

/// Icon per callout type. Aliases are separate keys with the same icon.
static ICONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("note", "pencil"),
        ("abstract", "clipboard-list"),
        ("summary", "clipboard-list"),
        ("tldr", "clipboard-list"),
        ("info", "info"),
        ("todo", "check-circle-2"),
        ("tip", "flame"),
        ("hint", "flame"),
        ("important", "flame"),
        ("success", "check"),
        ("check", "check"),
        ("done", "check"),
        ("question", "help-circle"),
        ("help", "help-circle"),
        ("faq", "help-circle"),
        ("warning", "alert-triangle"),
        ("caution", "alert-triangle"),
        ("attention", "alert-triangle"),
        ("failure", "x"),
        ("fail", "x"),
        ("missing", "x"),
        ("danger", "zap"),
        ("error", "zap"),
        ("bug", "bug"),
        ("example", "list"),
        ("quote", "quote"),
        ("cite", "quote"),
    ])
});

/// Icon used for types missing from the table.
const DEFAULT_ICON: &str = "pencil";

/// Foldable state from the `+`/`-` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fold {
    None,
    Open,
    Closed,
}

#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    kind: String,
    fold: Fold,
    rest: &'a str,
}

fn parse_header(args: &str) -> Option<Header<'_>> {
    let caps = HEADER_RE.captures(args.trim())?;
    let fold = match caps.name("fold").map(|m| m.as_str()) {
        Some("+") => Fold::Open,
        Some(_) => Fold::Closed,
        None => Fold::None,
    };
    Some(Header {
        kind: caps.name("type")?.as_str().to_ascii_lowercase(),
        fold,
        rest: caps.name("rest").map_or("", |m| m.as_str().trim()),
    })
}

/// Icon name for a callout type.
fn icon(kind: &str) -> &'static str {
    ICONS.get(kind).copied().unwrap_or(DEFAULT_ICON)
}

/// Default title: the type with its first letter capitalized.
fn default_title(kind: &str) -> String {
    let mut chars = kind.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

pub(super) fn callout(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let Some(header) = parse_header(m.args) else {
        return Err(HandlerError::malformed(format!(
            "expected `TYPE[+-] [title]`, got `{}`",
            m.args
        )));
    };

    let (title, body) = match m.kind {
        MatchKind::Inline => (default_title(&header.kind), header.rest),
        MatchKind::Block if header.rest.is_empty() => (default_title(&header.kind), m.content),
        MatchKind::Block => (header.rest.to_owned(), m.content),
    };

    let kind = attr(&header.kind);
    let title_inner = format!(
        "<span class=\"callout-icon\" data-icon=\"{}\"></span><span class=\"callout-title-text\">{}</span>",
        icon(&header.kind),
        text(&title)
    );
    let body = wrap("<div class=\"callout-content\">", body, "</div>");

    Ok(match header.fold {
        Fold::None => format!(
            "<div class=\"callout callout-{kind}\" data-callout=\"{kind}\">\n\
             <div class=\"callout-title\">{title_inner}</div>\n\
             {body}\n\
             </div>"
        ),
        Fold::Open | Fold::Closed => format!(
            "<details class=\"callout callout-{kind}\" data-callout=\"{kind}\"{}>\n\
             <summary class=\"callout-title\">{title_inner}</summary>\n\
             {body}\n\
             </details>",
            if header.fold == Fold::Open { " open" } else { "" }
        ),
    })
}
