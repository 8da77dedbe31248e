//! Multi-section layout directives: columns, split, grid, cards, gallery.

use super::{attr, extra_class, text, wrap};
use crate::context::DirectiveMatch;
use crate::error::HandlerError;

/// Column slots in the layout grid.
const GRID_COLUMNS: usize = 12;

/// `::columns N spans=6,6` … `::end`
pub(super) fn columns(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let count = args.count_or(2);
    let spans = column_spans(args.get("spans"), count);

    let mut html = format!(
        "<div class=\"columns columns-{count}{}\">",
        extra_class(args.get("class"))
    );
    for (idx, section) in m.sections().into_iter().enumerate() {
        let span = spans.get(idx).copied().unwrap_or(default_span(count));
        html.push('\n');
        html.push_str(&wrap(
            &format!("<div class=\"column span-{span}\">"),
            section,
            "</div>",
        ));
    }
    html.push_str("\n</div>");
    Ok(html)
}

/// Per-column spans by position. Missing or out-of-range entries take
/// `floor(12 / count)`.
fn column_spans(spec: Option<&str>, count: usize) -> Vec<usize> {
    let fallback = default_span(count);
    let mut spans: Vec<usize> = spec
        .map(|spec| {
            spec.split(',')
                .map(|s| {
                    s.trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|n| (1..=GRID_COLUMNS).contains(n))
                        .unwrap_or(fallback)
                })
                .collect()
        })
        .unwrap_or_default();
    if spans.len() < count {
        spans.resize(count, fallback);
    }
    spans
}

fn default_span(count: usize) -> usize {
    GRID_COLUMNS / count
}

/// `::split ratio=60/40` … `---` … `::end`
pub(super) fn split(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let (left, right) = args.get("ratio").and_then(parse_ratio).unwrap_or((50, 50));
    let sections = m.sections();

    let mut html = format!(
        "<div class=\"split\" style=\"grid-template-columns: {left}fr {right}fr\">"
    );
    for (idx, section) in sections.iter().take(2).enumerate() {
        let side = if idx == 0 { "left" } else { "right" };
        html.push('\n');
        html.push_str(&wrap(
            &format!("<div class=\"split-pane split-{side}\">"),
            section,
            "</div>",
        ));
    }
    if sections.len() > 2 {
        tracing::debug!(line = m.line, sections = sections.len(), "Extra split sections ignored");
    }
    html.push_str("\n</div>");
    Ok(html)
}

fn parse_ratio(ratio: &str) -> Option<(u32, u32)> {
    let (left, right) = ratio.split_once('/')?;
    let left = left.trim().parse().ok().filter(|&n| n > 0)?;
    let right = right.trim().parse().ok().filter(|&n| n > 0)?;
    Some((left, right))
}

/// `::grid N` … `::end`
pub(super) fn grid(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let cols = args.count_or(3);

    let mut html = format!(
        "<div class=\"grid{}\" style=\"--grid-cols: {cols}\">",
        extra_class(args.get("class"))
    );
    for section in m.sections() {
        html.push('\n');
        html.push_str(&wrap("<div class=\"grid-item\">", section, "</div>"));
    }
    html.push_str("\n</div>");
    Ok(html)
}

/// `::cards N` … `::end`
///
/// Nested `::card` blocks have already been rendered by the time this runs.
pub(super) fn cards(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let cols = m.parsed_args().count_or(3);
    Ok(wrap(
        &format!("<div class=\"cards\" style=\"--grid-cols: {cols}\">"),
        m.content,
        "</div>",
    ))
}

/// `::card title="…"` … `::end`
pub(super) fn card(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let title = args
        .get("title")
        .map(str::to_owned)
        .or_else(|| Some(args.text()).filter(|t| !t.is_empty()));

    let mut open = format!("<div class=\"card{}\">", extra_class(args.get("class")));
    if let Some(title) = title {
        open.push_str(&format!("\n<div class=\"card-title\">{}</div>", text(&title)));
    }
    Ok(wrap(&open, m.content, "</div>"))
}

/// `::gallery N` with one `src | caption` per line.
pub(super) fn gallery(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let cols = m.parsed_args().count_or(3);

    let mut html = format!("<div class=\"gallery\" style=\"--grid-cols: {cols}\">");
    for line in m.content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (src, caption) = match line.split_once('|') {
            Some((src, caption)) => (src.trim(), caption.trim()),
            None => (line, ""),
        };
        html.push_str(&format!(
            "\n<figure class=\"gallery-item\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            attr(src),
            attr(caption)
        ));
        if !caption.is_empty() {
            html.push_str(&format!("<figcaption>{}</figcaption>", text(caption)));
        }
        html.push_str("</figure>");
    }
    html.push_str("\n</div>");
    Ok(html)
}
