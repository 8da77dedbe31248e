//! Single-body wrappers.

use super::{attr, extra_class, text, wrap};
use crate::context::DirectiveMatch;
use crate::error::HandlerError;

pub(super) fn hero(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let align = args.get("align").unwrap_or("center");

    let mut open = format!("<section class=\"hero hero-{}\"", attr(align));
    if let Some(image) = args.get("image") {
        open.push_str(&format!(
            " style=\"background-image: url('{}')\"",
            attr(image)
        ));
    }
    open.push('>');
    Ok(wrap(&open, m.content, "</section>"))
}

pub(super) fn container(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let open = format!("<div class=\"container{}\">", extra_class(args.get("class")));
    Ok(wrap(&open, m.content, "</div>"))
}

pub(super) fn section(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let mut open = String::from("<section");
    if let Some(id) = args.get("id").or_else(|| args.first_word()) {
        open.push_str(&format!(" id=\"{}\"", attr(id)));
    }
    if let Some(class) = args.get("class") {
        open.push_str(&format!(" class=\"{}\"", attr(class)));
    }
    open.push('>');
    Ok(wrap(&open, m.content, "</section>"))
}

pub(super) fn narrow(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    Ok(wrap("<div class=\"narrow\">", m.content, "</div>"))
}

pub(super) fn wide(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    Ok(wrap("<div class=\"wide\">", m.content, "</div>"))
}

/// `::details Summary text` … `::end`, add `open` to expand by default.
pub(super) fn details(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let open_attr = args.words.iter().any(|w| w == "open");
    let summary = args
        .words
        .iter()
        .filter(|w| *w != "open")
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let summary = args
        .get("summary")
        .map(str::to_owned)
        .unwrap_or(if summary.is_empty() { "Details".to_owned() } else { summary });

    let open = format!(
        "<details{}>\n<summary>{}</summary>",
        if open_attr { " open" } else { "" },
        text(&summary)
    );
    Ok(wrap(&open, m.content, "</details>"))
}
