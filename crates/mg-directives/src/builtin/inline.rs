//! Single-line directives: image, button, space, divider, badge.

use super::{attr, text};
use crate::context::DirectiveMatch;
use crate::error::HandlerError;

/// `::image src [alt…] width=… caption=…`
pub(super) fn image(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let src = args
        .get("src")
        .or_else(|| args.first_word())
        .ok_or_else(|| HandlerError::malformed("image needs a source"))?;
    let alt = match args.get("alt") {
        Some(alt) => alt.to_owned(),
        None if args.get("src").is_some() => args.text(),
        None => args.tail_text(),
    };

    let mut img = format!("<img src=\"{}\" alt=\"{}\"", attr(src), attr(&alt));
    if let Some(width) = args.get("width") {
        img.push_str(&format!(" width=\"{}\"", attr(width)));
    }
    img.push_str(" loading=\"lazy\">");

    Ok(match args.get("caption") {
        Some(caption) => format!(
            "<figure class=\"image\">{img}<figcaption>{}</figcaption></figure>",
            text(caption)
        ),
        None => img,
    })
}

/// `::button href label… style=…`
pub(super) fn button(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let href = args
        .get("href")
        .or_else(|| args.first_word())
        .ok_or_else(|| HandlerError::malformed("button needs a link target"))?;
    let label = if args.get("href").is_some() {
        args.text()
    } else {
        args.tail_text()
    };
    let label = if label.is_empty() { href.to_owned() } else { label };
    let style = args.get("style").unwrap_or("primary");

    Ok(format!(
        "<a class=\"button button-{}\" href=\"{}\">{}</a>",
        attr(style),
        attr(href),
        text(&label)
    ))
}

/// `::space N`: vertical spacer, numbers in `rem`.
pub(super) fn space(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let value = m.args.trim();
    let size: f64 = value
        .parse()
        .ok()
        .filter(|n: &f64| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| HandlerError::malformed(format!("space needs a number, got `{value}`")))?;
    Ok(format!("<div class=\"space\" style=\"height: {size}rem\"></div>"))
}

/// `::divider STYLE`
pub(super) fn divider(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let style = m.parsed_args().first_word().unwrap_or("line").to_owned();
    Ok(format!("<hr class=\"divider divider-{}\">", attr(&style)))
}

/// `::badge text… color=…`
pub(super) fn badge(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let label = args.text();
    if label.is_empty() {
        return Err(HandlerError::malformed("badge needs a label"));
    }
    let class = args
        .get("color")
        .map(|c| format!(" badge-{}", attr(c)))
        .unwrap_or_default();
    Ok(format!("<span class=\"badge{class}\">{}</span>", text(&label)))
}
