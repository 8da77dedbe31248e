//! Built-in directive set.
//!
//! Every built-in is a plain handler function registered through the same
//! [`HandlerRegistry::add`] call that site authors use. Output is HTML with
//! Markdown section bodies left in place, separated from the surrounding
//! tags by blank lines so the downstream renderer still parses them.

mod callout;
mod conditional;
mod container;
mod form;
mod inline;
mod layout;

use std::borrow::Cow;

use crate::error::RegistryError;
use crate::registry::{HandlerRegistry, RegisterOptions};

/// Priority of `if` and `unless`: dropped bodies are never rendered.
const CONDITIONAL_PRIORITY: i32 = 10;
/// Priority of `card`: nested cards collapse before container scans.
const CARD_PRIORITY: i32 = 40;
/// Priority of block layout directives.
const LAYOUT_PRIORITY: i32 = 50;
/// Priority of single-line directives.
const INLINE_PRIORITY: i32 = 60;

/// Register the built-in directives.
///
/// Existing registrations with the same names are replaced.
///
/// # Errors
///
/// Returns an error only if a built-in name fails validation.
pub fn register_builtins(registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
    let conditional = RegisterOptions::block().with_priority(CONDITIONAL_PRIORITY);
    let card = RegisterOptions::block().with_priority(CARD_PRIORITY);
    let layout = RegisterOptions::block().with_priority(LAYOUT_PRIORITY);
    let inline = RegisterOptions::inline().with_priority(INLINE_PRIORITY);

    registry.add("if", conditional, conditional::if_block)?;
    registry.add("unless", conditional, conditional::unless_block)?;

    registry.add("card", card, layout::card)?;

    registry.add("columns", layout, layout::columns)?;
    registry.add("split", layout, layout::split)?;
    registry.add("grid", layout, layout::grid)?;
    registry.add("cards", layout, layout::cards)?;
    registry.add("gallery", layout, layout::gallery)?;
    registry.add("hero", layout, container::hero)?;
    registry.add("container", layout, container::container)?;
    registry.add("section", layout, container::section)?;
    registry.add("narrow", layout, container::narrow)?;
    registry.add("wide", layout, container::wide)?;
    registry.add("details", layout, container::details)?;
    registry.add("form", layout, form::form)?;
    registry.add(
        "callout",
        RegisterOptions::both().with_priority(LAYOUT_PRIORITY),
        callout::callout,
    )?;

    registry.add("image", inline, inline::image)?;
    registry.add("button", inline, inline::button)?;
    registry.add("space", inline, inline::space)?;
    registry.add("divider", inline, inline::divider)?;
    registry.add("badge", inline, inline::badge)?;

    Ok(())
}

/// Escape a value for a double-quoted attribute.
fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Escape a value for element text.
fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

/// Wrap a Markdown body in HTML tags, keeping it parseable as Markdown.
fn wrap(open: &str, body: &str, close: &str) -> String {
    if body.is_empty() {
        return format!("{open}\n{close}");
    }
    format!("{open}\n\n{body}\n\n{close}")
}

/// Class attribute suffix: `" extra"` or empty.
fn extra_class(class: Option<&str>) -> String {
    match class.map(str::trim) {
        Some(class) if !class.is_empty() => format!(" {}", attr(class)),
        _ => String::new(),
    }
}
