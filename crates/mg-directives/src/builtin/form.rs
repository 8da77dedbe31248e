//! `::form action=… method=…` with one `name | label | type` field per line.

use super::{attr, text};
use crate::context::DirectiveMatch;
use crate::error::HandlerError;

#[derive(Debug, PartialEq, Eq)]
struct Field<'a> {
    name: &'a str,
    label: &'a str,
    kind: &'a str,
}

fn parse_field(line: &str) -> Option<Field<'_>> {
    let mut parts = line.split('|').map(str::trim);
    let name = parts.next().filter(|n| !n.is_empty())?;
    let label = parts.next().filter(|l| !l.is_empty()).unwrap_or(name);
    let kind = parts.next().filter(|k| !k.is_empty()).unwrap_or("text");
    Some(Field { name, label, kind })
}

fn render_field(field: &Field<'_>) -> String {
    let name = attr(field.name);
    let label = format!("<label for=\"{name}\">{}</label>", text(field.label));
    let control = match field.kind {
        "textarea" => format!("<textarea id=\"{name}\" name=\"{name}\"></textarea>"),
        kind => format!(
            "<input type=\"{}\" id=\"{name}\" name=\"{name}\">",
            attr(kind)
        ),
    };
    format!("<div class=\"form-field\">{label}{control}</div>")
}

pub(super) fn form(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    let args = m.parsed_args();
    let action = args.get("action").unwrap_or("#");
    let method = args.get("method").unwrap_or("post").to_ascii_lowercase();
    if !matches!(method.as_str(), "get" | "post") {
        return Err(HandlerError::malformed(format!(
            "form method must be get or post, got `{method}`"
        )));
    }
    let submit = args.get("submit").unwrap_or("Submit");

    let mut html = format!(
        "<form class=\"form\" action=\"{}\" method=\"{method}\">",
        attr(action)
    );
    for field in m.content.lines().filter_map(parse_field) {
        html.push('\n');
        html.push_str(&render_field(&field));
    }
    html.push_str(&format!(
        "\n<button type=\"submit\">{}</button>\n</form>",
        text(submit)
    ));
    Ok(html)
}
