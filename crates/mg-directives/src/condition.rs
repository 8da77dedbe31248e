//! Boolean conditions over page data.
//!
//! Backs the `if` and `unless` directives. The grammar is tried in a fixed
//! order and the first matching form wins:
//!
//! 1. empty or whitespace → `false`
//! 2. `!key` → negated truthiness of `key`
//! 3. `key==value` → string equality
//! 4. `key!=value` → string inequality
//! 5. `key>n` → numeric comparison
//! 6. `key<n` → numeric comparison
//! 7. `key` → truthiness of `key`
//!
//! A key that itself contains `>` or `<` is split at that operator. That
//! limitation is part of the grammar.

use std::borrow::Cow;

use serde_json::Value;

use crate::PageData;

/// Evaluate a condition against page data.
///
/// ```
/// use mg_directives::{PageData, evaluate};
/// use serde_json::json;
///
/// let mut page = PageData::new();
/// page.insert("featured".to_owned(), json!(true));
/// page.insert("count".to_owned(), json!(5));
///
/// assert!(evaluate("featured", &page));
/// assert!(!evaluate("!featured", &page));
/// assert!(evaluate("count>3", &page));
/// ```
#[must_use]
pub fn evaluate(condition: &str, page_data: &PageData) -> bool {
    let condition = condition.trim();
    if condition.is_empty() {
        return false;
    }

    if let Some(key) = condition.strip_prefix('!') {
        return !is_truthy(page_data.get(key.trim()));
    }

    if let Some((left, right)) = condition.split_once("==") {
        return js_string(page_data.get(left.trim())) == strip_quotes(right.trim());
    }

    if let Some((left, right)) = condition.split_once("!=") {
        return js_string(page_data.get(left.trim())) != strip_quotes(right.trim());
    }

    if let Some((left, right)) = condition.split_once('>') {
        return js_number(page_data.get(left.trim())) > parse_number(right);
    }

    if let Some((left, right)) = condition.split_once('<') {
        return js_number(page_data.get(left.trim())) < parse_number(right);
    }

    is_truthy(page_data.get(condition))
}

/// Truthiness of a page value: missing, `null`, `false`, `0`, and `""` are false.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// String form of a page value used for equality checks.
fn js_string(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None => Cow::Borrowed("undefined"),
        Some(Value::Null) => Cow::Borrowed("null"),
        Some(Value::Bool(b)) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Some(Value::Number(n)) => Cow::Owned(number_to_string(n)),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(Value::Array(items)) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => js_string(Some(other)),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Some(Value::Object(_)) => Cow::Borrowed("[object Object]"),
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
}

/// Numeric form of a page value; `NaN` when it has none.
fn js_number(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Strip one leading and one trailing quote character.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(value: Value) -> PageData {
        match value {
            Value::Object(map) => map,
            _ => panic!("page data must be an object"),
        }
    }

    #[test]
    fn test_empty_condition_is_false() {
        let data = page(json!({"": true}));
        assert!(!evaluate("", &data));
        assert!(!evaluate("   ", &data));
    }

    #[test]
    fn test_truthiness() {
        let data = page(json!({
            "featured": true,
            "draft": false,
            "title": "Hello",
            "empty": "",
            "zero": 0,
            "tags": [],
            "nothing": null,
        }));
        assert!(evaluate("featured", &data));
        assert!(!evaluate("draft", &data));
        assert!(evaluate("title", &data));
        assert!(!evaluate("empty", &data));
        assert!(!evaluate("zero", &data));
        assert!(evaluate("tags", &data));
        assert!(!evaluate("nothing", &data));
        assert!(!evaluate("missing", &data));
    }

    #[test]
    fn test_negation() {
        let data = page(json!({"featured": true}));
        assert!(!evaluate("!featured", &data));
        assert!(evaluate("!missing", &data));
        assert!(!evaluate("! featured", &data));
    }

    #[test]
    fn test_equality() {
        let data = page(json!({"layout": "wide", "count": 5, "flag": true}));
        assert!(evaluate("layout==wide", &data));
        assert!(evaluate(r#"layout == "wide""#, &data));
        assert!(evaluate("layout=='wide'", &data));
        assert!(!evaluate("layout==narrow", &data));
        assert!(evaluate("count==5", &data));
        assert!(evaluate("flag==true", &data));
        assert!(evaluate("missing==undefined", &data));
    }

    #[test]
    fn test_inequality() {
        let data = page(json!({"layout": "wide"}));
        assert!(evaluate("layout!=narrow", &data));
        assert!(!evaluate("layout != wide", &data));
    }

    #[test]
    fn test_numeric_comparison() {
        let data = page(json!({"count": 5, "price": "9.5", "label": "abc"}));
        assert!(evaluate("count>3", &data));
        assert!(!evaluate("count>5", &data));
        assert!(evaluate("count<10", &data));
        assert!(evaluate("price>9", &data));
        assert!(!evaluate("label>1", &data));
        assert!(!evaluate("label<1", &data));
        assert!(!evaluate("missing>0", &data));
    }

    #[test]
    fn test_order_first_match_wins() {
        // `!` is checked before `!=`, so this negates a key named "a!=b".
        let data = page(json!({"a": "x"}));
        assert!(evaluate("!a!=b", &data));
        // `>=` is not an operator: the right side "=3" is not a number.
        let data = page(json!({"count": 5}));
        assert!(!evaluate("count>=3", &data));
    }

    #[test]
    fn test_array_string_form() {
        let data = page(json!({"tags": ["a", "b"]}));
        assert!(evaluate("tags==a,b", &data));
    }

    #[test]
    fn test_float_string_form() {
        let data = page(json!({"ratio": 0.5}));
        assert!(evaluate("ratio==0.5", &data));
    }
}
