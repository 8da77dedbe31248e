//! Directive argument parsing.
//!
//! Parses the `key=value key2="quoted value"` tail of a directive opening line.

use std::collections::HashMap;

/// Parsed arguments from a directive opening line.
///
/// Key-value tokens land in [`attrs`](Self::attrs); every other token is kept
/// in order in [`words`](Self::words) so handlers can read positional values
/// such as a column count or an image source.
///
/// # Example
///
/// ```
/// use mg_directives::DirectiveArgs;
///
/// let args = DirectiveArgs::parse(r#"3 gap=lg title="Our team""#);
/// assert_eq!(args.words, vec!["3"]);
/// assert_eq!(args.get("gap"), Some("lg"));
/// assert_eq!(args.get("title"), Some("Our team"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Bare tokens in source order (quotes stripped).
    pub words: Vec<String>,
    /// Key-value attributes: `key=value` or `key="value"`.
    pub attrs: HashMap<String, String>,
}

impl DirectiveArgs {
    /// Parse an argument string into words and attributes.
    ///
    /// Later occurrences of the same key overwrite earlier ones.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = input.trim();

        while !remaining.is_empty() {
            if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest.trim_start();
            } else {
                let (word, rest) = take_word(remaining);
                if !word.is_empty() {
                    args.words.push(word.to_owned());
                }
                remaining = rest.trim_start();
            }
        }

        args
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// First bare word, if any.
    #[must_use]
    pub fn first_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Bare words after the first one, joined with single spaces.
    #[must_use]
    pub fn tail_text(&self) -> String {
        self.words.iter().skip(1).map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    /// All bare words joined with single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// Parse the first bare word as a positive count.
    ///
    /// Returns `default` when the word is missing, non-numeric, or zero.
    #[must_use]
    pub fn count_or(&self, default: usize) -> usize {
        self.first_word()
            .and_then(|w| w.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default)
    }
}

/// Parse `key=value` pairs from an argument string into a map.
///
/// Text that is not a key-value token is ignored.
///
/// ```
/// use mg_directives::parse_args;
///
/// let map = parse_args(r#"model=gpt-4 foo="bar baz""#);
/// assert_eq!(map.get("model").map(String::as_str), Some("gpt-4"));
/// assert_eq!(map.get("foo").map(String::as_str), Some("bar baz"));
/// ```
#[must_use]
pub fn parse_args(input: &str) -> HashMap<String, String> {
    DirectiveArgs::parse(input).attrs
}

/// Parse a key-value pair at the start of `s`.
///
/// Supports: `key="value"`, `key='value'`, `key=value`. The `=` must come
/// before the first whitespace, and the key must be a plain identifier.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let ws_pos = s.find(char::is_whitespace).unwrap_or(s.len());
    if eq_pos > ws_pos {
        return None;
    }

    let key = &s[..eq_pos];
    if !is_valid_key(key) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped.find(quote)?;
            return Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}

/// Take one bare token, honoring a surrounding pair of double quotes.
fn take_word(s: &str) -> (&str, &str) {
    if let Some(stripped) = s.strip_prefix('"')
        && let Some(end) = stripped.find('"')
    {
        return (&stripped[..end], &stripped[end + 1..]);
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args() {
        let args = DirectiveArgs::parse("");
        assert!(args.words.is_empty());
        assert!(args.attrs.is_empty());
    }

    #[test]
    fn test_quoted_and_unquoted_values() {
        let map = parse_args(r#"model=gpt-4 foo="bar baz""#);
        assert_eq!(map.len(), 2);
        assert_eq!(map["model"], "gpt-4");
        assert_eq!(map["foo"], "bar baz");
    }

    #[test]
    fn test_single_quoted_value() {
        let args = DirectiveArgs::parse("title='Hello World'");
        assert_eq!(args.get("title"), Some("Hello World"));
    }

    #[test]
    fn test_empty_quoted_value() {
        let args = DirectiveArgs::parse(r#"alt="""#);
        assert_eq!(args.get("alt"), Some(""));
    }

    #[test]
    fn test_later_key_overwrites() {
        let args = DirectiveArgs::parse("cols=2 cols=4");
        assert_eq!(args.get("cols"), Some("4"));
    }

    #[test]
    fn test_unrecognized_text_is_not_an_error() {
        let map = parse_args("some prose width=10 more prose");
        assert_eq!(map.len(), 1);
        assert_eq!(map["width"], "10");
    }

    #[test]
    fn test_words_keep_order() {
        let args = DirectiveArgs::parse("/signup Join us today style=primary");
        assert_eq!(args.words, vec!["/signup", "Join", "us", "today"]);
        assert_eq!(args.first_word(), Some("/signup"));
        assert_eq!(args.tail_text(), "Join us today");
        assert_eq!(args.get("style"), Some("primary"));
    }

    #[test]
    fn test_quoted_word() {
        let args = DirectiveArgs::parse(r#""Sign up" now"#);
        assert_eq!(args.words, vec!["Sign up", "now"]);
    }

    #[test]
    fn test_equals_after_whitespace_is_a_word() {
        let args = DirectiveArgs::parse("a b=c");
        assert_eq!(args.words, vec!["a"]);
        assert_eq!(args.get("b"), Some("c"));
    }

    #[test]
    fn test_invalid_key_is_a_word() {
        let args = DirectiveArgs::parse("1=2 =x");
        assert_eq!(args.words, vec!["1=2", "=x"]);
        assert!(args.attrs.is_empty());
    }

    #[test]
    fn test_unclosed_quote_falls_back_to_word() {
        let args = DirectiveArgs::parse(r#"title="oops"#);
        assert!(args.attrs.is_empty());
        assert_eq!(args.words, vec![r#"title="oops"#]);
    }

    #[test]
    fn test_count_or() {
        assert_eq!(DirectiveArgs::parse("3").count_or(2), 3);
        assert_eq!(DirectiveArgs::parse("").count_or(2), 2);
        assert_eq!(DirectiveArgs::parse("many").count_or(2), 2);
        assert_eq!(DirectiveArgs::parse("0").count_or(3), 3);
    }
}
