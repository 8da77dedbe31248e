//! Section splitting for multi-part block directives.

/// Default delimiter line between sections.
pub const DEFAULT_DELIMITER: &str = "---";

/// Split block content into sections separated by a delimiter line.
///
/// The delimiter only counts when it fills a whole line, ignoring a trailing
/// `\r`. Sections are trimmed and empty sections are dropped; order is
/// preserved.
///
/// ```
/// use mg_directives::split_sections;
///
/// let sections = split_sections("a\n---\n \n---\nb", "---");
/// assert_eq!(sections, vec!["a", "b"]);
/// ```
#[must_use]
pub fn split_sections<'a>(content: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut section_start = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let text = line.strip_suffix('\n').unwrap_or(line);
        let text = text.strip_suffix('\r').unwrap_or(text);
        if text == delimiter {
            sections.push(&content[section_start..offset]);
            section_start = offset + line.len();
        }
        offset += line.len();
    }
    sections.push(&content[section_start..]);

    sections
        .into_iter()
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_section() {
        assert_eq!(split_sections("just text", DEFAULT_DELIMITER), vec!["just text"]);
    }

    #[test]
    fn test_empty_content() {
        assert!(split_sections("", DEFAULT_DELIMITER).is_empty());
        assert!(split_sections("  \n ", DEFAULT_DELIMITER).is_empty());
    }

    #[test]
    fn test_drops_whitespace_sections() {
        assert_eq!(
            split_sections("a\n---\n \n---\nb", DEFAULT_DELIMITER),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_preserves_order_and_inner_lines() {
        let content = "Left **text**.\nmore\n---\nRight text.";
        assert_eq!(
            split_sections(content, DEFAULT_DELIMITER),
            vec!["Left **text**.\nmore", "Right text."]
        );
    }

    #[test]
    fn test_delimiter_must_fill_line() {
        let content = "a --- b\n----\nc";
        assert_eq!(split_sections(content, DEFAULT_DELIMITER), vec![content]);
    }

    #[test]
    fn test_crlf_delimiter_lines() {
        assert_eq!(split_sections("a\r\n---\r\nb", DEFAULT_DELIMITER), vec!["a", "b"]);
        assert_eq!(
            split_sections("one\r\ntwo\r\n---\r\nthree\r\n", DEFAULT_DELIMITER),
            vec!["one\r\ntwo", "three"]
        );
    }

    #[test]
    fn test_delimiter_on_edge_lines() {
        assert_eq!(split_sections("---\na\n---", DEFAULT_DELIMITER), vec!["a"]);
        assert_eq!(split_sections("a\n---\n---\nb", DEFAULT_DELIMITER), vec!["a", "b"]);
    }

    #[test]
    fn test_custom_delimiter() {
        assert_eq!(split_sections("a\n***\nb", "***"), vec!["a", "b"]);
        assert_eq!(split_sections("a\n---\nb", "***"), vec!["a\n---\nb"]);
    }
}
