//! Match context handed to directive handlers.

use crate::args::DirectiveArgs;
use crate::split::{DEFAULT_DELIMITER, split_sections};

/// Page-level data (usually frontmatter) visible to handlers.
pub type PageData = serde_json::Map<String, serde_json::Value>;

/// Form in which a directive was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Single line: `::name args`.
    Inline,
    /// Multi-line: `::name args` … `::end`.
    Block,
}

/// One recognized directive occurrence.
///
/// All string fields borrow from the document text being rewritten.
///
/// # Example
///
/// ```
/// use mg_directives::{DirectiveMatch, MatchKind, PageData};
///
/// let page = PageData::new();
/// let m = DirectiveMatch::block("columns", "2", "a\n---\nb", "::columns 2\na\n---\nb\n::end", &page);
/// assert_eq!(m.kind, MatchKind::Block);
/// assert_eq!(m.sections(), vec!["a", "b"]);
/// assert_eq!(m.value(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirectiveMatch<'a> {
    /// Recognized form.
    pub kind: MatchKind,
    /// Directive name.
    pub name: &'a str,
    /// Trailing text on the opening line, trimmed.
    pub args: &'a str,
    /// Inner text of a block, trimmed (empty for inline matches).
    pub content: &'a str,
    /// The full original matched span.
    pub raw: &'a str,
    /// Line number of the opening marker (1-indexed).
    pub line: usize,
    /// Read-only page context.
    pub page_data: &'a PageData,
    /// Section delimiter line used by [`sections`](Self::sections).
    pub delimiter: &'a str,
}

impl<'a> DirectiveMatch<'a> {
    /// Build an inline match.
    #[must_use]
    pub fn inline(name: &'a str, args: &'a str, raw: &'a str, page_data: &'a PageData) -> Self {
        Self {
            kind: MatchKind::Inline,
            name,
            args,
            content: "",
            raw,
            line: 1,
            page_data,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Build a block match.
    #[must_use]
    pub fn block(
        name: &'a str,
        args: &'a str,
        content: &'a str,
        raw: &'a str,
        page_data: &'a PageData,
    ) -> Self {
        Self {
            kind: MatchKind::Block,
            name,
            args,
            content,
            raw,
            line: 1,
            page_data,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Set the opening line number.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the section delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: &'a str) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Inline value: equal to `args` for inline matches, `None` for blocks.
    #[must_use]
    pub fn value(&self) -> Option<&'a str> {
        (self.kind == MatchKind::Inline).then_some(self.args)
    }

    /// Block content split into sections on the delimiter line.
    #[must_use]
    pub fn sections(&self) -> Vec<&'a str> {
        split_sections(self.content, self.delimiter)
    }

    /// Arguments parsed into words and key-value attributes.
    #[must_use]
    pub fn parsed_args(&self) -> DirectiveArgs {
        DirectiveArgs::parse(self.args)
    }
}
