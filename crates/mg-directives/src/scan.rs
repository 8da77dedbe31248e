//! Line scanning primitives shared by the directive passes.
//!
//! Directives are recognized line by line: an opening marker `::name` must
//! start a line, and a block ends at the first following line that is
//! exactly `::end`. Lines inside fenced code blocks can be excluded.

use std::ops::Range;

/// Rules that decide which lines are eligible for directive recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRules {
    /// Accept up to three leading spaces before `::`.
    pub allow_indented: bool,
    /// Ignore lines inside fenced code blocks.
    pub skip_code_fences: bool,
}

impl Default for LineRules {
    fn default() -> Self {
        Self {
            allow_indented: false,
            skip_code_fences: true,
        }
    }
}

/// A line of the document with its byte range.
///
/// `text` excludes the line terminator (`\n` or `\r\n`); `next` is the offset
/// where the following line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line content without terminator.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset where the following line starts.
    pub next: usize,
    /// Line number (1-indexed).
    pub number: usize,
}

impl Line<'_> {
    /// Byte offset just past the line content.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Byte range of the line content.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Split input into lines with byte offsets.
#[must_use]
pub fn lines(input: &str) -> Vec<Line<'_>> {
    let mut result = Vec::new();
    let mut offset = 0;

    for (idx, chunk) in input.split_inclusive('\n').enumerate() {
        let text = chunk.strip_suffix('\n').unwrap_or(chunk);
        let text = text.strip_suffix('\r').unwrap_or(text);
        result.push(Line {
            text,
            start: offset,
            next: offset + chunk.len(),
            number: idx + 1,
        });
        offset += chunk.len();
    }

    result
}

/// Iterate over the lines that may hold a directive marker.
///
/// Lines inside fenced code blocks (and the fence lines themselves) are
/// skipped when [`LineRules::skip_code_fences`] is set.
pub fn eligible_lines<'l, 'a>(
    lines: &'l [Line<'a>],
    rules: LineRules,
) -> impl Iterator<Item = (usize, &'l Line<'a>)> {
    let mut fence = FenceTracker::new();
    lines.iter().enumerate().filter(move |(_, line)| {
        if !rules.skip_code_fences {
            return true;
        }
        let is_marker = fence.update(line.text);
        !is_marker && !fence.in_fence()
    })
}

/// Strip the allowed indentation before a `::` marker.
fn strip_indent(text: &str, rules: LineRules) -> &str {
    if !rules.allow_indented {
        return text;
    }
    let spaces = text.bytes().take(3).take_while(|&b| b == b' ').count();
    &text[spaces..]
}

/// Match an opening marker `::name` and return the text after it.
///
/// The name must be followed by end of line or whitespace, so `::card` does
/// not match `::cards`.
#[must_use]
pub fn strip_marker<'a>(text: &'a str, name: &str, rules: LineRules) -> Option<&'a str> {
    let rest = strip_indent(text, rules)
        .strip_prefix("::")?
        .strip_prefix(name)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// Check whether a line closes a block directive.
#[must_use]
pub fn is_end_line(text: &str, rules: LineRules) -> bool {
    strip_indent(text, rules).trim_end() == "::end"
}

/// Extract the directive name from a line starting with `::name`.
#[must_use]
pub fn directive_name(text: &str, rules: LineRules) -> Option<&str> {
    let rest = strip_indent(text, rules).strip_prefix("::")?;
    let end = rest
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .map_or(rest.len(), |(i, _)| i);
    let name = &rest[..end];
    is_valid_name(name).then_some(name)
}

/// Check that a directive name matches `[A-Za-z_][A-Za-z0-9_-]*`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Find the closing `::end` line for a block opened at `open_idx`.
#[must_use]
pub fn find_block_end(lines: &[Line<'_>], open_idx: usize, rules: LineRules) -> Option<usize> {
    (open_idx + 1..lines.len()).find(|&idx| is_end_line(lines[idx].text, rules))
}

/// Find the closing `::end` for a block whose body opens no other block.
///
/// Returns `None` when an eligible line between the opener and the first
/// `::end` starts a directive for which `opens_block` holds. That directive
/// owns the `::end`, so the opener can only be read as a single line.
#[must_use]
pub fn find_leaf_block_end(
    lines: &[Line<'_>],
    open_idx: usize,
    rules: LineRules,
    opens_block: impl Fn(&str) -> bool,
) -> Option<usize> {
    let end_idx = find_block_end(lines, open_idx, rules)?;
    let nested = eligible_lines(lines, rules)
        .skip_while(|&(idx, _)| idx <= open_idx)
        .take_while(|&(idx, _)| idx < end_idx)
        .filter_map(|(_, line)| directive_name(line.text, rules))
        .any(opens_block);
    (!nested).then_some(end_idx)
}

/// Splice replacements into `input` by byte range.
///
/// Ranges must be sorted and non-overlapping.
#[must_use]
pub fn splice(input: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;
    for (range, text) in replacements {
        output.push_str(&input[cursor..range.start]);
        output.push_str(text);
        cursor = range.end;
    }
    output.push_str(&input[cursor..]);
    output
}

/// Tracks code fence state during line-by-line processing.
///
/// Code fences in `CommonMark` can use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence.
#[derive(Debug, Default)]
pub struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    /// Create a new fence tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    #[must_use]
    pub fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count * expected_char.len_utf8()..].trim().is_empty()
}
