//! YAML frontmatter extraction.
//!
//! A document may open with a `---` line, YAML, and a closing `---` (or
//! `...`) line. The YAML mapping becomes the page data that conditional
//! directives read.

use mg_directives::PageData;
use serde_json::Value;

/// Frontmatter error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FrontmatterError {
    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping")]
    NotMapping,
}

/// A document split into frontmatter and body.
#[derive(Debug)]
pub(crate) struct Document<'a> {
    /// Frontmatter block including both delimiter lines, or empty.
    pub(crate) frontmatter: &'a str,
    /// Text after the frontmatter.
    pub(crate) body: &'a str,
    /// Parsed frontmatter fields.
    pub(crate) page_data: PageData,
}

/// Split `text` into frontmatter and body and parse the frontmatter.
///
/// Text without an opening `---` line, or without a closing line, has no
/// frontmatter and is returned whole as the body.
pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, FrontmatterError> {
    let Some((yaml, body_start)) = locate(text) else {
        return Ok(Document {
            frontmatter: "",
            body: text,
            page_data: PageData::new(),
        });
    };

    Ok(Document {
        frontmatter: &text[..body_start],
        body: &text[body_start..],
        page_data: parse_page_data(yaml)?,
    })
}

/// Find the YAML text and the byte offset where the body starts.
fn locate(text: &str) -> Option<(&str, usize)> {
    let mut offset = 0;
    let mut yaml_start = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end();
        match yaml_start {
            None if trimmed == "---" => yaml_start = Some(offset + line.len()),
            None => return None,
            Some(start) if trimmed == "---" || trimmed == "..." => {
                return Some((&text[start..offset], offset + line.len()));
            }
            Some(_) => {}
        }
        offset += line.len();
    }
    None
}

fn parse_page_data(yaml: &str) -> Result<PageData, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(PageData::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(PageData::new()),
        _ => Err(FrontmatterError::NotMapping),
    }
}
