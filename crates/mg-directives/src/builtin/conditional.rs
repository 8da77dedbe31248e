//! `::if CONDITION` / `::unless CONDITION` blocks.

use crate::condition::evaluate;
use crate::context::DirectiveMatch;
use crate::error::HandlerError;

pub(super) fn if_block(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    Ok(keep_if(m, evaluate(m.args, m.page_data)))
}

pub(super) fn unless_block(m: &DirectiveMatch<'_>) -> Result<String, HandlerError> {
    Ok(keep_if(m, !evaluate(m.args, m.page_data)))
}

fn keep_if(m: &DirectiveMatch<'_>, keep: bool) -> String {
    tracing::trace!(directive = m.name, condition = m.args, keep, "Evaluated condition");
    if keep { m.content.to_owned() } else { String::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageData;
    use serde_json::json;

    fn page() -> PageData {
        let mut page = PageData::new();
        page.insert("featured".to_owned(), json!(true));
        page.insert("status".to_owned(), json!("draft"));
        page
    }

    #[test]
    fn test_if_keeps_body() {
        let page = page();
        let m = DirectiveMatch::block("if", "featured", "Shown", "", &page);
        assert_eq!(if_block(&m).unwrap(), "Shown");
    }

    #[test]
    fn test_if_drops_body() {
        let page = page();
        let m = DirectiveMatch::block("if", "status==published", "Hidden", "", &page);
        assert_eq!(if_block(&m).unwrap(), "");
    }

    #[test]
    fn test_unless_inverts() {
        let page = page();
        let m = DirectiveMatch::block("unless", "featured", "Hidden", "", &page);
        assert_eq!(unless_block(&m).unwrap(), "");
        let m = DirectiveMatch::block("unless", "missing", "Shown", "", &page);
        assert_eq!(unless_block(&m).unwrap(), "Shown");
    }

    #[test]
    fn test_empty_condition_is_false() {
        let page = page();
        let m = DirectiveMatch::block("if", "", "Hidden", "", &page);
        assert_eq!(if_block(&m).unwrap(), "");
    }
}
