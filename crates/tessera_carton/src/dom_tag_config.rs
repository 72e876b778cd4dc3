//! HTML tag tables used by the template parser.

use phf::{phf_set, Set};

/// Elements that never have children or a closing tag.
static VOID_TAGS: Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
};

/// Elements whose content is raw text up to the matching closing tag.
static RAW_TEXT_TAGS: Set<&'static str> = phf_set! {
    "script", "style",
};

/// Block-level elements that close an open `<p>`.
static CLOSES_P: Set<&'static str> = phf_set! {
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup",
    "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
};

/// Check if the tag is an HTML void element.
#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

/// Check if the tag holds raw text content.
#[inline]
pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

/// Whether opening `next` while `current` is open closes `current` first.
pub fn closing_tag_omitted(current: &str, next: &str) -> bool {
    match current {
        "p" => CLOSES_P.contains(next),
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "rt" | "rp" => matches!(next, "rt" | "rp"),
        "optgroup" => next == "optgroup",
        "option" => matches!(next, "option" | "optgroup"),
        "thead" | "tbody" => matches!(next, "tbody" | "tfoot"),
        "tfoot" => next == "tbody",
        "tr" => matches!(next, "tr" | "tbody"),
        "td" | "th" => matches!(next, "td" | "th" | "tr"),
        _ => false,
    }
}

/// Elements whose end tag may be left out when their parent closes.
pub fn has_optional_end_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "li"
            | "dt"
            | "dd"
            | "rt"
            | "rp"
            | "optgroup"
            | "option"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "td"
            | "th"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_tags() {
        assert!(is_void_tag("input"));
        assert!(is_void_tag("BR"));
        assert!(!is_void_tag("div"));
    }

    #[test]
    fn test_raw_text_tags() {
        assert!(is_raw_text_tag("script"));
        assert!(is_raw_text_tag("Style"));
        assert!(!is_raw_text_tag("textarea"));
    }

    #[test]
    fn test_closing_tag_omitted() {
        assert!(closing_tag_omitted("p", "p"));
        assert!(closing_tag_omitted("p", "div"));
        assert!(!closing_tag_omitted("p", "span"));
        assert!(closing_tag_omitted("li", "li"));
        assert!(closing_tag_omitted("td", "tr"));
        assert!(!closing_tag_omitted("div", "div"));
    }

    #[test]
    fn test_optional_end_tag() {
        assert!(has_optional_end_tag("p"));
        assert!(has_optional_end_tag("td"));
        assert!(!has_optional_end_tag("div"));
    }
}
