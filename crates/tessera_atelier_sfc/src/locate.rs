//! Lenient tag location.
//!
//! Finds `<script>` and `<style>` elements the way a forgiving HTML reader
//! would: anywhere in the document, including inside other elements or inside
//! what the template grammar would treat as an expression. Nothing here fails;
//! markup that cannot be read is skipped.

use memchr::memchr;
use std::borrow::Cow;

// Static closing tags for fast comparison (avoid format!)
const CLOSING_SCRIPT: &[u8] = b"</script";
const CLOSING_STYLE: &[u8] = b"</style";

// Tag name bytes for fast comparison
const TAG_SCRIPT: &[u8] = b"script";
const TAG_STYLE: &[u8] = b"style";

/// Text of the located blocks, tags included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedTags<'s> {
    /// Every script element, in document order
    pub scripts: Vec<Cow<'s, str>>,
    /// The first style element
    pub style: Option<Cow<'s, str>>,
}

impl LocatedTags<'_> {
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.style.is_none()
    }
}

/// Finds script and style blocks in a document.
pub trait TagLocator {
    /// Must not fail: unreadable markup yields fewer tags, never an error.
    fn locate<'s>(&self, source: &'s str) -> LocatedTags<'s>;
}

/// Byte-level scanner returning exact slices of the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientTagLocator;

impl TagLocator for LenientTagLocator {
    fn locate<'s>(&self, source: &'s str) -> LocatedTags<'s> {
        let bytes = source.as_bytes();
        let len = bytes.len();
        let mut located = LocatedTags::default();
        let mut pos = 0;

        while let Some(offset) = memchr(b'<', &bytes[pos..]) {
            let start = pos + offset;
            let rest = &bytes[start..];

            if rest.starts_with(b"<!--") {
                match find(bytes, start + 4, b"-->") {
                    Some(end) => {
                        pos = end + 3;
                        continue;
                    }
                    None => break,
                }
            }

            if rest.get(1) == Some(&b'/') {
                // stray or ordinary closing tag
                match memchr(b'>', &bytes[start..]) {
                    Some(end) => {
                        pos = start + end + 1;
                        continue;
                    }
                    None => break,
                }
            }

            if !rest.get(1).is_some_and(u8::is_ascii_alphabetic) {
                pos = start + 1;
                continue;
            }

            let name_start = start + 1;
            let name_end = bytes[name_start..]
                .iter()
                .position(|&c| c.is_ascii_whitespace() || c == b'/' || c == b'>')
                .map_or(len, |n| name_start + n);
            let name = &bytes[name_start..name_end];
            if !name.iter().copied().all(is_tag_name_char) {
                // `a<b}` and the like: not a tag
                pos = start + 1;
                continue;
            }

            let (open_end, self_closing) = match read_open_tag(bytes, name_end) {
                OpenTag::Complete { end, self_closing } => (end, self_closing),
                OpenTag::Invalid => {
                    pos = start + 1;
                    continue;
                }
                OpenTag::Unterminated => break,
            };

            let kind = if name.eq_ignore_ascii_case(TAG_SCRIPT) {
                Some(CLOSING_SCRIPT)
            } else if name.eq_ignore_ascii_case(TAG_STYLE) {
                Some(CLOSING_STYLE)
            } else {
                None
            };

            let Some(closing) = kind else {
                pos = open_end;
                continue;
            };

            let end = if self_closing {
                open_end
            } else {
                // raw text: nothing inside is markup
                let Some(close_start) = find_ignore_case(bytes, open_end, closing) else {
                    break;
                };
                match memchr(b'>', &bytes[close_start..]) {
                    Some(n) => close_start + n + 1,
                    None => break,
                }
            };

            let text = Cow::Borrowed(&source[start..end]);
            if closing == CLOSING_SCRIPT {
                located.scripts.push(text);
            } else if located.style.is_none() {
                located.style = Some(text);
            }
            pos = end;
        }

        tracing::trace!(
            "locate: {} scripts, style: {}",
            located.scripts.len(),
            located.style.is_some()
        );
        located
    }
}

enum OpenTag {
    Complete { end: usize, self_closing: bool },
    /// Something other than attributes before `>`
    Invalid,
    Unterminated,
}

#[inline]
fn is_tag_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'.' | b':' | b'_')
}

/// Read attributes up to the end of an opening tag.
///
/// Quoted values are skipped whole, so they may contain `>`. A quote that
/// does not follow `=`, or a `<` before the tag ends, means the candidate is
/// not a tag at all.
fn read_open_tag(bytes: &[u8], mut pos: usize) -> OpenTag {
    let mut after_eq = false;
    while let Some(&c) = bytes.get(pos) {
        match c {
            b'>' => {
                return OpenTag::Complete {
                    end: pos + 1,
                    self_closing: bytes[pos - 1] == b'/',
                }
            }
            b'<' => return OpenTag::Invalid,
            b'"' | b'\'' if after_eq => {
                let Some(close) = memchr(c, &bytes[pos + 1..]) else {
                    return OpenTag::Unterminated;
                };
                pos += close + 2;
                after_eq = false;
                continue;
            }
            b'"' | b'\'' => return OpenTag::Invalid,
            b'=' => after_eq = true,
            c if c.is_ascii_whitespace() => {}
            _ => after_eq = false,
        }
        pos += 1;
    }
    OpenTag::Unterminated
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(&bytes[from..], needle).map(|n| from + n)
}

/// Find a closing tag such as `</script` in any letter case, followed by a
/// tag-name boundary.
fn find_ignore_case(bytes: &[u8], mut from: usize, needle: &[u8]) -> Option<usize> {
    while let Some(n) = memchr(b'<', &bytes[from..]) {
        let at = from + n;
        let candidate = bytes.get(at..at + needle.len())?;
        let boundary = bytes
            .get(at + needle.len())
            .map_or(true, |&c| c.is_ascii_whitespace() || c == b'>' || c == b'/');
        if candidate.eq_ignore_ascii_case(needle) && boundary {
            return Some(at);
        }
        from = at + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(source: &str) -> LocatedTags<'_> {
        LenientTagLocator.locate(source)
    }

    #[test]
    fn test_locate_basic() {
        let source = "<script>let a;</script>\n<style>p {}</style>\n<p>{a}</p>";
        let tags = locate(source);
        assert_eq!(tags.scripts, vec!["<script>let a;</script>"]);
        assert_eq!(tags.style.as_deref(), Some("<style>p {}</style>"));
    }

    #[test]
    fn test_script_content_is_raw() {
        let source = "<script>if (a < b) { x = '<style>'; }</script>";
        let tags = locate(source);
        assert_eq!(tags.scripts, vec![source]);
        assert!(tags.style.is_none());
    }

    #[test]
    fn test_multiple_scripts_and_first_style() {
        let source = "<script context=\"module\"></script><script lang=\"ts\"></script><style>a{}</style><style>b{}</style>";
        let tags = locate(source);
        assert_eq!(tags.scripts.len(), 2);
        assert_eq!(tags.style.as_deref(), Some("<style>a{}</style>"));
    }

    #[test]
    fn test_nested_and_in_text() {
        let source = "<p>{`<script></script>`}</p><div><script>x</script></div>";
        let tags = locate(source);
        assert_eq!(
            tags.scripts,
            vec!["<script></script>", "<script>x</script>"]
        );
    }

    #[test]
    fn test_comments_and_attributes_are_skipped() {
        let source = "<!-- <script>a</script> --><div title=\"<style>x</style>\"></div>";
        assert!(locate(source).is_empty());
    }

    #[test]
    fn test_case_insensitive_names() {
        let source = "<SCRIPT>a</Script>";
        assert_eq!(locate(source).scripts, vec![source]);
    }

    #[test]
    fn test_comparisons_are_not_tags() {
        let source = "{#if a<b}\n<script>let a, b;</script>\nx{/if}";
        assert_eq!(locate(source).scripts, vec!["<script>let a, b;</script>"]);

        let source = "{#if a <b && c == 'x'}\n<script>s</script>\n<p>'</p>{/if}";
        assert_eq!(locate(source).scripts, vec!["<script>s</script>"]);

        let source = "<p>{a <b ? 'x' : y}</p><style>p{}</style>";
        assert_eq!(locate(source).style.as_deref(), Some("<style>p{}</style>"));
    }

    #[test]
    fn test_quoted_values_may_contain_gt() {
        let source = "<div title='a > b' data-x=\"<\"><script>x</script></div>";
        assert_eq!(locate(source).scripts, vec!["<script>x</script>"]);
        let source = "<script src=\"a.js\" />";
        assert_eq!(locate(source).scripts, vec![source]);
    }

    #[test]
    fn test_malformed_markup_is_skipped() {
        assert!(locate("<script>never closed").is_empty());
        assert!(locate("<div title=\"open").is_empty());
        assert!(locate("a < b <").is_empty());
        assert!(locate("").is_empty());
    }
}
