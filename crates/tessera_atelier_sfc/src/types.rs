//! Fragment report types.
//!
//! Zero-copy design: fragments borrow from the divided document and can be
//! turned into owned values with `into_owned`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A contiguous slice of the document with its position.
///
/// `&source[start_char..end_char] == fragment` holds when offsets are
/// reported in UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFragment<'a> {
    /// Fragment text
    #[serde(borrow)]
    pub fragment: Cow<'a, str>,

    /// Line of the first character (1-based)
    pub start_line: usize,

    /// Offset of the first character
    pub start_char: usize,

    /// Offset just past the last character
    pub end_char: usize,
}

impl<'a> CodeFragment<'a> {
    /// Convert to owned version
    pub fn into_owned(self) -> CodeFragment<'static> {
        CodeFragment {
            fragment: Cow::Owned(self.fragment.into_owned()),
            start_line: self.start_line,
            start_char: self.start_char,
            end_char: self.end_char,
        }
    }

    /// Whether `other` lies entirely within this fragment.
    pub fn contains(&self, other: &CodeFragment<'_>) -> bool {
        self.start_char <= other.start_char && other.end_char <= self.end_char
    }
}

/// One script block, or several in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptFragments<'a> {
    Single(#[serde(borrow)] CodeFragment<'a>),
    Multiple(#[serde(borrow)] Vec<CodeFragment<'a>>),
}

impl<'a> ScriptFragments<'a> {
    /// `None` for no scripts, `Single` for one and `Multiple` otherwise.
    pub fn from_vec(mut scripts: Vec<CodeFragment<'a>>) -> Option<Self> {
        match scripts.len() {
            0 => None,
            1 => scripts.pop().map(Self::Single),
            _ => Some(Self::Multiple(scripts)),
        }
    }

    pub fn as_slice(&self) -> &[CodeFragment<'a>] {
        match self {
            Self::Single(fragment) => std::slice::from_ref(fragment),
            Self::Multiple(fragments) => fragments,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Convert to owned version
    pub fn into_owned(self) -> ScriptFragments<'static> {
        match self {
            Self::Single(fragment) => ScriptFragments::Single(fragment.into_owned()),
            Self::Multiple(fragments) => {
                ScriptFragments::Multiple(fragments.into_iter().map(|f| f.into_owned()).collect())
            }
        }
    }
}

/// Result of dividing a component document.
///
/// Every field is omitted from JSON when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentReport<'a> {
    /// Display name passed by the caller
    #[serde(default, borrow, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<Cow<'a, str>>,

    /// Script block(s)
    #[serde(default, borrow, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptFragments<'a>>,

    /// First style block
    #[serde(default, borrow, skip_serializing_if = "Option::is_none")]
    pub style: Option<CodeFragment<'a>>,

    /// Markup between the blocks, whitespace-only parts dropped
    #[serde(default, borrow, skip_serializing_if = "Vec::is_empty")]
    pub html_fragments: Vec<CodeFragment<'a>>,

    /// Expressions embedded in the markup, in document order
    #[serde(
        default,
        borrow,
        rename = "scriptInHTMLFragments",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub script_in_html_fragments: Vec<CodeFragment<'a>>,
}

impl<'a> FragmentReport<'a> {
    /// Script fragments regardless of how many there are.
    pub fn scripts(&self) -> impl Iterator<Item = &CodeFragment<'a>> {
        self.script
            .as_ref()
            .map_or(&[][..], ScriptFragments::as_slice)
            .iter()
    }

    /// True when the document produced no fragment at all.
    pub fn is_empty(&self) -> bool {
        self.script.is_none()
            && self.style.is_none()
            && self.html_fragments.is_empty()
            && self.script_in_html_fragments.is_empty()
    }

    /// Convert to owned version
    pub fn into_owned(self) -> FragmentReport<'static> {
        FragmentReport {
            file_name: self.file_name.map(|f| Cow::Owned(f.into_owned())),
            script: self.script.map(|s| s.into_owned()),
            style: self.style.map(|s| s.into_owned()),
            html_fragments: self
                .html_fragments
                .into_iter()
                .map(|f| f.into_owned())
                .collect(),
            script_in_html_fragments: self
                .script_in_html_fragments
                .into_iter()
                .map(|f| f.into_owned())
                .collect(),
        }
    }
}
