//! Region resolution.
//!
//! Located tag texts are searched for again in the document, so offsets never
//! depend on how the locator read the markup. A tag whose text cannot be found
//! exactly once is rejected instead of guessed.

use memchr::memmem;
use std::ops::Range;

use crate::error::{DivideError, RegionKind};
use crate::locate::LocatedTags;

/// A script or style block with its byte range in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRegion {
    pub kind: RegionKind,
    /// Position among the located blocks of the same kind
    pub index: usize,
    pub range: Range<usize>,
}

/// Tagged blocks and the markup gaps around them, both in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regions {
    pub tagged: Vec<TaggedRegion>,
    pub markup: Vec<Range<usize>>,
}

/// Place every located tag in the document and compute the markup between them.
pub fn resolve(
    source: &str,
    tags: &LocatedTags<'_>,
    filename: Option<&str>,
) -> Result<Regions, DivideError> {
    let style = tags.style.as_deref().map(|text| (RegionKind::Style, 0, text));
    let scripts = tags
        .scripts
        .iter()
        .enumerate()
        .map(|(index, text)| (RegionKind::Script, index, &**text));

    let mut tagged = Vec::with_capacity(tags.scripts.len() + 1);
    for (kind, index, text) in scripts.chain(style) {
        let start = find_unique(source, text)
            .map_err(|occurrences| DivideError::ambiguous(kind, occurrences, filename))?;
        tagged.push(TaggedRegion {
            kind,
            index,
            range: start..start + text.len(),
        });
    }
    tagged.sort_by_key(|region| region.range.start);

    let mut markup = Vec::with_capacity(tagged.len() + 1);
    let mut cursor = 0;
    for region in &tagged {
        if region.range.start < cursor {
            return Err(DivideError::ambiguous(region.kind, 1, filename));
        }
        if region.range.start > cursor {
            markup.push(cursor..region.range.start);
        }
        cursor = region.range.end;
    }
    if cursor < source.len() {
        markup.push(cursor..source.len());
    }

    tracing::trace!(
        "resolve: {} tagged regions, {} markup regions",
        tagged.len(),
        markup.len()
    );
    Ok(Regions { tagged, markup })
}

/// Offset of the only occurrence of `needle`, or the occurrence count.
fn find_unique(haystack: &str, needle: &str) -> Result<usize, usize> {
    if needle.is_empty() {
        return Err(0);
    }
    let mut found = memmem::find_iter(haystack.as_bytes(), needle.as_bytes());
    match (found.next(), found.next()) {
        (Some(start), None) => Ok(start),
        (None, _) => Err(0),
        (Some(_), Some(_)) => Err(2 + found.count()),
    }
}
