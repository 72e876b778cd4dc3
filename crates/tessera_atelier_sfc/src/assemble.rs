//! Fragment assembly.

use std::borrow::Cow;
use std::ops::Range;
use tessera_carton::{is_blank, LineIndex, OffsetEncoding, OffsetMapper};

use crate::error::RegionKind;
use crate::resolve::Regions;
use crate::types::{CodeFragment, FragmentReport, ScriptFragments};

/// Turns byte positions of one document into reported lines and offsets.
#[derive(Debug, Clone)]
pub struct Positioner {
    lines: LineIndex,
    offsets: OffsetMapper,
}

impl Positioner {
    pub fn new(source: &str, encoding: OffsetEncoding) -> Self {
        Self {
            lines: LineIndex::new(source),
            offsets: OffsetMapper::new(source, encoding),
        }
    }

    /// 1-based line of a byte offset.
    #[inline]
    pub fn line(&self, offset: usize) -> usize {
        self.lines.line(offset)
    }

    /// Build the fragment for a byte range of `source`.
    pub fn fragment<'s>(&self, source: &'s str, range: Range<usize>) -> CodeFragment<'s> {
        CodeFragment {
            fragment: Cow::Borrowed(&source[range.clone()]),
            start_line: self.line(range.start),
            start_char: self.offsets.map(range.start),
            end_char: self.offsets.map(range.end),
        }
    }
}

/// A markup region kept in the report, in byte coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupFragment<'s> {
    pub text: &'s str,
    /// Byte offset in the document
    pub start: usize,
    pub start_line: usize,
}

/// The report before expression extraction, with the markup to parse.
#[derive(Debug, Clone, Default)]
pub struct Assembled<'s> {
    pub report: FragmentReport<'s>,
    pub markup: Vec<MarkupFragment<'s>>,
}

/// Convert resolved regions into fragments.
///
/// Whitespace-only markup is dropped without touching its neighbours.
pub fn assemble<'s>(source: &'s str, regions: &Regions, positioner: &Positioner) -> Assembled<'s> {
    let mut scripts = Vec::new();
    let mut style = None;
    for region in &regions.tagged {
        let fragment = positioner.fragment(source, region.range.clone());
        match region.kind {
            RegionKind::Script => scripts.push(fragment),
            RegionKind::Style => style = Some(fragment),
        }
    }

    let mut html_fragments = Vec::with_capacity(regions.markup.len());
    let mut markup = Vec::with_capacity(regions.markup.len());
    for range in &regions.markup {
        let text = &source[range.clone()];
        if is_blank(text) {
            continue;
        }
        let fragment = positioner.fragment(source, range.clone());
        markup.push(MarkupFragment {
            text,
            start: range.start,
            start_line: fragment.start_line,
        });
        html_fragments.push(fragment);
    }

    tracing::trace!(
        "assemble: {} scripts, style: {}, {} markup fragments",
        scripts.len(),
        style.is_some(),
        html_fragments.len()
    );

    Assembled {
        report: FragmentReport {
            script: ScriptFragments::from_vec(scripts),
            style,
            html_fragments,
            ..Default::default()
        },
        markup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::TaggedRegion;

    #[test]
    fn test_positions() {
        let source = "a\nb\n\nc";
        let positioner = Positioner::new(source, OffsetEncoding::Utf8);
        let fragment = positioner.fragment(source, 5..6);
        assert_eq!(fragment.fragment, "c");
        assert_eq!(fragment.start_line, 4);
        assert_eq!((fragment.start_char, fragment.end_char), (5, 6));
    }

    #[test]
    fn test_utf16_offsets() {
        let source = "<p>héllo</p>{a}";
        let positioner = Positioner::new(source, OffsetEncoding::Utf16);
        let fragment = positioner.fragment(source, 14..15);
        assert_eq!(fragment.fragment, "a");
        assert_eq!((fragment.start_char, fragment.end_char), (13, 14));
    }

    #[test]
    fn test_blank_markup_is_dropped() {
        let source = "\n<script></script>\n\n<p>x</p>\n";
        let regions = Regions {
            tagged: vec![TaggedRegion {
                kind: RegionKind::Script,
                index: 0,
                range: 1..18,
            }],
            markup: vec![0..1, 18..source.len()],
        };
        let assembled = assemble(source, &regions, &Positioner::new(source, OffsetEncoding::Utf8));

        let script = assembled.report.scripts().next().unwrap();
        assert_eq!(script.start_line, 2);
        assert_eq!(assembled.report.html_fragments.len(), 1);
        assert_eq!(assembled.report.html_fragments[0].fragment, "\n\n<p>x</p>\n");
        assert_eq!(assembled.report.html_fragments[0].start_line, 2);
        assert_eq!(
            assembled.markup,
            vec![MarkupFragment {
                text: "\n\n<p>x</p>\n",
                start: 18,
                start_line: 2,
            }]
        );
    }
}
