//! Offset unit conversion.
//!
//! Internally every position is a UTF-8 byte offset. Consumers written in other
//! languages index strings differently, so reported offsets can be converted to
//! UTF-16 code units or Unicode scalar values.

use serde::{Deserialize, Serialize};

/// Unit in which character offsets are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OffsetEncoding {
    /// UTF-8 bytes; `&source[start..end]` slices the reported fragment.
    #[default]
    Utf8,
    /// UTF-16 code units, matching JavaScript string indices.
    Utf16,
    /// Unicode scalar values.
    CodePoint,
}

impl OffsetEncoding {
    /// Width of a character in this encoding.
    #[inline]
    fn units(self, c: char) -> usize {
        match self {
            Self::Utf8 => c.len_utf8(),
            Self::Utf16 => c.len_utf16(),
            Self::CodePoint => 1,
        }
    }
}

/// Converts byte offsets of one source text into the configured unit.
///
/// Only multi-byte characters are recorded, so ASCII documents map in O(1)
/// and others in O(log n) per lookup.
#[derive(Debug, Clone)]
pub struct OffsetMapper {
    encoding: OffsetEncoding,
    /// (byte offset just past a multi-byte char, bytes saved up to there)
    checkpoints: Vec<(usize, usize)>,
}

impl OffsetMapper {
    pub fn new(source: &str, encoding: OffsetEncoding) -> Self {
        let mut checkpoints = Vec::new();
        if encoding != OffsetEncoding::Utf8 && !source.is_ascii() {
            let mut saved = 0;
            for (offset, c) in source.char_indices() {
                let len = c.len_utf8();
                if len > 1 {
                    saved += len - encoding.units(c);
                    checkpoints.push((offset + len, saved));
                }
            }
        }
        Self {
            encoding,
            checkpoints,
        }
    }

    #[inline]
    pub fn encoding(&self) -> OffsetEncoding {
        self.encoding
    }

    /// Map a byte offset (on a char boundary) to the configured unit.
    pub fn map(&self, byte_offset: usize) -> usize {
        if self.checkpoints.is_empty() {
            return byte_offset;
        }
        let idx = self
            .checkpoints
            .partition_point(|&(end, _)| end <= byte_offset);
        if idx == 0 {
            byte_offset
        } else {
            byte_offset - self.checkpoints[idx - 1].1
        }
    }
}
