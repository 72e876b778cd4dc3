//! Line table for byte offsets.

use memchr::memchr_iter;

/// Newline positions of a source text, for turning byte offsets into lines.
///
/// Lines are 1-based and only `\n` terminates a line, so `\r\n` counts once.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            newlines: memchr_iter(b'\n', source.as_bytes()).collect(),
        }
    }

    /// 1-based line of the given byte offset.
    #[inline]
    pub fn line(&self, offset: usize) -> usize {
        // A newline at `offset` itself still belongs to the line it ends.
        match self.newlines.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i + 1,
        }
    }

    /// 1-based column of the given byte offset.
    #[inline]
    pub fn column(&self, offset: usize) -> usize {
        let line = self.line(offset);
        if line == 1 {
            offset + 1
        } else {
            offset - self.newlines[line - 2]
        }
    }

    /// Byte offset at which the given 1-based line starts.
    pub fn line_start(&self, line: usize) -> usize {
        if line <= 1 {
            0
        } else {
            self.newlines
                .get(line - 2)
                .map(|nl| nl + 1)
                .unwrap_or_else(|| self.newlines.last().map_or(0, |nl| nl + 1))
        }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.newlines.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("<p>{'Foo'}</p>");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(13), 1);
        assert_eq!(index.column(4), 5);
        assert_eq!(index.line_count(), 1);
    }

    #[test]
    fn test_newline_belongs_to_its_line() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line(2), 1);
        assert_eq!(index.line(3), 2);
        assert_eq!(index.line(5), 2);
        assert_eq!(index.line(6), 3);
        assert_eq!(index.line(7), 4);
        assert_eq!(index.column(3), 1);
        assert_eq!(index.column(8), 2);
    }

    #[test]
    fn test_line_start() {
        let index = LineIndex::new("ab\ncd\nef");
        assert_eq!(index.line_start(1), 0);
        assert_eq!(index.line_start(2), 3);
        assert_eq!(index.line_start(3), 6);
    }
}
