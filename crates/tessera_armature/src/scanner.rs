//! Byte cursor over template text and the embedded-script scanner.
//!
//! Embedded scripts are first skimmed to find where they end: strings,
//! template literals, comments and regular expressions are skipped whole and
//! brackets are balanced until a caller-supplied stop condition holds at depth
//! zero. Expressions are then checked by [`crate::expression`].

use memchr::memmem;
use tessera_carton::LineIndex;
use tessera_relief::{CompilerError, ErrorCode, ExpressionNode, Position, SourceLocation};

use crate::expression::check_expression;

/// Character codes for fast comparison
pub mod char_codes {
    pub const TAB: u8 = 0x09;
    pub const NEWLINE: u8 = 0x0A;
    pub const FORM_FEED: u8 = 0x0C;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const SPACE: u8 = 0x20;
    pub const EXCLAMATION_MARK: u8 = 0x21;
    pub const DOUBLE_QUOTE: u8 = 0x22;
    pub const DOLLAR: u8 = 0x24;
    pub const SINGLE_QUOTE: u8 = 0x27;
    pub const LEFT_PAREN: u8 = 0x28;
    pub const RIGHT_PAREN: u8 = 0x29;
    pub const STAR: u8 = 0x2A;
    pub const COMMA: u8 = 0x2C;
    pub const SLASH: u8 = 0x2F;
    pub const COLON: u8 = 0x3A;
    pub const LT: u8 = 0x3C;
    pub const EQ: u8 = 0x3D;
    pub const GT: u8 = 0x3E;
    pub const LEFT_SQUARE: u8 = 0x5B;
    pub const BACKSLASH: u8 = 0x5C;
    pub const RIGHT_SQUARE: u8 = 0x5D;
    pub const GRAVE_ACCENT: u8 = 0x60;
    pub const LEFT_BRACE: u8 = 0x7B;
    pub const PIPE: u8 = 0x7C;
    pub const RIGHT_BRACE: u8 = 0x7D;
}

use char_codes::*;

/// Stop condition for [`scan_script`], checked at bracket depth zero.
pub type Stop<'s> = &'s dyn Fn(&[u8], usize) -> bool;

/// Check if character is whitespace
#[inline]
pub fn is_whitespace(c: u8) -> bool {
    c == SPACE || c == NEWLINE || c == TAB || c == FORM_FEED || c == CARRIAGE_RETURN
}

/// Check if character can continue an identifier
#[inline]
pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == DOLLAR
}

/// Stop at a closing brace.
pub fn at_close_brace(bytes: &[u8], index: usize) -> bool {
    bytes[index] == RIGHT_BRACE
}

/// Whether `word` starts at `index` as a whole word preceded by whitespace.
pub fn is_word_at(bytes: &[u8], index: usize, word: &[u8]) -> bool {
    index > 0
        && is_whitespace(bytes[index - 1])
        && bytes[index..].starts_with(word)
        && bytes
            .get(index + word.len())
            .map_or(true, |&c| is_whitespace(c) || c == RIGHT_BRACE)
}

/// Whether a `/` after `prev` begins a regular expression rather than a division.
#[inline]
fn regex_allowed(prev: u8) -> bool {
    matches!(
        prev,
        b'=' | b'!'
            | b'+'
            | b'-'
            | b'*'
            | b'%'
            | b'<'
            | b'>'
            | b'&'
            | b'|'
            | b'^'
            | b'~'
            | b'?'
            | b':'
            | b'('
            | b'['
            | b'{'
            | b','
            | b';'
    )
}

/// Skim script text from `start` until `stop` holds outside any bracket.
///
/// Returns the stop index, or the error code and offset of the first
/// construct that cannot be closed.
pub fn scan_script(bytes: &[u8], start: usize, stop: Stop<'_>) -> Result<usize, (ErrorCode, usize)> {
    let mut depth = 0usize;
    let mut prev = LEFT_PAREN;
    let mut i = start;

    while i < bytes.len() {
        if depth == 0 && stop(bytes, i) {
            return Ok(i);
        }

        let c = bytes[i];
        match c {
            DOUBLE_QUOTE | SINGLE_QUOTE => {
                i = skip_string(bytes, i)?;
                prev = c;
                continue;
            }
            GRAVE_ACCENT => {
                i = skip_template(bytes, i)?;
                prev = c;
                continue;
            }
            SLASH => match bytes.get(i + 1) {
                Some(&SLASH) => {
                    i = memchr::memchr(NEWLINE, &bytes[i..]).map_or(bytes.len(), |n| i + n);
                    continue;
                }
                Some(&STAR) => {
                    i = memmem::find(&bytes[i + 2..], b"*/")
                        .map(|n| i + 2 + n + 2)
                        .ok_or((ErrorCode::UnterminatedComment, i))?;
                    continue;
                }
                _ if regex_allowed(prev) => {
                    i = skip_regex(bytes, i)?;
                    // a regex literal is a value, so a following `/` divides
                    prev = RIGHT_PAREN;
                    continue;
                }
                _ => {}
            },
            LEFT_PAREN | LEFT_SQUARE | LEFT_BRACE => depth += 1,
            RIGHT_PAREN | RIGHT_SQUARE | RIGHT_BRACE => {
                if depth == 0 {
                    return Err((ErrorCode::UnbalancedBracket, i));
                }
                depth -= 1;
            }
            _ => {}
        }

        if !is_whitespace(c) {
            prev = c;
        }
        i += 1;
    }

    Err((ErrorCode::UnexpectedEof, bytes.len()))
}

fn skip_string(bytes: &[u8], start: usize) -> Result<usize, (ErrorCode, usize)> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            BACKSLASH => i += 2,
            NEWLINE => break,
            c if c == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err((ErrorCode::UnterminatedString, start))
}

fn skip_template(bytes: &[u8], start: usize) -> Result<usize, (ErrorCode, usize)> {
    let unterminated = (ErrorCode::UnterminatedTemplateLiteral, start + 1);
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            BACKSLASH => i += 2,
            GRAVE_ACCENT => return Ok(i + 1),
            DOLLAR if bytes.get(i + 1) == Some(&LEFT_BRACE) => {
                i = match scan_script(bytes, i + 2, &at_close_brace) {
                    Ok(end) => end + 1,
                    Err((ErrorCode::UnexpectedEof, _)) => return Err(unterminated),
                    Err(err) => return Err(err),
                };
            }
            _ => i += 1,
        }
    }
    Err(unterminated)
}

fn skip_regex(bytes: &[u8], start: usize) -> Result<usize, (ErrorCode, usize)> {
    let mut in_class = false;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            NEWLINE => break,
            BACKSLASH => i += 2,
            LEFT_SQUARE => {
                in_class = true;
                i += 1;
            }
            RIGHT_SQUARE => {
                in_class = false;
                i += 1;
            }
            SLASH if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Ok(i);
            }
            _ => i += 1,
        }
    }
    Err((ErrorCode::UnterminatedRegex, start))
}

/// Cursor over the template being parsed
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    index: usize,
    lines: LineIndex,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            index: 0,
            lines: LineIndex::new(source),
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn set_index(&mut self, index: usize) {
        self.index = index.min(self.bytes.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.index >= self.bytes.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    #[inline]
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_index(self.index + n);
    }

    #[inline]
    pub fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.index..].starts_with(s.as_bytes())
    }

    /// Consume `s` if the input continues with it.
    pub fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.index += s.len();
            true
        } else {
            false
        }
    }

    /// Consume `word` only when it is not followed by an identifier character.
    pub fn eat_word(&mut self, word: &str) -> bool {
        let end = self.index + word.len();
        if self.starts_with(word) && !self.byte_at(end).is_some_and(is_ident_char) {
            self.index = end;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, s: &str) -> Result<(), CompilerError> {
        if self.eat(s) {
            Ok(())
        } else if self.is_eof() {
            Err(self.error(ErrorCode::UnexpectedEof, self.index))
        } else {
            Err(self.error_with(
                ErrorCode::UnexpectedToken,
                format!("Expected {s}"),
                self.index,
            ))
        }
    }

    /// Skip whitespace, returning whether any was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        self.index = self.skip_whitespace_from(start);
        self.index > start
    }

    pub fn require_whitespace(&mut self) -> Result<(), CompilerError> {
        if self.skip_whitespace() {
            Ok(())
        } else if self.is_eof() {
            Err(self.error(ErrorCode::UnexpectedEof, self.index))
        } else {
            Err(self.error_with(ErrorCode::UnexpectedToken, "Expected whitespace", self.index))
        }
    }

    #[inline]
    pub fn skip_whitespace_from(&self, mut index: usize) -> usize {
        while index < self.bytes.len() && is_whitespace(self.bytes[index]) {
            index += 1;
        }
        index
    }

    /// Text from `from` while `pred` holds. `pred` must only stop on ASCII bytes.
    pub fn slice_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> &'a str {
        let from = from.min(self.bytes.len());
        let len = self.bytes[from..]
            .iter()
            .position(|&c| !pred(c))
            .unwrap_or(self.bytes.len() - from);
        &self.source[from..from + len]
    }

    /// Consume and return text while `pred` holds.
    pub fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let text = self.slice_while(self.index, pred);
        self.index += text.len();
        text
    }

    /// Consume text up to the next `<` or `{`.
    pub fn read_text(&mut self) -> &'a str {
        let start = self.index;
        let end = memchr::memchr2(LT, LEFT_BRACE, &self.bytes[start..])
            .map_or(self.bytes.len(), |n| start + n);
        self.index = end;
        &self.source[start..end]
    }

    /// Offset of the next occurrence of `needle` at or after the cursor.
    pub fn find(&self, needle: &str) -> Option<usize> {
        memmem::find(&self.bytes[self.index..], needle.as_bytes()).map(|n| self.index + n)
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    /// Get the position for a given index
    pub fn get_pos(&self, index: usize) -> Position {
        Position {
            offset: index as u32,
            line: self.lines.line(index) as u32,
            column: self.lines.column(index) as u32,
        }
    }

    pub fn loc(&self, start: usize, end: usize) -> SourceLocation {
        SourceLocation::new(self.get_pos(start), self.get_pos(end), &self.source[start..end])
    }

    pub fn error(&self, code: ErrorCode, index: usize) -> CompilerError {
        CompilerError::new(code, self.get_pos(index))
    }

    pub fn error_with(
        &self,
        code: ErrorCode,
        message: impl Into<tessera_carton::String>,
        index: usize,
    ) -> CompilerError {
        CompilerError::with_message(code, message, self.get_pos(index))
    }

    /// Read an embedded expression up to `stop`, leaving the cursor on the stop byte.
    ///
    /// The node spans the expression without surrounding whitespace. Text that
    /// is not a single JavaScript expression is rejected.
    pub fn read_expression(&mut self, stop: Stop<'_>) -> Result<ExpressionNode, CompilerError> {
        let expression = self.read_pattern(stop)?;
        let start = expression.start();
        check_expression(&expression.content).map_err(|error| {
            self.error_with(ErrorCode::InvalidExpression, error.message, start + error.offset)
        })?;
        Ok(expression)
    }

    /// Like [`Scanner::read_expression`], but only delimits the text.
    ///
    /// Used for binding patterns such as each contexts and await values.
    pub fn read_pattern(&mut self, stop: Stop<'_>) -> Result<ExpressionNode, CompilerError> {
        let start = self.index;
        let end = scan_script(self.bytes, start, stop).map_err(|(code, at)| self.error(code, at))?;
        self.index = end;

        let raw = &self.source[start..end];
        let trimmed_start = start + (raw.len() - raw.trim_start().len());
        let trimmed_end = start + raw.trim_end().len();
        if trimmed_start >= trimmed_end {
            return Err(self.error(ErrorCode::EmptyExpression, end));
        }
        Ok(ExpressionNode::new(
            &self.source[trimmed_start..trimmed_end],
            self.loc(trimmed_start, trimmed_end),
        ))
    }
}
