//! Template parse errors.

use serde::{Deserialize, Serialize};
use tessera_carton::String;
use thiserror::Error;

use crate::ast::Position;

/// Template parse error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    // Markup
    UnexpectedEof = 0,
    UnexpectedToken = 1,
    InvalidTagName = 2,
    UnclosedElement = 3,
    UnclosedComment = 4,
    UnclosedAttributeValue = 5,
    InvalidClosingTag = 6,
    InvalidVoidContent = 7,
    DuplicateAttribute = 8,
    InvalidDirectiveValue = 9,
    // Blocks
    ExpectedBlockType = 20,
    UnclosedBlock = 21,
    UnexpectedBlockClose = 22,
    InvalidElsePlacement = 23,
    InvalidElseIfPlacement = 24,
    InvalidThenPlacement = 25,
    InvalidCatchPlacement = 26,
    ExpectedEachAs = 27,
    ExpectedTag = 28,
    // Expressions
    EmptyExpression = 40,
    UnterminatedString = 41,
    UnterminatedTemplateLiteral = 42,
    UnterminatedComment = 43,
    UnterminatedRegex = 44,
    UnbalancedBracket = 45,
    InvalidExpression = 46,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnexpectedEof => "Unexpected end of input",
            Self::UnexpectedToken => "Unexpected token",
            Self::InvalidTagName => "Expected valid tag name",
            Self::UnclosedElement => "Element was left open",
            Self::UnclosedComment => "comment was left open, expected -->",
            Self::UnclosedAttributeValue => "Expected to close the attribute value with a quote",
            Self::InvalidClosingTag => "Closing tag attempted to close an element that was not open",
            Self::InvalidVoidContent => {
                "Void elements cannot have children or a closing tag"
            }
            Self::DuplicateAttribute => "Attributes need to be unique",
            Self::InvalidDirectiveValue => {
                "Directive value must be a JavaScript expression enclosed in curly braces"
            }
            Self::ExpectedBlockType => "Expected if, each, await or key",
            Self::UnclosedBlock => "Block was left open",
            Self::UnexpectedBlockClose => "Unexpected block closing tag",
            Self::InvalidElsePlacement => {
                "Cannot have an {:else} block outside an {#if ...} or {#each ...} block"
            }
            Self::InvalidElseIfPlacement => {
                "Cannot have an {:else if ...} block outside an {#if ...} block"
            }
            Self::InvalidThenPlacement => {
                "Cannot have a {:then} block outside an {#await ...} block"
            }
            Self::InvalidCatchPlacement => {
                "Cannot have a {:catch} block outside an {#await ...} block"
            }
            Self::ExpectedEachAs => "Expected as",
            Self::ExpectedTag => "Expected 'html', 'debug' or 'const'",
            Self::EmptyExpression => "Expected expression",
            Self::UnterminatedString => "Unterminated string constant",
            Self::UnterminatedTemplateLiteral => "Unterminated template literal",
            Self::UnterminatedComment => "Unterminated comment",
            Self::UnterminatedRegex => "Unterminated regular expression",
            Self::UnbalancedBracket => "Unexpected token",
            Self::InvalidExpression => "Invalid JavaScript expression",
        }
    }
}

/// A template parse error, positioned in the parsed text.
///
/// Displays as `message (line:column)` with a 1-based line and a 0-based
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({}:{})", .position.line, .position.column.saturating_sub(1))]
pub struct CompilerError {
    pub code: ErrorCode,
    pub message: String,
    pub position: Position,
}

impl CompilerError {
    pub fn new(code: ErrorCode, position: Position) -> Self {
        Self {
            code,
            message: String::from(code.message()),
            position,
        }
    }

    /// Error with a message specific to this occurrence.
    pub fn with_message(code: ErrorCode, message: impl Into<String>, position: Position) -> Self {
        Self {
            code,
            message: message.into(),
            position,
        }
    }

    /// Render the lines around the error with a caret under its column.
    ///
    /// Two lines of context are shown on either side, each prefixed with its
    /// line number. Tabs render as two spaces.
    pub fn code_frame(&self, source: &str) -> std::string::String {
        let lines: std::vec::Vec<&str> = source.split('\n').collect();
        let line = (self.position.line as usize).saturating_sub(1);
        let column = (self.position.column as usize).saturating_sub(1);

        let frame_start = line.saturating_sub(2);
        let frame_end = (line + 3).min(lines.len());
        let digits = frame_end.to_string().len();

        let mut out = std::string::String::new();
        for (i, text) in lines[frame_start.min(frame_end)..frame_end].iter().enumerate() {
            let line_no = frame_start + i;
            if !out.is_empty() {
                out.push('\n');
            }
            let text = text.strip_suffix('\r').unwrap_or(text);
            out.push_str(&format!(
                "{:>width$}: {}",
                line_no + 1,
                tabs_to_spaces(text),
                width = digits
            ));
            if line_no == line {
                let prefix = text.get(..column.min(text.len())).unwrap_or(text);
                let indent = digits + 2 + tabs_to_spaces(prefix).chars().count();
                out.push('\n');
                out.push_str(&" ".repeat(indent));
                out.push('^');
            }
        }
        out
    }
}

fn tabs_to_spaces(text: &str) -> std::string::String {
    text.replace('\t', "  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ErrorCode::UnterminatedTemplateLiteral.message(),
            "Unterminated template literal"
        );
        assert!(!ErrorCode::UnclosedBlock.message().is_empty());
    }

    #[test]
    fn test_display_uses_zero_based_column() {
        let error = CompilerError::new(
            ErrorCode::UnterminatedTemplateLiteral,
            Position::new(5, 1, 6),
        );
        assert_eq!(error.to_string(), "Unterminated template literal (1:5)");
    }

    #[test]
    fn test_code_frame() {
        let error = CompilerError::new(
            ErrorCode::UnterminatedTemplateLiteral,
            Position::new(5, 1, 6),
        );
        assert_eq!(error.code_frame("<p>{`"), "1: <p>{`\n        ^");
    }

    #[test]
    fn test_code_frame_context() {
        let source = "a\nb\nc\nd\ne\nf";
        let error = CompilerError::new(ErrorCode::UnexpectedToken, Position::new(6, 4, 1));
        insta::assert_snapshot!(error.code_frame(source), @r"
        2: b
        3: c
        4: d
           ^
        5: e
        6: f
        ");
    }
}
