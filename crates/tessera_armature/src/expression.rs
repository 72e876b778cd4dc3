//! Embedded script validation.
//!
//! The scanner only finds where an expression ends. The text in between is
//! handed to oxc, which rejects anything that is not a single JavaScript
//! expression.

use oxc_allocator::Allocator as OxcAllocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tessera_carton::String;

/// First syntax error reported for an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError {
    pub message: String,
    /// Byte offset into the checked text
    pub offset: usize,
}

/// Check that `content` parses as exactly one JavaScript expression.
pub fn check_expression(content: &str) -> Result<(), ExpressionError> {
    let allocator = OxcAllocator::default();
    let source_type = SourceType::default().with_module(true);

    // The newline keeps a trailing line comment from swallowing the paren
    let mut wrapped = String::with_capacity(content.len() + 3);
    wrapped.push('(');
    wrapped.push_str(content);
    wrapped.push_str("\n)");

    let parser = Parser::new(&allocator, &wrapped, source_type);
    match parser.parse_expression() {
        Ok(_) => Ok(()),
        Err(diagnostics) => {
            let Some(diagnostic) = diagnostics.first() else {
                return Ok(());
            };
            let offset = diagnostic
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map_or(0, |label| label.offset().saturating_sub(1))
                .min(content.len());
            Err(ExpressionError {
                message: String::from(&*diagnostic.message),
                offset,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_expressions() {
        for content in [
            "'Foo'",
            "a + b",
            "items.filter(x => x.ok)",
            "{ y: 20 }",
            "c = a + b",
            "a, b",
            "`a ${b}`",
            "x.replace(/}/g, '')",
            "a // trailing",
        ] {
            assert_eq!(check_expression(content), Ok(()), "{content}");
        }
    }

    #[test]
    fn test_invalid_expressions() {
        for content in ["a +", "a b", "1 2 3", "let x", "a ? b"] {
            assert!(check_expression(content).is_err(), "{content}");
        }
    }

    #[test]
    fn test_error_offset_stays_inside_content() {
        let error = check_expression("a b").unwrap_err();
        assert!((1..=3).contains(&error.offset));
        assert!(!error.message.is_empty());

        let error = check_expression("a +").unwrap_err();
        assert!(error.offset <= 3);
    }
}
