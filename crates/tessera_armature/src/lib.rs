//! Armature - The structural parser for Svelte component templates.
//!
//! Parses markup, mustache tags, directives and control blocks into the
//! arena-allocated AST from `tessera_relief`. Embedded expressions are
//! delimited by the scanner and validated with `oxc_parser`, and every
//! expression node carries its exact span.
//!
//! # Example
//!
//! ```
//! use tessera_armature::parse;
//! use tessera_carton::Bump;
//! use tessera_relief::TemplateNode;
//!
//! let allocator = Bump::new();
//! let root = parse(&allocator, "<p>{greeting}</p>").unwrap();
//! assert!(matches!(root.children[0], TemplateNode::Element(_)));
//! ```

pub mod expression;
pub mod parser;
pub mod scanner;

pub use parser::Parser;
pub use scanner::Scanner;

use tessera_carton::Bump;
use tessera_relief::{CompilerError, ParserOptions, RootNode};

/// Parse a template with default options.
pub fn parse<'a>(allocator: &'a Bump, source: &'a str) -> Result<RootNode<'a>, CompilerError> {
    parse_with_options(allocator, source, ParserOptions::default())
}

/// Parse a template with custom options.
pub fn parse_with_options<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: ParserOptions,
) -> Result<RootNode<'a>, CompilerError> {
    tracing::trace!(len = source.len(), "parsing template");
    let result = Parser::with_options(allocator, source, options).parse();
    if let Err(error) = &result {
        tracing::debug!(code = ?error.code, "template rejected: {error}");
    }
    result
}

/// Turns template text into an AST allocated in the given arena.
pub trait TemplateParser {
    fn parse<'a>(&self, allocator: &'a Bump, source: &'a str)
        -> Result<RootNode<'a>, CompilerError>;
}

/// The Svelte template parser from this crate.
#[derive(Debug, Clone, Default)]
pub struct StrictTemplateParser {
    pub options: ParserOptions,
}

impl StrictTemplateParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }
}

impl TemplateParser for StrictTemplateParser {
    fn parse<'a>(
        &self,
        allocator: &'a Bump,
        source: &'a str,
    ) -> Result<RootNode<'a>, CompilerError> {
        parse_with_options(allocator, source, self.options.clone())
    }
}
