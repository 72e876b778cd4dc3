//! Relief - The sculptured AST surface for Svelte component templates.
//!
//! Node types produced by the strict template parser, source positions, the
//! compiler error catalogue and parser options.

pub mod ast;
pub mod errors;
pub mod options;

pub use ast::*;
pub use errors::{CompilerError, ErrorCode};
pub use options::{is_component_tag, ParserOptions};
