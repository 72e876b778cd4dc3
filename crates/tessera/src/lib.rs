//! # Tessera
//!
//! Splits Svelte component documents into script, style and markup
//! fragments, and finds the script expressions embedded in the markup.
//!
//! This crate re-exports all Tessera sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Arena, line index and offset utilities
//! - [`relief`] - Template AST, positions and parse errors
//! - [`armature`] - Strict template parser
//! - [`atelier_sfc`] - Document division
//!
//! ## Example
//!
//! ```
//! let report = tessera::divide("<p>{'Foo'}</p>", None).unwrap();
//! let json = serde_json::to_string(&report).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"htmlFragments":[{"fragment":"<p>{'Foo'}</p>","startLine":1,"startChar":0,"endChar":14}],"scriptInHTMLFragments":[{"fragment":"'Foo'","startLine":1,"startChar":4,"endChar":9}]}"#
//! );
//! ```

/// Arena, line index and offset utilities.
pub use tessera_carton as carton;

/// Template AST, positions and parse errors.
pub use tessera_relief as relief;

/// Strict template parser.
pub use tessera_armature as armature;

/// Document division.
pub use tessera_atelier_sfc as atelier_sfc;

pub use tessera_atelier_sfc::{
    divide, divide_with, divide_with_options, CodeFragment, DivideError, DivideOptions,
    FragmentReport, ScriptFragments,
};
