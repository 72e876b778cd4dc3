//! Carton - The toolbox shared by every Tessera crate.
//!
//! This crate provides the foundational utilities and data structures used by the
//! fragment divider, much like a carton (artist's portfolio case) holds all the
//! essential tools an artist needs before laying a single tile.
//!
//! # Modules
//!
//! - **Allocator**: Arena-based memory allocation for template AST construction
//! - **Source positions**: line tables and offset unit conversion
//! - **Tag configuration**: HTML void tags and implicit-close rules
//!
//! # Example
//!
//! ```
//! use tessera_carton::{Box, Bump, Vec};
//!
//! let allocator = Bump::new();
//!
//! let boxed = Box::new_in(42, &allocator);
//! assert_eq!(*boxed, 42);
//!
//! let mut vec = Vec::new_in(&allocator);
//! vec.push(1);
//! vec.push(2);
//! assert_eq!(vec.len(), 2);
//! ```

pub mod dom_tag_config;
pub mod line_index;
pub mod offset;

// Re-export arena types. AST nodes borrow from a `Bump` that lives for one parse.
pub use bumpalo::boxed::Box;
pub use bumpalo::collections::Vec;
pub use bumpalo::Bump;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;
pub use compact_str::CompactString as String;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

pub use dom_tag_config::*;
pub use line_index::LineIndex;
pub use offset::{OffsetEncoding, OffsetMapper};

/// Returns true when the text contains nothing but whitespace (or nothing at all).
#[inline]
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
