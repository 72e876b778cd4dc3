//! # tessera_atelier_sfc
//!
//! Atelier SFC - The component document workshop for Tessera.
//!
//! Divides a Svelte component document into its script blocks, its style
//! block and the markup between them, then locates every script expression the
//! markup embeds. All positions refer to the original document.
//!
//! ## Pipeline
//!
//! 1. [`TagLocator`] finds the text of each `<script>` and the first `<style>`
//! 2. [`resolve`](resolve::resolve) places those texts in the document, refusing ambiguous ones
//! 3. [`assemble`](assemble::assemble) turns regions into [`CodeFragment`]s
//! 4. [`TemplateParser`] parses each markup fragment and
//!    [`collect_expressions`](extract::collect_expressions) walks the result
//!
//! ## Example
//!
//! ```
//! use tessera_atelier_sfc::divide;
//!
//! let report = divide("<script>export let a;</script>\n<p>{a}</p>", None).unwrap();
//! assert_eq!(report.scripts().count(), 1);
//! assert_eq!(report.html_fragments[0].fragment, "\n<p>{a}</p>");
//! assert_eq!(report.script_in_html_fragments[0].fragment, "a");
//! ```

pub mod assemble;
pub mod error;
pub mod extract;
pub mod locate;
pub mod options;
pub mod resolve;
pub mod types;

pub use error::{DivideError, RegionKind};
pub use locate::{LenientTagLocator, LocatedTags, TagLocator};
pub use options::DivideOptions;
pub use types::*;

pub use tessera_armature::{StrictTemplateParser, TemplateParser};
pub use tessera_carton::OffsetEncoding;

use std::borrow::Cow;
use tessera_carton::Bump;

use crate::assemble::{assemble, Positioner};
use crate::extract::collect_expressions;
use crate::resolve::resolve;

/// Divide a component document with the default locator and parser.
///
/// `filename` is echoed as `fileName` and appended to error messages.
pub fn divide<'s>(
    source: &'s str,
    filename: Option<&str>,
) -> Result<FragmentReport<'s>, DivideError> {
    let options = DivideOptions {
        filename: filename.map(str::to_owned),
        ..Default::default()
    };
    divide_with_options(source, &options)
}

/// Divide a component document with custom options.
pub fn divide_with_options<'s>(
    source: &'s str,
    options: &DivideOptions,
) -> Result<FragmentReport<'s>, DivideError> {
    divide_with(
        source,
        options,
        &LenientTagLocator,
        &StrictTemplateParser::default(),
    )
}

/// Divide a component document with the given locator and parser.
pub fn divide_with<'s, L, P>(
    source: &'s str,
    options: &DivideOptions,
    locator: &L,
    parser: &P,
) -> Result<FragmentReport<'s>, DivideError>
where
    L: TagLocator + ?Sized,
    P: TemplateParser + ?Sized,
{
    let filename = options.display_name();

    let tags = locator.locate(source);
    let regions = resolve(source, &tags, filename)?;

    let positioner = Positioner::new(source, options.offset_encoding);
    let assembled = assemble(source, &regions, &positioner);
    let mut report = assembled.report;

    let mut allocator = Bump::new();
    for markup in &assembled.markup {
        allocator.reset();
        let root = parser
            .parse(&allocator, markup.text)
            .map_err(|error| DivideError::markup_parse(error, markup.text, filename))?;

        let spans = collect_expressions(&root);
        tracing::trace!(
            "divide: {} expressions in markup at line {}",
            spans.len(),
            markup.start_line
        );
        report
            .script_in_html_fragments
            .extend(spans.into_iter().map(|span| {
                let span = span.remap(markup.start, markup.start_line);
                CodeFragment {
                    start_line: span.line,
                    ..positioner.fragment(source, span.start..span.end)
                }
            }));
    }

    report.file_name = filename.map(|name| Cow::Owned(name.to_owned()));

    tracing::debug!(
        "divide: {} scripts, style: {}, {} html fragments, {} embedded expressions",
        report.scripts().count(),
        report.style.is_some(),
        report.html_fragments.len(),
        report.script_in_html_fragments.len()
    );
    Ok(report)
}
