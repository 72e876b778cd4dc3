//! Divide errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_relief::CompilerError;
use thiserror::Error;

/// Kind of tagged block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionKind {
    Script,
    Style,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Script => "script",
            Self::Style => "style",
        })
    }
}

/// Errors that can occur while dividing a document
#[derive(Debug, Error)]
pub enum DivideError {
    /// A block's text does not occur exactly once, or two blocks overlap
    #[error(
        "<{kind}> block could not be located uniquely ({occurrences} matches){}",
        in_file(.filename)
    )]
    AmbiguousRegion {
        kind: RegionKind,
        occurrences: usize,
        filename: Option<String>,
    },

    /// The template parser rejected a markup fragment
    #[error("{diagnostic}\n{frame}{}", in_file(.filename))]
    MarkupParse {
        /// `message (line:column)`, relative to the fragment
        diagnostic: String,
        /// Numbered excerpt of the fragment around the error
        frame: String,
        filename: Option<String>,
        #[source]
        source: CompilerError,
    },
}

impl DivideError {
    pub(crate) fn ambiguous(kind: RegionKind, occurrences: usize, filename: Option<&str>) -> Self {
        Self::AmbiguousRegion {
            kind,
            occurrences,
            filename: filename.map(str::to_owned),
        }
    }

    pub(crate) fn markup_parse(error: CompilerError, fragment: &str, filename: Option<&str>) -> Self {
        Self::MarkupParse {
            diagnostic: error.to_string(),
            frame: error.code_frame(fragment),
            filename: filename.map(str::to_owned),
            source: error,
        }
    }

    /// Display name of the document, if one was given.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::AmbiguousRegion { filename, .. } | Self::MarkupParse { filename, .. } => {
                filename.as_deref()
            }
        }
    }
}

fn in_file(filename: &Option<String>) -> String {
    filename
        .as_deref()
        .map(|name| format!("\nin {name}"))
        .unwrap_or_default()
}
