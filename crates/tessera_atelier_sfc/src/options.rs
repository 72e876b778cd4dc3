//! Divide options.

use serde::{Deserialize, Serialize};
use tessera_carton::OffsetEncoding;

/// Options for dividing a component document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivideOptions {
    /// Display name, echoed in the report and in errors (empty means none)
    #[serde(default)]
    pub filename: Option<String>,

    /// Unit of `startChar`/`endChar` (default: utf8)
    #[serde(default)]
    pub offset_encoding: OffsetEncoding,
}

impl DivideOptions {
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_offset_encoding(mut self, encoding: OffsetEncoding) -> Self {
        self.offset_encoding = encoding;
        self
    }

    /// The display name, if one was given and is not empty.
    pub fn display_name(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options: DivideOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DivideOptions::default());
        assert_eq!(options.offset_encoding, OffsetEncoding::Utf8);
    }

    #[test]
    fn test_camel_case_keys() {
        let options: DivideOptions =
            serde_json::from_str(r#"{"filename":"App.svelte","offsetEncoding":"utf16"}"#).unwrap();
        assert_eq!(options.display_name(), Some("App.svelte"));
        assert_eq!(options.offset_encoding, OffsetEncoding::Utf16);
    }

    #[test]
    fn test_empty_filename_is_no_name() {
        let options = DivideOptions::default().with_filename("");
        assert_eq!(options.display_name(), None);
    }
}
