//! File formats that cross between their native shape and [`FlatResource`].
//!
//! Nested formats (JSON, YAML) go through [`unflatten`]/[`flatten`]; tabular
//! and XML formats map rows or elements to flat keys directly. The bilingual
//! CSV format additionally folds plural families with
//! [`prepare_export`]/[`prepare_import`].
//!
//! [`FlatResource`]: crate::types::FlatResource
//! [`unflatten`]: crate::keypath::unflatten
//! [`flatten`]: crate::keypath::flatten
//! [`prepare_export`]: crate::plural::prepare_export
//! [`prepare_import`]: crate::plural::prepare_import

pub mod android_strings;
pub mod bilingual_csv;
pub mod csv;
pub mod flat_json;
pub mod json;
pub mod yaml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use android_strings::Format as AndroidStringsFormat;
pub use bilingual_csv::{BilingualRecord, Format as BilingualCSVFormat};
pub use csv::{CSVRecord, flat_to_records, records_to_flat};
pub use flat_json::Format as FlatJsonFormat;
pub use json::Format as JsonFormat;
pub use yaml::Format as YamlFormat;

use crate::Error;

/// Single-resource formats handled by the converter.
///
/// The bilingual CSV format carries two resources and has its own entry
/// points, so it is not listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatType {
    /// Nested JSON object.
    Json,
    /// Single-level JSON object keyed by path.
    FlatJson,
    /// Nested YAML mapping.
    Yaml,
    /// Nested YAML under a top-level language key, with optional language code.
    YamlRails(Option<String>),
    /// `key,value` rows.
    CSV,
    /// Android `strings.xml`.
    AndroidStrings,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use locsync::formats::FormatType;
/// assert_eq!(FormatType::FlatJson.to_string(), "flat-json");
/// assert_eq!(FormatType::YamlRails(None).to_string(), "yaml-rails");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Json => write!(f, "json"),
            FormatType::FlatJson => write!(f, "flat-json"),
            FormatType::Yaml => write!(f, "yaml"),
            FormatType::YamlRails(_) => write!(f, "yaml-rails"),
            FormatType::CSV => write!(f, "csv"),
            FormatType::AndroidStrings => write!(f, "android"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`FormatType`].
///
/// Case-insensitive; `-` and `_` are interchangeable. Returns
/// [`Error::UnknownFormat`] for anything else.
///
/// # Example
/// ```rust
/// use locsync::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("flat_json").unwrap(), FormatType::FlatJson);
/// assert_eq!(FormatType::from_str("yml").unwrap(), FormatType::Yaml);
/// assert!(FormatType::from_str("po").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('_', "-");
        match s.as_str() {
            "json" | "nested-json" => Ok(FormatType::Json),
            "flat-json" | "flatjson" => Ok(FormatType::FlatJson),
            "yaml" | "yml" => Ok(FormatType::Yaml),
            "yaml-rails" => Ok(FormatType::YamlRails(None)),
            "csv" => Ok(FormatType::CSV),
            "android" | "androidstrings" | "xml" => Ok(FormatType::AndroidStrings),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::FlatJson => "flat.json",
            FormatType::Yaml | FormatType::YamlRails(_) => "yaml",
            FormatType::CSV => "csv",
            FormatType::AndroidStrings => "xml",
        }
    }

    /// Returns the language code carried by this format, if any.
    pub fn language(&self) -> Option<&String> {
        match self {
            FormatType::YamlRails(lang) => lang.as_ref(),
            _ => None,
        }
    }

    /// Recreates the format type with a new language code, if applicable.
    pub fn with_language(&self, lang: Option<String>) -> Self {
        match self {
            FormatType::YamlRails(_) => FormatType::YamlRails(lang),
            other => other.clone(),
        }
    }

    /// Whether the format stores a nested tree rather than flat keys.
    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            FormatType::Json | FormatType::Yaml | FormatType::YamlRails(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(FormatType::from_str("JSON").unwrap(), FormatType::Json);
        assert_eq!(FormatType::from_str("nested_json").unwrap(), FormatType::Json);
        assert_eq!(FormatType::from_str("flatjson").unwrap(), FormatType::FlatJson);
        assert_eq!(
            FormatType::from_str(" yaml-rails ").unwrap(),
            FormatType::YamlRails(None)
        );
        assert_eq!(FormatType::from_str("xml").unwrap(), FormatType::AndroidStrings);
    }

    #[test]
    fn test_unknown_format() {
        let err = FormatType::from_str("xliff").unwrap_err();
        assert_eq!(err.to_string(), "unknown format `xliff`");
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for format in [
            FormatType::Json,
            FormatType::FlatJson,
            FormatType::Yaml,
            FormatType::YamlRails(None),
            FormatType::CSV,
            FormatType::AndroidStrings,
        ] {
            assert_eq!(FormatType::from_str(&format.to_string()).unwrap(), format);
        }
    }

    #[test]
    fn test_language_only_for_rails() {
        let rails = FormatType::YamlRails(None).with_language(Some("de".to_string()));
        assert_eq!(rails.language(), Some(&"de".to_string()));
        assert_eq!(FormatType::Json.with_language(Some("de".to_string())), FormatType::Json);
        assert_eq!(FormatType::Json.language(), None);
    }

    #[test]
    fn test_is_nested() {
        assert!(FormatType::Json.is_nested());
        assert!(FormatType::YamlRails(None).is_nested());
        assert!(!FormatType::FlatJson.is_nested());
        assert!(!FormatType::CSV.is_nested());
    }
}
