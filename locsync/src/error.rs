//! All error types for the locsync crate.
//!
//! These are returned from the fallible operations (decoding, encoding, plural
//! block expansion, file conversion). Ambiguous key shapes during
//! [`unflatten`](crate::keypath::unflatten) are never errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("format mismatch: expected `{expected}` but found `{found}`")]
    FormatMismatch { expected: String, found: String },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("conversion error: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid combined subkey block `{key}`: {source}")]
    CombinedSubkey {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Creates a new conversion error with optional source error
    pub fn conversion_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Conversion {
            message: message.into(),
            source,
        }
    }

    /// Creates a format mismatch error from the expected and found leading tokens.
    pub fn format_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::FormatMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Wraps a failure to decode the combined block stored under `key`.
    pub fn combined_subkey(
        key: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::CombinedSubkey {
            key: key.into(),
            source: source.into(),
        }
    }
}
