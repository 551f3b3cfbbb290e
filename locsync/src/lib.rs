#![forbid(unsafe_code)]
//! Flat key-path codec and plural-family merging for translation files.
//!
//! Translation files come nested (`{"menu": {"open": "Open"}}`) or flat
//! (`{"menu.open": "Open"}`). locsync converts between the two, guessing
//! arrays from numeric path segments, folds plural families that differ
//! between two languages into one combined entry for bilingual exchange
//! formats, and reads and writes the common file formats through a single
//! [`FlatResource`] model.
//!
//! # Quick Start
//!
//! ```rust
//! use locsync::{flatten, unflatten, types::Node};
//!
//! let nested = Node::from(serde_json::json!({ "menu": { "items": ["Open", "Close"] } }));
//! let flat = flatten(&nested)?;
//! assert_eq!(flat["menu.items.0"].text(), "Open");
//! assert_eq!(unflatten(&flat, false), nested);
//! # Ok::<(), locsync::Error>(())
//! ```
//!
//! # Supported Formats
//!
//! - **Nested JSON** and **flat JSON** (`*.flat.json`)
//! - **YAML**, plain or Rails-style with a language root
//! - **CSV**: `key,value[,context]` rows
//! - **Bilingual CSV**: `key,<reference>,<target>` sheets with combined plural rows
//! - **Android `strings.xml`**, `<plurals>` included

pub mod converter;
pub mod error;
pub mod formats;
pub mod keypath;
pub mod options;
pub mod plural;
pub mod sort;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    converter::{
        convert, convert_auto, infer_format_from_extension, read_flat_file, write_flat_file,
        write_flat_to_writer,
    },
    error::Error,
    formats::FormatType,
    keypath::{flatten, unflatten},
    options::WriteOptions,
    plural::{ExportPair, prepare_export, prepare_import},
    sort::sort_flat_resources,
    types::{FlatResource, FlatValue, Node},
};
