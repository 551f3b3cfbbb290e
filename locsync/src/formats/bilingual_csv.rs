//! Two-language CSV sheets handed to translators.
//!
//! The header row is `key,<reference language>,<target language>`. Notes
//! travel in a `context` column for the reference side and a
//! `target_context` column for the target side, each present only when some
//! value on that side carries one. Plural families
//! whose keys differ between the languages travel as one combined row per
//! side (see [`prepare_export`]).

use std::io::{BufRead, Write};

use tracing::debug;

use crate::{
    error::Error,
    plural::{ExportPair, prepare_export, prepare_import},
    traits::Parser,
    types::{FlatResource, FlatValue},
};

const CONTEXT_HEADER: &str = "context";
const TARGET_CONTEXT_HEADER: &str = "target_context";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilingualRecord {
    pub key: String,
    pub reference: String,
    pub target: String,
    pub context: Option<String>,
    pub target_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub reference_language: String,
    pub target_language: String,
    pub records: Vec<BilingualRecord>,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.len() < 3 || headers.get(0) != Some("key") {
            return Err(Error::InvalidResource(format!(
                "bilingual CSV header must be `key,<reference>,<target>`, found `{}`",
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }
        let reference_language = headers.get(1).unwrap_or_default().to_string();
        let target_language = headers.get(2).unwrap_or_default().to_string();
        let column = |name: &str| headers.iter().skip(3).position(|h| h == name).map(|i| i + 3);
        let context_column = column(CONTEXT_HEADER);
        let target_context_column = column(TARGET_CONTEXT_HEADER);

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let key = row.get(0).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            records.push(BilingualRecord {
                key: key.to_string(),
                reference: row.get(1).unwrap_or_default().to_string(),
                target: row.get(2).unwrap_or_default().to_string(),
                context: note(&row, context_column),
                target_context: note(&row, target_context_column),
            });
        }
        Ok(Format {
            reference_language,
            target_language,
            records,
        })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let has_context = self.records.iter().any(|r| r.context.is_some());
        let has_target_context = self.records.iter().any(|r| r.target_context.is_some());
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);

        let mut header = vec![
            "key",
            self.reference_language.as_str(),
            self.target_language.as_str(),
        ];
        if has_context {
            header.push(CONTEXT_HEADER);
        }
        if has_target_context {
            header.push(TARGET_CONTEXT_HEADER);
        }
        wtr.write_record(&header)?;

        for record in &self.records {
            let mut row = vec![
                record.key.as_str(),
                record.reference.as_str(),
                record.target.as_str(),
            ];
            if has_context {
                row.push(record.context.as_deref().unwrap_or_default());
            }
            if has_target_context {
                row.push(record.target_context.as_deref().unwrap_or_default());
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Format {
    /// Builds the sheet from both resources, folding mismatched plural
    /// families first.
    ///
    /// Rows follow the reference order; keys only the target has come last.
    pub fn export(
        reference: &FlatResource,
        target: &FlatResource,
        reference_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Result<Self, Error> {
        let ExportPair { reference, target } = prepare_export(reference, target)?;

        let mut records = Vec::with_capacity(reference.len());
        for (key, value) in &reference {
            let other = target.get(key);
            records.push(BilingualRecord {
                key: key.clone(),
                reference: value.text().to_string(),
                target: other.map(|v| v.text().to_string()).unwrap_or_default(),
                context: value.context().map(str::to_string),
                target_context: other.and_then(FlatValue::context).map(str::to_string),
            });
        }
        for (key, value) in target.iter().filter(|(k, _)| !reference.contains_key(*k)) {
            records.push(BilingualRecord {
                key: key.clone(),
                reference: String::new(),
                target: value.text().to_string(),
                context: None,
                target_context: value.context().map(str::to_string),
            });
        }
        debug!(rows = records.len(), "bilingual sheet built");

        Ok(Format {
            reference_language: reference_language.into(),
            target_language: target_language.into(),
            records,
        })
    }

    /// Splits the sheet back into both resources and expands combined
    /// blocks. Empty cells produce no key on that side, and each side only
    /// receives its own notes.
    pub fn import(&self) -> Result<ExportPair, Error> {
        type Pick = fn(&BilingualRecord) -> (&str, Option<&String>);
        let side = |pick: Pick| -> FlatResource {
            self.records
                .iter()
                .map(|r| (r, pick(r)))
                .filter(|(_, (text, _))| !text.is_empty())
                .map(|(r, (text, note))| (r.key.clone(), FlatValue::with_context(text, note.cloned())))
                .collect()
        };
        Ok(ExportPair {
            reference: prepare_import(&side(|r| (r.reference.as_str(), r.context.as_ref())))?,
            target: prepare_import(&side(|r| (r.target.as_str(), r.target_context.as_ref())))?,
        })
    }
}

fn note(row: &csv::StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|i| row.get(i))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
