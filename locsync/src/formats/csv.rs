//! Support for `key,value[,context]` CSV rows.
//!
//! No header row. A third column, when present and non-empty, becomes the
//! value's translator note.
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    traits::Parser,
    types::{FlatResource, FlatValue},
};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CSVRecord {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Parser for Vec<CSVRecord> {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let key = row.get(0).unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            records.push(CSVRecord {
                key: key.to_string(),
                value: row.get(1).unwrap_or_default().to_string(),
                context: row.get(2).filter(|c| !c.is_empty()).map(str::to_string),
            });
        }
        Ok(records)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        for record in self {
            match &record.context {
                Some(context) => wtr.write_record([&record.key, &record.value, context])?,
                None => wtr.write_record([&record.key, &record.value])?,
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Collects rows into flat entries; a repeated key keeps its last row.
pub fn records_to_flat(records: Vec<CSVRecord>) -> FlatResource {
    records
        .into_iter()
        .map(|record| {
            (
                record.key,
                FlatValue::with_context(record.value, record.context),
            )
        })
        .collect()
}

pub fn flat_to_records(flat: &FlatResource) -> Vec<CSVRecord> {
    flat.iter()
        .map(|(key, value)| CSVRecord {
            key: key.clone(),
            value: value.text().to_string(),
            context: value.context().map(str::to_string),
        })
        .collect()
}
