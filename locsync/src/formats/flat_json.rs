//! Single-level JSON objects keyed by path.
//!
//! Values are strings or `{ "value", "context": { "text" } }` records;
//! numbers and booleans are read as text.

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::{
    error::Error,
    traits::{Parser, read_expecting},
    types::{FlatResource, FlatValue},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub entries: FlatResource,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let text = read_expecting(reader, &['{'])?;
        let object: serde_json::Map<String, Value> = serde_json::from_str(&text)?;

        let mut entries = FlatResource::with_capacity(object.len());
        for (key, value) in object {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => FlatValue::Text(s),
                Value::Number(n) => FlatValue::Text(n.to_string()),
                Value::Bool(b) => FlatValue::Text(b.to_string()),
                Value::Object(_) => serde_json::from_value(value).map_err(|_| {
                    Error::DataMismatch(format!(
                        "`{}` holds an object; flat JSON values must be strings or {{\"value\", \"context\"}} records",
                        key
                    ))
                })?,
                Value::Array(_) => {
                    return Err(Error::DataMismatch(format!(
                        "`{}` holds an array; flat JSON values must be strings",
                        key
                    )));
                }
            };
            entries.insert(key, value);
        }
        Ok(Format { entries })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl From<FlatResource> for Format {
    fn from(entries: FlatResource) -> Self {
        Format { entries }
    }
}

impl From<Format> for FlatResource {
    fn from(format: Format) -> Self {
        format.entries
    }
}
