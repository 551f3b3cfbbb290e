//! Nested JSON resources, the shape translation files are usually kept in.

use std::io::{BufRead, Write};

use crate::{
    error::Error,
    keypath::{flatten, unflatten},
    traits::{Parser, read_expecting},
    types::{FlatResource, Node},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub root: Node,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let text = read_expecting(reader, &['{'])?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(Format {
            root: Node::from(value),
        })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut writer, &self.root)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl Format {
    /// Rebuilds the nested tree from flat keys.
    pub fn from_flat(flat: &FlatResource, preserve_literal_dots: bool) -> Self {
        Format {
            root: unflatten(flat, preserve_literal_dots),
        }
    }

    pub fn to_flat(&self) -> Result<FlatResource, Error> {
        flatten(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlatValue;

    #[test]
    fn test_parse_nested_json() {
        let format = Format::from_str(r#"{"nav": {"home": "Home", "items": ["A", "B"]}}"#).unwrap();
        let flat = format.to_flat().unwrap();
        assert_eq!(flat["nav.home"].text(), "Home");
        assert_eq!(flat["nav.items.1"].text(), "B");
    }

    #[test]
    fn test_leading_bom_and_whitespace_accepted() {
        let format = Format::from_str("\u{feff}\n  {\"a\": \"b\"}").unwrap();
        assert_eq!(format.to_flat().unwrap()["a"].text(), "b");
    }

    #[test]
    fn test_wrong_leading_character() {
        let err = Format::from_str("[\"a\"]").unwrap_err();
        match err {
            Error::FormatMismatch { expected, found } => {
                assert_eq!(expected, "{");
                assert_eq!(found, "[");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_is_mismatch() {
        assert!(matches!(
            Format::from_str("   "),
            Err(Error::FormatMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Format::from_str("{\"a\": }"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_write_from_flat() {
        let mut flat = FlatResource::new();
        flat.insert("a.b".to_string(), FlatValue::from("x"));
        flat.insert("list.0".to_string(), FlatValue::from("y"));
        let text = Format::from_flat(&flat, false).write_to_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"a": {"b": "x"}, "list": ["y"]}));
        assert!(text.ends_with('\n'));
    }
}
