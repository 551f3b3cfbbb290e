//! Nested YAML resources, plain or Rails-style (one top-level language key).

use std::io::{BufRead, Write};

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::{
    error::Error,
    keypath::{flatten, unflatten},
    traits::Parser,
    types::{FlatResource, Node},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub root: Node,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Ok(Format { root: Node::map() });
        }
        let value: Value = serde_yaml::from_str(text)?;
        Ok(Format {
            root: node_from_yaml(value)?,
        })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_yaml::to_writer(&mut writer, &self.root)?;
        writer.flush()?;
        Ok(())
    }
}

impl Format {
    pub fn from_flat(flat: &FlatResource, preserve_literal_dots: bool) -> Self {
        Format {
            root: unflatten(flat, preserve_literal_dots),
        }
    }

    pub fn to_flat(&self) -> Result<FlatResource, Error> {
        flatten(&self.root)
    }

    /// Splits a Rails-style document into its language code and the tree
    /// under it.
    pub fn split_language(self) -> Result<(String, Node), Error> {
        match self.root {
            Node::Map(mut map) if map.len() == 1 => match map.pop() {
                Some((language, tree @ (Node::Map(_) | Node::Seq(_)))) => Ok((language, tree)),
                _ => Err(Error::InvalidResource(
                    "Rails-style YAML must nest translations under the language key".to_string(),
                )),
            },
            _ => Err(Error::InvalidResource(
                "Rails-style YAML must have exactly one top-level language key".to_string(),
            )),
        }
    }

    /// Nests the tree under `language`, Rails style.
    pub fn with_language(self, language: &str) -> Self {
        let mut map = IndexMap::new();
        map.insert(language.to_string(), self.root);
        Format {
            root: Node::Map(map),
        }
    }
}

fn node_from_yaml(value: Value) -> Result<Node, Error> {
    Ok(match value {
        Value::Null => Node::Empty,
        Value::Bool(b) => Node::leaf(b.to_string()),
        Value::Number(n) => Node::leaf(n.to_string()),
        Value::String(s) => Node::leaf(s),
        Value::Sequence(items) => Node::Seq(
            items
                .into_iter()
                .map(node_from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(mapping) => {
            // Annotated leaves share the JSON shape.
            if mapping.contains_key("value") {
                if let Ok(json) = serde_json::to_value(&mapping) {
                    if let leaf @ Node::Leaf(_) = Node::from(json) {
                        return Ok(leaf);
                    }
                }
            }
            let mut map = IndexMap::with_capacity(mapping.len());
            for (key, child) in mapping {
                let key = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(Error::DataMismatch(format!(
                            "unsupported YAML mapping key: {:?}",
                            other
                        )));
                    }
                };
                map.insert(key, node_from_yaml(child)?);
            }
            Node::Map(map)
        }
        Value::Tagged(tagged) => node_from_yaml(tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_nested_yaml() {
        let yaml = indoc! {"
            nav:
              home: Home
              items:
                - First
                - Second
            count: 3
            enabled: true
        "};
        let flat = Format::from_str(yaml).unwrap().to_flat().unwrap();
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nav.home", "nav.items.0", "nav.items.1", "count", "enabled"]);
        assert_eq!(flat["count"].text(), "3");
        assert_eq!(flat["enabled"].text(), "true");
    }

    #[test]
    fn test_numeric_mapping_keys_become_text() {
        let yaml = indoc! {"
            codes:
              1: one
              true: yes
        "};
        let flat = Format::from_str(yaml).unwrap().to_flat().unwrap();
        assert_eq!(flat["codes.1"].text(), "one");
        assert_eq!(flat["codes.true"].text(), "yes");
    }

    #[test]
    fn test_annotated_leaf() {
        let yaml = indoc! {"
            title:
              value: Welcome
              context:
                text: page header
        "};
        let flat = Format::from_str(yaml).unwrap().to_flat().unwrap();
        assert_eq!(flat["title"].text(), "Welcome");
        assert_eq!(flat["title"].context(), Some("page header"));
    }

    #[test]
    fn test_mapping_with_value_key_and_siblings_stays_map() {
        let yaml = indoc! {"
            price:
              value: Price
              currency: EUR
        "};
        let flat = Format::from_str(yaml).unwrap().to_flat().unwrap();
        assert_eq!(flat["price.value"].text(), "Price");
        assert_eq!(flat["price.currency"].text(), "EUR");
    }

    #[test]
    fn test_empty_document() {
        let format = Format::from_str("\n").unwrap();
        assert!(format.to_flat().unwrap().is_empty());
    }

    #[test]
    fn test_write_nested() {
        let mut flat = FlatResource::new();
        flat.insert("a.b".to_string(), "x".into());
        flat.insert("list.0".to_string(), "y".into());
        let text = Format::from_flat(&flat, false).write_to_string().unwrap();
        let back: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back["a"]["b"], Value::String("x".to_string()));
        assert_eq!(back["list"][0], Value::String("y".to_string()));
    }

    #[test]
    fn test_rails_language_roundtrip() {
        let yaml = indoc! {"
            de:
              greeting: Hallo
        "};
        let (language, tree) = Format::from_str(yaml).unwrap().split_language().unwrap();
        assert_eq!(language, "de");
        assert_eq!(tree.pointer("greeting").and_then(Node::as_leaf).unwrap().text(), "Hallo");

        let wrapped = Format { root: tree }.with_language("fr");
        assert!(wrapped.root.pointer("fr.greeting").is_some());
    }

    #[test]
    fn test_rails_requires_single_language_key() {
        let format = Format::from_str("de:\n  a: b\nfr:\n  a: c\n").unwrap();
        assert!(matches!(format.split_language(), Err(Error::InvalidResource(_))));
        let format = Format::from_str("de: flat\n").unwrap();
        assert!(matches!(format.split_language(), Err(Error::InvalidResource(_))));
    }
}
