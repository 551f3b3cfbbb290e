//! Support for Android `strings.xml` resources.
//!
//! `<string>` elements map to one flat key each. `<plurals>` map to
//! i18next-style `{name}_{quantity}` keys, and a run of such keys with an
//! `_other` member is written back as one `<plurals>` element. A comment
//! directly above an element is the translator note of its value(s).

use std::{
    collections::HashSet,
    io::{BufRead, Write},
};

use indexmap::IndexMap;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tracing::debug;

use crate::{
    error::Error,
    plural::PLURAL_FORMS,
    traits::Parser,
    types::{FlatResource, FlatValue},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    String(StringResource),
    Plurals(PluralsResource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringResource {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    pub translatable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralsResource {
    pub name: String,
    /// `(quantity, value)` in document order.
    pub items: Vec<(String, String)>,
    pub comment: Option<String>,
}

impl Parser for Format {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut elements = Vec::new();
        let mut pending_comment: Option<String> = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Comment(ref e)) => {
                    let text = String::from_utf8_lossy(e).trim().to_string();
                    pending_comment = (!text.is_empty()).then_some(text);
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"string" => {
                    let (name, translatable) = parse_attributes(e, b"translatable")?;
                    let value = read_text(&mut xml_reader, b"string")?;
                    elements.push(Element::String(StringResource {
                        name,
                        value,
                        comment: pending_comment.take(),
                        translatable: translatable.map(|v| v == "true"),
                    }));
                }
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"string" => {
                    let (name, translatable) = parse_attributes(e, b"translatable")?;
                    elements.push(Element::String(StringResource {
                        name,
                        value: String::new(),
                        comment: pending_comment.take(),
                        translatable: translatable.map(|v| v == "true"),
                    }));
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"plurals" => {
                    let (name, _) = parse_attributes(e, b"")?;
                    let items = read_plural_items(&mut xml_reader)?;
                    elements.push(Element::Plurals(PluralsResource {
                        name,
                        items,
                        comment: pending_comment.take(),
                    }));
                }
                Ok(Event::Start(_)) | Ok(Event::Empty(_)) => pending_comment = None,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }
        Ok(Format { elements })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 4);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Start(BytesStart::new("resources")))?;

        for element in &self.elements {
            match element {
                Element::String(sr) => {
                    write_comment(&mut xml_writer, sr.comment.as_deref())?;
                    let mut elem = BytesStart::new("string");
                    elem.push_attribute(("name", sr.name.as_str()));
                    if let Some(trans) = sr.translatable {
                        elem.push_attribute(("translatable", if trans { "true" } else { "false" }));
                    }
                    xml_writer.write_event(Event::Start(elem))?;
                    let escaped = escape_android(&sr.value);
                    xml_writer.write_event(Event::Text(BytesText::new(&escaped)))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("string")))?;
                }
                Element::Plurals(pr) => {
                    write_comment(&mut xml_writer, pr.comment.as_deref())?;
                    let mut elem = BytesStart::new("plurals");
                    elem.push_attribute(("name", pr.name.as_str()));
                    xml_writer.write_event(Event::Start(elem))?;
                    for (quantity, value) in &pr.items {
                        let mut item = BytesStart::new("item");
                        item.push_attribute(("quantity", quantity.as_str()));
                        xml_writer.write_event(Event::Start(item))?;
                        let escaped = escape_android(value);
                        xml_writer.write_event(Event::Text(BytesText::new(&escaped)))?;
                        xml_writer.write_event(Event::End(BytesEnd::new("item")))?;
                    }
                    xml_writer.write_event(Event::End(BytesEnd::new("plurals")))?;
                }
            }
        }

        xml_writer.write_event(Event::End(BytesEnd::new("resources")))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl From<&Format> for FlatResource {
    fn from(format: &Format) -> Self {
        let mut flat = FlatResource::new();
        for element in &format.elements {
            match element {
                Element::String(sr) => {
                    if sr.translatable == Some(false) {
                        debug!(name = %sr.name, "skipping non-translatable string");
                        continue;
                    }
                    flat.insert(
                        sr.name.clone(),
                        FlatValue::with_context(sr.value.clone(), sr.comment.clone()),
                    );
                }
                Element::Plurals(pr) => {
                    for (quantity, value) in &pr.items {
                        flat.insert(
                            format!("{}_{}", pr.name, quantity),
                            FlatValue::with_context(value.clone(), pr.comment.clone()),
                        );
                    }
                }
            }
        }
        flat
    }
}

impl From<&FlatResource> for Format {
    fn from(flat: &FlatResource) -> Self {
        // Bases of complete plural families, keyed by base with members in
        // key order.
        let mut families: IndexMap<&str, Vec<(&str, &FlatValue)>> = IndexMap::new();
        for (key, value) in flat {
            if let Some((base, quantity)) = split_quantity(key) {
                if flat.contains_key(&format!("{}_other", base)) {
                    families.entry(base).or_default().push((quantity, value));
                }
            }
        }

        let mut emitted: HashSet<&str> = HashSet::new();
        let mut elements = Vec::with_capacity(flat.len());
        for (key, value) in flat {
            match split_quantity(key).and_then(|(base, _)| families.get_key_value(base)) {
                Some((&base, members)) => {
                    // Emitted once, at the first member.
                    if emitted.insert(base) {
                        let comment = members.iter().find_map(|(_, v)| v.context().map(str::to_string));
                        elements.push(Element::Plurals(PluralsResource {
                            name: base.to_string(),
                            items: members
                                .iter()
                                .map(|(q, v)| (q.to_string(), v.text().to_string()))
                                .collect(),
                            comment,
                        }));
                    }
                }
                None => elements.push(Element::String(StringResource {
                    name: key.clone(),
                    value: value.text().to_string(),
                    comment: value.context().map(str::to_string),
                    translatable: None,
                })),
            }
        }
        Format { elements }
    }
}

fn split_quantity(key: &str) -> Option<(&str, &str)> {
    let (base, quantity) = key.rsplit_once('_')?;
    (!base.is_empty() && PLURAL_FORMS.contains(&quantity)).then_some((base, quantity))
}

/// Returns the `name` attribute and the value of `extra`, if present.
fn parse_attributes(e: &BytesStart, extra: &[u8]) -> Result<(String, Option<String>), Error> {
    let mut name = None;
    let mut extra_value = None;

    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.to_string()),
            key if !extra.is_empty() && key == extra => {
                extra_value = Some(attr.unescape_value()?.to_string())
            }
            _ => {}
        }
    }
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let name = name.ok_or_else(|| Error::InvalidResource(format!("{} tag missing 'name'", tag)))?;
    Ok((name, extra_value))
}

/// Reads the text content up to the closing `end` tag. Text inside nested
/// markup is kept, the tags themselves are dropped.
fn read_text<R: BufRead>(xml_reader: &mut Reader<R>, end: &[u8]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut value = String::new();
    let mut depth = 0usize;
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => value.push_str(&e.unescape().map_err(Error::XmlParse)?),
            Ok(Event::CData(e)) => value.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(e)) if depth == 0 && e.name().as_ref() == end => break,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => return Err(Error::InvalidResource("Unexpected EOF".to_string())),
            Ok(_) => (),
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(unescape_android(&value))
}

fn read_plural_items<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<Vec<(String, String)>, Error> {
    let mut buf = Vec::new();
    let mut items = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"item" => {
                let quantity = quantity_attribute(e)?;
                items.push((quantity, read_text(xml_reader, b"item")?));
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"item" => {
                items.push((quantity_attribute(e)?, String::new()));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"plurals" => break,
            Ok(Event::Eof) => return Err(Error::InvalidResource("Unexpected EOF".to_string())),
            Ok(_) => (),
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(items)
}

fn quantity_attribute(e: &BytesStart) -> Result<String, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        if attr.key.as_ref() == b"quantity" {
            let quantity = attr.unescape_value()?.to_string();
            if !PLURAL_FORMS.contains(&quantity.as_str()) {
                return Err(Error::InvalidResource(format!(
                    "unknown plural quantity '{}'",
                    quantity
                )));
            }
            return Ok(quantity);
        }
    }
    Err(Error::InvalidResource("item tag missing 'quantity'".to_string()))
}

fn write_comment<W: Write>(xml_writer: &mut Writer<W>, comment: Option<&str>) -> Result<(), Error> {
    if let Some(comment) = comment {
        // `--` may not appear inside an XML comment.
        let text = format!(" {} ", comment.replace("--", "- -"));
        xml_writer.write_event(Event::Comment(BytesText::from_escaped(text)))?;
    }
    Ok(())
}

/// Android string escapes on top of XML escaping.
fn escape_android(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_android(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Parser;

    #[test]
    fn test_parse_basic_strings_xml() {
        let xml = r#"
        <resources>
            <string name="hello">Hello</string>
            <string name="bye" translatable="false">Goodbye</string>
            <string name="empty"></string>
        </resources>
        "#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.elements.len(), 3);
        let Element::String(bye) = &format.elements[1] else {
            panic!("expected string element");
        };
        assert_eq!(bye.name, "bye");
        assert_eq!(bye.value, "Goodbye");
        assert_eq!(bye.translatable, Some(false));

        let flat = FlatResource::from(&format);
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["hello", "empty"]);
    }

    #[test]
    fn test_plurals_become_suffixed_keys() {
        let xml = r#"
        <resources>
            <string name="hello">Hello</string>
            <!-- Shown in the basket -->
            <plurals name="apples">
                <item quantity="one">One apple</item>
                <item quantity="other">%d apples</item>
            </plurals>
        </resources>
        "#;
        let flat = FlatResource::from(&Format::from_str(xml).unwrap());
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["hello", "apples_one", "apples_other"]);
        assert_eq!(flat["apples_other"].text(), "%d apples");
        assert_eq!(flat["apples_one"].context(), Some("Shown in the basket"));
        assert_eq!(flat["hello"].context(), None);
    }

    #[test]
    fn test_comment_attaches_to_next_element_only() {
        let xml = r#"
        <resources>
            <!-- Greeting on the home screen -->
            <string name="hello">Hello</string>
            <string name="bye">Bye</string>
        </resources>
        "#;
        let flat = FlatResource::from(&Format::from_str(xml).unwrap());
        assert_eq!(flat["hello"].context(), Some("Greeting on the home screen"));
        assert_eq!(flat["bye"].context(), None);
    }

    #[test]
    fn test_missing_name_attribute() {
        let xml = r#"
        <resources>
            <string>No name attr</string>
        </resources>
        "#;
        let err = Format::from_str(xml).unwrap_err();
        assert!(err.to_string().contains("missing 'name'"));
    }

    #[test]
    fn test_unknown_quantity_rejected() {
        let xml = r#"<resources><plurals name="x"><item quantity="lots">a</item></plurals></resources>"#;
        assert!(matches!(Format::from_str(xml), Err(Error::InvalidResource(_))));
    }

    #[test]
    fn test_android_escapes() {
        let xml = r#"<resources><string name="a">Don\'t say \"hi\"\nagain</string></resources>"#;
        let flat = FlatResource::from(&Format::from_str(xml).unwrap());
        assert_eq!(flat["a"].text(), "Don't say \"hi\"\nagain");
        assert_eq!(escape_android("Don't\n"), "Don\\'t\\n");
    }

    #[test]
    fn test_flat_to_plurals_requires_other() {
        let mut flat = FlatResource::new();
        flat.insert("title".to_string(), FlatValue::from("Title"));
        flat.insert("item_one".to_string(), FlatValue::from("{{count}} item"));
        flat.insert("item_other".to_string(), FlatValue::from("{{count}} items"));
        flat.insert("button_one".to_string(), FlatValue::from("First"));
        let format = Format::from(&flat);
        assert_eq!(format.elements.len(), 3);
        let Element::Plurals(plurals) = &format.elements[1] else {
            panic!("expected plurals element");
        };
        assert_eq!(plurals.name, "item");
        assert_eq!(plurals.items.len(), 2);
        assert!(matches!(&format.elements[2], Element::String(s) if s.name == "button_one"));
    }

    #[test]
    fn test_plural_family_written_once() {
        let mut flat = FlatResource::new();
        flat.insert("item_one".to_string(), FlatValue::from("one"));
        flat.insert("item_other".to_string(), FlatValue::from("many"));
        let format = Format::from(&flat);
        assert_eq!(format.elements.len(), 1);
        let text = format.write_to_string().unwrap();
        assert_eq!(text.matches("<plurals name=\"item\">").count(), 1);
        assert!(!text.contains("<string"));
    }

    #[test]
    fn test_round_trip_through_flat() {
        let mut flat = FlatResource::new();
        flat.insert(
            "greet".to_string(),
            FlatValue::with_context("It's <fine> & good", Some("home -- top".to_string())),
        );
        flat.insert("car_one".to_string(), FlatValue::from("car"));
        flat.insert("car_other".to_string(), FlatValue::from("cars"));
        let text = Format::from(&flat).write_to_string().unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<!-- home - - top -->"));

        let back = FlatResource::from(&Format::from_str(&text).unwrap());
        assert_eq!(back["greet"].text(), "It's <fine> & good");
        assert_eq!(back["greet"].context(), Some("home - - top"));
        assert_eq!(back["car_one"].text(), "car");
        assert_eq!(back["car_other"].text(), "cars");
    }
}
