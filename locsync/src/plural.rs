//! Combined plural subkeys.
//!
//! Formats such as bilingual CSV or XLIFF pair every reference key with a
//! target key. Plural families rarely line up across languages (English has
//! `one`/`other`, Polish adds `few`/`many`), so before export each family that
//! is missing on one side is folded into a single YAML block stored under
//! `{baseKey}__#locize.com/combinedSubkey`, and on import the block is split
//! back into `{baseKey}_{suffix}` keys.
//!
//! The block is plain `serde_yaml` output with every top-level key rewritten
//! from `key: ` to `{key}: `:
//!
//! ```text
//! {one}: One item
//! {other}: '{{count}} items'
//! ```

use std::cmp::Ordering;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_yaml::Value;
use tracing::debug;

use crate::{
    error::Error,
    types::{FlatResource, FlatValue},
};

/// Suffix appended to the base key of a combined block.
pub const COMBINED_SUBKEY_MARKER: &str = "__#locize.com/combinedSubkey";

/// Block entry holding the bare base key's value (the i18next v3 singular).
const DEFAULT_FORM_SUBKEY: &str = "__";

/// CLDR plural categories.
pub const PLURAL_FORMS: [&str; 6] = ["zero", "one", "two", "few", "many", "other"];

lazy_static! {
    static ref NUMERIC_SUFFIX_REGEX: Regex = Regex::new(r"_\d+$").unwrap();
    static ref BRACED_KEY_REGEX: Regex = Regex::new(r"(?m)^\{(.+?)\}:( |$)").unwrap();
}

/// How plural suffixes are attached to their base key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `key_one`, `key_other`, `key_plural`
    I18next,
    /// `key.one`, `key.other`
    I18njs,
}

impl Dialect {
    pub fn delimiter(self) -> char {
        match self {
            Dialect::I18next => '_',
            Dialect::I18njs => '.',
        }
    }
}

/// Reference and target resources after [`prepare_export`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPair {
    pub reference: FlatResource,
    pub target: FlatResource,
}

/// Whether `key` ends in a plural suffix: a CLDR category after `.` or `_`,
/// `_plural`, or `_` followed by digits.
pub fn ends_with_plural_form(key: &str) -> bool {
    PLURAL_FORMS.iter().any(|form| {
        key.strip_suffix(form)
            .is_some_and(|rest| rest.ends_with('.') || rest.ends_with('_'))
    }) || NUMERIC_SUFFIX_REGEX.is_match(key)
        || key.ends_with("_plural")
}

/// Majority vote between `_` and `.` found past the first character.
/// A tie decides nothing.
pub fn detect_dialect<'a>(keys: impl IntoIterator<Item = &'a str>) -> Option<Dialect> {
    let mut underscores = 0usize;
    let mut dots = 0usize;
    for key in keys {
        if key.find('_').is_some_and(|i| i > 0) {
            underscores += 1;
        }
        if key.find('.').is_some_and(|i| i > 0) {
            dots += 1;
        }
    }
    match underscores.cmp(&dots) {
        Ordering::Greater => Some(Dialect::I18next),
        Ordering::Less => Some(Dialect::I18njs),
        Ordering::Equal => None,
    }
}

/// Everything before the last delimiter; empty when there is none.
fn base_key(key: &str, delimiter: char) -> &str {
    key.rfind(delimiter).map_or("", |i| &key[..i])
}

fn family_members<'a>(side: &'a FlatResource, base: &str, delimiter: char) -> Vec<&'a String> {
    let prefix = format!("{}{}", base, delimiter);
    side.keys().filter(|k| k.starts_with(&prefix)).collect()
}

/// Members of a family, counting the bare base key when an i18next `_plural`
/// sibling will fold it into the block.
fn family_size(side: &FlatResource, base: &str, dialect: Dialect) -> usize {
    let delimiter = dialect.delimiter();
    let members = family_members(side, base, delimiter);
    let folds_default = dialect == Dialect::I18next
        && members.iter().any(|k| &k[base.len() + 1..] == "plural")
        && side.get(base).is_some_and(|v| !v.is_empty());
    members.len() + usize::from(folds_default)
}

/// Folds plural families that do not line up between `reference` and
/// `target` into combined blocks, on both sides.
///
/// Returns both inputs unchanged when no mismatched plural key exists or the
/// dialect vote is a tie. A family with fewer than two members on both sides
/// is left alone.
pub fn prepare_export(reference: &FlatResource, target: &FlatResource) -> Result<ExportPair, Error> {
    let unchanged = || ExportPair {
        reference: reference.clone(),
        target: target.clone(),
    };

    let mismatched: Vec<&str> = mismatched_plural_keys(reference, target)
        .chain(mismatched_plural_keys(target, reference))
        .collect();
    if mismatched.is_empty() {
        return Ok(unchanged());
    }

    let Some(dialect) = detect_dialect(mismatched.iter().copied()) else {
        debug!(keys = mismatched.len(), "plural dialect vote tied, nothing merged");
        return Ok(unchanged());
    };
    let delimiter = dialect.delimiter();

    let mut base_keys: Vec<&str> = Vec::new();
    for key in &mismatched {
        let base = base_key(key, delimiter);
        if !base_keys.contains(&base) {
            base_keys.push(base);
        }
    }
    base_keys.retain(|base| {
        let keep = family_size(reference, base, dialect) >= 2 || family_size(target, base, dialect) >= 2;
        if !keep {
            debug!(base_key = *base, "single plural key is not a family, left as is");
        }
        keep
    });
    debug!(?dialect, families = base_keys.len(), "combining plural families");

    Ok(ExportPair {
        reference: combine_families(reference, &base_keys, dialect)?,
        target: combine_families(target, &base_keys, dialect)?,
    })
}

fn mismatched_plural_keys<'a>(
    side: &'a FlatResource,
    other: &'a FlatResource,
) -> impl Iterator<Item = &'a str> {
    side.keys()
        .filter(|k| !other.contains_key(*k) && ends_with_plural_form(k))
        .map(String::as_str)
}

fn combine_families(side: &FlatResource, base_keys: &[&str], dialect: Dialect) -> Result<FlatResource, Error> {
    let delimiter = dialect.delimiter();
    let mut out = side.clone();

    for base in base_keys {
        let members = family_members(side, base, delimiter);
        let mut block: IndexMap<String, FlatValue> = IndexMap::new();

        for key in &members {
            let subkey = &key[base.len() + 1..];
            if dialect == Dialect::I18next && subkey == "plural" {
                if out.get(*base).is_some_and(|v| !v.is_empty()) {
                    if let Some(default) = out.shift_remove(*base) {
                        block.insert(DEFAULT_FORM_SUBKEY.to_string(), default);
                    }
                }
            }
            if let Some(value) = out.get(key.as_str()) {
                block.insert(subkey.to_string(), value.clone());
            }
        }

        if block.is_empty() {
            continue;
        }
        let text = stringify_block(&block)?;
        for key in &members {
            out.shift_remove(key.as_str());
        }
        out.insert(
            format!("{}{}", base, COMBINED_SUBKEY_MARKER),
            FlatValue::Text(text),
        );
    }

    Ok(out)
}

/// Serializes a block and braces its top-level keys.
fn stringify_block(block: &IndexMap<String, FlatValue>) -> Result<String, Error> {
    let mut text = serde_yaml::to_string(block)?;
    for subkey in block.keys() {
        let pattern = format!(
            r#"(?m)^(?:{}|'{}'|"{}"):( |$)"#,
            regex::escape(subkey),
            regex::escape(&subkey.replace('\'', "''")),
            regex::escape(&subkey.replace('\\', "\\\\").replace('"', "\\\""))
        );
        let re = Regex::new(&pattern).map_err(|e| {
            Error::conversion_error(format!("cannot brace subkey `{}`", subkey), Some(Box::new(e)))
        })?;
        text = re
            .replace(&text, |caps: &Captures| format!("{{{}}}:{}", subkey, &caps[1]))
            .into_owned();
    }
    Ok(text)
}

/// Expands every combined block back into `{baseKey}_{suffix}` keys.
///
/// Expanded keys take the block's position; resources without blocks come
/// back unchanged. A block with an empty value is dropped.
pub fn prepare_import(flat: &FlatResource) -> Result<FlatResource, Error> {
    let mut out = FlatResource::with_capacity(flat.len());

    for (key, value) in flat {
        let Some(pos) = key.find(COMBINED_SUBKEY_MARKER) else {
            out.insert(key.clone(), value.clone());
            continue;
        };
        let base = &key[..pos];
        if value.is_empty() {
            debug!(key = key.as_str(), "empty combined block dropped");
            continue;
        }

        for (subkey, sub_value) in parse_block(key, value.text())? {
            let expanded = if subkey == DEFAULT_FORM_SUBKEY {
                base.to_string()
            } else {
                format!("{}_{}", base, subkey)
            };
            out.insert(expanded, sub_value);
        }
    }

    Ok(out)
}

/// Removes the braces from top-level keys and parses the block.
fn parse_block(key: &str, text: &str) -> Result<IndexMap<String, FlatValue>, Error> {
    let restored = unbrace_keys(text);
    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str(&restored).map_err(|e| Error::combined_subkey(key, e))?;

    let mut block = IndexMap::new();
    for (raw_subkey, raw_value) in mapping {
        let subkey = scalar_text(&raw_subkey)
            .ok_or_else(|| Error::combined_subkey(key, "subkeys must be scalars"))?;
        let value = match raw_value {
            Value::Null => continue,
            Value::Mapping(_) => serde_yaml::from_value::<FlatValue>(raw_value)
                .map_err(|e| Error::combined_subkey(key, e))?,
            other => FlatValue::Text(scalar_text(&other).ok_or_else(|| {
                Error::combined_subkey(key, format!("unsupported value for `{}`", subkey))
            })?),
        };
        block.insert(subkey, value);
    }
    Ok(block)
}

fn unbrace_keys(text: &str) -> String {
    BRACED_KEY_REGEX
        .replace_all(text, |caps: &Captures| {
            let raw = &caps[1];
            let subkey = raw
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .map_or_else(|| raw.to_string(), |s| s.replace("''", "'"));
            format!("{}:{}", yaml_key(&subkey), &caps[2])
        })
        .into_owned()
}

/// Renders a subkey so YAML reads it back as the same string.
fn yaml_key(subkey: &str) -> String {
    if needs_quotes(subkey) {
        format!("'{}'", subkey.replace('\'', "''"))
    } else {
        subkey.to_string()
    }
}

/// A plain key needs quoting when YAML would resolve it to anything but the
/// same string (`0x10`, `.inf`, `no`, `~`) or when it holds indicator
/// characters.
fn needs_quotes(subkey: &str) -> bool {
    const RESERVED: [&str; 9] = ["true", "false", "null", "yes", "no", "on", "off", "y", "n"];
    subkey.is_empty()
        || subkey.parse::<f64>().is_ok()
        || RESERVED.contains(&subkey.to_ascii_lowercase().as_str())
        || subkey.trim() != subkey
        || subkey.starts_with(['-', '?'])
        || subkey.contains([':', '#', '{', '}', '[', ']', ',', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`'])
        || !matches!(serde_yaml::from_str::<Value>(subkey), Ok(Value::String(s)) if s == subkey)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
