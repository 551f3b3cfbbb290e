//! Core, format-agnostic types for locsync.
//! Decoders produce these; encoders serialize these.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap, ser::SerializeSeq};
use serde_json::Value;

/// A single-level mapping from dot-joined path key to leaf value.
///
/// Insertion order is kept so encoders write keys in the order they were read;
/// equality ignores order.
pub type FlatResource = IndexMap<String, FlatValue>;

/// A translator note attached to a value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Context {
    pub text: String,
}

/// The value stored under a path key.
///
/// Serialized untagged: a plain string, or `{ "value": ..., "context": { "text": ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Text(String),
    Annotated {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        context: Option<Context>,
    },
}

impl FlatValue {
    /// The translated text, without any context.
    pub fn text(&self) -> &str {
        match self {
            FlatValue::Text(value) => value,
            FlatValue::Annotated { value, .. } => value,
        }
    }

    /// The translator note, if any.
    pub fn context(&self) -> Option<&str> {
        match self {
            FlatValue::Text(_) => None,
            FlatValue::Annotated { context, .. } => context.as_ref().map(|c| c.text.as_str()),
        }
    }

    /// Builds a value carrying a translator note; an empty note yields plain text.
    pub fn with_context(value: impl Into<String>, context: Option<String>) -> Self {
        match context.filter(|c| !c.is_empty()) {
            Some(text) => FlatValue::Annotated {
                value: value.into(),
                context: Some(Context { text }),
            },
            None => FlatValue::Text(value.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

impl From<&str> for FlatValue {
    fn from(value: &str) -> Self {
        FlatValue::Text(value.to_string())
    }
}

impl From<String> for FlatValue {
    fn from(value: String) -> Self {
        FlatValue::Text(value)
    }
}

impl Display for FlatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A nested translation tree, as read from JSON/YAML or rebuilt by `unflatten`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(FlatValue),
    Seq(Vec<Node>),
    Map(IndexMap<String, Node>),
    /// An unfilled sequence slot. Written as `null`, skipped by `flatten`.
    Empty,
}

impl Node {
    pub fn map() -> Self {
        Node::Map(IndexMap::new())
    }

    pub fn leaf(value: impl Into<FlatValue>) -> Self {
        Node::Leaf(value.into())
    }

    /// Looks up a direct child by segment text. Sequence children are addressed
    /// by their decimal index.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(segment),
            Node::Seq(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Node::Leaf(_) | Node::Empty => None,
        }
    }

    /// Follows a dot-joined path.
    pub fn pointer(&self, path: &str) -> Option<&Node> {
        path.split('.').try_fold(self, |node, segment| node.get(segment))
    }

    pub fn as_leaf(&self) -> Option<&FlatValue> {
        match self {
            Node::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_seq(&self) -> bool {
        matches!(self, Node::Seq(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

impl From<Value> for Node {
    /// Numbers and booleans become text leaves; an object shaped exactly like an
    /// annotated value (`value` plus optional `context.text`) becomes one leaf.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Empty,
            Value::String(s) => Node::Leaf(FlatValue::Text(s)),
            Value::Number(n) => Node::Leaf(FlatValue::Text(n.to_string())),
            Value::Bool(b) => Node::Leaf(FlatValue::Text(b.to_string())),
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => match annotated_leaf(&map) {
                Some(leaf) => Node::Leaf(leaf),
                None => Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect()),
            },
        }
    }
}

fn annotated_leaf(map: &serde_json::Map<String, Value>) -> Option<FlatValue> {
    let value = map.get("value")?.as_str()?;
    if map.keys().any(|k| k != "value" && k != "context") {
        return None;
    }
    let context = match map.get("context") {
        None | Some(Value::Null) => None,
        Some(Value::Object(ctx)) if ctx.len() == 1 => Some(Context {
            text: ctx.get("text")?.as_str()?.to_string(),
        }),
        Some(_) => return None,
    };
    Some(FlatValue::Annotated {
        value: value.to_string(),
        context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_value_untagged_serde() {
        let plain: FlatValue = serde_json::from_value(json!("Hello")).unwrap();
        assert_eq!(plain, FlatValue::Text("Hello".to_string()));

        let annotated: FlatValue =
            serde_json::from_value(json!({"value": "Hi", "context": {"text": "greeting"}}))
                .unwrap();
        assert_eq!(annotated.text(), "Hi");
        assert_eq!(annotated.context(), Some("greeting"));

        let back = serde_json::to_value(&annotated).unwrap();
        assert_eq!(back, json!({"value": "Hi", "context": {"text": "greeting"}}));
    }

    #[test]
    fn test_with_context_drops_empty_note() {
        assert_eq!(
            FlatValue::with_context("a", Some(String::new())),
            FlatValue::Text("a".to_string())
        );
        assert!(matches!(
            FlatValue::with_context("a", Some("note".to_string())),
            FlatValue::Annotated { .. }
        ));
    }

    #[test]
    fn test_node_from_json_scalars() {
        let node = Node::from(json!({"n": 3, "b": true, "s": "x", "z": null}));
        assert_eq!(node.pointer("n"), Some(&Node::leaf("3")));
        assert_eq!(node.pointer("b"), Some(&Node::leaf("true")));
        assert_eq!(node.pointer("s"), Some(&Node::leaf("x")));
        assert_eq!(node.pointer("z"), Some(&Node::Empty));
    }

    #[test]
    fn test_node_from_json_detects_annotated_leaf() {
        let node = Node::from(json!({
            "title": {"value": "Title", "context": {"text": "page header"}},
            "nested": {"value": "v", "other": "w"}
        }));
        assert!(matches!(
            node.pointer("title"),
            Some(Node::Leaf(FlatValue::Annotated { .. }))
        ));
        assert!(node.pointer("nested").unwrap().is_map());
    }

    #[test]
    fn test_node_serialize_keeps_order_and_holes() {
        let node = Node::from(json!({"z": "last", "a": ["x", null, "y"]}));
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"z":"last","a":["x",null,"y"]}"#);
    }

    #[test]
    fn test_node_pointer_into_sequence() {
        let node = Node::from(json!({"arr": ["a", "b"]}));
        assert_eq!(node.pointer("arr.1"), Some(&Node::leaf("b")));
        assert_eq!(node.pointer("arr.2"), None);
        assert_eq!(node.pointer("arr.x"), None);
    }
}
