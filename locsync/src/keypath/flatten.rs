use crate::{
    error::Error,
    types::{FlatResource, Node},
};

/// Flattens a nested tree into dot-joined path keys.
///
/// Sequence items use their index as segment text; unfilled slots and empty
/// containers produce no keys. The root must be a map or a sequence.
///
/// # Example
///
/// ```rust
/// use locsync::{keypath::flatten, types::Node};
///
/// let nested = Node::from(serde_json::json!({ "menu": { "items": ["Open", "Close"] } }));
/// let flat = flatten(&nested)?;
/// assert_eq!(flat["menu.items.1"].text(), "Close");
/// # Ok::<(), locsync::Error>(())
/// ```
pub fn flatten(node: &Node) -> Result<FlatResource, Error> {
    let mut out = FlatResource::new();
    match node {
        Node::Map(_) | Node::Seq(_) => walk(node, None, &mut out),
        Node::Empty => {}
        Node::Leaf(_) => {
            return Err(Error::conversion_error(
                "cannot flatten a bare value: expected an object or array at the root",
                None,
            ));
        }
    }
    Ok(out)
}

fn walk(node: &Node, prefix: Option<&str>, out: &mut FlatResource) {
    let join = |segment: &str| match prefix {
        Some(p) => format!("{}.{}", p, segment),
        None => segment.to_string(),
    };

    match node {
        Node::Leaf(value) => {
            out.insert(prefix.unwrap_or_default().to_string(), value.clone());
        }
        Node::Map(entries) => {
            for (key, child) in entries {
                walk(child, Some(&join(key)), out);
            }
        }
        Node::Seq(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, Some(&join(&index.to_string())), out);
            }
        }
        Node::Empty => {}
    }
}
