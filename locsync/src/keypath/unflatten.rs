//! Rebuilding nested trees from flat path keys.
//!
//! Nodes live in an arena and refer to their children by [`NodeId`], so a
//! sequence can be turned into a map in place when a later key shows that it
//! never was an array. Nothing here fails: every ambiguous key set resolves to
//! some tree, at worst with a value in a slightly different position.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::segment::{
    ContainerKind, SPARSE_MIN_LENGTH, SegmentKind, classify_segment, container_for, split_key,
};
use crate::types::{FlatResource, FlatValue, Node};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum Slot {
    Leaf(FlatValue),
    Seq(Vec<Option<NodeId>>),
    Map(IndexMap<String, NodeId>),
}

impl Slot {
    fn container(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Seq => Slot::Seq(Vec::new()),
            ContainerKind::Map => Slot::Map(IndexMap::new()),
        }
    }

    /// `None` for leaves.
    fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Slot::Leaf(_) => None,
            Slot::Seq(_) => Some(ContainerKind::Seq),
            Slot::Map(_) => Some(ContainerKind::Map),
        }
    }
}

/// Fill level of one sequence: populated slots versus highest index + 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SeqStats {
    filled: usize,
    declared_len: usize,
}

impl SeqStats {
    fn is_sparse(&self) -> bool {
        self.declared_len > SPARSE_MIN_LENGTH && self.filled * 2 < self.declared_len
    }
}

struct Arena {
    slots: Vec<Slot>,
    seq_stats: HashMap<NodeId, SeqStats>,
}

/// Rebuilds a nested tree from dot-joined path keys.
///
/// A segment followed by an array index (`0..=1000`, no leading zero) becomes a
/// sequence, anything else a map. A sequence later addressed with a
/// non-index segment is converted to a map keyed by its indices, and any
/// sequence longer than 50 that ends up less than half populated is converted
/// the same way. Keys ending in an empty segment (`a.b.`) are attached to the
/// grandparent as `b.`.
///
/// With `preserve_literal_dots`, keys containing a space, comma or `?` are not
/// split.
///
/// # Example
///
/// ```rust
/// use locsync::{keypath::unflatten, types::{FlatResource, FlatValue}};
///
/// let flat: FlatResource = [("arr.0", "a"), ("arr.01", "b")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), FlatValue::from(v)))
///     .collect();
/// let nested = unflatten(&flat, false);
/// assert!(nested.pointer("arr").unwrap().is_map());
/// ```
pub fn unflatten(flat: &FlatResource, preserve_literal_dots: bool) -> Node {
    let mut arena = Arena::new();

    for (key, value) in flat {
        let segments = split_key(key, preserve_literal_dots);
        trace!(key = key.as_str(), segments = segments.len(), "unflatten key");

        if is_empty_override(&segments) {
            arena.insert_empty_override(&segments, value.clone());
        } else {
            arena.insert_path(&segments, value.clone());
        }
    }

    arena.convert_sparse_sequences();
    arena.into_node()
}

/// `a.b.` style keys: at least three segments and an empty last one.
fn is_empty_override(segments: &[&str]) -> bool {
    segments.len() >= 3 && segments.last().is_some_and(|s| s.is_empty())
}

impl Arena {
    fn new() -> Self {
        Arena {
            slots: vec![Slot::Map(IndexMap::new())],
            seq_stats: HashMap::new(),
        }
    }

    fn alloc(&mut self, slot: Slot) -> NodeId {
        let id = self.slots.len();
        if let Slot::Seq(_) = slot {
            self.seq_stats.insert(id, SeqStats::default());
        }
        self.slots.push(slot);
        id
    }

    /// Replaces the content of an existing node, keeping its handle.
    fn overwrite(&mut self, id: NodeId, slot: Slot) {
        self.seq_stats.remove(&id);
        if let Slot::Seq(_) = slot {
            self.seq_stats.insert(id, SeqStats::default());
        }
        self.slots[id] = slot;
    }

    fn child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        match &self.slots[parent] {
            Slot::Map(entries) => entries.get(segment).copied(),
            Slot::Seq(items) => match classify_segment(segment) {
                SegmentKind::Index(i) => items.get(i).copied().flatten(),
                SegmentKind::Key => None,
            },
            Slot::Leaf(_) => None,
        }
    }

    /// Links `child` under `parent` at `segment`, replacing what was there.
    fn attach(&mut self, parent: NodeId, segment: &str, child: NodeId) {
        let kind = classify_segment(segment);
        match self.slots[parent].container_kind() {
            Some(ContainerKind::Seq) if kind == SegmentKind::Key => self.seq_to_map(parent),
            None => self.overwrite(parent, Slot::Map(IndexMap::new())),
            _ => {}
        }

        match &mut self.slots[parent] {
            Slot::Map(entries) => {
                entries.insert(segment.to_string(), child);
            }
            Slot::Seq(items) => {
                let SegmentKind::Index(index) = kind else {
                    return;
                };
                if items.len() <= index {
                    items.resize(index + 1, None);
                }
                let newly_filled = items[index].is_none();
                items[index] = Some(child);

                let stats = self.seq_stats.entry(parent).or_default();
                if newly_filled {
                    stats.filled += 1;
                }
                stats.declared_len = items.len();
            }
            Slot::Leaf(_) => {}
        }
    }

    /// Returns the container under `parent` at `segment`, creating it as
    /// `wanted` when absent. An existing sequence that is wanted as a map is
    /// converted; an existing map stays a map; a leaf is replaced.
    fn ensure_container(&mut self, parent: NodeId, segment: &str, wanted: ContainerKind) -> NodeId {
        let Some(id) = self.child(parent, segment) else {
            let id = self.alloc(Slot::container(wanted));
            self.attach(parent, segment, id);
            return id;
        };

        match (self.slots[id].container_kind(), wanted) {
            (Some(ContainerKind::Map), _) | (Some(ContainerKind::Seq), ContainerKind::Seq) => {}
            (Some(ContainerKind::Seq), ContainerKind::Map) => self.seq_to_map(id),
            (None, _) => {
                debug!(segment, "leaf replaced by container, last write wins");
                self.overwrite(id, Slot::container(wanted));
            }
        }
        id
    }

    fn insert_leaf(&mut self, parent: NodeId, segment: &str, value: FlatValue) {
        match self.child(parent, segment) {
            Some(id) => self.overwrite(id, Slot::Leaf(value)),
            None => {
                let id = self.alloc(Slot::Leaf(value));
                self.attach(parent, segment, id);
            }
        }
    }

    fn insert_path(&mut self, segments: &[&str], value: FlatValue) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut cursor = ROOT;
        for (j, segment) in parents.iter().enumerate() {
            let wanted = container_for(segments[j + 1]);
            cursor = self.ensure_container(cursor, segment, wanted);
        }
        self.insert_leaf(cursor, last, value);
    }

    /// Attaches `a.b.c.` as key `c.` on the node at `a.b`.
    ///
    /// When a node on the way is a leaf, the rest of the path is written as a
    /// single flat key on the last container reached instead.
    fn insert_empty_override(&mut self, segments: &[&str], value: FlatValue) {
        let n = segments.len();
        let path = &segments[..n - 2];
        let parent_segment = segments[n - 2];

        let mut cursor = ROOT;
        for (j, segment) in path.iter().enumerate() {
            if let Some(existing) = self.child(cursor, segment) {
                if self.slots[existing].container_kind().is_none() {
                    let rest = segments[j..].join(".");
                    debug!(
                        key = rest.as_str(),
                        "path collides with a leaf, writing remainder as a flat key"
                    );
                    self.insert_leaf(cursor, &rest, value);
                    return;
                }
            }
            let wanted = match path.get(j + 1) {
                Some(next) => container_for(next),
                None => ContainerKind::Map,
            };
            cursor = self.ensure_container(cursor, segment, wanted);
        }

        self.insert_leaf(cursor, &format!("{}.", parent_segment), value);
    }

    fn seq_to_map(&mut self, id: NodeId) {
        let Slot::Seq(items) = &mut self.slots[id] else {
            return;
        };
        let items = std::mem::take(items);
        let entries = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, child)| child.map(|c| (index.to_string(), c)))
            .collect();
        self.slots[id] = Slot::Map(entries);
        self.seq_stats.remove(&id);
    }

    fn convert_sparse_sequences(&mut self) {
        let mut sparse: Vec<NodeId> = self
            .seq_stats
            .iter()
            .filter(|(_, stats)| stats.is_sparse())
            .map(|(id, _)| *id)
            .collect();
        sparse.sort_unstable();

        for id in sparse {
            if let Some(stats) = self.seq_stats.get(&id) {
                debug!(
                    filled = stats.filled,
                    length = stats.declared_len,
                    "sparse sequence converted to map"
                );
            }
            self.seq_to_map(id);
        }
    }

    fn into_node(mut self) -> Node {
        self.take(ROOT)
    }

    fn take(&mut self, id: NodeId) -> Node {
        match std::mem::replace(&mut self.slots[id], Slot::Map(IndexMap::new())) {
            Slot::Leaf(value) => Node::Leaf(value),
            Slot::Seq(items) => Node::Seq(
                items
                    .into_iter()
                    .map(|child| child.map_or(Node::Empty, |c| self.take(c)))
                    .collect(),
            ),
            Slot::Map(entries) => Node::Map(
                entries
                    .into_iter()
                    .map(|(key, child)| (key, self.take(child)))
                    .collect(),
            ),
        }
    }
}
