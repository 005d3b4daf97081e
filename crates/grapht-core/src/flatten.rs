//! Lossless conversion between nested trees and flat leaf records.
//!
//! A [`LeafRecord`] carries the path to a leaf's container, the leaf's own key
//! (or array index) and its value. Records serialize as `[path, [key, value]]`
//! with object keys as strings and array indices as integers, so
//! `{"a": {"g": [1, 2]}}` flattens to:
//!
//! ```json
//! [[["a", "g"], [0, 1]], [["a", "g"], [1, 2]]]
//! ```
//!
//! Array elements are always emitted as records, whatever they hold. Empty
//! objects and arrays under an object are emitted as records too, so
//! they survive the round trip.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, TreeError};
use crate::path::{Path, PathSegment};
use crate::walk::{self, NodeKind};

type RecordRepr = (Path, (PathSegment, Value));

/// One leaf of a flattened tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordRepr", into = "RecordRepr")]
pub struct LeafRecord {
    /// Path from the root to the leaf's container.
    pub path: Path,
    /// The leaf's key in an object or index in an array.
    pub key: PathSegment,
    pub value: Value,
}

impl LeafRecord {
    pub fn new(path: Path, key: impl Into<PathSegment>, value: Value) -> Self {
        Self {
            path,
            key: key.into(),
            value,
        }
    }

    /// Full address of the leaf: `path + [key]`.
    pub fn address(&self) -> Path {
        self.path.child(self.key.clone())
    }
}

impl From<RecordRepr> for LeafRecord {
    fn from((path, (key, value)): RecordRepr) -> Self {
        Self { path, key, value }
    }
}

impl From<LeafRecord> for RecordRepr {
    fn from(record: LeafRecord) -> Self {
        (record.path, (record.key, record.value))
    }
}

/// Flatten `tree` into leaf records in depth-first pre-order.
///
/// The root must be an object or an array.
pub fn flatten_tree(tree: &Value) -> Result<Vec<LeafRecord>> {
    if NodeKind::of(tree) == NodeKind::Leaf {
        return Err(TreeError::invalid_argument(
            "tree",
            "expected a dict or list at the root, found a leaf",
        ));
    }

    let mut records = Vec::new();
    let mut walker = walk::walk(tree);
    while let Some(entry) = walker.next() {
        let Some(parent) = entry.parent else {
            continue;
        };

        let emit = parent == NodeKind::Array
            || match entry.value {
                Value::Object(map) => map.is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => true,
            };
        if !emit {
            continue;
        }

        walker.skip_children();
        if let Some((key, path)) = walker.path().segments().split_last() {
            records.push(LeafRecord {
                path: Path::new(path.to_vec()),
                key: key.clone(),
                value: walk::deep_clone(entry.value),
            });
        }
    }

    debug!(records = records.len(), "tree flattened");
    Ok(records)
}

enum Node {
    Leaf(Value),
    Branch(IndexMap<PathSegment, Node>),
}

impl Node {
    fn is_empty_container(&self) -> bool {
        match self {
            Node::Leaf(Value::Object(map)) => map.is_empty(),
            Node::Leaf(Value::Array(items)) => items.is_empty(),
            _ => false,
        }
    }
}

/// Rebuild a tree from leaf records.
///
/// Records are applied in order; a later record at the same address replaces an
/// earlier one. A node whose children are all indices forming `0..n` becomes an
/// array, any other node an object. No records yield an empty object.
pub fn unflatten_tree(records: &[LeafRecord]) -> Result<Value> {
    let mut root: IndexMap<PathSegment, Node> = IndexMap::new();

    for (number, record) in records.iter().enumerate() {
        let mut node = &mut root;
        for (depth, segment) in record.path.iter().enumerate() {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| Node::Branch(IndexMap::new()));
            if child.is_empty_container() {
                *child = Node::Branch(IndexMap::new());
            }
            node = match child {
                Node::Branch(children) => children,
                Node::Leaf(_) => {
                    let blocked: Path = record.path.segments()[..=depth].iter().cloned().collect();
                    return Err(TreeError::invalid_argument(
                        "records",
                        format!("record {number} descends through the leaf at '{blocked}'"),
                    ));
                }
            };
        }
        node.insert(record.key.clone(), Node::Leaf(walk::deep_clone(&record.value)));
    }

    let tree = build(root)?;
    debug!(records = records.len(), "tree unflattened");
    Ok(tree)
}

struct Frame {
    segment: Option<PathSegment>,
    pending: indexmap::map::IntoIter<PathSegment, Node>,
    done: Vec<(PathSegment, Value)>,
}

/// Turn the builder tree into a value, bottom-up, without recursion.
fn build(root: IndexMap<PathSegment, Node>) -> Result<Value> {
    let mut stack = vec![Frame {
        segment: None,
        pending: root.into_iter(),
        done: Vec::new(),
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Ok(Value::Object(Map::new()));
        };

        match frame.pending.next() {
            Some((segment, Node::Leaf(value))) => frame.done.push((segment, value)),
            Some((segment, Node::Branch(children))) => stack.push(Frame {
                segment: Some(segment),
                pending: children.into_iter(),
                done: Vec::new(),
            }),
            None => {
                let Some(finished) = stack.pop() else {
                    continue;
                };
                let value = container(finished.done).map_err(|key| {
                    let address: Path = stack
                        .iter()
                        .filter_map(|frame| frame.segment.clone())
                        .chain(finished.segment.clone())
                        .chain([PathSegment::Key(key)])
                        .collect();
                    TreeError::invalid_argument(
                        "records",
                        format!("'{address}' is addressed both as a key and as an index"),
                    )
                })?;
                match (finished.segment, stack.last_mut()) {
                    (Some(segment), Some(parent)) => parent.done.push((segment, value)),
                    _ => return Ok(value),
                }
            }
        }
    }
}

/// Assemble finished children into an array or an object.
///
/// Fails with the clashing key when an index and a key share a name, as both
/// would land on the same object member.
fn container(children: Vec<(PathSegment, Value)>) -> std::result::Result<Value, String> {
    let len = children.len();
    let is_sequence = len > 0
        && children
            .iter()
            .all(|(segment, _)| segment.as_index().is_some_and(|i| i < len));

    if is_sequence {
        // Indices are distinct and all below `len`, so each slot is filled once.
        let mut items = vec![Value::Null; len];
        for (segment, value) in children {
            if let Some(index) = segment.as_index() {
                items[index] = value;
            }
        }
        return Ok(Value::Array(items));
    }

    let mut map = Map::new();
    for (segment, value) in children {
        let key = segment.to_key();
        if map.contains_key(&key) {
            return Err(key);
        }
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}
