//! Path lookup and depth-first traversal over `serde_json::Value` trees.
//!
//! The [`Walker`] keeps its pending nodes on a heap stack instead of the call
//! stack, so arbitrarily deep parameter trees can be visited. Like
//! `walkdir`, a caller can prune the subtree below the entry it was just handed
//! with [`Walker::skip_children`].

use serde_json::{Map, Value};

use crate::path::{Path, PathSegment};

/// The value at `segment` inside `value`, if `value` is a container holding it.
pub fn child<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

/// Mutable variant of [`child`].
pub fn child_mut<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
        (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

/// The value addressed by `path`, starting at `root`.
pub fn get<'a, 's>(
    root: &'a Value,
    path: impl IntoIterator<Item = &'s PathSegment>,
) -> Option<&'a Value> {
    path.into_iter()
        .try_fold(root, |node, segment| child(node, segment))
}

/// Mutable variant of [`get`].
pub fn get_mut<'a, 's>(
    root: &'a mut Value,
    path: impl IntoIterator<Item = &'s PathSegment>,
) -> Option<&'a mut Value> {
    path.into_iter()
        .try_fold(root, |node, segment| child_mut(node, segment))
}

/// The coarse shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Leaf,
}

impl NodeKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            _ => Self::Leaf,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Array => f.write_str("array"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

/// One node handed out by a [`Walker`].
///
/// The node's path is available from [`Walker::path`] until the next call to
/// `next`.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub value: &'a Value,
    /// Shape of the container holding this node; `None` for the root.
    pub parent: Option<NodeKind>,
    /// Number of segments from the walk's root to this node.
    pub depth: usize,
}

impl Entry<'_> {
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(self.value)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

struct Pending<'a> {
    segment: Option<PathSegment>,
    entry: Entry<'a>,
}

/// Depth-first, pre-order iterator over every node of a tree.
///
/// Object members are visited in the map's iteration order, array elements in
/// index order. The walker keeps a single path and rewrites only its tail
/// between entries, so a walk is linear in the size of the tree.
pub struct Walker<'a> {
    stack: Vec<Pending<'a>>,
    /// Path of the entry returned last.
    path: Path,
    /// Number of children pushed for the entry returned last.
    pushed: usize,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            stack: vec![Pending {
                segment: None,
                entry: Entry {
                    value: root,
                    parent: None,
                    depth: 0,
                },
            }],
            path: Path::root(),
            pushed: 0,
        }
    }

    /// Path of the entry most recently returned by `next`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Do not descend into the entry most recently returned by `next`.
    pub fn skip_children(&mut self) {
        let keep = self.stack.len() - self.pushed;
        self.stack.truncate(keep);
        self.pushed = 0;
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Pending { segment, entry } = self.stack.pop()?;
        self.path.truncate(entry.depth.saturating_sub(1));
        if let Some(segment) = segment {
            self.path.push(segment);
        }

        let before = self.stack.len();
        let depth = entry.depth + 1;

        // Children go on in reverse so the first one is popped first.
        match entry.value {
            Value::Object(map) => {
                for (key, value) in map.iter().rev() {
                    self.stack.push(Pending {
                        segment: Some(PathSegment::from(key)),
                        entry: Entry {
                            value,
                            parent: Some(NodeKind::Object),
                            depth,
                        },
                    });
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate().rev() {
                    self.stack.push(Pending {
                        segment: Some(PathSegment::Index(index)),
                        entry: Entry {
                            value,
                            parent: Some(NodeKind::Array),
                            depth,
                        },
                    });
                }
            }
            _ => {}
        }

        self.pushed = self.stack.len() - before;
        Some(entry)
    }
}

/// Walk every node of `root`.
pub fn walk(root: &Value) -> Walker<'_> {
    Walker::new(root)
}

/// A container being copied, with the source children still to visit.
enum Copying<'a> {
    Object(serde_json::map::Iter<'a>, Map<String, Value>),
    Array(std::slice::Iter<'a, Value>, Vec<Value>),
}

impl<'a> Copying<'a> {
    fn start(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Object(map.iter(), Map::new())),
            Value::Array(items) => Some(Self::Array(items.iter(), Vec::with_capacity(items.len()))),
            _ => None,
        }
    }

    fn next_child(&mut self) -> Option<(Option<&'a String>, &'a Value)> {
        match self {
            Self::Object(pending, _) => pending.next().map(|(key, value)| (Some(key), value)),
            Self::Array(pending, _) => pending.next().map(|value| (None, value)),
        }
    }

    fn attach(&mut self, key: Option<&String>, value: Value) {
        match (self, key) {
            (Self::Object(_, map), Some(key)) => {
                map.insert(key.clone(), value);
            }
            (Self::Array(_, items), _) => items.push(value),
            (Self::Object(..), None) => {}
        }
    }

    fn finish(self) -> Value {
        match self {
            Self::Object(_, map) => Value::Object(map),
            Self::Array(_, items) => Value::Array(items),
        }
    }
}

/// A deep copy of `value`.
///
/// `Value::clone` recurses once per level; this copies on a heap stack so
/// the depth of the tree does not matter.
pub fn deep_clone(value: &Value) -> Value {
    let Some(copying) = Copying::start(value) else {
        return value.clone();
    };

    let mut stack: Vec<(Option<&String>, Copying<'_>)> = vec![(None, copying)];
    loop {
        let Some((_, top)) = stack.last_mut() else {
            return Value::Null;
        };

        match top.next_child() {
            Some((key, child)) => match Copying::start(child) {
                Some(copying) => stack.push((key, copying)),
                None => top.attach(key, child.clone()),
            },
            None => {
                let Some((key, done)) = stack.pop() else {
                    continue;
                };
                let copy = done.finish();
                match stack.last_mut() {
                    Some((_, parent)) => parent.attach(key, copy),
                    None => return copy,
                }
            }
        }
    }
}
