//! Addresses into a parameter tree.
//!
//! A [`Path`] is an ordered list of [`PathSegment`]s from the tree root down to
//! a node. Each segment remembers whether it addresses an object member or an
//! array element, so paths can be turned back into trees without guessing.
//!
//! Paths render the way error messages locate fields:
//! `""` for the root, `"solver.tolerance"` for nested members and
//! `"mesh.blocks[0].cells"` for array elements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`Path`].
///
/// Serializes untagged: object keys as JSON strings, array indices as JSON
/// integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position inside an array.
    Index(usize),
    /// Member name inside an object.
    Key(String),
}

impl PathSegment {
    /// The position, if this segment addresses an array element.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(_) => None,
        }
    }

    /// Render the segment as an object key.
    ///
    /// Indices become their decimal representation.
    pub fn to_key(&self) -> String {
        match self {
            Self::Key(key) => key.clone(),
            Self::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&String> for PathSegment {
    fn from(key: &String) -> Self {
        Self::Key(key.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A location inside a tree, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.0.iter()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// A new path one level deeper.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment.into());
        Self(segments)
    }

    /// Shorten the path to its first `len` segments.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Path {
    type Item = PathSegment;
    type IntoIter = std::vec::IntoIter<PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mixes_keys_and_indices() {
        let mut path = Path::root();
        path.push("mesh");
        path.push("blocks");
        path.push(0usize);
        path.push("cells");

        assert_eq!(path.to_string(), "mesh.blocks[0].cells");
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn test_truncate_keeps_prefix() {
        let mut path: Path = ["a", "g", "h"].into_iter().collect();
        path.truncate(1);
        assert_eq!(path, Path::from_iter(["a"]));
        path.truncate(5);
        assert_eq!(path.len(), 1);
        path.truncate(0);
        assert!(path.is_root());
    }

    #[test]
    fn test_segments_serialize_untagged() {
        let path = Path::new(vec!["a".into(), 2usize.into()]);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["a", 2]));

        let back: Path = serde_json::from_value(json).unwrap();
        assert_eq!(back, path);
    }
}
