//! Structural comparison of parameter trees.
//!
//! [`compare`] asks whether the structure declared by the left tree appears in
//! the right tree: every node of the left tree must exist at the same path on
//! the right with the same shape, and every leaf must be equal. Members that
//! only the right tree has are not looked at, so the relation is not symmetric.
//! [`compare_symmetric`] checks both directions.
//!
//! Leaves compare with `serde_json::Value` equality, so `1` and `1.0` differ.

use std::fmt;

use serde_json::Value;
use tracing::info;

use crate::path::Path;
use crate::walk::{self, NodeKind};

/// Why two trees diverge at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum DivergenceKind {
    /// The path does not exist in the right tree.
    Missing,
    /// The two nodes are different kinds of container or leaf.
    ShapeMismatch { expected: NodeKind, found: NodeKind },
    /// Both are leaves with different values.
    ValueMismatch { expected: Value, found: Value },
}

/// The first point where two trees disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub path: Path,
    pub kind: DivergenceKind,
    /// Set when the divergence was found comparing right against left.
    pub reversed: bool,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.path.is_root() {
            "<root>".to_string()
        } else {
            format!("'{}'", self.path)
        };
        let (this, other) = if self.reversed {
            ("right", "left")
        } else {
            ("left", "right")
        };

        match &self.kind {
            DivergenceKind::Missing => {
                write!(f, "{location} exists in the {this} tree but not in the {other} tree")
            }
            DivergenceKind::ShapeMismatch { expected, found } => write!(
                f,
                "{location} is {expected}-shaped in the {this} tree but {found}-shaped in the {other} tree"
            ),
            DivergenceKind::ValueMismatch { expected, found } => write!(
                f,
                "{location} is {expected} in the {this} tree but {found} in the {other} tree"
            ),
        }
    }
}

/// Outcome of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equivalent,
    Diverged(Divergence),
}

impl Comparison {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Self::Equivalent)
    }

    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            Self::Equivalent => None,
            Self::Diverged(divergence) => Some(divergence),
        }
    }
}

/// Find the first node of `left` that `right` does not reproduce.
pub fn compare(left: &Value, right: &Value) -> Comparison {
    match first_divergence(left, right) {
        Some((path, kind)) => Comparison::Diverged(Divergence {
            path,
            kind,
            reversed: false,
        }),
        None => Comparison::Equivalent,
    }
}

/// Like [`compare`], then the same check with the trees swapped.
pub fn compare_symmetric(left: &Value, right: &Value) -> Comparison {
    match compare(left, right) {
        Comparison::Equivalent => match first_divergence(right, left) {
            Some((path, kind)) => Comparison::Diverged(Divergence {
                path,
                kind,
                reversed: true,
            }),
            None => Comparison::Equivalent,
        },
        diverged => diverged,
    }
}

/// Whether `right` reproduces `left`; the first divergence is logged.
pub fn check_equivalence(left: &Value, right: &Value) -> bool {
    match compare(left, right) {
        Comparison::Equivalent => true,
        Comparison::Diverged(divergence) => {
            info!(path = %divergence.path, "trees are not equivalent: {}", divergence);
            false
        }
    }
}

fn first_divergence(left: &Value, right: &Value) -> Option<(Path, DivergenceKind)> {
    // `matched[d]` is the right-hand node at depth `d` of the current path.
    let mut matched: Vec<&Value> = Vec::new();
    let mut walker = walk::walk(left);

    while let Some(entry) = walker.next() {
        matched.truncate(entry.depth);
        let other = if entry.is_root() {
            Some(right)
        } else {
            matched
                .last()
                .copied()
                .zip(walker.path().last())
                .and_then(|(parent, segment)| walk::child(parent, segment))
        };

        let Some(other) = other else {
            return Some((walker.path().clone(), DivergenceKind::Missing));
        };

        let (expected, found) = (entry.kind(), NodeKind::of(other));
        if expected != found {
            return Some((
                walker.path().clone(),
                DivergenceKind::ShapeMismatch { expected, found },
            ));
        }
        if expected == NodeKind::Leaf && entry.value != other {
            return Some((
                walker.path().clone(),
                DivergenceKind::ValueMismatch {
                    expected: entry.value.clone(),
                    found: other.clone(),
                },
            ));
        }
        matched.push(other);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(keys: &[&str]) -> Path {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_identical_trees_with_different_key_order() {
        let a = json!({"x": 1, "g": {"h": [1, 2], "s": "v"}});
        let b = json!({"g": {"s": "v", "h": [1, 2]}, "x": 1});
        assert!(check_equivalence(&a, &b));
        assert!(compare_symmetric(&a, &b).is_equivalent());
    }

    #[test]
    fn test_missing_path_reported() {
        let a = json!({"g": {"h": 1, "i": 2}});
        let b = json!({"g": {"h": 1}});
        let comparison = compare(&a, &b);
        let divergence = comparison.divergence().unwrap();
        assert_eq!(divergence.path, path(&["g", "i"]));
        assert_eq!(divergence.kind, DivergenceKind::Missing);
    }

    #[test]
    fn test_shape_mismatch_reported_at_container() {
        let a = json!({"g": {"h": 1}});
        let b = json!({"g": 5});
        let Comparison::Diverged(divergence) = compare(&a, &b) else {
            panic!("expected divergence");
        };
        assert_eq!(divergence.path, path(&["g"]));
        assert_eq!(
            divergence.kind,
            DivergenceKind::ShapeMismatch {
                expected: NodeKind::Object,
                found: NodeKind::Leaf
            }
        );
        assert!(divergence.to_string().contains("'g' is object-shaped"));
    }

    #[test]
    fn test_numbers_are_not_coerced() {
        let a = json!({"n": 1});
        let b = json!({"n": 1.0});
        assert!(matches!(
            compare(&a, &b).divergence().map(|d| &d.kind),
            Some(DivergenceKind::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_comparison_is_asymmetric() {
        let small = json!({"a": 1});
        let large = json!({"a": 1, "b": 2});
        assert!(check_equivalence(&small, &large));
        assert!(!check_equivalence(&large, &small));

        let Comparison::Diverged(divergence) = compare_symmetric(&small, &large) else {
            panic!("expected divergence");
        };
        assert!(divergence.reversed);
        assert_eq!(divergence.path, path(&["b"]));
    }

    #[test]
    fn test_array_elements_compared_by_index() {
        let a = json!({"v": [1, {"k": true}]});
        let b = json!({"v": [1, {"k": false}]});
        let divergence = compare(&a, &b).divergence().cloned().unwrap();
        assert_eq!(divergence.path.to_string(), "v[1].k");
    }

    #[test]
    fn test_siblings_after_deep_subtree() {
        let a = json!({"x": {"y": {"z": 1}}, "w": 2});
        let b = json!({"w": 2, "x": {"y": {"z": 1, "extra": 0}}});
        assert!(compare(&a, &b).is_equivalent());

        let c = json!({"x": {"y": {"z": 1}}, "w": 3});
        let divergence = compare(&a, &c).divergence().cloned().unwrap();
        assert_eq!(divergence.path, path(&["w"]));
    }
}
