//! Filling absent parameters from a default tree.
//!
//! # Fill Semantics
//!
//! - **Absent in target**: the default value is inserted verbatim, whole
//!   subtrees included
//! - **Both objects**: the default's members are filled in one level deeper
//! - **Anything else present**: the target's value wins
//! - **Arrays**: treated as values, never merged element-wise
//!
//! ```rust
//! use grapht_core::with_defaults;
//! use serde_json::json;
//!
//! let user = json!({"mesh": {"cells": 64}});
//! let defaults = json!({"mesh": {"cells": 16, "order": 2}, "steps": 10});
//!
//! let filled = with_defaults(&user, &defaults).unwrap();
//! assert_eq!(filled, json!({"mesh": {"cells": 64, "order": 2}, "steps": 10}));
//! ```

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, TreeError};
use crate::walk::{self, NodeKind};

/// Fill every path of `defaults` that is absent from `target`, in place.
pub fn merge_defaults(target: &mut Value, defaults: &Value) -> Result<()> {
    TreeError::require_object("target", target)?;
    TreeError::require_object("defaults", defaults)?;

    let mut filled = 0usize;
    let mut walker = walk::walk(defaults);
    while let Some(entry) = walker.next() {
        let Some((segment, parent)) = walker.path().segments().split_last() else {
            continue;
        };
        let key = segment.to_key();

        // Only reached through members that are objects on both sides.
        let Some(Value::Object(container)) = walk::get_mut(target, parent) else {
            walker.skip_children();
            continue;
        };

        let Some(existing) = container.get(&key).map(NodeKind::of) else {
            trace!(path = %walker.path(), "filling default");
            container.insert(key, walk::deep_clone(entry.value));
            filled += 1;
            walker.skip_children();
            continue;
        };

        match (existing, entry.kind()) {
            (NodeKind::Object, NodeKind::Object) => {}
            (existing, default) if existing == NodeKind::Object || default == NodeKind::Object => {
                debug!(
                    path = %walker.path(),
                    %existing,
                    %default,
                    "default shape differs from parameter, keeping parameter"
                );
                walker.skip_children();
            }
            _ => walker.skip_children(),
        }
    }

    debug!(filled, "defaults merged");
    Ok(())
}

/// A copy of `target` with every absent path of `defaults` filled in.
pub fn with_defaults(target: &Value, defaults: &Value) -> Result<Value> {
    let mut merged = walk::deep_clone(target);
    merge_defaults(&mut merged, defaults)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_user_values_win() {
        let user = json!({"name": "run-1", "solver": {"iterations": 3}});
        let defaults = json!({"name": "default", "solver": {"iterations": 1}});

        let merged = with_defaults(&user, &defaults).unwrap();
        assert_eq!(merged, user);
    }

    #[test]
    fn test_nested_defaults_fill_partial_groups() {
        let user = json!({"solver": {"iterations": 3}});
        let defaults = json!({
            "solver": {"iterations": 1, "method": "cg"},
            "labels": {"env": "dev"}
        });

        let merged = with_defaults(&user, &defaults).unwrap();
        assert_eq!(
            merged,
            json!({
                "solver": {"iterations": 3, "method": "cg"},
                "labels": {"env": "dev"}
            })
        );
    }

    #[test]
    fn test_whole_subtree_inserted_verbatim() {
        let defaults = json!({"solver": {"kind": "cg", "opts": {"tol": 1e-6, "restarts": [1, 2]}}});
        let merged = with_defaults(&json!({}), &defaults).unwrap();
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_arrays_are_not_merged() {
        let user = json!({"sizes": [4]});
        let defaults = json!({"sizes": [1, 2, 3]});
        assert_eq!(with_defaults(&user, &defaults).unwrap(), user);
    }

    #[test]
    fn test_shape_conflicts_keep_user_value() {
        let user = json!({"a": 5, "b": {"c": 1}});
        let defaults = json!({"a": {"x": 1}, "b": 7});
        assert_eq!(with_defaults(&user, &defaults).unwrap(), user);
    }

    #[test]
    fn test_user_null_is_present() {
        let user = json!({"seed": null});
        let defaults = json!({"seed": 42});
        assert_eq!(with_defaults(&user, &defaults).unwrap(), user);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let user = json!({"a": 1});
        let _ = with_defaults(&user, &json!({"b": 2})).unwrap();
        assert_eq!(user, json!({"a": 1}));
    }

    #[test]
    fn test_non_object_roots_rejected() {
        let mut target = json!([]);
        assert!(matches!(
            merge_defaults(&mut target, &json!({})),
            Err(TreeError::InvalidArgument { .. })
        ));
        assert!(matches!(
            with_defaults(&json!({}), &json!(3)),
            Err(TreeError::InvalidArgument { .. })
        ));
    }
}
