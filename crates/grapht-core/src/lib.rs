//! Grapht core library
//!
//! Painless handling of JSON parameter trees:
//!
//! - **Validation**: required and optional schema trees declare which
//!   parameters must or may be present and which types they may hold
//! - **Defaults**: a default tree fills in whatever the user left out
//! - **Assembly**: validation and default filling in one call
//! - **Flattening**: lossless conversion between nested trees and flat
//!   `(path, (key, value))` leaf records
//! - **Equivalence**: first-divergence comparison of two trees
//!
//! Trees are plain `serde_json::Value`s; reading and writing them is left to
//! the caller.
//!
//! # Example
//!
//! ```rust
//! use grapht_core::{assemble, flatten_tree, unflatten_tree, check_equivalence};
//! use serde_json::json;
//!
//! let required = json!({"mesh": {"cells": "int"}});
//! let optional = json!({"solver": {"tolerance": ["int", "float"]}});
//! let defaults = json!({"solver": {"tolerance": 1e-8, "kind": "cg"}});
//! let user = json!({"mesh": {"cells": 64}});
//!
//! let tree = assemble(&required, &optional, &defaults, &user)?;
//! assert_eq!(tree["solver"]["kind"], "cg");
//!
//! let records = flatten_tree(&tree)?;
//! let rebuilt = unflatten_tree(&records)?;
//! assert!(check_equivalence(&tree, &rebuilt));
//! # Ok::<(), grapht_core::TreeError>(())
//! ```

mod assemble;
mod config;
mod defaults;
mod equivalence;
mod error;
mod flatten;
pub mod path;
mod types;
mod validate;
pub mod walk;

pub use assemble::{assemble, assemble_with, TreeAssembler};
pub use config::AssemblerConfig;
pub use defaults::{merge_defaults, with_defaults};
pub use equivalence::{
    check_equivalence, compare, compare_symmetric, Comparison, Divergence, DivergenceKind,
};
pub use error::{Result, TreeError, Violations};
pub use flatten::{flatten_tree, unflatten_tree, LeafRecord};
pub use path::{Path, PathSegment};
pub use types::{TypeName, TypeOptions, TypeRegistry, TypeSet};
pub use validate::{validate, validate_all, CompiledSchema, Requirement, ValidationMode, Validator};
pub use walk::{NodeKind, Walker};
