//! Schema validation of parameter trees.
//!
//! A schema is a tree of the same shape as the parameters it describes, whose
//! leaves are type declarations (`"int"` or `["int", "float"]`) instead of
//! values. Only paths declared in the schema are checked; parameters the schema
//! does not mention pass through untouched.
//!
//! Validation first compiles the whole schema, resolving every declaration
//! through the [`TypeRegistry`]. An unknown type token therefore fails the pass
//! even when the parameter it describes is absent. The compiled schema is a
//! flat pre-order list, so checking it needs no recursion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, TreeError, Violations};
use crate::path::Path;
use crate::types::{TypeName, TypeRegistry, TypeSet};
use crate::walk::{self, NodeKind};

/// Whether the parameters a schema declares must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

impl Requirement {
    pub fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Whether a pass stops at the first failure or reports all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    #[default]
    FailFast,
    CollectAll,
}

#[derive(Debug, Clone)]
enum Declaration {
    /// A nested parameter group.
    Group,
    /// A parameter and its allowed types.
    Parameter(TypeSet),
}

#[derive(Debug, Clone)]
struct SchemaEntry {
    path: Path,
    declaration: Declaration,
    /// Index one past the last entry of this entry's subtree.
    end: usize,
}

/// A schema tree with every type declaration resolved.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    entries: Vec<SchemaEntry>,
}

impl CompiledSchema {
    /// Resolve every declaration in `schema`.
    pub fn compile(schema: &Value) -> Result<Self> {
        TreeError::require_object("schema", schema)?;

        let mut entries: Vec<SchemaEntry> = Vec::new();
        // Groups whose subtree is still being collected.
        let mut open: Vec<usize> = Vec::new();

        let mut walker = walk::walk(schema);
        while let Some(entry) = walker.next() {
            if entry.is_root() {
                continue;
            }

            let path = walker.path().clone();
            let index = entries.len();
            while let Some(&group) = open.last() {
                if entries[group].path.len() < entry.depth {
                    break;
                }
                entries[group].end = index;
                open.pop();
            }

            let declaration = match entry.kind() {
                NodeKind::Object => {
                    open.push(index);
                    Declaration::Group
                }
                _ => {
                    walker.skip_children();
                    Declaration::Parameter(TypeSet::from_declaration(entry.value, &path)?)
                }
            };

            entries.push(SchemaEntry {
                path,
                declaration,
                end: index + 1,
            });
        }

        let len = entries.len();
        for group in open {
            entries[group].end = len;
        }

        Ok(Self { entries })
    }

    /// Number of declared groups and parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths of every declared parameter (not groups), in schema order.
    pub fn parameters(&self) -> impl Iterator<Item = (&Path, &TypeSet)> {
        self.entries.iter().filter_map(|entry| match &entry.declaration {
            Declaration::Parameter(types) => Some((&entry.path, types)),
            Declaration::Group => None,
        })
    }
}

/// Checks parameter trees against schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    registry: TypeRegistry,
    mode: ValidationMode,
}

impl Validator {
    pub fn new(registry: TypeRegistry, mode: ValidationMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate `tree` against `schema`.
    pub fn validate(&self, tree: &Value, schema: &Value, requirement: Requirement) -> Result<()> {
        let compiled = CompiledSchema::compile(schema)?;
        self.validate_compiled(tree, &compiled, requirement)
    }

    /// Validate `tree` against an already compiled schema.
    pub fn validate_compiled(
        &self,
        tree: &Value,
        schema: &CompiledSchema,
        requirement: Requirement,
    ) -> Result<()> {
        TreeError::require_object("tree", tree)?;
        debug!(
            ?requirement,
            mode = ?self.mode,
            declarations = schema.len(),
            "validating parameter tree"
        );

        let mut violations = Violations::new();
        let mut i = 0;
        while i < schema.entries.len() {
            let entry = &schema.entries[i];
            match self.check_entry(tree, entry, requirement) {
                Ok(Step::Descend) => i += 1,
                Ok(Step::Skip) => i = entry.end,
                Err(error) => {
                    if self.mode == ValidationMode::FailFast {
                        return Err(error);
                    }
                    violations.push(error);
                    i = entry.end;
                }
            }
        }

        violations.into_result()
    }

    fn check_entry(
        &self,
        tree: &Value,
        entry: &SchemaEntry,
        requirement: Requirement,
    ) -> Result<Step> {
        let Some(value) = walk::get(tree, &entry.path) else {
            if requirement.is_required() {
                return Err(TreeError::MissingParameter {
                    path: entry.path.clone(),
                });
            }
            trace!(path = %entry.path, "optional parameter absent");
            return Ok(Step::Skip);
        };

        match &entry.declaration {
            Declaration::Group if value.is_object() => Ok(Step::Descend),
            Declaration::Group => Err(TreeError::TypeMismatch {
                path: entry.path.clone(),
                expected: TypeSet::single(TypeName::Dict),
                actual: walk::deep_clone(value),
            }),
            Declaration::Parameter(types) if self.registry.matches_any(types, value) => {
                trace!(path = %entry.path, %types, "parameter ok");
                Ok(Step::Skip)
            }
            Declaration::Parameter(types) => Err(TreeError::TypeMismatch {
                path: entry.path.clone(),
                expected: types.clone(),
                actual: walk::deep_clone(value),
            }),
        }
    }
}

enum Step {
    Descend,
    Skip,
}

/// Validate `tree` against `schema`, stopping at the first failure.
pub fn validate(tree: &Value, schema: &Value, requirement: Requirement) -> Result<()> {
    Validator::default().validate(tree, schema, requirement)
}

/// Validate `tree` against `schema`, reporting every failure of the pass.
pub fn validate_all(tree: &Value, schema: &Value, requirement: Requirement) -> Result<()> {
    Validator::new(TypeRegistry::default(), ValidationMode::CollectAll)
        .validate(tree, schema, requirement)
}
