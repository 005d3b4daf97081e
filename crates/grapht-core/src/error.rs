//! Error types for grapht-core.
//!
//! Every failure the engine can raise is a [`TreeError`]. Validation can also
//! run in collect-all mode, in which case the individual failures of a pass are
//! gathered into [`Violations`] and returned as [`TreeError::Invalid`].

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::path::Path;
use crate::types::{TypeName, TypeSet};

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug, Clone)]
pub enum TreeError {
    /// A top-level argument is not usable as a tree.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// A schema declares a type-name token the registry does not know.
    #[error("unsupported type {token} declared at '{path}'")]
    UnsupportedType { path: Path, token: String },

    /// A required parameter has no value.
    #[error("parameter '{path}' is required but not specified")]
    MissingParameter { path: Path },

    /// A parameter holds a value of a type the schema does not allow.
    #[error(
        "parameter '{path}' is not of the correct data type: expected {expected}, found {} ({actual})",
        TypeName::of(.actual)
    )]
    TypeMismatch {
        path: Path,
        expected: TypeSet,
        actual: Value,
    },

    /// Several violations collected in one validation pass.
    #[error("{0}")]
    Invalid(Violations),
}

impl TreeError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// The path the error points at, when it has one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UnsupportedType { path, .. }
            | Self::MissingParameter { path }
            | Self::TypeMismatch { path, .. } => Some(path),
            Self::InvalidArgument { .. } | Self::Invalid(_) => None,
        }
    }

    /// Fail with `InvalidArgument` unless `value` is an object.
    pub(crate) fn require_object(argument: &str, value: &Value) -> Result<()> {
        if value.is_object() {
            Ok(())
        } else {
            Err(Self::invalid_argument(
                argument,
                format!("expected a dict tree, found {}", TypeName::of(value)),
            ))
        }
    }
}

/// A collection of validation failures, in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct Violations {
    pub errors: Vec<TreeError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: TreeError) {
        match error {
            TreeError::Invalid(nested) => self.errors.extend(nested.errors),
            error => self.errors.push(error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeError> {
        self.errors.iter()
    }

    /// `Ok` when nothing was collected, a single error when exactly one was,
    /// and `TreeError::Invalid` otherwise.
    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(TreeError::Invalid(self)),
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else if self.errors.len() == 1 {
            write!(f, "Validation error: {}", self.errors[0])
        } else {
            writeln!(f, "{} validation errors:", self.errors.len())?;
            for (i, error) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, error)?;
            }
            Ok(())
        }
    }
}

impl IntoIterator for Violations {
    type Item = TreeError;
    type IntoIter = std::vec::IntoIter<TreeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a TreeError;
    type IntoIter = std::slice::Iter<'a, TreeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(keys: &[&str]) -> Path {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_type_mismatch_display() {
        let error = TreeError::TypeMismatch {
            path: path(&["solver", "tolerance"]),
            expected: TypeSet::new([TypeName::Int, TypeName::Float]),
            actual: json!("tight"),
        };

        let display = error.to_string();
        assert!(display.contains("solver.tolerance"));
        assert!(display.contains("int | float"));
        assert!(display.contains("found str"));
    }

    #[test]
    fn test_violations_flatten_nested_collections() {
        let mut inner = Violations::new();
        inner.push(TreeError::MissingParameter { path: path(&["a"]) });
        inner.push(TreeError::MissingParameter { path: path(&["b"]) });

        let mut outer = Violations::new();
        outer.push(TreeError::Invalid(inner));
        outer.push(TreeError::MissingParameter { path: path(&["c"]) });

        assert_eq!(outer.len(), 3);
        let display = outer.to_string();
        assert!(display.starts_with("3 validation errors:"));
        assert!(display.contains("  3. parameter 'c' is required"));
    }

    #[test]
    fn test_into_result_unwraps_single_error() {
        assert!(Violations::new().into_result().is_ok());

        let mut one = Violations::new();
        one.push(TreeError::MissingParameter { path: path(&["x"]) });
        match one.into_result() {
            Err(TreeError::MissingParameter { path: p }) => assert_eq!(p, path(&["x"])),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
