//! Type-name tokens accepted in schema trees and the predicates behind them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TreeError};
use crate::path::Path;

/// A type-name token a schema leaf may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    Str,
    Int,
    Float,
    List,
    Tuple,
    Dict,
    Bool,
    None,
}

impl TypeName {
    pub const ALL: [TypeName; 8] = [
        TypeName::Str,
        TypeName::Int,
        TypeName::Float,
        TypeName::List,
        TypeName::Tuple,
        TypeName::Dict,
        TypeName::Bool,
        TypeName::None,
    ];

    /// The token as written in schema trees.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Bool => "bool",
            Self::None => "None",
        }
    }

    /// Look up a token, failing with `UnsupportedType` at `path`.
    pub fn parse_at(token: &str, path: &Path) -> Result<Self> {
        token.parse().map_err(|_| TreeError::UnsupportedType {
            path: path.clone(),
            token: token.to_string(),
        })
    }

    /// The token that best describes a runtime value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Int,
            Value::String(_) => Self::Str,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Dict,
        }
    }
}

impl FromStr for TypeName {
    type Err = ();

    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == token)
            .ok_or(())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The allowed types of one schema leaf, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<TypeName>);

impl TypeSet {
    pub fn new(names: impl IntoIterator<Item = TypeName>) -> Self {
        let mut set = Vec::new();
        for name in names {
            if !set.contains(&name) {
                set.push(name);
            }
        }
        Self(set)
    }

    pub fn single(name: TypeName) -> Self {
        Self(vec![name])
    }

    /// Resolve a schema leaf declaration found at `path`.
    ///
    /// A declaration is a single token string or a non-empty array of token
    /// strings.
    pub fn from_declaration(declaration: &Value, path: &Path) -> Result<Self> {
        let unsupported = || TreeError::UnsupportedType {
            path: path.clone(),
            token: declaration.to_string(),
        };

        match declaration {
            Value::String(token) => Ok(Self::single(TypeName::parse_at(token, path)?)),
            Value::Array(tokens) if !tokens.is_empty() => {
                let mut names = Vec::with_capacity(tokens.len());
                for token in tokens {
                    let token = token.as_str().ok_or_else(unsupported)?;
                    names.push(TypeName::parse_at(token, path)?);
                }
                Ok(Self::new(names))
            }
            _ => Err(unsupported()),
        }
    }

    pub fn names(&self) -> &[TypeName] {
        &self.0
    }

    pub fn contains(&self, name: TypeName) -> bool {
        self.0.contains(&name)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", name)?;
        }
        Ok(())
    }
}

/// Knobs for how runtime values are matched against type names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TypeOptions {
    /// Let booleans satisfy `int` declarations.
    pub bool_is_int: bool,
}

/// Matches runtime values against type names.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRegistry {
    options: TypeOptions,
}

impl TypeRegistry {
    pub fn new(options: TypeOptions) -> Self {
        Self { options }
    }

    /// Whether `value` is an instance of `name`.
    pub fn matches(&self, name: TypeName, value: &Value) -> bool {
        match (name, value) {
            (TypeName::Str, Value::String(_)) => true,
            (TypeName::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (TypeName::Int, Value::Bool(_)) => self.options.bool_is_int,
            (TypeName::Float, Value::Number(n)) => n.is_f64(),
            // JSON has a single sequence form, so both names accept arrays.
            (TypeName::List | TypeName::Tuple, Value::Array(_)) => true,
            (TypeName::Dict, Value::Object(_)) => true,
            (TypeName::Bool, Value::Bool(_)) => true,
            (TypeName::None, Value::Null) => true,
            _ => false,
        }
    }

    /// Whether `value` is an instance of any member of `set`.
    pub fn matches_any(&self, set: &TypeSet, value: &Value) -> bool {
        set.names().iter().any(|name| self.matches(*name, value))
    }
}
