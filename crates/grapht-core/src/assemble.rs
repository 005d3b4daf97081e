//! Assembly of a resolved parameter tree from schemas, defaults and user input.
//!
//! ```rust
//! use grapht_core::TreeAssembler;
//! use serde_json::json;
//!
//! let mut assembler = TreeAssembler::new();
//! assembler
//!     .add_required_input_types(json!({"x": "int"}))
//!     .add_optional_input_types(json!({}))
//!     .add_default_input(json!({"y": 5}))
//!     .add_user_input(json!({"x": 3}));
//!
//! let tree = assembler.assemble_tree().unwrap();
//! assert_eq!(tree, json!({"x": 3, "y": 5}));
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::AssemblerConfig;
use crate::defaults::merge_defaults;
use crate::error::{Result, TreeError};
use crate::validate::Requirement;
use crate::walk;

/// Collects the four input trees and assembles them on demand.
///
/// Inputs that were never added are treated as empty trees.
#[derive(Debug, Clone, Default)]
pub struct TreeAssembler {
    config: AssemblerConfig,
    required_types: Option<Value>,
    optional_types: Option<Value>,
    defaults: Option<Value>,
    user: Option<Value>,
}

impl TreeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Schema of parameters that must be present.
    pub fn add_required_input_types(&mut self, tree: Value) -> &mut Self {
        self.required_types = Some(tree);
        self
    }

    /// Schema of parameters that may be present.
    pub fn add_optional_input_types(&mut self, tree: Value) -> &mut Self {
        self.optional_types = Some(tree);
        self
    }

    /// Values for parameters the user leaves out.
    ///
    /// This need not cover every parameter, only the ones that have a default.
    pub fn add_default_input(&mut self, tree: Value) -> &mut Self {
        self.defaults = Some(tree);
        self
    }

    /// The parameters the user specified.
    pub fn add_user_input(&mut self, tree: Value) -> &mut Self {
        self.user = Some(tree);
        self
    }

    pub fn with_required_input_types(mut self, tree: Value) -> Self {
        self.add_required_input_types(tree);
        self
    }

    pub fn with_optional_input_types(mut self, tree: Value) -> Self {
        self.add_optional_input_types(tree);
        self
    }

    pub fn with_default_input(mut self, tree: Value) -> Self {
        self.add_default_input(tree);
        self
    }

    pub fn with_user_input(mut self, tree: Value) -> Self {
        self.add_user_input(tree);
        self
    }

    /// Validate the user tree and fill in defaults.
    ///
    /// The user tree is checked against the required schema, then the optional
    /// schema; a copy of it then receives the defaults. Nothing is returned if
    /// either pass fails.
    pub fn assemble_tree(&self) -> Result<Value> {
        let empty = Value::Object(Map::new());
        assemble_with(
            &self.config,
            self.required_types.as_ref().unwrap_or(&empty),
            self.optional_types.as_ref().unwrap_or(&empty),
            self.defaults.as_ref().unwrap_or(&empty),
            self.user.as_ref().unwrap_or(&empty),
        )
    }
}

/// Assemble with the default configuration.
pub fn assemble(
    required_types: &Value,
    optional_types: &Value,
    defaults: &Value,
    user: &Value,
) -> Result<Value> {
    assemble_with(
        &AssemblerConfig::default(),
        required_types,
        optional_types,
        defaults,
        user,
    )
}

/// Assemble with an explicit configuration.
pub fn assemble_with(
    config: &AssemblerConfig,
    required_types: &Value,
    optional_types: &Value,
    defaults: &Value,
    user: &Value,
) -> Result<Value> {
    TreeError::require_object("user", user)?;
    TreeError::require_object("defaults", defaults)?;

    let validator = config.validator();
    validator.validate(user, required_types, Requirement::Required)?;
    validator.validate(user, optional_types, Requirement::Optional)?;

    let mut assembled = walk::deep_clone(user);
    merge_defaults(&mut assembled, defaults)?;
    debug!("parameter tree assembled");
    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_missing_inputs_default_to_empty() {
        assert_eq!(TreeAssembler::new().assemble_tree().unwrap(), json!({}));

        let tree = TreeAssembler::new()
            .with_default_input(json!({"a": 1}))
            .assemble_tree()
            .unwrap();
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn test_required_pass_runs_before_optional_pass() {
        let result = TreeAssembler::new()
            .with_required_input_types(json!({"x": "int"}))
            .with_optional_input_types(json!({"y": "foo"}))
            .assemble_tree();
        assert!(matches!(result, Err(TreeError::MissingParameter { .. })));
    }

    #[test]
    fn test_config_is_applied() {
        let config = AssemblerConfig::default().with_validation(ValidationMode::CollectAll);
        let assembler = TreeAssembler::with_config(config)
            .with_required_input_types(json!({"a": "int", "b": "int"}));
        assert_eq!(assembler.config().validation, ValidationMode::CollectAll);

        let result = assembler.assemble_tree();

        match result {
            Err(TreeError::Invalid(violations)) => assert_eq!(violations.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_scalar_user_tree_rejected() {
        let result = assemble(&json!({}), &json!({}), &json!({}), &json!(3));
        assert!(matches!(
            result,
            Err(TreeError::InvalidArgument { argument, .. }) if argument == "user"
        ));
    }

    #[test]
    fn test_deep_user_tree_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut chain = json!("bottom");
                for _ in 0..100_000 {
                    let mut map = Map::new();
                    map.insert("n".to_string(), chain);
                    chain = Value::Object(map);
                }
                let mut user = Map::new();
                user.insert("root".to_string(), chain);
                let user = Value::Object(user);

                let tree = assemble(
                    &json!({"root": "dict"}),
                    &json!({}),
                    &json!({"root": {"n": {"filled": 1}}, "extra": true}),
                    &user,
                )
                .unwrap();

                let extra = tree["extra"].clone();
                let filled = tree["root"]["n"]["filled"].clone();
                let mut node = &tree["root"];
                let mut depth = 0;
                while let Some(next) = node.get("n") {
                    node = next;
                    depth += 1;
                }
                let bottom = node.clone();

                std::mem::forget(tree);
                std::mem::forget(user);
                (extra, filled, depth, bottom)
            })
            .unwrap();

        assert_eq!(
            handle.join().unwrap(),
            (json!(true), json!(1), 100_000, json!("bottom"))
        );
    }
}
