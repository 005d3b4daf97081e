//! Assembly configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! validation = "collect-all"
//!
//! [types]
//! bool-is-int = true
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{TypeOptions, TypeRegistry};
use crate::validate::{ValidationMode, Validator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssemblerConfig {
    /// How runtime values are matched against declared types.
    pub types: TypeOptions,
    /// Fail at the first violation or collect every violation of a pass.
    pub validation: ValidationMode,
}

impl AssemblerConfig {
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn with_types(mut self, types: TypeOptions) -> Self {
        self.types = types;
        self
    }

    pub fn validator(&self) -> Validator {
        Validator::new(TypeRegistry::new(self.types), self.validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict_and_fail_fast() {
        let config = AssemblerConfig::default();
        assert!(!config.types.bool_is_int);
        assert_eq!(config.validation, ValidationMode::FailFast);
    }

    #[test]
    fn test_deserializes_kebab_case() {
        let config: AssemblerConfig = serde_json::from_value(serde_json::json!({
            "validation": "collect-all",
            "types": {"bool-is-int": true}
        }))
        .unwrap();

        assert_eq!(config.validation, ValidationMode::CollectAll);
        assert!(config.types.bool_is_int);
        assert_eq!(config.validator().mode(), ValidationMode::CollectAll);
    }
}
