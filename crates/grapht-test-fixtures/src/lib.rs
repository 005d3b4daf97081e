//! Test fixtures for grapht
//!
//! Each [`Scenario`] is one set of input trees plus the outcome assembly should
//! produce. [`TestFixtures::setup`] writes scenarios to disk as `tree_<name>/`
//! directories for tests that go through files.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// File names used inside a `tree_<name>/` directory.
pub const REQUIRED_FILE: &str = "required_types.json";
pub const OPTIONAL_FILE: &str = "optional_types.json";
pub const DEFAULTS_FILE: &str = "defaults.json";
pub const USER_FILE: &str = "user.json";
pub const EXPECTED_FILE: &str = "expected.json";

/// What assembling a scenario should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Tree(Value),
    MissingParameter(Vec<&'static str>),
    TypeMismatch(Vec<&'static str>),
    UnsupportedType(&'static str),
}

/// One set of assembly inputs.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub required: Value,
    pub optional: Value,
    pub defaults: Value,
    pub user: Value,
    pub expected: Expected,
}

/// Every scenario, successful ones first.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "default_fill",
            required: json!({"x": "int"}),
            optional: json!({}),
            defaults: json!({"y": 5}),
            user: json!({"x": 3}),
            expected: Expected::Tree(json!({"x": 3, "y": 5})),
        },
        Scenario {
            name: "union_type",
            required: json!({"x": ["int", "float"]}),
            optional: json!({}),
            defaults: json!({}),
            user: json!({"x": 2.5}),
            expected: Expected::Tree(json!({"x": 2.5})),
        },
        Scenario {
            name: "simulation",
            required: simulation_required(),
            optional: simulation_optional(),
            defaults: simulation_defaults(),
            user: json!({
                "model": {"name": "half_sarcomere", "geometry": {"length": 1100.0}},
                "protocol": {"time_steps": 2000, "dt": 0.001},
                "output": {"directory": "results", "formats": ["csv"]}
            }),
            expected: Expected::Tree(json!({
                "model": {
                    "name": "half_sarcomere",
                    "geometry": {"length": 1100.0, "filaments": 4},
                    "kinetics": {"scheme": "3state", "rates": [10.0, 20.0, 5.0]}
                },
                "protocol": {"time_steps": 2000, "dt": 0.001, "pause": null},
                "output": {"directory": "results", "formats": ["csv"], "overwrite": false}
            })),
        },
        Scenario {
            name: "missing_required",
            required: json!({"x": "int"}),
            optional: json!({}),
            defaults: json!({}),
            user: json!({}),
            expected: Expected::MissingParameter(vec!["x"]),
        },
        Scenario {
            name: "missing_nested_required",
            required: simulation_required(),
            optional: simulation_optional(),
            defaults: simulation_defaults(),
            user: json!({
                "model": {"name": "half_sarcomere", "geometry": {}},
                "protocol": {"time_steps": 2000, "dt": 0.001}
            }),
            expected: Expected::MissingParameter(vec!["model", "geometry", "length"]),
        },
        Scenario {
            name: "optional_wrong_type",
            required: simulation_required(),
            optional: simulation_optional(),
            defaults: simulation_defaults(),
            user: json!({
                "model": {"name": "half_sarcomere", "geometry": {"length": 1100.0}},
                "protocol": {"time_steps": 2000, "dt": 0.001},
                "output": {"overwrite": "yes"}
            }),
            expected: Expected::TypeMismatch(vec!["output", "overwrite"]),
        },
        Scenario {
            name: "unsupported_type",
            required: json!({}),
            optional: json!({"x": "foo"}),
            defaults: json!({}),
            user: json!({}),
            expected: Expected::UnsupportedType("foo"),
        },
    ]
}

/// Look up a scenario by name.
pub fn scenario(name: &str) -> Option<Scenario> {
    scenarios().into_iter().find(|s| s.name == name)
}

fn simulation_required() -> Value {
    json!({
        "model": {"name": "str", "geometry": {"length": ["int", "float"]}},
        "protocol": {"time_steps": "int", "dt": "float"}
    })
}

fn simulation_optional() -> Value {
    json!({
        "model": {"kinetics": {"scheme": "str", "rates": "list"}},
        "protocol": {"pause": ["float", "None"]},
        "output": {"directory": "str", "formats": "list", "overwrite": "bool"}
    })
}

fn simulation_defaults() -> Value {
    json!({
        "model": {
            "geometry": {"filaments": 4},
            "kinetics": {"scheme": "3state", "rates": [10.0, 20.0, 5.0]}
        },
        "protocol": {"pause": null},
        "output": {"directory": "output", "formats": ["csv", "json"], "overwrite": false}
    })
}

/// Scenarios written to a temporary directory.
pub struct TestFixtures {
    temp_dir: Option<tempfile::TempDir>,
}

impl Default for TestFixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixtures {
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Write every scenario into a fresh temporary directory and return its path.
    ///
    /// The directory lives as long as this `TestFixtures`.
    pub fn setup(&mut self) -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        for scenario in scenarios() {
            write_scenario(&path, &scenario);
        }

        self.temp_dir = Some(dir);
        path
    }
}

/// Directory a scenario is written to under `base`.
pub fn scenario_dir(base: &Path, name: &str) -> PathBuf {
    base.join(format!("tree_{}", name))
}

fn write_scenario(base: &Path, scenario: &Scenario) {
    let dir = scenario_dir(base, scenario.name);
    fs::create_dir_all(&dir).unwrap();

    write_json(&dir.join(REQUIRED_FILE), &scenario.required);
    write_json(&dir.join(OPTIONAL_FILE), &scenario.optional);
    write_json(&dir.join(DEFAULTS_FILE), &scenario.defaults);
    write_json(&dir.join(USER_FILE), &scenario.user);
    if let Expected::Tree(tree) = &scenario.expected {
        write_json(&dir.join(EXPECTED_FILE), tree);
    }
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}
