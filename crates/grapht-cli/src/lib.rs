//! File handling around grapht-core for the `grapht` command

use anyhow::{Context, Result};
use grapht_core::{
    compare, compare_symmetric, flatten_tree, unflatten_tree, AssemblerConfig, Comparison,
    LeafRecord, TreeAssembler,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Input files for `grapht assemble`; any of them may be left out.
#[derive(Debug, Clone, Default)]
pub struct AssembleInputs {
    pub required: Option<PathBuf>,
    pub optional: Option<PathBuf>,
    pub defaults: Option<PathBuf>,
    pub user: Option<PathBuf>,
}

/// Load an assembler configuration from a TOML file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AssemblerConfig> {
    let Some(path) = path else {
        return Ok(AssemblerConfig::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AssemblerConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    debug!(?config, "loaded configuration");
    Ok(config)
}

/// Read and parse a JSON tree.
pub fn read_tree(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn read_optional_tree(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) => read_tree(path),
        None => Ok(Value::Object(Map::new())),
    }
}

/// Pretty-print `value` as JSON to `output`, or stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Validate the user file and fill in defaults.
pub fn assemble_files(config: &AssemblerConfig, inputs: &AssembleInputs) -> Result<Value> {
    let mut assembler = TreeAssembler::with_config(*config);
    assembler
        .add_required_input_types(read_optional_tree(inputs.required.as_deref())?)
        .add_optional_input_types(read_optional_tree(inputs.optional.as_deref())?)
        .add_default_input(read_optional_tree(inputs.defaults.as_deref())?)
        .add_user_input(read_optional_tree(inputs.user.as_deref())?);

    let tree = assembler.assemble_tree().with_context(|| match &inputs.user {
        Some(user) => format!("Parameters in {} are invalid", user.display()),
        None => "Parameters are invalid".to_string(),
    })?;
    info!("Assembled parameter tree");
    Ok(tree)
}

/// Flatten the tree stored in `input` into leaf records.
pub fn flatten_file(input: &Path) -> Result<Vec<LeafRecord>> {
    let tree = read_tree(input)?;
    let records = flatten_tree(&tree)
        .with_context(|| format!("Failed to flatten {}", input.display()))?;
    info!("Flattened {} into {} records", input.display(), records.len());
    Ok(records)
}

/// Rebuild a tree from the leaf records stored in `input`.
pub fn unflatten_file(input: &Path) -> Result<Value> {
    let records: Vec<LeafRecord> = serde_json::from_value(read_tree(input)?)
        .with_context(|| format!("{} is not a list of leaf records", input.display()))?;
    unflatten_tree(&records).with_context(|| format!("Failed to unflatten {}", input.display()))
}

/// Compare the trees stored in two files.
pub fn compare_files(left: &Path, right: &Path, symmetric: bool) -> Result<Comparison> {
    let left_tree = read_tree(left)?;
    let right_tree = read_tree(right)?;
    let comparison = if symmetric {
        compare_symmetric(&left_tree, &right_tree)
    } else {
        compare(&left_tree, &right_tree)
    };
    Ok(comparison)
}
