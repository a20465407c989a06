use std::path::{Path, PathBuf};

use yaml_rust2::yaml::Hash;
use yaml_rust2::Yaml;

use crate::config::yaml_decode::{hash_get, load_yaml, validate_known_keys, yaml_hash, yaml_string};
use crate::config::{resolve_local_path, ConfigOverrides};
use crate::{ConfigError, SalesflowResult};

const ROOT_KEYS: &[&str] = &[
    "version",
    "input_dir",
    "output_dir",
    "inputs",
    "outputs",
    "options",
    "summary",
];
const INPUT_KEYS: &[&str] = &["sales", "customers"];
const OUTPUT_KEYS: &[&str] = &["sales", "customers", "merged", "aggregated", "report"];
const OPTION_KEYS: &[&str] = &["sales_separator", "customers_json_mode"];

pub(crate) fn parse_config(path: &Path) -> SalesflowResult<ConfigOverrides> {
    let docs = load_yaml(path)?;
    if docs.is_empty() {
        return Err(Box::new(ConfigError("YAML is empty".to_string())));
    }
    if docs.len() > 1 {
        return Err(Box::new(ConfigError(
            "YAML contains multiple documents; expected one".to_string(),
        )));
    }
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_root(&docs[0], config_dir)
}

fn parse_root(doc: &Yaml, config_dir: &Path) -> SalesflowResult<ConfigOverrides> {
    let root = yaml_hash(doc, "root")?;
    validate_known_keys(root, "root", ROOT_KEYS)?;
    let version = opt_string(root, "version", "root")?.unwrap_or_default();
    if version.trim().is_empty() {
        return Err(Box::new(ConfigError("version is required".to_string())));
    }

    let mut overrides = ConfigOverrides {
        input_dir: opt_path(root, "input_dir", "root", config_dir)?,
        output_dir: opt_path(root, "output_dir", "root", config_dir)?,
        summary: opt_path(root, "summary", "root", config_dir)?,
        ..ConfigOverrides::default()
    };

    if let Some(inputs) = opt_hash(root, "inputs", "root")? {
        validate_known_keys(inputs, "inputs", INPUT_KEYS)?;
        overrides.sales_input = opt_path(inputs, "sales", "inputs", config_dir)?;
        overrides.customers_input = opt_path(inputs, "customers", "inputs", config_dir)?;
    }

    if let Some(outputs) = opt_hash(root, "outputs", "root")? {
        validate_known_keys(outputs, "outputs", OUTPUT_KEYS)?;
        overrides.sales_output = opt_path(outputs, "sales", "outputs", config_dir)?;
        overrides.customers_output = opt_path(outputs, "customers", "outputs", config_dir)?;
        overrides.merged_output = opt_path(outputs, "merged", "outputs", config_dir)?;
        overrides.aggregated_output = opt_path(outputs, "aggregated", "outputs", config_dir)?;
        overrides.report_output = opt_path(outputs, "report", "outputs", config_dir)?;
    }

    if let Some(options) = opt_hash(root, "options", "root")? {
        validate_known_keys(options, "options", OPTION_KEYS)?;
        overrides.sales_separator = opt_string(options, "sales_separator", "options")?;
        overrides.customers_json_mode = opt_string(options, "customers_json_mode", "options")?;
    }

    Ok(overrides)
}

fn opt_hash<'a>(hash: &'a Hash, key: &str, ctx: &str) -> SalesflowResult<Option<&'a Hash>> {
    match hash_get(hash, key) {
        None | Some(Yaml::Null) | Some(Yaml::BadValue) => Ok(None),
        Some(value) => Ok(Some(yaml_hash(value, &format!("{ctx}.{key}"))?)),
    }
}

fn opt_string(hash: &Hash, key: &str, ctx: &str) -> SalesflowResult<Option<String>> {
    match hash_get(hash, key) {
        None | Some(Yaml::Null) | Some(Yaml::BadValue) => Ok(None),
        Some(value) => Ok(Some(yaml_string(value, &format!("{ctx}.{key}"))?)),
    }
}

fn opt_path(
    hash: &Hash,
    key: &str,
    ctx: &str,
    config_dir: &Path,
) -> SalesflowResult<Option<PathBuf>> {
    let Some(raw) = opt_string(hash, key, ctx)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Err(Box::new(ConfigError(format!("{ctx}.{key} cannot be empty"))));
    }
    Ok(Some(resolve_local_path(config_dir, &raw)))
}
