use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use salesflow_core::config::{ConfigOverrides, JsonMode};
use salesflow_core::{load_config, validate};

fn write_temp_config(contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    dir.push(format!("salesflow-config-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("pipeline.yml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn full_config_resolves_every_path() {
    let path = write_temp_config(
        r#"
version: "1"
input_dir: "in"
output_dir: "out"
inputs:
  customers: "crm/customers.ndjson"
outputs:
  report: "reports/sales.txt"
options:
  sales_separator: ";"
  customers_json_mode: "ndjson"
summary: "out/run.summary.json"
"#,
    );
    let dir = path.parent().expect("config dir").to_path_buf();

    let config = validate(&path).expect("valid config");
    assert_eq!(config.inputs.sales, dir.join("in/sales.csv"));
    assert_eq!(config.inputs.customers, dir.join("crm/customers.ndjson"));
    assert_eq!(config.outputs.sales, dir.join("out/sales_loaded.csv"));
    assert_eq!(config.outputs.merged, dir.join("out/merged_validated.csv"));
    assert_eq!(config.outputs.report, dir.join("reports/sales.txt"));
    assert_eq!(config.options.sales_separator, b';');
    assert_eq!(config.options.customers_json_mode, JsonMode::Ndjson);
    assert_eq!(config.summary, Some(dir.join("out/run.summary.json")));
}

#[test]
fn cli_layer_overrides_file_layer() {
    let path = write_temp_config(
        r#"
version: "1"
output_dir: "out"
options:
  sales_separator: ";"
"#,
    );
    let file_layer = load_config(&path).expect("parse config");
    let cli_layer = ConfigOverrides {
        merged_output: Some(PathBuf::from("/tmp/merged.csv")),
        sales_separator: Some(",".to_string()),
        ..ConfigOverrides::default()
    };

    let config = file_layer.merge(cli_layer).resolve().expect("resolve");
    assert_eq!(config.outputs.merged, PathBuf::from("/tmp/merged.csv"));
    assert_eq!(config.options.sales_separator, b',');
    assert!(config.outputs.aggregated.ends_with("out/aggregated.csv"));
}

#[test]
fn colliding_outputs_fail_validation() {
    let path = write_temp_config(
        r#"
version: "1"
outputs:
  aggregated: "out/same.csv"
  merged: "out/same.csv"
"#,
    );
    let err = validate(&path).expect_err("collision");
    assert!(err
        .to_string()
        .contains("outputs.aggregated and outputs.merged point to the same file"));
}

#[test]
fn invalid_json_mode_fails_validation() {
    let path = write_temp_config(
        r#"
version: "1"
options:
  customers_json_mode: "xml"
"#,
    );
    let err = validate(&path).expect_err("bad mode");
    assert!(err.to_string().contains("customers_json_mode=xml"));
}

#[test]
fn non_map_root_is_rejected() {
    let path = write_temp_config("- just\n- a list\n");
    let err = load_config(&path).expect_err("list root");
    assert_eq!(err.to_string(), "expected map at root");
}
