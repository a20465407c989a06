use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const SALES: &str = "customer_id,amount\n1,10\n2,-5\n,7\n";
const CUSTOMERS: &str =
    r#"[{"customer_id": 1, "name": "Ada"}, {"customer_id": 2, "name": "Grace"}]"#;

fn seed_inputs(root: &Path) {
    let data = root.join("data");
    fs::create_dir_all(&data).expect("create data dir");
    fs::write(data.join("sales.csv"), SALES).expect("write sales");
    fs::write(data.join("customers.json"), CUSTOMERS).expect("write customers");
}

fn salesflow(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("salesflow").expect("binary");
    cmd.current_dir(root);
    cmd
}

#[test]
fn version_flag_prints_package_version() {
    let dir = tempfile::tempdir().expect("temp dir");

    salesflow(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(concat!(
            "salesflow ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn run_prints_one_line_per_executed_stage() {
    let dir = tempfile::tempdir().expect("temp dir");
    seed_inputs(dir.path());

    salesflow(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sales data loaded to output/sales_loaded.csv",
        ))
        .stdout(predicate::str::contains(
            "Customers data loaded to output/customers_loaded.csv",
        ))
        .stdout(predicate::str::contains(
            "Merged and validated data saved to output/merged_validated.csv",
        ))
        .stdout(predicate::str::contains(
            "Aggregated data saved to output/aggregated.csv",
        ))
        .stdout(predicate::str::contains(
            "Report generated at output/report.txt",
        ));

    let report = fs::read_to_string(dir.path().join("output/report.txt")).expect("report");
    assert!(report.contains("Total sales amount: 10"));
}

#[test]
fn rerun_is_silent() {
    let dir = tempfile::tempdir().expect("temp dir");
    seed_inputs(dir.path());

    salesflow(dir.path()).arg("run").assert().success();
    salesflow(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn path_overrides_redirect_outputs() {
    let dir = tempfile::tempdir().expect("temp dir");
    seed_inputs(dir.path());

    salesflow(dir.path())
        .args(["run", "--output-dir", "build", "--report-output", "final.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report generated at final.txt"));

    assert!(dir.path().join("build/aggregated.csv").exists());
    assert!(dir.path().join("final.txt").exists());
    assert!(!dir.path().join("output").exists());
}

#[test]
fn failed_stage_exits_non_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    seed_inputs(dir.path());
    fs::write(dir.path().join("data/customers.json"), "[1, 2]").expect("break customers");

    salesflow(dir.path())
        .arg("run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Sales data loaded"))
        .stderr(predicate::str::contains("FAILED load_customers:"));
    assert!(!dir.path().join("output/report.txt").exists());
}

#[test]
fn plan_reports_without_running() {
    let dir = tempfile::tempdir().expect("temp dir");
    seed_inputs(dir.path());

    salesflow(dir.path())
        .args(["plan", "--target", "merge_validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run  load_sales -> output/sales_loaded.csv"));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn unknown_target_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    salesflow(dir.path())
        .args(["run", "--target", "publish"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stage"));
}

#[test]
fn validate_accepts_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("pipeline.yml");
    fs::write(&config, "version: \"1\"\noutput_dir: \"out\"\n").expect("write config");

    salesflow(dir.path())
        .args(["validate", "--config", "pipeline.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn validate_rejects_unknown_keys() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("pipeline.yml");
    fs::write(&config, "version: \"1\"\nschedule: \"daily\"\n").expect("write config");

    salesflow(dir.path())
        .args(["validate", "--config", "pipeline.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field root.schedule"));
}
