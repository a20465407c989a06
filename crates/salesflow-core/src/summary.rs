use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::io::write::write_atomic;
use crate::run::{RunOutcome, RunStatus, StageStatus};
use crate::stages::Stage;
use crate::SalesflowResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummaryReport {
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub stages: Vec<StageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunInfo {
    pub target: Stage,
    pub started_at: String,
    pub finished_at: String,
    pub duration_ms: u64,
    pub status: RunStatus,
    pub exit_code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StageEntry {
    pub stage: Stage,
    pub status: StageStatus,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn build_run_summary(
    outcome: &RunOutcome,
    started_at: String,
    duration_ms: u64,
) -> RunSummaryReport {
    let stages = outcome
        .stages
        .iter()
        .map(|stage| StageEntry {
            stage: stage.stage,
            status: stage.status,
            output: stage.output.display().to_string(),
            elapsed_ms: stage.elapsed_ms,
            error: stage.error.clone(),
        })
        .collect();

    RunSummaryReport {
        tool: ToolInfo {
            name: "salesflow".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunInfo {
            target: outcome.target,
            started_at,
            finished_at: now_rfc3339(),
            duration_ms,
            status: outcome.status,
            exit_code: outcome.status.exit_code(),
        },
        stages,
    }
}

pub fn write_run_summary(path: &Path, report: &RunSummaryReport) -> SalesflowResult<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;
    write_atomic(path, |file| {
        file.write_all(json.as_bytes())?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::StageOutcome;

    fn sample_outcome() -> RunOutcome {
        RunOutcome {
            target: Stage::Report,
            status: RunStatus::Failed,
            stages: vec![
                StageOutcome {
                    stage: Stage::LoadSales,
                    status: StageStatus::Skipped,
                    output: PathBuf::from("output/sales_loaded.csv"),
                    elapsed_ms: None,
                    error: None,
                },
                StageOutcome {
                    stage: Stage::LoadCustomers,
                    status: StageStatus::Failed,
                    output: PathBuf::from("output/customers_loaded.csv"),
                    elapsed_ms: Some(3),
                    error: Some("json_parse_error: expected json array or object at root".to_string()),
                },
            ],
            summary_path: None,
        }
    }

    #[test]
    fn summary_serializes_snake_case_statuses() {
        let report = build_run_summary(&sample_outcome(), now_rfc3339(), 5);
        let value = serde_json::to_value(&report).expect("serialize");

        assert_eq!(value["tool"]["name"], "salesflow");
        assert_eq!(value["run"]["target"], "report");
        assert_eq!(value["run"]["status"], "failed");
        assert_eq!(value["run"]["exit_code"], 1);
        assert_eq!(value["stages"][0]["stage"], "load_sales");
        assert_eq!(value["stages"][0]["status"], "skipped");
        assert!(value["stages"][0].get("elapsed_ms").is_none());
        assert_eq!(value["stages"][1]["elapsed_ms"], 3);
    }

    #[test]
    fn write_run_summary_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logs/run.summary.json");
        let report = build_run_summary(&sample_outcome(), now_rfc3339(), 5);
        write_run_summary(&path, &report).expect("write summary");

        let contents = std::fs::read_to_string(&path).expect("read summary");
        let parsed: RunSummaryReport = serde_json::from_str(&contents).expect("parse summary");
        assert_eq!(parsed.stages.len(), 2);
        assert_eq!(parsed.run.status, RunStatus::Failed);
    }
}
