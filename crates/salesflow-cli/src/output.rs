use std::path::Path;

use salesflow_core::{PlanEntry, PlanState, RunOutcome, Stage, StageOutcome, StageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Default,
    Quiet,
    Verbose,
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Default
        }
    }
}

/// Stdout lines for a finished run. Skipped stages only show in verbose mode.
pub fn format_run_output(outcome: &RunOutcome, mode: OutputMode) -> String {
    if mode == OutputMode::Quiet {
        return String::new();
    }

    let mut lines = Vec::new();
    for stage in &outcome.stages {
        match stage.status {
            StageStatus::Done => lines.push(format_done_line(stage, mode)),
            StageStatus::Skipped if mode == OutputMode::Verbose => lines.push(format!(
                "skipped {} ({} exists)",
                stage.stage,
                stage.output.display()
            )),
            StageStatus::Skipped | StageStatus::Failed => {}
        }
    }

    if mode == OutputMode::Verbose {
        if let Some(path) = &outcome.summary_path {
            lines.push(format!("Run summary: {}", path.display()));
        }
    }

    lines.join("\n")
}

pub fn format_failure(outcome: &RunOutcome) -> Option<String> {
    let failed = outcome.failure()?;
    Some(format!(
        "FAILED {}: {}",
        failed.stage,
        failed.error.as_deref().unwrap_or("unknown error")
    ))
}

pub fn format_plan(entries: &[PlanEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} {} -> {}",
                format_plan_state(entry.state),
                entry.stage,
                entry.output.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_done_line(stage: &StageOutcome, mode: OutputMode) -> String {
    let mut line = completion_message(stage.stage, &stage.output);
    if mode == OutputMode::Verbose {
        if let Some(ms) = stage.elapsed_ms {
            line.push_str(&format!(" (elapsed_ms={ms})"));
        }
    }
    line
}

fn completion_message(stage: Stage, output: &Path) -> String {
    let output = output.display();
    match stage {
        Stage::LoadSales => format!("Sales data loaded to {output}"),
        Stage::LoadCustomers => format!("Customers data loaded to {output}"),
        Stage::MergeValidate => format!("Merged and validated data saved to {output}"),
        Stage::Aggregate => format!("Aggregated data saved to {output}"),
        Stage::Report => format!("Report generated at {output}"),
    }
}

fn format_plan_state(state: PlanState) -> &'static str {
    match state {
        PlanState::Skip => "skip",
        PlanState::Run => "run ",
    }
}
