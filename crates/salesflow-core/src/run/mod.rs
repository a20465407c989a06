use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::stages::Stage;
use crate::{summary, IoError, SalesflowResult, StageError};

mod plan;

pub use plan::{plan, PlanEntry, PlanState};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub target: Stage,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: Stage::Report,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Skipped,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failed => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    pub output: PathBuf,
    pub elapsed_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub target: Stage,
    pub status: RunStatus,
    /// Visited stages in the order they settled.
    pub stages: Vec<StageOutcome>,
    pub summary_path: Option<PathBuf>,
}

impl RunOutcome {
    pub fn executed(&self) -> impl Iterator<Item = &StageOutcome> {
        self.stages
            .iter()
            .filter(|outcome| outcome.status == StageStatus::Done)
    }

    pub fn failure(&self) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|outcome| outcome.status == StageStatus::Failed)
    }

    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|outcome| outcome.stage == stage)
            .map(|outcome| outcome.status)
    }
}

/// Builds `options.target`, running each missing dependency first.
///
/// A failing stage does not produce an `Err`: it is recorded in the outcome
/// with [`RunStatus::Failed`] and nothing after it runs. `Err` is reserved
/// for failures outside the stages, such as writing the run summary.
pub fn run(config: &PipelineConfig, options: RunOptions) -> SalesflowResult<RunOutcome> {
    let started_at = summary::now_rfc3339();
    let run_timer = Instant::now();

    let mut runner = Runner::new(config);
    let status = match runner.build(options.target) {
        Ok(()) => RunStatus::Success,
        Err(_) => RunStatus::Failed,
    };

    let mut outcome = RunOutcome {
        target: options.target,
        status,
        stages: runner.outcomes,
        summary_path: None,
    };

    if let Some(summary_path) = &config.summary {
        let duration_ms = run_timer.elapsed().as_millis() as u64;
        let report = summary::build_run_summary(&outcome, started_at, duration_ms);
        let written = summary::write_run_summary(summary_path, &report)?;
        outcome.summary_path = Some(written);
    }

    Ok(outcome)
}

struct Runner<'a> {
    config: &'a PipelineConfig,
    visited: HashSet<Stage>,
    outcomes: Vec<StageOutcome>,
}

impl<'a> Runner<'a> {
    fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            visited: HashSet::new(),
            outcomes: Vec::new(),
        }
    }

    fn build(&mut self, stage: Stage) -> Result<(), StageError> {
        if !self.visited.insert(stage) {
            return Ok(());
        }

        let output = stage.output_path(self.config).to_path_buf();
        if output.exists() {
            self.record(stage, StageStatus::Skipped, output, None, None);
            return Ok(());
        }

        for dependency in stage.dependencies() {
            self.build(*dependency)?;
        }

        let timer = Instant::now();
        let result = stage.execute(self.config).and_then(|()| {
            if output.exists() {
                Ok(())
            } else {
                Err(Box::new(IoError(format!(
                    "finished without writing {}",
                    output.display()
                ))) as Box<dyn std::error::Error + Send + Sync>)
            }
        });
        let elapsed_ms = Some(timer.elapsed().as_millis() as u64);

        match result {
            Ok(()) => {
                self.record(stage, StageStatus::Done, output, elapsed_ms, None);
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.record(
                    stage,
                    StageStatus::Failed,
                    output,
                    elapsed_ms,
                    Some(message.clone()),
                );
                Err(StageError::new(stage, message))
            }
        }
    }

    fn record(
        &mut self,
        stage: Stage,
        status: StageStatus,
        output: PathBuf,
        elapsed_ms: Option<u64>,
        error: Option<String>,
    ) {
        self.outcomes.push(StageOutcome {
            stage,
            status,
            output,
            elapsed_ms,
            error,
        });
    }
}
