use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::stages::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    Skip,
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub stage: Stage,
    pub state: PlanState,
    pub output: PathBuf,
}

/// Lists what a run of `target` would do right now, in execution order,
/// without touching any file.
pub fn plan(config: &PipelineConfig, target: Stage) -> Vec<PlanEntry> {
    let mut visited = HashSet::new();
    let mut entries = Vec::new();
    visit(config, target, &mut visited, &mut entries);
    entries
}

fn visit(
    config: &PipelineConfig,
    stage: Stage,
    visited: &mut HashSet<Stage>,
    entries: &mut Vec<PlanEntry>,
) {
    if !visited.insert(stage) {
        return;
    }
    let output = stage.output_path(config).to_path_buf();
    if output.exists() {
        entries.push(PlanEntry {
            stage,
            state: PlanState::Skip,
            output,
        });
        return;
    }
    for dependency in stage.dependencies() {
        visit(config, *dependency, visited, entries);
    }
    entries.push(PlanEntry {
        stage,
        state: PlanState::Run,
        output,
    });
}
