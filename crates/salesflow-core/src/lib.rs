use std::path::Path;

pub mod config;
mod errors;
pub mod io;
pub mod run;
pub mod stages;
pub mod summary;
mod warnings;

pub use errors::{ConfigError, IoError, RunError, StageError};
pub use run::{
    plan, run, PlanEntry, PlanState, RunOptions, RunOutcome, RunStatus, StageOutcome, StageStatus,
};
pub use stages::Stage;

pub type SalesflowResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Parses a YAML config file into the override layer it describes.
///
/// Relative paths in the file are resolved against the file's directory.
pub fn load_config(config_path: &Path) -> SalesflowResult<config::ConfigOverrides> {
    config::parse_config(config_path)
}

/// Parses a config file and checks that it resolves to a usable pipeline.
pub fn validate(config_path: &Path) -> SalesflowResult<config::PipelineConfig> {
    let overrides = load_config(config_path)?;
    overrides.resolve()
}
