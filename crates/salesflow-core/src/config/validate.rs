use std::collections::HashMap;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::{ConfigError, SalesflowResult};

pub(crate) fn validate_config(config: &PipelineConfig) -> SalesflowResult<()> {
    let named_paths: [(&str, &Path); 7] = [
        ("inputs.sales", config.inputs.sales.as_path()),
        ("inputs.customers", config.inputs.customers.as_path()),
        ("outputs.sales", config.outputs.sales.as_path()),
        ("outputs.customers", config.outputs.customers.as_path()),
        ("outputs.merged", config.outputs.merged.as_path()),
        ("outputs.aggregated", config.outputs.aggregated.as_path()),
        ("outputs.report", config.outputs.report.as_path()),
    ];

    let mut seen: HashMap<&Path, &str> = HashMap::new();
    for (name, path) in named_paths {
        if path.as_os_str().is_empty() {
            return Err(Box::new(ConfigError(format!("{name} cannot be empty"))));
        }
        if let Some(previous) = seen.insert(path, name) {
            return Err(Box::new(ConfigError(format!(
                "{name} and {previous} point to the same file: {}",
                path.display()
            ))));
        }
    }

    if let Some(summary) = &config.summary {
        if let Some(name) = seen.get(summary.as_path()) {
            return Err(Box::new(ConfigError(format!(
                "summary and {name} point to the same file: {}",
                summary.display()
            ))));
        }
    }

    Ok(())
}
