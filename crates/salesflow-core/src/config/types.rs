use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, SalesflowResult};

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Fully resolved pipeline settings. Every path is independently overridable
/// through [`ConfigOverrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    pub options: SourceOptions,
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub sales: PathBuf,
    pub customers: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub sales: PathBuf,
    pub customers: PathBuf,
    pub merged: PathBuf,
    pub aggregated: PathBuf,
    pub report: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    pub sales_separator: u8,
    pub customers_json_mode: JsonMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMode {
    /// A JSON array of records, or a single root record.
    #[default]
    Array,
    /// One JSON record per non-empty line.
    Ndjson,
}

impl JsonMode {
    pub const ALLOWED: &'static [&'static str] = &["array", "ndjson"];

    pub fn parse(value: &str) -> SalesflowResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "array" => Ok(JsonMode::Array),
            "ndjson" => Ok(JsonMode::Ndjson),
            other => Err(Box::new(ConfigError(format!(
                "options.customers_json_mode={} is unsupported (allowed: {})",
                other,
                Self::ALLOWED.join(", ")
            )))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonMode::Array => "array",
            JsonMode::Ndjson => "ndjson",
        }
    }
}

impl fmt::Display for JsonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            sales_separator: b',',
            customers_json_mode: JsonMode::Array,
        }
    }
}

impl PipelineConfig {
    /// Default layout rooted at the given input and output directories.
    pub fn with_dirs(input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            inputs: InputPaths {
                sales: input_dir.join("sales.csv"),
                customers: input_dir.join("customers.json"),
            },
            outputs: OutputPaths {
                sales: output_dir.join("sales_loaded.csv"),
                customers: output_dir.join("customers_loaded.csv"),
                merged: output_dir.join("merged_validated.csv"),
                aggregated: output_dir.join("aggregated.csv"),
                report: output_dir.join("report.txt"),
            },
            options: SourceOptions::default(),
            summary: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_dirs(Path::new(DEFAULT_INPUT_DIR), Path::new(DEFAULT_OUTPUT_DIR))
    }
}

/// One layer of optional settings. Layers are merged with [`ConfigOverrides::merge`]
/// (later layer wins per field) and then resolved against the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub sales_input: Option<PathBuf>,
    pub customers_input: Option<PathBuf>,
    pub sales_output: Option<PathBuf>,
    pub customers_output: Option<PathBuf>,
    pub merged_output: Option<PathBuf>,
    pub aggregated_output: Option<PathBuf>,
    pub report_output: Option<PathBuf>,
    pub sales_separator: Option<String>,
    pub customers_json_mode: Option<String>,
    pub summary: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: other.input_dir.or(self.input_dir),
            output_dir: other.output_dir.or(self.output_dir),
            sales_input: other.sales_input.or(self.sales_input),
            customers_input: other.customers_input.or(self.customers_input),
            sales_output: other.sales_output.or(self.sales_output),
            customers_output: other.customers_output.or(self.customers_output),
            merged_output: other.merged_output.or(self.merged_output),
            aggregated_output: other.aggregated_output.or(self.aggregated_output),
            report_output: other.report_output.or(self.report_output),
            sales_separator: other.sales_separator.or(self.sales_separator),
            customers_json_mode: other.customers_json_mode.or(self.customers_json_mode),
            summary: other.summary.or(self.summary),
        }
    }

    /// Applies this layer over the defaults and validates the result.
    ///
    /// An explicit file path always beats the path derived from a directory,
    /// whichever layer the directory came from.
    pub fn resolve(self) -> SalesflowResult<PipelineConfig> {
        let input_dir = self
            .input_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let mut config = PipelineConfig::with_dirs(&input_dir, &output_dir);

        if let Some(path) = self.sales_input {
            config.inputs.sales = path;
        }
        if let Some(path) = self.customers_input {
            config.inputs.customers = path;
        }
        if let Some(path) = self.sales_output {
            config.outputs.sales = path;
        }
        if let Some(path) = self.customers_output {
            config.outputs.customers = path;
        }
        if let Some(path) = self.merged_output {
            config.outputs.merged = path;
        }
        if let Some(path) = self.aggregated_output {
            config.outputs.aggregated = path;
        }
        if let Some(path) = self.report_output {
            config.outputs.report = path;
        }
        if let Some(separator) = self.sales_separator.as_deref() {
            config.options.sales_separator = parse_separator(separator)?;
        }
        if let Some(mode) = self.customers_json_mode.as_deref() {
            config.options.customers_json_mode = JsonMode::parse(mode)?;
        }
        config.summary = self.summary;

        super::validate_config(&config)?;
        Ok(config)
    }
}

fn parse_separator(value: &str) -> SalesflowResult<u8> {
    let unescaped = match value {
        "\\t" => "\t",
        other => other,
    };
    let bytes = unescaped.as_bytes();
    if bytes.len() != 1 {
        return Err(Box::new(ConfigError(format!(
            "options.sales_separator must be a single byte, got {value:?}"
        ))));
    }
    Ok(bytes[0])
}
