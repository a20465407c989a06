mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use salesflow_core::config::{ConfigOverrides, PipelineConfig};
use salesflow_core::{load_config, plan, run, validate, RunOptions, SalesflowResult, Stage};

use output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    name = "salesflow",
    version,
    about = "Checkpointed sales reporting pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the target stage, running only stages whose output is missing
    Run {
        #[command(flatten)]
        paths: PathArgs,
        #[arg(long, default_value = "report")]
        target: Stage,
        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show which stages a run would execute or skip
    Plan {
        #[command(flatten)]
        paths: PathArgs,
        #[arg(long, default_value = "report")]
        target: Stage,
        #[arg(long)]
        json: bool,
    },
    /// Check that a config file parses and resolves
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PathArgs {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    input_dir: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    sales_input: Option<PathBuf>,
    #[arg(long)]
    customers_input: Option<PathBuf>,
    #[arg(long)]
    sales_output: Option<PathBuf>,
    #[arg(long)]
    customers_output: Option<PathBuf>,
    #[arg(long)]
    merged_output: Option<PathBuf>,
    #[arg(long)]
    aggregated_output: Option<PathBuf>,
    #[arg(long)]
    report_output: Option<PathBuf>,
    #[arg(long)]
    sales_separator: Option<String>,
    #[arg(long)]
    customers_json_mode: Option<String>,
}

impl PathArgs {
    fn resolve(self, summary: Option<PathBuf>) -> SalesflowResult<PipelineConfig> {
        let file_layer = match &self.config {
            Some(path) => load_config(&resolve_path(path.clone())?)?,
            None => ConfigOverrides::default(),
        };
        let cli_layer = ConfigOverrides {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            sales_input: self.sales_input,
            customers_input: self.customers_input,
            sales_output: self.sales_output,
            customers_output: self.customers_output,
            merged_output: self.merged_output,
            aggregated_output: self.aggregated_output,
            report_output: self.report_output,
            sales_separator: self.sales_separator,
            customers_json_mode: self.customers_json_mode,
            summary,
        };
        file_layer.merge(cli_layer).resolve()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> SalesflowResult<ExitCode> {
    match command {
        Command::Run {
            paths,
            target,
            summary,
            quiet,
            verbose,
        } => {
            let config = paths.resolve(summary)?;
            let mode = OutputMode::from_flags(quiet, verbose);
            let outcome = run(&config, RunOptions { target })?;
            let stdout = output::format_run_output(&outcome, mode);
            if !stdout.is_empty() {
                println!("{stdout}");
            }
            if let Some(line) = output::format_failure(&outcome) {
                eprintln!("{line}");
            }
            Ok(ExitCode::from(outcome.status.exit_code() as u8))
        }
        Command::Plan {
            paths,
            target,
            json,
        } => {
            let config = paths.resolve(None)?;
            let entries = plan(&config, target);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", output::format_plan(&entries));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { config } => {
            let config_path = resolve_path(config)?;
            validate(&config_path)?;
            println!(
                "Config at {} is valid. You can now run 'salesflow run --config {}'",
                config_path.display(),
                config_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_path(path: PathBuf) -> SalesflowResult<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
