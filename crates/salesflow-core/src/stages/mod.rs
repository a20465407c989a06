//! The five pipeline stages and their static dependency table.

pub mod aggregate;
pub mod load;
pub mod merge;
pub mod report;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::{ConfigError, SalesflowResult};

pub const CUSTOMER_ID: &str = "customer_id";
pub const AMOUNT: &str = "amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LoadSales,
    LoadCustomers,
    MergeValidate,
    Aggregate,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::LoadSales,
        Stage::LoadCustomers,
        Stage::MergeValidate,
        Stage::Aggregate,
        Stage::Report,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::LoadSales => "load_sales",
            Stage::LoadCustomers => "load_customers",
            Stage::MergeValidate => "merge_validate",
            Stage::Aggregate => "aggregate",
            Stage::Report => "report",
        }
    }

    /// Stages that must be complete before this one runs, in visiting order.
    pub fn dependencies(self) -> &'static [Stage] {
        match self {
            Stage::LoadSales | Stage::LoadCustomers => &[],
            Stage::MergeValidate => &[Stage::LoadSales, Stage::LoadCustomers],
            Stage::Aggregate => &[Stage::MergeValidate],
            Stage::Report => &[Stage::Aggregate],
        }
    }

    /// The checkpoint file whose existence marks this stage complete.
    pub fn output_path(self, config: &PipelineConfig) -> &Path {
        match self {
            Stage::LoadSales => config.outputs.sales.as_path(),
            Stage::LoadCustomers => config.outputs.customers.as_path(),
            Stage::MergeValidate => config.outputs.merged.as_path(),
            Stage::Aggregate => config.outputs.aggregated.as_path(),
            Stage::Report => config.outputs.report.as_path(),
        }
    }

    pub(crate) fn execute(self, config: &PipelineConfig) -> SalesflowResult<()> {
        let outputs = &config.outputs;
        match self {
            Stage::LoadSales => load::load_sales(
                &config.inputs.sales,
                config.options.sales_separator,
                &outputs.sales,
            ),
            Stage::LoadCustomers => load::load_customers(
                &config.inputs.customers,
                config.options.customers_json_mode,
                &outputs.customers,
            ),
            Stage::MergeValidate => {
                merge::merge_and_validate(&outputs.sales, &outputs.customers, &outputs.merged)
            }
            Stage::Aggregate => aggregate::aggregate(&outputs.merged, &outputs.aggregated),
            Stage::Report => report::generate_report(&outputs.aggregated, &outputs.report),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == normalized)
            .ok_or_else(|| {
                let allowed = Stage::ALL.map(Stage::name).join(", ");
                ConfigError(format!("unknown stage {value:?} (allowed: {allowed})"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().expect("parse"), stage);
        }
        assert_eq!("merge-validate".parse::<Stage>().expect("dash"), Stage::MergeValidate);
        assert!("publish".parse::<Stage>().is_err());
    }

    #[test]
    fn dependencies_form_the_report_chain() {
        assert_eq!(Stage::Report.dependencies(), &[Stage::Aggregate]);
        assert_eq!(Stage::Aggregate.dependencies(), &[Stage::MergeValidate]);
        assert_eq!(
            Stage::MergeValidate.dependencies(),
            &[Stage::LoadSales, Stage::LoadCustomers]
        );
        assert!(Stage::LoadSales.dependencies().is_empty());
        assert!(Stage::LoadCustomers.dependencies().is_empty());
    }
}
