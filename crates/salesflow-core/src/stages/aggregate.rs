use std::fmt;
use std::path::Path;

use polars::prelude::{ChunkAgg, Column, DataFrame, DataType, NamedFrom, Series};

use crate::io::{read, write};
use crate::stages::{AMOUNT, CUSTOMER_ID};
use crate::{RunError, SalesflowResult};

pub const TOTAL_SALES: &str = "total_sales";
pub const TOTAL_CUSTOMERS: &str = "total_customers";

/// A sales total keeps the integer type of the amount column when it has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Int(value) => write!(f, "{value}"),
            Amount::Float(value) => write!(f, "{}", format_float(*value)),
        }
    }
}

/// Floats always print a fractional part (`10.0`, not `10`). Very large and
/// very small magnitudes switch to exponent form with a signed, two-digit
/// exponent (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let text = format!("{value:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesSummary {
    pub total_sales: Amount,
    pub total_customers: u64,
}

impl SalesSummary {
    pub fn to_dataframe(&self) -> SalesflowResult<DataFrame> {
        let total_sales: Column = match self.total_sales {
            Amount::Int(value) => Series::new(TOTAL_SALES.into(), [value]).into(),
            Amount::Float(value) => Series::new(TOTAL_SALES.into(), [value]).into(),
        };
        let total_customers: Column =
            Series::new(TOTAL_CUSTOMERS.into(), [self.total_customers]).into();
        Ok(DataFrame::new(vec![total_sales, total_customers])?)
    }
}

pub fn aggregate(merged_path: &Path, output_path: &Path) -> SalesflowResult<()> {
    let df = read::read_csv_file(merged_path, b',')?;
    let summary = summarize(&df)?;
    let mut summary_df = summary.to_dataframe()?;
    write::write_csv_file(&mut summary_df, output_path)?;
    Ok(())
}

pub fn summarize(df: &DataFrame) -> SalesflowResult<SalesSummary> {
    Ok(SalesSummary {
        total_sales: total_amount(df)?,
        total_customers: distinct_customers(df)?,
    })
}

fn total_amount(df: &DataFrame) -> SalesflowResult<Amount> {
    let column = df
        .column(AMOUNT)
        .map_err(|err| RunError(format!("amount column not found: {err}")))?;
    if df.height() == 0 {
        return Ok(Amount::Int(0));
    }
    let series = column.as_materialized_series();
    if series.dtype().is_integer() {
        let values = series.cast(&DataType::Int64)?;
        return Ok(Amount::Int(values.i64()?.sum().unwrap_or(0)));
    }
    let values = series
        .strict_cast(&DataType::Float64)
        .map_err(|err| RunError(format!("amount column is not numeric: {err}")))?;
    Ok(Amount::Float(values.f64()?.sum().unwrap_or(0.0)))
}

fn distinct_customers(df: &DataFrame) -> SalesflowResult<u64> {
    let column = df
        .column(CUSTOMER_ID)
        .map_err(|err| RunError(format!("customer_id column not found: {err}")))?;
    let distinct = column.as_materialized_series().drop_nulls().n_unique()?;
    Ok(distinct as u64)
}
