use std::path::Path;

use polars::prelude::{
    col, lit, DataFrame, DataType, IntoLazy, JoinArgs, JoinType, PolarsError,
    SortMultipleOptions,
};

use crate::io::{read, write};
use crate::stages::{AMOUNT, CUSTOMER_ID};
use crate::{warnings, RunError, SalesflowResult};

const ROW_INDEX: &str = "__salesflow_row";
const MATCHED: &str = "__salesflow_matched";

/// Result of joining and filtering the two loaded tables.
#[derive(Debug)]
pub struct MergeOutput {
    pub frame: DataFrame,
    pub sales_rows: usize,
    /// Sales rows whose `customer_id` found a customer before filtering.
    pub matched_rows: usize,
}

pub fn merge_and_validate(
    sales_path: &Path,
    customers_path: &Path,
    output_path: &Path,
) -> SalesflowResult<()> {
    let sales = read::read_csv_file(sales_path, b',')?;
    let customers = read::read_csv_file(customers_path, b',')?;
    let MergeOutput {
        frame: mut merged,
        sales_rows,
        matched_rows,
    } = merge_frames(sales, customers)?;
    if sales_rows > 0 && matched_rows == 0 {
        warnings::emit(&format!(
            "no sales rows matched a customer in {}",
            customers_path.display()
        ));
    }
    if sales_rows > 0 && merged.height() == 0 {
        warnings::emit(&format!(
            "no sales rows survived validation ({sales_rows} read from {})",
            sales_path.display()
        ));
    }
    write::write_csv_file(&mut merged, output_path)?;
    Ok(())
}

/// Left-joins customers onto sales by `customer_id`, then keeps rows with a
/// present `customer_id` and a non-negative `amount`. Sales order is kept.
///
/// Customer columns that collide with sales columns get the join suffix;
/// sales column names are never changed.
pub fn merge_frames(sales: DataFrame, customers: DataFrame) -> SalesflowResult<MergeOutput> {
    require_column(&sales, CUSTOMER_ID, "sales")?;
    require_column(&sales, AMOUNT, "sales")?;
    require_column(&customers, CUSTOMER_ID, "customers")?;
    let sales = numeric_empty_amount(sales)?;
    let (sales, customers) = align_key_types(sales, customers)?;
    let sales_rows = sales.height();

    let joined = sales
        .lazy()
        .with_row_index(ROW_INDEX, None)
        .join(
            customers.lazy().with_column(lit(true).alias(MATCHED)),
            [col(CUSTOMER_ID)],
            [col(CUSTOMER_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
        .map_err(join_error)?;
    let matched_rows = joined.height() - joined.column(MATCHED)?.null_count();

    let merged = joined
        .lazy()
        .filter(col(CUSTOMER_ID).is_not_null().and(col(AMOUNT).is_not_null()))
        .filter(col(AMOUNT).gt_eq(lit(0)))
        .sort(
            [ROW_INDEX],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()
        .map_err(join_error)?;
    Ok(MergeOutput {
        frame: merged.drop(ROW_INDEX)?.drop(MATCHED)?,
        sales_rows,
        matched_rows,
    })
}

fn join_error(err: PolarsError) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(RunError(format!("merge and validate failed: {err}")))
}

/// The CSV reader types an amount column with no values as text; such a
/// column holds only nulls and compares as a float column.
fn numeric_empty_amount(mut sales: DataFrame) -> SalesflowResult<DataFrame> {
    let amount = sales.column(AMOUNT)?;
    if amount.dtype() != &DataType::String || amount.null_count() != sales.height() {
        return Ok(sales);
    }
    let amount = amount.cast(&DataType::Float64)?;
    sales.with_column(amount)?;
    Ok(sales)
}

fn require_column(df: &DataFrame, name: &str, table: &str) -> SalesflowResult<()> {
    if df.column(name).is_err() {
        return Err(Box::new(RunError(format!(
            "{table} table has no {name} column"
        ))));
    }
    Ok(())
}

/// Join keys must share a dtype: numeric keys meet as floats, anything
/// else is compared as text.
fn align_key_types(
    mut sales: DataFrame,
    mut customers: DataFrame,
) -> SalesflowResult<(DataFrame, DataFrame)> {
    let left = sales.column(CUSTOMER_ID)?.dtype().clone();
    let right = customers.column(CUSTOMER_ID)?.dtype().clone();
    if left == right {
        return Ok((sales, customers));
    }
    let target = if left.is_numeric() && right.is_numeric() {
        DataType::Float64
    } else {
        DataType::String
    };
    for df in [&mut sales, &mut customers] {
        let key = df.column(CUSTOMER_ID)?.cast(&target)?;
        df.with_column(key)?;
    }
    Ok((sales, customers))
}
