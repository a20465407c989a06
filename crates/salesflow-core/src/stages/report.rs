use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};

use crate::io::{read, write};
use crate::stages::aggregate::{format_float, TOTAL_CUSTOMERS, TOTAL_SALES};
use crate::{RunError, SalesflowResult};

const HEADER: &str = "----- Sales Report -----";
const FOOTER: &str = "------------------------";

pub fn generate_report(summary_path: &Path, output_path: &Path) -> SalesflowResult<()> {
    let df = read::read_csv_file(summary_path, b',')?;
    let (total_sales, total_customers) = summary_values(&df)?;
    let report = render_report(&total_sales, &total_customers);
    write::write_text_file(output_path, &report)?;
    Ok(())
}

/// Four lines joined by `\n`, without a trailing newline.
pub fn render_report(total_sales: &str, total_customers: &str) -> String {
    [
        HEADER.to_string(),
        format!("Total sales amount: {total_sales}"),
        format!("Total unique customers: {total_customers}"),
        FOOTER.to_string(),
    ]
    .join("\n")
}

/// Reads both totals from the first summary row as display strings.
pub fn summary_values(df: &DataFrame) -> SalesflowResult<(String, String)> {
    if df.height() == 0 {
        return Err(Box::new(RunError(
            "summary table has no rows".to_string(),
        )));
    }
    Ok((first_cell(df, TOTAL_SALES)?, first_cell(df, TOTAL_CUSTOMERS)?))
}

fn first_cell(df: &DataFrame, name: &str) -> SalesflowResult<String> {
    let column = df
        .column(name)
        .map_err(|err| RunError(format!("summary column {name} not found: {err}")))?;
    let value = column.get(0)?;
    let text = match value {
        AnyValue::Null => {
            return Err(Box::new(RunError(format!(
                "summary value {name} is missing"
            ))))
        }
        AnyValue::Float64(value) => format_float(value),
        AnyValue::Float32(value) => format_float(f64::from(value)),
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        other => other.to_string(),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn renders_fixed_layout() {
        let report = render_report("10", "1");
        assert_eq!(
            report,
            "----- Sales Report -----\n\
             Total sales amount: 10\n\
             Total unique customers: 1\n\
             ------------------------"
        );
    }

    #[test]
    fn integer_and_float_totals_format_like_their_type() {
        let df = df!(
            "total_sales" => [12.0f64],
            "total_customers" => [3i64]
        )
        .expect("frame");
        let (sales, customers) = summary_values(&df).expect("values");
        assert_eq!(sales, "12.0");
        assert_eq!(customers, "3");
    }

    #[test]
    fn empty_summary_is_an_error() {
        let empty: [i64; 0] = [];
        let df = df!(
            "total_sales" => empty,
            "total_customers" => empty
        )
        .expect("frame");
        let err = summary_values(&df).expect_err("no rows");
        assert!(err.downcast_ref::<RunError>().is_some());
        assert_eq!(err.to_string(), "summary table has no rows");
    }
}
