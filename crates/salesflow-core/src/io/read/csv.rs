use std::path::Path;

use polars::prelude::{CsvParseOptions, CsvReadOptions, DataFrame, SerReader};

use crate::{IoError, SalesflowResult};

/// Reads a headed delimited file, inferring column types from every row.
pub fn read_csv_file(input_path: &Path, separator: u8) -> SalesflowResult<DataFrame> {
    if !input_path.is_file() {
        return Err(Box::new(IoError(format!(
            "input file not found: {}",
            input_path.display()
        ))));
    }
    let read_options = CsvReadOptions::default()
        .with_path(Some(input_path))
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_separator(separator));
    let reader = read_options
        .try_into_reader_with_file_path(None)
        .map_err(|err| {
            Box::new(IoError(format!(
                "failed to open csv at {}: {err}",
                input_path.display()
            ))) as Box<dyn std::error::Error + Send + Sync>
        })?;
    let df = reader.finish().map_err(|err| {
        Box::new(IoError(format!(
            "csv read failed for {}: {err}",
            input_path.display()
        ))) as Box<dyn std::error::Error + Send + Sync>
    })?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_custom_separator_and_infers_types() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sales.csv");
        fs::write(&path, "customer_id;amount\n1;10\n2;2.5\n").expect("write csv");

        let df = read_csv_file(&path, b';').expect("read csv");
        assert_eq!(df.height(), 2);
        assert!(df.column("amount").expect("amount").dtype().is_float());
        assert!(df.column("customer_id").expect("id").dtype().is_integer());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = read_csv_file(&dir.path().join("absent.csv"), b',').expect_err("missing");
        assert!(err.to_string().starts_with("input file not found"));
    }
}
