use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use crate::io::write::write_atomic;
use crate::{IoError, SalesflowResult};

/// Writes a comma-separated file with a header row.
pub fn write_csv_file(df: &mut DataFrame, output_path: &Path) -> SalesflowResult<PathBuf> {
    write_atomic(output_path, |file| {
        CsvWriter::new(file)
            .include_header(true)
            .finish(df)
            .map_err(|err| {
                Box::new(IoError(format!(
                    "csv write failed for {}: {err}",
                    output_path.display()
                ))) as Box<dyn std::error::Error + Send + Sync>
            })
    })
}
