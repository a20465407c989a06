use std::path::Path;

use crate::config::JsonMode;
use crate::io::{read, write};
use crate::{IoError, SalesflowResult};

/// Re-emits the sales file as a comma-separated checkpoint.
pub fn load_sales(input_path: &Path, separator: u8, output_path: &Path) -> SalesflowResult<()> {
    let mut df = read::read_csv_file(input_path, separator)?;
    write::write_csv_file(&mut df, output_path)?;
    Ok(())
}

/// Flattens the customer records into a CSV checkpoint, one row per record.
pub fn load_customers(input_path: &Path, mode: JsonMode, output_path: &Path) -> SalesflowResult<()> {
    if !input_path.is_file() {
        return Err(Box::new(IoError(format!(
            "input file not found: {}",
            input_path.display()
        ))));
    }
    let records = read::read_json_records(input_path, mode)?;
    let mut df = read::records_to_dataframe(&records)?;
    write::write_csv_file(&mut df, output_path)?;
    Ok(())
}
