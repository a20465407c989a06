pub mod csv;
pub mod json;

pub use csv::read_csv_file;
pub use json::{flatten_record, read_json_records, records_to_dataframe, JsonReadError};
