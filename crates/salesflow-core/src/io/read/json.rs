use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde_json::{Map, Value};

use crate::config::JsonMode;
use crate::SalesflowResult;

/// Separator placed between a parent key and its nested keys.
pub const FLATTEN_SEPARATOR: &str = ".";

#[derive(Debug, Clone)]
pub struct JsonReadError {
    pub rule: String,
    pub message: String,
}

impl JsonReadError {
    fn parse(message: String) -> Self {
        Self {
            rule: "json_parse_error".to_string(),
            message,
        }
    }
}

impl std::fmt::Display for JsonReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

impl std::error::Error for JsonReadError {}

pub type Record = Map<String, Value>;

pub fn read_json_records(input_path: &Path, mode: JsonMode) -> Result<Vec<Record>, JsonReadError> {
    let content = std::fs::read_to_string(input_path).map_err(|err| {
        JsonReadError::parse(format!(
            "failed to read json at {}: {err}",
            input_path.display()
        ))
    })?;
    match mode {
        JsonMode::Array => parse_array(&content),
        JsonMode::Ndjson => parse_ndjson(&content),
    }
}

fn parse_array(content: &str) -> Result<Vec<Record>, JsonReadError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|err| JsonReadError::parse(format!("json parse error: {err}")))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(object) => Ok(object),
                _ => Err(JsonReadError::parse(format!(
                    "expected json object at index {idx}"
                ))),
            })
            .collect(),
        Value::Object(object) => Ok(vec![object]),
        _ => Err(JsonReadError::parse(
            "expected json array or object at root".to_string(),
        )),
    }
}

fn parse_ndjson(content: &str) -> Result<Vec<Record>, JsonReadError> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|err| {
            JsonReadError::parse(format!("json parse error at line {}: {err}", idx + 1))
        })?;
        match value {
            Value::Object(object) => records.push(object),
            _ => {
                return Err(JsonReadError::parse(format!(
                    "expected json object at line {}",
                    idx + 1
                )))
            }
        }
    }
    Ok(records)
}

/// Projects nested objects onto dotted keys, keeping key order.
///
/// Arrays and scalars are leaves. An empty nested object contributes no keys.
pub fn flatten_record(record: &Record) -> Vec<(String, Value)> {
    let mut flat = Vec::with_capacity(record.len());
    flatten_into(record, None, &mut flat);
    flat
}

fn flatten_into(object: &Record, prefix: Option<&str>, flat: &mut Vec<(String, Value)>) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}{FLATTEN_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&name), flat),
            other => flat.push((name, other.clone())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Empty,
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    fn of(value: &Value) -> ColumnKind {
        match value {
            Value::Null => ColumnKind::Empty,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(number) if number.is_i64() => ColumnKind::Integer,
            Value::Number(_) => ColumnKind::Float,
            Value::String(_) | Value::Array(_) | Value::Object(_) => ColumnKind::Text,
        }
    }

    fn widen(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (ColumnKind::Empty, kind) | (kind, ColumnKind::Empty) => kind,
            (left, right) if left == right => left,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }
}

/// Builds one row per record. Columns appear in order of first appearance and
/// records lacking a column get a null there.
pub fn records_to_dataframe(records: &[Record]) -> SalesflowResult<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    let mut rows: Vec<Map<String, Value>> = Vec::with_capacity(records.len());
    for record in records {
        let mut row = Map::new();
        for (name, value) in flatten_record(record) {
            if !row.contains_key(&name) && !names.contains(&name) {
                names.push(name.clone());
            }
            row.insert(name, value);
        }
        rows.push(row);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    for name in &names {
        let cells = rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&Value::Null))
            .collect::<Vec<_>>();
        columns.push(build_series(name, &cells).into());
    }

    Ok(DataFrame::new(columns)?)
}

fn build_series(name: &str, cells: &[&Value]) -> Series {
    let kind = cells
        .iter()
        .fold(ColumnKind::Empty, |kind, value| kind.widen(ColumnKind::of(value)));
    match kind {
        ColumnKind::Integer => {
            let values = cells.iter().map(|value| value.as_i64()).collect::<Vec<_>>();
            Series::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values = cells.iter().map(|value| value.as_f64()).collect::<Vec<_>>();
            Series::new(name.into(), values)
        }
        ColumnKind::Boolean => {
            let values = cells.iter().map(|value| value.as_bool()).collect::<Vec<_>>();
            Series::new(name.into(), values)
        }
        ColumnKind::Empty | ColumnKind::Text => {
            let values = cells.iter().map(|value| text_cell(value)).collect::<Vec<_>>();
            Series::new(name.into(), values)
        }
    }
}

fn text_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(value) => Some(value.to_string()),
        other => Some(other.to_string()),
    }
}
