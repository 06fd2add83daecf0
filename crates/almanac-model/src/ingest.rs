use almanac_columnar::{StringPool, Value};
use serde_json::Value as JsonValue;

use crate::error::IngestError;
use crate::infer::auto_type;

/// A raw row record as ingested: field name → JSON value, field order
/// preserved.
pub type RawRow = serde_json::Map<String, JsonValue>;

/// Extract row records from an already-parsed JSON document.
///
/// The single JSON ingestion entry point: the input must be an array of
/// objects.
pub fn rows_from_json(value: &JsonValue) -> Result<Vec<RawRow>, IngestError> {
    let rows = value.as_array().ok_or(IngestError::NotAnArray)?;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            row.as_object()
                .cloned()
                .ok_or(IngestError::RowNotAnObject { index })
        })
        .collect()
}

/// Parse a JSON document and extract row records from it.
pub fn rows_from_json_str(text: &str) -> Result<Vec<RawRow>, IngestError> {
    let value: JsonValue = serde_json::from_str(text)?;
    rows_from_json(&value)
}

/// Parse delimited text (CSV, or TSV when the header line contains a tab)
/// into row records, with a header row naming the fields.
///
/// Every field passes through [`auto_type`], so numeric text arrives as
/// numbers. Empty fields are missing values (`null`), never zero.
pub fn rows_from_delimited(text: &str) -> Result<Vec<RawRow>, IngestError> {
    let header_line = text.lines().next().unwrap_or("");
    if header_line.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        // Accept rows with varying field counts; missing fields are absent.
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = RawRow::new();
        for (index, name) in headers.iter().enumerate() {
            if let Some(field) = record.get(index) {
                let value = if field.is_empty() {
                    JsonValue::Null
                } else {
                    JsonValue::String(field.to_string())
                };
                row.insert(name.to_string(), value);
            }
        }
        auto_type(&mut row);
        rows.push(row);
    }
    Ok(rows)
}

/// Convert an ingested JSON scalar to a stored value, interning strings.
///
/// Nested arrays/objects degrade to their JSON text; the store holds
/// scalars only.
pub(crate) fn json_to_value(value: &JsonValue, pool: &mut StringPool) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        JsonValue::String(s) => Value::String(pool.intern(s)),
        other => Value::String(pool.intern(&other.to_string())),
    }
}
