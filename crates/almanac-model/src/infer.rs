use almanac_columnar::Value;
use serde_json::Value as JsonValue;

use crate::column::{ColumnDef, ColumnType};
use crate::ingest::RawRow;

/// Guess a column definition from its slug and one sample value.
///
/// Priority order:
/// 1. slug `day` is always a [`ColumnType::Date`] named "Date",
/// 2. slug `year` is always a [`ColumnType::Year`] named "Year",
/// 3. a numeric sample is [`ColumnType::Numeric`],
/// 4. a textual sample consisting entirely of decimal digits is
///    [`ColumnType::Numeric`] (`"12.3"` fails this check and stays a string),
/// 5. anything else is [`ColumnType::String`].
///
/// Only one sample is inspected: a column that mixes types across rows keeps
/// whatever the first row's value implies for the table's lifetime.
pub fn infer_column_def(slug: &str, sample: &Value) -> ColumnDef {
    if slug == "day" {
        return ColumnDef::new("day", ColumnType::Date).with_name("Date");
    }
    if slug == "year" {
        return ColumnDef::new("year", ColumnType::Year).with_name("Year");
    }

    match sample {
        Value::Number(_) => ColumnDef::new(slug, ColumnType::Numeric),
        Value::String(s) if is_integer_string(s) => ColumnDef::new(slug, ColumnType::Numeric),
        _ => ColumnDef::new(slug, ColumnType::String),
    }
}

fn is_integer_string(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Best-effort numeric coercion of every field of a record, in place.
///
/// Textual fields that parse as a finite number become numbers; everything
/// else is left unchanged. Empty and whitespace-only fields are missing
/// values, never zero.
pub fn auto_type(row: &mut RawRow) {
    for (_, value) in row.iter_mut() {
        let JsonValue::String(text) = value else {
            continue;
        };
        let Some(number) = coerce_number(text) else {
            continue;
        };
        if let Some(number) = serde_json::Number::from_f64(number) {
            *value = JsonValue::Number(number);
        }
    }
}

/// Parse a textual field as a finite number, treating empty and
/// whitespace-only input as missing.
pub fn coerce_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_integers_decimals_and_exponents() {
        assert_eq!(coerce_number("100"), Some(100.0));
        assert_eq!(coerce_number(" 12.5 "), Some(12.5));
        assert_eq!(coerce_number("-3"), Some(-3.0));
        assert_eq!(coerce_number("1e3"), Some(1000.0));
    }

    #[test]
    fn empty_and_whitespace_are_missing_not_zero() {
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("   "), None);
        assert_eq!(coerce_number("\t"), None);
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert_eq!(coerce_number("France"), None);
        assert_eq!(coerce_number("12abc"), None);
    }
}
