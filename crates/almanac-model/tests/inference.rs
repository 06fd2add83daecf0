use almanac_model::{
    auto_type, infer_column_def, rows_from_json, ColumnType, Table, TableConfig, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn day_and_year_slugs_override_the_sample() {
    let def = infer_column_def("day", &Value::from("2020-01-01"));
    assert_eq!(def.column_type, ColumnType::Date);
    assert_eq!(def.display_name(), "Date");

    // The override wins even against a numeric sample.
    let def = infer_column_def("year", &Value::Number(1995.0));
    assert_eq!(def.column_type, ColumnType::Year);
    assert_eq!(def.display_name(), "Year");
}

#[test]
fn numeric_samples_and_digit_strings_are_numeric() {
    assert_eq!(
        infer_column_def("pop", &Value::Number(12.5)).column_type,
        ColumnType::Numeric
    );
    assert_eq!(
        infer_column_def("pop", &Value::from("12345")).column_type,
        ColumnType::Numeric
    );
}

#[test]
fn decimal_strings_fail_the_all_digits_check() {
    // "12.3" contains a non-digit, so the textual check rejects it; only
    // `auto_type` (which runs before inference on untyped sources) turns
    // decimal text into numbers.
    assert_eq!(
        infer_column_def("pop", &Value::from("12.3")).column_type,
        ColumnType::String
    );
}

#[test]
fn everything_else_is_a_string() {
    assert_eq!(
        infer_column_def("name", &Value::from("France")).column_type,
        ColumnType::String
    );
    assert_eq!(
        infer_column_def("flag", &Value::Boolean(true)).column_type,
        ColumnType::String
    );
    assert_eq!(
        infer_column_def("gap", &Value::Null).column_type,
        ColumnType::String
    );
}

#[test]
fn one_sample_decides_for_the_tables_lifetime() {
    // A mixed-type column is not detected: the first row's value decides,
    // and later values of another type are stored as-is.
    let rows = rows_from_json(&json!([
        { "x": "abc" },
        { "x": 5 },
    ]))
    .unwrap();
    let table = Table::from_rows(rows, Vec::new(), TableConfig::default()).unwrap();

    let column = table.get_column("x").unwrap();
    assert_eq!(column.column_type(), ColumnType::String);
    assert_eq!(column.values()[1], Value::Number(5.0));
}

#[test]
fn auto_type_coerces_numeric_text_in_place() {
    let mut row = rows_from_json(&json!([
        { "pop": "100", "gdp": "12.3", "name": "France", "share": "1e-2" }
    ]))
    .unwrap()
    .remove(0);

    auto_type(&mut row);

    assert_eq!(row["pop"], json!(100.0));
    assert_eq!(row["gdp"], json!(12.3));
    assert_eq!(row["share"], json!(0.01));
    assert_eq!(row["name"], json!("France"));
}

#[test]
fn auto_type_treats_empty_and_whitespace_as_missing() {
    let mut row = rows_from_json(&json!([
        { "a": "", "b": "   ", "c": "0" }
    ]))
    .unwrap()
    .remove(0);

    auto_type(&mut row);

    // Not coerced to zero.
    assert_eq!(row["a"], json!(""));
    assert_eq!(row["b"], json!("   "));
    // A literal zero still converts.
    assert_eq!(row["c"], json!(0.0));
}

#[test]
fn auto_type_leaves_non_strings_alone() {
    let mut row = rows_from_json(&json!([
        { "n": 7, "b": true, "missing": null }
    ]))
    .unwrap()
    .remove(0);

    auto_type(&mut row);

    assert_eq!(row["n"], json!(7));
    assert_eq!(row["b"], json!(true));
    assert_eq!(row["missing"], json!(null));
}
