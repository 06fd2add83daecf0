use almanac_model::{rows_from_json, Table, TableConfig, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

fn yearly_table() -> Table {
    let rows = rows_from_json(&json!([
        { "entityName": "USA", "year": 2000, "pop": 282.0 },
        { "entityName": "USA", "year": 1990, "pop": 250.0 },
        { "entityName": "France", "year": 2000, "pop": 59.0 },
        { "entityName": "France", "year": 2010, "pop": null },
    ]))
    .unwrap();
    Table::from_rows(rows, Vec::new(), TableConfig::default()).unwrap()
}

fn daily_table() -> Table {
    let rows = rows_from_json(&json!([
        { "entityName": "USA", "day": "2020-01-01", "cases": 1.0 },
        { "entityName": "USA", "day": "2020-01-03", "cases": 3.0 },
    ]))
    .unwrap();
    Table::from_rows(rows, Vec::new(), TableConfig::default()).unwrap()
}

#[test]
fn year_tables_expose_a_year_time_axis() {
    let table = yearly_table();
    assert!(!table.has_day_column());
    assert_eq!(table.time_column().unwrap().slug(), "year");
    assert_eq!(table.min_time(), Some(1990));
    assert_eq!(table.max_time(), Some(2010));
    assert_eq!(table.all_times(), vec![1990, 2000, 2010]);
}

#[test]
fn day_tables_expose_a_day_offset_time_axis() {
    let table = daily_table();
    assert!(table.has_day_column());
    assert_eq!(table.time_column().unwrap().slug(), "day");
    // Days since the Unix epoch.
    assert_eq!(table.min_time(), Some(18262));
    assert_eq!(table.max_time(), Some(18264));
    assert_eq!(table.all_times(), vec![18262, 18264]);
}

#[test]
fn day_columns_take_precedence_over_year_columns() {
    let rows = rows_from_json(&json!([
        { "entityName": "USA", "year": 2020, "day": "2020-01-01", "x": 1.0 },
    ]))
    .unwrap();
    let table = Table::from_rows(rows, Vec::new(), TableConfig::default()).unwrap();
    assert_eq!(table.time_column().unwrap().slug(), "day");
}

#[test]
fn column_times_cover_only_rows_with_values() {
    let table = yearly_table();
    let pop = table.get_column("pop").unwrap();

    // The 2010 row has a null pop, so its time does not count for `pop`.
    assert_eq!(pop.min_time(), Some(1990));
    assert_eq!(pop.max_time(), Some(2000));

    let mut times = pop.times();
    times.sort_unstable();
    assert_eq!(times, vec![1990, 2000, 2000]);
}

#[test]
fn unique_entity_names_follow_column_coverage() {
    let table = yearly_table();
    let pop = table.get_column("pop").unwrap();
    let entity_names = pop.unique_entity_names();
    let names: Vec<&str> = entity_names
        .iter()
        .map(|n| n.as_ref())
        .collect();
    assert_eq!(names, vec!["USA", "France"]);

    let year = table.get_column("year").unwrap();
    let unique: Vec<Value> = year.unique_values();
    assert_eq!(
        unique,
        vec![
            Value::Number(2000.0),
            Value::Number(1990.0),
            Value::Number(2010.0),
        ]
    );
}

#[test]
fn values_format_per_column_type() {
    let yearly = yearly_table();
    let year = yearly.get_column("year").unwrap();
    // Years render without digit grouping.
    assert_eq!(year.format_value(&Value::Number(1995.0)), "1995");

    let daily = daily_table();
    let day = daily.get_column("day").unwrap();
    assert_eq!(day.format_value(&Value::Number(18262.0)), "2020-01-01");
    // Ingested day strings pass through unchanged.
    assert_eq!(day.format_value(&Value::from("2020-01-01")), "2020-01-01");

    let pop = yearly.get_column("pop").unwrap();
    assert_eq!(pop.format_value(&Value::Number(59.0)), "59");
    assert_eq!(pop.format_value(&Value::Number(12.3)), "12.3");
    assert_eq!(pop.format_value(&Value::Null), "");
}
