use std::collections::HashSet;
use std::sync::Arc;

use almanac_columnar::Value;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::table::Table;

/// A point on the table's time axis: a calendar year for year columns, days
/// since the Unix epoch for day columns.
pub type Time = i64;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Numeric,
    Date,
    Year,
    Boolean,
}

impl ColumnType {
    /// Whether columns of this type carry the table's time axis.
    pub fn is_time(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Year)
    }
}

/// Definition of a column: its slug, optional display name, and type.
///
/// Immutable once assigned; re-adding a column under the same slug replaces
/// the definition wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Marks a Boolean column that controls row visibility.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_filter: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ColumnDef {
    pub fn new(slug: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            slug: slug.into(),
            name: None,
            column_type,
            is_filter: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn filter(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: None,
            column_type: ColumnType::Boolean,
            is_filter: true,
        }
    }

    /// The name shown to users: the explicit display name if set, else the
    /// slug.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

/// A runtime view of one column: its definition bound to its slice of the
/// table's store.
///
/// Views borrow the table, so they cannot outlive a mutation of the
/// underlying store — derived facts computed from a view are always
/// consistent with the store they were read from.
#[derive(Debug, Clone, Copy)]
pub struct Column<'t> {
    pub(crate) table: &'t Table,
    pub(crate) def: &'t ColumnDef,
    pub(crate) values: &'t [Value],
}

impl<'t> Column<'t> {
    pub fn def(&self) -> &'t ColumnDef {
        self.def
    }

    pub fn slug(&self) -> &'t str {
        &self.def.slug
    }

    pub fn display_name(&self) -> &'t str {
        self.def.display_name()
    }

    pub fn column_type(&self) -> ColumnType {
        self.def.column_type
    }

    pub fn values(&self) -> &'t [Value] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<&'t Value> {
        self.values.get(index)
    }

    /// Distinct non-null values, in first-seen order.
    pub fn unique_values(&self) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert((*v).clone()))
            .cloned()
            .collect()
    }

    /// Distinct entity names appearing on rows where this column has a
    /// value, in first-seen order.
    pub fn unique_entity_names(&self) -> Vec<Arc<str>> {
        let Some(entities) = self.table.entity_name_values() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.values
            .iter()
            .zip(entities)
            .filter(|(v, _)| !v.is_null())
            .filter_map(|(_, entity)| match entity {
                Value::String(name) => seen.insert(name.clone()).then(|| name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Times covered by this column, in row order.
    ///
    /// For a time-typed column these are its own values; for any other
    /// column they are the table's time-column values on rows where this
    /// column is non-null.
    pub fn times(&self) -> Vec<Time> {
        if self.def.column_type.is_time() {
            return self
                .values
                .iter()
                .filter_map(|v| value_to_time(self.def.column_type, v))
                .collect();
        }

        let Some(time) = self.table.time_column() else {
            return Vec::new();
        };
        self.values
            .iter()
            .zip(time.values)
            .filter(|(v, _)| !v.is_null())
            .filter_map(|(_, t)| value_to_time(time.def.column_type, t))
            .collect()
    }

    pub fn min_time(&self) -> Option<Time> {
        self.times().into_iter().min()
    }

    pub fn max_time(&self) -> Option<Time> {
        self.times().into_iter().max()
    }

    /// Render a value of this column for display.
    pub fn format_value(&self, value: &Value) -> String {
        match (self.def.column_type, value) {
            (_, Value::Null) => String::new(),
            (ColumnType::Year, Value::Number(n)) => format!("{}", *n as i64),
            (ColumnType::Date, Value::Number(n)) => date_from_time(*n as Time)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            _ => value.to_string(),
        }
    }
}

/// Interpret a stored value as a point on the time axis.
///
/// Day columns accept either an integer day offset or an ISO `YYYY-MM-DD`
/// string (the form row ingestion produces); year columns accept numbers or
/// numeric text.
pub(crate) fn value_to_time(column_type: ColumnType, value: &Value) -> Option<Time> {
    match (column_type, value) {
        (_, Value::Number(n)) if n.is_finite() => Some(*n as Time),
        (ColumnType::Date, Value::String(s)) => {
            let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
            Some((date - unix_epoch()).num_days())
        }
        (ColumnType::Year, Value::String(s)) => s.trim().parse::<Time>().ok(),
        _ => None,
    }
}

fn date_from_time(time: Time) -> Option<NaiveDate> {
    let days = Duration::try_days(time)?;
    unix_epoch().checked_add_signed(days)
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_strings_convert_to_day_offsets() {
        assert_eq!(
            value_to_time(ColumnType::Date, &Value::from("1970-01-01")),
            Some(0)
        );
        assert_eq!(
            value_to_time(ColumnType::Date, &Value::from("2020-01-01")),
            Some(18262)
        );
        assert_eq!(value_to_time(ColumnType::Date, &Value::from("not a date")), None);
    }

    #[test]
    fn years_convert_from_numbers_and_text() {
        assert_eq!(
            value_to_time(ColumnType::Year, &Value::Number(1995.0)),
            Some(1995)
        );
        assert_eq!(value_to_time(ColumnType::Year, &Value::from("2001")), Some(2001));
        assert_eq!(value_to_time(ColumnType::Year, &Value::Boolean(true)), None);
    }
}
