use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

/// Errors that can occur when building or mutating a [`ColumnStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("column '{slug}' has {actual} values, expected {expected}")]
    LengthMismatch {
        slug: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column slug '{slug}'")]
    DuplicateSlug { slug: String },
}

/// Column-oriented storage: an insertion-ordered mapping from column slug to
/// one value per row.
///
/// Invariant: every column holds exactly the same number of values. That
/// length is the authoritative row count of anything built on top of the
/// store.
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    /// Columns in insertion order.
    columns: Vec<ColumnData>,
    /// Slug → position in `columns`.
    index: HashMap<Arc<str>, usize>,
}

#[derive(Debug, Clone)]
struct ColumnData {
    slug: Arc<str>,
    values: Vec<Value>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(slug, values)` pairs.
    ///
    /// Fails if two columns share a slug or if the value sequences disagree
    /// in length; a failed build never yields a partially-filled store.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<Arc<str>>,
    {
        let mut store = Self::new();
        for (slug, values) in columns {
            let slug = slug.into();
            if store.index.contains_key(&slug) {
                return Err(StoreError::DuplicateSlug {
                    slug: slug.to_string(),
                });
            }
            store.check_length(&slug, values.len())?;
            store.push_column(slug, values);
        }
        Ok(store)
    }

    /// Number of rows, as defined by the first column. Zero when empty.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column slugs in insertion order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.slug.as_ref())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// The value sequence for `slug`, or an explicit absent.
    pub fn values(&self, slug: &str) -> Option<&[Value]> {
        let idx = *self.index.get(slug)?;
        Some(&self.columns[idx].values)
    }

    /// Insert a column, replacing any existing column with the same slug in
    /// place (its position in the column order is kept).
    pub fn insert(&mut self, slug: impl Into<Arc<str>>, values: Vec<Value>) -> Result<(), StoreError> {
        let slug = slug.into();
        if let Some(&idx) = self.index.get(&slug) {
            // Replacing the only column may change the row count; replacing
            // one of several must not.
            if self.columns.len() > 1 {
                self.check_length(&slug, values.len())?;
            }
            self.columns[idx].values = values;
            return Ok(());
        }

        self.check_length(&slug, values.len())?;
        self.push_column(slug, values);
        Ok(())
    }

    /// Remove a column and return its values. `None` if the slug is absent.
    pub fn remove(&mut self, slug: &str) -> Option<Vec<Value>> {
        let idx = self.index.remove(slug)?;
        let removed = self.columns.remove(idx);
        for pos in self.index.values_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
        Some(removed.values)
    }

    /// Materialize every row. A store with zero columns yields no rows.
    ///
    /// O(rows × columns); all columns are included regardless of order.
    pub fn to_rows(&self) -> Vec<Row> {
        (0..self.row_count())
            .map(|index| self.build_row(index))
            .collect()
    }

    /// Materialize the row at `index`, or an explicit absent when the index
    /// is out of range.
    pub fn row_at(&self, index: usize) -> Option<Row> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.build_row(index))
    }

    fn build_row(&self, index: usize) -> Row {
        let entries = self
            .columns
            .iter()
            .map(|c| (c.slug.clone(), c.values[index].clone()))
            .collect();
        Row { entries }
    }

    fn check_length(&self, slug: &str, actual: usize) -> Result<(), StoreError> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let expected = self.row_count();
        if actual != expected {
            return Err(StoreError::LengthMismatch {
                slug: slug.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn push_column(&mut self, slug: Arc<str>, values: Vec<Value>) {
        self.index.insert(slug.clone(), self.columns.len());
        self.columns.push(ColumnData { slug, values });
    }
}

/// An ephemeral row view: slug → value in column order.
///
/// Rows are materialized on demand and never stored; the [`ColumnStore`] is
/// the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    entries: Vec<(Arc<str>, Value)>,
}

impl Row {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<Arc<str>>,
    {
        Self {
            entries: pairs.into_iter().map(|(s, v)| (s.into(), v)).collect(),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(s, _)| s.as_ref() == slug)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(s, v)| (s.as_ref(), v))
    }
}
