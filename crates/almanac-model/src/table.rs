use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use almanac_columnar::{BitVec, ColumnStore, Row, StringPool, Value};

use crate::column::{Column, ColumnDef, ColumnType, Time};
use crate::error::{IngestError, SchemaError};
use crate::infer::infer_column_def;
use crate::ingest::{json_to_value, rows_from_delimited, RawRow};
use crate::slug::standardize_slugs;

/// Numeric identifier of an entity, as supplied by the data source.
pub type EntityId = i64;

/// Caller-supplied configuration: which slugs designate the entity columns,
/// plus any externally-known code → name mappings.
///
/// There is no ambient global state; everything the table needs from its
/// host arrives through this value at construction.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Slug of the column holding entity names.
    pub entity_name_slug: String,
    /// Slug of the column holding numeric entity ids.
    pub entity_id_slug: String,
    /// Slug of the column holding external entity codes.
    pub entity_code_slug: String,
    /// Injected code → name mappings, consulted before the table's own
    /// entity-code column when resolving selection codes.
    pub entity_codes: HashMap<String, String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            entity_name_slug: "entityName".to_string(),
            entity_id_slug: "entityId".to_string(),
            entity_code_slug: "entityCode".to_string(),
            entity_codes: HashMap::new(),
        }
    }
}

/// The set of entities currently marked as "of interest".
///
/// Selection is orthogonal to filtering: rows of selected entities stay
/// visible even when a filter column excludes them.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    names: Vec<Arc<str>>,
    set: HashSet<Arc<str>>,
}

impl Selection {
    fn replace<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = Arc<str>>,
    {
        self.names.clear();
        self.set.clear();
        for name in names {
            if self.set.insert(name.clone()) {
                self.names.push(name);
            }
        }
    }

    fn clear(&mut self) {
        self.names.clear();
        self.set.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    /// Selected entity names in selection order.
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The in-memory table the rendering layer queries.
///
/// A table owns one [`ColumnStore`], an ordered list of column definitions
/// (insertion order, unique slugs), and the current [`Selection`]. Derived
/// and filter columns materialize their values against the store state at
/// the moment they are added and are not re-evaluated afterwards; callers
/// needing freshness after a dependency changed re-add the column.
#[derive(Debug, Clone, Default)]
pub struct Table {
    store: ColumnStore,
    defs: Vec<ColumnDef>,
    config: TableConfig,
    selection: Selection,
}

impl Table {
    /// An empty table: no columns, no rows, no selection.
    pub fn new(config: TableConfig) -> Self {
        Self {
            store: ColumnStore::new(),
            defs: Vec::new(),
            config,
            selection: Selection::default(),
        }
    }

    /// Build a table from row-oriented records.
    ///
    /// Field names are slug-normalized first (driven by the first row), then
    /// each field gets a definition: the explicit one from `defs` when
    /// supplied, otherwise one inferred from the slug and the first row's
    /// value. Fields missing from a row store [`Value::Null`] — ragged rows
    /// are repaired by union, not rejected.
    pub fn from_rows(
        mut rows: Vec<RawRow>,
        defs: Vec<ColumnDef>,
        config: TableConfig,
    ) -> Result<Self, SchemaError> {
        standardize_slugs(&mut rows);

        // Ordered union of field names: first row first, later-only fields
        // appended in encounter order.
        let mut slugs: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for row in &rows {
            for key in row.keys() {
                if seen.insert(key.as_str()) {
                    slugs.push(key.clone());
                }
            }
        }

        let mut pool = StringPool::new();
        let mut columns: Vec<(String, Vec<Value>)> = Vec::with_capacity(slugs.len());
        for slug in &slugs {
            let values: Vec<Value> = rows
                .iter()
                .map(|row| {
                    row.get(slug)
                        .map(|v| json_to_value(v, &mut pool))
                        .unwrap_or(Value::Null)
                })
                .collect();
            columns.push((slug.clone(), values));
        }

        let store = ColumnStore::from_columns(columns)?;
        Self::from_store(store, defs, config)
    }

    /// Build a table from delimited text (CSV, or TSV when the header line
    /// contains a tab).
    pub fn from_delimited(
        text: &str,
        defs: Vec<ColumnDef>,
        config: TableConfig,
    ) -> Result<Self, IngestError> {
        let rows = rows_from_delimited(text)?;
        Ok(Self::from_rows(rows, defs, config)?)
    }

    /// Build a table over an existing store.
    ///
    /// Every explicit definition must have a backing column; store columns
    /// without an explicit definition get an inferred one. Fails on
    /// duplicate definition slugs — never yields a partially-built table.
    pub fn from_store(
        store: ColumnStore,
        defs: Vec<ColumnDef>,
        config: TableConfig,
    ) -> Result<Self, SchemaError> {
        let mut explicit: HashMap<String, ColumnDef> = HashMap::new();
        for def in defs {
            if explicit.insert(def.slug.clone(), def.clone()).is_some() {
                return Err(SchemaError::DuplicateSlug { slug: def.slug });
            }
        }
        for slug in explicit.keys() {
            if !store.contains(slug) {
                return Err(SchemaError::MissingColumn { slug: slug.clone() });
            }
        }

        let mut ordered = Vec::with_capacity(store.column_count());
        for slug in store.slugs() {
            let def = match explicit.remove(slug) {
                Some(def) => def,
                None => {
                    let sample = store
                        .values(slug)
                        .and_then(|values| values.first())
                        .cloned()
                        .unwrap_or(Value::Null);
                    infer_column_def(slug, &sample)
                }
            };
            ordered.push(def);
        }

        Ok(Self {
            store,
            defs: ordered,
            config,
            selection: Selection::default(),
        })
    }

    // ---- shape -----------------------------------------------------------

    pub fn row_count(&self) -> usize {
        self.store.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.defs.len()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Column definitions in insertion order.
    pub fn defs(&self) -> &[ColumnDef] {
        &self.defs
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|d| d.slug.as_str())
    }

    pub fn has_column(&self, slug: &str) -> bool {
        self.store.contains(slug)
    }

    /// The runtime view of a column, or an explicit absent.
    pub fn get_column(&self, slug: &str) -> Option<Column<'_>> {
        let def = self.defs.iter().find(|d| d.slug == slug)?;
        let values = self.store.values(slug)?;
        Some(Column {
            table: self,
            def,
            values,
        })
    }

    /// Runtime views of every column, in insertion order.
    pub fn columns(&self) -> Vec<Column<'_>> {
        self.defs
            .iter()
            .filter_map(|d| self.get_column(&d.slug))
            .collect()
    }

    // ---- rows ------------------------------------------------------------

    /// Materialize every row, filters ignored.
    pub fn rows(&self) -> Vec<Row> {
        self.store.to_rows()
    }

    /// Materialize one row, or an explicit absent when out of range.
    pub fn row_at(&self, index: usize) -> Option<Row> {
        self.store.row_at(index)
    }

    // ---- column mutation -------------------------------------------------

    /// Insert a column, replacing any column with the same slug.
    ///
    /// The value sequence must match the table's row count.
    pub fn add_column(&mut self, def: ColumnDef, values: Vec<Value>) -> Result<(), SchemaError> {
        self.store.insert(def.slug.as_str(), values)?;
        match self.defs.iter_mut().find(|d| d.slug == def.slug) {
            Some(existing) => *existing = def,
            None => self.defs.push(def),
        }
        Ok(())
    }

    /// Insert a column whose values are computed from the table's current
    /// state.
    ///
    /// The producer runs exactly once, against the store as it is right now;
    /// the resulting values are stored and never re-evaluated. Re-add the
    /// column to refresh it after its dependencies change.
    pub fn add_derived_column<F>(&mut self, def: ColumnDef, produce: F) -> Result<(), SchemaError>
    where
        F: FnOnce(&Table) -> Vec<Value>,
    {
        let values = produce(self);
        self.add_column(def, values)
    }

    /// Insert a Boolean filter column computed by evaluating `predicate`
    /// against every current row.
    ///
    /// Filter columns mark rows excluded from [`Table::visible_rows`]; they
    /// never delete values, and deleting the filter column restores full
    /// visibility. Like derived columns, the predicate observes the store
    /// state at insertion time only.
    pub fn add_filter_column<F>(&mut self, slug: &str, predicate: F) -> Result<(), SchemaError>
    where
        F: Fn(&Row, usize, &Table) -> bool,
    {
        let rows = self.store.to_rows();
        let values: Vec<Value> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| Value::Boolean(predicate(row, index, self)))
            .collect();
        self.add_column(ColumnDef::filter(slug), values)
    }

    /// Remove a column. No-op if the slug is absent.
    pub fn delete_column_by_slug(&mut self, slug: &str) {
        self.store.remove(slug);
        self.defs.retain(|d| d.slug != slug);
    }

    // ---- selection -------------------------------------------------------

    /// Replace the selection with the given entity names.
    pub fn set_selected_entities<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.selection.replace(names.into_iter().map(Into::into));
    }

    /// Replace the selection by numeric entity id, returning the names that
    /// resolved. Unknown ids are simply not part of the result.
    pub fn set_selected_entities_by_entity_id(&mut self, ids: &[EntityId]) -> Vec<Arc<str>> {
        let map = self.entity_id_to_name_map();
        let names: Vec<Arc<str>> = ids.iter().filter_map(|id| map.get(id).cloned()).collect();
        self.selection.replace(names.iter().cloned());
        names
    }

    /// Replace the selection by external entity code, returning the codes
    /// that resolved to a known entity.
    ///
    /// Callers detect misses by diffing the returned set against their
    /// input; resolution failures are never silently dropped. Injected
    /// mappings from [`TableConfig::entity_codes`] take precedence over the
    /// table's own entity-code column.
    pub fn set_selected_entities_by_code<S: AsRef<str>>(&mut self, codes: &[S]) -> Vec<String> {
        let code_map = self.entity_code_to_name_map();
        let mut matched = Vec::new();
        let mut names = Vec::new();
        for code in codes {
            let code = code.as_ref();
            let name = self
                .config
                .entity_codes
                .get(code)
                .map(|n| Arc::<str>::from(n.as_str()))
                .or_else(|| code_map.get(code).cloned());
            if let Some(name) = name {
                matched.push(code.to_string());
                names.push(name);
            }
        }
        self.selection.replace(names);
        matched
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Selected entity names in selection order.
    pub fn selected_entity_names(&self) -> &[Arc<str>] {
        self.selection.names()
    }

    /// Whether the row's entity is in the current selection.
    pub fn is_selected(&self, row: &Row) -> bool {
        row.get(&self.config.entity_name_slug)
            .and_then(Value::as_str)
            .is_some_and(|name| self.selection.contains(name))
    }

    // ---- entities --------------------------------------------------------

    /// Distinct entity names present in the table, in first-seen order.
    pub fn available_entity_names(&self) -> Vec<Arc<str>> {
        let Some(values) = self.entity_name_values() else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        values
            .iter()
            .filter_map(|v| match v {
                Value::String(name) => seen.insert(name.clone()).then(|| name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Numeric entity id → entity name, from the designated id and name
    /// columns. Empty if either column is absent.
    pub fn entity_id_to_name_map(&self) -> HashMap<EntityId, Arc<str>> {
        self.zip_entity_column(&self.config.entity_id_slug)
            .filter_map(|(key, name)| Some((key.as_f64()? as EntityId, name)))
            .collect()
    }

    /// Entity name → numeric entity id, the inverse of
    /// [`Table::entity_id_to_name_map`].
    pub fn entity_name_to_id_map(&self) -> HashMap<Arc<str>, EntityId> {
        self.zip_entity_column(&self.config.entity_id_slug)
            .filter_map(|(key, name)| Some((name, key.as_f64()? as EntityId)))
            .collect()
    }

    /// External entity code → entity name, from the designated code and name
    /// columns. Empty if either column is absent.
    pub fn entity_code_to_name_map(&self) -> HashMap<Arc<str>, Arc<str>> {
        self.zip_entity_column(&self.config.entity_code_slug)
            .filter_map(|(key, name)| match key {
                Value::String(code) => Some((code, name)),
                _ => None,
            })
            .collect()
    }

    /// Pairs of (key-column value, entity name) over rows where both are
    /// present.
    fn zip_entity_column<'t>(
        &'t self,
        key_slug: &str,
    ) -> impl Iterator<Item = (Value, Arc<str>)> + 't {
        let keys = self.store.values(key_slug);
        let names = self.entity_name_values();
        keys.into_iter()
            .flatten()
            .zip(names.into_iter().flatten())
            .filter_map(|(key, name)| match name {
                Value::String(name) => Some((key.clone(), name.clone())),
                _ => None,
            })
    }

    pub(crate) fn entity_name_values(&self) -> Option<&[Value]> {
        self.store.values(&self.config.entity_name_slug)
    }

    // ---- time ------------------------------------------------------------

    /// The designated time column: the first day-typed column if any, else
    /// the first year-typed column.
    pub fn time_column(&self) -> Option<Column<'_>> {
        let def = self
            .defs
            .iter()
            .find(|d| d.column_type == ColumnType::Date)
            .or_else(|| self.defs.iter().find(|d| d.column_type == ColumnType::Year))?;
        self.get_column(&def.slug)
    }

    pub fn has_day_column(&self) -> bool {
        self.defs.iter().any(|d| d.column_type == ColumnType::Date)
    }

    pub fn min_time(&self) -> Option<Time> {
        self.time_column()?.min_time()
    }

    pub fn max_time(&self) -> Option<Time> {
        self.time_column()?.max_time()
    }

    /// All times covered by the time column, sorted and deduplicated. Empty
    /// if the table has no time column.
    pub fn all_times(&self) -> Vec<Time> {
        let Some(column) = self.time_column() else {
            return Vec::new();
        };
        let mut times = column.times();
        times.sort_unstable();
        times.dedup();
        times
    }

    // ---- visibility ------------------------------------------------------

    /// Indices of rows that pass every active filter column, or whose entity
    /// is selected. Selection always overrides filter exclusion.
    pub fn visible_row_indices(&self) -> Vec<usize> {
        self.visibility_mask().iter_ones().collect()
    }

    /// Rows that pass every active filter column, or whose entity is
    /// selected.
    pub fn visible_rows(&self) -> Vec<Row> {
        self.visibility_mask()
            .iter_ones()
            .filter_map(|index| self.store.row_at(index))
            .collect()
    }

    pub fn visible_row_count(&self) -> usize {
        self.visibility_mask().count_ones()
    }

    fn visibility_mask(&self) -> BitVec {
        let row_count = self.store.row_count();
        let mut mask = BitVec::with_len_all_true(row_count);

        let filters: Vec<&[Value]> = self
            .defs
            .iter()
            .filter(|d| d.is_filter)
            .filter_map(|d| self.store.values(&d.slug))
            .collect();
        if filters.is_empty() {
            return mask;
        }

        let entities = self.entity_name_values();
        for index in 0..row_count {
            let passes = filters
                .iter()
                .all(|values| matches!(values[index], Value::Boolean(true)));
            if passes {
                continue;
            }

            let selected = entities
                .and_then(|values| values[index].as_str())
                .is_some_and(|name| self.selection.contains(name));
            if !selected {
                mask.set(index, false);
            }
        }
        mask
    }
}
