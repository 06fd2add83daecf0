//! `almanac-model` defines the in-memory table engine behind Almanac charts.
//!
//! Raw observational rows (entity / time / value records) come in through
//! [`ingest`], get slug-normalized and typed, and land in a column-oriented
//! [`Table`] the rendering layer queries: columns by slug, visible rows,
//! selection, and the time axis. Filtering is non-destructive — filter
//! columns mark rows excluded without deleting values — and the current
//! entity selection always overrides filter exclusion.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - chart components (scales, axes, marks) reading columns and times
//! - entity pickers and URL state reading/writing the selection
//! - data-table views materializing rows on demand

mod column;
mod error;
pub mod infer;
pub mod ingest;
mod slug;
mod table;

pub use column::{Column, ColumnDef, ColumnType, Time};
pub use error::{IngestError, SchemaError};
pub use infer::{auto_type, coerce_number, infer_column_def};
pub use ingest::{rows_from_delimited, rows_from_json, rows_from_json_str, RawRow};
pub use slug::{slugify, slugify_same_case, standardize_slugs};
pub use table::{EntityId, Selection, Table, TableConfig};

pub use almanac_columnar::{BitVec, ColumnStore, Row, StoreError, StringPool, Value};
