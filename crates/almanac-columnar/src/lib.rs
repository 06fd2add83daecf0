//! Column-oriented storage for the Almanac chart-data engine.
//!
//! This crate owns the storage primitives the table model is built on:
//! - the runtime [`Value`] type (strings are reference-counted so repeated
//!   entity names share one allocation),
//! - the [`ColumnStore`] (slug → ordered value sequence, equal lengths),
//! - row materialization ([`ColumnStore::to_rows`] / [`ColumnStore::row_at`]),
//! - a compact [`BitVec`] used for row-visibility masks.

#![forbid(unsafe_code)]

mod bitmap;
mod store;
mod value;

pub use crate::bitmap::BitVec;
pub use crate::store::{ColumnStore, Row, StoreError};
pub use crate::value::{StringPool, Value};
