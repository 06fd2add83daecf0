use almanac_columnar::StoreError;
use thiserror::Error;

/// Errors that can occur when constructing a table or adding columns.
///
/// Schema violations are fatal: a failed construction never yields a
/// partially-built table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("column '{slug}' has {actual} values, expected {expected}")]
    LengthMismatch {
        slug: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column slug '{slug}'")]
    DuplicateSlug { slug: String },
    #[error("column definition '{slug}' has no backing data")]
    MissingColumn { slug: String },
}

impl From<StoreError> for SchemaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LengthMismatch {
                slug,
                expected,
                actual,
            } => SchemaError::LengthMismatch {
                slug,
                expected,
                actual,
            },
            StoreError::DuplicateSlug { slug } => SchemaError::DuplicateSlug { slug },
        }
    }
}

/// Errors that can occur while turning raw input into row records.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("expected a JSON array of row objects")]
    NotAnArray,
    #[error("row {index} is not a JSON object")]
    RowNotAnObject { index: usize },
    #[error("delimited input has no header row")]
    EmptyInput,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
