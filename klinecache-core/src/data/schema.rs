use crate::domain;
use polars::prelude::*;

/// Layout of a cached series artifact.
///
/// `timestamp,open,high,low,close,volume` with the key written as
/// `%Y-%m-%d %H:%M:%S` (UTC) and every value as exact decimal text.
pub struct SeriesSchema;

impl SeriesSchema {
    pub const KEY_COLUMN: &'static str = "timestamp";
    pub const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// In-memory schema of a series frame before it is written.
    pub fn schema() -> Schema {
        let mut fields = vec![Field::new(
            Self::KEY_COLUMN.into(),
            DataType::Datetime(TimeUnit::Milliseconds, None),
        )];
        fields.extend(
            domain::Field::ALL
                .iter()
                .map(|f| Field::new(f.column_name().into(), DataType::String)),
        );
        Schema::from_iter(fields)
    }

    /// Validate an in-memory frame against [`SeriesSchema::schema`].
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }

    /// Check that a frame read back from disk has the key column and the
    /// requested value columns.
    pub fn require_columns(df: &DataFrame, fields: &[domain::Field]) -> Result<(), SchemaError> {
        let names = df.get_column_names();
        let has = |name: &str| names.iter().any(|n| n.as_str() == name);

        if !has(Self::KEY_COLUMN) {
            return Err(SchemaError::MissingColumn(Self::KEY_COLUMN.to_string()));
        }
        for field in fields {
            if !has(field.column_name()) {
                return Err(SchemaError::MissingColumn(field.column_name().to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}
