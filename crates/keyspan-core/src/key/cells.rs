use crate::{
    codec::{self, ConstraintDetail, ConstraintViolation},
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::{KeyDecodeError, RowKey},
    obs::sink::{self, MetricsEvent},
    schema::{ColumnDef, TableSchema},
    value::Value,
};
use serde::{Deserialize, Serialize};

/// Cell written for rows whose key-value columns are all null, so the row
/// still exists in the store.
pub const EMPTY_MARKER_CELL: &str = "_0";

///
/// MissingColumnPolicy
///
/// Caller decision for key-value columns absent from a write.
/// The codec cannot tell a first insert from a partial update.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingColumnPolicy {
    /// First insert: apply defaults, then reject absent required columns.
    Reject,
    /// Partial update: absent columns are left untouched.
    Allow,
}

///
/// Cell
///
/// One encoded key-value column, addressed by column name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Cell {
    pub column: String,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

///
/// EncodedRow
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EncodedRow {
    pub key: RowKey,
    pub cells: Vec<Cell>,
}

impl EncodedRow {
    /// Encode one row: the composite key plus one cell per non-null
    /// key-value column.
    pub fn encode(
        schema: &TableSchema,
        pk_values: &[Value],
        kv_values: &[(&str, Value)],
        policy: MissingColumnPolicy,
    ) -> Result<Self, InternalError> {
        if let Some((name, _)) = kv_values
            .iter()
            .find(|(name, _)| schema.kv_columns().all(|column| column.name() != *name))
        {
            return Err(InternalError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Key,
                format!("table '{}' has no key-value column '{name}'", schema.name()),
            ));
        }

        let key = RowKey::encode(schema, pk_values)?;

        let mut cells = Vec::new();
        for column in schema.kv_columns() {
            let supplied = kv_values
                .iter()
                .find(|(name, _)| *name == column.name())
                .map(|(_, value)| value);

            let value = match (supplied, policy) {
                (Some(value), _) => value,
                (None, MissingColumnPolicy::Allow) => continue,
                (None, MissingColumnPolicy::Reject) => {
                    column.default_value().unwrap_or(&Value::Null)
                }
            };

            if let Some(cell) = encode_cell(column, value).inspect_err(|_| {
                sink::record(MetricsEvent::ConstraintViolation);
            })? {
                cells.push(cell);
            }
        }

        if cells.is_empty() {
            cells.push(Cell {
                column: EMPTY_MARKER_CELL.to_string(),
                value: Vec::new(),
            });
        }

        Ok(Self { key, cells })
    }

    /// Decode key-value cells into values aligned with `schema.kv_columns()`.
    /// Absent cells decode as null.
    pub fn decode_cells(schema: &TableSchema, cells: &[Cell]) -> Result<Vec<Value>, KeyDecodeError> {
        if let Some(cell) = cells.iter().find(|cell| {
            cell.column != EMPTY_MARKER_CELL
                && schema.kv_columns().all(|column| column.name() != cell.column)
        }) {
            return Err(KeyDecodeError::UnknownCell {
                column: cell.column.clone(),
            });
        }

        schema
            .kv_columns()
            .map(|column| {
                cells
                    .iter()
                    .find(|cell| cell.column == column.name())
                    .map_or(Ok(Value::Null), |cell| decode_cell(column, &cell.value))
            })
            .collect()
    }
}

// Null values are stored as an absent cell.
fn encode_cell(column: &ColumnDef, value: &Value) -> Result<Option<Cell>, ConstraintViolation> {
    if value.is_null() {
        if !column.nullable() {
            return Err(ConstraintViolation::new(
                column.name(),
                ConstraintDetail::MayNotBeNull,
            ));
        }
        return Ok(None);
    }

    Ok(Some(Cell {
        column: column.name().to_string(),
        value: codec::encode_column(column, value)?,
    }))
}

fn decode_cell(column: &ColumnDef, bytes: &[u8]) -> Result<Value, KeyDecodeError> {
    let (value, consumed) = codec::decode_value(column, bytes, true)?;
    if consumed != bytes.len() {
        return Err(KeyDecodeError::TrailingBytes {
            len: bytes.len() - consumed,
        });
    }

    Ok(value)
}
