//! Module: key
//! Responsibility: composite row-key framing and key-value cell layout.
//! Does not own: per-type byte transforms (codec) or range construction (scan).
//! Boundary: the only producer of `RowKey` bytes written to the store.

mod cells;
mod error;


use crate::{
    codec::{self, ConstraintViolation},
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
    schema::TableSchema,
    value::Value,
};
use derive_more::Deref;
use serde::{Deserialize, Serialize};

// re-exports
pub use cells::{Cell, EncodedRow, MissingColumnPolicy, EMPTY_MARKER_CELL};
pub use error::KeyDecodeError;

///
/// RowKey
///
/// Immutable composite primary-key bytes. Byte order equals the
/// left-to-right natural order of the decoded tuple.
///

#[derive(
    Clone, Debug, Default, Deref, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct RowKey(#[serde(with = "serde_bytes")] Vec<u8>);

impl RowKey {
    /// Encode primary-key values in ordinal order.
    ///
    /// Fewer values than primary-key columns encode the missing trailing
    /// columns as null.
    pub fn encode(schema: &TableSchema, pk_values: &[Value]) -> Result<Self, InternalError> {
        if pk_values.len() > schema.pk_len() {
            return Err(InternalError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Key,
                format!(
                    "table '{}' expects at most {} primary-key values, got {}",
                    schema.name(),
                    schema.pk_len(),
                    pk_values.len()
                ),
            ));
        }

        match encode_pk(schema, pk_values) {
            Ok(bytes) => {
                sink::record(MetricsEvent::KeyEncoded);
                Ok(Self(bytes))
            }
            Err(err) => {
                sink::record(MetricsEvent::ConstraintViolation);
                Err(err.into())
            }
        }
    }

    /// Decode primary-key values in ordinal order.
    ///
    /// A key that ends at a column boundary yields nulls for the absent
    /// trailing columns.
    pub fn decode(&self, schema: &TableSchema) -> Result<Vec<Value>, KeyDecodeError> {
        let decoded = decode_pk(schema, &self.0);
        sink::record(if decoded.is_ok() {
            MetricsEvent::KeyDecoded
        } else {
            MetricsEvent::KeyDecodeFailed
        });

        decoded
    }

    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for RowKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RowKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn encode_pk(schema: &TableSchema, pk_values: &[Value]) -> Result<Vec<u8>, ConstraintViolation> {
    let mut out = Vec::new();
    for (ordinal, column) in schema.pk_columns().enumerate() {
        let value = pk_values.get(ordinal).unwrap_or(&Value::Null);
        codec::encode_value(column, value, schema.is_last_pk(ordinal), &mut out)?;
    }

    Ok(out)
}

fn decode_pk(schema: &TableSchema, bytes: &[u8]) -> Result<Vec<Value>, KeyDecodeError> {
    let mut values = Vec::with_capacity(schema.pk_len());
    let mut offset = 0;

    for (ordinal, column) in schema.pk_columns().enumerate() {
        if offset == bytes.len() {
            values.push(Value::Null);
            continue;
        }

        let (value, consumed) =
            codec::decode_value(column, &bytes[offset..], schema.is_last_pk(ordinal))?;
        values.push(value);
        offset += consumed;
    }

    if offset != bytes.len() {
        return Err(KeyDecodeError::TrailingBytes {
            len: bytes.len() - offset,
        });
    }

    Ok(values)
}
