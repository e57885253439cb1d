//! Module: codec
//! Responsibility: per-type order-preserving byte transforms and null markers.
//! Does not own: composite key framing or predicate lowering.
//! Boundary: row keys, predicate slots, and group keys all encode through here.

mod bounds;
mod error;
mod ordered;


use crate::{
    SEPARATOR_BYTE,
    key::KeyDecodeError,
    schema::{ColumnDef, ColumnType},
    value::Value,
};

// re-exports
pub use bounds::{increment_key, key_successor};
pub use error::{ConstraintDetail, ConstraintViolation};
use ordered::{decode_ordered_i32, decode_ordered_i64, ordered_i32_bytes, ordered_i64_bytes};

const BOOLEAN_NULL: u8 = 0x00;
const BOOLEAN_FALSE: u8 = 0x01;
const BOOLEAN_TRUE: u8 = 0x02;

///
/// NullSentinel
///
/// Whether a non-null value may encode to the same bytes as null.
/// Row keys and cells reserve those bytes; group keys share them because
/// their null bitmap tells the two apart.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum NullSentinel {
    Reserved,
    Shared,
}

/// Encode one column value, appending the separator when a variable-length
/// column is not the last component of the composite key.
///
/// On a nullable fixed-width column the all-zero encoding belongs to null,
/// so a value that would encode to it (`i32::MIN`, `i64::MIN`, an all-zero
/// binary) is rejected.
pub fn encode_value(
    column: &ColumnDef,
    value: &Value,
    is_last: bool,
    out: &mut Vec<u8>,
) -> Result<(), ConstraintViolation> {
    encode_framed(column, value, is_last, NullSentinel::Reserved, out)
}

pub(crate) fn encode_framed(
    column: &ColumnDef,
    value: &Value,
    is_last: bool,
    sentinel: NullSentinel,
    out: &mut Vec<u8>,
) -> Result<(), ConstraintViolation> {
    let start = out.len();
    if let Err(err) = encode_into(column, value, sentinel, out) {
        out.truncate(start);
        return Err(err);
    }

    if column.column_type().is_variable() && !is_last {
        out.push(SEPARATOR_BYTE);
    }

    Ok(())
}

/// Encode one column value into its column-local bytes (no separator).
pub fn encode_column(column: &ColumnDef, value: &Value) -> Result<Vec<u8>, ConstraintViolation> {
    encode_column_with(column, value, NullSentinel::Reserved)
}

pub(crate) fn encode_column_with(
    column: &ColumnDef,
    value: &Value,
    sentinel: NullSentinel,
) -> Result<Vec<u8>, ConstraintViolation> {
    let mut out = Vec::with_capacity(column.column_type().fixed_width().unwrap_or(16));
    encode_into(column, value, sentinel, &mut out)?;

    Ok(out)
}

/// Column-local encoding of SQL null for one column type.
#[must_use]
pub fn null_encoding(column_type: ColumnType) -> Vec<u8> {
    match column_type {
        ColumnType::Boolean => vec![BOOLEAN_NULL],
        ColumnType::Varchar { .. } => Vec::new(),
        fixed => vec![0; fixed.fixed_width().unwrap_or(0)],
    }
}

/// Decode one column value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, including a trailing
/// separator. A non-terminal variable-length column with no separator is
/// taken to run to the end of the key.
pub fn decode_value(
    column: &ColumnDef,
    bytes: &[u8],
    is_last: bool,
) -> Result<(Value, usize), KeyDecodeError> {
    decode_with(column, bytes, is_last, column.nullable())
}

/// Decode a value known to be non-null, so an all-zero fixed-width body is
/// read as a value rather than the null sentinel.
pub(crate) fn decode_present(
    column: &ColumnDef,
    bytes: &[u8],
    is_last: bool,
) -> Result<(Value, usize), KeyDecodeError> {
    decode_with(column, bytes, is_last, false)
}

fn decode_with(
    column: &ColumnDef,
    bytes: &[u8],
    is_last: bool,
    zero_is_null: bool,
) -> Result<(Value, usize), KeyDecodeError> {
    let column_type = column.column_type();

    let Some(width) = column_type.fixed_width() else {
        let (body, consumed) = if is_last {
            (bytes, bytes.len())
        } else {
            match bytes.iter().position(|&b| b == SEPARATOR_BYTE) {
                Some(pos) => (&bytes[..pos], pos + 1),
                None => (bytes, bytes.len()),
            }
        };
        let value = if body.is_empty() {
            Value::Null
        } else {
            Value::Text(decode_text(column, body)?)
        };

        return Ok((value, consumed));
    };

    if bytes.len() < width {
        return Err(KeyDecodeError::Truncated {
            column: column.name().to_string(),
            needed: width,
            remaining: bytes.len(),
        });
    }
    let body = &bytes[..width];

    if column_type != ColumnType::Boolean && zero_is_null && body.iter().all(|&b| b == 0) {
        return Ok((Value::Null, width));
    }

    let value = match column_type {
        ColumnType::Boolean => match body[0] {
            BOOLEAN_NULL => Value::Null,
            BOOLEAN_FALSE => Value::Boolean(false),
            BOOLEAN_TRUE => Value::Boolean(true),
            byte => {
                return Err(KeyDecodeError::InvalidBoolean {
                    column: column.name().to_string(),
                    byte,
                });
            }
        },
        ColumnType::Integer => Value::Integer(decode_ordered_i32(body)),
        ColumnType::Long => Value::Long(decode_ordered_i64(body)),
        ColumnType::Date => Value::Date(decode_ordered_i64(body)),
        ColumnType::Char { .. } | ColumnType::Varchar { .. } => {
            Value::Text(decode_text(column, body)?)
        }
        ColumnType::Binary { .. } => Value::Binary(body.to_vec()),
    };

    Ok((value, width))
}

// Column-local encoding shared by every entrypoint.
fn encode_into(
    column: &ColumnDef,
    value: &Value,
    sentinel: NullSentinel,
    out: &mut Vec<u8>,
) -> Result<(), ConstraintViolation> {
    let column_type = column.column_type();
    let start = out.len();

    if value.is_null() {
        if !column.nullable() {
            return Err(ConstraintViolation::new(
                column.name(),
                ConstraintDetail::MayNotBeNull,
            ));
        }
        out.extend_from_slice(&null_encoding(column_type));

        return Ok(());
    }

    match (column_type, value) {
        (ColumnType::Boolean, Value::Boolean(flag)) => {
            out.push(if *flag { BOOLEAN_TRUE } else { BOOLEAN_FALSE });
        }
        (ColumnType::Integer, Value::Integer(v)) => out.extend_from_slice(&ordered_i32_bytes(*v)),
        (ColumnType::Long, Value::Integer(v)) => {
            out.extend_from_slice(&ordered_i64_bytes(i64::from(*v)));
        }
        (ColumnType::Long, Value::Long(v)) | (ColumnType::Date, Value::Date(v)) => {
            out.extend_from_slice(&ordered_i64_bytes(*v));
        }
        (ColumnType::Char { width }, Value::Text(text)) => {
            let bytes = checked_text(column, text)?;
            check_fixed_width(column, bytes.len(), width as usize)?;
            out.extend_from_slice(bytes);
        }
        (ColumnType::Binary { width }, Value::Binary(bytes)) => {
            check_fixed_width(column, bytes.len(), width as usize)?;
            out.extend_from_slice(bytes);
        }
        (ColumnType::Varchar { max_len }, Value::Text(text)) => {
            let bytes = checked_text(column, text)?;
            if let Some(max) = max_len
                && bytes.len() > max as usize
            {
                return Err(ConstraintViolation::new(
                    column.name(),
                    ConstraintDetail::MayNotExceed { max: max as usize },
                ));
            }
            out.extend_from_slice(bytes);
        }
        (column_type, value) => {
            return Err(ConstraintViolation::new(
                column.name(),
                ConstraintDetail::TypeMismatch {
                    expected: column_type.label(),
                    found: value.kind_label(),
                },
            ));
        }
    }

    if sentinel == NullSentinel::Reserved
        && column.nullable()
        && out[start..] == null_encoding(column_type)[..]
    {
        out.truncate(start);
        return Err(ConstraintViolation::new(
            column.name(),
            ConstraintDetail::NullSentinel,
        ));
    }

    Ok(())
}

fn checked_text<'a>(column: &ColumnDef, text: &'a str) -> Result<&'a [u8], ConstraintViolation> {
    let bytes = text.as_bytes();
    if bytes.contains(&SEPARATOR_BYTE) {
        return Err(ConstraintViolation::new(
            column.name(),
            ConstraintDetail::ContainsZeroByte,
        ));
    }

    Ok(bytes)
}

fn check_fixed_width(
    column: &ColumnDef,
    len: usize,
    width: usize,
) -> Result<(), ConstraintViolation> {
    let detail = match len.cmp(&width) {
        std::cmp::Ordering::Less => ConstraintDetail::MustBe { width },
        std::cmp::Ordering::Greater => ConstraintDetail::MayNotExceed { max: width },
        std::cmp::Ordering::Equal => return Ok(()),
    };

    Err(ConstraintViolation::new(column.name(), detail))
}

fn decode_text(column: &ColumnDef, body: &[u8]) -> Result<String, KeyDecodeError> {
    String::from_utf8(body.to_vec()).map_err(|_| KeyDecodeError::InvalidUtf8 {
        column: column.name().to_string(),
    })
}
