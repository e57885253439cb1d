//! Module: predicate
//! Responsibility: lowering per-column predicates into key slots.
//! Does not own: residual predicate evaluation or cross-column planning.
//! Boundary: the scan compiler consumes one `Slot` per primary-key column.

mod like;
mod slot;


use crate::{
    SEPARATOR_BYTE,
    codec::{self, ConstraintViolation, NullSentinel},
    obs::sink::{self, MetricsEvent},
    predicate::like::{LikeShape, parse_like},
    schema::ColumnDef,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use thiserror::Error as ThisError;
use tracing::debug;

// re-exports
pub use slot::{KeyRange, Slot};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

///
/// ColumnPredicate
///
/// One predicate on a single column, with literals already typed.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ColumnPredicate {
    Eq(Value),
    In(Vec<Value>),
    Ne(Value),
    NotIn(Vec<Value>),
    Compare { op: CompareOp, value: Value },
    Between { low: Value, high: Value },
    IsNull,
    IsNotNull,
    Like(String),
    NotLike(String),
}

///
/// BuiltSlot
///
/// A slot plus whether the original predicate must still be re-checked
/// against each scanned row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltSlot {
    pub slot: Slot,
    pub residual: bool,
}

impl BuiltSlot {
    #[must_use]
    pub const fn exact(slot: Slot) -> Self {
        Self {
            slot,
            residual: false,
        }
    }

    #[must_use]
    pub const fn residual(slot: Slot) -> Self {
        Self {
            slot,
            residual: true,
        }
    }

    /// Unconstrained slot; the predicate is evaluated entirely as a filter.
    #[must_use]
    pub const fn all() -> Self {
        Self::residual(Slot::All)
    }
}

///
/// PredicateUnsupported
///
/// A predicate that cannot be expressed as points or ranges over the
/// column's key bytes. Not fatal: the column degrades to `Slot::All`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("predicate on '{column}' is not expressible as a key slot: {reason}")]
pub struct PredicateUnsupported {
    pub column: String,
    pub reason: UnsupportedReason,
}

///
/// UnsupportedReason
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum UnsupportedReason {
    #[error("literal does not fit the column ({0})")]
    Literal(ConstraintViolation),

    #[error("LIKE requires a text column")]
    LikeOnNonText,

    #[error("LIKE prefix contains a zero byte")]
    ZeroBytePrefix,
}

/// Lower one predicate into a slot.
pub fn build_slot(
    column: &ColumnDef,
    predicate: &ColumnPredicate,
) -> Result<BuiltSlot, PredicateUnsupported> {
    let built = match predicate {
        ColumnPredicate::Eq(value) => match encode_point(column, value)? {
            Some(point) => BuiltSlot::exact(Slot::Points(vec![point])),
            None => BuiltSlot::exact(Slot::Empty),
        },
        ColumnPredicate::In(values) => {
            let mut points = Vec::with_capacity(values.len());
            for value in values {
                if let Some(point) = encode_point(column, value)? {
                    points.push(point);
                }
            }
            BuiltSlot::exact(Slot::points(points))
        }
        ColumnPredicate::Ne(value) => {
            if value.is_null() {
                BuiltSlot::exact(Slot::Empty)
            } else {
                BuiltSlot::all()
            }
        }
        ColumnPredicate::NotIn(_) | ColumnPredicate::NotLike(_) => BuiltSlot::all(),
        ColumnPredicate::Compare { op, value } => {
            let Some(bytes) = encode_literal(column, value)? else {
                return Ok(BuiltSlot::exact(Slot::Empty));
            };
            let range = match op {
                CompareOp::Lt => KeyRange::new(non_null_floor(column), Bound::Excluded(bytes)),
                CompareOp::Le => KeyRange::new(non_null_floor(column), Bound::Included(bytes)),
                CompareOp::Gt => KeyRange::new(Bound::Excluded(bytes), Bound::Unbounded),
                CompareOp::Ge => KeyRange::new(Bound::Included(bytes), Bound::Unbounded),
            };
            BuiltSlot::exact(Slot::ranges(without_null(column, range)))
        }
        ColumnPredicate::Between { low, high } => {
            match (encode_literal(column, low)?, encode_literal(column, high)?) {
                (Some(low), Some(high)) => BuiltSlot::exact(Slot::ranges(without_null(
                    column,
                    KeyRange::new(Bound::Included(low), Bound::Included(high)),
                ))),
                _ => BuiltSlot::exact(Slot::Empty),
            }
        }
        ColumnPredicate::IsNull => {
            if column.nullable() {
                BuiltSlot::exact(Slot::Points(vec![codec::null_encoding(
                    column.column_type(),
                )]))
            } else {
                BuiltSlot::exact(Slot::Empty)
            }
        }
        ColumnPredicate::IsNotNull => {
            if column.nullable() {
                BuiltSlot::exact(Slot::ranges(vec![KeyRange::new(
                    non_null_floor(column),
                    Bound::Unbounded,
                )]))
            } else {
                BuiltSlot::exact(Slot::All)
            }
        }
        ColumnPredicate::Like(pattern) => build_like(column, pattern)?,
    };

    Ok(built)
}

/// Lower every predicate on one column and intersect the results.
///
/// Unsupported predicates degrade to `Slot::All` with a residual; an empty
/// predicate list is unconstrained and exact.
#[must_use]
pub fn lower_column(column: &ColumnDef, predicates: &[ColumnPredicate]) -> BuiltSlot {
    let mut acc = BuiltSlot::exact(Slot::All);

    for predicate in predicates {
        let built = build_slot(column, predicate).unwrap_or_else(|err| {
            debug!(column = column.name(), reason = %err.reason, "predicate degraded to full column slot");
            sink::record(MetricsEvent::SlotDegraded);
            BuiltSlot::all()
        });

        acc = BuiltSlot {
            slot: acc.slot.intersect(&built.slot),
            residual: acc.residual || built.residual,
        };
    }

    acc
}

// Null literals never compare true, so they map to `None`.
fn encode_literal(
    column: &ColumnDef,
    value: &Value,
) -> Result<Option<Vec<u8>>, PredicateUnsupported> {
    if value.is_null() {
        return Ok(None);
    }

    codec::encode_column_with(column, value, NullSentinel::Shared)
        .map(Some)
        .map_err(|violation| PredicateUnsupported {
            column: column.name().to_string(),
            reason: UnsupportedReason::Literal(violation),
        })
}

// A literal holding the null encoding of a nullable column matches no stored
// value, since row keys reserve those bytes for null.
fn encode_point(
    column: &ColumnDef,
    value: &Value,
) -> Result<Option<Vec<u8>>, PredicateUnsupported> {
    Ok(encode_literal(column, value)?
        .filter(|bytes| !column.nullable() || *bytes != codec::null_encoding(column.column_type())))
}

fn without_null(column: &ColumnDef, range: KeyRange) -> Vec<KeyRange> {
    if !column.nullable() {
        return vec![range];
    }

    range
        .intersect(&KeyRange::new(non_null_floor(column), Bound::Unbounded))
        .into_iter()
        .collect()
}

// Lower bound excluding null for nullable columns (nulls sort first).
fn non_null_floor(column: &ColumnDef) -> Bound<Vec<u8>> {
    if column.nullable() {
        Bound::Excluded(codec::null_encoding(column.column_type()))
    } else {
        Bound::Unbounded
    }
}

fn build_like(column: &ColumnDef, pattern: &str) -> Result<BuiltSlot, PredicateUnsupported> {
    if !column.column_type().is_text() {
        return Err(PredicateUnsupported {
            column: column.name().to_string(),
            reason: UnsupportedReason::LikeOnNonText,
        });
    }

    let like = parse_like(pattern);

    if like.shape == LikeShape::Exact {
        return match encode_literal(column, &Value::Text(like.prefix))? {
            Some(point) => Ok(BuiltSlot::exact(Slot::Points(vec![point]))),
            None => Ok(BuiltSlot::exact(Slot::Empty)),
        };
    }

    if like.prefix.is_empty() {
        return Ok(BuiltSlot::all());
    }

    let prefix = like.prefix.into_bytes();
    if prefix.contains(&SEPARATOR_BYTE) {
        return Err(PredicateUnsupported {
            column: column.name().to_string(),
            reason: UnsupportedReason::ZeroBytePrefix,
        });
    }

    let upper = codec::increment_key(&prefix).map_or(Bound::Unbounded, Bound::Excluded);
    let slot = Slot::ranges(vec![KeyRange::new(Bound::Included(prefix), upper)]);

    Ok(if like.shape == LikeShape::PrefixOnly {
        BuiltSlot::exact(slot)
    } else {
        BuiltSlot::residual(slot)
    })
}
