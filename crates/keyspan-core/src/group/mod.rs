//! Module: group
//! Responsibility: grouping keys built from arbitrary column lists.
//! Does not own: aggregate state or accumulation semantics.
//! Boundary: aggregation executors key their state by `GroupKey`.

mod bitmap;
mod fold;


use crate::{
    SEPARATOR_BYTE,
    codec::{self, NullSentinel},
    error::InternalError,
    schema::ColumnDef,
    value::Value,
};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeSet};

// re-exports
pub use bitmap::NullBitmap;
pub use fold::fold_contiguous_groups;

///
/// GroupKey
///
/// Encoded grouping tuple plus a per-column null bitmap. The bitmap, not the
/// bytes, decides whether a column was null: a fixed-width null encodes
/// exactly like that type's minimum value.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct GroupKey {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    nulls: NullBitmap,
}

impl GroupKey {
    /// Encode `values` under `columns` using composite-key separator rules.
    /// Nulls are accepted for every column.
    pub fn build(columns: &[ColumnDef], values: &[Value]) -> Result<Self, InternalError> {
        if columns.len() != values.len() {
            return Err(InternalError::group_invariant(format!(
                "group key expects {} values, got {}",
                columns.len(),
                values.len()
            )));
        }

        let mut bytes = Vec::new();
        let mut nulls = NullBitmap::with_len(columns.len());
        let last = columns.len().saturating_sub(1);

        for (index, (column, value)) in columns.iter().zip(values).enumerate() {
            if value.is_null() {
                nulls.set(index);
                bytes.extend_from_slice(&codec::null_encoding(column.column_type()));
                if column.column_type().is_variable() && index != last {
                    bytes.push(SEPARATOR_BYTE);
                }
                continue;
            }
            codec::encode_framed(
                column,
                value,
                index == last,
                NullSentinel::Shared,
                &mut bytes,
            )?;
        }

        Ok(Self { bytes, nulls })
    }

    /// Decode back to values, trusting the null bitmap over the bytes.
    pub fn decode(&self, columns: &[ColumnDef]) -> Result<Vec<Value>, InternalError> {
        if columns.len() != self.nulls.len() {
            return Err(InternalError::group_invariant(format!(
                "group key holds {} columns, decode asked for {}",
                self.nulls.len(),
                columns.len()
            )));
        }

        let mut values = Vec::with_capacity(columns.len());
        let mut offset = 0;
        let last = columns.len().saturating_sub(1);

        for (index, column) in columns.iter().enumerate() {
            let (value, consumed) =
                codec::decode_present(column, &self.bytes[offset..], index == last)?;
            values.push(if self.nulls.get(index) {
                Value::Null
            } else {
                value
            });
            offset += consumed;
        }

        if offset != self.bytes.len() {
            return Err(InternalError::key_corruption(format!(
                "group key has {} trailing bytes",
                self.bytes.len() - offset
            )));
        }

        Ok(values)
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn nulls(&self) -> &NullBitmap {
        &self.nulls
    }

    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        self.nulls.get(index)
    }
}

// Encoded bytes first; on ties a null column sorts before a non-null one.
impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes
            .cmp(&other.bytes)
            .then_with(|| self.nulls.cmp_null_first(&other.nulls))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

///
/// GroupKeySet
///
/// Distinct grouping keys in output order.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct GroupKeySet(#[into_iterator(owned, ref)] BTreeSet<GroupKey>);

impl GroupKeySet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a key, returning `true` when it was not already present.
    pub fn insert(&mut self, key: GroupKey) -> bool {
        self.0.insert(key)
    }
}

impl FromIterator<GroupKey> for GroupKeySet {
    fn from_iter<I: IntoIterator<Item = GroupKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
