use crate::{
    codec::increment_key,
    predicate::Slot,
    scan::framing::{Framing, bound_bytes},
    schema::TableSchema,
};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use tracing::trace;

///
/// Navigation
///
/// Outcome of checking one scanned key against a skip-scan filter.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Navigation {
    Include,
    /// Jump to this key; nothing between the current key and it matches.
    Seek(Vec<u8>),
    /// No key at or after the current one can match.
    Done,
}

///
/// FilterColumn
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct FilterColumn {
    name: String,
    framing: Framing,
    slot: Slot,
}

///
/// SkipScanFilter
///
/// Enforces slots the scan ranges cannot express. Every primary-key column
/// up to the last constrained one is kept so keys can be split.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SkipScanFilter {
    columns: Vec<FilterColumn>,
}

impl SkipScanFilter {
    /// Build a filter for `slots`, treating the first `enforced` ordinals as
    /// already guaranteed by the ranges. `None` when nothing is left to check.
    #[must_use]
    pub fn new(schema: &TableSchema, slots: &[Slot], enforced: usize) -> Option<Self> {
        let last_constrained = slots
            .iter()
            .enumerate()
            .skip(enforced)
            .rfind(|(_, slot)| !slot.is_all())
            .map(|(ordinal, _)| ordinal)?;

        let columns = schema
            .pk_columns()
            .zip(slots)
            .enumerate()
            .take(last_constrained + 1)
            .map(|(ordinal, (column, slot))| FilterColumn {
                name: column.name().to_string(),
                framing: Framing::of(column.column_type(), schema.is_last_pk(ordinal)),
                slot: if ordinal < enforced {
                    Slot::All
                } else {
                    slot.clone()
                },
            })
            .collect();

        Some(Self { columns })
    }

    /// Names of the columns this filter actually checks.
    pub fn constrained_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns
            .iter()
            .filter(|column| !column.slot.is_all())
            .map(|column| column.name.as_str())
    }

    /// Decide whether `key` matches, or where the next candidate starts.
    #[must_use]
    pub fn navigate(&self, key: &[u8]) -> Navigation {
        let mut offset = 0;

        for column in &self.columns {
            let (body, consumed) = column.framing.split(&key[offset..]);
            if !column.slot.matches(body) {
                let navigation = seek_past(key, offset, column, body);
                trace!(column = column.name.as_str(), ?navigation, "skip-scan mismatch");
                return navigation;
            }
            offset += consumed;
        }

        Navigation::Include
    }
}

// `body` at `offset` failed `column.slot`; find the next key that could pass.
fn seek_past(key: &[u8], offset: usize, column: &FilterColumn, body: &[u8]) -> Navigation {
    let prefix = &key[..offset];

    if let Some(lower) = next_lower(&column.slot, body)
        && let Some(seek) = column.framing.lower_key(prefix, lower)
        && seek.as_slice() > key
    {
        return Navigation::Seek(seek);
    }

    // Past every alternative: move on to the next value of an earlier column.
    if prefix.is_empty() {
        return Navigation::Done;
    }
    increment_key(prefix).map_or(Navigation::Done, Navigation::Seek)
}

// Lower bound of the first alternative lying entirely above `body`.
fn next_lower<'a>(slot: &'a Slot, body: &[u8]) -> Option<Bound<&'a [u8]>> {
    match slot {
        Slot::Points(points) => points
            .iter()
            .find(|point| point.as_slice() > body)
            .map(|point| Bound::Included(point.as_slice())),
        Slot::Ranges(ranges) => ranges
            .iter()
            .find(|range| match &range.lower {
                Bound::Unbounded => false,
                Bound::Included(lower) => body < lower.as_slice(),
                Bound::Excluded(lower) => body <= lower.as_slice(),
            })
            .map(|range| bound_bytes(&range.lower)),
        Slot::All | Slot::Empty => None,
    }
}
