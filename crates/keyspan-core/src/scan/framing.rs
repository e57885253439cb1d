use crate::{
    SEPARATOR_BYTE,
    codec::{increment_key, key_successor},
    schema::ColumnType,
};
use serde::{Deserialize, Serialize};
use std::ops::Bound;

///
/// Framing
///
/// How one column's bytes sit inside a composite key.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) enum Framing {
    Fixed { width: usize },
    /// Variable-length, followed by a separator.
    Separated,
    /// Variable-length, last primary-key column.
    Terminal,
}

impl Framing {
    pub(crate) const fn of(column_type: ColumnType, is_last: bool) -> Self {
        match column_type.fixed_width() {
            Some(width) => Self::Fixed { width },
            None if is_last => Self::Terminal,
            None => Self::Separated,
        }
    }

    /// Split one column's body off the front of `bytes`, returning the
    /// body and the number of bytes consumed (separator included).
    pub(crate) fn split(self, bytes: &[u8]) -> (&[u8], usize) {
        match self {
            Self::Fixed { width } => {
                let n = width.min(bytes.len());
                (&bytes[..n], n)
            }
            Self::Separated => match bytes.iter().position(|&b| b == SEPARATOR_BYTE) {
                Some(pos) => (&bytes[..pos], pos + 1),
                None => (bytes, bytes.len()),
            },
            Self::Terminal => (bytes, bytes.len()),
        }
    }

    /// Append a point value to `prefix`.
    pub(crate) fn push_point(self, prefix: &mut Vec<u8>, value: &[u8]) {
        prefix.extend_from_slice(value);
        if self == Self::Separated {
            prefix.push(SEPARATOR_BYTE);
        }
    }

    /// Exclusive stop covering every key that carries `prefix` (which
    /// already ends with this column's point). Empty means unbounded.
    pub(crate) fn point_stop(self, prefix: &[u8]) -> Vec<u8> {
        match self {
            Self::Terminal => key_successor(prefix),
            Self::Fixed { .. } | Self::Separated => increment_key(prefix).unwrap_or_default(),
        }
    }

    /// First key at or above a column lower bound under `prefix`.
    /// `None` means no key can satisfy the bound.
    pub(crate) fn lower_key(self, prefix: &[u8], bound: Bound<&[u8]>) -> Option<Vec<u8>> {
        let mut key = prefix.to_vec();
        match bound {
            Bound::Unbounded => Some(key),
            Bound::Included(value) => {
                self.push_point(&mut key, value);
                Some(key)
            }
            Bound::Excluded(value) => {
                self.push_point(&mut key, value);
                match self {
                    Self::Terminal => Some(key_successor(&key)),
                    Self::Fixed { .. } | Self::Separated => increment_key(&key),
                }
            }
        }
    }

    /// Exclusive stop key for a column upper bound under `prefix`.
    /// Empty means unbounded.
    pub(crate) fn upper_key(self, prefix: &[u8], bound: Bound<&[u8]>) -> Vec<u8> {
        let mut key = prefix.to_vec();
        match bound {
            Bound::Unbounded => increment_key(prefix).unwrap_or_default(),
            Bound::Excluded(value) => {
                self.push_point(&mut key, value);
                key
            }
            Bound::Included(value) => {
                self.push_point(&mut key, value);
                match self {
                    Self::Terminal => key_successor(&key),
                    Self::Fixed { .. } | Self::Separated => increment_key(&key).unwrap_or_default(),
                }
            }
        }
    }
}

/// Borrow a byte bound.
pub(crate) fn bound_bytes(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    bound.as_ref().map(Vec::as_slice)
}
