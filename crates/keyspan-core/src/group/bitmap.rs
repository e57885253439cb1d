use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// NullBitmap
///
/// One bit per grouping column; a set bit marks a null value.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct NullBitmap {
    #[serde(with = "serde_bytes")]
    bits: Vec<u8>,
    len: usize,
}

impl NullBitmap {
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(8)],
            len,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, index: usize) {
        if index < self.len {
            self.bits[index / 8] |= 1 << (index % 8);
        }
    }

    /// Out-of-range indexes read as non-null.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.bits[index / 8] & (1 << (index % 8)) != 0
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Column-by-column order where null precedes non-null.
    #[must_use]
    pub fn cmp_null_first(&self, other: &Self) -> Ordering {
        for index in 0..self.len.min(other.len) {
            match (self.get(index), other.get(index)) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        self.len.cmp(&other.len)
    }
}
