//! Module: codec::bounds
//! Responsibility: byte-string neighbourhood helpers for range bounds.
//! Does not own: slot semantics or key framing.
//! Boundary: consumed by predicate lowering and the scan compiler.

use crate::SEPARATOR_BYTE;

/// Smallest byte string strictly greater than every string prefixed by
/// `bytes`. Trailing `0xFF` bytes carry; `None` means no such bound exists
/// (empty input or all `0xFF`), which callers treat as unbounded.
#[must_use]
pub fn increment_key(bytes: &[u8]) -> Option<Vec<u8>> {
    let keep = bytes.iter().rposition(|&b| b != 0xFF)?;
    let mut next = bytes[..=keep].to_vec();
    next[keep] += 1;

    Some(next)
}

/// Immediate byte-order successor of `bytes`: `bytes` followed by `0x00`.
#[must_use]
pub fn key_successor(bytes: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(bytes.len() + 1);
    next.extend_from_slice(bytes);
    next.push(SEPARATOR_BYTE);

    next
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_bumps_last_byte() {
        assert_eq!(increment_key(b"xy"), Some(b"xz".to_vec()));
        assert_eq!(increment_key(b"abcd\0"), Some(b"abcd\x01".to_vec()));
    }

    #[test]
    fn increment_carries_over_trailing_ff() {
        assert_eq!(increment_key(&[0x01, 0xFF, 0xFF]), Some(vec![0x02]));
    }

    #[test]
    fn increment_of_empty_or_all_ff_is_unbounded() {
        assert_eq!(increment_key(&[]), None);
        assert_eq!(increment_key(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn successor_appends_zero() {
        assert_eq!(key_successor(b"xy"), b"xy\0");
        assert!(key_successor(b"xy").as_slice() > b"xy".as_slice());
        assert!(key_successor(b"xy").as_slice() < b"xy\x01".as_slice());
    }
}
