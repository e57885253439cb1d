// Signed integers flip the sign bit so two's-complement order matches
// unsigned big-endian byte order.

const I32_SIGN_BIT: u32 = 1 << 31;
const I64_SIGN_BIT: u64 = 1 << 63;

#[must_use]
pub(super) const fn ordered_i32_bytes(value: i32) -> [u8; 4] {
    (value.cast_unsigned() ^ I32_SIGN_BIT).to_be_bytes()
}

#[must_use]
pub(super) const fn ordered_i64_bytes(value: i64) -> [u8; 8] {
    (value.cast_unsigned() ^ I64_SIGN_BIT).to_be_bytes()
}

/// Caller guarantees `bytes.len() >= 4`.
pub(super) fn decode_ordered_i32(bytes: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);

    (u32::from_be_bytes(buf) ^ I32_SIGN_BIT).cast_signed()
}

/// Caller guarantees `bytes.len() >= 8`.
pub(super) fn decode_ordered_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);

    (u64::from_be_bytes(buf) ^ I64_SIGN_BIT).cast_signed()
}
