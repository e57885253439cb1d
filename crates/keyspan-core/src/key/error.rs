use thiserror::Error as ThisError;

///
/// KeyDecodeError
///
/// Decode-time inconsistency between stored bytes and the table schema.
/// Never produced for bytes this codec wrote against the same schema.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyDecodeError {
    #[error("malformed key: column '{column}' needs {needed} bytes, {remaining} remaining")]
    Truncated {
        column: String,
        needed: usize,
        remaining: usize,
    },

    #[error("malformed key: column '{column}' holds invalid utf-8")]
    InvalidUtf8 { column: String },

    #[error("malformed key: column '{column}' holds invalid boolean byte {byte:#04x}")]
    InvalidBoolean { column: String, byte: u8 },

    #[error("malformed key: {len} trailing bytes after the last primary-key column")]
    TrailingBytes { len: usize },

    #[error("malformed key: cell '{column}' does not name a key-value column")]
    UnknownCell { column: String },
}
