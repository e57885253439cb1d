//! Module: value
//! Responsibility: typed column values and their natural (SQL) ordering.
//! Does not own: byte encodings or column-type validation.
//! Boundary: codec/key/group modules consume `Value` as their logical input.

mod compare;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

// re-exports
pub use compare::tuple_cmp;

///
/// Value
///
/// One typed column value as handed in by the query layer or produced by
/// key/cell decoding. Empty text is SQL null.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    Text(String),
    Binary(Vec<u8>),
}

impl Value {
    /// True for `Null` and for empty text, which the codec stores as null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Collapse empty text into `Null`; every other value is returned as-is.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_null() { Self::Null } else { self }
    }

    /// Stable label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Long(_) => "bigint",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
