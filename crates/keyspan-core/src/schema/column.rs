use crate::{schema::SchemaError, value::Value};
use serde::{Deserialize, Serialize};

///
/// ColumnType
///
/// Closed set of supported column types. Fixed-width types have a constant
/// encoded size; `Varchar` is the only variable-length type.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnType {
    Boolean,
    Integer,
    Long,
    Date,
    Char { width: u32 },
    Varchar { max_len: Option<u32> },
    Binary { width: u32 },
}

impl ColumnType {
    /// Encoded byte count for fixed-width types, `None` for `Varchar`.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Boolean => Some(1),
            Self::Integer => Some(4),
            Self::Long | Self::Date => Some(8),
            Self::Char { width } | Self::Binary { width } => Some(width as usize),
            Self::Varchar { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_variable(self) -> bool {
        matches!(self, Self::Varchar { .. })
    }

    /// Text-like types accept LIKE patterns.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Char { .. } | Self::Varchar { .. })
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Long => "BIGINT",
            Self::Date => "DATE",
            Self::Char { .. } => "CHAR",
            Self::Varchar { .. } => "VARCHAR",
            Self::Binary { .. } => "BINARY",
        }
    }

    pub(super) fn validate_width(self, column: &str) -> Result<(), SchemaError> {
        let width = match self {
            Self::Char { width } | Self::Binary { width } => width,
            Self::Varchar {
                max_len: Some(max_len),
            } => max_len,
            _ => return Ok(()),
        };

        if width == 0 {
            return Err(SchemaError::InvalidWidth {
                column: column.to_string(),
                width,
            });
        }

        Ok(())
    }
}

///
/// ColumnRole
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ColumnRole {
    PrimaryKey { ordinal: usize },
    KeyValue,
}

///
/// ColumnDef
///
/// One column definition. Columns are nullable unless declared otherwise.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnDef {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default = "default_nullable")]
    nullable: bool,
    role: ColumnRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnDef {
    /// Nullable primary-key column at `ordinal`.
    #[must_use]
    pub fn pk(name: impl Into<String>, column_type: ColumnType, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            role: ColumnRole::PrimaryKey { ordinal },
            default: None,
        }
    }

    /// Nullable key-value column.
    #[must_use]
    pub fn kv(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            role: ColumnRole::KeyValue,
            default: None,
        }
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        self.column_type
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub const fn role(&self) -> ColumnRole {
        self.role
    }

    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub const fn pk_ordinal(&self) -> Option<usize> {
        match self.role {
            ColumnRole::PrimaryKey { ordinal } => Some(ordinal),
            ColumnRole::KeyValue => None,
        }
    }

    #[must_use]
    pub const fn is_pk(&self) -> bool {
        self.pk_ordinal().is_some()
    }
}
