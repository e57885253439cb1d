//! Module: schema
//! Responsibility: column definitions, primary-key ordinals, and table-level
//! schema invariants.
//! Does not own: value encoding or predicate lowering.
//! Boundary: every codec, compiler, and grouping call is bound to a `TableSchema`.

mod column;


use crate::MAX_PK_COLUMNS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

// re-exports
pub use column::{ColumnDef, ColumnRole, ColumnType};

///
/// SchemaError
///
/// Structural schema invariant failures detected at construction time.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("table '{table}' declares no primary-key columns")]
    NoPrimaryKey { table: String },

    #[error("table '{table}' declares {count} primary-key columns (max {max})")]
    TooManyPrimaryKeyColumns {
        table: String,
        count: usize,
        max: usize,
    },

    #[error("table '{table}' primary-key ordinals must be contiguous from 0; missing ordinal {missing}")]
    NonContiguousOrdinals { table: String, missing: usize },

    #[error("table '{table}' assigns primary-key ordinal {ordinal} more than once")]
    DuplicateOrdinal { table: String, ordinal: usize },

    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}' has a column with an empty name")]
    EmptyColumnName { table: String },

    #[error("column '{column}' declares an invalid width of {width}")]
    InvalidWidth { column: String, width: u32 },
}

///
/// TableSchemaDef
///
/// Unvalidated serde shape of a table schema.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
struct TableSchemaDef {
    name: String,
    columns: Vec<ColumnDef>,
}

///
/// TableSchema
///
/// Immutable, validated column layout of one table.
/// `pk` holds column indices ordered by primary-key ordinal.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "TableSchemaDef", into = "TableSchemaDef")]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    pk: Vec<usize>,
}

impl TableSchema {
    /// Validate column definitions and build the schema.
    pub fn try_new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self, SchemaError> {
        let name = name.into();

        // Phase 1: per-column shape checks.
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.name().is_empty() {
                return Err(SchemaError::EmptyColumnName { table: name });
            }
            if !seen.insert(column.name()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name().to_string(),
                });
            }
            column.column_type().validate_width(column.name())?;
        }

        // Phase 2: primary-key ordinals must be exactly 0..n.
        let mut by_ordinal: Vec<Option<usize>> = Vec::new();
        for (index, column) in columns.iter().enumerate() {
            let Some(ordinal) = column.pk_ordinal() else {
                continue;
            };
            if by_ordinal.len() <= ordinal {
                by_ordinal.resize(ordinal + 1, None);
            }
            if by_ordinal[ordinal].replace(index).is_some() {
                return Err(SchemaError::DuplicateOrdinal {
                    table: name,
                    ordinal,
                });
            }
        }

        if by_ordinal.is_empty() {
            return Err(SchemaError::NoPrimaryKey { table: name });
        }
        if by_ordinal.len() > MAX_PK_COLUMNS {
            return Err(SchemaError::TooManyPrimaryKeyColumns {
                table: name,
                count: by_ordinal.len(),
                max: MAX_PK_COLUMNS,
            });
        }

        let mut pk = Vec::with_capacity(by_ordinal.len());
        for (ordinal, slot) in by_ordinal.into_iter().enumerate() {
            let Some(index) = slot else {
                return Err(SchemaError::NonContiguousOrdinals {
                    table: name,
                    missing: ordinal,
                });
            };
            pk.push(index);
        }

        Ok(Self { name, columns, pk })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of primary-key columns.
    #[must_use]
    pub const fn pk_len(&self) -> usize {
        self.pk.len()
    }

    /// Primary-key column at `ordinal`.
    #[must_use]
    pub fn pk_column(&self, ordinal: usize) -> Option<&ColumnDef> {
        self.pk.get(ordinal).map(|&index| &self.columns[index])
    }

    /// Primary-key columns in ordinal order.
    pub fn pk_columns(&self) -> impl ExactSizeIterator<Item = &ColumnDef> + '_ {
        self.pk.iter().map(|&index| &self.columns[index])
    }

    /// Key-value (non-PK) columns in declaration order.
    pub fn kv_columns(&self) -> impl Iterator<Item = &ColumnDef> + '_ {
        self.columns.iter().filter(|column| !column.is_pk())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name() == name)
    }

    /// True when `ordinal` is the final primary-key position.
    #[must_use]
    pub const fn is_last_pk(&self, ordinal: usize) -> bool {
        ordinal + 1 == self.pk.len()
    }
}

impl TryFrom<TableSchemaDef> for TableSchema {
    type Error = SchemaError;

    fn try_from(def: TableSchemaDef) -> Result<Self, Self::Error> {
        Self::try_new(def.name, def.columns)
    }
}

impl From<TableSchema> for TableSchemaDef {
    fn from(schema: TableSchema) -> Self {
        Self {
            name: schema.name,
            columns: schema.columns,
        }
    }
}
