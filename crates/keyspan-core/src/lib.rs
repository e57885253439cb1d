//! Core runtime for Keyspan: typed values, table schemas, the order-preserving
//! row-key codec, the predicate slot model, the skip-scan range compiler, and
//! grouping keys.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod config;
pub mod error;
pub mod group;
pub mod key;
pub mod obs;
pub mod predicate;
pub mod scan;
pub mod schema;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Separator byte terminating a variable-length component that is not the
/// last component of a composite key.
pub const SEPARATOR_BYTE: u8 = 0x00;

/// Maximum number of primary-key columns a table may declare.
///
/// Bounds the width of the skip-scan odometer and keeps the null bitmap of
/// a grouping key within a handful of bytes for common shapes.
pub const MAX_PK_COLUMNS: usize = 32;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        key::RowKey,
        predicate::{ColumnPredicate, Slot},
        scan::{ScanPlan, ScanRange},
        schema::{ColumnDef, ColumnType, TableSchema},
        value::Value,
    };
}
