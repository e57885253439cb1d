//! Shared table shapes used across module tests.

use crate::{
    schema::{ColumnDef, ColumnType, TableSchema},
    value::Value,
};

pub(crate) const VARCHAR: ColumnType = ColumnType::Varchar { max_len: None };

/// `BTABLE`: PK (A_STRING varchar, A_ID char(3), B_STRING varchar).
pub(crate) fn btable_schema() -> TableSchema {
    TableSchema::try_new(
        "BTABLE",
        vec![
            ColumnDef::pk("A_STRING", VARCHAR, 0),
            ColumnDef::pk("A_ID", ColumnType::Char { width: 3 }, 1),
            ColumnDef::pk("B_STRING", VARCHAR, 2),
            ColumnDef::kv("A_INTEGER", ColumnType::Integer),
            ColumnDef::kv("B_INTEGER", ColumnType::Integer),
            ColumnDef::kv("C_INTEGER", ColumnType::Integer),
            ColumnDef::kv("C_STRING", ColumnType::Varchar { max_len: Some(2) }),
            ColumnDef::kv("D_STRING", ColumnType::Varchar { max_len: Some(3) }),
            ColumnDef::kv("E_STRING", ColumnType::Char { width: 10 })
                .not_null()
                .with_default(Value::from("0123456789")),
        ],
    )
    .expect("BTABLE schema should validate")
}

/// PK values of the four canonical BTABLE rows, in key order.
pub(crate) fn btable_keys() -> Vec<[Value; 3]> {
    vec![
        [Value::from("abc"), Value::from("111"), Value::from("x")],
        [Value::from("abcd"), Value::from("222"), Value::from("xy")],
        [Value::from("abcd"), Value::from("222"), Value::from("xyz")],
        [Value::from("abcd"), Value::from("222"), Value::from("xyzz")],
    ]
}

/// `PTSDB`: PK (INST varchar, HOST varchar, DATE date not null), KV VAL bigint.
pub(crate) fn ptsdb_schema() -> TableSchema {
    TableSchema::try_new(
        "PTSDB",
        vec![
            ColumnDef::pk("INST", VARCHAR, 0),
            ColumnDef::pk("HOST", VARCHAR, 1),
            ColumnDef::pk("DATE", ColumnType::Date, 2).not_null(),
            ColumnDef::kv("VAL", ColumnType::Long),
        ],
    )
    .expect("PTSDB schema should validate")
}
