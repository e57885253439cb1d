use crate::{
    codec,
    config::ScanConfig,
    key::RowKey,
    obs::sink::{metrics_report, metrics_reset_all},
    predicate::{ColumnPredicate, CompareOp, Slot, lower_column},
    scan::{
        MemoryStore, Navigation, ScanPlan, ScanRange, SkipScanFilter, compile,
        compile::merge_ranges, compile_predicates, execute, execute_parallel,
    },
    schema::{ColumnDef, ColumnType, TableSchema},
    test_fixtures::{btable_keys, btable_schema, ptsdb_schema},
    value::Value,
};
use proptest::prelude::*;

fn btable_store() -> MemoryStore<usize> {
    let schema = btable_schema();
    btable_keys()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let key = RowKey::encode(&schema, row).expect("key should encode");
            (key.into_bytes(), index)
        })
        .collect()
}

fn plan(schema: &TableSchema, predicates: &[(&str, ColumnPredicate)]) -> ScanPlan {
    compile_predicates(schema, predicates, &ScanConfig::default())
        .expect("predicates should compile")
        .plan
}

fn matched_rows(store: &MemoryStore<usize>, plan: &ScanPlan) -> Vec<usize> {
    execute(store, plan)
        .rows
        .into_iter()
        .map(|(_, row)| row)
        .collect()
}

fn eq(value: &str) -> ColumnPredicate {
    ColumnPredicate::Eq(Value::from(value))
}

#[test]
fn terminal_greater_than_yields_one_tight_range() {
    let schema = btable_schema();
    let plan = plan(
        &schema,
        &[
            ("A_STRING", eq("abcd")),
            ("A_ID", eq("222")),
            (
                "B_STRING",
                ColumnPredicate::Compare {
                    op: CompareOp::Gt,
                    value: Value::from("xy"),
                },
            ),
        ],
    );

    assert_eq!(
        plan.ranges(),
        [ScanRange::new(
            b"abcd\x00222xy\x00".to_vec(),
            b"abcd\x00223".to_vec()
        )]
    );
    assert!(!plan.uses_skip_scan());
    assert_eq!(matched_rows(&btable_store(), &plan), [2, 3]);
}

#[test]
fn all_point_equalities_yield_one_exact_range() {
    let schema = btable_schema();
    let plan = plan(
        &schema,
        &[
            ("A_STRING", eq("abcd")),
            ("A_ID", eq("222")),
            ("B_STRING", eq("xyz")),
        ],
    );

    assert_eq!(
        plan.ranges(),
        [ScanRange::new(
            b"abcd\x00222xyz".to_vec(),
            b"abcd\x00222xyz\x00".to_vec()
        )]
    );
    assert_eq!(matched_rows(&btable_store(), &plan), [2]);
}

#[test]
fn leading_equality_does_not_match_longer_strings() {
    let schema = btable_schema();
    let plan = plan(&schema, &[("A_STRING", eq("abc"))]);

    assert_eq!(
        plan.ranges(),
        [ScanRange::new(b"abc\x00".to_vec(), b"abc\x01".to_vec())]
    );
    assert_eq!(matched_rows(&btable_store(), &plan), [0]);
}

#[test]
fn in_lists_cross_multiply_into_sorted_ranges() {
    let schema = btable_schema();
    let plan = plan(
        &schema,
        &[
            (
                "A_STRING",
                ColumnPredicate::In(vec![Value::from("abcd"), Value::from("abc")]),
            ),
            (
                "A_ID",
                ColumnPredicate::In(vec![Value::from("222"), Value::from("111")]),
            ),
        ],
    );

    let starts: Vec<_> = plan.ranges().iter().map(|r| r.start.clone()).collect();
    assert_eq!(
        starts,
        [
            b"abc\x00111".to_vec(),
            b"abc\x00222".to_vec(),
            b"abcd\x00111".to_vec(),
            b"abcd\x00222".to_vec(),
        ]
    );
    assert_eq!(matched_rows(&btable_store(), &plan), [0, 1, 2, 3]);
}

#[test]
fn empty_slot_compiles_to_no_ranges() {
    let schema = btable_schema();
    let plan = plan(&schema, &[("A_STRING", eq("")), ("B_STRING", eq(""))]);

    assert!(plan.is_empty());
    assert!(matched_rows(&btable_store(), &plan).is_empty());
}

#[test]
fn unconstrained_scan_covers_whole_table() {
    let schema = btable_schema();
    let plan = plan(&schema, &[]);

    assert_eq!(plan.ranges(), [ScanRange::full()]);
    assert_eq!(matched_rows(&btable_store(), &plan), [0, 1, 2, 3]);
}

#[test]
fn non_leading_equality_uses_skip_scan() {
    metrics_reset_all();
    let schema = btable_schema();
    let plan = plan(&schema, &[("B_STRING", eq("xyz"))]);

    assert_eq!(plan.ranges(), [ScanRange::full()]);
    let filter = plan.key_filter().expect("skip-scan filter");
    assert_eq!(filter.constrained_columns().collect::<Vec<_>>(), ["B_STRING"]);

    let output = execute(&btable_store(), &plan);
    let rows: Vec<_> = output.rows.iter().map(|(_, row)| *row).collect();
    assert_eq!(rows, [2]);
    assert!(output.stats.seeks >= 1);

    let counters = metrics_report().counters;
    assert_eq!(counters.plans_skip_scan, 1);
    assert_eq!(counters.rows_matched, 1);
}

#[test]
fn constrained_column_after_range_is_filtered() {
    let schema = btable_schema();
    let plan = plan(
        &schema,
        &[
            (
                "A_STRING",
                ColumnPredicate::Compare {
                    op: CompareOp::Ge,
                    value: Value::from("abc"),
                },
            ),
            ("A_ID", eq("222")),
        ],
    );

    assert!(plan.uses_skip_scan());
    assert_eq!(matched_rows(&btable_store(), &plan), [1, 2, 3]);
}

#[test]
fn like_prefix_on_terminal_column_scans_prefix_range() {
    let schema = btable_schema();
    let compiled = compile_predicates(
        &schema,
        &[
            ("A_STRING", eq("abcd")),
            ("A_ID", eq("222")),
            ("B_STRING", ColumnPredicate::Like("xyz%".to_string())),
        ],
        &ScanConfig::default(),
    )
    .expect("compile");

    assert!(!compiled.residual);
    assert_eq!(
        compiled.plan.ranges(),
        [ScanRange::new(
            b"abcd\x00222xyz".to_vec(),
            b"abcd\x00222xy{".to_vec()
        )]
    );
    assert_eq!(matched_rows(&btable_store(), &compiled.plan), [2, 3]);
}

#[test]
fn like_with_inner_wildcard_keeps_residual() {
    let schema = btable_schema();
    let compiled = compile_predicates(
        &schema,
        &[("A_STRING", ColumnPredicate::Like("ab_d%".to_string()))],
        &ScanConfig::default(),
    )
    .expect("compile");

    assert!(compiled.residual);
    assert_eq!(
        compiled.plan.ranges(),
        [ScanRange::new(b"ab\x00".to_vec(), b"ac\x00".to_vec())]
    );
}

#[test]
fn kv_predicates_force_residual() {
    let schema = btable_schema();
    let compiled = compile_predicates(
        &schema,
        &[
            ("A_STRING", eq("abc")),
            ("A_INTEGER", ColumnPredicate::Eq(Value::Integer(1))),
        ],
        &ScanConfig::default(),
    )
    .expect("compile");

    assert!(compiled.residual);
}

#[test]
fn unknown_predicate_column_is_rejected() {
    let schema = btable_schema();
    let err = compile_predicates(&schema, &[("NOPE", eq("x"))], &ScanConfig::default())
        .expect_err("unknown column");

    assert!(err.message.contains("NOPE"));
}

#[test]
fn too_many_slots_is_an_invariant_error() {
    let schema = btable_schema();
    let slots = [Slot::All, Slot::All, Slot::All, Slot::All];
    let err = compile(&schema, &slots, &ScanConfig::default()).expect_err("extra slot");

    assert_eq!(err.display_with_class().split(':').next(), Some("scan"));
}

#[test]
fn range_cap_collapses_plan_but_keeps_results() {
    metrics_reset_all();
    let schema = btable_schema();
    let predicates = [
        (
            "A_ID",
            ColumnPredicate::In(vec![Value::from("111"), Value::from("222")]),
        ),
        (
            "A_STRING",
            ColumnPredicate::In(vec![Value::from("abc"), Value::from("abcd")]),
        ),
    ];
    let config = ScanConfig {
        max_scan_ranges: 3,
        ..ScanConfig::default()
    };

    let compiled = compile_predicates(&schema, &predicates, &config).expect("compile");
    assert!(compiled.plan.is_degraded());
    assert_eq!(
        compiled.plan.ranges(),
        [ScanRange::new(b"abc\x00111".to_vec(), b"abcd\x00223".to_vec())]
    );
    assert!(compiled.plan.uses_skip_scan());
    assert_eq!(metrics_report().counters.plans_degraded, 1);

    let collapsed = matched_rows(&btable_store(), &compiled.plan);
    let exact = matched_rows(&btable_store(), &plan(&schema, &predicates));
    assert_eq!(collapsed, exact);
}

#[test]
fn disabled_skip_scan_leaves_residual() {
    let schema = btable_schema();
    let config = ScanConfig {
        skip_scan: false,
        ..ScanConfig::default()
    };
    let compiled =
        compile_predicates(&schema, &[("B_STRING", eq("xyz"))], &config).expect("compile");

    assert!(!compiled.plan.uses_skip_scan());
    assert!(compiled.residual);
}

#[test]
fn merge_coalesces_overlapping_and_abutting_ranges() {
    let merged = merge_ranges(vec![
        ScanRange::new(b"m".to_vec(), b"p".to_vec()),
        ScanRange::new(b"a".to_vec(), b"c".to_vec()),
        ScanRange::new(b"c".to_vec(), b"e".to_vec()),
        ScanRange::new(b"o".to_vec(), Vec::new()),
        ScanRange::new(b"x".to_vec(), b"z".to_vec()),
    ]);

    assert_eq!(
        merged,
        [
            ScanRange::new(b"a".to_vec(), b"e".to_vec()),
            ScanRange::new(b"m".to_vec(), Vec::new()),
        ]
    );
}

fn ptsdb_store(rows: &[(Value, Value, i64)]) -> (TableSchema, MemoryStore<usize>) {
    let schema = ptsdb_schema();
    let store = rows
        .iter()
        .enumerate()
        .map(|(index, (inst, host, date))| {
            let key = RowKey::encode(&schema, &[inst.clone(), host.clone(), Value::Date(*date)])
                .expect("key should encode");
            (key.into_bytes(), index)
        })
        .collect();

    (schema, store)
}

#[test]
fn skip_scan_on_trailing_date_seeks_per_prefix() {
    let rows = [
        (Value::from("i1"), Value::from("h1"), 1000),
        (Value::from("i1"), Value::from("h1"), 2000),
        (Value::from("i1"), Value::from("h2"), 500),
        (Value::from("i1"), Value::from("h2"), 1000),
        (Value::from("i2"), Value::Null, 1000),
        (Value::from("i2"), Value::from("h1"), 3000),
    ];
    let (schema, store) = ptsdb_store(&rows);
    let plan = plan(&schema, &[("DATE", ColumnPredicate::Eq(Value::Date(1000)))]);

    let output = execute(&store, &plan);
    let matched: Vec<_> = output.rows.iter().map(|(_, row)| *row).collect();
    assert_eq!(matched, [0, 3, 4]);
    assert!(output.stats.seeks >= 2);
}

#[test]
fn is_null_on_pk_scans_the_null_point() {
    let rows = [
        (Value::from("i1"), Value::Null, 1),
        (Value::from("i1"), Value::from("h"), 1),
        (Value::from("i2"), Value::Null, 2),
    ];
    let (schema, store) = ptsdb_store(&rows);
    let plan = plan(
        &schema,
        &[("INST", eq("i1")), ("HOST", ColumnPredicate::IsNull)],
    );

    assert_eq!(
        plan.ranges(),
        [ScanRange::new(b"i1\x00\x00".to_vec(), b"i1\x00\x01".to_vec())]
    );
    assert_eq!(matched_rows(&store, &plan), [0]);
}

fn nullable_int_store() -> (TableSchema, MemoryStore<&'static str>) {
    let schema = TableSchema::try_new(
        "NTABLE",
        vec![
            ColumnDef::pk("N", ColumnType::Integer, 0),
            ColumnDef::pk("S", ColumnType::Varchar { max_len: None }, 1),
        ],
    )
    .expect("schema");
    let rows = [
        (Value::Null, "null-row"),
        (Value::Integer(i32::MIN + 1), "low-row"),
        (Value::Integer(5), "five-row"),
    ];
    let store = rows
        .into_iter()
        .map(|(n, label)| {
            let key = RowKey::encode(&schema, &[n, Value::from(label)]).expect("key");
            (key.into_bytes(), label)
        })
        .collect();

    (schema, store)
}

#[test]
fn null_encoding_literal_never_matches_null_rows() {
    let (schema, store) = nullable_int_store();
    let scan = |predicate: ColumnPredicate| {
        let compiled = compile_predicates(&schema, &[("N", predicate)], &ScanConfig::default())
            .expect("compile");
        assert!(!compiled.residual);
        execute(&store, &compiled.plan)
            .rows
            .into_iter()
            .map(|(_, label)| label)
            .collect::<Vec<_>>()
    };
    let min = Value::Integer(i32::MIN);

    assert!(scan(ColumnPredicate::Eq(min.clone())).is_empty());
    assert_eq!(
        scan(ColumnPredicate::Compare {
            op: CompareOp::Ge,
            value: min.clone(),
        }),
        ["low-row", "five-row"]
    );
    assert_eq!(
        scan(ColumnPredicate::Between {
            low: min,
            high: Value::Integer(0),
        }),
        ["low-row"]
    );
    assert_eq!(scan(ColumnPredicate::IsNull), ["null-row"]);
}

#[test]
fn unbounded_range_contains_everything_past_start() {
    let open = ScanRange::new(b"b".to_vec(), Vec::new());
    let closed = ScanRange::new(b"b".to_vec(), b"c".to_vec());

    assert!(open.is_unbounded_above() && !closed.is_unbounded_above());
    assert!(open.contains(b"\xff\xff") && !open.is_past(b"\xff\xff"));
    assert!(!open.contains(b"a"));
    assert!(closed.contains(b"bz") && closed.is_past(b"c") && !closed.contains(b"c"));
}

#[test]
fn date_window_intersects_into_one_range() {
    let rows = [
        (Value::from("i"), Value::from("h"), 5),
        (Value::from("i"), Value::from("h"), 10),
        (Value::from("i"), Value::from("h"), 15),
        (Value::from("i"), Value::from("h"), 20),
    ];
    let (schema, store) = ptsdb_store(&rows);
    let plan = plan(
        &schema,
        &[
            ("INST", eq("i")),
            ("HOST", eq("h")),
            (
                "DATE",
                ColumnPredicate::Compare {
                    op: CompareOp::Ge,
                    value: Value::Date(10),
                },
            ),
            (
                "DATE",
                ColumnPredicate::Compare {
                    op: CompareOp::Lt,
                    value: Value::Date(20),
                },
            ),
        ],
    );

    assert_eq!(plan.ranges().len(), 1);
    assert_eq!(matched_rows(&store, &plan), [1, 2]);
}

#[test]
fn navigate_reports_done_past_last_leading_alternative() {
    let schema = btable_schema();
    let slots = [
        Slot::All,
        Slot::Points(vec![b"111".to_vec()]),
        Slot::All,
    ];
    let filter = SkipScanFilter::new(&schema, &slots, 0).expect("filter");

    assert_eq!(filter.navigate(b"abc\x00111x"), Navigation::Include);
    assert_eq!(
        filter.navigate(b"abc\x00000x"),
        Navigation::Seek(b"abc\x00111".to_vec())
    );
    assert_eq!(
        filter.navigate(b"abc\x00222x"),
        Navigation::Seek(b"abc\x01".to_vec())
    );

    let leading = SkipScanFilter::new(
        &schema,
        &[Slot::Points(vec![b"abc".to_vec()])],
        0,
    )
    .expect("filter");
    assert_eq!(leading.navigate(b"abd\x00111x"), Navigation::Done);
}

#[test]
fn parallel_execution_preserves_range_order() {
    let rows: Vec<_> = (0..40)
        .map(|i: i32| {
            let inst = i % 8;
            (Value::from(format!("i{inst:02}")), Value::from("h"), i64::from(i))
        })
        .collect();
    let (schema, store) = ptsdb_store(&rows);
    let insts: Vec<_> = (0..8).rev().map(|i| Value::from(format!("i{i:02}"))).collect();
    let plan = plan(
        &schema,
        &[
            ("INST", ColumnPredicate::In(insts)),
            (
                "DATE",
                ColumnPredicate::Compare {
                    op: CompareOp::Ge,
                    value: Value::Date(8),
                },
            ),
        ],
    );

    let sequential = execute(&store, &plan);
    let parallel = execute_parallel(&store, &plan, 3).expect("parallel scan");

    assert_eq!(plan.ranges().len(), 8);
    assert_eq!(parallel.rows.len(), 32);
    assert_eq!(
        parallel.rows.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>(),
        sequential.rows.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>()
    );
    assert!(parallel.rows.windows(2).all(|pair| pair[0].0 < pair[1].0));
    assert_eq!(parallel.stats, sequential.stats);
}

#[test]
fn plan_explains_as_json() {
    let schema = btable_schema();
    let plan = plan(&schema, &[("A_STRING", eq("abc")), ("B_STRING", eq("x"))]);

    let json = serde_json::to_value(&plan).expect("plan should serialize");
    assert_eq!(json["ranges"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["degraded"], false);
    assert!(json["key_filter"].is_object());

    let back: ScanPlan = serde_json::from_value(json).expect("plan should deserialize");
    assert_eq!(back, plan);
}

///
/// Brute-force agreement: the plan visits exactly the stored keys whose
/// column encodings satisfy every slot.
///

fn text_literal() -> impl Strategy<Value = Value> {
    prop::sample::select(vec!["a", "ab", "b", "ba"]).prop_map(Value::from)
}

fn text_cell() -> impl Strategy<Value = Value> {
    prop_oneof![1 => Just(Value::Null), 4 => text_literal()]
}

fn compare_op() -> impl Strategy<Value = CompareOp> {
    prop::sample::select(vec![CompareOp::Lt, CompareOp::Le, CompareOp::Gt, CompareOp::Ge])
}

fn text_predicates() -> impl Strategy<Value = Vec<ColumnPredicate>> {
    let one = prop_oneof![
        text_literal().prop_map(ColumnPredicate::Eq),
        prop::collection::vec(text_literal(), 1..3).prop_map(ColumnPredicate::In),
        (compare_op(), text_literal()).prop_map(|(op, value)| ColumnPredicate::Compare { op, value }),
        Just(ColumnPredicate::IsNull),
        prop::sample::select(vec!["a%", "b%", "a_%"])
            .prop_map(|pattern| ColumnPredicate::Like(pattern.to_string())),
    ];
    prop::collection::vec(one, 0..2)
}

fn date_predicates() -> impl Strategy<Value = Vec<ColumnPredicate>> {
    let one = prop_oneof![
        (-1i64..3).prop_map(|d| ColumnPredicate::Eq(Value::Date(d))),
        prop::collection::vec((-1i64..3).prop_map(Value::Date), 1..3).prop_map(ColumnPredicate::In),
        (compare_op(), -1i64..3).prop_map(|(op, d)| ColumnPredicate::Compare {
            op,
            value: Value::Date(d),
        }),
        (-1i64..3, -1i64..3).prop_map(|(low, high)| ColumnPredicate::Between {
            low: Value::Date(low),
            high: Value::Date(high),
        }),
    ];
    prop::collection::vec(one, 0..2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(192))]

    #[test]
    fn plan_visits_exactly_the_slot_matching_keys(
        rows in prop::collection::vec((text_cell(), text_cell(), -1i64..3), 0..24),
        inst in text_predicates(),
        host in text_predicates(),
        date in date_predicates(),
        cap in prop::sample::select(vec![1usize, 2, 10_000]),
    ) {
        let (schema, store) = ptsdb_store(&rows);
        let slots: Vec<Slot> = schema
            .pk_columns()
            .zip([&inst, &host, &date])
            .map(|(column, predicates)| lower_column(column, predicates).slot)
            .collect();
        let config = ScanConfig { max_scan_ranges: cap, ..ScanConfig::default() };
        let plan = compile(&schema, &slots, &config).expect("compile");

        let mut expected: Vec<Vec<u8>> = rows
            .iter()
            .filter(|(i, h, d)| {
                let values = [i.clone(), h.clone(), Value::Date(*d)];
                schema.pk_columns().zip(&values).zip(&slots).all(|((column, value), slot)| {
                    slot.matches(&codec::encode_column(column, value).expect("encode"))
                })
            })
            .map(|(i, h, d)| {
                RowKey::encode(&schema, &[i.clone(), h.clone(), Value::Date(*d)])
                    .expect("encode")
                    .into_bytes()
            })
            .collect();
        expected.sort();
        expected.dedup();

        let actual: Vec<Vec<u8>> = execute(&store, &plan)
            .rows
            .into_iter()
            .map(|(key, _)| key.into_bytes())
            .collect();

        prop_assert_eq!(actual, expected);
    }
}
