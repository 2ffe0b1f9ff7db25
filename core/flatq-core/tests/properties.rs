// 속성 기반 테스트: 정렬 안정성, 조인 커버리지, 집계/중복 제거 불변식

use flatq_core::engine::EngineConfig;
use flatq_core::sql::executor::operators::{
    JoinContext, aggregate_grouped, inner_join, left_join, right_join, sort_rows,
};
use flatq_core::sql::{AggregateSpec, JoinCondition, OrderBySpec, WhereClause, evaluate};
use flatq_core::storage::InMemoryStorage;
use flatq_core::{Database, Row, Value};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn keyed_rows(keys: &[u8], key_field: &str) -> Vec<Row> {
    keys.iter()
        .enumerate()
        .map(|(seq, key)| {
            Row::from_pairs([
                (key_field.to_string(), Value::from(key.to_string())),
                ("seq".to_string(), Value::from(seq.to_string())),
            ])
        })
        .collect()
}

fn join_ctx() -> JoinContext {
    JoinContext {
        main_table: "a".to_string(),
        join_table: "b".to_string(),
        condition: JoinCondition::new("a.k", "b.k"),
        fields: vec!["a.seq".to_string(), "b.seq".to_string()],
        wildcard: false,
    }
}

fn count_of(values: &[u8], key: u8) -> usize {
    values.iter().filter(|v| **v == key).count()
}

proptest! {
    #[test]
    fn order_by_is_stable(keys in prop::collection::vec(0u8..4, 0..40)) {
        let mut rows = keyed_rows(&keys, "k");
        sort_rows(&mut rows, &[OrderBySpec::asc("k")], None);

        for pair in rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.get("k").unwrap().sort_cmp(b.get("k").unwrap()).is_le());
            if a.get("k") == b.get("k") {
                let seq = |r: &Row| r.get("seq").and_then(Value::as_text).unwrap().parse::<usize>().unwrap();
                prop_assert!(seq(a) < seq(b));
            }
        }
    }

    #[test]
    fn group_counts_sum_to_row_count(depts in prop::collection::vec(0u8..5, 0..50)) {
        let rows = keyed_rows(&depts, "dept");
        let specs = vec![AggregateSpec::parse("COUNT(*)").unwrap()];
        let groups = aggregate_grouped(&rows, &["dept".to_string()], &specs, None);

        let distinct: HashSet<u8> = depts.iter().copied().collect();
        prop_assert_eq!(groups.len(), distinct.len());

        let total: f64 = groups
            .iter()
            .map(|g| match g.get("COUNT(*)") {
                Some(Value::Number(n)) => *n,
                _ => 0.0,
            })
            .sum();
        prop_assert_eq!(total as usize, rows.len());
    }

    #[test]
    fn inner_join_cardinality(
        left in prop::collection::vec(0u8..6, 0..20),
        right in prop::collection::vec(0u8..6, 0..20),
    ) {
        let out = inner_join(&keyed_rows(&left, "k"), &keyed_rows(&right, "k"), &join_ctx()).unwrap();
        let expected: usize = left.iter().map(|k| count_of(&right, *k)).sum();
        prop_assert_eq!(out.len(), expected);
    }

    #[test]
    fn left_join_covers_every_main_row(
        left in prop::collection::vec(0u8..6, 0..20),
        right in prop::collection::vec(0u8..6, 0..20),
    ) {
        let out = left_join(&keyed_rows(&left, "k"), &keyed_rows(&right, "k"), &join_ctx()).unwrap();
        let expected: usize = left.iter().map(|k| count_of(&right, *k).max(1)).sum();
        prop_assert_eq!(out.len(), expected);

        let seen: HashSet<String> = out
            .iter()
            .filter_map(|r| r.get("a.seq").and_then(Value::as_text).map(str::to_string))
            .collect();
        prop_assert_eq!(seen.len(), left.len());
    }

    #[test]
    fn right_join_covers_every_join_row(
        left in prop::collection::vec(0u8..6, 1..20),
        right in prop::collection::vec(0u8..6, 0..20),
    ) {
        let out = right_join(&keyed_rows(&left, "k"), &keyed_rows(&right, "k"), &join_ctx()).unwrap();
        let expected: usize = right.iter().map(|k| count_of(&left, *k).max(1)).sum();
        prop_assert_eq!(out.len(), expected);

        let unmatched = out.iter().filter(|r| r.get("a.seq") == Some(&Value::Null)).count();
        let expected_unmatched = right.iter().filter(|k| count_of(&left, **k) == 0).count();
        prop_assert_eq!(unmatched, expected_unmatched);
    }

    #[test]
    fn distinct_output_is_unique(values in prop::collection::vec(0u8..5, 0..40)) {
        let storage = Arc::new(InMemoryStorage::new());
        storage.register_table("t", keyed_rows(&values, "v"));
        let db = Database::with_storage(storage, EngineConfig::default().with_batch_size(3)).unwrap();

        let rows = db.execute_select("SELECT DISTINCT v FROM t").unwrap();
        let unique: HashSet<Vec<Value>> = rows.iter().map(|r| r.values().cloned().collect()).collect();
        prop_assert_eq!(unique.len(), rows.len());

        let expected: HashSet<u8> = values.iter().copied().collect();
        prop_assert_eq!(rows.len(), expected.len());
    }

    #[test]
    fn evaluate_is_deterministic(
        stored in "[a-z0-9 ]{0,8}",
        literal in "[a-z0-9%_]{0,6}",
        op in prop::sample::select(vec!["=", "!=", ">", "<", ">=", "<=", "LIKE"]),
    ) {
        let row = Row::from_pairs([("f", stored.as_str())]);
        let clause = WhereClause::new("f", op, literal.as_str()).unwrap();
        let first = evaluate(&row, &clause).unwrap();
        prop_assert_eq!(evaluate(&row, &clause).unwrap(), first);
    }

    #[test]
    fn limit_never_exceeds_bound(
        values in prop::collection::vec(0u8..9, 0..30),
        limit in 0usize..10,
    ) {
        let storage = Arc::new(InMemoryStorage::new());
        storage.register_table("t", keyed_rows(&values, "v"));
        let db = Database::with_storage(storage, EngineConfig::default().with_batch_size(4)).unwrap();

        let rows = db.execute_select(&format!("SELECT v FROM t LIMIT {limit}")).unwrap();
        prop_assert_eq!(rows.len(), values.len().min(limit));
    }
}
