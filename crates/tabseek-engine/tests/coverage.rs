//! End-to-end behaviour of the query pipeline.

use tabseek_engine::{
    apply_query, columns, parse_float, record, try_parse, Aggregate, FilterCondition, Logic,
    QueryModel, Record, SortOrder, SortSpec, Value,
};

fn texts(rows: &[Record], column: &str) -> Vec<String> {
    rows.iter().map(|row| row.value(column).to_text()).collect()
}

fn xs() -> Vec<Record> {
    [1, 2, 3, 4].into_iter().map(|x| record! { "x" => x }).collect()
}

// ============================================================================
// Pipeline contract
// ============================================================================

#[test]
fn empty_model_is_identity() {
    let rows = vec![
        record! { "b" => 2, "a" => "x" },
        record! { "b" => 1, "a" => "y" },
        record! { "a" => Value::Null },
    ];
    let outcome = apply_query(&rows, &QueryModel::default());
    assert_eq!(outcome.result, rows);

    let outcome = apply_query(&rows, &QueryModel::from_json("{}").unwrap());
    assert_eq!(outcome.result, rows);
}

#[test]
fn repeated_calls_are_identical() {
    let rows = vec![
        record! { "name" => "Alice", "v" => "3" },
        record! { "name" => "bob", "v" => 1 },
        record! { "name" => "ALICE2", "v" => "2" },
    ];
    let before = rows.clone();
    let model = QueryModel::new()
        .search("name", "a")
        .and_filter("v", ">=", "1")
        .sort_desc("v");

    let first = apply_query(&rows, &model);
    let second = apply_query(&rows, &model);

    assert_eq!(first, second);
    assert_eq!(rows, before);
}

#[test]
fn empty_dataset_is_fine() {
    let model = QueryModel::new()
        .search("name", "a")
        .filter(FilterCondition::new("v", ">", "").right_agg(Aggregate::Avg, "v"))
        .sort_asc("v");
    assert!(apply_query(&[], &model).is_empty());
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn search_is_case_insensitive() {
    let rows = vec![
        record! { "name" => "Alice" },
        record! { "name" => "bob" },
        record! { "name" => "ALICE2" },
    ];
    let model = QueryModel::from_json(r#"{"search": [{"column": "name", "value": "ali"}]}"#)
        .unwrap();

    let outcome = apply_query(&rows, &model);
    assert_eq!(outcome.result, vec![rows[0].clone(), rows[2].clone()]);
}

#[test]
fn search_unknown_column() {
    let rows = vec![record! { "name" => "Alice" }];
    assert!(QueryModel::new().search("nope", "a").apply(&rows).is_empty());
    assert_eq!(QueryModel::new().search("nope", "").apply(&rows).len(), 1);
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn filter_fold_and() {
    let model = QueryModel::from_json(
        r#"{"filters": [
            {"leftCol": "x", "op": ">", "rightValue": "1"},
            {"logic": "AND", "leftCol": "x", "op": "<", "rightValue": "4"}
        ]}"#,
    )
    .unwrap();

    assert_eq!(texts(&model.apply(&xs()).result, "x"), vec!["2", "3"]);
}

#[test]
fn filter_fold_or() {
    let model = QueryModel::from_json(
        r#"{"filters": [
            {"leftCol": "x", "op": ">", "rightValue": "1"},
            {"logic": "OR", "leftCol": "x", "op": "<", "rightValue": "4"}
        ]}"#,
    )
    .unwrap();

    assert_eq!(texts(&model.apply(&xs()).result, "x"), vec!["1", "2", "3", "4"]);
}

#[test]
fn filter_logic_is_case_insensitive() {
    let model = QueryModel::new()
        .and_filter("x", "=", "1")
        .filter(FilterCondition::new("x", "=", "3").logic(Logic::parse("or")));

    assert_eq!(texts(&model.apply(&xs()).result, "x"), vec!["1", "3"]);
}

#[test]
fn aggregate_filter() {
    let rows = vec![record! { "v" => 10 }, record! { "v" => 20 }, record! { "v" => 30 }];
    let model = QueryModel::from_json(
        r#"{"filters": [{"leftCol": "v", "op": ">", "rightAgg": "AVG", "rightCol": "v"}]}"#,
    )
    .unwrap();

    assert_eq!(model.apply(&rows).result, vec![record! { "v" => 30 }]);
}

#[test]
fn aggregate_domain_is_post_search() {
    let rows = vec![
        record! { "g" => "a", "v" => 1 },
        record! { "g" => "a", "v" => 3 },
        record! { "g" => "b", "v" => 100 },
    ];
    // MAX over group a is 3, not 100
    let model = QueryModel::new()
        .search("g", "a")
        .filter(FilterCondition::columns("v", "=", "v").right_agg(Aggregate::Max, "v"));

    assert_eq!(texts(&model.apply(&rows).result, "v"), vec!["3"]);
}

#[test]
fn aggregate_of_nothing_is_false() {
    let rows = vec![record! { "v" => "n/a" }, record! { "v" => "" }];
    let model = QueryModel::new()
        .filter(FilterCondition::new("v", "<", "").right_agg(Aggregate::Min, "v"));
    assert!(model.apply(&rows).is_empty());
}

#[test]
fn unknown_aggregate_is_null() {
    let rows = vec![record! { "v" => 1 }];
    let model = QueryModel::from_json(
        r#"{"filters": [{"leftCol": "v", "op": "!=", "rightAgg": "COUNT", "rightCol": "v"}]}"#,
    )
    .unwrap();
    // 1 != null
    assert_eq!(model.apply(&rows).len(), 1);
}

#[test]
fn unknown_operator_drops_everything() {
    let model = QueryModel::new().and_filter("x", "~=", "1");
    assert!(model.apply(&xs()).is_empty());

    let model = QueryModel::from_json(r#"{"filters": [{"leftCol": "x", "rightValue": "1"}]}"#)
        .unwrap();
    assert!(model.apply(&xs()).is_empty());
}

#[test]
fn relational_on_text_is_false() {
    let rows = vec![record! { "v" => "abc" }, record! { "v" => "12abc" }];
    let model = QueryModel::new().and_filter("v", ">", "5");
    assert_eq!(texts(&model.apply(&rows).result, "v"), vec!["12abc"]);
}

#[test]
fn column_compared_with_column() {
    let rows = vec![
        record! { "budget" => "100", "spent" => "120" },
        record! { "budget" => "100", "spent" => "80" },
    ];
    let model = QueryModel::new().filter(FilterCondition::columns("spent", ">", "budget"));
    assert_eq!(texts(&model.apply(&rows).result, "spent"), vec!["120"]);
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn sort_numeric_text() {
    let rows: Vec<Record> = ["10", "2", "33"]
        .into_iter()
        .map(|n| record! { "n" => n })
        .collect();

    let outcome = QueryModel::new().sort_asc("n").apply(&rows);
    assert_eq!(texts(&outcome.result, "n"), vec!["2", "10", "33"]);

    let outcome = QueryModel::new().sort_desc("n").apply(&rows);
    assert_eq!(texts(&outcome.result, "n"), vec!["33", "10", "2"]);
}

#[test]
fn sort_is_stable() {
    let rows = vec![
        record! { "k" => 1, "tag" => "a" },
        record! { "k" => 1, "tag" => "b" },
        record! { "k" => 2, "tag" => "c" },
    ];
    let outcome = QueryModel::new().sort_asc("k").apply(&rows);
    assert_eq!(texts(&outcome.result, "tag"), vec!["a", "b", "c"]);
}

#[test]
fn sort_unknown_order_keeps_rows() {
    let rows: Vec<Record> = [3, 1, 2].into_iter().map(|n| record! { "n" => n }).collect();
    let model = QueryModel::from_json(r#"{"sort": {"column": "n", "order": "shuffle"}}"#).unwrap();

    assert_eq!(
        model.sort,
        Some(SortSpec::new("n", SortOrder::Other("shuffle".into())))
    );
    assert_eq!(model.apply(&rows).result, rows);
}

#[test]
fn sort_padded_order_is_unrecognised() {
    let rows: Vec<Record> = [3, 1, 2].into_iter().map(|n| record! { "n" => n }).collect();
    let model = QueryModel::from_json(r#"{"sort": {"column": "n", "order": " desc "}}"#).unwrap();
    assert_eq!(model.apply(&rows).result, rows);
}

#[test]
fn sort_without_column_keeps_rows() {
    let rows: Vec<Record> = [3, 1, 2].into_iter().map(|n| record! { "n" => n }).collect();
    let model = QueryModel::from_json(r#"{"sort": {"column": "", "order": "asc"}}"#).unwrap();
    assert_eq!(model.apply(&rows).result, rows);
}

// ============================================================================
// Values and coercion
// ============================================================================

#[test]
fn try_parse_needs_whole_number() {
    assert_eq!(try_parse(&Value::from("42")), Value::Number(42.0));
    assert_eq!(try_parse(&Value::from("4.5e1")), Value::Number(45.0));
    assert_eq!(try_parse(&Value::from("42abc")), Value::from("42abc"));
    assert_eq!(try_parse(&Value::Null), Value::Null);
}

#[test]
fn parse_float_reads_prefix() {
    assert_eq!(parse_float(&Value::from("42abc")), Some(42.0));
    assert_eq!(parse_float(&Value::from("  -1.5")), Some(-1.5));
    assert_eq!(parse_float(&Value::from("abc")), None);
}

#[test]
fn columns_come_from_first_row() {
    let rows = vec![record! { "b" => 1, "a" => 2 }, record! { "c" => 3 }];
    assert_eq!(columns(&rows), vec!["b", "a"]);
    assert!(columns(&[]).is_empty());
}
