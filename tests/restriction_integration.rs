//! Integration tests for constraints, restrictions, patterns and ordering.
//!
//! Semantic properties are checked by evaluating restrictions with the
//! in-memory engine; SQL rendering is checked for the same trees.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sift::prelude::*;
use sift::sql::SqlBuilder;
use sift::{ConstraintKind, MemoryEngine};

type Row = IndexMap<String, Value>;

fn product(sku: &str, price: i64, stock: Option<i64>) -> Row {
    IndexMap::from([
        ("sku".to_string(), Value::from(sku)),
        ("price".to_string(), Value::Int(price)),
        ("stock".to_string(), Value::from(stock)),
    ])
}

fn catalog() -> MemoryEngine<Row> {
    MemoryEngine::new([
        product("A-100", 5, Some(10)),
        product("A_200", 15, None),
        product("B-100", 25, Some(0)),
        product("B%300", 35, Some(3)),
        product("C-100", 45, Some(7)),
        product("a-500", 55, None),
    ])
}

fn skus(engine: &MemoryEngine<Row>, restriction: &Restriction) -> Vec<String> {
    engine
        .filter(restriction)
        .unwrap()
        .into_iter()
        .filter_map(|r| r.get("sku").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn all_constraints() -> Vec<Constraint> {
    vec![
        Constraint::equal_to(15).unwrap(),
        Constraint::not_equal_to(15).unwrap(),
        Constraint::greater_than(25).unwrap(),
        Constraint::at_most(25).unwrap(),
        Constraint::less_than(25).unwrap(),
        Constraint::at_least(25).unwrap(),
        Constraint::between(10, 40).unwrap(),
        Constraint::not_between(10, 40).unwrap(),
        Constraint::is_in([5, 45]).unwrap(),
        Constraint::not_in([5, 45]).unwrap(),
        Constraint::is_null(),
        Constraint::not_null(),
    ]
}

#[test]
fn test_negation_is_an_involution() {
    for constraint in all_constraints() {
        assert_eq!(constraint.negate().negate(), constraint);
        assert_eq!(constraint.negate().kind(), constraint.kind().complement());
    }
}

#[test]
fn test_negation_partitions_the_data() {
    let engine = catalog();
    for attribute in ["price", "stock"] {
        for constraint in all_constraints() {
            let positive = skus(&engine, &Restriction::on(attribute, constraint.clone()));
            let negative = skus(&engine, &Restriction::on(attribute, constraint.negate()));
            assert_eq!(
                positive.len() + negative.len(),
                6,
                "{} {} splits the catalog",
                attribute,
                constraint
            );
            assert!(positive.iter().all(|sku| !negative.contains(sku)));
        }
    }
}

#[test]
fn test_null_values_are_rejected_at_construction() {
    assert_eq!(
        Constraint::equal_to(Value::Null).unwrap_err().code,
        sift::ErrorCode::ArgumentRequired
    );
    assert!(Constraint::between(1, Value::Null).is_err());
    assert!(Constraint::is_in(Vec::<i64>::new()).is_err());
    assert!(Attribute::new("stock").at_least(Value::from(Option::<i64>::None)).is_err());
}

#[test]
fn test_substring_escapes_wildcards() {
    let engine = catalog();
    let sku = Attribute::new("sku");

    assert_eq!(skus(&engine, &sku.contains("_")), vec!["A_200"]);
    assert_eq!(skus(&engine, &sku.contains("%")), vec!["B%300"]);
    assert_eq!(skus(&engine, &sku.starts_with("A")), vec!["A-100", "A_200"]);

    // Raw patterns keep their wildcards.
    let raw = sku.like(Pattern::pattern("A_%")).unwrap();
    assert_eq!(skus(&engine, &raw), vec!["A-100", "A_200"]);
}

#[test]
fn test_literal_is_matched_only_where_it_occurs() {
    for literal in ["50%", "a_b", "back\\slash", "%_\\"] {
        let pattern = Pattern::substring(literal);
        assert_eq!(pattern.matches(&format!("xx{}yy", literal), false), Some(true));
        let scrambled: String = literal.chars().rev().collect();
        if scrambled != literal {
            assert_eq!(pattern.matches(&format!("xx{}yy", scrambled), false), Some(false));
        }
    }
}

#[test]
fn test_custom_wildcards() {
    let engine = catalog();
    let pattern = Pattern::pattern_with("?-*", '?', '*').unwrap();
    let matches = Attribute::new("sku").like(pattern).unwrap();
    assert_eq!(skus(&engine, &matches), vec!["A-100", "B-100", "C-100", "a-500"]);

    let escaped = Pattern::pattern_escaped("B!%*", '?', '*', '!').unwrap();
    assert_eq!(escaped.value(), Some("B\\%%"));
}

#[test]
fn test_case_insensitive_constraints() {
    let engine = catalog();
    let sku = Attribute::new("sku");
    let pattern = Constraint::like(Pattern::prefix("a")).unwrap().ignore_case();
    assert_eq!(
        skus(&engine, &sku.satisfies(pattern)),
        vec!["A-100", "A_200", "a-500"]
    );
}

#[test]
fn test_push_down_negation_preserves_meaning() {
    let engine = catalog();
    let price = Attribute::new("price");
    let stock = Attribute::new("stock");

    let tree = Restriction::any([
        price.at_most(15).unwrap().and(stock.not_null()),
        Restriction::not(&price.between(30, 50).unwrap().or(stock.equal_to(0).unwrap())),
    ])
    .unwrap();

    for candidate in [tree.clone(), tree.negate()] {
        let normal = candidate.push_down_negation();
        assert_eq!(skus(&engine, &normal), skus(&engine, &candidate));
        assert!(!normal.to_string().contains("NOT ("));
    }
}

#[test]
fn test_negation_shares_children() {
    let price = Attribute::new("price");
    let group = price.at_least(10).unwrap().and(price.at_most(20).unwrap());
    let negated = group.negate();

    match (&group, &negated) {
        (Restriction::Composite(a), Restriction::Composite(b)) => {
            assert!(std::ptr::eq(a.children().as_ptr(), b.children().as_ptr()));
            assert!(b.is_negated());
        }
        _ => panic!("expected composite restrictions"),
    }
    assert_eq!(negated.negate(), group);
}

#[test]
fn test_unrestricted_sentinel() {
    let engine = catalog();
    let everything = Restriction::unrestricted();
    assert_eq!(skus(&engine, &everything).len(), 6);
    assert!(skus(&engine, &everything.negate()).is_empty());
}

#[test]
fn test_static_sorts_precede_dynamic_sorts() {
    let query = Query::new()
        .static_sort([Sort::asc("a")])
        .order_by(Order::by([Sort::desc("b"), Sort::asc("c")]));
    assert_eq!(
        query.effective_order().sorts(),
        &[Sort::asc("a"), Sort::desc("b"), Sort::asc("c")]
    );

    let duplicated = Query::new().static_sort([Sort::asc("a")]).sorted_by([Sort::desc("a")]);
    assert_eq!(duplicated.effective_order().len(), 2);
}

#[tokio::test]
async fn test_unsupported_operator_allows_fallback() {
    let engine = catalog().without_operator(ConstraintKind::Like);
    let query = Query::new().where_(Attribute::new("sku").starts_with("B"));

    let err = engine.count(query.restriction()).await.unwrap_err();
    assert!(err.is_unsupported());

    let fallback = Attribute::new("sku")
        .between("B", "C")
        .unwrap()
        .and(Attribute::new("sku").less_than("C").unwrap());
    assert_eq!(engine.count(&fallback).await.unwrap(), 2);
}

#[test]
fn test_sql_rendering_matches_tree() {
    let price = Attribute::new("price");
    let restriction = price.at_least(10).unwrap().or(Attribute::new("sku").contains("_"));

    let count = SqlBuilder::sqlite().count("products", &restriction.negate()).unwrap();
    assert_eq!(
        count.sql,
        "SELECT COUNT(*) FROM products WHERE NOT (price >= ? OR sku LIKE ? ESCAPE '\\')"
    );
    assert_eq!(count.params, vec![Value::Int(10), Value::from("%\\_%")]);
}
