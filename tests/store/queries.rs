//! Filtering, ordering, pagination and counting.

use crate::common::*;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use docket::{Condition, Document, Error, Operator, OrderBy, QueryOptions, Value};
use serde_json::json;

fn seeded() -> TestStore {
    let t = TestStore::new();
    let cases = t.store.collection("cases").unwrap();
    let docs = vec![
        case("a", "active", 1),
        case("b", "closed", 5),
        case("c", "active", 3),
        Document::with_id("d").with("priority", 4),
        case("e", "pending", 2),
    ];
    for doc in docs {
        assert!(cases.insert(doc).unwrap());
    }
    t
}

fn ids(records: &[docket::Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn get_all_is_newest_first() {
    let t = seeded();
    let all = t.store.get_all("cases").unwrap();
    assert_eq!(ids(&all), vec!["e", "d", "c", "b", "a"]);
}

#[test]
fn get_limited_takes_prefix_of_default_order() {
    let t = seeded();
    let two = t.store.get_limited("cases", 2).unwrap();
    assert_eq!(ids(&two), vec!["e", "d"]);
    assert!(t.store.get_limited("cases", 0).unwrap().is_empty());
    assert_eq!(t.store.get_limited("cases", 100).unwrap().len(), 5);
}

#[test]
fn where_equals_returns_exact_subset() {
    let t = seeded();
    let active = t
        .store
        .get_all_where_equals("cases", "status", "active")
        .unwrap();
    assert_eq!(ids(&active), vec!["c", "a"]);
    assert!(active.iter().all(|r| r.get_str("status") == Some("active")));
}

#[test]
fn where_equals_on_missing_field_matches_nothing() {
    let t = seeded();
    assert!(t
        .store
        .get_all_where_equals("cases", "judge", "Ito")
        .unwrap()
        .is_empty());
}

#[test]
fn null_condition_matches_missing_field() {
    let t = seeded();
    let no_status = t
        .store
        .query(
            "cases",
            &QueryOptions::new().filter(Condition::eq("status", Value::Null)),
        )
        .unwrap();
    assert_eq!(ids(&no_status), vec!["d"]);
}

#[test]
fn comparison_operators() {
    let t = seeded();
    let q = |c: Condition| {
        let mut found: Vec<String> = t
            .store
            .query("cases", &QueryOptions::new().filter(c))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        found.sort();
        found
    };

    assert_eq!(q(Condition::gt("priority", 3)), vec!["b", "d"]);
    assert_eq!(q(Condition::ge("priority", 3)), vec!["b", "c", "d"]);
    assert_eq!(q(Condition::lt("priority", 2)), vec!["a"]);
    assert_eq!(q(Condition::le("priority", 2)), vec!["a", "e"]);
    assert_eq!(q(Condition::ne("status", "active")), vec!["b", "e"]);
    assert_eq!(q(Condition::like("status", "act%")), vec!["a", "c"]);
    assert_eq!(
        q(Condition::is_in("status", vec!["closed", "pending"])),
        vec!["b", "e"]
    );
    assert_eq!(q(Condition::not_in("status", vec!["active"])), vec!["b", "e"]);
    assert_eq!(q(Condition::eq("id", "c")), vec!["c"]);
    assert_eq!(
        q(Condition::parse("priority", ">=", 5).unwrap()),
        vec!["b"]
    );
}

#[test]
fn conditions_are_anded() {
    let t = seeded();
    let results = t
        .store
        .query(
            "cases",
            &QueryOptions::with_conditions(vec![
                Condition::eq("status", "active"),
                Condition::gt("priority", 1),
            ]),
        )
        .unwrap();
    assert_eq!(ids(&results), vec!["c"]);
}

#[test]
fn empty_in_list_is_rejected() {
    let t = seeded();
    let empty: Vec<&str> = Vec::new();
    let err = t
        .store
        .query(
            "cases",
            &QueryOptions::new().filter(Condition::is_in("status", empty)),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQueryCondition(_)));

    let err = t
        .store
        .count("cases", &[Condition::new("status", Operator::NotIn, "x")])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQueryCondition(_)));
}

#[test]
fn custom_order_limit_offset() {
    let t = seeded();
    let page = t
        .store
        .query(
            "cases",
            &QueryOptions::new()
                .order_by(OrderBy::asc("priority"))
                .limit(2)
                .offset(1),
        )
        .unwrap();
    assert_eq!(ids(&page), vec!["e", "c"]);

    let desc = t
        .store
        .query("cases", &QueryOptions::new().order_by(OrderBy::desc("priority")))
        .unwrap();
    assert_eq!(ids(&desc), vec!["b", "d", "c", "e", "a"]);
}

#[test]
fn offset_without_limit() {
    let t = seeded();
    let rest = t
        .store
        .query("cases", &QueryOptions::new().offset(3))
        .unwrap();
    assert_eq!(ids(&rest), vec!["b", "a"]);
}

#[test]
fn order_by_row_columns() {
    let t = seeded();
    let by_id = t
        .store
        .query("cases", &QueryOptions::new().order_by(OrderBy::asc("id")))
        .unwrap();
    assert_eq!(ids(&by_id), vec!["a", "b", "c", "d", "e"]);

    let oldest_first = t
        .store
        .query("cases", &QueryOptions::new().order_by(OrderBy::asc("created_at")))
        .unwrap();
    assert_eq!(ids(&oldest_first), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn updated_at_order_reflects_rewrites() {
    let t = seeded();
    std::thread::sleep(std::time::Duration::from_millis(2));
    t.store
        .update("cases", "a", Document::new().with("status", "closed"))
        .unwrap();
    let recent = t
        .store
        .query(
            "cases",
            &QueryOptions::new().order_by(OrderBy::desc("updated_at")).limit(1),
        )
        .unwrap();
    assert_eq!(ids(&recent), vec!["a"]);
}

#[test]
fn date_fields_filter_chronologically() {
    let t = TestStore::new();
    let hearings = t.store.collection("hearings").unwrap();
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    for day in 0..5 {
        hearings
            .upsert(
                Document::new().with("scheduled_for", base + ChronoDuration::days(day)),
                &format!("h-{}", day),
            )
            .unwrap();
    }

    let later = hearings
        .query(
            &QueryOptions::new()
                .filter(Condition::ge("scheduled_for", base + ChronoDuration::days(3)))
                .order_by(OrderBy::asc("scheduled_for")),
        )
        .unwrap();
    assert_eq!(ids(&later), vec!["h-3", "h-4"]);
    assert_eq!(
        later[0].get_date("scheduled_for"),
        Some(base + ChronoDuration::days(3))
    );
}

#[test]
fn boolean_and_float_filters() {
    let t = TestStore::new();
    let docs = t.store.collection("documents").unwrap();
    docs.upsert(Document::new().with("sealed", true).with("fee", 12.5), "x")
        .unwrap();
    docs.upsert(Document::new().with("sealed", false).with("fee", 40.0), "y")
        .unwrap();

    let sealed = docs.get_all_where_equals("sealed", true).unwrap();
    assert_eq!(ids(&sealed), vec!["x"]);
    assert_eq!(docs.count(&[Condition::gt("fee", 20.0)]).unwrap(), 1);
}

#[test]
fn hostile_values_are_bound_not_spliced() {
    let t = seeded();
    let hostile = "active' OR '1'='1";
    assert!(t
        .store
        .get_all_where_equals("cases", "status", hostile)
        .unwrap()
        .is_empty());
    assert_eq!(t.store.count("cases", &[]).unwrap(), 5);
}

#[test]
fn count_matches_query_length() {
    let t = seeded();
    let cases = t.store.collection("cases").unwrap();
    for conditions in [
        vec![],
        vec![Condition::eq("status", "active")],
        vec![Condition::gt("priority", 1), Condition::ne("status", "closed")],
        vec![Condition::eq("status", "nope")],
    ] {
        let n = cases.count(&conditions).unwrap();
        let listed = cases
            .query(&QueryOptions::with_conditions(conditions))
            .unwrap();
        assert_eq!(n as usize, listed.len());
    }
}

#[test]
fn nested_field_equality_uses_encoded_form() {
    let t = TestStore::new();
    let tags = json!(["civil", "urgent"]);
    t.store
        .upsert("cases", Document::new().with("tags", Value::from(tags.clone())), "a")
        .unwrap();
    let found = t
        .store
        .get_all_where_equals("cases", "tags", Value::from(tags))
        .unwrap();
    assert_eq!(ids(&found), vec!["a"]);
}
