//! Batch upsert and bulk delete.

use crate::common::*;
use docket::{Condition, Document, Error, QueryOptions};

#[test]
fn upsert_many_tolerates_missing_ids() {
    let t = TestStore::new();
    let report = t
        .store
        .upsert_many(
            "cases",
            vec![
                case("a", "open", 1),
                Document::new().with("status", "orphan"),
                case("b", "open", 2),
            ],
        )
        .unwrap();

    assert_eq!(report.written, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(report.failures[0].id.is_none());

    assert!(t.store.get_one("cases", "a").is_ok());
    assert!(t.store.get_one("cases", "b").is_ok());
    assert_eq!(t.store.count("cases", &[]).unwrap(), 2);
}

#[test]
fn upsert_many_reports_invalid_ids() {
    let t = TestStore::new();
    let bad = Document::with_id("tab\there").with("n", 1);
    let report = t
        .store
        .upsert_many("cases", vec![bad, case("ok", "open", 1)])
        .unwrap();
    assert_eq!(report.written, vec!["ok".to_string()]);
    assert_eq!(report.failures[0].id.as_deref(), Some("tab\there"));
}

#[test]
fn upsert_many_replaces_existing_and_keeps_created_at() {
    let t = TestStore::new();
    t.store.upsert("cases", case("a", "open", 1), "a").unwrap();
    let before = t.store.get_one("cases", "a").unwrap();

    std::thread::sleep(std::time::Duration::from_millis(2));
    let report = t
        .store
        .upsert_many("cases", vec![case("a", "closed", 9), case("z", "open", 1)])
        .unwrap();
    assert!(report.is_complete());

    let after = t.store.get_one("cases", "a").unwrap();
    assert_eq!(after.get_str("status"), Some("closed"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn upsert_many_duplicate_ids_last_wins() {
    let t = TestStore::new();
    let report = t
        .store
        .upsert_many("cases", vec![case("a", "first", 1), case("a", "second", 2)])
        .unwrap();
    assert_eq!(report.written.len(), 2);
    assert_eq!(t.store.count("cases", &[]).unwrap(), 1);
    assert_eq!(
        t.store.get_one("cases", "a").unwrap().get_str("status"),
        Some("second")
    );
}

#[test]
fn upsert_many_into_result() {
    let t = TestStore::new();
    let ok = t
        .store
        .upsert_many("cases", vec![case("a", "open", 1)])
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(ok, vec!["a".to_string()]);

    let err = t
        .store
        .upsert_many("cases", vec![Document::new()])
        .unwrap()
        .into_result()
        .unwrap_err();
    assert!(matches!(err, Error::PartialBatchFailure { .. }));
}

#[test]
fn upsert_many_empty_batch() {
    let t = TestStore::new();
    let report = t.store.upsert_many("cases", Vec::new()).unwrap();
    assert!(report.is_complete());
    assert!(report.written.is_empty());
}

#[test]
fn delete_many_requires_conditions() {
    let t = TestStore::new();
    t.store
        .upsert_many("cases", vec![case("a", "open", 1), case("b", "open", 2)])
        .unwrap();

    let err = t.store.delete_many("cases", &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidQueryCondition(_)));
    assert_eq!(t.store.count("cases", &[]).unwrap(), 2);
}

#[test]
fn delete_many_removes_matches_and_reports_count() {
    let t = TestStore::new();
    t.store
        .upsert_many(
            "cases",
            vec![
                case("a", "closed", 1),
                case("b", "open", 2),
                case("c", "closed", 3),
                case("d", "closed", 9),
            ],
        )
        .unwrap();

    let result = t
        .store
        .delete_many(
            "cases",
            &[Condition::eq("status", "closed"), Condition::lt("priority", 5)],
        )
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(result.affected, 2);

    let left: Vec<String> = t
        .store
        .query("cases", &QueryOptions::new())
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(left, vec!["d".to_string(), "b".to_string()]);
}

#[test]
fn delete_many_with_no_matches() {
    let t = TestStore::new();
    t.store.upsert("cases", case("a", "open", 1), "a").unwrap();
    let result = t
        .store
        .delete_many("cases", &[Condition::eq("status", "archived")])
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(result.affected, 0);
    assert_eq!(t.store.count("cases", &[]).unwrap(), 1);
}

#[test]
fn delete_many_rejects_malformed_condition() {
    let t = TestStore::new();
    t.store.upsert("cases", case("a", "open", 1), "a").unwrap();
    let empty: Vec<&str> = Vec::new();
    let err = t
        .store
        .delete_many("cases", &[Condition::is_in("status", empty)])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQueryCondition(_)));
    assert_eq!(t.store.count("cases", &[]).unwrap(), 1);
}
