//! Property tests over randomly generated collections.

use docket::{Condition, Document, QueryOptions, Store};
use proptest::prelude::*;

fn statuses() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(Some("active")),
        Just(Some("closed")),
        Just(Some("pending")),
        Just(None),
    ]
}

fn corpus() -> impl Strategy<Value = Vec<(Option<&'static str>, i64)>> {
    proptest::collection::vec((statuses(), 0i64..10), 0..30)
}

fn load(store: &Store, docs: &[(Option<&'static str>, i64)]) {
    let batch = docs
        .iter()
        .enumerate()
        .map(|(i, (status, priority))| {
            Document::with_id(format!("d{}", i))
                .with("status", *status)
                .with("priority", *priority)
        })
        .collect();
    let report = store.upsert_many("cases", batch).unwrap();
    assert!(report.is_complete());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn where_equals_is_exact(docs in corpus()) {
        let store = Store::open_in_memory().unwrap();
        load(&store, &docs);

        let found = store.get_all_where_equals("cases", "status", "active").unwrap();
        let expected = docs.iter().filter(|(s, _)| *s == Some("active")).count();
        prop_assert_eq!(found.len(), expected);
        for r in &found {
            prop_assert_eq!(r.get_str("status"), Some("active"));
        }
    }

    #[test]
    fn count_equals_unbounded_query(docs in corpus(), threshold in 0i64..10) {
        let store = Store::open_in_memory().unwrap();
        load(&store, &docs);

        let conditions = vec![
            Condition::ge("priority", threshold),
            Condition::ne("status", "closed"),
        ];
        let n = store.count("cases", &conditions).unwrap();
        let listed = store
            .query("cases", &QueryOptions::with_conditions(conditions))
            .unwrap();
        prop_assert_eq!(n as usize, listed.len());
    }

    #[test]
    fn pages_partition_the_collection(docs in corpus(), page in 1usize..7) {
        let store = Store::open_in_memory().unwrap();
        load(&store, &docs);

        let all = store.get_all("cases").unwrap();
        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let chunk = store
                .query("cases", &QueryOptions::new().limit(page).offset(offset))
                .unwrap();
            if chunk.is_empty() {
                break;
            }
            offset += chunk.len();
            paged.extend(chunk);
        }
        prop_assert_eq!(paged, all);
    }
}
