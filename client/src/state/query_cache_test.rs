use super::*;
use serde_json::json;

#[test]
fn starts_empty() {
    let cache = QueryCache::default();
    assert!(cache.is_empty());
    assert_eq!(cache.generation(), 0);
    assert!(cache.get("session").is_none());
}

#[test]
fn complete_stores_value_under_ticket_key() {
    let mut cache = QueryCache::default();
    let ticket = cache.begin("accounts");
    assert_eq!(ticket.key(), "accounts");
    assert!(cache.complete(ticket, json!([{ "id": 1 }])));
    assert_eq!(cache.get("accounts"), Some(&json!([{ "id": 1 }])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn invalidate_all_clears_entries_and_bumps_generation() {
    let mut cache = QueryCache::default();
    let a = cache.begin("accounts");
    cache.complete(a, json!([]));
    let t = cache.begin("transactions");
    cache.complete(t, json!([]));

    cache.invalidate_all();
    assert!(cache.is_empty());
    assert_eq!(cache.generation(), 1);
}

#[test]
fn late_result_from_before_invalidation_is_dropped() {
    let mut cache = QueryCache::default();
    let stale = cache.begin("accounts");
    cache.invalidate_all();

    assert!(!cache.complete(stale, json!(["pre-login data"])));
    assert!(cache.get("accounts").is_none());

    let fresh = cache.begin("accounts");
    assert!(cache.complete(fresh, json!(["post-login data"])));
    assert_eq!(cache.get("accounts"), Some(&json!(["post-login data"])));
}
