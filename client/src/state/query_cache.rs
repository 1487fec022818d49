//! Client-held query cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages store fetched JSON under a query key. A successful sign-in wipes the
//! whole cache so nothing fetched before authentication leaks into the
//! authenticated view.
//!
//! TRADE-OFFS
//! ==========
//! Invalidation is wholesale; there is no per-key expiry. A generation
//! counter guards against fetches that started before an invalidation and
//! complete after it.

#[cfg(test)]
#[path = "query_cache_test.rs"]
mod query_cache_test;

use std::collections::HashMap;

use serde_json::Value;

/// Handle for an in-flight fetch, stamped with the generation it started in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTicket {
    key: String,
    generation: u64,
}

impl QueryTicket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Clone, Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, Value>,
    generation: u64,
}

impl QueryCache {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a fetch for `key`.
    pub fn begin(&self, key: &str) -> QueryTicket {
        QueryTicket { key: key.to_owned(), generation: self.generation }
    }

    /// Store a fetch result. Returns `false` and drops `value` when the cache
    /// was invalidated after `ticket` was issued.
    pub fn complete(&mut self, ticket: QueryTicket, value: Value) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.entries.insert(ticket.key, value);
        true
    }

    /// Drop every entry and retire all outstanding tickets.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }
}
