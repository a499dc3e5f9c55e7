//! Ranked autocomplete queries.
//!
//! A query is normalized and split into words; words shorter than
//! `min_word_len` are dropped. The remaining words are sorted, so "pie apple"
//! and "apple pie" share one cache entry. On a cache miss the ranked ids of
//! every word are intersected into the cache with scores summed: a record
//! matching N words scores the sum of its N ranks, and a record missing from
//! any word's ids is excluded. The top ids are then resolved to records.
//!
//! ## Failure policy
//!
//! - Connection failures always propagate.
//! - A failed command while checking or filling the cache is logged and
//!   the query returns no results.
//! - A ranked id whose record is missing or undecodable is skipped and
//!   reported in `QueryOutcome::skipped`; the other results are returned.
//!
//! Concurrent cold-cache queries for the same words may each fill the cache.
//! The fills are identical, so the last write wins harmlessly.

use crate::collection::{Collection, KeySpace};
use crate::config::QueryConfig;
use crate::error::{QuickfillError, Result};
use crate::normalize::query_words;
use crate::store::OrderedStore;
use crate::types::{Item, Kind, QueryOutcome, SkippedResult};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Answers autocomplete queries against loaded collections.
pub struct QueryEngine<'a> {
    store: &'a dyn OrderedStore,
    keys: &'a KeySpace,
    config: QueryConfig,
}

impl<'a> QueryEngine<'a> {
    /// Create a query engine over `store`.
    pub fn new(store: &'a dyn OrderedStore, keys: &'a KeySpace, config: QueryConfig) -> Self {
        QueryEngine {
            store,
            keys,
            config,
        }
    }

    /// Find up to `max_results` records of `kind` matching every word of
    /// `text`, highest summed rank first.
    #[instrument(skip_all, fields(kind = %kind, query = %text))]
    pub fn query(&self, kind: &Kind, text: &str) -> Result<QueryOutcome> {
        let words = query_words(text, self.config.min_word_len);
        if words.is_empty() {
            debug!("No searchable words");
            return Ok(QueryOutcome::default());
        }

        let collection = Collection::new(self.store, self.keys, kind.clone());
        let cache_hit = tolerate(collection.cache_exists(&words), "EXISTS")?.unwrap_or(false);

        if cache_hit {
            debug!(words = ?words, "Cache hit");
        } else {
            debug!(words = ?words, "Cache miss");
            let ttl = Duration::from_secs(self.config.cache_ttl_secs);
            if tolerate(collection.fill_cache(&words, ttl), "cache fill")?.is_none() {
                return Ok(QueryOutcome::default());
            }
        }

        let ids = collection.top_cached(&words, self.config.max_results)?;
        let raws = collection.fetch_records(&ids)?;

        let mut outcome = QueryOutcome {
            cache_hit,
            ..Default::default()
        };
        for (id, raw) in ids.into_iter().zip(raws) {
            match resolve(kind, raw.as_deref()) {
                Ok(item) => outcome.items.push(item),
                Err(reason) => {
                    warn!(id = %id, reason = %reason, "Skipping unresolvable result");
                    outcome.skipped.push(SkippedResult { id, reason });
                }
            }
        }

        Ok(outcome)
    }
}

/// Decode a stored record, describing why it cannot be used if it fails.
fn resolve(kind: &Kind, raw: Option<&str>) -> std::result::Result<Item, String> {
    match raw {
        None => Err("record missing from data namespace".to_string()),
        Some(raw) => Item::from_json(raw, kind).map_err(|e| format!("invalid stored record: {e}")),
    }
}

/// Turn a non-connection store failure into `None` after logging it.
fn tolerate<T>(result: Result<T>, step: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(QuickfillError::Store(err)) if !err.is_connection() => {
            warn!(step, error = %err, "Store command failed, treating as empty");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadConfig;
    use crate::error::StoreError;
    use crate::loader::Loader;
    use crate::memory::MemoryStore;
    use std::io::Cursor;
    use std::sync::Arc;

    const FRUIT: &str = r#"{"kind":"fruit","id":"1","term":"apple pie","rank":5,"data":null}
{"kind":"fruit","id":"2","term":"apple tart","rank":10,"data":null}
{"kind":"fruit","id":"3","term":"banana split","rank":1,"data":null}
"#;

    fn fruit() -> Kind {
        Kind::new("fruit").unwrap()
    }

    fn loaded(input: &str) -> (MemoryStore, KeySpace) {
        let store = MemoryStore::new();
        let keys = KeySpace::default();
        Loader::new(&store, &keys, LoadConfig::default())
            .load(&fruit(), Cursor::new(input))
            .unwrap();
        (store, keys)
    }

    fn terms(store: &MemoryStore, keys: &KeySpace, text: &str) -> Vec<String> {
        QueryEngine::new(store, keys, QueryConfig::default())
            .query(&fruit(), text)
            .unwrap()
            .items
            .into_iter()
            .map(|item| item.term)
            .collect()
    }

    #[test]
    fn test_prefix_query_ranked() {
        let (store, keys) = loaded(FRUIT);
        assert_eq!(terms(&store, &keys, "app"), vec!["apple tart", "apple pie"]);
        assert_eq!(terms(&store, &keys, "APPLE"), vec!["apple tart", "apple pie"]);
    }

    #[test]
    fn test_multi_word_intersection() {
        let (store, keys) = loaded(FRUIT);
        assert_eq!(terms(&store, &keys, "apple pie"), vec!["apple pie"]);
        assert_eq!(terms(&store, &keys, "ban spl"), vec!["banana split"]);
        assert!(terms(&store, &keys, "apple split").is_empty());
    }

    #[test]
    fn test_no_match() {
        let (store, keys) = loaded(FRUIT);
        assert!(terms(&store, &keys, "xyz").is_empty());
    }

    #[test]
    fn test_short_words_skip_store() {
        let (store, keys) = loaded(FRUIT);
        let before = store.command_count();

        assert!(terms(&store, &keys, "a").is_empty());
        assert!(terms(&store, &keys, "ap  pi").is_empty());
        assert_eq!(store.command_count(), before);
    }

    #[test]
    fn test_short_words_ignored_among_long_ones() {
        let (store, keys) = loaded(FRUIT);
        assert_eq!(terms(&store, &keys, "a pie"), vec!["apple pie"]);
    }

    #[test]
    fn test_word_order_insensitive() {
        let (store, keys) = loaded(FRUIT);
        let engine = QueryEngine::new(&store, &keys, QueryConfig::default());

        let first = engine.query(&fruit(), "tart apple").unwrap();
        let second = engine.query(&fruit(), "apple tart").unwrap();
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.items, second.items);
        assert_eq!(first.terms(), vec!["apple tart"]);
    }

    #[test]
    fn test_scores_are_summed() {
        let input = r#"{"id":"a","term":"red apple","rank":3}
{"id":"b","term":"red apple","rank":4}
{"id":"c","term":"red","rank":100}
{"id":"d","term":"green apple","rank":50}"#;
        let (store, keys) = loaded(input);

        assert_eq!(terms(&store, &keys, "red apple"), vec!["red apple", "red apple"]);
        assert_eq!(store.score("gomate-cache:fruit:apple|red", "a"), Some(6.0));
        assert_eq!(store.score("gomate-cache:fruit:apple|red", "b"), Some(8.0));
        assert_eq!(store.score("gomate-cache:fruit:apple|red", "c"), None);
        assert_eq!(store.score("gomate-cache:fruit:apple|red", "d"), None);
    }

    #[test]
    fn test_repeated_word_counts_per_structure() {
        let (store, keys) = loaded(FRUIT);
        // "pie pie" intersects the same structure twice
        assert_eq!(terms(&store, &keys, "pie pie"), vec!["apple pie"]);
        assert_eq!(store.score("gomate-cache:fruit:pie|pie", "1"), Some(10.0));
    }

    #[test]
    fn test_top_five_only() {
        let input: String = (1..=8)
            .map(|i| format!("{{\"id\":\"{i}\",\"term\":\"melon {i}\",\"rank\":{i}}}\n"))
            .collect();
        let (store, keys) = loaded(&input);

        let found = terms(&store, &keys, "melon");
        assert_eq!(found, vec!["melon 8", "melon 7", "melon 6", "melon 5", "melon 4"]);
    }

    #[test]
    fn test_returns_full_record() {
        let input = r#"{"kind":"fruit","id":"7","term":"quince","rank":1,"data":{"color":"yellow"}}"#;
        let (store, keys) = loaded(input);
        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "qui")
            .unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].id, "7");
        assert_eq!(outcome.items[0].data["color"], "yellow");
    }

    #[test]
    fn test_cache_expires_after_ttl() {
        let (store, keys) = loaded(FRUIT);
        let engine = QueryEngine::new(&store, &keys, QueryConfig::default());

        assert!(!engine.query(&fruit(), "apple").unwrap().cache_hit);
        store.advance_clock(Duration::from_secs(599));
        assert!(engine.query(&fruit(), "apple").unwrap().cache_hit);
        store.advance_clock(Duration::from_secs(1));
        assert!(!engine.query(&fruit(), "apple").unwrap().cache_hit);
    }

    #[test]
    fn test_reload_invalidates_cache() {
        let (store, keys) = loaded(FRUIT);
        assert_eq!(terms(&store, &keys, "apple"), vec!["apple tart", "apple pie"]);

        let replacement = r#"{"id":"4","term":"apple crumble","rank":1}"#;
        Loader::new(&store, &keys, LoadConfig::default())
            .load(&fruit(), Cursor::new(replacement))
            .unwrap();

        assert_eq!(terms(&store, &keys, "apple"), vec!["apple crumble"]);
        assert!(terms(&store, &keys, "banana").is_empty());
    }

    #[test]
    fn test_missing_record_skipped() {
        let (store, keys) = loaded(FRUIT);
        store
            .delete(&["gomate-data:fruit".to_string()])
            .unwrap();
        store.hash_set("gomate-data:fruit", "1", r#"{"id":"1","term":"apple pie","rank":5}"#).unwrap();

        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap();
        assert_eq!(outcome.terms(), vec!["apple pie"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].id, "2");
    }

    #[test]
    fn test_undecodable_record_skipped() {
        let (store, keys) = loaded(FRUIT);
        store.hash_set("gomate-data:fruit", "2", "garbage").unwrap();

        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap();
        assert_eq!(outcome.terms(), vec!["apple pie"]);
        assert_eq!(outcome.skipped[0].id, "2");
        assert!(outcome.skipped[0].reason.contains("invalid stored record"));
    }

    #[test]
    fn test_cleared_index_returns_empty() {
        let (store, keys) = loaded(FRUIT);
        Collection::new(&store, &keys, fruit()).clear().unwrap();

        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_partial_load_is_visible() {
        let input = r#"{"id":"1","term":"apple pie","rank":5}
not json
{"id":"2","term":"apple tart","rank":10}"#;
        let store = MemoryStore::new();
        let keys = KeySpace::default();
        assert!(Loader::new(&store, &keys, LoadConfig::default())
            .load(&fruit(), Cursor::new(input))
            .is_err());

        assert_eq!(terms(&store, &keys, "apple"), vec!["apple pie"]);
    }

    #[test]
    fn test_cache_fill_command_error_is_empty() {
        let (store, keys) = loaded(FRUIT);
        store.fail_command("ZINTERSTORE", StoreError::command("ZINTERSTORE", "OOM"));

        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap();
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_failed_cache_expiry_does_not_outlive_reload() {
        let (store, keys) = loaded(FRUIT);
        store.fail_command("EXPIRE", StoreError::command("EXPIRE", "READONLY"));
        assert!(terms(&store, &keys, "apple").is_empty());
        assert!(!store.exists("gomate-cache:fruit:apple").unwrap());

        store.clear_failures();
        let replacement = r#"{"id":"4","term":"apple crumble","rank":1}"#;
        Loader::new(&store, &keys, LoadConfig::default())
            .load(&fruit(), Cursor::new(replacement))
            .unwrap();

        let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap();
        assert_eq!(outcome.terms(), vec!["apple crumble"]);
        assert!(outcome.skipped.is_empty());
        assert!(store.ttl("gomate-cache:fruit:apple").is_some());
    }

    #[test]
    fn test_failed_registration_is_consistent() {
        let (store, keys) = loaded(FRUIT);
        store.fail_command("ZADD", StoreError::command("ZADD", "OOM"));

        // Nothing is cached, so repeating the query gives the same answer
        assert!(terms(&store, &keys, "apple").is_empty());
        assert!(!store.exists("gomate-cache:fruit:apple").unwrap());
        assert!(terms(&store, &keys, "apple").is_empty());

        store.clear_failures();
        assert_eq!(terms(&store, &keys, "apple"), vec!["apple tart", "apple pie"]);
    }

    #[test]
    fn test_exists_command_error_recomputes() {
        let (store, keys) = loaded(FRUIT);
        store.fail_command("EXISTS", StoreError::command("EXISTS", "busy"));
        assert_eq!(terms(&store, &keys, "apple"), vec!["apple tart", "apple pie"]);
    }

    #[test]
    fn test_connection_error_propagates() {
        let (store, keys) = loaded(FRUIT);
        store.fail_command("EXISTS", StoreError::unavailable("redis://x", "reset"));

        let err = QueryEngine::new(&store, &keys, QueryConfig::default())
            .query(&fruit(), "apple")
            .unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn test_concurrent_cold_cache_queries_agree() {
        let (store, keys) = loaded(FRUIT);
        let store = Arc::new(store);
        let keys = Arc::new(keys);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let keys = Arc::clone(&keys);
                std::thread::spawn(move || {
                    QueryEngine::new(store.as_ref(), keys.as_ref(), QueryConfig::default())
                        .query(&fruit(), "apple")
                        .unwrap()
                        .items
                })
            })
            .collect();

        let results: Vec<Vec<Item>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for items in &results {
            assert_eq!(items, &results[0]);
        }
        assert_eq!(results[0].len(), 2);
    }
}
