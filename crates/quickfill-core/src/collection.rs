//! Key layout and store access for one collection.
//!
//! Every kind owns three namespaces in the store:
//!
//! ```text
//! <ns>-index:<kind>                  set of indexed prefixes
//! <ns>-index:<kind>:<prefix>         zset  id -> rank
//! <ns>-data:<kind>                   hash  id -> record JSON
//! <ns>-cache:<kind>                  zset  cache key -> expiry (unix secs)
//! <ns>-cache:<kind>:<w1|w2|...>      zset  id -> summed rank, expires
//! ```
//!
//! The default namespace `gomate` keeps the layout readable by deployments
//! that already hold data under those keys.

use crate::error::Result;
use crate::normalize::cache_suffix;
use crate::store::OrderedStore;
use crate::types::{CollectionStats, Kind};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default key namespace
pub const DEFAULT_NAMESPACE: &str = "gomate";

/// Builds the store keys for a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        KeySpace::new(DEFAULT_NAMESPACE)
    }
}

impl KeySpace {
    /// Create a key space rooted at `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        KeySpace {
            namespace: namespace.into(),
        }
    }

    /// Get the namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Set of prefixes indexed for `kind`
    pub fn index_root(&self, kind: &Kind) -> String {
        format!("{}-index:{}", self.namespace, kind)
    }

    /// Ranked ids under one prefix
    pub fn prefix_key(&self, kind: &Kind, prefix: &str) -> String {
        format!("{}:{}", self.index_root(kind), prefix)
    }

    /// Hash of serialized records
    pub fn data_root(&self, kind: &Kind) -> String {
        format!("{}-data:{}", self.namespace, kind)
    }

    /// Registry of cache keys created for `kind`
    pub fn cache_root(&self, kind: &Kind) -> String {
        format!("{}-cache:{}", self.namespace, kind)
    }

    /// Cache entry for a sorted word list
    pub fn cache_key(&self, kind: &Kind, words: &[String]) -> String {
        format!("{}:{}", self.cache_root(kind), cache_suffix(words))
    }
}

/// One kind's view of the store.
///
/// This is the only place that knows which store primitive backs which
/// namespace. The loader and the query engine sequence these calls; each
/// call is a single store command.
pub struct Collection<'a> {
    store: &'a dyn OrderedStore,
    keys: &'a KeySpace,
    kind: Kind,
}

impl<'a> Collection<'a> {
    /// Bind a kind to a store and key space
    pub fn new(store: &'a dyn OrderedStore, keys: &'a KeySpace, kind: Kind) -> Self {
        Collection { store, keys, kind }
    }

    /// The kind this collection addresses
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The key space in use
    pub fn keys(&self) -> &KeySpace {
        self.keys
    }

    /// Delete the index, the data and every registered cache entry.
    ///
    /// Each step is a separate store command; a concurrent reader can see
    /// the kind half-cleared.
    pub fn clear(&self) -> Result<()> {
        let index_root = self.keys.index_root(&self.kind);
        let prefixes = self.store.set_members(&index_root)?;
        let prefix_keys: Vec<String> = prefixes
            .iter()
            .map(|p| self.keys.prefix_key(&self.kind, p))
            .collect();
        if !prefix_keys.is_empty() {
            self.store.delete(&prefix_keys)?;
        }

        let cache_root = self.keys.cache_root(&self.kind);
        let cache_keys = self.store.sorted_members(&cache_root)?;
        if !cache_keys.is_empty() {
            self.store.delete(&cache_keys)?;
        }

        self.store.delete(&[
            index_root,
            self.keys.data_root(&self.kind),
            cache_root,
        ])?;

        info!(
            kind = %self.kind,
            prefixes = prefix_keys.len(),
            cache_entries = cache_keys.len(),
            "Cleared collection"
        );
        Ok(())
    }

    /// Store a record's serialized form under its id.
    pub fn put_record(&self, id: &str, raw: &str) -> Result<()> {
        self.store
            .hash_set(&self.keys.data_root(&self.kind), id, raw)?;
        Ok(())
    }

    /// Register `prefix` and upsert `id` into its ranked ids.
    pub fn index_prefix(&self, prefix: &str, id: &str, rank: i64) -> Result<()> {
        self.store
            .set_add(&self.keys.index_root(&self.kind), prefix)?;
        self.store
            .sorted_add(&self.keys.prefix_key(&self.kind, prefix), id, rank as f64)?;
        Ok(())
    }

    /// Whether a cache entry exists for `words`.
    pub fn cache_exists(&self, words: &[String]) -> Result<bool> {
        Ok(self.store.exists(&self.keys.cache_key(&self.kind, words))?)
    }

    /// Compute the summed-rank intersection of the words' ranked ids into
    /// the cache and expire it after `ttl`.
    ///
    /// The cache key is registered before the entry is written, so a later
    /// clear can always find it. Registry members scored with an expiry
    /// that has passed are pruned on every registration. If any step after
    /// the intersection fails the entry is deleted again, so no entry is
    /// ever left without a TTL.
    ///
    /// Returns the number of ids cached.
    pub fn fill_cache(&self, words: &[String], ttl: Duration) -> Result<u64> {
        let cache_key = self.keys.cache_key(&self.kind, words);
        let cache_root = self.keys.cache_root(&self.kind);
        let sources: Vec<String> = words
            .iter()
            .map(|w| self.keys.prefix_key(&self.kind, w))
            .collect();

        let now = self.store.time()?.as_secs();
        let expires_at = now + ttl.as_secs();
        self.store
            .sorted_add(&cache_root, &cache_key, expires_at as f64)?;
        let pruned = self.store.sorted_remove_below(&cache_root, now as f64)?;

        let written = self.store.sorted_intersect_sum(&cache_key, &sources)?;
        let finished = self
            .store
            .expire(&cache_key, ttl)
            .and_then(|()| self.store.expire(&cache_root, ttl));
        if let Err(err) = finished {
            if let Err(cleanup) = self.store.delete(&[cache_key.clone()]) {
                warn!(key = %cache_key, error = %cleanup, "Could not drop unexpiring cache entry");
            }
            return Err(err.into());
        }

        debug!(
            kind = %self.kind,
            key = %cache_key,
            ids = written,
            pruned,
            "Filled cache entry"
        );
        Ok(written)
    }

    /// Highest-scored ids of the cache entry for `words`.
    pub fn top_cached(&self, words: &[String], count: usize) -> Result<Vec<String>> {
        Ok(self
            .store
            .sorted_top(&self.keys.cache_key(&self.kind, words), count)?)
    }

    /// Serialized records for `ids`, in the same order.
    pub fn fetch_records(&self, ids: &[String]) -> Result<Vec<Option<String>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .hash_get_many(&self.keys.data_root(&self.kind), ids)?)
    }

    /// Count prefixes and records.
    pub fn stats(&self) -> Result<CollectionStats> {
        Ok(CollectionStats {
            prefixes: self.store.set_len(&self.keys.index_root(&self.kind))?,
            records: self.store.hash_len(&self.keys.data_root(&self.kind))?,
        })
    }
}
