//! Ordered key-value store capability.
//!
//! The core never talks to a concrete database. Everything it needs is
//! expressed by `OrderedStore`: plain sets, sorted sets scored by `f64`,
//! hashes, key deletion and key expiry. The Redis backend implements it over
//! a live connection and `MemoryStore` implements it in-process for tests.
//!
//! ## Atomicity
//!
//! Each method is expected to be atomic on its own, the way a single Redis
//! command is. Nothing spans several calls; multi-step sequences such as a
//! load or a cache fill can be observed half-done by other callers.
//!
//! ## Ordering
//!
//! `sorted_top` returns members by descending score. Members with equal
//! scores come back in descending byte order of the member, which is what
//! Redis `ZREVRANGE` does. Callers must not rely on tie order beyond that.

use crate::error::StoreError;
use std::time::Duration;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract interface over the external ordered store.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; all methods take `&self` so that
/// one store can be shared between a loader and concurrent queries.
pub trait OrderedStore: Send + Sync {
    /// Members of the set at `key` (empty if missing).
    fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Add `member` to the set at `key`.
    fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Number of members of the set at `key`.
    fn set_len(&self, key: &str) -> StoreResult<u64>;

    /// Delete every listed key. Missing keys are ignored.
    fn delete(&self, keys: &[String]) -> StoreResult<()>;

    /// Whether `key` exists and has not expired.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Expire `key` after `ttl`.
    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// Insert or re-score `member` in the sorted set at `key`.
    fn sorted_add(&self, key: &str, member: &str, score: f64) -> StoreResult<()>;

    /// Store at `dest` the members present in every sorted set in `sources`,
    /// each scored with the sum of its scores across `sources`.
    ///
    /// Any previous value at `dest` is replaced. An empty intersection leaves
    /// `dest` absent. Returns the number of members written.
    fn sorted_intersect_sum(&self, dest: &str, sources: &[String]) -> StoreResult<u64>;

    /// Up to `count` members of the sorted set at `key`, highest score first.
    fn sorted_top(&self, key: &str, count: usize) -> StoreResult<Vec<String>>;

    /// Every member of the sorted set at `key`, lowest score first.
    fn sorted_members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Remove the members of the sorted set at `key` scored at or below
    /// `max_score`. Returns the number removed.
    fn sorted_remove_below(&self, key: &str, max_score: f64) -> StoreResult<u64>;

    /// Set `field` of the hash at `key`.
    fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Values of several hash fields, `None` where a field is missing.
    fn hash_get_many(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Number of fields of the hash at `key`.
    fn hash_len(&self, key: &str) -> StoreResult<u64>;

    /// Current time of the store's clock, as time since the Unix epoch.
    fn time(&self) -> StoreResult<Duration>;

    /// Get the backend name (e.g., "redis", "memory")
    fn name(&self) -> &'static str;
}
