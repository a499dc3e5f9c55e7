//! In-process implementation of `OrderedStore`.
//!
//! `MemoryStore` mirrors the Redis semantics the core depends on: lazily
//! evaluated key expiry, type errors when a key is used as the wrong kind of
//! value, empty intersections leaving the destination absent, and
//! `ZREVRANGE` tie ordering. A single mutex makes every method atomic.
//!
//! Two test hooks are provided: an adjustable clock (`advance_clock`) for
//! expiry, and injected failures (`fail_command`) for error-policy tests.

use crate::error::StoreError;
use crate::store::{OrderedStore, StoreResult};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
enum Value {
    Set(BTreeSet<String>),
    Sorted(HashMap<String, f64>),
    Hash(HashMap<String, String>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Set(_) => "set",
            Value::Sorted(_) => "zset",
            Value::Hash(_) => "hash",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    clock_offset: Duration,
    failures: HashMap<&'static str, StoreError>,
    commands: u64,
}

impl Inner {
    fn now(&self) -> Instant {
        Instant::now() + self.clock_offset
    }

    /// Count a command and return its injected failure, if any.
    fn begin(&mut self, command: &'static str) -> StoreResult<()> {
        self.commands += 1;
        match self.failures.get(command) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Drop `key` if it has expired, then return it.
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        let now = self.now();
        let expired = self
            .entries
            .get(key)
            .and_then(|e| e.expires_at)
            .is_some_and(|at| at <= now);
        if expired {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn set(&mut self, command: &'static str, key: &str) -> StoreResult<Option<&BTreeSet<String>>> {
        match self.live(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Set(set)) => Ok(Some(set)),
            Some(other) => Err(wrong_type(command, other)),
        }
    }

    fn sorted(
        &mut self,
        command: &'static str,
        key: &str,
    ) -> StoreResult<Option<&HashMap<String, f64>>> {
        match self.live(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Sorted(zset)) => Ok(Some(zset)),
            Some(other) => Err(wrong_type(command, other)),
        }
    }

    fn hash(
        &mut self,
        command: &'static str,
        key: &str,
    ) -> StoreResult<Option<&HashMap<String, String>>> {
        match self.live(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(Some(hash)),
            Some(other) => Err(wrong_type(command, other)),
        }
    }

    /// Get the value at `key`, creating it with `empty` if missing.
    fn value_mut(
        &mut self,
        command: &'static str,
        key: &str,
        empty: fn() -> Value,
    ) -> StoreResult<&mut Value> {
        if self.live(key).is_none() {
            self.entries.insert(
                key.to_string(),
                Entry {
                    value: empty(),
                    expires_at: None,
                },
            );
        }
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::command(command, "key vanished"))?;
        let expected = empty().type_name();
        if entry.value.type_name() != expected {
            return Err(wrong_type(command, &entry.value));
        }
        Ok(&mut entry.value)
    }
}

fn wrong_type(command: &str, found: &Value) -> StoreError {
    StoreError::command(
        command,
        format!(
            "WRONGTYPE operation against a key holding a {}",
            found.type_name()
        ),
    )
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the store's clock forward, expiring keys whose TTL has passed.
    pub fn advance_clock(&self, by: Duration) {
        self.inner.lock().clock_offset += by;
    }

    /// Make every later call of `command` fail with `error`.
    ///
    /// Command names are the Redis names (`"ZINTERSTORE"`, `"HMGET"`, ...).
    pub fn fail_command(&self, command: &'static str, error: StoreError) {
        self.inner.lock().failures.insert(command, error);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.inner.lock().failures.clear();
    }

    /// Number of commands executed so far.
    pub fn command_count(&self) -> u64 {
        self.inner.lock().commands
    }

    /// Number of live keys.
    pub fn key_count(&self) -> usize {
        let mut inner = self.inner.lock();
        let keys: Vec<String> = inner.entries.keys().cloned().collect();
        keys.iter().filter(|k| inner.live(k).is_some()).count()
    }

    /// Remaining time to live of `key`, if it exists and has an expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let mut inner = self.inner.lock();
        let now = inner.now();
        inner
            .live(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Score of `member` in the sorted set at `key`.
    pub fn score(&self, key: &str, member: &str) -> Option<f64> {
        let mut inner = self.inner.lock();
        match inner.live(key).map(|e| &e.value) {
            Some(Value::Sorted(zset)) => zset.get(member).copied(),
            _ => None,
        }
    }
}

impl OrderedStore for MemoryStore {
    fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut inner = self.inner.lock();
        inner.begin("SMEMBERS")?;
        Ok(inner
            .set("SMEMBERS", key)?
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.begin("SADD")?;
        if let Value::Set(set) = inner.value_mut("SADD", key, || Value::Set(BTreeSet::new()))? {
            set.insert(member.to_string());
        }
        Ok(())
    }

    fn set_len(&self, key: &str) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        inner.begin("SCARD")?;
        Ok(inner.set("SCARD", key)?.map_or(0, |set| set.len() as u64))
    }

    fn delete(&self, keys: &[String]) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.begin("DEL")?;
        for key in keys {
            inner.entries.remove(key);
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock();
        inner.begin("EXISTS")?;
        Ok(inner.live(key).is_some())
    }

    fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.begin("EXPIRE")?;
        let at = inner.now() + ttl;
        if let Some(entry) = inner.live(key) {
            entry.expires_at = Some(at);
        }
        Ok(())
    }

    fn sorted_add(&self, key: &str, member: &str, score: f64) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.begin("ZADD")?;
        if let Value::Sorted(zset) =
            inner.value_mut("ZADD", key, || Value::Sorted(HashMap::new()))?
        {
            zset.insert(member.to_string(), score);
        }
        Ok(())
    }

    fn sorted_intersect_sum(&self, dest: &str, sources: &[String]) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        inner.begin("ZINTERSTORE")?;

        let mut result: Option<HashMap<String, f64>> = None;
        for source in sources {
            let zset = inner.sorted("ZINTERSTORE", source)?.cloned().unwrap_or_default();
            result = Some(match result {
                None => zset,
                Some(acc) => acc
                    .into_iter()
                    .filter_map(|(member, score)| {
                        zset.get(&member).map(|other| (member, score + other))
                    })
                    .collect(),
            });
        }

        let result = result.unwrap_or_default();
        let written = result.len() as u64;
        inner.entries.remove(dest);
        if !result.is_empty() {
            inner.entries.insert(
                dest.to_string(),
                Entry {
                    value: Value::Sorted(result),
                    expires_at: None,
                },
            );
        }
        Ok(written)
    }

    fn sorted_top(&self, key: &str, count: usize) -> StoreResult<Vec<String>> {
        let mut inner = self.inner.lock();
        inner.begin("ZREVRANGE")?;
        let Some(zset) = inner.sorted("ZREVRANGE", key)? else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));
        Ok(ranked
            .into_iter()
            .take(count)
            .map(|(member, _)| member.clone())
            .collect())
    }

    fn sorted_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut inner = self.inner.lock();
        inner.begin("ZRANGE")?;
        let Some(zset) = inner.sorted("ZRANGE", key)? else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked.into_iter().map(|(member, _)| member.clone()).collect())
    }

    fn sorted_remove_below(&self, key: &str, max_score: f64) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        inner.begin("ZREMRANGEBYSCORE")?;
        if inner.sorted("ZREMRANGEBYSCORE", key)?.is_none() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut now_empty = false;
        if let Some(Entry {
            value: Value::Sorted(zset),
            ..
        }) = inner.entries.get_mut(key)
        {
            let before = zset.len();
            zset.retain(|_, score| *score > max_score);
            removed = (before - zset.len()) as u64;
            now_empty = zset.is_empty();
        }
        // Redis drops a sorted set once its last member is removed
        if now_empty {
            inner.entries.remove(key);
        }
        Ok(removed)
    }

    fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.begin("HSET")?;
        if let Value::Hash(hash) = inner.value_mut("HSET", key, || Value::Hash(HashMap::new()))? {
            hash.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    fn hash_get_many(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        let mut inner = self.inner.lock();
        inner.begin("HMGET")?;
        let hash = inner.hash("HMGET", key)?;
        Ok(fields
            .iter()
            .map(|field| hash.and_then(|h| h.get(field).cloned()))
            .collect())
    }

    fn hash_len(&self, key: &str) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        inner.begin("HLEN")?;
        Ok(inner.hash("HLEN", key)?.map_or(0, |hash| hash.len() as u64))
    }

    fn time(&self) -> StoreResult<Duration> {
        let mut inner = self.inner.lock();
        inner.begin("TIME")?;
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::command("TIME", e.to_string()))?;
        Ok(since_epoch + inner.clock_offset)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
