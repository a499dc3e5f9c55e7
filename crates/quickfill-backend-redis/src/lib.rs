//! # Quickfill Redis Backend
//!
//! This crate provides the Redis implementation of the `OrderedStore`
//! trait. Each trait method maps to exactly one Redis command, so the
//! atomicity the core relies on is Redis's own per-command atomicity.
//!
//! | Method                 | Command       |
//! |------------------------|---------------|
//! | `set_members`          | `SMEMBERS`    |
//! | `set_add`              | `SADD`        |
//! | `set_len`              | `SCARD`       |
//! | `delete`               | `DEL`         |
//! | `exists`               | `EXISTS`      |
//! | `expire`               | `EXPIRE`      |
//! | `sorted_add`           | `ZADD`        |
//! | `sorted_intersect_sum` | `ZINTERSTORE` |
//! | `sorted_top`           | `ZREVRANGE`   |
//! | `sorted_members`       | `ZRANGE`      |
//! | `sorted_remove_below`  | `ZREMRANGEBYSCORE` |
//! | `hash_set`             | `HSET`        |
//! | `hash_get_many`        | `HMGET`       |
//! | `hash_len`             | `HLEN`        |
//! | `time`                 | `TIME`        |

mod store;

pub use store::{redact_url, RedisStore};
