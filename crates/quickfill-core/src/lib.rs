//! # Quickfill Core Library
//!
//! This crate provides prefix-based autocomplete over collections ("kinds")
//! of short terms kept in an external ordered key-value store. It is
//! independent of any particular store: everything goes through the
//! `OrderedStore` trait.
//!
//! ## Architecture
//!
//! - **Normalize** (`normalize`): Text canonicalization and prefix expansion
//! - **Store** (`store`): The ordered-store capability trait
//! - **Memory** (`memory`): In-process store for tests and embedding
//! - **Collection** (`collection`): Key layout and per-kind store access
//! - **Loader** (`loader`): Clear-and-rebuild of a kind from JSON lines
//! - **Query** (`query`): Cached, ranked multi-word intersection
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust
//! use quickfill_core::{Kind, KeySpace, Loader, MemoryStore, QueryEngine};
//! use quickfill_core::config::{LoadConfig, QueryConfig};
//! use std::io::Cursor;
//!
//! let store = MemoryStore::new();
//! let keys = KeySpace::default();
//! let kind = Kind::new("fruit").unwrap();
//!
//! let input = r#"{"id":"1","term":"apple pie","rank":5}"#;
//! Loader::new(&store, &keys, LoadConfig::default())
//!     .load(&kind, Cursor::new(input))
//!     .unwrap();
//!
//! let outcome = QueryEngine::new(&store, &keys, QueryConfig::default())
//!     .query(&kind, "app")
//!     .unwrap();
//! assert_eq!(outcome.terms(), vec!["apple pie"]);
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod loader;
pub mod memory;
pub mod normalize;
pub mod query;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use collection::{Collection, KeySpace};
pub use config::Config;
pub use error::{QuickfillError, Result, StoreError};
pub use loader::Loader;
pub use memory::MemoryStore;
pub use query::QueryEngine;
pub use store::{OrderedStore, StoreResult};
pub use types::{CollectionStats, Item, Kind, LoadReport, QueryOutcome, SkippedResult};
