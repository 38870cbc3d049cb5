// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # stmtcache - Per-connection prepared statement cache
//!
//! Re-preparing the same SQL on every call costs a round trip and driver
//! resources. This crate keeps the statements a connection has already
//! prepared, keyed by the exact creation arguments, and hands them back on
//! the next identical request.
//!
//! ## Key Features
//!
//! - **Exact LRU** - O(1) lookup, promotion and eviction over an index-linked arena
//! - **Signature keys** - Same SQL prepared with different options gets a different entry
//! - **Deterministic cleanup** - Evicted and cleared statements are closed exactly once
//! - **Connection wrapper** - [`api::CachingConnection`] does probe-or-prepare for you
//!
//! ## Quick Start
//!
//! ```rust
//! use stmtcache::{StatementCache, StatementHandle, StatementKey, Result};
//!
//! struct Stmt(&'static str);
//!
//! impl StatementHandle for Stmt {
//!     fn close(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut cache = StatementCache::new(20).unwrap();
//!
//! let key = StatementKey::prepared("SELECT name FROM users WHERE id = $1");
//! if cache.get(&key).is_none() {
//!     cache.insert(key.clone(), Stmt("prepared")).unwrap();
//! }
//! assert_eq!(cache.get(&key).map(|s| s.0), Some("prepared"));
//! ```
//!
//! ## Modules
//!
//! - [`cache`] - Keys, the bounded LRU store, handles and statistics
//! - [`api`] - [`api::CachingConnection`] and the [`api::StatementSource`] trait
//! - [`core`] - Creation option types, configuration and [`Error`]

pub mod api;
pub mod cache;
pub mod core;

// Re-export main types for convenience
pub use self::core::{
    Error, GeneratedKeys, Result, ResultSetConcurrency, ResultSetHoldability, ResultSetType,
    StatementCacheConfig, StatementKind, DEFAULT_STATEMENT_CACHE_SIZE,
};

pub use cache::{
    BoundedLruCache, CacheStats, CallableSignature, PreparedSignature, Signature,
    StatementCache, StatementHandle, StatementKey,
};

pub use api::{CachingConnection, StatementSource};
