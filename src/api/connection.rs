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

//! Connection wrapper with statement caching
//!
//! # Examples
//!
//! ```
//! use stmtcache::api::{CachingConnection, StatementSource};
//! use stmtcache::cache::{StatementHandle, StatementKey};
//! use stmtcache::core::{Result, StatementCacheConfig};
//!
//! struct Stmt {
//!     sql: String,
//! }
//!
//! impl StatementHandle for Stmt {
//!     fn close(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! struct Driver {
//!     prepared: usize,
//! }
//!
//! impl StatementSource for Driver {
//!     type Statement = Stmt;
//!
//!     fn prepare(&mut self, key: &StatementKey) -> Result<Stmt> {
//!         self.prepared += 1;
//!         Ok(Stmt { sql: key.sql().to_string() })
//!     }
//! }
//!
//! let mut conn = CachingConnection::new(Driver { prepared: 0 }, StatementCacheConfig::default())?;
//!
//! // First call prepares, second call reuses the cached statement
//! conn.prepare_statement("SELECT * FROM users WHERE id = $1")?;
//! let stmt = conn.prepare_statement("SELECT * FROM users WHERE id = $1")?;
//! assert_eq!(stmt.sql, "SELECT * FROM users WHERE id = $1");
//! assert_eq!(conn.source().prepared, 1);
//! # Ok::<(), stmtcache::core::Error>(())
//! ```

use compact_str::CompactString;
use tracing::debug;

use crate::cache::{CacheStats, StatementCache, StatementHandle, StatementKey};
use crate::core::{
    Error, GeneratedKeys, Result, ResultSetConcurrency, ResultSetHoldability, ResultSetType,
    StatementCacheConfig,
};

/// Creates driver statements on cache misses
///
/// Implemented by the physical connection. The key carries the exact SQL
/// text and creation options to prepare with.
pub trait StatementSource {
    /// Statement type produced by this source
    type Statement: StatementHandle;

    /// Prepare a new statement matching `key`
    fn prepare(&mut self, key: &StatementKey) -> Result<Self::Statement>;
}

/// A connection that reuses prepared statements
///
/// Every `prepare_*` call builds a [`StatementKey`] from its arguments and
/// returns the cached statement for it, preparing through the
/// [`StatementSource`] only on a miss. Closing or dropping the connection
/// releases every cached statement.
///
/// # Thread Safety
///
/// Not synchronized. A connection is used by one thread at a time.
pub struct CachingConnection<S: StatementSource> {
    source: S,
    cache: StatementCache<S::Statement>,
    closed: bool,
}

impl<S: StatementSource> CachingConnection<S> {
    /// Wrap a statement source with a cache sized by `config`
    pub fn new(source: S, config: StatementCacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            cache: StatementCache::new(config.capacity)?,
            closed: false,
        })
    }

    /// The underlying statement source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the underlying statement source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Statement cache counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of statements currently cached
    pub fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release all cached statements and mark the connection closed
    ///
    /// Calling close more than once is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!(cached = self.cache.len(), "closing caching connection");
        self.cache.clear();
        self.closed = true;
    }

    /// Return the cached statement for `key`, preparing it on a miss
    pub fn statement(&mut self, key: StatementKey) -> Result<&mut S::Statement> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        let source = &mut self.source;
        self.cache
            .get_or_try_insert_with(key, |key| source.prepare(key))
    }

    pub fn prepare_statement(&mut self, sql: impl Into<CompactString>) -> Result<&mut S::Statement> {
        self.statement(StatementKey::prepared(sql))
    }

    pub fn prepare_statement_with_generated_keys(
        &mut self,
        sql: impl Into<CompactString>,
        mode: GeneratedKeys,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::prepared_with_generated_keys(sql, mode))
    }

    pub fn prepare_statement_with_column_indexes(
        &mut self,
        sql: impl Into<CompactString>,
        column_indexes: impl Into<Box<[i32]>>,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::prepared_with_column_indexes(
            sql,
            column_indexes,
        ))
    }

    pub fn prepare_statement_with_column_names<I>(
        &mut self,
        sql: impl Into<CompactString>,
        column_names: I,
    ) -> Result<&mut S::Statement>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.statement(StatementKey::prepared_with_column_names(sql, column_names))
    }

    pub fn prepare_statement_with_result_set(
        &mut self,
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::prepared_with_result_set(
            sql,
            result_type,
            concurrency,
        ))
    }

    pub fn prepare_statement_with_holdability(
        &mut self,
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::prepared_with_holdability(
            sql,
            result_type,
            concurrency,
            holdability,
        ))
    }

    pub fn prepare_call(&mut self, sql: impl Into<CompactString>) -> Result<&mut S::Statement> {
        self.statement(StatementKey::callable(sql))
    }

    pub fn prepare_call_with_result_set(
        &mut self,
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::callable_with_result_set(
            sql,
            result_type,
            concurrency,
        ))
    }

    pub fn prepare_call_with_holdability(
        &mut self,
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    ) -> Result<&mut S::Statement> {
        self.statement(StatementKey::callable_with_holdability(
            sql,
            result_type,
            concurrency,
            holdability,
        ))
    }
}

impl<S: StatementSource> Drop for CachingConnection<S> {
    fn drop(&mut self) {
        // Release cached statements if not closed explicitly
        self.close();
    }
}
