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

//! Statement cache keys
//!
//! A [`StatementKey`] captures the exact arguments a statement was created
//! with. Two statements prepared from the same SQL text with different
//! creation options are different driver objects, so they get different keys.
//!
//! # Example
//!
//! ```
//! use stmtcache::cache::StatementKey;
//! use stmtcache::core::GeneratedKeys;
//!
//! let plain = StatementKey::prepared("INSERT INTO t VALUES ($1)");
//! let with_keys =
//!     StatementKey::prepared_with_generated_keys("INSERT INTO t VALUES ($1)", GeneratedKeys::Return);
//! assert_ne!(plain, with_keys);
//!
//! let a = StatementKey::prepared_with_column_indexes("INSERT INTO t VALUES ($1)", vec![1, 2]);
//! let b = StatementKey::prepared_with_column_indexes("INSERT INTO t VALUES ($1)", &[1, 2][..]);
//! assert_eq!(a, b);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use compact_str::CompactString;

use crate::core::{
    GeneratedKeys, ResultSetConcurrency, ResultSetHoldability, ResultSetType, StatementKind,
};

/// Multiplier used to fold every component into the key hash
const HASH_PRIME: u32 = 31;

#[inline]
fn combine(acc: u32, value: u32) -> u32 {
    acc.wrapping_mul(HASH_PRIME).wrapping_add(value)
}

/// Polynomial hash of a string over its UTF-16 code units, seeded with 0
#[inline]
fn text_hash(text: &str) -> u32 {
    text.encode_utf16().fold(0, |h, unit| combine(h, unit as u32))
}

/// Polynomial hash of an ordered sequence, seeded with 1
#[inline]
fn seq_hash(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(1, combine)
}

fn result_set_hash(
    result_type: ResultSetType,
    concurrency: ResultSetConcurrency,
    holdability: Option<ResultSetHoldability>,
) -> u32 {
    let h = combine(result_type.as_i32() as u32, concurrency.as_i32() as u32);
    match holdability {
        Some(holdability) => combine(h, holdability.as_i32() as u32),
        None => h,
    }
}

/// Creation options of a prepared statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedSignature {
    /// SQL text only
    Sql,
    /// Auto-generated keys mode
    GeneratedKeys(GeneratedKeys),
    /// Columns whose generated values are returned, by 1-based index
    ColumnIndexes(Box<[i32]>),
    /// Columns whose generated values are returned, by name
    ColumnNames(Box<[CompactString]>),
    /// Result set type and concurrency
    ResultSet {
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    },
    /// Result set type, concurrency and holdability
    Holdable {
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    },
}

impl PreparedSignature {
    fn options_hash(&self) -> Option<u32> {
        match self {
            PreparedSignature::Sql => None,
            PreparedSignature::GeneratedKeys(mode) => Some(mode.as_i32() as u32),
            PreparedSignature::ColumnIndexes(indexes) => {
                Some(seq_hash(indexes.iter().map(|&i| i as u32)))
            }
            PreparedSignature::ColumnNames(names) => {
                Some(seq_hash(names.iter().map(|n| text_hash(n))))
            }
            PreparedSignature::ResultSet {
                result_type,
                concurrency,
            } => Some(result_set_hash(*result_type, *concurrency, None)),
            PreparedSignature::Holdable {
                result_type,
                concurrency,
                holdability,
            } => Some(result_set_hash(
                *result_type,
                *concurrency,
                Some(*holdability),
            )),
        }
    }
}

/// Creation options of a callable statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableSignature {
    /// SQL text only
    Sql,
    /// Result set type and concurrency
    ResultSet {
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    },
    /// Result set type, concurrency and holdability
    Holdable {
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    },
}

impl CallableSignature {
    fn options_hash(&self) -> Option<u32> {
        match *self {
            CallableSignature::Sql => None,
            CallableSignature::ResultSet {
                result_type,
                concurrency,
            } => Some(result_set_hash(result_type, concurrency, None)),
            CallableSignature::Holdable {
                result_type,
                concurrency,
                holdability,
            } => Some(result_set_hash(result_type, concurrency, Some(holdability))),
        }
    }
}

/// Statement family plus its creation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Prepared(PreparedSignature),
    Callable(CallableSignature),
}

impl Signature {
    /// Which statement family this signature belongs to
    pub fn kind(&self) -> StatementKind {
        match self {
            Signature::Prepared(_) => StatementKind::Prepared,
            Signature::Callable(_) => StatementKind::Callable,
        }
    }

    fn options_hash(&self) -> Option<u32> {
        match self {
            Signature::Prepared(sig) => sig.options_hash(),
            Signature::Callable(sig) => sig.options_hash(),
        }
    }
}

/// Identity of a cached statement: SQL text plus creation options
///
/// Keys are immutable. The hash is computed once at construction and
/// reused for every map probe.
#[derive(Debug, Clone)]
pub struct StatementKey {
    sql: CompactString,
    signature: Signature,
    hash: u32,
}

impl StatementKey {
    fn new(sql: CompactString, signature: Signature) -> Self {
        let sql_hash = text_hash(&sql);
        let hash = match signature.options_hash() {
            Some(options) => combine(options, sql_hash),
            None => sql_hash,
        };
        Self {
            sql,
            signature,
            hash,
        }
    }

    /// Key for a prepared statement created from SQL text alone
    pub fn prepared(sql: impl Into<CompactString>) -> Self {
        Self::new(sql.into(), Signature::Prepared(PreparedSignature::Sql))
    }

    /// Key for a prepared statement created with an auto-generated keys mode
    pub fn prepared_with_generated_keys(sql: impl Into<CompactString>, mode: GeneratedKeys) -> Self {
        Self::new(
            sql.into(),
            Signature::Prepared(PreparedSignature::GeneratedKeys(mode)),
        )
    }

    /// Key for a prepared statement returning generated values by column index
    pub fn prepared_with_column_indexes(
        sql: impl Into<CompactString>,
        column_indexes: impl Into<Box<[i32]>>,
    ) -> Self {
        Self::new(
            sql.into(),
            Signature::Prepared(PreparedSignature::ColumnIndexes(column_indexes.into())),
        )
    }

    /// Key for a prepared statement returning generated values by column name
    pub fn prepared_with_column_names<I>(sql: impl Into<CompactString>, column_names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names: Box<[CompactString]> = column_names
            .into_iter()
            .map(|name| CompactString::new(name.as_ref()))
            .collect();
        Self::new(
            sql.into(),
            Signature::Prepared(PreparedSignature::ColumnNames(names)),
        )
    }

    /// Key for a prepared statement with result set type and concurrency
    pub fn prepared_with_result_set(
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    ) -> Self {
        Self::new(
            sql.into(),
            Signature::Prepared(PreparedSignature::ResultSet {
                result_type,
                concurrency,
            }),
        )
    }

    /// Key for a prepared statement with result set type, concurrency and holdability
    pub fn prepared_with_holdability(
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    ) -> Self {
        Self::new(
            sql.into(),
            Signature::Prepared(PreparedSignature::Holdable {
                result_type,
                concurrency,
                holdability,
            }),
        )
    }

    /// Key for a callable statement created from SQL text alone
    pub fn callable(sql: impl Into<CompactString>) -> Self {
        Self::new(sql.into(), Signature::Callable(CallableSignature::Sql))
    }

    /// Key for a callable statement with result set type and concurrency
    pub fn callable_with_result_set(
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
    ) -> Self {
        Self::new(
            sql.into(),
            Signature::Callable(CallableSignature::ResultSet {
                result_type,
                concurrency,
            }),
        )
    }

    /// Key for a callable statement with result set type, concurrency and holdability
    pub fn callable_with_holdability(
        sql: impl Into<CompactString>,
        result_type: ResultSetType,
        concurrency: ResultSetConcurrency,
        holdability: ResultSetHoldability,
    ) -> Self {
        Self::new(
            sql.into(),
            Signature::Callable(CallableSignature::Holdable {
                result_type,
                concurrency,
                holdability,
            }),
        )
    }

    /// The SQL text
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The creation options
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Prepared or callable
    #[inline]
    pub fn kind(&self) -> StatementKind {
        self.signature.kind()
    }

    /// The hash computed at construction
    #[inline]
    pub fn hash_code(&self) -> u32 {
        self.hash
    }
}

impl PartialEq for StatementKey {
    fn eq(&self, other: &Self) -> bool {
        // Signature before text: shape mismatches reject without touching the SQL
        self.hash == other.hash && self.signature == other.signature && self.sql == other.sql
    }
}

impl Eq for StatementKey {}

impl Hash for StatementKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

impl fmt::Display for StatementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}
