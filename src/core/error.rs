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

//! Error types for the statement cache
//!
//! This module defines all error types used by the cache, its configuration
//! and the caching connection wrapper.

use thiserror::Error;

/// Result type alias for statement cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for statement cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Cache errors
    // =========================================================================
    /// Capacity must hold at least one statement
    #[error("invalid statement cache capacity {0}, must be at least 1")]
    InvalidCapacity(usize),

    /// A statement is already cached under this signature
    #[error("statement already cached for '{0}'")]
    DuplicateKey(String),

    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// A configuration parameter could not be parsed
    #[error("invalid value '{value}' for config parameter '{key}'")]
    InvalidConfig { key: String, value: String },

    // =========================================================================
    // Connection errors
    // =========================================================================
    /// The owning connection has been closed
    #[error("connection closed")]
    ConnectionClosed,

    /// The statement source failed to prepare a statement
    #[error("failed to prepare statement: {0}")]
    Prepare(String),

    /// Closing a statement handle failed
    #[error("failed to close statement: {0}")]
    StatementClose(String),
}

impl Error {
    /// Create a new InvalidConfig error
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a new Prepare error
    pub fn prepare(message: impl Into<String>) -> Self {
        Error::Prepare(message.into())
    }

    /// Create a new StatementClose error
    pub fn statement_close(message: impl Into<String>) -> Self {
        Error::StatementClose(message.into())
    }

    /// Check if this error comes from invalid configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidCapacity(_) | Error::InvalidConfig { .. })
    }
}
