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

//! Statement cache configuration
//!

use super::error::{Error, Result};

/// Default number of statements cached per connection
pub const DEFAULT_STATEMENT_CACHE_SIZE: usize = 20;

/// Configuration for a per-connection statement cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementCacheConfig {
    /// Maximum number of open statements kept per connection
    /// Default: 20
    pub capacity: usize,
}

impl Default for StatementCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STATEMENT_CACHE_SIZE,
        }
    }
}

impl StatementCacheConfig {
    /// Creates a new StatementCacheConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check that the configuration can back a cache
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidCapacity(self.capacity));
        }
        Ok(())
    }

    /// Parse configuration from DSN-style query parameters
    ///
    /// Accepts `&`-separated `key=value` pairs, e.g.
    /// `statement_cache_size=64`. Unknown keys are ignored so the same
    /// query string can carry settings for other layers.
    pub fn from_query(query: &str) -> Result<Self> {
        let mut config = Self::default();

        for param in query.split('&').filter(|p| !p.is_empty()) {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");

            match key {
                // Cache size in statements: statement_cache_size=20
                "statement_cache_size" | "stmt_cache_size" => {
                    config.capacity = value
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| Error::invalid_config(key, value))?;
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }
}
