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

//! Statement cache statistics

/// Counters kept by a statement cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a cached statement
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Statements stored
    pub insertions: u64,
    /// Statements dropped to make room
    pub evictions: u64,
    /// Handles closed by the cache (evictions, clears and rejected inserts)
    pub releases: u64,
    /// Inserts refused because the key was already cached
    pub rejected: u64,
}

impl CacheStats {
    /// Total number of lookups (hits + misses)
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate as a fraction in [0.0, 1.0], 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
