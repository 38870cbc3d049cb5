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

//! Per-connection statement cache
//!
//! - [`key`] - Statement creation signatures used as cache keys
//! - [`lru`] - Bounded LRU store that releases what it evicts
//! - [`handle`] - The statement handle trait
//! - [`stats`] - Hit/miss/eviction counters

pub mod handle;
pub mod key;
pub mod lru;
pub mod stats;

pub use handle::StatementHandle;
pub use key::{CallableSignature, PreparedSignature, Signature, StatementKey};
pub use lru::{BoundedLruCache, StatementCache};
pub use stats::CacheStats;
