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

//! Statement handles and their release

use crate::core::Result;

/// An open driver statement that can be cached
///
/// The cache owns every handle stored in it and closes it exactly once,
/// when the entry is evicted or the cache is cleared.
pub trait StatementHandle {
    /// Close the statement and free its driver-side resources
    fn close(&mut self) -> Result<()>;
}

impl<T: StatementHandle + ?Sized> StatementHandle for Box<T> {
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Close a handle, swallowing any failure
///
/// Consumes the handle so it cannot be released twice. A failed close is
/// logged and otherwise ignored; the statement is gone from the cache
/// either way.
pub(crate) fn release<H: StatementHandle>(mut handle: H) {
    if let Err(err) = handle.close() {
        tracing::warn!(error = %err, "failed to release cached statement");
    }
}
