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

//! Statement creation options
//!
//! The integer codes are the driver-level constants and feed the
//! statement key hash, so they must stay stable.

use std::fmt;

/// Which family of statement a key describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Plain prepared statement
    Prepared,
    /// Stored procedure call
    Callable,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Prepared => write!(f, "PREPARED"),
            StatementKind::Callable => write!(f, "CALLABLE"),
        }
    }
}

/// Whether auto-generated keys are made available after execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GeneratedKeys {
    /// Generated keys can be retrieved
    Return = 1,
    /// Generated keys are not retrieved
    NoReturn = 2,
}

impl GeneratedKeys {
    /// Returns the driver constant
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Create GeneratedKeys from the driver constant
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(GeneratedKeys::Return),
            2 => Some(GeneratedKeys::NoReturn),
            _ => None,
        }
    }
}

/// Cursor movement allowed on a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ResultSetType {
    /// Cursor only moves forward
    #[default]
    ForwardOnly = 1003,
    /// Scrollable, not sensitive to concurrent changes
    ScrollInsensitive = 1004,
    /// Scrollable and sensitive to concurrent changes
    ScrollSensitive = 1005,
}

impl ResultSetType {
    /// Returns the driver constant
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Create ResultSetType from the driver constant
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1003 => Some(ResultSetType::ForwardOnly),
            1004 => Some(ResultSetType::ScrollInsensitive),
            1005 => Some(ResultSetType::ScrollSensitive),
            _ => None,
        }
    }
}

impl fmt::Display for ResultSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSetType::ForwardOnly => write!(f, "FORWARD ONLY"),
            ResultSetType::ScrollInsensitive => write!(f, "SCROLL INSENSITIVE"),
            ResultSetType::ScrollSensitive => write!(f, "SCROLL SENSITIVE"),
        }
    }
}

/// Whether a result set can be updated through its cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ResultSetConcurrency {
    #[default]
    ReadOnly = 1007,
    Updatable = 1008,
}

impl ResultSetConcurrency {
    /// Returns the driver constant
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Create ResultSetConcurrency from the driver constant
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1007 => Some(ResultSetConcurrency::ReadOnly),
            1008 => Some(ResultSetConcurrency::Updatable),
            _ => None,
        }
    }
}

impl fmt::Display for ResultSetConcurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSetConcurrency::ReadOnly => write!(f, "READ ONLY"),
            ResultSetConcurrency::Updatable => write!(f, "UPDATABLE"),
        }
    }
}

/// What happens to open cursors when a transaction commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultSetHoldability {
    /// Cursors stay open across commit
    HoldCursorsOverCommit = 1,
    /// Cursors are closed by commit
    CloseCursorsAtCommit = 2,
}

impl ResultSetHoldability {
    /// Returns the driver constant
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Create ResultSetHoldability from the driver constant
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(ResultSetHoldability::HoldCursorsOverCommit),
            2 => Some(ResultSetHoldability::CloseCursorsAtCommit),
            _ => None,
        }
    }
}

impl fmt::Display for ResultSetHoldability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSetHoldability::HoldCursorsOverCommit => write!(f, "HOLD CURSORS OVER COMMIT"),
            ResultSetHoldability::CloseCursorsAtCommit => write!(f, "CLOSE CURSORS AT COMMIT"),
        }
    }
}
