// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`Ledger`](crate::Ledger).
///
/// # Example
///
/// ```
/// use rewards_ledger::{Ledger, LedgerConfig};
/// use std::time::Duration;
///
/// let config = LedgerConfig::default().with_commit_timeout(Duration::from_millis(50));
/// let ledger = Ledger::with_config(config);
/// assert_eq!(ledger.config().commit_timeout, Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Upper bound on waiting for row locks in any mutating operation.
    /// Exceeding it fails the operation with [`LedgerError::Timeout`](crate::LedgerError::Timeout).
    pub commit_timeout: Duration,
}

impl LedgerConfig {
    pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_millis(250);

    pub fn with_commit_timeout(mut self, commit_timeout: Duration) -> Self {
        self.commit_timeout = commit_timeout;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            commit_timeout: Self::DEFAULT_COMMIT_TIMEOUT,
        }
    }
}
