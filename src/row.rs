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

//! Lock-guarded storage cell for a single record.

use crate::LedgerError;
use parking_lot::{Mutex, MutexGuard};
use std::time::Instant;

/// One row of a ledger table.
///
/// Readers take a cloned snapshot; writers hold the guard for the whole
/// read-modify-write and never wait past their deadline.
#[derive(Debug)]
pub(crate) struct Row<T> {
    inner: Mutex<T>,
}

impl<T: Clone> Row<T> {
    pub(crate) fn new(record: T) -> Self {
        Self {
            inner: Mutex::new(record),
        }
    }

    pub(crate) fn snapshot(&self) -> T {
        self.inner.lock().clone()
    }

    /// Clones the record, waiting for the lock no later than `deadline`.
    pub(crate) fn snapshot_until(&self, deadline: Instant) -> Result<T, LedgerError> {
        Ok(self.lock_until(deadline)?.clone())
    }

    /// Locks the row, giving up with [`LedgerError::Timeout`] at `deadline`.
    pub(crate) fn lock_until(&self, deadline: Instant) -> Result<MutexGuard<'_, T>, LedgerError> {
        self.inner
            .try_lock_until(deadline)
            .ok_or(LedgerError::Timeout)
    }
}
