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

//! Thread-safe redemption audit log with deduplication.
//!
//! Keeps every committed redemption for lookup, plus an outbox that hands
//! redemptions to a downstream consumer in commit order. Only the ledger's
//! commit path writes to it; callers get read access through
//! [`Ledger::redemptions`](crate::Ledger::redemptions).

use crate::base::{EmployeeId, RedemptionId};
use crate::redemption::Redemption;
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// A thread-safe redemption log with duplicate detection.
///
/// Combines a [`DashMap`] for O(1) lookups with a [`SegQueue`] outbox
/// preserving insertion order.
///
/// Records cannot be added from outside the crate:
///
/// ```compile_fail
/// use rewards_ledger::{EmployeeId, Ledger, Redemption, RedemptionId, RewardId};
///
/// let ledger = Ledger::new();
/// ledger.redemptions().push(Redemption {
///     id: RedemptionId(1),
///     employee_id: EmployeeId(1),
///     reward_id: RewardId(1),
///     cost: 999,
///     redeemed_at: chrono::Utc::now(),
/// });
/// ```
#[derive(Debug, Default)]
pub struct RedemptionLog {
    /// Every redemption ever recorded.
    redemptions: DashMap<RedemptionId, Redemption>,

    /// Redemption IDs not yet drained, in FIFO order.
    outbox: SegQueue<RedemptionId>,
}

impl RedemptionLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a committed redemption.
    ///
    /// Returns `false`, leaving the log unchanged, if a redemption with the
    /// same ID was already recorded.
    pub(crate) fn push(&self, redemption: Redemption) -> bool {
        let redemption_id = redemption.id;

        // Entry API keeps check-and-insert atomic
        match self.redemptions.entry(redemption_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(redemption);
                self.outbox.push(redemption_id);
                true
            }
        }
    }

    pub fn get(&self, redemption_id: RedemptionId) -> Option<Redemption> {
        self.redemptions.get(&redemption_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.redemptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redemptions.is_empty()
    }

    /// All redemptions by one employee, oldest first.
    pub fn for_employee(&self, employee_id: EmployeeId) -> Vec<Redemption> {
        let mut redemptions: Vec<Redemption> = self
            .redemptions
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .map(|r| r.value().clone())
            .collect();
        redemptions.sort_by_key(|r| r.id);
        redemptions
    }

    /// Pops every redemption pushed since the last drain, in push order.
    ///
    /// Drained redemptions stay available through [`Self::get`].
    pub fn drain(&self) -> Vec<Redemption> {
        let mut drained = Vec::with_capacity(self.outbox.len());
        while let Some(redemption_id) = self.outbox.pop() {
            if let Some(redemption) = self.get(redemption_id) {
                drained.push(redemption);
            }
        }
        drained
    }
}
