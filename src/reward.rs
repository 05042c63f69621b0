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

//! Reward records.
//!
//! A reward is available while it is active (no `deactivated_at` stamp) and
//! has inventory left:
//!
//! ```text
//!               deactivate                 claim_unit (inventory 1 -> 0)
//!   Active  ◄───────────────►  Deactivated     Active ──────────► Sold out
//!     ▲          activate           │            ▲                   │
//!     └──────────── restock ────────┘            └───── restock ─────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rewards_ledger::{NewReward, Reward, RewardId};
//!
//! let mut reward = Reward::new(RewardId(1), NewReward::new("Cool Reward", Some(50), 0)).unwrap();
//! assert!(!reward.is_available());
//!
//! reward.restock();
//! assert_eq!(reward.inventory(), 25);
//! assert!(reward.is_available());
//! ```

use crate::base::RewardId;
use crate::error::{LedgerError, ValidationError, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes supplied when creating a reward.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReward {
    pub name: String,
    /// `None` models a cost that was never supplied.
    pub cost: Option<u64>,
    #[serde(default)]
    pub inventory: u32,
}

impl NewReward {
    pub fn new(name: impl Into<String>, cost: Option<u64>, inventory: u32) -> Self {
        Self {
            name: name.into(),
            cost,
            inventory,
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError::blank("name"));
        }
        match self.cost {
            None => errors.push(ValidationError::blank("cost")),
            Some(0) => errors.push(ValidationError::not_positive("cost")),
            Some(_) => {}
        }
        errors
    }
}

/// Reward record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reward {
    id: RewardId,
    name: String,
    cost: u64,
    inventory: u32,
    purchase_count: u64,
    deactivated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Reward {
    /// Inventory level set by [`Reward::restock`].
    pub const RESTOCK_QUANTITY: u32 = 25;

    /// Validates `attrs` and builds an active reward.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] for a blank name, a missing cost or a zero cost.
    pub fn new(id: RewardId, attrs: NewReward) -> Result<Self, LedgerError> {
        Self::create(attrs, || id)
    }

    /// Like [`Reward::new`], but only asks for an ID once `attrs` is valid.
    pub(crate) fn create(
        attrs: NewReward,
        allocate_id: impl FnOnce() -> RewardId,
    ) -> Result<Self, LedgerError> {
        ValidationErrors::check(attrs.validate())?;
        let Some(cost) = attrs.cost else {
            return Err(LedgerError::Validation(ValidationErrors(vec![
                ValidationError::blank("cost"),
            ])));
        };
        let id = allocate_id();
        let now = Utc::now();
        Ok(Self {
            id,
            name: attrs.name,
            cost,
            inventory: attrs.inventory,
            purchase_count: 0,
            deactivated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> RewardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn inventory(&self) -> u32 {
        self.inventory
    }

    pub fn purchase_count(&self) -> u64 {
        self.purchase_count
    }

    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// Active and with at least one unit in stock.
    pub fn is_available(&self) -> bool {
        self.is_active() && self.inventory > 0
    }

    /// Sets inventory to [`Self::RESTOCK_QUANTITY`] and reactivates,
    /// whatever the current state.
    pub fn restock(&mut self) {
        self.inventory = Self::RESTOCK_QUANTITY;
        self.deactivated_at = None;
        self.updated_at = Utc::now();
    }

    /// Stamps `deactivated_at`. An existing stamp is kept.
    pub fn deactivate(&mut self) {
        if self.deactivated_at.is_none() {
            let now = Utc::now();
            self.deactivated_at = Some(now);
            self.updated_at = now;
        }
    }

    pub fn activate(&mut self) {
        if self.deactivated_at.take().is_some() {
            self.updated_at = Utc::now();
        }
    }

    /// Takes one unit out of stock for a purchase.
    pub(crate) fn claim_unit(&mut self) -> Result<u32, LedgerError> {
        if !self.is_available() {
            return Err(LedgerError::RewardUnavailable);
        }
        self.inventory -= 1;
        self.purchase_count += 1;
        self.updated_at = Utc::now();
        Ok(self.inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward(inventory: u32) -> Reward {
        Reward::new(RewardId(1), NewReward::new("Cool Reward", Some(50), inventory)).unwrap()
    }

    #[test]
    fn new_reward_starts_active_with_no_purchases() {
        let reward = reward(3);
        assert!(reward.is_active());
        assert_eq!(reward.purchase_count(), 0);
        assert_eq!(reward.created_at(), reward.updated_at());
    }

    #[test]
    fn create_skips_id_allocation_for_invalid_attrs() {
        let mut allocated = false;
        let result = Reward::create(NewReward::new("Mug", None, 1), || {
            allocated = true;
            RewardId(1)
        });
        assert!(result.is_err());
        assert!(!allocated);
    }

    #[test]
    fn zero_cost_is_rejected() {
        let result = Reward::new(RewardId(1), NewReward::new("Free", Some(0), 1));
        let Err(LedgerError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.full_messages(), vec!["Cost must be greater than 0"]);
    }

    #[test]
    fn claim_unit_decrements_inventory_and_counts_purchase() {
        let mut reward = reward(2);
        assert_eq!(reward.claim_unit(), Ok(1));
        assert_eq!(reward.claim_unit(), Ok(0));
        assert_eq!(reward.purchase_count(), 2);
        assert_eq!(reward.claim_unit(), Err(LedgerError::RewardUnavailable));
        assert_eq!(reward.inventory(), 0);
        assert_eq!(reward.purchase_count(), 2);
    }

    #[test]
    fn claim_unit_rejects_deactivated() {
        let mut reward = reward(5);
        reward.deactivate();
        assert_eq!(reward.claim_unit(), Err(LedgerError::RewardUnavailable));
        assert_eq!(reward.inventory(), 5);
    }

    #[test]
    fn deactivate_keeps_first_stamp() {
        let mut reward = reward(1);
        reward.deactivate();
        let stamp = reward.deactivated_at();
        reward.deactivate();
        assert_eq!(reward.deactivated_at(), stamp);
    }

    #[test]
    fn activate_clears_stamp() {
        let mut reward = reward(1);
        reward.deactivate();
        reward.activate();
        assert!(reward.is_available());
    }

    #[test]
    fn restock_keeps_purchase_count() {
        let mut reward = reward(1);
        reward.claim_unit().unwrap();
        reward.restock();
        assert_eq!(reward.inventory(), Reward::RESTOCK_QUANTITY);
        assert_eq!(reward.purchase_count(), 1);
    }
}
