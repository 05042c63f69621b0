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

//! Reward redemption.
//!
//! A redemption debits the reward cost from an employee and takes one unit
//! out of the reward's inventory. Both rows change together or not at all.
//!
//! # Algorithm
//!
//! 1. Resolve the employee, then the reward ([`LedgerError::NotFound`]).
//! 2. On snapshots, check availability ([`LedgerError::RewardUnavailable`])
//!    and then solvency ([`LedgerError::InsufficientBalance`]).
//! 3. Lock the employee row, then the reward row, each bounded by the
//!    commit deadline ([`LedgerError::Timeout`]).
//! 4. Re-check both under the locks. A concurrent writer may have changed
//!    them since step 2, which surfaces as [`LedgerError::Conflict`].
//! 5. Apply both mutations to working copies, record the redemption and
//!    write the copies back.
//!
//! Locks are always taken employee first, and no path locks an employee
//! while holding a reward, so concurrent redemptions cannot deadlock.

use crate::base::{EmployeeId, RedemptionId, RewardId};
use crate::employee::Employee;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::reward::Reward;
use crate::row::Row;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Audit record of one committed redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub id: RedemptionId,
    pub employee_id: EmployeeId,
    pub reward_id: RewardId,
    /// Points charged, i.e. the reward cost at commit time.
    pub cost: u64,
    pub redeemed_at: DateTime<Utc>,
}

/// Outcome of a successful [`Ledger::redeem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionResult {
    pub redemption: Redemption,
    /// Employee balance after the debit.
    pub rewards_balance: u64,
    /// Reward inventory after the claim.
    pub inventory: u32,
    pub purchase_count: u64,
}

/// Availability first, then solvency.
fn check_redeemable(employee: &Employee, reward: &Reward) -> Result<(), LedgerError> {
    if !reward.is_available() {
        return Err(LedgerError::RewardUnavailable);
    }
    if !employee.is_solvent_for(reward.cost()) {
        return Err(LedgerError::InsufficientBalance);
    }
    Ok(())
}

impl Ledger {
    /// Spends an employee's points on one unit of a reward.
    ///
    /// # Errors
    ///
    /// Terminal:
    /// - [`LedgerError::NotFound`] - Unknown employee or reward.
    /// - [`LedgerError::RewardUnavailable`] - Deactivated or out of stock.
    /// - [`LedgerError::InsufficientBalance`] - Balance below the reward cost.
    ///
    /// Transient, the caller may retry:
    /// - [`LedgerError::Conflict`] - A concurrent write invalidated the checks.
    /// - [`LedgerError::Timeout`] - Row locks not acquired within the commit timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use rewards_ledger::{Ledger, LedgerError};
    ///
    /// let ledger = Ledger::new();
    /// let employee = ledger.create_employee("Cesar", "Mejia", 100).unwrap();
    /// let reward = ledger.create_reward("Cool Reward", Some(50), 1).unwrap();
    ///
    /// let result = ledger.redeem(employee.id(), reward.id()).unwrap();
    /// assert_eq!(result.rewards_balance, 50);
    /// assert_eq!(result.inventory, 0);
    ///
    /// let again = ledger.redeem(employee.id(), reward.id());
    /// assert_eq!(again, Err(LedgerError::RewardUnavailable));
    /// ```
    #[instrument(level = "debug", skip_all, fields(employee_id = %employee_id, reward_id = %reward_id))]
    pub fn redeem(
        &self,
        employee_id: EmployeeId,
        reward_id: RewardId,
    ) -> Result<RedemptionResult, LedgerError> {
        let deadline = self.deadline();
        let employee_row = self.employee_row(employee_id)?;
        let reward_row = self.reward_row(reward_id)?;

        let employee = employee_row.snapshot_until(deadline)?;
        let reward = reward_row.snapshot_until(deadline)?;
        if let Err(e) = check_redeemable(&employee, &reward) {
            debug!(error = %e, "redemption rejected");
            return Err(e);
        }

        match self.commit(&employee_row, &reward_row, deadline) {
            Ok(result) => {
                info!(
                    redemption_id = %result.redemption.id,
                    cost = result.redemption.cost,
                    balance = result.rewards_balance,
                    inventory = result.inventory,
                    "reward redeemed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "redemption commit failed");
                Err(e)
            }
        }
    }

    /// Locks both rows, re-validates and applies the redemption.
    pub(crate) fn commit(
        &self,
        employee_row: &Row<Employee>,
        reward_row: &Row<Reward>,
        deadline: Instant,
    ) -> Result<RedemptionResult, LedgerError> {
        let mut employee = employee_row.lock_until(deadline)?;
        let mut reward = reward_row.lock_until(deadline)?;

        check_redeemable(&employee, &reward).map_err(|_| LedgerError::Conflict)?;

        let mut next_employee = employee.clone();
        let mut next_reward = reward.clone();
        let cost = next_reward.cost();
        let inventory = next_reward.claim_unit()?;
        let rewards_balance = next_employee.debit(cost)?;

        let redemption = Redemption {
            id: self.next_redemption_id(),
            employee_id: next_employee.id(),
            reward_id: next_reward.id(),
            cost,
            redeemed_at: Utc::now(),
        };
        // IDs come from a private counter and the log is only written here.
        let recorded = self.redemptions.push(redemption.clone());
        debug_assert!(recorded, "redemption ID {} already logged", redemption.id);

        let purchase_count = next_reward.purchase_count();
        *employee = next_employee;
        *reward = next_reward;

        Ok(RedemptionResult {
            redemption,
            rewards_balance,
            inventory,
            purchase_count,
        })
    }
}
