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

//! The rewards ledger: employee and reward tables plus the operations
//! collaborators call into.
//!
//! # Operations
//!
//! - **Create**: validate and insert employees and rewards with fresh IDs.
//! - **Query**: active rewards and zero-balance employees, in creation order.
//! - **Admin**: restock, deactivate and activate rewards; grant points.
//! - **Redeem**: see [`Ledger::redeem`].
//!
//! # Thread Safety
//!
//! Tables are [`DashMap`]s of individually locked rows. Operations touching
//! disjoint rows run fully in parallel; a row lock is never awaited past
//! [`LedgerConfig::commit_timeout`].

use crate::base::{EmployeeId, RedemptionId, RewardId};
use crate::config::LedgerConfig;
use crate::employee::{Employee, NewEmployee};
use crate::error::{Entity, LedgerError};
use crate::redemption::Redemption;
use crate::redemption_log::RedemptionLog;
use crate::reward::{NewReward, Reward};
use crate::row::Row;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// In-memory store of employees and rewards.
///
/// # Invariants
///
/// - Every balance and inventory count is non-negative.
/// - IDs are assigned in creation order, so ascending ID is creation order.
/// - Records are never removed.
pub struct Ledger {
    pub(crate) employees: DashMap<EmployeeId, Arc<Row<Employee>>>,
    pub(crate) rewards: DashMap<RewardId, Arc<Row<Reward>>>,
    /// Audit log of committed redemptions.
    pub(crate) redemptions: RedemptionLog,
    next_employee_id: AtomicU32,
    next_reward_id: AtomicU32,
    next_redemption_id: AtomicU64,
    config: LedgerConfig,
}

impl Ledger {
    /// Creates an empty ledger with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Ledger {
            employees: DashMap::new(),
            rewards: DashMap::new(),
            redemptions: RedemptionLog::new(),
            next_employee_id: AtomicU32::new(1),
            next_reward_id: AtomicU32::new(1),
            next_redemption_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Provisions an employee.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if either name is blank.
    pub fn create_employee(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        initial_balance: u64,
    ) -> Result<Employee, LedgerError> {
        let attrs = NewEmployee::new(first_name, last_name, initial_balance);
        // Rejected input never takes an ID, so IDs stay gapless.
        let employee = Employee::create(attrs, || {
            EmployeeId(self.next_employee_id.fetch_add(1, Ordering::Relaxed))
        })?;
        let id = employee.id();
        self.employees
            .insert(id, Arc::new(Row::new(employee.clone())));

        debug!(employee_id = %id, balance = initial_balance, "employee created");
        Ok(employee)
    }

    /// Creates an active reward.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] for a blank name or a missing or zero cost.
    pub fn create_reward(
        &self,
        name: impl Into<String>,
        cost: Option<u64>,
        initial_inventory: u32,
    ) -> Result<Reward, LedgerError> {
        let attrs = NewReward::new(name, cost, initial_inventory);
        let reward = Reward::create(attrs, || {
            RewardId(self.next_reward_id.fetch_add(1, Ordering::Relaxed))
        })?;
        let id = reward.id();
        self.rewards.insert(id, Arc::new(Row::new(reward.clone())));

        debug!(reward_id = %id, cost = reward.cost(), inventory = initial_inventory, "reward created");
        Ok(reward)
    }

    /// Snapshot of one employee.
    pub fn employee(&self, employee_id: EmployeeId) -> Option<Employee> {
        self.employee_row(employee_id).ok().map(|row| row.snapshot())
    }

    /// Snapshot of one reward.
    pub fn reward(&self, reward_id: RewardId) -> Option<Reward> {
        self.reward_row(reward_id).ok().map(|row| row.snapshot())
    }

    /// Every employee, in creation order.
    pub fn employees(&self) -> Vec<Employee> {
        let mut employees: Vec<Employee> =
            self.employees.iter().map(|row| row.snapshot()).collect();
        employees.sort_by_key(Employee::id);
        employees
    }

    /// Every reward, in creation order.
    pub fn rewards(&self) -> Vec<Reward> {
        let mut rewards: Vec<Reward> = self.rewards.iter().map(|row| row.snapshot()).collect();
        rewards.sort_by_key(Reward::id);
        rewards
    }

    /// Rewards without a `deactivated_at` stamp, in creation order.
    ///
    /// Sold-out rewards are still active and are included.
    pub fn list_active_rewards(&self) -> Vec<Reward> {
        let mut rewards = self.rewards();
        rewards.retain(Reward::is_active);
        rewards
    }

    /// Employees whose balance is exactly zero, in creation order.
    pub fn list_zero_balance_employees(&self) -> Vec<Employee> {
        let mut employees = self.employees();
        employees.retain(Employee::has_zero_balance);
        employees
    }

    /// Resets inventory to [`Reward::RESTOCK_QUANTITY`] and reactivates the reward.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - Unknown reward.
    /// - [`LedgerError::Timeout`] - Row stayed locked past the commit timeout.
    pub fn restock(&self, reward_id: RewardId) -> Result<Reward, LedgerError> {
        let reward = self.update_reward(reward_id, Reward::restock)?;
        info!(reward_id = %reward_id, inventory = reward.inventory(), "reward restocked");
        Ok(reward)
    }

    /// Takes the reward out of circulation; inventory is kept.
    pub fn deactivate_reward(&self, reward_id: RewardId) -> Result<Reward, LedgerError> {
        let reward = self.update_reward(reward_id, Reward::deactivate)?;
        info!(reward_id = %reward_id, "reward deactivated");
        Ok(reward)
    }

    pub fn activate_reward(&self, reward_id: RewardId) -> Result<Reward, LedgerError> {
        let reward = self.update_reward(reward_id, Reward::activate)?;
        info!(reward_id = %reward_id, "reward activated");
        Ok(reward)
    }

    /// Credits points to an employee.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - Unknown employee.
    /// - [`LedgerError::InvalidAmount`] - Zero amount, or the balance would overflow.
    /// - [`LedgerError::Timeout`] - Row stayed locked past the commit timeout.
    pub fn grant(&self, employee_id: EmployeeId, amount: u64) -> Result<Employee, LedgerError> {
        let row = self.employee_row(employee_id)?;
        let mut employee = row.lock_until(self.deadline())?;
        let balance = employee.credit(amount)?;

        info!(employee_id = %employee_id, amount, balance, "points granted");
        Ok(employee.clone())
    }

    /// Audit log of committed redemptions.
    pub fn redemptions(&self) -> &RedemptionLog {
        &self.redemptions
    }

    /// Redemptions by one employee, oldest first.
    pub fn redemptions_for(&self, employee_id: EmployeeId) -> Vec<Redemption> {
        self.redemptions.for_employee(employee_id)
    }

    /// Redemptions committed since the previous drain, in commit order.
    pub fn drain_redemptions(&self) -> Vec<Redemption> {
        self.redemptions.drain()
    }

    /// Looks up a row, releasing the table shard before returning.
    pub(crate) fn employee_row(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Arc<Row<Employee>>, LedgerError> {
        self.employees
            .get(&employee_id)
            .map(|row| Arc::clone(row.value()))
            .ok_or(LedgerError::NotFound(Entity::Employee))
    }

    pub(crate) fn reward_row(&self, reward_id: RewardId) -> Result<Arc<Row<Reward>>, LedgerError> {
        self.rewards
            .get(&reward_id)
            .map(|row| Arc::clone(row.value()))
            .ok_or(LedgerError::NotFound(Entity::Reward))
    }

    pub(crate) fn next_redemption_id(&self) -> RedemptionId {
        RedemptionId(self.next_redemption_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn deadline(&self) -> Instant {
        Instant::now() + self.config.commit_timeout
    }

    fn update_reward(
        &self,
        reward_id: RewardId,
        update: impl FnOnce(&mut Reward),
    ) -> Result<Reward, LedgerError> {
        let row = self.reward_row(reward_id)?;
        let mut reward = row.lock_until(self.deadline())?;
        update(&mut *reward);
        Ok(reward.clone())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_creation_order() {
        let ledger = Ledger::new();
        let a = ledger.create_employee("Cesar", "Mejia", 0).unwrap();
        let b = ledger.create_employee("Luis", "Martinez", 0).unwrap();
        assert_eq!(a.id(), EmployeeId(1));
        assert_eq!(b.id(), EmployeeId(2));
    }

    #[test]
    fn rejected_create_does_not_consume_id() {
        let ledger = Ledger::new();
        assert!(ledger.create_reward("", Some(10), 1).is_err());
        let reward = ledger.create_reward("Mug", Some(10), 1).unwrap();
        assert_eq!(reward.id(), RewardId(1));
    }

    #[test]
    fn rejected_employee_does_not_consume_id() {
        let ledger = Ledger::new();
        assert!(ledger.create_employee("Cesar", " ", 1).is_err());
        let employee = ledger.create_employee("Cesar", "Mejia", 1).unwrap();
        assert_eq!(employee.id(), EmployeeId(1));
    }

    #[test]
    fn restock_times_out_on_locked_row() {
        let ledger = Ledger::with_config(
            LedgerConfig::default().with_commit_timeout(std::time::Duration::from_millis(10)),
        );
        let reward = ledger.create_reward("Mug", Some(10), 0).unwrap();

        let row = ledger.reward_row(reward.id()).unwrap();
        let guard = row.lock_until(ledger.deadline()).unwrap();
        assert_eq!(ledger.restock(reward.id()), Err(LedgerError::Timeout));
        drop(guard);

        assert_eq!(ledger.reward(reward.id()).unwrap().inventory(), 0);
    }

    #[test]
    fn grant_unknown_employee() {
        let ledger = Ledger::new();
        assert_eq!(
            ledger.grant(EmployeeId(9), 10).err(),
            Some(LedgerError::NotFound(Entity::Employee))
        );
    }
}
