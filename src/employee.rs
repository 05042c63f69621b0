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

//! Employee records.
//!
//! An employee holds a points balance that only ever moves through
//! [`Ledger::grant`](crate::Ledger::grant) (credit) and
//! [`Ledger::redeem`](crate::Ledger::redeem) (debit).
//!
//! # Example
//!
//! ```
//! use rewards_ledger::{Employee, EmployeeId, NewEmployee};
//!
//! let employee = Employee::new(EmployeeId(1), NewEmployee::new("Cesar", "Mejia", 100)).unwrap();
//! assert_eq!(employee.full_name(), "Cesar Mejia");
//! assert!(employee.is_solvent_for(90));
//! assert!(!employee.is_solvent_for(110));
//! ```

use crate::base::EmployeeId;
use crate::error::{LedgerError, ValidationError, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes supplied when provisioning an employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub rewards_balance: u64,
}

impl NewEmployee {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        rewards_balance: u64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            rewards_balance,
        }
    }

    /// Returns one error per blank name field.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(ValidationError::blank("first_name"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(ValidationError::blank("last_name"));
        }
        errors
    }
}

/// Employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: EmployeeId,
    first_name: String,
    last_name: String,
    rewards_balance: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Employee {
    /// Validates `attrs` and builds the record.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] naming every blank field.
    pub fn new(id: EmployeeId, attrs: NewEmployee) -> Result<Self, LedgerError> {
        Self::create(attrs, || id)
    }

    /// Like [`Employee::new`], but only asks for an ID once `attrs` is valid.
    pub(crate) fn create(
        attrs: NewEmployee,
        allocate_id: impl FnOnce() -> EmployeeId,
    ) -> Result<Self, LedgerError> {
        ValidationErrors::check(attrs.validate())?;
        let id = allocate_id();
        let now = Utc::now();
        Ok(Self {
            id,
            first_name: attrs.first_name,
            last_name: attrs.last_name,
            rewards_balance: attrs.rewards_balance,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn rewards_balance(&self) -> u64 {
        self.rewards_balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// First and last name joined by a single space, as stored.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns `rewards_balance >= cost`.
    pub fn is_solvent_for(&self, cost: u64) -> bool {
        self.rewards_balance >= cost
    }

    pub fn has_zero_balance(&self) -> bool {
        self.rewards_balance == 0
    }

    /// Increases the balance.
    pub(crate) fn credit(&mut self, amount: u64) -> Result<u64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        self.rewards_balance = self
            .rewards_balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        self.updated_at = Utc::now();
        Ok(self.rewards_balance)
    }

    /// Decreases the balance by `cost`.
    pub(crate) fn debit(&mut self, cost: u64) -> Result<u64, LedgerError> {
        if !self.is_solvent_for(cost) {
            return Err(LedgerError::InsufficientBalance);
        }
        self.rewards_balance -= cost;
        self.updated_at = Utc::now();
        Ok(self.rewards_balance)
    }
}
