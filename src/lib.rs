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

//! # Rewards Ledger
//!
//! This library tracks employee points balances and reward inventory, and
//! redeems rewards against balances without ever letting either go negative.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Storage handle owning the employee and reward tables
//! - [`Employee`]: Employee record with a points balance
//! - [`Reward`]: Reward record with cost, inventory and activation state
//! - [`RedemptionResult`]: Outcome of [`Ledger::redeem`]
//! - [`LedgerError`]: Error types for ledger operations
//!
//! ## Example
//!
//! ```
//! use rewards_ledger::{Ledger, LedgerError};
//!
//! let ledger = Ledger::new();
//! let employee = ledger.create_employee("Cesar", "Mejia", 40).unwrap();
//! let reward = ledger.create_reward("Cool Reward", Some(50), 10).unwrap();
//!
//! // Not enough points yet
//! let result = ledger.redeem(employee.id(), reward.id());
//! assert_eq!(result, Err(LedgerError::InsufficientBalance));
//!
//! ledger.grant(employee.id(), 10).unwrap();
//! let result = ledger.redeem(employee.id(), reward.id()).unwrap();
//! assert_eq!(result.rewards_balance, 0);
//! assert_eq!(result.inventory, 9);
//! ```
//!
//! ## Thread Safety
//!
//! Each employee and reward row is locked individually. Redemptions touching
//! disjoint employee/reward pairs proceed in parallel; redemptions sharing a
//! row are serialized on it.

mod base;
pub mod config;
pub mod employee;
pub mod error;
mod ledger;
pub mod redemption;
pub mod redemption_log;
pub mod reward;
mod row;

pub use base::{EmployeeId, RedemptionId, RewardId};
pub use config::LedgerConfig;
pub use employee::{Employee, NewEmployee};
pub use error::{Entity, LedgerError, ValidationError, ValidationErrors, ValidationKind};
pub use ledger::Ledger;
pub use redemption::{Redemption, RedemptionResult};
pub use redemption_log::RedemptionLog;
pub use reward::{NewReward, Reward};
