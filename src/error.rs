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

//! Error types for ledger operations.
//!
//! Every failure is returned to the caller as a [`LedgerError`]. Only
//! [`LedgerError::Conflict`] and [`LedgerError::Timeout`] are transient; all
//! other variants are terminal for the attempt that produced them.

use std::fmt;
use thiserror::Error;

/// Record kind named by [`LedgerError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Employee,
    Reward,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Employee => f.write_str("employee"),
            Entity::Reward => f.write_str("reward"),
        }
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Missing, or only whitespace.
    Blank,
    /// Zero where a positive value is required.
    NotPositive,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn blank(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationKind::Blank,
        }
    }

    pub fn not_positive(field: &'static str) -> Self {
        Self {
            field,
            kind: ValidationKind::NotPositive,
        }
    }
}

impl fmt::Display for ValidationError {
    /// Renders as `"First name can't be blank"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.field.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}", first.to_ascii_uppercase())?;
        }
        for c in chars {
            write!(f, "{}", if c == '_' { ' ' } else { c })?;
        }
        match self.kind {
            ValidationKind::Blank => f.write_str(" can't be blank"),
            ValidationKind::NotPositive => f.write_str(" must be greater than 0"),
        }
    }
}

/// All validation failures found on one record, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Returns `Ok(())` when `errors` is empty.
    pub fn check(errors: Vec<ValidationError>) -> Result<(), LedgerError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(ValidationErrors(errors)))
        }
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Human readable messages, one per failure.
    pub fn full_messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// One or more fields failed validation on create
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Identifier did not resolve to a record
    #[error("{0} not found")]
    NotFound(Entity),

    /// Reward is deactivated or out of stock
    #[error("reward is unavailable")]
    RewardUnavailable,

    /// Balance does not cover the reward cost
    #[error("insufficient rewards balance")]
    InsufficientBalance,

    /// Amount is zero or would overflow the balance
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Records changed between the availability check and the commit
    #[error("concurrent update conflict, retry the redemption")]
    Conflict,

    /// Row locks could not be acquired within the commit timeout
    #[error("commit timed out")]
    Timeout,
}

impl LedgerError {
    /// Whether retrying the same call may succeed without any other change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict | LedgerError::Timeout)
    }
}
