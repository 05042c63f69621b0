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

//! Reward public API integration tests.

use rewards_ledger::{Entity, Ledger, LedgerError, NewReward, Reward, RewardId};

fn validation_messages(result: Result<Reward, LedgerError>) -> Vec<String> {
    match result {
        Err(LedgerError::Validation(errors)) => errors.full_messages(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Reward with the given stock, deactivated when asked.
fn reward_in_state(ledger: &Ledger, inventory: u32, deactivated: bool) -> Reward {
    let reward = ledger.create_reward("Cool Reward", Some(50), inventory).unwrap();
    if deactivated {
        ledger.deactivate_reward(reward.id()).unwrap()
    } else {
        reward
    }
}

// === Validations ===

#[test]
fn is_valid() {
    let attrs = NewReward::new("Cool Reward", Some(50), 0);
    assert!(attrs.validate().is_empty());
    assert!(Reward::new(RewardId(1), attrs).is_ok());
}

#[test]
fn is_invalid_without_cost() {
    let messages = validation_messages(Reward::new(
        RewardId(1),
        NewReward::new("Another Reward", None, 0),
    ));
    assert_eq!(messages, vec!["Cost can't be blank"]);
}

#[test]
fn is_invalid_without_name() {
    let messages = validation_messages(Reward::new(RewardId(1), NewReward::new("", Some(50), 0)));
    assert_eq!(messages, vec!["Name can't be blank"]);
}

#[test]
fn ledger_create_reports_every_blank_field() {
    let ledger = Ledger::new();
    let Err(LedgerError::Validation(errors)) = ledger.create_reward("", None, 3) else {
        panic!("expected validation error");
    };
    assert_eq!(errors.fields(), vec!["name", "cost"]);
    assert!(ledger.rewards().is_empty());
}

#[test]
fn inventory_defaults_to_zero_when_deserialized() {
    let attrs: NewReward = serde_json::from_str(r#"{"name":"Mug","cost":10}"#).unwrap();
    assert_eq!(attrs.inventory, 0);
}

// === Attributes ===

#[test]
fn has_expected_attributes() {
    let reward = Reward::new(RewardId(1), NewReward::new("Cool Reward", Some(50), 0)).unwrap();
    let json = serde_json::to_value(&reward).unwrap();

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "cost",
            "created_at",
            "deactivated_at",
            "id",
            "inventory",
            "name",
            "purchase_count",
            "updated_at"
        ]
    );
}

// === Scopes ===

#[test]
fn active_returns_active_rewards_in_creation_order() {
    let ledger = Ledger::new();
    ledger.create_reward("A Reward", Some(100), 0).unwrap();
    ledger.create_reward("B Reward", Some(100), 0).unwrap();
    let c = ledger.create_reward("C Reward", Some(100), 0).unwrap();
    ledger.deactivate_reward(c.id()).unwrap();

    let results = ledger.list_active_rewards();

    assert_eq!(results.len(), 2);
    assert_eq!(results.first().unwrap().name(), "A Reward");
    assert_eq!(results.last().unwrap().name(), "B Reward");
    assert!(!results.iter().any(|r| r.name() == "C Reward"));
}

#[test]
fn active_listing_is_restartable() {
    let ledger = Ledger::new();
    ledger.create_reward("A Reward", Some(100), 1).unwrap();
    ledger.create_reward("B Reward", Some(100), 1).unwrap();

    assert_eq!(ledger.list_active_rewards(), ledger.list_active_rewards());
}

// === Instance methods ===

#[test]
fn available_with_inventory_when_not_deactivated() {
    let ledger = Ledger::new();
    assert!(reward_in_state(&ledger, 1, false).is_available());
}

#[test]
fn not_available_with_inventory_when_deactivated() {
    let ledger = Ledger::new();
    assert!(!reward_in_state(&ledger, 1, true).is_available());
}

#[test]
fn not_available_without_inventory_when_not_deactivated() {
    let ledger = Ledger::new();
    assert!(!reward_in_state(&ledger, 0, false).is_available());
}

#[test]
fn not_available_without_inventory_when_deactivated() {
    let ledger = Ledger::new();
    assert!(!reward_in_state(&ledger, 0, true).is_available());
}

#[test]
fn restock_when_deactivated_activates_and_sets_inventory() {
    let ledger = Ledger::new();
    let reward = reward_in_state(&ledger, 0, true);

    ledger.restock(reward.id()).unwrap();
    let restocked = ledger.reward(reward.id()).unwrap();

    assert_eq!(restocked.inventory(), 25);
    assert_eq!(restocked.deactivated_at(), None);
}

#[test]
fn restock_when_active_remains_active_and_sets_inventory() {
    let ledger = Ledger::new();
    let reward = reward_in_state(&ledger, 0, false);

    ledger.restock(reward.id()).unwrap();
    let restocked = ledger.reward(reward.id()).unwrap();

    assert_eq!(restocked.inventory(), 25);
    assert_eq!(restocked.deactivated_at(), None);
}

#[test]
fn restock_lowers_inventory_above_quantity() {
    let ledger = Ledger::new();
    let reward = reward_in_state(&ledger, 40, false);

    assert_eq!(ledger.restock(reward.id()).unwrap().inventory(), 25);
}

#[test]
fn restock_is_idempotent() {
    let ledger = Ledger::new();
    let reward = reward_in_state(&ledger, 3, true);

    ledger.restock(reward.id()).unwrap();
    let again = ledger.restock(reward.id()).unwrap();

    assert_eq!(again.inventory(), 25);
    assert!(again.is_available());
}

#[test]
fn restock_unknown_reward() {
    let ledger = Ledger::new();
    assert_eq!(
        ledger.restock(RewardId(42)).err(),
        Some(LedgerError::NotFound(Entity::Reward))
    );
}

#[test]
fn deactivate_then_activate_restores_availability() {
    let ledger = Ledger::new();
    let reward = reward_in_state(&ledger, 2, true);
    assert!(reward.deactivated_at().is_some());

    let activated = ledger.activate_reward(reward.id()).unwrap();
    assert!(activated.is_available());
    assert_eq!(activated.inventory(), 2);
}
