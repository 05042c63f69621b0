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

//! Benchmarks for the rewards ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded redemption
//! - Parallel redemptions on one hot reward versus disjoint pairs
//! - Listing scopes over growing tables

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rayon::prelude::*;
use rewards_ledger::{EmployeeId, Ledger, RewardId};

// =============================================================================
// Helper Functions
// =============================================================================

/// Ledger with `employees` rich employees and `rewards` well-stocked rewards.
fn seeded_ledger(employees: u32, rewards: u32) -> Ledger {
    let ledger = Ledger::new();
    for i in 0..employees {
        ledger
            .create_employee("Employee", format!("{i}"), u64::MAX / 2)
            .unwrap();
    }
    for i in 0..rewards {
        ledger
            .create_reward(format!("Reward {i}"), Some(1), u32::MAX)
            .unwrap();
    }
    ledger
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_redeem(c: &mut Criterion) {
    c.bench_function("single_redeem", |b| {
        let ledger = seeded_ledger(1, 1);
        b.iter(|| {
            ledger
                .redeem(black_box(EmployeeId(1)), black_box(RewardId(1)))
                .unwrap();
        })
    });
}

fn bench_rejected_redeem(c: &mut Criterion) {
    c.bench_function("rejected_redeem", |b| {
        let ledger = Ledger::new();
        let employee = ledger.create_employee("Cesar", "Mejia", 0).unwrap();
        let reward = ledger.create_reward("Mug", Some(10), 1).unwrap();
        b.iter(|| {
            let _ = ledger.redeem(black_box(employee.id()), black_box(reward.id()));
        })
    });
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_redeem(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_redeem");
    const COUNT: u32 = 10_000;
    group.throughput(Throughput::Elements(u64::from(COUNT)));

    // Every redemption contends on the same reward row.
    group.bench_function("hot_reward", |b| {
        let ledger = seeded_ledger(64, 1);
        b.iter(|| {
            (0..COUNT).into_par_iter().for_each(|i| {
                let _ = ledger.redeem(EmployeeId(i % 64 + 1), RewardId(1));
            });
        })
    });

    // Redemptions spread over disjoint employee/reward pairs.
    group.bench_function("disjoint_pairs", |b| {
        let ledger = seeded_ledger(64, 64);
        b.iter(|| {
            (0..COUNT).into_par_iter().for_each(|i| {
                let id = i % 64 + 1;
                let _ = ledger.redeem(EmployeeId(id), RewardId(id));
            });
        })
    });

    group.finish();
}

// =============================================================================
// Scope Benchmarks
// =============================================================================

fn bench_list_active_rewards(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_active_rewards");

    for count in [100u32, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(u64::from(*count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let ledger = seeded_ledger(0, count);
            for i in (1..=count).step_by(3) {
                ledger.deactivate_reward(RewardId(i)).unwrap();
            }
            b.iter(|| black_box(ledger.list_active_rewards()))
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(single_threaded, bench_single_redeem, bench_rejected_redeem,);

criterion_group!(multi_threaded, bench_parallel_redeem,);

criterion_group!(scopes, bench_list_active_rewards,);

criterion_main!(single_threaded, multi_threaded, scopes);
