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

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use rewards_ledger::{EmployeeId, Ledger, LedgerConfig, LedgerError, RewardId};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::process;
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Rewards Ledger - Replay ledger command CSV files
///
/// Reads commands from a CSV file, applies them to a fresh ledger and writes
/// the selected report to stdout. Logs go to stderr (filter with RUST_LOG).
#[derive(Parser, Debug)]
#[command(name = "rewards-ledger")]
#[command(about = "Replays employee rewards commands and reports the resulting ledger", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: type,employee,reward,first_name,last_name,name,cost,quantity
    /// Example: cargo run -- commands.csv --report rewards > rewards.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Report written to stdout
    #[arg(long, value_enum, default_value_t = Report::Employees)]
    report: Report,

    /// Maximum time to wait for row locks per command, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 250)]
    commit_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Employees,
    Rewards,
    ActiveRewards,
    ZeroBalance,
    Redemptions,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config =
        LedgerConfig::default().with_commit_timeout(Duration::from_millis(args.commit_timeout_ms));

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            error!(path = %args.input.display(), "error opening file: {e}");
            process::exit(1);
        }
    };

    let ledger = match process_commands(BufReader::new(file), config) {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("error processing commands: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = write_report(&ledger, args.report, std::io::stdout()) {
        error!("error writing output: {e}");
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, employee, reward, first_name, last_name, name, cost, quantity`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    command: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    employee: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    reward: Option<u32>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    name: String,
    /// Kept as text so a malformed number rejects the row instead of
    /// reading as absent.
    #[serde(default)]
    cost: String,
    #[serde(default)]
    quantity: String,
}

/// Parses an optional numeric field.
///
/// An empty field is `Some(None)`; a value that does not parse as `T`
/// (negative, non-numeric, out of range) is `None`.
fn optional_number<T: FromStr>(raw: &str) -> Option<Option<T>> {
    if raw.is_empty() {
        Some(None)
    } else {
        raw.parse().ok().map(Some)
    }
}

/// A parsed ledger command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    CreateEmployee {
        first_name: String,
        last_name: String,
        balance: u64,
    },
    CreateReward {
        name: String,
        cost: Option<u64>,
        inventory: u32,
    },
    Grant {
        employee_id: EmployeeId,
        amount: u64,
    },
    Restock {
        reward_id: RewardId,
    },
    Deactivate {
        reward_id: RewardId,
    },
    Activate {
        reward_id: RewardId,
    },
    Redeem {
        employee_id: EmployeeId,
        reward_id: RewardId,
    },
}

impl CsvRecord {
    /// Converts CSV record to a Command.
    ///
    /// Returns `None` for unknown command types, missing required fields or
    /// malformed numbers.
    fn into_command(self) -> Option<Command> {
        let employee_id = self.employee.map(EmployeeId);
        let reward_id = self.reward.map(RewardId);

        match self.command.to_lowercase().as_str() {
            "employee" => Some(Command::CreateEmployee {
                first_name: self.first_name,
                last_name: self.last_name,
                balance: optional_number(&self.quantity)?.unwrap_or(0),
            }),
            "reward" => Some(Command::CreateReward {
                name: self.name,
                cost: optional_number(&self.cost)?,
                inventory: optional_number(&self.quantity)?.unwrap_or(0),
            }),
            "grant" => Some(Command::Grant {
                employee_id: employee_id?,
                amount: optional_number(&self.quantity)??,
            }),
            "restock" => Some(Command::Restock {
                reward_id: reward_id?,
            }),
            "deactivate" => Some(Command::Deactivate {
                reward_id: reward_id?,
            }),
            "activate" => Some(Command::Activate {
                reward_id: reward_id?,
            }),
            "redeem" => Some(Command::Redeem {
                employee_id: employee_id?,
                reward_id: reward_id?,
            }),
            _ => None,
        }
    }
}

fn apply(ledger: &Ledger, command: Command) -> Result<(), LedgerError> {
    match command {
        Command::CreateEmployee {
            first_name,
            last_name,
            balance,
        } => ledger
            .create_employee(first_name, last_name, balance)
            .map(drop),
        Command::CreateReward {
            name,
            cost,
            inventory,
        } => ledger.create_reward(name, cost, inventory).map(drop),
        Command::Grant {
            employee_id,
            amount,
        } => ledger.grant(employee_id, amount).map(drop),
        Command::Restock { reward_id } => ledger.restock(reward_id).map(drop),
        Command::Deactivate { reward_id } => ledger.deactivate_reward(reward_id).map(drop),
        Command::Activate { reward_id } => ledger.activate_reward(reward_id).map(drop),
        Command::Redeem {
            employee_id,
            reward_id,
        } => ledger.redeem(employee_id, reward_id).map(drop),
    }
}

/// Replay commands from a CSV reader.
///
/// Rows are streamed, so arbitrarily large files are not loaded into memory.
/// Malformed rows and rejected commands are logged and skipped.
///
/// # CSV Format
///
/// Expected columns: `type, employee, reward, first_name, last_name, name, cost, quantity`
/// - `employee`: first and last name, `quantity` is the opening balance
/// - `reward`: name and cost, `quantity` is the opening inventory
/// - `grant`: employee ID, `quantity` points
/// - `restock`, `deactivate`, `activate`: reward ID
/// - `redeem`: employee ID and reward ID
///
/// IDs are assigned from 1 in creation order.
///
/// # Example
///
/// ```csv
/// type,employee,reward,first_name,last_name,name,cost,quantity
/// employee,,,Cesar,Mejia,,,100
/// reward,,,,,Cool Reward,50,1
/// redeem,1,1,,,,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
fn process_commands<R: Read>(reader: R, config: LedgerConfig) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::with_config(config);

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        match result {
            Ok(record) => {
                let Some(command) = record.into_command() else {
                    warn!(row, "skipping invalid command record");
                    continue;
                };

                if let Err(e) = apply(&ledger, command) {
                    warn!(row, "skipping command: {e}");
                }
            }
            Err(e) => {
                warn!(row, "skipping malformed row: {e}");
            }
        }
    }

    Ok(ledger)
}

/// Employee report row.
#[derive(Debug, Serialize)]
struct EmployeeRow<'a> {
    id: EmployeeId,
    name: String,
    first_name: &'a str,
    last_name: &'a str,
    rewards_balance: u64,
}

/// Reward report row.
#[derive(Debug, Serialize)]
struct RewardRow<'a> {
    id: RewardId,
    name: &'a str,
    cost: u64,
    inventory: u32,
    purchase_count: u64,
    available: bool,
    deactivated_at: Option<String>,
}

/// Write the selected report as CSV.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_report<W: Write>(ledger: &Ledger, report: Report, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    match report {
        Report::Employees | Report::ZeroBalance => {
            let employees = if report == Report::ZeroBalance {
                ledger.list_zero_balance_employees()
            } else {
                ledger.employees()
            };
            for employee in &employees {
                wtr.serialize(EmployeeRow {
                    id: employee.id(),
                    name: employee.full_name(),
                    first_name: employee.first_name(),
                    last_name: employee.last_name(),
                    rewards_balance: employee.rewards_balance(),
                })?;
            }
        }
        Report::Rewards | Report::ActiveRewards => {
            let rewards = if report == Report::ActiveRewards {
                ledger.list_active_rewards()
            } else {
                ledger.rewards()
            };
            for reward in &rewards {
                wtr.serialize(RewardRow {
                    id: reward.id(),
                    name: reward.name(),
                    cost: reward.cost(),
                    inventory: reward.inventory(),
                    purchase_count: reward.purchase_count(),
                    available: reward.is_available(),
                    deactivated_at: reward.deactivated_at().map(|at| at.to_rfc3339()),
                })?;
            }
        }
        Report::Redemptions => {
            for redemption in ledger.drain_redemptions() {
                wtr.serialize(&redemption)?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
