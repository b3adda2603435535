// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::PlanError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }

    /// Sign applied when aggregating balances: income adds, expense subtracts.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TxKind::Income => amount,
            TxKind::Expense => -amount,
        }
    }
}

impl FromStr for TxKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(anyhow::anyhow!("unknown transaction kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::None => "none",
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
            RecurrenceType::Yearly => "yearly",
            RecurrenceType::Custom => "custom",
        }
    }
}

impl FromStr for RecurrenceType {
    type Err = PlanError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RecurrenceType::None),
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            "yearly" => Ok(RecurrenceType::Yearly),
            "custom" => Ok(RecurrenceType::Custom),
            other => Err(PlanError::UnsupportedRecurrenceKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Days => "days",
            IntervalUnit::Weeks => "weeks",
            IntervalUnit::Months => "months",
            IntervalUnit::Years => "years",
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = PlanError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(IntervalUnit::Days),
            "weeks" => Ok(IntervalUnit::Weeks),
            "months" => Ok(IntervalUnit::Months),
            "years" => Ok(IntervalUnit::Years),
            other => Err(PlanError::UnsupportedRecurrenceKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    Never,
    UntilDate,
    AfterCount,
}

impl EndCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCondition::Never => "never",
            EndCondition::UntilDate => "until_date",
            EndCondition::AfterCount => "after_count",
        }
    }
}

impl FromStr for EndCondition {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(EndCondition::Never),
            "until_date" => Ok(EndCondition::UntilDate),
            "after_count" => Ok(EndCondition::AfterCount),
            other => Err(anyhow::anyhow!("unknown end condition '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Pending,
    Executed,
    Skipped,
}

impl OccurrenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::Pending => "pending",
            OccurrenceStatus::Executed => "executed",
            OccurrenceStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccurrenceStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OccurrenceStatus::Pending),
            "executed" => Ok(OccurrenceStatus::Executed),
            "skipped" => Ok(OccurrenceStatus::Skipped),
            other => Err(anyhow::anyhow!("unknown occurrence status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// An actual (recorded) transaction. Amounts are stored positive;
/// the sign comes from `kind` when aggregating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub kind: TxKind,
    pub occurrence_id: Option<i64>,
}

/// The repeating template from which occurrences are derived.
/// `start_date` anchors day-of-month/year math and is the floor below
/// which no occurrence is ever generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTransaction {
    pub id: i64,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub kind: TxKind,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: i64,
    pub planned_transaction_id: i64,
    pub recurrence_type: RecurrenceType,
    pub interval: u32,
    /// Only meaningful when `recurrence_type` is Custom.
    pub interval_unit: Option<IntervalUnit>,
    /// Ascending weekday indices, 0=Monday..6=Sunday. Only used for
    /// Custom rules stepping in weeks.
    pub weekdays: Option<Vec<u8>>,
    pub only_workdays: bool,
    pub end_condition: EndCondition,
    pub end_date: Option<NaiveDate>,
    pub occurrences_count: Option<u32>,
}

impl RecurrenceRule {
    /// Parse the stored comma-separated weekday list, e.g. "0,2,4".
    pub fn parse_weekdays(s: &str) -> anyhow::Result<Vec<u8>> {
        let mut days = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let d: u8 = part
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid weekday '{}' in '{}'", part, s))?;
            if d > 6 {
                return Err(anyhow::anyhow!("weekday {} out of range 0..=6", d));
            }
            days.push(d);
        }
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }

    pub fn weekdays_to_string(days: &[u8]) -> String {
        days.iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One concrete scheduled instance of a planned transaction.
/// `amount` is a snapshot of the template's amount at generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: i64,
    pub planned_transaction_id: i64,
    pub occurrence_date: NaiveDate,
    pub amount: Decimal,
    pub status: OccurrenceStatus,
    pub actual_transaction_id: Option<i64>,
    pub executed_amount: Option<Decimal>,
    pub executed_date: Option<NaiveDate>,
    pub skip_reason: Option<String>,
}

impl Occurrence {
    /// executed_amount - planned amount; defined only once executed.
    pub fn amount_deviation(&self) -> Option<Decimal> {
        match self.status {
            OccurrenceStatus::Executed => self.executed_amount.map(|e| e - self.amount),
            _ => None,
        }
    }

    /// Days between execution and schedule; defined only once executed.
    pub fn date_deviation(&self) -> Option<i64> {
        match self.status {
            OccurrenceStatus::Executed => self
                .executed_date
                .map(|e| (e - self.occurrence_date).num_days()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lender {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub lender_id: i64,
    pub description: Option<String>,
    pub principal: Decimal,
    pub opened_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayment {
    pub id: i64,
    pub loan_id: i64,
    pub scheduled_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: String, // pending | overdue | paid
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayment {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub planned_date: Option<NaiveDate>,
    pub status: String, // active | done | cancelled
}
