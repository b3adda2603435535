// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::errors::PlanError;
use crate::models::{Occurrence, OccurrenceStatus, Transaction};
use crate::utils::{get_occurrence, get_template, get_transaction};

/// Execute a pending occurrence: record the actual transaction, link it,
/// and flip the occurrence to EXECUTED. Kind, category, and description
/// come from the owning template unless overridden. The insert and the
/// status flip commit together or not at all.
pub fn execute(
    conn: &mut Connection,
    occurrence_id: i64,
    actual_amount: Decimal,
    actual_date: NaiveDate,
    override_category: Option<i64>,
    override_description: Option<&str>,
) -> Result<(Transaction, Occurrence)> {
    if actual_amount <= Decimal::ZERO {
        return Err(PlanError::InvalidAmount(actual_amount).into());
    }

    let tx = conn.transaction()?;
    let occ = get_occurrence(&tx, occurrence_id)?
        .ok_or(PlanError::OccurrenceNotFound(occurrence_id))?;
    if occ.status != OccurrenceStatus::Pending {
        return Err(PlanError::OccurrenceAlreadyFinalized {
            id: occurrence_id,
            status: occ.status.to_string(),
        }
        .into());
    }
    let template = get_template(&tx, occ.planned_transaction_id)?
        .ok_or(PlanError::TemplateNotFound(occ.planned_transaction_id))?;

    let category_id = override_category.or(template.category_id);
    let description = override_description
        .map(str::to_string)
        .or_else(|| template.description.clone());

    tx.execute(
        "INSERT INTO transactions(date, amount, category_id, description, kind, occurrence_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            actual_date.to_string(),
            actual_amount.to_string(),
            category_id,
            description,
            template.kind.as_str(),
            occurrence_id
        ],
    )?;
    let actual_id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE occurrences
         SET status='executed', actual_transaction_id=?1, executed_amount=?2, executed_date=?3
         WHERE id=?4",
        params![
            actual_id,
            actual_amount.to_string(),
            actual_date.to_string(),
            occurrence_id
        ],
    )?;

    let updated = get_occurrence(&tx, occurrence_id)?
        .ok_or_else(|| anyhow!("occurrence {} missing after update", occurrence_id))?;
    let actual = get_transaction(&tx, actual_id)?
        .ok_or_else(|| anyhow!("transaction {} missing after insert", actual_id))?;
    tx.commit()?;
    Ok((actual, updated))
}

/// Skip a pending occurrence, recording an optional reason. Terminal.
pub fn skip(conn: &mut Connection, occurrence_id: i64, reason: Option<&str>) -> Result<Occurrence> {
    let tx = conn.transaction()?;
    let occ = get_occurrence(&tx, occurrence_id)?
        .ok_or(PlanError::OccurrenceNotFound(occurrence_id))?;
    if occ.status != OccurrenceStatus::Pending {
        return Err(PlanError::OccurrenceAlreadyFinalized {
            id: occurrence_id,
            status: occ.status.to_string(),
        }
        .into());
    }

    tx.execute(
        "UPDATE occurrences SET status='skipped', skip_reason=?1 WHERE id=?2",
        params![reason, occurrence_id],
    )?;
    let updated = get_occurrence(&tx, occurrence_id)?
        .ok_or_else(|| anyhow!("occurrence {} missing after update", occurrence_id))?;
    tx.commit()?;
    Ok(updated)
}
