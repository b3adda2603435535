// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use tracing::debug;

use crate::errors::PlanError;
use crate::generator;
use crate::models::Occurrence;
use crate::utils::{
    active_templates, get_occurrence, get_template, occurrence_for_date, rule_for_template,
};

/// Lazy single-date path: return the occurrence for
/// `(template_id, date)`, creating a pending row if none exists yet.
/// The created row snapshots the template's current amount.
pub fn get_or_create(conn: &Connection, template_id: i64, date: NaiveDate) -> Result<Occurrence> {
    if let Some(occ) = occurrence_for_date(conn, template_id, date)? {
        return Ok(occ);
    }
    let template =
        get_template(conn, template_id)?.ok_or(PlanError::TemplateNotFound(template_id))?;
    conn.execute(
        "INSERT INTO occurrences(planned_transaction_id, occurrence_date, amount, status)
         VALUES (?1, ?2, ?3, 'pending')",
        params![template_id, date.to_string(), template.amount.to_string()],
    )
    .with_context(|| format!("Create occurrence for plan {} on {}", template_id, date))?;
    let id = conn.last_insert_rowid();
    get_occurrence(conn, id)?.ok_or_else(|| anyhow!("occurrence {} missing after insert", id))
}

/// Materialize every active template's occurrences over the window.
/// Rows that already exist are left untouched; the whole batch commits
/// together. Returns how many rows were actually created.
pub fn ensure_for_period(
    conn: &mut Connection,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<usize> {
    if window_start > window_end {
        return Err(PlanError::invalid_range(window_start, window_end).into());
    }

    let tx = conn.transaction()?;
    let templates = active_templates(&tx)?;
    let mut created = 0usize;
    for template in &templates {
        let rule = rule_for_template(&tx, template.id)?;
        let dates = generator::generate(template, rule.as_ref(), window_start, window_end)?;
        for date in dates {
            created += tx.execute(
                "INSERT INTO occurrences(planned_transaction_id, occurrence_date, amount, status)
                 VALUES (?1, ?2, ?3, 'pending')
                 ON CONFLICT(planned_transaction_id, occurrence_date) DO NOTHING",
                params![template.id, date.to_string(), template.amount.to_string()],
            )?;
        }
    }
    tx.commit()?;
    debug!(
        created,
        %window_start,
        %window_end,
        "materialized occurrences for period"
    );
    Ok(created)
}
