// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Rules whose end condition and end fields disagree
    let mut stmt = conn.prepare(
        "SELECT planned_transaction_id FROM recurrence_rules
         WHERE (end_condition='until_date' AND end_date IS NULL)
            OR (end_condition='after_count' AND occurrences_count IS NULL)
            OR (end_condition!='until_date' AND end_date IS NOT NULL)
            OR (end_condition!='after_count' AND occurrences_count IS NOT NULL)",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let plan_id: i64 = r.get(0)?;
        rows.push(vec!["rule_end_condition_mismatch".into(), format!("plan {}", plan_id)]);
    }

    // 2) Executed occurrences missing their execution fields
    let mut stmt2 = conn.prepare(
        "SELECT id FROM occurrences
         WHERE status='executed'
           AND (actual_transaction_id IS NULL OR executed_amount IS NULL OR executed_date IS NULL)",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["executed_missing_link".into(), format!("occurrence {}", id)]);
    }

    // 3) Execution fields present on rows that were never executed
    let mut stmt3 = conn.prepare(
        "SELECT id FROM occurrences
         WHERE status!='executed' AND actual_transaction_id IS NOT NULL",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["stale_transaction_link".into(), format!("occurrence {}", id)]);
    }

    // 4) Transaction back-links pointing at missing occurrences
    let mut stmt4 = conn.prepare(
        "SELECT t.id FROM transactions t
         LEFT JOIN occurrences o ON t.occurrence_id=o.id
         WHERE t.occurrence_id IS NOT NULL AND o.id IS NULL",
    )?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["orphan_occurrence_link".into(), format!("transaction {}", id)]);
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
