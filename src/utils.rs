// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::models::{Occurrence, PlannedTransaction, RecurrenceRule, Transaction};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_lender(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM lenders WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Lender '{}' not found", name))?;
    Ok(id)
}

// Row loaders shared by the materializer, executor, and forecast paths.
// Raw TEXT fields are pulled inside the rusqlite closure and parsed
// outside it so parse failures carry context.

type TemplateRaw = (
    i64,
    String,
    Option<i64>,
    Option<String>,
    String,
    String,
    Option<String>,
    i64,
);

fn template_from_raw(raw: TemplateRaw) -> Result<PlannedTransaction> {
    let (id, amount, category_id, description, kind, start_date, end_date, is_active) = raw;
    Ok(PlannedTransaction {
        id,
        amount: amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' for plan {}", amount, id))?,
        category_id,
        description,
        kind: kind.parse()?,
        start_date: parse_date(&start_date)?,
        end_date: end_date.as_deref().map(parse_date).transpose()?,
        is_active: is_active != 0,
    })
}

const TEMPLATE_COLS: &str =
    "id, amount, category_id, description, kind, start_date, end_date, is_active";

pub fn get_template(conn: &Connection, id: i64) -> Result<Option<PlannedTransaction>> {
    let raw: Option<TemplateRaw> = conn
        .query_row(
            &format!("SELECT {} FROM planned_transactions WHERE id=?1", TEMPLATE_COLS),
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                ))
            },
        )
        .optional()?;
    raw.map(template_from_raw).transpose()
}

pub fn active_templates(conn: &Connection) -> Result<Vec<PlannedTransaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM planned_transactions WHERE is_active=1 ORDER BY id",
        TEMPLATE_COLS
    ))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let raw: TemplateRaw = (
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
        );
        out.push(template_from_raw(raw)?);
    }
    Ok(out)
}

type RuleRaw = (
    i64,
    i64,
    String,
    u32,
    Option<String>,
    Option<String>,
    i64,
    String,
    Option<String>,
    Option<u32>,
);

fn rule_from_raw(raw: RuleRaw) -> Result<RecurrenceRule> {
    let (
        id,
        planned_transaction_id,
        recurrence_type,
        interval,
        interval_unit,
        weekdays,
        only_workdays,
        end_condition,
        end_date,
        occurrences_count,
    ) = raw;
    Ok(RecurrenceRule {
        id,
        planned_transaction_id,
        recurrence_type: recurrence_type.parse()?,
        interval,
        interval_unit: interval_unit.as_deref().map(str::parse).transpose()?,
        weekdays: weekdays
            .as_deref()
            .map(RecurrenceRule::parse_weekdays)
            .transpose()?,
        only_workdays: only_workdays != 0,
        end_condition: end_condition.parse()?,
        end_date: end_date.as_deref().map(parse_date).transpose()?,
        occurrences_count,
    })
}

pub fn rule_for_template(conn: &Connection, template_id: i64) -> Result<Option<RecurrenceRule>> {
    let raw: Option<RuleRaw> = conn
        .query_row(
            "SELECT id, planned_transaction_id, recurrence_type, interval, interval_unit,
                    weekdays, only_workdays, end_condition, end_date, occurrences_count
             FROM recurrence_rules WHERE planned_transaction_id=?1",
            params![template_id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                    r.get(8)?,
                    r.get(9)?,
                ))
            },
        )
        .optional()?;
    raw.map(rule_from_raw).transpose()
}

type OccurrenceRaw = (
    i64,
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn occurrence_from_raw(raw: OccurrenceRaw) -> Result<Occurrence> {
    let (
        id,
        planned_transaction_id,
        occurrence_date,
        amount,
        status,
        actual_transaction_id,
        executed_amount,
        executed_date,
        skip_reason,
    ) = raw;
    Ok(Occurrence {
        id,
        planned_transaction_id,
        occurrence_date: parse_date(&occurrence_date)?,
        amount: amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' for occurrence {}", amount, id))?,
        status: status.parse()?,
        actual_transaction_id,
        executed_amount: executed_amount
            .as_deref()
            .map(parse_decimal)
            .transpose()?,
        executed_date: executed_date.as_deref().map(parse_date).transpose()?,
        skip_reason,
    })
}

const OCCURRENCE_COLS: &str = "id, planned_transaction_id, occurrence_date, amount, status,
     actual_transaction_id, executed_amount, executed_date, skip_reason";

pub fn get_occurrence(conn: &Connection, id: i64) -> Result<Option<Occurrence>> {
    let raw: Option<OccurrenceRaw> = conn
        .query_row(
            &format!("SELECT {} FROM occurrences WHERE id=?1", OCCURRENCE_COLS),
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                    r.get(8)?,
                ))
            },
        )
        .optional()?;
    raw.map(occurrence_from_raw).transpose()
}

pub fn occurrence_for_date(
    conn: &Connection,
    template_id: i64,
    date: NaiveDate,
) -> Result<Option<Occurrence>> {
    let raw: Option<OccurrenceRaw> = conn
        .query_row(
            &format!(
                "SELECT {} FROM occurrences
                 WHERE planned_transaction_id=?1 AND occurrence_date=?2",
                OCCURRENCE_COLS
            ),
            params![template_id, date.to_string()],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                    r.get(8)?,
                ))
            },
        )
        .optional()?;
    raw.map(occurrence_from_raw).transpose()
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let raw: Option<(i64, String, String, Option<i64>, Option<String>, String, Option<i64>)> = conn
        .query_row(
            "SELECT id, date, amount, category_id, description, kind, occurrence_id
             FROM transactions WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                ))
            },
        )
        .optional()?;
    let Some((id, date, amount, category_id, description, kind, occurrence_id)) = raw else {
        return Ok(None);
    };
    Ok(Some(Transaction {
        id,
        date: parse_date(&date)?,
        amount: amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' for transaction {}", amount, id))?,
        category_id,
        description,
        kind: kind.parse()?,
        occurrence_id,
    }))
}
