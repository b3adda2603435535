// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::PlanError;
use crate::models::{EndCondition, RecurrenceRule, RecurrenceType};
use crate::utils::{
    get_template, id_for_category, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rule", sub)) => set_rule(conn, sub)?,
        Some(("enable", sub)) => set_active(conn, sub, true)?,
        Some(("disable", sub)) => set_active(conn, sub, false)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= rust_decimal::Decimal::ZERO {
        return Err(PlanError::InvalidAmount(amount).into());
    }
    let kind = sub.get_one::<String>("kind").unwrap();
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end = sub
        .get_one::<String>("end")
        .map(|s| parse_date(s))
        .transpose()?;
    let description = sub.get_one::<String>("description").map(|s| s.to_string());
    let category_id = if let Some(cat) = sub.get_one::<String>("category") {
        Some(id_for_category(conn, cat)?)
    } else {
        None
    };

    conn.execute(
        "INSERT INTO planned_transactions(amount, category_id, description, kind, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            amount.to_string(),
            category_id,
            description,
            kind,
            start.to_string(),
            end.map(|d| d.to_string())
        ],
    )?;
    println!(
        "Planned {} {} starting {} (id {})",
        kind,
        amount,
        start,
        conn.last_insert_rowid()
    );
    Ok(())
}

#[derive(Serialize)]
struct PlanRow {
    id: i64,
    amount: String,
    kind: String,
    start_date: String,
    end_date: String,
    active: bool,
    rule: String,
    description: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let include_inactive = sub.get_flag("all");

    let mut sql = String::from(
        "SELECT p.id, p.amount, p.kind, p.start_date, p.end_date, p.is_active, p.description,
                r.recurrence_type, r.interval, r.end_condition
         FROM planned_transactions p
         LEFT JOIN recurrence_rules r ON r.planned_transaction_id=p.id",
    );
    if !include_inactive {
        sql.push_str(" WHERE p.is_active=1");
    }
    sql.push_str(" ORDER BY p.id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let end_date: Option<String> = r.get(4)?;
        let is_active: i64 = r.get(5)?;
        let description: Option<String> = r.get(6)?;
        let rtype: Option<String> = r.get(7)?;
        let interval: Option<u32> = r.get(8)?;
        let end_cond: Option<String> = r.get(9)?;
        let rule = match rtype {
            Some(t) => format!(
                "{} x{} ({})",
                t,
                interval.unwrap_or(1),
                end_cond.unwrap_or_else(|| "never".into())
            ),
            None => "one-shot".to_string(),
        };
        data.push(PlanRow {
            id: r.get(0)?,
            amount: r.get(1)?,
            kind: r.get(2)?,
            start_date: r.get(3)?,
            end_date: end_date.unwrap_or_default(),
            active: is_active != 0,
            rule,
            description: description.unwrap_or_default(),
        });
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.amount.clone(),
                    p.kind.clone(),
                    p.start_date.clone(),
                    p.end_date.clone(),
                    if p.active { "yes".into() } else { "no".into() },
                    p.rule.clone(),
                    p.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Amount", "Kind", "Start", "End", "Active", "Rule", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

/// Validate and upsert a plan's recurrence rule. Exactly one of
/// `--until` / `--count` must be present, matching the end condition.
fn set_rule(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let plan_id = *sub.get_one::<i64>("id").unwrap();
    get_template(conn, plan_id)?.ok_or(PlanError::TemplateNotFound(plan_id))?;

    let rtype: RecurrenceType = sub.get_one::<String>("type").unwrap().parse()?;
    let interval = *sub.get_one::<u32>("interval").unwrap();
    if interval == 0 {
        return Err(anyhow!("--interval must be at least 1"));
    }
    let unit = sub.get_one::<String>("unit");
    let weekdays = sub
        .get_one::<String>("weekdays")
        .map(|s| RecurrenceRule::parse_weekdays(s))
        .transpose()?;
    let workdays_only = sub.get_flag("workdays-only");
    let until = sub
        .get_one::<String>("until")
        .map(|s| parse_date(s))
        .transpose()?;
    let count = sub.get_one::<u32>("count").copied();

    if rtype == RecurrenceType::Custom && unit.is_none() {
        return Err(anyhow!("custom rules require --unit"));
    }
    if rtype != RecurrenceType::Custom && unit.is_some() {
        return Err(anyhow!("--unit only applies to custom rules"));
    }
    if weekdays.is_some() && (rtype != RecurrenceType::Custom || unit.map(String::as_str) != Some("weeks")) {
        return Err(anyhow!("--weekdays only applies to custom weekly rules"));
    }

    let end_condition = match (until, count) {
        (Some(_), Some(_)) => return Err(anyhow!("--until and --count are mutually exclusive")),
        (Some(_), None) => EndCondition::UntilDate,
        (None, Some(_)) => EndCondition::AfterCount,
        (None, None) => EndCondition::Never,
    };

    conn.execute(
        "INSERT INTO recurrence_rules(planned_transaction_id, recurrence_type, interval,
             interval_unit, weekdays, only_workdays, end_condition, end_date, occurrences_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(planned_transaction_id) DO UPDATE SET
             recurrence_type=excluded.recurrence_type,
             interval=excluded.interval,
             interval_unit=excluded.interval_unit,
             weekdays=excluded.weekdays,
             only_workdays=excluded.only_workdays,
             end_condition=excluded.end_condition,
             end_date=excluded.end_date,
             occurrences_count=excluded.occurrences_count",
        params![
            plan_id,
            rtype.as_str(),
            interval,
            unit,
            weekdays.as_deref().map(RecurrenceRule::weekdays_to_string),
            workdays_only as i64,
            end_condition.as_str(),
            until.map(|d| d.to_string()),
            count
        ],
    )?;
    println!("Rule set for plan {}: {} x{}", plan_id, rtype.as_str(), interval);
    Ok(())
}

fn set_active(conn: &Connection, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let plan_id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "UPDATE planned_transactions SET is_active=?1 WHERE id=?2",
        params![active as i64, plan_id],
    )?;
    if changed == 0 {
        return Err(PlanError::TemplateNotFound(plan_id).into());
    }
    println!(
        "Plan {} {}",
        plan_id,
        if active { "enabled" } else { "disabled" }
    );
    Ok(())
}
