// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, maybe_print_json, parse_date, parse_decimal, pretty_table};
use crate::{materializer, planfact};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ensure", sub)) => ensure(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("execute", sub)) => execute(conn, sub)?,
        Some(("skip", sub)) => skip(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn ensure(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let created = materializer::ensure_for_period(conn, from, to)?;
    println!("Created {} occurrence(s) for {}..{}", created, from, to);
    Ok(())
}

#[derive(Serialize)]
struct OccurrenceRow {
    id: i64,
    plan_id: i64,
    date: String,
    amount: String,
    status: String,
    executed_amount: String,
    executed_date: String,
    amount_deviation: String,
    date_deviation: String,
    skip_reason: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut sql = String::from(
        "SELECT id FROM occurrences WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(from) = sub.get_one::<String>("from") {
        parse_date(from)?;
        sql.push_str(" AND occurrence_date>=?");
        params_vec.push(from.into());
    }
    if let Some(to) = sub.get_one::<String>("to") {
        parse_date(to)?;
        sql.push_str(" AND occurrence_date<=?");
        params_vec.push(to.into());
    }
    if let Some(plan) = sub.get_one::<i64>("plan") {
        sql.push_str(" AND planned_transaction_id=?");
        params_vec.push(plan.to_string());
    }
    if let Some(status) = sub.get_one::<String>("status") {
        sql.push_str(" AND status=?");
        params_vec.push(status.into());
    }
    sql.push_str(" ORDER BY occurrence_date, planned_transaction_id");

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let ids: Vec<i64> = stmt
        .query_map(rusqlite::params_from_iter(params), |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let mut data = Vec::new();
    for id in ids {
        let Some(occ) = crate::utils::get_occurrence(conn, id)? else {
            continue;
        };
        data.push(OccurrenceRow {
            id: occ.id,
            plan_id: occ.planned_transaction_id,
            date: occ.occurrence_date.to_string(),
            amount: occ.amount.to_string(),
            status: occ.status.to_string(),
            executed_amount: occ
                .executed_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            executed_date: occ.executed_date.map(|d| d.to_string()).unwrap_or_default(),
            amount_deviation: occ
                .amount_deviation()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            date_deviation: occ
                .date_deviation()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            skip_reason: occ.skip_reason.unwrap_or_default(),
        });
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.plan_id.to_string(),
                    o.date.clone(),
                    o.amount.clone(),
                    o.status.clone(),
                    o.executed_amount.clone(),
                    o.executed_date.clone(),
                    o.amount_deviation.clone(),
                    o.date_deviation.clone(),
                    o.skip_reason.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "Plan", "Date", "Amount", "Status", "Executed", "On", "Amt dev",
                    "Day dev", "Skip reason",
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn execute(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let category_id = if let Some(cat) = sub.get_one::<String>("category") {
        Some(id_for_category(conn, cat)?)
    } else {
        None
    };
    let description = sub.get_one::<String>("description").map(String::as_str);

    let (actual, occ) = planfact::execute(conn, id, amount, date, category_id, description)?;
    println!(
        "Executed occurrence {} as transaction {} ({} on {}, deviation {} / {} day(s))",
        occ.id,
        actual.id,
        actual.amount,
        actual.date,
        occ.amount_deviation().unwrap_or_default(),
        occ.date_deviation().unwrap_or_default(),
    );
    Ok(())
}

fn skip(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let reason = sub.get_one::<String>("reason").map(String::as_str);
    let occ = planfact::skip(conn, id, reason)?;
    println!("Skipped occurrence {} ({})", occ.id, occ.occurrence_date);
    Ok(())
}
