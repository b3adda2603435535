// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("done", sub)) => set_status(conn, sub, "done")?,
        Some(("cancel", sub)) => set_status(conn, sub, "cancelled")?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap();
    let planned_date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s))
        .transpose()?;

    conn.execute(
        "INSERT INTO pending_payments(description, amount, planned_date)
         VALUES (?1, ?2, ?3)",
        params![
            description,
            amount.to_string(),
            planned_date.map(|d| d.to_string())
        ],
    )?;
    println!(
        "Pending payment '{}' of {} recorded (id {})",
        description,
        amount,
        conn.last_insert_rowid()
    );
    Ok(())
}

#[derive(Serialize)]
struct PendingRow {
    id: i64,
    description: String,
    amount: String,
    planned_date: String,
    status: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT id, description, amount, planned_date, status
         FROM pending_payments ORDER BY planned_date IS NULL, planned_date, id",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let planned_date: Option<String> = r.get(3)?;
        data.push(PendingRow {
            id: r.get(0)?,
            description: r.get(1)?,
            amount: r.get(2)?,
            planned_date: planned_date.unwrap_or_default(),
            status: r.get(4)?,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.description.clone(),
                    p.amount.clone(),
                    p.planned_date.clone(),
                    p.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Description", "Amount", "Planned", "Status"], rows)
        );
    }
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches, status: &str) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "UPDATE pending_payments SET status=?1 WHERE id=?2 AND status='active'",
        params![status, id],
    )?;
    if changed == 0 {
        return Err(anyhow!("pending payment {} not found or not active", id));
    }
    println!("Pending payment {} marked {}", id, status);
    Ok(())
}
