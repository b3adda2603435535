// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_lender, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle_lender(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("INSERT INTO lenders(name) VALUES (?1)", params![name])?;
            println!("Added lender '{}'", name);
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            let mut stmt = conn.prepare("SELECT name FROM lenders ORDER BY name")?;
            let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
            let mut data = Vec::new();
            for row in rows {
                data.push(row?);
            }
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data.into_iter().map(|n| vec![n]).collect();
                println!("{}", pretty_table(&["Lender"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("schedule", sub)) => schedule(conn, sub)?,
        Some(("payments", sub)) => payments(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let lender = sub.get_one::<String>("lender").unwrap();
    let principal = parse_decimal(sub.get_one::<String>("principal").unwrap())?;
    let opened = parse_date(sub.get_one::<String>("opened").unwrap())?;
    let description = sub.get_one::<String>("description").map(|s| s.to_string());
    let lender_id = id_for_lender(conn, lender)?;

    conn.execute(
        "INSERT INTO loans(lender_id, description, principal, opened_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            lender_id,
            description,
            principal.to_string(),
            opened.to_string()
        ],
    )?;
    println!(
        "Loan of {} from '{}' recorded (id {})",
        principal,
        lender,
        conn.last_insert_rowid()
    );
    Ok(())
}

#[derive(Serialize)]
struct LoanRow {
    id: i64,
    lender: String,
    principal: String,
    opened: String,
    description: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT l.id, n.name, l.principal, l.opened_date, l.description
         FROM loans l JOIN lenders n ON l.lender_id=n.id ORDER BY l.id",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let description: Option<String> = r.get(4)?;
        data.push(LoanRow {
            id: r.get(0)?,
            lender: r.get(1)?,
            principal: r.get(2)?,
            opened: r.get(3)?,
            description: description.unwrap_or_default(),
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|l| {
                vec![
                    l.id.to_string(),
                    l.lender.clone(),
                    l.principal.clone(),
                    l.opened.clone(),
                    l.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Lender", "Principal", "Opened", "Description"], rows)
        );
    }
    Ok(())
}

fn schedule(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loan_id = *sub.get_one::<i64>("id").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let status = sub.get_one::<String>("status").unwrap();

    conn.execute(
        "INSERT INTO loan_payments(loan_id, scheduled_date, total_amount, status)
         VALUES (?1, ?2, ?3, ?4)",
        params![loan_id, date.to_string(), amount.to_string(), status],
    )?;
    println!("Scheduled {} payment of {} on {}", status, amount, date);
    Ok(())
}

#[derive(Serialize)]
struct PaymentRow {
    id: i64,
    loan_id: i64,
    date: String,
    amount: String,
    status: String,
}

fn payments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut sql = String::from(
        "SELECT id, loan_id, scheduled_date, total_amount, status FROM loan_payments WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(loan) = sub.get_one::<i64>("loan") {
        sql.push_str(" AND loan_id=?");
        params_vec.push(loan.to_string());
    }
    sql.push_str(" ORDER BY scheduled_date, id");

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(PaymentRow {
            id: r.get(0)?,
            loan_id: r.get(1)?,
            date: r.get(2)?,
            amount: r.get(3)?,
            status: r.get(4)?,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.loan_id.to_string(),
                    p.date.clone(),
                    p.amount.clone(),
                    p.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Loan", "Date", "Amount", "Status"], rows)
        );
    }
    Ok(())
}
