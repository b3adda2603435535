// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let kind = sub.get_one::<String>("kind").unwrap();
    let description = sub.get_one::<String>("description").map(|s| s.to_string());

    let category_id = if let Some(cat) = sub.get_one::<String>("category") {
        Some(id_for_category(conn, cat)?)
    } else {
        None
    };

    conn.execute(
        "INSERT INTO transactions(date, amount, category_id, description, kind)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            date.to_string(),
            amount.to_string(),
            category_id,
            description,
            kind
        ],
    )?;
    println!("Recorded {} {} on {}", kind, amount, date);
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub occurrence_id: Option<i64>,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut sql = String::from(
        "SELECT t.id, t.date, t.amount, t.kind, c.name, t.description, t.occurrence_id
         FROM transactions t LEFT JOIN categories c ON t.category_id=c.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(month.into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let category: Option<String> = r.get(4)?;
        let description: Option<String> = r.get(5)?;
        data.push(TransactionRow {
            id: r.get(0)?,
            date: r.get(1)?,
            amount: r.get(2)?,
            kind: r.get(3)?,
            category: category.unwrap_or_default(),
            description: description.unwrap_or_default(),
            occurrence_id: r.get(6)?,
        });
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.amount.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.occurrence_id.map(|i| i.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Amount", "Kind", "Category", "Description", "Occurrence"],
                rows,
            )
        );
    }
    Ok(())
}
