// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::forecast;
use crate::utils::{maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("period", sub)) => period(conn, sub)?,
        Some(("gaps", sub)) => gaps(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn today_from(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let target = parse_date(sub.get_one::<String>("date").unwrap())?;
    let today = today_from(sub)?;
    let actual = forecast::actual_balance(conn, today)?;
    let projected = forecast::forecast_balance(conn, today, target)?;
    println!("Actual balance ({}): {:.2}", today, actual);
    println!("Forecast balance ({}): {:.2}", target, projected);
    Ok(())
}

fn period(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let today = today_from(sub)?;

    let series = forecast::forecast_for_period(conn, today, from, to)?;
    if !maybe_print_json(json_flag, jsonl_flag, &series)? {
        let rows: Vec<Vec<String>> = series
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    format!("{:.2}", p.actual),
                    format!("{:.2}", p.forecast),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Actual", "Forecast"], rows));
    }
    Ok(())
}

fn gaps(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let today = today_from(sub)?;

    let gaps = forecast::detect_cash_gaps(conn, today, from, to)?;
    if !maybe_print_json(json_flag, jsonl_flag, &gaps)? {
        if gaps.is_empty() {
            println!("No cash gaps in {}..{}", from, to);
        } else {
            let rows = gaps.iter().map(|d| vec![d.to_string()]).collect();
            println!("{}", pretty_table(&["Cash gap"], rows));
        }
    }
    Ok(())
}
