// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::PlanError;
use crate::generator;
use crate::models::TxKind;
use crate::utils::{active_templates, parse_date, rule_for_template};

/// One point of the plan-vs-actual series. Past dates carry the real
/// balance in both components; future dates pin `actual` at today's
/// balance while `forecast` keeps accumulating.
#[derive(Debug, Clone, Serialize)]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub actual: Decimal,
    pub forecast: Decimal,
}

/// Signed sum of all recorded transactions with date <= `as_of`
/// (income positive, expense negative).
pub fn actual_balance(conn: &Connection, as_of: NaiveDate) -> Result<Decimal> {
    let mut stmt = conn.prepare("SELECT amount, kind FROM transactions WHERE date<=?1")?;
    let mut rows = stmt.query(params![as_of.to_string()])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let amount_s: String = r.get(0)?;
        let kind_s: String = r.get(1)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        let kind: TxKind = kind_s.parse()?;
        total += kind.signed(amount);
    }
    Ok(total)
}

/// Projected balance at `target_date`. For dates at or before `today`
/// this is the actual balance; future dates start from today's actual
/// balance and apply planned occurrences (at the template's current
/// amount), scheduled loan payments, and active pending payments.
pub fn forecast_balance(conn: &Connection, today: NaiveDate, target: NaiveDate) -> Result<Decimal> {
    if target <= today {
        return actual_balance(conn, target);
    }
    let mut balance = actual_balance(conn, today)?;
    let from = today + Duration::days(1);
    for delta in future_deltas(conn, from, target)?.values() {
        balance += *delta;
    }
    Ok(balance)
}

/// Day-by-day actual/forecast series over `[window_start, window_end]`.
pub fn forecast_for_period(
    conn: &Connection,
    today: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<DailyBalance>> {
    if window_start > window_end {
        return Err(PlanError::invalid_range(window_start, window_end).into());
    }

    let mut series = Vec::new();

    if window_start <= today {
        let past_end = window_end.min(today);
        let mut running = match window_start.pred_opt() {
            Some(prev) => actual_balance(conn, prev)?,
            None => Decimal::ZERO,
        };
        let deltas = actual_deltas(conn, window_start, past_end)?;
        let mut day = window_start;
        while day <= past_end {
            if let Some(delta) = deltas.get(&day) {
                running += *delta;
            }
            series.push(DailyBalance {
                date: day,
                actual: running,
                forecast: running,
            });
            day += Duration::days(1);
        }
    }

    if window_end > today {
        let today_balance = actual_balance(conn, today)?;
        // Accumulate from the day after today even when the window
        // starts later, so the series agrees with forecast_balance.
        let future_start = today + Duration::days(1);
        let deltas = future_deltas(conn, future_start, window_end)?;
        let mut running = today_balance;
        let mut day = future_start;
        while day <= window_end {
            if let Some(delta) = deltas.get(&day) {
                running += *delta;
            }
            if day >= window_start {
                series.push(DailyBalance {
                    date: day,
                    actual: today_balance,
                    forecast: running,
                });
            }
            day += Duration::days(1);
        }
    }

    Ok(series)
}

/// Dates in the window whose forecast balance is strictly negative.
pub fn detect_cash_gaps(
    conn: &Connection,
    today: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let series = forecast_for_period(conn, today, window_start, window_end)?;
    Ok(series
        .into_iter()
        .filter(|p| p.forecast < Decimal::ZERO)
        .map(|p| p.date)
        .collect())
}

/// Signed per-day sums of recorded transactions inside the window.
fn actual_deltas(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeMap<NaiveDate, Decimal>> {
    let mut stmt =
        conn.prepare("SELECT date, amount, kind FROM transactions WHERE date>=?1 AND date<=?2")?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    let mut deltas: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let date_s: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let kind_s: String = r.get(2)?;
        let date = parse_date(&date_s)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        let kind: TxKind = kind_s.parse()?;
        *deltas.entry(date).or_default() += kind.signed(amount);
    }
    Ok(deltas)
}

/// Net per-day outlook over the window: planned-transaction occurrences
/// at the template's current amount, minus scheduled (pending/overdue)
/// loan payments, minus active pending payments with a planned date.
fn future_deltas(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeMap<NaiveDate, Decimal>> {
    let mut deltas: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for template in active_templates(conn)? {
        let rule = rule_for_template(conn, template.id)?;
        for date in generator::generate(&template, rule.as_ref(), from, to)? {
            *deltas.entry(date).or_default() += template.kind.signed(template.amount);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT scheduled_date, total_amount FROM loan_payments
         WHERE status IN ('pending','overdue') AND scheduled_date>=?1 AND scheduled_date<=?2",
    )?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    while let Some(r) = rows.next()? {
        let date_s: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let date = parse_date(&date_s)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in loan_payments", amount_s))?;
        *deltas.entry(date).or_default() -= amount;
    }

    let mut stmt = conn.prepare(
        "SELECT planned_date, amount FROM pending_payments
         WHERE status='active' AND planned_date IS NOT NULL
           AND planned_date>=?1 AND planned_date<=?2",
    )?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    while let Some(r) = rows.next()? {
        let date_s: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let date = parse_date(&date_s)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in pending_payments", amount_s))?;
        *deltas.entry(date).or_default() -= amount;
    }

    Ok(deltas)
}
