// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::errors::PlanError;
use cashplan::forecast::{actual_balance, detect_cash_gaps, forecast_balance, forecast_for_period};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    cashplan::db::open_in_memory().unwrap()
}

fn add_tx(conn: &Connection, date: &str, amount: &str, kind: &str) {
    conn.execute(
        "INSERT INTO transactions(date, amount, kind) VALUES (?1, ?2, ?3)",
        params![date, amount, kind],
    )
    .unwrap();
}

fn add_plan(conn: &Connection, amount: &str, kind: &str, start: &str) -> i64 {
    conn.execute(
        "INSERT INTO planned_transactions(amount, kind, start_date) VALUES (?1, ?2, ?3)",
        params![amount, kind, start],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn add_monthly_rule(conn: &Connection, plan_id: i64) {
    conn.execute(
        "INSERT INTO recurrence_rules(planned_transaction_id, recurrence_type, interval, end_condition)
         VALUES (?1, 'monthly', 1, 'never')",
        params![plan_id],
    )
    .unwrap();
}

#[test]
fn actual_balance_signs_by_kind() {
    let conn = setup();
    add_tx(&conn, "2025-01-05", "1000", "income");
    add_tx(&conn, "2025-01-10", "300", "expense");
    add_tx(&conn, "2025-02-01", "50", "expense");

    assert_eq!(actual_balance(&conn, d("2025-01-04")).unwrap(), dec("0"));
    assert_eq!(actual_balance(&conn, d("2025-01-10")).unwrap(), dec("700"));
    assert_eq!(actual_balance(&conn, d("2025-02-28")).unwrap(), dec("650"));
}

#[test]
fn empty_plan_forecast_equals_actual() {
    let conn = setup();
    add_tx(&conn, "2025-01-05", "1000", "income");
    let today = d("2025-01-15");
    for target in ["2025-02-01", "2025-06-30", "2026-01-15"] {
        assert_eq!(
            forecast_balance(&conn, today, d(target)).unwrap(),
            actual_balance(&conn, today).unwrap()
        );
    }
}

#[test]
fn forecast_at_or_before_today_is_actual() {
    let conn = setup();
    add_tx(&conn, "2025-01-05", "1000", "income");
    add_tx(&conn, "2025-01-10", "300", "expense");
    let today = d("2025-01-15");
    assert_eq!(forecast_balance(&conn, today, d("2025-01-07")).unwrap(), dec("1000"));
    assert_eq!(forecast_balance(&conn, today, today).unwrap(), dec("700"));
}

#[test]
fn forecast_applies_plans_loans_and_pending() {
    let conn = setup();
    add_tx(&conn, "2025-01-01", "500", "income");

    let salary = add_plan(&conn, "1000", "income", "2025-01-15");
    add_monthly_rule(&conn, salary);

    conn.execute("INSERT INTO lenders(name) VALUES ('Bank')", []).unwrap();
    conn.execute(
        "INSERT INTO loans(lender_id, principal, opened_date) VALUES (1, '5000', '2024-06-01')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO loan_payments(loan_id, scheduled_date, total_amount, status)
         VALUES (1, '2025-01-20', '200', 'pending'),
                (1, '2025-01-22', '75', 'overdue'),
                (1, '2025-01-25', '999', 'paid')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO pending_payments(description, amount, planned_date, status)
         VALUES ('car repair', '150', '2025-01-28', 'active'),
                ('cancelled thing', '400', '2025-01-29', 'cancelled'),
                ('no date yet', '123', NULL, 'active')",
        [],
    )
    .unwrap();

    let today = d("2025-01-10");
    // 500 + 1000 (salary 15th) - 200 - 75 - 150; paid/cancelled/undated ignored.
    assert_eq!(
        forecast_balance(&conn, today, d("2025-01-31")).unwrap(),
        dec("1075")
    );
}

#[test]
fn forecast_uses_live_template_amount_not_snapshot() {
    let mut conn = setup();
    let plan = add_plan(&conn, "100", "income", "2025-01-15");
    add_monthly_rule(&conn, plan);
    cashplan::materializer::ensure_for_period(&mut conn, d("2025-01-01"), d("2025-02-28")).unwrap();

    conn.execute(
        "UPDATE planned_transactions SET amount='150' WHERE id=?1",
        params![plan],
    )
    .unwrap();

    let today = d("2025-01-01");
    // Two occurrences at the live amount.
    assert_eq!(
        forecast_balance(&conn, today, d("2025-02-28")).unwrap(),
        dec("300")
    );
    // The persisted snapshot keeps the generation-time amount.
    let snap: String = conn
        .query_row(
            "SELECT amount FROM occurrences WHERE planned_transaction_id=?1 ORDER BY occurrence_date LIMIT 1",
            params![plan],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(snap, "100");
}

#[test]
fn period_series_is_continuous_at_today() {
    let conn = setup();
    add_tx(&conn, "2025-01-05", "1000", "income");
    add_tx(&conn, "2025-01-12", "300", "expense");
    let plan = add_plan(&conn, "50", "expense", "2025-01-16");
    add_monthly_rule(&conn, plan);

    let today = d("2025-01-14");
    let series = forecast_for_period(&conn, today, d("2025-01-01"), d("2025-01-20")).unwrap();
    assert_eq!(series.len(), 20);

    for point in &series {
        if point.date <= today {
            assert_eq!(point.actual, point.forecast, "diverged at {}", point.date);
            assert_eq!(point.actual, actual_balance(&conn, point.date).unwrap());
        } else {
            assert_eq!(point.actual, actual_balance(&conn, today).unwrap());
            assert_eq!(
                point.forecast,
                forecast_balance(&conn, today, point.date).unwrap()
            );
        }
    }

    // 1000 - 300 = 700 up to the 15th, then the 50 expense on the 16th.
    assert_eq!(series[14].forecast, dec("700"));
    assert_eq!(series[15].forecast, dec("650"));
}

#[test]
fn period_window_starting_after_today_matches_forecast_balance() {
    let conn = setup();
    add_tx(&conn, "2025-01-05", "1000", "income");
    let plan = add_plan(&conn, "200", "expense", "2025-01-20");
    add_monthly_rule(&conn, plan);

    let today = d("2025-01-10");
    let series = forecast_for_period(&conn, today, d("2025-01-25"), d("2025-01-31")).unwrap();
    assert_eq!(series[0].date, d("2025-01-25"));
    // The 200 expense on the 20th is already reflected even though it
    // falls before the window.
    assert_eq!(series[0].forecast, dec("800"));
    assert_eq!(series[0].actual, dec("1000"));
}

#[test]
fn cash_gaps_are_negative_forecast_dates() {
    let conn = setup();
    add_tx(&conn, "2025-01-01", "100", "income");
    let rent = add_plan(&conn, "500", "expense", "2025-01-10");
    add_monthly_rule(&conn, rent);
    let salary = add_plan(&conn, "1000", "income", "2025-01-15");
    add_monthly_rule(&conn, salary);

    let today = d("2025-01-05");
    let gaps = detect_cash_gaps(&conn, today, d("2025-01-01"), d("2025-01-31")).unwrap();
    // Negative from the rent on the 10th until the salary on the 15th.
    assert_eq!(
        gaps,
        vec![
            d("2025-01-10"),
            d("2025-01-11"),
            d("2025-01-12"),
            d("2025-01-13"),
            d("2025-01-14")
        ]
    );
}

#[test]
fn period_rejects_inverted_window() {
    let conn = setup();
    let err = forecast_for_period(&conn, d("2025-01-10"), d("2025-02-01"), d("2025-01-01"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlanError>(),
        Some(PlanError::InvalidRange { .. })
    ));
}
