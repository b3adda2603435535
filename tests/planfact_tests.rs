// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::errors::PlanError;
use cashplan::materializer::get_or_create;
use cashplan::models::{OccurrenceStatus, TxKind};
use cashplan::planfact::{execute, skip};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Plan with a pending occurrence on 2025-03-10 for 1000.
fn setup() -> (Connection, i64) {
    let conn = cashplan::db::open_in_memory().unwrap();
    conn.execute("INSERT INTO categories(name) VALUES ('Rent')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO planned_transactions(amount, category_id, description, kind, start_date)
         VALUES ('1000', 1, 'Monthly rent', 'expense', '2025-03-10')",
        [],
    )
    .unwrap();
    let plan = conn.last_insert_rowid();
    let occ = get_or_create(&conn, plan, d("2025-03-10")).unwrap();
    (conn, occ.id)
}

fn transaction_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn execute_links_transaction_and_tracks_deviations() {
    let (mut conn, occ_id) = setup();

    let (actual, occ) = execute(&mut conn, occ_id, dec("1200"), d("2025-03-12"), None, None).unwrap();

    assert_eq!(occ.status, OccurrenceStatus::Executed);
    assert_eq!(occ.actual_transaction_id, Some(actual.id));
    assert_eq!(occ.executed_amount, Some(dec("1200")));
    assert_eq!(occ.executed_date, Some(d("2025-03-12")));
    assert_eq!(occ.amount_deviation(), Some(dec("200")));
    assert_eq!(occ.date_deviation(), Some(2));

    // Kind, category, and description are inherited from the template.
    assert_eq!(actual.kind, TxKind::Expense);
    assert_eq!(actual.category_id, Some(1));
    assert_eq!(actual.description.as_deref(), Some("Monthly rent"));
    assert_eq!(actual.occurrence_id, Some(occ_id));
    assert_eq!(actual.date, d("2025-03-12"));
}

#[test]
fn execute_is_terminal() {
    let (mut conn, occ_id) = setup();
    execute(&mut conn, occ_id, dec("1200"), d("2025-03-12"), None, None).unwrap();
    let txs_before = transaction_count(&conn);

    let err = execute(&mut conn, occ_id, dec("900"), d("2025-03-13"), None, None).unwrap_err();
    match err.downcast_ref::<PlanError>() {
        Some(PlanError::OccurrenceAlreadyFinalized { id, status }) => {
            assert_eq!(*id, occ_id);
            assert_eq!(status, "executed");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The refused call left everything untouched.
    assert_eq!(transaction_count(&conn), txs_before);
    let occ = cashplan::utils::get_occurrence(&conn, occ_id).unwrap().unwrap();
    assert_eq!(occ.executed_amount, Some(dec("1200")));
    assert_eq!(occ.executed_date, Some(d("2025-03-12")));

    // Skipping an executed occurrence is refused too.
    let err = skip(&mut conn, occ_id, Some("late")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlanError>(),
        Some(PlanError::OccurrenceAlreadyFinalized { .. })
    ));
}

#[test]
fn skip_is_terminal_and_records_reason() {
    let (mut conn, occ_id) = setup();
    let occ = skip(&mut conn, occ_id, Some("paid in cash")).unwrap();
    assert_eq!(occ.status, OccurrenceStatus::Skipped);
    assert_eq!(occ.skip_reason.as_deref(), Some("paid in cash"));
    assert_eq!(occ.amount_deviation(), None);
    assert_eq!(occ.date_deviation(), None);

    let err = execute(&mut conn, occ_id, dec("1000"), d("2025-03-10"), None, None).unwrap_err();
    match err.downcast_ref::<PlanError>() {
        Some(PlanError::OccurrenceAlreadyFinalized { status, .. }) => {
            assert_eq!(status, "skipped");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn skip_reason_is_optional() {
    let (mut conn, occ_id) = setup();
    let occ = skip(&mut conn, occ_id, None).unwrap();
    assert_eq!(occ.status, OccurrenceStatus::Skipped);
    assert_eq!(occ.skip_reason, None);
}

#[test]
fn execute_rejects_non_positive_amount() {
    let (mut conn, occ_id) = setup();
    for bad in ["0", "-25"] {
        let err = execute(&mut conn, occ_id, dec(bad), d("2025-03-12"), None, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::InvalidAmount(_))
        ));
    }
    assert_eq!(transaction_count(&conn), 0);
    let occ = cashplan::utils::get_occurrence(&conn, occ_id).unwrap().unwrap();
    assert_eq!(occ.status, OccurrenceStatus::Pending);
}

#[test]
fn execute_unknown_occurrence() {
    let (mut conn, _) = setup();
    let err = execute(&mut conn, 4242, dec("10"), d("2025-03-12"), None, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlanError>(),
        Some(PlanError::OccurrenceNotFound(4242))
    ));
}

#[test]
fn execute_applies_overrides() {
    let (mut conn, occ_id) = setup();
    conn.execute("INSERT INTO categories(name) VALUES ('Housing')", [])
        .unwrap();
    let (actual, _) = execute(
        &mut conn,
        occ_id,
        dec("1000"),
        d("2025-03-10"),
        Some(2),
        Some("March rent, new landlord"),
    )
    .unwrap();
    assert_eq!(actual.category_id, Some(2));
    assert_eq!(actual.description.as_deref(), Some("March rent, new landlord"));
}
