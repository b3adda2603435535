// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::errors::PlanError;
use cashplan::generator::generate;
use cashplan::models::{
    EndCondition, PlannedTransaction, RecurrenceRule, RecurrenceType, TxKind,
};
use chrono::{NaiveDate, Weekday};
use chrono::Datelike;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn template(start: &str) -> PlannedTransaction {
    PlannedTransaction {
        id: 1,
        amount: Decimal::new(100, 0),
        category_id: None,
        description: None,
        kind: TxKind::Expense,
        start_date: d(start),
        end_date: None,
        is_active: true,
    }
}

fn rule(rtype: RecurrenceType, interval: u32) -> RecurrenceRule {
    RecurrenceRule {
        id: 1,
        planned_transaction_id: 1,
        recurrence_type: rtype,
        interval,
        interval_unit: None,
        weekdays: None,
        only_workdays: false,
        end_condition: EndCondition::Never,
        end_date: None,
        occurrences_count: None,
    }
}

#[test]
fn monthly_over_window() {
    let t = template("2025-01-01");
    let r = rule(RecurrenceType::Monthly, 1);
    let dates = generate(&t, Some(&r), d("2025-01-01"), d("2025-04-01")).unwrap();
    assert_eq!(
        dates,
        vec![d("2025-01-01"), d("2025-02-01"), d("2025-03-01"), d("2025-04-01")]
    );
}

#[test]
fn invalid_range_is_rejected() {
    let t = template("2025-01-01");
    let err = generate(&t, None, d("2025-02-01"), d("2025-01-01")).unwrap_err();
    assert!(matches!(err, PlanError::InvalidRange { .. }));
}

#[test]
fn nothing_before_template_start() {
    let t = template("2025-06-15");
    let r = rule(RecurrenceType::Daily, 1);
    assert!(generate(&t, Some(&r), d("2025-01-01"), d("2025-06-14")).unwrap().is_empty());

    let dates = generate(&t, Some(&r), d("2025-06-01"), d("2025-06-17")).unwrap();
    assert_eq!(dates, vec![d("2025-06-15"), d("2025-06-16"), d("2025-06-17")]);
    assert!(dates.iter().all(|&x| x >= t.start_date));
}

#[test]
fn one_shot_without_rule() {
    let t = template("2025-03-10");
    assert_eq!(
        generate(&t, None, d("2025-03-01"), d("2025-03-31")).unwrap(),
        vec![d("2025-03-10")]
    );
    assert!(generate(&t, None, d("2025-04-01"), d("2025-04-30")).unwrap().is_empty());
}

#[test]
fn none_rule_is_one_shot() {
    let t = template("2025-03-10");
    let r = rule(RecurrenceType::None, 1);
    assert_eq!(
        generate(&t, Some(&r), d("2025-03-01"), d("2025-03-31")).unwrap(),
        vec![d("2025-03-10")]
    );
}

#[test]
fn until_date_short_circuits_and_stops() {
    let t = template("2025-01-01");
    let mut r = rule(RecurrenceType::Weekly, 1);
    r.end_condition = EndCondition::UntilDate;
    r.end_date = Some(d("2025-01-20"));

    // Window entirely past the rule's end date.
    assert!(generate(&t, Some(&r), d("2025-02-01"), d("2025-03-01")).unwrap().is_empty());

    let dates = generate(&t, Some(&r), d("2025-01-01"), d("2025-03-01")).unwrap();
    assert_eq!(
        dates,
        vec![d("2025-01-01"), d("2025-01-08"), d("2025-01-15")]
    );
}

#[test]
fn after_count_budget_spans_windows() {
    let t = template("2025-01-01");
    let mut r = rule(RecurrenceType::Monthly, 1);
    r.end_condition = EndCondition::AfterCount;
    r.occurrences_count = Some(5);

    // Unbounded-ish window: exactly five dates ever.
    let all = generate(&t, Some(&r), d("2025-01-01"), d("2026-12-31")).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(*all.last().unwrap(), d("2025-05-01"));

    // Split across two windows: the early occurrences consume budget even
    // when the first window is never requested.
    let late = generate(&t, Some(&r), d("2025-03-01"), d("2026-12-31")).unwrap();
    assert_eq!(late, vec![d("2025-03-01"), d("2025-04-01"), d("2025-05-01")]);
}

#[test]
fn template_end_date_is_an_extra_ceiling() {
    let mut t = template("2025-01-01");
    t.end_date = Some(d("2025-02-15"));
    let r = rule(RecurrenceType::Monthly, 1);
    let dates = generate(&t, Some(&r), d("2025-01-01"), d("2025-12-31")).unwrap();
    assert_eq!(dates, vec![d("2025-01-01"), d("2025-02-01")]);
}

#[test]
fn stricter_of_rule_end_and_template_end_wins() {
    let mut t = template("2025-01-01");
    t.end_date = Some(d("2025-06-30"));
    let mut r = rule(RecurrenceType::Monthly, 1);
    r.end_condition = EndCondition::UntilDate;
    r.end_date = Some(d("2025-03-15"));
    let dates = generate(&t, Some(&r), d("2025-01-01"), d("2025-12-31")).unwrap();
    assert_eq!(dates, vec![d("2025-01-01"), d("2025-02-01"), d("2025-03-01")]);
}

#[test]
fn ascending_and_duplicate_free() {
    let t = template("2025-01-01");
    let r = rule(RecurrenceType::Daily, 3);
    let dates = generate(&t, Some(&r), d("2025-01-01"), d("2025-03-01")).unwrap();
    for pair in dates.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn workday_only_output_never_on_weekends() {
    let t = template("2025-01-10"); // Friday
    let mut r = rule(RecurrenceType::Daily, 1);
    r.only_workdays = true;
    let dates = generate(&t, Some(&r), d("2025-01-10"), d("2025-01-31")).unwrap();
    assert_eq!(dates[0], d("2025-01-10"));
    assert_eq!(dates[1], d("2025-01-13")); // following Monday
    for x in &dates[1..] {
        assert!(!matches!(x.weekday(), Weekday::Sat | Weekday::Sun));
    }
}
