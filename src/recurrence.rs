// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::PlanError;
use crate::models::{IntervalUnit, RecurrenceRule, RecurrenceType};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Compute the next occurrence date after `current` under `rule`.
/// `anchor` is the owning template's start date; yearly stepping pins
/// month and day-of-year to it. Pure and deterministic.
pub fn next_date(
    current: NaiveDate,
    rule: &RecurrenceRule,
    anchor: NaiveDate,
) -> Result<NaiveDate, PlanError> {
    let interval = i64::from(rule.interval);
    let mut next = match rule.recurrence_type {
        RecurrenceType::Daily => current + Duration::days(interval),
        RecurrenceType::Weekly => current + Duration::weeks(interval),
        RecurrenceType::Monthly => add_months_clamped(current, rule.interval),
        RecurrenceType::Yearly => add_years_anchored(current, rule.interval, anchor),
        RecurrenceType::Custom => match rule.interval_unit {
            Some(IntervalUnit::Days) => current + Duration::days(interval),
            Some(IntervalUnit::Weeks) => match rule.weekdays.as_deref() {
                Some(days) if !days.is_empty() => step_weekday_set(current, rule.interval, days),
                _ => current + Duration::weeks(interval),
            },
            Some(IntervalUnit::Months) => add_months_clamped(current, rule.interval),
            Some(IntervalUnit::Years) => add_years_anchored(current, rule.interval, anchor),
            None => {
                return Err(PlanError::UnsupportedRecurrenceKind(
                    "custom rule without interval unit".to_string(),
                ));
            }
        },
        // The generator resolves one-shot templates itself; a NONE rule
        // reaching the sequencer is a caller bug.
        RecurrenceType::None => {
            return Err(PlanError::UnsupportedRecurrenceKind("none".to_string()));
        }
    };
    if rule.only_workdays {
        while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
            next += Duration::days(1);
        }
    }
    Ok(next)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Step `months` forward, clamping the day to the target month's length
/// (Jan 31 + 1 month lands on Feb 28/29 and stays clamped afterwards).
fn add_months_clamped(current: NaiveDate, months: u32) -> NaiveDate {
    let total = current.year() * 12 + current.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = current.day().min(days_in_month(year, month));
    // day >= 1 and within the month's length by construction
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(current)
}

/// Step `years` forward; month and day come from the anchor, with the
/// day clamped for Feb 29 anchors landing on non-leap years.
fn add_years_anchored(current: NaiveDate, years: u32, anchor: NaiveDate) -> NaiveDate {
    let year = current.year() + years as i32;
    let month = anchor.month();
    let day = anchor.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(current)
}

/// Custom weekly stepping over an explicit ascending weekday set
/// (0=Monday..6=Sunday). Within the current week, jump to the next set
/// member after today's weekday; otherwise wrap with the preserved
/// arithmetic `7*interval - current_weekday + weekdays[0]`.
fn step_weekday_set(current: NaiveDate, interval: u32, weekdays: &[u8]) -> NaiveDate {
    let cw = current.weekday().num_days_from_monday() as i64;
    if let Some(&wd) = weekdays.iter().find(|&&d| i64::from(d) > cw) {
        current + Duration::days(i64::from(wd) - cw)
    } else {
        current + Duration::days(7 * i64::from(interval) - cw + i64::from(weekdays[0]))
    }
}
