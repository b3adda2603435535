// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::PlanError;
use crate::models::{EndCondition, PlannedTransaction, RecurrenceRule, RecurrenceType};
use crate::recurrence;
use chrono::NaiveDate;
use tracing::warn;

/// All occurrence dates of `template` falling inside
/// `[window_start, window_end]`, ascending and duplicate-free.
///
/// Iteration always starts from the template's start date, so an
/// AFTER_COUNT budget is consumed by occurrences before the window too.
/// The template's own end date is an additional ceiling on top of the
/// rule's end condition; whichever is stricter wins.
pub fn generate(
    template: &PlannedTransaction,
    rule: Option<&RecurrenceRule>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<NaiveDate>, PlanError> {
    if window_start > window_end {
        return Err(PlanError::invalid_range(window_start, window_end));
    }
    if window_end < template.start_date {
        return Ok(Vec::new());
    }

    let ceiling = match template.end_date {
        Some(te) => window_end.min(te),
        None => window_end,
    };
    if ceiling < template.start_date {
        return Ok(Vec::new());
    }

    let rule = match rule {
        Some(r) if r.recurrence_type != RecurrenceType::None => r,
        // No rule: a one-shot occurrence at the template's start date.
        _ => {
            let d = template.start_date;
            if d >= window_start && d <= ceiling {
                return Ok(vec![d]);
            }
            return Ok(Vec::new());
        }
    };

    if rule.end_condition == EndCondition::UntilDate {
        if let Some(rule_end) = rule.end_date {
            if window_start > rule_end {
                return Ok(Vec::new());
            }
        }
    }

    let mut result = Vec::new();
    let mut current = template.start_date;
    let mut count: u32 = 0;

    while current <= ceiling {
        match rule.end_condition {
            EndCondition::UntilDate => {
                if let Some(rule_end) = rule.end_date {
                    if current > rule_end {
                        break;
                    }
                }
            }
            EndCondition::AfterCount => {
                if let Some(n) = rule.occurrences_count {
                    if count >= n {
                        break;
                    }
                }
            }
            EndCondition::Never => {}
        }

        if current >= window_start {
            result.push(current);
        }
        count += 1;

        let next = recurrence::next_date(current, rule, template.start_date)?;
        if next <= current {
            // Guard against a malformed rule looping forever.
            warn!(
                plan = template.id,
                %current,
                %next,
                "recurrence did not advance, stopping generation"
            );
            break;
        }
        current = next;
    }

    Ok(result)
}
