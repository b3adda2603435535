// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the planning core. Persistence-level failures
/// (I/O, SQL) travel separately through `anyhow`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unsupported recurrence kind: {0}")]
    UnsupportedRecurrenceKind(String),

    #[error("planned transaction {0} not found")]
    TemplateNotFound(i64),

    #[error("occurrence {0} not found")]
    OccurrenceNotFound(i64),

    #[error("occurrence {id} is already {status}")]
    OccurrenceAlreadyFinalized { id: i64, status: String },

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}

impl PlanError {
    pub fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        PlanError::InvalidRange { start, end }
    }
}
