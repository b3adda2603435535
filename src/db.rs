// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("io.cashplan", "Cashplan", "cashplan"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cashplan.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// In-memory database with the full schema applied. Used by tests.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        amount TEXT NOT NULL, -- positive; sign derived from kind
        category_id INTEGER,
        description TEXT,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        occurrence_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS planned_transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        category_id INTEGER,
        description TEXT,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS recurrence_rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        planned_transaction_id INTEGER NOT NULL UNIQUE,
        recurrence_type TEXT NOT NULL
            CHECK(recurrence_type IN ('none','daily','weekly','monthly','yearly','custom')),
        interval INTEGER NOT NULL DEFAULT 1,
        interval_unit TEXT CHECK(interval_unit IN ('days','weeks','months','years')),
        weekdays TEXT, -- comma-separated 0=Mon..6=Sun
        only_workdays INTEGER NOT NULL DEFAULT 0,
        end_condition TEXT NOT NULL
            CHECK(end_condition IN ('never','until_date','after_count')),
        end_date TEXT,
        occurrences_count INTEGER,
        FOREIGN KEY(planned_transaction_id)
            REFERENCES planned_transactions(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS occurrences(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        planned_transaction_id INTEGER NOT NULL,
        occurrence_date TEXT NOT NULL,
        amount TEXT NOT NULL, -- snapshot of the template amount at generation
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK(status IN ('pending','executed','skipped')),
        actual_transaction_id INTEGER,
        executed_amount TEXT,
        executed_date TEXT,
        skip_reason TEXT,
        UNIQUE(planned_transaction_id, occurrence_date),
        FOREIGN KEY(planned_transaction_id)
            REFERENCES planned_transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(actual_transaction_id) REFERENCES transactions(id)
    );
    CREATE INDEX IF NOT EXISTS idx_occurrences_date ON occurrences(occurrence_date);

    CREATE TABLE IF NOT EXISTS lenders(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        lender_id INTEGER NOT NULL,
        description TEXT,
        principal TEXT NOT NULL,
        opened_date TEXT NOT NULL,
        FOREIGN KEY(lender_id) REFERENCES lenders(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS loan_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        loan_id INTEGER NOT NULL,
        scheduled_date TEXT NOT NULL,
        total_amount TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK(status IN ('pending','overdue','paid')),
        FOREIGN KEY(loan_id) REFERENCES loans(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_loan_payments_date ON loan_payments(scheduled_date);

    CREATE TABLE IF NOT EXISTS pending_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        planned_date TEXT,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK(status IN ('active','done','cancelled'))
    );
    "#,
    )?;
    Ok(())
}
