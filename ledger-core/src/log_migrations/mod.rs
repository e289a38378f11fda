//! Event log migrations - embedded SQL files
//!
//! Applied to `logs.duckdb`, which is kept apart from the ledger database so
//! that logging can never contend with balance updates.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
