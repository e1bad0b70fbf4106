//! Embedded database migrations.
//!
//! Each migration is compiled in with `include_str!` and tracked in the
//! `_atrium_migrations` table, so re-running is a no-op.

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250115000001_create_companies_table",
        include_str!("../../migrations/20250115000001_create_companies_table.sql"),
    ),
    (
        "20250115000002_create_users_table",
        include_str!("../../migrations/20250115000002_create_users_table.sql"),
    ),
    (
        "20250115000003_create_sessions_table",
        include_str!("../../migrations/20250115000003_create_sessions_table.sql"),
    ),
    (
        "20250115000004_create_customers_table",
        include_str!("../../migrations/20250115000004_create_customers_table.sql"),
    ),
    (
        "20250115000005_create_deals_table",
        include_str!("../../migrations/20250115000005_create_deals_table.sql"),
    ),
    (
        "20250115000006_create_quotes_table",
        include_str!("../../migrations/20250115000006_create_quotes_table.sql"),
    ),
    (
        "20250115000007_create_invoices_table",
        include_str!("../../migrations/20250115000007_create_invoices_table.sql"),
    ),
    (
        "20250115000008_create_shipments_table",
        include_str!("../../migrations/20250115000008_create_shipments_table.sql"),
    ),
    (
        "20250115000009_create_tasks_table",
        include_str!("../../migrations/20250115000009_create_tasks_table.sql"),
    ),
    (
        "20250115000010_create_tickets_table",
        include_str!("../../migrations/20250115000010_create_tickets_table.sql"),
    ),
    (
        "20250115000011_create_vendors_table",
        include_str!("../../migrations/20250115000011_create_vendors_table.sql"),
    ),
    (
        "20250115000012_create_approvals_table",
        include_str!("../../migrations/20250115000012_create_approvals_table.sql"),
    ),
    (
        "20250115000013_create_notifications_table",
        include_str!("../../migrations/20250115000013_create_notifications_table.sql"),
    ),
    (
        "20250115000014_create_activity_log_table",
        include_str!("../../migrations/20250115000014_create_activity_log_table.sql"),
    ),
    (
        "20250115000015_create_report_cache_table",
        include_str!("../../migrations/20250115000015_create_report_cache_table.sql"),
    ),
    (
        "20250115000016_create_login_attempts_table",
        include_str!("../../migrations/20250115000016_create_login_attempts_table.sql"),
    ),
];

/// Runs all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _atrium_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _atrium_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            // SQLite executes one statement at a time; statements are split
            // on semicolons, so the bundled migrations avoid semicolons in
            // string literals.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            sqlx::query("INSERT INTO _atrium_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}
