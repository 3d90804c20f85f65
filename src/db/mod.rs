mod models;
mod seeders;

pub mod exercises;
pub mod workouts;

pub use models::*;
pub use seeders::{seed_exercises, DEFAULT_EXERCISES};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub type DbPool = SqlitePool;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_initial",
    sql: include_str!("../../migrations/001_initial.sql"),
}];

/// Execute a SQL migration file statement by statement.
///
/// Comment lines are dropped before splitting on `;`, so a comment may contain one.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("liftlog.db");
    info!("Initializing database at {}", db_path.display());

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    prepare(&pool).await?;
    info!("Database initialized successfully");
    Ok(pool)
}

/// Single-connection in-memory database, used by tests and `--in-memory` runs.
pub async fn init_in_memory() -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    // Every new connection would see a fresh empty database, so keep exactly one alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    prepare(&pool).await?;
    Ok(pool)
}

async fn prepare(pool: &SqlitePool) -> Result<()> {
    run_migrations(pool).await?;
    seeders::seed_exercises(pool).await?;
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .execute(pool)
    .await?;

    for migration in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(migration.name)
            .fetch_optional(pool)
            .await?;
        if applied.is_some() {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        execute_sql(pool, migration.sql)
            .await
            .with_context(|| format!("Failed to apply migration {}", migration.name))?;

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(migration.name)
            .execute(pool)
            .await?;
    }

    info!("Migrations completed");
    Ok(())
}
