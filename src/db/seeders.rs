//! Built-in exercise catalog, inserted on every startup.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

pub const DEFAULT_EXERCISES: &[&str] = &[
    "Bench Press",
    "Incline Bench Press",
    "Overhead Press",
    "Squat",
    "Front Squat",
    "Deadlift",
    "Romanian Deadlift",
    "Barbell Row",
    "Pull Up",
    "Chin Up",
    "Dip",
    "Lunge",
    "Leg Press",
    "Hip Thrust",
    "Bicep Curl",
    "Tricep Extension",
    "Lateral Raise",
    "Calf Raise",
];

/// Insert any missing catalog entries; existing rows are left alone
pub async fn seed_exercises(pool: &SqlitePool) -> Result<()> {
    let mut inserted = 0u64;
    for name in DEFAULT_EXERCISES {
        let result = sqlx::query("INSERT OR IGNORE INTO exercises (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
        inserted += result.rows_affected();
    }

    if inserted > 0 {
        info!("Seeded {} exercises", inserted);
    } else {
        debug!("Exercise catalog already seeded");
    }
    Ok(())
}
