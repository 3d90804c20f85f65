//! Exercise catalog, workout/exercise association and set models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use super::{timestamp_column, Weight};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Exercise {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for WorkoutExercise {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            workout_id: row.try_get("workout_id")?,
            exercise_id: row.try_get("exercise_id")?,
            order: row.try_get("order")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub set_number: i64,
    pub reps: i64,
    pub weight: Weight,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for WorkoutSet {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let hundredths: i64 = row.try_get("weight")?;
        let weight = Weight::from_hundredths(hundredths).map_err(|e| sqlx::Error::ColumnDecode {
            index: "weight".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            workout_exercise_id: row.try_get("workout_exercise_id")?,
            set_number: row.try_get("set_number")?,
            reps: row.try_get("reps")?,
            weight,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}
