//! Workout repository.
//!
//! Every function takes the owning user id and folds it into the SQL predicate
//! of the statement that reads or writes the row. A workout owned by someone
//! else is indistinguishable from one that does not exist.

use chrono::{Datelike, NaiveDate, TimeZone};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

use super::models::{
    format_timestamp, ExerciseWithSets, MAX_STORED_YEAR, NewWorkout, SetSummary, UpdateWorkout, Workout,
    WorkoutSet, WorkoutWithExercises,
};
use super::DbPool;
use crate::utils::dates::day_bounds;

pub async fn create_workout(
    db: &DbPool,
    user_id: &str,
    data: &NewWorkout,
) -> Result<Workout, sqlx::Error> {
    sqlx::query_as::<_, Workout>(
        r#"
        INSERT INTO workouts (user_id, name, started_at, completed_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&data.name)
    .bind(format_timestamp(&data.started_at))
    .bind(data.completed_at.as_ref().map(format_timestamp))
    .fetch_one(db)
    .await
}

pub async fn get_workout_by_id(
    db: &DbPool,
    user_id: &str,
    workout_id: i64,
) -> Result<Option<Workout>, sqlx::Error> {
    sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ? AND user_id = ?")
        .bind(workout_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Returns `None` when no workout with this id belongs to the user.
pub async fn update_workout(
    db: &DbPool,
    user_id: &str,
    workout_id: i64,
    data: &UpdateWorkout,
) -> Result<Option<Workout>, sqlx::Error> {
    sqlx::query_as::<_, Workout>(
        r#"
        UPDATE workouts
        SET name = ?, started_at = ?, completed_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(format_timestamp(&data.started_at))
    .bind(data.completed_at.as_ref().map(format_timestamp))
    .bind(workout_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Workouts the user started on `date` (a calendar day in `tz`), each with its
/// exercises and sets. Runs in one transaction so the page sees a single snapshot.
pub async fn get_workouts_by_user_and_date<Tz: TimeZone>(
    db: &DbPool,
    user_id: &str,
    date: NaiveDate,
    tz: &Tz,
) -> Result<Vec<WorkoutWithExercises>, sqlx::Error> {
    let (start, end) = day_bounds(date, tz);
    if start.year() > MAX_STORED_YEAR || end.year() < 1 {
        return Ok(Vec::new());
    }
    // A bound outside the stored year range would not compare correctly as text; drop it
    let lower = (start.year() >= 1).then(|| format_timestamp(&start));
    let upper = (end.year() <= MAX_STORED_YEAR).then(|| format_timestamp(&end));

    let mut tx = db.begin().await?;

    let workouts = sqlx::query_as::<_, Workout>(
        r#"
        SELECT * FROM workouts
        WHERE user_id = ?1
          AND (?2 IS NULL OR started_at >= ?2)
          AND (?3 IS NULL OR started_at < ?3)
        ORDER BY started_at, id
        "#,
    )
    .bind(user_id)
    .bind(lower)
    .bind(upper)
    .fetch_all(&mut *tx)
    .await?;

    debug!(user_id, %date, count = workouts.len(), "Loaded workouts for day");

    let mut result = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let exercises = load_exercises(&mut *tx, workout.id).await?;
        result.push(WorkoutWithExercises::new(workout, exercises));
    }

    tx.commit().await?;
    Ok(result)
}

/// Single workout with its exercises and sets, for the editor
pub async fn get_workout_with_exercises(
    db: &DbPool,
    user_id: &str,
    workout_id: i64,
) -> Result<Option<WorkoutWithExercises>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let workout =
        sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ? AND user_id = ?")
            .bind(workout_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

    let result = match workout {
        Some(workout) => {
            let exercises = load_exercises(&mut *tx, workout.id).await?;
            Some(WorkoutWithExercises::new(workout, exercises))
        }
        None => None,
    };

    tx.commit().await?;
    Ok(result)
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    workout_exercise_id: i64,
    exercise_id: i64,
    exercise_name: String,
    order: i64,
}

async fn load_exercises(
    conn: &mut SqliteConnection,
    workout_id: i64,
) -> Result<Vec<ExerciseWithSets>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ExerciseRow>(
        r#"
        SELECT we.id AS workout_exercise_id,
               e.id AS exercise_id,
               e.name AS exercise_name,
               we."order" AS "order"
        FROM workout_exercises we
        INNER JOIN exercises e ON e.id = we.exercise_id
        WHERE we.workout_id = ?
        ORDER BY we."order"
        "#,
    )
    .bind(workout_id)
    .fetch_all(&mut *conn)
    .await?;

    let sets = sqlx::query_as::<_, WorkoutSet>(
        r#"
        SELECT s.* FROM sets s
        INNER JOIN workout_exercises we ON we.id = s.workout_exercise_id
        WHERE we.workout_id = ?
        ORDER BY s.workout_exercise_id, s.set_number
        "#,
    )
    .bind(workout_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut sets_by_exercise: HashMap<i64, Vec<SetSummary>> = HashMap::new();
    for set in sets {
        sets_by_exercise
            .entry(set.workout_exercise_id)
            .or_default()
            .push(SetSummary {
                set_number: set.set_number,
                reps: set.reps,
                weight: set.weight,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| ExerciseWithSets {
            id: row.exercise_id,
            workout_exercise_id: row.workout_exercise_id,
            name: row.exercise_name,
            order: row.order,
            sets: sets_by_exercise
                .remove(&row.workout_exercise_id)
                .unwrap_or_default(),
        })
        .collect())
}
