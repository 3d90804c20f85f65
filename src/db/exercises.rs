//! Exercise catalog and the per-workout exercise/set writes.

use tracing::debug;

use super::models::{Exercise, Weight, WorkoutExercise, WorkoutSet};
use super::DbPool;

pub async fn list_exercises(db: &DbPool) -> Result<Vec<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(db)
        .await
}

/// Catalog entry with this name (case-insensitive), created if missing.
pub async fn get_or_create_exercise(db: &DbPool, name: &str) -> Result<Exercise, sqlx::Error> {
    let result = sqlx::query("INSERT INTO exercises (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(db)
        .await?;
    if result.rows_affected() > 0 {
        debug!(name, "Added exercise to catalog");
    }

    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE name = ?")
        .bind(name)
        .fetch_one(db)
        .await
}

/// Append an exercise to the end of the user's workout.
///
/// Returns `None` when the workout does not exist or belongs to someone else.
pub async fn add_exercise_to_workout(
    db: &DbPool,
    user_id: &str,
    workout_id: i64,
    exercise_id: i64,
) -> Result<Option<WorkoutExercise>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutExercise>(
        r#"
        INSERT INTO workout_exercises (workout_id, exercise_id, "order")
        SELECT w.id, ?,
               COALESCE((SELECT MAX("order") FROM workout_exercises WHERE workout_id = w.id), 0) + 1
        FROM workouts w
        WHERE w.id = ? AND w.user_id = ?
        RETURNING *
        "#,
    )
    .bind(exercise_id)
    .bind(workout_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Log the next set of a workout exercise.
///
/// Returns `None` unless `workout_exercise_id` belongs to `workout_id` and the
/// workout belongs to the user.
pub async fn add_set(
    db: &DbPool,
    user_id: &str,
    workout_id: i64,
    workout_exercise_id: i64,
    reps: i64,
    weight: Weight,
) -> Result<Option<WorkoutSet>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutSet>(
        r#"
        INSERT INTO sets (workout_exercise_id, set_number, reps, weight)
        SELECT we.id,
               COALESCE((SELECT MAX(set_number) FROM sets WHERE workout_exercise_id = we.id), 0) + 1,
               ?, ?
        FROM workout_exercises we
        INNER JOIN workouts w ON w.id = we.workout_id
        WHERE we.id = ? AND we.workout_id = ? AND w.user_id = ?
        RETURNING *
        "#,
    )
    .bind(reps)
    .bind(weight.hundredths())
    .bind(workout_exercise_id)
    .bind(workout_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}
