//! Write paths shared by the HTML forms and the JSON API.
//!
//! Each action checks identity first, then validates, then writes. The caller
//! decides how to present the outcome; only persistence failures are errors.

use chrono::TimeZone;
use tracing::info;

use crate::api::error::FieldErrors;
use crate::api::validation::{
    validate_exercise_form, validate_set_form, validate_workout_form, ExerciseForm, SetForm,
    WorkoutForm,
};
use crate::db::{self, DbPool, Workout, WorkoutExercise, WorkoutSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Saved(T),
    /// No identity on the request
    Unauthorized,
    ValidationFailed(FieldErrors),
    /// Missing, or owned by another user
    NotFound,
}

pub type WorkoutOutcome = Outcome<Workout>;
pub type ExerciseOutcome = Outcome<WorkoutExercise>;
pub type SetOutcome = Outcome<WorkoutSet>;

impl<T> Outcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Outcome::Saved(_))
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Outcome::Saved(v),
            None => Outcome::NotFound,
        }
    }
}

pub async fn create_workout<Tz: TimeZone>(
    db: &DbPool,
    user_id: Option<&str>,
    form: &WorkoutForm,
    tz: &Tz,
) -> Result<WorkoutOutcome, sqlx::Error> {
    let Some(user_id) = user_id else {
        return Ok(Outcome::Unauthorized);
    };

    let validated = match validate_workout_form(form, tz) {
        Ok(v) => v,
        Err(errors) => return Ok(Outcome::ValidationFailed(errors)),
    };

    let workout = db::workouts::create_workout(db, user_id, &validated.into()).await?;
    info!(user_id, workout_id = workout.id, "Created workout");
    Ok(Outcome::Saved(workout))
}

pub async fn update_workout<Tz: TimeZone>(
    db: &DbPool,
    user_id: Option<&str>,
    workout_id: i64,
    form: &WorkoutForm,
    tz: &Tz,
) -> Result<WorkoutOutcome, sqlx::Error> {
    let Some(user_id) = user_id else {
        return Ok(Outcome::Unauthorized);
    };

    let validated = match validate_workout_form(form, tz) {
        Ok(v) => v,
        Err(errors) => return Ok(Outcome::ValidationFailed(errors)),
    };

    let updated = db::workouts::update_workout(db, user_id, workout_id, &validated.into()).await?;
    if updated.is_some() {
        info!(user_id, workout_id, "Updated workout");
    }
    Ok(updated.into())
}

/// Attach an exercise (by catalog name, created on first use) to a workout.
pub async fn add_exercise(
    db: &DbPool,
    user_id: Option<&str>,
    workout_id: i64,
    form: &ExerciseForm,
) -> Result<ExerciseOutcome, sqlx::Error> {
    let Some(user_id) = user_id else {
        return Ok(Outcome::Unauthorized);
    };

    let name = match validate_exercise_form(form) {
        Ok(name) => name,
        Err(errors) => return Ok(Outcome::ValidationFailed(errors)),
    };

    // Keep other users from growing the catalog through workouts they don't own
    if db::workouts::get_workout_by_id(db, user_id, workout_id)
        .await?
        .is_none()
    {
        return Ok(Outcome::NotFound);
    }

    let exercise = db::exercises::get_or_create_exercise(db, &name).await?;
    let added =
        db::exercises::add_exercise_to_workout(db, user_id, workout_id, exercise.id).await?;
    if let Some(we) = &added {
        info!(user_id, workout_id, exercise = %exercise.name, order = we.order, "Added exercise to workout");
    }
    Ok(added.into())
}

pub async fn log_set(
    db: &DbPool,
    user_id: Option<&str>,
    workout_id: i64,
    workout_exercise_id: i64,
    form: &SetForm,
) -> Result<SetOutcome, sqlx::Error> {
    let Some(user_id) = user_id else {
        return Ok(Outcome::Unauthorized);
    };

    let set = match validate_set_form(form) {
        Ok(set) => set,
        Err(errors) => return Ok(Outcome::ValidationFailed(errors)),
    };

    let added = db::exercises::add_set(
        db,
        user_id,
        workout_id,
        workout_exercise_id,
        set.reps,
        set.weight,
    )
    .await?;
    if let Some(s) = &added {
        info!(user_id, workout_id, workout_exercise_id, set_number = s.set_number, "Logged set");
    }
    Ok(added.into())
}
