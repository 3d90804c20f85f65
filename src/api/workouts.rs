use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;

use crate::actions::{self, Outcome};
use crate::db::{self, Exercise, Workout, WorkoutExercise, WorkoutSet, WorkoutWithExercises};
use crate::utils::dates::parse_date_param;
use crate::AppState;

use super::auth::CurrentUser;
use super::error::ApiError;
use super::validation::{ExerciseForm, SetForm, WorkoutForm};

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Numeric path id; anything else cannot name a row, so it is "not found".
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

fn workout_id(raw: &str) -> Result<i64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::not_found("Workout not found"))
}

fn into_result<T>(outcome: Outcome<T>, not_found: &str) -> Result<T, ApiError> {
    match outcome {
        Outcome::Saved(value) => Ok(value),
        Outcome::Unauthorized => Err(ApiError::unauthorized("Authentication required")),
        Outcome::ValidationFailed(errors) => Err(ApiError::validation(errors)),
        Outcome::NotFound => Err(ApiError::not_found(not_found)),
    }
}

/// GET /api/workouts?date=yyyy-MM-dd
pub async fn list_workouts(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<WorkoutWithExercises>>, ApiError> {
    let today = Local::now().date_naive();
    let date = parse_date_param(query.date.as_deref(), today)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let workouts =
        db::workouts::get_workouts_by_user_and_date(&state.db, &user_id, date, &Local).await?;
    Ok(Json(workouts))
}

pub async fn create_workout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(form): Json<WorkoutForm>,
) -> Result<(StatusCode, Json<Workout>), ApiError> {
    let outcome = actions::create_workout(&state.db, Some(&user_id), &form, &Local).await?;
    let workout = into_result(outcome, "Workout not found")?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn get_workout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WorkoutWithExercises>, ApiError> {
    let id = workout_id(&id)?;
    let workout = db::workouts::get_workout_with_exercises(&state.db, &user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Workout not found"))?;
    Ok(Json(workout))
}

pub async fn update_workout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<WorkoutForm>,
) -> Result<Json<Workout>, ApiError> {
    let id = workout_id(&id)?;
    let outcome = actions::update_workout(&state.db, Some(&user_id), id, &form, &Local).await?;
    Ok(Json(into_result(outcome, "Workout not found")?))
}

pub async fn add_exercise(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<ExerciseForm>,
) -> Result<(StatusCode, Json<WorkoutExercise>), ApiError> {
    let id = workout_id(&id)?;
    let outcome = actions::add_exercise(&state.db, Some(&user_id), id, &form).await?;
    let added = into_result(outcome, "Workout not found")?;
    Ok((StatusCode::CREATED, Json(added)))
}

pub async fn log_set(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, workout_exercise_id)): Path<(String, String)>,
    Json(form): Json<SetForm>,
) -> Result<(StatusCode, Json<WorkoutSet>), ApiError> {
    let id = workout_id(&id)?;
    let workout_exercise_id = parse_id(&workout_exercise_id)
        .ok_or_else(|| ApiError::not_found("Workout exercise not found"))?;

    let outcome =
        actions::log_set(&state.db, Some(&user_id), id, workout_exercise_id, &form).await?;
    let set = into_result(outcome, "Workout exercise not found")?;
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn list_exercises(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    Ok(Json(db::exercises::list_exercises(&state.db).await?))
}
