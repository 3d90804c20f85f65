// Server-rendered pages: dashboard with date picker, workout forms, 404/error pages
// Uses Askama templates; forms post back and redirect (303) on success

mod calendar;
mod templates;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::actions::{self, Outcome};
use crate::api::auth::Identity;
use crate::api::error::FieldErrors;
use crate::api::validation::{
    parse_started_at, ExerciseForm, SetForm, WorkoutForm, DATETIME_LOCAL_FORMAT,
};
use crate::api::workouts::{parse_id, DateQuery};
use crate::db;
use crate::utils::dates::{format_date_param, format_long_date, parse_date_param};
use crate::AppState;

pub use calendar::{build_calendar, dashboard_link, CalendarDay, CalendarMonth};
pub use templates::*;

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    render_with_status(StatusCode::OK, template)
}

fn render_with_status<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/workout/new", get(new_workout_page).post(create_workout_submit))
        .route("/dashboard/workout/:id", get(edit_workout_page).post(update_workout_submit))
        .route("/dashboard/workout/:id/exercises", post(add_exercise_submit))
        .route(
            "/dashboard/workout/:id/exercises/:workout_exercise_id/sets",
            post(log_set_submit),
        )
}

/// Failures a page handler can end in; each renders its own page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("sign in required")]
    Unauthorized,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => not_found_page(),
            PageError::BadRequest(message) => render_with_status(
                StatusCode::BAD_REQUEST,
                ErrorTemplate {
                    status: 400,
                    title: "Bad Request".to_string(),
                    message,
                    link: "/dashboard".to_string(),
                    link_label: "Back to dashboard".to_string(),
                },
            ),
            PageError::Unauthorized => render_with_status(
                StatusCode::UNAUTHORIZED,
                ErrorTemplate {
                    status: 401,
                    title: "Unauthorized".to_string(),
                    message: "You need to sign in to do that.".to_string(),
                    link: "/".to_string(),
                    link_label: "Return Home".to_string(),
                },
            ),
            PageError::Database(e) => {
                error!("Database error while rendering page: {}", e);
                render_with_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorTemplate {
                        status: 500,
                        title: "Something went wrong".to_string(),
                        message: "An unexpected error occurred. Please try again.".to_string(),
                        link: "/".to_string(),
                        link_label: "Return Home".to_string(),
                    },
                )
            }
        }
    }
}

type PageResult = Result<Response, PageError>;

fn not_found_page() -> Response {
    render_with_status(StatusCode::NOT_FOUND, NotFoundTemplate)
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    not_found_page()
}

fn sign_in_redirect(state: &AppState) -> Response {
    Redirect::to(&state.config.auth.sign_in_url).into_response()
}

fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// Landing page
async fn home(State(state): State<Arc<AppState>>, identity: Identity) -> Response {
    render_template(HomeTemplate {
        signed_in: identity.user_id().is_some(),
        sign_in_url: state.config.auth.sign_in_url.clone(),
    })
}

// Workouts of one day with the calendar picker
async fn dashboard(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<DateQuery>,
) -> PageResult {
    let Some(user_id) = identity.user_id() else {
        return Ok(sign_in_redirect(&state));
    };

    let today = today();
    let date = parse_date_param(query.date.as_deref(), today).map_err(|e| {
        warn!("Rejected dashboard date parameter: {}", e);
        PageError::BadRequest(e.to_string())
    })?;

    let workouts =
        db::workouts::get_workouts_by_user_and_date(&state.db, user_id, date, &Local).await?;
    let cards = workouts
        .iter()
        .map(|w| WorkoutCard::new(w, &Local))
        .collect();

    Ok(render_template(DashboardTemplate::new(
        format_long_date(date),
        format!("/dashboard/workout/new?date={}", format_date_param(date)),
        build_calendar(date, today),
        cards,
    )))
}

fn new_workout_template(
    form: &WorkoutForm,
    errors: FieldErrors,
    error: Option<String>,
) -> WorkoutNewTemplate {
    let back = parse_date_from_form(form).unwrap_or_else(today);
    WorkoutNewTemplate {
        form: FormValues::from(form),
        errors: errors.into(),
        error,
        back_link: dashboard_link(back),
    }
}

fn parse_date_from_form(form: &WorkoutForm) -> Option<NaiveDate> {
    parse_started_at(&form.started_at, &Local).map(local_date)
}

// New workout form, pre-filled with the chosen day at the current time of day
async fn new_workout_page(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<DateQuery>,
) -> PageResult {
    if identity.user_id().is_none() {
        return Ok(sign_in_redirect(&state));
    }

    let now = Local::now();
    let date = parse_date_param(query.date.as_deref(), now.date_naive())
        .map_err(|e| PageError::BadRequest(e.to_string()))?;
    let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN);

    let form = WorkoutForm {
        started_at: date.and_time(time).format(DATETIME_LOCAL_FORMAT).to_string(),
        ..WorkoutForm::default()
    };
    Ok(render_template(new_workout_template(&form, FieldErrors::new(), None)))
}

async fn create_workout_submit(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Form(form): Form<WorkoutForm>,
) -> PageResult {
    let outcome = actions::create_workout(&state.db, identity.user_id(), &form, &Local).await?;

    Ok(match outcome {
        Outcome::Saved(workout) => {
            Redirect::to(&dashboard_link(local_date(workout.started_at))).into_response()
        }
        Outcome::Unauthorized => render_with_status(
            StatusCode::UNAUTHORIZED,
            new_workout_template(
                &form,
                FieldErrors::new(),
                Some("You need to sign in to log a workout.".to_string()),
            ),
        ),
        Outcome::ValidationFailed(errors) => render_with_status(
            StatusCode::BAD_REQUEST,
            new_workout_template(&form, errors, None),
        ),
        Outcome::NotFound => return Err(PageError::NotFound),
    })
}

/// What to show again after a rejected form on the editor page
#[derive(Default)]
struct EditorRetry {
    form: Option<WorkoutForm>,
    workout_errors: FieldErrors,
    exercise_name: String,
    exercise_errors: FieldErrors,
    set: Option<(i64, SetForm, FieldErrors)>,
}

async fn render_editor(
    state: &AppState,
    user_id: &str,
    workout_id: i64,
    status: StatusCode,
    retry: EditorRetry,
) -> PageResult {
    let workout = db::workouts::get_workout_with_exercises(&state.db, user_id, workout_id)
        .await?
        .ok_or(PageError::NotFound)?;
    let catalog = db::exercises::list_exercises(&state.db)
        .await?
        .into_iter()
        .map(|e| e.name)
        .collect();

    let form = retry
        .form
        .unwrap_or_else(|| WorkoutForm::from_workout(&workout, &Local));

    let mut exercises: Vec<EditorExercise> =
        workout.exercises.iter().map(EditorExercise::from).collect();
    if let Some((we_id, set_form, errors)) = retry.set {
        if let Some(exercise) = exercises.iter_mut().find(|e| e.workout_exercise_id == we_id) {
            exercise.reps = set_form.reps.unwrap_or_default();
            exercise.weight = set_form.weight.unwrap_or_default();
            exercise.errors = errors.into();
        }
    }

    let template = WorkoutEditTemplate {
        workout_id: workout.id,
        title: workout.display_name().to_string(),
        form: FormValues::from(&form),
        errors: retry.workout_errors.into(),
        exercises,
        exercise_name: retry.exercise_name,
        exercise_errors: retry.exercise_errors.into(),
        catalog,
        back_link: dashboard_link(local_date(workout.started_at)),
    };
    Ok(render_with_status(status, template))
}

fn editor_path(workout_id: i64) -> String {
    format!("/dashboard/workout/{}", workout_id)
}

// Workout editor
async fn edit_workout_page(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
) -> PageResult {
    let Some(user_id) = identity.user_id() else {
        return Ok(sign_in_redirect(&state));
    };
    let workout_id = parse_id(&id).ok_or(PageError::NotFound)?;

    render_editor(&state, user_id, workout_id, StatusCode::OK, EditorRetry::default()).await
}

async fn update_workout_submit(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
    Form(form): Form<WorkoutForm>,
) -> PageResult {
    let workout_id = parse_id(&id).ok_or(PageError::NotFound)?;
    let outcome =
        actions::update_workout(&state.db, identity.user_id(), workout_id, &form, &Local).await?;

    match (outcome, identity.user_id()) {
        (Outcome::Saved(workout), _) => {
            Ok(Redirect::to(&dashboard_link(local_date(workout.started_at))).into_response())
        }
        (Outcome::ValidationFailed(errors), Some(user_id)) => {
            let retry = EditorRetry {
                form: Some(form),
                workout_errors: errors,
                ..EditorRetry::default()
            };
            render_editor(&state, user_id, workout_id, StatusCode::BAD_REQUEST, retry).await
        }
        (Outcome::NotFound, _) => Err(PageError::NotFound),
        _ => Err(PageError::Unauthorized),
    }
}

async fn add_exercise_submit(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<String>,
    Form(form): Form<ExerciseForm>,
) -> PageResult {
    let workout_id = parse_id(&id).ok_or(PageError::NotFound)?;
    let outcome = actions::add_exercise(&state.db, identity.user_id(), workout_id, &form).await?;

    match (outcome, identity.user_id()) {
        (Outcome::Saved(_), _) => Ok(Redirect::to(&editor_path(workout_id)).into_response()),
        (Outcome::ValidationFailed(errors), Some(user_id)) => {
            let retry = EditorRetry {
                exercise_name: form.name,
                exercise_errors: errors,
                ..EditorRetry::default()
            };
            render_editor(&state, user_id, workout_id, StatusCode::BAD_REQUEST, retry).await
        }
        (Outcome::NotFound, _) => Err(PageError::NotFound),
        _ => Err(PageError::Unauthorized),
    }
}

async fn log_set_submit(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path((id, workout_exercise_id)): Path<(String, String)>,
    Form(form): Form<SetForm>,
) -> PageResult {
    let workout_id = parse_id(&id).ok_or(PageError::NotFound)?;
    let workout_exercise_id = parse_id(&workout_exercise_id).ok_or(PageError::NotFound)?;
    let outcome = actions::log_set(
        &state.db,
        identity.user_id(),
        workout_id,
        workout_exercise_id,
        &form,
    )
    .await?;

    match (outcome, identity.user_id()) {
        (Outcome::Saved(_), _) => Ok(Redirect::to(&editor_path(workout_id)).into_response()),
        (Outcome::ValidationFailed(errors), Some(user_id)) => {
            let retry = EditorRetry {
                set: Some((workout_exercise_id, form, errors)),
                ..EditorRetry::default()
            };
            render_editor(&state, user_id, workout_id, StatusCode::BAD_REQUEST, retry).await
        }
        (Outcome::NotFound, _) => Err(PageError::NotFound),
        _ => Err(PageError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ExerciseWithSets, SetSummary, WorkoutWithExercises};

    fn workout(completed: bool) -> WorkoutWithExercises {
        let started_at: DateTime<Utc> = "2024-01-15T10:00:00Z".parse().unwrap();
        WorkoutWithExercises {
            id: 7,
            name: None,
            started_at,
            completed_at: completed.then(|| started_at + chrono::Duration::minutes(45)),
            exercises: vec![ExerciseWithSets {
                id: 1,
                workout_exercise_id: 3,
                name: "Squat".to_string(),
                order: 1,
                sets: vec![
                    SetSummary {
                        set_number: 1,
                        reps: 8,
                        weight: "100".parse().unwrap(),
                    },
                    SetSummary {
                        set_number: 2,
                        reps: 6,
                        weight: "110".parse().unwrap(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_workout_card() {
        let card = WorkoutCard::new(&workout(true), &Utc);
        assert_eq!(card.name, "Workout");
        assert_eq!(card.time_range, "10:00 - 10:45 (45 min)");
        assert_eq!(card.exercises[0].set_count, "2 sets");
        assert_eq!(card.exercises[0].sets, "8×100.00kg, 6×110.00kg");

        let open = WorkoutCard::new(&workout(false), &Utc);
        assert_eq!(open.time_range, "10:00");
    }

    #[test]
    fn test_dashboard_renders_cards() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let html = DashboardTemplate::new(
            format_long_date(date),
            "/dashboard/workout/new?date=2024-01-15".to_string(),
            build_calendar(date, date),
            vec![WorkoutCard::new(&workout(true), &Utc)],
        )
        .render()
        .unwrap();

        assert!(html.contains("15th Jan 2024"));
        assert!(html.contains("January 2024"));
        assert!(html.contains("/dashboard/workout/7"));
        assert!(html.contains("8×100.00kg, 6×110.00kg"));
        assert!(!html.contains("No workouts logged for this date."));
    }

    #[test]
    fn test_dashboard_empty_state() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let html = DashboardTemplate::new(
            format_long_date(date),
            "/dashboard/workout/new?date=2024-01-15".to_string(),
            build_calendar(date, date),
            vec![],
        )
        .render()
        .unwrap();

        assert!(html.contains("No workouts logged for this date."));
        assert!(html.contains("new?date=2024-01-15"));
    }

    #[test]
    fn test_form_errors_render_inline() {
        let mut errors = FieldErrors::new();
        errors.insert("name".to_string(), vec!["Workout name is required".to_string()]);
        let form = WorkoutForm {
            started_at: "2024-01-15T10:00".to_string(),
            ..WorkoutForm::default()
        };
        let html = new_workout_template(&form, errors, None).render().unwrap();
        assert!(html.contains("Workout name is required"));
        assert!(html.contains("value=\"2024-01-15T10:00\""));
    }
}
