// Askama template definitions and the view models they render

use askama::Template;
use chrono::TimeZone;

use super::calendar::{CalendarMonth, WEEKDAY_LABELS};
use crate::api::error::FieldErrors;
use crate::api::validation::WorkoutForm;
use crate::db::{ExerciseWithSets, WorkoutWithExercises};

/// Field errors for a form, looked up by field name from templates
#[derive(Debug, Default)]
pub struct FieldMessages(FieldErrors);

impl FieldMessages {
    pub fn new(errors: FieldErrors) -> Self {
        Self(errors)
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.for_field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<FieldErrors> for FieldMessages {
    fn from(errors: FieldErrors) -> Self {
        Self(errors)
    }
}

/// Workout form values as strings for `value="..."` attributes
pub struct FormValues {
    pub name: String,
    pub started_at: String,
    pub duration: String,
}

impl From<&WorkoutForm> for FormValues {
    fn from(form: &WorkoutForm) -> Self {
        Self {
            name: form.name.clone(),
            started_at: form.started_at.clone(),
            duration: form.duration.clone().unwrap_or_default(),
        }
    }
}

// One exercise row on a workout card: `Squat  3 sets - 8×100.00kg, ...`
pub struct ExerciseLine {
    pub name: String,
    pub set_count: String,
    pub sets: String,
}

impl From<&ExerciseWithSets> for ExerciseLine {
    fn from(exercise: &ExerciseWithSets) -> Self {
        Self {
            name: exercise.name.clone(),
            set_count: exercise.set_count_label(),
            sets: exercise.sets_compact(),
        }
    }
}

pub struct WorkoutCard {
    pub id: i64,
    pub name: String,
    /// Local start time, with the end time when the workout was completed
    pub time_range: String,
    pub exercises: Vec<ExerciseLine>,
}

impl WorkoutCard {
    pub fn new<Tz: TimeZone>(workout: &WorkoutWithExercises, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let start = workout.started_at.with_timezone(tz).format("%H:%M").to_string();
        let time_range = match (workout.completed_at, workout.duration_minutes()) {
            (Some(end), Some(minutes)) => format!(
                "{} - {} ({} min)",
                start,
                end.with_timezone(tz).format("%H:%M"),
                minutes
            ),
            _ => start,
        };

        Self {
            id: workout.id,
            name: workout.display_name().to_string(),
            time_range,
            exercises: workout.exercises.iter().map(ExerciseLine::from).collect(),
        }
    }
}

// Sets of one exercise in the editor, with its log-set form
pub struct EditorExercise {
    pub workout_exercise_id: i64,
    pub name: String,
    pub sets: Vec<EditorSet>,
    pub errors: FieldMessages,
    pub reps: String,
    pub weight: String,
}

pub struct EditorSet {
    pub set_number: i64,
    pub reps: i64,
    pub weight: String,
}

impl From<&ExerciseWithSets> for EditorExercise {
    fn from(exercise: &ExerciseWithSets) -> Self {
        Self {
            workout_exercise_id: exercise.workout_exercise_id,
            name: exercise.name.clone(),
            sets: exercise
                .sets
                .iter()
                .map(|s| EditorSet {
                    set_number: s.set_number,
                    reps: s.reps,
                    weight: s.weight.to_string(),
                })
                .collect(),
            errors: FieldMessages::default(),
            reps: String::new(),
            weight: String::new(),
        }
    }
}

// Landing page
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub signed_in: bool,
    pub sign_in_url: String,
}

// Date-scoped dashboard
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    /// e.g. `15th Jan 2024`
    pub date_label: String,
    pub new_workout_link: String,
    pub calendar: CalendarMonth,
    pub weekdays: [&'static str; 7],
    pub workouts: Vec<WorkoutCard>,
}

impl DashboardTemplate {
    pub fn new(
        date_label: String,
        new_workout_link: String,
        calendar: CalendarMonth,
        workouts: Vec<WorkoutCard>,
    ) -> Self {
        Self {
            date_label,
            new_workout_link,
            calendar,
            weekdays: WEEKDAY_LABELS,
            workouts,
        }
    }
}

// New workout form
#[derive(Template)]
#[template(path = "workout_new.html")]
pub struct WorkoutNewTemplate {
    pub form: FormValues,
    pub errors: FieldMessages,
    pub error: Option<String>,
    pub back_link: String,
}

// Workout editor
#[derive(Template)]
#[template(path = "workout_edit.html")]
pub struct WorkoutEditTemplate {
    pub workout_id: i64,
    pub title: String,
    pub form: FormValues,
    pub errors: FieldMessages,
    pub exercises: Vec<EditorExercise>,
    pub exercise_name: String,
    pub exercise_errors: FieldMessages,
    pub catalog: Vec<String>,
    pub back_link: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

// Generic error page (400, 401, 500)
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub link: String,
    pub link_label: String,
}
