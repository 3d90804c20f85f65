//! Input validation for the write paths.
//!
//! Forms arrive as strings (HTML forms and JSON bodies share the same shapes)
//! and are turned into typed values or a map of field errors. Every field is
//! checked so the user sees all problems at once.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{FieldErrors, ValidationErrorBuilder};
use crate::db::{truncate_to_millis, NewWorkout, UpdateWorkout, Weight, WorkoutWithExercises};
use crate::utils::dates::start_of_day;

pub const MAX_NAME_LENGTH: usize = 255;

/// Format of an HTML `datetime-local` input value
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

lazy_static! {
    /// Optional sign followed by digits only
    static ref WHOLE_NUMBER_REGEX: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();
}

/// Accept either a JSON number or a string, keeping the raw text for validation.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub started_at: String,
    /// Minutes
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
}

impl WorkoutForm {
    /// Pre-filled editor values for an existing workout
    pub fn from_workout<Tz: TimeZone>(workout: &WorkoutWithExercises, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            name: workout.name.clone().unwrap_or_default(),
            started_at: workout
                .started_at
                .with_timezone(tz)
                .format(DATETIME_LOCAL_FORMAT)
                .to_string(),
            duration: workout.duration_minutes().map(|m| m.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWorkout {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ValidatedWorkout> for NewWorkout {
    fn from(v: ValidatedWorkout) -> Self {
        Self {
            name: Some(v.name),
            started_at: v.started_at,
            completed_at: v.completed_at,
        }
    }
}

impl From<ValidatedWorkout> for UpdateWorkout {
    fn from(v: ValidatedWorkout) -> Self {
        Self {
            name: Some(v.name),
            started_at: v.started_at,
            completed_at: v.completed_at,
        }
    }
}

/// Check a workout form. Local times are read in `tz`.
///
/// `completed_at` is derived as `started_at + duration` minutes; the duration
/// itself is never stored.
pub fn validate_workout_form<Tz: TimeZone>(
    form: &WorkoutForm,
    tz: &Tz,
) -> Result<ValidatedWorkout, FieldErrors> {
    let mut errors = ValidationErrorBuilder::new();

    let name = form.name.trim();
    errors.check("name", validate_name(name, "Workout name"));

    let started_at = parse_started_at(&form.started_at, tz);
    if started_at.is_none() {
        errors.add("started_at", "Invalid date");
    }

    let duration = match parse_duration(form.duration.as_deref()) {
        Ok(minutes) => minutes,
        Err(message) => {
            errors.add("duration", message);
            None
        }
    };

    let completed_at = match (started_at, duration) {
        (Some(start), Some(minutes)) => {
            let end = Duration::try_minutes(minutes).and_then(|d| start.checked_add_signed(d));
            match end {
                Some(end) if end.year() <= 9999 => Some(end),
                _ => {
                    errors.add("duration", "Duration is too long");
                    None
                }
            }
        }
        _ => None,
    };

    errors.finish(|| ValidatedWorkout {
        name: name.to_string(),
        // Only reached when no error was recorded, so the start time parsed.
        started_at: started_at.unwrap_or_default(),
        completed_at,
    })
}

fn validate_name(name: &str, label: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{} is required", label));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{} is too long (max {} characters)",
            label, MAX_NAME_LENGTH
        ));
    }

    Ok(())
}

/// Parse a start time.
///
/// Accepts RFC 3339, a `datetime-local` value (optionally with seconds and
/// fraction) read in `tz`, or a bare date meaning local midnight.
pub fn parse_started_at<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        Some(dt.with_timezone(&Utc))
    } else if let Some(naive) = ["%Y-%m-%dT%H:%M:%S%.f", DATETIME_LOCAL_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Some(start_of_day(date, tz))
    } else {
        None
    };

    // Storage keeps four-digit years only
    parsed
        .filter(|dt| (1..=9999).contains(&dt.year()))
        .map(truncate_to_millis)
}

/// Absent, empty and `0` all mean "no duration".
fn parse_duration(raw: Option<&str>) -> Result<Option<i64>, String> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if !WHOLE_NUMBER_REGEX.is_match(raw) {
        return Err("Expected a whole number of minutes".to_string());
    }
    let minutes: i64 = raw
        .parse()
        .map_err(|_| "Duration is too long".to_string())?;

    match minutes {
        0 => Ok(None),
        m if m < 0 => Err("Duration must be at least 1 minute".to_string()),
        m => Ok(Some(m)),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseForm {
    #[serde(default)]
    pub name: String,
}

/// Trimmed exercise name, or the field errors
pub fn validate_exercise_form(form: &ExerciseForm) -> Result<String, FieldErrors> {
    let mut errors = ValidationErrorBuilder::new();
    let name = form.name.trim();
    errors.check("name", validate_name(name, "Exercise name"));
    errors.finish(|| name.to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetForm {
    #[serde(default, deserialize_with = "string_or_number")]
    pub reps: Option<String>,
    /// Kilograms, at most two decimals
    #[serde(default, deserialize_with = "string_or_number")]
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedSet {
    pub reps: i64,
    pub weight: Weight,
}

pub fn validate_set_form(form: &SetForm) -> Result<ValidatedSet, FieldErrors> {
    let mut errors = ValidationErrorBuilder::new();

    let reps = match parse_reps(form.reps.as_deref()) {
        Ok(reps) => reps,
        Err(message) => {
            errors.add("reps", message);
            0
        }
    };

    let weight = match form.weight.as_deref().unwrap_or("").parse::<Weight>() {
        Ok(weight) => weight,
        Err(e) => {
            errors.add("weight", e.to_string());
            Weight::default()
        }
    };

    errors.finish(|| ValidatedSet { reps, weight })
}

fn parse_reps(raw: Option<&str>) -> Result<i64, String> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err("Reps are required".to_string());
    }
    if !WHOLE_NUMBER_REGEX.is_match(raw) {
        return Err("Expected a whole number of reps".to_string());
    }
    match raw.parse::<i64>() {
        Ok(reps) if reps >= 1 => Ok(reps),
        Ok(_) => Err("Reps must be at least 1".to_string()),
        Err(_) => Err("Too many reps".to_string()),
    }
}
