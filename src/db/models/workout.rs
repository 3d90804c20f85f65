//! Workout models and the composite read types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use super::{optional_timestamp_column, timestamp_column, Weight};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub id: i64,
    pub user_id: String,
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Workout {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            started_at: timestamp_column(row, "started_at")?,
            completed_at: optional_timestamp_column(row, "completed_at")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

impl Workout {
    /// Whole minutes between start and completion, if completed
    pub fn duration_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|done| done.signed_duration_since(self.started_at).num_minutes())
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Replacement values for an existing workout; every field is written.
#[derive(Debug, Clone)]
pub struct UpdateWorkout {
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A workout with its exercises (ascending `order`) and their sets (ascending `set_number`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutWithExercises {
    pub id: i64,
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<ExerciseWithSets>,
}

impl WorkoutWithExercises {
    pub fn new(workout: Workout, exercises: Vec<ExerciseWithSets>) -> Self {
        Self {
            id: workout.id,
            name: workout.name,
            started_at: workout.started_at,
            completed_at: workout.completed_at,
            exercises,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Workout")
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|done| done.signed_duration_since(self.started_at).num_minutes())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseWithSets {
    /// Exercise catalog id
    pub id: i64,
    pub workout_exercise_id: i64,
    pub name: String,
    pub order: i64,
    pub sets: Vec<SetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetSummary {
    pub set_number: i64,
    pub reps: i64,
    pub weight: Weight,
}

impl ExerciseWithSets {
    /// Compact rendering such as `8×100.00kg, 6×110.00kg`
    pub fn sets_compact(&self) -> String {
        self.sets
            .iter()
            .map(|s| format!("{}×{}kg", s.reps, s.weight))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn set_count_label(&self) -> String {
        match self.sets.len() {
            1 => "1 set".to_string(),
            n => format!("{} sets", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn workout(completed_at: Option<DateTime<Utc>>) -> Workout {
        let started_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        Workout {
            id: 1,
            user_id: "user_a".to_string(),
            name: None,
            started_at,
            completed_at,
            created_at: started_at,
        }
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(workout(None).duration_minutes(), None);
        let done = Utc.with_ymd_and_hms(2024, 1, 15, 10, 45, 0).unwrap();
        assert_eq!(workout(Some(done)).duration_minutes(), Some(45));
    }

    #[test]
    fn test_display_name_falls_back() {
        let w = WorkoutWithExercises::new(workout(None), vec![]);
        assert_eq!(w.display_name(), "Workout");
    }

    #[test]
    fn test_sets_compact_and_count() {
        let exercise = ExerciseWithSets {
            id: 1,
            workout_exercise_id: 10,
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
                    weight: "110.5".parse().unwrap(),
                },
            ],
        };
        assert_eq!(exercise.sets_compact(), "8×100.00kg, 6×110.50kg");
        assert_eq!(exercise.set_count_label(), "2 sets");

        let single = ExerciseWithSets {
            sets: exercise.sets[..1].to_vec(),
            ..exercise
        };
        assert_eq!(single.set_count_label(), "1 set");
    }
}
