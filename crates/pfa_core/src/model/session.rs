//! Athlete workout sessions and per-exercise performance logs.
//!
//! # Invariants
//! - A session's exercise logs are append-only while it is in progress and
//!   frozen once it is completed or abandoned.
//! - `SetLog::set_number` starts at 1 and follows insertion order.

use serde::{Deserialize, Serialize};

use super::validation::{
    check_range_f64, check_range_u32, ValidationErrors, MAX_DURATION, MAX_RATING, MAX_REPS,
    MAX_WEIGHT, MIN_RATING, MIN_WEIGHT,
};
use super::{Collection, Entity, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn is_open(self) -> bool {
        self == Self::InProgress
    }
}

/// One performed (or skipped) set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLog {
    pub set_number: u32,
    pub reps_completed: u32,
    /// Pounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_used: Option<f64>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// `false` when the athlete skipped the set.
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SetLog {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_range_u32(&mut errors, "repsCompleted", self.reps_completed, 0, MAX_REPS);
        if let Some(weight) = self.weight_used {
            check_range_f64(&mut errors, "weightUsed", weight, MIN_WEIGHT, MAX_WEIGHT);
        }
        if let Some(duration) = self.duration {
            check_range_u32(&mut errors, "duration", duration, 0, MAX_DURATION);
        }
        errors.into_result()
    }
}

/// Athlete input for one set; the set number is assigned on append.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEntry {
    pub reps_completed: u32,
    pub weight_used: Option<f64>,
    pub duration: Option<u32>,
    pub completed: bool,
    pub notes: Option<String>,
}

impl SetEntry {
    pub fn reps(reps_completed: u32) -> Self {
        Self {
            reps_completed,
            weight_used: None,
            duration: None,
            completed: true,
            notes: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            completed: false,
            ..Self::reps(0)
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight_used = Some(weight);
        self
    }

    pub(crate) fn into_set_log(self, set_number: u32) -> SetLog {
        SetLog {
            set_number,
            reps_completed: self.reps_completed,
            weight_used: self.weight_used,
            duration: self.duration,
            completed: self.completed,
            notes: self.notes,
        }
    }
}

/// Performance for one exercise within a session, with the planned targets
/// copied from the workout for reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub id: String,
    pub workout_session_id: String,
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_exercise_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_duration: Option<u32>,
    #[serde(default)]
    pub sets: Vec<SetLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ExerciseLog {
    pub fn completed_sets(&self) -> impl Iterator<Item = &SetLog> {
        self.sets.iter().filter(|set| set.completed)
    }
}

impl Record for ExerciseLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (index, set) in self.sets.iter().enumerate() {
            if let Err(nested) = set.validate() {
                errors.merge_prefixed(&format!("sets[{index}]"), nested);
            }
        }
        errors.into_result()
    }
}

impl Entity for ExerciseLog {
    const COLLECTION: Collection = Collection::ExerciseLogs;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub client_id: String,
    pub workout_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub status: SessionStatus,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_notes: Option<String>,
    /// 1-5 stars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub exercise_logs: Vec<ExerciseLog>,
}

impl WorkoutSession {
    pub fn log_for(&self, exercise_id: &str) -> Option<&ExerciseLog> {
        self.exercise_logs
            .iter()
            .find(|log| log.exercise_id == exercise_id)
    }
}

impl Record for WorkoutSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(rating) = self.rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                errors.add("rating", format!("must be between {MIN_RATING} and {MAX_RATING}"));
            }
        }
        for (index, log) in self.exercise_logs.iter().enumerate() {
            if let Err(nested) = log.validate() {
                errors.merge_prefixed(&format!("exerciseLogs[{index}]"), nested);
            }
        }
        errors.into_result()
    }
}

impl Entity for WorkoutSession {
    const COLLECTION: Collection = Collection::Sessions;
}
