//! Workout templates and their embedded planned exercises.
//!
//! # Invariants
//! - `WorkoutExercise` values only exist inside a workout's `exercises` list.
//! - `order` is expected to be unique and increasing but is not checked.
//! - Edits replace `exercises` wholesale.

use serde::{Deserialize, Serialize};

use super::validation::{
    check_max_len, check_name, check_range_f64, check_range_u32, ValidationErrors,
    DESCRIPTION_MAX_LEN, MAX_DURATION, MAX_REPS, MAX_SETS, MAX_WEIGHT, MIN_DURATION, MIN_REPS,
    MIN_SETS, MIN_WEIGHT,
};
use super::{new_id, Collection, Entity, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutCategory {
    Strength,
    Cardio,
    Flexibility,
    Hybrid,
    Hiit,
    Speed,
    Agility,
    Conditioning,
    Recovery,
    Other,
}

impl WorkoutCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Cardio => "Cardio",
            Self::Flexibility => "Flexibility",
            Self::Hybrid => "Hybrid",
            Self::Hiit => "HIIT",
            Self::Speed => "Speed",
            Self::Agility => "Agility",
            Self::Conditioning => "Conditioning",
            Self::Recovery => "Recovery",
            Self::Other => "Other",
        }
    }
}

/// Planned parameters for one exercise inside a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub order: u32,
    pub target_sets: u32,
    /// Per set, for rep-based exercises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
    /// Pounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// Seconds, for time-based exercises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_duration: Option<u32>,
    /// Seconds between sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutExercise {
    pub fn new(exercise_id: impl Into<String>, order: u32, target_sets: u32) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            order,
            target_sets,
            target_reps: None,
            target_weight: None,
            target_duration: None,
            rest_time: None,
            notes: None,
        }
    }

    /// Checks the static set/rep/weight/duration bounds.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.exercise_id.trim().is_empty() {
            errors.add("exerciseId", "Please select an exercise");
        }
        check_range_u32(&mut errors, "targetSets", self.target_sets, MIN_SETS, MAX_SETS);
        if let Some(reps) = self.target_reps {
            check_range_u32(&mut errors, "targetReps", reps, MIN_REPS, MAX_REPS);
        }
        if let Some(weight) = self.target_weight {
            check_range_f64(&mut errors, "targetWeight", weight, MIN_WEIGHT, MAX_WEIGHT);
        }
        if let Some(duration) = self.target_duration {
            check_range_u32(
                &mut errors,
                "targetDuration",
                duration,
                MIN_DURATION,
                MAX_DURATION,
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: WorkoutCategory,
    /// External video link (YouTube, Vimeo).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_local_path: Option<String>,
    /// Blob-store path of an uploaded video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_cloud_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Workout {
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        category: WorkoutCategory,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category,
            video_url: None,
            video_local_path: None,
            video_cloud_path: None,
            thumbnail_url: None,
            exercises: Vec::new(),
            is_template: None,
            created_by: None,
            created_at: created_at.into(),
            updated_at: None,
        }
    }

    /// Planned entry for `exercise_id`, if this workout contains it.
    pub fn planned(&self, exercise_id: &str) -> Option<&WorkoutExercise> {
        self.exercises
            .iter()
            .find(|planned| planned.exercise_id == exercise_id)
    }
}

impl Record for Workout {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = WorkoutForm {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            video_url: self.video_url.clone(),
        }
        .validate()
        .err()
        .unwrap_or_default();
        for (index, planned) in self.exercises.iter().enumerate() {
            if let Err(nested) = planned.validate() {
                errors.merge_prefixed(&format!("exercises[{index}]"), nested);
            }
        }
        errors.into_result()
    }
}

impl Entity for Workout {
    const COLLECTION: Collection = Collection::Workouts;
}

/// Coach-entered workout header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutForm {
    pub name: String,
    pub description: Option<String>,
    pub category: WorkoutCategory,
    pub video_url: Option<String>,
}

impl WorkoutForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Workout name", &self.name);
        check_max_len(
            &mut errors,
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_LEN,
        );
        errors.into_result()
    }

    pub fn into_workout(
        self,
        exercises: Vec<WorkoutExercise>,
        created_by: Option<String>,
        created_at: String,
    ) -> Workout {
        let mut workout = Workout::with_id(new_id(), self.name.trim(), self.category, created_at);
        workout.description = self.description;
        workout.video_url = self.video_url;
        workout.exercises = exercises;
        workout.created_by = created_by;
        workout
    }
}

#[cfg(test)]
mod tests {
    use super::{Workout, WorkoutCategory, WorkoutExercise};
    use crate::model::Record;

    #[test]
    fn nested_exercise_errors_are_prefixed() {
        let mut workout = Workout::with_id("w1", "Leg Day", WorkoutCategory::Strength, "t");
        let mut squat = WorkoutExercise::new("e1", 1, 0);
        squat.target_reps = Some(250);
        workout.exercises.push(WorkoutExercise::new("e2", 2, 3));
        workout.exercises.insert(0, squat);

        let errors = workout.validate().unwrap_err();
        assert!(errors.get("exercises[0].targetSets").is_some());
        assert!(errors.get("exercises[0].targetReps").is_some());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut planned = WorkoutExercise::new("e1", 1, 20);
        planned.target_reps = Some(200);
        planned.target_weight = Some(0.0);
        planned.target_duration = Some(3600);
        assert!(planned.validate().is_ok());

        planned.target_weight = Some(1000.5);
        assert!(planned.validate().is_err());
    }

    #[test]
    fn empty_exercise_list_is_allowed() {
        let workout = Workout::with_id("w1", "Recovery", WorkoutCategory::Recovery, "t");
        assert!(workout.validate().is_ok());
    }
}
