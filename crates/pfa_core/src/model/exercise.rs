//! Exercise library records and the built-in catalogue.

use serde::{Deserialize, Serialize};

use super::validation::{check_max_len, check_name, ValidationErrors, INSTRUCTIONS_MAX_LEN};
use super::{new_id, Collection, Entity, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
    Agility,
    Speed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Set for coach-created exercises, absent for seeded ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: String,
}

impl Record for Exercise {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Exercise name", &self.name);
        check_max_len(
            &mut errors,
            "instructions",
            self.instructions.as_deref(),
            INSTRUCTIONS_MAX_LEN,
        );
        errors.into_result()
    }
}

impl Entity for Exercise {
    const COLLECTION: Collection = Collection::Exercises;
}

/// Coach-entered exercise details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseForm {
    pub name: String,
    pub kind: ExerciseType,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub instructions: Option<String>,
    pub video_url: Option<String>,
}

impl ExerciseForm {
    pub fn into_exercise(self, created_by: Option<String>, created_at: String) -> Exercise {
        Exercise {
            id: new_id(),
            name: self.name.trim().to_string(),
            kind: self.kind,
            muscle_group: self.muscle_group,
            equipment: self.equipment,
            instructions: self.instructions,
            video_url: self.video_url,
            created_by,
            created_at,
        }
    }
}

/// `(name, type, muscle group, equipment)` seeded into an empty library.
pub const COMMON_EXERCISES: &[(&str, ExerciseType, &str, &str)] = &[
    ("Back Squat", ExerciseType::Strength, "Legs", "Barbell"),
    ("Front Squat", ExerciseType::Strength, "Legs", "Barbell"),
    ("Deadlift", ExerciseType::Strength, "Legs", "Barbell"),
    ("Romanian Deadlift", ExerciseType::Strength, "Legs", "Barbell"),
    ("Bulgarian Split Squat", ExerciseType::Strength, "Legs", "Dumbbells"),
    ("Lunges", ExerciseType::Strength, "Legs", "Bodyweight"),
    ("Step-Ups", ExerciseType::Strength, "Legs", "Box"),
    ("Leg Press", ExerciseType::Strength, "Legs", "Machine"),
    ("Leg Curl", ExerciseType::Strength, "Hamstrings", "Machine"),
    ("Calf Raises", ExerciseType::Strength, "Calves", "Dumbbells"),
    ("Bench Press", ExerciseType::Strength, "Chest", "Barbell"),
    ("Push-Ups", ExerciseType::Strength, "Chest", "Bodyweight"),
    ("Overhead Press", ExerciseType::Strength, "Shoulders", "Barbell"),
    ("Pull-Ups", ExerciseType::Strength, "Back", "Bar"),
    ("Rows", ExerciseType::Strength, "Back", "Barbell"),
    ("Bicep Curls", ExerciseType::Strength, "Arms", "Dumbbells"),
    ("Tricep Dips", ExerciseType::Strength, "Arms", "Bodyweight"),
    ("Plank", ExerciseType::Strength, "Core", "Bodyweight"),
    ("Russian Twists", ExerciseType::Strength, "Core", "Medicine Ball"),
    ("Dead Bug", ExerciseType::Strength, "Core", "Bodyweight"),
    ("Bicycle Crunches", ExerciseType::Strength, "Core", "Bodyweight"),
    ("Sprints", ExerciseType::Speed, "Full Body", "None"),
    ("Cone Drills", ExerciseType::Agility, "Full Body", "Cones"),
    ("Ladder Drills", ExerciseType::Agility, "Full Body", "Agility Ladder"),
    ("Box Jumps", ExerciseType::Agility, "Legs", "Box"),
    ("Shuttle Runs", ExerciseType::Speed, "Full Body", "Cones"),
    ("Running", ExerciseType::Cardio, "Full Body", "None"),
    ("Rowing", ExerciseType::Cardio, "Full Body", "Rowing Machine"),
    ("Bike", ExerciseType::Cardio, "Legs", "Bike"),
    ("Jump Rope", ExerciseType::Cardio, "Full Body", "Jump Rope"),
    ("Burpees", ExerciseType::Cardio, "Full Body", "Bodyweight"),
    ("Hamstring Stretch", ExerciseType::Flexibility, "Hamstrings", "None"),
    ("Hip Flexor Stretch", ExerciseType::Flexibility, "Hips", "None"),
    ("Shoulder Stretch", ExerciseType::Flexibility, "Shoulders", "None"),
    ("Foam Rolling", ExerciseType::Flexibility, "Full Body", "Foam Roller"),
];

/// Materializes the catalogue with fresh ids.
pub fn seed_catalogue(created_at: &str) -> Vec<Exercise> {
    COMMON_EXERCISES
        .iter()
        .map(|(name, kind, muscle_group, equipment)| Exercise {
            id: new_id(),
            name: (*name).to_string(),
            kind: *kind,
            muscle_group: Some((*muscle_group).to_string()),
            equipment: Some((*equipment).to_string()),
            instructions: None,
            video_url: None,
            created_by: None,
            created_at: created_at.to_string(),
        })
        .collect()
}
