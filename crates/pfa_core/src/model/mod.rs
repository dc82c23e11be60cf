//! Domain records shared by coaches and athletes.
//!
//! # Responsibility
//! - Define the persisted shape of every entity (camelCase JSON).
//! - Provide boundary validation (`Record::validate`) used by form submission,
//!   import and remote sync.
//!
//! # Invariants
//! - Every record is identified by an opaque string id, unique per collection.
//! - Relationships are ids only; nothing here resolves or enforces them.
//! - Timestamps are ISO-8601 UTC strings.

pub mod assignment;
pub mod athlete;
pub mod exercise;
pub mod invitation;
pub mod session;
pub mod time;
pub mod user;
pub mod validation;
pub mod workout;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use validation::ValidationErrors;

/// Local collections, each persisted as one serialized array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Workouts,
    Exercises,
    Assignments,
    Sessions,
    ExerciseLogs,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Clients,
        Collection::Exercises,
        Collection::Workouts,
        Collection::Assignments,
        Collection::Sessions,
        Collection::ExerciseLogs,
    ];

    /// Fixed storage key of the collection array.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Clients => "@pfa/clients",
            Self::Workouts => "@pfa/workouts",
            Self::Exercises => "@pfa/exercises",
            Self::Assignments => "@pfa/assignments",
            Self::Sessions => "@pfa/sessions",
            Self::ExerciseLogs => "@pfa/exercise_logs",
        }
    }

    /// Field name used by the export document.
    pub fn export_field(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Workouts => "workouts",
            Self::Exercises => "exercises",
            Self::Assignments => "assignments",
            Self::Sessions => "sessions",
            Self::ExerciseLogs => "exerciseLogs",
        }
    }
}

/// Any identifiable, validatable record.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;

    /// Checks field-level rules. Storage never calls this; form submission,
    /// import and remote sync do.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// A record that lives in a local collection.
pub trait Entity: Record {
    const COLLECTION: Collection;
}

/// Generates a fresh opaque record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
