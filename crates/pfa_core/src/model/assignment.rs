//! Workout assignment linking one athlete to one workout.

use serde::{Deserialize, Serialize};

use super::{new_id, Collection, Entity, Record};

/// Coarse progress of an assignment.
///
/// Moves forward in practice, but any transition is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
}

impl AssignmentStatus {
    /// Position in the usual assigned -> in-progress -> completed flow.
    pub fn rank(self) -> u8 {
        match self {
            Self::Assigned => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutAssignment {
    pub id: String,
    pub client_id: String,
    pub workout_id: String,
    pub assigned_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    /// Coach user id.
    pub assigned_by: String,
}

impl WorkoutAssignment {
    pub fn new(
        client_id: impl Into<String>,
        workout_id: impl Into<String>,
        assigned_by: impl Into<String>,
        assigned_date: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            client_id: client_id.into(),
            workout_id: workout_id.into(),
            assigned_date: assigned_date.into(),
            due_date: None,
            status: AssignmentStatus::Assigned,
            completed_date: None,
            assigned_by: assigned_by.into(),
        }
    }
}

impl Record for WorkoutAssignment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for WorkoutAssignment {
    const COLLECTION: Collection = Collection::Assignments;
}
