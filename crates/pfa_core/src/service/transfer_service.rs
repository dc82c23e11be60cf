//! Whole-store export and import.
//!
//! # Responsibility
//! - Serialize every local collection plus the user into one JSON document.
//! - Replace collections from such a document.
//!
//! # Invariants
//! - Import is all-or-nothing: parsing, validation and duplicate-id checks
//!   run before any write, and the writes share one transaction.
//! - A collection absent from the payload is left as it is; a present one is
//!   overwritten, never merged.

use crate::model::assignment::WorkoutAssignment;
use crate::model::athlete::Client;
use crate::model::exercise::Exercise;
use crate::model::session::{ExerciseLog, WorkoutSession};
use crate::model::user::User;
use crate::model::validation::ValidationErrors;
use crate::model::workout::Workout;
use crate::model::{Collection, Entity, Record};
use crate::repo::account_repo::USER_KEY;
use crate::repo::kv_store::{KvStore, RepoError};
use crate::repo::local_store::LocalStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TransferError {
    /// Payload is not JSON of the expected shape.
    Parse(serde_json::Error),
    /// A record failed its field rules.
    Invalid {
        collection: &'static str,
        index: usize,
        errors: ValidationErrors,
    },
    /// Two records in one imported array share an id.
    DuplicateId {
        collection: &'static str,
        id: String,
    },
    Encode(serde_json::Error),
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to import data: {err}"),
            Self::Invalid {
                collection,
                index,
                errors,
            } => write!(f, "failed to import data: {collection}[{index}]: {errors}"),
            Self::DuplicateId { collection, id } => {
                write!(f, "failed to import data: duplicate id `{id}` in {collection}")
            }
            Self::Encode(err) => write!(f, "failed to export data: {err}"),
            Self::Repo(err) => write!(f, "failed to import data: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Invalid { errors, .. } => Some(errors),
            Self::Repo(err) => Some(err),
            Self::DuplicateId { .. } => None,
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Export document. Every field is optional on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<Client>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workouts: Option<Vec<Workout>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<WorkoutAssignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<WorkoutSession>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_logs: Option<Vec<ExerciseLog>>,
}

/// Counts of records written by an import, per collection present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub collections: Vec<(Collection, usize)>,
    pub user_restored: bool,
}

pub struct TransferService<'a, S: KvStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KvStore> TransferService<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    /// Snapshot of every collection and the persisted user.
    pub fn export_bundle(&self) -> ExportBundle {
        ExportBundle {
            user: self.store.account().get_user(),
            clients: Some(self.store.clients().get_all()),
            exercises: Some(self.store.exercises().get_all()),
            workouts: Some(self.store.workouts().get_all()),
            assignments: Some(self.store.assignments().get_all()),
            sessions: Some(self.store.sessions().get_all()),
            exercise_logs: Some(self.store.exercise_logs().get_all()),
        }
    }

    /// Pretty-printed export document.
    pub fn export_all(&self) -> Result<String, TransferError> {
        let json =
            serde_json::to_string_pretty(&self.export_bundle()).map_err(TransferError::Encode)?;
        info!(
            "event=data_export module=service status=ok bytes={}",
            json.len()
        );
        Ok(json)
    }

    /// Validates the whole payload, then overwrites every collection it
    /// names in one transaction.
    pub fn import_all(&self, json: &str) -> Result<ImportSummary, TransferError> {
        let result = self.try_import(json);
        if let Err(err) = &result {
            warn!(
                "event=data_import module=service status=error error={}",
                err
            );
        }
        result
    }

    fn try_import(&self, json: &str) -> Result<ImportSummary, TransferError> {
        let bundle: ExportBundle = serde_json::from_str(json).map_err(TransferError::Parse)?;

        let mut writes: Vec<(&'static str, String)> = Vec::new();
        let mut summary = ImportSummary::default();
        stage(&mut writes, &mut summary, bundle.clients.as_deref())?;
        stage(&mut writes, &mut summary, bundle.exercises.as_deref())?;
        stage(&mut writes, &mut summary, bundle.workouts.as_deref())?;
        stage(&mut writes, &mut summary, bundle.assignments.as_deref())?;
        stage(&mut writes, &mut summary, bundle.sessions.as_deref())?;
        stage(&mut writes, &mut summary, bundle.exercise_logs.as_deref())?;

        if let Some(user) = &bundle.user {
            user.validate().map_err(|errors| TransferError::Invalid {
                collection: "user",
                index: 0,
                errors,
            })?;
            let json = serde_json::to_string(user).map_err(TransferError::Encode)?;
            writes.push((USER_KEY, json));
            summary.user_restored = true;
        }

        self.store.kv().set_many(&writes)?;
        info!(
            "event=data_import module=service status=ok collections={} user={}",
            summary.collections.len(),
            summary.user_restored
        );
        Ok(summary)
    }
}

fn stage<T: Entity>(
    writes: &mut Vec<(&'static str, String)>,
    summary: &mut ImportSummary,
    items: Option<&[T]>,
) -> Result<(), TransferError> {
    let Some(items) = items else {
        return Ok(());
    };
    let collection = T::COLLECTION.export_field();
    let mut seen = BTreeSet::new();
    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|errors| TransferError::Invalid {
            collection,
            index,
            errors,
        })?;
        if !seen.insert(item.id()) {
            return Err(TransferError::DuplicateId {
                collection,
                id: item.id().to_string(),
            });
        }
    }
    let json = serde_json::to_string(items).map_err(TransferError::Encode)?;
    writes.push((T::COLLECTION.storage_key(), json));
    summary.collections.push((T::COLLECTION, items.len()));
    Ok(())
}
