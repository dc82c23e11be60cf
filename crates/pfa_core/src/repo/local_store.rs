//! Typed entry point over every local collection.
//!
//! Specialized lookups are predicate scans over `get_all()`; there are no
//! indexes.

use crate::model::assignment::WorkoutAssignment;
use crate::model::athlete::Client;
use crate::model::exercise::Exercise;
use crate::model::session::{ExerciseLog, SessionStatus, WorkoutSession};
use crate::model::workout::Workout;
use crate::repo::account_repo::AccountRepository;
use crate::repo::collection_repo::CollectionRepository;
use crate::repo::kv_store::{KvStore, RepoResult, SqliteKvStore};
use log::info;
use rusqlite::Connection;

/// Local persistence facade owning a key-value backend.
pub struct LocalStore<S: KvStore> {
    kv: S,
}

impl<'conn> LocalStore<SqliteKvStore<'conn>> {
    /// Local store on a migrated SQLite connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteKvStore::new(conn))
    }
}

impl<S: KvStore> LocalStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &dyn KvStore {
        &self.kv
    }

    pub fn account(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.kv)
    }

    pub fn clients(&self) -> CollectionRepository<'_, Client> {
        CollectionRepository::new(&self.kv)
    }

    pub fn exercises(&self) -> CollectionRepository<'_, Exercise> {
        CollectionRepository::new(&self.kv)
    }

    pub fn workouts(&self) -> CollectionRepository<'_, Workout> {
        CollectionRepository::new(&self.kv)
    }

    pub fn assignments(&self) -> CollectionRepository<'_, WorkoutAssignment> {
        CollectionRepository::new(&self.kv)
    }

    pub fn sessions(&self) -> CollectionRepository<'_, WorkoutSession> {
        CollectionRepository::new(&self.kv)
    }

    pub fn exercise_logs(&self) -> CollectionRepository<'_, ExerciseLog> {
        CollectionRepository::new(&self.kv)
    }

    pub fn assignments_by_client(&self, client_id: &str) -> Vec<WorkoutAssignment> {
        self.assignments()
            .filter(|assignment| assignment.client_id == client_id)
    }

    pub fn assignments_by_workout(&self, workout_id: &str) -> Vec<WorkoutAssignment> {
        self.assignments()
            .filter(|assignment| assignment.workout_id == workout_id)
    }

    pub fn sessions_by_client(&self, client_id: &str) -> Vec<WorkoutSession> {
        self.sessions().filter(|session| session.client_id == client_id)
    }

    /// First in-progress session of the athlete, in stored order.
    pub fn in_progress_session(&self, client_id: &str) -> Option<WorkoutSession> {
        self.sessions().find(|session| {
            session.client_id == client_id && session.status == SessionStatus::InProgress
        })
    }

    pub fn exercise_logs_by_session(&self, session_id: &str) -> Vec<ExerciseLog> {
        self.exercise_logs()
            .filter(|log| log.workout_session_id == session_id)
    }

    /// Logs the size of every collection; reads are soft so this never fails.
    pub fn log_inventory(&self) {
        info!(
            "event=storage_init module=repo status=ok clients={} exercises={} workouts={} assignments={} sessions={} logs={}",
            self.clients().get_all().len(),
            self.exercises().get_all().len(),
            self.workouts().get_all().len(),
            self.assignments().get_all().len(),
            self.sessions().get_all().len(),
            self.exercise_logs().get_all().len(),
        );
    }

    /// Removes every stored key, including the user and token slots.
    pub fn clear_all(&self) -> RepoResult<()> {
        self.kv.clear()?;
        info!("event=storage_clear module=repo status=ok");
        Ok(())
    }
}
