//! Loads athlete history and feeds it to the performance calculations.

use crate::performance::{
    compare_exercise, progress_metrics, PerformanceComparison, ProgressMetrics,
};
use crate::repo::kv_store::KvStore;
use crate::repo::local_store::LocalStore;
use crate::service::{ServiceError, ServiceResult};

pub struct ProgressService<'a, S: KvStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KvStore> ProgressService<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    pub fn progress_metrics(&self, client_id: &str) -> ProgressMetrics {
        let exercises = self.store.exercises().get_all();
        progress_metrics(
            &self.store.assignments_by_client(client_id),
            &self.store.sessions_by_client(client_id),
            |exercise_id| {
                exercises
                    .iter()
                    .find(|exercise| exercise.id == exercise_id)
                    .map(|exercise| exercise.name.clone())
            },
        )
    }

    /// Planned-vs-actual for every logged exercise the workout still plans.
    pub fn compare_session(&self, session_id: &str) -> ServiceResult<Vec<PerformanceComparison>> {
        let session = self
            .store
            .sessions()
            .get_by_id(session_id)
            .ok_or_else(|| ServiceError::not_found("session", session_id))?;
        let workout = self
            .store
            .workouts()
            .get_by_id(&session.workout_id)
            .ok_or_else(|| ServiceError::not_found("workout", &session.workout_id))?;

        Ok(session
            .exercise_logs
            .iter()
            .filter_map(|log| {
                workout
                    .planned(&log.exercise_id)
                    .map(|planned| compare_exercise(planned, log))
            })
            .collect())
    }
}
