//! Athlete workout session use-cases.
//!
//! # Responsibility
//! - Start or resume a session for a workout.
//! - Append set logs while the session is open.
//! - Close the session and mirror its logs into the exercise-log collection.
//!
//! # Invariants
//! - At most one in-progress session per athlete and workout is created here.
//! - Completed and abandoned sessions reject further changes.
//! - Session progress only moves an assignment forward.

use crate::model::assignment::{AssignmentStatus, WorkoutAssignment};
use crate::model::new_id;
use crate::model::session::{ExerciseLog, SessionStatus, SetEntry, WorkoutSession};
use crate::model::time::{now_iso, parse_iso, to_iso};
use crate::model::validation::{ValidationErrors, MAX_RATING, MIN_RATING};
use crate::repo::kv_store::KvStore;
use crate::repo::local_store::LocalStore;
use crate::service::auth_session::AuthSession;
use crate::service::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use log::info;

pub struct SessionService<'a, S: KvStore> {
    store: &'a LocalStore<S>,
    session: &'a AuthSession,
}

impl<'a, S: KvStore> SessionService<'a, S> {
    pub fn new(store: &'a LocalStore<S>, session: &'a AuthSession) -> Self {
        Self { store, session }
    }

    /// Returns the athlete's open session for the workout, or starts one.
    ///
    /// The athlete is the assignment's client when an assignment is given,
    /// otherwise the client record linked to the signed-in user. An
    /// assignment for a different workout is reported as `NotFound`.
    pub fn start_session(
        &self,
        workout_id: &str,
        assignment_id: Option<&str>,
    ) -> ServiceResult<WorkoutSession> {
        if self.store.workouts().get_by_id(workout_id).is_none() {
            return Err(ServiceError::not_found("workout", workout_id));
        }
        let assignment = match assignment_id {
            Some(id) => Some(
                self.store
                    .assignments()
                    .get_by_id(id)
                    .filter(|assignment| assignment.workout_id == workout_id)
                    .ok_or_else(|| ServiceError::not_found("assignment", id))?,
            ),
            None => None,
        };
        let client_id = self.resolve_client_id(assignment.as_ref())?;

        if let Some(open) = self.store.sessions().find(|session| {
            session.client_id == client_id
                && session.workout_id == workout_id
                && session.status.is_open()
        }) {
            return Ok(open);
        }

        let session = WorkoutSession {
            id: new_id(),
            client_id,
            workout_id: workout_id.to_string(),
            assignment_id: assignment.as_ref().map(|a| a.id.clone()),
            started_at: now_iso(),
            completed_at: None,
            status: SessionStatus::InProgress,
            total_duration: None,
            overall_notes: None,
            rating: None,
            exercise_logs: Vec::new(),
        };
        self.store.sessions().save(&session)?;
        if let Some(assignment) = assignment {
            self.advance_assignment(assignment, AssignmentStatus::InProgress)?;
        }
        info!("event=session_start module=service status=ok");
        Ok(session)
    }

    /// Appends one set to the exercise's log, creating the log on first use.
    pub fn log_set(
        &self,
        session_id: &str,
        exercise_id: &str,
        entry: SetEntry,
    ) -> ServiceResult<WorkoutSession> {
        let mut session = self.open_session(session_id)?;

        let index = match session
            .exercise_logs
            .iter()
            .position(|log| log.exercise_id == exercise_id)
        {
            Some(index) => index,
            None => {
                let log = self.new_exercise_log(&session, exercise_id);
                session.exercise_logs.push(log);
                session.exercise_logs.len() - 1
            }
        };

        let log = &mut session.exercise_logs[index];
        let set_log = entry.into_set_log(log.sets.len() as u32 + 1);
        set_log.validate()?;
        log.sets.push(set_log);

        self.store.sessions().save(&session)?;
        Ok(session)
    }

    pub fn complete_session(
        &self,
        session_id: &str,
        notes: Option<String>,
        rating: Option<u8>,
    ) -> ServiceResult<WorkoutSession> {
        self.complete_session_at(session_id, notes, rating, Utc::now())
    }

    /// Closes the session at `now`.
    ///
    /// `totalDuration` is the elapsed time since `startedAt`, rounded to whole
    /// minutes. Each exercise log is written to the exercise-log collection
    /// and the linked assignment is completed.
    pub fn complete_session_at(
        &self,
        session_id: &str,
        notes: Option<String>,
        rating: Option<u8>,
        now: DateTime<Utc>,
    ) -> ServiceResult<WorkoutSession> {
        if let Some(rating) = rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                let mut errors = ValidationErrors::new();
                errors.add(
                    "rating",
                    format!("must be between {MIN_RATING} and {MAX_RATING}"),
                );
                return Err(ServiceError::Validation(errors));
            }
        }
        let mut session = self.open_session(session_id)?;

        let completed_at = to_iso(now);
        session.status = SessionStatus::Completed;
        session.completed_at = Some(completed_at.clone());
        session.total_duration = parse_iso(&session.started_at).map(|started| {
            let seconds = (now - started).num_seconds().max(0);
            ((seconds + 30) / 60) as u32
        });
        session.overall_notes = notes.filter(|n| !n.trim().is_empty());
        session.rating = rating;
        for log in &mut session.exercise_logs {
            log.completed_at = Some(completed_at.clone());
        }

        self.store.sessions().save(&session)?;
        self.persist_exercise_logs(&session.exercise_logs)?;
        if let Some(assignment_id) = session.assignment_id.as_deref() {
            if let Some(assignment) = self.store.assignments().get_by_id(assignment_id) {
                self.advance_assignment(assignment, AssignmentStatus::Completed)?;
            }
        }
        info!(
            "event=session_complete module=service status=ok exercises={} duration_min={}",
            session.exercise_logs.len(),
            session.total_duration.unwrap_or_default()
        );
        Ok(session)
    }

    /// Marks the session abandoned; its logs are not mirrored.
    pub fn abandon_session(&self, session_id: &str) -> ServiceResult<WorkoutSession> {
        let mut session = self.open_session(session_id)?;
        session.status = SessionStatus::Abandoned;
        self.store.sessions().save(&session)?;
        info!("event=session_abandon module=service status=ok");
        Ok(session)
    }

    pub fn get_session(&self, session_id: &str) -> ServiceResult<WorkoutSession> {
        self.store
            .sessions()
            .get_by_id(session_id)
            .ok_or_else(|| ServiceError::not_found("session", session_id))
    }

    pub fn sessions_for_client(&self, client_id: &str) -> Vec<WorkoutSession> {
        self.store.sessions_by_client(client_id)
    }

    fn open_session(&self, session_id: &str) -> ServiceResult<WorkoutSession> {
        let session = self.get_session(session_id)?;
        if !session.status.is_open() {
            return Err(ServiceError::SessionClosed {
                session_id: session.id,
                status: session.status,
            });
        }
        Ok(session)
    }

    fn resolve_client_id(&self, assignment: Option<&WorkoutAssignment>) -> ServiceResult<String> {
        if let Some(assignment) = assignment {
            return Ok(assignment.client_id.clone());
        }
        let user = self.session.require_user()?;
        self.store
            .clients()
            .find(|client| client.user_id.as_deref() == Some(user.id.as_str()))
            .map(|client| client.id)
            .ok_or_else(|| ServiceError::not_found("client", &user.id))
    }

    fn new_exercise_log(&self, session: &WorkoutSession, exercise_id: &str) -> ExerciseLog {
        let planned = self
            .store
            .workouts()
            .get_by_id(&session.workout_id)
            .and_then(|workout| workout.planned(exercise_id).cloned());
        ExerciseLog {
            id: new_id(),
            workout_session_id: session.id.clone(),
            exercise_id: exercise_id.to_string(),
            workout_exercise_id: None,
            target_sets: planned.as_ref().map(|p| p.target_sets),
            target_reps: planned.as_ref().and_then(|p| p.target_reps),
            target_weight: planned.as_ref().and_then(|p| p.target_weight),
            target_duration: planned.as_ref().and_then(|p| p.target_duration),
            sets: Vec::new(),
            completed_at: None,
            notes: None,
            created_at: Some(now_iso()),
        }
    }

    /// Upserts the logs with a single collection write.
    fn persist_exercise_logs(&self, logs: &[ExerciseLog]) -> ServiceResult<()> {
        if logs.is_empty() {
            return Ok(());
        }
        let repo = self.store.exercise_logs();
        let mut stored = repo.get_all();
        for log in logs {
            match stored.iter().position(|existing| existing.id == log.id) {
                Some(index) => stored[index] = log.clone(),
                None => stored.push(log.clone()),
            }
        }
        repo.replace_all(&stored)?;
        Ok(())
    }

    fn advance_assignment(
        &self,
        mut assignment: WorkoutAssignment,
        status: AssignmentStatus,
    ) -> ServiceResult<()> {
        if assignment.status.rank() >= status.rank() {
            return Ok(());
        }
        assignment.status = status;
        if status == AssignmentStatus::Completed {
            assignment.completed_date = Some(now_iso());
        }
        self.store.assignments().save(&assignment)?;
        Ok(())
    }
}
