//! Athlete roster and workout assignment use-cases.
//!
//! # Responsibility
//! - Create, edit and remove athletes after form validation.
//! - Assign workouts to athletes and track assignment status.
//!
//! # Invariants
//! - Deleting an athlete leaves their assignments and sessions in place.
//! - `assign_workout` is coach-only and writes one assignment per athlete.
//! - Any assignment status may follow any other.

use crate::model::assignment::{AssignmentStatus, WorkoutAssignment};
use crate::model::athlete::{Client, ClientForm};
use crate::model::time::now_iso;
use crate::model::user::UserRole;
use crate::model::workout::Workout;
use crate::model::Record;
use crate::repo::kv_store::KvStore;
use crate::repo::local_store::LocalStore;
use crate::service::auth_session::AuthSession;
use crate::service::{ServiceError, ServiceResult};
use log::info;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

pub struct RosterService<'a, S: KvStore> {
    store: &'a LocalStore<S>,
    session: &'a AuthSession,
}

impl<'a, S: KvStore> RosterService<'a, S> {
    pub fn new(store: &'a LocalStore<S>, session: &'a AuthSession) -> Self {
        Self { store, session }
    }

    /// Validates the form and stores a new active athlete.
    pub fn create_client(&self, form: ClientForm) -> ServiceResult<Client> {
        form.validate()?;
        let now = now_iso();
        let mut client = Client::new(form.name.trim(), form.email.trim(), now.clone());
        client.phone = non_blank(form.phone);
        client.notes = non_blank(form.notes);
        client.active = Some(true);
        client.updated_at = Some(now);
        client.created_by = self.session.current_user().map(|user| user.id.clone());

        self.store.clients().save(&client)?;
        info!("event=client_create module=service status=ok");
        Ok(client)
    }

    /// Validates and replaces an existing athlete, refreshing `updatedAt`.
    pub fn update_client(&self, mut client: Client) -> ServiceResult<Client> {
        if self.store.clients().get_by_id(&client.id).is_none() {
            return Err(ServiceError::not_found("client", &client.id));
        }
        client.phone = non_blank(client.phone);
        client.validate()?;
        client.updated_at = Some(now_iso());
        self.store.clients().save(&client)?;
        Ok(client)
    }

    /// Points the athlete's photo at a local URI or uploaded URL.
    pub fn set_client_photo(&self, client_id: &str, photo_uri: &str) -> ServiceResult<Client> {
        let mut client = self.get_client(client_id)?;
        client.photo_uri = Some(photo_uri.to_string());
        client.updated_at = Some(now_iso());
        self.store.clients().save(&client)?;
        Ok(client)
    }

    /// Removes the athlete only. Returns whether a record was removed.
    pub fn delete_client(&self, client_id: &str) -> ServiceResult<bool> {
        let removed = self.store.clients().delete(client_id)?;
        info!(
            "event=client_delete module=service status=ok removed={}",
            removed
        );
        Ok(removed)
    }

    pub fn list_clients(&self) -> Vec<Client> {
        self.store.clients().get_all()
    }

    pub fn get_client(&self, client_id: &str) -> ServiceResult<Client> {
        self.store
            .clients()
            .get_by_id(client_id)
            .ok_or_else(|| ServiceError::not_found("client", client_id))
    }

    /// Creates one `assigned` assignment per athlete.
    ///
    /// # Errors
    /// - `EmptySelection` when `client_ids` is empty.
    /// - `Auth` when the session is not a coach.
    /// - `NotFound` when the workout does not exist.
    pub fn assign_workout(
        &self,
        workout_id: &str,
        client_ids: &[String],
    ) -> ServiceResult<Vec<WorkoutAssignment>> {
        let coach = self.session.require_role(UserRole::Admin)?;
        if client_ids.is_empty() {
            return Err(ServiceError::EmptySelection);
        }
        if self.store.workouts().get_by_id(workout_id).is_none() {
            return Err(ServiceError::not_found("workout", workout_id));
        }

        let assigned_date = now_iso();
        let repo = self.store.assignments();
        let mut created = Vec::with_capacity(client_ids.len());
        for client_id in client_ids {
            let assignment = WorkoutAssignment::new(
                client_id.as_str(),
                workout_id,
                coach.id.as_str(),
                assigned_date.as_str(),
            );
            repo.save(&assignment)?;
            created.push(assignment);
        }
        info!(
            "event=workout_assign module=service status=ok clients={}",
            created.len()
        );
        Ok(created)
    }

    pub fn unassign(&self, assignment_id: &str) -> ServiceResult<bool> {
        Ok(self.store.assignments().delete(assignment_id)?)
    }

    pub fn assignments_for_client(&self, client_id: &str) -> Vec<WorkoutAssignment> {
        self.store.assignments_by_client(client_id)
    }

    /// Workouts the athlete has no assignment for.
    pub fn unassigned_workouts(&self, client_id: &str) -> Vec<Workout> {
        let assigned = self.store.assignments_by_client(client_id);
        self.store
            .workouts()
            .filter(|workout| !assigned.iter().any(|a| a.workout_id == workout.id))
    }

    /// Sets any status. `completedDate` is stamped on completion and cleared
    /// otherwise.
    pub fn set_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> ServiceResult<WorkoutAssignment> {
        let repo = self.store.assignments();
        let mut assignment = repo
            .get_by_id(assignment_id)
            .ok_or_else(|| ServiceError::not_found("assignment", assignment_id))?;
        assignment.status = status;
        assignment.completed_date = match status {
            AssignmentStatus::Completed => assignment.completed_date.or_else(|| Some(now_iso())),
            _ => None,
        };
        repo.save(&assignment)?;
        Ok(assignment)
    }
}
