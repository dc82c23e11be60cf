//! Workout template and exercise library use-cases.
//!
//! # Invariants
//! - Updates replace a workout's exercise list wholesale.
//! - Deleting a workout keeps assignments that reference it.
//! - The built-in catalogue is only seeded into an empty library.

use crate::model::exercise::{seed_catalogue, Exercise, ExerciseForm};
use crate::model::time::now_iso;
use crate::model::workout::{Workout, WorkoutExercise, WorkoutForm};
use crate::model::Record;
use crate::repo::kv_store::KvStore;
use crate::repo::local_store::LocalStore;
use crate::service::auth_session::AuthSession;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct WorkoutLibrary<'a, S: KvStore> {
    store: &'a LocalStore<S>,
    session: &'a AuthSession,
}

impl<'a, S: KvStore> WorkoutLibrary<'a, S> {
    pub fn new(store: &'a LocalStore<S>, session: &'a AuthSession) -> Self {
        Self { store, session }
    }

    fn author(&self) -> Option<String> {
        self.session.current_user().map(|user| user.id.clone())
    }

    pub fn create_workout(
        &self,
        form: WorkoutForm,
        exercises: Vec<WorkoutExercise>,
    ) -> ServiceResult<Workout> {
        let now = now_iso();
        let mut workout = form.into_workout(exercises, self.author(), now.clone());
        workout.updated_at = Some(now);
        workout.validate()?;
        self.store.workouts().save(&workout)?;
        info!(
            "event=workout_create module=service status=ok exercises={}",
            workout.exercises.len()
        );
        Ok(workout)
    }

    /// Replaces header fields and the exercise list of an existing workout.
    pub fn update_workout(
        &self,
        workout_id: &str,
        form: WorkoutForm,
        exercises: Vec<WorkoutExercise>,
    ) -> ServiceResult<Workout> {
        let mut workout = self.get_workout(workout_id)?;
        workout.name = form.name.trim().to_string();
        workout.description = form.description;
        workout.category = form.category;
        workout.video_url = form.video_url;
        workout.exercises = exercises;
        workout.validate()?;
        workout.updated_at = Some(now_iso());
        self.store.workouts().save(&workout)?;
        Ok(workout)
    }

    pub fn delete_workout(&self, workout_id: &str) -> ServiceResult<bool> {
        Ok(self.store.workouts().delete(workout_id)?)
    }

    pub fn list_workouts(&self) -> Vec<Workout> {
        self.store.workouts().get_all()
    }

    pub fn get_workout(&self, workout_id: &str) -> ServiceResult<Workout> {
        self.store
            .workouts()
            .get_by_id(workout_id)
            .ok_or_else(|| ServiceError::not_found("workout", workout_id))
    }

    pub fn create_exercise(&self, form: ExerciseForm) -> ServiceResult<Exercise> {
        let exercise = form.into_exercise(self.author(), now_iso());
        exercise.validate()?;
        self.store.exercises().save(&exercise)?;
        Ok(exercise)
    }

    pub fn list_exercises(&self) -> Vec<Exercise> {
        self.store.exercises().get_all()
    }

    /// Writes the built-in catalogue when no exercise exists yet.
    ///
    /// Returns how many exercises were inserted.
    pub fn seed_exercises(&self) -> ServiceResult<usize> {
        let repo = self.store.exercises();
        if !repo.get_all().is_empty() {
            return Ok(0);
        }
        let catalogue = seed_catalogue(&now_iso());
        repo.replace_all(&catalogue)?;
        info!(
            "event=exercise_seed module=service status=ok count={}",
            catalogue.len()
        );
        Ok(catalogue.len())
    }
}
