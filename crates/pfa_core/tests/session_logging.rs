use chrono::{Duration, Utc};
use pfa_core::db::open_db_in_memory;
use pfa_core::model::assignment::AssignmentStatus;
use pfa_core::model::athlete::Client;
use pfa_core::model::exercise::{Exercise, ExerciseType};
use pfa_core::model::session::{SessionStatus, SetEntry};
use pfa_core::model::time::parse_iso;
use pfa_core::model::user::{AuthProvider, UserRole};
use pfa_core::model::workout::{Workout, WorkoutCategory, WorkoutExercise};
use pfa_core::performance::RecordType;
use pfa_core::{
    AuthSession, LocalStore, PerformanceRating, ProgressService, RosterService, ServiceError,
    SessionService, SignedInIdentity, SqliteKvStore,
};

const CREATED_AT: &str = "2024-03-01T09:00:00.000Z";

fn identity(uid: &str, email: &str) -> SignedInIdentity {
    SignedInIdentity {
        uid: uid.to_string(),
        email: email.to_string(),
        display_name: None,
        photo_url: None,
        provider: AuthProvider::Google,
    }
}

fn sign_in(store: &LocalStore<SqliteKvStore<'_>>, uid: &str, role: UserRole) -> AuthSession {
    AuthSession::sign_in(
        &store.account(),
        &identity(uid, &format!("{uid}@example.com")),
        role,
        "token",
        Utc::now(),
    )
    .unwrap()
}

fn seed(store: &LocalStore<SqliteKvStore<'_>>) {
    store
        .clients()
        .save(&Client::with_id("c1", "Jordan Reyes", "jordan@example.com", CREATED_AT))
        .unwrap();
    store
        .exercises()
        .save(&Exercise {
            id: "e1".to_string(),
            name: "Back Squat".to_string(),
            kind: ExerciseType::Strength,
            muscle_group: None,
            equipment: None,
            instructions: None,
            video_url: None,
            created_by: None,
            created_at: CREATED_AT.to_string(),
        })
        .unwrap();
    let mut workout = Workout::with_id("w1", "Leg Day", WorkoutCategory::Strength, CREATED_AT);
    let mut squat = WorkoutExercise::new("e1", 1, 3);
    squat.target_reps = Some(10);
    squat.target_weight = Some(100.0);
    workout.exercises.push(squat);
    store.workouts().save(&workout).unwrap();
}

#[test]
fn assigned_workout_runs_from_start_to_completion() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let assignment = RosterService::new(&store, &coach)
        .assign_workout("w1", &["c1".to_string()])
        .unwrap()
        .remove(0);
    assert_eq!(assignment.assigned_by, "coach-1");

    let sessions = SessionService::new(&store, &coach);
    let started = sessions.start_session("w1", Some(&assignment.id)).unwrap();
    assert_eq!(started.client_id, "c1");
    assert_eq!(started.status, SessionStatus::InProgress);
    assert_eq!(
        store.assignments().get_by_id(&assignment.id).unwrap().status,
        AssignmentStatus::InProgress
    );

    let resumed = sessions.start_session("w1", Some(&assignment.id)).unwrap();
    assert_eq!(resumed.id, started.id);
    assert_eq!(store.sessions().get_all().len(), 1);

    sessions
        .log_set(&started.id, "e1", SetEntry::reps(10).with_weight(100.0))
        .unwrap();
    sessions
        .log_set(&started.id, "e1", SetEntry::reps(8).with_weight(105.0))
        .unwrap();
    let logged = sessions
        .log_set(&started.id, "e1", SetEntry::skipped())
        .unwrap();
    let log = logged.log_for("e1").unwrap();
    assert_eq!(log.target_sets, Some(3));
    assert_eq!(log.target_reps, Some(10));
    let numbers: Vec<u32> = log.sets.iter().map(|set| set.set_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let started_at = parse_iso(&started.started_at).unwrap();
    let completed = sessions
        .complete_session_at(
            &started.id,
            Some("felt strong".to_string()),
            Some(4),
            started_at + Duration::minutes(45) + Duration::seconds(10),
        )
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    assert_eq!(completed.total_duration, Some(45));
    assert_eq!(completed.rating, Some(4));
    assert!(completed.exercise_logs[0].completed_at.is_some());

    let assignment = store.assignments().get_by_id(&assignment.id).unwrap();
    assert_eq!(assignment.status, AssignmentStatus::Completed);
    assert!(assignment.completed_date.is_some());
    assert_eq!(store.exercise_logs_by_session(&started.id).len(), 1);

    let comparisons = ProgressService::new(&store)
        .compare_session(&started.id)
        .unwrap();
    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0].actual.sets, 2);
    assert_eq!(comparisons[0].actual.avg_reps, Some(9.0));
    assert_eq!(comparisons[0].performance_rating, PerformanceRating::Close);

    let metrics = ProgressService::new(&store).progress_metrics("c1");
    assert_eq!(metrics.total_workouts, 1);
    assert_eq!(metrics.completed_workouts, 1);
    assert_eq!(metrics.adherence_rate, 100.0);
    assert_eq!(metrics.avg_workout_duration, 45.0);
    let max_weight = metrics
        .personal_records
        .iter()
        .find(|record| record.record_type == RecordType::MaxWeight)
        .unwrap();
    assert_eq!(max_weight.exercise_name, "Back Squat");
    assert_eq!(max_weight.value, 105.0);
    let max_volume = metrics
        .personal_records
        .iter()
        .find(|record| record.record_type == RecordType::MaxVolume)
        .unwrap();
    assert_eq!(max_volume.value, 1000.0);
}

#[test]
fn closed_sessions_reject_changes() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let assignment = RosterService::new(&store, &coach)
        .assign_workout("w1", &["c1".to_string()])
        .unwrap()
        .remove(0);
    let sessions = SessionService::new(&store, &coach);
    let session = sessions.start_session("w1", Some(&assignment.id)).unwrap();
    sessions.complete_session(&session.id, None, None).unwrap();

    assert!(matches!(
        sessions.log_set(&session.id, "e1", SetEntry::reps(5)),
        Err(ServiceError::SessionClosed {
            status: SessionStatus::Completed,
            ..
        })
    ));
    assert!(matches!(
        sessions.abandon_session(&session.id),
        Err(ServiceError::SessionClosed { .. })
    ));
}

#[test]
fn invalid_input_is_rejected_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let assignment = RosterService::new(&store, &coach)
        .assign_workout("w1", &["c1".to_string()])
        .unwrap()
        .remove(0);
    let sessions = SessionService::new(&store, &coach);
    let session = sessions.start_session("w1", Some(&assignment.id)).unwrap();

    match sessions.log_set(&session.id, "e1", SetEntry::reps(500)) {
        Err(ServiceError::Validation(errors)) => {
            assert!(errors.get("repsCompleted").is_some());
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(sessions.get_session(&session.id).unwrap().exercise_logs.is_empty());

    assert!(matches!(
        sessions.complete_session(&session.id, None, Some(6)),
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(
        sessions.get_session(&session.id).unwrap().status,
        SessionStatus::InProgress
    );
}

#[test]
fn session_progress_never_moves_an_assignment_backwards() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let roster = RosterService::new(&store, &coach);
    let assignment = roster
        .assign_workout("w1", &["c1".to_string()])
        .unwrap()
        .remove(0);
    roster
        .set_assignment_status(&assignment.id, AssignmentStatus::Completed)
        .unwrap();

    SessionService::new(&store, &coach)
        .start_session("w1", Some(&assignment.id))
        .unwrap();

    assert_eq!(
        store.assignments().get_by_id(&assignment.id).unwrap().status,
        AssignmentStatus::Completed
    );
}

#[test]
fn athlete_session_resolves_linked_client() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);

    let athlete = sign_in(&store, "athlete-1", UserRole::Client);
    assert!(matches!(
        SessionService::new(&store, &athlete).start_session("w1", None),
        Err(ServiceError::NotFound { entity: "client", .. })
    ));

    let mut client = store.clients().get_by_id("c1").unwrap();
    client.user_id = Some("athlete-1".to_string());
    store.clients().save(&client).unwrap();

    let session = SessionService::new(&store, &athlete)
        .start_session("w1", None)
        .unwrap();
    assert_eq!(session.client_id, "c1");
    assert_eq!(session.assignment_id, None);
}

#[test]
fn assignment_requires_coach_and_a_selection() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);

    let athlete = sign_in(&store, "athlete-1", UserRole::Client);
    assert!(matches!(
        RosterService::new(&store, &athlete).assign_workout("w1", &["c1".to_string()]),
        Err(ServiceError::Auth(_))
    ));

    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let roster = RosterService::new(&store, &coach);
    assert!(matches!(
        roster.assign_workout("w1", &[]),
        Err(ServiceError::EmptySelection)
    ));
    assert!(matches!(
        roster.assign_workout("missing", &["c1".to_string()]),
        Err(ServiceError::NotFound { entity: "workout", .. })
    ));
    assert!(store.assignments().get_all().is_empty());
    assert_eq!(roster.unassigned_workouts("c1").len(), 1);
}

#[test]
fn assignment_for_another_workout_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    store
        .workouts()
        .save(&Workout::with_id("w2", "Upper Body", WorkoutCategory::Strength, CREATED_AT))
        .unwrap();
    let coach = sign_in(&store, "coach-1", UserRole::Admin);
    let assignment = RosterService::new(&store, &coach)
        .assign_workout("w1", &["c1".to_string()])
        .unwrap()
        .remove(0);

    let result = SessionService::new(&store, &coach).start_session("w2", Some(&assignment.id));
    assert!(matches!(
        result,
        Err(ServiceError::NotFound { entity: "assignment", .. })
    ));
    assert!(store.sessions().get_all().is_empty());
    assert_eq!(
        store.assignments().get_by_id(&assignment.id).unwrap().status,
        AssignmentStatus::Assigned
    );
}
