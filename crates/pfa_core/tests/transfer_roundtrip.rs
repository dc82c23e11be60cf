use chrono::{TimeZone, Utc};
use pfa_core::db::open_db_in_memory;
use pfa_core::model::assignment::WorkoutAssignment;
use pfa_core::model::athlete::Client;
use pfa_core::model::session::SetEntry;
use pfa_core::model::user::{AuthProvider, UserRole};
use pfa_core::model::workout::{Workout, WorkoutCategory, WorkoutExercise};
use pfa_core::{
    AuthSession, Collection, LocalStore, SessionService, SignedInIdentity, TransferError,
    TransferService, WorkoutLibrary,
};

const CREATED_AT: &str = "2024-03-01T09:00:00.000Z";

fn seed(store: &LocalStore<pfa_core::SqliteKvStore<'_>>) {
    store
        .clients()
        .save(&Client::with_id("c1", "Jordan Reyes", "jordan@example.com", CREATED_AT))
        .unwrap();
    let mut workout = Workout::with_id("w1", "Leg Day", WorkoutCategory::Strength, CREATED_AT);
    let mut squat = WorkoutExercise::new("e1", 1, 3);
    squat.target_reps = Some(10);
    workout.exercises.push(squat);
    store.workouts().save(&workout).unwrap();
    store
        .assignments()
        .save(&WorkoutAssignment::new("c1", "w1", "coach-1", CREATED_AT))
        .unwrap();
}

#[test]
fn export_then_import_into_empty_store_reproduces_collections() {
    let source_conn = open_db_in_memory().unwrap();
    let source = LocalStore::sqlite(&source_conn);
    seed(&source);
    let coach = AuthSession::sign_in(
        &source.account(),
        &SignedInIdentity {
            uid: "coach-1".to_string(),
            email: "coach@example.com".to_string(),
            display_name: Some("Coach".to_string()),
            photo_url: None,
            provider: AuthProvider::Google,
        },
        UserRole::Admin,
        "token-1",
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    )
    .unwrap();
    assert!(WorkoutLibrary::new(&source, &coach).seed_exercises().unwrap() > 0);

    let assignment_id = source.assignments().get_all()[0].id.clone();
    let sessions = SessionService::new(&source, &coach);
    let session = sessions.start_session("w1", Some(&assignment_id)).unwrap();
    sessions
        .log_set(&session.id, "e1", SetEntry::reps(10).with_weight(102.5))
        .unwrap();
    sessions
        .log_set(&session.id, "e1", SetEntry::skipped())
        .unwrap();
    sessions
        .complete_session(&session.id, Some("heavy day".to_string()), Some(5))
        .unwrap();
    assert_eq!(source.exercise_logs().get_all().len(), 1);

    let exported = TransferService::new(&source).export_all().unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = LocalStore::sqlite(&target_conn);
    let summary = TransferService::new(&target).import_all(&exported).unwrap();

    assert!(summary.user_restored);
    assert_eq!(summary.collections.len(), Collection::ALL.len());
    assert_eq!(target.clients().get_all(), source.clients().get_all());
    assert_eq!(target.exercises().get_all(), source.exercises().get_all());
    assert_eq!(target.workouts().get_all(), source.workouts().get_all());
    assert_eq!(target.assignments().get_all(), source.assignments().get_all());
    assert_eq!(target.sessions().get_all(), source.sessions().get_all());
    assert_eq!(
        target.exercise_logs().get_all(),
        source.exercise_logs().get_all()
    );
    let sets = &target.sessions().get_all()[0].exercise_logs[0].sets;
    assert_eq!(sets[0].weight_used, Some(102.5));
    assert!(!sets[1].completed);

    assert_eq!(target.account().get_user(), source.account().get_user());
    assert_eq!(target.account().get_token(), None);
    assert_eq!(TransferService::new(&target).export_all().unwrap(), exported);
}

#[test]
fn malformed_import_leaves_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let before = TransferService::new(&store).export_bundle();

    let err = TransferService::new(&store)
        .import_all("{\"clients\": [")
        .unwrap_err();
    assert!(matches!(err, TransferError::Parse(_)));
    assert!(err.to_string().starts_with("failed to import data"));

    assert_eq!(TransferService::new(&store).export_bundle(), before);
}

#[test]
fn invalid_record_in_later_collection_aborts_whole_import() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);
    let before = TransferService::new(&store).export_bundle();

    let payload = r#"{
        "clients": [],
        "workouts": [{
            "id": "w2",
            "name": "Sprints",
            "category": "speed",
            "exercises": [{"exerciseId": "e1", "order": 1, "targetSets": 0}],
            "createdAt": "2024-03-02T09:00:00.000Z"
        }]
    }"#;
    match TransferService::new(&store).import_all(payload).unwrap_err() {
        TransferError::Invalid {
            collection,
            index,
            errors,
        } => {
            assert_eq!(collection, "workouts");
            assert_eq!(index, 0);
            assert!(errors.get("exercises[0].targetSets").is_some());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(TransferService::new(&store).export_bundle(), before);
}

#[test]
fn duplicate_ids_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);

    let payload = r#"{"clients": [
        {"id": "c1", "name": "Jordan Reyes", "email": "jordan@example.com", "createdAt": "2024-03-01T09:00:00.000Z"},
        {"id": "c1", "name": "Sam Okafor", "email": "sam@example.com", "createdAt": "2024-03-01T09:00:00.000Z"}
    ]}"#;
    assert!(matches!(
        TransferService::new(&store).import_all(payload),
        Err(TransferError::DuplicateId { collection: "clients", ref id }) if id == "c1"
    ));
    assert!(store.clients().get_all().is_empty());
}

#[test]
fn absent_collections_are_left_alone() {
    let conn = open_db_in_memory().unwrap();
    let store = LocalStore::sqlite(&conn);
    seed(&store);

    let summary = TransferService::new(&store)
        .import_all(r#"{"clients": []}"#)
        .unwrap();

    assert_eq!(summary.collections, vec![(Collection::Clients, 0)]);
    assert!(!summary.user_restored);
    assert!(store.clients().get_all().is_empty());
    assert_eq!(store.workouts().get_all().len(), 1);
    assert_eq!(store.assignments().get_all().len(), 1);
}
