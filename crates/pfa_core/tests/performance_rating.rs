use pfa_core::model::assignment::{AssignmentStatus, WorkoutAssignment};
use pfa_core::model::session::{ExerciseLog, SessionStatus, SetLog, WorkoutSession};
use pfa_core::model::workout::WorkoutExercise;
use pfa_core::performance::{
    classify_set, compare_exercise, progress_metrics, RecordType, CLOSE_THRESHOLD, MET_THRESHOLD,
};
use pfa_core::{classify, PerformanceRating};

fn set(number: u32, reps: u32, weight: Option<f64>, completed: bool) -> SetLog {
    SetLog {
        set_number: number,
        reps_completed: reps,
        weight_used: weight,
        duration: None,
        completed,
        notes: None,
    }
}

fn log(exercise_id: &str, sets: Vec<SetLog>) -> ExerciseLog {
    ExerciseLog {
        id: format!("log-{exercise_id}"),
        workout_session_id: "s1".to_string(),
        exercise_id: exercise_id.to_string(),
        workout_exercise_id: None,
        target_sets: Some(3),
        target_reps: Some(10),
        target_weight: None,
        target_duration: None,
        sets,
        completed_at: None,
        notes: None,
        created_at: None,
    }
}

fn session(
    id: &str,
    status: SessionStatus,
    minutes: Option<u32>,
    completed_at: &str,
    logs: Vec<ExerciseLog>,
) -> WorkoutSession {
    WorkoutSession {
        id: id.to_string(),
        client_id: "c1".to_string(),
        workout_id: "w1".to_string(),
        assignment_id: None,
        started_at: "2024-03-01T09:00:00.000Z".to_string(),
        completed_at: Some(completed_at.to_string()),
        status,
        total_duration: minutes,
        overall_notes: None,
        rating: None,
        exercise_logs: logs,
    }
}

#[test]
fn reps_against_target_ten() {
    let ratings: Vec<PerformanceRating> = [10, 8, 6]
        .into_iter()
        .map(|reps| classify_set(&set(1, reps, None, true), 10))
        .collect();
    assert_eq!(
        ratings,
        vec![
            PerformanceRating::Met,
            PerformanceRating::Close,
            PerformanceRating::Under
        ]
    );
    assert_eq!(
        classify_set(&set(1, 12, None, true), 10),
        PerformanceRating::Exceeded
    );
    assert_eq!(
        classify_set(&set(1, 10, None, false), 10),
        PerformanceRating::Skipped
    );
}

#[test]
fn thresholds_are_the_documented_constants() {
    assert_eq!(MET_THRESHOLD, 1.0);
    assert_eq!(CLOSE_THRESHOLD, 0.8);
    assert_eq!(classify(0.0, 0.0), PerformanceRating::Met);
    assert!(PerformanceRating::Exceeded.reached_target());
    assert!(PerformanceRating::Met.reached_target());
    assert!(!PerformanceRating::Close.reached_target());
    assert_eq!(PerformanceRating::Under.as_str(), "under");
}

#[test]
fn without_rep_target_completed_sets_are_rated() {
    let mut planned = WorkoutExercise::new("plank", 1, 3);
    planned.target_duration = Some(60);

    let comparison = compare_exercise(
        &planned,
        &log(
            "plank",
            vec![set(1, 0, None, true), set(2, 0, None, true), set(3, 0, None, false)],
        ),
    );
    assert_eq!(comparison.actual.sets, 2);
    assert_eq!(comparison.performance_rating, PerformanceRating::Under);

    let skipped = compare_exercise(&planned, &log("plank", vec![set(1, 0, None, false)]));
    assert_eq!(skipped.performance_rating, PerformanceRating::Skipped);
}

#[test]
fn progress_counts_only_completed_work() {
    let mut done = WorkoutAssignment::new("c1", "w1", "coach-1", "2024-03-01T00:00:00.000Z");
    done.status = AssignmentStatus::Completed;
    let pending = WorkoutAssignment::new("c1", "w2", "coach-1", "2024-03-01T00:00:00.000Z");
    let sessions = vec![
        session(
            "s1",
            SessionStatus::Completed,
            Some(40),
            "2024-03-02T10:00:00.000Z",
            vec![log("squat", vec![set(1, 5, Some(200.0), true), set(2, 12, Some(100.0), true)])],
        ),
        session(
            "s2",
            SessionStatus::Completed,
            Some(50),
            "2024-03-03T10:00:00.000Z",
            vec![log("squat", vec![set(1, 3, Some(220.0), true)])],
        ),
        session(
            "s3",
            SessionStatus::Abandoned,
            None,
            "2024-03-04T10:00:00.000Z",
            vec![log("squat", vec![set(1, 20, Some(300.0), true)])],
        ),
    ];

    let metrics = progress_metrics(&[done, pending], &sessions, |id| {
        (id == "squat").then(|| "Back Squat".to_string())
    });

    assert_eq!(metrics.total_workouts, 2);
    assert_eq!(metrics.completed_workouts, 1);
    assert_eq!(metrics.adherence_rate, 50.0);
    assert_eq!(metrics.avg_workout_duration, 45.0);

    let record = |kind: RecordType| {
        metrics
            .personal_records
            .iter()
            .find(|record| record.record_type == kind)
            .unwrap()
            .clone()
    };
    assert_eq!(record(RecordType::MaxWeight).value, 220.0);
    assert_eq!(record(RecordType::MaxWeight).achieved_at, "2024-03-03T10:00:00.000Z");
    assert_eq!(record(RecordType::MaxReps).value, 12.0);
    assert_eq!(record(RecordType::MaxVolume).value, 1200.0);
    assert_eq!(record(RecordType::MaxVolume).exercise_name, "Back Squat");
}

#[test]
fn no_assignments_means_zero_adherence() {
    let metrics = progress_metrics(&[], &[], |_| None);
    assert_eq!(metrics.adherence_rate, 0.0);
    assert_eq!(metrics.avg_workout_duration, 0.0);
    assert!(metrics.personal_records.is_empty());
}
